//! Split Reveal Engine - Staggered per-token entrances
//!
//! [`reveal`] is a pure function: it splits a string into character or word
//! tokens and gives each a start delay of `base_delay + index * stagger` and
//! the preset's entrance. Calling it twice with the same inputs yields the
//! same tokens. [`RevealToken::frame_at`] samples a token's visual state at a
//! time since the entrance began.
//!
//! [`SplitReveal`] wraps that for a mounted view: it records when the entrance
//! started on the timeline and never replays it for the lifetime of the
//! session, even if the text changes.
//!
//! # Presets
//!
//! | Preset  | From                           | Duration | Curve    | Stagger |
//! |---------|--------------------------------|----------|----------|---------|
//! | fadeUp  | opacity 0, y 20                | 500ms    | expo-out | 30ms    |
//! | fadeIn  | opacity 0                      | 400ms    | ease-out | 20ms    |
//! | slideUp | opacity 0, y 40                | 600ms    | expo-out | 40ms    |
//! | reveal  | opacity 0, y 100, rotateX -90° | 800ms    | expo-out | 20ms    |
//!
//! Tokens animate toward opacity 1, y 0, rotateX 0. The container renders
//! with [`PERSPECTIVE`] and each token rotates about its bottom edge.
//!
//! [`LineReveal`] is the whole-line version: a clipped line slides up from one
//! line-height below its slot over [`LINE_REVEAL_DURATION`] on expo-out.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::config::millis;
use crate::state::context::MotionContext;
use crate::types::AnimatedProps;

use super::easing::{Easing, EXPO_OUT};

/// Perspective distance applied by the token container.
pub const PERSPECTIVE: f32 = 1000.0;

/// Replaces literal spaces in character mode so they keep their width.
pub const NBSP: char = '\u{00A0}';

// =============================================================================
// MODES AND PRESETS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// One token per grapheme.
    #[default]
    Chars,
    /// One token per space-separated word.
    Words,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RevealPreset {
    #[default]
    FadeUp,
    FadeIn,
    SlideUp,
    Reveal,
}

/// Full definition of one preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetSpec {
    pub props: AnimatedProps,
    pub initial: TokenFrame,
    pub duration: Duration,
    pub easing: Easing,
    pub default_stagger: Duration,
}

impl RevealPreset {
    pub fn spec(self) -> PresetSpec {
        let ms = Duration::from_millis;
        match self {
            RevealPreset::FadeUp => PresetSpec {
                props: AnimatedProps::OPACITY | AnimatedProps::TRANSLATE_Y,
                initial: TokenFrame::hidden(20.0, 0.0),
                duration: ms(500),
                easing: EXPO_OUT,
                default_stagger: ms(30),
            },
            RevealPreset::FadeIn => PresetSpec {
                props: AnimatedProps::OPACITY,
                initial: TokenFrame::hidden(0.0, 0.0),
                duration: ms(400),
                easing: Easing::EaseOut,
                default_stagger: ms(20),
            },
            RevealPreset::SlideUp => PresetSpec {
                props: AnimatedProps::OPACITY | AnimatedProps::TRANSLATE_Y,
                initial: TokenFrame::hidden(40.0, 0.0),
                duration: ms(600),
                easing: EXPO_OUT,
                default_stagger: ms(40),
            },
            RevealPreset::Reveal => PresetSpec {
                props: AnimatedProps::OPACITY | AnimatedProps::TRANSLATE_Y | AnimatedProps::ROTATE_X,
                initial: TokenFrame::hidden(100.0, -90.0),
                duration: ms(800),
                easing: EXPO_OUT,
                default_stagger: ms(20),
            },
        }
    }
}

// =============================================================================
// TOKENS
// =============================================================================

/// Visual state of one token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenFrame {
    pub opacity: f32,
    pub translate_y: f32,
    /// Degrees about the token's bottom edge.
    pub rotate_x: f32,
}

impl TokenFrame {
    pub const SETTLED: TokenFrame = TokenFrame {
        opacity: 1.0,
        translate_y: 0.0,
        rotate_x: 0.0,
    };

    const fn hidden(translate_y: f32, rotate_x: f32) -> Self {
        Self {
            opacity: 0.0,
            translate_y,
            rotate_x,
        }
    }

    fn lerp(from: TokenFrame, to: TokenFrame, t: f32) -> TokenFrame {
        TokenFrame {
            opacity: from.opacity + (to.opacity - from.opacity) * t,
            translate_y: from.translate_y + (to.translate_y - from.translate_y) * t,
            rotate_x: from.rotate_x + (to.rotate_x - from.rotate_x) * t,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevealToken {
    pub text: String,
    pub index: usize,
    /// When this token's entrance starts, relative to the entrance start.
    pub delay: Duration,
    /// Word tokens are followed by a rendered non-breaking space.
    pub trailing_space: bool,
    pub animation: PresetSpec,
}

impl RevealToken {
    /// Text as rendered, including the trailing space of word tokens.
    pub fn display(&self) -> String {
        if self.trailing_space {
            format!("{}{NBSP}", self.text)
        } else {
            self.text.clone()
        }
    }

    /// Time at which this token is fully settled.
    pub fn end(&self) -> Duration {
        self.delay.saturating_add(self.animation.duration)
    }

    /// Visual state `elapsed` after the entrance began.
    pub fn frame_at(&self, elapsed: Duration) -> TokenFrame {
        let Some(local) = elapsed.checked_sub(self.delay) else {
            return self.animation.initial;
        };
        let duration = self.animation.duration.as_secs_f32();
        let progress = if duration > 0.0 {
            local.as_secs_f32() / duration
        } else {
            1.0
        };
        let eased = self.animation.easing.transform(progress);
        TokenFrame::lerp(self.animation.initial, TokenFrame::SETTLED, eased)
    }
}

/// Split `text` into `(token, trailing_space)` pairs.
///
/// Words split on every single ASCII space, so runs of spaces produce empty
/// word tokens that still render their trailing space. Characters are
/// grapheme clusters with spaces swapped for [`NBSP`]. Empty text yields
/// no tokens in either mode.
pub fn tokenize(text: &str, mode: SplitMode) -> Vec<(String, bool)> {
    if text.is_empty() {
        return Vec::new();
    }
    match mode {
        SplitMode::Words => text.split(' ').map(|w| (w.to_string(), true)).collect(),
        SplitMode::Chars => text
            .graphemes(true)
            .map(|g| {
                let token = if g == " " { NBSP.to_string() } else { g.to_string() };
                (token, false)
            })
            .collect(),
    }
}

/// `stagger * index`, saturating instead of overflowing.
pub(crate) fn stagger_offset(stagger: Duration, index: usize) -> Duration {
    stagger.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
}

/// Tokens with their staggered delays and entrance.
pub fn reveal(
    text: &str,
    mode: SplitMode,
    base_delay: Duration,
    stagger: Duration,
    preset: RevealPreset,
) -> Vec<RevealToken> {
    let animation = preset.spec();
    tokenize(text, mode)
        .into_iter()
        .enumerate()
        .map(|(index, (text, trailing_space))| RevealToken {
            text,
            index,
            delay: base_delay.saturating_add(stagger_offset(stagger, index)),
            trailing_space,
            animation,
        })
        .collect()
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub text: String,
    pub mode: SplitMode,
    #[serde(with = "millis")]
    pub delay: Duration,
    /// Per-token offset (default: 30ms). `None` uses the preset's own stagger.
    #[serde(with = "millis::option")]
    pub stagger: Option<Duration>,
    pub preset: RevealPreset,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            mode: SplitMode::Chars,
            delay: Duration::ZERO,
            stagger: Some(Duration::from_millis(30)),
            preset: RevealPreset::FadeUp,
        }
    }
}

impl SplitConfig {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn effective_stagger(&self) -> Duration {
        self.stagger
            .unwrap_or_else(|| self.preset.spec().default_stagger)
    }
}

/// A mounted split-text view. The entrance begins at `configure` and plays once.
pub struct SplitReveal {
    ctx: MotionContext,
    config: SplitConfig,
    tokens: Vec<RevealToken>,
    started_at: Duration,
    /// Set once the entrance has been shown in full or skipped.
    played: bool,
}

impl SplitReveal {
    pub fn configure(ctx: &MotionContext, config: SplitConfig) -> Self {
        let tokens = reveal(
            &config.text,
            config.mode,
            config.delay,
            config.effective_stagger(),
            config.preset,
        );
        let played = ctx.is_reduced();
        tracing::debug!(tokens = tokens.len(), preset = ?config.preset, "split reveal mounted");
        Self {
            started_at: ctx.timeline.now(),
            ctx: ctx.clone(),
            config,
            tokens,
            played,
        }
    }

    /// Re-render with a new configuration. Tokens are recomputed only when
    /// the text or mode changed; the entrance is not replayed.
    pub fn update(&mut self, config: SplitConfig) {
        if config == self.config {
            return;
        }
        self.tokens = reveal(
            &config.text,
            config.mode,
            config.delay,
            config.effective_stagger(),
            config.preset,
        );
        self.config = config;
        self.played = true;
    }

    pub fn tokens(&self) -> &[RevealToken] {
        &self.tokens
    }

    /// Time since the entrance began.
    pub fn elapsed(&self) -> Duration {
        self.ctx.timeline.now().saturating_sub(self.started_at)
    }

    /// True once every token has settled (or the entrance was skipped).
    pub fn is_complete(&mut self) -> bool {
        if !self.played {
            let end = self.tokens.iter().map(RevealToken::end).max().unwrap_or_default();
            if self.elapsed() >= end {
                self.played = true;
            }
        }
        self.played
    }

    /// Current visual state of every token.
    pub fn frames(&mut self) -> Vec<TokenFrame> {
        if self.ctx.is_reduced() || self.is_complete() {
            return vec![TokenFrame::SETTLED; self.tokens.len()];
        }
        let elapsed = self.elapsed();
        self.tokens.iter().map(|t| t.frame_at(elapsed)).collect()
    }
}

// =============================================================================
// LINE REVEAL
// =============================================================================

pub const LINE_REVEAL_DURATION: Duration = Duration::from_millis(800);

/// One clipped line sliding up into place. Plays once per session.
#[derive(Debug, Clone)]
pub struct LineReveal {
    ctx: MotionContext,
    delay: Duration,
    started_at: Duration,
    played: bool,
}

impl LineReveal {
    pub fn configure(ctx: &MotionContext, delay: Duration) -> Self {
        Self {
            started_at: ctx.timeline.now(),
            ctx: ctx.clone(),
            delay,
            played: ctx.is_reduced(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Time since the entrance began.
    pub fn elapsed(&self) -> Duration {
        self.ctx.timeline.now().saturating_sub(self.started_at)
    }

    /// Offset `elapsed` after the entrance began, as a fraction of the line
    /// height: 1 fully below the clip, 0 in place.
    pub fn fraction_at(&self, elapsed: Duration) -> f32 {
        let Some(local) = elapsed.checked_sub(self.delay) else {
            return 1.0;
        };
        let progress = local.as_secs_f32() / LINE_REVEAL_DURATION.as_secs_f32();
        1.0 - EXPO_OUT.transform(progress)
    }

    pub fn is_complete(&mut self) -> bool {
        if !self.played && self.elapsed() >= self.delay.saturating_add(LINE_REVEAL_DURATION) {
            self.played = true;
        }
        self.played
    }

    /// Current offset. 0 under reduced motion and once played.
    pub fn translate_y_fraction(&mut self) -> f32 {
        if self.ctx.is_reduced() || self.is_complete() {
            return 0.0;
        }
        self.fraction_at(self.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::reduced_motion::ReducedMotion;
    use crate::state::timeline::Timeline;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn texts(tokens: &[RevealToken]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    fn setup(reduced: bool) -> MotionContext {
        MotionContext::new(Timeline::new(), ReducedMotion::fixed(reduced))
    }

    #[test]
    fn test_token_counts() {
        let preset = RevealPreset::FadeUp;
        let words = reveal("Hello World", SplitMode::Words, ms(0), ms(30), preset);
        assert_eq!(texts(&words), vec!["Hello", "World"]);

        let chars = reveal("Hi", SplitMode::Chars, ms(0), ms(30), preset);
        assert_eq!(texts(&chars), vec!["H", "i"]);

        assert!(reveal("", SplitMode::Words, ms(0), ms(30), preset).is_empty());
        assert!(reveal("", SplitMode::Chars, ms(0), ms(30), preset).is_empty());
    }

    #[test]
    fn test_spaces_become_nbsp_in_char_mode() {
        let tokens = tokenize("a b", SplitMode::Chars);
        assert_eq!(tokens[1], (NBSP.to_string(), false));
    }

    #[test]
    fn test_words_keep_empty_segments() {
        let tokens = tokenize("a  b", SplitMode::Words);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].0, "");
        assert!(tokens.iter().all(|(_, space)| *space));
    }

    #[test]
    fn test_word_display_has_trailing_space() {
        let tokens = reveal("go", SplitMode::Words, ms(0), ms(0), RevealPreset::FadeIn);
        assert_eq!(tokens[0].display(), format!("go{NBSP}"));
    }

    #[test]
    fn test_stagger_steps_exactly() {
        let tokens = reveal("staggered", SplitMode::Chars, ms(200), ms(40), RevealPreset::SlideUp);
        assert_eq!(tokens[0].delay, ms(200));
        for pair in tokens.windows(2) {
            assert_eq!(pair[1].delay - pair[0].delay, ms(40));
            assert_eq!(pair[1].index, pair[0].index + 1);
        }
    }

    #[test]
    fn test_huge_delays_saturate() {
        let far = reveal("abc", SplitMode::Chars, Duration::MAX, ms(30), RevealPreset::FadeUp);
        assert!(far.iter().all(|t| t.delay == Duration::MAX && t.end() == Duration::MAX));
        assert_eq!(far[2].frame_at(ms(1000)), RevealPreset::FadeUp.spec().initial);

        let wide = reveal("abc", SplitMode::Chars, ms(0), Duration::MAX, RevealPreset::FadeUp);
        assert_eq!(wide[0].delay, Duration::ZERO);
        assert_eq!(wide[2].delay, Duration::MAX);
    }

    #[test]
    fn test_reveal_is_idempotent() {
        let a = reveal("same", SplitMode::Chars, ms(0), ms(30), RevealPreset::Reveal);
        let b = reveal("same", SplitMode::Chars, ms(0), ms(30), RevealPreset::Reveal);
        assert_eq!(a, b);
    }

    #[test]
    fn test_preset_specs() {
        let reveal_spec = RevealPreset::Reveal.spec();
        assert_eq!(reveal_spec.initial.rotate_x, -90.0);
        assert_eq!(reveal_spec.initial.translate_y, 100.0);
        assert_eq!(reveal_spec.duration, ms(800));
        assert!(reveal_spec.props.contains(AnimatedProps::ROTATE_X));

        let fade_in = RevealPreset::FadeIn.spec();
        assert_eq!(fade_in.props, AnimatedProps::OPACITY);
        assert_eq!(fade_in.initial.translate_y, 0.0);
        assert_eq!(RevealPreset::SlideUp.spec().default_stagger, ms(40));
    }

    #[test]
    fn test_frame_sampling() {
        let tokens = reveal("ab", SplitMode::Chars, ms(0), ms(100), RevealPreset::FadeUp);
        let second = &tokens[1];

        assert_eq!(second.frame_at(ms(50)), RevealPreset::FadeUp.spec().initial);
        let mid = second.frame_at(ms(100 + 250));
        assert!(mid.opacity > 0.5 && mid.opacity < 1.0);
        assert!(mid.translate_y > 0.0 && mid.translate_y < 10.0);
        let end = second.frame_at(ms(600));
        assert!((end.opacity - 1.0).abs() < 1e-5);
        assert!(end.translate_y.abs() < 1e-4);
    }

    #[test]
    fn test_session_plays_once() {
        let ctx = setup(false);
        let mut split = SplitReveal::configure(&ctx, SplitConfig::new("hey"));
        assert!(!split.is_complete());
        assert_eq!(split.frames()[0].opacity, 0.0);

        ctx.timeline.advance(ms(60 + 500));
        assert!(split.is_complete());

        split.update(SplitConfig::new("new text"));
        let frames = split.frames();
        assert_eq!(frames.len(), 8);
        assert!(frames.iter().all(|f| *f == TokenFrame::SETTLED));
    }

    #[test]
    fn test_unchanged_update_keeps_entrance_running() {
        let ctx = setup(false);
        let mut split = SplitReveal::configure(&ctx, SplitConfig::new("hey"));
        split.update(SplitConfig::new("hey"));
        assert!(!split.is_complete());
    }

    #[test]
    fn test_preset_stagger_when_unset() {
        let config = SplitConfig {
            stagger: None,
            preset: RevealPreset::SlideUp,
            ..SplitConfig::new("ab")
        };
        assert_eq!(config.effective_stagger(), ms(40));
    }

    #[test]
    fn test_line_slides_up_after_delay() {
        let ctx = setup(false);
        let mut line = LineReveal::configure(&ctx, ms(300));
        assert_eq!(line.translate_y_fraction(), 1.0);

        ctx.timeline.advance(ms(299));
        assert_eq!(line.translate_y_fraction(), 1.0);

        ctx.timeline.advance(ms(1 + 200));
        let early = line.translate_y_fraction();
        assert!(early > 0.0 && early < 0.5, "expo-out front-loads the motion");

        ctx.timeline.advance(ms(600));
        assert!(line.is_complete());
        assert_eq!(line.translate_y_fraction(), 0.0);
    }

    #[test]
    fn test_line_plays_once() {
        let ctx = setup(false);
        let mut line = LineReveal::configure(&ctx, Duration::ZERO);
        ctx.timeline.advance(LINE_REVEAL_DURATION);
        assert!(line.is_complete());
        ctx.timeline.advance(ms(10_000));
        assert_eq!(line.translate_y_fraction(), 0.0);
        assert_eq!(line.fraction_at(Duration::ZERO), 1.0);
    }

    #[test]
    fn test_line_reduced_motion_is_in_place() {
        let ctx = setup(true);
        let mut line = LineReveal::configure(&ctx, ms(500));
        assert!(line.is_complete());
        assert_eq!(line.translate_y_fraction(), 0.0);
    }

    #[test]
    fn test_reduced_motion_is_static() {
        let ctx = setup(true);
        let mut split = SplitReveal::configure(&ctx, SplitConfig::new("calm"));
        assert!(split.is_complete());
        assert!(split.frames().iter().all(|f| *f == TokenFrame::SETTLED));
    }
}
