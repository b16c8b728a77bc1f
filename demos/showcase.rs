//! Showcase - Every engine in one terminal screen
//!
//! - Typewriter and rolling text driven by the timeline
//! - Split reveal sampled at timeline time
//! - Tilt card, magnetic button and glitch label under the mouse
//! - Skill bars counting up
//!
//! Keys: `r` toggles reduced motion, `q` / Esc exits.
//! Reads `spark-motion.toml` from the working directory if present.
//!
//! Run with: cargo run --example showcase

use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    poll, read, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
};
use crossterm::style::Print;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};

use spark_motion::{
    init_tracing, Bounds, CounterConfig, CursorFollower, GlitchConfig, GlitchText,
    MagneticPointer, ManualPreference, MotionConfig, MotionContext, PointerEvent, PointerRegion,
    PointerTilt, ProgressCounter, ReducedMotion, RoleItem, RollingConfig,
    RollingText, SplitConfig, SplitReveal, Timeline, Typewriter, TypewriterConfig,
};

const FRAME: Duration = Duration::from_millis(16);

const CARD: Bounds = Bounds::new(2.0, 8.0, 30.0, 8.0);
const BUTTON: Bounds = Bounds::new(40.0, 10.0, 16.0, 3.0);
const GLITCH: Bounds = Bounds::new(2.0, 18.0, 20.0, 1.0);

fn main() -> io::Result<()> {
    init_tracing();

    let config = MotionConfig::load("spark-motion.toml").unwrap_or_else(|err| {
        eprintln!("{err}, using defaults");
        MotionConfig::default()
    });
    let preference = ManualPreference::new(config.reduced_motion_provider().current_value());
    let ctx = MotionContext::new(Timeline::new(), ReducedMotion::new(preference.clone()));

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture, Hide)?;
    let result = run(&ctx, &config, &preference);
    execute!(stdout(), Show, DisableMouseCapture, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    result
}

fn run(ctx: &MotionContext, config: &MotionConfig, preference: &ManualPreference) -> io::Result<()> {
    let typewriter = Typewriter::configure(
        ctx,
        TypewriterConfig {
            text: "Hello, I build things in Rust.".to_string(),
            looping: true,
            ..config.typewriter.clone()
        },
        Some(Box::new(|| tracing::info!("headline typed"))),
    );

    let rolling_config = if config.rolling.items.is_empty() {
        RollingConfig {
            items: vec![
                RoleItem::from("Systems programmer"),
                RoleItem::from("Terminal tinkerer"),
                RoleItem::from("Animation nerd"),
            ],
            ..config.rolling.clone()
        }
    } else {
        config.rolling.clone()
    };
    let rolling = RollingText::configure(ctx, rolling_config);

    let mut split = SplitReveal::configure(
        ctx,
        SplitConfig {
            text: "spark-motion showcase".to_string(),
            ..config.split.clone()
        },
    );

    let mut tilt = PointerTilt::new(ctx, config.tilt.clone());
    let mut magnet = MagneticPointer::new(ctx, config.magnetic.clone());
    let mut cursor = CursorFollower::new(ctx, config.cursor.clone());
    let mut glitch = GlitchText::configure(
        ctx,
        GlitchConfig {
            text: "hover to glitch".to_string(),
            ..config.glitch.clone()
        },
    );

    let mut card_region = PointerRegion::new(CARD);
    let mut button_region = PointerRegion::new(BUTTON);
    let mut glitch_region = PointerRegion::new(GLITCH);

    let bars: Vec<(&str, ProgressCounter)> = [("Rust", 90.0), ("TypeScript", 75.0), ("Go", 60.0)]
        .into_iter()
        .enumerate()
        .map(|(i, (name, level))| (name, ProgressCounter::new(ctx, CounterConfig::for_level(level, i))))
        .collect();

    let origin = Instant::now();
    loop {
        while poll(Duration::ZERO)? {
            match read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('r') => preference.set(!ctx.is_reduced()),
                    _ => {}
                },
                Event::Mouse(mouse) => {
                    if let Some(event) = PointerEvent::from_terminal(&mouse) {
                        card_region.dispatch(&mut tilt, event);
                        button_region.dispatch(&mut magnet, event);
                        glitch_region.dispatch(&mut glitch, event);
                        cursor.on_window_move(event.x, event.y);
                        cursor.hover_over(&[CARD, BUTTON, GLITCH]);
                    }
                }
                Event::FocusLost => cursor.on_window_leave(),
                _ => {}
            }
        }

        ctx.timeline.sync_to_wall_clock(origin);
        tilt.advance(FRAME);
        magnet.advance(FRAME);
        cursor.advance(FRAME);

        let mut out = stdout();
        queue!(out, Clear(ClearType::All))?;

        let frames = split.frames();
        let heading: String = split
            .tokens()
            .iter()
            .zip(frames)
            .map(|(token, frame)| if frame.opacity > 0.5 { token.display() } else { " ".to_string() })
            .collect();
        queue!(out, MoveTo(2, 0), Print(heading))?;

        let tw = typewriter.frame();
        let caret = if tw.caret_visible { "▌" } else { " " };
        queue!(out, MoveTo(2, 2), Print(format!("{}{caret}", tw.text)))?;

        let roll = rolling.frame();
        if roll.visible {
            let icon = roll.icon.map(|i| format!("[{}] ", i.as_str())).unwrap_or_default();
            let caret = if roll.caret_visible { "▌" } else { " " };
            queue!(out, MoveTo(2, 4), Print(format!("{icon}{}{caret}", roll.text)))?;
        }

        let t = tilt.frame();
        queue!(
            out,
            MoveTo(CARD.left as u16, CARD.top as u16),
            Print(format!(
                "card  rx {:>6.2}° ry {:>6.2}° x{:.3}",
                t.rotate_x, t.rotate_y, t.scale
            ))
        )?;
        if let Some(glare) = t.glare {
            queue!(
                out,
                MoveTo(CARD.left as u16, CARD.top as u16 + 1),
                Print(format!("glare {:>3.0}% {:>3.0}% a{:.2}", glare.x, glare.y, glare.opacity))
            )?;
        }

        let (dx, dy) = magnet.offset();
        let bx = (BUTTON.left + dx).max(0.0) as u16;
        let by = (BUTTON.top + BUTTON.height / 2.0 + dy).max(0.0) as u16;
        queue!(out, MoveTo(bx, by), Print("[ magnetic ]"))?;

        queue!(
            out,
            MoveTo(GLITCH.left as u16, GLITCH.top as u16),
            Print(glitch.displayed_text())
        )?;

        let elapsed = ctx.timeline.now();
        for (row, (name, bar)) in bars.iter().enumerate() {
            let frame = bar.frame_at(elapsed);
            let width = (frame.fill * 30.0).round() as usize;
            queue!(
                out,
                MoveTo(2, 21 + row as u16),
                Print(format!("{name:<11}{}{:>4}%", "█".repeat(width), frame.value))
            )?;
        }

        let c = cursor.frame();
        if c.visible {
            queue!(out, MoveTo(c.ring.0.max(0.0) as u16, c.ring.1.max(0.0) as u16), Print("○"))?;
            if c.dot_scale > 0.5 {
                queue!(out, MoveTo(c.dot.0 as u16, c.dot.1 as u16), Print("·"))?;
            }
        }

        let mode = if ctx.is_reduced() { "reduced" } else { "full" };
        queue!(out, MoveTo(2, 25), Print(format!("motion: {mode}  (r toggles, q quits)")))?;
        out.flush()?;

        std::thread::sleep(FRAME);
    }
}
