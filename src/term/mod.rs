//! Terminal front end for a game session
//!
//! Hosts the interactive session in the terminal: arrow keys feed the
//! session's input channel, published frames are blitted as half-block
//! cells (two pixels per character cell) with a HUD line underneath. Raw
//! mode and the alternate screen are restored on every exit path.
//!
//! Terminals that support the keyboard enhancement protocol report real key
//! release events; elsewhere releases are synthesized after a short hold
//! window refreshed by the terminal's own auto-repeat.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{cursor, execute, queue};
use tokio::sync::mpsc;
use tokio::time::{interval, Instant};
use tracing::debug;

use crate::game::session::Frame;
use crate::game::{InputEvent, Phase, SessionHandle};
use crate::render::{Rgb, Surface};

/// How long a synthesized steer press stays active without auto-repeat
const STEER_HOLD: Duration = Duration::from_millis(150);

/// Run the front end until the session ends or the player quits
pub async fn run(handle: SessionHandle) -> anyhow::Result<()> {
    let mut stdout = io::stdout();

    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

    let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    debug!(enhanced, "Terminal front end started");

    let result = drive(&mut stdout, handle, enhanced).await;

    if enhanced {
        let _ = execute!(stdout, PopKeyboardEnhancementFlags);
    }
    let _ = execute!(stdout, cursor::Show, LeaveAlternateScreen);
    let _ = disable_raw_mode();

    result
}

/// Event/render loop
async fn drive(
    stdout: &mut io::Stdout,
    handle: SessionHandle,
    enhanced: bool,
) -> anyhow::Result<()> {
    let (key_tx, mut key_rx) = mpsc::channel::<InputEvent>(64);
    let _key_reader = tokio::task::spawn_blocking(move || key_loop(key_tx));

    let mut frames = handle.frames.clone();
    let mut steer_release: Option<(Instant, InputEvent)> = None;
    let mut hold_timer = interval(Duration::from_millis(25));

    loop {
        tokio::select! {
            changed = frames.changed() => {
                if changed.is_err() {
                    break; // session loop is gone
                }
                let frame = frames.borrow_and_update().clone();
                blit(stdout, &frame)?;
                if frame.phase.is_terminal() {
                    break;
                }
            }
            key = key_rx.recv() => {
                let Some(input) = key else { break };
                if input == InputEvent::Quit {
                    let _ = handle.input_tx.send(InputEvent::Quit).await;
                    break;
                }
                if !enhanced {
                    steer_release = match input {
                        InputEvent::LeftPressed => {
                            Some((Instant::now() + STEER_HOLD, InputEvent::LeftReleased))
                        }
                        InputEvent::RightPressed => {
                            Some((Instant::now() + STEER_HOLD, InputEvent::RightReleased))
                        }
                        _ => steer_release,
                    };
                }
                if handle.input_tx.send(input).await.is_err() {
                    break;
                }
            }
            _ = hold_timer.tick() => {
                if let Some((deadline, release)) = steer_release {
                    if Instant::now() >= deadline {
                        steer_release = None;
                        if handle.input_tx.send(release).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

/// Blocking key reader; exits once the receiver goes away
fn key_loop(tx: mpsc::Sender<InputEvent>) {
    loop {
        if tx.is_closed() {
            return;
        }
        match event::poll(Duration::from_millis(100)) {
            Ok(true) => {
                if let Ok(Event::Key(key)) = event::read() {
                    if let Some(input) = map_key(key) {
                        if tx.blocking_send(input).is_err() {
                            return;
                        }
                    }
                }
            }
            Ok(false) => {}
            Err(_) => return,
        }
    }
}

/// Map a terminal key event to a session input
fn map_key(key: KeyEvent) -> Option<InputEvent> {
    match key.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => match key.code {
            KeyCode::Left => Some(InputEvent::LeftPressed),
            KeyCode::Right => Some(InputEvent::RightPressed),
            KeyCode::Down => Some(InputEvent::SpeedUp),
            KeyCode::Up => Some(InputEvent::SlowDown),
            KeyCode::Esc | KeyCode::Char('q') => Some(InputEvent::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(InputEvent::Quit)
            }
            _ => None,
        },
        KeyEventKind::Release => match key.code {
            KeyCode::Left => Some(InputEvent::LeftReleased),
            KeyCode::Right => Some(InputEvent::RightReleased),
            _ => None,
        },
    }
}

/// Draw one frame: half-block image plus a HUD line on the bottom row
fn blit(out: &mut impl Write, frame: &Frame) -> io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let out_w = cols as usize;
    let img_rows = rows.saturating_sub(1) as usize;
    if out_w == 0 || img_rows == 0 {
        return Ok(());
    }
    let out_h = img_rows * 2;

    queue!(out, cursor::MoveTo(0, 0))?;
    let mut prev_fg: Option<Rgb> = None;
    let mut prev_bg: Option<Rgb> = None;

    for row in 0..img_rows {
        for col in 0..out_w {
            let top = sample(&frame.surface, col, row * 2, out_w, out_h);
            let bot = sample(&frame.surface, col, row * 2 + 1, out_w, out_h);

            if prev_fg != Some(top) {
                queue!(out, SetForegroundColor(to_color(top)))?;
                prev_fg = Some(top);
            }
            if prev_bg != Some(bot) {
                queue!(out, SetBackgroundColor(to_color(bot)))?;
                prev_bg = Some(bot);
            }
            queue!(out, Print('\u{2580}'))?; // ▀
        }
        queue!(out, ResetColor, Print("\r\n"))?;
        prev_fg = None;
        prev_bg = None;
    }

    let status = match frame.phase {
        Phase::NotStarted => "press ↓ to dive",
        Phase::Running => "←/→ steer  ↓ faster  ↑ slower  q quit",
        Phase::Won => "you won!",
        Phase::Lost => "the drone hit the wall",
    };
    queue!(
        out,
        cursor::MoveTo(0, rows - 1),
        Clear(ClearType::CurrentLine),
        Print(format!(
            " score {:>8}  speed {:>4.1}  {}",
            frame.score.round(),
            frame.scroll_speed,
            status
        ))
    )?;

    out.flush()
}

/// Nearest-neighbor sample of the surface at output resolution
fn sample(surface: &Surface, x: usize, y: usize, out_w: usize, out_h: usize) -> Rgb {
    let sx = x * surface.width() / out_w;
    let sy = y * surface.height() / out_h;
    surface.get(sx.min(surface.width() - 1), sy.min(surface.height() - 1))
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.0,
        g: rgb.1,
        b: rgb.2,
    }
}
