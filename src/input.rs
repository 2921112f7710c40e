//! Input adapter: raw terminal events in, engine commands out.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::snake::Direction::{self, *};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    /// Start a new session when none is running, otherwise toggle pause.
    StartOrPause,
    Pause,
    Reset,
    ToggleSound,
    Quit,
}

pub fn command_for_key(ev: &KeyEvent) -> Option<Command> {
    if is_ctrl_c(ev) {
        return Some(Command::Quit);
    }

    let KeyEvent { code, modifiers: _ } = ev;
    let cmd = match code {
        KeyCode::Char('w') | KeyCode::Up => Command::Turn(Up),
        KeyCode::Char('a') | KeyCode::Left => Command::Turn(Left),
        KeyCode::Char('s') | KeyCode::Down => Command::Turn(Down),
        KeyCode::Char('d') | KeyCode::Right => Command::Turn(Right),
        KeyCode::Char(' ') => Command::StartOrPause,
        KeyCode::Esc => Command::Pause,
        KeyCode::Char('r') => Command::Reset,
        KeyCode::Char('m') => Command::ToggleSound,
        KeyCode::Char('q') => Command::Quit,
        _ => return None,
    };
    Some(cmd)
}

pub fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}

/// Direction of a drag by its dominant axis. Ties go to the vertical axis.
pub fn swipe_direction(dx: i32, dy: i32) -> Option<Direction> {
    if dx.abs() > dy.abs() {
        Some(if dx > 0 { Right } else { Left })
    } else if dy != 0 {
        Some(if dy > 0 { Down } else { Up })
    } else {
        None
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Gesture {
    Tap,
    Swipe(Direction),
}

/// While a session is in play a swipe turns and a tap toggles pause.
/// Otherwise any gesture starts a new session.
pub fn command_for_gesture(gesture: Gesture, playing: bool) -> Command {
    match gesture {
        Gesture::Swipe(dir) if playing => Command::Turn(dir),
        _ => Command::StartOrPause,
    }
}

/// Pairs a left-button press with its release to recognise taps and swipes.
#[derive(Default)]
pub struct SwipeTracker {
    start: Option<(u16, u16)>,
}

impl SwipeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, ev: &MouseEvent) -> Option<Gesture> {
        match ev.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.start = Some((ev.column, ev.row));
                None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let (x0, y0) = self.start.take()?;
                // Terminal cells are about twice as tall as wide.
                let dx = (ev.column as i32 - x0 as i32) / 2;
                let dy = ev.row as i32 - y0 as i32;
                Some(match swipe_direction(dx, dy) {
                    Some(dir) => Gesture::Swipe(dir),
                    None => Gesture::Tap,
                })
            }
            _ => None,
        }
    }
}
