// Keyboard input: maps crossterm key events to world actions.

use crate::domain::{Action, AimDirection, InputSource};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::time::Duration;

pub fn map_key(key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C')).then_some(Action::Quit);
    }

    let action = match key.code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Action::MoveRight,
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => {
            Action::SetAim(AimDirection::Vertical)
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => Action::SetAim(AimDirection::DiagonalLeft),
        KeyCode::Char('e') | KeyCode::Char('E') => Action::SetAim(AimDirection::DiagonalRight),
        KeyCode::Char('z') | KeyCode::Char('Z') => Action::SetAim(AimDirection::HorizontalLeft),
        KeyCode::Char('c') | KeyCode::Char('C') => Action::SetAim(AimDirection::HorizontalRight),
        KeyCode::Char(' ') => Action::Fire,
        KeyCode::Esc | KeyCode::Char('x') | KeyCode::Char('X') => Action::Quit,
        _ => return None,
    };
    Some(action)
}

/// Reads key presses from the terminal the presentation sink owns.
#[derive(Debug, Default)]
pub struct KeyboardInput;

impl InputSource for KeyboardInput {
    fn poll_action(&mut self, timeout: Duration) -> io::Result<Option<Action>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) => Ok(map_key(key)),
            _ => Ok(None),
        }
    }
}

/// Input for headless runs: never produces an action.
#[derive(Debug, Default)]
pub struct IdleInput;

impl InputSource for IdleInput {
    fn poll_action(&mut self, timeout: Duration) -> io::Result<Option<Action>> {
        std::thread::sleep(timeout);
        Ok(None)
    }
}
