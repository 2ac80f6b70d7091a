use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::snake::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    Pause,
    /// Yes to the restart prompt.
    Confirm,
    /// No to the restart prompt.
    Decline,
    Quit,
}

impl Command {
    pub fn from_key_event(ev: KeyEvent) -> Option<Command> {
        if ev.kind == KeyEventKind::Release {
            return None;
        }

        if is_ctrl_c(&ev) {
            return Some(Command::Quit);
        }

        let cmd = match ev.code {
            KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Command::Turn(Direction::Up),
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Command::Turn(Direction::Left),
            KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Command::Turn(Direction::Down),
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Command::Turn(Direction::Right),
            KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Esc => Command::Pause,
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Command::Confirm,
            KeyCode::Char('n') | KeyCode::Char('N') => Command::Decline,
            KeyCode::Char('q') | KeyCode::Char('Q') => Command::Quit,
            _ => return None,
        };

        Some(cmd)
    }
}

pub fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> Option<Command> {
        Command::from_key_event(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn arrows_and_wasd_turn() {
        assert_eq!(press(KeyCode::Up), Some(Command::Turn(Direction::Up)));
        assert_eq!(press(KeyCode::Left), Some(Command::Turn(Direction::Left)));
        assert_eq!(press(KeyCode::Char('s')), Some(Command::Turn(Direction::Down)));
        assert_eq!(press(KeyCode::Char('D')), Some(Command::Turn(Direction::Right)));
    }

    #[test]
    fn p_and_esc_pause() {
        assert_eq!(press(KeyCode::Char('p')), Some(Command::Pause));
        assert_eq!(press(KeyCode::Esc), Some(Command::Pause));
    }

    #[test]
    fn prompt_answers() {
        assert_eq!(press(KeyCode::Char('y')), Some(Command::Confirm));
        assert_eq!(press(KeyCode::Enter), Some(Command::Confirm));
        assert_eq!(press(KeyCode::Char('n')), Some(Command::Decline));
    }

    #[test]
    fn ctrl_c_and_q_quit() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(Command::from_key_event(ctrl_c), Some(Command::Quit));
        assert_eq!(press(KeyCode::Char('q')), Some(Command::Quit));
    }

    #[test]
    fn releases_and_unbound_keys_are_ignored() {
        let release = KeyEvent {
            code: KeyCode::Up,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(Command::from_key_event(release), None);
        assert_eq!(press(KeyCode::Char('x')), None);
        assert_eq!(press(KeyCode::Char('c')), None);
    }
}
