use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use torus_snake::heading::Heading;

/// High-level input events consumed by the front end.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameInput {
    Heading(Heading),
    Start,
    Restart,
    Grow,
    Shrink,
    Resize,
    Quit,
}

/// Maps a terminal event to a game input, ignoring everything unbound.
#[must_use]
pub fn map_event(event: &Event) -> Option<GameInput> {
    match event {
        Event::Key(key) => map_key(key),
        Event::Resize(..) => Some(GameInput::Resize),
        _ => None,
    }
}

fn map_key(key: &KeyEvent) -> Option<GameInput> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(GameInput::Quit);
    }

    let input = match key.code {
        KeyCode::Up | KeyCode::Char('w' | 'k') => GameInput::Heading(Heading::Top),
        KeyCode::Down | KeyCode::Char('s' | 'j') => GameInput::Heading(Heading::Bottom),
        KeyCode::Left | KeyCode::Char('a' | 'h') => GameInput::Heading(Heading::Left),
        KeyCode::Right | KeyCode::Char('d' | 'l') => GameInput::Heading(Heading::Right),
        KeyCode::Enter | KeyCode::Char(' ') => GameInput::Start,
        KeyCode::Char('r') => GameInput::Restart,
        KeyCode::Char('+' | '=') => GameInput::Grow,
        KeyCode::Char('-') => GameInput::Shrink,
        KeyCode::Esc | KeyCode::Char('q') => GameInput::Quit,
        _ => return None,
    };

    Some(input)
}
