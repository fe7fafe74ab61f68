// src/app/input.rs
use eframe::egui as eg;

use crate::app::types::Direction;

/// Arrow-key presses in arrival order. Repeats count as presses; releases are ignored.
pub fn directions_from_events(events: &[eg::Event]) -> Vec<Direction> {
    events
        .iter()
        .filter_map(|ev| match ev {
            eg::Event::Key {
                key, pressed: true, ..
            } => direction_for_key(*key),
            _ => None,
        })
        .collect()
}

pub const fn direction_for_key(key: eg::Key) -> Option<Direction> {
    match key {
        eg::Key::ArrowUp => Some(Direction::Up),
        eg::Key::ArrowDown => Some(Direction::Down),
        eg::Key::ArrowLeft => Some(Direction::Left),
        eg::Key::ArrowRight => Some(Direction::Right),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: eg::Key, pressed: bool, repeat: bool) -> eg::Event {
        eg::Event::Key {
            key,
            physical_key: None,
            pressed,
            repeat,
            modifiers: eg::Modifiers::NONE,
        }
    }

    #[test]
    fn presses_and_repeats_map_releases_do_not() {
        let events = [
            key(eg::Key::ArrowRight, true, false),
            key(eg::Key::ArrowRight, true, true),
            key(eg::Key::ArrowRight, false, false),
            key(eg::Key::Enter, true, false),
            eg::Event::Text("x".into()),
            key(eg::Key::ArrowUp, true, false),
        ];
        assert_eq!(
            directions_from_events(&events),
            vec![Direction::Right, Direction::Right, Direction::Up]
        );
    }
}
