//! Source character guessing
//!
//! Looks at a short run of 7-bit CC values from one control and decides
//! whether it's a button, a relative encoder or a fader/knob.

use super::SourceCharacter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Decrement,
    None,
    Increment,
}

impl Direction {
    fn between(first: u8, second: u8) -> Self {
        match first.cmp(&second) {
            std::cmp::Ordering::Equal => Direction::None,
            std::cmp::Ordering::Less => Direction::Increment,
            std::cmp::Ordering::Greater => Direction::Decrement,
        }
    }
}

/// Guess the character of the control that sent `values`.
///
/// `values` are consecutive CC values of the same channel and controller.
/// Returns `None` if there's nothing to look at.
pub fn guess_source_character(values: &[u8]) -> Option<SourceCharacter> {
    match values {
        [] => None,
        // Pressed, not released yet
        [_] => Some(SourceCharacter::Switch),
        // Pressed and released
        [_, 0] => Some(SourceCharacter::Switch),
        _ => {
            let mut previous = Direction::None;
            for (i, pair) in values.windows(2).enumerate() {
                let current = Direction::between(pair[0], pair[1]);
                if current == Direction::None || (i > 0 && current != previous) {
                    return Some(guess_encoder_type(values[1]));
                }
                previous = current;
            }
            Some(SourceCharacter::Range)
        }
    }
}

fn guess_encoder_type(value: u8) -> SourceCharacter {
    match value {
        1..=7 | 121..=127 => SourceCharacter::Encoder1,
        57..=71 => SourceCharacter::Encoder2,
        _ => SourceCharacter::Encoder3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_run() {
        assert_eq!(guess_source_character(&[]), None);
    }

    #[test]
    fn test_switch() {
        assert_eq!(guess_source_character(&[70]), Some(SourceCharacter::Switch));
        assert_eq!(guess_source_character(&[70, 0]), Some(SourceCharacter::Switch));
        assert_eq!(guess_source_character(&[127, 0]), Some(SourceCharacter::Switch));
    }

    #[test]
    fn test_range() {
        assert_eq!(
            guess_source_character(&[80, 81, 82, 83]),
            Some(SourceCharacter::Range)
        );
        assert_eq!(
            guess_source_character(&[90, 60, 30, 10]),
            Some(SourceCharacter::Range)
        );
        // Two values that don't end on 0 look continuous
        assert_eq!(guess_source_character(&[10, 11]), Some(SourceCharacter::Range));
    }

    #[test]
    fn test_encoders() {
        assert_eq!(
            guess_source_character(&[65, 65, 66]),
            Some(SourceCharacter::Encoder2)
        );
        assert_eq!(
            guess_source_character(&[1, 1, 1]),
            Some(SourceCharacter::Encoder1)
        );
        assert_eq!(
            guess_source_character(&[127, 127, 1]),
            Some(SourceCharacter::Encoder1)
        );
        assert_eq!(
            guess_source_character(&[1, 20, 1]),
            Some(SourceCharacter::Encoder3)
        );
    }

    #[test]
    fn test_direction_change_after_first_pair() {
        // Up, then down: not a fader
        assert_eq!(
            guess_source_character(&[60, 63, 61]),
            Some(SourceCharacter::Encoder2)
        );
    }
}
