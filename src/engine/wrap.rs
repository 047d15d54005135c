//! Auto-type wrap policy
//!
//! Manual typing jams at the margin. Auto-typed text instead breaks the
//! line: at a space if one arrives at the margin, otherwise mid-word with a
//! hyphen.

use crate::audio::SoundEvent;

/// What one auto-typed character turns into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapStep {
    /// Text appended to the buffer
    pub insert: String,
    /// Sound to play for this step
    pub sound: SoundEvent,
}

impl WrapStep {
    fn append(c: char) -> Self {
        Self {
            insert: c.to_string(),
            sound: SoundEvent::KeyPress,
        }
    }

    fn line_break(insert: String) -> Self {
        Self {
            insert,
            sound: SoundEvent::Return,
        }
    }

    pub fn is_line_break(&self) -> bool {
        self.sound == SoundEvent::Return
    }
}

/// Decide how to emit `c`
///
/// `column` is the length of the trailing line before `c`, `previous` the
/// last character already on the paper (`None` for a blank paper).
pub fn wrap_step(c: char, column: usize, previous: Option<char>, max_chars: usize) -> WrapStep {
    if c == '\n' {
        return WrapStep::line_break("\n".to_string());
    }

    // A space that would sit on the margin ends the line instead.
    if c == ' ' && column + 1 >= max_chars {
        return WrapStep::line_break("\n".to_string());
    }

    if column >= max_chars {
        let after_gap = matches!(previous, None | Some(' ') | Some('\n'));
        let insert = if after_gap {
            format!("\n{}", c)
        } else {
            format!("-\n{}", c)
        };
        return WrapStep::line_break(insert);
    }

    WrapStep::append(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_character_is_appended() {
        let step = wrap_step('a', 0, None, 42);
        assert_eq!(step.insert, "a");
        assert_eq!(step.sound, SoundEvent::KeyPress);
        assert!(!step.is_line_break());
    }

    #[test]
    fn test_space_below_margin_is_kept() {
        let step = wrap_step(' ', 10, Some('a'), 42);
        assert_eq!(step.insert, " ");
        assert_eq!(step.sound, SoundEvent::KeyPress);
    }

    #[test]
    fn test_explicit_newline_is_a_hard_break() {
        let step = wrap_step('\n', 3, Some('a'), 42);
        assert_eq!(step.insert, "\n");
        assert_eq!(step.sound, SoundEvent::Return);
    }

    #[test]
    fn test_space_at_margin_becomes_newline() {
        assert_eq!(wrap_step(' ', 2, Some('b'), 3).insert, "\n");
        assert_eq!(wrap_step(' ', 3, Some('c'), 3).insert, "\n");
    }

    #[test]
    fn test_mid_word_break_is_hyphenated() {
        let step = wrap_step('d', 3, Some('c'), 3);
        assert_eq!(step.insert, "-\nd");
        assert_eq!(step.sound, SoundEvent::Return);
    }

    #[test]
    fn test_no_hyphen_after_whitespace() {
        assert_eq!(wrap_step('d', 3, Some(' '), 3).insert, "\nd");
        assert_eq!(wrap_step('d', 3, Some('\n'), 3).insert, "\nd");
        assert_eq!(wrap_step('d', 3, None, 3).insert, "\nd");
    }
}
