//! Display-only "active key" highlight
//!
//! The keyboard view lights up the last struck key for a short while.
//! Nothing here feeds back into the paper: the engine writes it, the view
//! polls it.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct KeyHighlight {
    duration: Duration,
    active: Option<(String, Instant)>,
}

impl KeyHighlight {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            active: None,
        }
    }

    /// Light up `label`, replacing whatever was lit
    pub fn press(&mut self, label: impl Into<String>, now: Instant) {
        self.active = Some((label.into(), now + self.duration));
    }

    /// The lit key, if its highlight has not expired at `now`
    pub fn current(&self, now: Instant) -> Option<&str> {
        match &self.active {
            Some((label, until)) if now < *until => Some(label.as_str()),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_expires() {
        let mut highlight = KeyHighlight::new(Duration::from_millis(150));
        let start = Instant::now();
        highlight.press("shift", start);

        assert_eq!(highlight.current(start), Some("shift"));
        assert_eq!(
            highlight.current(start + Duration::from_millis(149)),
            Some("shift")
        );
        assert_eq!(highlight.current(start + Duration::from_millis(150)), None);
    }

    #[test]
    fn test_new_press_replaces_old() {
        let mut highlight = KeyHighlight::new(Duration::from_millis(150));
        let start = Instant::now();
        highlight.press("a", start);
        highlight.press("b", start + Duration::from_millis(100));
        assert_eq!(
            highlight.current(start + Duration::from_millis(200)),
            Some("b")
        );
    }
}
