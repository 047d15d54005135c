//! Auto-type playback producer
//!
//! Holds the completion text and hands out one character per tick. The
//! engine applies each character through the same transition function as
//! manual keys.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playback {
    source: Vec<char>,
    index: usize,
}

impl Playback {
    /// Returns `None` for an empty source: there is nothing to play
    pub fn new(source: &str) -> Option<Self> {
        if source.is_empty() {
            return None;
        }
        Some(Self {
            source: source.chars().collect(),
            index: 0,
        })
    }

    /// Characters emitted so far
    pub fn emitted(&self) -> usize {
        self.index
    }

    /// Total characters in the source
    pub fn total(&self) -> usize {
        self.source.len()
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.source.len()
    }
}

impl Iterator for Playback {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        let c = self.source.get(self.index).copied()?;
        self.index += 1;
        Some(c)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.source.len() - self.index;
        (remaining, Some(remaining))
    }
}
