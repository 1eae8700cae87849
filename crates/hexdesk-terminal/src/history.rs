//! Line history with up/down recall.

use std::collections::VecDeque;

/// Maximum number of history entries to retain.
pub const MAX_HISTORY: usize = 100;

#[derive(Debug, Clone, Default)]
pub struct History {
    entries: VecDeque<String>,
    /// Index of the recalled entry; `None` while editing a fresh line.
    cursor: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entered line. Blank lines and repeats of the last entry are
    /// dropped. Resets recall.
    pub fn push(&mut self, line: &str) {
        self.cursor = None;
        let line = line.trim();
        if line.is_empty() || self.entries.back().is_some_and(|last| last == line) {
            return;
        }
        self.entries.push_back(line.to_string());
        if self.entries.len() > MAX_HISTORY {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Step back to an older entry. Stays on the oldest once reached.
    pub fn older(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let idx = match self.cursor {
            None => self.entries.len() - 1,
            Some(i) => i.saturating_sub(1),
        };
        self.cursor = Some(idx);
        self.entries.get(idx).map(String::as_str)
    }

    /// Step forward to a newer entry. Returns `None` when recall runs past
    /// the newest entry, which means an empty input line.
    pub fn newer(&mut self) -> Option<&str> {
        let idx = self.cursor? + 1;
        if idx >= self.entries.len() {
            self.cursor = None;
            return None;
        }
        self.cursor = Some(idx);
        self.entries.get(idx).map(String::as_str)
    }
}
