//! Message log
//!
//! Repeated messages stack into one entry with a count.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Categories for message filtering/coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageCategory {
    Combat,
    Item,
    System,
    Status,
    Warning,
    /// Speech from peaceful characters
    Dialogue,
}

/// A message to display in the game log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMessage {
    pub text: String,
    pub count: u32,
    pub category: MessageCategory,
}

impl GameMessage {
    /// Text with the stack count appended when repeated
    pub fn full_text(&self) -> String {
        if self.count > 1 {
            format!("{} (x{})", self.text, self.count)
        } else {
            self.text.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageLog {
    messages: VecDeque<GameMessage>,
    capacity: usize,
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Add a message, stacking it onto the last one if identical
    pub fn add(&mut self, text: impl Into<String>, category: MessageCategory) {
        let text = text.into();
        log::debug!("[{:?}] {}", category, text);
        if let Some(last) = self.messages.back_mut() {
            if last.text == text {
                last.count += 1;
                return;
            }
        }
        self.messages.push_back(GameMessage {
            text,
            count: 1,
            category,
        });
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
    }

    /// Add a message unless it is already the latest one
    pub fn add_unique(&mut self, text: impl Into<String>, category: MessageCategory) {
        let text = text.into();
        if self.messages.back().map_or(false, |m| m.text == text) {
            return;
        }
        self.add(text, category);
    }

    /// The latest `n` messages, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &GameMessage> {
        self.messages.iter().skip(self.messages.len().saturating_sub(n))
    }

    pub fn last(&self) -> Option<&GameMessage> {
        self.messages.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether any stored message has exactly this text
    pub fn contains(&self, text: &str) -> bool {
        self.messages.iter().any(|m| m.text == text)
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeats_stack() {
        let mut log = MessageLog::new(10);
        log.add("Blocked", MessageCategory::Warning);
        log.add("Blocked", MessageCategory::Warning);
        log.add("Blocked", MessageCategory::Warning);
        assert_eq!(log.len(), 1);
        assert_eq!(log.last().map(|m| m.full_text()), Some("Blocked (x3)".to_string()));
        log.add("Other", MessageCategory::System);
        log.add("Blocked", MessageCategory::Warning);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_unique_does_not_count() {
        let mut log = MessageLog::new(10);
        log.add_unique("Hello", MessageCategory::System);
        log.add_unique("Hello", MessageCategory::System);
        assert_eq!(log.last().map(|m| m.count), Some(1));
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut log = MessageLog::new(3);
        for i in 0..5 {
            log.add(format!("m{}", i), MessageCategory::System);
        }
        let texts: Vec<_> = log.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["m2", "m3", "m4"]);
        let recent: Vec<_> = log.recent(2).map(|m| m.text.as_str()).collect();
        assert_eq!(recent, vec!["m3", "m4"]);
    }
}
