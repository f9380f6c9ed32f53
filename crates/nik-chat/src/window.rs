//! Bounded trailing window of conversation turns.

use std::collections::VecDeque;

use nik_core::types::Turn;

/// The most recent turns, oldest first. Never holds more than `capacity`.
#[derive(Debug, Clone)]
pub struct ConversationWindow {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl ConversationWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Window seeded from saved history, keeping only the newest turns.
    pub fn from_turns(capacity: usize, turns: impl IntoIterator<Item = Turn>) -> Self {
        let mut window = Self::new(capacity);
        for turn in turns {
            window.push(turn);
        }
        window
    }

    /// Append a turn, dropping the oldest ones beyond capacity.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// One `label: text` line per turn.
    pub fn render(&self, bot_name: &str) -> String {
        self.turns
            .iter()
            .map(|t| t.render(bot_name))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_vec(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }
}
