//! Bounded conversation memory.
//!
//! Keeps the most recent exchanges in arrival order and forgets the rest.
//! Capacity counts *exchanges* (a user turn plus its assistant reply), so a
//! window of 5 holds at most 10 turns. Not thread-safe on its own — the
//! orchestrator guards it with a mutex.

use std::collections::VecDeque;

use confab_core::Turn;

/// A FIFO window over the most recent conversational turns.
#[derive(Debug)]
pub struct WindowMemory {
    turns: VecDeque<Turn>,
    max_turns: usize,
}

impl WindowMemory {
    /// Create a memory holding the last `window` exchanges.
    pub fn new(window: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(window * 2),
            max_turns: window * 2,
        }
    }

    /// Append a turn, evicting the oldest turns once the window is full.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
        }
    }

    /// The retained turns, oldest first.
    pub fn window(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    /// Number of retained turns (not exchanges).
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
