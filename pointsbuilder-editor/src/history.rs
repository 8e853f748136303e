//! Undo/redo by whole-tree snapshots.
//!
//! Every edit records the state it replaces. The undo stack is bounded;
//! once full, the oldest snapshot is evicted. Recording a new edit clears
//! the redo stack.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

fn default_max_depth() -> usize {
    64
}

/// History settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Most undo steps kept. `0` disables history.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
}

/// Bounded snapshot stacks.
#[derive(Clone, Debug)]
pub struct History<T> {
    undo: VecDeque<T>,
    redo: Vec<T>,
    config: HistoryConfig,
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<T: Clone> History<T> {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Record the state an edit is about to replace.
    pub fn record(&mut self, before: T) {
        self.push_undo(before);
        self.redo.clear();
    }

    fn push_undo(&mut self, state: T) {
        if self.config.max_depth == 0 {
            return;
        }
        self.undo.push_back(state);
        while self.undo.len() > self.config.max_depth {
            self.undo.pop_front();
        }
    }

    /// Step back: returns the previous state and remembers `current` for
    /// redo.
    pub fn undo(&mut self, current: &T) -> Result<T, HistoryError> {
        let previous = self.undo.pop_back().ok_or(HistoryError::NothingToUndo)?;
        self.redo.push(current.clone());
        Ok(previous)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: &T) -> Result<T, HistoryError> {
        let next = self.redo.pop().ok_or(HistoryError::NothingToRedo)?;
        self.push_undo(current.clone());
        Ok(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo() {
        let mut history = History::default();
        let mut state = 1;
        history.record(state);
        state = 2;
        history.record(state);
        state = 3;

        state = history.undo(&state).unwrap();
        assert_eq!(state, 2);
        state = history.undo(&state).unwrap();
        assert_eq!(state, 1);
        assert_eq!(history.undo(&state), Err(HistoryError::NothingToUndo));

        state = history.redo(&state).unwrap();
        assert_eq!(state, 2);
        state = history.redo(&state).unwrap();
        assert_eq!(state, 3);
        assert_eq!(history.redo(&state), Err(HistoryError::NothingToRedo));
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut history = History::default();
        history.record("a");
        let state = history.undo(&"b").unwrap();
        assert!(history.can_redo());
        history.record(state);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_oldest_evicted() {
        let mut history = History::new(HistoryConfig { max_depth: 3 });
        for i in 0..10 {
            history.record(i);
        }
        assert_eq!(history.undo_len(), 3);
        let mut state = 10;
        for expected in [9, 8, 7] {
            state = history.undo(&state).unwrap();
            assert_eq!(state, expected);
        }
        assert!(!history.can_undo());
    }

    #[test]
    fn test_zero_depth_disables() {
        let mut history = History::new(HistoryConfig { max_depth: 0 });
        history.record(1);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_config_default_depth() {
        let config: HistoryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_depth, 64);
    }
}
