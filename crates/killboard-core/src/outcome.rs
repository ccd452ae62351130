//! Accumulator for batch operations that keep going past per-item failures.

use std::fmt::Display;

use serde::Serialize;

/// An item a batch could not apply, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    /// Identifier of the item (event id, player id).
    pub item: String,
    /// Error text from the failed operation.
    pub reason: String,
}

/// What a batch did: items applied, items left alone, items skipped on error.
///
/// Nothing is rolled back. A batch that skipped items still commits the
/// items it applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome<T> {
    applied: Vec<T>,
    unchanged: usize,
    skipped: Vec<Skipped>,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            applied: Vec::new(),
            unchanged: 0,
            skipped: Vec::new(),
        }
    }
}

impl<T> BatchOutcome<T> {
    /// An empty outcome.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an applied item.
    pub fn applied(&mut self, item: T) {
        self.applied.push(item);
    }

    /// Record an item that needed no change.
    pub const fn unchanged(&mut self) {
        self.unchanged = self.unchanged.saturating_add(1);
    }

    /// Record an item that failed with `reason`.
    pub fn skipped(&mut self, item: impl Display, reason: &impl Display) {
        self.skipped.push(Skipped {
            item: item.to_string(),
            reason: reason.to_string(),
        });
    }

    /// Items applied, in order.
    pub fn applied_items(&self) -> &[T] {
        &self.applied
    }

    /// Number of items applied.
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    /// Number of items that needed no change.
    pub const fn unchanged_count(&self) -> usize {
        self.unchanged
    }

    /// Items that failed.
    pub fn skipped_items(&self) -> &[Skipped] {
        &self.skipped
    }

    /// Whether every item either applied or needed no change.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_each_bucket() {
        let mut outcome = BatchOutcome::new();
        outcome.applied("a");
        outcome.unchanged();
        outcome.skipped("b", &"connection reset");

        assert_eq!(outcome.applied_items(), ["a"]);
        assert_eq!(outcome.unchanged_count(), 1);
        assert_eq!(outcome.skipped_items().len(), 1);
        assert!(!outcome.is_clean());
        assert_eq!(
            outcome.skipped_items().first().map(|s| s.reason.as_str()),
            Some("connection reset")
        );
    }
}
