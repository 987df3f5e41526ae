//! Current-record cursor.

use crate::types::Status;

/// Current-record position used by step and search operations.
///
/// `step_next` never checks the record count: it always advances and always
/// reports [`Status::Found`], exactly as the legacy call does. Reading the
/// record under an out-of-range cursor is what fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    position: usize,
}

impl Cursor {
    /// Creates a cursor at record 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { position: 0 }
    }

    /// Returns the current record index.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Moves to record 0; found only if the store has records.
    pub fn step_first(&mut self, record_count: usize) -> Status {
        self.position = 0;
        Status::from(record_count > 0)
    }

    /// Advances by one record without bounds checking.
    pub fn step_next(&mut self) -> Status {
        self.position = self.position.saturating_add(1);
        Status::Found
    }

    /// Positions the cursor on `index`.
    pub fn seek(&mut self, index: usize) {
        self.position = index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_first_on_empty_store() {
        let mut cursor = Cursor::new();
        cursor.seek(7);

        assert_eq!(cursor.step_first(0), Status::NotFound);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn step_first_on_populated_store() {
        let mut cursor = Cursor::new();
        cursor.seek(2);

        assert_eq!(cursor.step_first(3), Status::Found);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn step_next_is_unchecked() {
        let mut cursor = Cursor::new();
        cursor.step_first(1);

        for _ in 0..5 {
            assert_eq!(cursor.step_next(), Status::Found);
        }
        assert_eq!(cursor.position(), 5);
    }
}
