//! Core type definitions for isamdb.

use crate::error::{CoreError, CoreResult};
use serde::Serialize;
use std::fmt;

/// Handle to an open store.
///
/// Handles are allocated by the [`Engine`](crate::Engine) starting at 1 and
/// are never reused within one engine, so a stale handle can never alias a
/// newer store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct StoreHandle(pub u16);

impl StoreHandle {
    /// Creates a handle from its raw value.
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store:{:04X}", self.0)
    }
}

/// Outcome of a positioning operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    /// The cursor now points at a record.
    Found,
    /// Nothing matched; see each operation for what happens to the cursor.
    NotFound,
}

impl Status {
    /// Returns `true` for [`Status::Found`].
    #[must_use]
    pub const fn is_found(self) -> bool {
        matches!(self, Self::Found)
    }

    /// Returns the legacy result code (1 = found, 0 = not found).
    #[must_use]
    pub const fn as_code(self) -> u16 {
        match self {
            Self::Found => 1,
            Self::NotFound => 0,
        }
    }
}

impl From<bool> for Status {
    fn from(found: bool) -> Self {
        if found {
            Self::Found
        } else {
            Self::NotFound
        }
    }
}

/// Step operation selected by a legacy `stpopt` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOption {
    /// Reset the cursor to the first record.
    First,
    /// Advance the cursor by one record.
    Next,
}

impl StepOption {
    /// Legacy operation code for step-next.
    pub const NEXT_CODE: u16 = 24;
    /// Legacy operation code for step-first.
    pub const FIRST_CODE: u16 = 33;

    /// Decodes a legacy step option code.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownStepOption`] for any other code.
    pub fn from_code(code: u16) -> CoreResult<Self> {
        match code {
            Self::FIRST_CODE => Ok(Self::First),
            Self::NEXT_CODE => Ok(Self::Next),
            _ => Err(CoreError::UnknownStepOption { code }),
        }
    }

    /// Returns the legacy operation code.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::First => Self::FIRST_CODE,
            Self::Next => Self::NEXT_CODE,
        }
    }
}

/// Keyed lookup selected by a legacy `obtopt` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObtainOption {
    /// Position on the first record whose key equals the search key.
    GetEqual,
}

impl ObtainOption {
    /// Legacy operation code for get-equal.
    pub const GET_EQUAL_CODE: u16 = 5;

    /// Decodes a legacy obtain option code.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnsupportedObtainOption`] for codes other than
    /// get-equal.
    pub fn from_code(code: u16) -> CoreResult<Self> {
        match code {
            Self::GET_EQUAL_CODE => Ok(Self::GetEqual),
            _ => Err(CoreError::UnsupportedObtainOption { code }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(Status::Found.as_code(), 1);
        assert_eq!(Status::NotFound.as_code(), 0);
        assert_eq!(Status::from(true), Status::Found);
        assert!(!Status::from(false).is_found());
    }

    #[test]
    fn step_option_codes() {
        assert_eq!(StepOption::from_code(33).unwrap(), StepOption::First);
        assert_eq!(StepOption::from_code(24).unwrap(), StepOption::Next);
        assert_eq!(StepOption::First.code(), 33);
        assert!(matches!(
            StepOption::from_code(35),
            Err(CoreError::UnknownStepOption { code: 35 })
        ));
    }

    #[test]
    fn obtain_option_codes() {
        assert_eq!(ObtainOption::from_code(5).unwrap(), ObtainOption::GetEqual);
        assert!(matches!(
            ObtainOption::from_code(12),
            Err(CoreError::UnsupportedObtainOption { code: 12 })
        ));
    }

    #[test]
    fn handle_display() {
        assert_eq!(StoreHandle::new(0x2A).to_string(), "store:002A");
    }
}
