//! Current-store selection.

use crate::types::StoreHandle;
use tracing::debug;

/// The active store handle plus a single "previous" slot.
///
/// Legacy modules switch stores with a set/restore pair. There is exactly
/// one level of undo: restoring twice without an intervening
/// [`set_current`](Self::set_current) lands on the same store both times.
///
/// The context belongs to the caller (one per session) and is passed to the
/// [`Engine`](crate::Engine) explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurrentStore {
    active: Option<StoreHandle>,
    previous: Option<StoreHandle>,
}

impl CurrentStore {
    /// Creates a context with no store selected.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            active: None,
            previous: None,
        }
    }

    /// Returns the active handle.
    #[must_use]
    pub const fn active(&self) -> Option<StoreHandle> {
        self.active
    }

    /// Returns the previous handle.
    #[must_use]
    pub const fn previous(&self) -> Option<StoreHandle> {
        self.previous
    }

    /// Makes `handle` active, remembering the old active handle.
    pub fn set_current(&mut self, handle: StoreHandle) {
        if let Some(active) = self.active {
            self.previous = Some(active);
        }
        self.active = Some(handle);
        debug!(active = %handle, previous = ?self.previous, "set current store");
    }

    /// Makes the previous handle active again.
    ///
    /// Does nothing when there is no previous handle.
    pub fn restore_previous(&mut self) {
        match self.previous {
            Some(previous) => {
                self.active = Some(previous);
                debug!(active = %previous, "restored previous store");
            }
            None => debug!("no previous store, ignoring restore"),
        }
    }

    /// Activates a freshly opened store without touching the previous slot.
    pub(crate) fn activate(&mut self, handle: StoreHandle) {
        self.active = Some(handle);
    }

    /// Drops every reference to `handle`.
    pub(crate) fn forget(&mut self, handle: StoreHandle) {
        if self.active == Some(handle) {
            self.active = None;
        }
        if self.previous == Some(handle) {
            self.previous = None;
        }
    }
}
