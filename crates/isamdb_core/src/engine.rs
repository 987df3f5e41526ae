//! Engine facade used by the execution environment.

use crate::config::Config;
use crate::context::CurrentStore;
use crate::error::{CoreError, CoreResult};
use crate::store::Store;
use crate::types::{ObtainOption, Status, StepOption, StoreHandle};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Owner of every open store, addressed by [`StoreHandle`].
///
/// All operations run to completion on the caller's thread. A store is
/// driven by one session at a time, so the engine holds no locks; the
/// session's [`CurrentStore`] is passed in wherever the legacy call relies
/// on the current store.
///
/// # Example
///
/// ```rust
/// use isamdb_core::{Config, CurrentStore, Engine, Status};
///
/// let dir = tempfile::tempdir().unwrap();
/// let mut engine = Engine::new(Config::default());
/// let mut ctx = CurrentStore::new();
///
/// let handle = engine.open(&mut ctx, "MISSING.DAT", Some(dir.path()), 4).unwrap();
/// engine.update(handle, b"AAAA").unwrap();
///
/// let mut record = Vec::new();
/// assert_eq!(engine.step_first(handle, &mut record).unwrap(), Status::Found);
/// assert_eq!(record, b"AAAA");
/// ```
#[derive(Debug)]
pub struct Engine {
    config: Config,
    stores: BTreeMap<StoreHandle, Store>,
    next_handle: u16,
}

impl Engine {
    /// Creates an engine with no open store.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            stores: BTreeMap::new(),
            next_handle: 1,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Opens a store and makes it the session's current store.
    ///
    /// # Errors
    ///
    /// See [`Store::open`]; additionally [`CoreError::HandlesExhausted`]
    /// once every 16-bit handle has been used.
    pub fn open(
        &mut self,
        ctx: &mut CurrentStore,
        file_name: &str,
        base_path: Option<&Path>,
        record_length: u16,
    ) -> CoreResult<StoreHandle> {
        if self.next_handle == 0 {
            return Err(CoreError::HandlesExhausted);
        }

        let store = Store::open(file_name, base_path, record_length, &self.config)?;
        let handle = StoreHandle::new(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);

        info!(
            file = file_name,
            handle = %handle,
            records = store.record_count(),
            "opened store"
        );
        self.stores.insert(handle, store);
        ctx.activate(handle);
        Ok(handle)
    }

    /// Closes a store, returning it, and clears it from the context.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownHandle`] if the handle is not open.
    pub fn close(&mut self, ctx: &mut CurrentStore, handle: StoreHandle) -> CoreResult<Store> {
        let store = self
            .stores
            .remove(&handle)
            .ok_or(CoreError::UnknownHandle {
                handle: handle.as_u16(),
            })?;
        ctx.forget(handle);
        debug!(file = store.name(), handle = %handle, "closed store");
        Ok(store)
    }

    /// Returns an open store.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownHandle`] if the handle is not open.
    pub fn store(&self, handle: StoreHandle) -> CoreResult<&Store> {
        self.stores.get(&handle).ok_or(CoreError::UnknownHandle {
            handle: handle.as_u16(),
        })
    }

    /// Returns an open store mutably.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownHandle`] if the handle is not open.
    pub fn store_mut(&mut self, handle: StoreHandle) -> CoreResult<&mut Store> {
        self.stores.get_mut(&handle).ok_or(CoreError::UnknownHandle {
            handle: handle.as_u16(),
        })
    }

    /// Iterates over open stores in handle order.
    pub fn stores(&self) -> impl Iterator<Item = (StoreHandle, &Store)> {
        self.stores.iter().map(|(handle, store)| (*handle, store))
    }

    /// Makes `handle` the session's current store.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownHandle`] if the handle is not open; the
    /// context is left untouched.
    pub fn set_current(&self, ctx: &mut CurrentStore, handle: StoreHandle) -> CoreResult<()> {
        self.store(handle)?;
        ctx.set_current(handle);
        Ok(())
    }

    /// Makes the previous store current again.
    pub fn restore_previous(&self, ctx: &mut CurrentStore) {
        ctx.restore_previous();
    }

    /// Returns the session's current store handle.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NoCurrentStore`] if none was set
    /// - [`CoreError::UnknownHandle`] if it has been closed
    pub fn current(&self, ctx: &CurrentStore) -> CoreResult<StoreHandle> {
        let handle = ctx.active().ok_or(CoreError::NoCurrentStore)?;
        self.store(handle)?;
        Ok(handle)
    }

    /// Steps to the first record, copying it into `dest` when found.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownHandle`] if the handle is not open.
    pub fn step_first(&mut self, handle: StoreHandle, dest: &mut Vec<u8>) -> CoreResult<Status> {
        self.step(handle, StepOption::First, dest)
    }

    /// Steps to the next record, copying it into `dest`.
    ///
    /// Always reports [`Status::Found`]. Stepping past the last record still
    /// advances the cursor, but the copy then fails with
    /// [`CoreError::IndexOutOfRange`].
    ///
    /// # Errors
    ///
    /// - [`CoreError::UnknownHandle`] if the handle is not open
    /// - [`CoreError::IndexOutOfRange`] if the cursor moved past the end
    pub fn step_next(&mut self, handle: StoreHandle, dest: &mut Vec<u8>) -> CoreResult<Status> {
        self.step(handle, StepOption::Next, dest)
    }

    /// Runs a step operation.
    ///
    /// # Errors
    ///
    /// See [`Engine::step_first`] and [`Engine::step_next`].
    pub fn step(
        &mut self,
        handle: StoreHandle,
        option: StepOption,
        dest: &mut Vec<u8>,
    ) -> CoreResult<Status> {
        let store = self.store_mut(handle)?;
        let status = match option {
            StepOption::First => store.step_first(),
            StepOption::Next => store.step_next(),
        };

        if status.is_found() {
            copy_into(dest, store.current_record()?);
        }

        debug!(
            handle = %handle,
            ?option,
            position = store.position(),
            code = status.as_code(),
            "step"
        );
        Ok(status)
    }

    /// Inserts a record at the cursor position.
    ///
    /// # Errors
    ///
    /// - [`CoreError::UnknownHandle`] if the handle is not open
    /// - [`CoreError::LengthMismatch`] if `record` has the wrong length
    /// - [`CoreError::IndexOutOfRange`] if the cursor is past the end
    pub fn insert(&mut self, handle: StoreHandle, record: &[u8]) -> CoreResult<()> {
        let store = self.store_mut(handle)?;
        store.insert_current(record.to_vec())?;
        debug!(
            handle = %handle,
            position = store.position(),
            bytes = record.len(),
            "inserted record"
        );
        Ok(())
    }

    /// Overwrites the record at the cursor position.
    ///
    /// # Errors
    ///
    /// - [`CoreError::UnknownHandle`] if the handle is not open
    /// - [`CoreError::LengthMismatch`] if `record` has the wrong length
    /// - [`CoreError::IndexOutOfRange`] if there is no record at the cursor
    pub fn update(&mut self, handle: StoreHandle, record: &[u8]) -> CoreResult<()> {
        let store = self.store_mut(handle)?;
        store.update_current(record.to_vec())?;
        debug!(
            handle = %handle,
            position = store.position(),
            bytes = record.len(),
            "updated record"
        );
        Ok(())
    }

    /// Positions on the first record starting with `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownHandle`] if the handle is not open.
    pub fn get_by_key(&mut self, handle: StoreHandle, key: &[u8]) -> CoreResult<Status> {
        let store = self.store_mut(handle)?;
        let status = store.get_record_by_key(key);
        debug!(handle = %handle, position = store.position(), ?status, "get by key");
        Ok(status)
    }

    /// Runs a keyed lookup, copying the record into `dest` when found.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownHandle`] if the handle is not open.
    pub fn obtain(
        &mut self,
        handle: StoreHandle,
        key: &[u8],
        key_number: u16,
        option: ObtainOption,
        dest: &mut Vec<u8>,
    ) -> CoreResult<Status> {
        let store = self.store_mut(handle)?;
        let status = match option {
            ObtainOption::GetEqual => store.get_equal(key_number, key),
        };

        if status.is_found() {
            copy_into(dest, store.current_record()?);
        }

        debug!(handle = %handle, key_number, position = store.position(), ?status, "obtain");
        Ok(status)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn copy_into(dest: &mut Vec<u8>, record: &[u8]) {
    dest.clear();
    dest.extend_from_slice(record);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn engine_in_tempdir() -> (Engine, TempDir) {
        let dir = tempdir().unwrap();
        let engine = Engine::new(Config::new().base_path(dir.path()));
        (engine, dir)
    }

    #[test]
    fn open_allocates_handles_and_sets_current() {
        let (mut engine, _dir) = engine_in_tempdir();
        let mut ctx = CurrentStore::new();

        let a = engine.open(&mut ctx, "A.DAT", None, 4).unwrap();
        let b = engine.open(&mut ctx, "B.DAT", None, 8).unwrap();

        assert_eq!(a, StoreHandle::new(1));
        assert_eq!(b, StoreHandle::new(2));
        assert_eq!(engine.current(&ctx).unwrap(), b);
        assert_eq!(ctx.previous(), None);
        assert_eq!(engine.store(b).unwrap().record_length(), 8);
    }

    #[test]
    fn unknown_handle_is_rejected() {
        let mut engine = Engine::default();
        let mut ctx = CurrentStore::new();
        let mut dest = Vec::new();

        let bogus = StoreHandle::new(42);
        assert!(matches!(
            engine.step_first(bogus, &mut dest),
            Err(CoreError::UnknownHandle { handle: 42 })
        ));
        assert!(engine.set_current(&mut ctx, bogus).is_err());
        assert_eq!(ctx.active(), None);
    }

    #[test]
    fn current_requires_a_store() {
        let engine = Engine::default();
        let ctx = CurrentStore::new();
        assert!(matches!(engine.current(&ctx), Err(CoreError::NoCurrentStore)));
    }

    #[test]
    fn step_copies_records() {
        let (mut engine, _dir) = engine_in_tempdir();
        let mut ctx = CurrentStore::new();
        let handle = engine.open(&mut ctx, "S.DAT", None, 4).unwrap();

        let mut dest = b"junk".to_vec();
        assert_eq!(engine.step_first(handle, &mut dest).unwrap(), Status::NotFound);
        assert_eq!(dest, b"junk");

        engine.update(handle, b"AAAA").unwrap();
        engine.store_mut(handle).unwrap().insert(1, b"BBBB".to_vec()).unwrap();

        assert_eq!(engine.step_first(handle, &mut dest).unwrap(), Status::Found);
        assert_eq!(dest, b"AAAA");
        assert_eq!(engine.step_next(handle, &mut dest).unwrap(), Status::Found);
        assert_eq!(dest, b"BBBB");
    }

    #[test]
    fn step_next_past_end_surfaces_index_error() {
        let (mut engine, _dir) = engine_in_tempdir();
        let mut ctx = CurrentStore::new();
        let handle = engine.open(&mut ctx, "S.DAT", None, 4).unwrap();
        engine.update(handle, b"AAAA").unwrap();

        let mut dest = Vec::new();
        engine.step_first(handle, &mut dest).unwrap();
        let result = engine.step_next(handle, &mut dest);

        assert!(matches!(result, Err(CoreError::IndexOutOfRange { index: 1, .. })));
        assert_eq!(engine.store(handle).unwrap().position(), 1);
    }

    #[test]
    fn step_option_codes_dispatch() {
        let (mut engine, _dir) = engine_in_tempdir();
        let mut ctx = CurrentStore::new();
        let handle = engine.open(&mut ctx, "S.DAT", None, 2).unwrap();
        engine.update(handle, b"OK").unwrap();

        let mut dest = Vec::new();
        let option = StepOption::from_code(33).unwrap();
        assert_eq!(engine.step(handle, option, &mut dest).unwrap(), Status::Found);
        assert_eq!(dest, b"OK");
    }

    #[test]
    fn insert_and_update_reject_wrong_length() {
        let (mut engine, _dir) = engine_in_tempdir();
        let mut ctx = CurrentStore::new();
        let handle = engine.open(&mut ctx, "S.DAT", None, 4).unwrap();

        assert!(matches!(
            engine.insert(handle, b"ABC"),
            Err(CoreError::LengthMismatch { expected: 4, actual: 3 })
        ));
        assert!(matches!(
            engine.update(handle, b"ABCDE"),
            Err(CoreError::LengthMismatch { expected: 4, actual: 5 })
        ));
        assert_eq!(engine.store(handle).unwrap().record_count(), 0);
    }

    #[test]
    fn get_by_key_and_obtain() {
        let (mut engine, _dir) = engine_in_tempdir();
        let mut ctx = CurrentStore::new();
        let handle = engine.open(&mut ctx, "K.DAT", None, 4).unwrap();
        engine.insert(handle, b"BBBB").unwrap();
        engine.insert(handle, b"AAAA").unwrap();

        assert_eq!(engine.get_by_key(handle, b"BB").unwrap(), Status::Found);
        assert_eq!(engine.store(handle).unwrap().position(), 1);

        let mut dest = Vec::new();
        let status = engine
            .obtain(handle, b"AAAA", 0, ObtainOption::GetEqual, &mut dest)
            .unwrap();
        assert_eq!(status, Status::Found);
        assert_eq!(dest, b"AAAA");
        assert_eq!(engine.store(handle).unwrap().position(), 0);

        dest.clear();
        let status = engine
            .obtain(handle, b"ZZZZ", 0, ObtainOption::GetEqual, &mut dest)
            .unwrap();
        assert_eq!(status, Status::NotFound);
        assert!(dest.is_empty());
    }

    #[test]
    fn set_and_restore_current() {
        let (mut engine, _dir) = engine_in_tempdir();
        let mut ctx = CurrentStore::new();
        let a = engine.open(&mut ctx, "A.DAT", None, 4).unwrap();
        let b = engine.open(&mut ctx, "B.DAT", None, 4).unwrap();

        engine.set_current(&mut ctx, a).unwrap();
        assert_eq!(ctx.previous(), Some(b));

        engine.restore_previous(&mut ctx);
        assert_eq!(engine.current(&ctx).unwrap(), b);
        engine.restore_previous(&mut ctx);
        assert_eq!(engine.current(&ctx).unwrap(), b);
    }

    #[test]
    fn close_forgets_handle() {
        let (mut engine, _dir) = engine_in_tempdir();
        let mut ctx = CurrentStore::new();
        let a = engine.open(&mut ctx, "A.DAT", None, 4).unwrap();

        let store = engine.close(&mut ctx, a).unwrap();
        assert_eq!(store.name(), "A.DAT");
        assert_eq!(ctx.active(), None);
        assert!(engine.store(a).is_err());

        let b = engine.open(&mut ctx, "A.DAT", None, 4).unwrap();
        assert_ne!(a, b);
    }
}
