//! Cross-crate integration test helpers.
//!
//! Provides a harness that runs engine operations against a reference
//! model of the store and checks they agree.

use crate::fixtures::TestEngine;
use crate::generators::StoreOperation;
use isamdb_core::{CoreError, Status, StoreHandle};

/// Runs engine operations alongside a plain vector model.
pub struct IntegrationHarness {
    /// The engine environment.
    pub env: TestEngine,
    /// The store under test.
    pub handle: StoreHandle,
    record_length: usize,
    model: Vec<Vec<u8>>,
    position: usize,
}

impl IntegrationHarness {
    /// Opens an empty store of `record_length`-byte records.
    pub fn new(record_length: u16) -> Self {
        let mut env = TestEngine::new();
        let handle = env.open("HARNESS.DAT", record_length);

        Self {
            env,
            handle,
            record_length: usize::from(record_length),
            model: Vec::new(),
            position: 0,
        }
    }

    /// Returns the records the model expects.
    pub fn expected(&self) -> &[Vec<u8>] {
        &self.model
    }

    /// Applies `op` to both the engine and the model, panicking on any
    /// disagreement.
    pub fn apply(&mut self, op: &StoreOperation) {
        match op {
            StoreOperation::Insert { data } => self.insert(data),
            StoreOperation::Update { data } => self.update(data),
            StoreOperation::StepFirst => self.step_first(),
            StoreOperation::StepNext => self.step_next(),
            StoreOperation::GetByKey { key } => self.get_by_key(key),
        }
    }

    /// Checks every record, the record count and the cursor.
    pub fn verify(&self) {
        let store = self.env.store(self.handle).expect("Store should be open");

        assert_eq!(
            usize::from(store.record_count()),
            self.model.len(),
            "Record count mismatch"
        );
        assert_eq!(store.position(), self.position, "Cursor mismatch");
        for (i, expected) in self.model.iter().enumerate() {
            assert_eq!(
                store.get_record(i).expect("Record should exist"),
                expected.as_slice(),
                "Record {} mismatch",
                i
            );
        }
    }

    fn insert(&mut self, data: &[u8]) {
        let result = self.env.engine.insert(self.handle, data);

        if data.len() != self.record_length {
            assert!(matches!(result, Err(CoreError::LengthMismatch { .. })));
        } else if self.position > self.model.len() {
            assert!(matches!(result, Err(CoreError::IndexOutOfRange { .. })));
        } else {
            result.expect("Insert should succeed");
            self.model.insert(self.position, data.to_vec());
        }
    }

    fn update(&mut self, data: &[u8]) {
        let result = self.env.engine.update(self.handle, data);

        if data.len() != self.record_length {
            assert!(matches!(result, Err(CoreError::LengthMismatch { .. })));
        } else if self.model.is_empty() && self.position == 0 {
            result.expect("Bootstrap update should succeed");
            self.model.push(data.to_vec());
        } else if self.position < self.model.len() {
            result.expect("Update should succeed");
            self.model[self.position] = data.to_vec();
        } else {
            assert!(matches!(result, Err(CoreError::IndexOutOfRange { .. })));
        }
    }

    fn step_first(&mut self) {
        let mut dest = Vec::new();
        let status = self
            .env
            .engine
            .step_first(self.handle, &mut dest)
            .expect("Step first should succeed");
        self.position = 0;

        match self.model.first() {
            Some(first) => {
                assert_eq!(status, Status::Found);
                assert_eq!(&dest, first);
            }
            None => {
                assert_eq!(status, Status::NotFound);
                assert!(dest.is_empty());
            }
        }
    }

    fn step_next(&mut self) {
        let mut dest = Vec::new();
        let result = self.env.engine.step_next(self.handle, &mut dest);
        self.position += 1;

        match self.model.get(self.position) {
            Some(record) => {
                assert_eq!(result.expect("Step next should succeed"), Status::Found);
                assert_eq!(&dest, record);
            }
            None => {
                assert!(matches!(result, Err(CoreError::IndexOutOfRange { .. })));
            }
        }
    }

    fn get_by_key(&mut self, key: &[u8]) {
        let status = self
            .env
            .engine
            .get_by_key(self.handle, key)
            .expect("Get by key should succeed");

        match self.model.iter().position(|r| r.starts_with(key)) {
            Some(index) => {
                assert_eq!(status, Status::Found);
                self.position = index;
            }
            None => assert_eq!(status, Status::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{scenarios, LegacyImage};
    use crate::generators::{operation_sequence_strategy, PropTestConfig};
    use isamdb_core::header::RECORD_DATA_OFFSET;
    use isamdb_core::{Config, Engine, ObtainOption, StepOption};
    use isamdb_storage::{FileBackend, StorageBackend};
    use proptest::prelude::*;

    #[test]
    fn missing_file_opens_empty() {
        let mut env = TestEngine::new();
        let handle = env.open("NOFILE.DAT", 128);
        let store = env.store(handle).unwrap();

        assert_eq!(store.record_count(), 0);
        assert_eq!(store.record_length(), 128);
        assert_eq!(store.physical_record_length(), 128);
        assert!(!store.header().is_buffered());
    }

    #[test]
    fn missing_file_without_create_fails() {
        let mut env = TestEngine::with_config(Config::new().create_if_missing(false));
        let mut ctx = env.ctx;
        let result = env.engine.open(&mut ctx, "NOFILE.DAT", None, 128);

        assert!(matches!(result, Err(CoreError::StoreNotFound { .. })));
        assert_eq!(ctx.active(), None);
    }

    #[test]
    fn search_positions_on_first_match() {
        let mut env = TestEngine::new();
        env.write_file(
            "SEARCH.DAT",
            &LegacyImage::new(4).records([b"AAAA", b"BBBB", b"BBBB"]).build(),
        );
        let handle = env.open("SEARCH.DAT", 4);

        assert_eq!(env.get_by_key(handle, b"BBBB").unwrap(), Status::Found);
        assert_eq!(env.store(handle).unwrap().position(), 1);

        assert_eq!(env.get_by_key(handle, b"ZZZZ").unwrap(), Status::NotFound);
        assert_eq!(env.store(handle).unwrap().position(), 1);
    }

    #[test]
    fn legacy_option_codes_drive_the_engine() {
        let (mut env, handle) = scenarios::opened_store("CODES.DAT", 4, 3);
        let mut dest = Vec::new();

        let first = StepOption::from_code(33).unwrap();
        let next = StepOption::from_code(24).unwrap();
        assert_eq!(env.step(handle, first, &mut dest).unwrap(), Status::Found);
        assert_eq!(dest, b"AAAA");
        assert_eq!(env.step(handle, next, &mut dest).unwrap(), Status::Found);
        assert_eq!(dest, b"BBBB");

        let get_equal = ObtainOption::from_code(5).unwrap();
        let status = env
            .obtain(handle, b"CC", 0, get_equal, &mut dest)
            .unwrap();
        assert_eq!(status, Status::Found);
        assert_eq!(dest, b"CCCC");

        assert!(StepOption::from_code(1).is_err());
        assert!(ObtainOption::from_code(6).is_err());
    }

    #[test]
    fn set_and_restore_across_stores() {
        let mut env = TestEngine::new();
        env.write_file("A.DAT", &scenarios::lettered_image(4, 1));
        env.write_file("B.DAT", &scenarios::lettered_image(4, 2));
        let a = env.open("A.DAT", 4);
        let b = env.open("B.DAT", 4);

        let mut ctx = env.ctx;
        env.engine.set_current(&mut ctx, a).unwrap();
        env.engine.set_current(&mut ctx, b).unwrap();
        assert_eq!(env.engine.current(&ctx).unwrap(), b);

        env.engine.restore_previous(&mut ctx);
        assert_eq!(env.engine.current(&ctx).unwrap(), a);
        env.engine.restore_previous(&mut ctx);
        assert_eq!(env.engine.current(&ctx).unwrap(), a);
    }

    #[test]
    fn exported_image_reopens_with_changes() {
        let mut env = TestEngine::new();
        env.write_file(
            "ORIG.DAT",
            &LegacyImage::new(4).key_count(1).records([b"AAAA"]).build(),
        );
        let handle = env.open("ORIG.DAT", 4);

        let mut dest = Vec::new();
        env.step_first(handle, &mut dest).unwrap();
        env.insert(handle, b"ZZZZ").unwrap();

        let image = env.store(handle).unwrap().to_image();
        assert_eq!(image.len(), RECORD_DATA_OFFSET + 8);

        let copy = env.path("COPY.DAT");
        let mut backend = FileBackend::create(&copy).unwrap();
        backend.append(&image).unwrap();
        backend.flush().unwrap();

        let mut engine = Engine::new(Config::new().base_path(env.dir()));
        let mut ctx = isamdb_core::CurrentStore::new();
        let reopened = engine.open(&mut ctx, "COPY.DAT", None, 4).unwrap();
        let store = engine.store(reopened).unwrap();

        assert_eq!(store.record_count(), 2);
        assert_eq!(store.key_count(), 1);
        assert_eq!(store.get_record(0).unwrap(), b"ZZZZ");
        assert_eq!(store.get_record(1).unwrap(), b"AAAA");
    }

    #[test]
    fn harness_tracks_simple_sequence() {
        let mut harness = IntegrationHarness::new(4);
        let ops = [
            StoreOperation::Update {
                data: b"AAAA".to_vec(),
            },
            StoreOperation::Insert {
                data: b"BBBB".to_vec(),
            },
            StoreOperation::StepNext,
            StoreOperation::StepNext,
            StoreOperation::GetByKey { key: b"AA".to_vec() },
            StoreOperation::Update {
                data: b"CCCC".to_vec(),
            },
            StoreOperation::Update {
                data: b"ZZ".to_vec(),
            },
            StoreOperation::StepFirst,
            StoreOperation::Update {
                data: b"ZZZZZZ".to_vec(),
            },
        ];
        for op in &ops {
            harness.apply(op);
        }
        harness.verify();

        assert_eq!(harness.expected(), &[b"BBBB".to_vec(), b"CCCC".to_vec()]);
    }

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn engine_matches_model(ops in operation_sequence_strategy(4, 1, 40)) {
            let mut harness = IntegrationHarness::new(4);
            for op in &ops {
                harness.apply(op);
            }
            harness.verify();
        }
    }
}
