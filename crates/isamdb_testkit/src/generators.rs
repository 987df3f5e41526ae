//! Property-based test generators using proptest.
//!
//! Provides strategies for fixed-length records and engine operation
//! sequences.

use proptest::prelude::*;

/// Strategy for a record of exactly `len` arbitrary bytes.
pub fn record_strategy(len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), len)
}

/// Strategy for a record of `len` bytes drawn from a small alphabet.
///
/// Small alphabets make prefix searches hit often.
pub fn lettered_record_strategy(len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(b"ABC".to_vec()), len)
}

/// Strategy for up to `max` records of `len` bytes.
pub fn records_strategy(len: usize, max: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(record_strategy(len), 0..max)
}

/// Strategy for a byte buffer whose length differs from `len`.
pub fn wrong_length_strategy(len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..len * 2 + 2).prop_filter(
        "length must differ from the record length",
        move |data| data.len() != len,
    )
}

/// An engine operation against the current store.
#[derive(Debug, Clone)]
pub enum StoreOperation {
    /// Insert a record at the cursor
    Insert {
        /// Record data
        data: Vec<u8>,
    },
    /// Overwrite the record at the cursor
    Update {
        /// Record data
        data: Vec<u8>,
    },
    /// Step to the first record
    StepFirst,
    /// Step to the next record
    StepNext,
    /// Position on the first record starting with a key
    GetByKey {
        /// Leading key bytes
        key: Vec<u8>,
    },
}

/// Strategy for generating store operations on `len`-byte records.
///
/// Some inserts and updates carry a buffer of the wrong length.
pub fn store_operation_strategy(len: usize) -> impl Strategy<Value = StoreOperation> {
    let key_len = len.min(2);
    prop_oneof![
        3 => lettered_record_strategy(len).prop_map(|data| StoreOperation::Insert { data }),
        1 => wrong_length_strategy(len).prop_map(|data| StoreOperation::Insert { data }),
        2 => lettered_record_strategy(len).prop_map(|data| StoreOperation::Update { data }),
        1 => wrong_length_strategy(len).prop_map(|data| StoreOperation::Update { data }),
        1 => Just(StoreOperation::StepFirst),
        2 => Just(StoreOperation::StepNext),
        2 => lettered_record_strategy(key_len).prop_map(|key| StoreOperation::GetByKey { key }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    len: usize,
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<StoreOperation>> {
    prop::collection::vec(store_operation_strategy(len), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
