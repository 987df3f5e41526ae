//! Dump command implementation.

use super::{ascii, hex, load_store};
use std::path::Path;

/// Runs the dump command.
pub fn run(
    path: &Path,
    record_length: u16,
    offset: usize,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = load_store(path, Some(record_length))?;

    println!("Records in {:?} ({} total):", path, store.record_count());
    println!();

    let records = store
        .records()
        .enumerate()
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX));

    let mut shown = 0;
    for (index, record) in records {
        println!("[{:5}] {}", index, ascii(record));
        for chunk in record.chunks(16) {
            println!("        {}", hex(chunk));
        }
        shown += 1;
    }

    println!();
    println!("Shown {} records", shown);

    Ok(())
}
