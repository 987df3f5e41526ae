//! Export command implementation.

use super::load_store;
use isamdb_storage::{FileBackend, StorageBackend};
use std::path::Path;
use tracing::info;

/// Runs the export command.
///
/// Re-renders the store image from the parsed header and records and writes
/// it to `output`.
pub fn run(
    path: &Path,
    record_length: u16,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if same_file(path, output) {
        return Err("Output must differ from the source file".into());
    }

    let store = load_store(path, Some(record_length))?;
    let image = store.to_image();

    let mut backend = FileBackend::create(output)?;
    backend.append(&image)?;
    backend.flush()?;

    info!(
        source = %path.display(),
        output = %output.display(),
        records = store.record_count(),
        bytes = image.len(),
        "exported store"
    );
    println!(
        "Exported {} records ({} bytes) to {:?}",
        store.record_count(),
        image.len(),
        output
    );

    Ok(())
}

/// Compares resolved paths when both exist, raw paths otherwise.
fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
