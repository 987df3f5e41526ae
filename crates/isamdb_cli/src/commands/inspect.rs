//! Inspect command implementation.

use super::load_store;
use isamdb_core::Store;
use serde::Serialize;
use std::path::Path;

/// Data file inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Data file path.
    pub path: String,
    /// Record length used to read the records.
    pub record_length: u16,
    /// Record length stored in the header.
    pub header_record_length: u16,
    /// Physical record length stored in the header.
    pub physical_record_length: u16,
    /// Page length stored in the header.
    pub page_length: u16,
    /// Number of pages, when the page length allows computing it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    /// Number of keys declared in the header.
    pub key_count: u16,
    /// Number of records.
    pub record_count: u16,
    /// Size of the image in bytes.
    pub image_size: usize,
}

impl InspectResult {
    fn from_store(path: &Path, store: &Store) -> Self {
        Self {
            path: path.display().to_string(),
            record_length: store.record_length(),
            header_record_length: store.header().record_length(),
            physical_record_length: store.physical_record_length(),
            page_length: store.page_length(),
            page_count: store.page_count(),
            key_count: store.key_count(),
            record_count: store.record_count(),
            image_size: store.header().image().map_or(0, <[u8]>::len),
        }
    }
}

/// Runs the inspect command.
pub fn run(
    path: &Path,
    record_length: Option<u16>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = load_store(path, record_length)?;
    let result = InspectResult::from_store(path, &store);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("ISAM Data File Inspection");
    println!("=========================");
    println!();
    println!("Path: {}", result.path);
    println!("Size: {} bytes", format_size(result.image_size as u64));
    println!();
    println!("Header:");
    println!("  Page length:            {}", result.page_length);
    match result.page_count {
        Some(pages) => println!("  Page count:             {}", pages),
        None => println!("  Page count:             n/a"),
    }
    println!("  Key count:              {}", result.key_count);
    println!("  Record length:          {}", result.header_record_length);
    println!("  Physical record length: {}", result.physical_record_length);
    println!();
    println!("Records:");
    println!("  Count:  {}", result.record_count);
    println!("  Length: {} bytes", result.record_length);

    if result.record_length != result.header_record_length {
        println!();
        println!(
            "Note: reading with record length {} (header says {})",
            result.record_length, result.header_record_length
        );
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{}", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
