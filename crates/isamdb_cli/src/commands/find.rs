//! Find command implementation.

use super::{ascii, hex, load_store};
use isamdb_core::Status;
use std::path::Path;

/// Runs the find command.
pub fn run(
    path: &Path,
    record_length: u16,
    key: &str,
    is_hex: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let key = if is_hex {
        parse_hex(key)?
    } else {
        key.as_bytes().to_vec()
    };

    let mut store = load_store(path, Some(record_length))?;

    match store.get_record_by_key(&key) {
        Status::Found => {
            let index = store.position();
            let record = store.current_record()?;
            println!("Found at record {}", index);
            println!("  {}", ascii(record));
            println!("  {}", hex(record));
        }
        Status::NotFound => {
            println!("No record starts with {}", hex(&key));
        }
    }

    Ok(())
}

fn parse_hex(input: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let digits: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if !digits.is_ascii() {
        return Err(format!("Invalid hex key {:?}: non-ASCII characters", input).into());
    }
    if digits.len() % 2 != 0 {
        return Err(format!("Hex key has an odd number of digits: {}", input).into());
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|e| -> Box<dyn std::error::Error> {
                    format!("Invalid hex key {:?}: {}", input, e).into()
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_keys() {
        assert_eq!(parse_hex("4142").unwrap(), b"AB");
        assert_eq!(parse_hex("41 42 ff").unwrap(), vec![0x41, 0x42, 0xFF]);
        assert!(parse_hex("414").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn rejects_non_ascii_hex_keys() {
        assert!(parse_hex("aéb").is_err());
        assert!(parse_hex("éé").is_err());
    }
}
