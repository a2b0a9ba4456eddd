//! Synthetic ids for local files without an external id

use crate::Result;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

const ID_PREFIX: &str = "local-";
const ID_HEX_CHARS: usize = 12;

/// `local-` plus the first 12 hex digits of the file's SHA-256
///
/// Content-derived, so analyzing the same file again updates the same record.
pub fn local_track_id(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    let hex: String = hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();
    Ok(format!("{}{}", ID_PREFIX, &hex[..ID_HEX_CHARS]))
}
