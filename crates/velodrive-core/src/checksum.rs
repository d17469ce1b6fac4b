use std::io::Read;
use std::path::Path;

use sha1::Sha1;
use sha2::{Digest, Sha256};

const CHUNK_SIZE: usize = 8192;

fn digest_file<D: Digest>(path: &Path) -> std::io::Result<D> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = D::new();
    let mut buffer = [0_u8; CHUNK_SIZE];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hasher)
}

/// SHA-1 of a file as 40 uppercase hex characters.
///
/// # Errors
/// Returns an error if the file cannot be opened or read.
pub fn sha1_file(path: &Path) -> std::io::Result<String> {
    let hasher = digest_file::<Sha1>(path)?;
    Ok(format!("{:X}", hasher.finalize()))
}

/// SHA-256 of a file as 64 lowercase hex characters.
///
/// # Errors
/// Returns an error if the file cannot be opened or read.
pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    let hasher = digest_file::<Sha256>(path)?;
    Ok(format!("{:x}", hasher.finalize()))
}
