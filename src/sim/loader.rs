//! Memory Image Loader.
//!
//! This module provides utilities for loading binary images from disk into
//! the bus-functional model's memory store ahead of a transfer.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::common::error::HarnessError;
use crate::soc::memory::SparseMemory;

/// Loads a binary file from disk.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, HarnessError> {
    Ok(fs::read(path)?)
}

/// Loads a binary file and writes it into `memory` at `addr`.
///
/// # Returns
///
/// The number of bytes loaded.
pub fn preload_image<P: AsRef<Path>>(
    memory: &mut SparseMemory,
    path: P,
    addr: u64,
) -> Result<usize, HarnessError> {
    let path = path.as_ref();
    let data = load_image(path)?;
    info!(
        "[Loader] Loading {} ({} bytes) @ {:#x}",
        path.display(),
        data.len(),
        addr
    );
    memory.write_bytes(addr, &data);
    Ok(data.len())
}
