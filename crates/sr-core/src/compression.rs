//! gzip helpers for script payloads.

use crate::error::{CoreError, CoreResult};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Compress `data` into a gzip stream.
pub fn compress(data: &[u8]) -> CoreResult<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(CoreError::Compression)?;
    encoder.finish().map_err(CoreError::Compression)
}

/// Decompress a gzip stream produced by [`compress`] (or any gzip writer).
pub fn uncompress(gz_bytes: &[u8]) -> CoreResult<Vec<u8>> {
    let mut decoder = GzDecoder::new(gz_bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(CoreError::Compression)?;
    Ok(out)
}
