//! Raw deflate compression of whole data sets.

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{self, Read, Write};

/// Inflate a deflated data set body.
pub(crate) fn inflate(bytes: &[u8]) -> io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(bytes.len() * 2);
    DeflateDecoder::new(bytes).read_to_end(&mut out)?;
    Ok(out)
}

/// Deflate a serialized data set body.
pub(crate) fn deflate(bytes: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    #[test]
    fn deflate_then_inflate() {
        let data = b"DICOM data set body, repeated, repeated, repeated".to_vec();
        let compressed = super::deflate(&data).unwrap();
        assert_eq!(super::inflate(&compressed).unwrap(), data);
    }
}
