//! This module contains the encoding logic of data element headers
//! and sequence delimiters.

use crate::transfer_syntax::TransferSyntax;
use byteordered::{ByteOrdered, Endianness};
use dcmkit_core::header::{DataElementHeader, Length};
use dcmkit_core::{Tag, VR};
use snafu::{Backtrace, ResultExt, Snafu};
use std::io::{self, Write};

/// Module-level error type:
/// for errors which may occur while encoding DICOM headers.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Failed to write the header of {}: {}", tag, source))]
    WriteHeader {
        tag: Tag,
        backtrace: Backtrace,
        source: io::Error,
    },
    /// The value does not fit in the 16-bit length field of its VR.
    #[snafu(display(
        "Value of {} is too long for VR {} ({} bytes, at most 65535 allowed)",
        tag,
        vr,
        len
    ))]
    ValueTooLong {
        tag: Tag,
        vr: VR,
        len: Length,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An encoder of data element headers
/// for a given byte order and VR explicitness.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HeaderEncoder {
    byte_order: Endianness,
    explicit_vr: bool,
}

impl HeaderEncoder {
    /// Create a header encoder for the given transfer syntax.
    pub fn new(ts: &TransferSyntax) -> Self {
        HeaderEncoder {
            byte_order: ts.endianness(),
            explicit_vr: ts.explicit_vr(),
        }
    }

    /// Create a header encoder from its raw properties.
    pub fn with_properties(byte_order: Endianness, explicit_vr: bool) -> Self {
        HeaderEncoder {
            byte_order,
            explicit_vr,
        }
    }

    /// Obtain an encoder for the file meta group (Explicit VR Little Endian).
    pub fn file_meta() -> Self {
        HeaderEncoder::with_properties(Endianness::Little, true)
    }

    /// The byte order of the headers encoded.
    pub fn byte_order(&self) -> Endianness {
        self.byte_order
    }

    /// Encode a data element header, returning the number of bytes written.
    ///
    /// With explicit VR, VRs with a 16-bit length field
    /// take 8 bytes and all others take 12.
    /// With implicit VR, every header takes 8 bytes.
    pub fn encode_element_header<W>(&self, to: &mut W, header: DataElementHeader) -> Result<usize>
    where
        W: ?Sized + Write,
    {
        let tag = header.tag;
        let mut to = ByteOrdered::runtime(to, self.byte_order);
        to.write_u16(tag.group())
            .and_then(|_| to.write_u16(tag.element()))
            .context(WriteHeaderSnafu { tag })?;

        if !self.explicit_vr {
            to.write_u32(header.len.0)
                .context(WriteHeaderSnafu { tag })?;
            return Ok(8);
        }

        let vr = header.vr;
        to.inner_mut()
            .write_all(&vr.to_bytes())
            .context(WriteHeaderSnafu { tag })?;
        if vr.has_u32_length() {
            to.write_u16(0)
                .and_then(|_| to.write_u32(header.len.0))
                .context(WriteHeaderSnafu { tag })?;
            Ok(12)
        } else {
            let len = header
                .len
                .get()
                .filter(|&l| l <= 0xFFFF)
                .ok_or_else(|| {
                    ValueTooLongSnafu {
                        tag,
                        vr,
                        len: header.len,
                    }
                    .build()
                })?;
            to.write_u16(len as u16)
                .context(WriteHeaderSnafu { tag })?;
            Ok(8)
        }
    }

    /// Encode an item header with the given length.
    pub fn encode_item_header<W>(&self, to: &mut W, len: u32) -> Result<()>
    where
        W: ?Sized + Write,
    {
        self.encode_raw(to, Tag::ITEM, len)
    }

    /// Encode an item delimitation item.
    pub fn encode_item_delimiter<W>(&self, to: &mut W) -> Result<()>
    where
        W: ?Sized + Write,
    {
        self.encode_raw(to, Tag::ITEM_DELIMITER, 0)
    }

    /// Encode a sequence delimitation item.
    pub fn encode_sequence_delimiter<W>(&self, to: &mut W) -> Result<()>
    where
        W: ?Sized + Write,
    {
        self.encode_raw(to, Tag::SEQUENCE_DELIMITER, 0)
    }

    fn encode_raw<W>(&self, to: &mut W, tag: Tag, len: u32) -> Result<()>
    where
        W: ?Sized + Write,
    {
        let mut to = ByteOrdered::runtime(to, self.byte_order);
        to.write_u16(tag.group())
            .and_then(|_| to.write_u16(tag.element()))
            .and_then(|_| to.write_u32(len))
            .context(WriteHeaderSnafu { tag })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer_syntax::entries;

    #[test]
    fn encode_explicit_le_headers() {
        let enc = HeaderEncoder::new(&entries::EXPLICIT_VR_LITTLE_ENDIAN);
        let mut out = Vec::new();
        let n = enc
            .encode_element_header(
                &mut out,
                DataElementHeader::new(Tag(0x0010, 0x0010), VR::PN, Length(8)),
            )
            .unwrap();
        assert_eq!(n, 8);
        assert_eq!(out, [0x10, 0x00, 0x10, 0x00, b'P', b'N', 0x08, 0x00]);

        out.clear();
        let n = enc
            .encode_element_header(
                &mut out,
                DataElementHeader::new(Tag::PIXEL_DATA, VR::OB, Length::UNDEFINED),
            )
            .unwrap();
        assert_eq!(n, 12);
        #[rustfmt::skip]
        assert_eq!(out, [
            0xE0, 0x7F, 0x10, 0x00,
            b'O', b'B', 0x00, 0x00,
            0xFF, 0xFF, 0xFF, 0xFF,
        ]);
    }

    #[test]
    fn encode_explicit_be_header() {
        let enc = HeaderEncoder::new(&entries::EXPLICIT_VR_BIG_ENDIAN);
        let mut out = Vec::new();
        enc.encode_element_header(
            &mut out,
            DataElementHeader::new(Tag(0x0028, 0x0010), VR::US, Length(2)),
        )
        .unwrap();
        assert_eq!(out, [0x00, 0x28, 0x00, 0x10, b'U', b'S', 0x00, 0x02]);
    }

    #[test]
    fn encode_implicit_header() {
        let enc = HeaderEncoder::new(&entries::IMPLICIT_VR_LITTLE_ENDIAN);
        let mut out = Vec::new();
        let n = enc
            .encode_element_header(
                &mut out,
                DataElementHeader::new(Tag(0x0028, 0x0010), VR::US, Length(2)),
            )
            .unwrap();
        assert_eq!(n, 8);
        assert_eq!(out, [0x28, 0x00, 0x10, 0x00, 0x02, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn too_long_for_short_length() {
        let enc = HeaderEncoder::file_meta();
        let mut out = Vec::new();
        let err = enc
            .encode_element_header(
                &mut out,
                DataElementHeader::new(Tag(0x0010, 0x0010), VR::PN, Length(0x1_0000)),
            )
            .unwrap_err();
        assert!(matches!(err, Error::ValueTooLong { vr: VR::PN, .. }));
    }

    #[test]
    fn encode_delimiters() {
        let enc = HeaderEncoder::file_meta();
        let mut out = Vec::new();
        enc.encode_item_header(&mut out, 6).unwrap();
        enc.encode_item_delimiter(&mut out).unwrap();
        enc.encode_sequence_delimiter(&mut out).unwrap();
        #[rustfmt::skip]
        assert_eq!(out, [
            0xFE, 0xFF, 0x00, 0xE0, 0x06, 0x00, 0x00, 0x00,
            0xFE, 0xFF, 0x0D, 0xE0, 0x00, 0x00, 0x00, 0x00,
            0xFE, 0xFF, 0xDD, 0xE0, 0x00, 0x00, 0x00, 0x00,
        ]);
    }
}
