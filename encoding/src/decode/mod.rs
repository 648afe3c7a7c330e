//! This module contains the decoding logic of data element headers.
//!
//! All decoders here work on in-memory byte slices.
//! When the slice does not hold enough bytes for a full header,
//! decoding yields `None` instead of an error,
//! so that the parser can decide how to handle a truncated stream.

use crate::transfer_syntax::TransferSyntax;
use byteordered::{ByteOrdered, Endianness};
use dcmkit_core::dictionary::VrInference;
use dcmkit_core::header::{DataElementHeader, Length, SequenceItemHeader, SequenceItemHeaderError};
use dcmkit_core::{Tag, VR};
use snafu::{Backtrace, ResultExt, Snafu};
use std::io;

/// Module-level error type:
/// for errors which may occur while decoding DICOM headers.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Failed to read the header of {}: {}", tag, source))]
    ReadHeader {
        tag: Tag,
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display(
        "Invalid value representation {:02X?} in header of {}",
        code,
        tag
    ))]
    InvalidVr {
        tag: Tag,
        code: [u8; 2],
        backtrace: Backtrace,
    },
    #[snafu(display("Bad sequence item header"))]
    BadSequenceHeader { source: SequenceItemHeaderError },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A decoder of data element headers
/// for a given byte order and VR explicitness.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HeaderDecoder {
    byte_order: Endianness,
    explicit_vr: bool,
}

impl HeaderDecoder {
    /// Create a header decoder for the given transfer syntax.
    pub fn new(ts: &TransferSyntax) -> Self {
        HeaderDecoder {
            byte_order: ts.endianness(),
            explicit_vr: ts.explicit_vr(),
        }
    }

    /// Create a header decoder from its raw properties.
    pub fn with_properties(byte_order: Endianness, explicit_vr: bool) -> Self {
        HeaderDecoder {
            byte_order,
            explicit_vr,
        }
    }

    /// Obtain a decoder for reading the data elements in a DICOM file's
    /// meta information group,
    /// which is always in Explicit VR Little Endian.
    pub fn file_meta() -> Self {
        HeaderDecoder::with_properties(Endianness::Little, true)
    }

    /// The byte order of the headers decoded.
    pub fn byte_order(&self) -> Endianness {
        self.byte_order
    }

    /// Whether the value representation is read from the stream.
    pub fn explicit_vr(&self) -> bool {
        self.explicit_vr
    }

    /// Decode the tag at the beginning of `bytes`,
    /// or `None` if fewer than 4 bytes are available.
    pub fn decode_tag(&self, bytes: &[u8]) -> Option<Tag> {
        if bytes.len() < 4 {
            return None;
        }
        let mut reader = ByteOrdered::runtime(&bytes[0..4], self.byte_order);
        let group = reader.read_u16().ok()?;
        let element = reader.read_u16().ok()?;
        Some(Tag(group, element))
    }

    /// Decode a data element header from the beginning of `bytes`.
    ///
    /// Returns the header and the number of bytes it occupies,
    /// or `None` if the header is not complete.
    /// Headers in the delimiter group (FFFE) have no VR field,
    /// and are reported as `UN`.
    /// With implicit VR, `dict` is used to infer the VR of the element.
    pub fn decode_header(
        &self,
        bytes: &[u8],
        dict: &dyn VrInference,
    ) -> Result<Option<(DataElementHeader, usize)>> {
        let tag = match self.decode_tag(bytes) {
            Some(tag) => tag,
            None => return Ok(None),
        };

        if tag.is_delimiter_group() || !self.explicit_vr {
            if bytes.len() < 8 {
                return Ok(None);
            }
            let len = self.read_u32(tag, &bytes[4..8])?;
            let vr = if tag.is_delimiter_group() {
                VR::UN
            } else {
                dict.vr_of(tag)
            };
            return Ok(Some((DataElementHeader::new(tag, vr, Length(len)), 8)));
        }

        if bytes.len() < 8 {
            return Ok(None);
        }
        let code = [bytes[4], bytes[5]];
        let vr = VR::from_binary(code).ok_or_else(|| InvalidVrSnafu { tag, code }.build())?;

        if vr.has_u32_length() {
            // 2 reserved bytes, then a 32-bit length
            if bytes.len() < 12 {
                return Ok(None);
            }
            let len = self.read_u32(tag, &bytes[8..12])?;
            Ok(Some((DataElementHeader::new(tag, vr, Length(len)), 12)))
        } else {
            let len = u32::from(self.read_u16(tag, &bytes[6..8])?);
            Ok(Some((DataElementHeader::new(tag, vr, Length(len)), 8)))
        }
    }

    /// Decode a sequence item header
    /// (item, item delimiter or sequence delimiter)
    /// from the beginning of `bytes`.
    pub fn decode_item_header(&self, bytes: &[u8]) -> Result<Option<(SequenceItemHeader, usize)>> {
        let tag = match self.decode_tag(bytes) {
            Some(tag) => tag,
            None => return Ok(None),
        };
        if bytes.len() < 8 {
            return Ok(None);
        }
        let len = self.read_u32(tag, &bytes[4..8])?;
        let header = SequenceItemHeader::new(tag, Length(len)).context(BadSequenceHeaderSnafu)?;
        Ok(Some((header, 8)))
    }

    fn read_u16(&self, tag: Tag, bytes: &[u8]) -> Result<u16> {
        ByteOrdered::runtime(bytes, self.byte_order)
            .read_u16()
            .context(ReadHeaderSnafu { tag })
    }

    fn read_u32(&self, tag: Tag, bytes: &[u8]) -> Result<u32> {
        ByteOrdered::runtime(bytes, self.byte_order)
            .read_u32()
            .context(ReadHeaderSnafu { tag })
    }
}
