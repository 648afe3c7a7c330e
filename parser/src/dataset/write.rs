//! This module contains the data set writer.
//!
//! Elements are written in ascending tag order.
//! Values are written as they are stored:
//! the writer pads odd-length values to an even length,
//! but never converts the byte order of binary values.
//! Converting a data set to another byte order
//! is the job of the transcoder.
//!
//! Sequence items are always written with a defined length,
//! measured by serializing the item body first.
//! Sequences keep an undefined length if they were declared so,
//! and are otherwise given the length of their serialized items.
use dcmkit_core::header::{DataElementHeader, Length};
use dcmkit_core::value::{PixelFragmentSequence, Value};
use dcmkit_core::{DataElement, DataSet, SequenceItem, Tag, VR};
use dcmkit_encoding::encode::{self, HeaderEncoder};
use dcmkit_encoding::transfer_syntax::TransferSyntax;
use snafu::{Backtrace, ResultExt, Snafu};
use std::io::{self, Write};
use tracing::warn;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Could not write header of element {}", tag))]
    WriteHeader {
        tag: Tag,
        #[snafu(backtrace)]
        source: encode::Error,
    },
    #[snafu(display("Value of element {} is too long ({} bytes)", tag, len))]
    ValueTooLong {
        tag: Tag,
        len: usize,
        backtrace: Backtrace,
    },
    #[snafu(display("Could not write data set"))]
    WriteOutput {
        source: io::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Unsupported transfer syntax {}", uid))]
    UnsupportedTransferSyntax {
        uid: &'static str,
        backtrace: Backtrace,
    },
    #[cfg(feature = "deflate")]
    #[snafu(display("Could not deflate the data set"))]
    Deflate {
        source: io::Error,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Serialize a data set in the given transfer syntax
/// into the given writer.
pub fn write_dataset<W>(mut to: W, dataset: &DataSet, ts: &TransferSyntax) -> Result<()>
where
    W: Write,
{
    let bytes = write_dataset_to_vec(dataset, ts)?;
    to.write_all(&bytes).context(WriteOutputSnafu)
}

/// Serialize a data set in the given transfer syntax into a new buffer.
pub fn write_dataset_to_vec(dataset: &DataSet, ts: &TransferSyntax) -> Result<Vec<u8>> {
    if dataset.byte_order() != ts.endianness() {
        warn!(
            "Writing data set in {:?} byte order with transfer syntax {}, values are not converted",
            dataset.byte_order(),
            ts.uid()
        );
    }
    let encoder = HeaderEncoder::new(ts);
    let mut out = Vec::new();
    for element in dataset {
        write_element_with(&mut out, element, encoder)?;
    }
    finish(out, ts)
}

/// Serialize the elements of a sequence item (without the item header)
/// in the given transfer syntax.
pub fn write_item<W>(mut to: W, item: &SequenceItem, ts: &TransferSyntax) -> Result<()>
where
    W: Write,
{
    let mut out = Vec::new();
    write_item_body(&mut out, item, HeaderEncoder::new(ts))?;
    to.write_all(&out).context(WriteOutputSnafu)
}

/// Serialize a single data element in the given transfer syntax.
pub fn write_element<W>(mut to: W, element: &DataElement, ts: &TransferSyntax) -> Result<()>
where
    W: Write,
{
    let mut out = Vec::new();
    write_element_with(&mut out, element, HeaderEncoder::new(ts))?;
    to.write_all(&out).context(WriteOutputSnafu)
}

#[cfg(feature = "deflate")]
fn finish(out: Vec<u8>, ts: &TransferSyntax) -> Result<Vec<u8>> {
    if ts.is_deflated() {
        crate::deflate::deflate(&out).context(DeflateSnafu)
    } else {
        Ok(out)
    }
}

#[cfg(not(feature = "deflate"))]
fn finish(out: Vec<u8>, ts: &TransferSyntax) -> Result<Vec<u8>> {
    snafu::ensure!(
        !ts.is_deflated(),
        UnsupportedTransferSyntaxSnafu { uid: ts.uid() }
    );
    Ok(out)
}

fn write_item_body(out: &mut Vec<u8>, item: &SequenceItem, encoder: HeaderEncoder) -> Result<()> {
    for element in item {
        write_element_with(out, element, encoder)?;
    }
    Ok(())
}

fn write_header(out: &mut Vec<u8>, header: DataElementHeader, encoder: HeaderEncoder) -> Result<()> {
    encoder
        .encode_element_header(out, header)
        .context(WriteHeaderSnafu { tag: header.tag })?;
    Ok(())
}

fn len_u32(tag: Tag, len: usize) -> Result<u32> {
    // 0xFFFF_FFFF is reserved for undefined length
    if len >= 0xFFFF_FFFF {
        return ValueTooLongSnafu { tag, len }.fail();
    }
    Ok(len as u32)
}

fn write_element_with(out: &mut Vec<u8>, element: &DataElement, encoder: HeaderEncoder) -> Result<()> {
    let tag = element.header().tag;
    let vr = element.vr();
    match element.value() {
        Value::Primitive(bytes) => {
            let padded = bytes.len() % 2 == 1;
            let len = len_u32(tag, bytes.len() + padded as usize)?;
            write_header(out, DataElementHeader::new(tag, vr, Length(len)), encoder)?;
            out.extend_from_slice(bytes);
            if padded {
                out.push(vr.padding());
            }
        }
        Value::Sequence(items) => {
            let mut body = Vec::new();
            for item in items {
                let mut item_body = Vec::new();
                write_item_body(&mut item_body, item, encoder)?;
                let item_len = len_u32(Tag::ITEM, item_body.len())?;
                encoder
                    .encode_item_header(&mut body, item_len)
                    .context(WriteHeaderSnafu { tag: Tag::ITEM })?;
                body.extend_from_slice(&item_body);
            }
            if element.header().len.is_undefined() {
                write_header(out, DataElementHeader::new(tag, VR::SQ, Length::UNDEFINED), encoder)?;
                out.extend_from_slice(&body);
                encoder
                    .encode_sequence_delimiter(out)
                    .context(WriteHeaderSnafu {
                        tag: Tag::SEQUENCE_DELIMITER,
                    })?;
            } else {
                let len = len_u32(tag, body.len())?;
                write_header(out, DataElementHeader::new(tag, VR::SQ, Length(len)), encoder)?;
                out.extend_from_slice(&body);
            }
        }
        Value::PixelSequence(fragments) => {
            write_header(out, DataElementHeader::new(tag, vr, Length::UNDEFINED), encoder)?;
            write_pixel_sequence(out, fragments, encoder)?;
        }
    }
    Ok(())
}

fn write_pixel_sequence(
    out: &mut Vec<u8>,
    fragments: &PixelFragmentSequence,
    encoder: HeaderEncoder,
) -> Result<()> {
    let offset_table = fragments.offset_table();
    encoder
        .encode_item_header(out, len_u32(Tag::ITEM, offset_table.len() * 4)?)
        .context(WriteHeaderSnafu { tag: Tag::ITEM })?;
    for offset in offset_table {
        out.extend_from_slice(&offset.to_le_bytes());
    }
    for fragment in fragments.fragments() {
        let padded = fragment.len() % 2 == 1;
        let len = len_u32(Tag::ITEM, fragment.len() + padded as usize)?;
        encoder
            .encode_item_header(out, len)
            .context(WriteHeaderSnafu { tag: Tag::ITEM })?;
        out.extend_from_slice(fragment);
        if padded {
            out.push(0);
        }
    }
    encoder
        .encode_sequence_delimiter(out)
        .context(WriteHeaderSnafu {
            tag: Tag::SEQUENCE_DELIMITER,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmkit_core::{tags, Endianness};
    use dcmkit_encoding::transfer_syntax::entries;

    #[test]
    fn write_in_tag_order_with_padding() {
        let mut ds = DataSet::new();
        ds.put(DataElement::new_u16(tags::ROWS, &[2], Endianness::Little));
        ds.put(DataElement::new_str(tags::MODALITY, VR::CS, "MR"));
        ds.put(DataElement::new_str(tags::SOP_INSTANCE_UID, VR::UI, "1.2.3"));

        let bytes = write_dataset_to_vec(&ds, &entries::EXPLICIT_VR_LITTLE_ENDIAN).unwrap();
        #[rustfmt::skip]
        let expected: &[u8] = &[
            0x08, 0x00, 0x18, 0x00, b'U', b'I', 0x06, 0x00,
                b'1', b'.', b'2', b'.', b'3', 0x00,
            0x08, 0x00, 0x60, 0x00, b'C', b'S', 0x02, 0x00,
                b'M', b'R',
            0x28, 0x00, 0x10, 0x00, b'U', b'S', 0x02, 0x00,
                0x02, 0x00,
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn write_sequence_items_with_defined_length() {
        let item: SequenceItem = vec![DataElement::new_str(
            tags::REFERENCED_SOP_CLASS_UID,
            VR::UI,
            "1.2",
        )]
        .into_iter()
        .collect();
        let mut ds = DataSet::new();
        ds.put(DataElement::new_sequence(tags::REFERENCED_IMAGE_SEQUENCE, vec![item]));

        let bytes = write_dataset_to_vec(&ds, &entries::EXPLICIT_VR_LITTLE_ENDIAN).unwrap();
        #[rustfmt::skip]
        let expected: &[u8] = &[
            0x08, 0x00, 0x40, 0x11, b'S', b'Q', 0x00, 0x00,
            0xFF, 0xFF, 0xFF, 0xFF,
                0xFE, 0xFF, 0x00, 0xE0, 0x0C, 0x00, 0x00, 0x00,
                    0x08, 0x00, 0x50, 0x11, b'U', b'I', 0x04, 0x00,
                    b'1', b'.', b'2', 0x00,
            0xFE, 0xFF, 0xDD, 0xE0, 0x00, 0x00, 0x00, 0x00,
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn write_encapsulated_pixel_data() {
        let fragments = PixelFragmentSequence::new(vec![0], vec![vec![1, 2, 3]]);
        let mut ds = DataSet::new();
        ds.put(DataElement::new_pixel_sequence(fragments));
        let bytes = write_dataset_to_vec(&ds, &entries::RLE_LOSSLESS).unwrap();
        #[rustfmt::skip]
        let expected: &[u8] = &[
            0xE0, 0x7F, 0x10, 0x00, b'O', b'B', 0x00, 0x00,
            0xFF, 0xFF, 0xFF, 0xFF,
                0xFE, 0xFF, 0x00, 0xE0, 0x04, 0x00, 0x00, 0x00,
                    0x00, 0x00, 0x00, 0x00,
                0xFE, 0xFF, 0x00, 0xE0, 0x04, 0x00, 0x00, 0x00,
                    0x01, 0x02, 0x03, 0x00,
            0xFE, 0xFF, 0xDD, 0xE0, 0x00, 0x00, 0x00, 0x00,
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn too_long_for_short_length_fails() {
        let mut ds = DataSet::new();
        ds.put(DataElement::new(tags::PATIENT_NAME, VR::PN, vec![b'A'; 0x1_0000]));
        let err = write_dataset_to_vec(&ds, &entries::EXPLICIT_VR_LITTLE_ENDIAN).unwrap_err();
        assert!(matches!(err, Error::WriteHeader { .. }));
        // implicit VR has a 32-bit length for all elements
        assert!(write_dataset_to_vec(&ds, &entries::IMPLICIT_VR_LITTLE_ENDIAN).is_ok());
    }
}
