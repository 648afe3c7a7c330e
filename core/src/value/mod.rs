//! Representation of the value held by a data element,
//! and conversions into typed values.

use crate::dataset::SequenceItem;

mod convert;

pub use self::convert::ConvertValueError;

/// The value payload of a data element.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The raw bytes of a primitive value,
    /// in the byte order of the encoding it belongs to.
    Primitive(Vec<u8>),
    /// The items of a sequence (VR `SQ`).
    Sequence(Vec<SequenceItem>),
    /// Encapsulated pixel data,
    /// comprising a basic offset table and a list of fragments.
    PixelSequence(PixelFragmentSequence),
}

impl Value {
    /// Retrieve the raw bytes of a primitive value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Primitive(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Retrieve the items of a sequence value.
    pub fn items(&self) -> Option<&[SequenceItem]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Retrieve the encapsulated pixel data fragments.
    pub fn fragments(&self) -> Option<&PixelFragmentSequence> {
        match self {
            Value::PixelSequence(seq) => Some(seq),
            _ => None,
        }
    }
}

/// The contents of an encapsulated pixel data element:
/// a basic offset table (possibly empty)
/// followed by the ordered compressed fragments.
///
/// When present, the offset table maps each frame index
/// to the byte offset of its first fragment item,
/// counted from the first byte of the first fragment item
/// (item headers included).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PixelFragmentSequence {
    offset_table: Vec<u32>,
    fragments: Vec<Vec<u8>>,
}

impl PixelFragmentSequence {
    /// Create a pixel fragment sequence from its parts.
    pub fn new(offset_table: Vec<u32>, fragments: Vec<Vec<u8>>) -> Self {
        PixelFragmentSequence {
            offset_table,
            fragments,
        }
    }

    /// Create a pixel fragment sequence with one fragment per frame,
    /// building the basic offset table from the fragment sizes.
    ///
    /// Each fragment is padded to an even length.
    pub fn from_frames<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let mut offset_table = Vec::new();
        let mut fragments = Vec::new();
        let mut offset = 0u32;
        for mut frame in frames {
            if frame.len() % 2 == 1 {
                frame.push(0);
            }
            offset_table.push(offset);
            offset += frame.len() as u32 + 8;
            fragments.push(frame);
        }
        PixelFragmentSequence {
            offset_table,
            fragments,
        }
    }

    /// The basic offset table.
    #[inline]
    pub fn offset_table(&self) -> &[u32] {
        &self.offset_table
    }

    /// The compressed fragments, in order.
    #[inline]
    pub fn fragments(&self) -> &[Vec<u8>] {
        &self.fragments
    }

    /// Decompose into the offset table and the fragments.
    pub fn into_parts(self) -> (Vec<u32>, Vec<Vec<u8>>) {
        (self.offset_table, self.fragments)
    }
}
