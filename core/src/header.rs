//! This modules contains an assortment of types required for interpreting DICOM data elements.
//! It comprises a variety of basic data types, such as the DICOM attribute tag, the
//! element header, and the data element itself.

use crate::dataset::SequenceItem;
use crate::text::{SpecificCharacterSet, TextCodec};
use crate::value::{PixelFragmentSequence, Value};
use byteordered::byteorder::{BigEndian, ByteOrder, LittleEndian};
use byteordered::Endianness;
use snafu::{Backtrace, Snafu};
use std::fmt;
use std::str::{from_utf8, FromStr};

/// Error type for issues constructing a sequence item header.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum SequenceItemHeaderError {
    /// Unexpected header tag.
    /// Only Item (0xFFFE, 0xE000),
    /// Item Delimiter (0xFFFE, 0xE00D),
    /// or Sequence Delimiter (0xFFFE, 0xE0DD)
    /// are admitted.
    #[snafu(display("Unexpected tag {}", tag))]
    UnexpectedTag { tag: Tag, backtrace: Backtrace },
    /// Unexpected delimiter value length.
    /// Must be zero for item delimiters.
    #[snafu(display("Unexpected delimiter length {}", len))]
    UnexpectedDelimiterLength { len: Length, backtrace: Backtrace },
}

/// Error type for a data element built with an inadmissible length.
#[derive(Debug, Snafu)]
#[snafu(display(
    "Undefined length is only admitted in sequences and encapsulated pixel data, found in {} ({})",
    tag,
    vr
))]
pub struct UndefinedLengthError {
    tag: Tag,
    vr: VR,
    backtrace: Backtrace,
}

type Result<T, E = SequenceItemHeaderError> = std::result::Result<T, E>;

/// Trait for any DICOM entity (element or item) which may have a length.
pub trait HasLength {
    /// Retrieve the value data's length as specified by the data element or
    /// item, in bytes.
    ///
    /// According to the standard, the concrete value size may be undefined,
    /// which can be the case for sequence elements or encapsulated pixel data.
    fn length(&self) -> Length;

    /// Check whether the value is empty (0 length).
    fn is_empty(&self) -> bool {
        self.length() == Length(0)
    }
}

/// A trait for a data type containing a DICOM header.
#[allow(clippy::len_without_is_empty)]
pub trait Header: HasLength {
    /// Retrieve the element's tag as a `(group, element)` tuple.
    fn tag(&self) -> Tag;

    /// Check whether this is the header of an item.
    fn is_item(&self) -> bool {
        self.tag() == Tag::ITEM
    }

    /// Check whether this is the header of an item delimiter.
    fn is_item_delimiter(&self) -> bool {
        self.tag() == Tag::ITEM_DELIMITER
    }

    /// Check whether this is the header of a sequence delimiter.
    fn is_sequence_delimiter(&self) -> bool {
        self.tag() == Tag::SEQUENCE_DELIMITER
    }

    /// Check whether this is the header of an encapsulated pixel data.
    fn is_encapsulated_pixeldata(&self) -> bool {
        self.tag() == Tag::PIXEL_DATA && self.length().is_undefined()
    }
}

/// A data type that represents and owns a DICOM data element.
///
/// The element holds its header (tag, VR and declared length)
/// and exactly one of three kinds of value:
/// the raw value bytes,
/// a list of sequence items (VR `SQ`),
/// or a sequence of encapsulated pixel data fragments.
///
/// Raw bytes of binary numeric values are kept in the byte order
/// of the encoding they were read from (or built for).
#[derive(Debug, PartialEq, Clone)]
pub struct DataElement {
    header: DataElementHeader,
    value: Value,
}

impl HasLength for DataElement {
    #[inline]
    fn length(&self) -> Length {
        self.header.length()
    }
}

impl Header for DataElement {
    #[inline]
    fn tag(&self) -> Tag {
        self.header.tag()
    }
}

impl HasLength for &DataElement {
    #[inline]
    fn length(&self) -> Length {
        (**self).length()
    }
}

impl Header for &DataElement {
    #[inline]
    fn tag(&self) -> Tag {
        (**self).tag()
    }
}

/// Pad the given bytes to an even length with the padding byte of `vr`.
fn pad_even(mut bytes: Vec<u8>, vr: VR) -> Vec<u8> {
    if bytes.len() % 2 == 1 {
        bytes.push(vr.padding());
    }
    bytes
}

macro_rules! impl_numeric_constructors {
    ($($(#[$meta:meta])* $name: ident, $vr: ident, $t: ty, $size: literal, $write_into: ident;)*) => {
        $(
            $(#[$meta])*
            pub fn $name(tag: Tag, values: &[$t], byte_order: Endianness) -> Self {
                let mut bytes = vec![0; values.len() * $size];
                match byte_order {
                    Endianness::Little => LittleEndian::$write_into(values, &mut bytes),
                    Endianness::Big => BigEndian::$write_into(values, &mut bytes),
                }
                DataElement::new(tag, VR::$vr, bytes)
            }
        )*
    };
}

impl DataElement {
    /// Create a data element from its raw value bytes.
    ///
    /// Odd-length values are padded to an even length
    /// with the padding character of the given VR.
    pub fn new<T>(tag: Tag, vr: VR, value: T) -> Self
    where
        T: Into<Vec<u8>>,
    {
        let bytes = pad_even(value.into(), vr);
        DataElement {
            header: DataElementHeader::new(tag, vr, Length(bytes.len() as u32)),
            value: Value::Primitive(bytes),
        }
    }

    /// Create an empty data element.
    pub fn empty(tag: Tag, vr: VR) -> Self {
        DataElement {
            header: DataElementHeader::new(tag, vr, Length(0)),
            value: if vr == VR::SQ {
                Value::Sequence(Vec::new())
            } else {
                Value::Primitive(Vec::new())
            },
        }
    }

    /// Create a data element from a header and a value, as read from a source.
    ///
    /// The declared length is kept as is,
    /// so that it reflects what was found in the encoded data.
    /// An undefined length is only admitted for sequences
    /// and encapsulated pixel data.
    pub fn new_with_len(
        tag: Tag,
        vr: VR,
        len: Length,
        value: Value,
    ) -> std::result::Result<Self, UndefinedLengthError> {
        if len.is_undefined() {
            let admitted = match &value {
                Value::Sequence(_) => true,
                Value::PixelSequence(_) => tag == Tag::PIXEL_DATA,
                Value::Primitive(_) => false,
            };
            snafu::ensure!(admitted, UndefinedLengthSnafu { tag, vr });
        }
        Ok(DataElement {
            header: DataElementHeader::new(tag, vr, len),
            value,
        })
    }

    /// Create a textual data element.
    ///
    /// The text is encoded with the default character set,
    /// replacing characters outside of its repertoire,
    /// and padded to an even length
    /// (with a space, or a null character for UIDs).
    pub fn new_str(tag: Tag, vr: VR, text: &str) -> Self {
        DataElement::new(tag, vr, SpecificCharacterSet::Default.encode_lossy(text))
    }

    /// Create a textual data element with multiple values,
    /// joined with the backslash delimiter.
    pub fn new_strs(tag: Tag, vr: VR, values: &[&str]) -> Self {
        DataElement::new_str(tag, vr, &values.join("\\"))
    }

    /// Create a sequence element with the given items.
    ///
    /// The sequence is given an undefined length,
    /// which the writer preserves.
    pub fn new_sequence<I>(tag: Tag, items: I) -> Self
    where
        I: IntoIterator<Item = SequenceItem>,
    {
        DataElement {
            header: DataElementHeader::new(tag, VR::SQ, Length::UNDEFINED),
            value: Value::Sequence(items.into_iter().collect()),
        }
    }

    /// Create an encapsulated pixel data element
    /// (Pixel Data with undefined length and VR `OB`).
    pub fn new_pixel_sequence(fragments: PixelFragmentSequence) -> Self {
        DataElement {
            header: DataElementHeader::new(Tag::PIXEL_DATA, VR::OB, Length::UNDEFINED),
            value: Value::PixelSequence(fragments),
        }
    }

    impl_numeric_constructors! {
        /// Create an `US` element with the given values.
        new_u16, US, u16, 2, write_u16_into;
        /// Create an `SS` element with the given values.
        new_i16, SS, i16, 2, write_i16_into;
        /// Create an `UL` element with the given values.
        new_u32, UL, u32, 4, write_u32_into;
        /// Create an `SL` element with the given values.
        new_i32, SL, i32, 4, write_i32_into;
        /// Create an `FL` element with the given values.
        new_f32, FL, f32, 4, write_f32_into;
        /// Create an `FD` element with the given values.
        new_f64, FD, f64, 8, write_f64_into;
    }

    /// Create an `OW` element with the given 16-bit words.
    pub fn new_words(tag: Tag, words: &[u16], byte_order: Endianness) -> Self {
        let element = DataElement::new_u16(tag, words, byte_order);
        DataElement {
            header: DataElementHeader::new(tag, VR::OW, element.header.len),
            value: element.value,
        }
    }

    /// Create an `AT` element with the given attribute tags.
    pub fn new_tags(tag: Tag, tags: &[Tag], byte_order: Endianness) -> Self {
        let words: Vec<u16> = tags.iter().flat_map(|t| [t.0, t.1]).collect();
        let element = DataElement::new_u16(tag, &words, byte_order);
        DataElement {
            header: DataElementHeader::new(tag, VR::AT, element.header.len),
            value: element.value,
        }
    }

    /// Retrieve the element header.
    #[inline]
    pub fn header(&self) -> &DataElementHeader {
        &self.header
    }

    /// Retrieve the value representation.
    #[inline]
    pub fn vr(&self) -> VR {
        self.header.vr()
    }

    /// Retrieve the data value.
    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Move the data value out of the element, discarding the rest.
    #[inline]
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Split the element into its header and value.
    #[inline]
    pub fn into_parts(self) -> (DataElementHeader, Value) {
        (self.header, self.value)
    }
}

/// A data structure for a data element header, containing
/// a tag, value representation and specified length.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct DataElementHeader {
    /// DICOM tag
    pub tag: Tag,
    /// Value Representation
    pub vr: VR,
    /// Element length
    pub len: Length,
}

impl HasLength for DataElementHeader {
    #[inline]
    fn length(&self) -> Length {
        self.len
    }
}

impl Header for DataElementHeader {
    #[inline]
    fn tag(&self) -> Tag {
        self.tag
    }
}

impl DataElementHeader {
    /// Create a new data element header with the given properties.
    /// This is just a trivial constructor.
    #[inline]
    pub fn new<T: Into<Tag>>(tag: T, vr: VR, len: Length) -> DataElementHeader {
        DataElementHeader {
            tag: tag.into(),
            vr,
            len,
        }
    }

    /// Retrieve the element's value representation, which can be unknown.
    #[inline]
    pub fn vr(&self) -> VR {
        self.vr
    }
}

/// Data type for describing a sequence item data element.
/// If the element represents an item, it will also contain
/// the specified length.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SequenceItemHeader {
    /// The cursor contains an item.
    Item {
        /// the length of the item in bytes (can be 0xFFFFFFFF if undefined)
        len: Length,
    },
    /// The cursor read an item delimiter.
    /// The element ends here and should not be read any further.
    ItemDelimiter,
    /// The cursor read a sequence delimiter.
    /// The element ends here and should not be read any further.
    SequenceDelimiter,
}

impl SequenceItemHeader {
    /// Create a sequence item header using the element's raw properties.
    /// An error can be raised if the given properties do not relate to a
    /// sequence item, a sequence item delimiter or a sequence delimiter.
    pub fn new<T: Into<Tag>>(tag: T, len: Length) -> Result<SequenceItemHeader> {
        match tag.into() {
            Tag::ITEM => Ok(SequenceItemHeader::Item { len }),
            Tag::ITEM_DELIMITER => {
                // delimiters should not have a positive length
                if len != Length(0) {
                    UnexpectedDelimiterLengthSnafu { len }.fail()
                } else {
                    Ok(SequenceItemHeader::ItemDelimiter)
                }
            }
            Tag::SEQUENCE_DELIMITER => Ok(SequenceItemHeader::SequenceDelimiter),
            tag => UnexpectedTagSnafu { tag }.fail(),
        }
    }
}

impl HasLength for SequenceItemHeader {
    #[inline]
    fn length(&self) -> Length {
        match *self {
            SequenceItemHeader::Item { len } => len,
            SequenceItemHeader::ItemDelimiter | SequenceItemHeader::SequenceDelimiter => Length(0),
        }
    }
}

impl Header for SequenceItemHeader {
    #[inline]
    fn tag(&self) -> Tag {
        match *self {
            SequenceItemHeader::Item { .. } => Tag::ITEM,
            SequenceItemHeader::ItemDelimiter => Tag::ITEM_DELIMITER,
            SequenceItemHeader::SequenceDelimiter => Tag::SEQUENCE_DELIMITER,
        }
    }
}

/// The character repertoire class of a textual value representation.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum CharacterRepertoire {
    /// Only the default character repertoire (ISO-IR 6) is admitted.
    Default,
    /// The repertoire can be extended by the Specific Character Set.
    Extended,
}

/// An enum type for a DICOM value representation.
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, Ord, PartialOrd)]
pub enum VR {
    /// Application Entity
    AE,
    /// Age String
    AS,
    /// Attribute Tag
    AT,
    /// Code String
    CS,
    /// Date
    DA,
    /// Decimal String
    DS,
    /// Date Time
    DT,
    /// Floating Point Single
    FL,
    /// Floating Point Double
    FD,
    /// Integer String
    IS,
    /// Long String
    LO,
    /// Long Text
    LT,
    /// Other Byte
    OB,
    /// Other Double
    OD,
    /// Other Float
    OF,
    /// Other Long
    OL,
    /// Other Word
    OW,
    /// Person Name
    PN,
    /// Short String
    SH,
    /// Signed Long
    SL,
    /// Sequence of Items
    SQ,
    /// Signed Short
    SS,
    /// Short Text
    ST,
    /// Time
    TM,
    /// Unlimited Characters
    UC,
    /// Unique Identifier (UID)
    UI,
    /// Unsigned Long
    UL,
    /// Unknown
    UN,
    /// Universal Resource Identifier or Universal Resource Locator (URI/URL)
    UR,
    /// Unsigned Short
    US,
    /// Unlimited Text
    UT,
}

impl VR {
    /// Obtain the value representation corresponding to the given two bytes.
    /// Each byte should represent an alphabetic character in upper case.
    pub fn from_binary(chars: [u8; 2]) -> Option<Self> {
        from_utf8(chars.as_ref())
            .ok()
            .and_then(|s| VR::from_str(s).ok())
    }

    /// Retrieve a string representation of this VR.
    pub fn as_str(self) -> &'static str {
        use VR::*;
        match self {
            AE => "AE",
            AS => "AS",
            AT => "AT",
            CS => "CS",
            DA => "DA",
            DS => "DS",
            DT => "DT",
            FL => "FL",
            FD => "FD",
            IS => "IS",
            LO => "LO",
            LT => "LT",
            OB => "OB",
            OD => "OD",
            OF => "OF",
            OL => "OL",
            OW => "OW",
            PN => "PN",
            SH => "SH",
            SL => "SL",
            SQ => "SQ",
            SS => "SS",
            ST => "ST",
            TM => "TM",
            UC => "UC",
            UI => "UI",
            UL => "UL",
            UN => "UN",
            UR => "UR",
            US => "US",
            UT => "UT",
        }
    }

    /// Retrieve a copy of this VR's byte representation.
    /// The function returns two alphabetic characters in upper case.
    pub fn to_bytes(self) -> [u8; 2] {
        let bytes = self.as_str().as_bytes();
        [bytes[0], bytes[1]]
    }

    /// Whether the value length of this VR is encoded with 32 bits
    /// in explicit VR transfer syntaxes,
    /// preceded by two reserved bytes.
    /// All other VRs have a 16-bit length field.
    pub fn has_u32_length(self) -> bool {
        use VR::*;
        matches!(self, OB | OD | OF | OL | OW | SQ | UC | UN | UR | UT)
    }

    /// The character repertoire class of this VR,
    /// or `None` if the VR is not textual.
    pub fn character_repertoire(self) -> Option<CharacterRepertoire> {
        use VR::*;
        match self {
            AE | AS | CS | DA | DS | DT | IS | TM | UI | UR => Some(CharacterRepertoire::Default),
            LO | LT | PN | SH | ST | UC | UT => Some(CharacterRepertoire::Extended),
            _ => None,
        }
    }

    /// Whether values of this VR are text.
    #[inline]
    pub fn is_textual(self) -> bool {
        self.character_repertoire().is_some()
    }

    /// The byte used to pad values of this VR to an even length:
    /// a space for text, a null byte for UIDs and binary values.
    pub fn padding(self) -> u8 {
        match self {
            VR::UI => 0,
            vr if vr.is_textual() => b' ',
            _ => 0,
        }
    }

    /// The size in bytes of each numeric component of this VR,
    /// for value representations holding multi-byte binary numbers.
    ///
    /// Attribute tags are reported as 16-bit components,
    /// since the group and element numbers are ordered independently.
    pub fn numeric_width(self) -> Option<usize> {
        use VR::*;
        match self {
            US | SS | OW | AT => Some(2),
            UL | SL | FL | OL | OF => Some(4),
            FD | OD => Some(8),
            _ => None,
        }
    }
}

/// Obtain the value representation corresponding to the given string.
/// The string should hold exactly two UTF-8 encoded alphabetic characters
/// in upper case, otherwise no match is made.
impl FromStr for VR {
    type Err = &'static str;

    fn from_str(string: &str) -> std::result::Result<Self, Self::Err> {
        use VR::*;
        match string {
            "AE" => Ok(AE),
            "AS" => Ok(AS),
            "AT" => Ok(AT),
            "CS" => Ok(CS),
            "DA" => Ok(DA),
            "DS" => Ok(DS),
            "DT" => Ok(DT),
            "FL" => Ok(FL),
            "FD" => Ok(FD),
            "IS" => Ok(IS),
            "LO" => Ok(LO),
            "LT" => Ok(LT),
            "OB" => Ok(OB),
            "OD" => Ok(OD),
            "OF" => Ok(OF),
            "OL" => Ok(OL),
            "OW" => Ok(OW),
            "PN" => Ok(PN),
            "SH" => Ok(SH),
            "SL" => Ok(SL),
            "SQ" => Ok(SQ),
            "SS" => Ok(SS),
            "ST" => Ok(ST),
            "TM" => Ok(TM),
            "UC" => Ok(UC),
            "UI" => Ok(UI),
            "UL" => Ok(UL),
            "UN" => Ok(UN),
            "UR" => Ok(UR),
            "US" => Ok(US),
            "UT" => Ok(UT),
            _ => Err("no such value representation"),
        }
    }
}

impl fmt::Display for VR {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Idiomatic alias for a tag's group number.
pub type GroupNumber = u16;
/// Idiomatic alias for a tag's element number.
pub type ElementNumber = u16;

/// The data type for DICOM data element tags.
///
/// Tags are totally ordered by group number, then element number,
/// which is also the order in which data elements are serialized.
/// Both `(u16, u16)` and `[u16; 2]` can be converted to this type.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy)]
pub struct Tag(pub GroupNumber, pub ElementNumber);

impl Tag {
    /// Item (FFFE,E000)
    pub const ITEM: Tag = Tag(0xFFFE, 0xE000);
    /// Item Delimitation Item (FFFE,E00D)
    pub const ITEM_DELIMITER: Tag = Tag(0xFFFE, 0xE00D);
    /// Sequence Delimitation Item (FFFE,E0DD)
    pub const SEQUENCE_DELIMITER: Tag = Tag(0xFFFE, 0xE0DD);
    /// Pixel Data (7FE0,0010)
    pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

    /// Getter for the tag's group value.
    #[inline]
    pub fn group(self) -> GroupNumber {
        self.0
    }

    /// Getter for the tag's element value.
    #[inline]
    pub fn element(self) -> ElementNumber {
        self.1
    }

    /// Whether this tag belongs to a private data element (odd group).
    #[inline]
    pub fn is_private(self) -> bool {
        self.0 % 2 == 1
    }

    /// Whether this is a group length tag (element number 0).
    #[inline]
    pub fn is_group_length(self) -> bool {
        self.1 == 0
    }

    /// Whether this tag is one of the item or delimiter markers of group FFFE.
    #[inline]
    pub fn is_delimiter_group(self) -> bool {
        self.0 == 0xFFFE
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({:#06X?}, {:#06X?})", self.0, self.1)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.0, self.1)
    }
}

impl PartialEq<(u16, u16)> for Tag {
    fn eq(&self, other: &(u16, u16)) -> bool {
        self.0 == other.0 && self.1 == other.1
    }
}

impl PartialEq<[u16; 2]> for Tag {
    fn eq(&self, other: &[u16; 2]) -> bool {
        self.0 == other[0] && self.1 == other[1]
    }
}

impl From<(u16, u16)> for Tag {
    #[inline]
    fn from(value: (u16, u16)) -> Tag {
        Tag(value.0, value.1)
    }
}

impl From<[u16; 2]> for Tag {
    #[inline]
    fn from(value: [u16; 2]) -> Tag {
        Tag(value[0], value[1])
    }
}

/// Could not parse a tag from text.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(display("Invalid tag `{}`", text))]
pub struct ParseTagError {
    text: String,
}

/// Parse a tag in one of the forms
/// `(GGGG,EEEE)`, `GGGG,EEEE` or `GGGGEEEE`,
/// where each component is hexadecimal.
impl FromStr for Tag {
    type Err = ParseTagError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let fail = || ParseTagError {
            text: s.to_string(),
        };
        let inner = s.trim();
        let inner = inner
            .strip_prefix('(')
            .and_then(|x| x.strip_suffix(')'))
            .unwrap_or(inner);
        let (group, element) = match inner.split_once(',') {
            Some(parts) => parts,
            None if inner.len() == 8 && inner.is_char_boundary(4) => inner.split_at(4),
            None => return Err(fail()),
        };
        let group = u16::from_str_radix(group.trim(), 16).map_err(|_| fail())?;
        let element = u16::from_str_radix(element.trim(), 16).map_err(|_| fail())?;
        Ok(Tag(group, element))
    }
}

/// A type for representing data set content length, in bytes.
/// An internal value of `0xFFFF_FFFF` represents an undefined
/// (unspecified) length, which would have to be determined
/// with a traversal based on the content's encoding.
///
/// ```
/// # use dcmkit_core::Length;
/// assert!(Length::UNDEFINED.is_undefined());
/// assert_eq!(Length::defined(64).get(), Some(64));
/// assert_eq!(Length::UNDEFINED.get(), None);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Length(pub u32);

const UNDEFINED_LEN: u32 = 0xFFFF_FFFF;

impl Length {
    /// A length that is undefined.
    pub const UNDEFINED: Self = Length(UNDEFINED_LEN);

    /// Create a new length value from its internal representation.
    /// This is equivalent to `Length(len)`.
    #[inline]
    pub fn new(len: u32) -> Self {
        Length(len)
    }

    /// Create a new length value with the given number of bytes.
    ///
    /// # Panic
    ///
    /// This function will panic if `len` represents an undefined length.
    #[inline]
    pub fn defined(len: u32) -> Self {
        assert_ne!(len, UNDEFINED_LEN);
        Length(len)
    }

    /// Check whether this length is undefined (unknown).
    #[inline]
    pub fn is_undefined(self) -> bool {
        self.0 == UNDEFINED_LEN
    }

    /// Check whether this length is well defined (not undefined).
    #[inline]
    pub fn is_defined(self) -> bool {
        !self.is_undefined()
    }

    /// Fetch the concrete length value, if available.
    /// Returns `None` if it represents an undefined length.
    #[inline]
    pub fn get(self) -> Option<u32> {
        if self.is_undefined() {
            None
        } else {
            Some(self.0)
        }
    }
}

impl From<u32> for Length {
    #[inline]
    fn from(o: u32) -> Self {
        Length(o)
    }
}

impl fmt::Debug for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.get() {
            Some(len) => f.debug_tuple("Length").field(&len).finish(),
            None => f.write_str("Length(Undefined)"),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.get() {
            Some(len) => write!(f, "{}", len),
            None => f.write_str("U/L"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_from_u16_pair() {
        let t = Tag::from((0x0010u16, 0x0020u16));
        assert_eq!(0x0010u16, t.group());
        assert_eq!(0x0020u16, t.element());
    }

    #[test]
    fn tag_from_u16_array() {
        let t = Tag::from([0x0010u16, 0x0020u16]);
        assert_eq!(0x0010u16, t.group());
        assert_eq!(0x0020u16, t.element());
    }

    #[test]
    fn tag_display_and_parse() {
        let t = Tag(0x7FE0, 0x0010);
        assert_eq!(t.to_string(), "(7FE0,0010)");
        assert_eq!(format!("{:?}", t), "Tag(0x7FE0, 0x0010)");
        assert_eq!("(7FE0,0010)".parse::<Tag>(), Ok(t));
        assert_eq!("7fe0,0010".parse::<Tag>(), Ok(t));
        assert_eq!("7FE00010".parse::<Tag>(), Ok(t));
        assert!("7FE0".parse::<Tag>().is_err());
        assert!("(GGGG,0010)".parse::<Tag>().is_err());
    }

    #[test]
    fn tag_order_is_group_then_element() {
        let mut tags = vec![Tag(0x0010, 0x0010), Tag(0x0008, 0x0060), Tag(0x0008, 0x0016)];
        tags.sort();
        assert_eq!(
            tags,
            vec![Tag(0x0008, 0x0016), Tag(0x0008, 0x0060), Tag(0x0010, 0x0010)]
        );
        assert!(Tag(0x0009, 0x0010).is_private());
        assert!(!Tag(0x0008, 0x0010).is_private());
    }

    #[test]
    fn vr_round_trip_and_classes() {
        for vr in [VR::AE, VR::OB, VR::SQ, VR::UI, VR::UT, VR::US] {
            assert_eq!(VR::from_binary(vr.to_bytes()), Some(vr));
        }
        assert_eq!(VR::from_binary(*b"XX"), None);
        assert_eq!(VR::from_binary(*b"ov"), None);

        assert!(VR::OB.has_u32_length());
        assert!(VR::SQ.has_u32_length());
        assert!(VR::UN.has_u32_length());
        assert!(!VR::US.has_u32_length());
        assert!(!VR::UI.has_u32_length());

        assert_eq!(VR::UI.character_repertoire(), Some(CharacterRepertoire::Default));
        assert_eq!(VR::PN.character_repertoire(), Some(CharacterRepertoire::Extended));
        assert_eq!(VR::OW.character_repertoire(), None);

        assert_eq!(VR::UI.padding(), 0);
        assert_eq!(VR::CS.padding(), b' ');
        assert_eq!(VR::OB.padding(), 0);

        assert_eq!(VR::AT.numeric_width(), Some(2));
        assert_eq!(VR::OF.numeric_width(), Some(4));
        assert_eq!(VR::FD.numeric_width(), Some(8));
        assert_eq!(VR::OB.numeric_width(), None);
        assert_eq!(VR::DS.numeric_width(), None);
    }

    #[test]
    fn sequence_item_headers() {
        assert_eq!(
            SequenceItemHeader::new(Tag::ITEM, Length(16)).unwrap(),
            SequenceItemHeader::Item { len: Length(16) }
        );
        assert_eq!(
            SequenceItemHeader::new(Tag::ITEM_DELIMITER, Length(0)).unwrap(),
            SequenceItemHeader::ItemDelimiter
        );
        assert!(matches!(
            SequenceItemHeader::new(Tag::ITEM_DELIMITER, Length(4)),
            Err(SequenceItemHeaderError::UnexpectedDelimiterLength { .. })
        ));
        assert!(matches!(
            SequenceItemHeader::new(Tag(0x0008, 0x0016), Length(4)),
            Err(SequenceItemHeaderError::UnexpectedTag { .. })
        ));
    }

    #[test]
    fn string_values_are_padded() {
        let e = DataElement::new_str(Tag(0x0008, 0x0016), VR::UI, "1.2.3");
        assert_eq!(e.length(), Length(6));
        assert_eq!(e.value().as_bytes(), Some(&b"1.2.3\0"[..]));

        let e = DataElement::new_str(Tag(0x0008, 0x0060), VR::CS, "MRI");
        assert_eq!(e.value().as_bytes(), Some(&b"MRI "[..]));

        let e = DataElement::new_strs(Tag(0x0008, 0x0008), VR::CS, &["ORIGINAL", "PRIMARY"]);
        assert_eq!(e.value().as_bytes(), Some(&b"ORIGINAL\\PRIMARY"[..]));
    }

    #[test]
    fn numeric_constructors_honor_byte_order() {
        let e = DataElement::new_u16(Tag(0x0028, 0x0010), &[0x0102], Endianness::Little);
        assert_eq!(e.value().as_bytes(), Some(&[0x02, 0x01][..]));
        let e = DataElement::new_u16(Tag(0x0028, 0x0010), &[0x0102], Endianness::Big);
        assert_eq!(e.value().as_bytes(), Some(&[0x01, 0x02][..]));
        let e = DataElement::new_tags(Tag(0x0020, 0x9165), &[Tag(0x0018, 0x0050)], Endianness::Little);
        assert_eq!(e.vr(), VR::AT);
        assert_eq!(e.value().as_bytes(), Some(&[0x18, 0x00, 0x50, 0x00][..]));
    }

    #[test]
    fn undefined_length_only_for_sequences_and_pixel_data() {
        let bad = DataElement::new_with_len(
            Tag(0x0010, 0x0010),
            VR::PN,
            Length::UNDEFINED,
            Value::Primitive(vec![]),
        );
        assert!(bad.is_err());

        let seq = DataElement::new_with_len(
            Tag(0x0008, 0x1140),
            VR::SQ,
            Length::UNDEFINED,
            Value::Sequence(vec![]),
        );
        assert!(seq.is_ok());

        let pixel = DataElement::new_with_len(
            Tag::PIXEL_DATA,
            VR::OB,
            Length::UNDEFINED,
            Value::PixelSequence(PixelFragmentSequence::default()),
        );
        assert!(pixel.is_ok());
        assert!(pixel.unwrap().is_encapsulated_pixeldata());
    }
}
