//! Fallible conversions from data element values into typed values.
//!
//! Each conversion admits a fixed set of value representations.
//! Asking for a conversion from any other VR yields
//! [`ConvertValueError::WrongVr`],
//! while values which cannot be interpreted yield
//! [`ConvertValueError::Malformed`].

use crate::dataset::SequenceItem;
use crate::header::{DataElement, Header, Tag, VR};
use crate::text::{SpecificCharacterSet, TextCodec};
use crate::value::{PixelFragmentSequence, Value};
use byteordered::byteorder::{BigEndian, ByteOrder, LittleEndian};
use byteordered::Endianness;
use chrono::NaiveDate;
use num_traits::NumCast;
use snafu::{Backtrace, OptionExt, Snafu};

/// An error type for a failed attempt to convert
/// the value of a data element into a typed value.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ConvertValueError {
    /// The value representation of the element
    /// is not admitted by the requested conversion.
    #[snafu(display("Cannot convert {} of VR {} into {}", tag, vr, requested))]
    WrongVr {
        tag: Tag,
        vr: VR,
        requested: &'static str,
        backtrace: Backtrace,
    },
    /// The value bytes could not be interpreted.
    #[snafu(display("Malformed value in {} ({}): {}", tag, vr, reason))]
    Malformed {
        tag: Tag,
        vr: VR,
        reason: String,
        backtrace: Backtrace,
    },
    /// The value is empty.
    #[snafu(display("Value of {} is empty", tag))]
    Empty { tag: Tag, backtrace: Backtrace },
}

type Result<T, E = ConvertValueError> = std::result::Result<T, E>;

/// Read fixed-size binary components in the given byte order.
macro_rules! read_components {
    ($bytes: expr, $order: expr, $t: ty, $size: literal, $read_into: ident) => {{
        let bytes: &[u8] = $bytes;
        let mut out: Vec<$t> = vec![Default::default(); bytes.len() / $size];
        match $order {
            Endianness::Little => LittleEndian::$read_into(bytes, &mut out),
            Endianness::Big => BigEndian::$read_into(bytes, &mut out),
        }
        out
    }};
}

fn cast_all<S, T>(tag: Tag, vr: VR, values: Vec<S>) -> Result<Vec<T>>
where
    S: NumCast + Copy + std::fmt::Display,
    T: NumCast,
{
    values
        .into_iter()
        .map(|v| {
            T::from(v).with_context(|| MalformedSnafu {
                tag,
                vr,
                reason: format!("value {} is out of range", v),
            })
        })
        .collect()
}

impl DataElement {
    fn primitive_bytes(&self, requested: &'static str) -> Result<&[u8]> {
        self.value().as_bytes().context(WrongVrSnafu {
            tag: self.tag(),
            vr: self.vr(),
            requested,
        })
    }

    fn wrong_vr<T>(&self, requested: &'static str) -> Result<T> {
        WrongVrSnafu {
            tag: self.tag(),
            vr: self.vr(),
            requested,
        }
        .fail()
    }

    fn check_width(&self, bytes: &[u8], width: usize) -> Result<()> {
        snafu::ensure!(
            bytes.len() % width == 0,
            MalformedSnafu {
                tag: self.tag(),
                vr: self.vr(),
                reason: format!("length {} is not a multiple of {}", bytes.len(), width),
            }
        );
        Ok(())
    }

    /// Retrieve the raw value bytes of a primitive value.
    ///
    /// Fails for sequences and encapsulated pixel data.
    pub fn to_bytes(&self) -> Result<&[u8]> {
        self.primitive_bytes("bytes")
    }

    /// Retrieve the items of a sequence element.
    pub fn items(&self) -> Result<&[SequenceItem]> {
        match self.value() {
            Value::Sequence(items) => Ok(items),
            _ => self.wrong_vr("sequence items"),
        }
    }

    /// Retrieve the fragments of an encapsulated pixel data element.
    pub fn fragments(&self) -> Result<&PixelFragmentSequence> {
        match self.value() {
            Value::PixelSequence(seq) => Ok(seq),
            _ => self.wrong_vr("pixel data fragments"),
        }
    }

    /// Decode the full textual value as a single string,
    /// removing trailing padding.
    ///
    /// Multiple values remain separated by backslashes.
    pub fn to_str(&self) -> Result<String> {
        if !self.vr().is_textual() {
            return self.wrong_vr("string");
        }
        let bytes = self.primitive_bytes("string")?;
        let text = SpecificCharacterSet::Default.decode(bytes).map_err(|e| {
            MalformedSnafu {
                tag: self.tag(),
                vr: self.vr(),
                reason: e.to_string(),
            }
            .build()
        })?;
        Ok(text.trim_end_matches(|c| c == ' ' || c == '\0').to_string())
    }

    /// Decode the textual value as a list of strings,
    /// split by the backslash delimiter,
    /// with surrounding padding removed from each value.
    ///
    /// Text VRs which do not admit multiple values
    /// (`LT`, `ST`, `UT` and `UR`) always produce a single string.
    pub fn to_multi_str(&self) -> Result<Vec<String>> {
        let text = self.to_str()?;
        match self.vr() {
            VR::LT | VR::ST | VR::UT | VR::UR => Ok(vec![text]),
            _ => Ok(text
                .split('\\')
                .map(|s| s.trim_matches(|c| c == ' ' || c == '\0').to_string())
                .collect()),
        }
    }

    /// Convert the first value into an integer.
    ///
    /// Admitted VRs: `US`, `SS`, `UL`, `SL` and `IS`.
    pub fn to_int<T>(&self, byte_order: Endianness) -> Result<T>
    where
        T: NumCast,
    {
        self.to_multi_int(byte_order)?
            .into_iter()
            .next()
            .context(EmptySnafu { tag: self.tag() })
    }

    /// Convert all values into integers.
    ///
    /// Admitted VRs: `US`, `SS`, `UL`, `SL` and `IS`.
    pub fn to_multi_int<T>(&self, byte_order: Endianness) -> Result<Vec<T>>
    where
        T: NumCast,
    {
        let (tag, vr) = (self.tag(), self.vr());
        match vr {
            VR::US => {
                let bytes = self.primitive_bytes("integer")?;
                self.check_width(bytes, 2)?;
                cast_all(tag, vr, read_components!(bytes, byte_order, u16, 2, read_u16_into))
            }
            VR::SS => {
                let bytes = self.primitive_bytes("integer")?;
                self.check_width(bytes, 2)?;
                cast_all(tag, vr, read_components!(bytes, byte_order, i16, 2, read_i16_into))
            }
            VR::UL => {
                let bytes = self.primitive_bytes("integer")?;
                self.check_width(bytes, 4)?;
                cast_all(tag, vr, read_components!(bytes, byte_order, u32, 4, read_u32_into))
            }
            VR::SL => {
                let bytes = self.primitive_bytes("integer")?;
                self.check_width(bytes, 4)?;
                cast_all(tag, vr, read_components!(bytes, byte_order, i32, 4, read_i32_into))
            }
            VR::IS => {
                let values = self
                    .to_multi_str()?
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .map(|s| {
                        s.parse::<i64>().map_err(|e| {
                            MalformedSnafu {
                                tag,
                                vr,
                                reason: format!("`{}`: {}", s, e),
                            }
                            .build()
                        })
                    })
                    .collect::<Result<Vec<i64>>>()?;
                cast_all(tag, vr, values)
            }
            _ => self.wrong_vr("integer"),
        }
    }

    /// Convert the first value into a double precision floating point number.
    ///
    /// Admitted VRs: `FL`, `FD`, `DS`, and the integer VRs admitted by
    /// [`to_int`](DataElement::to_int).
    pub fn to_float64(&self, byte_order: Endianness) -> Result<f64> {
        self.to_multi_float64(byte_order)?
            .into_iter()
            .next()
            .context(EmptySnafu { tag: self.tag() })
    }

    /// Convert all values into double precision floating point numbers.
    pub fn to_multi_float64(&self, byte_order: Endianness) -> Result<Vec<f64>> {
        let (tag, vr) = (self.tag(), self.vr());
        match vr {
            VR::FL => {
                let bytes = self.primitive_bytes("float")?;
                self.check_width(bytes, 4)?;
                Ok(read_components!(bytes, byte_order, f32, 4, read_f32_into)
                    .into_iter()
                    .map(<f64 as From<f32>>::from)
                    .collect())
            }
            VR::FD => {
                let bytes = self.primitive_bytes("float")?;
                self.check_width(bytes, 8)?;
                Ok(read_components!(bytes, byte_order, f64, 8, read_f64_into))
            }
            VR::DS => self
                .to_multi_str()?
                .into_iter()
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<f64>().map_err(|e| {
                        MalformedSnafu {
                            tag,
                            vr,
                            reason: format!("`{}`: {}", s, e),
                        }
                        .build()
                    })
                })
                .collect(),
            VR::US | VR::SS | VR::UL | VR::SL | VR::IS => self.to_multi_int(byte_order),
            _ => self.wrong_vr("float"),
        }
    }

    /// Convert the first value into an attribute tag.
    ///
    /// Admitted VR: `AT`.
    pub fn to_tag(&self, byte_order: Endianness) -> Result<Tag> {
        if self.vr() != VR::AT {
            return self.wrong_vr("tag");
        }
        let bytes = self.primitive_bytes("tag")?;
        self.check_width(bytes, 4)?;
        let words = read_components!(bytes, byte_order, u16, 2, read_u16_into);
        match words.as_slice() {
            [group, element, ..] => Ok(Tag(*group, *element)),
            _ => EmptySnafu { tag: self.tag() }.fail(),
        }
    }

    /// Convert the value into a calendar date.
    ///
    /// Admitted VR: `DA`, in the form `YYYYMMDD`.
    pub fn to_date(&self) -> Result<NaiveDate> {
        if self.vr() != VR::DA {
            return self.wrong_vr("date");
        }
        let text = self.to_str()?;
        let text = text.trim();
        snafu::ensure!(!text.is_empty(), EmptySnafu { tag: self.tag() });
        NaiveDate::parse_from_str(text, "%Y%m%d").map_err(|e| {
            MalformedSnafu {
                tag: self.tag(),
                vr: self.vr(),
                reason: format!("`{}`: {}", text, e),
            }
            .build()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_trimmed_and_split() {
        let e = DataElement::new_strs(Tag(0x0008, 0x0008), VR::CS, &["ORIGINAL", "PRIMARY", "AXIAL"]);
        assert_eq!(e.to_str().unwrap(), "ORIGINAL\\PRIMARY\\AXIAL");
        assert_eq!(
            e.to_multi_str().unwrap(),
            vec!["ORIGINAL", "PRIMARY", "AXIAL"]
        );

        let e = DataElement::new_str(Tag(0x0008, 0x0018), VR::UI, "1.2.345");
        assert_eq!(e.to_str().unwrap(), "1.2.345");

        let e = DataElement::new_str(Tag(0x0020, 0x4000), VR::LT, "a\\b ");
        assert_eq!(e.to_multi_str().unwrap(), vec!["a\\b"]);
    }

    #[test]
    fn latin1_text_is_decoded() {
        let e = DataElement::new(Tag(0x0010, 0x0010), VR::PN, vec![b'J', 0xF6, b'r', b'g']);
        assert_eq!(e.to_str().unwrap(), "Jörg");
    }

    #[test]
    fn integers_from_binary_and_text() {
        let e = DataElement::new_u16(Tag(0x0028, 0x0010), &[512, 256], Endianness::Big);
        assert_eq!(e.to_int::<u32>(Endianness::Big).unwrap(), 512);
        assert_eq!(e.to_multi_int::<u16>(Endianness::Big).unwrap(), vec![512, 256]);

        let e = DataElement::new_i16(Tag(0x0028, 0x0106), &[-100], Endianness::Little);
        assert_eq!(e.to_int::<i32>(Endianness::Little).unwrap(), -100);
        // out of range for the target type
        assert!(matches!(
            e.to_int::<u16>(Endianness::Little),
            Err(ConvertValueError::Malformed { .. })
        ));

        let e = DataElement::new_str(Tag(0x0028, 0x0008), VR::IS, " 12");
        assert_eq!(e.to_int::<u32>(Endianness::Little).unwrap(), 12);

        let e = DataElement::new_str(Tag(0x0028, 0x0008), VR::IS, "twelve");
        assert!(matches!(
            e.to_int::<u32>(Endianness::Little),
            Err(ConvertValueError::Malformed { .. })
        ));
    }

    #[test]
    fn wrong_vr_is_reported() {
        let e = DataElement::new_str(Tag(0x0010, 0x0010), VR::PN, "Doe^John");
        assert!(matches!(
            e.to_int::<u16>(Endianness::Little),
            Err(ConvertValueError::WrongVr { vr: VR::PN, .. })
        ));
        assert!(matches!(
            e.to_tag(Endianness::Little),
            Err(ConvertValueError::WrongVr { .. })
        ));
        assert!(matches!(e.items(), Err(ConvertValueError::WrongVr { .. })));

        let e = DataElement::new(Tag(0x7FE0, 0x0010), VR::OB, vec![1, 2, 3, 4]);
        assert!(matches!(e.to_str(), Err(ConvertValueError::WrongVr { .. })));
    }

    #[test]
    fn odd_sized_binary_values_are_malformed() {
        let e = DataElement::new_with_len(
            Tag(0x0028, 0x0010),
            VR::UL,
            crate::Length(6),
            Value::Primitive(vec![0; 6]),
        )
        .unwrap();
        assert!(matches!(
            e.to_int::<u32>(Endianness::Little),
            Err(ConvertValueError::Malformed { .. })
        ));
    }

    #[test]
    fn empty_values_are_reported() {
        let e = DataElement::empty(Tag(0x0028, 0x1050), VR::DS);
        assert!(matches!(
            e.to_float64(Endianness::Little),
            Err(ConvertValueError::Empty { .. })
        ));
    }

    #[test]
    fn floats_and_decimal_strings() {
        let e = DataElement::new_strs(Tag(0x0028, 0x1050), VR::DS, &["40", "-20.5"]);
        assert_eq!(e.to_multi_float64(Endianness::Little).unwrap(), vec![40., -20.5]);

        let e = DataElement::new_f32(Tag(0x0018, 0x9087), &[1.5], Endianness::Big);
        assert_eq!(e.to_float64(Endianness::Big).unwrap(), 1.5);

        let e = DataElement::new_u16(Tag(0x0028, 0x0100), &[16], Endianness::Little);
        assert_eq!(e.to_float64(Endianness::Little).unwrap(), 16.);
    }

    #[test]
    fn tags_and_dates() {
        let e = DataElement::new_tags(Tag(0x0020, 0x9165), &[Tag(0x0018, 0x0050)], Endianness::Big);
        assert_eq!(e.to_tag(Endianness::Big).unwrap(), Tag(0x0018, 0x0050));

        let e = DataElement::new_str(Tag(0x0008, 0x0020), VR::DA, "20240131");
        assert_eq!(
            e.to_date().unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
        );
        let e = DataElement::new_str(Tag(0x0008, 0x0020), VR::DA, "20241331");
        assert!(matches!(e.to_date(), Err(ConvertValueError::Malformed { .. })));
    }
}
