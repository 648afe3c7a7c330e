//! In-memory collections of data elements.
//!
//! A [`DataSet`] holds the top-level elements of a DICOM object,
//! while a [`SequenceItem`] holds the elements of one item in a sequence.
//! Both are keyed by tag, so that each tag appears at most once,
//! and both iterate in ascending tag order regardless of insertion order.

use crate::header::{DataElement, Header, Tag};
use crate::value::ConvertValueError;
use byteordered::Endianness;
use num_traits::NumCast;
use snafu::{Backtrace, OptionExt, Snafu};
use std::collections::btree_map::{self, BTreeMap};
use std::iter::FromIterator;

/// Error type for a failed attempt to access a data element.
#[derive(Debug, Snafu)]
#[snafu(display("No such data element {}", tag))]
pub struct AccessError {
    /// the tag that was looked up
    pub tag: Tag,
    backtrace: Backtrace,
}

macro_rules! impl_element_set {
    ($t: ty) => {
        impl $t {
            /// Insert a data element,
            /// returning the element previously held with the same tag.
            pub fn put(&mut self, element: DataElement) -> Option<DataElement> {
                self.entries.insert(element.tag(), element)
            }

            /// Retrieve the data element with the given tag, if present.
            pub fn get(&self, tag: Tag) -> Option<&DataElement> {
                self.entries.get(&tag)
            }

            /// Retrieve the data element with the given tag,
            /// failing if it is not present.
            pub fn element(&self, tag: Tag) -> Result<&DataElement, AccessError> {
                self.entries.get(&tag).context(AccessSnafu { tag })
            }

            /// Remove and return the data element with the given tag.
            pub fn remove(&mut self, tag: Tag) -> Option<DataElement> {
                self.entries.remove(&tag)
            }

            /// Whether an element with the given tag is present.
            pub fn contains(&self, tag: Tag) -> bool {
                self.entries.contains_key(&tag)
            }

            /// Iterate over the data elements in ascending tag order.
            pub fn iter(&self) -> btree_map::Values<'_, Tag, DataElement> {
                self.entries.values()
            }

            /// Iterate over the tags in ascending order.
            pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
                self.entries.keys().copied()
            }

            /// The number of data elements.
            pub fn len(&self) -> usize {
                self.entries.len()
            }

            /// Whether there are no data elements.
            pub fn is_empty(&self) -> bool {
                self.entries.is_empty()
            }
        }

        impl<'a> IntoIterator for &'a $t {
            type Item = &'a DataElement;
            type IntoIter = btree_map::Values<'a, Tag, DataElement>;

            fn into_iter(self) -> Self::IntoIter {
                self.entries.values()
            }
        }

        impl IntoIterator for $t {
            type Item = DataElement;
            type IntoIter = btree_map::IntoValues<Tag, DataElement>;

            fn into_iter(self) -> Self::IntoIter {
                self.entries.into_values()
            }
        }

        impl Extend<DataElement> for $t {
            fn extend<I: IntoIterator<Item = DataElement>>(&mut self, iter: I) {
                for element in iter {
                    self.put(element);
                }
            }
        }
    };
}

/// A tag-keyed set of data elements forming one item of a sequence.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SequenceItem {
    entries: BTreeMap<Tag, DataElement>,
}

impl SequenceItem {
    /// Create an empty sequence item.
    pub fn new() -> Self {
        SequenceItem::default()
    }
}

impl_element_set!(SequenceItem);

impl FromIterator<DataElement> for SequenceItem {
    fn from_iter<I: IntoIterator<Item = DataElement>>(iter: I) -> Self {
        let mut item = SequenceItem::new();
        item.extend(iter);
        item
    }
}

/// A DICOM data set: the top-level data elements of an object,
/// keyed by tag.
///
/// The data set also records the byte order
/// of the binary values it holds,
/// which is the byte order of the transfer syntax it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    entries: BTreeMap<Tag, DataElement>,
    byte_order: Endianness,
}

impl Default for DataSet {
    fn default() -> Self {
        DataSet::new()
    }
}

impl DataSet {
    /// Create an empty data set with little endian values.
    pub fn new() -> Self {
        DataSet::with_byte_order(Endianness::Little)
    }

    /// Create an empty data set whose binary values
    /// are in the given byte order.
    pub fn with_byte_order(byte_order: Endianness) -> Self {
        DataSet {
            entries: BTreeMap::new(),
            byte_order,
        }
    }

    /// Create a data set from the given elements.
    /// Later elements replace earlier ones with the same tag.
    pub fn from_elements<I>(byte_order: Endianness, elements: I) -> Self
    where
        I: IntoIterator<Item = DataElement>,
    {
        let mut ds = DataSet::with_byte_order(byte_order);
        ds.extend(elements);
        ds
    }

    /// The byte order of the binary values in this data set.
    #[inline]
    pub fn byte_order(&self) -> Endianness {
        self.byte_order
    }

    /// Redefine the byte order of the binary values in this data set.
    ///
    /// This does not change the value bytes.
    #[inline]
    pub fn set_byte_order(&mut self, byte_order: Endianness) {
        self.byte_order = byte_order;
    }

    /// Keep only the data elements for which the predicate holds.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&DataElement) -> bool,
    {
        self.entries.retain(|_, e| f(e));
    }

    /// Convert the value of the element with the given tag
    /// into a single integer,
    /// using the byte order of this data set.
    ///
    /// Returns `None` if the element is not present.
    pub fn int<T: NumCast>(&self, tag: Tag) -> Option<Result<T, ConvertValueError>> {
        self.get(tag).map(|e| e.to_int(self.byte_order))
    }

    /// Convert the value of the element with the given tag
    /// into a sequence of integers,
    /// using the byte order of this data set.
    pub fn multi_int<T: NumCast>(&self, tag: Tag) -> Option<Result<Vec<T>, ConvertValueError>> {
        self.get(tag).map(|e| e.to_multi_int(self.byte_order))
    }

    /// Convert the value of the element with the given tag
    /// into a single floating point number,
    /// using the byte order of this data set.
    pub fn float64(&self, tag: Tag) -> Option<Result<f64, ConvertValueError>> {
        self.get(tag).map(|e| e.to_float64(self.byte_order))
    }

    /// Convert the value of the element with the given tag
    /// into a sequence of floating point numbers,
    /// using the byte order of this data set.
    pub fn multi_float64(&self, tag: Tag) -> Option<Result<Vec<f64>, ConvertValueError>> {
        self.get(tag).map(|e| e.to_multi_float64(self.byte_order))
    }

    /// Convert the value of the element with the given tag into a string.
    pub fn string(&self, tag: Tag) -> Option<Result<String, ConvertValueError>> {
        self.get(tag).map(|e| e.to_str())
    }

    /// Convert the value of the element with the given tag
    /// into its individual string values.
    pub fn multi_string(&self, tag: Tag) -> Option<Result<Vec<String>, ConvertValueError>> {
        self.get(tag).map(|e| e.to_multi_str())
    }
}

impl_element_set!(DataSet);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::VR;

    #[test]
    fn iteration_follows_tag_order() {
        let mut ds = DataSet::new();
        ds.put(DataElement::new_str(Tag(0x0010, 0x0010), VR::PN, "Doe^John"));
        ds.put(DataElement::new_str(Tag(0x0008, 0x0060), VR::CS, "MR"));
        ds.put(DataElement::new_str(Tag(0x0008, 0x0016), VR::UI, "1.2.3"));

        let tags: Vec<_> = ds.tags().collect();
        assert_eq!(
            tags,
            vec![Tag(0x0008, 0x0016), Tag(0x0008, 0x0060), Tag(0x0010, 0x0010)]
        );
    }

    #[test]
    fn tags_are_unique() {
        let mut item = SequenceItem::new();
        assert!(item
            .put(DataElement::new_str(Tag(0x0008, 0x1150), VR::UI, "1.2"))
            .is_none());
        let old = item.put(DataElement::new_str(Tag(0x0008, 0x1150), VR::UI, "1.3"));
        assert!(old.is_some());
        assert_eq!(item.len(), 1);
        assert_eq!(
            item.get(Tag(0x0008, 0x1150)).unwrap().to_str().unwrap(),
            "1.3"
        );
    }

    #[test]
    fn missing_elements() {
        let mut ds = DataSet::new();
        ds.put(DataElement::new_str(Tag(0x0008, 0x0060), VR::CS, "MR"));
        assert!(ds.element(Tag(0x0028, 0x0010)).is_err());
        assert!(ds.remove(Tag(0x0008, 0x0060)).is_some());
        assert!(ds.is_empty());
    }

    #[test]
    fn shortcuts_use_own_byte_order() {
        let mut ds = DataSet::with_byte_order(Endianness::Big);
        ds.put(DataElement::new_u16(Tag(0x0028, 0x0010), &[512], Endianness::Big));
        ds.put(DataElement::new_str(Tag(0x0028, 0x1050), VR::DS, "40\\60"));
        assert_eq!(ds.int::<u32>(Tag(0x0028, 0x0010)).unwrap().unwrap(), 512);
        assert_eq!(
            ds.multi_float64(Tag(0x0028, 0x1050)).unwrap().unwrap(),
            vec![40., 60.]
        );
        assert!(ds.int::<u16>(Tag(0x0028, 0x0011)).is_none());
    }
}
