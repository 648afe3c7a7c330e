#![crate_type = "lib"]
#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    missing_docs,
    unused_qualifications,
    unused_import_braces
)]

//! This is the core library of dcmkit, containing the data model
//! shared by every other crate in the toolkit.
//!
//! The current structure of this crate is as follows:
//!
//! - [`header`] comprises the basic data types for DICOM element headers,
//!   including the DICOM attribute tag, the value representation,
//!   the value length and the data element itself.
//! - [`value`] holds the value payload of a data element
//!   and the fallible conversions into typed values.
//! - [`dataset`] contains the tag-keyed collections of data elements:
//!   the data set and the sequence item.
//! - [`dictionary`] holds the small built-in table used to infer
//!   value representations in implicit VR encodings,
//!   plus tag and UID constants.
//! - [`text`] decodes and encodes textual values.
//!
//! [`dataset`]: ./dataset/index.html
//! [`dictionary`]: ./dictionary/index.html
//! [`header`]: ./header/index.html
//! [`text`]: ./text/index.html
//! [`value`]: ./value/index.html

pub mod dataset;
pub mod dictionary;
pub mod header;
pub mod text;
pub mod value;

pub use dataset::{DataSet, SequenceItem};
pub use dictionary::{tags, uids};
pub use header::{DataElement, DataElementHeader, Length, Tag, VR};
pub use value::{ConvertValueError, PixelFragmentSequence, Value};

// re-export crates that are part of the public API
pub use byteordered;
pub use byteordered::Endianness;
pub use chrono;
