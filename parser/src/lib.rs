#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    unused_qualifications,
    unused_import_braces
)]
//! This crate works on top of the DICOM encoding primitives
//! to provide the transformation of a byte buffer into a [`DataSet`]
//! and back.
//!
//! - The [`dataset::read`] module parses a whole data set
//!   from memory with a recursive descent parser,
//!   building the nested sequences and encapsulated pixel data.
//!   A truncated input is not an error:
//!   the parser keeps everything it could read
//!   and reports the truncation in the outcome.
//! - The [`dataset::write`] module serializes a data set
//!   in any of the supported transfer syntaxes.
//!
//! [`DataSet`]: dcmkit_core::DataSet
//!
//! # Example
//!
//! ```
//! # use dcmkit_core::{DataSet, DataElement, Tag, VR};
//! # use dcmkit_encoding::transfer_syntax::entries;
//! use dcmkit_parser::{parse_dataset, write_dataset_to_vec, ParseOptions};
//!
//! let mut dataset = DataSet::new();
//! dataset.put(DataElement::new_str(Tag(0x0010, 0x0010), VR::PN, "Doe^John"));
//! let ts = entries::EXPLICIT_VR_LITTLE_ENDIAN;
//! let bytes = write_dataset_to_vec(&dataset, &ts)?;
//! let parsed = parse_dataset(&bytes, &ts, ParseOptions::new())?;
//! assert!(!parsed.truncated);
//! assert_eq!(parsed.dataset, dataset);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod dataset;
#[cfg(feature = "deflate")]
mod deflate;

pub use dataset::read::{
    parse_dataset, parse_dataset_with, Error as ReadError, ParseOptions, ParsedDataSet,
};
pub use dataset::write::{
    write_dataset, write_dataset_to_vec, write_element, write_item, Error as WriteError,
};
