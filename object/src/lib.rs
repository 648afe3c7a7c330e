#![allow(clippy::derive_partial_eq_without_eq)]
//! This crate contains the DICOM file layout:
//! a 128-byte preamble, the `DICM` magic code,
//! the file meta group in explicit VR little endian,
//! and then the main data set
//! in the transfer syntax named by the file meta group.
//!
//! Loading a DICOM file can be done with ease via the function [`open_file`].
//! For additional file reading options, use [`OpenFileOptions`].
//!
//! # Examples
//!
//! Read a file and fetch some attributes:
//!
//! ```no_run
//! use dcmkit_core::tags;
//! use dcmkit_object::open_file;
//! # fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let file = open_file("0001.dcm")?;
//!
//! let patient_name = file.dataset().element(tags::PATIENT_NAME)?.to_str()?;
//! let rows: u16 = file.dataset().element(tags::ROWS)?.to_int(file.dataset().byte_order())?;
//! # Ok(())
//! # }
//! ```
//!
//! The pixel data and following elements can be ignored
//! by using [`OpenFileOptions`]:
//!
//! ```no_run
//! use dcmkit_object::OpenFileOptions;
//!
//! let file = OpenFileOptions::new()
//!     .read_until(dcmkit_core::tags::PIXEL_DATA)
//!     .open_file("0002.dcm")?;
//! # Result::<(), dcmkit_object::ReadError>::Ok(())
//! ```
//!
//! New files are built from a data set and a [file meta table],
//! which is constructed with a [`FileMetaTableBuilder`]:
//!
//! [file meta table]: crate::meta::FileMetaTable
//!
//! ```
//! # use dcmkit_core::{uids, DataElement, DataSet, Tag, VR};
//! # use dcmkit_object::{DicomFile, FileMetaTableBuilder};
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut dataset = DataSet::new();
//! dataset.put(DataElement::new_str(Tag(0x0010, 0x0010), VR::PN, "Doe^John"));
//!
//! let meta = FileMetaTableBuilder::new()
//!     .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
//!     .media_storage_sop_class_uid(uids::SECONDARY_CAPTURE_IMAGE_STORAGE)
//!     .media_storage_sop_instance_uid("2.25.1234")
//!     .build()?;
//! let file = DicomFile::new(meta, dataset);
//! let bytes = file.to_bytes()?;
//! assert_eq!(&bytes[128..132], b"DICM");
//! # Ok(())
//! # }
//! # run().unwrap();
//! ```
pub mod file;
pub mod meta;

pub use crate::file::{from_reader, open_file, OpenFileOptions, ReadPreamble};
pub use crate::meta::{FileMetaTable, FileMetaTableBuilder};
pub use dcmkit_core::{DataSet, Tag};

use dcmkit_encoding::transfer_syntax::lookup;
use dcmkit_parser::write_dataset;
use snafu::{Backtrace, OptionExt, ResultExt, Snafu};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// The current implementation class UID generically referring to this toolkit.
///
/// Automatically generated as per the standard, part 5, section B.2.
///
/// This UID is subject to changes in future versions.
pub const IMPLEMENTATION_CLASS_UID: &str = "2.25.240912937113094745185218374452710925511";

/// The current implementation version name generically referring to this toolkit.
///
/// This names is subject to changes in future versions.
pub const IMPLEMENTATION_VERSION_NAME: &str = "DCMKIT 0.3";

/// An error which may occur when loading a DICOM file
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ReadError {
    #[snafu(display("Could not open file '{}'", filename.display()))]
    OpenFile {
        filename: std::path::PathBuf,
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not read from file '{}'", filename.display()))]
    ReadFile {
        filename: std::path::PathBuf,
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not read from source"))]
    ReadSource {
        backtrace: Backtrace,
        source: std::io::Error,
    },
    /// The source is too short to hold the preamble
    #[snafu(display("Missing or incomplete file preamble"))]
    InvalidPreamble { backtrace: Backtrace },
    #[snafu(display("Could not parse meta group data set"))]
    ParseMetaDataSet {
        #[snafu(backtrace)]
        source: crate::meta::Error,
    },
    #[snafu(display("Unsupported transfer syntax `{}`", uid))]
    ReadUnsupportedTransferSyntax { uid: String, backtrace: Backtrace },
    #[snafu(display("Could not parse data set"))]
    ParseDataSet {
        #[snafu(backtrace)]
        source: dcmkit_parser::ReadError,
    },
}

/// An error which may occur when writing a DICOM file
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum WriteError {
    #[snafu(display("Could not write to file '{}'", filename.display()))]
    WriteFile {
        filename: std::path::PathBuf,
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not write object preamble"))]
    WritePreamble {
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not write magic code"))]
    WriteMagicCode {
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not print meta group data set"))]
    PrintMetaDataSet {
        #[snafu(backtrace)]
        source: crate::meta::Error,
    },
    #[snafu(display("Could not print data set"))]
    PrintDataSet {
        #[snafu(backtrace)]
        source: dcmkit_parser::WriteError,
    },
    #[snafu(display("Unsupported transfer syntax `{}`", uid))]
    WriteUnsupportedTransferSyntax { uid: String, backtrace: Backtrace },
}

pub type Result<T, E = ReadError> = std::result::Result<T, E>;

/// A DICOM file in memory:
/// its file meta group and its main data set.
#[derive(Debug, Clone, PartialEq)]
pub struct DicomFile {
    meta: FileMetaTable,
    dataset: DataSet,
    truncated: bool,
}

impl DicomFile {
    /// Create a file object from a file meta table and a data set.
    ///
    /// The data set is expected to be in the byte order
    /// of the transfer syntax named by the table.
    pub fn new(meta: FileMetaTable, dataset: DataSet) -> Self {
        DicomFile::with_truncation(meta, dataset, false)
    }

    pub(crate) fn with_truncation(meta: FileMetaTable, dataset: DataSet, truncated: bool) -> Self {
        DicomFile {
            meta,
            dataset,
            truncated,
        }
    }

    /// Retrieve the processed meta header table.
    pub fn meta(&self) -> &FileMetaTable {
        &self.meta
    }

    /// Retrieve a mutable reference to the processed meta header table.
    ///
    /// Considerable care should be taken when modifying this table,
    /// as it may influence object reading and writing operations.
    pub fn meta_mut(&mut self) -> &mut FileMetaTable {
        &mut self.meta
    }

    /// Retrieve the main data set.
    pub fn dataset(&self) -> &DataSet {
        &self.dataset
    }

    /// Retrieve a mutable reference to the main data set.
    pub fn dataset_mut(&mut self) -> &mut DataSet {
        &mut self.dataset
    }

    /// Whether the source ended before the data set did.
    ///
    /// The elements read up to that point are still available.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Split the file object into its meta table and its data set.
    pub fn into_parts(self) -> (FileMetaTable, DataSet) {
        (self.meta, self.dataset)
    }

    /// Write the entire object as a DICOM file
    /// into the given file path.
    /// Preamble, magic code, and file meta group will be included
    /// before the data set.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), WriteError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        let file = File::create(path).context(WriteFileSnafu { filename: path })?;
        let mut to = BufWriter::new(file);
        to.write_all(&bytes)
            .context(WriteFileSnafu { filename: path })?;
        to.flush().context(WriteFileSnafu { filename: path })
    }

    /// Write the entire object as a DICOM file
    /// into the given writer.
    /// Preamble, magic code, and file meta group will be included
    /// before the data set.
    pub fn write_all<W: Write>(&self, mut to: W) -> Result<(), WriteError> {
        // write preamble
        to.write_all(&[0_u8; 128][..]).context(WritePreambleSnafu)?;

        // write magic sequence
        to.write_all(b"DICM").context(WriteMagicCodeSnafu)?;

        // write meta group
        self.meta.write(&mut to).context(PrintMetaDataSetSnafu)?;

        self.write_dataset(to)
    }

    /// Encode the entire object as a DICOM file into a new buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>, WriteError> {
        let mut out = Vec::new();
        self.write_all(&mut out)?;
        Ok(out)
    }

    /// Write the file meta group set into the given writer.
    ///
    /// This is equivalent to `self.meta().write(to)`.
    pub fn write_meta<W: Write>(&self, to: W) -> Result<(), WriteError> {
        self.meta.write(to).context(PrintMetaDataSetSnafu)
    }

    /// Write the main data set into the given writer,
    /// without preamble, magic code, nor file meta group.
    ///
    /// The transfer syntax is selected from the file meta table.
    pub fn write_dataset<W: Write>(&self, to: W) -> Result<(), WriteError> {
        let ts = lookup(self.meta.transfer_syntax()).with_context(|| {
            WriteUnsupportedTransferSyntaxSnafu {
                uid: self.meta.transfer_syntax(),
            }
        })?;
        write_dataset(to, &self.dataset, ts).context(PrintDataSetSnafu)
    }
}
