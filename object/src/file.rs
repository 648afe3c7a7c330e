use dcmkit_core::Tag;
use dcmkit_encoding::transfer_syntax::{KnownTransferSyntaxes, TransferSyntaxIndex};
use dcmkit_parser::{parse_dataset, ParseOptions};
use snafu::{OptionExt, ResultExt};
use tracing::warn;

use crate::meta::FileMetaTable;
use crate::{
    DicomFile, InvalidPreambleSnafu, OpenFileSnafu, ParseDataSetSnafu, ParseMetaDataSetSnafu,
    ReadFileSnafu, ReadSourceSnafu, ReadUnsupportedTransferSyntaxSnafu, Result,
};
use std::io::Read;
use std::path::Path;

const PREAMBLE_LEN: usize = 128;

/// Create a DICOM file object by reading from a byte source.
///
/// The preamble is detected automatically.
pub fn from_reader<F>(file: F) -> Result<DicomFile>
where
    F: Read,
{
    OpenFileOptions::new().from_reader(file)
}

/// Create a DICOM file object by reading from a file.
///
/// The preamble is detected automatically.
pub fn open_file<P>(path: P) -> Result<DicomFile>
where
    P: AsRef<Path>,
{
    OpenFileOptions::new().open_file(path)
}

/// A builder type for opening a DICOM file with additional options.
///
/// This builder exposes additional properties
/// to configure the reading of a DICOM file.
///
/// # Example
///
/// Create a `OpenFileOptions`,
/// call adaptor methods in a chain,
/// and finish the operation with [`.open_file()`](OpenFileOptions::open_file).
///
/// ```no_run
/// # use dcmkit_object::OpenFileOptions;
/// let file = OpenFileOptions::new()
///     .read_until(dcmkit_core::tags::PIXEL_DATA)
///     .open_file("path/to/file.dcm")?;
/// # Result::<(), Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Default, Clone)]
#[non_exhaustive]
pub struct OpenFileOptions<T = KnownTransferSyntaxes> {
    ts_index: T,
    read_until: Option<Tag>,
    read_preamble: ReadPreamble,
}

impl OpenFileOptions {
    pub fn new() -> Self {
        OpenFileOptions::default()
    }
}

impl<T> OpenFileOptions<T> {
    /// Set the operation to read only until the given tag is found.
    ///
    /// The reading process ends immediately before this tag,
    /// or any other tag that is next in the standard DICOM tag ordering,
    /// is found in the object's root data set.
    /// An element with the exact tag will be excluded from the output.
    pub fn read_until(mut self, tag: Tag) -> Self {
        self.read_until = Some(tag);
        self
    }

    /// Set the operation to read all elements of the data set to the end.
    ///
    /// This is the default behavior.
    pub fn read_all(mut self) -> Self {
        self.read_until = None;
        self
    }

    /// Set whether to read the 128-byte DICOM file preamble.
    pub fn read_preamble(mut self, option: ReadPreamble) -> Self {
        self.read_preamble = option;
        self
    }

    /// Set the transfer syntax index to use when reading the file,
    /// such as a codec registry.
    pub fn transfer_syntax_index<Tr>(self, ts_index: Tr) -> OpenFileOptions<Tr>
    where
        Tr: TransferSyntaxIndex,
    {
        OpenFileOptions {
            read_until: self.read_until,
            read_preamble: self.read_preamble,
            ts_index,
        }
    }

    /// Open the file at the given path.
    pub fn open_file<P>(self, path: P) -> Result<DicomFile>
    where
        P: AsRef<Path>,
        T: TransferSyntaxIndex,
    {
        let path = path.as_ref();
        let mut file =
            std::fs::File::open(path).with_context(|_| OpenFileSnafu { filename: path })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .with_context(|_| ReadFileSnafu { filename: path })?;
        self.from_bytes(&bytes)
    }

    /// Obtain a DICOM file object by reading from a byte source
    /// until its end.
    pub fn from_reader<R>(self, mut from: R) -> Result<DicomFile>
    where
        R: Read,
        T: TransferSyntaxIndex,
    {
        let mut bytes = Vec::new();
        from.read_to_end(&mut bytes).context(ReadSourceSnafu)?;
        self.from_bytes(&bytes)
    }

    /// Obtain a DICOM file object from its encoded bytes.
    pub fn from_bytes(self, bytes: &[u8]) -> Result<DicomFile>
    where
        T: TransferSyntaxIndex,
    {
        let start = match self.read_preamble {
            ReadPreamble::Never => 0,
            ReadPreamble::Always => {
                snafu::ensure!(bytes.len() >= PREAMBLE_LEN, InvalidPreambleSnafu);
                PREAMBLE_LEN
            }
            ReadPreamble::Auto => detect_preamble(bytes),
        };

        let (meta, meta_len) =
            FileMetaTable::from_bytes(&bytes[start..]).context(ParseMetaDataSetSnafu)?;
        let ts = self
            .ts_index
            .get(meta.transfer_syntax())
            .with_context(|| ReadUnsupportedTransferSyntaxSnafu {
                uid: meta.transfer_syntax(),
            })?;

        let mut options = ParseOptions::new();
        if let Some(tag) = self.read_until {
            options = options.stop_before(tag);
        }
        let parsed =
            parse_dataset(&bytes[start + meta_len..], ts, options).context(ParseDataSetSnafu)?;
        if parsed.truncated {
            warn!("DICOM file ended before its data set did");
        }
        Ok(DicomFile::with_truncation(meta, parsed.dataset, parsed.truncated))
    }
}

/// Find where the magic code starts:
/// after a preamble if there is one, or at the very beginning.
fn detect_preamble(bytes: &[u8]) -> usize {
    if bytes.get(PREAMBLE_LEN..PREAMBLE_LEN + 4) == Some(&b"DICM"[..]) {
        PREAMBLE_LEN
    } else {
        0
    }
}

/// An enumerate of supported options for
/// whether to read the 128-byte DICOM file preamble.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum ReadPreamble {
    /// Skip the preamble if the magic code is found right after it,
    /// otherwise assume that the source starts with the magic code.
    Auto,
    /// Never read the preamble,
    /// thus assuming that the original source does not have it.
    Never,
    /// Always read the preamble first,
    /// thus assuming that the original source always has it.
    Always,
}

impl Default for ReadPreamble {
    fn default() -> Self {
        ReadPreamble::Auto
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_preamble_position() {
        let mut bytes = vec![0u8; 140];
        bytes[128..132].copy_from_slice(b"DICM");
        assert_eq!(detect_preamble(&bytes), 128);
        assert_eq!(detect_preamble(b"DICM\x02\x00"), 0);
        assert_eq!(detect_preamble(&[]), 0);
    }

    #[test]
    fn preamble_required_but_missing() {
        let err = OpenFileOptions::new()
            .read_preamble(ReadPreamble::Always)
            .from_bytes(b"DICM")
            .unwrap_err();
        assert!(matches!(err, crate::ReadError::InvalidPreamble { .. }));
    }
}
