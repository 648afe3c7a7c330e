//! Module containing data structures and readers of DICOM file meta information tables.
use byteordered::byteorder::{ByteOrder, LittleEndian};
use dcmkit_core::value::ConvertValueError;
use dcmkit_core::{tags, DataElement, DataSet, Endianness, Tag, VR};
use dcmkit_encoding::transfer_syntax::{entries, trim_uid};
use dcmkit_parser::{parse_dataset, write_dataset, ParseOptions};
use snafu::{Backtrace, OptionExt, ResultExt, Snafu};
use std::io::Write;
use tracing::warn;

use crate::{IMPLEMENTATION_CLASS_UID, IMPLEMENTATION_VERSION_NAME};

const DICM_MAGIC_CODE: [u8; 4] = [b'D', b'I', b'C', b'M'];

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// Invalid DICOM data, detected from checking the `DICM` code.
    #[snafu(display("Invalid DICOM data, magic code `DICM` not found"))]
    InvalidMagic { backtrace: Backtrace },

    /// The file meta group data set could not be parsed.
    #[snafu(display("Could not parse file meta group data set"))]
    ParseGroup {
        #[snafu(backtrace)]
        source: dcmkit_parser::ReadError,
    },

    /// A required file meta data element is missing.
    #[snafu(display("Missing data element `{}`", alias))]
    MissingElement {
        alias: &'static str,
        backtrace: Backtrace,
    },

    /// The value of a file meta data element could not be read.
    #[snafu(display("Could not read value of `{}`", alias))]
    ConvertValue {
        alias: &'static str,
        #[snafu(backtrace)]
        source: ConvertValueError,
    },

    /// The file meta group data set could not be written.
    #[snafu(display("Could not write file meta group data set"))]
    WriteSet {
        #[snafu(backtrace)]
        source: dcmkit_parser::WriteError,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// DICOM File Meta Information Table.
///
/// This data type contains the relevant parts of the file meta information table, as
/// specified in [1].
///
/// UIDs are kept padded to an even length with a trailing null character,
/// and other text with a trailing space,
/// just as they are encoded.
///
/// [1]: http://dicom.nema.org/medical/dicom/current/output/chtml/part06/chapter_7.html
#[derive(Debug, Clone, PartialEq)]
pub struct FileMetaTable {
    /// File Meta Information Group Length
    pub information_group_length: u32,
    /// File Meta Information Version
    pub information_version: [u8; 2],
    /// Media Storage SOP Class UID
    pub media_storage_sop_class_uid: String,
    /// Media Storage SOP Instance UID
    pub media_storage_sop_instance_uid: String,
    /// Transfer Syntax UID
    pub transfer_syntax: String,
    /// Implementation Class UID
    pub implementation_class_uid: String,

    /// Implementation Version Name
    pub implementation_version_name: Option<String>,
    /// Source Application Entity Title
    pub source_application_entity_title: Option<String>,
    /// Sending Application Entity Title
    pub sending_application_entity_title: Option<String>,
    /// Receiving Application Entity Title
    pub receiving_application_entity_title: Option<String>,
    /// Private Information Creator UID
    pub private_information_creator_uid: Option<String>,
    /// Private Information
    pub private_information: Option<Vec<u8>>,
}

/// Read the value of the group length element
/// if it is the first element of the group.
fn declared_group_length(group: &[u8]) -> Option<u32> {
    if group.len() < 12 {
        return None;
    }
    let tag = Tag(
        LittleEndian::read_u16(&group[0..2]),
        LittleEndian::read_u16(&group[2..4]),
    );
    if tag != tags::FILE_META_INFORMATION_GROUP_LENGTH
        || &group[4..6] != b"UL"
        || LittleEndian::read_u16(&group[6..8]) != 4
    {
        return None;
    }
    Some(LittleEndian::read_u32(&group[8..12]))
}

fn read_string(dataset: &DataSet, tag: Tag, alias: &'static str) -> Result<Option<String>> {
    dataset
        .string(tag)
        .transpose()
        .context(ConvertValueSnafu { alias })
}

/// The number of bytes taken by an element in explicit VR little endian.
fn encoded_len(element: &DataElement) -> u32 {
    let header_len = if element.vr().has_u32_length() { 12 } else { 8 };
    header_len + element.header().len.0
}

impl FileMetaTable {
    /// Read the file meta group from the start of `bytes`,
    /// which must begin with the `DICM` magic code.
    ///
    /// The group ends at the length declared by its group length element
    /// or at the first element outside of group 0002,
    /// whichever comes first.
    /// Returns the table and the number of bytes consumed,
    /// magic code included.
    pub fn from_bytes(bytes: &[u8]) -> Result<(Self, usize)> {
        snafu::ensure!(
            bytes.len() >= 4 && bytes[..4] == DICM_MAGIC_CODE,
            InvalidMagicSnafu
        );
        let group = &bytes[4..];
        let end = match declared_group_length(group) {
            Some(len) => usize::min(12 + len as usize, group.len()),
            None => {
                warn!("File meta group does not start with its group length");
                group.len()
            }
        };
        let parsed = parse_dataset(
            &group[..end],
            &entries::EXPLICIT_VR_LITTLE_ENDIAN,
            ParseOptions::new().stop_before(Tag(0x0003, 0x0000)),
        )
        .context(ParseGroupSnafu)?;
        if parsed.truncated {
            warn!("File meta group is truncated");
        }
        let table = FileMetaTable::from_dataset(&parsed.dataset)?;
        Ok((table, 4 + parsed.bytes_read))
    }

    /// Build a table from the elements of a file meta group.
    pub fn from_dataset(dataset: &DataSet) -> Result<Self> {
        let mut builder = FileMetaTableBuilder::new();
        if let Some(len) = dataset.int::<u32>(tags::FILE_META_INFORMATION_GROUP_LENGTH) {
            builder = builder.group_length(len.context(ConvertValueSnafu {
                alias: "FileMetaInformationGroupLength",
            })?);
        }
        if let Some(version) = dataset
            .get(tags::FILE_META_INFORMATION_VERSION)
            .and_then(|e| e.value().as_bytes())
        {
            if version.len() == 2 {
                builder = builder.information_version([version[0], version[1]]);
            } else {
                warn!(
                    "Ignoring file meta information version of {} bytes",
                    version.len()
                );
            }
        }
        if let Some(v) = read_string(
            dataset,
            tags::MEDIA_STORAGE_SOP_CLASS_UID,
            "MediaStorageSOPClassUID",
        )? {
            builder = builder.media_storage_sop_class_uid(v);
        }
        if let Some(v) = read_string(
            dataset,
            tags::MEDIA_STORAGE_SOP_INSTANCE_UID,
            "MediaStorageSOPInstanceUID",
        )? {
            builder = builder.media_storage_sop_instance_uid(v);
        }
        match read_string(dataset, tags::TRANSFER_SYNTAX_UID, "TransferSyntax")? {
            Some(v) => builder = builder.transfer_syntax(v),
            None => {
                warn!("Missing transfer syntax, assuming Explicit VR Little Endian");
                builder = builder.transfer_syntax(entries::EXPLICIT_VR_LITTLE_ENDIAN.uid());
            }
        }
        if let Some(v) = read_string(
            dataset,
            tags::IMPLEMENTATION_CLASS_UID,
            "ImplementationClassUID",
        )? {
            builder = builder.implementation_class_uid(v);
        }
        if let Some(v) = read_string(
            dataset,
            tags::IMPLEMENTATION_VERSION_NAME,
            "ImplementationVersionName",
        )? {
            builder = builder.implementation_version_name(v);
        }
        if let Some(v) = read_string(
            dataset,
            tags::SOURCE_APPLICATION_ENTITY_TITLE,
            "SourceApplicationEntityTitle",
        )? {
            builder = builder.source_application_entity_title(v);
        }
        if let Some(v) = read_string(
            dataset,
            tags::SENDING_APPLICATION_ENTITY_TITLE,
            "SendingApplicationEntityTitle",
        )? {
            builder = builder.sending_application_entity_title(v);
        }
        if let Some(v) = read_string(
            dataset,
            tags::RECEIVING_APPLICATION_ENTITY_TITLE,
            "ReceivingApplicationEntityTitle",
        )? {
            builder = builder.receiving_application_entity_title(v);
        }
        if let Some(v) = read_string(
            dataset,
            tags::PRIVATE_INFORMATION_CREATOR_UID,
            "PrivateInformationCreatorUID",
        )? {
            builder = builder.private_information_creator_uid(v);
        }
        if let Some(v) = dataset
            .get(tags::PRIVATE_INFORMATION)
            .and_then(|e| e.value().as_bytes())
        {
            builder = builder.private_information(v);
        }
        builder.build()
    }

    /// The transfer syntax UID, without padding.
    pub fn transfer_syntax(&self) -> &str {
        trim_uid(&self.transfer_syntax)
    }

    /// The media storage SOP class UID, without padding.
    pub fn media_storage_sop_class_uid(&self) -> &str {
        trim_uid(&self.media_storage_sop_class_uid)
    }

    /// The media storage SOP instance UID, without padding.
    pub fn media_storage_sop_instance_uid(&self) -> &str {
        trim_uid(&self.media_storage_sop_instance_uid)
    }

    /// Replace the transfer syntax UID
    /// and update the group length accordingly.
    pub fn set_transfer_syntax(&mut self, uid: &str) {
        self.transfer_syntax = ui_padded(uid);
        self.update_information_group_length();
    }

    /// Recompute the group length from the current elements.
    pub fn update_information_group_length(&mut self) {
        self.information_group_length = self.elements().iter().map(encoded_len).sum();
    }

    /// The elements of the group, except for the group length.
    fn elements(&self) -> Vec<DataElement> {
        let mut elems = vec![
            DataElement::new(
                tags::FILE_META_INFORMATION_VERSION,
                VR::OB,
                self.information_version.to_vec(),
            ),
            DataElement::new_str(
                tags::MEDIA_STORAGE_SOP_CLASS_UID,
                VR::UI,
                &self.media_storage_sop_class_uid,
            ),
            DataElement::new_str(
                tags::MEDIA_STORAGE_SOP_INSTANCE_UID,
                VR::UI,
                &self.media_storage_sop_instance_uid,
            ),
            DataElement::new_str(tags::TRANSFER_SYNTAX_UID, VR::UI, &self.transfer_syntax),
            DataElement::new_str(
                tags::IMPLEMENTATION_CLASS_UID,
                VR::UI,
                &self.implementation_class_uid,
            ),
        ];
        if let Some(v) = &self.implementation_version_name {
            elems.push(DataElement::new_str(tags::IMPLEMENTATION_VERSION_NAME, VR::SH, v));
        }
        if let Some(v) = &self.source_application_entity_title {
            elems.push(DataElement::new_str(
                tags::SOURCE_APPLICATION_ENTITY_TITLE,
                VR::AE,
                v,
            ));
        }
        if let Some(v) = &self.sending_application_entity_title {
            elems.push(DataElement::new_str(
                tags::SENDING_APPLICATION_ENTITY_TITLE,
                VR::AE,
                v,
            ));
        }
        if let Some(v) = &self.receiving_application_entity_title {
            elems.push(DataElement::new_str(
                tags::RECEIVING_APPLICATION_ENTITY_TITLE,
                VR::AE,
                v,
            ));
        }
        if let Some(v) = &self.private_information_creator_uid {
            elems.push(DataElement::new_str(
                tags::PRIVATE_INFORMATION_CREATOR_UID,
                VR::UI,
                v,
            ));
        }
        if let Some(v) = &self.private_information {
            elems.push(DataElement::new(tags::PRIVATE_INFORMATION, VR::OB, v.clone()));
        }
        elems
    }

    /// Build the file meta group data set,
    /// with a group length computed from the other elements.
    pub fn to_dataset(&self) -> DataSet {
        let elements = self.elements();
        let group_length: u32 = elements.iter().map(encoded_len).sum();
        let mut dataset = DataSet::from_elements(Endianness::Little, elements);
        dataset.put(DataElement::new_u32(
            tags::FILE_META_INFORMATION_GROUP_LENGTH,
            &[group_length],
            Endianness::Little,
        ));
        dataset
    }

    /// Write the file meta group in explicit VR little endian,
    /// without the magic code.
    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        write_dataset(
            writer,
            &self.to_dataset(),
            &entries::EXPLICIT_VR_LITTLE_ENDIAN,
        )
        .context(WriteSetSnafu)
    }
}

/// A builder for DICOM meta information tables.
#[derive(Debug, Default, Clone)]
pub struct FileMetaTableBuilder {
    /// File Meta Information Group Length (UL)
    information_group_length: Option<u32>,
    /// File Meta Information Version (OB)
    information_version: Option<[u8; 2]>,
    /// Media Storage SOP Class UID (UI)
    media_storage_sop_class_uid: Option<String>,
    /// Media Storage SOP Instance UID (UI)
    media_storage_sop_instance_uid: Option<String>,
    /// Transfer Syntax UID (UI)
    transfer_syntax: Option<String>,
    /// Implementation Class UID (UI)
    implementation_class_uid: Option<String>,

    /// Implementation Version Name (SH)
    implementation_version_name: Option<String>,
    /// Source Application Entity Title (AE)
    source_application_entity_title: Option<String>,
    /// Sending Application Entity Title (AE)
    sending_application_entity_title: Option<String>,
    /// Receiving Application Entity Title (AE)
    receiving_application_entity_title: Option<String>,
    /// Private Information Creator UID (UI)
    private_information_creator_uid: Option<String>,
    /// Private Information (OB)
    private_information: Option<Vec<u8>>,
}

/// Ensure that the string is even lengthed, by adding a trailing character
/// if not.
#[inline]
fn padded<T>(s: T, pad: char) -> String
where
    T: Into<String>,
{
    let mut s = s.into();
    if s.len() % 2 == 1 {
        s.push(pad);
    }
    s
}

/// Ensure that the string is even lengthed with trailing '\0's.
fn ui_padded<T>(s: T) -> String
where
    T: Into<String>,
{
    padded(s, '\0')
}

/// Ensure that the string is even lengthed with trailing spaces.
fn txt_padded<T>(s: T) -> String
where
    T: Into<String>,
{
    padded(s, ' ')
}

impl FileMetaTableBuilder {
    /// Create a new, empty builder.
    pub fn new() -> FileMetaTableBuilder {
        FileMetaTableBuilder::default()
    }

    /// Define the meta information group length.
    pub fn group_length(mut self, value: u32) -> FileMetaTableBuilder {
        self.information_group_length = Some(value);
        self
    }

    /// Define the meta information version.
    pub fn information_version(mut self, value: [u8; 2]) -> FileMetaTableBuilder {
        self.information_version = Some(value);
        self
    }

    /// Define the media storage SOP class UID.
    pub fn media_storage_sop_class_uid<T>(mut self, value: T) -> FileMetaTableBuilder
    where
        T: Into<String>,
    {
        self.media_storage_sop_class_uid = Some(ui_padded(value));
        self
    }

    /// Define the media storage SOP instance UID.
    pub fn media_storage_sop_instance_uid<T>(mut self, value: T) -> FileMetaTableBuilder
    where
        T: Into<String>,
    {
        self.media_storage_sop_instance_uid = Some(ui_padded(value));
        self
    }

    /// Define the transfer syntax UID.
    pub fn transfer_syntax<T>(mut self, value: T) -> FileMetaTableBuilder
    where
        T: Into<String>,
    {
        self.transfer_syntax = Some(ui_padded(value));
        self
    }

    /// Define the implementation class UID.
    pub fn implementation_class_uid<T>(mut self, value: T) -> FileMetaTableBuilder
    where
        T: Into<String>,
    {
        self.implementation_class_uid = Some(ui_padded(value));
        self
    }

    /// Define the implementation version name.
    pub fn implementation_version_name<T>(mut self, value: T) -> FileMetaTableBuilder
    where
        T: Into<String>,
    {
        self.implementation_version_name = Some(txt_padded(value));
        self
    }

    /// Define the source application entity title.
    pub fn source_application_entity_title<T>(mut self, value: T) -> FileMetaTableBuilder
    where
        T: Into<String>,
    {
        self.source_application_entity_title = Some(txt_padded(value));
        self
    }

    /// Define the sending application entity title.
    pub fn sending_application_entity_title<T>(mut self, value: T) -> FileMetaTableBuilder
    where
        T: Into<String>,
    {
        self.sending_application_entity_title = Some(txt_padded(value));
        self
    }

    /// Define the receiving application entity title.
    pub fn receiving_application_entity_title<T>(mut self, value: T) -> FileMetaTableBuilder
    where
        T: Into<String>,
    {
        self.receiving_application_entity_title = Some(txt_padded(value));
        self
    }

    /// Define the private information creator UID.
    pub fn private_information_creator_uid<T>(mut self, value: T) -> FileMetaTableBuilder
    where
        T: Into<String>,
    {
        self.private_information_creator_uid = Some(ui_padded(value));
        self
    }

    /// Define the private information as a vector of bytes.
    pub fn private_information<T>(mut self, value: T) -> FileMetaTableBuilder
    where
        T: Into<Vec<u8>>,
    {
        self.private_information = Some(value.into());
        self
    }

    /// Build the table.
    ///
    /// The implementation class UID and version name
    /// default to the ones of this toolkit,
    /// and the group length is computed when not defined.
    pub fn build(self) -> Result<FileMetaTable> {
        // Missing information version, will assume (00H, 01H)
        let information_version = self.information_version.unwrap_or([0, 1]);
        let media_storage_sop_class_uid =
            self.media_storage_sop_class_uid
                .context(MissingElementSnafu {
                    alias: "MediaStorageSOPClassUID",
                })?;
        let media_storage_sop_instance_uid =
            self.media_storage_sop_instance_uid
                .context(MissingElementSnafu {
                    alias: "MediaStorageSOPInstanceUID",
                })?;
        let transfer_syntax = self.transfer_syntax.context(MissingElementSnafu {
            alias: "TransferSyntax",
        })?;
        let (implementation_class_uid, implementation_version_name) =
            match self.implementation_class_uid {
                Some(uid) => (uid, self.implementation_version_name),
                None => (
                    ui_padded(IMPLEMENTATION_CLASS_UID),
                    self.implementation_version_name
                        .or_else(|| Some(txt_padded(IMPLEMENTATION_VERSION_NAME))),
                ),
            };

        let mut table = FileMetaTable {
            information_group_length: 0,
            information_version,
            media_storage_sop_class_uid,
            media_storage_sop_instance_uid,
            transfer_syntax,
            implementation_class_uid,
            implementation_version_name,
            source_application_entity_title: self.source_application_entity_title,
            sending_application_entity_title: self.sending_application_entity_title,
            receiving_application_entity_title: self.receiving_application_entity_title,
            private_information_creator_uid: self.private_information_creator_uid,
            private_information: self.private_information,
        };
        match self.information_group_length {
            Some(len) => table.information_group_length = len,
            None => table.update_information_group_length(),
        }
        Ok(table)
    }
}
