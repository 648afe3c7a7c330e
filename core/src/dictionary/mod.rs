//! Built-in knowledge about common attributes.
//!
//! Implicit VR transfer syntaxes do not record the value representation
//! of each element, so it has to be inferred from the tag.
//! This module only knows a few dozen attributes
//! (those needed to interpret pixel data and identify an object);
//! every other tag is reported as `UN`.
//! A full data dictionary can be plugged into the parser
//! through the [`VrInference`] trait.

pub mod tags;
pub mod uids;

use crate::header::{Tag, VR};

/// Sorted table of the attributes with a known value representation.
static KNOWN_VRS: &[(Tag, VR)] = &[
    (tags::FILE_META_INFORMATION_VERSION, VR::OB),
    (tags::MEDIA_STORAGE_SOP_CLASS_UID, VR::UI),
    (tags::MEDIA_STORAGE_SOP_INSTANCE_UID, VR::UI),
    (tags::TRANSFER_SYNTAX_UID, VR::UI),
    (tags::IMPLEMENTATION_CLASS_UID, VR::UI),
    (tags::IMPLEMENTATION_VERSION_NAME, VR::SH),
    (tags::SOURCE_APPLICATION_ENTITY_TITLE, VR::AE),
    (tags::SENDING_APPLICATION_ENTITY_TITLE, VR::AE),
    (tags::RECEIVING_APPLICATION_ENTITY_TITLE, VR::AE),
    (tags::PRIVATE_INFORMATION_CREATOR_UID, VR::UI),
    (tags::PRIVATE_INFORMATION, VR::OB),
    (tags::SPECIFIC_CHARACTER_SET, VR::CS),
    (tags::IMAGE_TYPE, VR::CS),
    (tags::SOP_CLASS_UID, VR::UI),
    (tags::SOP_INSTANCE_UID, VR::UI),
    (tags::STUDY_DATE, VR::DA),
    (tags::ACQUISITION_DATE, VR::DA),
    (tags::CONTENT_DATE, VR::DA),
    (tags::STUDY_TIME, VR::TM),
    (tags::ACCESSION_NUMBER, VR::SH),
    (tags::MODALITY, VR::CS),
    (tags::MANUFACTURER, VR::LO),
    (tags::INSTITUTION_NAME, VR::LO),
    (tags::CODE_VALUE, VR::SH),
    (tags::CODING_SCHEME_DESIGNATOR, VR::SH),
    (tags::CODE_MEANING, VR::LO),
    (tags::STUDY_DESCRIPTION, VR::LO),
    (tags::PROCEDURE_CODE_SEQUENCE, VR::SQ),
    (tags::SERIES_DESCRIPTION, VR::LO),
    (tags::REFERENCED_IMAGE_SEQUENCE, VR::SQ),
    (tags::REFERENCED_SOP_CLASS_UID, VR::UI),
    (tags::REFERENCED_SOP_INSTANCE_UID, VR::UI),
    (tags::SIMPLE_FRAME_LIST, VR::UL),
    (tags::SOURCE_IMAGE_SEQUENCE, VR::SQ),
    (tags::PATIENT_NAME, VR::PN),
    (tags::PATIENT_ID, VR::LO),
    (tags::PATIENT_BIRTH_DATE, VR::DA),
    (tags::PATIENT_SEX, VR::CS),
    (tags::BODY_PART_EXAMINED, VR::CS),
    (tags::SLICE_THICKNESS, VR::DS),
    (tags::FRAME_TIME, VR::DS),
    (tags::STUDY_INSTANCE_UID, VR::UI),
    (tags::SERIES_INSTANCE_UID, VR::UI),
    (tags::STUDY_ID, VR::SH),
    (tags::SERIES_NUMBER, VR::IS),
    (tags::INSTANCE_NUMBER, VR::IS),
    (tags::IMAGE_POSITION_PATIENT, VR::DS),
    (tags::IMAGE_ORIENTATION_PATIENT, VR::DS),
    (tags::SAMPLES_PER_PIXEL, VR::US),
    (tags::PHOTOMETRIC_INTERPRETATION, VR::CS),
    (tags::PLANAR_CONFIGURATION, VR::US),
    (tags::NUMBER_OF_FRAMES, VR::IS),
    (tags::FRAME_INCREMENT_POINTER, VR::AT),
    (tags::ROWS, VR::US),
    (tags::COLUMNS, VR::US),
    (tags::PIXEL_SPACING, VR::DS),
    (tags::BITS_ALLOCATED, VR::US),
    (tags::BITS_STORED, VR::US),
    (tags::HIGH_BIT, VR::US),
    (tags::PIXEL_REPRESENTATION, VR::US),
    (tags::SMALLEST_IMAGE_PIXEL_VALUE, VR::US),
    (tags::WINDOW_CENTER, VR::DS),
    (tags::WINDOW_WIDTH, VR::DS),
    (tags::RESCALE_INTERCEPT, VR::DS),
    (tags::RESCALE_SLOPE, VR::DS),
    (tags::WINDOW_CENTER_WIDTH_EXPLANATION, VR::LO),
    (tags::VOILUT_FUNCTION, VR::CS),
    (tags::RED_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR, VR::US),
    (tags::GREEN_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR, VR::US),
    (tags::BLUE_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR, VR::US),
    (tags::RED_PALETTE_COLOR_LOOKUP_TABLE_DATA, VR::OW),
    (tags::GREEN_PALETTE_COLOR_LOOKUP_TABLE_DATA, VR::OW),
    (tags::BLUE_PALETTE_COLOR_LOOKUP_TABLE_DATA, VR::OW),
    (tags::LOSSY_IMAGE_COMPRESSION, VR::CS),
    (tags::REQUEST_ATTRIBUTES_SEQUENCE, VR::SQ),
    (tags::REAL_WORLD_VALUE_SLOPE, VR::FD),
    (tags::ICON_IMAGE_SEQUENCE, VR::SQ),
    (tags::SHARED_FUNCTIONAL_GROUPS_SEQUENCE, VR::SQ),
    (tags::PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE, VR::SQ),
    (tags::PIXEL_DATA, VR::OW),
];

/// Infer the value representation of an attribute from its tag
/// using the built-in table.
///
/// Group length elements (element number 0) are always `UL`.
/// Tags outside of the table are reported as `UN`.
pub fn infer_vr(tag: Tag) -> VR {
    if tag.is_group_length() {
        return VR::UL;
    }
    KNOWN_VRS
        .binary_search_by_key(&tag, |(t, _)| *t)
        .map(|i| KNOWN_VRS[i].1)
        .unwrap_or(VR::UN)
}

/// A source of value representations for implicit VR decoding.
pub trait VrInference {
    /// Obtain the value representation of the attribute with the given tag.
    fn vr_of(&self, tag: Tag) -> VR;
}

/// The built-in inference table.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct BuiltinVrTable;

impl VrInference for BuiltinVrTable {
    #[inline]
    fn vr_of(&self, tag: Tag) -> VR {
        infer_vr(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted() {
        assert!(KNOWN_VRS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn known_and_unknown_tags() {
        assert_eq!(infer_vr(tags::ROWS), VR::US);
        assert_eq!(infer_vr(tags::PATIENT_NAME), VR::PN);
        assert_eq!(infer_vr(tags::REFERENCED_IMAGE_SEQUENCE), VR::SQ);
        assert_eq!(infer_vr(Tag(0x0028, 0x0000)), VR::UL);
        assert_eq!(infer_vr(Tag(0x0099, 0x0001)), VR::UN);
    }
}
