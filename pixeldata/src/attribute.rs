//! Utility module for fetching key attributes from a DICOM data set.

use dcmkit_core::dataset::AccessError;
use dcmkit_core::{tags, ConvertValueError, DataSet, Tag};
use dcmkit_encoding::adapters::{InvalidDescriptorError, PhotometricInterpretation};
use dcmkit_encoding::PixelDataDescriptor;
use snafu::{ensure, Backtrace, ResultExt, Snafu};
use std::convert::TryFrom;

use crate::transform::{VoiLutFunction, WindowLevel};

#[derive(Debug, Snafu)]
pub enum GetAttributeError {
    #[snafu(display("Missing required attribute `{}`", name))]
    MissingRequiredField {
        name: &'static str,
        #[snafu(backtrace)]
        source: AccessError,
    },

    #[snafu(display("Could not convert attribute `{}`", name))]
    ConvertValue {
        name: &'static str,
        #[snafu(backtrace)]
        source: ConvertValueError,
    },

    #[snafu(display("Semantically invalid value `{}` for attribute `{}`", value, name))]
    InvalidValue {
        name: &'static str,
        value: String,
        backtrace: Backtrace,
    },

    #[snafu(display("Inconsistent image pixel attributes"))]
    InvalidDescriptor {
        source: InvalidDescriptorError,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = GetAttributeError> = std::result::Result<T, E>;

/// Get the Columns from the data set
pub fn cols(obj: &DataSet) -> Result<u16> {
    retrieve_required_u16(obj, tags::COLUMNS, "Columns")
}

/// Get the Rows from the data set
pub fn rows(obj: &DataSet) -> Result<u16> {
    retrieve_required_u16(obj, tags::ROWS, "Rows")
}

/// Get the BitsAllocated from the data set
pub fn bits_allocated(obj: &DataSet) -> Result<u16> {
    retrieve_required_u16(obj, tags::BITS_ALLOCATED, "BitsAllocated")
}

/// Get the BitsStored from the data set
pub fn bits_stored(obj: &DataSet) -> Result<u16> {
    retrieve_required_u16(obj, tags::BITS_STORED, "BitsStored")
}

/// Get the HighBit from the data set
pub fn high_bit(obj: &DataSet) -> Result<u16> {
    retrieve_required_u16(obj, tags::HIGH_BIT, "HighBit")
}

/// Get the SamplesPerPixel from the data set, returning 1 by default
pub fn samples_per_pixel(obj: &DataSet) -> Result<u16> {
    Ok(retrieve_optional_u16(obj, tags::SAMPLES_PER_PIXEL, "SamplesPerPixel")?.unwrap_or(1))
}

/// Get the PlanarConfiguration from the data set, returning 0 by default
pub fn planar_configuration(obj: &DataSet) -> Result<u16> {
    let value =
        retrieve_optional_u16(obj, tags::PLANAR_CONFIGURATION, "PlanarConfiguration")?
            .unwrap_or(0);
    ensure!(
        value <= 1,
        InvalidValueSnafu {
            name: "PlanarConfiguration",
            value: value.to_string(),
        }
    );
    Ok(value)
}

/// Get the PhotometricInterpretation from the data set,
/// returning `MONOCHROME2` by default
pub fn photometric_interpretation(obj: &DataSet) -> Result<PhotometricInterpretation> {
    match obj.string(tags::PHOTOMETRIC_INTERPRETATION) {
        None => Ok(PhotometricInterpretation::Monochrome2),
        Some(value) => {
            let value = value.context(ConvertValueSnafu {
                name: "PhotometricInterpretation",
            })?;
            // the conversion itself cannot fail
            Ok(value
                .trim()
                .parse()
                .unwrap_or(PhotometricInterpretation::Monochrome2))
        }
    }
}

/// Get the NumberOfFrames from the data set,
/// returning 1 if it is not present
pub fn number_of_frames(obj: &DataSet) -> Result<u32> {
    let integer = match obj.int::<i64>(tags::NUMBER_OF_FRAMES) {
        None => return Ok(1),
        Some(value) => value.context(ConvertValueSnafu {
            name: "NumberOfFrames",
        })?,
    };

    ensure!(
        integer > 0 && integer <= i64::from(u32::MAX),
        InvalidValueSnafu {
            name: "NumberOfFrames",
            value: integer.to_string(),
        }
    );

    Ok(integer as u32)
}

/// An interpreted representation of the DICOM _Pixel Representation_ attribute.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum PixelRepresentation {
    /// unsigned pixel data sample values
    Unsigned,
    /// signed pixel data sample values
    Signed,
}

/// Get the PixelRepresentation from the data set,
/// returning unsigned by default
pub fn pixel_representation(obj: &DataSet) -> Result<PixelRepresentation> {
    let p = retrieve_optional_u16(obj, tags::PIXEL_REPRESENTATION, "PixelRepresentation")?
        .unwrap_or(0);

    match p {
        0 => Ok(PixelRepresentation::Unsigned),
        1 => Ok(PixelRepresentation::Signed),
        _ => InvalidValueSnafu {
            name: "PixelRepresentation",
            value: p.to_string(),
        }
        .fail(),
    }
}

/// Get the RescaleIntercept from the data set or return 0
pub fn rescale_intercept(obj: &DataSet) -> f64 {
    obj.float64(tags::RESCALE_INTERCEPT)
        .and_then(|v| v.ok())
        .unwrap_or(0.)
}

/// Get the RescaleSlope from the data set or return 1.0
pub fn rescale_slope(obj: &DataSet) -> f64 {
    obj.float64(tags::RESCALE_SLOPE)
        .and_then(|v| v.ok())
        .unwrap_or(1.0)
}

/// Retrieve the first WindowCenter from the data set if it exists.
pub fn window_center(obj: &DataSet) -> Result<Option<f64>> {
    retrieve_optional_to_f64(obj, tags::WINDOW_CENTER, "WindowCenter")
}

/// Retrieve the first WindowWidth from the data set if it exists.
pub fn window_width(obj: &DataSet) -> Result<Option<f64>> {
    retrieve_optional_to_f64(obj, tags::WINDOW_WIDTH, "WindowWidth")
}

/// Retrieve the first Window Center & Width Explanation if it exists.
pub fn window_explanation(obj: &DataSet) -> Result<Option<String>> {
    match obj.multi_string(tags::WINDOW_CENTER_WIDTH_EXPLANATION) {
        None => Ok(None),
        Some(values) => Ok(values
            .context(ConvertValueSnafu {
                name: "WindowCenterWidthExplanation",
            })?
            .into_iter()
            .next()
            .filter(|s| !s.is_empty())),
    }
}

/// Get the VOILUTFunction from the data set,
/// returning `LINEAR` by default
pub fn voi_lut_function(obj: &DataSet) -> Result<VoiLutFunction> {
    let value = match obj.string(tags::VOILUT_FUNCTION) {
        None => return Ok(VoiLutFunction::default()),
        Some(value) => value.context(ConvertValueSnafu {
            name: "VOILUTFunction",
        })?,
    };
    let value = value.trim();
    VoiLutFunction::try_from(value).map_err(|_| {
        InvalidValueSnafu {
            name: "VOILUTFunction",
            value,
        }
        .build()
    })
}

/// The window settings of a data set:
/// the first window level declared,
/// its explanation and the VOI LUT function.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSettings {
    /// the window center and width
    pub window_level: WindowLevel,
    /// the Window Center & Width Explanation, if any
    pub explanation: Option<String>,
    /// the VOI LUT function
    pub function: VoiLutFunction,
}

/// Get the window settings from the data set,
/// or `None` if it does not declare both a center and a width.
///
/// The width is clamped to at least 1.
pub fn window_settings(obj: &DataSet) -> Result<Option<WindowSettings>> {
    let (center, width) = match (window_center(obj)?, window_width(obj)?) {
        (Some(center), Some(width)) => (center, width),
        _ => return Ok(None),
    };
    Ok(Some(WindowSettings {
        window_level: WindowLevel {
            center,
            width: width.max(1.),
        },
        explanation: window_explanation(obj)?,
        function: voi_lut_function(obj)?,
    }))
}

/// Build the pixel data descriptor of an image from its attributes.
///
/// Rows, Columns, Bits Allocated, Bits Stored and High Bit are required.
/// The other attributes fall back to their usual defaults:
/// a single frame of one unsigned sample per pixel,
/// in `MONOCHROME2`.
pub fn pixel_data_descriptor(obj: &DataSet) -> Result<PixelDataDescriptor> {
    let descriptor = PixelDataDescriptor {
        rows: rows(obj)?,
        columns: cols(obj)?,
        number_of_frames: number_of_frames(obj)?,
        bits_allocated: bits_allocated(obj)?,
        bits_stored: bits_stored(obj)?,
        high_bit: high_bit(obj)?,
        signed: pixel_representation(obj)? == PixelRepresentation::Signed,
        samples_per_pixel: samples_per_pixel(obj)?,
        photometric_interpretation: photometric_interpretation(obj)?,
        planar_configuration: planar_configuration(obj)?,
    };
    descriptor.validate().context(InvalidDescriptorSnafu)?;
    Ok(descriptor)
}

#[inline]
fn retrieve_required_u16(obj: &DataSet, tag: Tag, name: &'static str) -> Result<u16> {
    obj.element(tag)
        .context(MissingRequiredFieldSnafu { name })?
        .to_int(obj.byte_order())
        .context(ConvertValueSnafu { name })
}

#[inline]
fn retrieve_optional_u16(obj: &DataSet, tag: Tag, name: &'static str) -> Result<Option<u16>> {
    obj.int::<u16>(tag)
        .transpose()
        .context(ConvertValueSnafu { name })
}

#[inline]
fn retrieve_optional_to_f64(obj: &DataSet, tag: Tag, name: &'static str) -> Result<Option<f64>> {
    obj.float64(tag)
        .transpose()
        .context(ConvertValueSnafu { name })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmkit_core::{DataElement, Endianness, VR};

    fn ct_slice() -> DataSet {
        DataSet::from_elements(
            Endianness::Little,
            vec![
                DataElement::new_u16(tags::ROWS, &[4], Endianness::Little),
                DataElement::new_u16(tags::COLUMNS, &[3], Endianness::Little),
                DataElement::new_u16(tags::BITS_ALLOCATED, &[16], Endianness::Little),
                DataElement::new_u16(tags::BITS_STORED, &[12], Endianness::Little),
                DataElement::new_u16(tags::HIGH_BIT, &[11], Endianness::Little),
            ],
        )
    }

    #[test]
    fn descriptor_with_defaults() {
        let desc = pixel_data_descriptor(&ct_slice()).unwrap();
        assert_eq!(desc.rows, 4);
        assert_eq!(desc.columns, 3);
        assert_eq!(desc.number_of_frames, 1);
        assert_eq!(desc.samples_per_pixel, 1);
        assert_eq!(desc.planar_configuration, 0);
        assert!(!desc.signed);
        assert_eq!(
            desc.photometric_interpretation,
            PhotometricInterpretation::Monochrome2
        );
        assert_eq!(desc.bytes_per_frame(), 24);
    }

    #[test]
    fn descriptor_from_big_endian_attributes() {
        let ds = DataSet::from_elements(
            Endianness::Big,
            vec![
                DataElement::new_u16(tags::ROWS, &[512], Endianness::Big),
                DataElement::new_u16(tags::COLUMNS, &[256], Endianness::Big),
                DataElement::new_u16(tags::BITS_ALLOCATED, &[8], Endianness::Big),
                DataElement::new_u16(tags::BITS_STORED, &[8], Endianness::Big),
                DataElement::new_u16(tags::HIGH_BIT, &[7], Endianness::Big),
                DataElement::new_u16(tags::SAMPLES_PER_PIXEL, &[3], Endianness::Big),
                DataElement::new_u16(tags::PLANAR_CONFIGURATION, &[1], Endianness::Big),
                DataElement::new_str(tags::PHOTOMETRIC_INTERPRETATION, VR::CS, "RGB"),
                DataElement::new_str(tags::NUMBER_OF_FRAMES, VR::IS, "2"),
            ],
        );
        let desc = pixel_data_descriptor(&ds).unwrap();
        assert_eq!(desc.rows, 512);
        assert_eq!(desc.columns, 256);
        assert_eq!(desc.samples_per_pixel, 3);
        assert_eq!(desc.planar_configuration, 1);
        assert_eq!(desc.number_of_frames, 2);
        assert_eq!(desc.photometric_interpretation, PhotometricInterpretation::Rgb);
    }

    #[test]
    fn missing_geometry_is_an_error() {
        let mut ds = ct_slice();
        ds.remove(tags::HIGH_BIT);
        let err = pixel_data_descriptor(&ds).unwrap_err();
        assert!(matches!(
            err,
            GetAttributeError::MissingRequiredField { name: "HighBit", .. }
        ));
    }

    #[test]
    fn invalid_values_are_errors() {
        let mut ds = ct_slice();
        ds.put(DataElement::new_str(tags::NUMBER_OF_FRAMES, VR::IS, "0"));
        assert!(matches!(
            number_of_frames(&ds),
            Err(GetAttributeError::InvalidValue { .. })
        ));

        let mut ds = ct_slice();
        ds.put(DataElement::new_u16(
            tags::PIXEL_REPRESENTATION,
            &[2],
            Endianness::Little,
        ));
        assert!(matches!(
            pixel_representation(&ds),
            Err(GetAttributeError::InvalidValue { .. })
        ));

        let mut ds = ct_slice();
        ds.put(DataElement::new_u16(tags::BITS_STORED, &[17], Endianness::Little));
        assert!(matches!(
            pixel_data_descriptor(&ds),
            Err(GetAttributeError::InvalidDescriptor { .. })
        ));
    }

    #[test]
    fn window_settings_take_first_values() {
        let mut ds = ct_slice();
        assert_eq!(window_settings(&ds).unwrap(), None);

        ds.put(DataElement::new_strs(tags::WINDOW_CENTER, VR::DS, &["40", "300"]));
        ds.put(DataElement::new_strs(tags::WINDOW_WIDTH, VR::DS, &["0.5", "1500"]));
        ds.put(DataElement::new_strs(
            tags::WINDOW_CENTER_WIDTH_EXPLANATION,
            VR::LO,
            &["SOFT TISSUE", "BONE"],
        ));
        ds.put(DataElement::new_str(tags::VOILUT_FUNCTION, VR::CS, "SIGMOID"));

        let settings = window_settings(&ds).unwrap().unwrap();
        assert_eq!(settings.window_level.center, 40.);
        assert_eq!(settings.window_level.width, 1.);
        assert_eq!(settings.explanation.as_deref(), Some("SOFT TISSUE"));
        assert_eq!(settings.function, VoiLutFunction::Sigmoid);
    }

    #[test]
    fn rescale_defaults() {
        let mut ds = ct_slice();
        assert_eq!(rescale_slope(&ds), 1.);
        assert_eq!(rescale_intercept(&ds), 0.);
        ds.put(DataElement::new_str(tags::RESCALE_INTERCEPT, VR::DS, "-1024"));
        assert_eq!(rescale_intercept(&ds), -1024.);
    }
}
