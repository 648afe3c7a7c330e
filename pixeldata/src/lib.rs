//! This crate contains the pixel data handlers of dcmkit.
//!
//! It is responsible for interpreting native pixel data
//! according to the image pixel attributes of a data set,
//! for transforming stored sample values into displayable ones,
//! and for transcoding data sets between transfer syntaxes.
//!
//! - [`PixelBuffer`] gives access to the frames, pixels and samples
//!   of native pixel data,
//!   with bit-exact extraction of stored values.
//! - [`EncapsulatedPixelData`] retrieves the compressed bytes of each frame
//!   of encapsulated pixel data.
//! - [`WindowLevelTransform`], [`Lut`] and [`PaletteColorLut`]
//!   map stored values to grayscale or color intensities.
//! - [`Transcoder`] converts a data set from one transfer syntax to another,
//!   decoding pixel data with the codecs of a
//!   [`TransferSyntaxRegistry`](dcmkit_transfer_syntax_registry::TransferSyntaxRegistry).
//!
//! # Examples
//!
//! Render the first frame of a file as 8-bit grayscale:
//!
//! ```no_run
//! # use std::error::Error;
//! use dcmkit_object::open_file;
//! use dcmkit_pixeldata::{attribute, PixelBuffer, Rescale};
//!
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let file = open_file("dicom.dcm")?;
//! let obj = file.dataset();
//! let pixels = PixelBuffer::from_dataset(obj)?;
//! let rescale = Rescale::new(attribute::rescale_slope(obj), attribute::rescale_intercept(obj));
//! let window = attribute::window_settings(obj)?;
//! let lut = pixels.gray_lut(0, rescale, window.as_ref())?;
//! let gray: Vec<u8> = pixels.to_gray8(0, &lut)?;
//! #   Ok(())
//! # }
//! ```

use byteorder::{ByteOrder, LittleEndian};
use dcmkit_core::{DataSet, Endianness, Tag};
use dcmkit_encoding::adapters::InvalidDescriptorError;
use snafu::{ensure, Backtrace, OptionExt, ResultExt, Snafu};
use std::borrow::Cow;

pub mod attribute;
pub mod encapsulation;
pub mod lut;
pub mod palette;
pub mod transcode;
mod transform;

pub use attribute::{PixelRepresentation, WindowSettings};
pub use dcmkit_encoding::{PhotometricInterpretation, PixelDataDescriptor};
pub use encapsulation::EncapsulatedPixelData;
pub use lut::{CreateLutError, Lut};
pub use palette::{PaletteChannel, PaletteColorLut};
pub use transcode::{TranscodePolicy, Transcoder};
pub use transform::*;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Could not read the image pixel attributes"))]
    GetAttribute {
        #[snafu(backtrace)]
        source: attribute::GetAttributeError,
    },

    #[snafu(display("Missing pixel data"))]
    MissingPixelData { backtrace: Backtrace },

    #[snafu(display("Pixel data is encapsulated and must be decoded first"))]
    NotNative { backtrace: Backtrace },

    #[snafu(display("Could not read native pixel data"))]
    ReadPixelData {
        #[snafu(backtrace)]
        source: dcmkit_core::ConvertValueError,
    },

    #[snafu(display("Inconsistent pixel data descriptor"))]
    InvalidDescriptor {
        source: InvalidDescriptorError,
        backtrace: Backtrace,
    },

    #[snafu(display("Frame #{} is out of range (number of frames: {})", frame, frames))]
    FrameOutOfRange {
        frame: u32,
        frames: u32,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "Pixel data is too short for frame #{}: {} bytes needed, {} available",
        frame,
        needed,
        available
    ))]
    IncompleteFrame {
        frame: u32,
        needed: usize,
        available: usize,
        backtrace: Backtrace,
    },

    #[snafu(display("Pixel ({}, {}) is out of bounds", row, col))]
    PixelOutOfBounds {
        row: u16,
        col: u16,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "Sample #{} is out of bounds for {} samples per pixel",
        sample,
        samples_per_pixel
    ))]
    SampleOutOfBounds {
        sample: u16,
        samples_per_pixel: u16,
        backtrace: Backtrace,
    },

    #[snafu(display("Unsupported samples per pixel {}", samples_per_pixel))]
    UnsupportedSamplesPerPixel {
        samples_per_pixel: u16,
        backtrace: Backtrace,
    },

    #[snafu(display("Unsupported photometric interpretation {}", pi))]
    UnsupportedPhotometricInterpretation {
        pi: PhotometricInterpretation,
        backtrace: Backtrace,
    },

    #[snafu(display("Could not create LUT"))]
    CreateLut {
        source: CreateLutError,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Native pixel data together with the descriptor of its image.
///
/// Samples are held in little endian byte order,
/// with the layout described by the descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer<'a> {
    descriptor: PixelDataDescriptor,
    data: Cow<'a, [u8]>,
}

impl<'a> PixelBuffer<'a> {
    /// Create a pixel buffer from a descriptor
    /// and the native little endian samples of all frames.
    ///
    /// The data may be shorter than the descriptor requires,
    /// in which case only the complete frames are accessible.
    pub fn new(descriptor: PixelDataDescriptor, data: impl Into<Cow<'a, [u8]>>) -> Result<Self> {
        descriptor.validate().context(InvalidDescriptorSnafu)?;
        Ok(PixelBuffer {
            descriptor,
            data: data.into(),
        })
    }

    /// Create a pixel buffer from the image pixel attributes
    /// and the native _Pixel Data_ of a data set.
    ///
    /// Samples in big endian data sets are swapped into little endian.
    pub fn from_dataset(obj: &'a DataSet) -> Result<Self> {
        let descriptor = attribute::pixel_data_descriptor(obj).context(GetAttributeSnafu)?;
        let element = obj.get(Tag::PIXEL_DATA).context(MissingPixelDataSnafu)?;
        ensure!(element.value().fragments().is_none(), NotNativeSnafu);
        let bytes = element.to_bytes().context(ReadPixelDataSnafu)?;

        let data = match (obj.byte_order(), element.vr().numeric_width()) {
            (Endianness::Big, Some(width)) => {
                let mut data = bytes.to_vec();
                transcode::swap_bytes(&mut data, width);
                Cow::Owned(data)
            }
            _ => Cow::Borrowed(bytes),
        };
        PixelBuffer::new(descriptor, data)
    }

    /// The descriptor of the image.
    pub fn descriptor(&self) -> &PixelDataDescriptor {
        &self.descriptor
    }

    /// The native samples of all frames.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Take ownership of the native samples.
    pub fn into_data(self) -> Vec<u8> {
        self.data.into_owned()
    }

    /// The number of frames in the image.
    pub fn number_of_frames(&self) -> u32 {
        self.descriptor.number_of_frames
    }

    /// Retrieve the native samples of a single frame.
    pub fn frame_data(&self, frame: u32) -> Result<&[u8]> {
        let range = self
            .descriptor
            .frame_range(frame)
            .context(FrameOutOfRangeSnafu {
                frame,
                frames: self.descriptor.number_of_frames,
            })?;
        let needed = range.end;
        self.data.get(range).context(IncompleteFrameSnafu {
            frame,
            needed,
            available: self.data.len(),
        })
    }

    /// Retrieve the stored value of the first sample of a pixel.
    ///
    /// For monochrome and palette color images,
    /// this is the value of the pixel.
    pub fn pixel_value(&self, row: u16, col: u16, frame: u32) -> Result<i64> {
        self.sample_value(row, col, frame, 0)
    }

    /// Retrieve the stored value of a sample of a pixel,
    /// honoring the planar configuration.
    pub fn sample_value(&self, row: u16, col: u16, frame: u32, sample: u16) -> Result<i64> {
        let desc = &self.descriptor;
        ensure!(
            row < desc.rows && col < desc.columns,
            PixelOutOfBoundsSnafu { row, col }
        );
        ensure!(
            sample < desc.samples_per_pixel,
            SampleOutOfBoundsSnafu {
                sample,
                samples_per_pixel: desc.samples_per_pixel,
            }
        );
        let data = self.frame_data(frame)?;
        let pixel = usize::from(row) * usize::from(desc.columns) + usize::from(col);
        let offset = desc.sample_offset(pixel, usize::from(sample));
        Ok(self.decode_sample(&data[offset..offset + desc.bytes_per_sample()]))
    }

    /// Retrieve the stored values of the three samples of a color pixel.
    pub fn color_value(&self, row: u16, col: u16, frame: u32) -> Result<[i64; 3]> {
        ensure!(
            self.descriptor.samples_per_pixel == 3,
            UnsupportedSamplesPerPixelSnafu {
                samples_per_pixel: self.descriptor.samples_per_pixel,
            }
        );
        Ok([
            self.sample_value(row, col, frame, 0)?,
            self.sample_value(row, col, frame, 1)?,
            self.sample_value(row, col, frame, 2)?,
        ])
    }

    /// Find the lowest and highest stored sample values of a frame.
    pub fn pixel_range(&self, frame: u32) -> Result<(i64, i64)> {
        let mut samples = self.frame_samples(frame)?;
        let first = samples.next().unwrap_or(0);
        Ok(samples.fold((first, first), |(min, max), v| (min.min(v), max.max(v))))
    }

    /// Create an 8-bit grayscale LUT for a frame of this image.
    ///
    /// The window, if any, is applied after the rescale function.
    /// Without a window, the LUT spans the range of stored values
    /// in the frame.
    pub fn gray_lut(
        &self,
        frame: u32,
        rescale: Rescale,
        window: Option<&WindowSettings>,
    ) -> Result<Lut<u8>> {
        let desc = &self.descriptor;
        match window {
            Some(window) => Lut::new_rescale_and_window(
                desc.bits_stored,
                desc.signed,
                rescale,
                WindowLevelTransform::new(window.function, window.window_level),
            ),
            None => Lut::new_rescale_and_normalize(
                desc.bits_stored,
                desc.signed,
                rescale,
                self.pixel_range(frame)?,
            ),
        }
        .context(CreateLutSnafu)
    }

    /// Render a frame of a monochrome image as 8-bit grayscale
    /// through the given LUT, one byte per pixel.
    ///
    /// `MONOCHROME1` images are inverted,
    /// so that the minimum sample value is white.
    pub fn to_gray8(&self, frame: u32, lut: &Lut<u8>) -> Result<Vec<u8>> {
        let pi = &self.descriptor.photometric_interpretation;
        ensure!(
            pi.is_monochrome(),
            UnsupportedPhotometricInterpretationSnafu { pi: pi.clone() }
        );
        let invert = *pi == PhotometricInterpretation::Monochrome1;
        Ok(lut
            .map_iter(self.frame_samples(frame)?)
            .map(|v| if invert { 255 - v } else { v })
            .collect())
    }

    /// Render a frame of a palette color image as 8-bit RGB,
    /// three interleaved bytes per pixel.
    pub fn to_rgb8(&self, frame: u32, palette: &PaletteColorLut) -> Result<Vec<u8>> {
        ensure!(
            self.descriptor.samples_per_pixel == 1,
            UnsupportedSamplesPerPixelSnafu {
                samples_per_pixel: self.descriptor.samples_per_pixel,
            }
        );
        Ok(self
            .frame_samples(frame)?
            .flat_map(|v| palette.lookup(v))
            .collect())
    }

    /// Iterate over the stored values of all samples in a frame,
    /// in the order they are laid out.
    fn frame_samples(&self, frame: u32) -> Result<impl Iterator<Item = i64> + '_> {
        let data = self.frame_data(frame)?;
        Ok(data
            .chunks_exact(self.descriptor.bytes_per_sample())
            .map(move |bytes| self.decode_sample(bytes)))
    }

    /// Interpret the little endian bytes of a sample,
    /// keeping only the stored bits and extending the sign if needed.
    fn decode_sample(&self, bytes: &[u8]) -> i64 {
        let desc = &self.descriptor;
        let bits = u32::from(desc.bits_stored);
        let raw = LittleEndian::read_uint(bytes, bytes.len()) >> desc.bit_shift();
        let value = raw & ((1_u64 << bits) - 1);
        if desc.signed && (value >> (bits - 1)) & 1 == 1 {
            value as i64 - (1_i64 << bits)
        } else {
            value as i64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmkit_core::{tags, DataElement, VR};
    use rstest::rstest;

    #[rstest]
    #[case(&[0xFF, 0x07], 16, 12, 11, false, 2047)]
    #[case(&[0xFF, 0xF7], 16, 12, 11, false, 2047)]
    #[case(&[0x00, 0x80], 16, 12, 15, false, 2048)]
    #[case(&[0xF0, 0xFF], 16, 12, 15, true, -1)]
    #[case(&[0x9C, 0xFF], 16, 16, 15, true, -100)]
    #[case(&[0x7F], 8, 8, 7, false, 127)]
    #[case(&[0x80], 8, 8, 7, true, -128)]
    #[case(&[0x01, 0x00, 0x00, 0x80], 32, 32, 31, true, -2_147_483_647)]
    fn stored_value_extraction(
        #[case] data: &[u8],
        #[case] bits_allocated: u16,
        #[case] bits_stored: u16,
        #[case] high_bit: u16,
        #[case] signed: bool,
        #[case] expected: i64,
    ) {
        let desc = PixelDataDescriptor {
            bits_stored,
            high_bit,
            signed,
            ..PixelDataDescriptor::new_monochrome(1, 1, bits_allocated)
        };
        let pixels = PixelBuffer::new(desc, data).unwrap();
        assert_eq!(pixels.pixel_value(0, 0, 0).unwrap(), expected);
    }

    fn rgb8(planar_configuration: u16) -> PixelDataDescriptor {
        PixelDataDescriptor {
            samples_per_pixel: 3,
            photometric_interpretation: PhotometricInterpretation::Rgb,
            planar_configuration,
            ..PixelDataDescriptor::new_monochrome(1, 2, 8)
        }
    }

    #[test]
    fn color_interleaved_and_planar() {
        let interleaved = PixelBuffer::new(rgb8(0), vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(interleaved.color_value(0, 1, 0).unwrap(), [4, 5, 6]);

        let planar = PixelBuffer::new(rgb8(1), vec![1, 4, 2, 5, 3, 6]).unwrap();
        assert_eq!(planar.color_value(0, 1, 0).unwrap(), [4, 5, 6]);
        assert_eq!(planar.sample_value(0, 0, 0, 2).unwrap(), 3);
    }

    #[test]
    fn color_value_requires_three_samples() {
        let gray = PixelBuffer::new(PixelDataDescriptor::new_monochrome(1, 1, 8), vec![0]).unwrap();
        assert!(matches!(
            gray.color_value(0, 0, 0),
            Err(Error::UnsupportedSamplesPerPixel { .. })
        ));
    }

    #[test]
    fn bounds_are_checked() {
        let desc = PixelDataDescriptor {
            number_of_frames: 2,
            ..PixelDataDescriptor::new_monochrome(2, 2, 8)
        };
        let pixels = PixelBuffer::new(desc, vec![0, 1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(pixels.frame_data(0).unwrap(), &[0, 1, 2, 3]);
        assert_eq!(pixels.pixel_value(1, 1, 0).unwrap(), 3);
        assert!(matches!(
            pixels.frame_data(1),
            Err(Error::IncompleteFrame { frame: 1, .. })
        ));
        assert!(matches!(
            pixels.frame_data(2),
            Err(Error::FrameOutOfRange { frame: 2, .. })
        ));
        assert!(matches!(
            pixels.pixel_value(2, 0, 0),
            Err(Error::PixelOutOfBounds { .. })
        ));
    }

    #[test]
    fn range_of_signed_samples() {
        let desc = PixelDataDescriptor {
            signed: true,
            ..PixelDataDescriptor::new_monochrome(1, 3, 16)
        };
        let pixels = PixelBuffer::new(desc, vec![0x9C, 0xFF, 0x10, 0x00, 0x00, 0x80]).unwrap();
        assert_eq!(pixels.pixel_range(0).unwrap(), (-32768, 16));
    }

    #[test]
    fn from_big_endian_dataset() {
        let obj = DataSet::from_elements(
            Endianness::Big,
            vec![
                DataElement::new_u16(tags::ROWS, &[1], Endianness::Big),
                DataElement::new_u16(tags::COLUMNS, &[2], Endianness::Big),
                DataElement::new_u16(tags::BITS_ALLOCATED, &[16], Endianness::Big),
                DataElement::new_u16(tags::BITS_STORED, &[16], Endianness::Big),
                DataElement::new_u16(tags::HIGH_BIT, &[15], Endianness::Big),
                DataElement::new_words(tags::PIXEL_DATA, &[0x0102, 0x0304], Endianness::Big),
            ],
        );
        let pixels = PixelBuffer::from_dataset(&obj).unwrap();
        assert_eq!(pixels.data(), &[0x02, 0x01, 0x04, 0x03]);
        assert_eq!(pixels.pixel_value(0, 1, 0).unwrap(), 0x0304);
    }

    #[test]
    fn encapsulated_dataset_is_not_native() {
        let obj = DataSet::from_elements(
            Endianness::Little,
            vec![
                DataElement::new_u16(tags::ROWS, &[1], Endianness::Little),
                DataElement::new_u16(tags::COLUMNS, &[1], Endianness::Little),
                DataElement::new_u16(tags::BITS_ALLOCATED, &[8], Endianness::Little),
                DataElement::new_u16(tags::BITS_STORED, &[8], Endianness::Little),
                DataElement::new_u16(tags::HIGH_BIT, &[7], Endianness::Little),
                DataElement::new_pixel_sequence(dcmkit_core::PixelFragmentSequence::from_frames(
                    vec![vec![0; 2]],
                )),
            ],
        );
        assert!(matches!(
            PixelBuffer::from_dataset(&obj),
            Err(Error::NotNative { .. })
        ));

        let obj = DataSet::new();
        assert!(matches!(
            PixelBuffer::from_dataset(&obj),
            Err(Error::GetAttribute { .. })
        ));
    }

    #[test]
    fn render_monochrome1_inverted() {
        let desc = PixelDataDescriptor {
            photometric_interpretation: PhotometricInterpretation::Monochrome1,
            ..PixelDataDescriptor::new_monochrome(1, 2, 8)
        };
        let pixels = PixelBuffer::new(desc, vec![0, 255]).unwrap();
        let lut = pixels.gray_lut(0, Rescale::default(), None).unwrap();
        assert_eq!(pixels.to_gray8(0, &lut).unwrap(), vec![255, 0]);
    }

    #[test]
    fn render_with_window_settings() {
        let pixels = PixelBuffer::new(
            PixelDataDescriptor::new_monochrome(1, 3, 8),
            vec![0, 40, 255],
        )
        .unwrap();
        let window = WindowSettings {
            window_level: WindowLevel {
                center: 40.,
                width: 80.,
            },
            explanation: None,
            function: VoiLutFunction::Linear,
        };
        let lut = pixels.gray_lut(0, Rescale::default(), Some(&window)).unwrap();
        let gray = pixels.to_gray8(0, &lut).unwrap();
        assert_eq!(gray[0], 0);
        assert!((127..=129).contains(&gray[1]));
        assert_eq!(gray[2], 255);
    }

    #[test]
    fn palette_rendering() {
        let desc = PixelDataDescriptor {
            photometric_interpretation: PhotometricInterpretation::PaletteColor,
            ..PixelDataDescriptor::new_monochrome(1, 2, 8)
        };
        let pixels = PixelBuffer::new(desc, vec![0, 1]).unwrap();
        let channel = |v: u16| PaletteChannel::new(2, 0, 16, vec![0, v]);
        let palette = PaletteColorLut::new(channel(0xFF00), channel(0x8000), channel(0x0100));
        assert_eq!(
            pixels.to_rgb8(0, &palette).unwrap(),
            vec![0, 0, 0, 0xFF, 0x80, 0x01]
        );

        let lut = pixels.gray_lut(0, Rescale::default(), None).unwrap();
        assert!(matches!(
            pixels.to_gray8(0, &lut),
            Err(Error::UnsupportedPhotometricInterpretation { .. })
        ));
    }

    #[test]
    fn textual_pixel_data_is_rejected() {
        let mut obj = DataSet::new();
        for (tag, value) in [
            (tags::ROWS, 1),
            (tags::COLUMNS, 1),
            (tags::BITS_ALLOCATED, 8),
            (tags::BITS_STORED, 8),
            (tags::HIGH_BIT, 7),
        ] {
            obj.put(DataElement::new_u16(tag, &[value], Endianness::Little));
        }
        obj.put(DataElement::empty(tags::PIXEL_DATA, VR::SQ));
        assert!(matches!(
            PixelBuffer::from_dataset(&obj),
            Err(Error::ReadPixelData { .. })
        ));
    }
}
