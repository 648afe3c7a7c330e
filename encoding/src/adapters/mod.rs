//! Core module for building pixel data adapters.
//!
//! This module contains the core types and traits
//! for consumers and implementers of
//! transfer syntaxes with encapsulated pixel data.
//!
//! The [`PixelDataDescriptor`] describes the geometry of an image.
//! Transfer syntaxes which define an encapsulated pixel data encoding
//! need to provide suitable implementations of
//! [`PixelDataReader`] and [`PixelDataWriter`]
//! to be able to decode and encode imaging data, respectively.
//! Codecs living in an external library
//! can implement the narrower [`ImageCodec`] interface instead.

use snafu::{ensure, Snafu};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// An error type for a pixel data decoding operation.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub), module)]
pub enum DecodeError {
    /// A custom error occurred when decoding,
    /// reported as a dynamic error value with a message.
    ///
    /// The [`whatever!`](snafu::whatever) macro can be used
    /// to easily create an error of this kind.
    #[snafu(whatever, display("{}", message))]
    Custom {
        /// The error message.
        message: String,
        /// The underlying error cause, if any.
        #[snafu(source(from(Box<dyn std::error::Error + Send + Sync + 'static>, Some)))]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },

    /// The input pixel data is not encapsulated.
    NotEncapsulated,

    /// The requested frame range is outside the given object's frame range.
    #[snafu(display("Frame #{} is out of range", frame))]
    FrameRangeOutOfBounds { frame: u32 },

    /// The image descriptor is not consistent.
    #[snafu(display("Invalid pixel data descriptor: {}", reason))]
    InvalidDescriptor { reason: &'static str },
}

/// An error type for a pixel data encoding operation.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub), module)]
pub enum EncodeError {
    /// A custom error when encoding fails.
    /// Read the `message` and the underlying `source`
    /// for more details.
    #[snafu(whatever, display("{}", message))]
    Custom {
        /// The error message.
        message: String,
        /// The underlying error cause, if any.
        #[snafu(source(from(Box<dyn std::error::Error + Send + Sync + 'static>, Some)))]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },

    /// Input pixel data is not native, should be decoded first.
    NotNative,

    /// The requested frame range is outside the given object's frame range.
    #[snafu(display("Frame #{} is out of range", frame))]
    FrameRangeOutOfBounds { frame: u32 },

    /// The codec cannot encode images with this descriptor or options.
    #[snafu(display("Unsupported encoding parameters: {}", reason))]
    Unsupported { reason: String },
}

/// The result of decoding pixel data.
pub type DecodeResult<T, E = DecodeError> = Result<T, E>;

/// The result of encoding pixel data.
pub type EncodeResult<T, E = EncodeError> = Result<T, E>;

/// Error raised when a pixel data descriptor is not consistent.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(display("Invalid pixel data descriptor: {}", reason))]
pub struct InvalidDescriptorError {
    reason: &'static str,
}

impl InvalidDescriptorError {
    /// The reason why the descriptor is not valid.
    pub fn reason(&self) -> &'static str {
        self.reason
    }
}

/// The photometric interpretation of an image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhotometricInterpretation {
    /// `MONOCHROME1`: the minimum sample value is displayed as white
    Monochrome1,
    /// `MONOCHROME2`: the minimum sample value is displayed as black
    Monochrome2,
    /// `PALETTE COLOR`
    PaletteColor,
    /// `RGB`
    Rgb,
    /// `YBR_FULL`
    YbrFull,
    /// `YBR_FULL_422`
    YbrFull422,
    /// `YBR_ICT`
    YbrIct,
    /// `YBR_RCT`
    YbrRct,
    /// Any other photometric interpretation
    Other(String),
}

impl PhotometricInterpretation {
    /// Obtain the code string of this photometric interpretation.
    pub fn as_str(&self) -> &str {
        match self {
            PhotometricInterpretation::Monochrome1 => "MONOCHROME1",
            PhotometricInterpretation::Monochrome2 => "MONOCHROME2",
            PhotometricInterpretation::PaletteColor => "PALETTE COLOR",
            PhotometricInterpretation::Rgb => "RGB",
            PhotometricInterpretation::YbrFull => "YBR_FULL",
            PhotometricInterpretation::YbrFull422 => "YBR_FULL_422",
            PhotometricInterpretation::YbrIct => "YBR_ICT",
            PhotometricInterpretation::YbrRct => "YBR_RCT",
            PhotometricInterpretation::Other(s) => s,
        }
    }

    /// Whether this is one of the grayscale interpretations.
    pub fn is_monochrome(&self) -> bool {
        matches!(
            self,
            PhotometricInterpretation::Monochrome1 | PhotometricInterpretation::Monochrome2
        )
    }
}

impl FromStr for PhotometricInterpretation {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim_end_matches(|c| c == ' ' || c == '\0') {
            "MONOCHROME1" => PhotometricInterpretation::Monochrome1,
            "MONOCHROME2" => PhotometricInterpretation::Monochrome2,
            "PALETTE COLOR" => PhotometricInterpretation::PaletteColor,
            "RGB" => PhotometricInterpretation::Rgb,
            "YBR_FULL" => PhotometricInterpretation::YbrFull,
            "YBR_FULL_422" => PhotometricInterpretation::YbrFull422,
            "YBR_ICT" => PhotometricInterpretation::YbrIct,
            "YBR_RCT" => PhotometricInterpretation::YbrRct,
            other => PhotometricInterpretation::Other(other.to_string()),
        })
    }
}

impl fmt::Display for PhotometricInterpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The geometry and sample layout of an image.
///
/// All byte offsets computed here are relative to the start of a frame
/// unless stated otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelDataDescriptor {
    /// Rows (0028,0010)
    pub rows: u16,
    /// Columns (0028,0011)
    pub columns: u16,
    /// Number of Frames (0028,0008)
    pub number_of_frames: u32,
    /// Bits Allocated (0028,0100)
    pub bits_allocated: u16,
    /// Bits Stored (0028,0101)
    pub bits_stored: u16,
    /// High Bit (0028,0102)
    pub high_bit: u16,
    /// Whether samples are signed (Pixel Representation = 1)
    pub signed: bool,
    /// Samples per Pixel (0028,0002)
    pub samples_per_pixel: u16,
    /// Photometric Interpretation (0028,0004)
    pub photometric_interpretation: PhotometricInterpretation,
    /// Planar Configuration (0028,0006):
    /// 0 for interleaved samples, 1 for one plane per sample
    pub planar_configuration: u16,
}

impl PixelDataDescriptor {
    /// Create a descriptor of a single frame monochrome image
    /// where all allocated bits are stored.
    pub fn new_monochrome(rows: u16, columns: u16, bits_allocated: u16) -> Self {
        PixelDataDescriptor {
            rows,
            columns,
            number_of_frames: 1,
            bits_allocated,
            bits_stored: bits_allocated,
            high_bit: bits_allocated.saturating_sub(1),
            signed: false,
            samples_per_pixel: 1,
            photometric_interpretation: PhotometricInterpretation::Monochrome2,
            planar_configuration: 0,
        }
    }

    /// Check that the descriptor attributes are consistent.
    pub fn validate(&self) -> Result<(), InvalidDescriptorError> {
        ensure!(
            self.bits_allocated > 0 && self.bits_allocated <= 32,
            InvalidDescriptorSnafu {
                reason: "bits allocated must be between 1 and 32"
            }
        );
        ensure!(
            self.bits_stored > 0 && self.bits_stored <= self.bits_allocated,
            InvalidDescriptorSnafu {
                reason: "bits stored must be between 1 and bits allocated"
            }
        );
        ensure!(
            self.high_bit < self.bits_allocated && self.high_bit + 1 >= self.bits_stored,
            InvalidDescriptorSnafu {
                reason: "high bit is inconsistent with bits stored"
            }
        );
        ensure!(
            self.samples_per_pixel > 0,
            InvalidDescriptorSnafu {
                reason: "samples per pixel must be positive"
            }
        );
        ensure!(
            self.planar_configuration <= 1,
            InvalidDescriptorSnafu {
                reason: "planar configuration must be 0 or 1"
            }
        );
        Ok(())
    }

    /// The number of bytes used by each sample.
    #[inline]
    pub fn bytes_per_sample(&self) -> usize {
        (usize::from(self.bits_allocated) + 7) / 8
    }

    /// The number of pixels in each frame.
    #[inline]
    pub fn pixels_per_frame(&self) -> usize {
        usize::from(self.rows) * usize::from(self.columns)
    }

    /// The number of bytes of each frame of native pixel data.
    #[inline]
    pub fn bytes_per_frame(&self) -> usize {
        self.pixels_per_frame() * usize::from(self.samples_per_pixel) * self.bytes_per_sample()
    }

    /// The number of bytes of the whole native pixel data.
    #[inline]
    pub fn total_bytes(&self) -> usize {
        self.bytes_per_frame() * self.number_of_frames as usize
    }

    /// How many bits a sample must be shifted to the right
    /// for its stored bits to start at bit 0.
    #[inline]
    pub fn bit_shift(&self) -> u32 {
        u32::from(self.high_bit + 1).saturating_sub(u32::from(self.bits_stored))
    }

    /// The byte offset of the given sample of a pixel
    /// within a frame, honoring the planar configuration.
    ///
    /// `pixel` is the linear pixel index in row-major order.
    pub fn sample_offset(&self, pixel: usize, sample: usize) -> usize {
        let bps = self.bytes_per_sample();
        if self.planar_configuration == 1 {
            (sample * self.pixels_per_frame() + pixel) * bps
        } else {
            (pixel * usize::from(self.samples_per_pixel) + sample) * bps
        }
    }

    /// The byte range of the given frame in the whole native pixel data,
    /// or `None` if the frame does not exist.
    pub fn frame_range(&self, frame: u32) -> Option<Range<usize>> {
        if frame >= self.number_of_frames {
            return None;
        }
        let len = self.bytes_per_frame();
        let start = frame as usize * len;
        Some(start..start + len)
    }
}

/// Options for encoding pixel data.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct EncodeOptions {
    /// The quality of the output image as a number between 0 and 100,
    /// where 100 is the best quality that the encapsulated pixel data
    /// format can provide.
    pub quality: Option<u8>,
    /// The amount of effort that the encoder may take to encode the
    /// pixel data, as a number between 0 and 100.
    pub effort: Option<u8>,
    /// Whether the encoder must preserve every sample value.
    pub lossless: bool,
}

impl EncodeOptions {
    /// Create a new set of options for encoding pixel data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output quality.
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Set the encoding effort.
    pub fn effort(mut self, effort: u8) -> Self {
        self.effort = Some(effort);
        self
    }

    /// Require lossless encoding.
    pub fn lossless(mut self, lossless: bool) -> Self {
        self.lossless = lossless;
        self
    }
}

/// Trait object responsible for decoding
/// pixel data based on the transfer syntax.
pub trait PixelDataReader {
    /// Decode a single frame of encapsulated pixel data,
    /// appending the native sample bytes to `dst`.
    ///
    /// `data` holds the compressed bytes of the frame
    /// with the item headers already removed.
    /// The output is in little endian
    /// with the layout described by `descriptor`.
    fn decode_frame(
        &self,
        data: &[u8],
        descriptor: &PixelDataDescriptor,
        frame: u32,
        dst: &mut Vec<u8>,
    ) -> DecodeResult<()>;
}

/// Trait object responsible for encoding
/// pixel data based on a certain transfer syntax.
pub trait PixelDataWriter {
    /// Check whether this writer can encode
    /// images like `descriptor` with the given options.
    fn can_encode(&self, _options: &EncodeOptions, _descriptor: &PixelDataDescriptor) -> bool {
        true
    }

    /// Encode a single frame of native pixel data,
    /// appending the encapsulated frame bytes to `dst`.
    ///
    /// `raw` holds the native little endian samples of all frames,
    /// of which only frame number `frame` is encoded.
    fn encode_frame(
        &self,
        raw: &[u8],
        descriptor: &PixelDataDescriptor,
        frame: u32,
        options: &EncodeOptions,
        dst: &mut Vec<u8>,
    ) -> EncodeResult<()>;
}

/// Alias type for a dynamically dispatched pixel data reader.
pub type DynPixelDataReader = Box<dyn PixelDataReader + Send + Sync + 'static>;

/// Alias type for a dynamically dispatched pixel data writer.
pub type DynPixelDataWriter = Box<dyn PixelDataWriter + Send + Sync + 'static>;

/// The error type of an external image codec.
pub type ImageCodecError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A narrow interface to an image codec implemented outside of this toolkit,
/// such as a JPEG or JPEG 2000 library.
///
/// Implementations work on one frame at a time.
pub trait ImageCodec {
    /// Decode the compressed bytes of a frame into native samples.
    fn decode(
        &self,
        bytes: &[u8],
        descriptor: &PixelDataDescriptor,
    ) -> Result<Vec<u8>, ImageCodecError>;

    /// Encode the native samples of a frame.
    fn encode(
        &self,
        raw: &[u8],
        descriptor: &PixelDataDescriptor,
        options: &EncodeOptions,
    ) -> Result<Vec<u8>, ImageCodecError>;

    /// Check whether the codec can encode images like `descriptor`
    /// with the given options.
    fn can_encode(&self, options: &EncodeOptions, descriptor: &PixelDataDescriptor) -> bool;
}
