//! Look-up table (LUT) implementation and transformation functions.
//!
//! This module contains the [`Lut`] data type,
//! designed to turn stored pixel sample values
//! (as extracted by [`PixelBuffer`](crate::PixelBuffer))
//! into displayable or otherwise more meaningful values.
//!
//! The type also provides easy-to-use constructor functions
//! for common DICOM sample value transformations.

use num_traits::{Bounded, NumCast, ToPrimitive};
use snafu::{ensure, OptionExt, Snafu};

use crate::{Rescale, WindowLevel, WindowLevelTransform};

/// The largest number of bits stored for which a LUT can be built.
pub const MAX_LUT_BITS: u16 = 16;

/// The LUT could not be created.
#[derive(Debug, PartialEq, Snafu)]
pub enum CreateLutError {
    /// Unsupported number of bits stored: {bits_stored}
    #[snafu(display("Cannot build a LUT for {} bits stored", bits_stored))]
    UnsupportedBitsStored { bits_stored: u16 },

    /// Entry #{index} was mapped to {y_value},
    /// which could not be cast to the target type.
    #[snafu(display("LUT entry #{} was mapped to {}, which is out of range", index, y_value))]
    CastEntry { index: usize, y_value: f64 },
}

/// A look up table for pixel data sample value transformations.
///
/// The table has one entry per possible stored value,
/// so `2^bits_stored` entries in total.
///
/// # Example
///
/// ```
/// # use dcmkit_pixeldata::{
/// #     CreateLutError, Lut, Rescale, VoiLutFunction,
/// #     WindowLevel, WindowLevelTransform,
/// # };
/// let bits_stored = 12;
/// let lut: Lut<u8> = Lut::new_rescale_and_window(
///     bits_stored,
///     false,
///     Rescale::new(1., -1024.),
///     WindowLevelTransform::new(
///         VoiLutFunction::Linear,
///         WindowLevel {
///             width: 300.,
///             center: 50.
///         }
///     ),
/// )?;
///
/// assert_eq!(lut.get(0), 0);
/// assert_eq!(lut.get(4095), 255);
/// # Result::<(), CreateLutError>::Ok(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Lut<T> {
    /// the table which maps an index to a transformed value,
    /// of size 2 to the power of `bits_stored`
    table: Vec<T>,
    /// whether the input sample values are signed (Pixel Representation = 1)
    signed: bool,
}

impl<T> Lut<T>
where
    T: NumCast,
    T: Copy,
{
    /// Create a new LUT with the given characteristics
    /// and populate it with the outputs of the provided function.
    ///
    /// - `bits_stored`:
    ///   the number of bits effectively used to represent the sample values
    ///   (the _Bits Stored_ DICOM attribute),
    ///   at most [`MAX_LUT_BITS`]
    /// - `signed`:
    ///   whether the input sample values are expected to be signed
    ///   (_Pixel Representation_ = 1)
    /// - `f`: the mapping function
    pub fn new_with_fn(
        bits_stored: u16,
        signed: bool,
        f: impl Fn(f64) -> f64,
    ) -> Result<Self, CreateLutError> {
        ensure!(
            bits_stored != 0 && bits_stored <= MAX_LUT_BITS,
            UnsupportedBitsStoredSnafu { bits_stored }
        );
        let size = 1_usize << bits_stored;

        let table: Result<Vec<_>, _> = (0..size)
            .map(|i| {
                // account for signedness to determine input pixel value
                let x = if signed && i >= size / 2 {
                    i as f64 - size as f64
                } else {
                    i as f64
                };
                let value = f(x);
                T::from(value).context(CastEntrySnafu {
                    index: i,
                    y_value: value,
                })
            })
            .collect();
        Ok(Self {
            table: table?,
            signed,
        })
    }

    /// Create a new LUT containing only the modality rescale transformation.
    pub fn new_rescale(
        bits_stored: u16,
        signed: bool,
        rescale: Rescale,
    ) -> Result<Self, CreateLutError> {
        Self::new_with_fn(bits_stored, signed, |v| rescale.apply(v))
    }

    /// The number of entries in the table.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table is empty, which never happens
    /// for a successfully created LUT.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Apply the transformation to a single stored sample value.
    ///
    /// Values outside of the stored range
    /// wrap around to their lowest `bits_stored` bits.
    pub fn get(&self, sample_value: i64) -> T {
        let mask = (self.table.len() - 1) as u64;
        let index = (sample_value as u64 & mask) as usize;
        self.table[index]
    }

    /// Adapts an iterator of stored sample values
    /// to an iterator of transformed values.
    pub fn map_iter<'a>(
        &'a self,
        iter: impl IntoIterator<Item = i64> + 'a,
    ) -> impl Iterator<Item = T> + 'a {
        iter.into_iter().map(move |i| self.get(i))
    }

    /// Whether the LUT expects signed sample values.
    pub fn is_signed(&self) -> bool {
        self.signed
    }
}

impl<T> Lut<T>
where
    T: NumCast,
    T: Copy,
    T: Bounded,
    T: ToPrimitive,
{
    /// Create a new LUT containing the modality rescale transformation
    /// and the VOI transformation defined by a window level.
    ///
    /// The output values go from 0 to the maximum value of `T`,
    /// so from 0 to 255 for an 8-bit LUT.
    pub fn new_rescale_and_window(
        bits_stored: u16,
        signed: bool,
        rescale: Rescale,
        voi: WindowLevelTransform,
    ) -> Result<Self, CreateLutError> {
        let y_max = T::max_value().to_f64().unwrap_or(255.);
        Self::new_with_fn(bits_stored, signed, |x| {
            (voi.apply(rescale.apply(x)) * y_max).round()
        })
    }

    /// Create a new LUT containing
    /// a VOI transformation defined by a window level.
    pub fn new_window(
        bits_stored: u16,
        signed: bool,
        voi: WindowLevelTransform,
    ) -> Result<Self, CreateLutError> {
        Self::new_rescale_and_window(bits_stored, signed, Rescale::default(), voi)
    }

    /// Create a new LUT containing the given modality rescale transformation
    /// and a linear window spanning the stored values
    /// from `min` to `max`, inclusive.
    pub fn new_rescale_and_normalize(
        bits_stored: u16,
        signed: bool,
        rescale: Rescale,
        (min, max): (i64, i64),
    ) -> Result<Self, CreateLutError> {
        let min = rescale.apply(min as f64);
        let max = rescale.apply(max as f64);

        // swap if negative slope
        let (min, max) = if min > max { (max, min) } else { (min, max) };

        let voi = WindowLevelTransform::linear(WindowLevel {
            width: max - min + 1.,
            center: (min + max + 1.) / 2.,
        });

        Self::new_rescale_and_window(bits_stored, signed, rescale, voi)
    }
}

#[cfg(test)]
mod tests {
    use crate::{VoiLutFunction, WindowLevel};

    use super::*;

    #[test]
    fn lut_signed_numbers() {
        // 10-bit precision input, signed output
        let lut: Lut<i16> = Lut::new_rescale(10, true, Rescale::new(2., -1024.)).unwrap();

        assert_eq!(lut.len(), 1024);
        assert_eq!(lut.get(0), -1024);
        assert_eq!(lut.get(1), -1022);
        assert_eq!(lut.get(-1), -1026);
        assert_eq!(lut.get(-2), -1028);
        assert_eq!(lut.get(500), -24);
    }

    #[test]
    fn lut_rescale_and_window_8bit() {
        let lut: Lut<u8> = Lut::new_rescale_and_window(
            12,
            false,
            Rescale::new(1., -1024.),
            WindowLevelTransform::new(
                VoiLutFunction::Linear,
                WindowLevel {
                    width: 300.,
                    center: 50.,
                },
            ),
        )
        .unwrap();

        // < -100
        assert_eq!(lut.get(824), 0);
        // > 200
        assert_eq!(lut.get(1224), 255);
        // around the middle
        let val = lut.get(1024 + 50);
        assert!((127..=128).contains(&val), "outcome was {}", val);
    }

    #[test]
    fn lut_normalize_to_range() {
        let lut: Lut<u8> =
            Lut::new_rescale_and_normalize(16, false, Rescale::default(), (0, 500)).unwrap();

        assert_eq!(lut.get(0), 0);
        assert_eq!(lut.get(500), 255);
        let y = lut.get(250);
        assert!(y > 0 && y < 255);
    }

    #[test]
    fn lut_rejects_wide_samples() {
        let err = Lut::<u8>::new_rescale(32, false, Rescale::default()).unwrap_err();
        assert_eq!(err, CreateLutError::UnsupportedBitsStored { bits_stored: 32 });
    }

    #[test]
    fn lut_rejects_values_out_of_range() {
        let err = Lut::<u8>::new_rescale(8, false, Rescale::new(1., -1.)).unwrap_err();
        assert!(matches!(err, CreateLutError::CastEntry { index: 0, .. }));
    }
}
