//! Private module for pixel sample value transformation functions.

use snafu::Snafu;

/// Description of a modality rescale function,
/// defined by a _rescale slope_ and _rescale intercept_.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rescale {
    /// the rescale slope
    pub slope: f64,
    /// the rescale intercept
    pub intercept: f64,
}

impl Rescale {
    /// Create a new rescale function.
    #[inline]
    pub fn new(slope: f64, intercept: f64) -> Self {
        Rescale { slope, intercept }
    }

    /// Apply the rescale function to a value.
    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        self.slope * value + self.intercept
    }
}

impl Default for Rescale {
    fn default() -> Self {
        Rescale::new(1., 0.)
    }
}

/// A known DICOM Value of Interest (VOI) LUT function descriptor.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum VoiLutFunction {
    /// LINEAR
    Linear,
    /// LINEAR_EXACT
    LinearExact,
    /// SIGMOID
    Sigmoid,
}

/// Unrecognized VOI LUT function name
#[derive(Debug, Copy, Clone, PartialEq, Snafu)]
pub struct FromVoiLutFunctionError {
    _private: (),
}

impl std::convert::TryFrom<&str> for VoiLutFunction {
    type Error = FromVoiLutFunctionError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim_end_matches(|c| c == ' ' || c == '\0') {
            "LINEAR" => Ok(Self::Linear),
            "LINEAR_EXACT" => Ok(Self::LinearExact),
            "SIGMOID" => Ok(Self::Sigmoid),
            _ => Err(FromVoiLutFunctionError { _private: () }),
        }
    }
}

impl Default for VoiLutFunction {
    fn default() -> Self {
        VoiLutFunction::Linear
    }
}

/// The parameters of a single window level
/// for a VOI LUT transformation,
/// comprising the window center and the window width.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WindowLevel {
    /// The _Window Width_.
    ///
    /// Should be greater than or equal to 1
    pub width: f64,
    /// The _Window Center_.
    pub center: f64,
}

/// A full description of a VOI LUT function transformation
/// based on a window level.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WindowLevelTransform {
    voi_lut_function: VoiLutFunction,
    window_level: WindowLevel,
}

impl WindowLevelTransform {
    /// Create a new window level transformation.
    ///
    /// The width of the given `window_level` is clamped to 1
    /// if it is lower than 1.
    #[inline]
    pub fn new(voi_lut_function: VoiLutFunction, window_level: WindowLevel) -> Self {
        WindowLevelTransform {
            voi_lut_function,
            window_level: WindowLevel {
                center: window_level.center,
                width: window_level.width.max(1.),
            },
        }
    }

    /// Create a new window level transformation
    /// with the `LINEAR` function.
    #[inline]
    pub fn linear(window_level: WindowLevel) -> Self {
        Self::new(VoiLutFunction::Linear, window_level)
    }

    /// The VOI LUT function of this transformation.
    pub fn function(&self) -> VoiLutFunction {
        self.voi_lut_function
    }

    /// The window level of this transformation, after clamping.
    pub fn window_level(&self) -> WindowLevel {
        self.window_level
    }

    /// Apply the window level transformation on a rescaled value,
    /// into a number between `0` and `1`.
    pub fn apply(&self, value: f64) -> f64 {
        let WindowLevel { width, center } = self.window_level;
        match self.voi_lut_function {
            VoiLutFunction::Linear => window_level_linear(value, width, center),
            VoiLutFunction::LinearExact => window_level_linear_exact(value, width, center),
            VoiLutFunction::Sigmoid => window_level_sigmoid(value, width, center),
        }
    }
}

fn window_level_linear(value: f64, width: f64, center: f64) -> f64 {
    debug_assert!(width >= 1.);

    // C.11.2.1.2.1

    let min = center - 0.5 - (width - 1.) / 2.;
    let max = center - 0.5 + (width - 1.) / 2.;

    if value <= min {
        0.
    } else if value > max {
        1.
    } else {
        (value - (center - 0.5)) / (width - 1.) + 0.5
    }
}

fn window_level_linear_exact(value: f64, width: f64, center: f64) -> f64 {
    debug_assert!(width >= 1.);

    // C.11.2.1.3.2

    let min = center - width / 2.;
    let max = center + width / 2.;

    if value <= min {
        0.
    } else if value > max {
        1.
    } else {
        (value - center) / width + 0.5
    }
}

fn window_level_sigmoid(value: f64, width: f64, center: f64) -> f64 {
    debug_assert!(width >= 1.);

    // C.11.2.1.3.1

    1. / (1. + f64::exp(-4. * (value - center) / width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    /// Applying a common rescale function to a value
    /// gives the expected output.
    #[test]
    fn modality_lut_baseline() {
        let rescale = Rescale::new(1., -1024.);

        assert_eq!(rescale.apply(0.), -1024.);
        assert_eq!(rescale.apply(1.), -1023.);
        assert_eq!(rescale.apply(2.), -1022.);
        assert_eq!(rescale.apply(1024.), 0.);
    }

    /// Applying a linear window level
    /// as per the example described in the standard
    /// (C.11.2.1.2.1)
    /// gives us the expected outcome.
    #[test]
    fn window_level_linear_example() {
        let window_level = WindowLevel {
            width: 4096.,
            center: 2048.,
        };
        let transform = WindowLevelTransform::linear(window_level);

        // x <= 0
        assert_eq!(transform.apply(-2.), 0.);
        assert_eq!(transform.apply(-1.), 0.);
        assert_eq!(transform.apply(0.), 0.);

        // x > 4095
        assert_eq!(transform.apply(4095.5), 1.);
        assert_eq!(transform.apply(4096.), 1.);
        assert_eq!(transform.apply(4097.), 1.);

        // inbetween:  y = (x - 2047.5) / 4095 + 0.5
        let x = 1024.;
        let expected_y = (x - 2047.5) / 4095. + 0.5;
        assert!((transform.apply(x) - expected_y).abs() < 1e-9);
    }

    #[test]
    fn window_level_linear_soft_tissue() {
        let transform = WindowLevelTransform::linear(WindowLevel {
            width: 400.,
            center: 40.,
        });

        // the midpoint of the window maps to one half
        assert_eq!(transform.apply(39.5), 0.5);
        assert!((transform.apply(40.) - 0.5).abs() < 1. / 255.);

        assert_eq!(transform.apply(-160.), 0.);
        assert_eq!(transform.apply(239.), 1.);
        assert!(transform.apply(238.) < 1.);
    }

    #[test]
    fn window_level_linear_exact() {
        let transform = WindowLevelTransform::new(
            VoiLutFunction::LinearExact,
            WindowLevel {
                width: 400.,
                center: 40.,
            },
        );
        assert_eq!(transform.apply(40.), 0.5);
        assert_eq!(transform.apply(-160.), 0.);
        assert_eq!(transform.apply(240.), 1.);
        assert_eq!(transform.apply(140.), 0.75);
    }

    #[test]
    fn window_level_sigmoid() {
        let transform = WindowLevelTransform::new(
            VoiLutFunction::Sigmoid,
            WindowLevel {
                width: 400.,
                center: 40.,
            },
        );
        assert_eq!(transform.apply(40.), 0.5);
        assert!(transform.apply(-1000.) < 0.001);
        assert!(transform.apply(1000.) > 0.999);
    }

    #[test]
    fn width_is_clamped() {
        let transform = WindowLevelTransform::linear(WindowLevel {
            width: 0.,
            center: 10.,
        });
        assert_eq!(transform.window_level().width, 1.);
        assert_eq!(transform.apply(9.5), 0.);
        assert_eq!(transform.apply(10.), 1.);
    }

    #[test]
    fn voi_lut_function_names() {
        assert_eq!(VoiLutFunction::try_from("LINEAR"), Ok(VoiLutFunction::Linear));
        assert_eq!(
            VoiLutFunction::try_from("LINEAR_EXACT"),
            Ok(VoiLutFunction::LinearExact)
        );
        assert_eq!(VoiLutFunction::try_from("SIGMOID "), Ok(VoiLutFunction::Sigmoid));
        assert!(VoiLutFunction::try_from("LOG").is_err());
    }
}
