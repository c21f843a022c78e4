//! Calculation configuration and the fractal type catalogue.
//!
//! `CalcConfig` holds every knob the engine reads; every field has a
//! serde default so partial configurations deserialize cleanly.

use crate::{ConfigError, View};
use serde::{Deserialize, Serialize};

/// Fractal types with built-in orbit calculators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FractalType {
    Mandelbrot,
    Julia,
    LambdaSine,
}

/// Static description of a fractal type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractalConfig {
    pub fractal_type: FractalType,
    /// Unique identifier used for lookup
    pub id: &'static str,
    pub display_name: &'static str,
    /// Default corners as strings (x_min, x_max, y_min, y_max)
    pub default_corners: (&'static str, &'static str, &'static str, &'static str),
    pub default_params: [f64; 2],
}

impl FractalConfig {
    /// Create the default view for this fractal at the given size and precision.
    pub fn default_view(&self, dots: (u32, u32), precision_bits: usize) -> Result<View, String> {
        let (x_min, x_max, y_min, y_max) = self.default_corners;
        View::from_strings(x_min, x_max, y_min, y_max, dots, precision_bits)
    }
}

pub static MANDELBROT_CONFIG: FractalConfig = FractalConfig {
    fractal_type: FractalType::Mandelbrot,
    id: "mandelbrot",
    display_name: "Mandelbrot Set",
    default_corners: ("-2.5", "1.5", "-1.5", "1.5"),
    default_params: [0.0, 0.0],
};

pub static JULIA_CONFIG: FractalConfig = FractalConfig {
    fractal_type: FractalType::Julia,
    id: "julia",
    display_name: "Julia Set",
    default_corners: ("-2.0", "2.0", "-1.5", "1.5"),
    default_params: [0.3, 0.6],
};

pub static LAMBDA_SINE_CONFIG: FractalConfig = FractalConfig {
    fractal_type: FractalType::LambdaSine,
    id: "lambda_sine",
    display_name: "Lambda Sine",
    default_corners: ("-8.0", "8.0", "-6.0", "6.0"),
    default_params: [1.0, 0.4],
};

/// Look up a fractal configuration by ID.
pub fn get_fractal_config(id: &str) -> Option<&'static FractalConfig> {
    match id {
        "mandelbrot" => Some(&MANDELBROT_CONFIG),
        "julia" => Some(&JULIA_CONFIG),
        "lambda_sine" => Some(&LAMBDA_SINE_CONFIG),
        _ => None,
    }
}

impl FractalType {
    pub fn config(self) -> &'static FractalConfig {
        match self {
            FractalType::Mandelbrot => &MANDELBROT_CONFIG,
            FractalType::Julia => &JULIA_CONFIG,
            FractalType::LambdaSine => &LAMBDA_SINE_CONFIG,
        }
    }
}

/// Escape test applied after each orbit step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BailoutKind {
    /// `re² + im² >= limit`
    Modulus,
    Real,
    Imag,
    Or,
    And,
    Manhattan,
    ManhattanReal,
}

/// Symmetry a fractal type declares (or a user forces).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymmetryClass {
    /// Calculator draws nothing through the plot primitive.
    NoPlot,
    None,
    XAxis,
    XAxisNoParam,
    XAxisNoReal,
    XAxisNoImag,
    YAxis,
    YAxisNoParam,
    XYAxis,
    XYAxisNoParam,
    Origin,
    OriginNoParam,
    Pi,
    PiNoParam,
}

/// Which periodicity schedule to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodicityPolicy {
    /// Save every other iterate, lengthen the interval on every save.
    Legacy,
    /// Lengthen every `max(4, log10(max_iterations))` saves.
    #[default]
    Adaptive,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsideColoring {
    #[default]
    MaxIter,
    Fixed(u32),
    Period,
    ZMagnitude,
    StarTrail,
    EpsilonCross,
    Atan,
    BeautyOfFractals60,
    BeautyOfFractals61,
}

impl InsideColoring {
    /// Inside modes that need the orbit to run its full course.
    pub fn forbids_periodicity(self) -> bool {
        matches!(self, InsideColoring::ZMagnitude | InsideColoring::StarTrail)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutsideColoring {
    #[default]
    Iteration,
    Fixed(u32),
    Real,
    Imag,
    Mult,
    Sum,
    Atan,
    TotalDistance,
}

impl OutsideColoring {
    /// Outside transforms whose result is not mirror-symmetric.
    pub fn breaks_symmetry(self) -> bool {
        matches!(
            self,
            OutsideColoring::Real
                | OutsideColoring::Imag
                | OutsideColoring::Mult
                | OutsideColoring::Sum
                | OutsideColoring::Atan
                | OutsideColoring::TotalDistance
        )
    }
}

/// Pixel visitation strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalcMode {
    OnePass,
    #[default]
    TwoPass,
    Diffusion,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericMode {
    /// Native floats when the view allows, arbitrary precision otherwise.
    #[default]
    Auto,
    Native,
    FixedPoint,
    Arbitrary,
}

/// Finite attractor handling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FiniteAttractor {
    #[default]
    Off,
    /// Locate the attractor and color captured points by iteration count.
    On,
    /// As `On`, folding the iteration count by the attractor's period.
    Phase,
}

/// A finite attractor the orbit may be captured by.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attractor {
    pub re: f64,
    pub im: f64,
    pub period: u32,
}

/// Continuous potential coloring parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PotentialParams {
    /// Zero potential level (highest color)
    pub level: f64,
    /// Slope multiplier, higher is steeper
    pub slope: f64,
    /// Replacement modulus bailout, 0 keeps the configured limit
    pub bailout: f64,
}

/// Circle inversion applied to pixel coordinates before iterating.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Inversion {
    pub radius: f64,
    pub center_re: f64,
    pub center_im: f64,
}

impl Inversion {
    pub fn is_centered(&self) -> bool {
        self.center_re == 0.0 && self.center_im == 0.0
    }

    pub fn apply(&self, re: f64, im: f64) -> (f64, f64) {
        let x = re - self.center_re;
        let y = im - self.center_im;
        let r2 = x * x + y * y;
        if r2 == 0.0 {
            return (f64::MAX, f64::MAX);
        }
        let scale = self.radius * self.radius / r2;
        (x * scale + self.center_re, y * scale + self.center_im)
    }
}

/// Everything the engine needs to know about how to calculate an image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcConfig {
    pub max_iterations: u32,
    /// `None` uses the fractal type's default test.
    pub bailout_kind: Option<BailoutKind>,
    pub bailout_limit: f64,
    /// 0 disables checking, a negative value paints caught cycles with color 7.
    /// The magnitude sets the tolerance as a power of two below the pixel size.
    pub periodicity: i32,
    pub periodicity_policy: PeriodicityPolicy,
    pub inside: InsideColoring,
    pub outside: OutsideColoring,
    /// Number of angular bands, 0 disables.
    pub decomposition: u32,
    pub biomorph: Option<u32>,
    pub distance_test: i32,
    pub distance_width: i32,
    pub potential: Option<PotentialParams>,
    pub potential_16bit: bool,
    pub calc_mode: CalcMode,
    pub colors: u32,
    pub atan_colors: u32,
    /// Distance below which epsilon-cross inside coloring triggers.
    pub proximity: f64,
    pub force_symmetry: Option<SymmetryClass>,
    pub inversion: Option<Inversion>,
    pub attractors: Vec<Attractor>,
    pub attractor_radius: f64,
    pub finite_attractor: FiniteAttractor,
    pub numeric_mode: NumericMode,
    pub bit_shift: u32,
    pub max_precision_bits: usize,
    /// Strategies poll for cancellation every this many pixels.
    pub poll_interval_pixels: u32,
    pub diffusion_preview: bool,
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            max_iterations: 150,
            bailout_kind: None,
            bailout_limit: 4.0,
            periodicity: 1,
            periodicity_policy: PeriodicityPolicy::default(),
            inside: InsideColoring::default(),
            outside: OutsideColoring::default(),
            decomposition: 0,
            biomorph: None,
            distance_test: 0,
            distance_width: 71,
            potential: None,
            potential_16bit: false,
            calc_mode: CalcMode::default(),
            colors: 256,
            atan_colors: 180,
            proximity: 0.01,
            force_symmetry: None,
            inversion: None,
            attractors: Vec::new(),
            attractor_radius: 1.0 / 32768.0,
            finite_attractor: FiniteAttractor::default(),
            numeric_mode: NumericMode::default(),
            bit_shift: 48,
            max_precision_bits: 4096,
            poll_interval_pixels: 16,
            diffusion_preview: true,
        }
    }
}

impl CalcConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations < 2 {
            return Err(ConfigError::MaxIterations(self.max_iterations));
        }
        if self.colors < 2 {
            return Err(ConfigError::Colors(self.colors));
        }
        if self.bailout_limit.is_nan() || self.bailout_limit <= 0.0 {
            return Err(ConfigError::Bailout(self.bailout_limit));
        }
        if self.decomposition != 0
            && (!self.decomposition.is_power_of_two() || !(2..=256).contains(&self.decomposition))
        {
            return Err(ConfigError::Decomposition(self.decomposition));
        }
        if self.bit_shift == 0 || self.bit_shift > crate::fixed_point::MAX_BIT_SHIFT {
            return Err(ConfigError::BitShift(self.bit_shift));
        }
        if self.poll_interval_pixels == 0 {
            return Err(ConfigError::PollInterval);
        }
        Ok(())
    }

    /// Effective modulus limit once potential coloring has had its say.
    pub fn magnitude_limit(&self) -> f64 {
        match self.potential {
            Some(p) if p.bailout > 0.0 => p.bailout,
            _ => self.bailout_limit,
        }
    }
}

/// One image to calculate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageRequest {
    pub fractal: FractalType,
    pub view: View,
    /// Up to ten formula parameters; missing ones read as zero.
    pub params: Vec<f64>,
    pub config: CalcConfig,
}

impl ImageRequest {
    pub fn new(fractal: FractalType, view: View, config: CalcConfig) -> Self {
        Self {
            fractal,
            view,
            params: fractal.config().default_params.to_vec(),
            config,
        }
    }

    pub fn with_params(mut self, params: &[f64]) -> Self {
        self.params = params.to_vec();
        self
    }

    pub fn param(&self, index: usize) -> f64 {
        self.params.get(index).copied().unwrap_or(0.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.view.x_dots == 0 || self.view.y_dots == 0 {
            return Err(ConfigError::EmptyScreen);
        }
        if self.view.x_dots > i32::MAX as u32 / 2 || self.view.y_dots > i32::MAX as u32 / 2 {
            return Err(ConfigError::EmptyScreen);
        }
        if self.view.width().is_zero() || self.view.height().is_zero() {
            return Err(ConfigError::DegenerateView);
        }
        self.config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_fractal_config_finds_known_types() {
        assert_eq!(
            get_fractal_config("mandelbrot").map(|c| c.fractal_type),
            Some(FractalType::Mandelbrot)
        );
        assert_eq!(
            get_fractal_config("julia").map(|c| c.display_name),
            Some("Julia Set")
        );
        assert!(get_fractal_config("unknown_fractal").is_none());
    }

    #[test]
    fn default_view_parses_corners() {
        let view = MANDELBROT_CONFIG.default_view((640, 480), 64).unwrap();
        assert_eq!(view.x_min.to_f64(), -2.5);
        assert_eq!(view.y_max.to_f64(), 1.5);
        assert_eq!(view.x_dots, 640);
    }

    #[test]
    fn default_config_validates() {
        assert!(CalcConfig::default().validate().is_ok());
    }

    #[test]
    fn decomposition_must_be_power_of_two() {
        let config = CalcConfig {
            decomposition: 12,
            ..CalcConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Decomposition(12)));

        let config = CalcConfig {
            decomposition: 512,
            ..CalcConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn potential_bailout_replaces_limit() {
        let config = CalcConfig {
            potential: Some(PotentialParams {
                level: 255.0,
                slope: 820.0,
                bailout: 150.0,
            }),
            ..CalcConfig::default()
        };
        assert_eq!(config.magnitude_limit(), 150.0);
        assert_eq!(CalcConfig::default().magnitude_limit(), 4.0);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: CalcConfig =
            serde_json::from_str(r#"{"max_iterations": 500, "calc_mode": "diffusion"}"#).unwrap();
        assert_eq!(config.max_iterations, 500);
        assert_eq!(config.calc_mode, CalcMode::Diffusion);
        assert_eq!(config.colors, 256);
    }

    #[test]
    fn missing_params_read_as_zero() {
        let view = MANDELBROT_CONFIG.default_view((10, 10), 64).unwrap();
        let request = ImageRequest::new(FractalType::Julia, view, CalcConfig::default())
            .with_params(&[0.25]);
        assert_eq!(request.param(0), 0.25);
        assert_eq!(request.param(3), 0.0);
    }

    #[test]
    fn inversion_maps_circle_to_itself() {
        let inversion = Inversion {
            radius: 2.0,
            center_re: 0.0,
            center_im: 0.0,
        };
        let (re, im) = inversion.apply(2.0, 0.0);
        assert_eq!((re, im), (2.0, 0.0));
        let (re, _) = inversion.apply(1.0, 0.0);
        assert_eq!(re, 4.0);
    }
}
