pub mod bigfloat;
pub mod complex;
pub mod config;
pub mod error;
pub mod fixed_point;
pub mod outcome;
pub mod pixel_rect;
pub mod precision;
pub mod snapshot;
pub mod view;
pub mod work_item;

pub use bigfloat::BigFloat;
pub use complex::{BigFloatComplex, F64Complex, OrbitComplex};
pub use config::{
    get_fractal_config, Attractor, BailoutKind, CalcConfig, CalcMode, FiniteAttractor,
    FractalConfig, FractalType, ImageRequest, InsideColoring, Inversion, NumericMode,
    OutsideColoring, PeriodicityPolicy, PotentialParams, SymmetryClass,
};
pub use error::{CalcError, ConfigError};
pub use fixed_point::FixedComplex;
pub use outcome::{EpsilonHit, OrbitResult, Outcome};
pub use pixel_rect::PixelRect;
pub use precision::{calculate_precision_bits, resolve_numeric_mode, significant_bits};
pub use snapshot::{ContextScratch, ResumeSnapshot, SNAPSHOT_VERSION};
pub use view::{PixelSteps, View};
pub use work_item::{ScanCursor, SymmetryFlags, WorkItem};
