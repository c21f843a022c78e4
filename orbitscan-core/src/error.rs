//! Calculation error types.

use thiserror::Error;

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("screen has no pixels")]
    EmptyScreen,

    #[error("view has zero width or height")]
    DegenerateView,

    #[error("max iterations must be at least 2, got {0}")]
    MaxIterations(u32),

    #[error("at least 2 colors are required, got {0}")]
    Colors(u32),

    #[error("bailout limit must be positive, got {0}")]
    Bailout(f64),

    #[error("decomposition must be a power of two in 2..=256, got {0}")]
    Decomposition(u32),

    #[error("fixed-point bit shift {0} is out of range")]
    BitShift(u32),

    #[error("poll interval must be at least one pixel")]
    PollInterval,
}

/// Fatal conditions that stop the current image.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("work list is full ({capacity} items)")]
    WorkListFull { capacity: usize },

    #[error("view needs {required} bits of precision, limit is {limit}")]
    PrecisionExhausted { required: usize, limit: usize },

    #[error("unsupported resume snapshot version {version}")]
    UnsupportedSnapshot { version: u32 },

    #[error("resume snapshot does not match the requested screen")]
    SnapshotMismatch,

    #[error("pan offset must be a multiple of {alignment} pixels")]
    PanMisaligned { alignment: i32 },

    #[error("{fractal:?} calculator rejected the image setup")]
    CalculatorSetup { fractal: crate::FractalType },
}
