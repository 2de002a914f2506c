use thiserror::Error;

/// Top-level error type for the clipping engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClipError {
    /// `execute` was entered while another run still holds the engine.
    #[error("clipper is already executing")]
    Locked,

    /// No local minima were registered, so there is nothing to sweep.
    #[error("no paths to clip")]
    NothingToClip,

    #[error(transparent)]
    Algorithm(#[from] AlgorithmError),
}

/// Unrecoverable conditions detected during the sweep.
///
/// Any of these aborts the current run; the engine discards all partial
/// output and stays usable for the next run.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmError {
    #[error("intersections cannot be ordered so that every pair is adjacent")]
    IntersectionOrder,

    #[error("maxima pair is neither fully resolved nor fully unresolved")]
    MaximaPairing,

    #[error("edge promoted past the end of its bound")]
    MissingNextBound,
}

/// Convenience type alias for results using [`ClipError`].
pub type Result<T> = std::result::Result<T, ClipError>;
