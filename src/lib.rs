pub mod clipper;
pub mod error;
pub mod math;

pub use clipper::{Clipper, ClipperOptions, NodeId, PolyNode, PolyTree, PolyType};
pub use error::{AlgorithmError, ClipError, Result};
pub use math::Point2;
