pub mod polygon_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Relative tolerance used when comparing cross products for collinearity.
pub const TOLERANCE: f64 = 1e-12;

/// Slope sentinel stored for edges with zero height.
pub const HORIZONTAL: f64 = -1.0e40;
