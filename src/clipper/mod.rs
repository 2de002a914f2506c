//! Vatti sweep-line clipping of polygons and polylines.
//!
//! Input contours become rings of edges split into monotone bounds at their
//! local minima. A horizontal scanline then sweeps from the largest Y to the
//! smallest, keeping the edges it currently crosses in the active edge list.
//! Crossings, maxima and horizontal runs update winding counts and grow the
//! output rings, which are finally cleaned up and nested into a [`PolyTree`].

mod active;
mod edge;
mod engine;
mod horizontal;
mod intersect;
mod join;
mod local_minima;
mod output;
mod scanbeam;
mod tree;

pub use edge::PolyType;
pub use engine::{Clipper, ClipperOptions};
pub use tree::{NodeId, PolyNode, PolyTree};
