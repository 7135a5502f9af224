//! Subpixel contour maps and their cleaning.
//!
//! A [`ContourMap`] stores one optional contour sample per grid position:
//! subpixel coordinates and an undirected tangent `(cosine, sine)` with
//! `sine >= 0`. An edge detector fills it (see `crate::edges`), then
//! [`ContourMap::clean`] removes
//!
//! - points whose neighbors disagree with their orientation (corners, texture),
//! - points with too few neighbors (speckle, short fragments),
//! - all but the strongest point of dense clusters, so that downstream line
//!   detection sees evenly spaced samples.
//!
//! Positions are addressed linearly as `m = row * width + col`. Neighbor
//! windows are confined to an interior frame, which keeps every window access
//! in range without per-access checks. Points in the outer frame are dropped
//! by cleaning.

mod clean;
mod map;
mod options;

pub use map::{ContourError, ContourMap, ContourPoint};
pub use options::CleanParams;

#[cfg(test)]
mod tests;
