#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod contours;
pub mod diagnostics;
pub mod distortion;
pub mod linalg;

// Supporting modules used by the command-line tool and the edge producer.
pub mod angle;
pub mod config;
pub mod edges;
pub mod image;

// --- High-level re-exports -------------------------------------------------

pub use crate::contours::{CleanParams, ContourError, ContourMap, ContourPoint};
pub use crate::diagnostics::CleanReport;
pub use crate::distortion::{
    check_invertibility, max_squared_radius, normalized_params, DistortionKind,
    LensDistortionModel,
};
pub use crate::linalg::{gauss_solve, SolveError};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use lens_contours::prelude::*;
///
/// # fn main() -> Result<(), ContourError> {
/// let img = ImageF32::from_fn(64, 48, |x, _| if x < 32 { 0.0 } else { 1.0 });
/// let mut contours = detect_contours(&img, 0.5)?;
/// if let Some(report) = contours.clean(&CleanParams::default()) {
///     println!("{} -> {} points", report.input_points, report.output_points());
/// }
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::edges::detect_contours;
    pub use crate::image::ImageF32;
    pub use crate::{CleanParams, ContourError, ContourMap, ContourPoint};
}
