//! Edge extraction feeding the contour map.
//!
//! - Gradient computation (Sobel/Scharr) returning `gx`, `gy` and magnitude.
//! - Non‑maximum suppression along the quantized gradient direction with a
//!   parabolic subpixel refinement of the edge location.
//! - Conversion of the surviving edge elements into a [`ContourMap`] whose
//!   tangents are the gradients rotated by 90°.
//!
//! Borders are handled by clamping in the gradient pass; NMS ignores the
//! outermost pixel frame.
//!
//! [`ContourMap`]: crate::contours::ContourMap

pub mod grad;
pub mod nms;

pub use grad::{image_gradients, Grad, GradientKernel};
pub use nms::{contours_from_edges, detect_contours, detect_edges_nms, EdgeElement, NmsEdgesResult};
