//! Non‑maximum suppression with subpixel peak refinement.
//!
//! For each pixel the gradient direction is quantized to one of four axes
//! (0°, 45°, 90°, 135°). A pixel is kept when its magnitude is above the
//! threshold and strictly greater than both neighbors along that axis. The
//! three magnitudes are then fitted with a parabola whose vertex gives the
//! subpixel edge position along the axis.
//!
//! The outermost 1‑pixel frame is skipped so that neighbor lookups stay in
//! range.
use crate::angle::tangent_from_gradient;
use crate::contours::{ContourError, ContourMap, ContourPoint};
use crate::edges::grad::{image_gradients, Grad, GradientKernel};
use crate::image::{ImageF32, ImageView};
use log::debug;
use serde::Serialize;
use std::time::Instant;

/// A sparse edge sample after NMS.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeElement {
    /// X coordinate of the pixel
    pub x: u32,
    /// Y coordinate of the pixel
    pub y: u32,
    /// Refined edge location in pixels
    pub subpixel: [f32; 2],
    /// Gradient magnitude at (x, y)
    pub magnitude: f32,
    /// Horizontal gradient component
    pub gx: f32,
    /// Vertical gradient component
    pub gy: f32,
}

const TAN_22_5_DEG: f32 = 0.41421356237;

/// Vertex offset of the parabola through `(-1, m1)`, `(0, m0)`, `(1, m2)`,
/// clamped to half a pixel.
#[inline]
fn parabolic_offset(m1: f32, m0: f32, m2: f32) -> f32 {
    let denom = m1 - 2.0 * m0 + m2;
    if denom.abs() <= f32::EPSILON {
        return 0.0;
    }
    (0.5 * (m1 - m2) / denom).clamp(-0.5, 0.5)
}

pub fn run_nms(grad: &Grad, mag_thresh: f32) -> Vec<EdgeElement> {
    let w = grad.mag.width();
    let h = grad.mag.height();
    if w < 3 || h < 3 {
        return Vec::new();
    }

    let inner_pixels = (w - 2) * (h - 2);
    let mut edges = Vec::with_capacity(inner_pixels / 8 + 1);
    for y in 1..h - 1 {
        let mag_prev = grad.mag.row(y - 1);
        let mag_row = grad.mag.row(y);
        let mag_next = grad.mag.row(y + 1);
        let gx_row = grad.gx.row(y);
        let gy_row = grad.gy.row(y);

        for x in 1..w - 1 {
            let mag = mag_row[x];
            if mag < mag_thresh {
                continue;
            }

            let gx = gx_row[x];
            let gy = gy_row[x];
            let abs_gx = gx.abs();
            let abs_gy = gy.abs();
            let same_sign = (gx >= 0.0 && gy >= 0.0) || (gx <= 0.0 && gy <= 0.0);

            // (neighbor at -step, neighbor at +step, step)
            let (neighbor1, neighbor2, step) = if abs_gx >= abs_gy && abs_gy <= abs_gx * TAN_22_5_DEG
            {
                (mag_row[x - 1], mag_row[x + 1], [1.0, 0.0])
            } else if abs_gx < abs_gy && abs_gx <= abs_gy * TAN_22_5_DEG {
                (mag_prev[x], mag_next[x], [0.0, 1.0])
            } else if same_sign {
                (mag_prev[x - 1], mag_next[x + 1], [1.0, 1.0])
            } else {
                (mag_next[x - 1], mag_prev[x + 1], [1.0, -1.0])
            };

            if mag <= neighbor1 || mag <= neighbor2 {
                continue;
            }

            let t = parabolic_offset(neighbor1, mag, neighbor2);
            edges.push(EdgeElement {
                x: x as u32,
                y: y as u32,
                subpixel: [x as f32 + t * step[0], y as f32 + t * step[1]],
                magnitude: mag,
                gx,
                gy,
            });
        }
    }

    edges
}

/// Store edge elements in a fresh `width × height` contour map.
///
/// Each element becomes an active position at its pixel, carrying the refined
/// location and the tangent perpendicular to its gradient.
pub fn contours_from_edges(
    edges: &[EdgeElement],
    width: usize,
    height: usize,
) -> Result<ContourMap, ContourError> {
    let mut map = ContourMap::new(width, height)?;
    for e in edges {
        let Some((cosine, sine)) = tangent_from_gradient(e.gx, e.gy) else {
            continue;
        };
        map.insert(
            e.x as usize,
            e.y as usize,
            ContourPoint {
                x: e.subpixel[0],
                y: e.subpixel[1],
                cosine,
                sine,
            },
        );
    }
    Ok(map)
}

/// Edge elements with the time spent in each pass.
pub struct NmsEdgesResult {
    pub edges: Vec<EdgeElement>,
    pub gradient_ms: f64,
    pub nms_ms: f64,
}

/// Detect edges with Scharr gradients followed by 4‑direction NMS.
pub fn detect_edges_nms(l: &ImageF32, mag_thresh: f32) -> NmsEdgesResult {
    let gradient_start = Instant::now();
    let grad = image_gradients(l, GradientKernel::Scharr);
    let gradient_ms = gradient_start.elapsed().as_secs_f64() * 1000.0;

    let nms_start = Instant::now();
    let edges = run_nms(&grad, mag_thresh);
    let nms_ms = nms_start.elapsed().as_secs_f64() * 1000.0;
    debug!(
        "detect_edges_nms: {} edges on {}x{} (grad {:.3} ms, nms {:.3} ms)",
        edges.len(),
        l.w,
        l.h,
        gradient_ms,
        nms_ms
    );

    NmsEdgesResult {
        edges,
        gradient_ms,
        nms_ms,
    }
}

/// Detect edges and return them as a contour map of the image's size.
pub fn detect_contours(l: &ImageF32, mag_thresh: f32) -> Result<ContourMap, ContourError> {
    let result = detect_edges_nms(l, mag_thresh);
    contours_from_edges(&result.edges, l.w, l.h)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soft_vertical_edge(w: usize, h: usize, center: f32) -> ImageF32 {
        ImageF32::from_fn(w, h, |x, _| 1.0 / (1.0 + (-(x as f32 - center)).exp()))
    }

    #[test]
    fn parabolic_offset_moves_toward_larger_neighbor() {
        assert_eq!(parabolic_offset(1.0, 2.0, 1.0), 0.0);
        assert!(parabolic_offset(1.5, 2.0, 1.0) < 0.0);
        assert!(parabolic_offset(1.0, 2.0, 1.5) > 0.0);
    }

    #[test]
    fn soft_edge_is_localized_with_subpixel_accuracy() {
        let img = soft_vertical_edge(32, 32, 15.7);
        let result = detect_edges_nms(&img, 1.0);
        assert_eq!(result.edges.len(), 30);
        for e in &result.edges {
            assert_eq!(e.x, 16);
            assert!((e.subpixel[0] - 15.7).abs() < 0.1, "x = {}", e.subpixel[0]);
            assert_eq!(e.subpixel[1], e.y as f32);
        }
    }

    #[test]
    fn flat_image_has_no_edges() {
        let img = ImageF32::new(16, 16);
        assert!(detect_edges_nms(&img, 0.1).edges.is_empty());
    }

    #[test]
    fn contours_carry_edge_tangents() {
        let img = soft_vertical_edge(24, 20, 11.7);
        let map = detect_contours(&img, 1.0).unwrap();
        assert_eq!(map.len(), 18);
        for (m, p) in map.points() {
            assert_eq!(m % 24, 12);
            assert!(p.sine >= 0.0);
            assert!(p.sine > 0.999, "tangent = ({}, {})", p.cosine, p.sine);
        }
    }
}
