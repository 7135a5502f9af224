use lens_contours::image::ImageF32;

fn logistic(t: f32) -> f32 {
    1.0 / (1.0 + (-t).exp())
}

/// Dark-to-bright vertical edge blurred by a logistic profile centered at `center`.
pub fn soft_vertical_edge(width: usize, height: usize, center: f32) -> ImageF32 {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    ImageF32::from_fn(width, height, |x, _| logistic(x as f32 - center))
}

/// Bright axis-aligned square on a dark background with soft borders.
///
/// The square spans `[lo, hi]` on both axes; borders are centered at those
/// coordinates.
#[allow(dead_code)]
pub fn soft_square(width: usize, height: usize, lo: f32, hi: f32) -> ImageF32 {
    assert!(lo < hi, "square bounds must be ordered");
    ImageF32::from_fn(width, height, |x, y| {
        let (x, y) = (x as f32, y as f32);
        logistic(x - lo) * logistic(hi - x) * logistic(y - lo) * logistic(hi - y)
    })
}
