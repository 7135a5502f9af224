//! Dense subpixel contour map with an active-position index.
use crate::angle::{normalize_tangent_sign, unit_tangent};
use serde::Serialize;
use std::collections::TryReserveError;

/// Errors raised while building or merging contour maps.
#[derive(Debug, Clone, PartialEq)]
pub enum ContourError {
    /// The per-position buffers for a `width × height` map could not be reserved.
    Allocation { width: usize, height: usize },
    /// Two maps with different extents were combined.
    ExtentMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
}

impl std::fmt::Display for ContourError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allocation { width, height } => {
                write!(f, "failed to allocate contour map of {}x{}", width, height)
            }
            Self::ExtentMismatch { expected, got } => write!(
                f,
                "contour map extent mismatch: expected {}x{}, got {}x{}",
                expected.0, expected.1, got.0, got.1
            ),
        }
    }
}

impl std::error::Error for ContourError {}

/// A single contour sample: subpixel location and undirected tangent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ContourPoint {
    pub x: f32,
    pub y: f32,
    pub cosine: f32,
    pub sine: f32,
}

/// Subpixel contour map over a fixed `width × height` grid.
///
/// Every attribute is a dense buffer addressed by `m = row * width + col`.
/// `index` lists the active positions; `clean` and `insert` keep it in sync
/// with the `active` flags. `assign_from` deliberately does not (see its docs).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContourMap {
    width: usize,
    height: usize,
    pub(crate) active: Vec<bool>,
    pub(crate) x: Vec<f32>,
    pub(crate) y: Vec<f32>,
    pub(crate) cosine: Vec<f32>,
    pub(crate) sine: Vec<f32>,
    pub(crate) index: Vec<usize>,
}

fn zeroed<T: Clone>(len: usize, value: T) -> Result<Vec<T>, TryReserveError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)?;
    buf.resize(len, value);
    Ok(buf)
}

impl ContourMap {
    /// Allocate an empty map; every position starts inactive.
    pub fn new(width: usize, height: usize) -> Result<Self, ContourError> {
        let alloc_err = |_| ContourError::Allocation { width, height };
        let len = width
            .checked_mul(height)
            .ok_or(ContourError::Allocation { width, height })?;
        Ok(Self {
            width,
            height,
            active: zeroed(len, false).map_err(alloc_err)?,
            x: zeroed(len, 0.0).map_err(alloc_err)?,
            y: zeroed(len, 0.0).map_err(alloc_err)?,
            cosine: zeroed(len, 0.0).map_err(alloc_err)?,
            sine: zeroed(len, 0.0).map_err(alloc_err)?,
            index: Vec::new(),
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of active contour points listed in the index.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// True while the per-position buffers are held (before `release`).
    pub fn is_allocated(&self) -> bool {
        let len = self.width * self.height;
        len > 0
            && self.active.len() == len
            && self.x.len() == len
            && self.y.len() == len
            && self.cosine.len() == len
            && self.sine.len() == len
    }

    /// Frees all buffers and clears the index. Calling it twice is harmless.
    pub fn release(&mut self) {
        self.active = Vec::new();
        self.x = Vec::new();
        self.y = Vec::new();
        self.cosine = Vec::new();
        self.sine = Vec::new();
        self.index = Vec::new();
    }

    /// Linear position of `(col, row)`, or `None` outside the grid.
    #[inline]
    pub fn position(&self, col: usize, row: usize) -> Option<usize> {
        (col < self.width && row < self.height).then_some(row * self.width + col)
    }

    /// Active positions in iteration order.
    #[inline]
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    #[inline]
    pub fn is_active(&self, m: usize) -> bool {
        self.active.get(m).copied().unwrap_or(false)
    }

    /// The contour sample stored at `m`, if that position is active.
    pub fn point(&self, m: usize) -> Option<ContourPoint> {
        if !self.is_active(m) {
            return None;
        }
        Some(ContourPoint {
            x: self.x[m],
            y: self.y[m],
            cosine: self.cosine[m],
            sine: self.sine[m],
        })
    }

    /// Iterates `(position, point)` over the index.
    pub fn points(&self) -> impl Iterator<Item = (usize, ContourPoint)> + '_ {
        self.index
            .iter()
            .filter_map(move |&m| self.point(m).map(|p| (m, p)))
    }

    /// Store a contour sample at `(col, row)` and mark it active.
    ///
    /// The tangent is scaled to unit length and sign-normalized. Re-inserting
    /// an active position overwrites its sample without duplicating the index
    /// entry. Returns the linear position, or `None` without touching the map
    /// when `(col, row)` lies outside the grid, the tangent is zero or
    /// non-finite, or the map has been released.
    pub fn insert(&mut self, col: usize, row: usize, point: ContourPoint) -> Option<usize> {
        if !self.is_allocated() {
            return None;
        }
        let m = self.position(col, row)?;
        let (cosine, sine) = unit_tangent(point.cosine, point.sine)?;
        self.x[m] = point.x;
        self.y[m] = point.y;
        self.cosine[m] = cosine;
        self.sine[m] = sine;
        if !self.active[m] {
            self.active[m] = true;
            self.index.push(m);
        }
        Some(m)
    }

    /// Sparse overlay of `other`'s active samples onto `self`.
    ///
    /// For each position in `other.index` the sample and active flag are
    /// copied and the tangent is sign-normalized. Positions outside
    /// `other.index` keep their values. `self.index` is left as it was, so
    /// after merging callers that need the two views to agree must call
    /// [`ContourMap::rebuild_index`].
    pub fn assign_from(&mut self, other: &ContourMap) -> Result<(), ContourError> {
        if self.width != other.width || self.height != other.height {
            return Err(ContourError::ExtentMismatch {
                expected: (self.width, self.height),
                got: (other.width, other.height),
            });
        }
        if !self.is_allocated() || !other.is_allocated() {
            return Ok(());
        }
        for &j in &other.index {
            self.x[j] = other.x[j];
            self.y[j] = other.y[j];
            let (cosine, sine) = normalize_tangent_sign(other.cosine[j], other.sine[j]);
            self.cosine[j] = cosine;
            self.sine[j] = sine;
            self.active[j] = other.active[j];
        }
        Ok(())
    }

    /// Rebuilds the index from the active flags in raster order.
    pub fn rebuild_index(&mut self) {
        self.index.clear();
        self.index.extend(
            self.active
                .iter()
                .enumerate()
                .filter_map(|(m, &on)| on.then_some(m)),
        );
    }
}
