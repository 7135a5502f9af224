//! Dense linear solves for distortion-model fitting.
//!
//! The fitting loop builds small normal-equation systems (one unknown per
//! distortion coefficient) and needs to know when a system is degenerate so it
//! can retry with other parameters. `gauss_solve` therefore reports a
//! singular column explicitly instead of returning non-finite values.
use log::warn;
use nalgebra::{DMatrix, DVector};

/// Pivots with a magnitude at or below this fraction of the largest entry of
/// the input matrix are treated as zero.
pub const PIVOT_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// No usable pivot exists for `column` after elimination of the previous ones.
    Singular { column: usize },
    /// The matrix is not square or does not match the right-hand side.
    DimensionMismatch {
        rows: usize,
        cols: usize,
        rhs: usize,
    },
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Singular { column } => write!(f, "singular system at column {}", column),
            Self::DimensionMismatch { rows, cols, rhs } => write!(
                f,
                "dimension mismatch: {}x{} matrix with right-hand side of length {}",
                rows, cols, rhs
            ),
        }
    }
}

impl std::error::Error for SolveError {}

/// Solve `a * x = b` in place by Gaussian elimination with partial pivoting.
///
/// On success `b` holds `x`. `a` is overwritten with its reduced upper
/// triangular form either way; copy the system first if it is needed later.
///
/// The singularity test is relative to `max |a_ij|`, so uniformly rescaling
/// the system does not change the outcome.
pub fn gauss_solve(a: &mut DMatrix<f64>, b: &mut DVector<f64>) -> Result<(), SolveError> {
    let n = a.nrows();
    if a.ncols() != n || b.len() != n {
        return Err(SolveError::DimensionMismatch {
            rows: n,
            cols: a.ncols(),
            rhs: b.len(),
        });
    }
    if n == 0 {
        return Ok(());
    }
    let tolerance = PIVOT_TOLERANCE * a.amax();

    for k in 0..n {
        let mut pivot_row = k;
        let mut pivot_abs = a[(k, k)].abs();
        for i in k + 1..n {
            let v = a[(i, k)].abs();
            if v > pivot_abs {
                pivot_abs = v;
                pivot_row = i;
            }
        }
        if pivot_abs.is_nan() || pivot_abs <= tolerance {
            warn!("gauss_solve: no usable pivot in column {k} (|pivot| = {pivot_abs:e})");
            return Err(SolveError::Singular { column: k });
        }
        if pivot_row != k {
            a.swap_rows(k, pivot_row);
            b.swap_rows(k, pivot_row);
        }

        let pivot = a[(k, k)];
        for i in k + 1..n {
            let factor = a[(i, k)] / pivot;
            if factor == 0.0 {
                continue;
            }
            a[(i, k)] = 0.0;
            for j in k + 1..n {
                a[(i, j)] -= factor * a[(k, j)];
            }
            b[i] -= factor * b[k];
        }
    }

    for i in (0..n).rev() {
        let mut acc = b[i];
        for j in i + 1..n {
            acc -= a[(i, j)] * b[j];
        }
        b[i] = acc / a[(i, i)];
    }
    Ok(())
}

/// Non-destructive variant of [`gauss_solve`].
pub fn solve(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>, SolveError> {
    let mut a = a.clone();
    let mut x = b.clone();
    gauss_solve(&mut a, &mut x)?;
    Ok(x)
}
