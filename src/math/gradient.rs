//! Numerical gradient over non-uniformly spaced samples.
//!
//! Interior points use the second-order central difference for uneven spacing:
//!
//! ```text
//! f'(x_i) ≈ -h2/(h1(h1+h2))·f_{i-1} + (h2-h1)/(h1·h2)·f_i + h1/(h2(h1+h2))·f_{i+1}
//! ```
//!
//! with `h1 = x_i - x_{i-1}` and `h2 = x_{i+1} - x_i`. For uniform spacing this
//! reduces to `(f_{i+1} - f_{i-1}) / 2h`. Both boundary samples use first-order
//! one-sided differences.

use crate::error::GradientError;

/// Derivative of `values` with respect to `coords`, one entry per sample.
pub fn gradient(values: &[f64], coords: &[f64]) -> Result<Vec<f64>, GradientError> {
    if values.len() != coords.len() {
        return Err(GradientError::LengthMismatch {
            values: values.len(),
            coords: coords.len(),
        });
    }
    let n = values.len();
    if n < 2 {
        return Err(GradientError::TooShort(n));
    }
    if let Some(i) = (1..n).find(|&i| coords[i] <= coords[i - 1]) {
        return Err(GradientError::NonIncreasing(i));
    }

    let mut out = Vec::with_capacity(n);
    out.push((values[1] - values[0]) / (coords[1] - coords[0]));

    for i in 1..n - 1 {
        let h1 = coords[i] - coords[i - 1];
        let h2 = coords[i + 1] - coords[i];
        let a = -h2 / (h1 * (h1 + h2));
        let b = (h2 - h1) / (h1 * h2);
        let c = h1 / (h2 * (h1 + h2));
        out.push(a * values[i - 1] + b * values[i] + c * values[i + 1]);
    }

    out.push((values[n - 1] - values[n - 2]) / (coords[n - 1] - coords[n - 2]));
    Ok(out)
}
