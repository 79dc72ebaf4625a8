//! Convergence Oracle
//!
//! Cross-checks the closed-form and iterative opinion vectors. Disagreement
//! means the model or the solver is wrong, so callers treat it as fatal.

use crate::fp_interface::PeerId;
use thiserror::Error;

/// Decimal places the two solvers must agree to by default
pub const DEFAULT_DECIMAL_PLACES: u32 = 4;

/// Closed-form and iterative results disagree
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "convergence not correct to {decimal_places} decimal places \
     (peer {peer}: closed form {closed_form}, iterative {iterative})"
)]
pub struct ConvergenceMismatch {
    pub decimal_places: u32,
    pub peer: PeerId,
    pub closed_form: f64,
    pub iterative: f64,
}

/// Largest difference tolerated at `decimal_places`
pub fn tolerance(decimal_places: u32) -> f64 {
    1.5 * 10f64.powi(-(decimal_places as i32))
}

/// Element-wise comparison of two opinion vectors
///
/// A length mismatch is reported at the first index missing from the shorter
/// vector, with `NAN` standing in for the absent value.
pub fn verify(
    closed_form: &[f64],
    iterative: &[f64],
    decimal_places: u32,
) -> Result<(), ConvergenceMismatch> {
    let tol = tolerance(decimal_places);

    for (peer, (&c, &i)) in closed_form.iter().zip(iterative).enumerate() {
        // negated so NaN fails too
        if !((c - i).abs() < tol) {
            return Err(ConvergenceMismatch {
                decimal_places,
                peer,
                closed_form: c,
                iterative: i,
            });
        }
    }

    if closed_form.len() != iterative.len() {
        let peer = closed_form.len().min(iterative.len());
        return Err(ConvergenceMismatch {
            decimal_places,
            peer,
            closed_form: closed_form.get(peer).copied().unwrap_or(f64::NAN),
            iterative: iterative.get(peer).copied().unwrap_or(f64::NAN),
        });
    }

    Ok(())
}
