//! Newton-Raphson root finder for the power-balance equation.
//!
//! The residual functions solved here are smooth but have no convenient
//! closed-form derivative once wind enters the drag term, so the derivative
//! is estimated numerically with a symmetric difference quotient.

/// Derivative magnitudes below this are treated as degenerate.
const DERIVATIVE_FLOOR: f64 = 1e-10;

/// Solver parameters.
///
/// Bounds are applied to each iterate; the defaults cover the full range of
/// plausible ground speeds in m/s.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Convergence tolerance on the residual magnitude
    pub tolerance: f64,
    /// Iteration cap
    pub max_iterations: u32,
    /// Step used for the symmetric difference quotient
    pub derivative_step: f64,
    /// Lower clamp for each iterate
    pub lower_bound: f64,
    /// Upper clamp for each iterate
    pub upper_bound: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.05,
            max_iterations: 50,
            derivative_step: 1e-3,
            lower_bound: 0.0,
            upper_bound: 50.0,
        }
    }
}

/// Result of a solver run.
///
/// A failed run carries `value: 0.0` — callers treat zero as the
/// "could not resolve" signal, so the flag is the only way to tell a
/// genuine zero root apart from non-convergence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOutcome {
    /// The solved scalar, or `0.0` when the solver failed
    pub value: f64,
    /// Whether the residual dropped below tolerance
    pub converged: bool,
}

impl SolverOutcome {
    /// The fail-soft outcome: zero value, not converged.
    pub fn failed() -> Self {
        Self {
            value: 0.0,
            converged: false,
        }
    }
}

/// Find a root of `f` near `initial_guess`.
///
/// Each iteration estimates `f'(x) ≈ (f(x+h) - f(x-h)) / 2h`, takes the
/// Newton step, clamps it to the configured bounds, and stops once
/// `|f(x)| < tolerance`. A degenerate derivative or an exhausted iteration
/// cap returns [`SolverOutcome::failed`] rather than an error; the zero
/// value is a documented contract, not an accident.
pub fn newton<F: Fn(f64) -> f64>(f: F, initial_guess: f64, config: &SolverConfig) -> SolverOutcome {
    let mut x = initial_guess;

    for _ in 0..config.max_iterations {
        let fx = f(x);
        let h = config.derivative_step;
        let dfx = (f(x + h) - f(x - h)) / (2.0 * h);

        if !dfx.is_finite() || dfx.abs() < DERIVATIVE_FLOOR {
            return SolverOutcome::failed();
        }

        let next = (x - fx / dfx).clamp(config.lower_bound, config.upper_bound);

        if f(next).abs() < config.tolerance {
            return SolverOutcome {
                value: next,
                converged: true,
            };
        }

        x = next;
    }

    tracing::trace!(
        "newton: no convergence after {} iterations",
        config.max_iterations
    );
    SolverOutcome::failed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solves_square_root() {
        let config = SolverConfig {
            tolerance: 1e-6,
            ..Default::default()
        };
        let outcome = newton(|x| x * x - 2.0, 1.0, &config);
        assert!(outcome.converged);
        assert!((outcome.value - 2.0_f64.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn test_flat_residual_fails_soft() {
        // Constant residual has a zero derivative everywhere; the contract
        // is a zero value, never a panic or NaN.
        let outcome = newton(|_| 0.0, 0.5, &SolverConfig::default());
        assert_eq!(outcome.value, 0.0);
        assert!(!outcome.converged);
    }

    #[test]
    fn test_iteration_cap_fails_soft() {
        let config = SolverConfig {
            tolerance: 1e-12,
            max_iterations: 2,
            lower_bound: 10.0,
            upper_bound: 11.0,
            ..Default::default()
        };
        // Root at sqrt(2) is outside the iterate bounds, so the residual
        // can never drop below tolerance.
        let outcome = newton(|x| x * x - 2.0, 10.5, &config);
        assert_eq!(outcome.value, 0.0);
        assert!(!outcome.converged);
    }

    #[test]
    fn test_deterministic() {
        let config = SolverConfig::default();
        let a = newton(|x| x * x * x - 8.0, 1.5, &config);
        let b = newton(|x| x * x * x - 8.0, 1.5, &config);
        assert_eq!(a, b);
    }
}
