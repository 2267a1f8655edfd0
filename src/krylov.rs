//! Preconditioned conjugate gradient iteration.

use crate::{
  error::{Error, Result},
  linalg::{CsrMatrix, Vector},
};

use tracing::{debug, info, warn};

/// Stopping criteria of an iterative solve.
///
/// The iteration stops as soon as $norm(r) <= max(atol, rtol norm(b))$ or
/// after `maxiter` steps. A fresh value is passed to every solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationControl {
  pub atol: f64,
  pub rtol: f64,
  pub maxiter: usize,
  /// Log the residual norm of every iteration.
  pub monitor: bool,
}

impl Default for IterationControl {
  fn default() -> Self {
    Self {
      atol: 0.0,
      rtol: 1e-7,
      maxiter: 100,
      monitor: false,
    }
  }
}

impl IterationControl {
  /// Defaults for point source right-hand sides, which need a tighter
  /// relative tolerance.
  pub fn point_source() -> Self {
    Self {
      rtol: 1e-10,
      ..Self::default()
    }
  }

  pub fn with_atol(mut self, atol: f64) -> Self {
    self.atol = atol;
    self
  }
  pub fn with_rtol(mut self, rtol: f64) -> Self {
    self.rtol = rtol;
    self
  }
  pub fn with_maxiter(mut self, maxiter: usize) -> Self {
    self.maxiter = maxiter;
    self
  }
  pub fn with_monitor(mut self, monitor: bool) -> Self {
    self.monitor = monitor;
    self
  }

  pub fn threshold(&self, rhs_norm: f64) -> f64 {
    self.atol.max(self.rtol * rhs_norm)
  }
}

/// Approximate inverse $M^(-1)$ of a symmetric positive (semi)definite operator.
///
/// Must itself be symmetric positive definite for CG to be well defined.
pub trait Preconditioner {
  fn apply(&self, residual: &Vector) -> Vector;
}

pub struct IdentityPreconditioner;
impl Preconditioner for IdentityPreconditioner {
  fn apply(&self, residual: &Vector) -> Vector {
    residual.clone()
  }
}

#[derive(Debug, Clone)]
pub struct CgOutcome {
  pub solution: Vector,
  pub niterations: usize,
  pub residual_norm: f64,
  pub threshold: f64,
}

/// Solves $A x = b$ by preconditioned conjugate gradients starting at $x = 0$.
///
/// `op` may be singular as long as `b` lies in its range.
/// Returns [`Error::ConvergenceFailure`] carrying the last iterate if the
/// tolerance is not met within `control.maxiter` iterations.
pub fn pcg(
  op: &CsrMatrix,
  precond: &impl Preconditioner,
  b: &Vector,
  control: &IterationControl,
) -> Result<CgOutcome> {
  let n = op.nrows();
  if b.len() != n {
    return Err(Error::DimensionMismatch {
      expected: n,
      found: b.len(),
    });
  }

  let mut x = Vector::zeros(n);
  let mut r = b.clone();
  let mut residual_norm = r.norm();
  let threshold = control.threshold(residual_norm);

  if control.monitor {
    info!(iteration = 0, residual_norm, "cg");
  }
  if residual_norm <= threshold {
    return Ok(CgOutcome {
      solution: x,
      niterations: 0,
      residual_norm,
      threshold,
    });
  }

  let mut z = precond.apply(&r);
  let mut p = z.clone();
  let mut rz = r.dot(&z);

  let mut niterations = 0;
  let mut converged = false;
  while niterations < control.maxiter {
    let ap = op * &p;
    let pap = p.dot(&ap);
    if !(pap > 0.0 && pap.is_finite()) {
      warn!(niterations, pap, "cg breakdown: search direction has no positive curvature");
      break;
    }

    let alpha = rz / pap;
    x.axpy(alpha, &p, 1.0);
    r.axpy(-alpha, &ap, 1.0);
    residual_norm = r.norm();
    niterations += 1;

    if control.monitor {
      info!(iteration = niterations, residual_norm, "cg");
    }
    if residual_norm <= threshold {
      converged = true;
      break;
    }

    z = precond.apply(&r);
    let rz_next = r.dot(&z);
    if !(rz_next > 0.0 && rz_next.is_finite()) {
      warn!(niterations, rz_next, "cg breakdown: preconditioner is not positive");
      break;
    }
    let beta = rz_next / rz;
    p.axpy(1.0, &z, beta);
    rz = rz_next;
  }

  if converged {
    debug!(niterations, residual_norm, threshold, "cg converged");
    Ok(CgOutcome {
      solution: x,
      niterations,
      residual_norm,
      threshold,
    })
  } else {
    warn!(niterations, residual_norm, threshold, "cg did not converge");
    Err(Error::ConvergenceFailure {
      niterations,
      residual_norm,
      threshold,
      approximate: Box::new(x),
    })
  }
}

#[cfg(test)]
mod test {
  use super::{pcg, IdentityPreconditioner, IterationControl, Preconditioner};
  use crate::{
    error::Error,
    linalg::{CsrMatrix, Vector},
  };

  use approx::assert_relative_eq;

  struct InverseDiagonal(Vector);
  impl Preconditioner for InverseDiagonal {
    fn apply(&self, residual: &Vector) -> Vector {
      residual.component_mul(&self.0)
    }
  }

  fn spd_tridiag(n: usize) -> CsrMatrix {
    let mut coo = nas::CooMatrix::new(n, n);
    for i in 0..n {
      coo.push(i, i, 2.0 + i as f64);
      if i + 1 < n {
        coo.push(i, i + 1, -1.0);
        coo.push(i + 1, i, -1.0);
      }
    }
    CsrMatrix::from(&coo)
  }

  #[test]
  fn diagonal_system() {
    let mut coo = nas::CooMatrix::new(3, 3);
    coo.push(0, 0, 2.0);
    coo.push(1, 1, 3.0);
    coo.push(2, 2, 4.0);
    let op = CsrMatrix::from(&coo);
    let b = Vector::from_column_slice(&[2.0, 6.0, 12.0]);
    let control = IterationControl::default().with_rtol(1e-12);
    // exact inverse as preconditioner
    let precond = InverseDiagonal(Vector::from_column_slice(&[0.5, 1.0 / 3.0, 0.25]));
    let outcome = pcg(&op, &precond, &b, &control).unwrap();
    assert_eq!(outcome.niterations, 1);
    let expected = Vector::from_column_slice(&[1.0, 2.0, 3.0]);
    assert_relative_eq!(outcome.solution, expected, epsilon = 1e-12);
  }

  #[test]
  fn tridiagonal_residual_below_threshold() {
    let op = spd_tridiag(50);
    let b = Vector::from_fn(50, |i, _| (i as f64).sin());
    let control = IterationControl::default().with_rtol(1e-10).with_maxiter(500);
    let outcome = pcg(&op, &IdentityPreconditioner, &b, &control).unwrap();
    let residual = (&b - &op * &outcome.solution).norm();
    assert!(outcome.residual_norm <= outcome.threshold);
    assert!(residual <= 2e-10 * b.norm());
  }

  #[test]
  fn zero_rhs_returns_zero() {
    let op = spd_tridiag(5);
    let control = IterationControl::default();
    let outcome = pcg(&op, &IdentityPreconditioner, &Vector::zeros(5), &control).unwrap();
    assert_eq!(outcome.niterations, 0);
    assert_eq!(outcome.solution, Vector::zeros(5));
  }

  #[test]
  fn iteration_cap_reports_failure() {
    let op = spd_tridiag(40);
    let b = Vector::from_element(40, 1.0);
    let control = IterationControl::default().with_rtol(1e-14).with_maxiter(2);
    let err = pcg(&op, &IdentityPreconditioner, &b, &control).unwrap_err();
    match err {
      Error::ConvergenceFailure {
        niterations,
        ref approximate,
        ..
      } => {
        assert_eq!(niterations, 2);
        assert_eq!(approximate.len(), 40);
        assert!(err.approximate_solution().is_some());
      }
      other => panic!("unexpected error {other}"),
    }
  }

  #[test]
  fn wrong_length_is_rejected() {
    let op = spd_tridiag(4);
    let err = pcg(&op, &IdentityPreconditioner, &Vector::zeros(3), &IterationControl::default());
    assert!(matches!(err, Err(Error::DimensionMismatch { expected: 4, found: 3 })));
  }
}
