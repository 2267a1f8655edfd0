use crate::linalg::Vector;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The discretization has no degrees of freedom or the interpolant of the
  /// constant function vanishes.
  #[error("degenerate discretization: constant null-space vector has zero norm")]
  DegenerateDiscretization,

  #[error("invalid point type `{0}`, expected one of `coords`, `ind`, `native`")]
  InvalidPointType(String),

  #[error("dof index {index} out of range for {ndofs} degrees of freedom")]
  IndexOutOfRange { index: isize, ndofs: usize },

  #[error("cell {cell} out of range for a mesh of {ncells} cells")]
  CellOutOfRange { cell: usize, ncells: usize },

  /// A recognized point type whose raw data cannot be interpreted.
  #[error("invalid value for point type `{point_type}`: {reason}")]
  InvalidPointValue { point_type: String, reason: String },

  #[error("point {0:?} is not contained in any cell of the mesh")]
  PointOutsideDomain(Vec<f64>),

  #[error("dimension mismatch: expected {expected}, found {found}")]
  DimensionMismatch { expected: usize, found: usize },

  /// The iteration did not reach the requested tolerance.
  ///
  /// The last iterate is handed back, since it is often still usable.
  #[error(
    "conjugate gradient did not converge in {niterations} iterations \
     (residual {residual_norm:e} > threshold {threshold:e})"
  )]
  ConvergenceFailure {
    niterations: usize,
    residual_norm: f64,
    threshold: f64,
    approximate: Box<Vector>,
  },

  #[error("sparse factorization failed: {0}")]
  Factorization(String),
}

impl Error {
  /// The partial solution of a failed solve, if any.
  pub fn approximate_solution(&self) -> Option<&Vector> {
    match self {
      Self::ConvergenceFailure { approximate, .. } => Some(approximate),
      _ => None,
    }
  }
}
