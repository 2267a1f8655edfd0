//! Direct solution of the Neumann problem by eliminating one degree of freedom.
//!
//! Fixing the coefficient of a single dof removes the constant kernel, which
//! makes the stiffness matrix positive definite and amenable to a sparse
//! Cholesky factorization. Useful as a reference for the iterative solver on
//! small problems.

use crate::{
  error::{Error, Result},
  linalg::{project_out, CsrMatrix, Vector},
  space::DofIdx,
  sparse::SparseMatrix,
};

use faer::solvers::SpSolver as _;

type SparseMatrixFaer = faer::sparse::SparseColMat<usize, f64>;

pub fn nalgebra2faer(m: nas::CscMatrix<f64>) -> SparseMatrixFaer {
  let nrows = m.nrows();
  let ncols = m.ncols();
  let (col_ptrs, row_indices, values) = m.disassemble();

  let symbolic =
    faer::sparse::SymbolicSparseColMat::new_checked(nrows, ncols, col_ptrs, None, row_indices);
  faer::sparse::SparseColMat::new(symbolic, values)
}

pub struct FaerCholesky {
  raw: faer::sparse::linalg::solvers::Cholesky<usize, f64>,
}
impl FaerCholesky {
  pub fn new(a: nas::CscMatrix<f64>) -> Result<Self> {
    let raw = nalgebra2faer(a)
      .sp_cholesky(faer::Side::Upper)
      .map_err(|err| Error::Factorization(format!("{err:?}")))?;
    Ok(Self { raw })
  }

  pub fn solve(&self, b: &Vector) -> Vector {
    let b = faer::col::from_slice(b.as_slice());
    Vector::from_vec(self.raw.solve(b).as_slice().to_vec())
  }
}

/// Sets all entries in the rows and columns of `dofs` to zero, puts a one on
/// their diagonal and zeroes the corresponding right-hand side entries.
pub fn fix_dofs_zero(dofs: &[DofIdx], galmat: &mut SparseMatrix, galvec: &mut Vector) {
  let mut dof_flags = vec![false; galmat.nrows()];
  dofs.iter().for_each(|&i| dof_flags[i] = true);
  galmat.set_zero(|i, j| dof_flags[i] || dof_flags[j]);
  for &idof in dofs {
    galmat.push(idof, idof, 1.0);
    galvec[idof] = 0.0;
  }
}

/// Neumann solver based on a Cholesky factorization of the stiffness matrix
/// with one pinned dof.
///
/// Solutions vanish at the pinned dof.
pub struct PinnedNeumannSolver {
  cholesky: FaerCholesky,
  stiffness: SparseMatrix,
  pinned: DofIdx,
  const_vec: Vector,
}

impl PinnedNeumannSolver {
  pub fn new(stiffness: &CsrMatrix, const_vec: Vector, pinned: DofIdx) -> Result<Self> {
    let ndofs = stiffness.nrows();
    if pinned >= ndofs {
      return Err(Error::IndexOutOfRange {
        index: pinned as isize,
        ndofs,
      });
    }
    if const_vec.len() != ndofs {
      return Err(Error::DimensionMismatch {
        expected: ndofs,
        found: const_vec.len(),
      });
    }

    let stiffness = SparseMatrix::from(stiffness);
    let mut galmat = stiffness.clone();
    fix_dofs_zero(&[pinned], &mut galmat, &mut Vector::zeros(ndofs));
    let cholesky = FaerCholesky::new(galmat.to_nalgebra_csc())?;

    Ok(Self {
      cholesky,
      stiffness,
      pinned,
      const_vec,
    })
  }

  pub fn pinned(&self) -> DofIdx {
    self.pinned
  }

  /// Solves for the projection of `rhs` onto the range of the stiffness
  /// matrix.
  pub fn solve(&self, rhs: &Vector) -> Result<Vector> {
    let ndofs = self.stiffness.nrows();
    if rhs.len() != ndofs {
      return Err(Error::DimensionMismatch {
        expected: ndofs,
        found: rhs.len(),
      });
    }
    let mut rhs = rhs.clone();
    project_out(&mut rhs, &self.const_vec);
    rhs[self.pinned] = 0.0;
    Ok(self.cholesky.solve(&rhs))
  }
}
