pub type Vector = na::DVector<f64>;
pub type Matrix = na::DMatrix<f64>;
pub type CsrMatrix = nas::CsrMatrix<f64>;

#[cfg(test)]
pub trait DMatrixExt {
  fn is_spd(&self) -> bool;
  fn is_symmetric(&self, eps: f64) -> bool;
}
#[cfg(test)]
impl DMatrixExt for Matrix {
  fn is_spd(&self) -> bool {
    self.is_square() && self.is_symmetric(1e-12) && na::Cholesky::new(self.clone()).is_some()
  }
  fn is_symmetric(&self, eps: f64) -> bool {
    self.is_square() && (self - self.transpose()).amax() <= eps
  }
}

/// Diagonal entries of a sparse matrix. Missing entries are zero.
pub fn csr_diagonal(mat: &CsrMatrix) -> Vector {
  let mut diag = Vector::zeros(mat.nrows());
  for (irow, row) in mat.row_iter().enumerate() {
    for (&icol, &v) in row.col_indices().iter().zip(row.values()) {
      if icol == irow {
        diag[irow] += v;
      }
    }
  }
  diag
}

/// Row-sum of absolute values divided by the diagonal.
///
/// Upper bound (Gershgorin) for the spectral radius of $D^(-1) A$.
pub fn jacobi_spectral_bound(mat: &CsrMatrix, diag: &Vector) -> f64 {
  mat
    .row_iter()
    .enumerate()
    .filter(|&(irow, _)| diag[irow] > 0.0)
    .map(|(irow, row)| row.values().iter().map(|v| v.abs()).sum::<f64>() / diag[irow])
    .fold(0.0, f64::max)
}

/// Removes the component along `unit` from `v`, i.e. $v - inner(v, n) n$.
///
/// `unit` must have norm one.
pub fn project_out(v: &mut Vector, unit: &Vector) {
  let coeff = v.dot(unit);
  v.axpy(-coeff, unit, 1.0);
}

#[cfg(test)]
pub fn assert_mat_eq(a: &Matrix, b: &Matrix) {
  const TOL: f64 = 10e-12;
  let diff = a - b;
  let error = diff.norm();
  let equal = error <= TOL;
  if !equal {
    println!("Matrix a={a:.3}");
    println!("Matrix b={b:.3}");
    println!("a-b={diff:.3}");
    panic!("Matrices not equal.");
  }
}

#[cfg(test)]
mod test {
  use super::{csr_diagonal, jacobi_spectral_bound, project_out, CsrMatrix, Vector};

  use approx::assert_relative_eq;

  fn path_laplacian() -> CsrMatrix {
    let mut coo = nas::CooMatrix::new(3, 3);
    for (r, c, v) in [
      (0, 0, 1.0),
      (0, 1, -1.0),
      (1, 0, -1.0),
      (1, 1, 2.0),
      (1, 2, -1.0),
      (2, 1, -1.0),
      (2, 2, 1.0),
    ] {
      coo.push(r, c, v);
    }
    CsrMatrix::from(&coo)
  }

  #[test]
  fn diagonal_and_gershgorin() {
    let mat = path_laplacian();
    let diag = csr_diagonal(&mat);
    assert_eq!(diag, Vector::from_column_slice(&[1.0, 2.0, 1.0]));
    assert_relative_eq!(jacobi_spectral_bound(&mat, &diag), 2.0);
  }

  #[test]
  fn projection_removes_component() {
    let unit = Vector::from_element(4, 0.5);
    let mut v = Vector::from_column_slice(&[1.0, 2.0, 3.0, 4.0]);
    project_out(&mut v, &unit);
    assert_relative_eq!(v.dot(&unit), 0.0, epsilon = 1e-14);
    assert_relative_eq!(v, Vector::from_column_slice(&[-1.5, -0.5, 0.5, 1.5]));
  }
}
