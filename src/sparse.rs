use crate::linalg::{CsrMatrix, Matrix};

/// Sparse matrix in triplet (coordinate) form, used during assembly.
///
/// Duplicate entries are summed on conversion.
#[derive(Default, Debug, Clone)]
pub struct SparseMatrix {
  nrows: usize,
  ncols: usize,
  triplets: Vec<(usize, usize, f64)>,
}

impl SparseMatrix {
  pub fn zeros(nrows: usize, ncols: usize) -> Self {
    Self::new(nrows, ncols, Vec::new())
  }
  pub fn new(nrows: usize, ncols: usize, triplets: Vec<(usize, usize, f64)>) -> Self {
    assert!(
      triplets.iter().all(|&(r, c, _)| r < nrows && c < ncols),
      "Triplet index out of bounds."
    );
    Self {
      nrows,
      ncols,
      triplets,
    }
  }

  pub fn nrows(&self) -> usize {
    self.nrows
  }
  pub fn ncols(&self) -> usize {
    self.ncols
  }
  pub fn triplets(&self) -> &[(usize, usize, f64)] {
    &self.triplets
  }

  pub fn push(&mut self, r: usize, c: usize, v: f64) {
    assert!(r < self.nrows() && c < self.ncols());
    if v != 0.0 {
      self.triplets.push((r, c, v));
    }
  }

  pub fn set_zero<F>(&mut self, predicate: F)
  where
    F: Fn(usize, usize) -> bool,
  {
    self.triplets.retain(|&(r, c, _)| !predicate(r, c));
  }

  pub fn to_nalgebra_coo(&self) -> nas::CooMatrix<f64> {
    let mut coo = nas::CooMatrix::new(self.nrows, self.ncols);
    for &(r, c, v) in &self.triplets {
      coo.push(r, c, v);
    }
    coo
  }

  pub fn to_nalgebra_csr(&self) -> CsrMatrix {
    (&self.to_nalgebra_coo()).into()
  }

  pub fn to_nalgebra_csc(&self) -> nas::CscMatrix<f64> {
    (&self.to_nalgebra_coo()).into()
  }

  pub fn to_nalgebra_dense(&self) -> Matrix {
    (&self.to_nalgebra_coo()).into()
  }

  pub fn transpose(&self) -> SparseMatrix {
    let triplets = self.triplets.iter().map(|&(r, c, v)| (c, r, v)).collect();
    Self::new(self.ncols, self.nrows, triplets)
  }
}

impl From<&CsrMatrix> for SparseMatrix {
  fn from(csr: &CsrMatrix) -> Self {
    let triplets = csr.triplet_iter().map(|(r, c, &v)| (r, c, v)).collect();
    Self::new(csr.nrows(), csr.ncols(), triplets)
  }
}

#[cfg(test)]
mod test {
  use super::SparseMatrix;

  #[test]
  fn duplicates_are_summed() {
    let mut mat = SparseMatrix::zeros(2, 2);
    mat.push(0, 0, 1.0);
    mat.push(0, 0, 2.0);
    mat.push(1, 0, 0.0);
    mat.push(1, 1, -1.0);
    assert_eq!(mat.triplets().len(), 3);

    let dense = mat.to_nalgebra_dense();
    assert_eq!(dense, na::DMatrix::from_row_slice(2, 2, &[3.0, 0.0, 0.0, -1.0]));

    let csr = mat.to_nalgebra_csr();
    assert_eq!(csr.nnz(), 2);
  }

  #[test]
  fn set_zero_by_predicate() {
    let mut mat = SparseMatrix::new(
      3,
      3,
      vec![(0, 0, 1.0), (0, 2, 4.0), (1, 1, 2.0), (2, 0, 4.0), (2, 2, 3.0)],
    );
    mat.set_zero(|r, c| r == 2 || c == 2);
    assert_eq!(mat.triplets(), &[(0, 0, 1.0), (1, 1, 2.0)]);
    assert_eq!(mat.transpose().nrows(), 3);
  }
}
