//! Element matrix and element vector providers for piecewise-linear
//! Lagrangian finite elements on simplicies.

use crate::{
  geometry::SimplexCoords,
  linalg::{Matrix, Vector},
  VertexIdx,
};

pub trait ElmatProvider: Sync {
  fn eval(&self, cell: &SimplexCoords) -> Matrix;
}

impl<F> ElmatProvider for F
where
  F: Fn(&SimplexCoords) -> Matrix + Sync,
{
  fn eval(&self, cell: &SimplexCoords) -> Matrix {
    self(cell)
  }
}

pub trait ElvecProvider: Sync {
  fn eval(&self, cell: &SimplexCoords, cell_vertices: &[VertexIdx]) -> Vector;
}

impl<F> ElvecProvider for F
where
  F: Fn(&SimplexCoords, &[VertexIdx]) -> Vector + Sync,
{
  fn eval(&self, cell: &SimplexCoords, cell_vertices: &[VertexIdx]) -> Vector {
    self(cell, cell_vertices)
  }
}

/// Exact Element Matrix Provider for the negative Laplacian.
///
/// $A = [(grad lambda_j, grad lambda_i)_(L^2(K))]_(i,j)$
pub fn laplacian_elmat(cell: &SimplexCoords) -> Matrix {
  let difbarys = cell.difbarys();
  cell.vol() * &difbarys * difbarys.transpose()
}

/// Exact Element Matrix Provider for mass bilinear form.
pub fn mass_elmat(cell: &SimplexCoords) -> Matrix {
  let ndofs = cell.nvertices();
  let dim = cell.dim_intrinsic();
  let v = cell.vol() / ((dim + 1) * (dim + 2)) as f64;
  let mut elmat = Matrix::from_element(ndofs, ndofs, v);
  elmat.fill_diagonal(2.0 * v);
  elmat
}

/// Approximated Element Matrix Provider for mass bilinear form,
/// obtained through trapezoidal quadrature rule.
pub fn lumped_mass_elmat(cell: &SimplexCoords) -> Matrix {
  let n = cell.nvertices();
  let v = cell.vol() / n as f64;
  Matrix::from_diagonal_element(n, n, v)
}

/// Element Vector Provider for scalar load function.
///
/// Computed using trapezoidal quadrature rule.
/// Exact for constant load.
pub struct LoadElvec {
  dof_data: Vector,
}
impl LoadElvec {
  pub fn new(dof_data: Vector) -> Self {
    Self { dof_data }
  }
}
impl ElvecProvider for LoadElvec {
  fn eval(&self, cell: &SimplexCoords, cell_vertices: &[VertexIdx]) -> Vector {
    let nverts = cell.nvertices();
    cell.vol() / nverts as f64
      * Vector::from_iterator(nverts, cell_vertices.iter().map(|&iv| self.dof_data[iv]))
  }
}

#[cfg(test)]
mod test {
  use super::{laplacian_elmat, lumped_mass_elmat, mass_elmat, LoadElvec, ElvecProvider};
  use crate::{
    geometry::SimplexCoords,
    linalg::{assert_mat_eq, DMatrixExt, Matrix, Vector},
  };

  use approx::assert_relative_eq;

  #[test]
  fn laplacian_refcell_2d() {
    let cell = SimplexCoords::standard(2);
    #[rustfmt::skip]
    let expected = Matrix::from_row_slice(3, 3, &[
       1.0, -0.5, -0.5,
      -0.5,  0.5,  0.0,
      -0.5,  0.0,  0.5,
    ]);
    assert_mat_eq(&laplacian_elmat(&cell), &expected);
  }

  #[test]
  fn laplacian_kernel_is_constants() {
    for dim in 1..=3 {
      let elmat = laplacian_elmat(&SimplexCoords::standard(dim));
      let ones = Vector::from_element(dim + 1, 1.0);
      assert_relative_eq!((&elmat * ones).norm(), 0.0, epsilon = 1e-14);
      assert!(elmat.is_symmetric(1e-14));
    }
  }

  #[test]
  fn mass_sums_to_volume() {
    for dim in 1..=3 {
      let cell = SimplexCoords::standard(dim);
      let vol = cell.vol();
      assert_relative_eq!(mass_elmat(&cell).sum(), vol, epsilon = 1e-14);
      assert_relative_eq!(lumped_mass_elmat(&cell).sum(), vol, epsilon = 1e-14);
      assert!(mass_elmat(&cell).is_spd());
    }
  }

  #[test]
  fn constant_load() {
    let cell = SimplexCoords::standard(2);
    let elvec = LoadElvec::new(Vector::from_element(3, 2.0)).eval(&cell, &[0, 1, 2]);
    assert_relative_eq!(elvec.sum(), 1.0);
  }
}
