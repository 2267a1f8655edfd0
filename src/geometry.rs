use crate::{
  linalg::{Matrix, Vector},
  Dim,
};

use tracing::warn;

pub fn factorial(num: usize) -> usize {
  (1..=num).product()
}

/// Volume of the reference simplex in `dim` dimensions.
pub fn refsimp_vol(dim: Dim) -> f64 {
  (factorial(dim) as f64).recip()
}

/// A simplex given by the coordinates of its vertices.
#[derive(Debug, Clone)]
pub struct SimplexCoords {
  /// The vertex coordinates in the columns of a matrix.
  vertices: Matrix,
}
impl SimplexCoords {
  pub fn new(vertices: Matrix) -> Self {
    Self { vertices }
  }
  pub fn standard(dim: Dim) -> Self {
    let mut vertices = Matrix::zeros(dim, dim + 1);
    for i in 0..dim {
      vertices[(i, i + 1)] = 1.0;
    }
    Self::new(vertices)
  }

  pub fn nvertices(&self) -> usize {
    self.vertices.ncols()
  }
  pub fn dim_intrinsic(&self) -> Dim {
    self.nvertices() - 1
  }
  pub fn dim_ambient(&self) -> Dim {
    self.vertices.nrows()
  }
  pub fn is_same_dim(&self) -> bool {
    self.dim_intrinsic() == self.dim_ambient()
  }
  pub fn vertices(&self) -> &Matrix {
    &self.vertices
  }
  pub fn base_vertex(&self) -> na::DVectorView<f64> {
    self.vertices.column(0)
  }

  pub fn spanning_vectors(&self) -> Matrix {
    let mut mat = Matrix::zeros(self.dim_ambient(), self.dim_intrinsic());
    let v0 = self.base_vertex();
    for (i, vi) in self.vertices.column_iter().skip(1).enumerate() {
      mat.set_column(i, &(vi - v0));
    }
    mat
  }

  /// Signed volume.
  pub fn det(&self) -> f64 {
    let spanning = self.spanning_vectors();
    let det = if self.is_same_dim() {
      spanning.determinant()
    } else {
      (spanning.transpose() * spanning).determinant().sqrt()
    };
    refsimp_vol(self.dim_intrinsic()) * det
  }
  pub fn vol(&self) -> f64 {
    self.det().abs()
  }
  pub fn is_positively_oriented(&self) -> bool {
    self.det() > 0.0
  }

  pub fn inv_linear_transform(&self) -> Matrix {
    if self.dim_intrinsic() == 0 {
      return Matrix::zeros(0, self.dim_ambient());
    }
    match self.spanning_vectors().pseudo_inverse(1e-12) {
      Ok(inv) => inv,
      Err(msg) => {
        warn!("Cannot invert degenerate simplex: {msg}");
        Matrix::zeros(self.dim_intrinsic(), self.dim_ambient())
      }
    }
  }

  pub fn global2local(&self, global: na::DVectorView<f64>) -> Vector {
    self.inv_linear_transform() * (global - self.base_vertex())
  }
  pub fn global2bary(&self, global: na::DVectorView<f64>) -> Vector {
    local2bary(&self.global2local(global))
  }
  pub fn bary2global(&self, bary: &Vector) -> Vector {
    &self.vertices * bary
  }

  /// Gradients of the barycentric coordinate functions in the rows(!) of a
  /// matrix.
  pub fn difbarys(&self) -> Matrix {
    let difs = self.inv_linear_transform();
    let row_sum = difs.row_sum();
    let mut difs = difs.insert_row(0, 0.0);
    difs.set_row(0, &-row_sum);
    difs
  }

  /// Barycentric coordinates of `global` if it lies inside the simplex,
  /// up to the tolerance `tol` on each coordinate.
  pub fn locate(&self, global: na::DVectorView<f64>, tol: f64) -> Option<Vector> {
    let bary = self.global2bary(global);
    bary.iter().all(|&b| b >= -tol).then_some(bary)
  }
}

pub fn local2bary(local: &Vector) -> Vector {
  let bary0 = 1.0 - local.sum();
  local.clone().insert_row(0, bary0)
}

#[cfg(test)]
mod test {
  use super::{local2bary, SimplexCoords};
  use crate::linalg::{Matrix, Vector};

  use approx::assert_relative_eq;

  fn right_triangle() -> SimplexCoords {
    SimplexCoords::new(Matrix::from_column_slice(2, 3, &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0]))
  }

  #[test]
  fn standard_volumes() {
    assert_relative_eq!(SimplexCoords::standard(1).vol(), 1.0);
    assert_relative_eq!(SimplexCoords::standard(2).vol(), 0.5);
    assert_relative_eq!(SimplexCoords::standard(3).vol(), 1.0 / 6.0);
  }

  #[test]
  fn barycentric_roundtrip() {
    let simp = right_triangle();
    let point = Vector::from_column_slice(&[0.75, 0.25]);
    let bary = simp.global2bary(point.as_view());
    assert_relative_eq!(bary.sum(), 1.0);
    assert_relative_eq!(bary, Vector::from_column_slice(&[0.25, 0.5, 0.25]), epsilon = 1e-14);
    assert_relative_eq!(simp.bary2global(&bary), point, epsilon = 1e-14);
  }

  #[test]
  fn locate_inside_outside() {
    let simp = right_triangle();
    let inside = Vector::from_column_slice(&[0.5, 0.1]);
    let vertex = Vector::from_column_slice(&[1.0, 1.0]);
    let outside = Vector::from_column_slice(&[0.1, 0.5]);
    assert!(simp.locate(inside.as_view(), 1e-10).is_some());
    let bary = simp.locate(vertex.as_view(), 1e-10).unwrap();
    assert_relative_eq!(bary[2], 1.0, epsilon = 1e-14);
    assert!(simp.locate(outside.as_view(), 1e-10).is_none());
  }

  #[test]
  fn difbarys_sum_to_zero() {
    let simp = right_triangle();
    let difs = simp.difbarys();
    assert_eq!(difs.shape(), (3, 2));
    assert_relative_eq!(difs.row_sum().norm(), 0.0, epsilon = 1e-14);
    assert_relative_eq!(local2bary(&Vector::zeros(2))[0], 1.0);
  }
}
