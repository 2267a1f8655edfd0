use crate::{
  geometry::SimplexCoords,
  linalg::{Matrix, Vector},
  Dim, VertexIdx,
};

#[derive(Debug, Clone, PartialEq)]
pub struct VertexCoords {
  /// The vertex coordinates in the columns of a matrix.
  matrix: Matrix,
}
impl VertexCoords {
  pub fn new(matrix: Matrix) -> Self {
    Self { matrix }
  }

  pub fn dim(&self) -> Dim {
    self.matrix.nrows()
  }
  pub fn nvertices(&self) -> usize {
    self.matrix.ncols()
  }

  pub fn coord(&self, ivertex: VertexIdx) -> na::DVectorView<f64> {
    self.matrix.column(ivertex)
  }

  pub fn matrix(&self) -> &Matrix {
    &self.matrix
  }

  pub fn coord_simplex(&self, vertices: &[VertexIdx]) -> SimplexCoords {
    let mut vert_coords = Matrix::zeros(self.dim(), vertices.len());
    for (i, &v) in vertices.iter().enumerate() {
      vert_coords.set_column(i, &self.coord(v));
    }
    SimplexCoords::new(vert_coords)
  }

  /// Nodal interpolation of a coordinate function.
  pub fn eval_coord_fn<F>(&self, f: F) -> Vector
  where
    F: FnMut(na::DVectorView<f64>) -> f64,
  {
    Vector::from_iterator(self.nvertices(), self.matrix.column_iter().map(f))
  }
}
