use super::{coordinates::VertexCoords, SimplicialMesh};
use crate::{
  geometry::factorial,
  linalg::{Matrix, Vector},
  Dim, VertexIdx,
};

use itertools::Itertools;

/// Digits of `lin_idx` in base `base`, least significant first.
pub fn linear_index2cartesian_index(mut lin_idx: usize, base: usize, dim: Dim) -> Vec<usize> {
  (0..dim)
    .map(|_| {
      let digit = lin_idx % base;
      lin_idx /= base;
      digit
    })
    .collect()
}

/// Inverse of [`linear_index2cartesian_index`].
pub fn cartesian_index2linear_index(cart_idx: &[usize], base: usize) -> usize {
  cart_idx.iter().rev().fold(0, |acc, &digit| acc * base + digit)
}

#[derive(Debug, Clone)]
pub struct Rect {
  min: Vector,
  max: Vector,
}

impl Rect {
  pub fn new_min_max(min: Vector, max: Vector) -> Self {
    assert_eq!(min.len(), max.len(), "Corners of different dimension.");
    assert!(min.iter().zip(max.iter()).all(|(a, b)| a < b), "Empty box.");
    Self { min, max }
  }
  pub fn new_unit_cube(dim: Dim) -> Self {
    let min = Vector::zeros(dim);
    let max = Vector::from_element(dim, 1.0);
    Self { min, max }
  }

  pub fn dim(&self) -> usize {
    self.min.len()
  }
  pub fn min(&self) -> &Vector {
    &self.min
  }
  pub fn max(&self) -> &Vector {
    &self.max
  }
  pub fn side_lengths(&self) -> Vector {
    &self.max - &self.min
  }
}

/// Structured mesh of an axis aligned box.
///
/// Every one of the `ncells_axis^d` boxes is split into $d!$ simplicies,
/// vertices are ordered lexicographically with the first axis running fastest.
#[derive(Debug, Clone)]
pub struct CartesianMesh {
  rect: Rect,
  ncells_axis: usize,
}
impl CartesianMesh {
  pub fn new_min_max(min: Vector, max: Vector, ncells_axis: usize) -> Self {
    let rect = Rect::new_min_max(min, max);
    Self::new(rect, ncells_axis)
  }
  pub fn new_unit(dim: Dim, ncells_axis: usize) -> Self {
    Self::new(Rect::new_unit_cube(dim), ncells_axis)
  }
  fn new(rect: Rect, ncells_axis: usize) -> Self {
    assert!(ncells_axis >= 1, "Need at least one box per axis.");
    Self { rect, ncells_axis }
  }
}
impl CartesianMesh {
  pub fn rect(&self) -> &Rect {
    &self.rect
  }
  pub fn dim(&self) -> usize {
    self.rect.dim()
  }
  pub fn ncells_axis(&self) -> usize {
    self.ncells_axis
  }
  pub fn nvertices_axis(&self) -> usize {
    self.ncells_axis + 1
  }
  pub fn nboxes(&self) -> usize {
    self.ncells_axis.pow(self.dim() as u32)
  }
  pub fn nvertices(&self) -> usize {
    self.nvertices_axis().pow(self.dim() as u32)
  }
  pub fn vertex_cart_idx(&self, ivertex: VertexIdx) -> Vec<usize> {
    linear_index2cartesian_index(ivertex, self.nvertices_axis(), self.dim())
  }
  pub fn vertex_pos(&self, ivertex: VertexIdx) -> Vector {
    let cart_idx = self.vertex_cart_idx(ivertex);
    let side_lengths = self.rect.side_lengths();
    Vector::from_fn(self.dim(), |i, _| {
      self.rect.min()[i] + cart_idx[i] as f64 / self.ncells_axis as f64 * side_lengths[i]
    })
  }
}

impl CartesianMesh {
  pub fn compute_vertex_coords(&self) -> VertexCoords {
    let columns: Vec<_> = (0..self.nvertices()).map(|v| self.vertex_pos(v)).collect();
    VertexCoords::new(Matrix::from_columns(&columns))
  }

  /// Kuhn triangulation: the simplices of a box are the monotone vertex
  /// paths from its lowest to its highest corner, one per axis ordering.
  pub fn compute_mesh(&self) -> SimplicialMesh {
    let coords = self.compute_vertex_coords();
    let dim = self.dim();
    let base = self.nvertices_axis();

    let mut cells = Vec::with_capacity(factorial(dim) * self.nboxes());
    for ibox in 0..self.nboxes() {
      let corner = linear_index2cartesian_index(ibox, self.ncells_axis, dim);
      for axes in (0..dim).permutations(dim) {
        let mut cart = corner.clone();
        let mut cell = Vec::with_capacity(dim + 1);
        cell.push(cartesian_index2linear_index(&cart, base));
        for axis in axes {
          cart[axis] += 1;
          cell.push(cartesian_index2linear_index(&cart, base));
        }

        if dim >= 2 && !coords.coord_simplex(&cell).is_positively_oriented() {
          cell.swap(0, 1);
        }
        cells.push(cell);
      }
    }

    SimplicialMesh::new(cells, coords)
  }
}

#[cfg(test)]
mod test {
  use super::{cartesian_index2linear_index, linear_index2cartesian_index, CartesianMesh};

  use approx::assert_relative_eq;

  #[test]
  fn index_conversion_roundtrip() {
    for lin in 0..27 {
      let cart = linear_index2cartesian_index(lin, 3, 3);
      assert_eq!(cartesian_index2linear_index(&cart, 3), lin);
    }
    assert_eq!(linear_index2cartesian_index(5, 3, 2), vec![2, 1]);
  }

  #[test]
  fn unit_square_mesh() {
    let mesh = CartesianMesh::new_unit(2, 2).compute_mesh();
    #[rustfmt::skip]
    let expected_vertices = na::DMatrix::from_column_slice(2, 9, &[
      0.0, 0.0,
      0.5, 0.0,
      1.0, 0.0,
      0.0, 0.5,
      0.5, 0.5,
      1.0, 0.5,
      0.0, 1.0,
      0.5, 1.0,
      1.0, 1.0,
    ]);
    assert_eq!(*mesh.vertex_coords().matrix(), expected_vertices);
    assert_eq!(mesh.ncells(), 8);

    let mut computed: Vec<Vec<usize>> = mesh
      .cells()
      .iter()
      .map(|c| {
        let mut c = c.clone();
        c.sort_unstable();
        c
      })
      .collect();
    computed.sort();
    let expected = vec![
      vec![0, 1, 4],
      vec![0, 3, 4],
      vec![1, 2, 5],
      vec![1, 4, 5],
      vec![3, 4, 7],
      vec![3, 6, 7],
      vec![4, 5, 8],
      vec![4, 7, 8],
    ];
    assert_eq!(computed, expected);

    for icell in 0..mesh.ncells() {
      let simp = mesh.cell_coords(icell);
      assert!(simp.is_positively_oriented());
      assert_relative_eq!(simp.vol(), 0.125);
    }
  }

  #[test]
  fn unit_cube_mesh() {
    let mesh = CartesianMesh::new_unit(3, 2).compute_mesh();
    assert_eq!(mesh.nvertices(), 27);
    assert_eq!(mesh.ncells(), 48);
    let vol: f64 = (0..mesh.ncells()).map(|i| mesh.cell_coords(i).vol()).sum();
    assert_relative_eq!(vol, 1.0, epsilon = 1e-12);
    assert!((0..mesh.ncells()).all(|i| mesh.cell_coords(i).is_positively_oriented()));
  }
}
