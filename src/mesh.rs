//! Simplicial meshes given by cell-vertex incidence and vertex coordinates.
//!
//! Only the information a piecewise-linear discretization needs is stored:
//! which vertices make up a cell and where the vertices are.

pub mod cartesian;
pub mod coordinates;

use crate::{geometry::SimplexCoords, Dim, VertexIdx};

use coordinates::VertexCoords;
use itertools::Itertools;

pub type CellIdx = usize;

#[derive(Debug, Clone)]
pub struct SimplicialMesh {
  cells: Vec<Vec<VertexIdx>>,
  vertex_coords: VertexCoords,
}

impl SimplicialMesh {
  pub fn new(cells: Vec<Vec<VertexIdx>>, vertex_coords: VertexCoords) -> Self {
    if let Some(first) = cells.first() {
      let nvertices_cell = first.len();
      assert!(
        cells.iter().all(|c| c.len() == nvertices_cell),
        "Inconsistent cell dimension."
      );
      assert!(
        cells.iter().flatten().all(|&v| v < vertex_coords.nvertices()),
        "Cell references unknown vertex."
      );
      assert!(
        cells.iter().all(|c| c.iter().all_unique()),
        "Cell has repeated vertices."
      );
    }
    Self {
      cells,
      vertex_coords,
    }
  }

  pub fn dim_intrinsic(&self) -> Dim {
    self.cells.first().map_or(0, |c| c.len() - 1)
  }
  pub fn dim_ambient(&self) -> Dim {
    self.vertex_coords.dim()
  }
  pub fn nvertices(&self) -> usize {
    self.vertex_coords.nvertices()
  }
  pub fn ncells(&self) -> usize {
    self.cells.len()
  }
  pub fn cells(&self) -> &[Vec<VertexIdx>] {
    &self.cells
  }
  pub fn cell(&self, icell: CellIdx) -> &[VertexIdx] {
    &self.cells[icell]
  }
  pub fn vertex_coords(&self) -> &VertexCoords {
    &self.vertex_coords
  }

  pub fn cell_coords(&self, icell: CellIdx) -> SimplexCoords {
    self.vertex_coords.coord_simplex(&self.cells[icell])
  }
}
