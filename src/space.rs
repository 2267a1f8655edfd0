use crate::{
  assemble,
  discretization::Discretization,
  error::{Error, Result},
  fe::{self, LoadElvec},
  linalg::{CsrMatrix, Vector},
  mesh::{coordinates::VertexCoords, CellIdx, SimplicialMesh},
  Dim,
};

pub type DofIdx = usize;

/// Tolerance on barycentric coordinates when locating points, so that points
/// on faces and vertices are found despite round-off.
const LOCATE_TOL: f64 = 1e-10;

/// A point resolved to the cell containing it.
#[derive(Debug, Clone, PartialEq)]
pub struct CellPoint {
  pub cell: CellIdx,
  /// Barycentric coordinates with respect to the cell vertices.
  pub barys: Vector,
}

/// Finite Element Space of continuous piecewise-linear functions.
///
/// Dofs coincide with mesh vertices.
#[derive(Debug, Clone)]
pub struct LagrangeSpace {
  mesh: SimplicialMesh,
}

impl LagrangeSpace {
  pub fn new(mesh: SimplicialMesh) -> Self {
    Self { mesh }
  }

  pub fn mesh(&self) -> &SimplicialMesh {
    &self.mesh
  }

  pub fn assemble_mass(&self) -> CsrMatrix {
    assemble::assemble_galmat(&self.mesh, fe::mass_elmat).to_nalgebra_csr()
  }

  /// Interpolates `f` on the dofs.
  pub fn interpolate<F>(&self, f: F) -> Vector
  where
    F: FnMut(na::DVectorView<f64>) -> f64,
  {
    self.mesh.vertex_coords().eval_coord_fn(f)
  }

  /// Galerkin vector $[integral f phi_i]_i$ of a source term, with f replaced
  /// by its interpolant.
  pub fn assemble_load<F>(&self, f: F) -> Vector
  where
    F: FnMut(na::DVectorView<f64>) -> f64,
  {
    self.assemble_mass() * self.interpolate(f)
  }

  /// Galerkin vector using trapezoidal quadrature.
  pub fn assemble_lumped_load<F>(&self, f: F) -> Vector
  where
    F: FnMut(na::DVectorView<f64>) -> f64,
  {
    assemble::assemble_galvec(&self.mesh, LoadElvec::new(self.interpolate(f)))
  }

  /// Value of the FE function with coefficients `coeffs` at `point`.
  pub fn evaluate(&self, coeffs: &Vector, point: &CellPoint) -> f64 {
    self
      .mesh
      .cell(point.cell)
      .iter()
      .zip(point.barys.iter())
      .map(|(&idof, &bary)| bary * coeffs[idof])
      .sum()
  }
}

impl Discretization for LagrangeSpace {
  type Point = CellPoint;

  fn ndofs(&self) -> usize {
    self.mesh.nvertices()
  }
  fn dim(&self) -> Dim {
    self.mesh.dim_ambient()
  }

  fn dof_coords(&self) -> VertexCoords {
    self.mesh.vertex_coords().clone()
  }

  fn assemble_stiffness(&self) -> CsrMatrix {
    assemble::assemble_galmat(&self.mesh, fe::laplacian_elmat).to_nalgebra_csr()
  }

  fn locate(&self, coord: na::DVectorView<f64>) -> Result<CellPoint> {
    if coord.len() != self.dim() {
      return Err(Error::DimensionMismatch {
        expected: self.dim(),
        found: coord.len(),
      });
    }
    (0..self.mesh.ncells())
      .find_map(|icell| {
        self
          .mesh
          .cell_coords(icell)
          .locate(coord, LOCATE_TOL)
          .map(|barys| CellPoint { cell: icell, barys })
      })
      .ok_or_else(|| Error::PointOutsideDomain(coord.iter().copied().collect()))
  }

  fn apply_point_source(
    &self,
    point: &CellPoint,
    magnitude: f64,
    rhs: &mut Vector,
  ) -> Result<()> {
    if point.cell >= self.mesh.ncells() {
      return Err(Error::CellOutOfRange {
        cell: point.cell,
        ncells: self.mesh.ncells(),
      });
    }
    let cell = self.mesh.cell(point.cell);
    if point.barys.len() != cell.len() {
      return Err(Error::DimensionMismatch {
        expected: cell.len(),
        found: point.barys.len(),
      });
    }
    if rhs.len() != self.ndofs() {
      return Err(Error::DimensionMismatch {
        expected: self.ndofs(),
        found: rhs.len(),
      });
    }

    for (&idof, &bary) in cell.iter().zip(point.barys.iter()) {
      rhs[idof] += magnitude * bary;
    }
    Ok(())
  }
}
