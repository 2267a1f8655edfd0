use crate::{
  error::Result,
  linalg::{CsrMatrix, Vector},
  mesh::coordinates::VertexCoords,
  Dim,
};

/// What the Neumann solver needs to know about a discretization.
///
/// A discretization owns a fixed set of degrees of freedom, each of which is
/// associated with a point in space. It can assemble the weak form of $-Delta$
/// with natural boundary conditions and evaluate its basis at points, which
/// is what a point source needs.
pub trait Discretization {
  /// Discretization-native representation of a located point.
  type Point;

  fn ndofs(&self) -> usize;
  fn dim(&self) -> Dim;

  /// Coordinates of every degree of freedom, in dof order.
  fn dof_coords(&self) -> VertexCoords;

  /// Stiffness matrix of $-Delta$ with zero flux boundary conditions.
  fn assemble_stiffness(&self) -> CsrMatrix;

  /// Coefficients of the constant function 1.
  fn constant_function(&self) -> Vector {
    Vector::from_element(self.ndofs(), 1.0)
  }

  /// Resolves spatial coordinates into a native point.
  fn locate(&self, coord: na::DVectorView<f64>) -> Result<Self::Point>;

  /// Adds the delta functional $v |-> magnitude v(p)$, tested against the
  /// basis, to `rhs`.
  ///
  /// Native points may be built by hand, so they are checked here. On error
  /// `rhs` is left untouched.
  fn apply_point_source(&self, point: &Self::Point, magnitude: f64, rhs: &mut Vector)
    -> Result<()>;
}
