//! Reusable solver for the pure Neumann Poisson problem.

use crate::{
  amg::{AmgConfig, AmgPreconditioner},
  discretization::Discretization,
  error::{Error, Result},
  krylov::{pcg, IterationControl},
  linalg::{project_out, CsrMatrix, Vector},
  mesh::coordinates::VertexCoords,
};

use std::{fmt, str::FromStr};
use tracing::debug;

/// String tags under which a point source location can be given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointType {
  Coords,
  Index,
  Native,
}

impl FromStr for PointType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "coords" => Ok(Self::Coords),
      "ind" => Ok(Self::Index),
      "native" | "fenics" => Ok(Self::Native),
      other => Err(Error::InvalidPointType(other.to_string())),
    }
  }
}

impl fmt::Display for PointType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let tag = match self {
      Self::Coords => "coords",
      Self::Index => "ind",
      Self::Native => "native",
    };
    f.write_str(tag)
  }
}

/// Location of a unit point source.
#[derive(Debug, Clone, PartialEq)]
pub enum PointSource<P> {
  /// Spatial coordinates, located in the discretization.
  Coords(Vector),
  /// Index into the table of dof coordinates.
  Index(isize),
  /// A point already resolved by the discretization.
  Native(P),
}

impl<P> PointSource<P> {
  /// Builds a point source from a string tag and raw numeric data.
  ///
  /// `"coords"` takes all values as coordinates and `"ind"` expects a single
  /// whole number. Native points have no raw form, so any data given for
  /// them is an [`Error::InvalidPointValue`].
  pub fn from_tagged(tag: &str, raw: &[f64]) -> Result<Self> {
    match tag.parse::<PointType>()? {
      PointType::Coords => Ok(Self::Coords(Vector::from_column_slice(raw))),
      PointType::Index => {
        let &[value] = raw else {
          return Err(Error::DimensionMismatch {
            expected: 1,
            found: raw.len(),
          });
        };
        if value.fract() != 0.0 || !value.is_finite() {
          return Err(Error::InvalidPointValue {
            point_type: tag.to_string(),
            reason: format!("{value} is not a whole number"),
          });
        }
        Ok(Self::Index(value as isize))
      }
      PointType::Native => Err(Error::InvalidPointValue {
        point_type: tag.to_string(),
        reason: "native points have no raw representation".to_string(),
      }),
    }
  }

  pub fn point_type(&self) -> PointType {
    match self {
      Self::Coords(_) => PointType::Coords,
      Self::Index(_) => PointType::Index,
      Self::Native(_) => PointType::Native,
    }
  }
}

/// Solver for $-Delta u = f$ with natural boundary conditions.
///
/// Built once per discretization. The stiffness matrix, the normalized
/// null-space vector and the AMG hierarchy are immutable afterwards, so any
/// number of right-hand sides can be solved through a shared reference.
///
/// Solutions are only defined up to an additive constant. The constant is
/// whatever CG started from zero produces; use
/// [`NeumannPoissonSolver::project_null_space`] to pin it.
pub struct NeumannPoissonSolver<'a, D: Discretization> {
  disc: &'a D,
  dof_coords: VertexCoords,
  operator: CsrMatrix,
  const_vec: Vector,
  precond: AmgPreconditioner,
}

impl<'a, D: Discretization> NeumannPoissonSolver<'a, D> {
  pub fn build(disc: &'a D) -> Result<Self> {
    Self::build_with(disc, AmgConfig::default())
  }

  pub fn build_with(disc: &'a D, amg_config: AmgConfig) -> Result<Self> {
    let ndofs = disc.ndofs();
    if ndofs == 0 {
      return Err(Error::DegenerateDiscretization);
    }

    let dof_coords = disc.dof_coords();
    let operator = disc.assemble_stiffness();

    let mut const_vec = disc.constant_function();
    let norm = const_vec.norm();
    if !(norm > 0.0 && norm.is_finite()) {
      return Err(Error::DegenerateDiscretization);
    }
    const_vec /= norm;

    let precond = AmgPreconditioner::new(&operator, amg_config);
    debug!(
      ndofs,
      nnz = operator.nnz(),
      levels = ?precond.level_sizes(),
      operator_complexity = precond.operator_complexity(),
      "built neumann poisson solver"
    );

    Ok(Self {
      disc,
      dof_coords,
      operator,
      const_vec,
      precond,
    })
  }

  pub fn discretization(&self) -> &D {
    self.disc
  }
  pub fn ndofs(&self) -> usize {
    self.const_vec.len()
  }
  pub fn operator(&self) -> &CsrMatrix {
    &self.operator
  }
  /// Constant function normalized in the Euclidean norm of the coefficients.
  pub fn const_vec(&self) -> &Vector {
    &self.const_vec
  }
  pub fn dof_coords(&self) -> &VertexCoords {
    &self.dof_coords
  }
  pub fn preconditioner(&self) -> &AmgPreconditioner {
    &self.precond
  }

  /// Removes the null-space component from `v` in place.
  pub fn project_null_space(&self, v: &mut Vector) {
    project_out(v, &self.const_vec);
  }

  /// Copy of `b` with its null-space component removed, which makes
  /// $A x = b$ consistent.
  pub fn project_rhs(&self, b: &Vector) -> Result<Vector> {
    if b.len() != self.ndofs() {
      return Err(Error::DimensionMismatch {
        expected: self.ndofs(),
        found: b.len(),
      });
    }
    let mut b = b.clone();
    self.project_null_space(&mut b);
    Ok(b)
  }

  /// Solves $A x = b$ for the projection of `b` onto the range of $A$.
  pub fn solve(&self, b: &Vector, control: &IterationControl) -> Result<Vector> {
    let rhs = self.project_rhs(b)?;
    let outcome = pcg(&self.operator, &self.precond, &rhs, control)?;
    debug!(
      niterations = outcome.niterations,
      residual_norm = outcome.residual_norm,
      "neumann solve"
    );
    Ok(outcome.solution)
  }

  /// Solves for a unit point source at `point`.
  pub fn solve_point_source(
    &self,
    point: PointSource<D::Point>,
    control: &IterationControl,
  ) -> Result<Vector> {
    let point = self.resolve(point)?;
    let mut rhs = Vector::zeros(self.ndofs());
    self.disc.apply_point_source(&point, 1.0, &mut rhs)?;
    self.solve(&rhs, control)
  }

  /// Turns any point source location into the native point.
  pub fn resolve(&self, point: PointSource<D::Point>) -> Result<D::Point> {
    match point {
      PointSource::Coords(coord) => self.disc.locate(coord.as_view()),
      PointSource::Index(index) => {
        let ndofs = self.ndofs();
        let idof = usize::try_from(index)
          .ok()
          .filter(|&i| i < ndofs)
          .ok_or(Error::IndexOutOfRange { index, ndofs })?;
        self.disc.locate(self.dof_coords.coord(idof))
      }
      PointSource::Native(point) => Ok(point),
    }
  }
}
