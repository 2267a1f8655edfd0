//! Null-space aware solver for the pure Neumann Poisson problem.
//!
//! The stiffness matrix of $-Delta$ with natural boundary conditions is only
//! semidefinite: constants lie in its kernel. [`solver::NeumannPoissonSolver`]
//! projects every right-hand side onto the range of the operator and runs an
//! AMG preconditioned conjugate gradient iteration against it.

extern crate nalgebra as na;
extern crate nalgebra_sparse as nas;

pub mod amg;
pub mod assemble;
pub mod discretization;
pub mod error;
pub mod fe;
pub mod geometry;
pub mod krylov;
pub mod linalg;
pub mod lse;
pub mod mesh;
pub mod solver;
pub mod space;
pub mod sparse;

pub use amg::AmgConfig;
pub use discretization::Discretization;
pub use error::{Error, Result};
pub use krylov::IterationControl;
pub use mesh::cartesian::CartesianMesh;
pub use solver::{NeumannPoissonSolver, PointSource, PointType};
pub use space::LagrangeSpace;

pub type Dim = usize;
pub type VertexIdx = usize;
