//! Smoothed aggregation algebraic multigrid, used as a preconditioner.
//!
//! Aggregation with piecewise constant tentative prolongators reproduces
//! constants exactly on every level, so the kernel of a Neumann operator is
//! carried through the whole hierarchy. The coarsest level is relaxed with
//! Jacobi sweeps instead of being solved directly, since its matrix is
//! singular as well.

use crate::{
  krylov::Preconditioner,
  linalg::{csr_diagonal, jacobi_spectral_bound, CsrMatrix, Vector},
  sparse::SparseMatrix,
};

use tracing::debug;

const UNAGGREGATED: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmgConfig {
  /// Connection $i j$ is strong if $|a_(i j)| >= theta sqrt(a_(i i) a_(j j))$.
  pub strength_threshold: f64,
  /// Jacobi sweeps before and after the coarse grid correction.
  pub smoothing_sweeps: usize,
  /// Jacobi sweeps on the coarsest level.
  pub coarse_sweeps: usize,
  pub max_levels: usize,
  /// Levels with at most this many rows are not coarsened further.
  pub coarse_size: usize,
  /// Apply one damped Jacobi step to the tentative prolongator.
  pub smooth_prolongator: bool,
}

impl Default for AmgConfig {
  fn default() -> Self {
    Self {
      strength_threshold: 0.08,
      smoothing_sweeps: 1,
      coarse_sweeps: 40,
      max_levels: 10,
      coarse_size: 16,
      smooth_prolongator: true,
    }
  }
}

impl AmgConfig {
  pub fn with_strength_threshold(mut self, theta: f64) -> Self {
    self.strength_threshold = theta;
    self
  }
  pub fn with_smoothing_sweeps(mut self, sweeps: usize) -> Self {
    self.smoothing_sweeps = sweeps;
    self
  }
  pub fn with_coarse_sweeps(mut self, sweeps: usize) -> Self {
    self.coarse_sweeps = sweeps;
    self
  }
  pub fn with_max_levels(mut self, max_levels: usize) -> Self {
    self.max_levels = max_levels;
    self
  }
  pub fn with_coarse_size(mut self, coarse_size: usize) -> Self {
    self.coarse_size = coarse_size;
    self
  }
  pub fn with_smooth_prolongator(mut self, smooth: bool) -> Self {
    self.smooth_prolongator = smooth;
    self
  }
}

struct Level {
  op: CsrMatrix,
  inv_diag: Vector,
  /// Jacobi damping, $4/3$ over the Gershgorin bound of $D^(-1) A$.
  omega: f64,
  /// Prolongation from the next coarser level and its transpose.
  transfer: Option<(CsrMatrix, CsrMatrix)>,
}

impl Level {
  fn new(op: CsrMatrix) -> Self {
    let diag = csr_diagonal(&op);
    let bound = jacobi_spectral_bound(&op, &diag);
    let omega = if bound > 0.0 { 4.0 / (3.0 * bound) } else { 1.0 };
    let inv_diag = diag.map(|d| if d > 0.0 { d.recip() } else { 0.0 });
    Self {
      op,
      inv_diag,
      omega,
      transfer: None,
    }
  }

  fn nrows(&self) -> usize {
    self.op.nrows()
  }

  /// $x <- x + omega D^(-1) (b - A x)$, `sweeps` times.
  fn jacobi(&self, x: &mut Vector, rhs: &Vector, sweeps: usize) {
    for _ in 0..sweeps {
      let residual = rhs - &self.op * &*x;
      *x += self.omega * residual.component_mul(&self.inv_diag);
    }
  }
}

/// Multigrid hierarchy applied as one symmetric V-cycle per call.
pub struct AmgPreconditioner {
  levels: Vec<Level>,
  config: AmgConfig,
}

impl AmgPreconditioner {
  pub fn new(op: &CsrMatrix, config: AmgConfig) -> Self {
    let mut levels = vec![Level::new(op.clone())];

    while levels.len() < config.max_levels.max(1) {
      let Some(fine) = levels.last_mut() else {
        break;
      };
      let n = fine.nrows();
      if n <= config.coarse_size {
        break;
      }

      let strong = strong_connections(&fine.op, config.strength_threshold);
      let (aggregates, naggregates) = aggregate(&strong);
      if naggregates <= 1 || naggregates >= n {
        break;
      }

      let prolongation = if config.smooth_prolongator {
        smoothed_prolongator(fine, &aggregates, naggregates)
      } else {
        tentative_prolongator(&aggregates, naggregates)
      };
      let restriction = prolongation.transpose();
      let coarse_op = &restriction * &(&fine.op * &prolongation);

      fine.transfer = Some((prolongation, restriction));
      debug!(level = levels.len(), nrows = naggregates, nnz = coarse_op.nnz(), "amg level");
      levels.push(Level::new(coarse_op));
    }

    let amg = Self { levels, config };
    debug!(
      nlevels = amg.nlevels(),
      operator_complexity = amg.operator_complexity(),
      "amg hierarchy"
    );
    amg
  }

  pub fn config(&self) -> &AmgConfig {
    &self.config
  }
  pub fn nlevels(&self) -> usize {
    self.levels.len()
  }
  pub fn level_sizes(&self) -> Vec<usize> {
    self.levels.iter().map(Level::nrows).collect()
  }
  /// Total number of nonzeros in all levels relative to the finest level.
  pub fn operator_complexity(&self) -> f64 {
    let total: usize = self.levels.iter().map(|l| l.op.nnz()).sum();
    total as f64 / self.levels[0].op.nnz().max(1) as f64
  }

  fn vcycle(&self, ilevel: usize, rhs: &Vector) -> Vector {
    let level = &self.levels[ilevel];
    let mut x = Vector::zeros(level.nrows());

    let Some((prolongation, restriction)) = &level.transfer else {
      level.jacobi(&mut x, rhs, self.config.coarse_sweeps);
      return x;
    };

    level.jacobi(&mut x, rhs, self.config.smoothing_sweeps);
    let residual = rhs - &level.op * &x;
    let coarse_rhs = restriction * &residual;
    let coarse_correction = self.vcycle(ilevel + 1, &coarse_rhs);
    x += prolongation * &coarse_correction;
    level.jacobi(&mut x, rhs, self.config.smoothing_sweeps);
    x
  }
}

impl Preconditioner for AmgPreconditioner {
  fn apply(&self, residual: &Vector) -> Vector {
    self.vcycle(0, residual)
  }
}

/// Strongly connected neighbors of every row.
pub fn strong_connections(op: &CsrMatrix, theta: f64) -> Vec<Vec<usize>> {
  let diag = csr_diagonal(op);
  op.row_iter()
    .enumerate()
    .map(|(i, row)| {
      row
        .col_indices()
        .iter()
        .zip(row.values())
        .filter(|&(&j, &v)| j != i && v != 0.0 && v.abs() >= theta * (diag[i] * diag[j]).abs().sqrt())
        .map(|(&j, _)| j)
        .collect()
    })
    .collect()
}

/// Greedy aggregation in three passes.
///
/// 1. Nodes whose strong neighborhood is still free become the root of an
///    aggregate containing the whole neighborhood.
/// 2. Left over nodes join an aggregate of a strong neighbor.
/// 3. Whatever remains is grouped with its free strong neighbors.
///
/// Returns the aggregate of every node and the number of aggregates.
pub fn aggregate(strong: &[Vec<usize>]) -> (Vec<usize>, usize) {
  let n = strong.len();
  let mut aggregates = vec![UNAGGREGATED; n];
  let mut naggregates = 0;

  for i in 0..n {
    if aggregates[i] != UNAGGREGATED {
      continue;
    }
    if strong[i].iter().all(|&j| aggregates[j] == UNAGGREGATED) {
      aggregates[i] = naggregates;
      for &j in &strong[i] {
        aggregates[j] = naggregates;
      }
      naggregates += 1;
    }
  }

  let roots = aggregates.clone();
  for i in 0..n {
    if aggregates[i] == UNAGGREGATED {
      if let Some(agg) = strong[i].iter().map(|&j| roots[j]).find(|&a| a != UNAGGREGATED) {
        aggregates[i] = agg;
      }
    }
  }

  for i in 0..n {
    if aggregates[i] == UNAGGREGATED {
      aggregates[i] = naggregates;
      for &j in &strong[i] {
        if aggregates[j] == UNAGGREGATED {
          aggregates[j] = naggregates;
        }
      }
      naggregates += 1;
    }
  }

  (aggregates, naggregates)
}

/// Piecewise constant interpolation from aggregates to nodes.
pub fn tentative_prolongator(aggregates: &[usize], naggregates: usize) -> CsrMatrix {
  let triplets = aggregates
    .iter()
    .enumerate()
    .map(|(i, &agg)| (i, agg, 1.0))
    .collect();
  SparseMatrix::new(aggregates.len(), naggregates, triplets).to_nalgebra_csr()
}

/// $P = (I - omega D^(-1) A) T$ with $T$ the tentative prolongator.
fn smoothed_prolongator(level: &Level, aggregates: &[usize], naggregates: usize) -> CsrMatrix {
  let mut prolongation = SparseMatrix::zeros(aggregates.len(), naggregates);
  for (i, row) in level.op.row_iter().enumerate() {
    prolongation.push(i, aggregates[i], 1.0);
    let scale = level.omega * level.inv_diag[i];
    for (&k, &v) in row.col_indices().iter().zip(row.values()) {
      prolongation.push(i, aggregates[k], -scale * v);
    }
  }
  prolongation.to_nalgebra_csr()
}
