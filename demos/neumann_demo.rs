extern crate nalgebra as na;

use neumann_poisson::{
  krylov::IterationControl,
  lse::PinnedNeumannSolver,
  mesh::cartesian::CartesianMesh,
  Discretization, LagrangeSpace, NeumannPoissonSolver, PointSource,
};

fn main() -> neumann_poisson::Result<()> {
  tracing_subscriber::fmt::init();

  // Linear elements on a 20x20 grid of the unit square.
  let ncells_axis = 20;
  let space = LagrangeSpace::new(CartesianMesh::new_unit(2, ncells_axis).compute_mesh());
  let solver = NeumannPoissonSolver::build(&space)?;
  println!(
    "ndofs = {}, amg levels = {:?}",
    solver.ndofs(),
    solver.preconditioner().level_sizes()
  );

  let control = IterationControl::point_source().with_monitor(true);

  // The same unit source at the center, given in all three ways.
  let center = na::DVector::from_column_slice(&[0.5, 0.5]);
  let icenter = (ncells_axis / 2) * (ncells_axis + 2);
  let by_coords = solver.solve_point_source(PointSource::Coords(center.clone()), &control)?;
  let by_index = solver.solve_point_source(PointSource::Index(icenter as isize), &control)?;
  let native = space.locate(center.as_view())?;
  let by_native = solver.solve_point_source(PointSource::Native(native), &control)?;
  println!(
    "point source: max = {:.6e} at dof {}, |coords - index| = {:.3e}, |coords - native| = {:.3e}",
    by_coords.max(),
    by_coords.imax(),
    (&by_coords - &by_index).norm(),
    (&by_coords - &by_native).norm(),
  );

  // A point source off the grid lines.
  let offgrid = na::DVector::from_column_slice(&[0.23, 0.71]);
  let sol = solver.solve_point_source(PointSource::Coords(offgrid), &control)?;
  println!("off-grid point source: max at dof {}", sol.imax());

  // Smooth load. Its mean is removed by the solver.
  let load = space.assemble_load(|x| x[0].sin() * x[1].cos());
  let mut sol = solver.solve(&load, &IterationControl::default())?;
  solver.project_null_space(&mut sol);
  println!("smooth load: |u| = {:.6e}", sol.norm());

  // Cross check against a direct solve with the first dof pinned.
  let direct = PinnedNeumannSolver::new(solver.operator(), solver.const_vec().clone(), 0)?;
  let mut reference = direct.solve(&load)?;
  solver.project_null_space(&mut reference);
  println!("difference to direct solve: {:.3e}", (&sol - &reference).norm());

  Ok(())
}
