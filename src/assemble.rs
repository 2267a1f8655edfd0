use crate::{
  fe::{ElmatProvider, ElvecProvider},
  linalg::Vector,
  mesh::SimplicialMesh,
  sparse::SparseMatrix,
};

use rayon::prelude::*;

/// Assembly algorithm for the Galerkin Matrix.
///
/// Cells are processed in parallel, the local contributions are summed when
/// converting the triplets into a compressed format.
pub fn assemble_galmat(mesh: &SimplicialMesh, elmat: impl ElmatProvider) -> SparseMatrix {
  let ndofs = mesh.nvertices();

  let triplets: Vec<(usize, usize, f64)> = (0..mesh.ncells())
    .into_par_iter()
    .flat_map_iter(|icell| {
      let cell = mesh.cell(icell);
      let elmat = elmat.eval(&mesh.cell_coords(icell));

      let mut local_triplets = Vec::with_capacity(cell.len() * cell.len());
      for (ilocal, &iglobal) in cell.iter().enumerate() {
        for (jlocal, &jglobal) in cell.iter().enumerate() {
          let val = elmat[(ilocal, jlocal)];
          if val != 0.0 {
            local_triplets.push((iglobal, jglobal, val));
          }
        }
      }
      local_triplets
    })
    .collect();

  SparseMatrix::new(ndofs, ndofs, triplets)
}

/// Assembly algorithm for the Galerkin Vector.
pub fn assemble_galvec(mesh: &SimplicialMesh, elvec: impl ElvecProvider) -> Vector {
  let entries: Vec<(usize, f64)> = (0..mesh.ncells())
    .into_par_iter()
    .flat_map_iter(|icell| {
      let cell = mesh.cell(icell);
      let elvec = elvec.eval(&mesh.cell_coords(icell), cell);
      cell
        .iter()
        .zip(elvec.iter())
        .filter(|&(_, &v)| v != 0.0)
        .map(|(&iglobal, &v)| (iglobal, v))
        .collect::<Vec<_>>()
    })
    .collect();

  let mut galvec = Vector::zeros(mesh.nvertices());
  for (irow, val) in entries {
    galvec[irow] += val;
  }
  galvec
}

#[cfg(test)]
mod test {
  use super::{assemble_galmat, assemble_galvec};
  use crate::{
    fe::{laplacian_elmat, mass_elmat, LoadElvec},
    linalg::{assert_mat_eq, DMatrixExt, Vector},
    mesh::cartesian::CartesianMesh,
  };

  use approx::assert_relative_eq;

  /// Handchecked integer Poisson matrices (graph laplacian) for the boundary of the mesh.
  ///
  /// Unit d-cube mesh, where the dofs in the corner are all on the boundary.
  #[test]
  fn galmat_single_box() {
    let mesh = CartesianMesh::new_unit(1, 1).compute_mesh();
    let galmat = assemble_galmat(&mesh, laplacian_elmat).to_nalgebra_dense();
    #[rustfmt::skip]
    let expected = na::DMatrix::from_row_slice(2, 2, &[
       1.0, -1.0,
      -1.0,  1.0,
    ]);
    assert_mat_eq(&galmat, &expected);

    let mesh = CartesianMesh::new_unit(2, 1).compute_mesh();
    let galmat = assemble_galmat(&mesh, laplacian_elmat).to_nalgebra_dense();
    #[rustfmt::skip]
    let expected = 0.5 * na::DMatrix::from_row_slice(4, 4, &[
       2.0, -1.0, -1.0,  0.0,
      -1.0,  2.0,  0.0, -1.0,
      -1.0,  0.0,  2.0, -1.0,
       0.0, -1.0, -1.0,  2.0,
    ]);
    assert_mat_eq(&galmat, &expected);
  }

  /// Interior rows reproduce the five point stencil.
  #[test]
  fn galmat_interior_stencil() {
    let cartesian = CartesianMesh::new_unit(2, 4);
    let mesh = cartesian.compute_mesh();
    let galmat = assemble_galmat(&mesh, laplacian_elmat).to_nalgebra_dense();
    assert!(galmat.is_symmetric(1e-14));

    let n = cartesian.nvertices_axis();
    let center = 2 + 2 * n;
    assert_relative_eq!(galmat[(center, center)], 4.0, epsilon = 1e-14);
    for neighbor in [center - 1, center + 1, center - n, center + n] {
      assert_relative_eq!(galmat[(center, neighbor)], -1.0, epsilon = 1e-14);
    }
    assert_relative_eq!(galmat.row(center).sum(), 0.0, epsilon = 1e-14);

    let ones = Vector::from_element(mesh.nvertices(), 1.0);
    assert_relative_eq!((&galmat * ones).norm(), 0.0, epsilon = 1e-13);
  }

  #[test]
  fn mass_and_load_integrate_area() {
    let mesh = CartesianMesh::new_unit(2, 5).compute_mesh();
    let mass = assemble_galmat(&mesh, mass_elmat).to_nalgebra_dense();
    assert_relative_eq!(mass.sum(), 1.0, epsilon = 1e-12);

    let load = assemble_galvec(&mesh, LoadElvec::new(Vector::from_element(mesh.nvertices(), 3.0)));
    assert_relative_eq!(load.sum(), 3.0, epsilon = 1e-12);
  }
}
