use itertools::{izip, Itertools};

use super::{primal::sub_tet_volume, DualFace, NVec3, Quant};
use crate::{
    error::{BuildError, EntityKind},
    mesh::{Connectivity, PolyMesh},
    Vec3,
};

/// Dual quantities of a single cell, each in the order of the cell's
/// faces, edges and vertices respectively.
pub(super) struct CellDuals {
    pub dedge: Vec<NVec3>,
    pub dface: Vec<DualFace>,
    pub pvol: Vec<f64>,
}

/// Compute the dual edges, dual faces and partial dual volumes of a cell
/// whose center is `xc`.
pub(super) fn compute_cell_duals(
    cell_idx: usize,
    xc: &Vec3,
    mesh: &PolyMesh,
    connect: &Connectivity,
    faces: &[Quant],
    edges: &[Quant],
) -> Result<CellDuals, BuildError> {
    let (cell_faces, signs) = connect.cell_faces(cell_idx);

    let dedge = cell_faces
        .iter()
        .map(|&face_idx| NVec3::from_vector(faces[face_idx].center - xc))
        .collect_vec();

    let dface = connect
        .cell_edges(cell_idx)
        .iter()
        .map(|&edge_idx| {
            let [(f0, _), (f1, _)] = connect.cell_edge_faces(cell_idx, edge_idx)?;
            let edge = &edges[edge_idx];
            let sface = [f0, f1].map(|face_idx| {
                let tri = 0.5 * (faces[face_idx].center - xc).cross(&(edge.center - xc));
                if tri.dot(&edge.unitv) < 0.0 {
                    NVec3::from_vector(-tri)
                } else {
                    NVec3::from_vector(tri)
                }
            });
            Ok(DualFace::new([f0, f1], sface))
        })
        .collect::<Result<Vec<_>, BuildError>>()?;

    // each sub-tetrahedron (xc, xf, va, vb) is cut in two at the midpoint of (va, vb),
    // giving half of its volume to both vertices
    let vertices = mesh.vertices();
    let cell_verts = connect.cell_vertices(cell_idx);
    let local_idx = |vert: usize| {
        cell_verts.binary_search(&vert).map_err(|_| {
            BuildError::topology(
                EntityKind::Vertex,
                vert,
                format!("vertex is missing from the vertices of cell {cell_idx}"),
            )
        })
    };
    let mut pvol = vec![0.0; cell_verts.len()];
    for (&face_idx, &sign) in izip!(cell_faces, signs) {
        let xf = faces[face_idx].center;
        for (&a, &b) in mesh.face_vertices(face_idx).iter().circular_tuple_windows() {
            let half_vol =
                0.5 * f64::from(sign) * sub_tet_volume(xc, &xf, &vertices[a], &vertices[b]);
            pvol[local_idx(a)?] += half_vol;
            pvol[local_idx(b)?] += half_vol;
        }
    }

    Ok(CellDuals { dedge, dface, pvol })
}

/// Sum the partial dual volumes (in `c2v` order) into one volume per vertex.
pub(super) fn accumulate_dual_volumes(connect: &Connectivity, pvol_vc: &[f64]) -> Vec<f64> {
    let mut dual_vol = vec![0.0; connect.n_vertices()];
    for (&vert, &pvol) in izip!(connect.c2v().minor_indices(), pvol_vc) {
        dual_vol[vert] += pvol;
    }
    dual_vol
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mesh::{cartesian_grid, single_tetrahedron, unit_cube},
        quantities::{primal, Degeneracy},
    };
    use approx::relative_eq;

    fn primal_quantities(mesh: &PolyMesh, connect: &Connectivity) -> (Vec<Quant>, Vec<Quant>) {
        let degeneracy = Degeneracy {
            ref_len: mesh.bounds().diagonal(),
            tolerance: 1e-12,
            ignore: false,
        };
        let mut warnings = Vec::new();
        let faces = primal::compute_faces(mesh, connect, &degeneracy, &mut warnings).unwrap();
        let edges = primal::compute_edges(mesh, connect, &degeneracy, &mut warnings).unwrap();
        assert!(warnings.is_empty());
        (faces, edges)
    }

    #[test]
    fn cube_duals_around_center() {
        let mesh = unit_cube();
        let connect = Connectivity::from_mesh(&mesh).unwrap();
        let (faces, edges) = primal_quantities(&mesh, &connect);
        let xc = Vec3::from_element(0.5);
        let duals = compute_cell_duals(0, &xc, &mesh, &connect, &faces, &edges).unwrap();

        assert_eq!(duals.dedge.len(), 6);
        for (dedge, &face_idx) in izip!(&duals.dedge, connect.cell_faces(0).0) {
            assert!(relative_eq!(dedge.meas, 0.5));
            // the center of a cube sees every face straight on
            assert!(relative_eq!(dedge.unitv, faces[face_idx].unitv));
        }

        assert_eq!(duals.dface.len(), 12);
        for (dface, &edge_idx) in izip!(&duals.dface, connect.cell_edges(0)) {
            // two triangles with legs 0.5 and sqrt(2) / 2 at a right angle
            for sface in &dface.sface {
                assert!(relative_eq!(sface.meas, 0.125));
                assert!(relative_eq!(sface.unitv, edges[edge_idx].unitv));
            }
            assert!(relative_eq!(dface.vect, 0.25 * edges[edge_idx].unitv));
            assert!(dface.parent_id[0] < dface.parent_id[1]);
        }

        assert_eq!(duals.pvol.len(), 8);
        for pvol in &duals.pvol {
            assert!(relative_eq!(*pvol, 0.125, epsilon = 1e-15));
        }
    }

    #[test]
    fn dual_faces_follow_edge_orientation() {
        let mesh = unit_cube();
        let connect = Connectivity::from_mesh(&mesh).unwrap();
        let xc = Vec3::from_element(0.5);
        let (faces, edges) = primal_quantities(&mesh, &connect);
        let duals = compute_cell_duals(0, &xc, &mesh, &connect, &faces, &edges).unwrap();

        // reverse edge 0 and every face's traversal sign on it
        let mut e2v = connect.e2v().clone();
        let start = e2v.row_offsets()[0];
        for val in &mut e2v.values_mut()[start..start + 2] {
            *val = -*val;
        }
        let mut f2e = connect.f2e().clone();
        let on_edge = f2e.col_indices().iter().positions(|&e| e == 0).collect_vec();
        for pos in on_edge {
            f2e.values_mut()[pos] *= -1;
        }
        let flipped = Connectivity::from_parts(8, e2v, f2e, connect.c2f().clone()).unwrap();
        assert_eq!(flipped.edge_vertices(0), [1, 0]);

        let (faces, edges) = primal_quantities(&mesh, &flipped);
        let flipped_duals = compute_cell_duals(0, &xc, &mesh, &flipped, &faces, &edges).unwrap();

        assert!(relative_eq!(duals.dface[0].vect, Vec3::new(0.25, 0.0, 0.0)));
        assert!(relative_eq!(flipped_duals.dface[0].vect, Vec3::new(-0.25, 0.0, 0.0)));
        for (dface, flipped_dface) in izip!(&duals.dface, &flipped_duals.dface).skip(1) {
            assert_eq!(dface.vect, flipped_dface.vect);
        }
        assert_eq!(duals.pvol, flipped_duals.pvol);
    }

    #[test]
    fn dual_face_vector_is_sum_of_triangles() {
        let mesh = single_tetrahedron();
        let connect = Connectivity::from_mesh(&mesh).unwrap();
        let (faces, edges) = primal_quantities(&mesh, &connect);
        let xc = Vec3::new(0.2, 0.3, 0.1);
        let duals = compute_cell_duals(0, &xc, &mesh, &connect, &faces, &edges).unwrap();

        for (dface, &edge_idx) in izip!(&duals.dface, connect.cell_edges(0)) {
            assert_eq!(dface.vect, dface.sface[0].vector() + dface.sface[1].vector());
            for sface in &dface.sface {
                assert!(sface.unitv.dot(&edges[edge_idx].unitv) >= 0.0);
            }
            // both parent faces actually contain the edge
            for face_idx in dface.parent_id {
                assert!(connect.face_edges(face_idx).0.contains(&edge_idx));
            }
        }

        // partial volumes add up to the cell volume wherever the center is
        let total: f64 = duals.pvol.iter().sum();
        assert!(relative_eq!(total, 1.0 / 6.0, epsilon = 1e-14));
    }

    #[test]
    fn dual_volumes_accumulate_over_cells() {
        let mesh = cartesian_grid([2, 2, 2], Vec3::from_element(1.0));
        let connect = Connectivity::from_mesh(&mesh).unwrap();
        let (faces, edges) = primal_quantities(&mesh, &connect);

        let mut pvol_vc = Vec::new();
        for cell_idx in 0..connect.n_cells() {
            let verts = connect.cell_vertices(cell_idx);
            let xc = verts.iter().map(|&v| mesh.vertices()[v]).sum::<Vec3>() / 8.0;
            let duals = compute_cell_duals(cell_idx, &xc, &mesh, &connect, &faces, &edges)
                .unwrap();
            pvol_vc.extend(duals.pvol);
        }
        let dual_vol = accumulate_dual_volumes(&connect, &pvol_vc);

        assert_eq!(dual_vol.len(), 27);
        // corner, edge, face and interior vertices touch 1, 2, 4 and 8 cells
        let touching = |i: usize, j: usize, k: usize| {
            [i, j, k].iter().filter(|&&c| c == 1).map(|_| 2).product::<usize>()
        };
        for k in 0..3 {
            for j in 0..3 {
                for i in 0..3 {
                    let expected = 0.125 * touching(i, j, k) as f64;
                    assert!(relative_eq!(dual_vol[i + 3 * (j + 3 * k)], expected, epsilon = 1e-14));
                }
            }
        }
        assert!(relative_eq!(dual_vol.iter().sum::<f64>(), 8.0, epsilon = 1e-13));
    }
}
