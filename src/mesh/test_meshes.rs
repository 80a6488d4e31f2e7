//! These are public for visibility in doctests and integration tests,
//! which frequently need an instance of a mesh.
//! They are not meant to be used by users and thus hidden from docs.

use super::{FaceCells, PolyMesh};
use crate::Vec3;

/// The unit cube `[0, 1]^3` as a single hexahedral cell.
///
/// Vertices are numbered bottom (z = 0) then top (z = 1),
/// counterclockwise starting from the origin:
///
/// ```text
///      7_______6
///     /|      /|
///    4_______5 |
///    | 3_____|_2
///    |/      |/
///    0_______1
/// ```
#[doc(hidden)]
pub fn unit_cube() -> PolyMesh {
    PolyMesh::new(
        cube_vertices(),
        cube_faces(),
        vec![FaceCells::boundary(0); 6],
        1,
    )
}

fn cube_vertices() -> Vec<Vec3> {
    vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(1.0, 0.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(0.0, 1.0, 1.0),
    ]
}

fn cube_faces() -> Vec<Vec<usize>> {
    // all rings counterclockwise when seen from outside the cube
    vec![
        vec![0, 3, 2, 1], // z = 0
        vec![4, 5, 6, 7], // z = 1
        vec![0, 1, 5, 4], // y = 0
        vec![3, 7, 6, 2], // y = 1
        vec![0, 4, 7, 3], // x = 0
        vec![1, 2, 6, 5], // x = 1
    ]
}

/// The unit cube with an extra vertex in the middle of the edge between
/// vertices 0 and 1, closed off with a zero-area triangular face `[1, 0, 8]`.
///
/// The bottom face goes around the extra vertex
/// while the `y = 0` face uses the straight edge 0-1,
/// and the sliver face fills the gap in between.
/// The cell is still closed and has unit volume.
#[doc(hidden)]
pub fn sliver_cube() -> PolyMesh {
    let mut vertices = cube_vertices();
    vertices.push(Vec3::new(0.5, 0.0, 0.0));
    let mut faces = cube_faces();
    faces[0] = vec![0, 3, 2, 1, 8];
    faces.push(vec![1, 0, 8]);
    PolyMesh::new(vertices, faces, vec![FaceCells::boundary(0); 7], 1)
}

/// A single tetrahedron with vertices at the origin and the unit axis points.
#[doc(hidden)]
pub fn single_tetrahedron() -> PolyMesh {
    let vertices = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
    ];
    let faces = vec![
        vec![0, 2, 1], // z = 0
        vec![0, 1, 3], // y = 0
        vec![0, 3, 2], // x = 0
        vec![1, 2, 3], // slanted
    ];
    PolyMesh::new(vertices, faces, vec![FaceCells::boundary(0); 4], 1)
}

/// A box of `n[0] x n[1] x n[2]` hexahedral cells with the given cell size,
/// with its minimum corner at the origin.
///
/// Faces are generated in blocks of constant normal direction (x, then y, then z),
/// interior faces pointing in the positive axis direction.
#[doc(hidden)]
pub fn cartesian_grid(n: [usize; 3], spacing: Vec3) -> PolyMesh {
    let [nx, ny, nz] = n;
    let vert_idx = |i: usize, j: usize, k: usize| i + (nx + 1) * (j + (ny + 1) * k);
    let cell_idx = |i: usize, j: usize, k: usize| i + nx * (j + ny * k);

    let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
    for k in 0..=nz {
        for j in 0..=ny {
            for i in 0..=nx {
                vertices.push(Vec3::new(
                    i as f64 * spacing.x,
                    j as f64 * spacing.y,
                    k as f64 * spacing.z,
                ));
            }
        }
    }

    let mut faces = Vec::new();
    let mut face_cells = Vec::new();
    // pushes a face whose ring is oriented along +axis,
    // given the cell indices before and after it along that axis
    let mut push_face = |mut ring: Vec<usize>, before: Option<usize>, after: Option<usize>| {
        let adj = match (before, after) {
            (Some(b), Some(a)) => FaceCells::interior(b, a),
            (Some(b), None) => FaceCells::boundary(b),
            (None, Some(a)) => {
                // lower boundary, flip to point out of the mesh
                ring.reverse();
                FaceCells::boundary(a)
            }
            (None, None) => unreachable!("grid faces have at least one cell"),
        };
        faces.push(ring);
        face_cells.push(adj);
    };

    for k in 0..nz {
        for j in 0..ny {
            for i in 0..=nx {
                push_face(
                    vec![
                        vert_idx(i, j, k),
                        vert_idx(i, j + 1, k),
                        vert_idx(i, j + 1, k + 1),
                        vert_idx(i, j, k + 1),
                    ],
                    (i > 0).then(|| cell_idx(i - 1, j, k)),
                    (i < nx).then(|| cell_idx(i, j, k)),
                );
            }
        }
    }
    for k in 0..nz {
        for j in 0..=ny {
            for i in 0..nx {
                push_face(
                    vec![
                        vert_idx(i, j, k),
                        vert_idx(i, j, k + 1),
                        vert_idx(i + 1, j, k + 1),
                        vert_idx(i + 1, j, k),
                    ],
                    (j > 0).then(|| cell_idx(i, j - 1, k)),
                    (j < ny).then(|| cell_idx(i, j, k)),
                );
            }
        }
    }
    for k in 0..=nz {
        for j in 0..ny {
            for i in 0..nx {
                push_face(
                    vec![
                        vert_idx(i, j, k),
                        vert_idx(i + 1, j, k),
                        vert_idx(i + 1, j + 1, k),
                        vert_idx(i, j + 1, k),
                    ],
                    (k > 0).then(|| cell_idx(i, j, k - 1)),
                    (k < nz).then(|| cell_idx(i, j, k)),
                );
            }
        }
    }

    PolyMesh::new(vertices, faces, face_cells, nx * ny * nz)
}

/// A [`cartesian_grid`] whose interior vertices are displaced
/// by `offset(vertex_index)`.
///
/// Boundary vertices stay in place, so the grid keeps its bounding box
/// and total volume.
#[doc(hidden)]
pub fn jittered_grid(n: [usize; 3], spacing: Vec3, offset: impl Fn(usize) -> Vec3) -> PolyMesh {
    let grid = cartesian_grid(n, spacing);
    let [nx, ny, nz] = n;
    let is_interior = |vert: usize| {
        let i = vert % (nx + 1);
        let j = (vert / (nx + 1)) % (ny + 1);
        let k = vert / ((nx + 1) * (ny + 1));
        (1..nx).contains(&i) && (1..ny).contains(&j) && (1..nz).contains(&k)
    };
    let vertices = grid
        .vertices()
        .iter()
        .enumerate()
        .map(|(vert, x)| if is_interior(vert) { x + offset(vert) } else { *x })
        .collect();

    PolyMesh::new(
        vertices,
        grid.faces().map(<[usize]>::to_vec).collect(),
        grid.face_cells().to_vec(),
        grid.n_cells(),
    )
}
