use nalgebra_sparse as nas;

use itertools::Itertools;

use super::PolyMesh;
use crate::error::{BuildError, EntityKind};

/// Incidence structure of a polyhedral mesh.
///
/// Signed incidences are stored as CSR matrices with values of -1 or 1,
/// unsigned ones as bare sparsity patterns.
/// Within each row, entries are sorted by column index,
/// so scanning a row visits entities in ascending id order.
#[derive(Clone, Debug)]
pub struct Connectivity {
    n_vertices: usize,
    /// rows are edges, columns vertices.
    /// -1 marks the start vertex of the edge and +1 the end vertex,
    /// which defines the edge orientation
    e2v: nas::CsrMatrix<i8>,
    /// rows are faces, columns edges.
    /// +1 when the face ring traverses the edge along its orientation
    f2e: nas::CsrMatrix<i8>,
    /// rows are cells, columns faces.
    /// +1 when the face normal points out of the cell
    c2f: nas::CsrMatrix<i8>,
    /// edges of each cell
    c2e: nas::pattern::SparsityPattern,
    /// vertices of each cell
    c2v: nas::pattern::SparsityPattern,
    /// whether e2v rows are in lexicographic order of their vertex pairs
    edges_sorted: bool,
}

impl Connectivity {
    /// Build the connectivity of a mesh.
    ///
    /// Edges are numbered in lexicographic order of their sorted vertex pairs
    /// and oriented from the lower to the higher vertex index.
    pub fn from_mesh(mesh: &PolyMesh) -> Result<Self, BuildError> {
        let n_vertices = mesh.n_vertices();
        let n_faces = mesh.n_faces();
        let n_cells = mesh.n_cells();

        if mesh.face_cells().len() != n_faces {
            return Err(BuildError::topology(
                EntityKind::Face,
                mesh.face_cells().len().min(n_faces),
                format!(
                    "{n_faces} faces given but {} face-cell adjacencies",
                    mesh.face_cells().len()
                ),
            ));
        }

        //
        // validate faces and collect edges
        //

        let mut edges: Vec<[usize; 2]> = Vec::new();
        for (face_idx, ring) in mesh.faces().enumerate() {
            if ring.len() < 3 {
                return Err(BuildError::topology(
                    EntityKind::Face,
                    face_idx,
                    format!("face has {} vertices, at least 3 needed", ring.len()),
                ));
            }
            if let Some(&vert) = ring.iter().find(|&&v| v >= n_vertices) {
                return Err(BuildError::topology(
                    EntityKind::Face,
                    face_idx,
                    format!("vertex {vert} out of bounds ({n_vertices} vertices)"),
                ));
            }
            if !ring.iter().all_unique() {
                return Err(BuildError::topology(
                    EntityKind::Face,
                    face_idx,
                    "vertex repeated in face ring",
                ));
            }
            for (&a, &b) in ring.iter().circular_tuple_windows() {
                edges.push(if a < b { [a, b] } else { [b, a] });
            }
        }
        // sorting gives both deduplication
        // and a numbering that doesn't depend on face order
        edges.sort_unstable();
        edges.dedup();

        let mut e2v_offsets = Vec::with_capacity(edges.len() + 1);
        e2v_offsets.push(0);
        let mut e2v_cols = Vec::with_capacity(2 * edges.len());
        let mut e2v_vals = Vec::with_capacity(2 * edges.len());
        for edge in &edges {
            e2v_cols.extend_from_slice(edge);
            e2v_vals.extend_from_slice(&[-1, 1]);
            e2v_offsets.push(e2v_cols.len());
        }
        let e2v = nas::CsrMatrix::try_from_csr_data(
            edges.len(),
            n_vertices,
            e2v_offsets,
            e2v_cols,
            e2v_vals,
        )
        .map_err(|e| BuildError::topology(EntityKind::Edge, 0, e.to_string()))?;

        //
        // face -> edge
        //

        let mut f2e_offsets = Vec::with_capacity(n_faces + 1);
        f2e_offsets.push(0);
        let mut f2e_cols = Vec::with_capacity(edges.len() * 2);
        let mut f2e_vals = Vec::with_capacity(edges.len() * 2);
        // buffer for the edges of the face currently being processed
        let mut face_edges: Vec<(usize, i8)> = Vec::new();
        for (face_idx, ring) in mesh.faces().enumerate() {
            face_edges.clear();
            for (&a, &b) in ring.iter().circular_tuple_windows() {
                let key = if a < b { [a, b] } else { [b, a] };
                let edge_idx = edges
                    .binary_search(&key)
                    .map_err(|_| BuildError::topology(EntityKind::Face, face_idx, "lost edge"))?;
                face_edges.push((edge_idx, if a < b { 1 } else { -1 }));
            }
            face_edges.sort_unstable_by_key(|(e, _)| *e);
            if face_edges.iter().map(|(e, _)| e).tuple_windows().any(|(a, b)| a == b) {
                return Err(BuildError::topology(
                    EntityKind::Face,
                    face_idx,
                    "edge traversed twice by the face ring",
                ));
            }
            for (edge_idx, sign) in &face_edges {
                f2e_cols.push(*edge_idx);
                f2e_vals.push(*sign);
            }
            f2e_offsets.push(f2e_cols.len());
        }
        let f2e = nas::CsrMatrix::try_from_csr_data(
            n_faces,
            edges.len(),
            f2e_offsets,
            f2e_cols,
            f2e_vals,
        )
        .map_err(|e| BuildError::topology(EntityKind::Face, 0, e.to_string()))?;

        //
        // cell -> face
        //

        let mut cell_faces: Vec<Vec<(usize, i8)>> = vec![Vec::new(); n_cells];
        for (face_idx, adj) in mesh.face_cells().iter().enumerate() {
            if adj.inner >= n_cells {
                return Err(BuildError::topology(
                    EntityKind::Face,
                    face_idx,
                    format!("adjacent cell {} out of bounds ({n_cells} cells)", adj.inner),
                ));
            }
            cell_faces[adj.inner].push((face_idx, 1));
            if let Some(outer) = adj.outer {
                if outer >= n_cells {
                    return Err(BuildError::topology(
                        EntityKind::Face,
                        face_idx,
                        format!("adjacent cell {outer} out of bounds ({n_cells} cells)"),
                    ));
                }
                if outer == adj.inner {
                    return Err(BuildError::topology(
                        EntityKind::Face,
                        face_idx,
                        "face has the same cell on both sides",
                    ));
                }
                cell_faces[outer].push((face_idx, -1));
            }
        }
        // faces were pushed in ascending order, so rows are already sorted
        let mut c2f_offsets = Vec::with_capacity(n_cells + 1);
        c2f_offsets.push(0);
        let mut c2f_cols = Vec::new();
        let mut c2f_vals = Vec::new();
        for faces in cell_faces {
            for (face_idx, sign) in faces {
                c2f_cols.push(face_idx);
                c2f_vals.push(sign);
            }
            c2f_offsets.push(c2f_cols.len());
        }
        let c2f =
            nas::CsrMatrix::try_from_csr_data(n_cells, n_faces, c2f_offsets, c2f_cols, c2f_vals)
                .map_err(|e| BuildError::topology(EntityKind::Cell, 0, e.to_string()))?;

        Self::from_parts(n_vertices, e2v, f2e, c2f)
    }

    /// Assemble a connectivity from signed incidence matrices
    /// built by another component.
    ///
    /// The cell-edge and cell-vertex incidences are derived from these,
    /// and every cell is checked to be a closed, consistently oriented polyhedron:
    /// each of its edges must lie on exactly two of its faces,
    /// traversed in opposite directions once the faces are oriented outwards.
    pub fn from_parts(
        n_vertices: usize,
        e2v: nas::CsrMatrix<i8>,
        f2e: nas::CsrMatrix<i8>,
        c2f: nas::CsrMatrix<i8>,
    ) -> Result<Self, BuildError> {
        if e2v.ncols() != n_vertices {
            return Err(BuildError::topology(
                EntityKind::Vertex,
                e2v.ncols().min(n_vertices),
                format!(
                    "edge-vertex incidence has {} columns for {n_vertices} vertices",
                    e2v.ncols()
                ),
            ));
        }
        for (edge_idx, row) in e2v.row_iter().enumerate() {
            let mut vals = row.values().to_vec();
            vals.sort_unstable();
            if vals != [-1, 1] {
                return Err(BuildError::topology(
                    EntityKind::Edge,
                    edge_idx,
                    "edge must have exactly one start and one end vertex",
                ));
            }
        }
        if f2e.ncols() != e2v.nrows() {
            return Err(BuildError::topology(
                EntityKind::Edge,
                f2e.ncols().min(e2v.nrows()),
                format!(
                    "face-edge incidence has {} columns for {} edges",
                    f2e.ncols(),
                    e2v.nrows()
                ),
            ));
        }
        if c2f.ncols() != f2e.nrows() {
            return Err(BuildError::topology(
                EntityKind::Face,
                c2f.ncols().min(f2e.nrows()),
                format!(
                    "cell-face incidence has {} columns for {} faces",
                    c2f.ncols(),
                    f2e.nrows()
                ),
            ));
        }

        let n_cells = c2f.nrows();

        // cell -> edge and cell -> vertex by gathering and deduplicating
        let mut c2e_offsets = Vec::with_capacity(n_cells + 1);
        c2e_offsets.push(0);
        let mut c2e_indices = Vec::new();
        let mut c2v_offsets = Vec::with_capacity(n_cells + 1);
        c2v_offsets.push(0);
        let mut c2v_indices = Vec::new();
        for (cell_idx, row) in c2f.row_iter().enumerate() {
            if row.nnz() < 4 {
                return Err(BuildError::topology(
                    EntityKind::Cell,
                    cell_idx,
                    format!("cell has {} faces, at least 4 needed", row.nnz()),
                ));
            }
            let cell_edges = row
                .col_indices()
                .iter()
                .flat_map(|&f| csr_row(&f2e, f).0.iter().copied())
                .sorted_unstable()
                .dedup()
                .collect_vec();
            let cell_verts = cell_edges
                .iter()
                .flat_map(|&e| csr_row(&e2v, e).0.iter().copied())
                .sorted_unstable()
                .dedup();
            c2e_indices.extend_from_slice(&cell_edges);
            c2e_offsets.push(c2e_indices.len());
            c2v_indices.extend(cell_verts);
            c2v_offsets.push(c2v_indices.len());
        }
        let c2e = nas::pattern::SparsityPattern::try_from_offsets_and_indices(
            n_cells,
            e2v.nrows(),
            c2e_offsets,
            c2e_indices,
        )
        .map_err(|e| BuildError::topology(EntityKind::Cell, 0, e.to_string()))?;
        let c2v = nas::pattern::SparsityPattern::try_from_offsets_and_indices(
            n_cells,
            n_vertices,
            c2v_offsets,
            c2v_indices,
        )
        .map_err(|e| BuildError::topology(EntityKind::Cell, 0, e.to_string()))?;

        let edges_sorted = (1..e2v.nrows()).all(|e| csr_row(&e2v, e - 1).0 < csr_row(&e2v, e).0);

        let connect = Self {
            n_vertices,
            e2v,
            f2e,
            c2f,
            c2e,
            c2v,
            edges_sorted,
        };

        for cell_idx in 0..n_cells {
            for &edge_idx in connect.cell_edges(cell_idx) {
                let [(_, s0), (_, s1)] = connect.cell_edge_faces(cell_idx, edge_idx)?;
                if s0 + s1 != 0 {
                    return Err(BuildError::topology(
                        EntityKind::Cell,
                        cell_idx,
                        format!("faces around edge {edge_idx} are not consistently oriented"),
                    ));
                }
            }
        }

        Ok(connect)
    }

    /// Number of vertices.
    #[inline]
    pub fn n_vertices(&self) -> usize {
        self.n_vertices
    }

    /// Number of edges.
    #[inline]
    pub fn n_edges(&self) -> usize {
        self.e2v.nrows()
    }

    /// Number of faces.
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.f2e.nrows()
    }

    /// Number of cells.
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.c2f.nrows()
    }

    /// Signed edge-vertex incidence.
    #[inline]
    pub fn e2v(&self) -> &nas::CsrMatrix<i8> {
        &self.e2v
    }

    /// Signed face-edge incidence.
    #[inline]
    pub fn f2e(&self) -> &nas::CsrMatrix<i8> {
        &self.f2e
    }

    /// Signed cell-face incidence.
    #[inline]
    pub fn c2f(&self) -> &nas::CsrMatrix<i8> {
        &self.c2f
    }

    /// Cell-edge incidence.
    #[inline]
    pub fn c2e(&self) -> &nas::pattern::SparsityPattern {
        &self.c2e
    }

    /// Cell-vertex incidence.
    #[inline]
    pub fn c2v(&self) -> &nas::pattern::SparsityPattern {
        &self.c2v
    }

    /// Start and end vertex of an edge.
    pub fn edge_vertices(&self, edge: usize) -> [usize; 2] {
        let (cols, vals) = csr_row(&self.e2v, edge);
        if vals[0] < 0 {
            [cols[0], cols[1]]
        } else {
            [cols[1], cols[0]]
        }
    }

    /// Faces of a cell with their orientations relative to it.
    #[inline]
    pub fn cell_faces(&self, cell: usize) -> (&[usize], &[i8]) {
        csr_row(&self.c2f, cell)
    }

    /// Edges of a face with their orientations relative to it.
    #[inline]
    pub fn face_edges(&self, face: usize) -> (&[usize], &[i8]) {
        csr_row(&self.f2e, face)
    }

    /// Edges of a cell in ascending order.
    #[inline]
    pub fn cell_edges(&self, cell: usize) -> &[usize] {
        self.c2e.lane(cell)
    }

    /// Vertices of a cell in ascending order.
    #[inline]
    pub fn cell_vertices(&self, cell: usize) -> &[usize] {
        self.c2v.lane(cell)
    }

    /// Position of the first entry of a cell in the `c2f`, `c2e` and `c2v` scans,
    /// i.e. where per-incidence arrays built on those scans start for the cell.
    #[inline]
    pub(crate) fn cell_offsets(&self, cell: usize) -> [usize; 3] {
        [
            self.c2f.row_offsets()[cell],
            self.c2e.major_offsets()[cell],
            self.c2v.major_offsets()[cell],
        ]
    }

    /// The two faces of a cell sharing an edge,
    /// each with the face-edge orientation multiplied by the cell-face orientation.
    ///
    /// The faces are returned in ascending order.
    pub fn cell_edge_faces(&self, cell: usize, edge: usize) -> Result<[(usize, i8); 2], BuildError> {
        let (faces, face_signs) = self.cell_faces(cell);
        let found = faces
            .iter()
            .zip(face_signs)
            .filter_map(|(&f, &cf_sign)| {
                let (edges, edge_signs) = self.face_edges(f);
                edges
                    .binary_search(&edge)
                    .ok()
                    .map(|pos| (f, cf_sign * edge_signs[pos]))
            })
            .collect_vec();

        match found[..] {
            [f0, f1] => Ok([f0, f1]),
            _ => Err(BuildError::topology(
                EntityKind::Cell,
                cell,
                format!(
                    "edge {edge} lies on {} faces of the cell instead of 2",
                    found.len()
                ),
            )),
        }
    }

    /// Find the edge between two vertices, if there is one.
    ///
    /// Takes O(log n_edges) when edges are numbered in lexicographic order
    /// of their vertex pairs, as [`from_mesh`][Self::from_mesh] numbers them,
    /// and O(n_edges) otherwise.
    pub fn find_edge(&self, v0: usize, v1: usize) -> Option<usize> {
        let key = if v0 < v1 { [v0, v1] } else { [v1, v0] };
        let row_verts = |e: usize| csr_row(&self.e2v, e).0;
        if !self.edges_sorted {
            return (0..self.n_edges()).find(|&e| row_verts(e) == key);
        }

        let (mut lo, mut hi) = (0, self.n_edges());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match row_verts(mid).cmp(&key[..]) {
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
                std::cmp::Ordering::Equal => return Some(mid),
            }
        }
        None
    }
}

/// Column indices and values of a CSR matrix row,
/// borrowed from the matrix itself.
#[inline]
fn csr_row<T>(mat: &nas::CsrMatrix<T>, row: usize) -> (&[usize], &[T]) {
    let offsets = mat.row_offsets();
    let range = offsets[row]..offsets[row + 1];
    (&mat.col_indices()[range.clone()], &mat.values()[range])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{cartesian_grid, single_tetrahedron, sliver_cube, unit_cube, FaceCells};
    use crate::Vec3;

    #[test]
    fn unit_cube_counts() {
        let connect = Connectivity::from_mesh(&unit_cube()).expect("valid mesh");
        assert_eq!(connect.n_vertices(), 8);
        assert_eq!(connect.n_edges(), 12);
        assert_eq!(connect.n_faces(), 6);
        assert_eq!(connect.n_cells(), 1);
        assert_eq!(connect.cell_edges(0).len(), 12);
        itertools::assert_equal(connect.cell_vertices(0).iter().copied(), 0..8);
        // every face of a single cell points out of it
        let (_, signs) = connect.cell_faces(0);
        assert!(signs.iter().all(|&s| s == 1));
    }

    #[test]
    fn edges_are_sorted_and_oriented_upwards() {
        let connect = Connectivity::from_mesh(&unit_cube()).unwrap();
        let edges = (0..connect.n_edges())
            .map(|e| connect.edge_vertices(e))
            .collect_vec();
        assert!(edges.iter().all(|[a, b]| a < b));
        assert!(edges.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(edges[0], [0, 1]);
        assert_eq!(connect.find_edge(5, 1), Some(connect.find_edge(1, 5).unwrap()));
        assert_eq!(connect.find_edge(0, 6), None);
    }

    #[test]
    fn face_edge_orientation_follows_ring() {
        let mesh = unit_cube();
        let connect = Connectivity::from_mesh(&mesh).unwrap();
        for (face_idx, ring) in mesh.faces().enumerate() {
            let (edges, signs) = connect.face_edges(face_idx);
            assert_eq!(edges.len(), ring.len());
            for (&a, &b) in ring.iter().circular_tuple_windows() {
                let e = connect.find_edge(a, b).unwrap();
                let pos = edges.iter().position(|&x| x == e).unwrap();
                let [start, _] = connect.edge_vertices(e);
                assert_eq!(signs[pos], if start == a { 1 } else { -1 });
            }
        }
    }

    #[test]
    fn interior_faces_have_opposite_signs() {
        let mesh = cartesian_grid([2, 1, 1], Vec3::new(1.0, 1.0, 1.0));
        let connect = Connectivity::from_mesh(&mesh).unwrap();
        assert_eq!(connect.n_cells(), 2);
        assert_eq!(connect.n_faces(), 11);
        assert_eq!(connect.n_edges(), 20);
        let interior = (0..mesh.n_faces())
            .filter(|&f| !mesh.is_boundary_face(f))
            .collect_vec();
        assert_eq!(interior.len(), 1);
        let f = interior[0];
        let sign_in = |c: usize| {
            let (faces, signs) = connect.cell_faces(c);
            signs[faces.iter().position(|&x| x == f).unwrap()]
        };
        assert_eq!(sign_in(0), 1);
        assert_eq!(sign_in(1), -1);
    }

    #[test]
    fn every_cell_edge_has_two_faces() {
        for mesh in [unit_cube(), single_tetrahedron(), sliver_cube()] {
            let connect = Connectivity::from_mesh(&mesh).unwrap();
            for c in 0..connect.n_cells() {
                for &e in connect.cell_edges(c) {
                    let [(f0, s0), (f1, s1)] = connect.cell_edge_faces(c, e).unwrap();
                    assert!(f0 < f1);
                    assert_eq!(s0, -s1);
                }
            }
        }
    }

    #[test]
    fn out_of_bounds_vertex_is_rejected() {
        let mesh = unit_cube();
        let mut faces = mesh.faces().map(|r| r.to_vec()).collect_vec();
        faces[2][1] = 42;
        let broken = PolyMesh::new(
            mesh.vertices().to_vec(),
            faces,
            mesh.face_cells().to_vec(),
            1,
        );
        match Connectivity::from_mesh(&broken) {
            Err(BuildError::InconsistentTopology { entity, id, .. }) => {
                assert_eq!(entity, EntityKind::Face);
                assert_eq!(id, 2);
            }
            other => panic!("expected a topology error, got {other:?}"),
        }
    }

    #[test]
    fn out_of_bounds_cell_is_rejected() {
        let mesh = unit_cube();
        let mut adj = mesh.face_cells().to_vec();
        adj[4] = FaceCells::interior(0, 3);
        let broken = PolyMesh::new(
            mesh.vertices().to_vec(),
            mesh.faces().map(|r| r.to_vec()).collect(),
            adj,
            1,
        );
        assert!(matches!(
            Connectivity::from_mesh(&broken),
            Err(BuildError::InconsistentTopology {
                entity: EntityKind::Face,
                id: 4,
                ..
            })
        ));
    }

    #[test]
    fn open_cell_is_rejected() {
        let mesh = unit_cube();
        // drop the last face, leaving a hole in the cell
        let faces = mesh.faces().take(5).map(|r| r.to_vec()).collect();
        let adj = mesh.face_cells()[..5].to_vec();
        let broken = PolyMesh::new(mesh.vertices().to_vec(), faces, adj, 1);
        assert!(matches!(
            Connectivity::from_mesh(&broken),
            Err(BuildError::InconsistentTopology {
                entity: EntityKind::Cell,
                id: 0,
                ..
            })
        ));
    }

    #[test]
    fn flipped_face_is_rejected() {
        let mesh = unit_cube();
        let mut faces = mesh.faces().map(|r| r.to_vec()).collect_vec();
        faces[0].reverse();
        let broken = PolyMesh::new(
            mesh.vertices().to_vec(),
            faces,
            mesh.face_cells().to_vec(),
            1,
        );
        assert!(matches!(
            Connectivity::from_mesh(&broken),
            Err(BuildError::InconsistentTopology {
                entity: EntityKind::Cell,
                ..
            })
        ));
    }

    #[test]
    fn find_edge_with_any_edge_numbering() {
        let mesh = cartesian_grid([2, 2, 1], Vec3::from_element(1.0));
        let connect = Connectivity::from_mesh(&mesh).unwrap();
        let n_edges = connect.n_edges();
        for edge_idx in 0..n_edges {
            let [v0, v1] = connect.edge_vertices(edge_idx);
            assert_eq!(connect.find_edge(v0, v1), Some(edge_idx));
            assert_eq!(connect.find_edge(v1, v0), Some(edge_idx));
        }
        // diagonal of the bottom face of the first cell
        assert_eq!(connect.find_edge(0, 4), None);

        // same edges numbered in reverse
        let renumber = |e: usize| n_edges - 1 - e;
        let mut e2v = nas::CooMatrix::new(n_edges, connect.n_vertices());
        for edge_idx in 0..n_edges {
            let (verts, signs) = csr_row(connect.e2v(), edge_idx);
            for (&vert, &sign) in verts.iter().zip(signs) {
                e2v.push(renumber(edge_idx), vert, sign);
            }
        }
        let mut f2e = nas::CooMatrix::new(connect.n_faces(), n_edges);
        for face_idx in 0..connect.n_faces() {
            let (edges, signs) = connect.face_edges(face_idx);
            for (&edge_idx, &sign) in edges.iter().zip(signs) {
                f2e.push(face_idx, renumber(edge_idx), sign);
            }
        }
        let reversed = Connectivity::from_parts(
            connect.n_vertices(),
            nas::CsrMatrix::from(&e2v),
            nas::CsrMatrix::from(&f2e),
            connect.c2f().clone(),
        )
        .unwrap();
        for edge_idx in 0..n_edges {
            let [v0, v1] = connect.edge_vertices(edge_idx);
            assert_eq!(reversed.find_edge(v0, v1), Some(renumber(edge_idx)));
        }
        assert_eq!(reversed.find_edge(0, 4), None);
    }

    #[test]
    fn from_parts_checks_dimensions() {
        let connect = Connectivity::from_mesh(&unit_cube()).unwrap();
        let res = Connectivity::from_parts(
            9,
            connect.e2v().clone(),
            connect.f2e().clone(),
            connect.c2f().clone(),
        );
        assert!(matches!(
            res,
            Err(BuildError::InconsistentTopology {
                entity: EntityKind::Vertex,
                ..
            })
        ));

        let rebuilt = Connectivity::from_parts(
            8,
            connect.e2v().clone(),
            connect.f2e().clone(),
            connect.c2f().clone(),
        )
        .unwrap();
        assert_eq!(rebuilt.c2e(), connect.c2e());
        assert_eq!(rebuilt.c2v(), connect.c2v());
    }
}
