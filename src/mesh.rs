//! The primal polyhedral mesh and its incidence structure.

/// Incidence matrices between cells, faces, edges and vertices.
mod connectivity;
pub use connectivity::Connectivity;

/// Small meshes used in tests and doctests.
mod test_meshes;
/// re-export the testing meshes for use in other modules' tests
/// and in doctests
#[doc(hidden)]
pub use test_meshes::{cartesian_grid, jittered_grid, single_tetrahedron, sliver_cube, unit_cube};

//

use itertools::izip;
use std::sync::Arc;

use crate::Vec3;

/// A mesh made of arbitrary polyhedral cells.
///
/// Faces are given as rings of vertex indices.
/// The order of the ring defines the face normal by the right-hand rule,
/// and that normal points from [`FaceCells::inner`] towards [`FaceCells::outer`]
/// (out of the mesh for boundary faces, which have no outer cell).
/// Cells are only known through the faces that bound them.
#[derive(Clone, Debug)]
pub struct PolyMesh {
    /// Vertices stored in an Arc so that the quantities built from this mesh
    /// can refer to them without copying.
    /// Mutation after creation is not supported.
    vertices: Arc<[Vec3]>,
    /// vertex rings of all faces stored in a flat Vec,
    /// face `i` occupying `face_indices[face_offsets[i]..face_offsets[i + 1]]`
    face_offsets: Vec<usize>,
    face_indices: Vec<usize>,
    face_cells: Vec<FaceCells>,
    n_cells: usize,
    bounds: BoundingBox,
}

/// The cells on either side of a face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceCells {
    /// The cell the face normal points away from.
    pub inner: usize,
    /// The cell the face normal points into, `None` on the mesh boundary.
    pub outer: Option<usize>,
}

impl FaceCells {
    /// Adjacency of an interior face.
    #[inline]
    pub fn interior(inner: usize, outer: usize) -> Self {
        Self {
            inner,
            outer: Some(outer),
        }
    }

    /// Adjacency of a face on the mesh boundary.
    #[inline]
    pub fn boundary(inner: usize) -> Self {
        Self { inner, outer: None }
    }
}

/// An axis-aligned bounding box.
#[derive(Clone, Copy, Debug)]
pub struct BoundingBox {
    /// The minimum corner of the box.
    pub min: Vec3,
    /// The maximum corner of the box.
    pub max: Vec3,
}

impl BoundingBox {
    /// Length of the diagonal of the box,
    /// used as the reference length of the mesh.
    #[inline]
    pub fn diagonal(&self) -> f64 {
        (self.max - self.min).magnitude()
    }
}

impl PolyMesh {
    /// Construct a mesh from raw vertices, face vertex rings
    /// and the cells adjacent to each face.
    ///
    /// No validation is done here;
    /// indices are checked when building a [`Connectivity`] from the mesh.
    pub fn new(
        vertices: Vec<Vec3>,
        faces: Vec<Vec<usize>>,
        face_cells: Vec<FaceCells>,
        n_cells: usize,
    ) -> Self {
        let mut face_offsets = Vec::with_capacity(faces.len() + 1);
        face_offsets.push(0);
        let mut face_indices = Vec::with_capacity(faces.iter().map(Vec::len).sum());
        for ring in &faces {
            face_indices.extend_from_slice(ring);
            face_offsets.push(face_indices.len());
        }

        let mut bounds = BoundingBox {
            min: Vec3::from_element(f64::MAX),
            max: Vec3::from_element(f64::MIN),
        };
        for vert in &vertices {
            for (coord, min, max) in izip!(
                vert.iter(),
                bounds.min.iter_mut(),
                bounds.max.iter_mut()
            ) {
                if *coord < *min {
                    *min = *coord;
                }
                if *coord > *max {
                    *max = *coord;
                }
            }
        }
        if vertices.is_empty() {
            bounds = BoundingBox {
                min: Vec3::zeros(),
                max: Vec3::zeros(),
            };
        }

        Self {
            vertices: Arc::from(vertices),
            face_offsets,
            face_indices,
            face_cells,
            n_cells,
            bounds,
        }
    }

    /// Number of vertices in the mesh.
    #[inline]
    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces in the mesh.
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.face_offsets.len() - 1
    }

    /// Number of cells in the mesh.
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// Get a slice of all vertices in the mesh.
    #[inline]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Shared handle to the vertex coordinates.
    #[inline]
    pub(crate) fn shared_vertices(&self) -> Arc<[Vec3]> {
        Arc::clone(&self.vertices)
    }

    /// Vertex ring of a face.
    #[inline]
    pub fn face_vertices(&self, face: usize) -> &[usize] {
        &self.face_indices[self.face_offsets[face]..self.face_offsets[face + 1]]
    }

    /// Iterate over the vertex rings of all faces.
    pub fn faces(&self) -> impl '_ + Iterator<Item = &[usize]> {
        self.face_offsets
            .windows(2)
            .map(|w| &self.face_indices[w[0]..w[1]])
    }

    /// Cells adjacent to each face.
    #[inline]
    pub fn face_cells(&self) -> &[FaceCells] {
        &self.face_cells
    }

    /// Whether a face lies on the mesh boundary.
    #[inline]
    pub fn is_boundary_face(&self, face: usize) -> bool {
        self.face_cells[face].outer.is_none()
    }

    /// Get a bounding box enclosing the entire mesh.
    #[inline]
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }
}

/// Cell quantities computed by an upstream (non-CDO) stage.
///
/// Only consulted by [`CellCenterAlgo::External`][crate::CellCenterAlgo::External]
/// and, when volumes are present, by the total volume cross-check.
#[derive(Clone, Debug, Default)]
pub struct BaseQuantities {
    /// Cell centers, one per cell.
    pub cell_centers: Vec<Vec3>,
    /// Cell volumes, one per cell, if known.
    pub cell_volumes: Option<Vec<f64>>,
}

impl BaseQuantities {
    /// Base quantities consisting of cell centers only.
    pub fn new(cell_centers: Vec<Vec3>) -> Self {
        Self {
            cell_centers,
            cell_volumes: None,
        }
    }

    /// Attach cell volumes to the base quantities.
    pub fn with_cell_volumes(mut self, cell_volumes: Vec<f64>) -> Self {
        self.cell_volumes = Some(cell_volumes);
        self
    }

    /// Sum of the cell volumes, if they are known.
    pub fn total_volume(&self) -> Option<f64> {
        self.cell_volumes.as_ref().map(|vols| vols.iter().sum())
    }
}
