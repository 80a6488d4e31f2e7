//! Primal and dual geometric quantities for CDO schemes.
//!
//! Everything is computed in one go by [`CdoQuantities::build`]
//! and stored in an immutable [`CdoQuantities`] bundle.
//! When the mesh or the cell center algorithm changes,
//! build a new bundle instead of modifying the old one.
//!
//! # Storage order
//!
//! Per-entity arrays are indexed by entity id.
//! Per-incidence arrays follow the scans of the [`Connectivity`]:
//! dual edges follow `c2f`, dual faces follow `c2e`
//! and partial dual volumes follow `c2v`.
//! Use the `cell_*` accessors to get the slice belonging to one cell.

/// Face, edge and cell quantities.
mod primal;
/// Dual edges, dual faces and dual volumes.
mod dual;
/// Min/max statistics and volume cross-checks.
mod info;
/// Human-readable summaries and full dumps.
mod report;
pub use report::Summary;

//

use fixedbitset as fb;
use itertools::izip;

use std::{fmt, sync::Arc};

use crate::{
    error::{BuildError, BuildWarning, EntityKind, VolumeReference},
    mesh::{BaseQuantities, Connectivity, PolyMesh},
    Vec3,
};

/// A vector stored as its length and direction.
///
/// The zero vector is stored with a zero `unitv`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NVec3 {
    /// Length of the vector.
    pub meas: f64,
    /// Direction of the vector, unit length unless `meas` is zero.
    pub unitv: Vec3,
}

impl NVec3 {
    /// Split a vector into length and direction.
    pub fn from_vector(v: Vec3) -> Self {
        let meas = v.magnitude();
        if meas > f64::MIN_POSITIVE {
            Self {
                meas,
                unitv: v / meas,
            }
        } else {
            Self {
                meas: 0.0,
                unitv: Vec3::zeros(),
            }
        }
    }

    /// The vector `meas * unitv`.
    #[inline]
    pub fn vector(&self) -> Vec3 {
        self.meas * self.unitv
    }
}

/// Quantities of a primal face or edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quant {
    /// Area of a face or length of an edge.
    pub meas: f64,
    /// Unit normal of a face or unit tangent of an edge.
    pub unitv: Vec3,
    /// Barycenter of the entity.
    pub center: Vec3,
}

impl Quant {
    /// Area of the triangle whose base is this entity (a segment)
    /// and whose apex is `apex`.
    pub fn apex_triangle_area(&self, apex: &Vec3) -> f64 {
        let to_apex = apex - self.center;
        // |(apex - center) x e| / 2, with e = meas * unitv
        0.5 * self.meas * to_apex.cross(&self.unitv).magnitude()
    }
}

impl fmt::Display for Quant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>13.6e} | {:>13.6e} {:>13.6e} {:>13.6e} | {:>13.6e} {:>13.6e} {:>13.6e}",
            self.meas,
            self.unitv.x,
            self.unitv.y,
            self.unitv.z,
            self.center.x,
            self.center.y,
            self.center.z,
        )
    }
}

/// The part of the dual face of an edge lying inside one cell.
///
/// It is made of the two triangles `(x_c, x_f, x_e)`
/// spanned by the cell center, the center of one of the two cell faces
/// sharing the edge, and the edge midpoint.
/// Both triangle vectors are oriented along the edge tangent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DualFace {
    /// Ids of the two primal faces the triangles are built on.
    pub parent_id: [usize; 2],
    /// Area and unit normal of each triangle.
    pub sface: [NVec3; 2],
    /// Dual face vector, the sum of the two triangle vectors.
    pub vect: Vec3,
}

impl DualFace {
    fn new(parent_id: [usize; 2], sface: [NVec3; 2]) -> Self {
        Self {
            parent_id,
            sface,
            vect: sface[0].vector() + sface[1].vector(),
        }
    }
}

/// Extent of the measures of one class of entities across the mesh.
///
/// Ties are resolved in favor of the lowest entity id.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct QuantInfo {
    /// Smallest measure (volume, area or length).
    pub meas_min: f64,
    /// Largest measure.
    pub meas_max: f64,
    /// Equivalent diameter of the smallest entity.
    pub h_min: f64,
    /// Equivalent diameter of the largest entity.
    pub h_max: f64,
    /// Id of the entity with the smallest measure.
    pub min_id: usize,
    /// Id of the entity with the largest measure.
    pub max_id: usize,
}

/// Algorithm used to place cell centers.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum CellCenterAlgo {
    /// Mean of the cell vertices.
    VertexMean,
    /// Volume barycenter of the cell.
    #[default]
    Barycenter,
    /// Centers given by the upstream mesh quantities.
    External,
    /// Center moved to make dual edges as parallel
    /// to the face normals as possible.
    Orthogonal(OrthoParams),
}

impl fmt::Display for CellCenterAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VertexMean => f.write_str("mean of vertices"),
            Self::Barycenter => f.write_str("barycenter"),
            Self::External => f.write_str("external"),
            Self::Orthogonal(p) => write!(
                f,
                "orthogonality-optimized (tol {:e}, max {} iterations)",
                p.tolerance, p.max_iterations
            ),
        }
    }
}

/// Parameters of the orthogonality-optimized cell center iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrthoParams {
    /// Convergence threshold on the update step,
    /// relative to the equivalent diameter of the cell.
    pub tolerance: f64,
    /// Maximum number of iterations per cell.
    pub max_iterations: usize,
    /// Use the barycenter for cells that don't converge
    /// instead of failing the build.
    pub allow_fallback: bool,
}

impl Default for OrthoParams {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 50,
            allow_fallback: true,
        }
    }
}

/// Configuration of [`CdoQuantities::build`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildOptions {
    /// How cell centers are placed.
    pub cc_algo: CellCenterAlgo,
    /// Threshold below which an entity counts as degenerate,
    /// relative to the matching power of the bounding box diagonal
    /// (length for edges, area for faces, volume for cells).
    pub degeneracy_tolerance: f64,
    /// Keep degenerate entities (with a measure of zero)
    /// instead of failing the build.
    pub ignore_degeneracies: bool,
    /// Relative tolerance of the total volume cross-checks.
    pub volume_tolerance: f64,
    /// A cell is flagged orthogonal when `1 - |cos|` of the angle
    /// between each dual edge and the matching face normal is below this.
    pub orthogonality_tolerance: f64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            cc_algo: CellCenterAlgo::default(),
            degeneracy_tolerance: 1e-12,
            ignore_degeneracies: false,
            volume_tolerance: 1e-8,
            orthogonality_tolerance: 1e-10,
        }
    }
}

impl BuildOptions {
    /// Set the cell center algorithm.
    pub fn with_cc_algo(mut self, cc_algo: CellCenterAlgo) -> Self {
        self.cc_algo = cc_algo;
        self
    }

    /// Set the relative degeneracy tolerance.
    pub fn with_degeneracy_tolerance(mut self, tolerance: f64) -> Self {
        self.degeneracy_tolerance = tolerance;
        self
    }

    /// Set whether degenerate entities are ignored.
    pub fn with_ignore_degeneracies(mut self, ignore: bool) -> Self {
        self.ignore_degeneracies = ignore;
        self
    }

    /// Set the relative tolerance of the total volume cross-checks.
    pub fn with_volume_tolerance(mut self, tolerance: f64) -> Self {
        self.volume_tolerance = tolerance;
        self
    }

    /// Set the tolerance for flagging cells as orthogonal.
    pub fn with_orthogonality_tolerance(mut self, tolerance: f64) -> Self {
        self.orthogonality_tolerance = tolerance;
        self
    }
}

/// Geometric quantities of a mesh needed by CDO schemes.
///
/// See the [module-level docs][self] for the storage conventions.
#[derive(Clone, Debug)]
pub struct CdoQuantities {
    cc_algo: CellCenterAlgo,
    vol_tot: f64,

    // cell-based quantities
    cell_centers: Vec<Vec3>,
    cell_vol: Vec<f64>,
    cell_info: QuantInfo,
    orthogonal_cells: fb::FixedBitSet,

    // face-based quantities
    n_i_faces: usize,
    n_b_faces: usize,
    face: Vec<Quant>,
    /// scanned with c2f
    dedge: Vec<NVec3>,
    face_info: QuantInfo,

    // edge-based quantities
    edge: Vec<Quant>,
    /// scanned with c2e
    dface: Vec<DualFace>,
    edge_info: QuantInfo,

    // vertex-based quantities
    /// scanned with c2v
    pvol_vc: Vec<f64>,
    dcell_vol: Vec<f64>,
    vtx_coord: Arc<[Vec3]>,

    // offsets of each cell in the c2f, c2e and c2v scans
    c2f_offsets: Vec<usize>,
    c2e_offsets: Vec<usize>,
    c2v_offsets: Vec<usize>,

    warnings: Vec<BuildWarning>,
}

/// Run a computation for every index in `0..n`,
/// in parallel when the `parallel` feature is enabled.
/// Results are always returned in index order.
fn map_indices<T, F>(n: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        (0..n).into_par_iter().map(f).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..n).map(f).collect()
    }
}

impl CdoQuantities {
    /// Compute the quantities of a mesh.
    ///
    /// `base` is only required for [`CellCenterAlgo::External`];
    /// if it carries cell volumes, their total is also cross-checked
    /// against the computed one.
    ///
    /// # Errors
    ///
    /// - [`BuildError::InconsistentTopology`] if the mesh and connectivity don't match
    ///   or external centers are requested without (enough) base quantities.
    /// - [`BuildError::DegenerateEntity`] if a face, edge or cell has a measure
    ///   below the degeneracy tolerance and degeneracies aren't ignored.
    /// - [`BuildError::OptimizationDivergence`] if the orthogonality-optimized
    ///   center doesn't converge and fallback is disabled.
    pub fn build(
        mesh: &PolyMesh,
        base: Option<&BaseQuantities>,
        connect: &Connectivity,
        options: &BuildOptions,
    ) -> Result<Self, BuildError> {
        check_consistency(mesh, base, connect, options)?;

        log::debug!(
            "building CDO quantities: {} cells, {} faces, {} edges, {} vertices, cell centers: {}",
            connect.n_cells(),
            connect.n_faces(),
            connect.n_edges(),
            connect.n_vertices(),
            options.cc_algo,
        );

        let mut warnings = Vec::new();
        let ref_len = mesh.bounds().diagonal();
        let degeneracy = Degeneracy {
            ref_len,
            tolerance: options.degeneracy_tolerance,
            ignore: options.ignore_degeneracies,
        };

        //
        // primal quantities
        //

        let face = primal::compute_faces(mesh, connect, &degeneracy, &mut warnings)?;
        let edge = primal::compute_edges(mesh, connect, &degeneracy, &mut warnings)?;
        let cells = primal::compute_cells(
            mesh,
            base,
            connect,
            &face,
            &options.cc_algo,
            &degeneracy,
            &mut warnings,
        )?;
        let (cell_vol, cell_centers): (Vec<f64>, Vec<Vec3>) =
            cells.into_iter().map(|c| (c.volume, c.center)).unzip();

        //
        // dual quantities
        //

        let duals = map_indices(connect.n_cells(), |c| {
            dual::compute_cell_duals(c, &cell_centers[c], mesh, connect, &face, &edge)
        })
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

        let mut dedge = Vec::with_capacity(connect.c2f().nnz());
        let mut dface = Vec::with_capacity(connect.c2e().nnz());
        let mut pvol_vc = Vec::with_capacity(connect.c2v().nnz());
        for cell_duals in duals {
            dedge.extend(cell_duals.dedge);
            dface.extend(cell_duals.dface);
            pvol_vc.extend(cell_duals.pvol);
        }
        let dcell_vol = dual::accumulate_dual_volumes(connect, &pvol_vc);

        let mut orthogonal_cells = fb::FixedBitSet::with_capacity(connect.n_cells());
        for cell_idx in 0..connect.n_cells() {
            let [f_start, _, _] = connect.cell_offsets(cell_idx);
            let (faces, _) = connect.cell_faces(cell_idx);
            let is_ortho = faces.iter().enumerate().all(|(i, &f)| {
                let cos = dedge[f_start + i].unitv.dot(&face[f].unitv);
                1.0 - cos.abs() <= options.orthogonality_tolerance
            });
            orthogonal_cells.set(cell_idx, is_ortho);
        }

        //
        // statistics and consistency checks
        //

        let vol_tot: f64 = cell_vol.iter().sum();
        let cell_info = info::compute_info(cell_vol.iter().copied(), f64::cbrt);
        let face_info = info::compute_info(face.iter().map(|q| q.meas), f64::sqrt);
        let edge_info = info::compute_info(edge.iter().map(|q| q.meas), |l| l);

        let flux_vol = info::boundary_flux_volume(mesh, &face);
        warnings.extend(info::check_volume(
            vol_tot,
            flux_vol,
            VolumeReference::BoundaryFlux,
            options.volume_tolerance,
        ));
        if let Some(base_vol) = base.and_then(BaseQuantities::total_volume) {
            warnings.extend(info::check_volume(
                vol_tot,
                base_vol,
                VolumeReference::BaseQuantities,
                options.volume_tolerance,
            ));
        }

        for warning in &warnings {
            log::warn!("{warning}");
        }

        let n_b_faces = (0..mesh.n_faces())
            .filter(|&f| mesh.is_boundary_face(f))
            .count();

        let quant = Self {
            cc_algo: options.cc_algo,
            vol_tot,
            cell_centers,
            cell_vol,
            cell_info,
            orthogonal_cells,
            n_i_faces: mesh.n_faces() - n_b_faces,
            n_b_faces,
            face,
            dedge,
            face_info,
            edge,
            dface,
            edge_info,
            pvol_vc,
            dcell_vol,
            vtx_coord: mesh.shared_vertices(),
            c2f_offsets: connect.c2f().row_offsets().to_vec(),
            c2e_offsets: connect.c2e().major_offsets().to_vec(),
            c2v_offsets: connect.c2v().major_offsets().to_vec(),
            warnings,
        };
        log::debug!("CDO quantities built, total volume {:.12e}", quant.vol_tot);

        Ok(quant)
    }

    /// The cell center algorithm the quantities were built with.
    #[inline]
    pub fn cc_algo(&self) -> CellCenterAlgo {
        self.cc_algo
    }

    /// Total volume of the mesh.
    #[inline]
    pub fn vol_tot(&self) -> f64 {
        self.vol_tot
    }

    /// Number of cells.
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.cell_vol.len()
    }

    /// Number of faces.
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.face.len()
    }

    /// Number of interior faces.
    #[inline]
    pub fn n_i_faces(&self) -> usize {
        self.n_i_faces
    }

    /// Number of boundary faces.
    #[inline]
    pub fn n_b_faces(&self) -> usize {
        self.n_b_faces
    }

    /// Number of edges.
    #[inline]
    pub fn n_edges(&self) -> usize {
        self.edge.len()
    }

    /// Number of vertices.
    #[inline]
    pub fn n_vertices(&self) -> usize {
        self.vtx_coord.len()
    }

    /// Vertex coordinates, shared with the mesh.
    #[inline]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vtx_coord
    }

    /// Cell centers, placed by the selected algorithm.
    #[inline]
    pub fn cell_centers(&self) -> &[Vec3] {
        &self.cell_centers
    }

    /// Cell volumes.
    #[inline]
    pub fn cell_volumes(&self) -> &[f64] {
        &self.cell_vol
    }

    /// Face quantities: area, unit normal and barycenter.
    #[inline]
    pub fn faces(&self) -> &[Quant] {
        &self.face
    }

    /// Edge quantities: length, unit tangent and midpoint.
    #[inline]
    pub fn edges(&self) -> &[Quant] {
        &self.edge
    }

    /// All dual edges in `c2f` order.
    /// Each one goes from the cell center to the face center.
    #[inline]
    pub fn dual_edges(&self) -> &[NVec3] {
        &self.dedge
    }

    /// Dual edges of one cell, in the order of its faces.
    #[inline]
    pub fn cell_dual_edges(&self, cell: usize) -> &[NVec3] {
        &self.dedge[self.c2f_offsets[cell]..self.c2f_offsets[cell + 1]]
    }

    /// All dual faces in `c2e` order.
    #[inline]
    pub fn dual_faces(&self) -> &[DualFace] {
        &self.dface
    }

    /// Dual faces of one cell, in the order of its edges.
    #[inline]
    pub fn cell_dual_faces(&self, cell: usize) -> &[DualFace] {
        &self.dface[self.c2e_offsets[cell]..self.c2e_offsets[cell + 1]]
    }

    /// Dual volume of each vertex.
    #[inline]
    pub fn dual_volumes(&self) -> &[f64] {
        &self.dcell_vol
    }

    /// All partial dual volumes in `c2v` order.
    #[inline]
    pub fn partial_dual_volumes(&self) -> &[f64] {
        &self.pvol_vc
    }

    /// Contributions of one cell to the dual volumes of its vertices,
    /// in the order of its vertices.
    #[inline]
    pub fn cell_dual_volumes(&self, cell: usize) -> &[f64] {
        &self.pvol_vc[self.c2v_offsets[cell]..self.c2v_offsets[cell + 1]]
    }

    /// Volume statistics of the cells.
    #[inline]
    pub fn cell_info(&self) -> QuantInfo {
        self.cell_info
    }

    /// Area statistics of the faces.
    #[inline]
    pub fn face_info(&self) -> QuantInfo {
        self.face_info
    }

    /// Length statistics of the edges.
    #[inline]
    pub fn edge_info(&self) -> QuantInfo {
        self.edge_info
    }

    /// Whether every dual edge of a cell is parallel to the matching face normal.
    #[inline]
    pub fn is_orthogonal(&self, cell: usize) -> bool {
        self.orthogonal_cells.contains(cell)
    }

    /// The set of cells flagged orthogonal.
    ///
    /// Iterate over the indices with `orthogonal_cells().ones()`.
    #[inline]
    pub fn orthogonal_cells(&self) -> &fb::FixedBitSet {
        &self.orthogonal_cells
    }

    /// Non-fatal conditions met during the build.
    #[inline]
    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }
}

/// Degeneracy policy shared by the primal computations.
pub(crate) struct Degeneracy {
    /// reference length of the mesh
    ref_len: f64,
    tolerance: f64,
    ignore: bool,
}

impl Degeneracy {
    /// Check a measure of the given dimension (1 for lengths, 2 for areas, 3 for volumes).
    /// Returns whether the entity is degenerate,
    /// or an error if it is and degeneracies aren't ignored.
    pub(crate) fn check(
        &self,
        entity: EntityKind,
        id: usize,
        meas: f64,
        dim: i32,
        warnings: &mut Vec<BuildWarning>,
    ) -> Result<bool, BuildError> {
        let threshold = self.tolerance * self.ref_len.powi(dim);
        if meas.is_finite() && meas > threshold {
            return Ok(false);
        }
        if self.ignore {
            warnings.push(BuildWarning::IgnoredDegeneracy {
                entity,
                id,
                measure: meas,
            });
            Ok(true)
        } else {
            Err(BuildError::DegenerateEntity {
                entity,
                id,
                measure: meas,
            })
        }
    }
}

fn check_consistency(
    mesh: &PolyMesh,
    base: Option<&BaseQuantities>,
    connect: &Connectivity,
    options: &BuildOptions,
) -> Result<(), BuildError> {
    let counts = [
        (EntityKind::Vertex, mesh.n_vertices(), connect.n_vertices()),
        (EntityKind::Face, mesh.n_faces(), connect.n_faces()),
        (EntityKind::Cell, mesh.n_cells(), connect.n_cells()),
    ];
    for (entity, in_mesh, in_connect) in counts {
        if in_mesh != in_connect {
            return Err(BuildError::topology(
                entity,
                in_mesh.min(in_connect),
                format!("mesh has {in_mesh} {entity}s but connectivity has {in_connect}"),
            ));
        }
    }
    if mesh.n_cells() == 0 {
        return Err(BuildError::topology(EntityKind::Cell, 0, "mesh has no cells"));
    }
    if mesh.face_cells().len() != mesh.n_faces() {
        return Err(BuildError::topology(
            EntityKind::Face,
            mesh.face_cells().len().min(mesh.n_faces()),
            "face-cell adjacency doesn't cover every face",
        ));
    }
    // cells on the positive and negative side of each face according to c2f,
    // which must agree with the adjacency stored in the mesh
    let mut sides: Vec<[Option<usize>; 2]> = vec![[None, None]; mesh.n_faces()];
    for cell_idx in 0..connect.n_cells() {
        let (faces, signs) = connect.cell_faces(cell_idx);
        for (&face_idx, &sign) in izip!(faces, signs) {
            let side = usize::from(sign < 0);
            if sides[face_idx][side].replace(cell_idx).is_some() {
                return Err(BuildError::topology(
                    EntityKind::Face,
                    face_idx,
                    "connectivity puts two cells on the same side of the face",
                ));
            }
        }
    }
    for (face_idx, (adj, side)) in izip!(mesh.face_cells(), &sides).enumerate() {
        if [Some(adj.inner), adj.outer] != *side {
            return Err(BuildError::topology(
                EntityKind::Face,
                face_idx,
                format!(
                    "mesh puts cells {:?} around the face but the connectivity has {:?}",
                    [Some(adj.inner), adj.outer],
                    side
                ),
            ));
        }
    }
    for (face_idx, ring) in mesh.faces().enumerate() {
        let (edges, _) = connect.face_edges(face_idx);
        if edges.len() != ring.len() {
            return Err(BuildError::topology(
                EntityKind::Face,
                face_idx,
                format!(
                    "face has {} vertices but {} edges in the connectivity",
                    ring.len(),
                    edges.len()
                ),
            ));
        }
    }
    if options.cc_algo == CellCenterAlgo::External {
        match base {
            None => {
                return Err(BuildError::topology(
                    EntityKind::Cell,
                    0,
                    "external cell centers requested but no base quantities given",
                ))
            }
            Some(base) if base.cell_centers.len() != mesh.n_cells() => {
                return Err(BuildError::topology(
                    EntityKind::Cell,
                    base.cell_centers.len().min(mesh.n_cells()),
                    format!(
                        "{} external cell centers given for {} cells",
                        base.cell_centers.len(),
                        mesh.n_cells()
                    ),
                ))
            }
            Some(_) => {}
        }
    }
    if let Some(vols) = base.and_then(|b| b.cell_volumes.as_ref()) {
        if vols.len() != mesh.n_cells() {
            return Err(BuildError::topology(
                EntityKind::Cell,
                vols.len().min(mesh.n_cells()),
                format!("{} base cell volumes given for {} cells", vols.len(), mesh.n_cells()),
            ));
        }
    }
    Ok(())
}
