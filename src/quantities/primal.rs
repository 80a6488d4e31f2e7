use nalgebra as na;

use itertools::{izip, Itertools};

use super::{map_indices, CellCenterAlgo, Degeneracy, OrthoParams, Quant};
use crate::{
    error::{BuildError, BuildWarning, EntityKind},
    mesh::{BaseQuantities, Connectivity, PolyMesh},
    Vec3,
};

/// Face quantities before the degeneracy check.
struct RawFace {
    meas: f64,
    /// `None` if the sub-triangle areas sum to the zero vector
    unitv: Option<Vec3>,
    center: Vec3,
}

/// Compute the area, unit normal and barycenter of every face.
pub(super) fn compute_faces(
    mesh: &PolyMesh,
    connect: &Connectivity,
    degeneracy: &Degeneracy,
    warnings: &mut Vec<BuildWarning>,
) -> Result<Vec<Quant>, BuildError> {
    let vertices = mesh.vertices();
    let raw_faces = map_indices(mesh.n_faces(), |f| {
        face_quantity(vertices, mesh.face_vertices(f))
    });

    let mut faces = Vec::with_capacity(raw_faces.len());
    for (face_idx, raw) in raw_faces.into_iter().enumerate() {
        let degenerate = degeneracy.check(EntityKind::Face, face_idx, raw.meas, 2, warnings)?;
        if !degenerate {
            faces.push(Quant {
                meas: raw.meas,
                // a non-degenerate face always has a normal
                unitv: raw.unitv.unwrap_or_else(Vec3::x),
                center: raw.center,
            });
            continue;
        }

        // degenerate faces keep whatever direction their sub-triangles give,
        // or failing that, point away from the vertices of their inner cell
        let unitv = raw.unitv.unwrap_or_else(|| {
            let inner = mesh.face_cells()[face_idx].inner;
            let away = raw.center - vertex_mean(vertices, connect.cell_vertices(inner));
            na::Unit::try_new(away, f64::MIN_POSITIVE)
                .map(na::Unit::into_inner)
                .unwrap_or_else(Vec3::x)
        });
        faces.push(Quant {
            meas: 0.0,
            unitv,
            center: raw.center,
        });
    }

    Ok(faces)
}

/// Triangulate a face around the mean of its vertices
/// and sum up the sub-triangles.
///
/// Sub-triangle areas are signed against the total normal,
/// so that folds in non-planar or non-convex faces cancel out.
fn face_quantity(vertices: &[Vec3], ring: &[usize]) -> RawFace {
    let pseudo_center = vertex_mean(vertices, ring);

    let sub_triangles = ring
        .iter()
        .circular_tuple_windows()
        .map(|(&a, &b)| {
            let (xa, xb) = (vertices[a], vertices[b]);
            let area_vec = 0.5 * (xa - pseudo_center).cross(&(xb - pseudo_center));
            (area_vec, (pseudo_center + xa + xb) / 3.0)
        })
        .collect_vec();

    let normal: Vec3 = sub_triangles.iter().map(|(area_vec, _)| area_vec).sum();
    let Some(unitv) = na::Unit::try_new(normal, f64::MIN_POSITIVE) else {
        return RawFace {
            meas: 0.0,
            unitv: None,
            center: pseudo_center,
        };
    };

    let mut meas = 0.0;
    let mut weighted_center = Vec3::zeros();
    for (area_vec, centroid) in &sub_triangles {
        let signed_area = area_vec.magnitude().copysign(area_vec.dot(&unitv));
        meas += signed_area;
        weighted_center += signed_area * centroid;
    }
    let center = if meas > f64::MIN_POSITIVE {
        weighted_center / meas
    } else {
        pseudo_center
    };

    RawFace {
        meas,
        unitv: Some(unitv.into_inner()),
        center,
    }
}

/// Compute the length, unit tangent and midpoint of every edge.
///
/// Tangents follow the edge orientation given by the connectivity.
pub(super) fn compute_edges(
    mesh: &PolyMesh,
    connect: &Connectivity,
    degeneracy: &Degeneracy,
    warnings: &mut Vec<BuildWarning>,
) -> Result<Vec<Quant>, BuildError> {
    let vertices = mesh.vertices();
    (0..connect.n_edges())
        .map(|edge_idx| {
            let [start, end] = connect.edge_vertices(edge_idx);
            let (x0, x1) = (vertices[start], vertices[end]);
            let tangent = x1 - x0;
            let length = tangent.magnitude();
            let degenerate = degeneracy.check(EntityKind::Edge, edge_idx, length, 1, warnings)?;
            let unitv = if length > f64::MIN_POSITIVE {
                tangent / length
            } else {
                Vec3::x()
            };
            Ok(Quant {
                meas: if degenerate { 0.0 } else { length },
                unitv,
                center: 0.5 * (x0 + x1),
            })
        })
        .collect()
}

/// Volume and center of a cell.
pub(super) struct CellGeometry {
    pub volume: f64,
    pub center: Vec3,
}

/// Everything computed for a cell independently of the others.
struct CellCandidates {
    volume: f64,
    vertex_mean: Vec3,
    barycenter: Vec3,
    /// only computed with `CellCenterAlgo::Orthogonal`
    orthogonal: Option<Result<Vec3, Diverged>>,
}

#[derive(Clone, Copy, Debug)]
struct Diverged {
    iterations: usize,
    residual: f64,
}

/// Compute the volume and center of every cell.
///
/// Volumes are computed around the vertex mean of each cell,
/// so they don't depend on the center algorithm.
pub(super) fn compute_cells(
    mesh: &PolyMesh,
    base: Option<&BaseQuantities>,
    connect: &Connectivity,
    faces: &[Quant],
    cc_algo: &CellCenterAlgo,
    degeneracy: &Degeneracy,
    warnings: &mut Vec<BuildWarning>,
) -> Result<Vec<CellGeometry>, BuildError> {
    let vertices = mesh.vertices();
    let candidates = map_indices(connect.n_cells(), |cell_idx| {
        let vertex_mean = vertex_mean(vertices, connect.cell_vertices(cell_idx));
        let (volume, barycenter) =
            volume_and_barycenter(cell_idx, &vertex_mean, mesh, connect, faces);
        let orthogonal = match cc_algo {
            CellCenterAlgo::Orthogonal(params) => Some(orthogonal_center(
                cell_idx,
                vertex_mean,
                f64::cbrt(volume.abs()).max(f64::MIN_POSITIVE),
                connect,
                faces,
                params,
            )),
            _ => None,
        };
        CellCandidates {
            volume,
            vertex_mean,
            barycenter,
            orthogonal,
        }
    });

    let mut cells = Vec::with_capacity(candidates.len());
    for (cell_idx, cand) in candidates.into_iter().enumerate() {
        let degenerate = degeneracy.check(EntityKind::Cell, cell_idx, cand.volume, 3, warnings)?;
        let barycenter = if degenerate {
            cand.vertex_mean
        } else {
            cand.barycenter
        };

        let center = match (cc_algo, cand.orthogonal) {
            (CellCenterAlgo::VertexMean, _) => cand.vertex_mean,
            (CellCenterAlgo::Barycenter, _) => barycenter,
            (CellCenterAlgo::External, _) => {
                // presence and length checked before the build starts
                base.map_or(barycenter, |b| b.cell_centers[cell_idx])
            }
            (CellCenterAlgo::Orthogonal(_), Some(Ok(center))) => center,
            (CellCenterAlgo::Orthogonal(params), Some(Err(div))) => {
                if !params.allow_fallback {
                    return Err(BuildError::OptimizationDivergence {
                        cell: cell_idx,
                        iterations: div.iterations,
                        residual: div.residual,
                    });
                }
                warnings.push(BuildWarning::OrthogonalityFallback {
                    cell: cell_idx,
                    iterations: div.iterations,
                });
                barycenter
            }
            (CellCenterAlgo::Orthogonal(_), None) => {
                unreachable!("orthogonal centers are computed for every cell")
            }
        };

        cells.push(CellGeometry {
            volume: if degenerate { 0.0 } else { cand.volume },
            center,
        });
    }

    Ok(cells)
}

/// Arithmetic mean of a set of vertices.
pub(super) fn vertex_mean(vertices: &[Vec3], indices: &[usize]) -> Vec3 {
    indices.iter().map(|&v| vertices[v]).sum::<Vec3>() / indices.len().max(1) as f64
}

/// Signed volume of the tetrahedron with base triangle `(xf, xa, xb)`
/// and apex `apex`, positive when the triangle normal points away from the apex.
#[inline]
pub(super) fn sub_tet_volume(apex: &Vec3, xf: &Vec3, xa: &Vec3, xb: &Vec3) -> f64 {
    (xa - xf).cross(&(xb - xf)).dot(&(xf - apex)) / 6.0
}

/// Volume of a cell and its barycenter, from the decomposition into tetrahedra
/// `(x_ref, x_f, v_i, v_i+1)` over every face `f` and edge `(v_i, v_i+1)` of its ring.
fn volume_and_barycenter(
    cell_idx: usize,
    x_ref: &Vec3,
    mesh: &PolyMesh,
    connect: &Connectivity,
    faces: &[Quant],
) -> (f64, Vec3) {
    let vertices = mesh.vertices();
    let (cell_faces, signs) = connect.cell_faces(cell_idx);

    let mut volume = 0.0;
    let mut weighted_center = Vec3::zeros();
    for (&face_idx, &sign) in izip!(cell_faces, signs) {
        let xf = faces[face_idx].center;
        for (&a, &b) in mesh.face_vertices(face_idx).iter().circular_tuple_windows() {
            let (xa, xb) = (vertices[a], vertices[b]);
            let tet_vol = f64::from(sign) * sub_tet_volume(x_ref, &xf, &xa, &xb);
            volume += tet_vol;
            weighted_center += tet_vol * 0.25 * (x_ref + xf + xa + xb);
        }
    }

    let barycenter = if volume.abs() > f64::MIN_POSITIVE {
        weighted_center / volume
    } else {
        *x_ref
    };
    (volume, barycenter)
}

/// Rank-two projector onto the plane orthogonal to a unit vector.
#[inline]
fn plane_projector(unitv: &Vec3) -> na::Matrix3<f64> {
    na::Matrix3::identity() - unitv * unitv.transpose()
}

/// Move the cell center to make the dual edges `x_f - x_c`
/// as parallel to the face normals as possible.
///
/// Each iteration minimizes `sum_f w_f |P_f (x_c - x_f)|^2`
/// where `P_f` projects onto the plane of face `f`
/// and `w_f = |f| / |x_f - x_c|^2` with `x_c` from the previous iteration,
/// i.e. the area-weighted squared sine of the angle
/// between each dual edge and its face normal.
/// The iteration stops when the update is smaller than
/// `params.tolerance * h_cell`.
fn orthogonal_center(
    cell_idx: usize,
    start: Vec3,
    h_cell: f64,
    connect: &Connectivity,
    faces: &[Quant],
    params: &OrthoParams,
) -> Result<Vec3, Diverged> {
    let (cell_faces, _) = connect.cell_faces(cell_idx);

    let mut center = start;
    let mut residual = f64::INFINITY;
    for iteration in 1..=params.max_iterations {
        let mut lhs = na::Matrix3::zeros();
        let mut rhs = Vec3::zeros();
        for &face_idx in cell_faces {
            let face = &faces[face_idx];
            let dist_sq = (face.center - center).magnitude_squared();
            if face.meas <= 0.0 || dist_sq <= f64::MIN_POSITIVE {
                continue;
            }
            let weight = face.meas / dist_sq;
            let proj = plane_projector(&face.unitv);
            rhs += weight * (proj * face.center);
            lhs += weight * proj;
        }

        let Some(next) = lhs.lu().solve(&rhs) else {
            return Err(Diverged {
                iterations: iteration,
                residual,
            });
        };
        residual = (next - center).magnitude() / h_cell;
        center = next;

        if !residual.is_finite() {
            break;
        }
        if residual <= params.tolerance {
            log::trace!("cell {cell_idx}: orthogonal center converged in {iteration} iterations");
            return Ok(center);
        }
    }

    Err(Diverged {
        iterations: params.max_iterations,
        residual,
    })
}
