use super::{Quant, QuantInfo};
use crate::{
    error::{BuildWarning, VolumeReference},
    mesh::PolyMesh,
};

/// Find the smallest and largest of a sequence of measures.
///
/// `diameter` maps a measure to the equivalent diameter of its entity.
/// An empty sequence gives an all-zero record.
pub(super) fn compute_info(
    measures: impl IntoIterator<Item = f64>,
    diameter: impl Fn(f64) -> f64,
) -> QuantInfo {
    let mut info = QuantInfo {
        meas_min: f64::MAX,
        meas_max: -f64::MAX,
        ..Default::default()
    };
    let mut is_empty = true;
    for (id, meas) in measures.into_iter().enumerate() {
        is_empty = false;
        // strict comparisons keep the first id on ties
        if meas < info.meas_min {
            info.meas_min = meas;
            info.min_id = id;
        }
        if meas > info.meas_max {
            info.meas_max = meas;
            info.max_id = id;
        }
    }
    if is_empty {
        return QuantInfo::default();
    }

    info.h_min = diameter(info.meas_min);
    info.h_max = diameter(info.meas_max);
    info
}

/// Volume enclosed by the boundary faces,
/// `1/3 sum_f |f| (x_f - x_0) . n_f` by the divergence theorem.
///
/// `x_0` is the center of the bounding box,
/// which doesn't change the result on a closed boundary
/// but keeps the terms small on meshes far from the origin.
pub(super) fn boundary_flux_volume(mesh: &PolyMesh, faces: &[Quant]) -> f64 {
    let bounds = mesh.bounds();
    let origin = 0.5 * (bounds.min + bounds.max);
    let flux: f64 = faces
        .iter()
        .enumerate()
        .filter(|(face_idx, _)| mesh.is_boundary_face(*face_idx))
        .map(|(_, face)| face.meas * (face.center - origin).dot(&face.unitv))
        .sum();
    flux / 3.0
}

/// Compare the computed total volume to a reference value,
/// returning a warning if they differ by more than `tolerance`
/// relative to the larger of the two.
pub(super) fn check_volume(
    computed: f64,
    reference: f64,
    source: VolumeReference,
    tolerance: f64,
) -> Option<BuildWarning> {
    let scale = computed.abs().max(reference.abs());
    ((computed - reference).abs() > tolerance * scale).then_some(BuildWarning::VolumeConsistency {
        computed,
        reference,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mesh::{cartesian_grid, Connectivity},
        quantities::{primal, Degeneracy},
        Vec3,
    };
    use approx::relative_eq;

    #[test]
    fn ties_keep_the_first_id() {
        let info = compute_info([2.0, 1.0, 3.0, 1.0, 3.0], |m| m);
        assert_eq!(info.meas_min, 1.0);
        assert_eq!(info.min_id, 1);
        assert_eq!(info.meas_max, 3.0);
        assert_eq!(info.max_id, 2);
        assert_eq!(info.h_min, 1.0);
        assert_eq!(info.h_max, 3.0);
    }

    #[test]
    fn diameters_follow_the_dimension() {
        let info = compute_info([8.0, 27.0], f64::cbrt);
        assert!(relative_eq!(info.h_min, 2.0));
        assert!(relative_eq!(info.h_max, 3.0));

        let info = compute_info([4.0], f64::sqrt);
        assert_eq!(info.min_id, 0);
        assert_eq!(info.max_id, 0);
        assert_eq!(info.h_min, 2.0);
        assert_eq!(info.h_max, 2.0);
    }

    #[test]
    fn empty_info_is_zero() {
        assert_eq!(compute_info([], f64::sqrt), QuantInfo::default());
    }

    #[test]
    fn flux_volume_of_grid() {
        let mesh = cartesian_grid([3, 2, 2], Vec3::new(0.5, 1.5, 2.0));
        let connect = Connectivity::from_mesh(&mesh).unwrap();
        let degeneracy = Degeneracy {
            ref_len: mesh.bounds().diagonal(),
            tolerance: 1e-12,
            ignore: false,
        };
        let faces = primal::compute_faces(&mesh, &connect, &degeneracy, &mut Vec::new()).unwrap();
        let vol = boundary_flux_volume(&mesh, &faces);
        assert!(relative_eq!(vol, 1.5 * 3.0 * 4.0, epsilon = 1e-12));
    }

    #[test]
    fn flux_volume_flags_missing_cell_volume() {
        let mesh = cartesian_grid([2, 1, 1], Vec3::from_element(1.0));
        let connect = Connectivity::from_mesh(&mesh).unwrap();
        let degeneracy = Degeneracy {
            ref_len: mesh.bounds().diagonal(),
            tolerance: 1e-12,
            ignore: false,
        };
        let faces = primal::compute_faces(&mesh, &connect, &degeneracy, &mut Vec::new()).unwrap();
        let flux_vol = boundary_flux_volume(&mesh, &faces);

        assert!(check_volume(2.0, flux_vol, VolumeReference::BoundaryFlux, 1e-10).is_none());
        // one of the two cells left out of the sum
        match check_volume(1.0, flux_vol, VolumeReference::BoundaryFlux, 1e-10) {
            Some(BuildWarning::VolumeConsistency {
                computed,
                reference,
                source,
            }) => {
                assert_eq!(computed, 1.0);
                assert!(relative_eq!(reference, 2.0, epsilon = 1e-14));
                assert_eq!(source, VolumeReference::BoundaryFlux);
            }
            other => panic!("expected a volume warning, got {other:?}"),
        }
    }

    #[test]
    fn volume_check_is_relative() {
        assert!(check_volume(1.0, 1.0 + 1e-10, VolumeReference::BoundaryFlux, 1e-8).is_none());
        assert!(check_volume(1e6, 1e6 + 1e-3, VolumeReference::BoundaryFlux, 1e-8).is_none());
        assert_eq!(
            check_volume(1.0, 1.1, VolumeReference::BaseQuantities, 1e-8),
            Some(BuildWarning::VolumeConsistency {
                computed: 1.0,
                reference: 1.1,
                source: VolumeReference::BaseQuantities,
            })
        );
    }
}
