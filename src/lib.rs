//! Geometric quantities for Compatible Discrete Operator (CDO) schemes.
//!
//! Given a polyhedral mesh ([`PolyMesh`]) and its incidence structure
//! ([`Connectivity`]), [`CdoQuantities::build`] derives every primal and dual
//! geometric entity a CDO discretization needs:
//! face and edge vectors, cell volumes and centers,
//! dual edges, dual faces and dual (vertex) volumes,
//! together with min/max statistics used for mesh quality diagnostics.
//!
//! ```
//! # use cdo_quantities::{mesh::unit_cube, BuildOptions, CdoQuantities, CellCenterAlgo, Connectivity};
//! let mesh = unit_cube();
//! let connect = Connectivity::from_mesh(&mesh)?;
//! let quant = CdoQuantities::build(
//!     &mesh,
//!     None,
//!     &connect,
//!     &BuildOptions::default().with_cc_algo(CellCenterAlgo::VertexMean),
//! )?;
//! assert!((quant.vol_tot() - 1.0).abs() < 1e-12);
//! # Ok::<(), cdo_quantities::BuildError>(())
//! ```

#![warn(missing_docs)]

pub mod mesh;
#[doc(inline)]
pub use mesh::{BaseQuantities, BoundingBox, Connectivity, PolyMesh};

pub mod error;
#[doc(inline)]
pub use error::{BuildError, BuildWarning, EntityKind};

pub mod quantities;
#[doc(inline)]
pub use quantities::{
    BuildOptions, CdoQuantities, CellCenterAlgo, DualFace, NVec3, OrthoParams, Quant, QuantInfo,
    Summary,
};

// nalgebra re-exports of common types for convenience

pub use nalgebra as na;
/// Type alias for a 3D `nalgebra` vector.
pub type Vec3 = na::Vector3<f64>;
/// Type alias for a 3D `nalgebra` unit vector.
pub type UnitVec3 = na::Unit<Vec3>;
