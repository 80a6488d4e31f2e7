//! Errors and warnings raised while building CDO quantities.

use std::fmt;

/// Kind of mesh entity an error or warning refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A primal cell.
    Cell,
    /// A primal face.
    Face,
    /// A primal edge.
    Edge,
    /// A primal vertex.
    Vertex,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cell => "cell",
            Self::Face => "face",
            Self::Edge => "edge",
            Self::Vertex => "vertex",
        };
        f.write_str(name)
    }
}

/// Fatal error in building a [`CdoQuantities`][crate::CdoQuantities] bundle.
///
/// Every variant carries the id of the offending entity.
/// A build that returns one of these produces no bundle at all.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum BuildError {
    /// The mesh or its connectivity references entities that don't exist,
    /// or the incidence structure doesn't describe closed polyhedra.
    #[error("Inconsistent topology at {entity} {id}: {reason}")]
    InconsistentTopology {
        /// Kind of the offending entity.
        entity: EntityKind,
        /// Id of the offending entity.
        id: usize,
        /// What is wrong with it.
        reason: String,
    },
    /// A cell, face or edge has a measure below the degeneracy tolerance
    /// and degeneracies were not set to be ignored.
    #[error("Degenerate {entity} {id} (measure {measure:e})")]
    DegenerateEntity {
        /// Kind of the offending entity.
        entity: EntityKind,
        /// Id of the offending entity.
        id: usize,
        /// Measure (volume, area or length) computed for the entity.
        measure: f64,
    },
    /// The orthogonality-optimized cell center didn't converge
    /// and falling back to the barycenter was not allowed.
    #[error("Cell center optimization diverged in cell {cell} after {iterations} iterations (last step {residual:e})")]
    OptimizationDivergence {
        /// Id of the cell whose center didn't converge.
        cell: usize,
        /// Number of iterations performed.
        iterations: usize,
        /// Relative length of the last update step.
        residual: f64,
    },
}

impl BuildError {
    pub(crate) fn topology(entity: EntityKind, id: usize, reason: impl Into<String>) -> Self {
        Self::InconsistentTopology {
            entity,
            id,
            reason: reason.into(),
        }
    }
}

/// Non-fatal condition encountered during a build.
///
/// These are stored in the resulting bundle
/// (see [`CdoQuantities::warnings`][crate::CdoQuantities::warnings])
/// and also emitted through the `log` facade.
#[derive(Clone, Debug, PartialEq)]
pub enum BuildWarning {
    /// The sum of cell volumes disagrees with a reference volume
    /// beyond the configured tolerance.
    VolumeConsistency {
        /// Sum of the cell volumes computed by the builder.
        computed: f64,
        /// The volume it was compared against.
        reference: f64,
        /// Where the reference value came from.
        source: VolumeReference,
    },
    /// A degenerate cell, face or edge was kept because degeneracies are ignored.
    /// Its measure has been recorded as zero.
    IgnoredDegeneracy {
        /// Kind of the degenerate entity.
        entity: EntityKind,
        /// Id of the degenerate entity.
        id: usize,
        /// Measure computed before it was clamped to zero.
        measure: f64,
    },
    /// The orthogonality-optimized center of a cell didn't converge
    /// and the barycenter was used instead.
    OrthogonalityFallback {
        /// Id of the cell.
        cell: usize,
        /// Number of iterations performed before giving up.
        iterations: usize,
    },
}

/// Origin of the reference value in a [`BuildWarning::VolumeConsistency`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolumeReference {
    /// Divergence theorem applied to the boundary faces.
    BoundaryFlux,
    /// Total of the cell volumes given by the base mesh quantities.
    BaseQuantities,
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VolumeConsistency {
                computed,
                reference,
                source,
            } => {
                let source = match source {
                    VolumeReference::BoundaryFlux => "boundary flux",
                    VolumeReference::BaseQuantities => "base mesh quantities",
                };
                write!(
                    f,
                    "total volume {computed:.12e} differs from the {source} volume {reference:.12e}"
                )
            }
            Self::IgnoredDegeneracy {
                entity,
                id,
                measure,
            } => write!(f, "ignoring degenerate {entity} {id} (measure {measure:e})"),
            Self::OrthogonalityFallback { cell, iterations } => write!(
                f,
                "cell {cell}: orthogonal center not converged after {iterations} iterations, using barycenter"
            ),
        }
    }
}
