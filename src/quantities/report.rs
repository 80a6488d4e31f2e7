use itertools::izip;

use std::{fmt, io};

use super::{CdoQuantities, QuantInfo};

/// Human-readable overview of a [`CdoQuantities`] bundle,
/// created with [`CdoQuantities::summary`].
#[derive(Clone, Copy, Debug)]
pub struct Summary<'a> {
    quant: &'a CdoQuantities,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.quant;
        writeln!(f, "CDO quantities (cell centers: {})", q.cc_algo)?;
        writeln!(
            f,
            "  {} cells ({} orthogonal), {} faces ({} interior, {} boundary), {} edges, {} vertices",
            q.n_cells(),
            q.orthogonal_cells.count_ones(..),
            q.n_faces(),
            q.n_i_faces,
            q.n_b_faces,
            q.n_edges(),
            q.n_vertices(),
        )?;
        writeln!(f, "  total volume {:.12e}", q.vol_tot)?;
        writeln!(
            f,
            "  {:<6} {:>13} {:>8} {:>13} {:>8} {:>13} {:>13}",
            "", "min", "id", "max", "id", "h_min", "h_max"
        )?;
        write_info_row(f, "cell", &q.cell_info)?;
        write_info_row(f, "face", &q.face_info)?;
        write_info_row(f, "edge", &q.edge_info)?;
        if !q.warnings.is_empty() {
            writeln!(f, "  {} warning(s)", q.warnings.len())?;
        }
        Ok(())
    }
}

fn write_info_row(f: &mut fmt::Formatter<'_>, label: &str, info: &QuantInfo) -> fmt::Result {
    writeln!(
        f,
        "  {:<6} {:>13.6e} {:>8} {:>13.6e} {:>8} {:>13.6e} {:>13.6e}",
        label, info.meas_min, info.min_id, info.meas_max, info.max_id, info.h_min, info.h_max
    )
}

impl CdoQuantities {
    /// Get a summary of the quantities: entity counts, total volume
    /// and the extent of cell, face and edge measures.
    ///
    /// The summary implements `Display`.
    /// ```
    /// # use cdo_quantities::{mesh::unit_cube, BuildOptions, CdoQuantities, Connectivity};
    /// # let mesh = unit_cube();
    /// # let connect = Connectivity::from_mesh(&mesh)?;
    /// let quant = CdoQuantities::build(&mesh, None, &connect, &BuildOptions::default())?;
    /// println!("{}", quant.summary());
    /// # Ok::<(), cdo_quantities::BuildError>(())
    /// ```
    pub fn summary(&self) -> Summary<'_> {
        Summary { quant: self }
    }

    /// Emit the summary through the `log` facade at info level, one line per record.
    pub fn log_summary(&self) {
        for line in self.summary().to_string().lines() {
            log::info!("{line}");
        }
    }

    /// Write every computed quantity, entity by entity.
    pub fn dump<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self.summary())?;
        for warning in &self.warnings {
            writeln!(out, "warning: {warning}")?;
        }

        writeln!(out, "\n# cells: volume | center | orthogonal")?;
        for (cell_idx, (vol, center)) in izip!(&self.cell_vol, &self.cell_centers).enumerate() {
            writeln!(
                out,
                "c{cell_idx:<8} {vol:>13.6e} | {:>13.6e} {:>13.6e} {:>13.6e} | {}",
                center.x,
                center.y,
                center.z,
                self.is_orthogonal(cell_idx),
            )?;
        }

        writeln!(out, "\n# faces: area | unit normal | center")?;
        for (face_idx, face) in self.face.iter().enumerate() {
            writeln!(out, "f{face_idx:<8} {face}")?;
        }

        writeln!(out, "\n# edges: length | unit tangent | center")?;
        for (edge_idx, edge) in self.edge.iter().enumerate() {
            writeln!(out, "e{edge_idx:<8} {edge}")?;
        }

        writeln!(out, "\n# dual edges, per cell in face order: length | unit vector")?;
        for cell_idx in 0..self.n_cells() {
            writeln!(out, "c{cell_idx}")?;
            for dedge in self.cell_dual_edges(cell_idx) {
                writeln!(
                    out,
                    "  {:>13.6e} | {:>13.6e} {:>13.6e} {:>13.6e}",
                    dedge.meas, dedge.unitv.x, dedge.unitv.y, dedge.unitv.z
                )?;
            }
        }

        writeln!(out, "\n# dual faces, per cell in edge order: faces | areas | vector")?;
        for cell_idx in 0..self.n_cells() {
            writeln!(out, "c{cell_idx}")?;
            for dface in self.cell_dual_faces(cell_idx) {
                let [f0, f1] = dface.parent_id;
                writeln!(
                    out,
                    "  f{f0:<6} f{f1:<6} | {:>13.6e} {:>13.6e} | {:>13.6e} {:>13.6e} {:>13.6e}",
                    dface.sface[0].meas,
                    dface.sface[1].meas,
                    dface.vect.x,
                    dface.vect.y,
                    dface.vect.z,
                )?;
            }
        }

        writeln!(out, "\n# dual volumes")?;
        for (vert_idx, vol) in self.dcell_vol.iter().enumerate() {
            writeln!(out, "v{vert_idx:<8} {vol:>13.6e}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        mesh::{cartesian_grid, unit_cube},
        BuildOptions, CdoQuantities, Connectivity, Vec3,
    };

    #[test]
    fn summary_lists_counts_and_extremes() {
        let mesh = cartesian_grid([2, 1, 1], Vec3::new(1.0, 2.0, 3.0));
        let connect = Connectivity::from_mesh(&mesh).unwrap();
        let quant = CdoQuantities::build(&mesh, None, &connect, &BuildOptions::default()).unwrap();
        let summary = quant.summary().to_string();

        assert!(summary.contains("2 cells (2 orthogonal)"));
        assert!(summary.contains("11 faces (1 interior, 10 boundary)"));
        assert!(summary.contains("20 edges, 12 vertices"));
        assert!(summary.contains("total volume 1.200000000000e1"));
        assert_eq!(summary.lines().count(), 7);
        assert!(!summary.contains("warning"));
    }

    #[test]
    fn dump_has_a_line_per_entity() {
        let mesh = unit_cube();
        let connect = Connectivity::from_mesh(&mesh).unwrap();
        let quant = CdoQuantities::build(&mesh, None, &connect, &BuildOptions::default()).unwrap();

        let mut out = Vec::new();
        quant.dump(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let count_prefixed = |prefix: &str| text.lines().filter(|l| l.starts_with(prefix)).count();
        // one cell line plus the headers of the per-cell dual sections
        assert_eq!(count_prefixed("c"), 3);
        assert_eq!(count_prefixed("f"), 6);
        assert_eq!(count_prefixed("e"), 12);
        assert_eq!(count_prefixed("v"), 8);
        // six indented summary lines, 6 dual edges and 12 dual faces
        assert_eq!(count_prefixed("  "), 6 + 6 + 12);
    }
}
