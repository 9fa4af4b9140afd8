//! VTK output of the oil concentration.
//!
//! Writes VTU (XML UnstructuredGrid) files for ParaView and other
//! VTK-compatible tools. Only the triangles are written; the boundary lines
//! carry no oil. Each triangle becomes one VTK_TRIANGLE with cell data
//! `oil` (concentration) and `cell_id` (index in the mesh).
//!
//! # Example
//!
//! ```ignore
//! use oil_spill::io::write_vtk_series;
//!
//! let path = write_vtk_series("output/oil.vtu", frame.step, &mesh, frame.state, frame.time)?;
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::mesh::{Mesh, Point2};

/// VTK cell type code for a 3-node triangle.
const VTK_TRIANGLE: u8 = 5;

/// Error type for VTK operations.
#[derive(Debug, Error)]
pub enum VtkError {
    /// I/O error during file operations.
    #[error("VTK I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The state does not match the mesh.
    #[error("state has {found} values, mesh has {expected} cells")]
    StateSize { expected: usize, found: usize },
}

/// VTK XML writer helper.
struct VtkWriter<W: Write> {
    writer: BufWriter<W>,
    indent: usize,
}

impl<W: Write> VtkWriter<W> {
    fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            indent: 0,
        }
    }

    fn write_indent(&mut self) -> std::io::Result<()> {
        for _ in 0..self.indent {
            write!(self.writer, "  ")?;
        }
        Ok(())
    }

    fn write_header(&mut self) -> std::io::Result<()> {
        writeln!(self.writer, "<?xml version=\"1.0\"?>")?;
        writeln!(
            self.writer,
            "<VTKFile type=\"UnstructuredGrid\" version=\"0.1\" byte_order=\"LittleEndian\">"
        )?;
        self.indent += 1;
        Ok(())
    }

    fn write_footer(&mut self) -> std::io::Result<()> {
        self.indent -= 1;
        writeln!(self.writer, "</VTKFile>")?;
        self.writer.flush()?;
        Ok(())
    }

    fn start_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> std::io::Result<()> {
        self.write_indent()?;
        write!(self.writer, "<{}", name)?;
        for (key, value) in attrs {
            write!(self.writer, " {}=\"{}\"", key, value)?;
        }
        writeln!(self.writer, ">")?;
        self.indent += 1;
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> std::io::Result<()> {
        self.indent -= 1;
        self.write_indent()?;
        writeln!(self.writer, "</{}>", name)?;
        Ok(())
    }

    /// Write a single-component DataArray, `per_line` values per row.
    fn write_data_array<T: std::fmt::Display>(
        &mut self,
        vtk_type: &str,
        name: &str,
        data: &[T],
        per_line: usize,
    ) -> std::io::Result<()> {
        self.write_indent()?;
        writeln!(
            self.writer,
            "<DataArray type=\"{}\" Name=\"{}\" format=\"ascii\">",
            vtk_type, name
        )?;

        self.indent += 1;
        for chunk in data.chunks(per_line) {
            self.write_indent()?;
            let row: Vec<String> = chunk.iter().map(|v| v.to_string()).collect();
            writeln!(self.writer, "{}", row.join(" "))?;
        }
        self.indent -= 1;

        self.write_indent()?;
        writeln!(self.writer, "</DataArray>")?;
        Ok(())
    }

    fn write_data_array_f64(&mut self, name: &str, data: &[f64]) -> std::io::Result<()> {
        let formatted: Vec<String> = data.iter().map(|v| format!("{:.10e}", v)).collect();
        self.write_data_array("Float64", name, &formatted, 6)
    }

    fn write_points(&mut self, points: &[Point2]) -> std::io::Result<()> {
        self.start_element("Points", &[])?;

        self.write_indent()?;
        writeln!(
            self.writer,
            "<DataArray type=\"Float64\" NumberOfComponents=\"3\" format=\"ascii\">"
        )?;

        self.indent += 1;
        for chunk in points.chunks(2) {
            self.write_indent()?;
            let row: Vec<String> = chunk
                .iter()
                .map(|p| format!("{:.10e} {:.10e} 0.0", p[0], p[1]))
                .collect();
            writeln!(self.writer, "{}", row.join(" "))?;
        }
        self.indent -= 1;

        self.write_indent()?;
        writeln!(self.writer, "</DataArray>")?;

        self.end_element("Points")?;
        Ok(())
    }

    fn write_triangles(&mut self, triangles: &[[usize; 3]]) -> std::io::Result<()> {
        self.start_element("Cells", &[])?;

        let connectivity: Vec<usize> = triangles.iter().flatten().copied().collect();
        self.write_data_array("Int64", "connectivity", &connectivity, 18)?;

        // Cumulative vertex count
        let offsets: Vec<usize> = (1..=triangles.len()).map(|i| i * 3).collect();
        self.write_data_array("Int64", "offsets", &offsets, 20)?;

        let types = vec![VTK_TRIANGLE; triangles.len()];
        self.write_data_array("UInt8", "types", &types, 20)?;

        self.end_element("Cells")?;
        Ok(())
    }

    fn write_field_data(&mut self, name: &str, value: f64) -> std::io::Result<()> {
        self.start_element("FieldData", &[])?;
        self.write_indent()?;
        writeln!(
            self.writer,
            "<DataArray type=\"Float64\" Name=\"{}\" NumberOfTuples=\"1\" format=\"ascii\">",
            name
        )?;
        self.indent += 1;
        self.write_indent()?;
        writeln!(self.writer, "{:.10e}", value)?;
        self.indent -= 1;
        self.write_indent()?;
        writeln!(self.writer, "</DataArray>")?;
        self.end_element("FieldData")?;
        Ok(())
    }
}

/// Write the concentration on every triangle as VTU to any writer.
pub fn write_vtu<W: Write>(
    writer: W,
    mesh: &Mesh,
    state: &[f64],
    time: f64,
) -> Result<(), VtkError> {
    if state.len() != mesh.n_cells() {
        return Err(VtkError::StateSize {
            expected: mesh.n_cells(),
            found: state.len(),
        });
    }

    let mut triangles = Vec::with_capacity(mesh.n_triangles());
    let mut oil = Vec::with_capacity(mesh.n_triangles());
    let mut cell_ids = Vec::with_capacity(mesh.n_triangles());
    for tri in mesh.triangles() {
        let [p0, p1, p2] = tri.point_ids() else {
            continue;
        };
        triangles.push([*p0, *p1, *p2]);
        oil.push(state[tri.index().get()]);
        cell_ids.push(tri.index().get());
    }

    let mut writer = VtkWriter::new(writer);
    writer.write_header()?;
    writer.start_element("UnstructuredGrid", &[])?;
    writer.write_field_data("TimeValue", time)?;
    writer.start_element(
        "Piece",
        &[
            ("NumberOfPoints", &mesh.n_points().to_string()),
            ("NumberOfCells", &triangles.len().to_string()),
        ],
    )?;

    writer.write_points(mesh.points())?;
    writer.write_triangles(&triangles)?;

    writer.start_element("CellData", &[("Scalars", "oil")])?;
    writer.write_data_array_f64("oil", &oil)?;
    writer.write_data_array("Int64", "cell_id", &cell_ids, 20)?;
    writer.end_element("CellData")?;

    writer.end_element("Piece")?;
    writer.end_element("UnstructuredGrid")?;
    writer.write_footer()?;
    Ok(())
}

/// Write the concentration to a VTU file.
pub fn write_vtk_frame(
    path: impl AsRef<Path>,
    mesh: &Mesh,
    state: &[f64],
    time: f64,
) -> Result<(), VtkError> {
    let file = File::create(path)?;
    write_vtu(file, mesh, state, time)
}

/// Write a numbered frame of a series: `base.vtu` becomes `base_0042.vtu`.
///
/// The parent directory is created if needed.
///
/// # Returns
/// The path of the written file.
pub fn write_vtk_series(
    base_path: impl AsRef<Path>,
    frame: usize,
    mesh: &Mesh,
    state: &[f64],
    time: f64,
) -> Result<PathBuf, VtkError> {
    let base = base_path.as_ref();
    let stem = base.file_stem().unwrap_or_default().to_string_lossy();
    let parent = base.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(parent)?;

    let path = parent.join(format!("{}_{:04}.vtu", stem, frame));
    write_vtk_frame(&path, mesh, state, time)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::velocity::UniformVelocity;
    use tempfile::tempdir;

    fn two_triangles() -> Mesh {
        Mesh::from_triangles(
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            &[[0, 1, 2], [0, 2, 3]],
            &[[0, 1]],
            &UniformVelocity::zero(),
        )
        .unwrap()
    }

    #[test]
    fn test_write_vtu_contents() {
        let mesh = two_triangles();
        let mut buf = Vec::new();
        write_vtu(&mut buf, &mesh, &[0.0, 0.25, 0.75], 1.5).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("<?xml"));
        assert!(text.contains("NumberOfPoints=\"4\""));
        assert!(text.contains("NumberOfCells=\"2\""));
        assert!(text.contains("Name=\"oil\""));
        assert!(text.contains("Name=\"TimeValue\""));
        assert!(text.contains("2.5000000000e-1"));
        assert!(text.contains("0 1 2 0 2 3"));
        // Line cell 0 is not written
        assert!(text.contains("Name=\"cell_id\""));
        assert!(!text.contains("0 1 2\n"));
        assert!(text.trim_end().ends_with("</VTKFile>"));
    }

    #[test]
    fn test_state_size_mismatch() {
        let mesh = two_triangles();
        let err = write_vtu(Vec::new(), &mesh, &[1.0], 0.0).unwrap_err();
        assert!(matches!(err, VtkError::StateSize { expected: 3, found: 1 }));
    }

    #[test]
    fn test_write_vtk_series_naming() {
        let dir = tempdir().unwrap();
        let mesh = two_triangles();

        let base = dir.path().join("frames").join("oil.vtu");
        let path = write_vtk_series(&base, 7, &mesh, &[0.0, 1.0, 1.0], 0.7).unwrap();

        assert_eq!(path, dir.path().join("frames").join("oil_0007.vtu"));
        assert!(path.exists());
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("UnstructuredGrid"));
    }
}
