//! Gmsh mesh file input.
//!
//! Reads Gmsh MSH ASCII files in format 2.2 and 4.1 into raw point
//! coordinates and element blocks, which [`Mesh::build`] turns into cells.
//!
//! ## Element Types
//! - 1 = Line (2-node, boundary edges)
//! - 2 = Triangle (3-node)
//! - 3 = Quadrilateral (skipped)
//! - 15 = Point (skipped)
//!
//! Node tags are mapped to 0-based point indices in file order; the z
//! coordinate is dropped.
//!
//! ## Example
//! ```no_run
//! use oil_spill::mesh::gmsh::load_mesh;
//! use oil_spill::velocity::BayCurrent;
//! use std::path::Path;
//!
//! let mesh = load_mesh(Path::new("bay.msh"), &BayCurrent).expect("Failed to read mesh");
//! println!("{} triangles", mesh.n_triangles());
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use log::info;
use thiserror::Error;

use crate::error::TransportError;
use crate::mesh::geometry::Point2;
use crate::mesh::topology::{ElementBlock, ElementKind, Mesh};
use crate::velocity::VelocityField;

/// Error type for Gmsh input.
#[derive(Debug, Error)]
pub enum GmshError {
    /// File could not be read.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid file contents.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Unsupported mesh format version.
    #[error("Unsupported Gmsh version: {0}")]
    UnsupportedVersion(String),

    /// Binary MSH files are not read.
    #[error("Binary Gmsh files are not supported")]
    BinaryFormat,

    /// Missing required section.
    #[error("Missing section: {0}")]
    MissingSection(String),

    /// An element references a node tag that was never defined.
    #[error("Element references unknown node tag {0}")]
    UnknownNode(usize),

    /// The file parsed but does not form a valid mesh.
    #[error(transparent)]
    Mesh(#[from] TransportError),
}

/// Points and element blocks read from a mesh file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub points: Vec<Point2>,
    pub blocks: Vec<ElementBlock>,
}

impl MeshData {
    /// Build cells and adjacency from the raw data.
    pub fn into_mesh(self, velocity: &dyn VelocityField) -> Result<Mesh, TransportError> {
        Mesh::build(self.points, &self.blocks, velocity)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MshVersion {
    V2,
    V4,
}

fn element_kind(code: i32) -> ElementKind {
    match code {
        1 => ElementKind::Line,
        2 => ElementKind::Triangle,
        3 => ElementKind::Quad,
        15 => ElementKind::Vertex,
        other => ElementKind::Other(other),
    }
}

/// Read a Gmsh file and build a [`Mesh`], sampling `velocity` at every
/// triangle centroid.
pub fn load_mesh(path: &Path, velocity: &dyn VelocityField) -> Result<Mesh, GmshError> {
    let data = read_gmsh(path)?;
    let mesh = data.into_mesh(velocity)?;
    info!(
        "Loaded mesh {}: {} points, {} triangles, {} lines",
        path.display(),
        mesh.n_points(),
        mesh.n_triangles(),
        mesh.n_lines()
    );
    Ok(mesh)
}

/// Read a Gmsh MSH file (format 2.2 or 4.1, ASCII).
///
/// # Arguments
/// * `path` - Path to the MSH file
///
/// # Returns
/// * `Ok(MeshData)` - Points and element blocks in file order
/// * `Err(GmshError)` - If reading or parsing fails
pub fn read_gmsh(path: &Path) -> Result<MeshData, GmshError> {
    let file = File::open(path)?;
    parse_gmsh(BufReader::new(file))
}

/// Parse MSH contents from any buffered reader.
pub fn parse_gmsh<R: BufRead>(reader: R) -> Result<MeshData, GmshError> {
    let mut lines = reader.lines();
    let mut version = None;
    let mut nodes: Option<(Vec<Point2>, HashMap<usize, usize>)> = None;
    let mut raw_blocks: Vec<(i32, Vec<Vec<usize>>)> = Vec::new();
    let mut have_elements = false;

    // Parse sections
    while let Some(line_result) = lines.next() {
        let line = line_result?;
        let line = line.trim();

        if line.starts_with("$MeshFormat") {
            version = Some(parse_mesh_format(&mut lines)?);
        } else if line.starts_with("$Nodes") {
            let v = version.ok_or_else(|| GmshError::MissingSection("MeshFormat".to_string()))?;
            nodes = Some(match v {
                MshVersion::V2 => parse_nodes_v2(&mut lines)?,
                MshVersion::V4 => parse_nodes_v4(&mut lines)?,
            });
        } else if line.starts_with("$Elements") {
            let v = version.ok_or_else(|| GmshError::MissingSection("MeshFormat".to_string()))?;
            raw_blocks = match v {
                MshVersion::V2 => parse_elements_v2(&mut lines)?,
                MshVersion::V4 => parse_elements_v4(&mut lines)?,
            };
            have_elements = true;
        } else if let Some(name) = line.strip_prefix('$')
            && !name.starts_with("End")
        {
            // $Entities, $PhysicalNames, ...
            skip_section(&mut lines, name)?;
        }
    }

    let (points, tag_to_index) =
        nodes.ok_or_else(|| GmshError::MissingSection("Nodes".to_string()))?;
    if !have_elements {
        return Err(GmshError::MissingSection("Elements".to_string()));
    }

    let mut blocks = Vec::with_capacity(raw_blocks.len());
    for (code, elements) in raw_blocks {
        let connectivity = elements
            .into_iter()
            .map(|tags| {
                tags.into_iter()
                    .map(|tag| {
                        tag_to_index
                            .get(&tag)
                            .copied()
                            .ok_or(GmshError::UnknownNode(tag))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        blocks.push(ElementBlock::new(element_kind(code), connectivity));
    }

    Ok(MeshData { points, blocks })
}

/// Parse the $MeshFormat section.
fn parse_mesh_format<I>(lines: &mut I) -> Result<MshVersion, GmshError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let line = next_line(lines, "MeshFormat")?;
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.is_empty() {
        return Err(GmshError::ParseError("Empty MeshFormat line".to_string()));
    }

    let version = if parts[0].starts_with("2.") {
        MshVersion::V2
    } else if parts[0].starts_with("4.") {
        MshVersion::V4
    } else {
        return Err(GmshError::UnsupportedVersion(parts[0].to_string()));
    };

    if parts.get(1) == Some(&"1") {
        return Err(GmshError::BinaryFormat);
    }

    skip_section(lines, "MeshFormat")?;
    Ok(version)
}

/// Parse the $Nodes section (format 2.2): `node_id x y z` per line.
fn parse_nodes_v2<I>(lines: &mut I) -> Result<(Vec<Point2>, HashMap<usize, usize>), GmshError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let header = next_line(lines, "Nodes")?;
    let n_nodes: usize = parse_field(header.trim(), "node count")?;

    let mut points = Vec::with_capacity(n_nodes);
    let mut tag_to_index = HashMap::with_capacity(n_nodes);

    for _ in 0..n_nodes {
        let line = next_line(lines, "Nodes")?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            return Err(GmshError::ParseError(format!("Invalid node line: {}", line)));
        }
        let tag: usize = parse_field(parts[0], "node tag")?;
        let x: f64 = parse_field(parts[1], "x coordinate")?;
        let y: f64 = parse_field(parts[2], "y coordinate")?;

        tag_to_index.insert(tag, points.len());
        points.push([x, y]);
    }

    skip_section(lines, "Nodes")?;
    Ok((points, tag_to_index))
}

/// Parse the $Nodes section (format 4.1).
///
/// Nodes come in entity blocks: a block header, then all node tags, then
/// all coordinates.
fn parse_nodes_v4<I>(lines: &mut I) -> Result<(Vec<Point2>, HashMap<usize, usize>), GmshError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let header = next_line(lines, "Nodes")?;
    let counts = parse_fields::<usize>(&header, "Nodes header")?;
    let [n_blocks, n_nodes, ..] = counts[..] else {
        return Err(GmshError::ParseError(format!("Invalid Nodes header: {}", header)));
    };

    let mut points = Vec::with_capacity(n_nodes);
    let mut tag_to_index = HashMap::with_capacity(n_nodes);

    for _ in 0..n_blocks {
        let block_header = next_line(lines, "Nodes")?;
        let fields = parse_fields::<usize>(&block_header, "node block header")?;
        let [_dim, _entity, parametric, n_in_block] = fields[..] else {
            return Err(GmshError::ParseError(format!(
                "Invalid node block header: {}",
                block_header
            )));
        };
        if parametric != 0 {
            return Err(GmshError::ParseError(
                "Parametric node coordinates are not supported".to_string(),
            ));
        }

        let mut tags = Vec::with_capacity(n_in_block);
        for _ in 0..n_in_block {
            let line = next_line(lines, "Nodes")?;
            tags.push(parse_field::<usize>(line.trim(), "node tag")?);
        }
        for tag in tags {
            let line = next_line(lines, "Nodes")?;
            let coords = parse_fields::<f64>(&line, "node coordinates")?;
            let [x, y, ..] = coords[..] else {
                return Err(GmshError::ParseError(format!("Invalid node line: {}", line)));
            };
            tag_to_index.insert(tag, points.len());
            points.push([x, y]);
        }
    }

    skip_section(lines, "Nodes")?;
    Ok((points, tag_to_index))
}

/// Parse the $Elements section (format 2.2).
///
/// Format: `elem_id elem_type n_tags tag1 ... tagN node1 node2 ...`.
/// Consecutive elements of the same type form one block.
fn parse_elements_v2<I>(lines: &mut I) -> Result<Vec<(i32, Vec<Vec<usize>>)>, GmshError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let header = next_line(lines, "Elements")?;
    let n_elements: usize = parse_field(header.trim(), "element count")?;

    let mut blocks: Vec<(i32, Vec<Vec<usize>>)> = Vec::new();

    for _ in 0..n_elements {
        let line = next_line(lines, "Elements")?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            return Err(GmshError::ParseError(format!("Invalid element line: {}", line)));
        }

        let elem_type: i32 = parse_field(parts[1], "element type")?;
        let n_tags: usize = parse_field(parts[2], "tag count")?;
        let node_start = 3 + n_tags;
        if parts.len() <= node_start {
            return Err(GmshError::ParseError(format!(
                "Element without nodes: {}",
                line
            )));
        }

        let nodes = parts[node_start..]
            .iter()
            .map(|s| parse_field::<usize>(s, "node tag"))
            .collect::<Result<Vec<_>, _>>()?;

        match blocks.last_mut() {
            Some((code, elements)) if *code == elem_type => elements.push(nodes),
            _ => blocks.push((elem_type, vec![nodes])),
        }
    }

    skip_section(lines, "Elements")?;
    Ok(blocks)
}

/// Parse the $Elements section (format 4.1): one block per entity.
fn parse_elements_v4<I>(lines: &mut I) -> Result<Vec<(i32, Vec<Vec<usize>>)>, GmshError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let header = next_line(lines, "Elements")?;
    let counts = parse_fields::<usize>(&header, "Elements header")?;
    let Some(&n_blocks) = counts.first() else {
        return Err(GmshError::ParseError("Empty Elements header".to_string()));
    };

    let mut blocks = Vec::with_capacity(n_blocks);

    for _ in 0..n_blocks {
        let block_header = next_line(lines, "Elements")?;
        let fields = parse_fields::<i64>(&block_header, "element block header")?;
        let [_dim, _entity, elem_type, n_in_block] = fields[..] else {
            return Err(GmshError::ParseError(format!(
                "Invalid element block header: {}",
                block_header
            )));
        };
        let n_in_block = usize::try_from(n_in_block).map_err(|_| {
            GmshError::ParseError(format!("Invalid element count: {}", n_in_block))
        })?;

        let mut elements = Vec::with_capacity(n_in_block);
        for _ in 0..n_in_block {
            let line = next_line(lines, "Elements")?;
            let tags = parse_fields::<usize>(&line, "element line")?;
            if tags.len() < 2 {
                return Err(GmshError::ParseError(format!("Invalid element line: {}", line)));
            }
            // Leading element tag, then node tags
            elements.push(tags[1..].to_vec());
        }

        let code = i32::try_from(elem_type)
            .map_err(|_| GmshError::ParseError(format!("Invalid element type: {}", elem_type)))?;
        blocks.push((code, elements));
    }

    skip_section(lines, "Elements")?;
    Ok(blocks)
}

/// Next non-empty line, or a parse error naming the truncated section.
fn next_line<I>(lines: &mut I, section: &str) -> Result<String, GmshError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    for line_result in lines.by_ref() {
        let line = line_result?;
        if !line.trim().is_empty() {
            return Ok(line);
        }
    }
    Err(GmshError::ParseError(format!(
        "Unexpected end of file in {} section",
        section
    )))
}

/// Skip to the end of the named section.
fn skip_section<I>(lines: &mut I, section: &str) -> Result<(), GmshError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let end = format!("$End{}", section);
    for line_result in lines.by_ref() {
        let line = line_result?;
        if line.trim().starts_with(&end) {
            return Ok(());
        }
    }
    Err(GmshError::MissingSection(end))
}

fn parse_field<T: FromStr>(s: &str, what: &str) -> Result<T, GmshError> {
    s.parse()
        .map_err(|_| GmshError::ParseError(format!("Invalid {}: {}", what, s)))
}

fn parse_fields<T: FromStr>(line: &str, what: &str) -> Result<Vec<T>, GmshError> {
    line.split_whitespace()
        .map(|s| parse_field(s, what))
        .collect()
}
