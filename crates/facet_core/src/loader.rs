//! Mesh text format parser.
//!
//! One directive per line:
//!
//! - `o <name>`: object name, at most once per file
//! - `v <x> <y> <z>`: vertex position
//! - `f <i> <j> <k>`: triangle over 1-based vertex indices
//! - `# ...`: comment to end of line
//!
//! Anything else (smoothing groups, texture coordinates, materials) is rejected.

use std::path::Path;

use facet_math::Vec3;
use thiserror::Error;

use crate::index::IndexConfig;
use crate::mesh::{Material, Mesh};
use crate::triangle::Face;

/// Errors that can occur while loading a mesh.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid number format: {0}")]
    InvalidNumber(String),

    #[error("Unsupported directive `{directive}` at line {line}")]
    UnsupportedDirective { line: usize, directive: String },

    #[error("Second object declared at line {line}; only one is allowed per file")]
    DuplicateObject { line: usize },

    #[error("Face at line {line} references vertex {index}, but the mesh has {vertex_count}")]
    FaceIndexOutOfRange {
        line: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("Face {face} is invalid: {message}")]
    InvalidFace { face: usize, message: String },
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Raw geometry read from a mesh file, before normals and index are built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedMesh {
    /// Name from the `o` directive, if any
    pub name: Option<String>,
    pub vertices: Vec<Vec3>,
    /// Faces with 0-based vertex indices
    pub faces: Vec<Face>,
}

/// Parse mesh text. Face indices are checked against the final vertex count.
pub fn parse_mesh(content: &str) -> LoadResult<ParsedMesh> {
    let mut parsed = ParsedMesh::default();
    let mut face_lines = Vec::new();

    for (i, raw) in content.lines().enumerate() {
        let line = i + 1;
        let text = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        let mut tokens = text.split_whitespace();
        let Some(directive) = tokens.next() else {
            continue;
        };
        let args: Vec<&str> = tokens.collect();

        match directive {
            "o" => {
                if parsed.name.is_some() {
                    return Err(LoadError::DuplicateObject { line });
                }
                if args.is_empty() {
                    return Err(LoadError::Parse {
                        line,
                        message: "object directive needs a name".to_string(),
                    });
                }
                parsed.name = Some(args.join(" "));
            }
            "v" => {
                let [x, y, z] = three_args(line, "vertex", &args)?;
                let vertex = Vec3::new(parse_float(x)?, parse_float(y)?, parse_float(z)?);
                parsed.vertices.push(vertex);
            }
            "f" => {
                let [a, b, c] = three_args(line, "face", &args)?;
                let face = Face::new(
                    parse_index(line, a)?,
                    parse_index(line, b)?,
                    parse_index(line, c)?,
                );
                parsed.faces.push(face);
                face_lines.push(line);
            }
            other => {
                return Err(LoadError::UnsupportedDirective {
                    line,
                    directive: other.to_string(),
                });
            }
        }
    }

    let vertex_count = parsed.vertices.len();
    for (face, &line) in parsed.faces.iter().zip(&face_lines) {
        if let Some(&index) = face.vertices().iter().find(|&&v| v as usize >= vertex_count) {
            return Err(LoadError::FaceIndexOutOfRange {
                line,
                index: index + 1,
                vertex_count,
            });
        }
    }

    Ok(parsed)
}

fn three_args<'a>(line: usize, what: &str, args: &[&'a str]) -> LoadResult<[&'a str; 3]> {
    match args {
        &[a, b, c] => Ok([a, b, c]),
        _ => Err(LoadError::Parse {
            line,
            message: format!("{what} needs exactly 3 values, found {}", args.len()),
        }),
    }
}

fn parse_float(token: &str) -> LoadResult<f32> {
    match token.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(LoadError::InvalidNumber(token.to_string())),
    }
}

/// 1-based vertex reference to a 0-based index.
fn parse_index(line: usize, token: &str) -> LoadResult<u32> {
    let index = token
        .parse::<u32>()
        .map_err(|_| LoadError::InvalidNumber(token.to_string()))?;
    if index == 0 {
        return Err(LoadError::FaceIndexOutOfRange {
            line,
            index,
            vertex_count: 0,
        });
    }
    Ok(index - 1)
}

impl Mesh {
    /// Load a mesh file with a single-colour white palette.
    ///
    /// The mesh is named after its `o` directive, or the file stem without one.
    pub fn load<P: AsRef<Path>>(
        path: P,
        material: Material,
        config: &IndexConfig,
    ) -> LoadResult<Mesh> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let parsed = parse_mesh(&content)?;

        log::info!(
            "Parsed {} vertices and {} faces from {}",
            parsed.vertices.len(),
            parsed.faces.len(),
            path.display()
        );

        let name = parsed.name.unwrap_or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        let mesh = Mesh::new(parsed.vertices, parsed.faces, vec![Vec3::ONE], material, config)?;
        Ok(mesh.with_name(name))
    }

    /// Build a mesh from in-memory mesh text (useful for testing).
    pub fn parse_str(content: &str, material: Material, config: &IndexConfig) -> LoadResult<Mesh> {
        let parsed = parse_mesh(content)?;
        let mesh = Mesh::new(parsed.vertices, parsed.faces, vec![Vec3::ONE], material, config)?;
        Ok(match parsed.name {
            Some(name) => mesh.with_name(name),
            None => mesh,
        })
    }
}
