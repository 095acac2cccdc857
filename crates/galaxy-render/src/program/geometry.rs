//! Static full-screen quad

use tracing::debug;

use super::ShaderProgram;
use crate::error::GalaxyError;

/// Clip-space corners, drawn as a four-vertex triangle strip
pub const QUAD_POSITIONS: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]];

/// Surface coordinates matching [`QUAD_POSITIONS`], origin bottom-left
pub const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];

/// Number of vertices drawn per frame
pub const QUAD_VERTEX_COUNT: u32 = 4;

/// One quad attribute wired to a program input location
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeBinding {
    pub name: &'static str,
    pub location: u32,
    pub data: &'static [[f32; 2]; 4],
}

/// Attributes the quad can supply, by name
const QUAD_ATTRIBUTES: [(&str, &[[f32; 2]; 4]); 2] = [("position", &QUAD_POSITIONS), ("uv", &QUAD_UVS)];

/// Wire the quad to the program's attribute slots by name
///
/// Quad attributes the program does not declare are skipped. A program
/// input the quad cannot supply is a link error.
pub fn bind_geometry(program: &ShaderProgram) -> Result<Vec<AttributeBinding>, GalaxyError> {
    for (name, location) in program.attributes() {
        if !QUAD_ATTRIBUTES.iter().any(|(n, _)| *n == name) {
            return Err(GalaxyError::ShaderLink {
                log: format!("vertex input '{}' at location {} has no geometry source", name, location),
            });
        }
    }

    let mut bindings = Vec::new();
    for (name, data) in QUAD_ATTRIBUTES {
        match program.attribute_location(name) {
            Some(location) => bindings.push(AttributeBinding { name, location, data }),
            None => debug!(attribute = name, "program does not consume attribute, skipped"),
        }
    }
    bindings.sort_by_key(|b| b.location);
    Ok(bindings)
}
