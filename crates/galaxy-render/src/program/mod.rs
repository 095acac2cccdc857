//! Shader program building
//!
//! Both WGSL stages are parsed and validated with `naga`, checked against
//! each other, and reflected into the tables the renderer needs:
//! - the uniform-location cache (`name -> offset, kind`)
//! - vertex attribute locations (`name -> location`)
//!
//! None of this touches a GPU, so compile failures surface (and are tested)
//! natively before any device exists.

mod geometry;
mod uniforms;

pub use geometry::{bind_geometry, AttributeBinding, QUAD_POSITIONS, QUAD_UVS, QUAD_VERTEX_COUNT};
pub use uniforms::{UniformBlock, UniformKind, UniformLayout, UniformSlot, UniformValue};

use std::collections::HashMap;

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, Binding, Handle, Module, ResourceBinding, Scalar, ScalarKind, Type, TypeInner, VectorSize};
use tracing::debug;

use crate::error::{GalaxyError, ShaderStage};
use crate::shaders::{FRAGMENT_ENTRY, VERTEX_ENTRY};

/// A validated, linked vertex/fragment pair with its reflection tables
#[derive(Clone, Debug)]
pub struct ShaderProgram {
    vertex_source: String,
    fragment_source: String,
    uniform_binding: Option<(u32, u32)>,
    uniform_layout: UniformLayout,
    attributes: HashMap<String, u32>,
}

impl ShaderProgram {
    pub fn vertex_source(&self) -> &str {
        &self.vertex_source
    }

    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }

    pub fn vertex_entry(&self) -> &'static str {
        VERTEX_ENTRY
    }

    pub fn fragment_entry(&self) -> &'static str {
        FRAGMENT_ENTRY
    }

    /// `(group, binding)` of the uniform block, if the program has one
    pub fn uniform_binding(&self) -> Option<(u32, u32)> {
        self.uniform_binding
    }

    pub fn uniform_layout(&self) -> &UniformLayout {
        &self.uniform_layout
    }

    /// Vertex inputs as `(name, location)`, ordered by location
    pub fn attributes(&self) -> impl Iterator<Item = (&str, u32)> {
        let mut attrs: Vec<_> = self.attributes.iter().map(|(n, l)| (n.as_str(), *l)).collect();
        attrs.sort_by_key(|(_, l)| *l);
        attrs.into_iter()
    }

    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.attributes.get(name).copied()
    }
}

/// Compile and link a vertex/fragment pair
pub fn compile(vertex_source: &str, fragment_source: &str) -> Result<ShaderProgram, GalaxyError> {
    let vertex = parse_and_validate(ShaderStage::Vertex, vertex_source)?;
    let fragment = parse_and_validate(ShaderStage::Fragment, fragment_source)?;

    let vs = entry_point(&vertex, naga::ShaderStage::Vertex, VERTEX_ENTRY)?;
    let fs = entry_point(&fragment, naga::ShaderStage::Fragment, FRAGMENT_ENTRY)?;

    // Vertex inputs
    let mut inputs = Vec::new();
    for arg in &vs.function.arguments {
        collect_varyings(&vertex, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut inputs);
    }
    let mut attributes = HashMap::new();
    for v in inputs {
        if v.name.is_empty() {
            return Err(link_error(format!("vertex input at location {} is unnamed", v.location)));
        }
        attributes.insert(v.name, v.location);
    }

    // Stage interface
    let mut outputs = Vec::new();
    if let Some(result) = &vs.function.result {
        collect_varyings(&vertex, None, result.ty, result.binding.as_ref(), &mut outputs);
    }
    let mut frag_inputs = Vec::new();
    for arg in &fs.function.arguments {
        collect_varyings(&fragment, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut frag_inputs);
    }
    for input in &frag_inputs {
        match outputs.iter().find(|o| o.location == input.location) {
            None => {
                return Err(link_error(format!(
                    "fragment input at location {} is not written by the vertex stage",
                    input.location
                )))
            }
            Some(output) if output.inner != input.inner => {
                return Err(link_error(format!(
                    "location {} is {:?} in the vertex stage but {:?} in the fragment stage",
                    input.location, output.inner, input.inner
                )))
            }
            Some(_) => {}
        }
    }

    // Uniform block
    let mut blocks = uniform_blocks(&vertex)?;
    for block in uniform_blocks(&fragment)? {
        match blocks.iter().find(|(b, _)| *b == block.0) {
            Some((_, layout)) if *layout != block.1 => {
                return Err(link_error(format!(
                    "stages disagree on the layout of uniform block @group({}) @binding({})",
                    block.0 .0, block.0 .1
                )))
            }
            Some(_) => {}
            None => blocks.push(block),
        }
    }
    if blocks.len() > 1 {
        return Err(link_error(format!("expected at most one uniform block, found {}", blocks.len())));
    }
    let (uniform_binding, uniform_layout) = match blocks.pop() {
        Some((binding, layout)) => (Some(binding), layout),
        None => (None, UniformLayout::default()),
    };

    debug!(
        uniforms = uniform_layout.slots.len(),
        attributes = attributes.len(),
        "shader program linked"
    );

    Ok(ShaderProgram {
        vertex_source: vertex_source.to_string(),
        fragment_source: fragment_source.to_string(),
        uniform_binding,
        uniform_layout,
        attributes,
    })
}

fn parse_and_validate(stage: ShaderStage, source: &str) -> Result<Module, GalaxyError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| GalaxyError::ShaderCompile {
        stage,
        log: e.emit_to_string(source),
    })?;
    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| GalaxyError::ShaderCompile {
            stage,
            log: e.emit_to_string(source),
        })?;
    Ok(module)
}

fn entry_point<'m>(
    module: &'m Module,
    stage: naga::ShaderStage,
    name: &str,
) -> Result<&'m naga::EntryPoint, GalaxyError> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage && ep.name == name)
        .ok_or_else(|| link_error(format!("missing {:?} entry point '{}'", stage, name)))
}

fn link_error(log: String) -> GalaxyError {
    GalaxyError::ShaderLink { log }
}

/// A user-defined stage input or output
struct Varying {
    name: String,
    location: u32,
    inner: TypeInner,
}

/// Flatten an argument or result into its `@location` members
fn collect_varyings(
    module: &Module,
    name: Option<&str>,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<Varying>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(Varying {
            name: name.unwrap_or_default().to_string(),
            location: *location,
            inner: module.types[ty].inner.clone(),
        }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_varyings(module, member.name.as_deref(), member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

/// Every uniform-space global with its reflected layout
fn uniform_blocks(module: &Module) -> Result<Vec<((u32, u32), UniformLayout)>, GalaxyError> {
    let mut blocks = Vec::new();
    for (_, var) in module.global_variables.iter() {
        if var.space != AddressSpace::Uniform {
            continue;
        }
        let Some(ResourceBinding { group, binding }) = var.binding.clone() else {
            continue;
        };
        blocks.push(((group, binding), reflect_layout(module, var.ty)?));
    }
    Ok(blocks)
}

fn reflect_layout(module: &Module, ty: Handle<Type>) -> Result<UniformLayout, GalaxyError> {
    let TypeInner::Struct { members, span } = &module.types[ty].inner else {
        return Err(link_error("uniform block must be a struct".to_string()));
    };
    let mut slots = HashMap::new();
    for member in members {
        let Some(name) = member.name.clone() else {
            continue;
        };
        match uniform_kind(&module.types[member.ty].inner) {
            Some(kind) => {
                slots.insert(name, UniformSlot { offset: member.offset, kind });
            }
            None => debug!(uniform = %name, "member type not settable by name, skipped"),
        }
    }
    Ok(UniformLayout { span: *span, slots })
}

fn uniform_kind(inner: &TypeInner) -> Option<UniformKind> {
    const F32: Scalar = Scalar { kind: ScalarKind::Float, width: 4 };
    match *inner {
        TypeInner::Scalar(Scalar { kind: ScalarKind::Float, width: 4 }) => Some(UniformKind::F32),
        TypeInner::Scalar(Scalar { kind: ScalarKind::Uint, width: 4 }) => Some(UniformKind::U32),
        TypeInner::Scalar(Scalar { kind: ScalarKind::Sint, width: 4 }) => Some(UniformKind::I32),
        TypeInner::Vector { size, scalar } if scalar == F32 => Some(match size {
            VectorSize::Bi => UniformKind::Vec2,
            VectorSize::Tri => UniformKind::Vec3,
            VectorSize::Quad => UniformKind::Vec4,
        }),
        _ => None,
    }
}
