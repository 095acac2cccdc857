use wgpu::util::DeviceExt;

use crate::program::{AttributeBinding, ShaderProgram};

/// Bytes per vertex of a `vec2<f32>` attribute
const ATTRIBUTE_STRIDE: wgpu::BufferAddress = 8;

/// Uniform buffer and the bind group exposing it
pub struct UniformResources {
    pub group: u32,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

/// One vertex buffer per quad attribute, in binding order
pub fn create_vertex_buffers(device: &wgpu::Device, bindings: &[AttributeBinding]) -> Vec<wgpu::Buffer> {
    bindings
        .iter()
        .map(|b| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(b.name),
                contents: bytemuck::cast_slice(b.data.as_slice()),
                usage: wgpu::BufferUsages::VERTEX,
            })
        })
        .collect()
}

/// Create the star-field pipeline
///
/// The layout is derived from the shaders, so the uniform block's bind
/// group layout is read back from the pipeline afterwards.
pub fn create_pipeline(
    device: &wgpu::Device,
    program: &ShaderProgram,
    bindings: &[AttributeBinding],
    format: wgpu::TextureFormat,
    transparent: bool,
) -> wgpu::RenderPipeline {
    let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Galaxy Vertex Shader"),
        source: wgpu::ShaderSource::Wgsl(program.vertex_source().into()),
    });
    let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Galaxy Fragment Shader"),
        source: wgpu::ShaderSource::Wgsl(program.fragment_source().into()),
    });

    let attributes: Vec<[wgpu::VertexAttribute; 1]> = bindings
        .iter()
        .map(|b| {
            [wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 0,
                shader_location: b.location,
            }]
        })
        .collect();
    let buffers: Vec<wgpu::VertexBufferLayout<'_>> = attributes
        .iter()
        .map(|attrs| wgpu::VertexBufferLayout {
            array_stride: ATTRIBUTE_STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: attrs,
        })
        .collect();

    let blend = if transparent {
        Some(wgpu::BlendState::ALPHA_BLENDING)
    } else {
        None
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Galaxy Pipeline"),
        layout: None,
        vertex: wgpu::VertexState {
            module: &vertex_module,
            entry_point: Some(program.vertex_entry()),
            buffers: &buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &fragment_module,
            entry_point: Some(program.fragment_entry()),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Create the uniform buffer for the program's block, if it has one
pub fn create_uniform_resources(
    device: &wgpu::Device,
    pipeline: &wgpu::RenderPipeline,
    program: &ShaderProgram,
) -> Option<UniformResources> {
    let (group, binding) = program.uniform_binding()?;
    let size = u64::from(program.uniform_layout().span);

    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Galaxy Uniform Buffer"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let layout = pipeline.get_bind_group_layout(group);
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Galaxy Bind Group"),
        layout: &layout,
        entries: &[wgpu::BindGroupEntry {
            binding,
            resource: buffer.as_entire_binding(),
        }],
    });

    Some(UniformResources {
        group,
        buffer,
        bind_group,
    })
}
