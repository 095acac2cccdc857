use tracing::{debug, warn};

use super::device::{configure_surface, create_device, create_surface, max_dimension};
use super::pipeline::{create_pipeline, create_uniform_resources, create_vertex_buffers, UniformResources};
use crate::engine::{FrameContext, RenderStrategy};
use crate::error::GalaxyError;
use crate::math::SurfaceSize;
use crate::program::{bind_geometry, ShaderProgram, QUAD_VERTEX_COUNT};

/// Consecutive lost surfaces tolerated before the context is declared gone
const MAX_LOST_FRAMES: u32 = 3;

/// GPU objects owned by the strategy; dropped together on dispose
struct GpuState {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    vertex_buffers: Vec<wgpu::Buffer>,
    uniforms: Option<UniformResources>,
    clear: wgpu::Color,
}

/// Shader strategy: the procedural star field on a wgpu surface
pub struct GpuStarfield {
    state: Option<GpuState>,
    lost_frames: u32,
    max_dimension: u32,
}

impl GpuStarfield {
    /// Acquire a device for `canvas` and build the pipeline for `program`
    pub async fn new(
        canvas: web_sys::HtmlCanvasElement,
        program: &ShaderProgram,
        size: SurfaceSize,
        transparent: bool,
    ) -> Result<Self, GalaxyError> {
        let bindings = bind_geometry(program)?;
        let (instance, surface) = create_surface(canvas)?;
        let (device, queue, adapter) = create_device(&instance, &surface).await?;
        let limit = max_dimension(&device);
        let size = size.limit_to(limit);
        let surface_config = configure_surface(&surface, &adapter, &device, &size, transparent)?;

        let pipeline = create_pipeline(&device, program, &bindings, surface_config.format, transparent);
        let vertex_buffers = create_vertex_buffers(&device, &bindings);
        let uniforms = create_uniform_resources(&device, &pipeline, program);

        debug!(attributes = bindings.len(), has_uniforms = uniforms.is_some(), "GPU star field ready");

        Ok(Self {
            state: Some(GpuState {
                device,
                queue,
                surface,
                surface_config,
                pipeline,
                vertex_buffers,
                uniforms,
                clear: if transparent { wgpu::Color::TRANSPARENT } else { wgpu::Color::BLACK },
            }),
            lost_frames: 0,
            max_dimension: limit,
        })
    }

    pub fn is_disposed(&self) -> bool {
        self.state.is_none()
    }

    /// Get the surface texture, reconfiguring on recoverable errors
    ///
    /// `Ok(None)` skips the frame.
    fn acquire(&mut self) -> Result<Option<wgpu::SurfaceTexture>, GalaxyError> {
        let Some(state) = self.state.as_mut() else {
            return Ok(None);
        };
        match state.surface.get_current_texture() {
            Ok(texture) => {
                self.lost_frames = 0;
                Ok(Some(texture))
            }
            Err(wgpu::SurfaceError::Lost) => {
                self.lost_frames += 1;
                if self.lost_frames > MAX_LOST_FRAMES {
                    return Err(GalaxyError::ContextLost(format!(
                        "surface lost {} frames in a row",
                        self.lost_frames
                    )));
                }
                warn!(attempt = self.lost_frames, "surface lost, reconfiguring");
                state.surface.configure(&state.device, &state.surface_config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Outdated) => {
                debug!("surface outdated, reconfiguring");
                state.surface.configure(&state.device, &state.surface_config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("GPU timeout, skipping frame");
                Ok(None)
            }
            Err(e) => Err(GalaxyError::ContextLost(e.to_string())),
        }
    }
}

impl RenderStrategy for GpuStarfield {
    fn resize(&mut self, surface: &SurfaceSize) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let surface = surface.limit_to(self.max_dimension);
        let (width, height) = (surface.width(), surface.height());
        if state.surface_config.width == width && state.surface_config.height == height {
            return;
        }
        state.surface_config.width = width;
        state.surface_config.height = height;
        state.surface.configure(&state.device, &state.surface_config);
    }

    fn draw(&mut self, frame: &FrameContext<'_>) -> Result<bool, GalaxyError> {
        let Some(output) = self.acquire()? else {
            return Ok(false);
        };
        let Some(state) = self.state.as_ref() else {
            return Ok(false);
        };

        if let (Some(uniforms), Some(block)) = (&state.uniforms, frame.uniforms) {
            state.queue.write_buffer(&uniforms.buffer, 0, block.as_bytes());
        }

        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = state.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Galaxy Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Galaxy Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(state.clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&state.pipeline);
            if let Some(uniforms) = &state.uniforms {
                render_pass.set_bind_group(uniforms.group, &uniforms.bind_group, &[]);
            }
            for (slot, buffer) in state.vertex_buffers.iter().enumerate() {
                render_pass.set_vertex_buffer(slot as u32, buffer.slice(..));
            }
            render_pass.draw(0..QUAD_VERTEX_COUNT, 0..1);
        }

        state.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(true)
    }

    fn dispose(&mut self) {
        if let Some(state) = self.state.take() {
            if let Some(uniforms) = &state.uniforms {
                uniforms.buffer.destroy();
            }
            for buffer in &state.vertex_buffers {
                buffer.destroy();
            }
            debug!("GPU star field released");
        }
    }

    fn max_dimension(&self) -> Option<u32> {
        Some(self.max_dimension)
    }
}
