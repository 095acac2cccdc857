use tracing::debug;

use crate::error::GalaxyError;
use crate::math::SurfaceSize;

/// Create the wgpu instance and surface from a canvas
#[cfg(target_arch = "wasm32")]
pub fn create_surface(
    canvas: web_sys::HtmlCanvasElement,
) -> Result<(wgpu::Instance, wgpu::Surface<'static>), GalaxyError> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
        ..Default::default()
    });

    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas))
        .map_err(|e| GalaxyError::UnsupportedSurface(format!("failed to create surface: {}", e)))?;

    Ok((instance, surface))
}

/// Canvas surfaces only exist in the browser
#[cfg(not(target_arch = "wasm32"))]
pub fn create_surface(
    _canvas: web_sys::HtmlCanvasElement,
) -> Result<(wgpu::Instance, wgpu::Surface<'static>), GalaxyError> {
    Err(GalaxyError::UnsupportedSurface(
        "canvas surfaces are only available on wasm32".to_string(),
    ))
}

/// Request an adapter and device able to present to `surface`
pub async fn create_device(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface<'static>,
) -> Result<(wgpu::Device, wgpu::Queue, wgpu::Adapter), GalaxyError> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(surface),
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| GalaxyError::UnsupportedSurface("no suitable GPU adapter".to_string()))?;

    debug!(adapter = ?adapter.get_info().name, backend = ?adapter.get_info().backend, "GPU adapter acquired");

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Galaxy Device"),
                required_features: wgpu::Features::empty(),
                // WebGL2 floor, raised to whatever texture size the adapter supports
                required_limits: wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        )
        .await
        .map_err(|e| GalaxyError::UnsupportedSurface(format!("failed to create device: {}", e)))?;

    Ok((device, queue, adapter))
}

/// Configure the surface for the backing-store size
///
/// A non-sRGB format is preferred so the shader's colors land on the
/// canvas unconverted. Transparent output asks for premultiplied alpha.
/// Each side is capped at the device's maximum texture dimension.
pub fn configure_surface(
    surface: &wgpu::Surface<'static>,
    adapter: &wgpu::Adapter,
    device: &wgpu::Device,
    size: &SurfaceSize,
    transparent: bool,
) -> Result<wgpu::SurfaceConfiguration, GalaxyError> {
    let caps = surface.get_capabilities(adapter);
    let format = caps
        .formats
        .iter()
        .find(|f| !f.is_srgb())
        .or_else(|| caps.formats.first())
        .copied()
        .ok_or_else(|| GalaxyError::UnsupportedSurface("surface reports no formats".to_string()))?;

    let wanted = if transparent {
        wgpu::CompositeAlphaMode::PreMultiplied
    } else {
        wgpu::CompositeAlphaMode::Opaque
    };
    let alpha_mode = if caps.alpha_modes.contains(&wanted) {
        wanted
    } else {
        caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto)
    };

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: size.width().min(max_dimension(device)),
        height: size.height().min(max_dimension(device)),
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(device, &config);

    debug!(?format, ?alpha_mode, width = config.width, height = config.height, "surface configured");
    Ok(config)
}

/// Largest surface side the device accepts
pub fn max_dimension(device: &wgpu::Device) -> u32 {
    device.limits().max_texture_dimension_2d.max(1)
}
