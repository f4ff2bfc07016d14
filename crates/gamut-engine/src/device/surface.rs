use winit::dpi::PhysicalSize;

use super::SurfaceErrorAction;

/// Picks the surface format and the format frames are rendered through.
///
/// The fragment stage writes already-encoded sRGB values, so the render view
/// must not encode again: prefer a plain UNORM format, and when the surface
/// only offers sRGB formats, render through the non-sRGB view of one.
pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
) -> Option<(wgpu::TextureFormat, wgpu::TextureFormat)> {
    let preferred = [
        wgpu::TextureFormat::Bgra8Unorm,
        wgpu::TextureFormat::Rgba8Unorm,
    ];
    for f in preferred {
        if caps.formats.contains(&f) {
            return Some((f, f));
        }
    }

    let format = *caps.formats.first()?;
    Some((format, format.remove_srgb_suffix()))
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// wgpu rejects 0x0 configurations; such sizes are recorded and configuration
/// is deferred until the surface has an area again.
pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) {
    *size = new_size;
    if new_size.width == 0 || new_size.height == 0 {
        return;
    }

    config.width = new_size.width;
    config.height = new_size.height;
    surface.configure(device, config);
}

pub(crate) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    err: wgpu::SurfaceError,
) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            if size.width > 0 && size.height > 0 {
                surface.configure(device, config);
            }
            SurfaceErrorAction::Reconfigured
        }
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
        wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(formats: &[wgpu::TextureFormat]) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats: formats.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn prefers_unorm_formats() {
        let c = caps(&[
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Bgra8Unorm,
        ]);
        assert_eq!(
            choose_surface_format(&c),
            Some((wgpu::TextureFormat::Bgra8Unorm, wgpu::TextureFormat::Bgra8Unorm))
        );
    }

    #[test]
    fn srgb_only_surface_renders_through_unorm_view() {
        let c = caps(&[wgpu::TextureFormat::Rgba8UnormSrgb]);
        assert_eq!(
            choose_surface_format(&c),
            Some((wgpu::TextureFormat::Rgba8UnormSrgb, wgpu::TextureFormat::Rgba8Unorm))
        );
    }

    #[test]
    fn no_formats_is_none() {
        assert_eq!(choose_surface_format(&caps(&[])), None);
    }

    #[test]
    fn alpha_mode_falls_back_to_first_supported() {
        let c = wgpu::SurfaceCapabilities {
            alpha_modes: vec![wgpu::CompositeAlphaMode::Opaque],
            ..Default::default()
        };
        assert_eq!(
            choose_alpha_mode(&c, Some(wgpu::CompositeAlphaMode::PreMultiplied)),
            wgpu::CompositeAlphaMode::Opaque
        );
    }

    #[test]
    fn alpha_mode_without_supported_modes_is_auto() {
        let c = wgpu::SurfaceCapabilities {
            alpha_modes: vec![],
            ..Default::default()
        };
        assert_eq!(choose_alpha_mode(&c, None), wgpu::CompositeAlphaMode::Auto);
        assert_eq!(
            choose_alpha_mode(&c, Some(wgpu::CompositeAlphaMode::Opaque)),
            wgpu::CompositeAlphaMode::Auto
        );
    }
}
