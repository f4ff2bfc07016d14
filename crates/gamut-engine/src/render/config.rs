use crate::driver::FilterMode;

/// Asset the renderer shows when nothing else is configured.
pub const DEFAULT_ASSET: &str = "P3XM.png";

/// What the quad renderer draws and how it samples it.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Name passed to the asset store.
    pub asset_name: String,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    /// RGBA, straight alpha.
    pub clear_color: [f32; 4],
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            asset_name: DEFAULT_ASSET.to_string(),
            min_filter: FilterMode::Nearest,
            mag_filter: FilterMode::Linear,
            clear_color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}
