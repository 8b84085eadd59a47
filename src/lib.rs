#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod render;
pub mod style;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, SortKey, load_config};
pub use error::{LayoutError, Warning};
pub use layout::{Layout, compute_layout};
pub use model::{Entity, EntityKind, Id, parse_entities};
pub use style::{Presets, StyleSpec};

/// Lays out and renders one batch to an SVG string.
pub fn render(entities: &[Entity], config: &Config) -> Result<String, LayoutError> {
    let layout = compute_layout(entities, &config.theme, &config.presets, &config.layout)?;
    Ok(render::render_svg(&layout, &config.render))
}
