pub mod renderer;
pub mod settings;

pub use renderer::{
    GeometryPool, Material, Pass, RenderOp, RenderOpKey, RenderPhase, RenderQueue, Renderer,
};
pub use settings::RenderSettings;

/// Installs `env_logger` with an `Info` default filter. Safe to call more
/// than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
