//! Property demo application
//!
//! Drives a property through a number of render/post-render cycles against a
//! headless fixed-function context and reports what the binder did.
//!
//! ```text
//! property_demo [config.toml | config.ron]
//! property_demo --write-default <path>
//! ```

use fixed_pipeline::config::{Config, ConfigError, DemoConfig};
use fixed_pipeline::render::{
    HeadlessContext, PropertyRenderer, RenderError, Texture2D, UnitStrategy,
};

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("usage: property_demo [config] | --write-default <path>")]
    Usage,
}

fn load_config(mut args: impl Iterator<Item = String>) -> Result<Option<DemoConfig>, DemoError> {
    match args.next().as_deref() {
        None => Ok(Some(DemoConfig::default())),
        Some("--write-default") => {
            let path = args.next().ok_or(DemoError::Usage)?;
            DemoConfig::default().save_to_file(&path)?;
            log::info!("Wrote default configuration to {}", path);
            Ok(None)
        }
        Some(path) => {
            log::info!("Loading configuration from {}", path);
            Ok(Some(DemoConfig::load_from_file(path)?))
        }
    }
}

fn build_property(config: &DemoConfig) -> PropertyRenderer {
    let mut property = PropertyRenderer::from_settings(&config.property, &config.binder);

    for (index, unit) in config.property.texture_units.iter().enumerate() {
        let texture = Box::new(Texture2D::new(format!("texture{}", index), 64, 64));
        log::debug!("Attaching '{}' (configured unit {})", texture.label(), unit);
        match config.binder.strategy {
            UnitStrategy::Fixed => {
                property.set_texture(*unit, texture);
            }
            UnitStrategy::Pooled => property.add_texture(texture),
        }
    }
    property
}

fn run(config: &DemoConfig) -> Result<(), DemoError> {
    let mut context = HeadlessContext::new(&config.context);
    let mut property = build_property(config);

    log::info!(
        "Running {} frames with {} textures ({:?} units)",
        config.frames,
        property.texture_count(),
        config.binder.strategy
    );

    let mut last_error = None;
    for frame in 0..config.frames {
        match property.render(&mut context) {
            Ok(report) if report.no_textures() => log::info!("Frame {}: no textures", frame),
            Ok(report) => {
                log::info!(
                    "Frame {}: bound {} of {} textures{}",
                    frame,
                    report.bound().len(),
                    report.requested(),
                    if report.is_single_texture() { " (single-texture fallback)" } else { "" }
                );
                for diagnostic in report.diagnostics() {
                    log::warn!("Frame {}: {}", frame, diagnostic);
                }
            }
            Err(error) => {
                log::error!("Frame {}: {}", frame, error);
                last_error = Some(error);
            }
        }

        // geometry would be submitted here
        let release = property.post_render(&mut context);
        log::debug!("Frame {}: released {} slots", frame, release.released().len());
    }

    let held = property
        .texture_slots()
        .iter()
        .filter(|slot| slot.allocated_unit().is_some())
        .count();
    if held > 0 {
        log::warn!("{} texture slots still hold pooled units after the last frame", held);
    }
    property.release_graphics_resources(&mut context);

    log::info!(
        "Done: active unit {}, {} free of {} pooled units, {} live textures, {} context errors",
        context.active_unit(),
        context.pool().free_count(),
        context.pool().capacity(),
        context.live_textures(),
        context.errors().len()
    );
    for error in context.errors() {
        log::warn!("Context error: {}", error);
    }

    match last_error {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    log::info!("Starting fixed-pipeline property demo");

    let Some(config) = load_config(std::env::args().skip(1))? else {
        return Ok(());
    };
    run(&config)?;

    log::info!("Property demo finished successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_runs_cleanly() {
        assert!(run(&DemoConfig::default()).is_ok());
    }

    #[test]
    fn test_pool_exhaustion_fails_the_run() {
        let mut config = DemoConfig::default();
        config.context.max_texture_units = 1;
        config.binder.strategy = UnitStrategy::Pooled;
        config.property.texture_units = vec![0, 0];
        config.frames = 2;

        assert!(matches!(run(&config), Err(DemoError::Render(_))));
    }

    #[test]
    fn test_build_property_uses_strategy() {
        let mut config = DemoConfig::default();
        config.property.texture_units = vec![0, 3];
        assert_eq!(build_property(&config).texture_unit_at(1), Some(3));

        config.binder.strategy = UnitStrategy::Pooled;
        assert_eq!(build_property(&config).texture_unit_at(1), None);
    }

    #[test]
    fn test_pooled_run_returns_every_unit() {
        let mut config = DemoConfig::default();
        config.binder.strategy = UnitStrategy::Pooled;
        config.property.texture_units = vec![0, 1, 2];
        config.frames = 3;

        assert!(run(&config).is_ok());
    }

    #[test]
    fn test_missing_argument_after_write_default() {
        let args = vec!["--write-default".to_string()].into_iter();
        assert!(matches!(load_config(args), Err(DemoError::Usage)));
    }
}
