//! Spirograph entry point
//!
//! Native: runs one draw headless, pacing steps with the configured delay,
//! and prints the final frame as JSON. The browser build is driven from JS
//! through `spirograph::web` instead.
//!
//! Usage: `spirograph [--fast] [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use spirograph::sim::{DrawPhase, StepOutcome};
    use spirograph::{Settings, SpiroError, Spirograph};

    /// Command line options
    #[derive(Debug, Default)]
    pub struct Options {
        /// Skip the per-step delay
        pub fast: bool,
        pub settings_path: Option<PathBuf>,
    }

    impl Options {
        pub fn parse(args: impl IntoIterator<Item = String>) -> Self {
            let mut options = Self::default();
            for arg in args {
                match arg.as_str() {
                    "--fast" => options.fast = true,
                    _ if arg.starts_with("--") => log::warn!("Ignoring unknown flag {arg}"),
                    _ => options.settings_path = Some(PathBuf::from(arg)),
                }
            }
            options
        }
    }

    pub fn load_settings(options: &Options) -> Result<Settings, SpiroError> {
        match &options.settings_path {
            Some(path) => {
                let json = std::fs::read_to_string(path)?;
                let settings = Settings::from_json(&json)?;
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            None => Ok(Settings::default()),
        }
    }

    pub fn run(options: Options) -> Result<(), SpiroError> {
        let settings = load_settings(&options)?;
        log::info!(
            "Spirograph: {} circles, ratio {:.2}, pen offset {:.2}",
            settings.circle_count(),
            settings.radius_ratio(),
            settings.pen_offset_ratio()
        );

        let mut spiro = Spirograph::new(settings);
        spiro.start()?;

        loop {
            match spiro.step() {
                StepOutcome::Continue { delay } => {
                    log::debug!(
                        "Step: {}/{}",
                        spiro.scheduler().current_iteration(),
                        spiro.scheduler().target_iterations()
                    );
                    if !options.fast && !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                }
                StepOutcome::Finished | StepOutcome::Cancelled | StepOutcome::Idle => break,
            }
        }

        let frame = spiro.frame();
        if frame.phase != DrawPhase::Finished {
            log::warn!("Draw ended in phase {:?}", frame.phase);
        }
        println!("{}", serde_json::to_string(&frame)?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Spirograph (native) starting...");

    let options = native::Options::parse(std::env::args().skip(1));
    if let Err(e) = native::run(options) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is spirograph::web::init, this is just to satisfy the compiler
}
