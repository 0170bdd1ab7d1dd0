//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    // A second init (tests, embedding apps) keeps the first logger.
    let _ = env_logger::try_init();
}

/// Initialize the logging system with a default filter such as `"info"` or
/// `"scene_engine=debug"`. `RUST_LOG` still takes precedence when set.
pub fn init_with_level(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env).try_init();
}
