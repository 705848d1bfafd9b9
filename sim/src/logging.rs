use env_logger::{Builder, Env};
use log::LevelFilter;

/// Install `env_logger` as the global logger.
///
/// `RUST_LOG` wins when set. Otherwise `verbose` selects debug output (grounding
/// transitions, chain breaks, banks) over the default info level.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);
    builder.format_timestamp_millis();

    // A logger may already be installed (tests call this repeatedly).
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init(true);
        init(false);
        log::debug!("logger installed");
    }
}
