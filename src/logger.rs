/// Initialises `env_logger`: info by default, debug when verbose.
/// `RUST_LOG` still takes precedence when set.
pub fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .parse_default_env()
        .init();
}
