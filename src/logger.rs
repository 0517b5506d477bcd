/// Initialises env_logger. Warnings are always shown; `verbose` adds debug output.
///
/// Log lines go to stderr without timestamps or module targets, so they read
/// like the rest of the tool's diagnostics.
pub fn init_logger(verbose: bool) {
    let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Warn };

    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}
