use env_logger::Env;

/// Initialize logging using env_logger.
/// Reads the RUST_LOG environment variable for filtering and falls back to `info`,
/// e.g. `RUST_LOG=mos_ui_core=debug mos-ui open http://127.0.0.1:1992/`
///
/// Safe to call more than once: only the first call installs the logger.
/// Returns `true` if this call did.
pub fn init_logging() -> bool {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .try_init()
        .is_ok()
}
