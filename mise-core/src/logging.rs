use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,mise=debug";

/// Install the global `tracing` subscriber with a standard `fmt` layer.
///
/// Respects `RUST_LOG`. Call once at the start of `main`; later calls are
/// ignored.
pub fn init_tracing() {
    init_tracing_with(DEFAULT_FILTER);
}

/// Same as [`init_tracing`] with an explicit fallback filter.
pub fn init_tracing_with(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
