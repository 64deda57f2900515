use tracing_subscriber::filter::LevelFilter;

/// Setup tracing and logging, using JSON logs. The level defaults to WARN and
/// can be overridden with `RUST_LOG`.
pub fn setup_json_logging() {
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_regex(false)
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_current_span(false)
        .init();
}
