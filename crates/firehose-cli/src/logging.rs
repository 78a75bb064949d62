use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--verbose`.
pub fn init(verbose: bool, json: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
