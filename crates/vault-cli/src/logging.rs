use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` wins when set. Otherwise only warnings are shown, or
/// everything from the vault crates at debug level with `verbose`.
pub fn init(verbose: bool) {
    let default = if verbose {
        "warn,vault_cli=debug,vault_core=debug,vault_client=debug,vault_meta=debug,vault_fs=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .compact();

    // A second init in the same process is harmless
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
