use tracing_subscriber::EnvFilter;

/// Crates whose verbosity follows `-v`. Dependencies (HTTP stack and the
/// like) stay at `info` so that `-vv` is still readable.
const CRATES: [&str; 6] = [
    "emberly",
    "emberly_cache",
    "emberly_config",
    "emberly_library",
    "emberly_providers",
    "emberly_storage",
];

/// Filter directives for the given `-v` count and `-q` flag.
pub fn directives(verbose: u8, quiet: bool) -> String {
    let level = match (quiet, verbose) {
        (true, _) => return "warn".to_string(),
        (false, 0) => return "info".to_string(),
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    std::iter::once("info".to_string())
        .chain(CRATES.iter().map(|name| format!("{name}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber. `RUST_LOG`, when set, wins over the flags.
pub fn init(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(verbose, quiet)));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(verbose > 0).init();
}
