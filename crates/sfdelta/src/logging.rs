use tracing_subscriber::EnvFilter;

pub(crate) const LOG_ENV: &str = "SFDELTA_LOG";
const DEFAULT_DIRECTIVE: &str = "warn";
const VERBOSE_DIRECTIVE: &str = "debug";

/// Installs the stderr subscriber. `--verbose` takes precedence over
/// `SFDELTA_LOG`.
pub(crate) fn init(verbose: bool) {
    let env = std::env::var(LOG_ENV).ok();
    let filter = EnvFilter::try_new(directive(verbose, env.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn directive(verbose: bool, env: Option<&str>) -> &str {
    if verbose {
        return VERBOSE_DIRECTIVE;
    }
    env.map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_DIRECTIVE)
}
