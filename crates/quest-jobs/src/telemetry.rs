//! Tracing subscriber setup shared by the job binaries.

use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log format. `json` switches to JSON
/// lines; anything else keeps the human-readable formatter.
pub const LOG_FORMAT_VAR: &str = "LOG_FORMAT";

/// Install the global subscriber.
///
/// The filter comes from `RUST_LOG`, falling back to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var(LOG_FORMAT_VAR).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
