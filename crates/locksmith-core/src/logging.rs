//! Logging bootstrapper shared by the LockSmith binaries.

use env_logger::Env;
use serde_json::json;
use std::env;
use std::io::Write;
use std::sync::OnceLock;

static INIT: OnceLock<()> = OnceLock::new();

const FORMAT_ENV: &str = "LOCKSMITH_LOG_FORMAT";
const LEVEL_ENV: &str = "LOCKSMITH_LOG_LEVEL";

/// Initialize the global logger.
///
/// The first caller wins; later calls are no-ops. When `RUST_LOG` is
/// unset, `default_level` applies, overridable via `LOCKSMITH_LOG_LEVEL`.
/// `LOCKSMITH_LOG_FORMAT=json` switches from the plain line format to
/// structured JSON records.
pub fn init(default_level: &str) {
    let _ = INIT.get_or_init(|| configure(default_level));
}

fn configure(default_level: &str) {
    let default_level = env::var(LEVEL_ENV).unwrap_or_else(|_| default_level.to_string());
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", &default_level);
    }

    let format = env::var(FORMAT_ENV)
        .unwrap_or_else(|_| String::from("plain"))
        .to_lowercase();

    let mut builder = env_logger::Builder::from_env(Env::default());
    if format == "json" {
        builder.format(|buf, record| {
            let payload = json!({
                "timestamp": buf.timestamp().to_string(),
                "level": record.level().to_string().to_lowercase(),
                "target": record.target(),
                "message": record.args().to_string(),
            });
            writeln!(buf, "{}", payload)
        });
    } else {
        builder.format(|buf, record| {
            writeln!(
                buf,
                "{} {} {} - {}",
                buf.timestamp(),
                record.level().to_string().to_lowercase(),
                record.target(),
                record.args()
            )
        });
    }

    if let Err(err) = builder.try_init() {
        eprintln!("failed to initialize logger: {}", err);
    }
}
