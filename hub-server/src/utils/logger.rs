//! Logging Infrastructure
//!
//! Console output plus, with a log directory, two daily rolling files:
//! `app/` receives everything, `security/` only events with target
//! `"security"` (see [`security_log!`](crate::security_log)).

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{EnvFilter, LevelFilter, filter_fn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Layer, fmt};

/// Default retention of rolled files
pub const LOG_RETENTION_DAYS: i64 = 14;

const LOG_SUBDIRS: [&str; 2] = ["app", "security"];

/// Initialize the logger (console only, `info`)
pub fn init_logger() {
    if let Err(e) = init_logger_with_file(None, None, None) {
        eprintln!("Failed to initialize logger: {e}");
    }
}

/// Initialize the logger with optional JSON output and file sinks
///
/// `RUST_LOG` takes precedence over `log_level` for the console. Calling it
/// twice is harmless; the first subscriber stays installed.
pub fn init_logger_with_file(
    log_level: Option<&str>,
    json: Option<bool>,
    log_dir: Option<&str>,
) -> std::io::Result<()> {
    let level = log_level.unwrap_or("info");
    let json = json.unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{level},sqlx=warn,tower_http=info,socketioxide=warn"))
    });

    let console = if json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(false).boxed()
    };

    let mut layers = vec![console.with_filter(env_filter).boxed()];

    if let Some(dir) = log_dir {
        let dir = Path::new(dir);
        for sub in LOG_SUBDIRS {
            std::fs::create_dir_all(dir.join(sub))?;
        }
        let file_level: LevelFilter = level.parse().unwrap_or(LevelFilter::INFO);

        let app_file = daily_appender(&dir.join("app"), "app")?;
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(app_file)
                .with_filter(file_level)
                .boxed(),
        );

        let security_file = daily_appender(&dir.join("security"), "security")?;
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(security_file)
                .with_filter(filter_fn(|meta| meta.target() == "security"))
                .boxed(),
        );
    }

    // Already initialised (tests, repeated calls) is fine
    let _ = tracing_subscriber::registry().with(layers).try_init();
    Ok(())
}

fn daily_appender(dir: &Path, prefix: &str) -> std::io::Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(dir)
        .map_err(std::io::Error::other)
}

/// Delete rolled files older than `days` in the `app/` and `security/`
/// subdirectories of `log_dir`
///
/// Files are named `<prefix>.YYYY-MM-DD.log`; anything that does not carry
/// a date stamp is left alone. Returns the number of deleted files.
pub fn cleanup_old_logs(log_dir: &str, days: i64) -> std::io::Result<usize> {
    let cutoff = chrono::Utc::now().date_naive() - chrono::Duration::days(days);
    let mut removed = 0;

    for sub in LOG_SUBDIRS {
        let dir = Path::new(log_dir).join(sub);
        if !dir.is_dir() {
            continue;
        }
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(date) = name
                .split('.')
                .nth(1)
                .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            else {
                continue;
            };
            if date < cutoff {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }
    }

    if removed > 0 {
        tracing::info!(removed, "Old log files cleaned up");
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_removes_only_stale_dated_files() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        for sub in LOG_SUBDIRS {
            std::fs::create_dir_all(root.join(sub)).unwrap();
        }
        let today = chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string();

        std::fs::write(root.join("app/app.2001-01-01.log"), "old").unwrap();
        std::fs::write(root.join("security/security.2001-01-02.log"), "old").unwrap();
        std::fs::write(root.join(format!("app/app.{today}.log")), "new").unwrap();
        std::fs::write(root.join("app/notes.txt"), "keep").unwrap();

        let removed = cleanup_old_logs(root.to_str().unwrap(), LOG_RETENTION_DAYS).unwrap();
        assert_eq!(removed, 2);
        assert!(root.join(format!("app/app.{today}.log")).exists());
        assert!(root.join("app/notes.txt").exists());
        assert!(!root.join("app/app.2001-01-01.log").exists());
    }

    #[test]
    fn missing_directory_is_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        assert_eq!(cleanup_old_logs(missing.to_str().unwrap(), 1).unwrap(), 0);
    }

    #[test]
    fn file_sinks_create_subdirectories() {
        let tmp = tempfile::tempdir().unwrap();
        init_logger_with_file(Some("debug"), Some(true), tmp.path().to_str()).unwrap();
        assert!(tmp.path().join("app").is_dir());
        assert!(tmp.path().join("security").is_dir());
    }
}
