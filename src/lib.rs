//! Void Gaze - staring-contest game core.
//!
//! Turns a per-frame stream of facial landmarks into a debounced
//! gazing/blinking signal, drives a session lifecycle and elapsed-time
//! score off it, and keeps a small leaderboard of the best holds.
//!
//! The crate deliberately stops at the in-memory boundary: camera capture,
//! the landmark model, rendering, and audio feedback are the caller's
//! business. Frames come in as [`vision::LandmarkFrame`] values; state
//! changes go out over channels from [`game::GameManager`].

pub mod config;
pub mod game;
pub mod ranking;
pub mod vision;

pub use config::Config;
pub use game::GameManager;

/// Set up logging to stdout and, when possible, a rolling file in
/// `~/.voidgaze/logs` (local time for readability).
///
/// Call once at startup; respects `RUST_LOG` and defaults to `info`.
pub fn init_logging() {
    use tracing_subscriber::prelude::*;

    /// Format timestamps using the system's local time via chrono
    struct LocalTimer;
    impl tracing_subscriber::fmt::time::FormatTime for LocalTimer {
        fn format_time(
            &self,
            w: &mut tracing_subscriber::fmt::format::Writer<'_>,
        ) -> std::fmt::Result {
            write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
        }
    }

    let log_dir = dirs::home_dir()
        .map(|h| h.join(".voidgaze").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("/tmp"));
    let _ = std::fs::create_dir_all(&log_dir);
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("voidgaze.log"))
        .ok();

    if let Some(file) = log_file {
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::sync::Mutex::new(file))
            .with_timer(LocalTimer)
            .with_ansi(false);
        let stdout_layer = tracing_subscriber::fmt::layer().with_timer(LocalTimer);
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with(stdout_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::fmt().with_timer(LocalTimer).init();
    }
}
