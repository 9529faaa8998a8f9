//! Test utilities for scenec.
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration tests.
//!
//! ```rust,no_run
//! use scenec_cli::test_utils::SourceTree;
//!
//! let tree = SourceTree::door().unwrap();
//! assert!(tree.path("Models/door.scn").is_file());
//! ```

pub mod fixtures;

pub use fixtures::{DOOR_MODEL, METAL_TEXTURE, SourceTree, WOOD_MATERIAL, WOOD_TEXTURE};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests, once per process.
///
/// Uses `level` when given, otherwise `RUST_LOG`. With neither, nothing is
/// logged.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
