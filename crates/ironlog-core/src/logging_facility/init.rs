//! Logging initialization
//!
//! One entry point, called by the host before migrations run.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Output profile for [`init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output, `ironlog=debug`
    Development,
    /// JSON lines, `ironlog=info`
    Production,
    /// Bare registry; pair with `init_test_capture()` to record events
    Test,
}

impl Profile {
    /// Filter applied when `RUST_LOG` is unset; `None` for [`Profile::Test`]
    pub fn default_directive(self) -> Option<&'static str> {
        match self {
            Profile::Development => Some("ironlog=debug"),
            Profile::Production => Some("ironlog=info"),
            Profile::Test => None,
        }
    }
}

static INIT_ONCE: Once = Once::new();

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Install the global subscriber for `profile`
///
/// Only the first call has any effect. If the host already installed a
/// subscriber, that one is kept.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let installed = match (profile, profile.default_directive()) {
            (Profile::Production, Some(directive)) => tracing_subscriber::fmt()
                .json()
                .with_env_filter(env_filter(directive))
                .try_init()
                .is_ok(),
            (_, Some(directive)) => tracing_subscriber::fmt()
                .with_env_filter(env_filter(directive))
                .try_init()
                .is_ok(),
            (_, None) => tracing_subscriber::registry().try_init().is_ok(),
        };
        tracing::debug!(
            component = module_path!(),
            profile = ?profile,
            installed = installed,
            "logging initialized"
        );
    });
}
