//! # CI Host Abstraction
//!
//! The action never touches the CI runtime directly. It reads inputs, writes
//! outputs and emits log lines through [`HostIo`]:
//!
//! - [`GithubHost`] - GitHub Actions (`INPUT_*` env vars, `$GITHUB_OUTPUT`)
//! - [`MemoryHost`] - In-memory host for tests, records every write
//!
//! ```rust
//! use atlas_action::host::{HostIo, MemoryHost};
//!
//! let host = MemoryHost::with_inputs([("dir", "file://migrations")]);
//! assert_eq!(host.get_input("dir"), "file://migrations");
//! assert_eq!(host.get_input("url"), "");
//!
//! host.set_output("current", "20230101").unwrap();
//! assert_eq!(host.output("current").as_deref(), Some("20230101"));
//! ```

mod github;
mod memory;

pub use github::GithubHost;
pub use memory::MemoryHost;

use crate::error::HostError;

/// Capabilities the CI host provides to an action run
pub trait HostIo: Send + Sync {
    /// Named input, empty string when not provided
    fn get_input(&self, key: &str) -> String;

    /// Publish a named output for downstream steps
    fn set_output(&self, key: &str, value: &str) -> Result<(), HostError>;

    /// Publish several outputs. Hosts that can write them in one operation
    /// should override this; the default writes one key at a time and stops
    /// at the first failure, so earlier keys stay published.
    fn set_outputs(&self, outputs: &[(&str, String)]) -> Result<(), HostError> {
        for (key, value) in outputs {
            self.set_output(key, value)?;
        }
        Ok(())
    }

    /// Informational log line shown in the step log
    fn info(&self, message: &str);
}
