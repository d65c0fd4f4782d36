//! GitHub Actions host
//!
//! - Inputs: `INPUT_<NAME>` env vars (spaces become `_`, upper-cased, trimmed)
//! - Outputs: appended to the `$GITHUB_OUTPUT` file, or the legacy
//!   `::set-output` workflow command when the file is not available
//! - Logs: plain lines on stdout

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::HostIo;
use crate::error::HostError;

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

pub struct GithubHost {
    env: EnvLookup,
    output_file: Option<PathBuf>,
}

impl GithubHost {
    /// Host backed by the process environment
    pub fn from_env() -> Self {
        Self::with_env(|key| std::env::var(key).ok())
    }

    /// Host backed by a custom environment lookup
    pub fn with_env(env: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        let output_file = env("GITHUB_OUTPUT")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        Self {
            env: Box::new(env),
            output_file,
        }
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }

    /// Append all entries with a single write
    fn append_outputs(&self, path: &Path, outputs: &[(&str, String)]) -> Result<(), HostError> {
        let content: String = outputs
            .iter()
            .map(|(key, value)| {
                let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
                file_command_entry(key, value, &delimiter)
            })
            .collect();
        debug!(path = %path.display(), count = outputs.len(), "Writing outputs");

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(content.as_bytes()))
            .map_err(|source| HostError::Output {
                key: outputs
                    .iter()
                    .map(|(k, _)| *k)
                    .collect::<Vec<_>>()
                    .join(", "),
                source,
            })
    }
}

/// Env var holding the input `key`
pub fn input_env_name(key: &str) -> String {
    format!("INPUT_{}", key.replace(' ', "_").to_uppercase())
}

/// Heredoc-style entry for the `$GITHUB_OUTPUT` file
fn file_command_entry(key: &str, value: &str, delimiter: &str) -> String {
    format!("{key}<<{delimiter}\n{value}\n{delimiter}\n")
}

/// Legacy `::set-output` command with the value escaped for a single line
fn set_output_command(key: &str, value: &str) -> String {
    let escaped = value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::set-output name={key}::{escaped}")
}

impl HostIo for GithubHost {
    fn get_input(&self, key: &str) -> String {
        (self.env)(&input_env_name(key))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    fn set_output(&self, key: &str, value: &str) -> Result<(), HostError> {
        self.set_outputs(&[(key, value.to_string())])
    }

    fn set_outputs(&self, outputs: &[(&str, String)]) -> Result<(), HostError> {
        match &self.output_file {
            Some(path) => self.append_outputs(path, outputs),
            None => {
                for (key, value) in outputs {
                    println!("{}", set_output_command(key, value));
                }
                Ok(())
            }
        }
    }

    fn info(&self, message: &str) {
        println!("{message}");
    }
}
