//! Atlas engine using the atlas CLI
//!
//! Executes `atlas migrate apply --format "{{ json . }}"` and decodes the
//! JSON report from stdout.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::ExecutionEngine;
use crate::context::RunContext;
use crate::error::EngineError;
use crate::outcome::MigrateApply;
use crate::request::MigrateApplyParams;

/// Go template that makes atlas print its report as JSON
const JSON_FORMAT: &str = "{{ json . }}";

/// Engine that shells out to the atlas CLI
#[derive(Debug, Clone)]
pub struct AtlasCli {
    /// Path to the atlas binary
    bin: String,
    /// Directory to run atlas in (relative `file://` URLs resolve against it)
    working_dir: Option<PathBuf>,
}

impl AtlasCli {
    /// Create an engine using `atlas` from PATH
    pub fn new() -> Self {
        Self {
            bin: "atlas".to_string(),
            working_dir: None,
        }
    }

    /// Set a custom binary path
    pub fn with_bin(mut self, bin: impl Into<String>) -> Self {
        self.bin = bin.into();
        self
    }

    /// Run atlas in `dir`
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn bin(&self) -> &str {
        &self.bin
    }

    /// CLI arguments for `params`. Empty values are left out.
    pub fn migrate_apply_args(params: &MigrateApplyParams) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "migrate".into(),
            "apply".into(),
            "--format".into(),
            JSON_FORMAT.into(),
        ];
        let flags = [
            ("--url", &params.url),
            ("--dir", &params.dir_url),
            ("--config", &params.config_url),
            ("--env", &params.env),
            ("--tx-mode", &params.tx_mode),
            ("--baseline", &params.baseline_version),
        ];
        for (flag, value) in flags {
            if !value.is_empty() {
                args.push(flag.to_string());
                args.push(value.clone());
            }
        }
        args
    }

    /// Turn a finished process into a result.
    ///
    /// A failing exit still yields a structured result when atlas reported
    /// the failure in its JSON output.
    fn decode(
        &self,
        success: bool,
        code: Option<i32>,
        stdout: &str,
        stderr: &str,
    ) -> Result<MigrateApply, EngineError> {
        let stdout = stdout.trim();
        if success {
            if stdout.is_empty() {
                return Ok(MigrateApply::default());
            }
            return Ok(serde_json::from_str(stdout)?);
        }

        if let Ok(run) = serde_json::from_str::<MigrateApply>(stdout) {
            if run.is_failed() {
                return Ok(run);
            }
        }

        let stderr = stderr.trim();
        let message = if stderr.is_empty() { stdout } else { stderr };
        Err(EngineError::Exit {
            bin: self.bin.clone(),
            code: code.map_or_else(|| "signal".to_string(), |c| format!("code {c}")),
            stderr: message.to_string(),
        })
    }
}

impl Default for AtlasCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutionEngine for AtlasCli {
    fn name(&self) -> &str {
        "atlas"
    }

    #[instrument(skip_all, fields(bin = %self.bin))]
    async fn apply(
        &self,
        ctx: &RunContext,
        params: &MigrateApplyParams,
    ) -> Result<MigrateApply, EngineError> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }

        let args = Self::migrate_apply_args(params);
        debug!(?params, argc = args.len(), "Spawning atlas");

        let mut cmd = Command::new(&self.bin);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|source| EngineError::Spawn {
            bin: self.bin.clone(),
            source,
        })?;

        // Dropping the output future kills the child
        let output = tokio::select! {
            biased;
            err = ctx.done() => return Err(err),
            output = child.wait_with_output() => output.map_err(|source| EngineError::Spawn {
                bin: self.bin.clone(),
                source,
            })?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(status = %output.status, stdout_len = stdout.len(), "atlas finished");

        self.decode(output.status.success(), output.status.code(), &stdout, &stderr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> MigrateApplyParams {
        MigrateApplyParams {
            url: "sqlite://file.db".into(),
            dir_url: "file://migrations".into(),
            ..Default::default()
        }
    }

    #[test]
    fn args_skip_empty_values() {
        let args = AtlasCli::migrate_apply_args(&params());
        assert_eq!(
            args,
            vec![
                "migrate",
                "apply",
                "--format",
                "{{ json . }}",
                "--url",
                "sqlite://file.db",
                "--dir",
                "file://migrations",
            ]
        );
    }

    #[test]
    fn args_include_every_flag() {
        let params = MigrateApplyParams {
            url: "u".into(),
            dir_url: "d".into(),
            config_url: "c".into(),
            env: "e".into(),
            tx_mode: "t".into(),
            baseline_version: "b".into(),
        };
        let args = AtlasCli::migrate_apply_args(&params);
        assert_eq!(
            &args[4..],
            [
                "--url", "u", "--dir", "d", "--config", "c", "--env", "e", "--tx-mode", "t",
                "--baseline", "b",
            ]
        );
    }

    #[test]
    fn decode_success() {
        let engine = AtlasCli::new();
        let run = engine
            .decode(true, Some(0), r#"{"Current":"1","Target":"2"}"#, "")
            .unwrap();
        assert_eq!(run.current, "1");
        assert_eq!(run.target, "2");
    }

    #[test]
    fn decode_empty_success() {
        let run = AtlasCli::new().decode(true, Some(0), "\n", "").unwrap();
        assert_eq!(run, MigrateApply::default());
    }

    #[test]
    fn decode_malformed_success_is_transport_error() {
        let err = AtlasCli::new().decode(true, Some(0), "not json", "").unwrap_err();
        assert!(matches!(err, EngineError::Decode(_)));
    }

    #[test]
    fn decode_failure_with_report() {
        let run = AtlasCli::new()
            .decode(false, Some(1), r#"{"Error":"checksum mismatch","Current":"1"}"#, "Error: ...")
            .unwrap();
        assert_eq!(run.error, "checksum mismatch");
    }

    #[test]
    fn decode_failure_without_report() {
        let err = AtlasCli::new()
            .with_bin("/usr/bin/atlas")
            .decode(false, Some(1), "", "Error: connection refused\n")
            .unwrap_err();
        assert_eq!(err.to_string(), "/usr/bin/atlas exited with code 1: Error: connection refused");
    }

    #[test]
    fn decode_failure_falls_back_to_stdout() {
        let err = AtlasCli::new()
            .decode(false, None, "Error: boom", "")
            .unwrap_err();
        assert_eq!(err.to_string(), "atlas exited with signal: Error: boom");
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let engine = AtlasCli::new().with_bin("/nonexistent/atlas-binary");
        let err = engine.apply(&RunContext::new(), &params()).await.unwrap_err();
        assert!(matches!(err, EngineError::Spawn { .. }));
    }

    #[tokio::test]
    async fn cancelled_context_skips_spawn() {
        let engine = AtlasCli::new().with_bin("/nonexistent/atlas-binary");
        let ctx = RunContext::new();
        ctx.cancel();
        let err = engine.apply(&ctx, &params()).await.unwrap_err();
        assert!(matches!(err, EngineError::Cancelled));
    }

    #[cfg(unix)]
    mod script {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::time::{Duration, Instant};
        use tempfile::TempDir;

        fn fake_atlas(dir: &TempDir, body: &str) -> String {
            let path = dir.path().join("atlas");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_str().unwrap().to_string()
        }

        #[tokio::test]
        async fn runs_script_and_decodes() {
            let dir = TempDir::new().unwrap();
            let bin = fake_atlas(
                &dir,
                r#"echo '{"Current":"20230101","Target":"20230102","Pending":[{"Version":"20230102"}],"Applied":[{"Version":"20230102"}]}'"#,
            );

            let run = AtlasCli::new()
                .with_bin(bin)
                .apply(&RunContext::new(), &params())
                .await
                .unwrap();

            assert_eq!(run.current, "20230101");
            assert_eq!(run.pending_count(), 1);
            assert_eq!(run.applied_count(), 1);
        }

        #[tokio::test]
        async fn passes_args_to_script() {
            let dir = TempDir::new().unwrap();
            let bin = fake_atlas(&dir, r#"printf '{"Current":"%s"}' "$*""#);

            let run = AtlasCli::new()
                .with_bin(bin)
                .apply(&RunContext::new(), &params())
                .await
                .unwrap();

            assert_eq!(
                run.current,
                "migrate apply --format {{ json . }} --url sqlite://file.db --dir file://migrations"
            );
        }

        #[tokio::test]
        async fn runs_in_working_dir() {
            let dir = TempDir::new().unwrap();
            let work = TempDir::new().unwrap();
            let bin = fake_atlas(&dir, r#"printf '{"Target":"%s"}' "$(basename "$(pwd)")""#);

            let run = AtlasCli::new()
                .with_bin(bin)
                .with_working_dir(work.path())
                .apply(&RunContext::new(), &params())
                .await
                .unwrap();

            let expected = work.path().file_name().unwrap().to_str().unwrap();
            assert_eq!(run.target, expected);
        }

        #[tokio::test]
        async fn deadline_kills_slow_engine() {
            let dir = TempDir::new().unwrap();
            let bin = fake_atlas(&dir, "sleep 30");
            let ctx = RunContext::new().with_timeout(Duration::from_millis(200));

            let started = Instant::now();
            let err = AtlasCli::new()
                .with_bin(bin)
                .apply(&ctx, &params())
                .await
                .unwrap_err();

            assert!(matches!(err, EngineError::DeadlineExceeded));
            assert!(started.elapsed() < Duration::from_secs(10));
        }
    }
}
