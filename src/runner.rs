//! Action runner: inputs in, one engine call, outputs out (v0.1)
//!
//! 1. Read [`MigrateApplyParams`] from the host, untouched
//! 2. Call the engine once, racing the run context
//! 3. Classify into [`ApplyOutcome`] and publish either `error` or the
//!    four success outputs, never both

use tracing::{debug, instrument, warn};

use crate::context::RunContext;
use crate::engine::ExecutionEngine;
use crate::error::ActionError;
use crate::host::HostIo;
use crate::outcome::{output, ApplyOutcome, MigrateApply};
use crate::request::MigrateApplyParams;

/// Run `migrate apply` as a CI action step.
///
/// Both failure kinds are written to the `error` output and returned.
#[instrument(skip_all, fields(engine = engine.name()))]
pub async fn migrate_apply(
    ctx: &RunContext,
    engine: &dyn ExecutionEngine,
    host: &dyn HostIo,
) -> Result<MigrateApply, ActionError> {
    let params = MigrateApplyParams::from_host(host);
    debug!(?params, "Calling engine");

    let result = tokio::select! {
        biased;
        err = ctx.done() => Err(err),
        result = engine.apply(ctx, &params) => result,
    };

    let outcome = ApplyOutcome::classify(result);
    publish(host, &outcome)?;

    let run = outcome.into_result()?;
    host.info(&format!("Run complete: {run}"));
    Ok(run)
}

/// Write the outputs for `outcome` as one batch.
///
/// A failed write on the failure path is logged so the original error
/// still reaches the caller. A failed write on the success path is reported
/// through the `error` output on a best-effort basis.
fn publish(host: &dyn HostIo, outcome: &ApplyOutcome) -> Result<(), ActionError> {
    match host.set_outputs(&outcome.outputs()) {
        Ok(()) => Ok(()),
        Err(e) if !outcome.is_ok() => {
            warn!(error = %e, "Could not publish error output");
            Ok(())
        }
        Err(e) => {
            let err = ActionError::from(e);
            report_failure(host, &err);
            Err(err)
        }
    }
}

/// Best-effort write of `err` to the `error` output.
///
/// Used for failures that happen outside the engine call, such as a bad
/// configuration or a partially written success batch.
pub fn report_failure(host: &dyn HostIo, err: &ActionError) {
    if let Err(e) = host.set_output(output::ERROR, &err.to_string()) {
        warn!(error = %e, "Could not publish error output");
    }
}
