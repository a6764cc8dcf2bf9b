//! Subtree walking: WALK (GETNEXT) and BULK-WALK (GETBULK).
//!
//! Both walks accumulate varbinds until the agent's answers leave the
//! requested subtree or report endOfMibView, and both guard against agents
//! that return non-increasing OIDs (which would loop forever).

use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::transport::Transport;
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;

use super::Session;

/// What to do with one varbind observed during a walk.
enum Step {
    /// In-subtree data: append and advance.
    Keep(VarBind),
    /// Left the subtree or endOfMibView: the walk is complete.
    Done,
}

impl<T: Transport> Session<T> {
    /// Walk an OID subtree using repeated GETNEXT requests.
    ///
    /// Returns the in-subtree varbinds in the order the agent yielded them.
    /// The result may be empty when the subtree holds nothing.
    ///
    /// All-or-nothing: a timeout (or any other failure) at any step fails
    /// the whole walk and discards varbinds accumulated so far. A
    /// non-increasing OID aborts with [`Error::NonIncreasingOid`].
    pub async fn walk(&self, root: &Oid) -> Result<Vec<VarBind>> {
        tracing::debug!(target: "snmpt::session", agent = %self.peer_addr(), root = %root, "starting walk");

        let mut results = Vec::new();
        let mut current = root.clone();

        loop {
            let vb = self.get_next(&current).await?;
            match walk_step(root, &current, vb)? {
                Step::Keep(vb) => {
                    current = vb.oid.clone();
                    results.push(vb);
                }
                Step::Done => break,
            }
        }

        tracing::debug!(
            target: "snmpt::session",
            agent = %self.peer_addr(),
            root = %root,
            count = results.len(),
            "walk complete"
        );
        Ok(results)
    }

    /// Walk an OID subtree using GETBULK (SNMPv2c only), fetching up to
    /// `repeats` varbinds per round-trip.
    ///
    /// Same termination, ordering and all-or-nothing semantics as
    /// [`walk()`](Self::walk).
    pub async fn bulk_walk(&self, root: &Oid) -> Result<Vec<VarBind>> {
        if self.config().version == Version::V1 {
            return Err(Error::config("BULK-WALK requires SNMPv2c"));
        }

        // A max-repetitions of zero would never make progress
        let max_repetitions = self.config().repeats.max(1) as i32;

        tracing::debug!(
            target: "snmpt::session",
            agent = %self.peer_addr(),
            root = %root,
            max_repetitions,
            "starting bulk walk"
        );

        let mut results = Vec::new();
        let mut current = root.clone();

        'walk: loop {
            let batch = self.get_bulk(&current, 0, max_repetitions).await?;
            if batch.is_empty() {
                break;
            }

            for vb in batch {
                match walk_step(root, &current, vb)? {
                    Step::Keep(vb) => {
                        current = vb.oid.clone();
                        results.push(vb);
                    }
                    Step::Done => break 'walk,
                }
            }
            // Whole batch stayed in-subtree: seed the next GETBULK at the
            // last OID observed.
        }

        tracing::debug!(
            target: "snmpt::session",
            agent = %self.peer_addr(),
            root = %root,
            count = results.len(),
            "bulk walk complete"
        );
        Ok(results)
    }
}

/// Classify one returned varbind against the walk state.
///
/// endOfMibView and leaving the subtree end the walk; an OID that is not
/// strictly greater than the one just requested while still inside the
/// subtree is an agent loop and aborts.
fn walk_step(root: &Oid, current: &Oid, vb: VarBind) -> Result<Step> {
    if matches!(vb.value, Value::EndOfMibView) {
        return Ok(Step::Done);
    }
    if !vb.oid.starts_with(root) {
        return Ok(Step::Done);
    }
    if vb.oid <= *current {
        tracing::warn!(
            target: "snmpt::session",
            previous = %current,
            current = %vb.oid,
            "non-increasing OID, aborting walk"
        );
        return Err(Error::NonIncreasingOid {
            previous: current.clone(),
            current: vb.oid,
        });
    }
    Ok(Step::Keep(vb))
}
