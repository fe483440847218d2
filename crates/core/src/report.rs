//! Aggregation of per-component outcomes into an overall verdict.

use tracing::{error, info, warn};

use crate::models::{Component, Outcome};

/// Counts and overall verdict for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub updated: usize,
    pub checked_out: usize,
    pub switched: usize,
    pub failed: usize,
    pub conflicted: usize,
    pub success: bool,
}

/// Reduce the ordered list of processed components into a [`RunSummary`].
///
/// Emits one error line per failed or conflicted component and one warning
/// per conflicted path. An unset outcome marks a component that was never
/// dispatched; defensive, and not counted as a failure.
pub fn aggregate(components: &[Component]) -> RunSummary {
    let mut summary = RunSummary {
        success: true,
        ..Default::default()
    };

    for component in components {
        match component.outcome {
            Some(Outcome::Update) => summary.updated += 1,
            Some(Outcome::Checkout) => summary.checked_out += 1,
            Some(Outcome::Switch) => summary.switched += 1,
            Some(outcome) => {
                summary.failed += 1;
                summary.success = false;
                error!(%outcome, "failed to reconcile '{}'", component.path);
            }
            None => {}
        }

        if !component.conflicts.is_empty() {
            summary.conflicted += 1;
            summary.success = false;
            if component.outcome.map_or(true, Outcome::is_success) {
                error!(
                    count = component.conflicts.len(),
                    "'{}' finished with conflicts", component.path
                );
            }
            for conflict in &component.conflicts {
                warn!("conflict in '{}' at '{}'", component.path, conflict);
            }
        }
    }

    info!(
        updated = summary.updated,
        checked_out = summary.checked_out,
        switched = summary.switched,
        failed = summary.failed,
        conflicted = summary.conflicted,
        "externals reconciliation finished"
    );
    summary
}
