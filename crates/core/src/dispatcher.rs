//! Bounded parallel dispatch of component reconciliations.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, error};

use crate::models::{Component, Outcome};
use crate::reconciler;

/// Default number of parallel reconciliation jobs.
pub const DEFAULT_MAX_JOBS: usize = 4;

/// Runs reconciliations over a bounded pool of concurrent tasks.
///
/// Results are collected in declaration order regardless of completion
/// order, so reports are deterministic across runs.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    workdir: PathBuf,
    maxjobs: usize,
    verbose: bool,
}

impl Dispatcher {
    pub fn new(workdir: impl Into<PathBuf>, maxjobs: usize, verbose: bool) -> Self {
        Self {
            workdir: workdir.into(),
            maxjobs: maxjobs.max(1),
            verbose,
        }
    }

    /// Reconcile every component, blocking until all have been processed.
    ///
    /// One task per component, each with its own backend instance. A failed
    /// or panicked task yields an error outcome for its component and never
    /// disturbs its siblings.
    pub async fn run(&self, components: Vec<Component>) -> Vec<Component> {
        debug!(
            count = components.len(),
            maxjobs = self.maxjobs,
            "dispatching components"
        );
        let semaphore = Arc::new(Semaphore::new(self.maxjobs));
        let workdir = Arc::new(self.workdir.clone());

        let mut handles = Vec::with_capacity(components.len());
        for component in components {
            // Kept aside so a panicked task still yields a reportable entry.
            let fallback = component.clone();
            let semaphore = Arc::clone(&semaphore);
            let workdir = Arc::clone(&workdir);
            let verbose = self.verbose;
            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("dispatcher semaphore closed");
                reconciler::reconcile(component, &workdir, verbose).await
            });
            handles.push((handle, fallback));
        }

        let mut processed = Vec::with_capacity(handles.len());
        for (handle, fallback) in handles {
            match handle.await {
                Ok(component) => processed.push(component),
                Err(e) => {
                    error!(path = %fallback.path, error = %e, "reconciliation task aborted");
                    let mut component = fallback;
                    component.outcome = Some(Outcome::Error);
                    processed.push(component);
                }
            }
        }
        processed
    }
}
