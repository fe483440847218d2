//! Per-component reconciliation decision logic.
//!
//! Given a component and the backend matching its SCM kind, decide which of
//! checkout, update, or switch applies, execute it, and record the outcome.
//! Failures never leave the component boundary.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::{debug, error};

use crate::backend::{backend_for, ConflictSink, ScmBackend};
use crate::models::{Component, Outcome};

/// Reconcile one component against its declared target state.
///
/// Constructs a dedicated backend instance (SCM client handles are not
/// shared across concurrent tasks), wires up the conflict monitor, runs the
/// decision procedure, and drains observed conflicts into the component.
pub async fn reconcile(component: Component, workdir: &Path, verbose: bool) -> Component {
    let backend = backend_for(component.scm_kind(), verbose);
    reconcile_boxed(component, backend, workdir).await
}

pub(crate) async fn reconcile_boxed(
    component: Component,
    mut backend: Box<dyn ScmBackend>,
    workdir: &Path,
) -> Component {
    let sink: ConflictSink = Arc::new(Mutex::new(Vec::new()));
    backend.set_conflict_monitor(Arc::clone(&sink));

    let mut component = decide_and_execute(component, backend.as_ref(), workdir).await;

    let mut observed = sink.lock().unwrap();
    component.conflicts.append(&mut observed);
    drop(observed);
    component
}

/// The decision procedure proper, on an already-configured backend.
async fn decide_and_execute(
    mut component: Component,
    backend: &dyn ScmBackend,
    workdir: &Path,
) -> Component {
    let target = workdir.join(&component.path);

    let outcome = if target.is_dir() {
        let (current_uri, current_rev) = backend.inspect(&target).await;
        let (req_uri, req_rev) = backend.clean_uri(&component.uri, component.revision.as_deref());
        debug!(
            path = %component.path,
            current_uri = ?current_uri,
            current_rev = ?current_rev,
            req_uri = %req_uri,
            "inspected working copy"
        );
        // Same logical origin: exact equality on cleaned URIs. Revision is
        // deliberately excluded: a revision-only change is an update, never
        // a switch. An unreadable working copy reads as None and diverges.
        if current_uri.as_deref() == Some(req_uri.as_str()) {
            match backend.update(&target, req_rev.as_deref()).await {
                Ok(()) => Outcome::Update,
                Err(e) => {
                    error!(path = %component.path, error = %e, "update failed");
                    Outcome::UpdateError
                }
            }
        } else {
            match backend.switch(&target, &req_uri, req_rev.as_deref()).await {
                Ok(()) => Outcome::Switch,
                Err(e) => {
                    error!(path = %component.path, error = %e, "switch failed");
                    Outcome::SwitchError
                }
            }
        }
    } else if !target.exists() {
        let (req_uri, req_rev) = backend.clean_uri(&component.uri, component.revision.as_deref());
        match backend.checkout(&target, &req_uri, req_rev.as_deref()).await {
            Ok(()) => Outcome::Checkout,
            Err(e) => {
                error!(path = %component.path, error = %e, "checkout failed");
                Outcome::CheckoutError
            }
        }
    } else {
        error!(path = %component.path, "target exists but is not a directory");
        Outcome::Error
    };

    component.outcome = Some(outcome);
    component
}
