//! Deployment progress notifications.
//!
//! Callers subscribe through a `DeploymentObserver` instead of sharing
//! mutable "in progress" state with the orchestrator. Each started step
//! ends with exactly one `Finished` event, delivered by a drop guard so it
//! also fires when the step fails or its future is dropped mid-flight.

use launchpad_core::types::{Address, TxHash};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeployStep {
    Token,
    Locker,
    Distribution,
}

impl std::fmt::Display for DeployStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DeployStep::Token => "token deployment",
            DeployStep::Locker => "locker deployment",
            DeployStep::Distribution => "locker distribution",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeploymentEvent {
    Started { step: DeployStep },
    /// Broadcast; waiting to be mined.
    Submitted { step: DeployStep, tx_hash: TxHash },
    Mined {
        step: DeployStep,
        tx_hash: TxHash,
        contract_address: Option<Address>,
    },
    Finished { step: DeployStep, success: bool },
}

pub trait DeploymentObserver: Send + Sync {
    fn on_event(&self, event: DeploymentEvent);
}

/// Ignores every event.
impl DeploymentObserver for () {
    fn on_event(&self, _event: DeploymentEvent) {}
}

/// Emits `Started` on creation and `Finished` exactly once on drop.
pub(crate) struct ProgressGuard<'a> {
    observer: &'a dyn DeploymentObserver,
    step: DeployStep,
    success: bool,
}

impl<'a> ProgressGuard<'a> {
    pub(crate) fn start(observer: &'a dyn DeploymentObserver, step: DeployStep) -> Self {
        observer.on_event(DeploymentEvent::Started { step });
        Self {
            observer,
            step,
            success: false,
        }
    }

    pub(crate) fn submitted(&self, tx_hash: TxHash) {
        self.observer.on_event(DeploymentEvent::Submitted {
            step: self.step,
            tx_hash,
        });
    }

    pub(crate) fn mined(&self, tx_hash: TxHash, contract_address: Option<Address>) {
        self.observer.on_event(DeploymentEvent::Mined {
            step: self.step,
            tx_hash,
            contract_address,
        });
    }

    pub(crate) fn complete(mut self) {
        self.success = true;
    }
}

impl Drop for ProgressGuard<'_> {
    fn drop(&mut self) {
        self.observer.on_event(DeploymentEvent::Finished {
            step: self.step,
            success: self.success,
        });
    }
}
