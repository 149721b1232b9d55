mod authenticate;
mod register;

pub use authenticate::authenticate;
pub use register::register;

use std::fmt;

use crate::page::{Navigation, Navigator};
use crate::types::VerificationResult;

/// Progress of a single flow instance.
///
/// `Idle → AwaitingOptions → AwaitingCeremony → AwaitingVerification →
/// NavigatedSuccess | NavigatedFailure`, with `Aborted` reachable only from
/// `AwaitingCeremony`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    AwaitingOptions,
    AwaitingCeremony,
    AwaitingVerification,
    NavigatedSuccess,
    NavigatedFailure,
    Aborted,
}

impl FlowState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            FlowState::NavigatedSuccess | FlowState::NavigatedFailure | FlowState::Aborted
        )
    }

    fn can_enter(self, next: FlowState) -> bool {
        use FlowState::*;
        matches!(
            (self, next),
            (Idle, AwaitingOptions)
                | (AwaitingOptions, AwaitingCeremony)
                | (AwaitingCeremony, AwaitingVerification)
                | (AwaitingCeremony, Aborted)
                | (AwaitingVerification, NavigatedSuccess)
                | (AwaitingVerification, NavigatedFailure)
        )
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlowState::Idle => "idle",
            FlowState::AwaitingOptions => "awaiting-options",
            FlowState::AwaitingCeremony => "awaiting-ceremony",
            FlowState::AwaitingVerification => "awaiting-verification",
            FlowState::NavigatedSuccess => "navigated-success",
            FlowState::NavigatedFailure => "navigated-failure",
            FlowState::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// Result of a flow that reached the verification endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowOutcome {
    /// Either `NavigatedSuccess` or `NavigatedFailure`
    pub state: FlowState,
    pub navigation: Navigation,
    pub result: VerificationResult,
}

impl FlowOutcome {
    pub fn is_verified(&self) -> bool {
        self.result.verified
    }
}

/// Tracks and logs the state of one flow instance.
struct FlowTracker {
    kind: &'static str,
    state: FlowState,
}

impl FlowTracker {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            state: FlowState::Idle,
        }
    }

    fn enter(&mut self, next: FlowState) {
        debug_assert!(
            self.state.can_enter(next),
            "invalid {} flow transition {} -> {}",
            self.kind,
            self.state,
            next
        );
        tracing::debug!("{} flow: {} -> {}", self.kind, self.state, next);
        self.state = next;
    }

    /// Navigate according to the verification result and close the flow.
    fn finish<N: Navigator + ?Sized>(
        mut self,
        result: VerificationResult,
        success: Navigation,
        failure: Navigation,
        navigator: &N,
    ) -> FlowOutcome {
        let (state, navigation) = if result.verified {
            (FlowState::NavigatedSuccess, success)
        } else {
            (FlowState::NavigatedFailure, failure)
        };
        self.enter(state);

        tracing::info!(
            "{} flow finished: verified={}, navigation={:?}",
            self.kind,
            result.verified,
            navigation
        );
        if !result.msg.is_empty() {
            tracing::debug!("{} verification message: {}", self.kind, result.msg);
        }

        navigator.navigate(&navigation);

        FlowOutcome {
            state,
            navigation,
            result,
        }
    }
}
