use crate::error::{ClaimError, ClaimFailure};
use crate::keys::KeyMaterial;
use crate::types::{Confirmation, EnrichedBalance};

/// Ticket handed out when work starts. Completions with an outdated ticket are dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attempt(u64);

/// Snapshot produced by a successful lookup, kept until import succeeds or the user resets.
#[derive(Clone, Debug)]
pub struct ReadyClaim {
    pub key: KeyMaterial,
    pub balances: Vec<EnrichedBalance>,
    /// Set when the last import from this snapshot failed.
    pub last_failure: Option<ClaimFailure>,
}

#[derive(Clone, Debug)]
pub enum ClaimState {
    Idle,
    LookingUp,
    LookupFailed(ClaimFailure),
    Ready(ReadyClaim),
    Importing(ReadyClaim),
    Imported(Confirmation),
}

#[derive(Debug)]
pub struct ClaimSession {
    state: ClaimState,
    key_text: Option<String>,
    attempt: u64,
}

impl Default for ClaimSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimSession {
    pub fn new() -> Self {
        Self {
            state: ClaimState::Idle,
            key_text: None,
            attempt: 0,
        }
    }

    pub fn state(&self) -> &ClaimState {
        &self.state
    }

    /// Key text as the user entered it. Kept after a failed lookup so it can be edited.
    pub fn key_text(&self) -> Option<&str> {
        self.key_text.as_deref()
    }

    pub fn balances(&self) -> &[EnrichedBalance] {
        match &self.state {
            ClaimState::Ready(ready) | ClaimState::Importing(ready) => &ready.balances,
            _ => &[],
        }
    }

    pub fn failure(&self) -> Option<&ClaimFailure> {
        match &self.state {
            ClaimState::LookupFailed(failure) => Some(failure),
            ClaimState::Ready(ready) => ready.last_failure.as_ref(),
            _ => None,
        }
    }

    pub fn is_current(&self, attempt: Attempt) -> bool {
        attempt.0 == self.attempt
    }

    fn next_attempt(&mut self) -> Attempt {
        self.attempt += 1;
        Attempt(self.attempt)
    }

    pub fn begin_lookup(&mut self, key_text: &str) -> Attempt {
        self.key_text = Some(key_text.to_string());
        self.state = ClaimState::LookingUp;
        self.next_attempt()
    }

    /// Returns `false` if the result was discarded.
    pub fn finish_lookup(
        &mut self,
        attempt: Attempt,
        result: Result<(KeyMaterial, Vec<EnrichedBalance>), ClaimFailure>,
    ) -> bool {
        if !self.is_current(attempt) || !matches!(self.state, ClaimState::LookingUp) {
            tracing::debug!("discarding stale lookup result {:?}", attempt);
            return false;
        }
        self.state = match result {
            Ok((key, balances)) => ClaimState::Ready(ReadyClaim {
                key,
                balances,
                last_failure: None,
            }),
            Err(failure) => ClaimState::LookupFailed(failure),
        };
        true
    }

    pub fn begin_import(&mut self) -> Result<(Attempt, ReadyClaim), ClaimError> {
        match std::mem::replace(&mut self.state, ClaimState::Idle) {
            ClaimState::Ready(mut ready) => {
                ready.last_failure = None;
                self.state = ClaimState::Importing(ready.clone());
                Ok((self.next_attempt(), ready))
            }
            other => {
                self.state = other;
                Err(ClaimError::NotReady)
            }
        }
    }

    /// Success drops the snapshot and the key. Failure goes back to `Ready` with balances intact.
    pub fn finish_import(
        &mut self,
        attempt: Attempt,
        result: Result<Confirmation, ClaimFailure>,
    ) -> bool {
        if !self.is_current(attempt) {
            tracing::debug!("discarding stale import result {:?}", attempt);
            return false;
        }
        match std::mem::replace(&mut self.state, ClaimState::Idle) {
            ClaimState::Importing(mut ready) => {
                match result {
                    Ok(confirmation) => {
                        self.key_text = None;
                        self.state = ClaimState::Imported(confirmation);
                    }
                    Err(failure) => {
                        ready.last_failure = Some(failure);
                        self.state = ClaimState::Ready(ready);
                    }
                }
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Abandons everything, including the entered key text.
    pub fn reset(&mut self) {
        self.key_text = None;
        self.state = ClaimState::Idle;
        self.next_attempt();
    }

    /// Abandons the looked up balances but keeps the entered key text.
    pub fn reset_balances(&mut self) {
        self.state = ClaimState::Idle;
        self.next_attempt();
    }
}
