//! Handshake state machine
//!
//! The device announces itself with a single `0xFF` byte. The host answers
//! with the same byte and then discards the newline the device sends after
//! the acknowledgement.

use super::HandshakePolicy;

/// Reserved handshake byte
pub const SIGNAL_BYTE: u8 = 0xFF;

/// Unproductive reads allowed before the handshake fails
pub const MAX_ATTEMPTS: u32 = 3;

/// Handshake progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Nothing read yet
    NotStarted,
    /// Waiting for the signal byte
    AwaitingSignal {
        /// Unproductive reads so far
        attempts: u32,
    },
    /// Signal seen
    Completed,
    /// Attempt budget exhausted
    Failed,
}

impl HandshakeState {
    /// `Completed` or `Failed`
    pub fn is_terminal(&self) -> bool {
        matches!(self, HandshakeState::Completed | HandshakeState::Failed)
    }
}

/// Drives [`HandshakeState`] from the results of single-byte reads
#[derive(Debug, Clone)]
pub struct Handshake {
    state: HandshakeState,
    policy: HandshakePolicy,
}

impl Handshake {
    /// New machine in `NotStarted`
    pub fn new(policy: HandshakePolicy) -> Self {
        Self {
            state: HandshakeState::NotStarted,
            policy,
        }
    }

    /// Current state
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Attempts used so far
    pub fn attempts(&self) -> u32 {
        match self.state {
            HandshakeState::NotStarted | HandshakeState::Completed => 0,
            HandshakeState::AwaitingSignal { attempts } => attempts,
            HandshakeState::Failed => MAX_ATTEMPTS,
        }
    }

    /// Begin waiting for the signal byte
    pub fn start(&mut self) {
        if self.state == HandshakeState::NotStarted {
            self.state = HandshakeState::AwaitingSignal { attempts: 0 };
        }
    }

    /// Feed one read result (`None` = timed out) and return the new state.
    ///
    /// Terminal states absorb further input.
    pub fn observe(&mut self, read: Option<u8>) -> HandshakeState {
        self.start();
        let HandshakeState::AwaitingSignal { attempts } = self.state else {
            return self.state;
        };

        let counts = match read {
            Some(SIGNAL_BYTE) => {
                self.state = HandshakeState::Completed;
                return self.state;
            }
            Some(_) => self.policy == HandshakePolicy::AnyUnproductive,
            None => true,
        };

        if counts {
            let attempts = attempts + 1;
            self.state = if attempts >= MAX_ATTEMPTS {
                HandshakeState::Failed
            } else {
                HandshakeState::AwaitingSignal { attempts }
            };
        }
        self.state
    }
}
