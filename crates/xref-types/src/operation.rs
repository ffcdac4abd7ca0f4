use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::TypeError;
use crate::record::SubjectId;
use crate::tx::TxId;

/// Kind of catalog operation that is mirrored to the public ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Add,
    Edit,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Edit => write!(f, "edit"),
        }
    }
}

/// Confirmation lifecycle state.
///
/// The forward chain reflects the engine's uniform ordering: the public
/// placeholder is reserved first, then the private transaction is verified,
/// then the placeholder is patched. Failure states hang off the step that
/// produced them. `Synced` and the four failure states are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Prepared,
    Submitted,
    Recording,
    Recorded,
    Verifying,
    Verified,
    Patching,
    Synced,
    VerificationFailed,
    RecordTimeout,
    RecordFailed,
    PatchFailed,
}

impl OperationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Synced
                | Self::VerificationFailed
                | Self::RecordTimeout
                | Self::RecordFailed
                | Self::PatchFailed
        )
    }

    /// Position in the forward chain; failure states have no rank.
    fn rank(self) -> Option<u8> {
        match self {
            Self::Prepared => Some(0),
            Self::Submitted => Some(1),
            Self::Recording => Some(2),
            Self::Recorded => Some(3),
            Self::Verifying => Some(4),
            Self::Verified => Some(5),
            Self::Patching => Some(6),
            Self::Synced => Some(7),
            _ => None,
        }
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn permits(self, next: OperationStatus) -> bool {
        if let (Some(from), Some(to)) = (self.rank(), next.rank()) {
            return to == from + 1;
        }
        matches!(
            (self, next),
            (Self::Recording, Self::RecordFailed)
                | (Self::Verifying, Self::VerificationFailed)
                | (Self::Patching, Self::RecordTimeout)
                | (Self::Patching, Self::PatchFailed)
        )
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Prepared => "prepared",
            Self::Submitted => "submitted",
            Self::Recording => "recording",
            Self::Recorded => "recorded",
            Self::Verifying => "verifying",
            Self::Verified => "verified",
            Self::Patching => "patching",
            Self::Synced => "synced",
            Self::VerificationFailed => "verification_failed",
            Self::RecordTimeout => "record_timeout",
            Self::RecordFailed => "record_failed",
            Self::PatchFailed => "patch_failed",
        };
        write!(f, "{name}")
    }
}

/// A logical unit of work moving through the confirmation protocol.
///
/// Created when a confirmation request arrives and dropped once a terminal
/// report is returned; the engine keeps no durable state between calls.
/// The initiator must equal the recovered sender of `private_tx_id` once
/// verification completes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationKind,
    pub private_tx_id: TxId,
    pub subject_id: SubjectId,
    pub initiator: Address,
    status: OperationStatus,
}

impl Operation {
    /// An operation whose private transaction was already submitted by the
    /// caller's signing flow.
    pub fn submitted(
        kind: OperationKind,
        private_tx_id: TxId,
        subject_id: SubjectId,
        initiator: Address,
    ) -> Self {
        Self {
            kind,
            private_tx_id,
            subject_id,
            initiator,
            status: OperationStatus::Submitted,
        }
    }

    pub fn status(&self) -> OperationStatus {
        self.status
    }

    /// Move to the next state, enforcing the monotonic transition order.
    pub fn advance(&mut self, next: OperationStatus) -> Result<(), TypeError> {
        if !self.status.permits(next) {
            return Err(TypeError::StatusRegression {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op() -> Operation {
        Operation::submitted(
            OperationKind::Add,
            TxId::from_bytes(&[1; 32]),
            SubjectId::parse("42").unwrap(),
            Address::from_bytes(&[9; 20]),
        )
    }

    #[test]
    fn forward_chain_advances_in_order() {
        let mut o = op();
        for next in [
            OperationStatus::Recording,
            OperationStatus::Recorded,
            OperationStatus::Verifying,
            OperationStatus::Verified,
            OperationStatus::Patching,
            OperationStatus::Synced,
        ] {
            o.advance(next).unwrap();
        }
        assert_eq!(o.status(), OperationStatus::Synced);
        assert!(o.status().is_terminal());
    }

    #[test]
    fn skipping_a_state_is_rejected() {
        let mut o = op();
        let err = o.advance(OperationStatus::Verified).unwrap_err();
        assert!(matches!(err, TypeError::StatusRegression { .. }));
    }

    #[test]
    fn regression_is_rejected() {
        let mut o = op();
        o.advance(OperationStatus::Recording).unwrap();
        o.advance(OperationStatus::Recorded).unwrap();
        let err = o.advance(OperationStatus::Recording).unwrap_err();
        assert!(matches!(err, TypeError::StatusRegression { .. }));
    }

    #[test]
    fn failure_states_only_from_their_step() {
        assert!(OperationStatus::Recording.permits(OperationStatus::RecordFailed));
        assert!(OperationStatus::Verifying.permits(OperationStatus::VerificationFailed));
        assert!(OperationStatus::Patching.permits(OperationStatus::RecordTimeout));
        assert!(OperationStatus::Patching.permits(OperationStatus::PatchFailed));

        assert!(!OperationStatus::Submitted.permits(OperationStatus::VerificationFailed));
        assert!(!OperationStatus::Verifying.permits(OperationStatus::RecordTimeout));
        assert!(!OperationStatus::Recorded.permits(OperationStatus::PatchFailed));
    }

    #[test]
    fn terminal_states_permit_nothing() {
        for terminal in [
            OperationStatus::Synced,
            OperationStatus::VerificationFailed,
            OperationStatus::RecordTimeout,
            OperationStatus::RecordFailed,
            OperationStatus::PatchFailed,
        ] {
            assert!(terminal.is_terminal());
            assert!(!terminal.permits(OperationStatus::Verifying));
            assert!(!terminal.permits(OperationStatus::Synced));
        }
    }

    #[test]
    fn status_serde_is_snake_case() {
        let json = serde_json::to_string(&OperationStatus::RecordTimeout).unwrap();
        assert_eq!(json, "\"record_timeout\"");
    }

    #[test]
    fn kind_display() {
        assert_eq!(OperationKind::Add.to_string(), "add");
        assert_eq!(OperationKind::Edit.to_string(), "edit");
    }
}
