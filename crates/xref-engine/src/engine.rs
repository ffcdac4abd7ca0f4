//! Confirmation engine: reserve, verify, patch.
//!
//! One confirmation request is one logical flow of control. The public
//! placeholder is reserved first, then the private transaction is verified
//! under bounded retries, then the placeholder patch races a fixed timer.
//! Reservation-before-verification is applied uniformly to both add and
//! edit confirmations.
//!
//! The patch race has one accepted eventual-consistency gap: when the timer
//! wins, the losing patch submission is abandoned, not cancelled. The RPC
//! call may still complete node-side after the timeout was already reported,
//! in which case the placeholder is patched anyway and no record is
//! retracted.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use xref_client::{CallData, ContractHandle, LedgerClient};
use xref_registry::Registry;
use xref_types::{Address, Operation, OperationKind, OperationStatus, SubjectId, TxId};

use crate::decoder::{EventDecoder, EventPresence};
use crate::error::{EngineError, EngineResult};
use crate::report::{PublicReceiptInfo, RecordAnchor, SenderMismatch, SyncReport, VerifiedEffect};

/// Retry and race bounds for one confirmation request.
///
/// The verification loop is a cooperative fixed-interval backoff, not an
/// exponential one: ten polls two seconds apart bound the worst case at
/// twenty seconds for an HTTP caller.
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub patch_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            retry_delay: Duration::from_millis(2000),
            patch_timeout: Duration::from_secs(30),
        }
    }
}

/// Draft fields of a catalog item.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
}

/// A contract call to prepare without submitting.
///
/// Add and Edit later flow through `confirm_and_sync`; Rate, Like, and
/// Comment stop at preparation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PrepareAction {
    Add { item: ItemDraft },
    Edit { subject: SubjectId, item: ItemDraft },
    Rate { subject: SubjectId, rating: u8 },
    Like { subject: SubjectId },
    Comment { subject: SubjectId, text: String },
}

/// An ABI payload ready for the caller's own signing flow.
///
/// The wallet signs, the client submits; nothing is sent from here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PreparedCall {
    pub status: OperationStatus,
    pub method: String,
    pub call_data: CallData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<SubjectId>,
}

/// Everything `confirm_and_sync` needs; the caller round-trips the
/// transaction id, subject, and initiator from its own prepare/submit flow.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConfirmRequest {
    pub kind: OperationKind,
    pub private_tx_id: TxId,
    pub subject_id: SubjectId,
    pub initiator: Address,
    pub expected_event: String,
}

enum VerifyOutcome {
    Verified(VerifiedEffect),
    Failed {
        message: String,
        mismatch: Option<SenderMismatch>,
    },
    Inconclusive {
        attempts: u32,
    },
}

/// Orchestrates one confirmation request across both ledgers.
///
/// Holds no durable state of its own: an [`Operation`] lives for the span
/// of one call and crash recovery belongs to the caller.
pub struct ConfirmationEngine<P: ?Sized, C: ?Sized> {
    catalog: ContractHandle<P>,
    decoder: EventDecoder,
    registry: Registry<C>,
    config: EngineConfig,
}

impl<P, C> ConfirmationEngine<P, C>
where
    P: LedgerClient + ?Sized,
    C: LedgerClient + ?Sized,
{
    pub fn new(catalog: ContractHandle<P>, registry: Registry<C>, config: EngineConfig) -> Self {
        let decoder = EventDecoder::new(catalog.address().clone());
        Self {
            catalog,
            decoder,
            registry,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build the ABI payload for a contract method without submitting it.
    ///
    /// Edits are only prepared for the item's owner, checked against the
    /// private ledger first.
    pub async fn prepare(
        &self,
        initiator: &Address,
        action: PrepareAction,
    ) -> EngineResult<PreparedCall> {
        let (method, args, subject) = match action {
            PrepareAction::Add { item } => (
                "add_item",
                vec![
                    json!(item.name),
                    json!(item.description),
                    json!(item.category),
                    json!(item.attachment),
                ],
                None,
            ),
            PrepareAction::Edit { subject, item } => {
                self.ensure_owner(&subject, initiator).await?;
                (
                    "edit_item",
                    vec![
                        json!(subject),
                        json!(item.name),
                        json!(item.description),
                        json!(item.category),
                        json!(item.attachment),
                    ],
                    Some(subject),
                )
            }
            PrepareAction::Rate { subject, rating } => {
                if !(1..=5).contains(&rating) {
                    return Err(EngineError::InvalidRating(rating));
                }
                ("rate_item", vec![json!(subject), json!(rating)], Some(subject))
            }
            PrepareAction::Like { subject } => {
                ("like_item", vec![json!(subject)], Some(subject))
            }
            PrepareAction::Comment { subject, text } => (
                "comment_item",
                vec![json!(subject), json!(text)],
                Some(subject),
            ),
        };

        let call_data = self.catalog.call_data(method, &args);
        tracing::info!(method, initiator = %initiator, "prepared unsubmitted call payload");

        Ok(PreparedCall {
            status: OperationStatus::Prepared,
            method: method.to_string(),
            call_data,
            subject,
        })
    }

    /// Run the full reserve → verify → patch protocol for an operation the
    /// caller already submitted to the private ledger.
    pub async fn confirm_and_sync(&self, request: ConfirmRequest) -> SyncReport {
        let ConfirmRequest {
            kind,
            private_tx_id,
            subject_id,
            initiator,
            expected_event,
        } = request;

        let mut op = Operation::submitted(
            kind,
            private_tx_id.clone(),
            subject_id.clone(),
            initiator.clone(),
        );
        tracing::info!(
            kind = %kind,
            tx = %private_tx_id.short(),
            subject = %subject_id,
            "confirmation started"
        );

        // Step 1: reserve the placeholder record. The count read first is a
        // hint for the logs; concurrent confirmations may observe the same
        // value, so the id that matters comes from the reservation itself.
        step(&mut op, OperationStatus::Recording);
        if let Ok(count) = self.registry.count_records().await {
            tracing::debug!(expected_record_id = count, "record count before reservation");
        }

        let reservation = match self.registry.reserve_record(&subject_id, &initiator).await {
            Ok(reservation) => reservation,
            Err(e) => {
                step(&mut op, OperationStatus::RecordFailed);
                tracing::error!(error = %e, "reservation failed before verification");
                return SyncReport::Failed {
                    status: op.status(),
                    message: e.to_string(),
                    mismatch: None,
                };
            }
        };
        step(&mut op, OperationStatus::Recorded);

        let record = RecordAnchor {
            record_id: reservation.record_id,
            reservation_tx_id: reservation.tx_id,
            private_tx_id: private_tx_id.clone(),
            subject_id,
        };

        // Step 2: verify the private transaction under bounded retries.
        step(&mut op, OperationStatus::Verifying);
        let verified = match self
            .verify(&private_tx_id, &initiator, &expected_event)
            .await
        {
            VerifyOutcome::Verified(effect) => {
                step(&mut op, OperationStatus::Verified);
                effect
            }
            VerifyOutcome::Failed { message, mismatch } => {
                step(&mut op, OperationStatus::VerificationFailed);
                tracing::error!(tx = %private_tx_id.short(), message, "verification failed");
                return SyncReport::Failed {
                    status: op.status(),
                    message,
                    mismatch,
                };
            }
            VerifyOutcome::Inconclusive { attempts } => {
                // A transaction that might still mine later must not be
                // reported as denied; the caller gets success with a warning.
                tracing::warn!(
                    tx = %private_tx_id.short(),
                    attempts,
                    "verification inconclusive, reporting partial success"
                );
                return SyncReport::Partial {
                    status: op.status(),
                    record,
                    warning: format!(
                        "private transaction could not be verified within {attempts} attempts; \
                         it may still mine later and the record keeps its placeholder"
                    ),
                    is_timeout: false,
                    verified: None,
                };
            }
        };

        // Step 3: race the patch against the clock. Whichever settles first
        // decides; the loser is abandoned, not cancelled.
        step(&mut op, OperationStatus::Patching);
        let patch = tokio::time::timeout(
            self.config.patch_timeout,
            self.registry
                .patch_record_hash(record.record_id, &private_tx_id, None),
        )
        .await;

        match patch {
            Ok(Ok(receipt)) => {
                step(&mut op, OperationStatus::Synced);
                tracing::info!(
                    record_id = %record.record_id,
                    patch_tx = %receipt.tx_id.short(),
                    "confirmation synced"
                );
                SyncReport::Synced {
                    status: op.status(),
                    record,
                    patch: PublicReceiptInfo {
                        tx_id: receipt.tx_id,
                        block_number: receipt.block_number,
                        gas_used: receipt.gas_used,
                    },
                    verified,
                }
            }
            Ok(Err(e)) => {
                let message = e.to_string();
                let is_timeout = message.to_lowercase().contains("timeout");
                step(
                    &mut op,
                    if is_timeout {
                        OperationStatus::RecordTimeout
                    } else {
                        OperationStatus::PatchFailed
                    },
                );
                tracing::warn!(record_id = %record.record_id, error = %message, "patch failed");
                let warning = if is_timeout {
                    format!("public network congestion: {message}; the record keeps its placeholder")
                } else {
                    format!("record reserved but the patch failed: {message}")
                };
                SyncReport::Partial {
                    status: op.status(),
                    record,
                    warning,
                    is_timeout,
                    verified: Some(verified),
                }
            }
            Err(_elapsed) => {
                step(&mut op, OperationStatus::RecordTimeout);
                tracing::warn!(
                    record_id = %record.record_id,
                    timeout_secs = self.config.patch_timeout.as_secs(),
                    "patch lost the race against the timer"
                );
                SyncReport::Partial {
                    status: op.status(),
                    record,
                    warning: format!(
                        "public network congestion: patch did not settle within {} seconds; \
                         the record keeps its placeholder",
                        self.config.patch_timeout.as_secs()
                    ),
                    is_timeout: true,
                    verified: Some(verified),
                }
            }
        }
    }

    async fn verify(
        &self,
        private_tx_id: &TxId,
        initiator: &Address,
        expected_event: &str,
    ) -> VerifyOutcome {
        for attempt in 1..=self.config.max_retries {
            match self.catalog.client().get_receipt(private_tx_id).await {
                Ok(Some(receipt)) => {
                    // A present receipt is a definite outcome either way;
                    // no retries are spent past this point.
                    if receipt.status == xref_client::ReceiptStatus::Failure {
                        return VerifyOutcome::Failed {
                            message: "transaction reverted on the private ledger".into(),
                            mismatch: None,
                        };
                    }
                    return match self.decoder.decode(&receipt, expected_event) {
                        Ok(EventPresence::Found(event)) => {
                            if &event.sender != initiator {
                                VerifyOutcome::Failed {
                                    message: "initiator does not match the transaction sender"
                                        .into(),
                                    mismatch: Some(SenderMismatch {
                                        expected: initiator.clone(),
                                        actual: event.sender,
                                    }),
                                }
                            } else {
                                VerifyOutcome::Verified(VerifiedEffect {
                                    sender: event.sender,
                                    block_number: event.block_number,
                                    gas_used: event.gas_used,
                                })
                            }
                        }
                        Ok(EventPresence::EventAbsent) => VerifyOutcome::Failed {
                            message: format!(
                                "transaction succeeded but did not emit {expected_event}"
                            ),
                            mismatch: None,
                        },
                        Ok(EventPresence::NoContractLogs) => VerifyOutcome::Failed {
                            message: "transaction emitted no logs from the catalog contract"
                                .into(),
                            mismatch: None,
                        },
                        Err(e) => VerifyOutcome::Failed {
                            message: e.to_string(),
                            mismatch: None,
                        },
                    };
                }
                Ok(None) => {
                    tracing::debug!(
                        attempt,
                        max = self.config.max_retries,
                        "receipt not yet available"
                    );
                }
                Err(e) => {
                    // Transport blips are transient, never terminal.
                    tracing::warn!(attempt, error = %e, "transient poll failure");
                }
            }
            if attempt < self.config.max_retries {
                tokio::time::sleep(self.config.retry_delay).await;
            }
        }
        VerifyOutcome::Inconclusive {
            attempts: self.config.max_retries,
        }
    }

    async fn ensure_owner(&self, subject: &SubjectId, initiator: &Address) -> EngineResult<()> {
        let item = self
            .catalog
            .view("get_item", vec![json!(subject)])
            .await
            .map_err(|e| EngineError::UnknownItem {
                subject: subject.clone(),
                message: e.to_string(),
            })?;

        let owner = item
            .get("owner")
            .and_then(|v| v.as_str())
            .ok_or_else(|| EngineError::UnknownItem {
                subject: subject.clone(),
                message: "item payload carries no owner".into(),
            })?;
        let owner = Address::parse(owner)?;

        if &owner != initiator {
            return Err(EngineError::OwnershipDenied(subject.clone()));
        }
        Ok(())
    }
}

/// The transition table in `xref-types` enforces the forward chain; the
/// engine only ever requests legal successors.
fn step(op: &mut Operation, next: OperationStatus) {
    op.advance(next)
        .unwrap_or_else(|e| unreachable!("engine requested an illegal transition: {e}"));
}
