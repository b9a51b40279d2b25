use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::workflow::{DocumentKind, DocumentStatus};

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event after a commit. The write already happened, so a closed
    /// channel is only worth a warning.
    pub async fn publish(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("{}", e);
        }
    }
}

/// Domain events emitted by the services once their transaction commits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    DocumentCreated {
        kind: DocumentKind,
        id: Uuid,
        number: String,
    },
    DocumentStatusChanged {
        kind: DocumentKind,
        id: Uuid,
        from: DocumentStatus,
        to: DocumentStatus,
        action: String,
    },
    DocumentRevised {
        kind: DocumentKind,
        id: Uuid,
        version: i32,
    },
    DocumentConverted {
        source_kind: DocumentKind,
        source_id: Uuid,
        target_kind: DocumentKind,
        target_id: Uuid,
        target_number: String,
    },
    DocumentDeleted {
        kind: DocumentKind,
        id: Uuid,
    },
    PaymentRecorded {
        payment_id: Uuid,
        kind: DocumentKind,
        document_id: Uuid,
        amount: Decimal,
        currency: String,
    },
    BulkUploadCompleted {
        target: String,
        inserted: usize,
        skipped: usize,
        finished_at: DateTime<Utc>,
    },
}

/// Creates the channel the services publish on.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSender::new(tx), rx)
}

/// Drains the event channel, logging each event until every sender is gone.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::DocumentCreated { kind, id, number } => {
                info!(%kind, %id, %number, "document created");
            }
            Event::DocumentStatusChanged {
                kind,
                id,
                from,
                to,
                action,
            } => {
                info!(%kind, %id, %from, %to, %action, "document status changed");
            }
            Event::DocumentRevised { kind, id, version } => {
                info!(%kind, %id, version, "document revised");
            }
            Event::DocumentConverted {
                source_kind,
                source_id,
                target_kind,
                target_id,
                target_number,
            } => {
                info!(
                    %source_kind,
                    %source_id,
                    %target_kind,
                    %target_id,
                    %target_number,
                    "document converted"
                );
            }
            Event::DocumentDeleted { kind, id } => {
                info!(%kind, %id, "document deleted");
            }
            Event::PaymentRecorded {
                payment_id,
                kind,
                document_id,
                amount,
                currency,
            } => {
                info!(%payment_id, %kind, %document_id, %amount, %currency, "payment recorded");
            }
            Event::BulkUploadCompleted {
                target,
                inserted,
                skipped,
                finished_at,
            } => {
                if skipped > 0 {
                    warn!(%target, inserted, skipped, %finished_at, "bulk upload completed with skipped rows");
                } else {
                    info!(%target, inserted, %finished_at, "bulk upload completed");
                }
            }
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn published_events_reach_the_receiver() {
        let (sender, mut rx) = channel(4);
        let id = Uuid::new_v4();
        sender
            .publish(Event::DocumentDeleted {
                kind: DocumentKind::Quote,
                id,
            })
            .await;

        match rx.recv().await {
            Some(Event::DocumentDeleted { kind, id: got }) => {
                assert_eq!(kind, DocumentKind::Quote);
                assert_eq!(got, id);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_fails_once_the_consumer_is_gone() {
        let (sender, rx) = channel(1);
        drop(rx);
        let result = sender
            .send(Event::DocumentRevised {
                kind: DocumentKind::Quote,
                id: Uuid::new_v4(),
                version: 2,
            })
            .await;
        assert!(result.is_err());
        // publish swallows the same failure
        sender
            .publish(Event::DocumentRevised {
                kind: DocumentKind::Quote,
                id: Uuid::new_v4(),
                version: 3,
            })
            .await;
    }
}
