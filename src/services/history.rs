use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::error;
use uuid::Uuid;

use crate::{
    entities::status_history,
    errors::ServiceError,
    workflow::{DocumentKind, DocumentStatus},
};

pub const CREATED: &str = "create";
pub const CONVERTED_FROM: &str = "convert_from";

/// One audit row to write.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub kind: DocumentKind,
    pub document_id: Uuid,
    pub from: Option<DocumentStatus>,
    pub to: DocumentStatus,
    pub action: String,
    pub actor: Option<String>,
    pub note: Option<String>,
    pub version: i32,
}

impl HistoryEntry {
    /// Entry for a freshly inserted draft.
    pub fn created(kind: DocumentKind, document_id: Uuid, actor: Option<String>) -> Self {
        Self {
            kind,
            document_id,
            from: None,
            to: DocumentStatus::Draft,
            action: CREATED.to_string(),
            actor,
            note: None,
            version: 1,
        }
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }
}

pub async fn record<C: ConnectionTrait>(
    conn: &C,
    entry: HistoryEntry,
) -> Result<status_history::Model, ServiceError> {
    status_history::ActiveModel {
        id: Set(Uuid::new_v4()),
        document_kind: Set(entry.kind),
        document_id: Set(entry.document_id),
        from_status: Set(entry.from),
        to_status: Set(entry.to),
        action: Set(entry.action),
        actor: Set(entry.actor),
        note: Set(entry.note),
        version: Set(entry.version),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await
    .map_err(|e| {
        error!(kind = %entry.kind, document_id = %entry.document_id, "Failed to write status history: {}", e);
        ServiceError::DatabaseError(e)
    })
}

/// Transitions of one document, oldest first.
pub async fn list<C: ConnectionTrait>(
    conn: &C,
    kind: DocumentKind,
    document_id: Uuid,
) -> Result<Vec<status_history::Model>, ServiceError> {
    let rows = status_history::Entity::find()
        .filter(status_history::Column::DocumentKind.eq(kind))
        .filter(status_history::Column::DocumentId.eq(document_id))
        .order_by_asc(status_history::Column::CreatedAt)
        .all(conn)
        .await?;
    Ok(rows)
}

pub async fn delete_all<C: ConnectionTrait>(
    conn: &C,
    kind: DocumentKind,
    document_id: Uuid,
) -> Result<(), ServiceError> {
    status_history::Entity::delete_many()
        .filter(status_history::Column::DocumentKind.eq(kind))
        .filter(status_history::Column::DocumentId.eq(document_id))
        .exec(conn)
        .await?;
    Ok(())
}
