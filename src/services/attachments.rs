use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::attachment,
    errors::ServiceError,
    services::documents,
    workflow::DocumentKind,
};

/// Largest file the metadata store accepts, 25 MiB.
pub const MAX_ATTACHMENT_BYTES: i64 = 25 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct AttachmentInput {
    pub document_kind: DocumentKind,
    pub document_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    #[validate(length(min = 1, max = 100))]
    pub content_type: String,
    #[validate(range(min = 0, max = 26214400))]
    pub size_bytes: i64,
    /// Where the bytes live, e.g. an object store key
    #[validate(length(min = 1, max = 500))]
    pub storage_key: String,
    #[validate(length(max = 100))]
    pub uploaded_by: Option<String>,
}

#[derive(Clone)]
pub struct AttachmentService {
    db: Arc<DatabaseConnection>,
}

impl AttachmentService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, input), fields(kind = %input.document_kind, document_id = %input.document_id))]
    pub async fn create(&self, input: AttachmentInput) -> Result<attachment::Model, ServiceError> {
        input.validate()?;
        if input.file_name.contains(['/', '\\']) {
            return Err(ServiceError::ValidationError(
                "file name cannot contain path separators".into(),
            ));
        }
        documents::find_any(&*self.db, input.document_kind, input.document_id).await?;

        let attachment = attachment::ActiveModel {
            id: Set(Uuid::new_v4()),
            document_kind: Set(input.document_kind),
            document_id: Set(input.document_id),
            file_name: Set(input.file_name.trim().to_string()),
            content_type: Set(input.content_type.trim().to_ascii_lowercase()),
            size_bytes: Set(input.size_bytes),
            storage_key: Set(input.storage_key),
            uploaded_by: Set(documents::clean(input.uploaded_by)),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await
        .map_err(|e| {
            error!("Failed to insert attachment: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(attachment_id = %attachment.id, file_name = %attachment.file_name, "Attachment recorded");
        Ok(attachment)
    }

    pub async fn list_for_document(
        &self,
        kind: DocumentKind,
        document_id: Uuid,
    ) -> Result<Vec<attachment::Model>, ServiceError> {
        let attachments = attachment::Entity::find()
            .filter(attachment::Column::DocumentKind.eq(kind))
            .filter(attachment::Column::DocumentId.eq(document_id))
            .order_by_asc(attachment::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(attachments)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = attachment::Entity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Attachment", id));
        }
        info!(attachment_id = %id, "Attachment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_files_fail_validation() {
        let input = AttachmentInput {
            document_kind: DocumentKind::ExportOrder,
            document_id: Uuid::new_v4(),
            file_name: "packing-list.pdf".into(),
            content_type: "application/pdf".into(),
            size_bytes: MAX_ATTACHMENT_BYTES + 1,
            storage_key: "docs/packing-list.pdf".into(),
            uploaded_by: None,
        };
        assert!(input.validate().is_err());
    }
}
