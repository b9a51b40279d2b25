use chrono::{Datelike, NaiveDate};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use tracing::{debug, error};

use crate::{entities::document_sequence, errors::ServiceError, workflow::DocumentKind};

/// Formats a document number such as `QT-2026-0007`.
pub fn format_number(kind: DocumentKind, year: i32, sequence: i64) -> String {
    format!("{}-{}-{:04}", kind.number_prefix(), year, sequence)
}

fn sequence_key(kind: DocumentKind, year: i32) -> String {
    format!("{}-{}", kind.number_prefix(), year)
}

/// Hands out the next number for `kind` in the year of `date`.
///
/// Must run inside the transaction that inserts the document so a rollback
/// also gives the number back.
pub async fn next_number<C: ConnectionTrait>(
    conn: &C,
    kind: DocumentKind,
    date: NaiveDate,
) -> Result<String, ServiceError> {
    let year = date.year();
    let key = sequence_key(kind, year);

    let existing = document_sequence::Entity::find_by_id(key.clone())
        .one(conn)
        .await
        .map_err(|e| {
            error!(%key, "Failed to read document sequence: {}", e);
            ServiceError::DatabaseError(e)
        })?;

    let next = match existing {
        Some(sequence) => {
            let next = sequence.last_value + 1;
            let mut active: document_sequence::ActiveModel = sequence.into();
            active.last_value = Set(next);
            active.update(conn).await?;
            next
        }
        None => {
            document_sequence::ActiveModel {
                key: Set(key.clone()),
                last_value: Set(1),
            }
            .insert(conn)
            .await?;
            1
        }
    };

    debug!(%key, next, "allocated document number");
    Ok(format_number(kind, year, next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_zero_padded_per_prefix() {
        assert_eq!(format_number(DocumentKind::Quote, 2026, 7), "QT-2026-0007");
        assert_eq!(
            format_number(DocumentKind::ShippingBill, 2027, 12345),
            "SB-2027-12345"
        );
        assert_eq!(sequence_key(DocumentKind::Enquiry, 2026), "ENQ-2026");
    }
}
