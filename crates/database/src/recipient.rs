//! Recipient directory operations.

use std::collections::BTreeSet;

use flood_core::Channel;
use sqlx::SqlitePool;

use crate::error::{unique_violation, DatabaseError, Result};
use crate::models::{NewRecipient, RecipientRecord};
use crate::validation::{validate_language, validate_phone};

/// Register a recipient in a region.
pub async fn create_recipient(pool: &SqlitePool, recipient: &NewRecipient) -> Result<RecipientRecord> {
    let phone = recipient.phone_number.trim();
    validate_phone(phone)?;

    let language = recipient.language.as_deref().unwrap_or("en");
    validate_language(language)?;

    // Fail with NotFound rather than a foreign key error.
    crate::region::get_region(pool, recipient.region_id).await?;

    let channels = recipient
        .channels
        .clone()
        .unwrap_or_else(|| BTreeSet::from([Channel::Sms]));

    let created = sqlx::query_as::<_, RecipientRecord>(
        r#"
        INSERT INTO recipients (phone_number, name, region_id, language, sms_enabled, whatsapp_enabled)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, phone_number, name, region_id, language, sms_enabled, whatsapp_enabled,
                  is_active, created_at
        "#,
    )
    .bind(phone)
    .bind(&recipient.name)
    .bind(recipient.region_id)
    .bind(language)
    .bind(channels.contains(&Channel::Sms))
    .bind(channels.contains(&Channel::Whatsapp))
    .fetch_one(pool)
    .await
    .map_err(unique_violation("Recipient", phone))?;

    tracing::info!(recipient_id = created.id, region_id = created.region_id, "Registered recipient");
    Ok(created)
}

/// Get a recipient by ID.
pub async fn get_recipient(pool: &SqlitePool, id: i64) -> Result<RecipientRecord> {
    sqlx::query_as::<_, RecipientRecord>(
        r#"
        SELECT id, phone_number, name, region_id, language, sms_enabled, whatsapp_enabled,
               is_active, created_at
        FROM recipients
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Recipient",
        id: id.to_string(),
    })
}

/// All recipients of a region, active or not.
pub async fn list_for_region(pool: &SqlitePool, region_id: i64) -> Result<Vec<RecipientRecord>> {
    let recipients = sqlx::query_as::<_, RecipientRecord>(
        r#"
        SELECT id, phone_number, name, region_id, language, sms_enabled, whatsapp_enabled,
               is_active, created_at
        FROM recipients
        WHERE region_id = ?
        ORDER BY id
        "#,
    )
    .bind(region_id)
    .fetch_all(pool)
    .await?;

    Ok(recipients)
}

/// Activate or deactivate a recipient.
pub async fn set_active(pool: &SqlitePool, id: i64, active: bool) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE recipients
        SET is_active = ?
        WHERE id = ?
        "#,
    )
    .bind(active)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Recipient",
            id: id.to_string(),
        });
    }

    Ok(())
}
