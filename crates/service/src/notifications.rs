//! In-app notifications. Rows without a recipient are broadcasts shown to staff.
use models::notification::{self, NotificationKind};
use models::{customer, time};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use uuid::Uuid;

use crate::access::Actor;
use crate::errors::ServiceError;

pub async fn notify<C: ConnectionTrait>(
    db: &C,
    recipient: Option<Uuid>,
    kind: NotificationKind,
    message: impl Into<String>,
    product_id: Option<Uuid>,
) -> Result<notification::Model, ServiceError> {
    let created = notification::ActiveModel {
        id: Set(Uuid::new_v4()),
        recipient_user_id: Set(recipient),
        kind: Set(kind),
        message: Set(message.into()),
        product_id: Set(product_id),
        read: Set(false),
        created_at: Set(time::now()),
    }
    .insert(db)
    .await?;
    info!(notification_id = %created.id, kind = ?kind, broadcast = recipient.is_none(), "notification_created");
    Ok(created)
}

/// Notify the login behind a customer profile. Profiles without a login are skipped.
pub async fn notify_customer<C: ConnectionTrait>(
    db: &C,
    customer_id: Uuid,
    kind: NotificationKind,
    message: impl Into<String>,
) -> Result<Option<notification::Model>, ServiceError> {
    let user_id = customer::Entity::find_by_id(customer_id).one(db).await?.and_then(|c| c.user_id);
    match user_id {
        Some(uid) => Ok(Some(notify(db, Some(uid), kind, message, None).await?)),
        None => Ok(None),
    }
}

/// Own notifications, plus staff broadcasts for staff callers. Newest first.
pub async fn list_for<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    unread_only: bool,
) -> Result<Vec<notification::Model>, ServiceError> {
    let mut visible = Condition::any().add(notification::Column::RecipientUserId.eq(actor.user_id));
    if actor.is_staff() {
        visible = visible.add(notification::Column::RecipientUserId.is_null());
    }
    let mut q = notification::Entity::find().filter(visible);
    if unread_only {
        q = q.filter(notification::Column::Read.eq(false));
    }
    Ok(q.order_by_desc(notification::Column::CreatedAt).all(db).await?)
}

pub async fn mark_read<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    id: Uuid,
) -> Result<notification::Model, ServiceError> {
    let found = notification::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("notification"))?;
    let allowed = match found.recipient_user_id {
        Some(uid) => uid == actor.user_id,
        None => actor.is_staff(),
    };
    if !allowed {
        // Someone else's notification is reported as missing.
        return Err(ServiceError::not_found("notification"));
    }
    if found.read {
        return Ok(found);
    }
    let mut am: notification::ActiveModel = found.into();
    am.read = Set(true);
    Ok(am.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{customer_with_login, get_db, manager};

    #[tokio::test]
    async fn broadcasts_reach_staff_only() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let mgr = manager(&db).await?;
        let (cust, profile) = customer_with_login(&db, "11122233344").await?;

        notify(&db, None, NotificationKind::LowStock, "Low stock alert: Brake pad", None).await?;
        notify_customer(&db, profile.id, NotificationKind::QuoteReady, "Your quote is ready").await?;

        let staff_view = list_for(&db, &mgr, false).await?;
        assert_eq!(staff_view.len(), 1);
        assert_eq!(staff_view[0].kind, NotificationKind::LowStock);

        let own = list_for(&db, &cust, true).await?;
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].message, "Your quote is ready");

        let read = mark_read(&db, &cust, own[0].id).await?;
        assert!(read.read);
        assert!(list_for(&db, &cust, true).await?.is_empty());

        assert!(matches!(mark_read(&db, &cust, staff_view[0].id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
