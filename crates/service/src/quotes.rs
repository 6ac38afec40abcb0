//! Quotes: priced estimates that the customer approves or rejects.
//! Approval opens a service order in the same transaction.
use chrono::NaiveDate;
use models::line_item;
use models::notification::NotificationKind;
use models::quote::{self, QuoteStatus};
use models::validate::{optional_text, validate_non_negative, validate_quantity};
use models::{catalog_service, customer, mechanic, product, service_order, time, vehicle, Role};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::access::{customer_profile, ensure_owner_or_staff, mechanic_profile, Actor};
use crate::errors::ServiceError;
use crate::{notifications, service_orders};

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteInput {
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    /// Defaults to the calling mechanic.
    #[serde(default)]
    pub mechanic_id: Option<Uuid>,
    pub valid_until: NaiveDate,
}

/// A product or a catalog service priced on a quote or service order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemInput {
    #[serde(default)]
    pub product_id: Option<Uuid>,
    #[serde(default)]
    pub service_id: Option<Uuid>,
    #[serde(default = "one")]
    pub quantity: i32,
    /// Defaults to the product sale price or the service base price.
    #[serde(default)]
    pub unit_price_cents: Option<i64>,
}

fn one() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteDetail {
    #[serde(flatten)]
    pub quote: quote::Model,
    pub items: Vec<line_item::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Approval {
    pub quote: quote::Model,
    pub service_order: service_order::Model,
}

pub const ALREADY_PROCESSED: &str = "quote has already been processed";

/// Validate an item and resolve its default unit price.
pub(crate) async fn price_item<C: ConnectionTrait>(db: &C, input: &ItemInput) -> Result<(i32, i64), ServiceError> {
    let quantity = validate_quantity("quantity", input.quantity)?;
    let default_price = match (input.product_id, input.service_id) {
        (Some(pid), None) => {
            product::Entity::find_by_id(pid)
                .one(db)
                .await?
                .ok_or_else(|| ServiceError::validation("product_id", "product not found"))?
                .sale_price_cents
        }
        (None, Some(sid)) => {
            catalog_service::Entity::find_by_id(sid)
                .one(db)
                .await?
                .ok_or_else(|| ServiceError::validation("service_id", "service not found"))?
                .base_price_cents
        }
        _ => return Err(ServiceError::validation("items", "each item needs exactly one of product_id or service_id")),
    };
    let unit = match input.unit_price_cents {
        Some(p) => validate_non_negative("unit_price_cents", p)?,
        None => default_price,
    };
    Ok((quantity, unit))
}

async fn load_items<C: ConnectionTrait>(db: &C, quote_id: Uuid) -> Result<Vec<line_item::Model>, ServiceError> {
    Ok(line_item::Entity::find()
        .filter(line_item::Column::QuoteId.eq(quote_id))
        .order_by_asc(line_item::Column::Id)
        .all(db)
        .await?)
}

/// Sum of subtotals, written back to the quote.
async fn recompute_total<C: ConnectionTrait>(db: &C, q: quote::Model) -> Result<quote::Model, ServiceError> {
    let total = load_items(db, q.id)
        .await?
        .iter()
        .try_fold(0i64, |acc, i| line_item::add_amount(acc, i.subtotal_cents))?;
    if total == q.total_cents {
        return Ok(q);
    }
    let mut am: quote::ActiveModel = q.into();
    am.total_cents = Set(total);
    Ok(am.update(db).await?)
}

async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<quote::Model, ServiceError> {
    quote::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("quote"))
}

fn ensure_pending(q: &quote::Model) -> Result<(), ServiceError> {
    if q.status != QuoteStatus::Pending {
        return Err(ServiceError::AlreadyProcessed(ALREADY_PROCESSED.to_string()));
    }
    Ok(())
}

/// Move a quote out of PENDING. Fails when another caller got there first.
async fn settle<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    next: QuoteStatus,
    rejection_reason: Option<String>,
) -> Result<quote::Model, ServiceError> {
    let res = quote::Entity::update_many()
        .col_expr(quote::Column::Status, Expr::value(next))
        .col_expr(quote::Column::RejectionReason, Expr::value(rejection_reason))
        .filter(quote::Column::Id.eq(id))
        .filter(quote::Column::Status.eq(QuoteStatus::Pending))
        .exec(db)
        .await?;
    if res.rows_affected != 1 {
        return Err(ServiceError::AlreadyProcessed(ALREADY_PROCESSED.to_string()));
    }
    find(db, id).await
}

#[instrument(skip(db, input), fields(actor = %actor.user_id))]
pub async fn create_quote(
    db: &DatabaseConnection,
    actor: &Actor,
    input: QuoteInput,
    today: NaiveDate,
) -> Result<quote::Model, ServiceError> {
    actor.require_staff()?;
    if input.valid_until < today {
        return Err(ServiceError::validation("valid_until", "must not be in the past"));
    }
    let owner = customer::Entity::find_by_id(input.customer_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::validation("customer_id", "customer not found"))?;
    let car = vehicle::Entity::find_by_id(input.vehicle_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::validation("vehicle_id", "vehicle not found"))?;
    if car.customer_id != owner.id {
        return Err(ServiceError::validation("vehicle_id", "vehicle does not belong to this customer"));
    }
    let mechanic_id = match input.mechanic_id {
        Some(mid) => mechanic::Entity::find_by_id(mid)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::validation("mechanic_id", "mechanic not found"))?
            .id,
        None => mechanic_profile(db, actor)
            .await?
            .ok_or_else(|| ServiceError::validation("mechanic_id", "is required"))?
            .id,
    };
    let created = quote::ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_id: Set(owner.id),
        vehicle_id: Set(car.id),
        mechanic_id: Set(mechanic_id),
        valid_until: Set(input.valid_until),
        status: Set(QuoteStatus::Pending),
        total_cents: Set(0),
        rejection_reason: Set(None),
        finalized_at: Set(None),
        created_at: Set(time::now()),
    }
    .insert(db)
    .await?;
    info!(quote_id = %created.id, customer_id = %owner.id, "quote_created");
    Ok(created)
}

pub async fn list_quotes<C: ConnectionTrait>(db: &C, actor: &Actor) -> Result<Vec<quote::Model>, ServiceError> {
    let mut q = quote::Entity::find();
    if actor.role == Role::Customer {
        q = q.filter(quote::Column::CustomerId.eq(customer_profile(db, actor).await?.id));
    } else {
        actor.require_staff()?;
    }
    Ok(q.order_by_desc(quote::Column::CreatedAt).all(db).await?)
}

pub async fn get_quote<C: ConnectionTrait>(db: &C, actor: &Actor, id: Uuid) -> Result<QuoteDetail, ServiceError> {
    let q = find(db, id).await?;
    ensure_owner_or_staff(db, actor, q.customer_id).await?;
    let items = load_items(db, q.id).await?;
    Ok(QuoteDetail { quote: q, items })
}

pub async fn add_item(
    db: &DatabaseConnection,
    actor: &Actor,
    quote_id: Uuid,
    input: ItemInput,
) -> Result<QuoteDetail, ServiceError> {
    actor.require_staff()?;
    let txn = db.begin().await?;
    let q = find(&txn, quote_id).await?;
    ensure_pending(&q)?;
    let (quantity, unit) = price_item(&txn, &input).await?;
    line_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        quote_id: Set(Some(q.id)),
        service_order_id: Set(None),
        product_id: Set(input.product_id),
        service_id: Set(input.service_id),
        quantity: Set(quantity),
        unit_price_cents: Set(unit),
        subtotal_cents: Set(line_item::subtotal(quantity, unit)?),
    }
    .insert(&txn)
    .await?;
    let q = recompute_total(&txn, q).await?;
    let items = load_items(&txn, q.id).await?;
    txn.commit().await?;
    info!(quote_id = %q.id, total = q.total_cents, "quote_item_added");
    Ok(QuoteDetail { quote: q, items })
}

pub async fn remove_item(
    db: &DatabaseConnection,
    actor: &Actor,
    quote_id: Uuid,
    item_id: Uuid,
) -> Result<QuoteDetail, ServiceError> {
    actor.require_staff()?;
    let txn = db.begin().await?;
    let q = find(&txn, quote_id).await?;
    ensure_pending(&q)?;
    let res = line_item::Entity::delete_many()
        .filter(line_item::Column::Id.eq(item_id))
        .filter(line_item::Column::QuoteId.eq(q.id))
        .exec(&txn)
        .await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("quote item"));
    }
    let q = recompute_total(&txn, q).await?;
    let items = load_items(&txn, q.id).await?;
    txn.commit().await?;
    Ok(QuoteDetail { quote: q, items })
}

/// Mark the quote ready for the customer and tell them so.
pub async fn finalize(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<quote::Model, ServiceError> {
    actor.require_staff()?;
    let txn = db.begin().await?;
    let q = find(&txn, id).await?;
    ensure_pending(&q)?;
    if load_items(&txn, q.id).await?.is_empty() {
        return Err(ServiceError::validation("items", "quote must contain at least one service or product"));
    }
    let res = quote::Entity::update_many()
        .col_expr(quote::Column::FinalizedAt, Expr::value(Some(time::now())))
        .filter(quote::Column::Id.eq(q.id))
        .filter(quote::Column::Status.eq(QuoteStatus::Pending))
        .exec(&txn)
        .await?;
    if res.rows_affected != 1 {
        return Err(ServiceError::AlreadyProcessed(ALREADY_PROCESSED.to_string()));
    }
    let customer_id = q.customer_id;
    let q = find(&txn, q.id).await?;
    let message = format!("Your quote is ready for review: total {}", common::money::format_cents(q.total_cents));
    notifications::notify_customer(&txn, customer_id, NotificationKind::QuoteReady, message).await?;
    txn.commit().await?;
    info!(quote_id = %q.id, total = q.total_cents, "quote_finalized");
    Ok(q)
}

#[instrument(skip(db), fields(actor = %actor.user_id))]
pub async fn approve(
    db: &DatabaseConnection,
    actor: &Actor,
    id: Uuid,
    today: NaiveDate,
) -> Result<Approval, ServiceError> {
    let txn = db.begin().await?;
    let q = find(&txn, id).await?;
    ensure_owner_or_staff(&txn, actor, q.customer_id).await?;
    if let Err(e) = ensure_pending(&q) {
        warn!(quote_id = %q.id, status = ?q.status, "quote_already_processed");
        return Err(e);
    }
    let approved = settle(&txn, q.id, QuoteStatus::Approved, None).await?;
    let order = service_orders::open_order(&txn, q.vehicle_id, q.mechanic_id, Some(q.id), today).await?;
    txn.commit().await?;
    info!(quote_id = %approved.id, service_order = %order.number, "quote_approved");
    Ok(Approval { quote: approved, service_order: order })
}

pub async fn reject(
    db: &DatabaseConnection,
    actor: &Actor,
    id: Uuid,
    reason: Option<String>,
) -> Result<quote::Model, ServiceError> {
    let txn = db.begin().await?;
    let q = find(&txn, id).await?;
    ensure_owner_or_staff(&txn, actor, q.customer_id).await?;
    ensure_pending(&q)?;
    let rejected = settle(&txn, q.id, QuoteStatus::Rejected, optional_text(reason)).await?;
    txn.commit().await?;
    info!(quote_id = %rejected.id, "quote_rejected");
    Ok(rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use models::notification;
    use models::service_order::OrderStatus;

    struct Fixture {
        db: DatabaseConnection,
        mech: Actor,
        cust: Actor,
        input: QuoteInput,
        product: product::Model,
        service: catalog_service::Model,
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 15).unwrap()
    }

    async fn fixture() -> Result<Fixture, anyhow::Error> {
        let db = get_db().await?;
        let (cust, profile) = customer_with_login(&db, "20202020202").await?;
        let (mech, _) = mechanic_with_login(&db, "30303030303").await?;
        let car = vehicle_for(&db, profile.id, "ORC0A01").await?;
        let product = product_with_stock(&db, "Brake disc", 15000, 10, 2).await?;
        let service = catalog_entry(&db, "Brake service", 20000).await?;
        let input = QuoteInput { customer_id: profile.id, vehicle_id: car.id, mechanic_id: None, valid_until: today() };
        Ok(Fixture { db, mech, cust, input, product, service })
    }

    #[tokio::test]
    async fn totals_follow_items() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let f = fixture().await?;
        let q = create_quote(&f.db, &f.mech, f.input.clone(), today()).await?;
        assert_eq!(q.total_cents, 0);

        let d = add_item(
            &f.db,
            &f.mech,
            q.id,
            ItemInput { product_id: Some(f.product.id), quantity: 2, ..Default::default() },
        )
        .await?;
        assert_eq!(d.quote.total_cents, 30000);
        let d = add_item(
            &f.db,
            &f.mech,
            q.id,
            ItemInput {
                service_id: Some(f.service.id),
                quantity: 1,
                unit_price_cents: Some(18000),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(d.quote.total_cents, 48000);
        assert_eq!(d.items.len(), 2);

        let both = ItemInput {
            product_id: Some(f.product.id),
            service_id: Some(f.service.id),
            quantity: 1,
            unit_price_cents: None,
        };
        assert_eq!(add_item(&f.db, &f.mech, q.id, both).await.unwrap_err().field(), Some("items"));
        let zero = ItemInput { product_id: Some(f.product.id), quantity: 0, ..Default::default() };
        assert_eq!(add_item(&f.db, &f.mech, q.id, zero).await.unwrap_err().field(), Some("quantity"));

        let service_line = d.items.iter().find(|i| i.service_id.is_some()).expect("service line");
        let d = remove_item(&f.db, &f.mech, q.id, service_line.id).await?;
        assert_eq!(d.quote.total_cents, 30000);
        Ok(())
    }

    #[tokio::test]
    async fn oversized_item_price_is_a_validation_error() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let f = fixture().await?;
        let q = create_quote(&f.db, &f.mech, f.input.clone(), today()).await?;
        let huge = ItemInput {
            service_id: Some(f.service.id),
            quantity: 3,
            unit_price_cents: Some(i64::MAX / 2),
            ..Default::default()
        };
        let err = add_item(&f.db, &f.mech, q.id, huge).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
        assert_eq!(err.to_string(), "unit_price_cents: amount too large");
        assert!(load_items(&f.db, q.id).await?.is_empty());

        let half = ItemInput {
            service_id: Some(f.service.id),
            quantity: 1,
            unit_price_cents: Some(i64::MAX / 2 + 1),
            ..Default::default()
        };
        add_item(&f.db, &f.mech, q.id, half.clone()).await?;
        let err = add_item(&f.db, &f.mech, q.id, half).await.unwrap_err();
        assert_eq!(err.field(), Some("unit_price_cents"));
        assert_eq!(get_quote(&f.db, &f.mech, q.id).await?.items.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn finalize_requires_items_and_notifies() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let f = fixture().await?;
        let q = create_quote(&f.db, &f.mech, f.input.clone(), today()).await?;
        let err = finalize(&f.db, &f.mech, q.id).await.unwrap_err();
        assert_eq!(err.to_string(), "items: quote must contain at least one service or product");

        add_item(
            &f.db,
            &f.mech,
            q.id,
            ItemInput { service_id: Some(f.service.id), quantity: 1, ..Default::default() },
        )
        .await?;
        let done = finalize(&f.db, &f.mech, q.id).await?;
        assert!(done.finalized_at.is_some());
        let notes = notification::Entity::find().all(&f.db).await?;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::QuoteReady);
        assert_eq!(notes[0].recipient_user_id, Some(f.cust.user_id));
        Ok(())
    }

    #[tokio::test]
    async fn approval_opens_exactly_one_order() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let f = fixture().await?;
        let q = create_quote(&f.db, &f.mech, f.input.clone(), today()).await?;

        let (other, _) = customer_with_login(&f.db, "40404040404").await?;
        assert!(matches!(approve(&f.db, &other, q.id, today()).await, Err(ServiceError::Forbidden(_))));

        let ok = approve(&f.db, &f.cust, q.id, today()).await?;
        assert_eq!(ok.quote.status, QuoteStatus::Approved);
        assert_eq!(ok.service_order.status, OrderStatus::InProgress);
        assert_eq!(ok.service_order.vehicle_id, f.input.vehicle_id);
        assert_eq!(ok.service_order.quote_id, Some(q.id));
        assert!(ok.service_order.number.starts_with("OS-20300115-"));

        let again = approve(&f.db, &f.cust, q.id, today()).await.unwrap_err();
        assert!(matches!(again, ServiceError::AlreadyProcessed(_)));
        assert_eq!(again.to_string(), "quote has already been processed");
        assert_eq!(service_order::Entity::find().all(&f.db).await?.len(), 1);
        assert!(matches!(reject(&f.db, &f.cust, q.id, None).await, Err(ServiceError::AlreadyProcessed(_))));
        Ok(())
    }

    #[tokio::test]
    async fn rejection_keeps_reason_and_opens_nothing() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let f = fixture().await?;
        let q = create_quote(&f.db, &f.mech, f.input.clone(), today()).await?;
        let r = reject(&f.db, &f.cust, q.id, Some("Too expensive".into())).await?;
        assert_eq!(r.status, QuoteStatus::Rejected);
        assert_eq!(r.rejection_reason.as_deref(), Some("Too expensive"));
        assert!(service_order::Entity::find().all(&f.db).await?.is_empty());
        assert!(matches!(
            add_item(
                &f.db,
                &f.mech,
                q.id,
                ItemInput { service_id: Some(f.service.id), quantity: 1, ..Default::default() },
            )
            .await,
            Err(ServiceError::AlreadyProcessed(_))
        ));

        let stale = settle(&f.db, q.id, QuoteStatus::Approved, None).await.unwrap_err();
        assert!(matches!(stale, ServiceError::AlreadyProcessed(_)));
        assert_eq!(find(&f.db, q.id).await?.status, QuoteStatus::Rejected);

        let expired = QuoteInput { valid_until: today().pred_opt().unwrap(), ..f.input.clone() };
        assert_eq!(create_quote(&f.db, &f.mech, expired, today()).await.unwrap_err().field(), Some("valid_until"));
        Ok(())
    }
}
