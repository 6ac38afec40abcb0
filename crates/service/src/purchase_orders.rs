//! Purchase orders: managers ask a supplier for more of one of their
//! products; the supplier approves (shipping out of that product's stock),
//! rejects with a reason, then reports shipping and delivery.
use models::line_item;
use models::purchase_order::{self, PurchaseStatus};
use models::validate::{optional_text, validate_non_negative, validate_quantity};
use models::{product, time, Role};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::access::{supplier_profile, Actor};
use crate::errors::ServiceError;
use crate::inventory;

pub const ALREADY_PROCESSED: &str = "purchase order has already been processed";

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseOrderInput {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Defaults to the product cost price.
    #[serde(default)]
    pub unit_cost_cents: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseOrderFilter {
    #[serde(default)]
    pub status: Option<PurchaseStatus>,
}

fn reference(id: Uuid) -> String {
    format!("PO-{}", &id.simple().to_string()[..8].to_uppercase())
}

async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<purchase_order::Model, ServiceError> {
    purchase_order::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("purchase order"))
}

/// Managers act on any order; a supplier only on orders addressed to them.
async fn ensure_party<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    order: &purchase_order::Model,
) -> Result<(), ServiceError> {
    match actor.role {
        Role::Manager => Ok(()),
        Role::Supplier => ensure_addressee(db, actor, order).await,
        _ => Err(ServiceError::forbidden("only suppliers and managers handle purchase orders")),
    }
}

async fn ensure_addressee<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    order: &purchase_order::Model,
) -> Result<(), ServiceError> {
    if actor.role != Role::Supplier || supplier_profile(db, actor).await?.id != order.supplier_id {
        return Err(ServiceError::forbidden("purchase order is addressed to another supplier"));
    }
    Ok(())
}

/// Write `to` only while the row still holds `from`. False means another
/// caller moved the order first.
async fn advance<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    from: PurchaseStatus,
    to: PurchaseStatus,
    rejection_reason: Option<String>,
) -> Result<bool, ServiceError> {
    let mut update = purchase_order::Entity::update_many()
        .col_expr(purchase_order::Column::Status, Expr::value(to))
        .col_expr(purchase_order::Column::UpdatedAt, Expr::value(time::now()));
    if rejection_reason.is_some() {
        update = update.col_expr(purchase_order::Column::RejectionReason, Expr::value(rejection_reason));
    }
    let res = update
        .filter(purchase_order::Column::Id.eq(id))
        .filter(purchase_order::Column::Status.eq(from))
        .exec(db)
        .await?;
    Ok(res.rows_affected == 1)
}

#[instrument(skip(db, input), fields(actor = %actor.user_id, product_id = %input.product_id))]
pub async fn create_purchase_order(
    db: &DatabaseConnection,
    actor: &Actor,
    input: PurchaseOrderInput,
) -> Result<purchase_order::Model, ServiceError> {
    actor.require_manager()?;
    let quantity = validate_quantity("quantity", input.quantity)?;
    let p = product::Entity::find_by_id(input.product_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::validation("product_id", "product not found"))?;
    let supplier_id = p
        .supplier_id
        .ok_or_else(|| ServiceError::validation("product_id", "product has no supplier"))?;
    let unit = match input.unit_cost_cents {
        Some(cost) => validate_non_negative("unit_cost_cents", cost)?,
        None => p.cost_cents,
    };
    let total = line_item::subtotal(quantity, unit)
        .map_err(|_| ServiceError::validation("unit_cost_cents", line_item::AMOUNT_TOO_LARGE))?;
    let now = time::now();
    let created = purchase_order::ActiveModel {
        id: Set(Uuid::new_v4()),
        supplier_id: Set(supplier_id),
        product_id: Set(p.id),
        quantity: Set(quantity),
        unit_cost_cents: Set(unit),
        total_cents: Set(total),
        status: Set(PurchaseStatus::Pending),
        rejection_reason: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(purchase_order = %created.id, supplier_id = %supplier_id, quantity, "purchase_order_created");
    Ok(created)
}

/// Managers see every order, suppliers only their own. Newest first.
pub async fn list_purchase_orders<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    filter: &PurchaseOrderFilter,
) -> Result<Vec<purchase_order::Model>, ServiceError> {
    let mut q = purchase_order::Entity::find();
    match actor.role {
        Role::Manager => {}
        Role::Supplier => {
            let me = supplier_profile(db, actor).await?;
            q = q.filter(purchase_order::Column::SupplierId.eq(me.id));
        }
        _ => return Err(ServiceError::forbidden("only suppliers and managers handle purchase orders")),
    }
    if let Some(status) = filter.status {
        q = q.filter(purchase_order::Column::Status.eq(status));
    }
    Ok(q.order_by_desc(purchase_order::Column::CreatedAt).all(db).await?)
}

pub async fn get_purchase_order<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    id: Uuid,
) -> Result<purchase_order::Model, ServiceError> {
    let order = find(db, id).await?;
    ensure_party(db, actor, &order).await?;
    Ok(order)
}

/// The addressed supplier accepts the order. The quantity leaves the
/// product's stock in the same transaction, or nothing changes.
#[instrument(skip(db), fields(actor = %actor.user_id))]
pub async fn approve(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<purchase_order::Model, ServiceError> {
    let txn = db.begin().await?;
    let order = find(&txn, id).await?;
    ensure_addressee(&txn, actor, &order).await?;
    if order.status != PurchaseStatus::Pending
        || !advance(&txn, order.id, PurchaseStatus::Pending, PurchaseStatus::Approved, None).await?
    {
        warn!(purchase_order = %order.id, status = ?order.status, "purchase_order_already_processed");
        return Err(ServiceError::AlreadyProcessed(ALREADY_PROCESSED.into()));
    }
    if let Err(e) = inventory::consume_stock(&txn, order.product_id, order.quantity, Some(reference(order.id))).await {
        warn!(purchase_order = %order.id, requested = order.quantity, "purchase_order_short_of_stock");
        return Err(e);
    }
    let approved = find(&txn, order.id).await?;
    txn.commit().await?;
    info!(purchase_order = %approved.id, quantity = approved.quantity, "purchase_order_approved");
    Ok(approved)
}

pub async fn reject(
    db: &DatabaseConnection,
    actor: &Actor,
    id: Uuid,
    reason: Option<String>,
) -> Result<purchase_order::Model, ServiceError> {
    let reason = optional_text(reason).ok_or_else(|| ServiceError::validation("reason", "is required"))?;
    let txn = db.begin().await?;
    let order = find(&txn, id).await?;
    ensure_addressee(&txn, actor, &order).await?;
    if !advance(&txn, order.id, PurchaseStatus::Pending, PurchaseStatus::Rejected, Some(reason)).await? {
        return Err(ServiceError::AlreadyProcessed(ALREADY_PROCESSED.into()));
    }
    let rejected = find(&txn, order.id).await?;
    txn.commit().await?;
    info!(purchase_order = %rejected.id, "purchase_order_rejected");
    Ok(rejected)
}

/// Shipping and delivery are reported by the supplier. Cancelling an
/// approved order puts its quantity back on the product.
#[instrument(skip(db), fields(actor = %actor.user_id))]
pub async fn set_status(
    db: &DatabaseConnection,
    actor: &Actor,
    id: Uuid,
    next: PurchaseStatus,
) -> Result<purchase_order::Model, ServiceError> {
    let txn = db.begin().await?;
    let order = find(&txn, id).await?;
    ensure_party(&txn, actor, &order).await?;
    if !order.status.can_move_to(next) {
        return Err(ServiceError::transition(order.status, next));
    }
    if !advance(&txn, order.id, order.status, next, None).await? {
        let current = find(&txn, order.id).await?.status;
        warn!(purchase_order = %order.id, from = ?current, to = ?next, "purchase_order_changed_concurrently");
        return Err(ServiceError::transition(current, next));
    }
    if order.status == PurchaseStatus::Approved && next == PurchaseStatus::Cancelled {
        let note = Some("purchase order cancelled".to_string());
        inventory::restock(&txn, order.product_id, order.quantity, Some(reference(order.id)), note).await?;
    }
    let updated = find(&txn, order.id).await?;
    txn.commit().await?;
    info!(purchase_order = %updated.id, status = ?updated.status, "purchase_order_status_changed");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use models::stock_movement;

    async fn stock_of(db: &DatabaseConnection, id: Uuid) -> Result<i32, anyhow::Error> {
        Ok(product::Entity::find_by_id(id).one(db).await?.map(|p| p.stock_qty).unwrap_or(-1))
    }

    fn order_of(product_id: Uuid, quantity: i32) -> PurchaseOrderInput {
        PurchaseOrderInput { product_id, quantity, unit_cost_cents: None }
    }

    #[tokio::test]
    async fn approval_takes_stock_once() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let mgr = manager(&db).await?;
        let (sup, profile) = supplier_with_login(&db, "11222333000181").await?;
        let (other, _) = supplier_with_login(&db, "44555666000172").await?;
        let rotor = supplier_product(&db, profile.id, "Brake rotor", 10).await?;

        let po = create_purchase_order(&db, &mgr, order_of(rotor.id, 4)).await?;
        assert_eq!(po.status, PurchaseStatus::Pending);
        assert_eq!(po.supplier_id, profile.id);
        assert_eq!(po.total_cents, 4 * rotor.cost_cents);

        assert!(matches!(approve(&db, &other, po.id).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(approve(&db, &mgr, po.id).await, Err(ServiceError::Forbidden(_))));

        let ok = approve(&db, &sup, po.id).await?;
        assert_eq!(ok.status, PurchaseStatus::Approved);
        assert_eq!(stock_of(&db, rotor.id).await?, 6);
        let moves = stock_movement::Entity::find().all(&db).await?;
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].reference, Some(reference(po.id)));

        let again = approve(&db, &sup, po.id).await.unwrap_err();
        assert_eq!(again.to_string(), ALREADY_PROCESSED);
        // A writer that still believes the order is PENDING.
        assert!(!advance(&db, po.id, PurchaseStatus::Pending, PurchaseStatus::Approved, None).await?);
        assert_eq!(stock_of(&db, rotor.id).await?, 6);

        assert_eq!(set_status(&db, &sup, po.id, PurchaseStatus::Shipped).await?.status, PurchaseStatus::Shipped);
        assert_eq!(set_status(&db, &sup, po.id, PurchaseStatus::Delivered).await?.status, PurchaseStatus::Delivered);
        let late = set_status(&db, &mgr, po.id, PurchaseStatus::Cancelled).await;
        assert!(matches!(late, Err(ServiceError::InvalidTransition { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn rejection_needs_a_reason_and_keeps_stock() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let mgr = manager(&db).await?;
        let (sup, profile) = supplier_with_login(&db, "22333444000163").await?;
        let belt = supplier_product(&db, profile.id, "Timing belt", 3).await?;
        let po = create_purchase_order(&db, &mgr, order_of(belt.id, 2)).await?;

        let blank = reject(&db, &sup, po.id, Some("  ".into())).await.unwrap_err();
        assert_eq!(blank.field(), Some("reason"));

        let r = reject(&db, &sup, po.id, Some("Out of production".into())).await?;
        assert_eq!(r.status, PurchaseStatus::Rejected);
        assert_eq!(r.rejection_reason.as_deref(), Some("Out of production"));
        assert!(matches!(approve(&db, &sup, po.id).await, Err(ServiceError::AlreadyProcessed(_))));
        assert!(matches!(reject(&db, &sup, po.id, Some("again".into())).await, Err(ServiceError::AlreadyProcessed(_))));
        assert_eq!(stock_of(&db, belt.id).await?, 3);
        Ok(())
    }

    #[tokio::test]
    async fn short_stock_leaves_order_pending() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let mgr = manager(&db).await?;
        let (sup, profile) = supplier_with_login(&db, "33444555000154").await?;
        let pump = supplier_product(&db, profile.id, "Water pump", 1).await?;
        let po = create_purchase_order(&db, &mgr, order_of(pump.id, 5)).await?;

        assert!(matches!(approve(&db, &sup, po.id).await, Err(ServiceError::InsufficientStock(_))));
        assert_eq!(get_purchase_order(&db, &sup, po.id).await?.status, PurchaseStatus::Pending);
        assert_eq!(stock_of(&db, pump.id).await?, 1);

        let cancelled = set_status(&db, &mgr, po.id, PurchaseStatus::Cancelled).await?;
        assert_eq!(cancelled.status, PurchaseStatus::Cancelled);
        assert!(stock_movement::Entity::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn cancelling_an_approved_order_restocks() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let mgr = manager(&db).await?;
        let (sup, profile) = supplier_with_login(&db, "55666777000145").await?;
        let hose = supplier_product(&db, profile.id, "Radiator hose", 8).await?;
        let po = create_purchase_order(&db, &mgr, order_of(hose.id, 3)).await?;
        approve(&db, &sup, po.id).await?;
        assert_eq!(stock_of(&db, hose.id).await?, 5);

        set_status(&db, &mgr, po.id, PurchaseStatus::Cancelled).await?;
        assert_eq!(stock_of(&db, hose.id).await?, 8);
        let approve_via_status = set_status(&db, &sup, po.id, PurchaseStatus::Approved).await;
        assert!(matches!(approve_via_status, Err(ServiceError::InvalidTransition { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn listing_is_scoped_to_the_supplier() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let mgr = manager(&db).await?;
        let (a, a_profile) = supplier_with_login(&db, "66777888000136").await?;
        let (b, _) = supplier_with_login(&db, "77888999000127").await?;
        let (mech, _) = mechanic_with_login(&db, "12121212121").await?;
        let filter = supplier_product(&db, a_profile.id, "Air filter", 20).await?;
        let loose = product_with_stock(&db, "Shop rag", 100, 50, 1).await?;

        let po = create_purchase_order(&db, &mgr, order_of(filter.id, 1)).await?;
        let orphan = create_purchase_order(&db, &mgr, order_of(loose.id, 1)).await.unwrap_err();
        assert_eq!(orphan.to_string(), "product_id: product has no supplier");
        assert!(matches!(
            create_purchase_order(&db, &a, order_of(filter.id, 1)).await,
            Err(ServiceError::Forbidden(_)),
        ));

        let all = PurchaseOrderFilter::default();
        assert_eq!(list_purchase_orders(&db, &a, &all).await?.len(), 1);
        assert!(list_purchase_orders(&db, &b, &all).await?.is_empty());
        assert_eq!(list_purchase_orders(&db, &mgr, &all).await?.len(), 1);
        assert!(matches!(list_purchase_orders(&db, &mech, &all).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(get_purchase_order(&db, &b, po.id).await, Err(ServiceError::Forbidden(_))));

        let approved_only = PurchaseOrderFilter { status: Some(PurchaseStatus::Approved) };
        assert!(list_purchase_orders(&db, &mgr, &approved_only).await?.is_empty());
        Ok(())
    }
}
