//! Service orders track the work on a vehicle once it is booked in.
//! Completing one consumes the parts it used.
use chrono::NaiveDate;
use models::notification::NotificationKind;
use models::service_order::{self, OrderStatus};
use models::{line_item, mechanic, time, vehicle, Role};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::access::{customer_profile, ensure_owner_or_staff, mechanic_profile, Actor};
use crate::errors::ServiceError;
use crate::quotes::{price_item, ItemInput};
use crate::{inventory, notifications};

#[derive(Debug, Clone, Deserialize)]
pub struct OrderInput {
    pub vehicle_id: Uuid,
    #[serde(default)]
    pub mechanic_id: Option<Uuid>,
}

/// An order as the API returns it, with the owner-facing status text.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: service_order::Model,
    pub customer_status: &'static str,
    pub status_description: &'static str,
    pub items: Vec<line_item::Model>,
}

impl OrderView {
    fn new(order: service_order::Model, items: Vec<line_item::Model>) -> Self {
        Self {
            customer_status: order.status.customer_label(),
            status_description: order.status.customer_description(),
            order,
            items,
        }
    }
}

/// Insert an IN_PROGRESS order. Callers own the transaction.
pub(crate) async fn open_order<C: ConnectionTrait>(
    db: &C,
    vehicle_id: Uuid,
    mechanic_id: Uuid,
    quote_id: Option<Uuid>,
    today: NaiveDate,
) -> Result<service_order::Model, ServiceError> {
    let order = service_order::ActiveModel {
        id: Set(Uuid::new_v4()),
        number: Set(service_order::generate_number(today)),
        quote_id: Set(quote_id),
        vehicle_id: Set(vehicle_id),
        mechanic_id: Set(mechanic_id),
        status: Set(OrderStatus::InProgress),
        opened_at: Set(time::now()),
        completed_at: Set(None),
    }
    .insert(db)
    .await?;
    info!(order_id = %order.id, number = %order.number, "service_order_opened");
    Ok(order)
}

async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<service_order::Model, ServiceError> {
    service_order::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("service order"))
}

async fn owner_of<C: ConnectionTrait>(db: &C, order: &service_order::Model) -> Result<Uuid, ServiceError> {
    Ok(vehicle::Entity::find_by_id(order.vehicle_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("vehicle"))?
        .customer_id)
}

/// Lines priced directly on the order plus those of the quote it came from.
async fn all_lines<C: ConnectionTrait>(
    db: &C,
    order: &service_order::Model,
) -> Result<Vec<line_item::Model>, ServiceError> {
    let mut cond = Condition::any().add(line_item::Column::ServiceOrderId.eq(order.id));
    if let Some(qid) = order.quote_id {
        cond = cond.add(line_item::Column::QuoteId.eq(qid));
    }
    Ok(line_item::Entity::find().filter(cond).all(db).await?)
}

#[instrument(skip(db, input), fields(actor = %actor.user_id))]
pub async fn create_order(
    db: &DatabaseConnection,
    actor: &Actor,
    input: OrderInput,
    today: NaiveDate,
) -> Result<OrderView, ServiceError> {
    actor.require_staff()?;
    vehicle::Entity::find_by_id(input.vehicle_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::validation("vehicle_id", "vehicle not found"))?;
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
    let order = open_order(db, input.vehicle_id, mechanic_id, None, today).await?;
    Ok(OrderView::new(order, Vec::new()))
}

/// Staff see every order; customers only those on their own vehicles.
pub async fn list_orders<C: ConnectionTrait>(db: &C, actor: &Actor) -> Result<Vec<OrderView>, ServiceError> {
    let mut q = service_order::Entity::find();
    if actor.role == Role::Customer {
        let me = customer_profile(db, actor).await?;
        let ids: Vec<Uuid> = vehicle::Entity::find()
            .filter(vehicle::Column::CustomerId.eq(me.id))
            .all(db)
            .await?
            .into_iter()
            .map(|v| v.id)
            .collect();
        q = q.filter(service_order::Column::VehicleId.is_in(ids));
    } else {
        actor.require_staff()?;
    }
    let orders = q.order_by_desc(service_order::Column::OpenedAt).all(db).await?;
    let mut out = Vec::with_capacity(orders.len());
    for o in orders {
        let items = all_lines(db, &o).await?;
        out.push(OrderView::new(o, items));
    }
    Ok(out)
}

pub async fn get_order<C: ConnectionTrait>(db: &C, actor: &Actor, id: Uuid) -> Result<OrderView, ServiceError> {
    let order = find(db, id).await?;
    if !actor.is_staff() {
        ensure_owner_or_staff(db, actor, owner_of(db, &order).await?).await?;
    }
    let items = all_lines(db, &order).await?;
    Ok(OrderView::new(order, items))
}

pub async fn add_item(
    db: &DatabaseConnection,
    actor: &Actor,
    id: Uuid,
    input: ItemInput,
) -> Result<OrderView, ServiceError> {
    actor.require_staff()?;
    let order = find(db, id).await?;
    if order.status.is_terminal() {
        return Err(ServiceError::validation("status", "order is closed"));
    }
    let (quantity, unit) = price_item(db, &input).await?;
    line_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        quote_id: Set(None),
        service_order_id: Set(Some(order.id)),
        product_id: Set(input.product_id),
        service_id: Set(input.service_id),
        quantity: Set(quantity),
        unit_price_cents: Set(unit),
        subtotal_cents: Set(line_item::subtotal(quantity, unit)?),
    }
    .insert(db)
    .await?;
    let items = all_lines(db, &order).await?;
    Ok(OrderView::new(order, items))
}

/// Write `to` only while the row still holds `from`. False means another
/// caller changed the order first.
async fn apply_status<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    from: OrderStatus,
    to: OrderStatus,
) -> Result<bool, ServiceError> {
    let mut update = service_order::Entity::update_many().col_expr(service_order::Column::Status, Expr::value(to));
    if to == OrderStatus::Completed {
        update = update.col_expr(service_order::Column::CompletedAt, Expr::value(Some(time::now())));
    }
    let res = update
        .filter(service_order::Column::Id.eq(id))
        .filter(service_order::Column::Status.eq(from))
        .exec(db)
        .await?;
    Ok(res.rows_affected == 1)
}

#[instrument(skip(db), fields(actor = %actor.user_id))]
pub async fn set_status(
    db: &DatabaseConnection,
    actor: &Actor,
    id: Uuid,
    next: OrderStatus,
) -> Result<OrderView, ServiceError> {
    actor.require_staff()?;
    let txn = db.begin().await?;
    let order = find(&txn, id).await?;
    if !order.status.can_transition_to(next) {
        warn!(order = %order.number, from = ?order.status, to = ?next, "service_order_bad_transition");
        return Err(ServiceError::transition(order.status, next));
    }
    if !apply_status(&txn, order.id, order.status, next).await? {
        let current = find(&txn, order.id).await?.status;
        warn!(order = %order.number, from = ?current, to = ?next, "service_order_changed_concurrently");
        return Err(ServiceError::transition(current, next));
    }
    let lines = all_lines(&txn, &order).await?;
    if next == OrderStatus::Completed {
        for line in lines.iter() {
            if let Some(pid) = line.product_id {
                inventory::consume_stock(&txn, pid, line.quantity, Some(order.number.clone())).await?;
            }
        }
        let owner = owner_of(&txn, &order).await?;
        let message = format!("Service order {} is complete. Your vehicle is ready for pickup.", order.number);
        notifications::notify_customer(&txn, owner, NotificationKind::ServiceCompleted, message).await?;
    }
    let updated = find(&txn, order.id).await?;
    txn.commit().await?;
    info!(order = %updated.number, status = ?updated.status, "service_order_status_changed");
    Ok(OrderView::new(updated, lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::{self, QuoteInput};
    use crate::test_support::*;
    use models::{notification, product, stock_movement};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 2, 1).unwrap()
    }

    #[tokio::test]
    async fn completion_consumes_quote_and_order_parts() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let (cust, profile) = customer_with_login(&db, "60606060606").await?;
        let (mech, _) = mechanic_with_login(&db, "70707070707").await?;
        let car = vehicle_for(&db, profile.id, "OSX1A23").await?;
        let filter = product_with_stock(&db, "Oil filter", 4000, 6, 5).await?;
        let oil = product_with_stock(&db, "Engine oil", 5000, 10, 2).await?;
        let labour = catalog_entry(&db, "Oil change", 8000).await?;

        let q = quotes::create_quote(
            &db,
            &mech,
            QuoteInput { customer_id: profile.id, vehicle_id: car.id, mechanic_id: None, valid_until: today() },
            today(),
        )
        .await?;
        quotes::add_item(
            &db,
            &mech,
            q.id,
            ItemInput { product_id: Some(filter.id), quantity: 1, ..Default::default() },
        )
        .await?;
        quotes::add_item(
            &db,
            &mech,
            q.id,
            ItemInput { service_id: Some(labour.id), quantity: 1, ..Default::default() },
        )
        .await?;
        let order = quotes::approve(&db, &cust, q.id, today()).await?.service_order;

        let view = add_item(
            &db,
            &mech,
            order.id,
            ItemInput { product_id: Some(oil.id), quantity: 4, ..Default::default() },
        )
        .await?;
        assert_eq!(view.items.len(), 3);
        assert_eq!(view.customer_status, "In maintenance");

        let paused = set_status(&db, &mech, order.id, OrderStatus::AwaitingParts).await?;
        assert_eq!(paused.customer_status, "Stopped - awaiting parts");
        let done = set_status(&db, &mech, order.id, OrderStatus::Completed).await?;
        assert_eq!(done.status_description, "Service finished, vehicle available");
        assert!(done.order.completed_at.is_some());

        let filter_after = product::Entity::find_by_id(filter.id).one(&db).await?.expect("filter");
        let oil_after = product::Entity::find_by_id(oil.id).one(&db).await?.expect("oil");
        assert_eq!(filter_after.stock_qty, 5);
        assert_eq!(oil_after.stock_qty, 6);
        let moves = stock_movement::Entity::find().all(&db).await?;
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().all(|m| m.reference.as_deref() == Some(order.number.as_str())));

        let notes = notification::Entity::find().all(&db).await?;
        assert!(notes.iter().any(|n| n.kind == NotificationKind::LowStock && n.product_id == Some(filter.id)));
        assert!(notes
            .iter()
            .any(|n| n.kind == NotificationKind::ServiceCompleted && n.recipient_user_id == Some(cust.user_id)));

        let reopened = set_status(&db, &mech, order.id, OrderStatus::InProgress).await;
        assert!(matches!(reopened, Err(ServiceError::InvalidTransition { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn stale_completion_does_not_consume_twice() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let (_, profile) = customer_with_login(&db, "12312312312").await?;
        let (mech, _) = mechanic_with_login(&db, "32132132132").await?;
        let car = vehicle_for(&db, profile.id, "STL3C45").await?;
        let pads = product_with_stock(&db, "Brake pads", 7000, 5, 0).await?;

        let order = create_order(&db, &mech, OrderInput { vehicle_id: car.id, mechanic_id: None }, today())
            .await?
            .order;
        add_item(&db, &mech, order.id, ItemInput { product_id: Some(pads.id), quantity: 2, ..Default::default() })
            .await?;
        set_status(&db, &mech, order.id, OrderStatus::Completed).await?;

        // A second writer that still believes the order is IN_PROGRESS.
        assert!(!apply_status(&db, order.id, OrderStatus::InProgress, OrderStatus::Completed).await?);
        let again = set_status(&db, &mech, order.id, OrderStatus::Completed).await.unwrap_err();
        assert!(matches!(again, ServiceError::InvalidTransition { .. }));
        assert_eq!(product::Entity::find_by_id(pads.id).one(&db).await?.expect("pads").stock_qty, 3);
        assert_eq!(stock_movement::Entity::find().all(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn shortfall_keeps_order_open() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let (_, profile) = customer_with_login(&db, "80808080808").await?;
        let (mech, _) = mechanic_with_login(&db, "90909090909").await?;
        let car = vehicle_for(&db, profile.id, "OSY2B34").await?;
        let plenty = product_with_stock(&db, "Bulb", 1000, 10, 0).await?;
        let scarce = product_with_stock(&db, "Gearbox", 900000, 0, 0).await?;

        let order = create_order(
            &db,
            &mech,
            OrderInput { vehicle_id: car.id, mechanic_id: None },
            today(),
        )
        .await?
        .order;
        add_item(
            &db,
            &mech,
            order.id,
            ItemInput { product_id: Some(plenty.id), quantity: 2, ..Default::default() },
        )
        .await?;
        add_item(
            &db,
            &mech,
            order.id,
            ItemInput { product_id: Some(scarce.id), quantity: 1, ..Default::default() },
        )
        .await?;

        let err = set_status(&db, &mech, order.id, OrderStatus::Completed).await.unwrap_err();
        assert!(matches!(err, ServiceError::InsufficientStock(_)));
        let still = get_order(&db, &mech, order.id).await?;
        assert_eq!(still.order.status, OrderStatus::InProgress);
        assert_eq!(product::Entity::find_by_id(plenty.id).one(&db).await?.expect("bulb").stock_qty, 10);
        assert!(stock_movement::Entity::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn customers_only_see_their_orders() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let (alice, a) = customer_with_login(&db, "11122233344").await?;
        let (bob, b) = customer_with_login(&db, "55566677700").await?;
        let (mech, _) = mechanic_with_login(&db, "99988877766").await?;
        let car_a = vehicle_for(&db, a.id, "AAA1A11").await?;
        vehicle_for(&db, b.id, "BBB2B22").await?;

        let order = create_order(
            &db,
            &mech,
            OrderInput { vehicle_id: car_a.id, mechanic_id: None },
            today(),
        )
        .await?
        .order;
        assert_eq!(list_orders(&db, &alice).await?.len(), 1);
        assert!(list_orders(&db, &bob).await?.is_empty());
        assert!(matches!(get_order(&db, &bob, order.id).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(
            set_status(&db, &alice, order.id, OrderStatus::Cancelled).await,
            Err(ServiceError::Forbidden(_)),
        ));
        Ok(())
    }
}
