//! Counter sales: parts sold over the counter, straight out of stock.
use models::sale::{self, SaleStatus};
use models::validate::{validate_non_negative, validate_quantity};
use models::{customer, line_item, product, sale_item, time};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::access::Actor;
use crate::errors::ServiceError;
use crate::inventory;

#[derive(Debug, Clone, Deserialize)]
pub struct SaleItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Defaults to the product sale price.
    #[serde(default)]
    pub unit_price_cents: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleInput {
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    #[serde(default)]
    pub items: Vec<SaleItemInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: sale::Model,
    pub items: Vec<sale_item::Model>,
}

fn reference(sale_id: Uuid) -> String {
    format!("SALE-{}", &sale_id.simple().to_string()[..8].to_uppercase())
}

async fn load_items<C: ConnectionTrait>(db: &C, sale_id: Uuid) -> Result<Vec<sale_item::Model>, ServiceError> {
    Ok(sale_item::Entity::find().filter(sale_item::Column::SaleId.eq(sale_id)).all(db).await?)
}

/// Every decrement and row is written in one transaction. A single short
/// product fails the sale and leaves all stock as it was.
#[instrument(skip(db, input), fields(actor = %actor.user_id, items = input.items.len()))]
pub async fn create_sale(db: &DatabaseConnection, actor: &Actor, input: SaleInput) -> Result<SaleDetail, ServiceError> {
    actor.require_staff()?;
    if input.items.is_empty() {
        return Err(ServiceError::validation("items", "a sale needs at least one item"));
    }
    for item in &input.items {
        validate_quantity("quantity", item.quantity)?;
        if let Some(price) = item.unit_price_cents {
            validate_non_negative("unit_price_cents", price)?;
        }
    }
    if let Some(cid) = input.customer_id {
        customer::Entity::find_by_id(cid)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::validation("customer_id", "customer not found"))?;
    }

    let txn = db.begin().await?;
    let sale_id = Uuid::new_v4();
    let tag = reference(sale_id);
    sale::ActiveModel {
        id: Set(sale_id),
        customer_id: Set(input.customer_id),
        status: Set(SaleStatus::Completed),
        total_cents: Set(0),
        created_at: Set(time::now()),
    }
    .insert(&txn)
    .await?;

    let mut total = 0i64;
    let mut items = Vec::with_capacity(input.items.len());
    for item in &input.items {
        let p = product::Entity::find_by_id(item.product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::validation("items", format!("product {} not found", item.product_id)))?;
        let unit = item.unit_price_cents.unwrap_or(p.sale_price_cents);
        let subtotal = line_item::subtotal(item.quantity, unit)?;
        total = line_item::add_amount(total, subtotal)?;
        if let Err(e) = inventory::consume_stock(&txn, p.id, item.quantity, Some(tag.clone())).await {
            warn!(product_id = %p.id, requested = item.quantity, available = p.stock_qty, "sale_rejected");
            return Err(e);
        }
        items.push(
            sale_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                sale_id: Set(sale_id),
                product_id: Set(p.id),
                quantity: Set(item.quantity),
                unit_price_cents: Set(unit),
                subtotal_cents: Set(subtotal),
            }
            .insert(&txn)
            .await?,
        );
    }

    let mut am: sale::ActiveModel = sale::Entity::find_by_id(sale_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("sale"))?
        .into();
    am.total_cents = Set(total);
    let sale = am.update(&txn).await?;
    txn.commit().await?;
    info!(sale_id = %sale.id, total = sale.total_cents, "sale_completed");
    Ok(SaleDetail { sale, items })
}

const ALREADY_CANCELLED: &str = "sale has already been cancelled";

/// COMPLETED to CANCELLED, only if nobody else cancelled it in between.
async fn mark_cancelled<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool, ServiceError> {
    let res = sale::Entity::update_many()
        .col_expr(sale::Column::Status, Expr::value(SaleStatus::Cancelled))
        .filter(sale::Column::Id.eq(id))
        .filter(sale::Column::Status.eq(SaleStatus::Completed))
        .exec(db)
        .await?;
    Ok(res.rows_affected == 1)
}

/// Put every item back on the shelf. A sale can only be cancelled once.
pub async fn cancel_sale(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<SaleDetail, ServiceError> {
    actor.require_staff()?;
    let txn = db.begin().await?;
    let found = sale::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("sale"))?;
    if found.status == SaleStatus::Cancelled || !mark_cancelled(&txn, id).await? {
        return Err(ServiceError::AlreadyProcessed(ALREADY_CANCELLED.into()));
    }
    let items = load_items(&txn, id).await?;
    let tag = reference(id);
    for item in &items {
        inventory::restock(
            &txn,
            item.product_id,
            item.quantity,
            Some(tag.clone()),
            Some("sale cancelled".into()),
        )
        .await?;
    }
    let sale = sale::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("sale"))?;
    txn.commit().await?;
    info!(sale_id = %sale.id, "sale_cancelled");
    Ok(SaleDetail { sale, items })
}

pub async fn list_sales<C: ConnectionTrait>(db: &C, actor: &Actor) -> Result<Vec<SaleDetail>, ServiceError> {
    actor.require_staff()?;
    let sales = sale::Entity::find().order_by_desc(sale::Column::CreatedAt).all(db).await?;
    let mut out = Vec::with_capacity(sales.len());
    for s in sales {
        let items = load_items(db, s.id).await?;
        out.push(SaleDetail { sale: s, items });
    }
    Ok(out)
}

pub async fn get_sale<C: ConnectionTrait>(db: &C, actor: &Actor, id: Uuid) -> Result<SaleDetail, ServiceError> {
    actor.require_staff()?;
    let s = sale::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("sale"))?;
    let items = load_items(db, s.id).await?;
    Ok(SaleDetail { sale: s, items })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use models::stock_movement::{self, MovementKind};

    fn line(product_id: Uuid, quantity: i32) -> SaleItemInput {
        SaleItemInput { product_id, quantity, unit_price_cents: None }
    }

    async fn stock_of(db: &DatabaseConnection, id: Uuid) -> Result<i32, anyhow::Error> {
        Ok(product::Entity::find_by_id(id).one(db).await?.map(|p| p.stock_qty).unwrap_or(-1))
    }

    #[tokio::test]
    async fn sale_deducts_and_totals() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let mgr = manager(&db).await?;
        let (_, buyer) = customer_with_login(&db, "10120230344").await?;
        let wiper = product_with_stock(&db, "Wiper blade", 3500, 10, 2).await?;
        let bulb = product_with_stock(&db, "H7 bulb", 1200, 4, 1).await?;

        let items = vec![
            line(wiper.id, 2),
            SaleItemInput { product_id: bulb.id, quantity: 3, unit_price_cents: Some(1000) },
        ];
        let done = create_sale(&db, &mgr, SaleInput { customer_id: Some(buyer.id), items }).await?;
        assert_eq!(done.sale.total_cents, 2 * 3500 + 3 * 1000);
        assert_eq!(done.sale.status, SaleStatus::Completed);
        assert_eq!(stock_of(&db, wiper.id).await?, 8);
        assert_eq!(stock_of(&db, bulb.id).await?, 1);
        assert_eq!(get_sale(&db, &mgr, done.sale.id).await?.items.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn shortfall_rolls_back_whole_sale() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let mgr = manager(&db).await?;
        let a = product_with_stock(&db, "Fuse", 100, 50, 1).await?;
        let b = product_with_stock(&db, "Battery", 45000, 1, 1).await?;

        let err = create_sale(
            &db,
            &mgr,
            SaleInput { customer_id: None, items: vec![line(a.id, 5), line(b.id, 2)] },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InsufficientStock(_)));
        assert!(err.to_string().starts_with("requested quantity exceeds available stock"));
        assert_eq!(stock_of(&db, a.id).await?, 50);
        assert_eq!(stock_of(&db, b.id).await?, 1);
        assert!(list_sales(&db, &mgr).await?.is_empty());
        assert!(stock_movement::Entity::find().all(&db).await?.is_empty());

        let empty = create_sale(&db, &mgr, SaleInput::default()).await.unwrap_err();
        assert_eq!(empty.field(), Some("items"));
        let ghost = create_sale(
            &db,
            &mgr,
            SaleInput { customer_id: None, items: vec![line(Uuid::new_v4(), 1)] },
        )
        .await
        .unwrap_err();
        assert_eq!(ghost.field(), Some("items"));
        Ok(())
    }

    #[tokio::test]
    async fn cancel_restocks_once() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let mgr = manager(&db).await?;
        let p = product_with_stock(&db, "Coolant", 2500, 6, 1).await?;
        let s = create_sale(&db, &mgr, SaleInput { customer_id: None, items: vec![line(p.id, 4)] }).await?;
        assert_eq!(stock_of(&db, p.id).await?, 2);

        let cancelled = cancel_sale(&db, &mgr, s.sale.id).await?;
        assert_eq!(cancelled.sale.status, SaleStatus::Cancelled);
        assert_eq!(stock_of(&db, p.id).await?, 6);
        let entries = stock_movement::Entity::find()
            .filter(stock_movement::Column::Kind.eq(MovementKind::Entry))
            .all(&db)
            .await?;
        assert_eq!(entries.len(), 1);

        assert!(matches!(cancel_sale(&db, &mgr, s.sale.id).await, Err(ServiceError::AlreadyProcessed(_))));
        assert_eq!(stock_of(&db, p.id).await?, 6);
        assert!(!mark_cancelled(&db, s.sale.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn oversized_prices_leave_stock_untouched() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let mgr = manager(&db).await?;
        let p = product_with_stock(&db, "Spark plug", 900, 10, 1).await?;

        let huge = SaleItemInput { product_id: p.id, quantity: 2, unit_price_cents: Some(i64::MAX) };
        let err = create_sale(&db, &mgr, SaleInput { customer_id: None, items: vec![huge] }).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
        assert_eq!(err.field(), Some("unit_price_cents"));

        let big = || SaleItemInput { product_id: p.id, quantity: 1, unit_price_cents: Some(i64::MAX - 1) };
        let err = create_sale(&db, &mgr, SaleInput { customer_id: None, items: vec![big(), big()] })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "unit_price_cents: amount too large");
        assert_eq!(stock_of(&db, p.id).await?, 10);
        assert!(list_sales(&db, &mgr).await?.is_empty());
        Ok(())
    }
}
