//! Products, stock levels and the stock movement ledger.
use models::notification::NotificationKind;
use models::product::{self, DEFAULT_MIN_STOCK};
use models::stock_movement::{self, MovementKind};
use models::validate::{
    optional_text, validate_non_negative, validate_positive_price, validate_quantity,
    validate_required,
};
use models::{line_item, purchase_order, sale_item, supplier, time, Role};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::access::{supplier_profile, Actor};
use crate::errors::ServiceError;
use crate::notifications;
use crate::pagination::Pagination;

#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cost_cents: i64,
    pub sale_price_cents: i64,
    #[serde(default)]
    pub stock_qty: i32,
    #[serde(default)]
    pub min_stock: Option<i32>,
    /// Only honoured for managers; suppliers always own what they create.
    #[serde(default)]
    pub supplier_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub cost_cents: Option<i64>,
    pub sale_price_cents: Option<i64>,
    pub min_stock: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    #[serde(default)]
    pub low_stock: bool,
    #[serde(default)]
    pub supplier_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovementInput {
    pub product_id: Uuid,
    pub kind: MovementKind,
    pub quantity: i32,
    #[serde(default)]
    pub unit_cost_cents: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

async fn ensure_can_edit<C: ConnectionTrait>(db: &C, actor: &Actor, p: &product::Model) -> Result<(), ServiceError> {
    match actor.role {
        Role::Manager => Ok(()),
        Role::Supplier => {
            let me = supplier_profile(db, actor).await?;
            if p.supplier_id == Some(me.id) {
                Ok(())
            } else {
                Err(ServiceError::forbidden("product belongs to another supplier"))
            }
        }
        _ => Err(ServiceError::forbidden("only suppliers and managers manage products")),
    }
}

#[instrument(skip(db, input), fields(actor = %actor.user_id))]
pub async fn create_product(
    db: &DatabaseConnection,
    actor: &Actor,
    input: ProductInput,
) -> Result<product::Model, ServiceError> {
    actor.require_one_of(&[Role::Supplier, Role::Manager])?;
    let name = validate_required("name", &input.name)?;
    let sale_price = validate_positive_price("sale_price_cents", input.sale_price_cents)?;
    let cost = validate_non_negative("cost_cents", input.cost_cents)?;
    let stock = validate_non_negative("stock_qty", input.stock_qty.into())? as i32;
    let min_stock = validate_non_negative("min_stock", input.min_stock.unwrap_or(DEFAULT_MIN_STOCK).into())? as i32;

    let supplier_id = match actor.role {
        Role::Supplier => Some(supplier_profile(db, actor).await?.id),
        _ => match input.supplier_id {
            Some(id) => {
                supplier::Entity::find_by_id(id)
                    .one(db)
                    .await?
                    .ok_or_else(|| ServiceError::validation("supplier_id", "supplier not found"))?;
                Some(id)
            }
            None => None,
        },
    };

    let now = time::now();
    let created = product::ActiveModel {
        id: Set(Uuid::new_v4()),
        supplier_id: Set(supplier_id),
        name: Set(name),
        description: Set(optional_text(input.description)),
        cost_cents: Set(cost),
        sale_price_cents: Set(sale_price),
        stock_qty: Set(stock),
        min_stock: Set(min_stock),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(product_id = %created.id, name = %created.name, stock = created.stock_qty, "product_created");
    Ok(created)
}

/// Products by name. `low_stock` keeps rows with `stock_qty <= min_stock`.
pub async fn list_products<C: ConnectionTrait>(
    db: &C,
    filter: &ProductFilter,
    page: Pagination,
) -> Result<Vec<product::Model>, ServiceError> {
    let mut q = product::Entity::find();
    if filter.low_stock {
        q = q.filter(Expr::col(product::Column::StockQty).lte(Expr::col(product::Column::MinStock)));
    }
    if let Some(sid) = filter.supplier_id {
        q = q.filter(product::Column::SupplierId.eq(sid));
    }
    let (idx, per_page) = page.bounds();
    Ok(q.order_by_asc(product::Column::Name).paginate(db, per_page).fetch_page(idx).await?)
}

pub async fn get_product<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<product::Model, ServiceError> {
    product::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("product"))
}

pub async fn update_product(
    db: &DatabaseConnection,
    actor: &Actor,
    id: Uuid,
    patch: ProductUpdate,
) -> Result<product::Model, ServiceError> {
    let found = get_product(db, id).await?;
    ensure_can_edit(db, actor, &found).await?;
    let mut am: product::ActiveModel = found.into();
    if let Some(name) = patch.name {
        am.name = Set(validate_required("name", &name)?);
    }
    if patch.description.is_some() {
        am.description = Set(optional_text(patch.description));
    }
    if let Some(cost) = patch.cost_cents {
        am.cost_cents = Set(validate_non_negative("cost_cents", cost)?);
    }
    if let Some(price) = patch.sale_price_cents {
        am.sale_price_cents = Set(validate_positive_price("sale_price_cents", price)?);
    }
    if let Some(min) = patch.min_stock {
        am.min_stock = Set(validate_non_negative("min_stock", min.into())? as i32);
    }
    am.updated_at = Set(time::now());
    let updated = am.update(db).await?;
    info!(product_id = %updated.id, "product_updated");
    Ok(updated)
}

/// Products that appear on a quote, order, sale or purchase order stay.
pub async fn delete_product(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
    let found = get_product(db, id).await?;
    ensure_can_edit(db, actor, &found).await?;
    let txn = db.begin().await?;
    let quoted = line_item::Entity::find().filter(line_item::Column::ProductId.eq(id)).count(&txn).await?;
    let sold = sale_item::Entity::find().filter(sale_item::Column::ProductId.eq(id)).count(&txn).await?;
    let ordered = purchase_order::Entity::find()
        .filter(purchase_order::Column::ProductId.eq(id))
        .count(&txn)
        .await?;
    if quoted + sold + ordered > 0 {
        warn!(product_id = %id, quoted, sold, ordered, "product_delete_blocked");
        return Err(ServiceError::conflict("product_id", "product has sales or service history"));
    }
    product::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!(product_id = %id, "product_deleted");
    Ok(())
}

async fn insert_movement<C: ConnectionTrait>(
    db: &C,
    product_id: Uuid,
    kind: MovementKind,
    quantity: i32,
    unit_cost_cents: Option<i64>,
    note: Option<String>,
    reference: Option<String>,
) -> Result<stock_movement::Model, ServiceError> {
    Ok(stock_movement::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        kind: Set(kind),
        quantity: Set(quantity),
        unit_cost_cents: Set(unit_cost_cents),
        note: Set(note),
        reference: Set(reference),
        created_at: Set(time::now()),
    }
    .insert(db)
    .await?)
}

/// Staff notification when a product sits at or below its minimum.
pub async fn check_low_stock<C: ConnectionTrait>(db: &C, p: &product::Model) -> Result<bool, ServiceError> {
    if !p.is_low_stock() {
        return Ok(false);
    }
    let message = format!(
        "Low stock alert: {} has {} unit(s) left (minimum {})",
        p.name, p.stock_qty, p.min_stock
    );
    notifications::notify(db, None, NotificationKind::LowStock, message, Some(p.id)).await?;
    warn!(product_id = %p.id, stock = p.stock_qty, min_stock = p.min_stock, "low_stock");
    Ok(true)
}

/// Take `qty` units out of stock and log an EXIT movement. Fails with
/// `InsufficientStock` without touching the row when stock is short.
pub async fn consume_stock<C: ConnectionTrait>(
    db: &C,
    product_id: Uuid,
    qty: i32,
    reference: Option<String>,
) -> Result<product::Model, ServiceError> {
    validate_quantity("quantity", qty)?;
    if !product::decrement_stock(db, product_id, qty).await? {
        let p = get_product(db, product_id)
            .await
            .map_err(|_| ServiceError::validation("product_id", "product not found"))?;
        return Err(ServiceError::insufficient_stock(&p.name));
    }
    insert_movement(db, product_id, MovementKind::Exit, qty, None, None, reference).await?;
    let p = get_product(db, product_id).await?;
    check_low_stock(db, &p).await?;
    Ok(p)
}

/// Put `qty` units back and log an ENTRY movement.
pub async fn restock<C: ConnectionTrait>(
    db: &C,
    product_id: Uuid,
    qty: i32,
    reference: Option<String>,
    note: Option<String>,
) -> Result<product::Model, ServiceError> {
    validate_quantity("quantity", qty)?;
    if !product::increment_stock(db, product_id, qty).await? {
        return Err(ServiceError::not_found("product"));
    }
    insert_movement(db, product_id, MovementKind::Entry, qty, None, note, reference).await?;
    get_product(db, product_id).await
}

/// ENTRY adds, EXIT subtracts, ADJUSTMENT sets the counted level.
#[instrument(skip(db, input), fields(product_id = %input.product_id, kind = ?input.kind))]
pub async fn record_movement(
    db: &DatabaseConnection,
    actor: &Actor,
    input: MovementInput,
) -> Result<(stock_movement::Model, product::Model), ServiceError> {
    actor.require_staff()?;
    match input.kind {
        MovementKind::Adjustment => { validate_non_negative("quantity", input.quantity.into())?; }
        _ => { validate_quantity("quantity", input.quantity)?; }
    }
    if let Some(cost) = input.unit_cost_cents {
        validate_non_negative("unit_cost_cents", cost)?;
    }
    let note = optional_text(input.note);

    let txn = db.begin().await?;
    let current = get_product(&txn, input.product_id).await?;
    let updated = match input.kind {
        MovementKind::Entry => {
            product::increment_stock(&txn, current.id, input.quantity).await?;
            get_product(&txn, current.id).await?
        }
        MovementKind::Exit => {
            if !product::decrement_stock(&txn, current.id, input.quantity).await? {
                return Err(ServiceError::insufficient_stock(&current.name));
            }
            get_product(&txn, current.id).await?
        }
        MovementKind::Adjustment => {
            let mut am: product::ActiveModel = current.clone().into();
            am.stock_qty = Set(input.quantity);
            am.updated_at = Set(time::now());
            am.update(&txn).await?
        }
    };
    let movement = insert_movement(
        &txn,
        current.id,
        input.kind,
        input.quantity,
        input.unit_cost_cents,
        note,
        None,
    )
    .await?;
    if input.kind != MovementKind::Entry {
        check_low_stock(&txn, &updated).await?;
    }
    txn.commit().await?;
    info!(movement_id = %movement.id, product_id = %updated.id, stock = updated.stock_qty, "stock_movement_recorded");
    Ok((movement, updated))
}

pub async fn list_movements<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    product_id: Option<Uuid>,
) -> Result<Vec<stock_movement::Model>, ServiceError> {
    actor.require_staff()?;
    let mut q = stock_movement::Entity::find();
    if let Some(pid) = product_id {
        q = q.filter(stock_movement::Column::ProductId.eq(pid));
    }
    Ok(q.order_by_desc(stock_movement::Column::CreatedAt).all(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, manager, mechanic_with_login, product_with_stock, supplier_with_login};
    use crate::sales::{self, SaleInput, SaleItemInput};
    use models::notification;

    fn input(name: &str, price: i64) -> ProductInput {
        ProductInput {
            name: name.into(),
            description: None,
            cost_cents: 100,
            sale_price_cents: price,
            stock_qty: 10,
            min_stock: None,
            supplier_id: None,
        }
    }

    #[tokio::test]
    async fn supplier_owns_created_products() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let (sup, profile) = supplier_with_login(&db, "12345678000195").await?;
        let (other, _) = supplier_with_login(&db, "98765432000100").await?;
        let (mech, _) = mechanic_with_login(&db, "55566677788").await?;

        let p = create_product(
            &db,
            &sup,
            ProductInput { supplier_id: Some(Uuid::new_v4()), ..input("Spark plug", 2500) },
        )
        .await?;
        assert_eq!(p.supplier_id, Some(profile.id));
        assert_eq!(p.min_stock, DEFAULT_MIN_STOCK);

        assert!(matches!(create_product(&db, &mech, input("x", 1)).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(
            update_product(
                &db,
                &other,
                p.id,
                ProductUpdate { name: Some("hijack".into()), ..Default::default() },
            )
            .await,
            Err(ServiceError::Forbidden(_))
        ));
        let renamed = update_product(
            &db,
            &sup,
            p.id,
            ProductUpdate { sale_price_cents: Some(2700), ..Default::default() },
        )
        .await?;
        assert_eq!(renamed.sale_price_cents, 2700);

        let err = create_product(&db, &sup, input("Free", 0)).await.unwrap_err();
        assert_eq!(err.field(), Some("sale_price_cents"));
        Ok(())
    }

    #[tokio::test]
    async fn low_stock_filter_is_inclusive() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        product_with_stock(&db, "At minimum", 1000, 5, 5).await?;
        product_with_stock(&db, "Below", 1000, 1, 5).await?;
        product_with_stock(&db, "Plenty", 1000, 50, 5).await?;

        let low = list_products(
            &db,
            &ProductFilter { low_stock: true, supplier_id: None },
            Pagination::default(),
        )
        .await?;
        let names: Vec<_> = low.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["At minimum", "Below"]);
        assert_eq!(list_products(&db, &ProductFilter::default(), Pagination::default()).await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn movements_adjust_stock_and_alert() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let mgr = manager(&db).await?;
        let p = product_with_stock(&db, "Brake pad", 9000, 8, 5).await?;

        let (_, after_entry) = record_movement(
            &db,
            &mgr,
            MovementInput {
                product_id: p.id,
                kind: MovementKind::Entry,
                quantity: 2,
                unit_cost_cents: Some(4000),
                note: None,
            },
        )
        .await?;
        assert_eq!(after_entry.stock_qty, 10);

        let short = record_movement(
            &db,
            &mgr,
            MovementInput {
                product_id: p.id,
                kind: MovementKind::Exit,
                quantity: 11,
                unit_cost_cents: None,
                note: None,
            },
        )
        .await;
        assert!(matches!(short, Err(ServiceError::InsufficientStock(_))));
        assert_eq!(get_product(&db, p.id).await?.stock_qty, 10);

        let (_, after_exit) = record_movement(
            &db,
            &mgr,
            MovementInput {
                product_id: p.id,
                kind: MovementKind::Exit,
                quantity: 6,
                unit_cost_cents: None,
                note: Some("workshop use".into()),
            },
        )
        .await?;
        assert_eq!(after_exit.stock_qty, 4);
        let alerts = notification::Entity::find().all(&db).await?;
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].message.contains("Low stock alert"));
        assert!(alerts[0].message.contains("Brake pad"));

        let (_, counted) = record_movement(
            &db,
            &mgr,
            MovementInput {
                product_id: p.id,
                kind: MovementKind::Adjustment,
                quantity: 20,
                unit_cost_cents: None,
                note: None,
            },
        )
        .await?;
        assert_eq!(counted.stock_qty, 20);
        assert_eq!(list_movements(&db, &mgr, Some(p.id)).await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn products_with_history_cannot_be_deleted() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let mgr = manager(&db).await?;
        let sold = product_with_stock(&db, "Headlamp", 8000, 5, 1).await?;
        let unused = product_with_stock(&db, "Hubcap", 3000, 5, 1).await?;
        let line = SaleItemInput { product_id: sold.id, quantity: 1, unit_price_cents: None };
        sales::create_sale(&db, &mgr, SaleInput { customer_id: None, items: vec![line] }).await?;

        let err = delete_product(&db, &mgr, sold.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { .. }));
        assert_eq!(err.to_string(), "product_id: product has sales or service history");
        assert_eq!(get_product(&db, sold.id).await?.stock_qty, 4);

        delete_product(&db, &mgr, unused.id).await?;
        assert!(matches!(get_product(&db, unused.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn consume_stock_is_conditional() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let p = product_with_stock(&db, "Oil", 3000, 2, 0).await?;
        assert!(matches!(consume_stock(&db, p.id, 3, None).await, Err(ServiceError::InsufficientStock(_))));
        let left = consume_stock(&db, p.id, 2, Some("SALE".into())).await?;
        assert_eq!(left.stock_qty, 0);
        let moves = stock_movement::Entity::find().all(&db).await?;
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].reference.as_deref(), Some("SALE"));
        Ok(())
    }
}
