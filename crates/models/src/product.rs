use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::QueryFilter;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::supplier;

pub const DEFAULT_MIN_STOCK: i32 = 5;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub cost_cents: i64,
    pub sale_price_cents: i64,
    pub stock_qty: i32,
    pub min_stock: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// At or below the configured minimum.
    pub fn is_low_stock(&self) -> bool {
        self.stock_qty <= self.min_stock
    }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Supplier,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Supplier => Entity::belongs_to(supplier::Entity)
                .from(Column::SupplierId)
                .to(supplier::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Subtract `qty` only if enough stock remains. Returns false when the
/// product is missing or short; the row is left untouched in that case.
pub async fn decrement_stock<C: ConnectionTrait>(db: &C, id: Uuid, qty: i32) -> Result<bool, ModelError> {
    let res = Entity::update_many()
        .col_expr(Column::StockQty, Expr::col(Column::StockQty).sub(qty))
        .filter(Column::Id.eq(id))
        .filter(Column::StockQty.gte(qty))
        .exec(db)
        .await?;
    Ok(res.rows_affected == 1)
}

pub async fn increment_stock<C: ConnectionTrait>(db: &C, id: Uuid, qty: i32) -> Result<bool, ModelError> {
    let res = Entity::update_many()
        .col_expr(Column::StockQty, Expr::col(Column::StockQty).add(qty))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(res.rows_affected == 1)
}
