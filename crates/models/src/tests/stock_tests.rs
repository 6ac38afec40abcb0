use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

use super::memory_db;
use crate::{product, time};

async fn product_with_stock(db: &sea_orm::DatabaseConnection, qty: i32) -> product::Model {
    let now = time::now();
    product::ActiveModel {
        id: Set(Uuid::new_v4()),
        supplier_id: Set(None),
        name: Set("Oil filter".into()),
        description: Set(None),
        cost_cents: Set(1500),
        sale_price_cents: Set(4000),
        stock_qty: Set(qty),
        min_stock: Set(product::DEFAULT_MIN_STOCK),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
}

#[tokio::test]
async fn decrement_refuses_to_go_negative() {
    let db = memory_db().await;
    let p = product_with_stock(&db, 3).await;

    assert!(!product::decrement_stock(&db, p.id, 4).await.unwrap());
    let unchanged = product::Entity::find_by_id(p.id).one(&db).await.unwrap().unwrap();
    assert_eq!(unchanged.stock_qty, 3);

    assert!(product::decrement_stock(&db, p.id, 3).await.unwrap());
    let empty = product::Entity::find_by_id(p.id).one(&db).await.unwrap().unwrap();
    assert_eq!(empty.stock_qty, 0);
    assert!(empty.is_low_stock());
}

#[tokio::test]
async fn increment_and_missing_product() {
    let db = memory_db().await;
    let p = product_with_stock(&db, 10).await;
    assert!(product::increment_stock(&db, p.id, 5).await.unwrap());
    let found = product::Entity::find_by_id(p.id).one(&db).await.unwrap().unwrap();
    assert_eq!(found.stock_qty, 15);
    assert!(!found.is_low_stock());
    assert!(!product::decrement_stock(&db, Uuid::new_v4(), 1).await.unwrap());
}
