#![cfg(test)]
use migration::MigratorTrait;
use models::{catalog_service, customer, mechanic, product, supplier, time, user_account, vehicle, Role};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use uuid::Uuid;

use crate::access::Actor;

/// Fresh in-memory database with the full schema. A single pooled
/// connection keeps every query on the same SQLite memory instance.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_string());
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub async fn insert_user(
    db: &DatabaseConnection,
    username: &str,
    role: Role,
) -> Result<user_account::Model, anyhow::Error> {
    let now = time::now();
    Ok(user_account::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(None),
        display_name: Set(username.to_string()),
        password_hash: Set("unused".into()),
        password_algorithm: Set("argon2".into()),
        role: Set(role),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?)
}

pub async fn manager(db: &DatabaseConnection) -> Result<Actor, anyhow::Error> {
    let u = insert_user(db, &format!("mgr_{}", &Uuid::new_v4().simple().to_string()[..8]), Role::Manager).await?;
    Ok(Actor::new(u.id, Role::Manager))
}

/// Customer profile with its own login.
pub async fn customer_with_login(
    db: &DatabaseConnection,
    cpf: &str,
) -> Result<(Actor, customer::Model), anyhow::Error> {
    let u = insert_user(db, cpf, Role::Customer).await?;
    let now = time::now();
    let c = customer::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(Some(u.id)),
        name: Set(format!("Customer {cpf}")),
        cpf: Set(cpf.to_string()),
        phone: Set("11999990000".into()),
        email: Set(None),
        address: Set("Rua das Flores, 10".into()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    Ok((Actor::new(u.id, Role::Customer), c))
}

pub async fn mechanic_with_login(
    db: &DatabaseConnection,
    cpf: &str,
) -> Result<(Actor, mechanic::Model), anyhow::Error> {
    let u = insert_user(db, &format!("mech{cpf}"), Role::Mechanic).await?;
    let now = time::now();
    let m = mechanic::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(Some(u.id)),
        name: Set(format!("Mechanic {cpf}")),
        cpf: Set(cpf.to_string()),
        phone: Set("11988887777".into()),
        email: Set(format!("mech{cpf}@shop.com")),
        address: Set("Oficina".into()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    Ok((Actor::new(u.id, Role::Mechanic), m))
}

pub async fn supplier_with_login(
    db: &DatabaseConnection,
    cnpj: &str,
) -> Result<(Actor, supplier::Model), anyhow::Error> {
    let u = insert_user(db, cnpj, Role::Supplier).await?;
    let now = time::now();
    let s = supplier::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(Some(u.id)),
        company_name: Set(format!("Parts {cnpj}")),
        cnpj: Set(cnpj.to_string()),
        phone: Set("1133334444".into()),
        email: Set(None),
        address: Set("Av. Industrial, 500".into()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    Ok((Actor::new(u.id, Role::Supplier), s))
}

pub async fn vehicle_for(
    db: &DatabaseConnection,
    customer_id: Uuid,
    plate: &str,
) -> Result<vehicle::Model, anyhow::Error> {
    let now = time::now();
    Ok(vehicle::ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer_id),
        plate: Set(plate.to_string()),
        model: Set("Gol".into()),
        make: Set("VW".into()),
        year: Set(2018),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?)
}

pub async fn catalog_entry(
    db: &DatabaseConnection,
    description: &str,
    price_cents: i64,
) -> Result<catalog_service::Model, anyhow::Error> {
    let now = time::now();
    Ok(catalog_service::ActiveModel {
        id: Set(Uuid::new_v4()),
        description: Set(description.to_string()),
        base_price_cents: Set(price_cents),
        details: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?)
}

pub async fn product_with_stock(
    db: &DatabaseConnection,
    name: &str,
    price_cents: i64,
    stock: i32,
    min_stock: i32,
) -> Result<product::Model, anyhow::Error> {
    let now = time::now();
    Ok(product::ActiveModel {
        id: Set(Uuid::new_v4()),
        supplier_id: Set(None),
        name: Set(name.to_string()),
        description: Set(None),
        cost_cents: Set(price_cents / 2),
        sale_price_cents: Set(price_cents),
        stock_qty: Set(stock),
        min_stock: Set(min_stock),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?)
}

/// Product listed by a supplier, priced at 4000 with cost 2500.
pub async fn supplier_product(
    db: &DatabaseConnection,
    supplier_id: Uuid,
    name: &str,
    stock: i32,
) -> Result<product::Model, anyhow::Error> {
    let mut am: product::ActiveModel = product_with_stock(db, name, 4000, stock, 0).await?.into();
    am.supplier_id = Set(Some(supplier_id));
    am.cost_cents = Set(2500);
    Ok(am.update(db).await?)
}
