use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

use super::memory_db;
use crate::{customer, time, user_account, vehicle, Role};

async fn insert_user(db: &sea_orm::DatabaseConnection, username: &str, email: Option<&str>) -> user_account::Model {
    let now = time::now();
    user_account::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(email.map(str::to_string)),
        display_name: Set(username.to_string()),
        password_hash: Set("x".into()),
        password_algorithm: Set("argon2".into()),
        role: Set(Role::Customer),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("insert user")
}

#[tokio::test]
async fn login_lookup_matches_username_or_email() {
    let db = memory_db().await;
    let u = insert_user(&db, "ana", Some("ana@shop.com")).await;

    let by_name = user_account::find_by_login(&db, "ana").await.unwrap();
    assert_eq!(by_name.map(|m| m.id), Some(u.id));
    let by_mail = user_account::find_by_login(&db, "ANA@shop.com").await.unwrap();
    assert_eq!(by_mail.map(|m| m.id), Some(u.id));
    assert!(user_account::find_by_login(&db, "bob").await.unwrap().is_none());
    assert!(user_account::username_taken(&db, "ana").await.unwrap());
}

#[tokio::test]
async fn role_round_trips_through_the_column() {
    let db = memory_db().await;
    let u = insert_user(&db, "carl", None).await;
    let mut am: user_account::ActiveModel = u.into();
    am.role = Set(Role::Manager);
    let updated = am.update(&db).await.unwrap();
    let found = user_account::Entity::find_by_id(updated.id).one(&db).await.unwrap().unwrap();
    assert_eq!(found.role, Role::Manager);
    assert!(found.role.is_staff());
    assert_eq!("mechanic".parse::<Role>().unwrap(), Role::Mechanic);
}

#[tokio::test]
async fn plate_and_cpf_uniqueness_helpers() {
    let db = memory_db().await;
    let now = time::now();
    let c = customer::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(None),
        name: Set("Dana".into()),
        cpf: Set("12345678909".into()),
        phone: Set("11999990000".into()),
        email: Set(None),
        address: Set("Rua A, 1".into()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&db)
    .await
    .unwrap();
    let v = vehicle::ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_id: Set(c.id),
        plate: Set("ABC1D23".into()),
        model: Set("Onix".into()),
        make: Set("Chevrolet".into()),
        year: Set(2020),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&db)
    .await
    .unwrap();

    assert!(customer::cpf_taken(&db, "12345678909", None).await.unwrap());
    assert!(!customer::cpf_taken(&db, "12345678909", Some(c.id)).await.unwrap());
    assert!(vehicle::plate_taken(&db, "ABC1D23", None).await.unwrap());
    assert!(!vehicle::plate_taken(&db, "ABC1D23", Some(v.id)).await.unwrap());
}
