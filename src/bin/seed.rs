use commerce_admin_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{clients, products},
    models::UserRole,
    services::auth_service::{NewUser, find_by_email, insert_user},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let admin_id = ensure_user(&orm, "admin@example.com", "admin12345", UserRole::Admin).await?;
    let user_id = ensure_user(&orm, "user@example.com", "user12345", UserRole::Client).await?;
    let client_id = ensure_client(&orm).await?;
    seed_products(&orm).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}, Client ID: {client_id}");
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    email: &str,
    password: &str,
    role: UserRole,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = find_by_email(orm, email).await? {
        println!("User {email} already present");
        return Ok(existing.id);
    }

    let user = insert_user(
        orm,
        NewUser {
            email,
            password,
            full_name: None,
            role,
            is_active: true,
        },
    )
    .await?;

    println!("Created user {email} (role={})", role.as_str());
    Ok(user.id)
}

async fn ensure_client(orm: &DatabaseConnection) -> anyhow::Result<Uuid> {
    let email = "maria@example.com";
    if let Some(existing) = clients::Entity::find()
        .filter(clients::Column::Email.eq(email))
        .one(orm)
        .await?
    {
        return Ok(existing.id);
    }

    let now = Utc::now().fixed_offset();
    let client = clients::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Maria Souza".to_string()),
        email: Set(email.to_string()),
        cpf: Set("123.456.789-09".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(orm)
    .await?;

    println!("Created client {email}");
    Ok(client.id)
}

async fn seed_products(orm: &DatabaseConnection) -> anyhow::Result<()> {
    let catalog = [
        ("Whole milk 1L", 549, "7890000000011", "dairy", Some("beverages"), 120),
        ("Sourdough loaf", 1290, "7890000000028", "bakery", None, 30),
        ("Espresso beans 500g", 4590, "7890000000035", "grocery", Some("coffee"), 45),
        ("Dish soap", 389, "7890000000042", "cleaning", Some("household"), 0),
    ];

    for (description, price, barcode, section, category, stock) in catalog {
        let exists = products::Entity::find()
            .filter(products::Column::Barcode.eq(barcode))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }

        let now = Utc::now().fixed_offset();
        products::ActiveModel {
            id: Set(Uuid::new_v4()),
            description: Set(description.to_string()),
            sale_price: Set(price),
            barcode: Set(barcode.to_string()),
            section: Set(section.to_string()),
            category: Set(category.map(str::to_string)),
            initial_stock: Set(stock),
            expiration_date: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
