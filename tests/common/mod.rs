#![allow(dead_code)]

use commerce_admin_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        clients::CreateClientRequest,
        orders::{CreateOrderRequest, OrderItemRequest},
        products::CreateProductRequest,
    },
    entity::Products,
    middleware::auth::AuthUser,
    models::{Client, Product, UserRole},
    services::{
        auth_service::{NewUser, insert_user},
        client_service, product_service,
    },
    state::AppState,
};
use sea_orm::EntityTrait;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";

/// Fresh in-memory database migrated with the production migrations.
pub async fn test_state() -> anyhow::Result<AppState> {
    let config = AppConfig::with_database("sqlite::memory:", JWT_SECRET);
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    Ok(AppState::new(orm, config))
}

pub async fn create_user(
    state: &AppState,
    email: &str,
    password: &str,
    role: UserRole,
) -> anyhow::Result<AuthUser> {
    let user = insert_user(
        &state.orm,
        NewUser {
            email,
            password,
            full_name: None,
            role,
            is_active: true,
        },
    )
    .await?;
    Ok(AuthUser {
        user_id: user.id,
        role,
    })
}

pub async fn create_client(state: &AppState, email: &str, cpf: &str) -> anyhow::Result<Client> {
    let resp = client_service::create_client(
        state,
        CreateClientRequest {
            name: format!("Client {cpf}"),
            email: email.to_string(),
            cpf: cpf.to_string(),
        },
    )
    .await?;
    Ok(resp.data.expect("client"))
}

pub fn product_request(barcode: &str, section: &str, stock: i32, price: i64) -> CreateProductRequest {
    CreateProductRequest {
        description: format!("Product {barcode}"),
        sale_price: price,
        barcode: barcode.to_string(),
        section: section.to_string(),
        category: None,
        initial_stock: stock,
        expiration_date: None,
        images: Vec::new(),
    }
}

pub async fn create_product(
    state: &AppState,
    barcode: &str,
    section: &str,
    stock: i32,
) -> anyhow::Result<Product> {
    let resp =
        product_service::create_product(state, product_request(barcode, section, stock, 1000))
            .await?;
    Ok(resp.data.expect("product"))
}

pub async fn stock_of(state: &AppState, product_id: Uuid) -> anyhow::Result<i32> {
    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .expect("product exists");
    Ok(product.initial_stock)
}

pub fn line(product_id: Uuid, quantity: i32) -> OrderItemRequest {
    OrderItemRequest {
        product_id,
        quantity,
        unit_price: 250,
        section: None,
    }
}

pub fn order(client_id: Uuid, items: Vec<OrderItemRequest>) -> CreateOrderRequest {
    CreateOrderRequest { client_id, items }
}
