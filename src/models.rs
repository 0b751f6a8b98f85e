use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    clients::Model as ClientModel, order_items::Model as OrderItemModel,
    orders::Model as OrderModel, products::Model as ProductModel, users::Model as UserModel,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Client,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Client => "client",
        }
    }

    /// Unknown stored roles degrade to the least privileged role.
    pub fn from_db(value: &str) -> Self {
        match value {
            "admin" => UserRole::Admin,
            _ => UserRole::Client,
        }
    }
}

/// A user as exposed by the API; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub is_active: bool,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub description: String,
    pub sale_price: i64,
    pub barcode: String,
    pub section: String,
    pub category: Option<String>,
    pub initial_stock: i32,
    pub expiration_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub client_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: i64,
    pub section: Option<String>,
}

impl From<UserModel> for UserPublic {
    fn from(model: UserModel) -> Self {
        Self {
            id: model.id,
            email: model.email,
            is_active: model.is_active,
            full_name: model.full_name,
            role: UserRole::from_db(&model.role),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<ClientModel> for Client {
    fn from(model: ClientModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            cpf: model.cpf,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl Product {
    pub fn from_entity(model: ProductModel, images: Vec<String>) -> Self {
        Self {
            id: model.id,
            description: model.description,
            sale_price: model.sale_price,
            barcode: model.barcode,
            section: model.section,
            category: model.category,
            initial_stock: model.initial_stock,
            expiration_date: model.expiration_date,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
            images,
        }
    }
}

impl From<OrderModel> for Order {
    fn from(model: OrderModel) -> Self {
        Self {
            id: model.id,
            client_id: model.client_id,
            order_date: model.order_date.with_timezone(&Utc),
            status: model.status,
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<OrderItemModel> for OrderItem {
    fn from(model: OrderItemModel) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            quantity: model.quantity,
            unit_price: model.unit_price,
            section: model.section,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_storage_strings() {
        assert_eq!(UserRole::from_db(UserRole::Admin.as_str()), UserRole::Admin);
        assert_eq!(UserRole::from_db(UserRole::Client.as_str()), UserRole::Client);
        assert_eq!(UserRole::from_db("superuser"), UserRole::Client);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&UserRole::Admin).unwrap();
        assert_eq!(json, "\"admin\"");
    }
}
