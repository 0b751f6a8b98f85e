use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::Product;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(range(min = 0))]
    pub sale_price: i64,
    #[validate(length(min = 1, max = 64))]
    pub barcode: String,
    #[validate(length(min = 1))]
    pub section: String,
    pub category: Option<String>,
    #[validate(range(min = 0))]
    pub initial_stock: i32,
    pub expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub sale_price: Option<i64>,
    #[validate(length(min = 1, max = 64))]
    pub barcode: Option<String>,
    #[validate(length(min = 1))]
    pub section: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0))]
    pub initial_stock: Option<i32>,
    pub expiration_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
