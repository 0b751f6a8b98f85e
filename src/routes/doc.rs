use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginForm, RegisterRequest, Token},
        clients::{ClientList, CreateClientRequest, UpdateClientRequest},
        orders::{CreateOrderRequest, OrderItemRequest, OrderList, OrderWithItems, UpdateOrderRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        users::{Message, UpdateMeRequest, UpdatePasswordRequest, UpdateUserRequest, UserList},
    },
    error::ErrorData,
    models::{Client, Order, OrderItem, Product, UserPublic, UserRole},
    response::{ApiResponse, Meta},
    routes::{auth, clients, health, orders, params, products, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::test_token,
        users::list_users,
        users::read_me,
        users::update_me,
        users::update_password_me,
        users::delete_me,
        users::read_user,
        users::update_user,
        users::delete_user,
        clients::list_clients,
        clients::create_client,
        clients::get_client,
        clients::update_client,
        clients::delete_client,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::update_order,
        orders::delete_order
    ),
    components(
        schemas(
            UserPublic,
            UserRole,
            Client,
            Product,
            Order,
            OrderItem,
            RegisterRequest,
            LoginForm,
            Token,
            UpdateMeRequest,
            UpdatePasswordRequest,
            UpdateUserRequest,
            UserList,
            Message,
            CreateClientRequest,
            UpdateClientRequest,
            ClientList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CreateOrderRequest,
            OrderItemRequest,
            UpdateOrderRequest,
            OrderWithItems,
            OrderList,
            params::SortOrder,
            params::ProductSortBy,
            ErrorData,
            Meta,
            ApiResponse<Product>,
            ApiResponse<OrderWithItems>,
            ApiResponse<ErrorData>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and token endpoints"),
        (name = "Users", description = "Profile and user administration"),
        (name = "Clients", description = "Client records"),
        (name = "Products", description = "Product catalog"),
        (name = "Orders", description = "Order placement and management"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_resource_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/auth/login",
            "/api/users/me/password",
            "/api/clients/{id}",
            "/api/products",
            "/api/orders/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
