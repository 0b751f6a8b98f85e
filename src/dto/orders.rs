use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Order, OrderItem};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub client_id: Uuid,
    #[validate(nested)]
    pub items: Vec<OrderItemRequest>,
}

impl CreateOrderRequest {
    /// Sum of `quantity * unit_price` over every line, `None` when it does not fit in `i64`.
    pub fn checked_total(&self) -> Option<i64> {
        self.items.iter().try_fold(0i64, |total, item| {
            line_total(item.unit_price, item.quantity).and_then(|line| total.checked_add(line))
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
    /// Sale price at the time of the order, in minor currency units.
    #[validate(range(min = 0))]
    pub unit_price: i64,
    /// Defaults to the product's section when omitted.
    pub section: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub total_amount: i64,
}

impl OrderWithItems {
    pub fn new(order: Order, items: Vec<OrderItem>) -> Self {
        // Saturates; orders created through the API were bounded by `checked_total`.
        let total_amount = items.iter().fold(0i64, |total, item| {
            let line = line_total(item.unit_price, item.quantity).unwrap_or(i64::MAX);
            total.saturating_add(line)
        });
        Self {
            order,
            items,
            total_amount,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderWithItems>,
}

fn line_total(unit_price: i64, quantity: i32) -> Option<i64> {
    unit_price.checked_mul(i64::from(quantity))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i32, unit_price: i64) -> OrderItemRequest {
        OrderItemRequest {
            product_id: Uuid::new_v4(),
            quantity,
            unit_price,
            section: None,
        }
    }

    #[test]
    fn total_sums_every_line() {
        let request = CreateOrderRequest {
            client_id: Uuid::new_v4(),
            items: vec![line(2, 150), line(3, 10)],
        };
        assert_eq!(request.checked_total(), Some(330));
    }

    #[test]
    fn total_rejects_line_and_sum_overflow() {
        let product = CreateOrderRequest {
            client_id: Uuid::new_v4(),
            items: vec![line(2, i64::MAX)],
        };
        assert_eq!(product.checked_total(), None);

        let sum = CreateOrderRequest {
            client_id: Uuid::new_v4(),
            items: vec![line(1, i64::MAX), line(1, 1)],
        };
        assert_eq!(sum.checked_total(), None);

        let edge = CreateOrderRequest {
            client_id: Uuid::new_v4(),
            items: vec![line(1, i64::MAX)],
        };
        assert_eq!(edge.checked_total(), Some(i64::MAX));
    }
}
