use std::collections::HashMap;

use sea_orm::sea_query::{Expr, Query, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::orders::{CreateOrderRequest, OrderItemRequest, OrderList, OrderWithItems, UpdateOrderRequest},
    entity::{
        clients::Entity as Clients,
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    models::OrderItem,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder, day_end_exclusive, day_start},
    services::{lock_for_update, now},
    state::AppState,
};

pub const DEFAULT_STATUS: &str = "pending";

pub async fn create_order(
    state: &AppState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    payload.validate()?;
    if payload.checked_total().is_none() {
        return Err(AppError::Validation(
            "order total exceeds the supported amount".into(),
        ));
    }
    let positions = i32::try_from(payload.items.len())
        .map_err(|_| AppError::Validation("too many order items".into()))?;

    let txn = state.orm.begin().await?;

    if Clients::find_by_id(payload.client_id).one(&txn).await?.is_none() {
        return Err(AppError::not_found("Client", payload.client_id));
    }

    // Every line is checked before the first write so a rejected order leaves stock untouched.
    let products = validate_stock(&txn, &payload.items).await?;

    let created_at = now();
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        client_id: Set(payload.client_id),
        order_date: Set(created_at),
        status: Set(DEFAULT_STATUS.into()),
        updated_at: Set(created_at),
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(payload.items.len());
    for (position, line) in (0..positions).zip(payload.items.iter()) {
        decrement_stock(&txn, line.product_id, line.quantity).await?;

        let section = line
            .section
            .clone()
            .or_else(|| products.get(&line.product_id).map(|p| p.section.clone()));

        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            section: Set(section),
            position: Set(position),
        }
        .insert(&txn)
        .await?;

        items.push(item.into());
    }

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        client_id = %order.client_id,
        items = items.len(),
        "order created"
    );

    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems::new(order.into(), items),
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (skip, limit) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(start) = query.start_date {
        condition = condition.add(OrderCol::OrderDate.gte(day_start(start).fixed_offset()));
    }
    if let Some(end) = query.end_date {
        condition = condition.add(OrderCol::OrderDate.lt(day_end_exclusive(end).fixed_offset()));
    }
    if let Some(order_id) = query.order_id {
        condition = condition.add(OrderCol::Id.eq(order_id));
    }
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }
    if let Some(client_id) = query.client_id {
        condition = condition.add(OrderCol::ClientId.eq(client_id));
    }
    if let Some(section) = query.section.as_ref().filter(|s| !s.is_empty()) {
        // Semi-join: an order with several matching items is still returned once.
        condition = condition.add(
            OrderCol::Id.in_subquery(
                Query::select()
                    .column(OrderItemCol::OrderId)
                    .from(OrderItems)
                    .and_where(OrderItemCol::Section.eq(section.clone()))
                    .to_owned(),
            ),
        );
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::OrderDate),
        SortOrder::Desc => finder.order_by_desc(OrderCol::OrderDate),
    };
    finder = finder.order_by_asc(OrderCol::Id);

    let total = finder.clone().count(&state.orm).await?;

    let orders = finder.offset(skip).limit(limit).all(&state.orm).await?;
    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut items_by_order = load_items(&state.orm, &order_ids).await?;

    let items = orders
        .into_iter()
        .map(|order| {
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            OrderWithItems::new(order.into(), items)
        })
        .collect();

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::new(skip, limit, total)),
    ))
}

pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = find_order(&state.orm, id).await?;
    let items = load_items(&state.orm, &[order.id])
        .await?
        .remove(&order.id)
        .unwrap_or_default();

    Ok(ApiResponse::success(
        "Order found",
        OrderWithItems::new(order.into(), items),
        Some(Meta::empty()),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    id: Uuid,
    payload: UpdateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let existing = find_order(&state.orm, id).await?;

    let mut active: OrderActive = existing.into();
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.updated_at = Set(now());
    let order = active.update(&state.orm).await?;

    tracing::info!(order_id = %order.id, status = %order.status, "order status updated");

    let items = load_items(&state.orm, &[order.id])
        .await?
        .remove(&order.id)
        .unwrap_or_default();

    Ok(ApiResponse::success(
        "Order updated",
        OrderWithItems::new(order.into(), items),
        Some(Meta::empty()),
    ))
}

pub async fn delete_order(state: &AppState, id: Uuid) -> AppResult<()> {
    let txn = state.orm.begin().await?;
    let order = find_order(&txn, id).await?;

    let removed = OrderItems::delete_many()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .exec(&txn)
        .await?;
    Orders::delete_by_id(order.id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!(order_id = %id, items = removed.rows_affected, "order deleted");
    Ok(())
}

async fn find_order<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<OrderModel> {
    Orders::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("Order", id))
}

async fn validate_stock<C: ConnectionTrait>(
    conn: &C,
    lines: &[OrderItemRequest],
) -> AppResult<HashMap<Uuid, ProductModel>> {
    let mut requested: Vec<(Uuid, i32)> = Vec::new();
    for line in lines {
        match requested.iter_mut().find(|(id, _)| *id == line.product_id) {
            Some((_, quantity)) => {
                *quantity = quantity.checked_add(line.quantity).ok_or_else(|| {
                    AppError::Validation(format!(
                        "total quantity for product {} exceeds the supported amount",
                        line.product_id
                    ))
                })?;
            }
            None => requested.push((line.product_id, line.quantity)),
        }
    }

    let mut products = HashMap::with_capacity(requested.len());
    for (product_id, quantity) in requested {
        let product = lock_for_update(Products::find_by_id(product_id), conn)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found("Product", product_id))?;

        if product.initial_stock < quantity {
            tracing::warn!(
                product_id = %product_id,
                requested = quantity,
                available = product.initial_stock,
                "order rejected: insufficient stock"
            );
            return Err(AppError::InsufficientStock {
                product_id,
                requested: quantity,
            });
        }
        products.insert(product_id, product);
    }

    Ok(products)
}

async fn decrement_stock<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    quantity: i32,
) -> AppResult<()> {
    let touched: SimpleExpr = Expr::val(now()).into();
    let result = Products::update_many()
        .col_expr(ProdCol::InitialStock, Expr::col(ProdCol::InitialStock).sub(quantity))
        .col_expr(ProdCol::UpdatedAt, touched)
        .filter(ProdCol::Id.eq(product_id))
        .filter(ProdCol::InitialStock.gte(quantity))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::InsufficientStock {
            product_id,
            requested: quantity,
        });
    }
    Ok(())
}

async fn load_items<C: ConnectionTrait>(
    conn: &C,
    order_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<OrderItem>>> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids.iter().copied()))
        .order_by_asc(OrderItemCol::OrderId)
        .order_by_asc(OrderItemCol::Position)
        .all(conn)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for row in rows {
        grouped.entry(row.order_id).or_default().push(row.into());
    }
    Ok(grouped)
}
