use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        product_images::{ActiveModel as ImageActive, Column as ImageCol, Entity as ProductImages},
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::now,
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (skip, limit) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(category) = query.category.as_ref().filter(|c| !c.is_empty()) {
        condition = condition.add(Column::Category.eq(category.clone()));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::SalePrice.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::SalePrice.lte(max_price));
    }

    match query.available {
        Some(true) => condition = condition.add(Column::InitialStock.gt(0)),
        Some(false) => condition = condition.add(Column::InitialStock.lte(0)),
        None => {}
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::SalePrice => Column::SalePrice,
        ProductSortBy::Description => Column::Description,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };
    finder = finder.order_by_asc(Column::Id);

    let total = finder.clone().count(&state.orm).await?;

    let models = finder.offset(skip).limit(limit).all(&state.orm).await?;
    let ids: Vec<Uuid> = models.iter().map(|p| p.id).collect();
    let mut images = load_images(&state.orm, &ids).await?;

    let items = models
        .into_iter()
        .map(|model| {
            let urls = images.remove(&model.id).unwrap_or_default();
            Product::from_entity(model, urls)
        })
        .collect();

    let meta = Meta::new(skip, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = find_product(&state.orm, id).await?;
    let product = with_images(&state.orm, product).await?;
    Ok(ApiResponse::success("Product", product, Some(Meta::empty())))
}

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    payload.validate()?;
    ensure_barcode_free(&state.orm, &payload.barcode, None).await?;

    let txn = state.orm.begin().await?;
    let created_at = now();
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        description: Set(payload.description),
        sale_price: Set(payload.sale_price),
        barcode: Set(payload.barcode),
        section: Set(payload.section),
        category: Set(payload.category),
        initial_stock: Set(payload.initial_stock),
        expiration_date: Set(payload.expiration_date),
        created_at: Set(created_at),
        updated_at: Set(created_at),
    }
    .insert(&txn)
    .await?;

    // Images are owned records and can only be written once the product row exists.
    for (position, url) in payload.images.iter().enumerate() {
        let position = i32::try_from(position)
            .map_err(|_| AppError::Validation("too many images".into()))?;
        ImageActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product.id),
            url: Set(url.clone()),
            position: Set(position),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    tracing::info!(product_id = %product.id, barcode = %product.barcode, "product created");

    Ok(ApiResponse::success(
        "Product created",
        Product::from_entity(product, payload.images),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    payload.validate()?;
    let existing = find_product(&state.orm, id).await?;

    if let Some(barcode) = payload.barcode.as_ref().filter(|b| **b != existing.barcode) {
        ensure_barcode_free(&state.orm, barcode, Some(id)).await?;
    }

    let mut active: ActiveModel = existing.into();
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(sale_price) = payload.sale_price {
        active.sale_price = Set(sale_price);
    }
    if let Some(barcode) = payload.barcode {
        active.barcode = Set(barcode);
    }
    if let Some(section) = payload.section {
        active.section = Set(section);
    }
    if let Some(category) = payload.category {
        active.category = Set(Some(category));
    }
    if let Some(stock) = payload.initial_stock {
        active.initial_stock = Set(stock);
    }
    if let Some(expiration_date) = payload.expiration_date {
        active.expiration_date = Set(Some(expiration_date));
    }
    active.updated_at = Set(now());

    let product = active.update(&state.orm).await?;
    let product = with_images(&state.orm, product).await?;

    Ok(ApiResponse::success("Updated", product, Some(Meta::empty())))
}

pub async fn delete_product(state: &AppState, id: Uuid) -> AppResult<()> {
    let txn = state.orm.begin().await?;
    let product = find_product(&txn, id).await?;

    let references = OrderItems::find()
        .filter(OrderItemCol::ProductId.eq(product.id))
        .count(&txn)
        .await?;
    if references > 0 {
        return Err(AppError::Conflict(format!(
            "Product {id} is referenced by {references} order item(s)"
        )));
    }

    ProductImages::delete_many()
        .filter(ImageCol::ProductId.eq(product.id))
        .exec(&txn)
        .await?;
    Products::delete_by_id(product.id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!(product_id = %id, "product deleted");
    Ok(())
}

async fn find_product<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<ProductModel> {
    Products::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("Product", id))
}

async fn ensure_barcode_free<C: ConnectionTrait>(
    conn: &C,
    barcode: &str,
    exclude: Option<Uuid>,
) -> AppResult<()> {
    let mut finder = Products::find().filter(Column::Barcode.eq(barcode));
    if let Some(id) = exclude {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.one(conn).await?.is_some() {
        return Err(AppError::Conflict("Barcode already in use".into()));
    }
    Ok(())
}

async fn with_images<C: ConnectionTrait>(conn: &C, model: ProductModel) -> AppResult<Product> {
    let urls = load_images(conn, &[model.id])
        .await?
        .remove(&model.id)
        .unwrap_or_default();
    Ok(Product::from_entity(model, urls))
}

async fn load_images<C: ConnectionTrait>(
    conn: &C,
    product_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<String>>> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = ProductImages::find()
        .filter(ImageCol::ProductId.is_in(product_ids.iter().copied()))
        .order_by_asc(ImageCol::ProductId)
        .order_by_asc(ImageCol::Position)
        .all(conn)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<String>> = HashMap::new();
    for row in rows {
        grouped.entry(row.product_id).or_default().push(row.url);
    }
    Ok(grouped)
}
