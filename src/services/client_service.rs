use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::clients::{ClientList, CreateClientRequest, UpdateClientRequest},
    entity::{
        clients::{ActiveModel, Column, Entity as Clients, Model as ClientModel},
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    models::Client,
    response::{ApiResponse, Meta},
    routes::params::ClientQuery,
    services::{contains_ci, now},
    state::AppState,
};

pub async fn list_clients(
    state: &AppState,
    query: ClientQuery,
) -> AppResult<ApiResponse<ClientList>> {
    let (skip, limit) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(name) = query.name.as_deref().filter(|n| !n.is_empty()) {
        condition = condition.add(contains_ci(Column::Name, name));
    }
    if let Some(email) = query.email.as_deref().filter(|e| !e.is_empty()) {
        condition = condition.add(contains_ci(Column::Email, email));
    }

    let finder = Clients::find()
        .filter(condition)
        .order_by_asc(Column::Name)
        .order_by_asc(Column::Id);
    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .offset(skip)
        .limit(limit)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Client::from)
        .collect();

    Ok(ApiResponse::success(
        "Clients",
        ClientList { items },
        Some(Meta::new(skip, limit, total)),
    ))
}

pub async fn get_client(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Client>> {
    let client = find_client(&state.orm, id).await?;
    Ok(ApiResponse::success("Client", client.into(), Some(Meta::empty())))
}

pub async fn create_client(
    state: &AppState,
    payload: CreateClientRequest,
) -> AppResult<ApiResponse<Client>> {
    payload.validate()?;
    ensure_unique(&state.orm, Some(&payload.email), Some(&payload.cpf), None).await?;

    let created_at = now();
    let client = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        email: Set(payload.email),
        cpf: Set(payload.cpf),
        created_at: Set(created_at),
        updated_at: Set(created_at),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(client_id = %client.id, "client created");
    Ok(ApiResponse::success(
        "Client created",
        client.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_client(
    state: &AppState,
    id: Uuid,
    payload: UpdateClientRequest,
) -> AppResult<ApiResponse<Client>> {
    payload.validate()?;
    let existing = find_client(&state.orm, id).await?;

    ensure_unique(
        &state.orm,
        payload.email.as_deref(),
        payload.cpf.as_deref(),
        Some(existing.id),
    )
    .await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(email) = payload.email {
        active.email = Set(email);
    }
    if let Some(cpf) = payload.cpf {
        active.cpf = Set(cpf);
    }
    active.updated_at = Set(now());
    let client = active.update(&state.orm).await?;

    Ok(ApiResponse::success("Updated", client.into(), Some(Meta::empty())))
}

pub async fn delete_client(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Client>> {
    let client = find_client(&state.orm, id).await?;

    let orders = Orders::find()
        .filter(OrderCol::ClientId.eq(client.id))
        .count(&state.orm)
        .await?;
    if orders > 0 {
        return Err(AppError::Conflict(format!(
            "Client {id} still has {orders} order(s)"
        )));
    }

    Clients::delete_by_id(client.id).exec(&state.orm).await?;

    tracing::info!(client_id = %id, "client deleted");
    Ok(ApiResponse::success("Deleted", client.into(), Some(Meta::empty())))
}

async fn find_client<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<ClientModel> {
    Clients::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("Client", id))
}

async fn ensure_unique<C: ConnectionTrait>(
    conn: &C,
    email: Option<&str>,
    cpf: Option<&str>,
    exclude: Option<Uuid>,
) -> AppResult<()> {
    let others = |column: Column, value: &str| {
        let mut finder = Clients::find().filter(column.eq(value));
        if let Some(id) = exclude {
            finder = finder.filter(Column::Id.ne(id));
        }
        finder
    };

    if let Some(email) = email
        && others(Column::Email, email).one(conn).await?.is_some()
    {
        return Err(AppError::Conflict("Email already registered".into()));
    }
    if let Some(cpf) = cpf
        && others(Column::Cpf, cpf).one(conn).await?.is_some()
    {
        return Err(AppError::Conflict("CPF already registered".into()));
    }
    Ok(())
}
