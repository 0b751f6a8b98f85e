use chrono::Utc;
use sea_orm::{
    ConnectionTrait, DbBackend, EntityTrait, QuerySelect, Select,
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, Func, LikeExpr, LockType, SimpleExpr},
};

pub mod auth_service;
pub mod client_service;
pub mod order_service;
pub mod product_service;
pub mod user_service;

pub(crate) fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

pub(crate) fn contains_ci<C>(column: C, term: &str) -> SimpleExpr
where
    C: sea_orm::ColumnTrait,
{
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Expr::expr(Func::lower(Expr::col(column)))
        .like(LikeExpr::new(format!("%{escaped}%")).escape('\\'))
}

pub(crate) fn lock_for_update<E, C>(select: Select<E>, conn: &C) -> Select<E>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    match conn.get_database_backend() {
        DbBackend::Sqlite => select,
        _ => select.lock(LockType::Update),
    }
}
