use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

const DEFAULT_LIMIT: u64 = 10;
const MAX_LIMIT: u64 = 100;

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl Pagination {
    pub fn new(skip: Option<u64>, limit: Option<u64>) -> Self {
        Self { skip, limit }
    }

    pub fn normalize(&self) -> (u64, u64) {
        let skip = self.skip.unwrap_or(0);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        (skip, limit)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    CreatedAt,
    SalePrice,
    Description,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub available: Option<bool>,
    pub sort_by: Option<ProductSortBy>,
    pub sort_order: Option<SortOrder>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.skip, self.limit)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClientQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl ClientQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.skip, self.limit)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub section: Option<String>,
    pub order_id: Option<Uuid>,
    pub status: Option<String>,
    pub client_id: Option<Uuid>,
    pub sort_order: Option<SortOrder>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.skip, self.limit)
    }
}

pub fn day_start(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(chrono::NaiveTime::MIN).and_utc()
}

pub fn day_end_exclusive(day: NaiveDate) -> DateTime<Utc> {
    let next = day.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX);
    day_start(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        assert_eq!(Pagination::default().normalize(), (0, 10));
        assert_eq!(Pagination::new(Some(20), Some(0)).normalize(), (20, 1));
        assert_eq!(Pagination::new(None, Some(1000)).normalize(), (0, 100));
    }

    #[test]
    fn end_bound_covers_the_whole_day() {
        let day = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
        let last_instant = day.and_hms_nano_opt(23, 59, 59, 999_999_999).unwrap().and_utc();
        assert!(day_start(day) <= last_instant);
        assert!(last_instant < day_end_exclusive(day));
        assert_eq!(
            day_end_exclusive(day),
            NaiveDate::from_ymd_opt(2025, 5, 21).unwrap().and_hms_opt(0, 0, 0).unwrap().and_utc()
        );
    }
}
