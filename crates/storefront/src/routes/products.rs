//! Product catalog handlers.

use axum::extract::{Path, State};
use salon_shop_core::ProductId;
use serde::Deserialize;
use tracing::instrument;

use crate::api::{ApiQuery, ApiResponse, PageParams, Paginated};
use crate::db::{ProductFilter, ProductRepository, ProductSort};
use crate::error::{AppError, Result};
use crate::models::{Product, clean_optional};
use crate::state::AppState;

/// `GET /api/products` query parameters.
///
/// Page fields are spelled out rather than flattened from [`PageParams`]:
/// `serde_urlencoded` cannot deserialize numbers through `#[serde(flatten)]`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub sort: ProductSort,
    #[serde(default)]
    pub featured: bool,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ProductQuery {
    fn filter(&self) -> ProductFilter {
        ProductFilter {
            category: clean_optional(self.category.as_deref()),
            search: clean_optional(self.search.as_deref()),
            featured_only: self.featured,
            sort: self.sort,
            include_inactive: false,
        }
    }

    const fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// `GET /api/products`
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> Result<ApiResponse<Paginated<Product>>> {
    let params = query.page_params();
    let (products, total) = ProductRepository::new(state.pool())
        .list(&query.filter(), params)
        .await?;
    Ok(ApiResponse::ok(Paginated::new(products, total, params)))
}

/// `GET /api/products/categories`
pub async fn categories(State(state): State<AppState>) -> Result<ApiResponse<Vec<String>>> {
    let categories = ProductRepository::new(state.pool()).categories().await?;
    Ok(ApiResponse::ok(categories))
}

/// `GET /api/products/{id}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<ApiResponse<Product>> {
    let product = ProductRepository::new(state.pool())
        .get_active(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    Ok(ApiResponse::ok(product))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::extract::Query;
    use axum::http::Uri;

    use super::*;

    fn parse(uri: &str) -> ProductQuery {
        let uri: Uri = uri.parse().unwrap();
        Query::<ProductQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_query_to_filter() {
        let query = parse("/api/products?category=hair&search=%20%20&sort=price_desc&page=2&per_page=5");
        let filter = query.filter();
        assert_eq!(filter.category.as_deref(), Some("hair"));
        assert_eq!(filter.search, None);
        assert_eq!(filter.sort, ProductSort::PriceDesc);
        assert!(!filter.include_inactive);
        assert_eq!(query.page_params().offset(), 5);
    }

    #[test]
    fn test_query_defaults() {
        let query = parse("/api/products");
        assert_eq!(query.sort, ProductSort::Newest);
        assert!(!query.featured);
        assert_eq!(query.page_params().per_page(), crate::api::DEFAULT_PER_PAGE);
    }
}
