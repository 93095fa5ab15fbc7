//! Product catalog handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::{ValidatedJson, ValidatedQuery};
use crate::api::AppState;
use crate::domain::{Product, ProductId};
use crate::errors::{AppResult, OptionExt};
use crate::services::use_cases::{
    CreateProductInput, DeleteProductInput, ListProductsFilters, UpdateProductInput,
};
use crate::types::{Created, NoContent, Page, PaginationParams};

/// Decimal amount sent either as a JSON string or a JSON number.
///
/// Numbers are read through their textual form so no binary float
/// rounding happens before the amount is quantized.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DecimalInput {
    Text(String),
    Number(serde_json::Number),
}

impl DecimalInput {
    fn into_text(self) -> String {
        match self {
            DecimalInput::Text(text) => text,
            DecimalInput::Number(number) => number.to_string(),
        }
    }
}

/// Product as returned to clients
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    #[schema(example = 1)]
    pub id: Option<i32>,
    #[schema(example = "Mechanical Keyboard")]
    pub name: String,
    /// Two-decimal string
    #[schema(example = "89.90")]
    pub price: String,
    #[schema(example = 25)]
    pub stock: i64,
    #[schema(example = "Peripherals")]
    pub category: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id().map(|id| id.0),
            name: product.name().to_string(),
            price: product.price().to_string(),
            stock: product.stock().units(),
            category: product.category().to_string(),
            description: product.description().map(str::to_string),
            is_active: product.is_active(),
            created_at: product.created_at(),
            updated_at: product.updated_at(),
        }
    }
}

/// One page of products
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductListResponse {
    pub items: Vec<ProductResponse>,
    /// Matches across all pages
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

impl From<Page<Product>> for ProductListResponse {
    fn from(page: Page<Product>) -> Self {
        let page = page.map(ProductResponse::from);
        Self {
            items: page.items,
            total: page.total,
            limit: page.limit,
            offset: page.offset,
        }
    }
}

/// Identifier of a newly created product
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedProductResponse {
    #[schema(example = 1)]
    pub id: i32,
}

/// Product creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    #[schema(example = "Mechanical Keyboard")]
    pub name: String,
    #[schema(value_type = String, example = "89.90")]
    pub price: DecimalInput,
    /// Whole units; fractional or textual values are rejected
    #[schema(example = 25)]
    pub stock: i64,
    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    #[schema(example = "Peripherals")]
    pub category: String,
    pub description: Option<String>,
}

impl From<CreateProductRequest> for CreateProductInput {
    fn from(request: CreateProductRequest) -> Self {
        Self {
            name: request.name,
            price: request.price.into_text(),
            stock: request.stock,
            category: request.category,
            description: request.description,
        }
    }
}

/// Partial product update; omitted fields are left unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price: Option<DecimalInput>,
    pub stock: Option<i64>,
    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl From<UpdateProductRequest> for UpdateProductInput {
    fn from(request: UpdateProductRequest) -> Self {
        Self {
            name: request.name,
            price: request.price.map(DecimalInput::into_text),
            stock: request.stock,
            category: request.category,
            description: request.description,
            is_active: request.is_active,
        }
    }
}

/// Listing query parameters
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListProductsQuery {
    /// Exact category match
    pub category: Option<String>,
    /// Inclusive lower price bound
    pub min_price: Option<String>,
    /// Inclusive upper price bound
    pub max_price: Option<String>,
    /// Case-insensitive name substring
    pub search: Option<String>,
    /// Also list deactivated products
    pub include_inactive: Option<bool>,
    /// Page size (1-100, default 20)
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: Option<u64>,
    /// Rows to skip (default 0)
    pub offset: Option<u64>,
}

impl ListProductsQuery {
    fn into_parts(self) -> (ListProductsFilters, PaginationParams) {
        (
            ListProductsFilters {
                category: self.category,
                min_price: self.min_price,
                max_price: self.max_price,
                search: self.search,
                include_inactive: self.include_inactive.unwrap_or(false),
            },
            PaginationParams::new(self.limit, self.offset),
        )
    }
}

/// Delete query parameters
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteProductQuery {
    /// Remove the row instead of deactivating it
    #[serde(default)]
    pub hard: bool,
}

/// Public read routes
pub fn product_read_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/:id", get(get_product))
}

/// Mutating routes; callers layer authentication on top
pub fn product_write_routes() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create_product))
        .route(
            "/:id",
            axum::routing::put(update_product).delete(delete_product),
        )
}

/// List products
#[utoipa::path(
    get,
    path = "/products",
    tag = "Products",
    params(ListProductsQuery),
    responses(
        (status = 200, description = "One page of products", body = ProductListResponse),
        (status = 400, description = "Invalid filter or pagination value")
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ListProductsQuery>,
) -> AppResult<Json<ProductListResponse>> {
    let (filters, page) = query.into_parts();
    let page = state.product_service.list(filters, page).await?;

    Ok(Json(ProductListResponse::from(page)))
}

/// Get product by ID
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "Products",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ProductResponse>> {
    let product = state
        .product_service
        .get(ProductId(id))
        .await?
        .ok_or_not_found()?;

    Ok(Json(ProductResponse::from(product)))
}

/// Create a product
#[utoipa::path(
    post,
    path = "/products",
    tag = "Products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = CreatedProductResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> AppResult<Created<CreatedProductResponse>> {
    let id = state.product_service.create(payload.into()).await?;

    Ok(Created(CreatedProductResponse { id: id.0 }))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "Products",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateProductRequest>,
) -> AppResult<Json<ProductResponse>> {
    let product = state
        .product_service
        .update(ProductId(id), payload.into())
        .await?;

    Ok(Json(ProductResponse::from(product)))
}

/// Delete a product (soft by default)
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "Products",
    params(
        ("id" = i32, Path, description = "Product ID"),
        DeleteProductQuery
    ),
    responses(
        (status = 204, description = "Product deleted, or already absent"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedQuery(query): ValidatedQuery<DeleteProductQuery>,
) -> AppResult<NoContent> {
    state
        .product_service
        .delete(ProductId(id), DeleteProductInput { soft: !query.hard })
        .await?;

    Ok(NoContent)
}
