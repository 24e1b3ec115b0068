use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    model::{
        CrudRepository, Page, ResourceTyped,
        entity::{DigitalProduct, DigitalProductCreate},
    },
    web::{
        AppState, RequestContext, WebError, WebResult, dto::admin::AdminProduct,
        error::ErrorResponse, routes::PaginationQuery,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(admin_products_page_handler).post(admin_product_create_handler),
        )
        .route(
            "/products/{id}",
            get(admin_product_get_handler)
                .put(admin_product_update_handler)
                .delete(admin_product_delete_handler),
        )
}

async fn find_product(state: &AppState, ctx: &RequestContext, id: Uuid) -> WebResult<DigitalProduct> {
    DigitalProduct::find_by_id(state.pool(), ctx.admin()?, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(DigitalProduct::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(DigitalProduct::get_resource_type()))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/products",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Returns requested page, drafts included", body = Page<AdminProduct>),
        (status = 403, description = "You're not an admin to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_products_page_handler(
    ctx: RequestContext,
    Query(page): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin()?;
    let (limit, offset) = page.bounds();

    let products = DigitalProduct::page(state.pool(), user, limit, offset)
        .await
        .map_err(|e| WebError::resource_fetch_error(DigitalProduct::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(products.map(AdminProduct::from))))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/products",
    request_body = DigitalProductCreate,
    responses(
        (status = 201, description = "Product created", body = AdminProduct),
        (status = 400, description = "Invalid product", body = ErrorResponse),
        (status = 409, description = "Slug is taken", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_product_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<DigitalProductCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin()?;
    payload.validate()?;

    let created = DigitalProduct::create(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(DigitalProduct::get_resource_type(), e))?;

    tracing::info!(product_id = %created.id(), slug = created.slug(), "product created");
    Ok((StatusCode::CREATED, Json(AdminProduct::from(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = AdminProduct),
        (status = 404, description = "Product not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_product_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let product = find_product(&state, &ctx, id).await?;
    Ok((StatusCode::OK, Json(AdminProduct::from(product))))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = DigitalProductCreate,
    responses(
        (status = 200, description = "Product updated", body = AdminProduct),
        (status = 400, description = "Invalid product", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 409, description = "Slug is taken", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_product_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DigitalProductCreate>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;
    let product = find_product(&state, &ctx, id).await?;

    let updated = product
        .update(state.pool(), ctx.admin()?, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(DigitalProduct::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(AdminProduct::from(updated))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Product not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_product_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let product = find_product(&state, &ctx, id).await?;

    product
        .delete(state.pool(), ctx.admin()?)
        .await
        .map_err(|e| WebError::resource_fetch_error(DigitalProduct::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}
