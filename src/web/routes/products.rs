use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{DigitalProduct, ProductPurchase},
    },
    web::{
        AppState, RequestContext, WebError, WebResult, dto::learning::DownloadResponse,
        error::ErrorResponse,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/{id}/download", get(products_download_handler))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{product_id}/download",
    description = "Download link of a purchased product",
    params(
        ("product_id" = Uuid, Path, description = "ID of the product")
    ),
    responses(
        (status = 200, description = "Download link", body = DownloadResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Product is not purchased", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "products"
)]
async fn products_download_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let product = DigitalProduct::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(DigitalProduct::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(DigitalProduct::get_resource_type()))?;

    if !user.is_admin() {
        let owned = ProductPurchase::user_owns(state.pool(), user, user.user_id(), product.id())
            .await
            .map_err(|e| WebError::resource_fetch_error(ProductPurchase::get_resource_type(), e))?;
        if !owned {
            return Err(WebError::resource_forbidden(DigitalProduct::get_resource_type()));
        }
    }

    Ok((
        StatusCode::OK,
        Json(DownloadResponse {
            url: product.file_url().to_string(),
        }),
    ))
}
