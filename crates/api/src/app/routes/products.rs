use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, patch},
};

use stockroom_core::DomainError;
use stockroom_products::{NewProduct, Product, UpdatePrice};

use crate::app::errors::ApiError;
use crate::app::routes::method_not_allowed;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_products).post(create_product).fallback(method_not_allowed),
        )
        .route(
            "/:barcode",
            get(get_product).delete(delete_product).fallback(method_not_allowed),
        )
        .route("/:barcode/price", patch(update_price).fallback(method_not_allowed))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let Json(body) = body?;
    tracing::info!(subject = principal.subject(), barcode = %body.barcode, "create product requested");
    Ok(Json(services.products.create(body).await?))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(services.products.find_all().await?))
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(barcode): Path<String>,
) -> Result<Json<Product>, ApiError> {
    services
        .products
        .find_by_id(&barcode)
        .await?
        .map(Json)
        .ok_or_else(|| product_not_found(&barcode))
}

pub async fn update_price(
    Extension(services): Extension<Arc<AppServices>>,
    Path(barcode): Path<String>,
    body: Result<Json<UpdatePrice>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let Json(body) = body?;
    services
        .products
        .update_price(&barcode, body.price)
        .await?
        .map(Json)
        .ok_or_else(|| product_not_found(&barcode))
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(barcode): Path<String>,
) -> Result<StatusCode, ApiError> {
    services.products.delete_by_id(&barcode).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn product_not_found(barcode: &str) -> ApiError {
    DomainError::not_found(format!("product {barcode}")).into()
}
