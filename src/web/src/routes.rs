use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use loyalty_core::{
    AccruePointsCommand, AccruePointsCommandHandler, Coupon, FindAccountQueryHandler,
    GetOrCreateAccountCommandHandler, ListCouponsQueryHandler, LoyaltyDto, LoyaltyErrors,
    LoyaltyStore, RedeemCouponCommand, RedeemCouponCommandHandler,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

pub struct AppState<T: LoyaltyStore + Send + Sync> {
    pub loyalty_store: T,
}

pub struct ApiError(LoyaltyErrors);

impl From<LoyaltyErrors> for ApiError {
    fn from(value: LoyaltyErrors) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            LoyaltyErrors::InvalidValues(_) => StatusCode::BAD_REQUEST,
            LoyaltyErrors::AccountNotFound(_) | LoyaltyErrors::CouponNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            LoyaltyErrors::InsufficientPoints { .. } | LoyaltyErrors::AccountExists(_) => {
                StatusCode::CONFLICT
            }
            LoyaltyErrors::PersistenceError(_) => StatusCode::BAD_GATEWAY,
        };

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccrueRequest {
    spend_amount: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    coupon_id: i64,
}

pub fn router<T: LoyaltyStore + Send + Sync + 'static>(state: Arc<AppState<T>>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/accounts/:phone",
            get(find_account::<T>).post(get_or_create_account::<T>),
        )
        .route("/accounts/:phone/accrue", post(accrue_points::<T>))
        .route("/accounts/:phone/redeem", post(redeem_coupon::<T>))
        .route("/coupons", get(list_coupons::<T>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn find_account<T: LoyaltyStore + Send + Sync>(
    State(state): State<Arc<AppState<T>>>,
    Path(phone): Path<String>,
) -> Result<Json<LoyaltyDto>, ApiError> {
    let account = FindAccountQueryHandler::handle(&state.loyalty_store, &phone).await?;

    Ok(Json(account.into()))
}

async fn get_or_create_account<T: LoyaltyStore + Send + Sync>(
    State(state): State<Arc<AppState<T>>>,
    Path(phone): Path<String>,
) -> Result<Json<LoyaltyDto>, ApiError> {
    let account = GetOrCreateAccountCommandHandler::handle(&state.loyalty_store, &phone).await?;

    Ok(Json(account.into()))
}

async fn accrue_points<T: LoyaltyStore + Send + Sync>(
    State(state): State<Arc<AppState<T>>>,
    Path(phone): Path<String>,
    Json(payload): Json<AccrueRequest>,
) -> Result<Json<LoyaltyDto>, ApiError> {
    let command = AccruePointsCommand::new(phone, payload.spend_amount);

    let account = AccruePointsCommandHandler::handle(&state.loyalty_store, command).await?;

    Ok(Json(account.into()))
}

async fn redeem_coupon<T: LoyaltyStore + Send + Sync>(
    State(state): State<Arc<AppState<T>>>,
    Path(phone): Path<String>,
    Json(payload): Json<RedeemRequest>,
) -> Result<Json<LoyaltyDto>, ApiError> {
    let command = RedeemCouponCommand::new(phone, payload.coupon_id);

    let account = RedeemCouponCommandHandler::handle(&state.loyalty_store, command).await?;

    Ok(Json(account.into()))
}

async fn list_coupons<T: LoyaltyStore + Send + Sync>(
    State(state): State<Arc<AppState<T>>>,
) -> Result<Json<Vec<Coupon>>, ApiError> {
    let coupons = ListCouponsQueryHandler::handle(&state.loyalty_store).await?;

    Ok(Json(coupons))
}
