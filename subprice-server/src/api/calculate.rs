//! Subscription price calculation
//!
//! POST /calculate with `{basePrice, pricePerCreditLine, pricePerCreditScorePoint}`

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::info;

use crate::pricing::{calculate, PricedRow, PricingCoefficients};
use crate::{ApiError, ApiResult, AppState};

/// POST /calculate
///
/// Returns every stored row with its `subscriptionPrice`.
pub async fn calculate_prices(
    State(state): State<AppState>,
    body: Result<Json<PricingCoefficients>, JsonRejection>,
) -> ApiResult<Json<Vec<PricedRow>>> {
    let Json(coefficients) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let priced = calculate(&state.store, coefficients).await?;

    info!(
        "Priced {} rows (base={}, per_line={}, per_point={})",
        priced.len(),
        coefficients.base_price,
        coefficients.price_per_credit_line,
        coefficients.price_per_credit_score_point
    );

    Ok(Json(priced))
}
