//! `/get_balance`.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use commchain_core::{balance, balance_unhashed, Balance, Error};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub user_unhashed: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: i64,
}

pub async fn get_balance(
    State(state): State<AppState>,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let result = match (query.user, query.user_unhashed) {
        (Some(user), None) => balance(state.blocklog.tx_log(), &user)?,
        (None, Some(user_unhashed)) => balance_unhashed(state.blocklog.tx_log(), &user_unhashed)?,
        _ => {
            return Err(ApiError::BadRequest(
                "exactly one of user or user_unhashed is required".to_string(),
            ))
        }
    };

    match result {
        Balance::Found(amount) => Ok(Json(BalanceResponse { balance: amount })),
        Balance::NotFound => Err(ApiError::Core(Error::NotFound(
            "user not found in the transactions file".to_string(),
        ))),
    }
}
