//! Balance queries

use crate::accounts::DEFAULT_ACCOUNT;
use crate::error::GatewayError;
use crate::state::AppState;
use atlas_types::account::AccountBalances;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct BalancesQuery {
    account_id: Option<String>,
}

/// `GET /balances?account_id=<id>`. Missing accounts are created lazily
/// with seed balances.
pub async fn get_balances(
    State(state): State<AppState>,
    Query(query): Query<BalancesQuery>,
) -> Result<Json<AccountBalances>, GatewayError> {
    let account_id = query
        .account_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| DEFAULT_ACCOUNT.to_string());

    let balances = state.accounts.get_or_create(&account_id).await?;
    Ok(Json(balances))
}
