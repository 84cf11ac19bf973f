use axum::extract::{Json, Path, Query, State};

use crate::{
    core::CoreArc,
    errors::AppError,
    extractors::AuthPayload,
    model::{Account, CreateAccountParams, ListAccountsParams, LoginParams, LoginResponse, TransferParams, TransferTxResult}
};

pub async fn login_post(
    State(core): State<CoreArc>,
    Json(params): Json<LoginParams>
) -> Result<Json<LoginResponse>, AppError>
{
    Ok(Json(core.login(&params).await?))
}

pub async fn accounts_post(
    AuthPayload(payload): AuthPayload,
    State(core): State<CoreArc>,
    Json(params): Json<CreateAccountParams>
) -> Result<Json<Account>, AppError>
{
    params.validate()?;
    Ok(Json(core.create_account(&payload.username, &params).await?))
}

pub async fn accounts_get(
    AuthPayload(payload): AuthPayload,
    Query(params): Query<ListAccountsParams>,
    State(core): State<CoreArc>
) -> Result<Json<Vec<Account>>, AppError>
{
    params.validate()?;
    Ok(Json(core.list_accounts(&payload.username, &params).await?))
}

pub async fn accounts_id_get(
    AuthPayload(payload): AuthPayload,
    Path(id): Path<i64>,
    State(core): State<CoreArc>
) -> Result<Json<Account>, AppError>
{
    if id < 1 {
        return Err(AppError::InvalidRequest("id must be at least 1".into()));
    }

    Ok(Json(core.get_account(&payload.username, id).await?))
}

pub async fn transfers_post(
    AuthPayload(payload): AuthPayload,
    State(core): State<CoreArc>,
    Json(params): Json<TransferParams>
) -> Result<Json<TransferTxResult>, AppError>
{
    params.validate()?;
    Ok(Json(core.create_transfer(&payload.username, &params).await?))
}
