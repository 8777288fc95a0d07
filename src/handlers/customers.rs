//! Customer service: registration, login, profiles, and wallet operations.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::extractors::{AuthenticatedCustomer, JsonBody};
use crate::model::{Customer, Gender, MaritalStatus};
use crate::money::Money;
use crate::state::AppState;
use crate::stores::{NewCustomer, UpdateCustomer};

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[allow(missing_docs)]
    #[serde(rename = "FullName")]
    pub full_name: String,
    #[allow(missing_docs)]
    #[serde(rename = "Username")]
    pub username: String,
    #[allow(missing_docs)]
    #[serde(rename = "Password")]
    pub password: String,
    #[allow(missing_docs)]
    #[serde(rename = "Age")]
    pub age: i64,
    #[allow(missing_docs)]
    #[serde(rename = "Address")]
    pub address: String,
    #[allow(missing_docs)]
    #[serde(rename = "Gender")]
    pub gender: Gender,
    #[allow(missing_docs)]
    #[serde(rename = "MaritalStatus")]
    pub marital_status: MaritalStatus,
    /// Request the (unique) admin flag. Defaults to false.
    #[serde(rename = "IsAdmin", default)]
    pub is_admin: bool,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[allow(missing_docs)]
    #[serde(rename = "Username")]
    pub username: String,
    #[allow(missing_docs)]
    #[serde(rename = "Password")]
    pub password: String,
}

/// Partial profile update body. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCustomerRequest {
    #[allow(missing_docs)]
    #[serde(rename = "FullName")]
    pub full_name: Option<String>,
    #[allow(missing_docs)]
    #[serde(rename = "Password")]
    pub password: Option<String>,
    #[allow(missing_docs)]
    #[serde(rename = "Age")]
    pub age: Option<i64>,
    #[allow(missing_docs)]
    #[serde(rename = "Address")]
    pub address: Option<String>,
    #[allow(missing_docs)]
    #[serde(rename = "Gender")]
    pub gender: Option<Gender>,
    #[allow(missing_docs)]
    #[serde(rename = "MaritalStatus")]
    pub marital_status: Option<MaritalStatus>,
}

/// Wallet charge/deduct request body.
#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    #[allow(missing_docs)]
    #[serde(rename = "Amount")]
    pub amount: Money,
}

/// A customer profile as exposed on the wire. The credential hash never
/// leaves the store layer.
#[derive(Debug, Serialize)]
pub struct CustomerProfile {
    #[allow(missing_docs)]
    #[serde(rename = "CustomerID")]
    pub customer_id: i64,
    #[allow(missing_docs)]
    #[serde(rename = "FullName")]
    pub full_name: String,
    #[allow(missing_docs)]
    #[serde(rename = "Username")]
    pub username: String,
    #[allow(missing_docs)]
    #[serde(rename = "Age")]
    pub age: i64,
    #[allow(missing_docs)]
    #[serde(rename = "Address")]
    pub address: String,
    #[allow(missing_docs)]
    #[serde(rename = "Gender")]
    pub gender: Gender,
    #[allow(missing_docs)]
    #[serde(rename = "MaritalStatus")]
    pub marital_status: MaritalStatus,
    /// Wallet balance in dollars.
    #[serde(rename = "WalletBalance")]
    pub wallet_balance: Money,
    #[allow(missing_docs)]
    #[serde(rename = "IsAdmin")]
    pub is_admin: bool,
}

impl From<Customer> for CustomerProfile {
    fn from(customer: Customer) -> Self {
        Self {
            customer_id: customer.customer_id,
            full_name: customer.full_name,
            username: customer.username,
            age: customer.age,
            address: customer.address,
            gender: customer.gender,
            marital_status: customer.marital_status,
            wallet_balance: customer.wallet_balance,
            is_admin: customer.is_admin,
        }
    }
}

/// Generic success body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    #[allow(missing_docs)]
    pub message: String,
}

/// Login success body.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    #[allow(missing_docs)]
    pub token: String,
}

/// POST `/customers/register`.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let customer = state
        .accounts
        .create(NewCustomer {
            full_name: body.full_name,
            username: body.username,
            password: body.password,
            age: body.age,
            address: body.address,
            gender: body.gender,
            marital_status: body.marital_status,
            is_admin: body.is_admin,
        })
        .await?;

    tracing::info!(username = %customer.username, "customer registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Customer registered successfully.".to_string(),
        }),
    ))
}

/// POST `/customers/login`.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let customer = state.accounts.authenticate(&body.username, &body.password).await?;
    let token = state.tokens.issue(&customer.username)?;
    Ok(Json(TokenResponse { token }))
}

/// GET `/customers`.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<CustomerProfile>>> {
    let customers = state.accounts.list().await?;
    Ok(Json(customers.into_iter().map(CustomerProfile::from).collect()))
}

/// GET `/customers/{username}`.
pub async fn get(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<CustomerProfile>> {
    let customer = state.accounts.get_by_username(&username).await?;
    Ok(Json(customer.into()))
}

/// PUT `/customers/update/{username}`. Callers may only update themselves.
pub async fn update(
    State(state): State<AppState>,
    Path(username): Path<String>,
    caller: AuthenticatedCustomer,
    JsonBody(body): JsonBody<UpdateCustomerRequest>,
) -> Result<Json<MessageResponse>> {
    require_self(&caller, &username)?;

    state
        .accounts
        .update_fields(
            &username,
            UpdateCustomer {
                full_name: body.full_name,
                password: body.password,
                age: body.age,
                address: body.address,
                gender: body.gender,
                marital_status: body.marital_status,
            },
        )
        .await?;

    Ok(Json(MessageResponse {
        message: "Customer updated successfully.".to_string(),
    }))
}

/// DELETE `/customers/delete/{username}`. Self-service, or the admin.
pub async fn delete(
    State(state): State<AppState>,
    Path(username): Path<String>,
    caller: AuthenticatedCustomer,
) -> Result<Json<MessageResponse>> {
    if caller.username != username {
        let actor = state.accounts.get_by_username(&caller.username).await?;
        if !actor.is_admin {
            return Err(StoreError::Forbidden(
                "You can only delete your own account.".to_string(),
            ));
        }
    }

    state.accounts.delete(&username).await?;
    Ok(Json(MessageResponse {
        message: "Customer deleted successfully.".to_string(),
    }))
}

/// POST `/customers/charge/{username}`. Callers may only charge their own
/// wallet.
pub async fn charge(
    State(state): State<AppState>,
    Path(username): Path<String>,
    caller: AuthenticatedCustomer,
    JsonBody(body): JsonBody<AmountRequest>,
) -> Result<Json<MessageResponse>> {
    require_self(&caller, &username)?;
    state.accounts.charge_wallet(&username, body.amount).await?;
    Ok(Json(MessageResponse {
        message: format!("Wallet charged with ${}.", body.amount),
    }))
}

/// POST `/customers/deduct/{username}`. Callers may only deduct from their
/// own wallet.
pub async fn deduct(
    State(state): State<AppState>,
    Path(username): Path<String>,
    caller: AuthenticatedCustomer,
    JsonBody(body): JsonBody<AmountRequest>,
) -> Result<Json<MessageResponse>> {
    require_self(&caller, &username)?;
    state.accounts.deduct_wallet(&username, body.amount).await?;
    Ok(Json(MessageResponse {
        message: format!("${} deducted from wallet.", body.amount),
    }))
}

fn require_self(caller: &AuthenticatedCustomer, username: &str) -> Result<()> {
    if caller.username == username {
        Ok(())
    } else {
        Err(StoreError::Forbidden("Unauthorized access.".to_string()))
    }
}
