//! Registration, login and profile handlers

use axum::{extract::State, http::StatusCode, Extension, Json};

use domain_invoicing::Registration;

use crate::auth::{create_token, hash_password, verify_password, Claims, TOKEN_TYPE};
use crate::dto::users::*;
use crate::extract::ValidatedJson;
use crate::{error::ApiError, AppState};

/// Creates an account with a hashed password and an initial profile
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let password_hash = hash_password(&request.password)?;

    let user = state
        .users
        .register(Registration {
            email: request.email,
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
            company_name: request.company_name,
            address: request.address,
            tax_id: request.tax_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: *user.id.as_uuid(),
            message: "User successfully registered.".to_string(),
        }),
    ))
}

/// Exchanges credentials for an access token
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .users
        .authenticate(&request.email, |user| {
            verify_password(&request.password, &user.password_hash)
        })
        .await?;

    let access_token = create_token(
        user.id,
        &state.config.jwt_secret,
        state.config.jwt_expiration_secs,
    )?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
    }))
}

/// Updates the authenticated user's profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>, ApiError> {
    let user_id = claims.user_id()?;
    let profile = state.users.update_profile(user_id, request.into()).await?;

    Ok(Json(UpdateProfileResponse {
        success: true,
        message: "User profile updated successfully.".to_string(),
        updated_profile: profile.into(),
    }))
}
