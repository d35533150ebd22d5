use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    audit,
    crypto::{hash_password, verify_password},
    dto::auth::{
        Claims, ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
        ResetPasswordRequest,
    },
    entity::{RolePermissions, Roles, Users, role_permissions, roles, users},
    error::{AppError, AppResult},
    models::User,
    permissions::ROLE_CUSTOMER,
    response::{ApiResponse, Meta},
    seed::USER_STATUS_ACTIVE,
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 8;
const TOKEN_TTL_HOURS: i64 = 24;
const RESET_TOKEN_TTL_HOURS: i64 = 1;

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let RegisterRequest {
        username,
        password,
        first_name,
        last_name,
        email,
        phone,
    } = payload;
    let username = username.trim().to_string();
    let email = email.trim().to_lowercase();

    if username.is_empty() || email.is_empty() {
        return Err(AppError::BadRequest("username and email are required".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let taken = Users::find()
        .filter(users::Column::Username.eq(username.as_str()))
        .one(&state.orm)
        .await?;
    if taken.is_some() {
        return Err(AppError::BadRequest("Username is already taken".into()));
    }
    if find_by_email(state, &email).await?.is_some() {
        return Err(AppError::BadRequest("Email is already taken".into()));
    }

    let role = Roles::find()
        .filter(roles::Column::Name.eq(ROLE_CUSTOMER))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("{ROLE_CUSTOMER} is not seeded")))?;

    let password_hash =
        hash_password(&password).map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;
    let verification_token = new_token();

    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username),
        password_hash: Set(password_hash),
        role_id: Set(role.id),
        first_name: Set(first_name),
        last_name: Set(last_name),
        email: Set(Some(email.clone())),
        phone: Set(phone),
        status: Set(USER_STATUS_ACTIVE.to_string()),
        email_verified: Set(false),
        verification_token: Set(Some(verification_token.clone())),
        reset_token: Set(None),
        reset_token_expires_at: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    let verify_url = format!(
        "{}/api/auth/verify?token={verification_token}",
        state.auth.public_base_url
    );
    state.notifier.send_verification(&email, &verify_url);

    audit::record(
        &state.orm,
        user.id,
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "User created",
        User::from_entity(user, role.name),
        None,
    ))
}

pub async fn verify_email(
    state: &AppState,
    token: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let user = Users::find()
        .filter(users::Column::VerificationToken.eq(token))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid verification token".into()))?;

    let user_id = user.id;
    let mut active: users::ActiveModel = user.into();
    active.email_verified = Set(true);
    active.verification_token = Set(None);
    active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user_id,
        "user_verify_email",
        "users",
        serde_json::json!({ "user_id": user_id }),
    )
    .await;

    Ok(ApiResponse::ack("Email verified"))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { username, password } = payload;
    let user = Users::find()
        .filter(users::Column::Username.eq(username.trim()))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid username or password".into()))?;

    if !verify_password(&password, &user.password_hash) {
        return Err(AppError::BadRequest("Invalid username or password".into()));
    }
    if user.status != USER_STATUS_ACTIVE {
        return Err(AppError::Unauthorized("Account is not active".into()));
    }
    // Accounts created without an email (the bootstrap admin) have nothing to verify.
    if user.email.is_some() && !user.email_verified {
        return Err(AppError::Unauthorized("Email address is not verified".into()));
    }

    let role = Roles::find_by_id(user.role_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("user {} has no role", user.id)))?;

    let permissions = RolePermissions::find()
        .filter(role_permissions::Column::RoleId.eq(role.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|row| row.permission)
        .collect();

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: role.name,
        permissions,
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    audit::record(
        &state.orm,
        user.id,
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token: format!("Bearer {token}"),
        },
        Some(Meta::empty()),
    ))
}

/// Always acknowledges, so the response does not reveal which emails exist.
pub async fn forgot_password(
    state: &AppState,
    payload: ForgotPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let email = payload.email.trim().to_lowercase();
    if let Some(user) = find_by_email(state, &email).await? {
        let token = new_token();
        let expires_at = Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS);

        let user_id = user.id;
        let mut active: users::ActiveModel = user.into();
        active.reset_token = Set(Some(token.clone()));
        active.reset_token_expires_at = Set(Some(expires_at.into()));
        active.update(&state.orm).await?;

        let reset_url = format!(
            "{}/reset-password?token={token}",
            state.auth.public_base_url
        );
        state.notifier.send_password_reset(&email, &reset_url);

        audit::record(
            &state.orm,
            user_id,
            "password_reset_requested",
            "users",
            serde_json::json!({ "user_id": user_id }),
        )
        .await;
    } else {
        tracing::debug!("password reset requested for unknown email");
    }

    Ok(ApiResponse::ack(
        "If the email is registered, a reset link has been sent",
    ))
}

pub async fn reset_password(
    state: &AppState,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let user = Users::find()
        .filter(users::Column::ResetToken.eq(payload.token.as_str()))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid or expired reset token".into()))?;

    let expired = user
        .reset_token_expires_at
        .as_ref()
        .is_none_or(|expires_at| expires_at.with_timezone(&Utc) < Utc::now());
    if expired {
        return Err(AppError::BadRequest("Invalid or expired reset token".into()));
    }

    let password_hash = hash_password(&payload.password)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    let user_id = user.id;
    let mut active: users::ActiveModel = user.into();
    active.password_hash = Set(password_hash);
    active.reset_token = Set(None);
    active.reset_token_expires_at = Set(None);
    active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user_id,
        "password_reset",
        "users",
        serde_json::json!({ "user_id": user_id }),
    )
    .await;

    Ok(ApiResponse::ack("Password updated"))
}

async fn find_by_email(state: &AppState, email: &str) -> AppResult<Option<users::Model>> {
    Ok(Users::find()
        .filter(Expr::expr(Func::lower(Expr::col(users::Column::Email))).eq(email.to_lowercase()))
        .one(&state.orm)
        .await?)
}

fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}
