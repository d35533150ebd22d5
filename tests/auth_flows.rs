mod common;

use jsonwebtoken::{DecodingKey, Validation, decode};
use siopao_storefront::{
    dto::auth::{
        Claims, ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
    },
    error::AppError,
    notify::Notification,
    permissions::{Permission, ROLE_CUSTOMER, ROLE_OWNER},
    seed,
    services::auth_service,
};

use common::{admin_seed, next_mail, test_app};

fn token_from(url: &str) -> String {
    url.split("token=").nth(1).expect("token in link").to_string()
}

fn login(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn register_sends_verification_and_verify_consumes_token() {
    let mut app = test_app().await;
    seed::run(&app.state.orm, &admin_seed()).await.unwrap();

    let user = auth_service::register_user(
        &app.state,
        RegisterRequest {
            username: "juan".to_string(),
            password: "correct-horse".to_string(),
            first_name: "Juan".to_string(),
            last_name: "Dela Cruz".to_string(),
            email: "Juan@Example.com".to_string(),
            phone: None,
        },
    )
    .await
    .unwrap()
    .data
    .unwrap();
    assert_eq!(user.role, ROLE_CUSTOMER);
    assert!(!user.email_verified);

    let Notification::Verification { to, verify_url } = next_mail(&mut app.mail).await else {
        panic!("expected a verification email");
    };
    assert_eq!(to, "juan@example.com");
    assert!(verify_url.starts_with("http://localhost:3000/api/auth/verify?token="));

    let err = auth_service::login_user(&app.state, login("juan", "correct-horse"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    let token = token_from(&verify_url);
    auth_service::verify_email(&app.state, &token).await.unwrap();
    let err = auth_service::verify_email(&app.state, &token)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    assert!(
        auth_service::login_user(&app.state, login("juan", "correct-horse"))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let app = test_app().await;
    seed::run(&app.state.orm, &admin_seed()).await.unwrap();

    let err = auth_service::register_user(
        &app.state,
        RegisterRequest {
            username: seed::DEMO_CUSTOMER_USERNAME.to_string(),
            password: "correct-horse".to_string(),
            first_name: "Other".to_string(),
            last_name: "Person".to_string(),
            email: "other@example.com".to_string(),
            phone: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn admin_token_carries_every_owner_permission() {
    let app = test_app().await;
    seed::run(&app.state.orm, &admin_seed()).await.unwrap();

    let resp = auth_service::login_user(&app.state, login("admin", "admin-password"))
        .await
        .unwrap();
    let bearer = resp.data.unwrap().token;
    let token = bearer.strip_prefix("Bearer ").expect("bearer prefix");

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(b"test-secret"),
        &Validation::default(),
    )
    .unwrap()
    .claims;
    assert_eq!(claims.role, ROLE_OWNER);
    assert_eq!(claims.permissions.len(), Permission::ALL.len());

    let err = auth_service::login_user(&app.state, login("admin", "wrong-password"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn password_reset_round_trip() {
    let mut app = test_app().await;
    seed::run(&app.state.orm, &admin_seed()).await.unwrap();

    auth_service::forgot_password(
        &app.state,
        ForgotPasswordRequest {
            email: "TEST@example.com".to_string(),
        },
    )
    .await
    .unwrap();

    let Notification::PasswordReset { to, reset_url } = next_mail(&mut app.mail).await else {
        panic!("expected a reset email");
    };
    assert_eq!(to, "test@example.com");

    auth_service::reset_password(
        &app.state,
        ResetPasswordRequest {
            token: token_from(&reset_url),
            password: "brand-new-password".to_string(),
        },
    )
    .await
    .unwrap();

    assert!(
        auth_service::login_user(
            &app.state,
            login(seed::DEMO_CUSTOMER_USERNAME, "brand-new-password")
        )
        .await
        .is_ok()
    );
    assert!(
        auth_service::login_user(&app.state, login(seed::DEMO_CUSTOMER_USERNAME, "password123"))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn forgot_password_for_unknown_email_still_acknowledges() {
    let app = test_app().await;
    seed::run(&app.state.orm, &admin_seed()).await.unwrap();

    let resp = auth_service::forgot_password(
        &app.state,
        ForgotPasswordRequest {
            email: "nobody@example.com".to_string(),
        },
    )
    .await
    .unwrap();
    assert!(resp.message.contains("reset link"));
}
