//! Authentication Middleware
//! Mission: Protect API endpoints with bearer token validation

use crate::auth::service::CredentialService;
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

/// Auth middleware that validates bearer tokens
pub async fn auth_middleware(
    State(credentials): State<CredentialService>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = req.headers().typed_get::<Authorization<Bearer>>();
    let token = bearer.as_ref().map(|auth| auth.token());

    let session = credentials.verify_session(token)?;

    // Handlers read the caller through `Extension<Session>`
    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtHandler;
    use crate::auth::models::{RegisterRequest, Role, Session};
    use crate::db::Database;
    use axum::{
        body::Body,
        http::{header, Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
        Extension, Router,
    };
    use tower::ServiceExt;

    async fn whoami(Extension(session): Extension<Session>) -> String {
        format!("{}:{}", session.account_id, session.role.as_str())
    }

    fn create_test_app() -> (Router, CredentialService) {
        let db = Database::in_memory().unwrap();
        let credentials =
            CredentialService::new(db, JwtHandler::new("test-secret".to_string(), 24), 4).unwrap();
        let app = Router::new()
            .route("/whoami", get(whoami))
            .route_layer(middleware::from_fn_with_state(
                credentials.clone(),
                auth_middleware,
            ));
        (app, credentials)
    }

    #[tokio::test]
    async fn test_missing_token_rejected() {
        let (app, _) = create_test_app();

        let response = app
            .oneshot(HttpRequest::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_rejected() {
        let (app, _) = create_test_app();

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let (app, credentials) = create_test_app();
        let registered = credentials
            .register(RegisterRequest {
                name: Some("Asha".into()),
                email: Some("a@x.com".into()),
                password: Some("pw1".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, format!("Bearer {}", registered.token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let expected = format!("{}:{}", registered.user.id, Role::Student.as_str());
        assert_eq!(&body[..], expected.as_bytes());
    }
}
