use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
}

/// Verified caller identity, injected into request extensions by
/// [`require_user`]. Handlers trust it unconditionally; token minting is the
/// upstream auth subsystem's job.
#[derive(Clone, Copy, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[allow(dead_code)]
    exp: usize,
}

/// Route middleware: verify `Authorization: Bearer <token>` (falling back to
/// an `auth_token` cookie), pull the user id from `sub`, and stash it for the
/// handler. Missing or invalid tokens are 401.
pub async fn require_user(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let path = req.uri().path().to_string();

    let token = {
        let authz = req
            .headers()
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        if let Some(h) = authz {
            let prefix = "Bearer ";
            match h.strip_prefix(prefix) {
                Some(rest) => rest.to_string(),
                None => {
                    tracing::warn!(path = %path, "invalid Authorization format (expect Bearer)");
                    return Err(StatusCode::UNAUTHORIZED);
                }
            }
        } else {
            // Cookie fallback: parse the Cookie header for auth_token
            let cookie_header = req
                .headers()
                .get(axum::http::header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");

            let mut token_val: Option<String> = None;
            for part in cookie_header.split(';') {
                let kv = part.trim();
                if let Some(rest) = kv.strip_prefix("auth_token=") {
                    token_val = Some(rest.to_string());
                    break;
                }
            }

            match token_val {
                Some(t) if !t.is_empty() => t,
                _ => {
                    tracing::warn!(path = %path, "missing Authorization header and auth_token cookie");
                    return Err(StatusCode::UNAUTHORIZED);
                }
            }
        }
    };

    let key = DecodingKey::from_secret(state.auth.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let claims = match decode::<Claims>(&token, &key, &validation) {
        Ok(data) => data.claims,
        Err(e) => {
            tracing::warn!(path = %path, err = %e, "token validation failed");
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    let user_id = match Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(path = %path, err = %e, "token subject is not a user id");
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    req.extensions_mut().insert(AuthUser { user_id });
    Ok(next.run(req).await)
}
