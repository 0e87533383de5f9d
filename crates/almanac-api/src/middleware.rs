//! Cookie sessions: issuing tokens, resolving the caller, guarding routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use almanac_types::Account;
use almanac_types::api::SessionClaims;

use crate::error::ApiResult;
use crate::state::{AppState, SessionConfig, blocking};

pub const SESSION_COOKIE: &str = "almanac_session";

/// Redirects to the login page unless the request carries a valid session.
/// On success the caller's [`Account`] is available as an extension.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    match current_account(&state, &jar).await {
        Ok(Some(account)) => {
            req.extensions_mut().insert(account);
            next.run(req).await
        }
        Ok(None) => Redirect::to("/login").into_response(),
        Err(e) => e.into_response(),
    }
}

/// Resolves the session cookie to an account. A missing, expired, or forged
/// token, or one naming an account that no longer exists, is `None`.
pub async fn current_account(state: &AppState, jar: &CookieJar) -> ApiResult<Option<Account>> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };

    let claims = match decode_token(&state.session, cookie.value()) {
        Ok(claims) => claims,
        Err(e) => {
            debug!("Ignoring invalid session token: {}", e);
            return Ok(None);
        }
    };

    blocking(state, move |s| s.accounts().find_by_id(&claims.sub)).await
}

pub fn session_cookie(config: &SessionConfig, account: &Account) -> anyhow::Result<Cookie<'static>> {
    let token = create_token(config, account)?;
    Ok(Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .build())
}

pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

fn create_token(config: &SessionConfig, account: &Account) -> anyhow::Result<String> {
    let expires = chrono::TimeDelta::try_days(config.ttl_days)
        .and_then(|ttl| chrono::Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| anyhow::anyhow!("session lifetime of {} days is out of range", config.ttl_days))?;

    let claims = SessionClaims {
        sub: account.id,
        username: account.username.clone(),
        exp: expires.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    Ok(token)
}

fn decode_token(config: &SessionConfig, token: &str) -> jsonwebtoken::errors::Result<SessionClaims> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}
