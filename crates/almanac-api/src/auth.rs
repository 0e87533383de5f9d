use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::{info, warn};

use almanac_types::api::{LoginForm, SignUpForm};

use crate::error::{ApiError, ApiResult};
use crate::middleware::{clear_session, current_account, session_cookie};
use crate::pages;
use crate::state::{AppState, blocking};

const FLASH_COOKIE: &str = "almanac_flash";

/// One-shot notices carried across a redirect. Stored in the cookie as a
/// short key so no free text ever goes into a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Registered,
}

impl Flash {
    fn key(self) -> &'static str {
        match self {
            Flash::Registered => "registered",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "registered" => Some(Flash::Registered),
            _ => None,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Flash::Registered => "You have successfully registered as a member",
        }
    }
}

fn set_flash(jar: CookieJar, flash: Flash) -> CookieJar {
    jar.add(Cookie::build((FLASH_COOKIE, flash.key())).path("/").http_only(true))
}

fn take_flash(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let flash = jar.get(FLASH_COOKIE).and_then(|c| Flash::from_key(c.value()));
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, flash)
}

/// GET /login
pub async fn login_page(State(state): State<AppState>, jar: CookieJar) -> ApiResult<Response> {
    if current_account(&state, &jar).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    let (jar, flash) = take_flash(jar);
    Ok((jar, pages::login(flash.map(Flash::message))).into_response())
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    if current_account(&state, &jar).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let username = form.username.clone();
    let account = blocking(&state, move |s| {
        s.accounts().authenticate(&form.username, &form.password)
    })
    .await?;

    let Some(account) = account else {
        warn!("Failed login for '{}'", username);
        return Ok(pages::login(Some(&ApiError::Unauthorized.to_string())).into_response());
    };

    let cookie = session_cookie(&state.session, &account)?;
    info!("Account '{}' logged in", account.username);
    Ok((jar.add(cookie), Redirect::to("/")).into_response())
}

/// GET /logout
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (clear_session(jar), Redirect::to("/login"))
}

/// GET /sign_up
pub async fn sign_up_page(State(state): State<AppState>, jar: CookieJar) -> ApiResult<Response> {
    if current_account(&state, &jar).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(pages::sign_up(None).into_response())
}

/// POST /sign_up
pub async fn sign_up(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignUpForm>,
) -> ApiResult<Response> {
    if current_account(&state, &jar).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let result = blocking(&state, move |s| {
        s.accounts()
            .register(&form.username, &form.password, &form.confirm_password)
    })
    .await;

    match result {
        Ok(()) => Ok((set_flash(jar, Flash::Registered), Redirect::to("/login")).into_response()),
        Err(e) if e.is_user_facing() => Ok(pages::sign_up(Some(&e.to_string())).into_response()),
        Err(e) => Err(e),
    }
}
