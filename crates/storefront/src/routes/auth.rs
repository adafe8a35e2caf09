//! Session hand-off and logout.
//!
//! Credentials are checked by the external auth service. It sends the
//! customer here with an access token, which is exchanged once for the
//! profile and kept in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::components::HeaderView;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_session, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Query parameters of the hand-off.
#[derive(Deserialize)]
pub struct HandoffQuery {
    pub token: Option<String>,
}

/// Local sign-in page.
///
/// Used when no external login URL is configured: accepts an access token
/// issued by the auth service and hands it to `/auth/handoff`.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub header: Option<HeaderView>,
    pub signed_in: bool,
}

/// Display the local sign-in page.
pub async fn login_page(OptionalAuth(user): OptionalAuth) -> LoginTemplate {
    LoginTemplate {
        header: HeaderView::for_request(user.as_ref(), "/login"),
        signed_in: user.is_some(),
    }
}

/// Exchange an access token for a storefront session.
///
/// A missing or rejected token sends the visitor back to the login page.
#[instrument(skip_all)]
pub async fn handoff(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<HandoffQuery>,
) -> Result<Redirect> {
    let login = Redirect::to(&state.config().login_url);

    let Some(token) = query.token.filter(|t| !t.trim().is_empty()) else {
        return Ok(login);
    };

    let profile = match state.backend().current_user(&token).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(error = %e, "Access token rejected");
            return Ok(login);
        }
    };

    let user = CurrentUser {
        name: profile.name,
        email: profile.email,
        access_token: token,
    };
    set_current_user(&session, &user).await?;
    set_sentry_user(&user.email);
    info!("Customer signed in");

    Ok(Redirect::to("/dashboard"))
}

/// End the session and return to the login page.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    clear_session(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to(&state.config().login_url))
}
