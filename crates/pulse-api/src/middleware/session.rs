//! Cookie session middleware.
//!
//! The signed cookie carries only the session id. Data is loaded from the
//! session store before the handler runs and written back afterwards, and
//! only when the handler changed it. A stored session the handler left
//! alone has its expiry extended instead. Untouched new sessions are never
//! stored and get no cookie.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::SignedCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use pulse_cache::{SessionData, SessionStore};

use crate::extractors::session::{SessionHandle, SessionState};
use crate::state::AppState;

/// Loads the request's session and persists changes made by the handler.
pub async fn session_layer(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie_name = state.config.session.cookie_name.clone();
    let incoming_id = jar.get(&cookie_name).map(|c| c.value().to_string());

    let (id, data) = match &incoming_id {
        Some(id) => match state.sessions.load(id).await {
            Ok(Some(data)) => (Some(id.clone()), data),
            Ok(None) => (None, SessionData::default()),
            Err(e) => {
                warn!(error = %e, "Failed to load session");
                (None, SessionData::default())
            }
        },
        None => (None, SessionData::default()),
    };

    let handle: SessionHandle = Arc::new(Mutex::new(SessionState::new(id, data)));
    request.extensions_mut().insert(handle.clone());

    let response = next.run(request).await;

    let session = handle.lock().await;
    let jar = if session.destroyed {
        if let Some(id) = &session.id {
            if let Err(e) = state.sessions.destroy(id).await {
                warn!(error = %e, "Failed to destroy session");
            }
        }
        jar.remove(Cookie::build((cookie_name, "")).path("/"))
    } else if session.modified {
        let id = session.id.clone().unwrap_or_else(SessionStore::generate_id);
        match state.sessions.save(&id, &session.data).await {
            Ok(()) => {
                debug!("Session saved");
                jar.add(build_cookie(&state, cookie_name, id))
            }
            Err(e) => {
                warn!(error = %e, "Failed to save session");
                jar
            }
        }
    } else {
        if let Some(id) = &session.id {
            if let Err(e) = state.sessions.touch(id).await {
                warn!(error = %e, "Failed to touch session");
            }
        }
        jar
    };

    (jar, response).into_response()
}

fn build_cookie(state: &AppState, name: String, id: String) -> Cookie<'static> {
    let max_age = i64::try_from(state.config.session.max_age_seconds).unwrap_or(i64::MAX);
    Cookie::build((name, id))
        .path("/")
        .http_only(true)
        .secure(state.config.secure_cookies())
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age))
        .build()
}
