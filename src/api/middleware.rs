use crate::api::AppState;
use crate::config::AdminConfig;
use crate::domain::admin::{AdminSession, IssuedSession};
use crate::error::AppError;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Request, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, header, request::Parts},
    response::Redirect,
};
use time::OffsetDateTime;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "relay_session";

/// Reuses an inbound `x-request-id` when present, otherwise mints a UUID.
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeRequestUuidOrHeader;

impl MakeRequestId for MakeRequestUuidOrHeader {
    fn make_request_id<B>(&mut self, request: &axum::http::Request<B>) -> Option<RequestId> {
        if let Some(existing) = request.headers().get("x-request-id") {
            return Some(RequestId::new(existing.clone()));
        }
        HeaderValue::from_str(&Uuid::new_v4().to_string()).ok().map(RequestId::new)
    }
}

/// JSON body extractor whose rejections use the API's error envelope.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(reason = %rejection.body_text(), "Rejected JSON body");
            let message = match rejection {
                JsonRejection::MissingJsonContentType(_) => "Expected a JSON body with Content-Type: application/json",
                _ => "Request body must be a valid JSON object",
            };
            AppError::BadRequest(message.to_string())
        })?;
        Ok(Self(value))
    }
}

/// An authenticated admin. Rejects with 401 JSON; used on `/admin/api/*`.
#[derive(Debug)]
pub struct AdminUser {
    pub session: AdminSession,
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        current_session(&parts.headers, state).map(|session| Self { session }).ok_or(AppError::AuthError)
    }
}

/// An authenticated admin on an HTML page. Redirects to the login form otherwise.
#[derive(Debug)]
pub struct AdminPage(pub AdminUser);

impl FromRequestParts<AppState> for AdminPage {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        current_session(&parts.headers, state)
            .map(|session| Self(AdminUser { session }))
            .ok_or_else(|| Redirect::to("/admin/login"))
    }
}

#[must_use]
pub fn current_session(headers: &HeaderMap, state: &AppState) -> Option<AdminSession> {
    session_token(headers).and_then(|token| state.admin_service.authenticate(&token))
}

#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value for a new session. The cookie lives exactly as long as the session.
#[must_use]
pub fn session_cookie(issued: &IssuedSession, config: &AdminConfig, now: OffsetDateTime) -> String {
    let max_age = (issued.session.expires_at - now).whole_seconds().max(0);
    let mut cookie = format!("{SESSION_COOKIE}={}; Path=/admin; HttpOnly; SameSite=Lax; Max-Age={max_age}", issued.token);
    if config.secure_cookie {
        cookie.push_str("; Secure");
    }
    cookie
}

#[must_use]
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/admin; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;
    use time::macros::datetime;

    #[test]
    fn test_session_token_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(header::COOKIE, HeaderValue::from_static("a=1; relay_session=abc-123; b=2"));

        assert_eq!(session_token(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_session_token_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("relay_session_old=x"));

        assert!(session_token(&headers).is_none());
    }

    #[test]
    fn test_cookie_attributes() {
        let now = datetime!(2024-03-01 12:00 UTC);
        let issued = IssuedSession {
            token: "t".to_string(),
            session: AdminSession { admin_id: 1, email: "ops@example.com".to_string(), expires_at: now + Duration::minutes(1) },
        };
        let mut config = AdminConfig { email: None, password: None, session_ttl_secs: 60, secure_cookie: false };
        assert_eq!(
            session_cookie(&issued, &config, now),
            "relay_session=t; Path=/admin; HttpOnly; SameSite=Lax; Max-Age=60"
        );

        config.secure_cookie = true;
        assert!(session_cookie(&issued, &config, now).ends_with("; Secure"));
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }

    #[test]
    fn test_cookie_max_age_tracks_session_expiry() {
        let now = datetime!(2024-03-01 12:00 UTC);
        let config = AdminConfig { email: None, password: None, session_ttl_secs: 3600, secure_cookie: false };
        let mut issued = IssuedSession {
            token: "t".to_string(),
            session: AdminSession { admin_id: 1, email: "ops@example.com".to_string(), expires_at: now + Duration::seconds(90) },
        };
        assert!(session_cookie(&issued, &config, now).ends_with("Max-Age=90"));

        issued.session.expires_at = now - Duration::seconds(5);
        assert!(session_cookie(&issued, &config, now).ends_with("Max-Age=0"));
    }
}
