use crate::api::AppState;
use crate::api::middleware::{AdminPage, AdminUser, clear_session_cookie, current_session, session_cookie, session_token};
use crate::api::schemas::admin::{LoginForm, MessageQuery, MessagesResponse, StatsResponse};
use crate::api::views;
use crate::domain::message::AuditFilter;
use crate::error::{AppError, Result};
use axum::{
    Form, Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use time::OffsetDateTime;

const RECENT_ON_DASHBOARD: i64 = 50;

pub async fn root(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    if current_session(&headers, &state).is_some() {
        Redirect::to("/admin/dashboard")
    } else {
        Redirect::to("/admin/login")
    }
}

pub async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if current_session(&headers, &state).is_some() {
        return Redirect::to("/admin/dashboard").into_response();
    }
    Html(views::login_page(None)).into_response()
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match state.admin_service.login(&form.email, &form.password).await {
        Ok(issued) => {
            let cookie = session_cookie(&issued, state.admin_service.config(), OffsetDateTime::now_utc());
            ([(header::SET_COOKIE, cookie)], Redirect::to("/admin/dashboard")).into_response()
        }
        Err(AppError::AuthError) => {
            (StatusCode::UNAUTHORIZED, Html(views::login_page(Some("Invalid email or password")))).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Login error");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(views::login_page(Some("An error occurred during login"))))
                .into_response()
        }
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = session_token(&headers) {
        state.admin_service.logout(&token);
    }
    ([(header::SET_COOKIE, clear_session_cookie())], Redirect::to("/admin/login"))
}

/// # Errors
/// Returns `AppError::Database` if the audit log cannot be read.
pub async fn dashboard(AdminPage(admin): AdminPage, State(state): State<AppState>) -> Result<Html<String>> {
    let stats = state.audit_service.aggregate_stats().await?;
    let recent = state
        .audit_service
        .query(&AuditFilter { limit: Some(RECENT_ON_DASHBOARD), ..AuditFilter::default() })
        .await?;

    Ok(Html(views::dashboard(&admin.session, &stats, &recent)))
}

/// Lists audit records, newest first, with the unpaginated match count.
///
/// # Errors
/// Returns `AppError::BadRequest` for malformed filters and `AppError::Database` if the query fails.
pub async fn list_messages(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse> {
    let filter = AuditFilter::try_from(query)?;

    let (messages, total) = tokio::try_join!(state.audit_service.query(&filter), state.audit_service.count(&filter))?;

    Ok(Json(MessagesResponse { success: true, total, messages: messages.into_iter().map(Into::into).collect() }))
}

/// # Errors
/// Returns `AppError::Database` if the query fails.
pub async fn stats(_admin: AdminUser, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = state.audit_service.aggregate_stats().await?;
    Ok(Json(StatsResponse { success: true, stats: stats.into() }))
}
