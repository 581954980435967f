use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

use crate::error::Error;
use crate::export;
use crate::github::oauth;
use crate::web::session::{self, SESSION_COOKIE};
use crate::web::AppState;

pub async fn home() -> Html<String> {
    Html(page(
        "Repo Export",
        r#"<p>Export every GitHub repository you own or belong to as a CSV file.</p>
<p><a href="/oauth/login">Sign in with GitHub</a></p>"#,
    ))
}

pub async fn oauth_login(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let oauth_config = match app.config.oauth() {
        Ok(c) => c,
        Err(e) => return server_error(&e),
    };

    let sid = match session_id(&headers) {
        Some(id) if app.sessions.get(&id).await.is_some() => id,
        _ => app.sessions.create().await,
    };

    let nonce = session::random_id();
    app.sessions.set_oauth_state(&sid, nonce.clone()).await;

    let redirect_uri = format!("{}/oauth/callback", app.config.public_base_url);
    let url = match oauth::authorize_url(oauth_config, &redirect_uri, &nonce) {
        Ok(url) => url,
        Err(e) => return server_error(&e),
    };

    tracing::info!("redirecting to GitHub authorize");
    let mut response = Redirect::to(&url).into_response();
    if let Ok(value) = HeaderValue::from_str(&session_cookie(&sid)) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
}

pub async fn oauth_callback(
    State(app): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    let Some(sid) = session_id(&headers) else {
        return error_page(StatusCode::BAD_REQUEST, "No session. Start again from the home page.");
    };
    let Some(session) = app.sessions.get(&sid).await else {
        return error_page(StatusCode::BAD_REQUEST, "Unknown session. Start again from the home page.");
    };

    let (Some(code), Some(callback_state)) = (params.code, params.state) else {
        return error_page(StatusCode::BAD_REQUEST, "Missing code or state in callback.");
    };
    if session.oauth_state.as_deref() != Some(callback_state.as_str()) {
        return error_page(StatusCode::BAD_REQUEST, "OAuth state mismatch. Start again from the home page.");
    }

    let oauth_config = match app.config.oauth() {
        Ok(c) => c,
        Err(e) => return server_error(&e),
    };

    match oauth::exchange_code(oauth_config, &code).await {
        Ok(token) => {
            app.sessions.set_access_token(&sid, token).await;
            Redirect::to("/sync").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "OAuth code exchange failed");
            let (status, message) = user_message(&e);
            error_page(status, message)
        }
    }
}

pub async fn sync(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let token = match session_token(&app, &headers).await {
        Some(token) => token,
        None => return Redirect::to("/oauth/login").into_response(),
    };

    match app.pipeline.run(&token).await {
        Ok(report) => Html(page(
            "Sync complete",
            &format!(
                "<p>Fetched {} records; {} unique repositories across {} owners stored.</p>\
                 <p><a href=\"/download\">Download repos.csv</a></p>",
                report.fetched, report.unique_repos, report.owners
            ),
        ))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "sync failed");
            let (status, message) = user_message(&e);
            error_page(status, message)
        }
    }
}

pub async fn download(State(app): State<AppState>) -> Response {
    let rows = match app.storage.lock().await.export_rows() {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "export query failed");
            let (status, message) = user_message(&e);
            return error_page(status, message);
        }
    };

    let csv = export::render(&rows);
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"repos.csv\"",
            ),
        ],
        csv,
    )
        .into_response()
}

async fn session_token(app: &AppState, headers: &HeaderMap) -> Option<String> {
    let sid = session_id(headers)?;
    app.sessions.get(&sid).await?.access_token
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|part| {
        let (name, value) = part.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

fn session_cookie(sid: &str) -> String {
    format!("{SESSION_COOKIE}={sid}; HttpOnly; SameSite=Lax; Path=/")
}

/// One user-visible message per failure category, so a fetch problem never
/// reads like a storage problem.
fn user_message(err: &Error) -> (StatusCode, &'static str) {
    match err {
        Error::TokenRejected(_) | Error::OAuth(_) => (
            StatusCode::UNAUTHORIZED,
            "GitHub did not accept the credentials. Please sign in again.",
        ),
        Error::Status { .. }
        | Error::GitHubApi(_)
        | Error::Network(_)
        | Error::Serialization(_) => (
            StatusCode::BAD_GATEWAY,
            "Error fetching data. Please try again later.",
        ),
        Error::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error while storing data in database.",
        ),
        Error::Export(_) | Error::Io(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "An error occurred while writing data to CSV.",
        ),
        Error::Config(_) | Error::InvalidHeader(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server configuration error.",
        ),
    }
}

fn server_error(err: &Error) -> Response {
    tracing::error!(error = %err, "request failed");
    let (status, message) = user_message(err);
    error_page(status, message)
}

fn error_page(status: StatusCode, message: &str) -> Response {
    (
        status,
        Html(page("Error", &format!("<p>{message}</p><p><a href=\"/\">Home</a></p>"))),
    )
        .into_response()
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body><h1>{title}</h1>\n{body}\n</body></html>\n"
    )
}
