//! Turns action outcomes into HTTP responses.
//!
//! A redirect exception sends the caller back to the page they came from with
//! their input and an `error` flash; any other failure is a 500.

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use server_api::{error::ActionError, view::View};
use shared::error::FLASH_ERROR_KEY;
use tracing::{debug, error, info};
use url::Url;

use crate::{app_state::AppState, session::SessionHandle};

const SERVER_ERROR_PAGE: &str = "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Server Error</title></head>\n<body><h1>Something went wrong.</h1></body>\n</html>\n";

impl AppState {
    pub(crate) async fn respond_with_view(
        &self,
        headers: &HeaderMap,
        submitted: Vec<(String, String)>,
        outcome: Result<View, ActionError>,
    ) -> Response {
        match outcome {
            Ok(view) => self.render_page(headers, view).await,
            Err(err) => self.render_action_error(headers, submitted, err).await,
        }
    }

    pub(crate) async fn render_page(&self, headers: &HeaderMap, view: View) -> Response {
        let session = SessionHandle::resolve(headers, &self.session_cookie);
        let page = self.sessions.take_page_state(&session.id).await;
        let (template, bindings) = view.into_parts();

        match self.renderer.render(template, &bindings, &page) {
            Ok(html) => {
                debug!(template, "page rendered");
                let mut response_headers = HeaderMap::new();
                if let Some(cookie) = session.set_cookie_header(&self.session_cookie) {
                    response_headers.insert(header::SET_COOKIE, cookie);
                }
                (StatusCode::OK, response_headers, Html(html)).into_response()
            }
            Err(err) => {
                error!(template, error = ?err, "failed to render page");
                self.sessions.restore_page_state(&session.id, page).await;
                server_error()
            }
        }
    }

    pub(crate) async fn render_action_error(
        &self,
        headers: &HeaderMap,
        submitted: Vec<(String, String)>,
        err: ActionError,
    ) -> Response {
        match err {
            ActionError::Redirect(exception) => {
                let session = SessionHandle::resolve(headers, &self.session_cookie);
                let location = self.previous_location(headers);
                info!(reason = exception.message(), %location, "redirecting back with error");

                self.sessions.remember_input(&session.id, submitted).await;
                self.sessions
                    .flash(&session.id, FLASH_ERROR_KEY, exception.into_message())
                    .await;
                self.redirect(&session, &location)
            }
            ActionError::Fault(fault) => {
                error!(error = ?fault, "action failed");
                server_error()
            }
        }
    }

    pub(crate) async fn redirect_with_flash(
        &self,
        headers: &HeaderMap,
        location: &str,
        key: &str,
        message: impl Into<String>,
    ) -> Response {
        let session = SessionHandle::resolve(headers, &self.session_cookie);
        self.sessions.flash(&session.id, key, message).await;
        self.redirect(&session, location)
    }

    fn redirect(&self, session: &SessionHandle, location: &str) -> Response {
        let mut response_headers = HeaderMap::new();
        response_headers.insert(
            header::LOCATION,
            HeaderValue::from_str(location).unwrap_or_else(|_| HeaderValue::from_static("/")),
        );
        if let Some(cookie) = session.set_cookie_header(&self.session_cookie) {
            response_headers.insert(header::SET_COOKIE, cookie);
        }
        (StatusCode::FOUND, response_headers).into_response()
    }

    /// Path and query of a same-origin Referer, or `/`.
    ///
    /// Relative referers are resolved against the request origin before the
    /// origin check, so `/\host` style values cannot leave the site.
    fn previous_location(&self, headers: &HeaderMap) -> String {
        let Some(raw) = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
        else {
            return "/".to_string();
        };
        let Some(origin) = self.request_origin(headers) else {
            return "/".to_string();
        };
        let Ok(referer) = origin.join(raw) else {
            return "/".to_string();
        };

        if !self.is_same_origin(&origin, &referer) || referer.path().starts_with("//") {
            return "/".to_string();
        }

        let mut location = referer.path().to_string();
        if let Some(query) = referer.query() {
            location.push('?');
            location.push_str(query);
        }
        location
    }

    /// The configured public URL, else the request's Host header.
    fn request_origin(&self, headers: &HeaderMap) -> Option<Url> {
        if let Some(public_url) = &self.public_url {
            return Some(public_url.clone());
        }
        let host = headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())?;
        Url::parse(&format!("http://{host}/")).ok()
    }

    fn is_same_origin(&self, origin: &Url, referer: &Url) -> bool {
        if self.public_url.is_some() {
            return origin.origin() == referer.origin();
        }
        // Host alone does not carry the scheme.
        matches!(referer.scheme(), "http" | "https")
            && referer.host_str() == origin.host_str()
            && referer.port() == origin.port()
    }
}

fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Html(SERVER_ERROR_PAGE)).into_response()
}
