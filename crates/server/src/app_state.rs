use std::sync::Arc;

use server_api::ApiContext;
use url::Url;

use crate::{render::ViewRenderer, session::SessionStore};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) api: ApiContext,
    pub(crate) sessions: SessionStore,
    pub(crate) renderer: Arc<dyn ViewRenderer>,
    /// Origin that Referer headers must match before a redirect follows them.
    /// Without it the request's Host header is used.
    pub(crate) public_url: Option<Url>,
    pub(crate) session_cookie: String,
}
