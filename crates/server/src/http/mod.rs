//! HTTP front-end: routing, form decoding and the accept loop.
//!
//! Responsibilities:
//! - Serve the search form and accept search submissions.
//! - Dispatch each search and hand the job to its own streaming task.
//!
//! Does NOT handle:
//! - Polling or response finalization (see [`crate::stream`]).
//!
//! Invariants:
//! - A request is rejected before any remote call when its form or its form
//!   token is invalid.
//! - [`AppState`] is read-only once the server starts.

mod body;
mod form;
mod handler;
mod listener;
mod xsrf;

use std::sync::Arc;

use splunkblaze_client::{DispatchOptions, FetchOptions, JobApi};
use splunkblaze_config::Config;

use crate::stream::{HtmlRenderer, PollSettings, Render};

pub use body::ResponseBody;
pub use form::{SearchForm, parse_search_form};
pub use handler::handle_request;
pub use listener::serve;
pub use xsrf::XsrfGuard;

/// State shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn JobApi>,
    pub renderer: Arc<dyn Render>,
    pub settings: PollSettings,
    /// Defaults for every dispatch; form fields override the time bounds.
    pub dispatch: DispatchOptions,
    pub xsrf: XsrfGuard,
}

impl AppState {
    pub fn new(api: Arc<dyn JobApi>, settings: PollSettings) -> Self {
        Self {
            api,
            renderer: Arc::new(HtmlRenderer::new()),
            settings,
            dispatch: DispatchOptions::default(),
            xsrf: XsrfGuard::random(),
        }
    }

    pub fn from_config(api: Arc<dyn JobApi>, config: &Config) -> Self {
        let mut state = Self::new(api, PollSettings::from(&config.stream));
        state.dispatch.fetch = FetchOptions::from(&config.fetch);
        if let Some(secret) = &config.server.cookie_secret {
            state.xsrf = XsrfGuard::new(secret.clone());
        }
        state
    }
}
