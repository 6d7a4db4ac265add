use std::convert::Infallible;
use std::sync::Arc;

use http_body_util::{BodyExt, Limited};
use hyper::body::Incoming;
use hyper::header::{ALLOW, CACHE_CONTROL, CONTENT_TYPE, HeaderValue, SET_COOKIE};
use hyper::{Method, Request, Response, StatusCode};
use splunkblaze_client::{DispatchOptions, redact_query};
use tracing::{debug, info, warn};

use super::AppState;
use super::body::ResponseBody;
use super::form::parse_search_form;
use super::xsrf;
use crate::error::ServerError;
use crate::stream::{ResponseStreamer, metrics, stream_job};

/// Largest accepted search form body.
const MAX_FORM_BYTES: usize = 64 * 1024;

/// Rendered chunks buffered ahead of a slow client.
const STREAM_BUFFER_CHUNKS: usize = 16;

pub async fn handle_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<ResponseBody>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let result = match (&method, path.as_str()) {
        (&Method::GET, "/") => index(&req, &state),
        (&Method::POST, "/search") => search(req, &state).await,
        (_, "/" | "/search") => Err(ServerError::MethodNotAllowed {
            method: method.to_string(),
            path: path.clone(),
        }),
        _ => Err(ServerError::NotFound(path.clone())),
    };

    Ok(result.unwrap_or_else(|e| error_response(&state, e)))
}

/// Search form. A still-valid token cookie is reused so open tabs keep working.
fn index(req: &Request<Incoming>, state: &AppState) -> Result<Response<ResponseBody>, ServerError> {
    let token = match xsrf::cookie_token(req.headers()) {
        Some(token) if state.xsrf.is_signed(token) => token.to_string(),
        _ => state.xsrf.issue()?,
    };
    let cookie = HeaderValue::from_str(&xsrf::set_cookie(&token))
        .map_err(|e| ServerError::Internal(format!("Invalid XSRF cookie: {e}")))?;

    let mut response = html_response(
        StatusCode::OK,
        ResponseBody::full(state.renderer.index_page(&token)),
    );
    response.headers_mut().insert(SET_COOKIE, cookie);
    Ok(response)
}

async fn search(
    req: Request<Incoming>,
    state: &AppState,
) -> Result<Response<ResponseBody>, ServerError> {
    let cookie = xsrf::cookie_token(req.headers()).map(str::to_string);
    let body = Limited::new(req.into_body(), MAX_FORM_BYTES)
        .collect()
        .await
        .map_err(|e| ServerError::InvalidBody(e.to_string()))?
        .to_bytes();
    let form = parse_search_form(&body);
    state.xsrf.check(cookie.as_deref(), form.xsrf.as_deref())?;
    let query = form.query()?.to_string();

    let options = DispatchOptions {
        earliest_time: form
            .earliest_time
            .or_else(|| state.dispatch.earliest_time.clone()),
        latest_time: form
            .latest_time
            .or_else(|| state.dispatch.latest_time.clone()),
        fetch: state.dispatch.fetch.clone(),
    };
    let job = state.api.dispatch(&query, &options).await?;
    info!(sid = %job.sid, query = %redact_query(&job.query), "Dispatched search job");

    let (streamer, rx) = ResponseStreamer::channel(Arc::clone(&state.renderer), STREAM_BUFFER_CHUNKS);
    tokio::spawn(stream_job(
        Arc::clone(&state.api),
        state.settings.clone(),
        job,
        streamer,
    ));

    Ok(html_response(StatusCode::OK, ResponseBody::channel(rx)))
}

fn error_response(state: &AppState, err: ServerError) -> Response<ResponseBody> {
    let status = err.status_code();
    match &err {
        ServerError::Dispatch(e) => warn!(error = %e, status = status.as_u16(), "Search dispatch failed"),
        other => debug!(error = %other, status = status.as_u16(), "Request rejected"),
    }
    if matches!(
        err,
        ServerError::MissingParameter(_)
            | ServerError::InvalidBody(_)
            | ServerError::Forbidden(_)
            | ServerError::Dispatch(_)
    ) {
        metrics::record_rejected(status.as_u16());
    }

    let page = state.renderer.error_page(status, &err.public_message());
    let mut response = html_response(status, ResponseBody::full(page));
    if let ServerError::MethodNotAllowed { path, .. } = &err {
        let allow = if path == "/" { "GET" } else { "POST" };
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static(allow));
    }
    response
}

fn html_response(status: StatusCode, body: ResponseBody) -> Response<ResponseBody> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}
