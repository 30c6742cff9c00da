//! HTTP front end.
//!
//! One hyper HTTP/1 connection task per accepted socket; every request is
//! routed through [`dispatch`].

use std::convert::Infallible;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::api::{self, Query};
use crate::error::ApiError;
use crate::state::AppState;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

/// Accept connections on `listener` until the task is dropped.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "listening");
    }

    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let state = state.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                let state = state.clone();
                async move { Ok::<_, Infallible>(handle_request(&state, req).await) }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                error!(%peer, error = %e, "connection error");
            }
        });
    }
}

async fn handle_request<B>(state: &AppState, req: Request<B>) -> Response<Full<Bytes>> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = Query::parse(req.uri().query());

    let response = dispatch(state, &method, &path, &query).await;
    debug!(%method, %path, status = response.status().as_u16(), "request");
    response
}

/// Route one request to its handler and render the result.
pub async fn dispatch(
    state: &AppState,
    method: &Method,
    path: &str,
    query: &Query,
) -> Response<Full<Bytes>> {
    let known = matches!(
        path,
        "/health"
            | "/api/latency"
            | "/api/latency/history"
            | "/api/regions"
            | "/api/exchanges"
            | "/api/regions/boundaries"
    );
    if !known {
        return error_response(&ApiError::NotFound(path.to_string()));
    }
    if method != Method::GET {
        return error_response(&ApiError::MethodNotAllowed(method.to_string()));
    }

    match path {
        "/health" => text_response(StatusCode::OK, "OK"),
        "/api/latency" => render(api::latency(state, query).await),
        "/api/latency/history" => render(api::history(state, query).await),
        "/api/regions" => json_response(StatusCode::OK, &api::list_regions()),
        "/api/exchanges" => json_response(StatusCode::OK, &api::list_exchanges()),
        _ => render(api::boundaries(query)),
    }
}

fn render<T: Serialize>(result: Result<T, ApiError>) -> Response<Full<Bytes>> {
    match result {
        Ok(body) => json_response(StatusCode::OK, &body),
        Err(e) => error_response(&e),
    }
}

fn error_response(err: &ApiError) -> Response<Full<Bytes>> {
    let status = err.status();
    if status.is_server_error() {
        error!(error = %err, "request failed");
    }
    json_response(status, &err.body())
}

fn json_response<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(bytes) => response(status, JSON, Bytes::from(bytes)),
        Err(e) => {
            error!(error = %e, "failed to encode response");
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

fn text_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    response(status, TEXT, Bytes::from_static(body.as_bytes()))
}

fn response(status: StatusCode, content_type: &'static str, body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
