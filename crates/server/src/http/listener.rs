use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use super::AppState;
use super::handler::handle_request;

/// Accept connections until `shutdown` resolves.
///
/// Each connection is served on its own task. In-flight connections and
/// their streams are left to finish on their own after shutdown.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()>,
{
    let addr = listener.local_addr()?;
    info!("HTTP server running at http://{addr}/");
    tokio::pin!(shutdown);

    loop {
        let (stream, peer) = tokio::select! {
            result = listener.accept() => match result {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "Failed to accept HTTP connection");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    continue;
                }
            },
            () = &mut shutdown => {
                info!("HTTP server shutting down, stopping accept loop");
                break;
            }
        };

        let io = TokioIo::new(stream);
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let service = service_fn(move |req| handle_request(req, Arc::clone(&state)));
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await
                && !err.is_incomplete_message()
            {
                debug!(%peer, error = %err, "Error serving connection");
            }
        });
    }

    Ok(())
}
