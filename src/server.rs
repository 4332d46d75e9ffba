//! HTTP server that runs the gateway.
//!
//! One tokio task per connection, HTTP/1.1 via hyper. Each request gets a
//! tracing span keyed by a request id, which is echoed back in
//! `X-Request-Id`. On shutdown the listener closes first, then in-flight
//! connections get [`SHUTDOWN_TIMEOUT_SECS`] to drain.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use hyper::body::Incoming;
use hyper::header::HeaderValue;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::constants::{REQUEST_ID_HEADER, SHUTDOWN_TIMEOUT_SECS};
use crate::gateway::{GatewayBody, MediaGateway};
use crate::metrics;

/// Longest client-supplied request id that is propagated as-is.
const MAX_REQUEST_ID_LEN: usize = 128;

/// A bound gateway server.
pub struct Server {
    gateway: MediaGateway,
    listener: TcpListener,
}

impl Server {
    /// Binds the listener. Port 0 picks an ephemeral port.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn bind(gateway: MediaGateway, addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        Ok(Self { gateway, listener })
    }

    /// Address the server is listening on.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket address cannot be read.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read listener address")
    }

    /// Serves until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener address cannot be read.
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serves until `signal` completes, then drains connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener address cannot be read.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        info!("Media gateway listening on http://{}", addr);

        let Self { gateway, listener } = self;
        let graceful = GracefulShutdown::new();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, remote_addr) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            warn!("Failed to accept connection: {}", e);
                            continue;
                        },
                    };

                    let gateway = gateway.clone();
                    let service = service_fn(move |req| {
                        let gateway = gateway.clone();
                        async move { handle_request(&gateway, req, remote_addr).await }
                    });

                    let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
                    let conn = graceful.watch(conn);
                    tokio::spawn(async move {
                        if let Err(e) = conn.await {
                            debug!(remote = %remote_addr, error = %e, "Connection ended with error");
                        }
                    });
                },
                () = &mut signal => {
                    info!("Shutdown signal received");
                    break;
                },
            }
        }

        drop(listener);
        tokio::select! {
            () = graceful.shutdown() => info!("All connections closed"),
            () = tokio::time::sleep(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS)) => {
                warn!("Timed out waiting for connections to close");
            },
        }

        Ok(())
    }
}

/// Runs the gateway for one request inside its own span.
async fn handle_request(
    gateway: &MediaGateway,
    req: Request<Incoming>,
    remote_addr: SocketAddr,
) -> Result<Response<GatewayBody>, Infallible> {
    let started = Instant::now();
    let request_id = request_id(&req);

    // The gateway never reads request bodies.
    let (parts, _body) = req.into_parts();
    let req = Request::from_parts(parts, ());

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
        remote = %remote_addr,
    );
    let mut response = gateway.handle(&req).instrument(span.clone()).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let elapsed = started.elapsed();
    metrics::record_request_duration(elapsed.as_secs_f64());
    span.in_scope(|| {
        debug!(
            status = response.status().as_u16(),
            elapsed_us = elapsed.as_micros() as u64,
            "Request completed"
        );
    });

    Ok(response)
}

/// The client's `X-Request-Id` when usable, else a fresh UUID.
fn request_id<B>(req: &Request<B>) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty() && value.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(|| Uuid::new_v4().to_string(), ToString::to_string)
}
