//! Health-check HTTP server
//!
//! Every request, whatever its method or path, is answered with `200 OK`
//! and the plain-text body `ok`. Each accepted TCP connection is logged
//! once, before any HTTP is read from it.

use crate::{
    error::{AppError, Result},
    logging::Logger,
    models::ServerConfig,
};
use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    body::Incoming,
    header::{HeaderName, HeaderValue, CONTENT_TYPE},
    server::conn::http1,
    service::service_fn,
    Request, Response, StatusCode,
};
use hyper_util::rt::TokioIo;
use async_trait::async_trait;
use std::{
    convert::Infallible,
    future::{pending, Future},
    io,
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::watch,
};

/// Response body served for every request
pub const HEALTH_BODY: &str = "ok";

const REQUEST_DURATION: HeaderName = HeaderName::from_static("x-pockethost-request-duration");
const REGION: HeaderName = HeaderName::from_static("x-pockethost-region");

/// Pause after a failed accept so descriptor exhaustion does not spin the loop
pub const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Listening state of the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerState {
    #[default]
    NotListening,
    Listening,
}

/// Builds the health response for one request.
///
/// `started` is when the request arrived at the service. The duration header
/// is measured from it to the moment the response head is built.
pub fn health_response(config: &ServerConfig, started: Instant) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(HEALTH_BODY.as_bytes())));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

    if config.timing_headers {
        let elapsed_ms = started.elapsed().as_millis() as u64;
        headers.insert(REQUEST_DURATION, HeaderValue::from(elapsed_ms));

        if let Some(region) = config.region.as_deref() {
            if let Ok(value) = HeaderValue::from_str(region) {
                headers.insert(REGION, value);
            }
        }
    }

    response
}

/// Entry point for starting the health server
pub struct HealthServer;

impl HealthServer {
    /// Bind the listener described by `config`.
    ///
    /// The startup line is logged only once the socket is bound; a failed
    /// bind logs nothing and returns [`AppError::Bind`].
    pub async fn bind(config: ServerConfig, logger: Logger) -> Result<BoundServer> {
        let addr = config.bind_address()?;

        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            // Hosts without IPv6 still get the wildcard address
            Err(e) if is_ipv6_wildcard(addr) && e.kind() != io::ErrorKind::AddrInUse => {
                let fallback = SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), addr.port());
                TcpListener::bind(fallback)
                    .await
                    .map_err(|e| AppError::bind(format!("Failed to bind {}: {}", fallback, e)))?
            }
            Err(e) => return Err(AppError::bind(format!("Failed to bind {}: {}", addr, e))),
        };

        let local_addr = listener
            .local_addr()
            .map_err(|e| AppError::bind(format!("Failed to read bound address: {}", e)))?;

        let (state, _) = watch::channel(ServerState::Listening);

        logger
            .info(&format!("Server running on port {}", local_addr.port()))
            .field("port", local_addr.port())
            .field("address", local_addr.to_string())
            .log()
            .await;

        Ok(BoundServer {
            listener,
            local_addr,
            config: Arc::new(config),
            logger,
            state,
        })
    }
}

fn is_ipv6_wildcard(addr: SocketAddr) -> bool {
    addr.is_ipv6() && addr.ip().is_unspecified()
}

/// Source of inbound connections for the serve loop
#[async_trait]
trait Acceptor: Send + Sync {
    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)>;
}

#[async_trait]
impl Acceptor for TcpListener {
    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        TcpListener::accept(self).await
    }
}

/// A bound listener ready to accept connections
pub struct BoundServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: Arc<ServerConfig>,
    logger: Logger,
    state: watch::Sender<ServerState>,
}

impl std::fmt::Debug for BoundServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundServer")
            .field("local_addr", &self.local_addr)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl BoundServer {
    /// Address actually bound, with the real port when 0 was requested
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    /// Follow state changes after the server has been moved into a task
    pub fn state_watcher(&self) -> watch::Receiver<ServerState> {
        self.state.subscribe()
    }

    /// Serve until the process is terminated
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(pending()).await
    }

    /// Serve until `signal` resolves.
    ///
    /// Connections already accepted keep running on their own tasks.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.accept_loop(&self.listener, signal).await;

        self.state.send_replace(ServerState::NotListening);
        self.logger.info("Server stopped").log().await;
        Ok(())
    }

    async fn accept_loop<A, F>(&self, acceptor: &A, signal: F)
    where
        A: Acceptor + ?Sized,
        F: Future<Output = ()>,
    {
        tokio::pin!(signal);

        loop {
            tokio::select! {
                _ = &mut signal => return,
                accepted = acceptor.accept() => match accepted {
                    Ok((stream, peer)) => self.handle_connection(stream, peer).await,
                    Err(e) => {
                        self.logger
                            .warn(&format!("Failed to accept connection: {}", e))
                            .field("retry_in_ms", ACCEPT_ERROR_BACKOFF.as_millis() as u64)
                            .log()
                            .await;

                        tokio::select! {
                            _ = &mut signal => return,
                            _ = tokio::time::sleep(ACCEPT_ERROR_BACKOFF) => {}
                        }
                    }
                },
            }
        }
    }

    async fn handle_connection(&self, stream: TcpStream, peer: SocketAddr) {
        self.logger
            .info(&format!("New connection from {}:{}", peer.ip(), peer.port()))
            .field("remote_address", peer.ip().to_string())
            .field("remote_port", peer.port())
            .log()
            .await;

        let config = self.config.clone();
        let logger = self.logger.clone();

        tokio::spawn(async move {
            let service = service_fn(move |_req: Request<Incoming>| {
                let started = Instant::now();
                let config = config.clone();
                async move { Ok::<_, Infallible>(health_response(&config, started)) }
            });

            if let Err(e) = http1::Builder::new()
                .keep_alive(true)
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                logger
                    .debug(&format!("Connection from {} closed with error: {}", peer, e))
                    .log()
                    .await;
            }
        });
    }
}
