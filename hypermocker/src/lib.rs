//! HTTP server for tests, which answers only the requests it was told to anticipate. Each
//! anticipated request can be inspected and then answered with a body or a status code.

use http_body_util::Full;
use hyper::{Request, Response, body::Incoming, server::conn::http1, service::Service};
use hyper_util::rt::TokioIo;
use std::{
    collections::{HashMap, VecDeque},
    future::Future,
    net::SocketAddr,
    pin::Pin,
    sync::{Arc, Mutex},
};
use tokio::{net::TcpListener, sync::oneshot};

pub use hyper;
pub use hyper::StatusCode;
pub use hyper::body::Bytes;

type Reply = Response<Full<Bytes>>;

/// Request which was anticipated, but did not come yet.
struct Pending {
    request_tx: oneshot::Sender<Request<()>>,
    reply_rx: oneshot::Receiver<Reply>,
}

#[derive(Default)]
struct State {
    /// Anticipated requests by path. Requests to the same path are served in order.
    anticipated: HashMap<String, VecDeque<Pending>>,

    unexpected: Vec<String>,
}

pub struct Server {
    port: u16,
    state: Arc<Mutex<State>>,
}

impl Server {
    /// Create new [`Server`], and bind it to a random port.
    pub async fn bind() -> Self {
        let state = Arc::new(Mutex::new(State::default()));

        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let listener = TcpListener::bind(addr).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let state_clone = state.clone();
        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(connection) => connection,
                    Err(e) => {
                        log::warn!("Failed to accept a connection: {e}.");
                        continue;
                    }
                };
                let io = TokioIo::new(stream);

                let state = state_clone.clone();
                tokio::task::spawn(async move {
                    if let Err(e) = http1::Builder::new()
                        .serve_connection(io, Handler { state })
                        .await
                    {
                        log::warn!("Connection failed: {e}.");
                    }
                });
            }
        });

        Self { port, state }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get ready for a request to `path`. Query string is not taken into account.
    pub async fn anticipate(&self, path: impl Into<String>) -> AnticipatedRequest {
        let path = path.into();
        log::info!("Anticipating '{path}'.");

        let (request_tx, request_rx) = oneshot::channel();
        let (reply_tx, reply_rx) = oneshot::channel();

        self.state
            .lock()
            .unwrap()
            .anticipated
            .entry(path)
            .or_default()
            .push_back(Pending {
                request_tx,
                reply_rx,
            });

        AnticipatedRequest {
            request_rx: Some(request_rx),
            reply_tx,
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let state = self.state.lock().unwrap();
        if !state.unexpected.is_empty() && !std::thread::panicking() {
            panic!("there are unexpected requests: {:?}", state.unexpected);
        }
    }
}

pub struct AnticipatedRequest {
    request_rx: Option<oneshot::Receiver<Request<()>>>,
    reply_tx: oneshot::Sender<Reply>,
}

impl AnticipatedRequest {
    /// Wait for the request to arrive.
    pub async fn expect(&mut self) -> Request<()> {
        let request_rx = self
            .request_rx
            .take()
            .expect("request was already expected");
        request_rx.await.expect("server is gone")
    }

    /// Answer with `200 OK` and the payload. Can be called before the request arrives.
    pub fn respond(self, payload: impl Into<Bytes>) {
        self.reply(Response::new(Full::new(payload.into())));
    }

    /// Answer with an empty body and the given status.
    pub fn respond_with_status(self, status: StatusCode) {
        let response = Response::builder()
            .status(status)
            .body(Full::new(Bytes::new()))
            .unwrap();
        self.reply(response);
    }

    fn reply(self, response: Reply) {
        log::info!("Responding with {}.", response.status());
        if self.reply_tx.send(response).is_err() {
            log::warn!("Nobody is waiting for the response.");
        }
    }
}

struct Handler {
    state: Arc<Mutex<State>>,
}

impl Service<Request<Incoming>> for Handler {
    type Response = Reply;
    type Error = hyper::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, request: Request<Incoming>) -> Self::Future {
        log::info!("Incoming request '{}'.", request.uri());
        let state = self.state.clone();
        Box::pin(async move {
            let pending = state
                .lock()
                .unwrap()
                .anticipated
                .get_mut(request.uri().path())
                .and_then(VecDeque::pop_front);

            let Some(pending) = pending else {
                log::warn!("Unexpected '{}'.", request.uri());
                state
                    .lock()
                    .unwrap()
                    .unexpected
                    .push(request.uri().to_string());
                return Ok(Response::builder()
                    .status(418)
                    .body(Full::new(Bytes::from_static(b"unexpected")))
                    .unwrap());
            };

            let (parts, _body) = request.into_parts();
            if pending.request_tx.send(Request::from_parts(parts, ())).is_err() {
                log::debug!("Nobody is inspecting the request.");
            }

            match pending.reply_rx.await {
                Ok(response) => Ok(response),
                Err(_) => {
                    log::warn!("Anticipated request was dropped without a response.");
                    Ok(Response::builder()
                        .status(StatusCode::INTERNAL_SERVER_ERROR)
                        .body(Full::new(Bytes::new()))
                        .unwrap())
                }
            }
        })
    }
}
