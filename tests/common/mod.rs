// tests/common/mod.rs
#![allow(dead_code)]

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;

/// A target that answers every request with `status` after `delay`.
pub async fn spawn_target(status: u16, delay: Duration) -> String {
    let make_svc = make_service_fn(move |_conn| async move {
        Ok::<_, Infallible>(service_fn(move |_req: Request<Body>| async move {
            sleep(delay).await;
            let mut response = Response::new(Body::from("target"));
            *response.status_mut() = StatusCode::from_u16(status).unwrap();
            Ok::<_, Infallible>(response)
        }))
    });

    let addr: SocketAddr = ([127, 0, 0, 1], 0).into();
    let server = Server::bind(&addr).serve(make_svc);
    let local = server.local_addr();
    tokio::spawn(async move {
        let _ = server.await;
    });

    format!("http://{}/", local)
}

/// A target that accepts connections and never writes a byte.
pub async fn spawn_hanging_target() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let local = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    format!("http://{}/", local)
}

/// An address nothing listens on: connecting is refused.
pub async fn refused_target() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let local = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", local)
}
