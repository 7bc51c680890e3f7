//! demos/mock_target.rs
//! A flaky target for exercising the status dashboard by hand.
//! Run: cargo run --example mock_target -- <port> [name]
//!
//! Env: BASE_DELAY_MS, JITTER_MS, FAIL_PCT (answers 503), HANG_PCT (never answers).

use hyper::{
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server, StatusCode,
};
use rand::Rng;
use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::time::sleep;

#[derive(Clone)]
struct TargetState {
    name: String,
    req_counter: Arc<AtomicU64>,
    base_delay: u64,
    jitter_ms: u64,
    fail_pct: f64,
    hang_pct: f64,
}

fn roll(pct: f64) -> bool {
    pct > 0.0 && rand::thread_rng().gen_bool((pct / 100.0).min(1.0))
}

async fn handle(req: Request<Body>, state: TargetState) -> Result<Response<Body>, Infallible> {
    let n = state.req_counter.fetch_add(1, Ordering::SeqCst) + 1;

    if roll(state.hang_pct) {
        println!("[{}] #{} {} -> hanging", state.name, n, req.uri().path());
        std::future::pending::<()>().await;
    }

    let delay = state.base_delay + rand::thread_rng().gen_range(0..=state.jitter_ms);
    if delay > 0 {
        sleep(Duration::from_millis(delay)).await;
    }

    let status = if roll(state.fail_pct) {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    println!(
        "[{}] #{} {} -> {} after {}ms",
        state.name,
        n,
        req.uri().path(),
        status.as_u16(),
        delay
    );

    let mut response = Response::new(Body::from(format!("{} {}", state.name, status)));
    *response.status_mut() = status;
    Ok(response)
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let port: u16 = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "8001".into())
        .parse()?;
    let name = std::env::args()
        .nth(2)
        .unwrap_or_else(|| format!("target-{port}"));

    let state = TargetState {
        name: name.clone(),
        req_counter: Arc::new(AtomicU64::new(0)),
        base_delay: env_or("BASE_DELAY_MS", 0),
        jitter_ms: env_or("JITTER_MS", 0),
        fail_pct: env_or("FAIL_PCT", 0.0),
        hang_pct: env_or("HANG_PCT", 0.0),
    };

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!(
        "Mock target '{}' on http://{}  [delay={}ms±{} fail={}% hang={}%]",
        name, addr, state.base_delay, state.jitter_ms, state.fail_pct, state.hang_pct
    );

    let make_svc = make_service_fn(move |_conn| {
        let st = state.clone();
        async move { Ok::<_, Infallible>(service_fn(move |req| handle(req, st.clone()))) }
    });

    Server::bind(&addr).serve(make_svc).await?;
    Ok(())
}
