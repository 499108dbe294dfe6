//! Ready-made filters.

use std::time::Instant;

use tracing::info;

use crate::chain::{self, FilterFn, Next};
use crate::request::{Request, Routable};

/// Filter that adds CORS response headers for cross-origin requests.
///
/// Requests without an `Origin` header pass through untouched. The
/// preflight request headers are echoed back as the allowed methods and
/// headers.
pub fn allow_origin<Res>(origin: impl Into<String>) -> FilterFn<Request, Res>
where
    Res: Send + 'static,
{
    let origin = origin.into();
    chain::filter(move |mut req: Request, next: Next<Request, Res>| {
        if req.get_header("Origin").is_some() {
            let methods = req
                .get_header("Access-Control-Request-Method")
                .unwrap_or_default()
                .to_string();
            let headers = req
                .get_header("Access-Control-Request-Headers")
                .unwrap_or_default()
                .to_string();

            req.set_header("Access-Control-Allow-Origin", origin.clone());
            req.set_header("Access-Control-Allow-Credentials", "true");
            req.set_header("Access-Control-Allow-Methods", methods);
            req.set_header("Access-Control-Allow-Headers", headers);
        }
        next.run(req)
    })
}

/// Filter that logs every request passing through it and how long the
/// rest of the chain took.
pub fn trace_requests<Req, Res>() -> FilterFn<Req, Res>
where
    Req: Routable + Send + 'static,
    Res: Send + 'static,
{
    chain::filter(|req: Req, next: Next<Req, Res>| {
        let method = req.method();
        let path = req.path().to_string();
        async move {
            let started = Instant::now();
            info!(%method, path = %path, "--> request");
            let res = next.run(req).await;
            info!(
                %method,
                path = %path,
                elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
                "<-- done"
            );
            res
        }
    })
}
