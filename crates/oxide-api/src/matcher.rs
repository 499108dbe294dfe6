//! Resolving split request paths against the registration table.

use tracing::trace;

use crate::path::{request_parts, Segment};
use crate::request::{Method, Params};
use crate::table::{Registration, Table};
use crate::version;

impl<Req, Res> Table<Req, Res> {
    /// Finds the id of the route answering this request, if any.
    pub fn match_route(&self, method: Method, version: &str, parts: &[&str]) -> Option<&str> {
        let parts = request_parts(parts);
        let candidates: Vec<&Registration<Req, Res>> = self
            .entries()
            .iter()
            .filter(|r| r.is_route() && r.accepts(method) && r.pattern.matches(parts))
            .collect();

        let winner = version::resolve(&candidates, version).and_then(Registration::id);
        trace!(
            %method,
            version,
            candidates = candidates.len(),
            route = ?winner,
            "matched route"
        );
        winner
    }

    /// Finds every filter that runs for this request, in declaration order.
    pub fn match_filters(
        &self,
        method: Method,
        version: &str,
        parts: &[&str],
    ) -> Vec<&Registration<Req, Res>> {
        let parts = request_parts(parts);
        self.entries()
            .iter()
            .filter(|r| {
                !r.is_route()
                    && r.accepts(method)
                    && version::applies(r.version.as_deref(), version)
                    && r.pattern.matches(parts)
            })
            .collect()
    }

    /// Captures the path parameters of route `id` from `parts`.
    ///
    /// The route is expected to match `parts`. Returns `None` for an
    /// unknown id.
    pub fn extract_matches(&self, id: &str, parts: &[&str]) -> Option<Params> {
        let route = self.lookup(id)?;
        let parts = request_parts(parts);
        let mut params = Params::new();

        for (i, segment) in route.pattern.segments().iter().enumerate() {
            match segment {
                Segment::Literal(_) => {}
                Segment::Named(name) => {
                    if let Some(part) = parts.get(i) {
                        params.insert(name.as_str(), *part);
                    }
                }
                Segment::Tail(name) => {
                    let rest = parts.get(i..).unwrap_or_default();
                    params.insert(name.as_str(), format!("/{}", rest.join("/")));
                }
            }
        }

        Some(params)
    }
}
