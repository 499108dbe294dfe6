//! Filter chains: ordered filters wrapped around a terminal handler.

use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

/// A boxed async request handler.
pub type Handler<Req, Res> = Arc<dyn Fn(Req) -> BoxFuture<'static, Res> + Send + Sync>;

/// A boxed async filter, receiving the request and the rest of the chain.
pub type FilterFn<Req, Res> =
    Arc<dyn Fn(Req, Next<Req, Res>) -> BoxFuture<'static, Res> + Send + Sync>;

/// Boxes a handler function.
pub fn handler<Req, Res, F, Fut>(f: F) -> Handler<Req, Res>
where
    F: Fn(Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
{
    Arc::new(move |req| f(req).boxed())
}

/// Boxes a filter function.
pub fn filter<Req, Res, F, Fut>(f: F) -> FilterFn<Req, Res>
where
    F: Fn(Req, Next<Req, Res>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
{
    Arc::new(move |req, next| f(req, next).boxed())
}

/// The remainder of a chain, as seen from inside a filter.
///
/// Running it consumes it: a filter that wants to short-circuit simply
/// returns its own response without calling [`Next::run`].
///
/// # Example
///
/// ```
/// use oxide_api::{filter, FilterFn, Next};
///
/// let guard: FilterFn<String, String> = filter(|name: String, next: Next<String, String>| async move {
///     if name.is_empty() {
///         return "rejected".to_string();
///     }
///     next.run(name).await
/// });
/// ```
pub struct Next<Req, Res> {
    link: Handler<Req, Res>,
}

impl<Req, Res> Next<Req, Res> {
    /// Invokes the next filter, or the handler at the end of the chain.
    pub fn run(self, req: Req) -> BoxFuture<'static, Res> {
        (self.link)(req)
    }
}

/// A composed callable: the matching filters in declaration order around
/// the resolved handler.
pub struct Chain<Req, Res> {
    entry: Handler<Req, Res>,
    len: usize,
}

impl<Req, Res> Clone for Chain<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            entry: Arc::clone(&self.entry),
            len: self.len,
        }
    }
}

impl<Req, Res> std::fmt::Debug for Chain<Req, Res> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain").field("filters", &self.len).finish()
    }
}

impl<Req, Res> Chain<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    /// Folds `filters` right to left around `handler`.
    ///
    /// The first filter becomes the outermost call and the handler the
    /// innermost one.
    pub fn compose(filters: &[FilterFn<Req, Res>], handler: Handler<Req, Res>) -> Self {
        let entry = filters.iter().rev().fold(handler, |inner, outer| {
            let outer = Arc::clone(outer);
            Arc::new(move |req: Req| {
                let next = Next {
                    link: Arc::clone(&inner),
                };
                outer(req, next)
            }) as Handler<Req, Res>
        });

        Self {
            entry,
            len: filters.len(),
        }
    }

    /// Runs the chain for one request.
    pub fn call(&self, req: Req) -> BoxFuture<'static, Res> {
        (self.entry)(req)
    }

    /// Number of filters in front of the handler.
    pub fn filter_count(&self) -> usize {
        self.len
    }
}
