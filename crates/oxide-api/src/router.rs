//! Router configuration and request resolution.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;

use futures::future::BoxFuture;
use tracing::{trace, warn};

use crate::chain::{self, Chain, FilterFn, Handler, Next};
use crate::error::{Result, RouterError};
use crate::path::{split_parts_lenient, Pattern, Segment};
use crate::request::{Method, Params, Routable};
use crate::table::{Registration, Table};

/// A route declaration.
///
/// Without an explicit id the route is identified by its full path, e.g.
/// `/api/users/:id`. Without methods it answers GET.
pub struct Route<Req, Res> {
    path: String,
    id: Option<String>,
    methods: BTreeSet<Method>,
    version: Option<String>,
    handler: Handler<Req, Res>,
}

impl<Req, Res> Route<Req, Res> {
    /// Creates a new route.
    pub fn new<F, Fut>(path: &str, handler: F) -> Self
    where
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Res> + Send + 'static,
    {
        Self {
            path: path.to_string(),
            id: None,
            methods: BTreeSet::new(),
            version: None,
            handler: chain::handler(handler),
        }
    }

    /// Sets the route id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Adds a method the route answers.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.methods.insert(method);
        self
    }

    /// Adds several methods the route answers.
    #[must_use]
    pub fn methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods.extend(methods);
        self
    }

    /// Pins the route to one API version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// A filter declaration.
///
/// Without methods the filter runs for every method.
pub struct Filter<Req, Res> {
    path: String,
    methods: BTreeSet<Method>,
    version: Option<String>,
    filter: FilterFn<Req, Res>,
}

impl<Req, Res> Filter<Req, Res> {
    /// Creates a new filter.
    pub fn new<F, Fut>(path: &str, filter: F) -> Self
    where
        F: Fn(Req, Next<Req, Res>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Res> + Send + 'static,
    {
        Self::boxed(path, chain::filter(filter))
    }

    /// Creates a filter from an already boxed filter function.
    pub fn boxed(path: &str, filter: FilterFn<Req, Res>) -> Self {
        Self {
            path: path.to_string(),
            methods: BTreeSet::new(),
            version: None,
            filter,
        }
    }

    /// Adds a method the filter runs for.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.methods.insert(method);
        self
    }

    /// Adds several methods the filter runs for.
    #[must_use]
    pub fn methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods.extend(methods);
        self
    }

    /// Restricts the filter to one API version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

struct Registry<Req, Res> {
    table: Table<Req, Res>,
    error: Option<RouterError>,
}

impl<Req, Res> Registry<Req, Res> {
    fn fail(&mut self, error: RouterError) {
        warn!(%error, "router configuration failed");
        self.error.get_or_insert(error);
    }
}

/// A configuration scope: the root of the router, a group or a version.
///
/// Every path declared in a scope is prefixed with the scope's path, and
/// declarations without their own version take the scope's version.
/// The first error stops all further registration and is returned by
/// [`Router::configure`].
pub struct Scope<'r, Req, Res> {
    registry: &'r mut Registry<Req, Res>,
    prefix: Pattern,
    version: Option<String>,
}

impl<Req, Res> Scope<'_, Req, Res> {
    /// Returns a scope whose declarations default to `version`.
    ///
    /// ```
    /// # use oxide_api::Router;
    /// let router = Router::<String, String>::configure(|api| {
    ///     api.version("a.1.0").route_id("v1:users", "/users", |name| async move { name });
    /// })
    /// .unwrap();
    /// assert_eq!(router.match_route(oxide_api::Method::Get, "a.1.0", &["users"]), Some("v1:users"));
    /// ```
    pub fn version(&mut self, version: impl Into<String>) -> Scope<'_, Req, Res> {
        Scope {
            registry: &mut *self.registry,
            prefix: self.prefix.clone(),
            version: Some(version.into()),
        }
    }

    /// Declares a group: everything inside `configure` is prefixed with `path`.
    ///
    /// An empty `path` or `/` adds no prefix.
    pub fn group<F>(&mut self, path: &str, configure: F) -> &mut Self
    where
        F: FnOnce(&mut Scope<'_, Req, Res>),
    {
        if self.registry.error.is_some() {
            return self;
        }
        let prefix = match Pattern::compile(path).and_then(|p| Pattern::join(&self.prefix, &p)) {
            Ok(prefix) => prefix,
            Err(error) => {
                self.registry.fail(error);
                return self;
            }
        };

        let mut scope = Scope {
            registry: &mut *self.registry,
            prefix,
            version: self.version.clone(),
        };
        configure(&mut scope);
        self
    }

    /// Adds a GET route identified by its path.
    pub fn route<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Res> + Send + 'static,
    {
        self.add(Route::new(path, handler))
    }

    /// Adds a GET route with an explicit id.
    pub fn route_id<F, Fut>(&mut self, id: &str, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Res> + Send + 'static,
    {
        self.add(Route::new(path, handler).id(id))
    }

    /// Adds a GET route.
    pub fn get<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Res> + Send + 'static,
    {
        self.add(Route::new(path, handler).method(Method::Get))
    }

    /// Adds a POST route.
    pub fn post<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Res> + Send + 'static,
    {
        self.add(Route::new(path, handler).method(Method::Post))
    }

    /// Adds a PUT route.
    pub fn put<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Res> + Send + 'static,
    {
        self.add(Route::new(path, handler).method(Method::Put))
    }

    /// Adds a PATCH route.
    pub fn patch<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Res> + Send + 'static,
    {
        self.add(Route::new(path, handler).method(Method::Patch))
    }

    /// Adds a DELETE route.
    pub fn delete<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Res> + Send + 'static,
    {
        self.add(Route::new(path, handler).method(Method::Delete))
    }

    /// Adds a fully specified route.
    pub fn add(&mut self, route: Route<Req, Res>) -> &mut Self {
        if self.registry.error.is_some() {
            return self;
        }
        let pattern = match self.resolve(&route.path) {
            Ok(pattern) => pattern,
            Err(error) => {
                self.registry.fail(error);
                return self;
            }
        };

        let id = route.id.unwrap_or_else(|| pattern.canonical());
        let version = route.version.or_else(|| self.version.clone());

        let registration =
            Registration::route(id, pattern, route.methods, version, route.handler);
        if let Err(error) = self.registry.table.register(registration) {
            self.registry.fail(error);
        }
        self
    }

    /// Adds a filter running for every method.
    pub fn filter<F, Fut>(&mut self, path: &str, filter: F) -> &mut Self
    where
        F: Fn(Req, Next<Req, Res>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Res> + Send + 'static,
    {
        self.add_filter(Filter::new(path, filter))
    }

    /// Adds a fully specified filter.
    pub fn add_filter(&mut self, filter: Filter<Req, Res>) -> &mut Self {
        if self.registry.error.is_some() {
            return self;
        }
        let pattern = match self.resolve(&filter.path) {
            Ok(pattern) => pattern,
            Err(error) => {
                self.registry.fail(error);
                return self;
            }
        };

        let version = filter.version.or_else(|| self.version.clone());

        let registration = Registration::filter(pattern, filter.methods, version, filter.filter);
        if let Err(error) = self.registry.table.register(registration) {
            self.registry.fail(error);
        }
        self
    }

    fn resolve(&self, path: &str) -> Result<Pattern> {
        Pattern::join(&self.prefix, &Pattern::compile(path)?)
    }
}

/// A configured, immutable router.
///
/// Built once with [`Router::configure`], then shared freely: every lookup
/// takes `&self`.
pub struct Router<Req, Res> {
    table: Table<Req, Res>,
}

impl<Req, Res> std::fmt::Debug for Router<Req, Res> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("registrations", &self.table.entries())
            .finish()
    }
}

impl<Req, Res> Router<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    /// Runs a configuration pass and freezes the result.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_api::{Method, Router};
    ///
    /// let router = Router::<String, String>::configure(|api| {
    ///     api.filter("/::path", |req, next| next.run(req));
    ///     api.group("/api", |api| {
    ///         api.route_id("users", "/users/:id", |req| async move { req });
    ///     });
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(router.match_route(Method::Get, "current", &["api", "users", "7"]), Some("users"));
    /// ```
    pub fn configure<F>(configure: F) -> Result<Self>
    where
        F: FnOnce(&mut Scope<'_, Req, Res>),
    {
        let mut registry = Registry {
            table: Table::new(),
            error: None,
        };
        let mut root = Scope {
            registry: &mut registry,
            prefix: Pattern::default(),
            version: None,
        };
        configure(&mut root);

        match registry.error {
            Some(error) => Err(error),
            None => Ok(Self {
                table: registry.table,
            }),
        }
    }

    /// Finds the id of the route answering `method`, `version` and the split path.
    pub fn match_route(&self, method: Method, version: &str, parts: &[&str]) -> Option<&str> {
        self.table.match_route(method, version, parts)
    }

    /// Finds the filters running for a request, in execution order.
    pub fn match_filters(
        &self,
        method: Method,
        version: &str,
        parts: &[&str],
    ) -> Vec<&FilterFn<Req, Res>> {
        self.table
            .match_filters(method, version, parts)
            .into_iter()
            .filter_map(Registration::filter_fn)
            .collect()
    }

    /// Captures the path parameters of route `id`.
    pub fn extract_matches(&self, id: &str, parts: &[&str]) -> Option<Params> {
        self.table.extract_matches(id, parts)
    }

    /// Builds the filter chain for a request; `None` means no route matched.
    pub fn create_chain(
        &self,
        method: Method,
        version: &str,
        parts: &[&str],
    ) -> Option<Chain<Req, Res>> {
        let id = self.match_route(method, version, parts)?;
        self.chain_for(id, method, version, parts)
    }

    fn chain_for(
        &self,
        id: &str,
        method: Method,
        version: &str,
        parts: &[&str],
    ) -> Option<Chain<Req, Res>> {
        let handler = self.handler(id)?;
        let filters: Vec<FilterFn<Req, Res>> = self
            .match_filters(method, version, parts)
            .into_iter()
            .cloned()
            .collect();

        trace!(id, filters = filters.len(), "composed chain");
        Some(Chain::compose(&filters, handler.clone()))
    }

    /// Returns the handler registered under `id`.
    pub fn handler(&self, id: &str) -> Option<&Handler<Req, Res>> {
        self.table.lookup(id).and_then(Registration::handler)
    }

    /// Route ids in declaration order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.table.identifiers()
    }

    /// Builds the path of route `id` from parameter values.
    ///
    /// Returns `Ok(None)` for an unknown id. Tail values are expected to
    /// start with a slash, as [`Router::extract_matches`] produces them.
    pub fn link_to(&self, id: &str, params: &HashMap<String, String>) -> Result<Option<String>> {
        let Some(route) = self.table.lookup(id) else {
            return Ok(None);
        };

        let missing = |name: &str| RouterError::MissingParameter {
            id: id.to_string(),
            name: name.to_string(),
        };

        let mut path = String::new();
        for segment in route.pattern.segments() {
            match segment {
                Segment::Literal(text) => {
                    path.push('/');
                    path.push_str(text);
                }
                Segment::Named(name) => {
                    path.push('/');
                    path.push_str(params.get(name).ok_or_else(|| missing(name))?);
                }
                Segment::Tail(name) => {
                    let value = params.get(name).ok_or_else(|| missing(name))?;
                    let value = value.strip_prefix('/').unwrap_or(value);
                    if !value.is_empty() {
                        path.push('/');
                        path.push_str(value);
                    }
                }
            }
        }

        if path.is_empty() {
            path.push('/');
        }
        Ok(Some(path))
    }

    /// Routes a request end to end and runs its chain.
    ///
    /// The path is split leniently, the captured parameters are handed to
    /// the request, and `None` is returned when no route matches.
    pub fn dispatch(&self, version: &str, mut request: Req) -> Option<BoxFuture<'static, Res>>
    where
        Req: Routable,
    {
        let method = request.method();
        let path = request.path().to_string();
        let parts = split_parts_lenient(&path);

        let Some(id) = self.match_route(method, version, &parts) else {
            trace!(%method, path = %path, version, "no route");
            return None;
        };
        let chain = self.chain_for(id, method, version, &parts)?;
        request.set_params(self.extract_matches(id, &parts).unwrap_or_default());
        Some(chain.call(request))
    }
}
