//! The registration table behind a configured router.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::chain::{FilterFn, Handler};
use crate::error::{Result, RouterError};
use crate::path::Pattern;
use crate::request::Method;

/// What a registration does once it matches.
pub enum Kind<Req, Res> {
    /// A route: exactly one wins per request.
    Route {
        /// Unique route id.
        id: String,
        /// Terminal handler.
        handler: Handler<Req, Res>,
    },
    /// A filter: every matching one runs.
    Filter {
        /// The filter function.
        filter: FilterFn<Req, Res>,
    },
}

/// A route or filter with its fully resolved pattern, methods and version.
pub struct Registration<Req, Res> {
    /// Pattern including every group prefix.
    pub pattern: Pattern,
    /// Methods this registration answers. Left empty, the table fills in
    /// GET for routes and every method for filters.
    pub methods: BTreeSet<Method>,
    /// Version tag; `None` matches any requested version.
    pub version: Option<String>,
    /// Position in declaration order, assigned by the table.
    pub order: usize,
    /// Route or filter specifics.
    pub kind: Kind<Req, Res>,
}

impl<Req, Res> Registration<Req, Res> {
    /// Creates a route registration.
    pub fn route(
        id: impl Into<String>,
        pattern: Pattern,
        methods: BTreeSet<Method>,
        version: Option<String>,
        handler: Handler<Req, Res>,
    ) -> Self {
        Self {
            pattern,
            methods,
            version,
            order: 0,
            kind: Kind::Route {
                id: id.into(),
                handler,
            },
        }
    }

    /// Creates a filter registration.
    pub fn filter(
        pattern: Pattern,
        methods: BTreeSet<Method>,
        version: Option<String>,
        filter: FilterFn<Req, Res>,
    ) -> Self {
        Self {
            pattern,
            methods,
            version,
            order: 0,
            kind: Kind::Filter { filter },
        }
    }

    /// The route id, or `None` for filters.
    pub fn id(&self) -> Option<&str> {
        match &self.kind {
            Kind::Route { id, .. } => Some(id),
            Kind::Filter { .. } => None,
        }
    }

    /// The route handler, or `None` for filters.
    pub fn handler(&self) -> Option<&Handler<Req, Res>> {
        match &self.kind {
            Kind::Route { handler, .. } => Some(handler),
            Kind::Filter { .. } => None,
        }
    }

    /// The filter function, or `None` for routes.
    pub fn filter_fn(&self) -> Option<&FilterFn<Req, Res>> {
        match &self.kind {
            Kind::Route { .. } => None,
            Kind::Filter { filter } => Some(filter),
        }
    }

    /// Returns true for routes.
    pub fn is_route(&self) -> bool {
        matches!(self.kind, Kind::Route { .. })
    }

    /// Returns true when the registration answers `method`.
    pub fn accepts(&self, method: Method) -> bool {
        self.methods.contains(&method)
    }
}

impl<Req, Res> std::fmt::Debug for Registration<Req, Res> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = f.debug_struct("Registration");
        if let Some(id) = self.id() {
            out.field("id", &id);
        }
        out.field("pattern", &self.pattern.canonical())
            .field("methods", &self.methods)
            .field("version", &self.version)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// Key under which two routes would answer the same requests.
type ShapeKey = (String, Option<String>, Method);

/// All registrations of a router, in declaration order.
pub struct Table<Req, Res> {
    entries: Vec<Registration<Req, Res>>,
    ids: HashMap<String, usize>,
    shapes: HashMap<ShapeKey, String>,
}

impl<Req, Res> Default for Table<Req, Res> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Res> Table<Req, Res> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            ids: HashMap::new(),
            shapes: HashMap::new(),
        }
    }

    /// Adds a registration.
    ///
    /// Routes are rejected when their id is taken, or when another route
    /// with the same pattern shape and version already answers one of
    /// their methods. Nothing is stored when an error is returned.
    pub fn register(&mut self, mut registration: Registration<Req, Res>) -> Result<()> {
        registration.order = self.entries.len();
        if registration.methods.is_empty() {
            registration.methods = if registration.is_route() {
                BTreeSet::from([Method::Get])
            } else {
                Method::ALL.into_iter().collect()
            };
        }

        if let Some(id) = registration.id() {
            if self.ids.contains_key(id) {
                return Err(RouterError::DuplicateId(id.to_string()));
            }

            let shape = registration.pattern.shape();
            for method in &registration.methods {
                let key = (shape.clone(), registration.version.clone(), *method);
                if let Some(existing) = self.shapes.get(&key) {
                    return Err(RouterError::DuplicateRoute {
                        id: id.to_string(),
                        existing: existing.clone(),
                        method: *method,
                        path: registration.pattern.canonical(),
                        version: registration.version.clone(),
                    });
                }
            }

            for method in &registration.methods {
                let key = (shape.clone(), registration.version.clone(), *method);
                self.shapes.insert(key, id.to_string());
            }
            self.ids.insert(id.to_string(), registration.order);

            debug!(
                id,
                pattern = %registration.pattern,
                methods = ?registration.methods,
                version = ?registration.version,
                order = registration.order,
                "registered route"
            );
        } else {
            debug!(
                pattern = %registration.pattern,
                methods = ?registration.methods,
                version = ?registration.version,
                order = registration.order,
                "registered filter"
            );
        }

        self.entries.push(registration);
        Ok(())
    }

    /// Looks up a route by id.
    pub fn lookup(&self, id: &str) -> Option<&Registration<Req, Res>> {
        self.ids.get(id).map(|&index| &self.entries[index])
    }

    /// Route ids in declaration order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(Registration::id)
    }

    /// Every registration in declaration order.
    pub fn entries(&self) -> &[Registration<Req, Res>] {
        &self.entries
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{filter, handler};

    type TestTable = Table<String, String>;

    fn route(id: &str, path: &str, methods: &[Method], version: Option<&str>) -> Registration<String, String> {
        Registration::route(
            id,
            Pattern::compile(path).unwrap(),
            methods.iter().copied().collect(),
            version.map(str::to_string),
            handler(|name: String| async move { name }),
        )
    }

    #[test]
    fn test_duplicate_id() {
        let mut table = TestTable::new();
        table.register(route("id", "/path/to/resource", &[Method::Get], None)).unwrap();
        let err = table
            .register(route("id", "/path/to/objects", &[Method::Get], None))
            .unwrap_err();
        assert_eq!(err, RouterError::DuplicateId("id".to_string()));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_same_shape_conflicts() {
        let mut table = TestTable::new();
        table.register(route("a", "/users/:id", &[Method::Get], None)).unwrap();
        let err = table
            .register(route("b", "/users/:name", &[Method::Get, Method::Post], None))
            .unwrap_err();
        assert!(matches!(err, RouterError::DuplicateRoute { method: Method::Get, .. }));
    }

    #[test]
    fn test_same_shape_different_method_or_version() {
        let mut table = TestTable::new();
        table.register(route("fetch", "/users", &[Method::Get], None)).unwrap();
        table.register(route("create", "/users", &[Method::Post], None)).unwrap();
        table.register(route("v1", "/users", &[Method::Get], Some("a.1.0"))).unwrap();
        assert_eq!(table.identifiers().collect::<Vec<_>>(), ["fetch", "create", "v1"]);
    }

    #[test]
    fn test_empty_method_sets_get_defaults() {
        let mut table = TestTable::new();
        table.register(route("users", "/users", &[], None)).unwrap();
        table
            .register(Registration::filter(
                Pattern::compile("/::path").unwrap(),
                BTreeSet::new(),
                None,
                filter(|req: String, next: crate::chain::Next<String, String>| next.run(req)),
            ))
            .unwrap();

        let users = table.lookup("users").unwrap();
        assert_eq!(users.methods, BTreeSet::from([Method::Get]));
        assert_eq!(table.match_route(Method::Get, "current", &["users"]), Some("users"));
        assert_eq!(table.entries()[1].methods.len(), Method::ALL.len());

        let err = table.register(route("other", "/users", &[Method::Get], None)).unwrap_err();
        assert!(matches!(err, RouterError::DuplicateRoute { .. }));
    }

    #[test]
    fn test_filters_keep_order() {
        let mut table = TestTable::new();
        for path in ["/::path", "/api/::path"] {
            table
                .register(Registration::filter(
                    Pattern::compile(path).unwrap(),
                    Method::ALL.into_iter().collect(),
                    None,
                    filter(|req: String, next: crate::chain::Next<String, String>| next.run(req)),
                ))
                .unwrap();
        }
        let orders: Vec<usize> = table.entries().iter().map(|r| r.order).collect();
        assert_eq!(orders, [0, 1]);
        assert!(table.lookup("/::path").is_none());
    }
}
