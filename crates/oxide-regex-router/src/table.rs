//! Per-method route lists and the matching engine.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error_log::ErrorLog;
use crate::params::{Params, ParamsPool};
use crate::request::Method;
use crate::router::Route;

/// Outcome of looking up a request.
#[derive(Debug)]
pub enum MatchResult<'r> {
    /// A route matched; `params` holds its captures.
    Matched {
        /// The first route, in registration order, whose pattern matched.
        route: &'r Route,
        /// Captures for the handler. Returns to the pool when dropped.
        params: Params,
    },
    /// No route for this method matched the path.
    NoMatch,
}

impl MatchResult<'_> {
    /// Returns true for [`MatchResult::Matched`].
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

/// Routes grouped by method, each list kept in registration order.
///
/// Nothing is ever removed or deduplicated: when two routes accept the same path, the
/// one registered first wins every time.
#[derive(Default)]
pub struct RouteTable {
    routes: HashMap<Method, Vec<Route>>,
}

impl RouteTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route to its method's list.
    pub fn push(&mut self, route: Route) {
        self.routes.entry(route.method).or_default().push(route);
    }

    /// Routes registered for `method`, in registration order.
    pub fn routes(&self, method: Method) -> &[Route] {
        self.routes.get(&method).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of routes across all methods.
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    /// Returns true if no route has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scans `method`'s routes in order and returns the first match.
    ///
    /// A route whose capture count disagrees with its groups is reported to `log` and
    /// treated as not matching; the scan carries on with the next route.
    pub fn find<'r>(
        &'r self,
        method: Method,
        path: &str,
        pool: &Arc<ParamsPool>,
        log: &dyn ErrorLog,
    ) -> MatchResult<'r> {
        for route in self.routes(method) {
            match route.pattern.match_path(path, pool) {
                Ok(Some(params)) => return MatchResult::Matched { route, params },
                Ok(None) => {}
                Err(e) => log.report(&e),
            }
        }
        MatchResult::NoMatch
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::RouterError;
    use crate::pattern::{Capture, PathPattern};
    use crate::response::Response;
    use crate::router::{handler_fn, Handler};

    fn handler(tag: &'static str) -> Handler {
        handler_fn(move |_req| async move { Response::text(tag) })
    }

    fn route(method: Method, template: &str, tag: &'static str) -> Route {
        Route::from_pattern(method, PathPattern::new(template).unwrap(), handler(tag))
    }

    fn no_log() -> impl ErrorLog {
        |e: &RouterError| {
            panic!("unexpected report: {e}");
        }
    }

    #[test]
    fn test_first_registered_wins() {
        let mut table = RouteTable::new();
        table.push(route(Method::Get, "/a", "first"));
        table.push(route(Method::Get, "/a", "second"));
        table.push(route(Method::Get, "/:name", "third"));
        let pool = Arc::new(ParamsPool::new(4));

        match table.find(Method::Get, "/a", &pool, &no_log()) {
            MatchResult::Matched { route, .. } => {
                assert!(std::ptr::eq(route, &table.routes(Method::Get)[0]));
            }
            MatchResult::NoMatch => panic!("expected a match"),
        }
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_method_isolation() {
        let mut table = RouteTable::new();
        table.push(route(Method::Get, "/items", "get"));
        let pool = Arc::new(ParamsPool::new(4));

        assert!(table.find(Method::Get, "/items", &pool, &no_log()).is_match());
        assert!(!table.find(Method::Post, "/items", &pool, &no_log()).is_match());
        assert!(table.routes(Method::Post).is_empty());
    }

    #[test]
    fn test_mismatch_is_logged_and_skipped() {
        let broken = PathPattern::from_parts(
            "/blog/:year",
            "^/blog/([^/]+)/([^/]+)$",
            vec![Capture::Named("year".into())],
        )
        .unwrap();

        let mut table = RouteTable::new();
        table.push(Route::from_pattern(Method::Get, broken, handler("broken")));
        table.push(route(Method::Get, "/blog/:year/:month", "ok"));
        let pool = Arc::new(ParamsPool::new(4));

        let reports = Mutex::new(Vec::new());
        let log = |e: &RouterError| reports.lock().unwrap().push(e.to_string());

        match table.find(Method::Get, "/blog/2018/01", &pool, &log) {
            MatchResult::Matched { route, params } => {
                assert_eq!(route.pattern.template(), "/blog/:year/:month");
                assert_eq!(params.get("month"), Some("01"));
            }
            MatchResult::NoMatch => panic!("expected the second route to match"),
        }
        let reports = reports.into_inner().unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].starts_with("parameter mismatch with regexp"));
    }
}
