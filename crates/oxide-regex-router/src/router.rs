//! Main router implementation.

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, error, warn};

use crate::config::{DuplicateCaptures, RouterConfig};
use crate::error::Result;
use crate::error_log::{ErrorLog, TracingLog};
use crate::params::ParamsPool;
use crate::pattern::PathPattern;
use crate::request::{Method, Request};
use crate::response::Response;
use crate::table::{MatchResult, RouteTable};

/// A boxed async handler function.
pub type Handler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// Boxes an async function into a [`Handler`].
pub fn handler_fn<F, Fut>(f: F) -> Handler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req: Request| -> BoxFuture<'static, Response> { Box::pin(f(req)) })
}

/// A compiled route.
#[derive(Clone)]
pub struct Route {
    /// HTTP method.
    pub method: Method,
    /// Compiled path pattern.
    pub pattern: PathPattern,
    /// Request handler.
    pub handler: Handler,
}

impl Route {
    /// Compiles `template` into a new route.
    pub fn new<F, Fut>(method: Method, template: &str, handler: F) -> Result<Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        Ok(Self::from_pattern(
            method,
            PathPattern::new(template)?,
            handler_fn(handler),
        ))
    }

    /// Creates a route from an already-compiled pattern.
    pub fn from_pattern(method: Method, pattern: PathPattern, handler: Handler) -> Self {
        Self {
            method,
            pattern,
            handler,
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("template", &self.pattern.template())
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

/// Generates the per-method registration shorthands, each returning `$ret`.
macro_rules! method_routes {
    ($ret:ty; $($(#[$attr:meta])* $name:ident => $method:ident;)*) => {
        $(
            $(#[$attr])*
            pub fn $name<F, Fut>(self, template: &str, handler: F) -> $ret
            where
                F: Fn(Request) -> Fut + Send + Sync + 'static,
                Fut: Future<Output = Response> + Send + 'static,
            {
                self.route(Method::$method, template, handler)
            }
        )*
    };
}

/// Routes sharing a path prefix.
///
/// Templates are only compiled when the group is attached with [`Router::group`], so
/// registration errors surface there.
pub struct RouteGroup {
    /// Prefix prepended to every template in this group.
    prefix: String,
    /// Pending (method, full template, handler) entries.
    routes: Vec<(Method, String, Handler)>,
}

impl RouteGroup {
    /// Creates a new route group with the given prefix.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            routes: Vec::new(),
        }
    }

    /// Adds a route with any method.
    #[must_use]
    pub fn route<F, Fut>(mut self, method: Method, template: &str, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let full = format!("{}{}", self.prefix, template);
        self.routes.push((method, full, handler_fn(handler)));
        self
    }

    method_routes! {
        Self;
        /// Adds a GET route.
        #[must_use]
        get => Get;
        /// Adds a HEAD route.
        #[must_use]
        head => Head;
        /// Adds a POST route.
        #[must_use]
        post => Post;
        /// Adds a PUT route.
        #[must_use]
        put => Put;
        /// Adds a PATCH route.
        #[must_use]
        patch => Patch;
        /// Adds a DELETE route.
        #[must_use]
        delete => Delete;
        /// Adds a CONNECT route.
        #[must_use]
        connect => Connect;
        /// Adds an OPTIONS route.
        #[must_use]
        options => Options;
        /// Adds a TRACE route.
        #[must_use]
        trace => Trace;
    }
}

/// The main router for handling HTTP requests.
///
/// Build it once with the registration methods, then share it (it is `Send + Sync`)
/// across the workers serving requests. Serving only needs `&self`.
pub struct Router {
    /// Registered routes.
    table: RouteTable,
    /// Pool of parameter buffers for matched requests.
    pool: Arc<ParamsPool>,
    /// Called when nothing matches.
    not_found: Option<Handler>,
    /// Sink for recovered matching errors.
    error_log: Arc<dyn ErrorLog>,
    /// Policy for repeated capture names.
    duplicate_captures: DuplicateCaptures,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.table.len())
            .field("pool", &self.pool)
            .field("not_found", &self.not_found.is_some())
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Creates a new empty router with default settings.
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Creates a new empty router from `config`.
    pub fn with_config(config: RouterConfig) -> Self {
        let pool = ParamsPool::new(config.max_idle_buffers);
        pool.prewarm(config.prewarm_buffers);
        Self {
            table: RouteTable::new(),
            pool: Arc::new(pool),
            not_found: None,
            error_log: Arc::new(TracingLog),
            duplicate_captures: config.duplicate_captures,
        }
    }

    /// Compiles `template` and appends it to `method`'s routes.
    ///
    /// Fails without registering anything if the template is malformed.
    pub fn register(&mut self, method: Method, template: &str, handler: Handler) -> Result<()> {
        let pattern = PathPattern::with_policy(template, self.duplicate_captures)?;
        if !pattern.is_consistent() {
            warn!(
                %method,
                template,
                declared = pattern.captures().len(),
                groups = pattern.group_count(),
                "route declares a different number of captures than its pattern has groups; it will never match"
            );
        }
        debug!(%method, template, pattern = pattern.as_str(), "registered route");
        self.table.push(Route::from_pattern(method, pattern, handler));
        Ok(())
    }

    /// Adds a route with any method.
    pub fn route<F, Fut>(mut self, method: Method, template: &str, handler: F) -> Result<Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.register(method, template, handler_fn(handler))?;
        Ok(self)
    }

    method_routes! {
        Result<Self>;
        /// Adds a GET route.
        get => Get;
        /// Adds a HEAD route.
        head => Head;
        /// Adds a POST route.
        post => Post;
        /// Adds a PUT route.
        put => Put;
        /// Adds a PATCH route.
        patch => Patch;
        /// Adds a DELETE route.
        delete => Delete;
        /// Adds a CONNECT route.
        connect => Connect;
        /// Adds an OPTIONS route.
        options => Options;
        /// Adds a TRACE route.
        trace => Trace;
    }

    /// Registers every route of a group.
    pub fn group(mut self, group: RouteGroup) -> Result<Self> {
        for (method, template, handler) in group.routes {
            self.register(method, &template, handler)?;
        }
        Ok(self)
    }

    /// Sets the handler used when no route matches.
    #[must_use]
    pub fn not_found<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.not_found = Some(handler_fn(handler));
        self
    }

    /// Uses another router for requests this one cannot match.
    #[must_use]
    pub fn fallback(mut self, other: Router) -> Self {
        self.not_found = Some(other.into_handler());
        self
    }

    /// Sets the sink for errors recovered while matching.
    #[must_use]
    pub fn error_log(mut self, log: impl ErrorLog + 'static) -> Self {
        self.error_log = Arc::new(log);
        self
    }

    /// Routes registered for `method`, in registration order.
    pub fn routes(&self, method: Method) -> &[Route] {
        self.table.routes(method)
    }

    /// The parameter buffer pool.
    pub fn pool(&self) -> &Arc<ParamsPool> {
        &self.pool
    }

    /// Finds the first route for `method` that matches `path`.
    pub fn find(&self, method: Method, path: &str) -> MatchResult<'_> {
        self.table
            .find(method, path, &self.pool, self.error_log.as_ref())
    }

    /// Like [`Router::find`], for a method given as its wire token.
    ///
    /// Tokens the router does not serve never match.
    pub fn lookup(&self, method: &str, path: &str) -> MatchResult<'_> {
        match method.parse::<Method>() {
            Ok(method) => self.find(method, path),
            Err(_) => MatchResult::NoMatch,
        }
    }

    /// Routes a request target such as `/search?q=x` and runs the matching handler.
    pub fn serve<'a>(&'a self, method: Method, target: &str) -> BoxFuture<'a, Response> {
        self.handle(Request::from_target(method, target))
    }

    /// Handles an incoming request.
    ///
    /// The matched route's captures are placed in `request.params` for the handler.
    /// They go back to the pool once the handler is done with the request, whether it
    /// returned or panicked; a panic is answered with a 500.
    pub fn handle(&self, mut request: Request) -> BoxFuture<'_, Response> {
        Box::pin(async move {
            match self.find(request.method, &request.path) {
                MatchResult::Matched { route, params } => {
                    request.params = params;
                    let handler = Arc::clone(&route.handler);
                    let template = route.pattern.template();
                    let outcome = AssertUnwindSafe(async move { handler(request).await })
                        .catch_unwind()
                        .await;
                    outcome.unwrap_or_else(|_| {
                        error!(template, "handler panicked");
                        Response::internal_server_error()
                    })
                }
                MatchResult::NoMatch => match &self.not_found {
                    Some(not_found) => not_found(request).await,
                    None => Response::not_found(),
                },
            }
        })
    }

    /// Turns this router into a handler, e.g. to serve as another router's
    /// not-found fallback.
    pub fn into_handler(self) -> Handler {
        let router = Arc::new(self);
        Arc::new(move |req: Request| -> BoxFuture<'static, Response> {
            let router = Arc::clone(&router);
            Box::pin(async move { router.handle(req).await })
        })
    }
}
