#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use oxide_regex_router::{MatchResult, Params, Request, Response, Router, RouterError};

/// Handler that answers with a fixed body.
pub async fn ok(_req: Request) -> Response {
    Response::text("ok")
}

/// Handler that echoes captures as `name=value` pairs (sorted) and wildcards.
pub async fn echo(req: Request) -> Response {
    let mut named: Vec<String> = req.params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    named.sort();
    Response::text(format!("{} | {}", named.join(","), req.wildcards().join(",")))
}

pub fn body(res: &Response) -> String {
    res.body_string()
        .unwrap_or_else(|| panic!("non-UTF-8 body: {:?}", res.body))
}

/// Unwraps a match, panicking with the lookup on a miss.
pub fn matched(result: MatchResult<'_>, what: &str) -> Params {
    match result {
        MatchResult::Matched { params, .. } => params,
        MatchResult::NoMatch => panic!("Expected {what} to match"),
    }
}

/// An error log that keeps every report for inspection.
#[derive(Clone, Default)]
pub struct Reports(Arc<Mutex<Vec<String>>>);

impl Reports {
    pub fn attach(&self, router: Router) -> Router {
        let sink = Arc::clone(&self.0);
        router.error_log(move |e: &RouterError| sink.lock().unwrap().push(e.to_string()))
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}
