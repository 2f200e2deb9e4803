//! Tests for request dispatch: handler invocation, fallbacks and buffer release.

mod common;
use common::*;

use std::sync::Arc;

use oxide_regex_router::{Method, Request, Response, RouteGroup, Router, RouterConfig};

async fn blog(req: Request) -> Response {
    let year = req.param("year").unwrap_or_default();
    let month = req.param("month").unwrap_or_default();
    Response::text(format!("Render: {year}/{month}"))
}

async fn explode(_req: Request) -> Response {
    panic!("handler failure");
}

#[tokio::test]
async fn handler_reads_params() {
    let router = Router::new()
        .get(r"/blog/{year:\d{4}}/{month:(?:\d{2})}", blog)
        .unwrap();

    let res = router.handle(Request::get("/blog/2020/10")).await;
    assert_eq!(res.status, 200);
    assert_eq!(body(&res), "Render: 2020/10");

    let res = router.handle(Request::get("/blog/20/10")).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn handler_reads_wildcards() {
    let router = Router::new().get("/say/*/to/*", echo).unwrap();
    let res = router.serve(Method::Get, "/say/foo/to/bar").await;
    assert_eq!(body(&res), " | foo,bar");
}

#[tokio::test]
async fn serve_splits_query_string() {
    let router = Router::new()
        .get("/search/:scope", |req: Request| async move {
            let scope = req.param("scope").unwrap_or_default().to_string();
            let q = req.get_query("q").unwrap_or_default().to_string();
            Response::text(format!("{scope}:{q}"))
        })
        .unwrap();

    let res = router.serve(Method::Get, "/search/docs?q=regex+router").await;
    assert_eq!(res.status, 200);
    assert_eq!(body(&res), "docs:regex router");
}

#[tokio::test]
async fn first_registered_handler_wins() {
    let router = Router::new()
        .get("/a", |_req| async { Response::text("first") })
        .unwrap()
        .get("/a", |_req| async { Response::text("second") })
        .unwrap();

    for _ in 0..3 {
        let res = router.handle(Request::get("/a")).await;
        assert_eq!(body(&res), "first");
    }
}

#[tokio::test]
async fn default_not_found() {
    let router = Router::new().get("/", ok).unwrap();

    let res = router.handle(Request::get("/missing")).await;
    assert_eq!(res.status, 404);
    assert_eq!(body(&res), "404 page not found\n");

    let res = router.handle(Request::post("/")).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn custom_not_found() {
    let router = Router::new()
        .get("/", ok)
        .unwrap()
        .not_found(|req: Request| async move {
            Response::text(format!("nothing at {}", req.path)).status(404)
        });

    let res = router.handle(Request::get("/missing")).await;
    assert_eq!(res.status, 404);
    assert_eq!(body(&res), "nothing at /missing");
}

#[tokio::test]
async fn fallback_router() {
    let legacy = Router::new()
        .get("/hi/:name", |req: Request| async move {
            Response::text(format!("Welcome! {}", req.param("name").unwrap_or_default()))
        })
        .unwrap();
    let router = Router::new()
        .get(r"/blog/{year:\d{4}}/{month:(?:\d{2})}", blog)
        .unwrap()
        .fallback(legacy);

    let res = router.handle(Request::get("/hi/gopher")).await;
    assert_eq!(body(&res), "Welcome! gopher");

    let res = router.handle(Request::get("/blog/2020/10")).await;
    assert_eq!(body(&res), "Render: 2020/10");

    let res = router.handle(Request::get("/nowhere")).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn mismatch_falls_through_to_not_found() {
    let reports = Reports::default();
    let router = reports
        .attach(Router::new())
        .get(r"/blog/{date:(\d+)}", ok)
        .unwrap();

    let res = router.handle(Request::get("/blog/2018")).await;
    assert_eq!(res.status, 404);
    assert_eq!(reports.take().len(), 1);
}

#[tokio::test]
async fn buffers_are_reused_without_residue() {
    let router = Router::new()
        .get("/blog/:year/:month", echo)
        .unwrap()
        .get("/say/*/to/*", echo)
        .unwrap()
        .get("/plain", echo)
        .unwrap();

    let res = router.handle(Request::get("/blog/2018/01")).await;
    assert_eq!(body(&res), "month=01,year=2018 | ");

    let res = router.handle(Request::get("/say/foo/to/bar")).await;
    assert_eq!(body(&res), " | foo,bar");

    let res = router.handle(Request::get("/plain")).await;
    assert_eq!(body(&res), " | ");

    assert_eq!(router.pool().allocated(), 1);
    assert_eq!(router.pool().idle(), 1);
}

#[tokio::test]
async fn panicking_handler_releases_buffer() {
    let router = Router::new()
        .get("/boom/:id", explode)
        .unwrap()
        .get("/echo/:id", echo)
        .unwrap();

    let res = router.handle(Request::get("/boom/1")).await;
    assert_eq!(res.status, 500);
    assert_eq!(router.pool().idle(), 1);

    let res = router.handle(Request::get("/echo/2")).await;
    assert_eq!(body(&res), "id=2 | ");
    assert_eq!(router.pool().allocated(), 1);
}

#[tokio::test]
async fn route_group_prefix() {
    let api = RouteGroup::new("/api/v1")
        .get("/users/:id", echo)
        .post("/users", |_req| async { Response::new(201) });

    let router = Router::new().group(api).unwrap();

    let res = router.handle(Request::get("/api/v1/users/9")).await;
    assert_eq!(body(&res), "id=9 | ");

    let res = router.handle(Request::post("/api/v1/users")).await;
    assert_eq!(res.status, 201);

    let res = router.handle(Request::get("/users/9")).await;
    assert_eq!(res.status, 404);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_share_the_pool() {
    let config = RouterConfig {
        max_idle_buffers: 8,
        ..RouterConfig::default()
    };
    let router = Arc::new(
        Router::with_config(config)
            .get("/items/:id/*", echo)
            .unwrap(),
    );

    let tasks: Vec<_> = (0..64)
        .map(|i| {
            let router = Arc::clone(&router);
            tokio::spawn(async move {
                let res = router
                    .handle(Request::get(format!("/items/{i}/x/{i}")))
                    .await;
                assert_eq!(body(&res), format!("id={i} | x/{i}"));
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert!(router.pool().idle() <= 8);
    assert!(router.pool().idle() >= 1);
}
