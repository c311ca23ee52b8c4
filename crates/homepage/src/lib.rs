//! homepage: a small server-rendered website built on salvo.
//!
//! Four pages are served through the conventional route
//! `{controller=Home}/{action=Index}/{id?}`:
//!
//! | Path                    | Page       |
//! |-------------------------|------------|
//! | `/`, `/Home/Index`      | Home       |
//! | `/Home/Privacy`         | Privacy    |
//! | `/Home/ContactUs`       | Contact Us |
//! | `/Home/Error`           | Error      |
//!
//! Anything else is `404 Not Found`.
//!
//! # Example
//!
//! ```no_run
//! use homepage::config::AppConfig;
//! use salvo::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), homepage::Error> {
//!     let config = AppConfig::from_env()?;
//!     let service = homepage::service(&config)?;
//!     let acceptor = TcpListener::new(config.listen_addr).bind().await;
//!     Server::new(acceptor).serve(service).await;
//!     Ok(())
//! }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

use std::path::Path;
use std::sync::Arc;

use homepage_core::{HomeController, Logger};
use salvo::catch_panic::CatchPanic;
use salvo::otel::Tracing;
use salvo::serve_static::StaticDir;
use salvo::{Router, Service};

pub mod config;
mod error;
pub mod exception_page;
pub mod logging;
pub mod pages;
pub mod request_tracing;
pub mod route;
pub mod views;

pub use self::error::Error;
pub use homepage_core;

use self::config::AppConfig;
use self::exception_page::catcher;
use self::logging::RequestLogger;
use self::pages::Pages;
use self::request_tracing::RequestTracing;
use self::route::ConventionalRoute;

/// Result type which has [`Error`] as it's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// The route every page is served through.
pub const DEFAULT_ROUTE: &str = "{controller=Home}/{action=Index}/{id?}";

/// Directories below the web root served as static assets.
pub const ASSET_DIRS: [&str; 3] = ["css", "js", "lib"];

/// Create the page controller with its logger.
pub fn controller() -> Result<Arc<HomeController>> {
    let controller = HomeController::builder()
        .logger(Logger::for_type::<HomeController>())
        .build()?;
    Ok(Arc::new(controller))
}

/// Build the router serving `controller`'s pages for every path.
///
/// Pages answer `GET`, `HEAD` and `POST`.
pub fn router(controller: Arc<HomeController>) -> Result<Router> {
    let pages = Pages::new(ConventionalRoute::parse(DEFAULT_ROUTE)?, controller);
    Ok(Router::new()
        .get(pages.clone())
        .head(pages.clone())
        .post(pages.clone())
        .push(
            Router::with_path("{**rest}")
                .get(pages.clone())
                .head(pages.clone())
                .post(pages),
        ))
}

/// Build the router serving the [`ASSET_DIRS`] below `web_root`.
pub fn assets(web_root: &Path) -> Router {
    ASSET_DIRS.iter().fold(Router::new(), |router, dir| {
        let files = StaticDir::new(web_root.join(dir));
        router.push(Router::with_path(format!("{dir}/{{**path}}")).get(files))
    })
}

/// Build the complete service described by `config`.
///
/// Fails when the web root is not an existing directory.
///
/// Middleware order: panic catching, OpenTelemetry span, request correlation, request
/// logging, then routing. Assets are routed ahead of pages.
pub fn service(config: &AppConfig) -> Result<Service> {
    config.check_web_root()?;
    let controller = controller()?;
    let router = Router::new()
        .push(assets(&config.web_root))
        .push(router(controller.clone())?);
    Ok(Service::new(router)
        .hoop(CatchPanic::new())
        .hoop(Tracing::new(request_tracing::tracer()))
        .hoop(RequestTracing::new())
        .hoop(RequestLogger::new())
        .catcher(catcher(&config.environment, controller)))
}
