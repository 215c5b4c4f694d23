pub mod error;
pub mod routes;
pub mod telemetry;

use core::future::Future;
use std::sync::Arc;

use axum::handler::Handler;
use axum::Router;
use error::AppError;
use event_checkin_config::Config;
use event_checkin_database::migrator::run_migrations;
use event_checkin_database::{get_database_connection, PgExecutor, Queries, QueryExecutor};
use futures_util::pin_mut;
use hyper::body::Incoming;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use tokio::net::TcpListener;
use tokio::select;
use tokio::sync::watch;
use tower::ServiceExt as _;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::routes::{companies, events, participation, persons};

#[derive(Debug, Clone, Copy)]
enum Method {
    Get,
    Post,
    Put,
}

struct CheckinRouter<E> {
    router: Router<Arc<Queries<E>>>,
}

impl<E: QueryExecutor + 'static> CheckinRouter<E> {
    fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    #[track_caller]
    #[must_use]
    fn route<T: 'static, H: Handler<T, Arc<Queries<E>>>>(
        self,
        method: Method,
        path: &'static str,
        handler: H,
    ) -> Self {
        debug!("route {method:?} {path}");
        Self {
            // routes for the same path are merged by method
            router: self.router.route(
                path,
                match method {
                    Method::Get => axum::routing::get(handler),
                    Method::Post => axum::routing::post(handler),
                    Method::Put => axum::routing::put(handler),
                },
            ),
        }
    }

    fn finish(self, queries: Queries<E>) -> Router {
        self.router.with_state(Arc::new(queries))
    }
}

/// All check-in routes, answering from `queries`.
pub fn router<E: QueryExecutor + 'static>(queries: Queries<E>) -> Router {
    CheckinRouter::<E>::new()
        .route(Method::Get, "/persons/:id", persons::fetch_by_id::<E>)
        .route(Method::Put, "/persons/:id", persons::update::<E>)
        .route(Method::Get, "/persons/card/:card_id", persons::fetch_by_card_id::<E>)
        .route(Method::Post, "/persons", persons::create::<E>)
        .route(Method::Get, "/participation", participation::fetch::<E>)
        .route(Method::Post, "/participation", participation::add::<E>)
        .route(Method::Get, "/companies", companies::list::<E>)
        .route(Method::Get, "/events", events::list::<E>)
        .route(Method::Get, "/events/:id", events::fetch_by_id::<E>)
        .route(Method::Get, "/events/:id/participants", events::participants::<E>)
        .route(Method::Get, "/events/:id/attendance", events::attendance::<E>)
        .route(
            Method::Get,
            "/events/:id/attendance/total",
            events::total_attendance::<E>,
        )
        .finish(queries)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
}

pub async fn setup_server(config: &Config) -> Result<Router, AppError> {
    info!("starting up server...");

    let pool = get_database_connection(&config.database_url, config.pool_size)?;
    if config.migrate {
        run_migrations(&pool).await?;
    }

    Ok(router(Queries::new(PgExecutor::new(pool))))
}

/// Binds the configured address and returns the server future, which
/// completes after Ctrl+C or SIGTERM once all connections are closed.
pub async fn run_server(
    config: Config,
) -> Result<impl Future<Output = ()>, AppError> {
    let app = setup_server(&config).await?;
    let listener = TcpListener::bind(config.listen).await?;
    info!("started up server on {}...", listener.local_addr()?);
    Ok(serve(listener, app, shutdown_signal()))
}

// https://github.com/tokio-rs/axum/blob/af13c539386463b04b82f58155ee04702527212b/axum/src/serve.rs#L279

/// Serves `app` on `listener` until `shutdown` completes, then lets open
/// connections finish.
#[allow(clippy::cognitive_complexity)]
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send,
) {
    // tell the connections to shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let shutdown_tx = Arc::new(shutdown_tx);

    // wait for the connections to finish shutdown
    let (closed_tx, closed_rx) = watch::channel(());

    pin_mut!(shutdown);

    #[allow(clippy::redundant_pub_crate)]
    loop {
        select! {
            accept = listener.accept() => {
                let (socket, remote_addr) = match accept {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        error!("failed to accept connection: {err}");
                        continue;
                    }
                };

                let tower_service = app.clone();
                let shutdown_tx = Arc::clone(&shutdown_tx);
                let closed_rx = closed_rx.clone();

                tokio::spawn(async move {
                    let socket = TokioIo::new(socket);

                    let hyper_service = hyper::service::service_fn(move |request: Request<Incoming>| {
                        tower_service.clone().oneshot(request)
                    });

                    let builder = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new());
                    let connection = builder.serve_connection_with_upgrades(socket, hyper_service);
                    pin_mut!(connection);

                    let shutdown_requested = shutdown_tx.closed();
                    pin_mut!(shutdown_requested);
                    let mut shutting_down = false;

                    loop {
                        select! {
                            connection_result = connection.as_mut() => {
                                if let Err(err) = connection_result {
                                    debug!("failed to serve connection from {remote_addr}: {err:#}");
                                }
                                break;
                            }
                            () = &mut shutdown_requested, if !shutting_down => {
                                shutting_down = true;
                                connection.as_mut().graceful_shutdown();
                            }
                        }
                    }

                    drop(closed_rx);
                });
            }
            () = &mut shutdown => break,
        }
    }

    warn!("shutting down");
    drop(listener);
    drop(shutdown_rx); // initiate shutdown
    drop(closed_rx);
    closed_tx.closed().await;

    info!("server stopped");
}

#[allow(clippy::redundant_pub_crate)]
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
