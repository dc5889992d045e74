mod echo;

use anyhow::Context;
use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, Method, StatusCode, Uri, Version},
    response::{IntoResponse, Response as HttpResponse},
    Router,
};
use echo::EchoController;
use std::net::SocketAddr;
use std::time::Duration;
use switchyard::{
    Application, Config, ControllerChain, ControllerList, Request, Response, RouteKind, RouteTable,
};
use tracing::{info, warn};

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    app: Application,
    timeout: Duration,
    local_addr: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default().unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}, using defaults", e);
        Config::default()
    });

    tracing_subscriber::fmt()
        .with_max_level(config.logging.max_level())
        .init();

    let table = RouteTable::from_config(&config.routing).context("Failed to build route table")?;
    for route in table.iter() {
        info!(name = route.name().unwrap_or_default(), kind = ?route.kind(), "route");
    }

    let app = Application::new(build_dispatcher(&table), &config.app)?;

    let addr = config.server.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let state = AppState {
        app,
        timeout: config.server.request_timeout(),
        local_addr: listener.local_addr().ok(),
    };

    info!(address = %addr, routes = table.len(), "switchyard listening");
    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}

/// One `[route, echo]` chain per exact route, tried in declaration order
fn build_dispatcher(table: &RouteTable) -> ControllerList {
    table
        .iter()
        .filter(|route| route.kind() == RouteKind::Exact)
        .fold(ControllerList::new(), |list, route| {
            let name = route.name().unwrap_or_default().to_string();
            list.with(
                ControllerChain::new()
                    .with(route.clone())
                    .with(EchoController::new(name)),
            )
        })
}

fn router(state: AppState) -> Router {
    Router::new().fallback(dispatch).with_state(state)
}

async fn dispatch(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
) -> HttpResponse {
    let path = urlencoding::decode(uri.path())
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| uri.path().to_string());

    let mut request = Request::new(method, path.clone())
        .with_headers(headers)
        .with_version(version);
    if let Some(query) = uri.query() {
        request = request.with_query(query);
    }
    if let Some(ConnectInfo(remote)) = connect_info {
        request = request.with_remote_addr(remote);
    }
    if let Some(local) = state.local_addr {
        request = request.with_local_addr(local);
    }

    match tokio::time::timeout(state.timeout, state.app.handle(request)).await {
        Ok(response) => response.into_response(),
        Err(_) => {
            warn!(path = %path, timeout_ms = state.timeout.as_millis() as u64, "request timed out");
            Response::text(StatusCode::GATEWAY_TIMEOUT, "Gateway Timeout").into_response()
        }
    }
}
