//! Axum web server with WebSocket streaming of the visual state.

use std::sync::Arc;

use algoviz_algorithms::{Session, TraversalOrder, TreeAction};
use algoviz_engine::{
    Algorithm, CatalogEntry, PlaybackSpeed, PlaybackState, RunState, Store, VisualState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

/// Shared application state.
pub struct AppState {
    session: RwLock<Session>,
    store: Arc<Store>,
}

/// Visualization server.
pub struct VisServer {
    state: Arc<AppState>,
}

impl VisServer {
    pub fn new(session: Session) -> Self {
        let store = session.store().clone();
        Self {
            state: Arc::new(AppState {
                session: RwLock::new(session),
                store,
            }),
        }
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(index_handler))
            .route("/api/status", get(status_handler))
            .route("/api/snapshot", get(snapshot_handler))
            .route("/api/algorithms", get(algorithms_handler))
            .route("/api/playback/play", post(play_handler))
            .route("/api/playback/pause", post(pause_handler))
            .route("/api/playback/reset", post(reset_handler))
            .route("/api/playback/speed", post(speed_handler))
            .route("/api/regenerate", post(regenerate_handler))
            .route("/api/select", post(select_handler))
            .route("/api/tree/action", post(tree_action_handler))
            .route("/api/tree/traversal", post(traversal_handler))
            .route("/ws", get(ws_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Run the server on the given port.
    pub async fn serve(self, port: u16) -> Result<(), std::io::Error> {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Visualization server running on http://localhost:{}", port);
        axum::serve(listener, self.router()).await
    }
}

async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
    algorithm: Algorithm,
    name: &'static str,
    playback: PlaybackState,
    run_state: RunState,
    generation: u64,
    speed_ms: u64,
    pending_tree_actions: usize,
    traversal_order: TraversalOrder,
}

impl StatusResponse {
    fn of(session: &mut Session) -> Self {
        let algorithm = session.algorithm();
        let state = session.snapshot();
        Self {
            status: "ok",
            algorithm,
            name: algorithm.name(),
            playback: state.playback,
            run_state: session.state(),
            generation: state.generation,
            speed_ms: state.speed_ms,
            pending_tree_actions: session.controls().pending_tree_actions(),
            traversal_order: session.controls().traversal_order(),
        }
    }
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let mut session = state.session.write().await;
    Json(StatusResponse::of(&mut session))
}

async fn snapshot_handler(State(state): State<Arc<AppState>>) -> Json<VisualState> {
    Json(state.store.snapshot())
}

async fn algorithms_handler() -> Json<Vec<CatalogEntry>> {
    Json(Algorithm::ALL.into_iter().map(CatalogEntry::from).collect())
}

async fn play_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let mut session = state.session.write().await;
    let outcome = session.play().map_err(|err| {
        warn!(%err, "play failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    debug!(?outcome, "play");
    Ok(Json(StatusResponse::of(&mut session)))
}

async fn pause_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let mut session = state.session.write().await;
    session.pause();
    Json(StatusResponse::of(&mut session))
}

async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let mut session = state.session.write().await;
    session.reset();
    Json(StatusResponse::of(&mut session))
}

async fn regenerate_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let mut session = state.session.write().await;
    session.regenerate();
    Json(StatusResponse::of(&mut session))
}

/// Either an explicit `speed_ms` or a named `preset`.
#[derive(Debug, Deserialize)]
struct SpeedRequest {
    speed_ms: Option<u64>,
    preset: Option<PlaybackSpeed>,
}

async fn speed_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpeedRequest>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let mut session = state.session.write().await;
    apply_speed(&session, req).ok_or(StatusCode::BAD_REQUEST)?;
    Ok(Json(StatusResponse::of(&mut session)))
}

fn apply_speed(session: &Session, req: SpeedRequest) -> Option<u64> {
    match (req.speed_ms, req.preset) {
        (Some(ms), _) => Some(session.set_speed(ms)),
        (None, Some(preset)) => Some(session.set_speed_preset(preset)),
        (None, None) => None,
    }
}

#[derive(Debug, Deserialize)]
struct SelectRequest {
    algorithm: Algorithm,
}

async fn select_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectRequest>,
) -> Json<StatusResponse> {
    let mut session = state.session.write().await;
    session.select(req.algorithm);
    Json(StatusResponse::of(&mut session))
}

async fn tree_action_handler(
    State(state): State<Arc<AppState>>,
    Json(action): Json<TreeAction>,
) -> Json<StatusResponse> {
    let mut session = state.session.write().await;
    session.queue_tree_action(action);
    Json(StatusResponse::of(&mut session))
}

#[derive(Debug, Deserialize)]
struct TraversalRequest {
    order: TraversalOrder,
}

async fn traversal_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TraversalRequest>,
) -> Json<StatusResponse> {
    let mut session = state.session.write().await;
    session.set_traversal_order(req.order);
    Json(StatusResponse::of(&mut session))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Push one snapshot per store change and answer client commands.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket client connected");
    let mut updates = state.store.subscribe();
    let initial = updates.borrow_and_update().clone();
    if let Err(err) = send(&mut socket, &WsResponse::Snapshot(Box::new(initial))).await {
        warn!(%err, "failed to send initial snapshot");
        return;
    }

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if let Err(err) = send(&mut socket, &WsResponse::Snapshot(Box::new(snapshot))).await {
                    warn!(%err, "failed to send snapshot");
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = match serde_json::from_str::<WsCommand>(text.as_str()) {
                            Ok(cmd) => handle_ws_command(&state, cmd).await,
                            Err(err) => WsResponse::Error { message: err.to_string() },
                        };
                        if let Err(err) = send(&mut socket, &response).await {
                            warn!(%err, "failed to send response");
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(err) = socket.send(Message::Pong(data)).await {
                            warn!(%err, "failed to send pong");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("WebSocket client disconnected");
                        break;
                    }
                    Some(Err(err)) => {
                        warn!(%err, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }
}

async fn send(socket: &mut WebSocket, response: &WsResponse) -> Result<(), axum::Error> {
    let json = serde_json::to_string(response).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsCommand {
    GetSnapshot,
    GetStatus,
    Play,
    Pause,
    Reset,
    Regenerate,
    Select {
        algorithm: Algorithm,
    },
    SetSpeed {
        speed_ms: Option<u64>,
        preset: Option<PlaybackSpeed>,
    },
    QueueTreeAction {
        action: TreeAction,
    },
    SetTraversalOrder {
        order: TraversalOrder,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsResponse {
    Snapshot(Box<VisualState>),
    Status(StatusResponse),
    Error { message: String },
}

async fn handle_ws_command(state: &Arc<AppState>, cmd: WsCommand) -> WsResponse {
    if let WsCommand::GetSnapshot = cmd {
        return WsResponse::Snapshot(Box::new(state.store.snapshot()));
    }

    let mut session = state.session.write().await;
    match cmd {
        WsCommand::GetSnapshot | WsCommand::GetStatus => {}
        WsCommand::Play => {
            if let Err(err) = session.play() {
                return WsResponse::Error {
                    message: err.to_string(),
                };
            }
        }
        WsCommand::Pause => {
            session.pause();
        }
        WsCommand::Reset => session.reset(),
        WsCommand::Regenerate => session.regenerate(),
        WsCommand::Select { algorithm } => session.select(algorithm),
        WsCommand::SetSpeed { speed_ms, preset } => {
            if apply_speed(&session, SpeedRequest { speed_ms, preset }).is_none() {
                return WsResponse::Error {
                    message: "set_speed needs speed_ms or preset".into(),
                };
            }
        }
        WsCommand::QueueTreeAction { action } => session.queue_tree_action(action),
        WsCommand::SetTraversalOrder { order } => session.set_traversal_order(order),
    }
    WsResponse::Status(StatusResponse::of(&mut session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoviz_engine::EngineConfig;

    fn server(algorithm: Algorithm) -> VisServer {
        VisServer::new(Session::new(EngineConfig::instant(), algorithm).unwrap())
    }

    #[test]
    fn router_builds() {
        let _router = server(Algorithm::BubbleSort).router();
    }

    #[test]
    fn commands_parse() {
        let cmd: WsCommand =
            serde_json::from_str(r#"{"type":"select","algorithm":"merge-sort"}"#).unwrap();
        assert!(matches!(cmd, WsCommand::Select { algorithm: Algorithm::MergeSort }));

        let cmd: WsCommand =
            serde_json::from_str(r#"{"type":"set_speed","preset":"ten_x"}"#).unwrap();
        assert!(matches!(
            cmd,
            WsCommand::SetSpeed { speed_ms: None, preset: Some(PlaybackSpeed::TenX) }
        ));

        let cmd: WsCommand = serde_json::from_str(
            r#"{"type":"queue_tree_action","action":{"action":"search","value":7}}"#,
        )
        .unwrap();
        assert!(matches!(
            cmd,
            WsCommand::QueueTreeAction { action: TreeAction::Search(7) }
        ));
    }

    #[test]
    fn select_command_switches_algorithm() {
        let server = server(Algorithm::BubbleSort);
        let response = tokio_test::block_on(handle_ws_command(
            &server.state,
            WsCommand::Select {
                algorithm: Algorithm::Knapsack,
            },
        ));
        let WsResponse::Status(status) = response else {
            panic!("expected a status response");
        };
        assert_eq!(status.algorithm, Algorithm::Knapsack);
        assert_eq!(status.playback, PlaybackState::Idle);
        assert!(server.state.store.snapshot().instance.as_table().is_some());
    }

    #[test]
    fn set_speed_without_value_is_an_error() {
        let server = server(Algorithm::Bfs);
        let response = tokio_test::block_on(handle_ws_command(
            &server.state,
            WsCommand::SetSpeed {
                speed_ms: None,
                preset: None,
            },
        ));
        assert!(matches!(response, WsResponse::Error { .. }));
    }

    #[test]
    fn snapshot_serializes_with_tag() {
        let server = server(Algorithm::Fibonacci);
        let response = WsResponse::Snapshot(Box::new(server.state.store.snapshot()));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], "snapshot");
        assert_eq!(json["instance"]["variant"], "table");
    }
}
