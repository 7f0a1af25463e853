//! HTTP front door that starts games as separate processes.
//!
//! `POST /launch {"game": "<key>"}` spawns `<game-bin> <key>` and returns
//! immediately; the child is never observed again.

use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use std::thread;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::config::LauncherConfig;
use crate::error::{ArcadeError, Result};
use crate::games::GameKind;

pub trait Spawner: Send + Sync {
    fn spawn(&self, game: GameKind) -> Result<()>;
}

pub struct ProcessSpawner {
    program: PathBuf,
    wrap: Vec<String>,
}

impl ProcessSpawner {
    pub fn new(config: &LauncherConfig) -> Self {
        Self {
            program: config.game_bin.clone(),
            wrap: config.wrap.clone(),
        }
    }

    fn command(&self, game: GameKind) -> Command {
        match self.wrap.split_first() {
            Some((head, rest)) => {
                let mut cmd = Command::new(head);
                cmd.args(rest).arg(&self.program).arg(game.key());
                cmd
            }
            None => {
                let mut cmd = Command::new(&self.program);
                cmd.arg(game.key());
                cmd
            }
        }
    }
}

impl Spawner for ProcessSpawner {
    fn spawn(&self, game: GameKind) -> Result<()> {
        let mut cmd = self.command(game);
        let mut child = cmd.spawn().map_err(|source| ArcadeError::Spawn {
            program: cmd.get_program().to_string_lossy().into_owned(),
            source,
        })?;
        // Reap in the background so finished games do not linger as zombies.
        thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

#[derive(Clone)]
pub struct LauncherState {
    spawner: Arc<dyn Spawner>,
}

impl LauncherState {
    pub fn new(spawner: Arc<dyn Spawner>) -> Self {
        Self { spawner }
    }
}

/// Only string keys of launchable games resolve.
fn resolve(game: Option<&Value>) -> Result<GameKind> {
    game.and_then(Value::as_str)
        .and_then(GameKind::from_key)
        .filter(|g| g.launchable())
        .ok_or_else(|| ArcadeError::UnknownGame(game.map(Value::to_string).unwrap_or_default()))
}

fn reply(status: StatusCode, body: Value) -> Response {
    (
        status,
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(body),
    )
        .into_response()
}

/// Body is parsed as JSON whatever the Content-Type says.
pub async fn launch(State(state): State<LauncherState>, body: Bytes) -> Response {
    let request = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(fields)) => fields,
        Ok(other) => {
            warn!(body = %other, "launch body is not an object");
            return reply(StatusCode::BAD_REQUEST, json!({ "error": "Invalid JSON body" }));
        }
        Err(e) => {
            warn!(error = %e, "rejecting launch request");
            return reply(StatusCode::BAD_REQUEST, json!({ "error": "Invalid JSON body" }));
        }
    };

    let game = match resolve(request.get("game")) {
        Ok(game) => game,
        Err(e) => {
            warn!(error = %e, "rejecting launch request");
            return reply(StatusCode::BAD_REQUEST, json!({ "error": "Unknown game" }));
        }
    };

    match state.spawner.spawn(game) {
        Ok(()) => {
            info!(game = game.key(), "launched");
            reply(StatusCode::OK, json!({ "status": "launched", "game": game.key() }))
        }
        Err(e) => {
            error!(game = game.key(), error = %e, "launch failed");
            reply(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": e.to_string() }))
        }
    }
}

pub async fn preflight() -> Response {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
        .into_response()
}

pub fn router(state: LauncherState) -> Router {
    Router::new()
        .route("/launch", post(launch).options(preflight))
        .with_state(state)
}

pub async fn serve(config: &LauncherConfig) -> Result<()> {
    let state = LauncherState::new(Arc::new(ProcessSpawner::new(config)));
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, game_bin = ?config.game_bin, "launcher listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recording {
        launched: Mutex<Vec<GameKind>>,
        fail: bool,
    }

    impl Spawner for Recording {
        fn spawn(&self, game: GameKind) -> Result<()> {
            if self.fail {
                return Err(ArcadeError::Spawn {
                    program: "minicade".into(),
                    source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
                });
            }
            self.launched.lock().unwrap().push(game);
            Ok(())
        }
    }

    fn state() -> (LauncherState, Arc<Recording>) {
        let rec = Arc::new(Recording::default());
        (LauncherState::new(rec.clone()), rec)
    }

    async fn post(state: &LauncherState, body: &str) -> (StatusCode, Value) {
        let resp = launch(State(state.clone()), Bytes::copy_from_slice(body.as_bytes())).await;
        let status = resp.status();
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_launches_registered_games() {
        let (state, rec) = state();
        for key in ["snake", "flappy_bird", "brick_breaker", "endless_runner"] {
            let (status, json) = post(&state, &format!(r#"{{"game":"{key}"}}"#)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json, json!({ "status": "launched", "game": key }));
        }
        assert_eq!(
            *rec.launched.lock().unwrap(),
            vec![
                GameKind::Snake,
                GameKind::FlappyBird,
                GameKind::BrickBreaker,
                GameKind::EndlessRunner,
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_game_is_rejected() {
        let (state, rec) = state();
        for body in [
            r#"{"game":"tetris"}"#,
            r#"{"game":"bubble_shooter"}"#,
            r#"{"game":7}"#,
            r#"{}"#,
        ] {
            let (status, json) = post(&state, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(json, json!({ "error": "Unknown game" }));
        }
        assert!(rec.launched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (state, rec) = state();
        for body in ["not json", r#"["snake"]"#, r#""snake""#, "null"] {
            let (status, json) = post(&state, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(json, json!({ "error": "Invalid JSON body" }));
        }
        assert!(rec.launched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_spawn_failure_is_500() {
        let rec = Arc::new(Recording {
            fail: true,
            ..Recording::default()
        });
        let state = LauncherState::new(rec);
        let (status, json) = post(&state, r#"{"game":"snake"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().unwrap().contains("no such file"));
    }

    #[tokio::test]
    async fn test_preflight_is_no_content() {
        let resp = preflight().await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let headers = resp.headers();
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap(),
            "Content-Type"
        );
    }

    #[test]
    fn test_command_with_and_without_wrapper() {
        let config = LauncherConfig {
            bind: "127.0.0.1:0".parse().unwrap(),
            game_bin: PathBuf::from("/opt/minicade"),
            wrap: Vec::new(),
        };
        let cmd = ProcessSpawner::new(&config).command(GameKind::Snake);
        assert_eq!(cmd.get_program(), "/opt/minicade");
        assert_eq!(cmd.get_args().collect::<Vec<_>>(), vec!["snake"]);

        let wrapped = LauncherConfig {
            wrap: vec!["xterm".into(), "-e".into()],
            ..config
        };
        let cmd = ProcessSpawner::new(&wrapped).command(GameKind::FlappyBird);
        assert_eq!(cmd.get_program(), "xterm");
        assert_eq!(
            cmd.get_args().collect::<Vec<_>>(),
            vec!["-e", "/opt/minicade", "flappy_bird"]
        );
    }

    #[test]
    fn test_resolve() {
        assert_eq!(resolve(Some(&json!("snake"))).unwrap(), GameKind::Snake);
        assert!(matches!(
            resolve(Some(&json!("bubble_shooter"))),
            Err(ArcadeError::UnknownGame(k)) if k == "\"bubble_shooter\""
        ));
        assert!(resolve(None).is_err());
    }

    #[tokio::test]
    async fn test_router_serves_launch_and_preflight() {
        use axum::body::Body;
        use axum::http::{Method, Request};
        use tower::ServiceExt;

        let (state, rec) = state();
        let app = router(state);

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/launch")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"game":"snake"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(*rec.launched.lock().unwrap(), vec![GameKind::Snake]);

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/launch")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "GET, POST, OPTIONS"
        );

        let resp = app
            .oneshot(Request::builder().uri("/launch").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(rec.launched.lock().unwrap().len(), 1);
    }
}
