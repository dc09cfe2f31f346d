//! Republish the calendar over HTTP.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::commands::Source;

pub const DEFAULT_PORT: u16 = 5273;

const CALENDAR_ROUTE: &str = "/zjuical.ics";

/// Shared application state
#[derive(Clone)]
struct AppState {
    /// Last successfully rendered calendar
    calendar: Arc<RwLock<String>>,
}

pub async fn run(source: Source, host: IpAddr, port: u16, interval: u64) -> Result<()> {
    let initial = render_blocking(source.clone())
        .await
        .context("Could not render the initial calendar")?;
    let state = AppState {
        calendar: Arc::new(RwLock::new(initial)),
    };

    tokio::spawn(refresh(source, state.clone(), Duration::from_secs(interval)));

    let app = router()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from((host, port));
    println!("zjuical serving http://{}{}", addr, CALENDAR_ROUTE);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router() -> Router<AppState> {
    Router::new().route(CALENDAR_ROUTE, get(calendar))
}

/// GET /zjuical.ics
async fn calendar(State(state): State<AppState>) -> impl IntoResponse {
    let body = state.calendar.read().await.clone();
    ([(header::CONTENT_TYPE, "text/calendar; charset=utf-8")], body)
}

/// Re-render on every tick. A failed render keeps the previous calendar.
async fn refresh(source: Source, state: AppState, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    // the first tick completes immediately; startup already rendered
    ticker.tick().await;

    loop {
        ticker.tick().await;

        match render_blocking(source.clone()).await {
            Ok(ics) => {
                *state.calendar.write().await = ics;
                info!("Calendar regenerated");
            }
            Err(e) => warn!("Regeneration failed, serving previous calendar: {:#}", e),
        }
    }
}

/// Rendering reads files and runs the whole pipeline, so keep it off the
/// async workers.
async fn render_blocking(source: Source) -> Result<String> {
    tokio::task::spawn_blocking(move || source.render())
        .await
        .context("Render task failed")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn state(text: &str) -> AppState {
        AppState {
            calendar: Arc::new(RwLock::new(text.to_string())),
        }
    }

    #[tokio::test]
    async fn serves_latest_calendar() {
        let state = state("BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n");
        let app = router().with_state(state.clone());

        *state.calendar.write().await =
            "BEGIN:VCALENDAR\r\nX-NEW:1\r\nEND:VCALENDAR\r\n".to_string();

        let response = app
            .oneshot(Request::get(CALENDAR_ROUTE).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/calendar; charset=utf-8"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("X-NEW:1"));
    }

    #[tokio::test]
    async fn render_errors_are_returned_from_the_blocking_task() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = Source {
            snapshot: dir.path().join("missing.json"),
            config: dir.path().join("config.json"),
            all: false,
            configs_dir: dir.path().to_path_buf(),
            include_todos: false,
            name: "课表".to_string(),
        };

        assert!(render_blocking(source).await.is_err());
    }

    #[tokio::test]
    async fn other_paths_are_not_found() {
        let app = router().with_state(state(""));
        let response = app
            .oneshot(Request::get("/other.ics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
