use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;

use lamina::handlers::{handle_search, handle_static, handle_view};
use lamina::logger::Logger;
use lamina::types::AppState;
use lamina::{Config, WikiError};

#[tokio::main]
async fn main() -> Result<(), WikiError> {
    if let Err(e) = Logger::init() {
        eprintln!("Failed to install logger: {}", e);
    }

    let config = Config::from_env();
    if !config.base_dir.exists() {
        log::error!("Wiki directory {:?} does not exist", config.base_dir);
        return Err(WikiError::NotFound);
    }

    let state = AppState {
        base_dir: Arc::new(config.base_dir.clone()),
        static_dir: Arc::new(config.static_dir.clone()),
    };

    let app = Router::new()
        .route("/", get(handle_view))
        .route("/search", get(handle_search))
        .route("/static/*path", get(handle_static))
        .with_state(state);

    let addr = config.socket_addr();
    log::info!("Wiki listening on http://{}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await.map_err(WikiError::from)
}
