use std::net::SocketAddr;

use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};

use family_tree_backend::{initialize_backend, io::rest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let data_dir =
        std::env::var("FAMILY_TREE_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    info!("Using data directory: {}", data_dir);

    let state = initialize_backend(&data_dir)?;

    // CORS setup to allow the frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:8080".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", rest::api_router())
        .layer(cors)
        .with_state(state);

    let port = std::env::var("FAMILY_TREE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
