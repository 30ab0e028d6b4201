use std::sync::Arc;

use config::Config;
use dotenv::dotenv;
use handlers::auth::configure_cors;
use repositories::FirebaseStore;
use routes::create_routes;
use services::{auth::AuthService, posts::PostsService};
use tracing_subscriber::EnvFilter;

pub use self::errors::{Error, Result};

mod config;
mod errors;
mod handlers;
mod models;
mod repositories;
mod routes;
mod services;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub posts_service: PostsService,
    pub auth_service: AuthService,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::init();

    let store = match FirebaseStore::new(&config) {
        Ok(store) => {
            println!("✅ Document store client ready for {}", config.store_url);
            store
        }
        Err(err) => {
            println!("🔥 Failed to build the document store client: {:?}", err);
            std::process::exit(1);
        }
    };

    let auth_service = match AuthService::new(&config) {
        Ok(service) => service,
        Err(err) => {
            println!("🔥 Failed to build the auth client: {:?}", err);
            std::process::exit(1);
        }
    };

    let app_state = AppState {
        config: config.clone(),
        posts_service: PostsService::new(Arc::new(store)),
        auth_service,
    };

    let app = create_routes(Arc::new(app_state)).layer(configure_cors());

    let listener = tokio::net::TcpListener::bind(format!("[::]:{}", config.port))
        .await
        .unwrap();
    axum::serve(listener, app).await.unwrap();
}
