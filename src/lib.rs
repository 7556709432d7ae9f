pub mod auth;
pub mod backend;
pub mod cli;
pub mod models;
pub mod render;
pub mod repl;
pub mod session;
pub mod store;

use auth::AuthService;
use backend::http::HttpBackend;
use backend::BackendClient;
use cli::Args;
use log::info;
use session::ChatSession;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use store::create_profile_store;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Backend URL: {}", args.backend_url);
    info!("Request Timeout: {}s", args.request_timeout_secs);
    info!("Profile Store Type: {}", args.profile_store);
    info!("Profile Store Path: {}", args.store_path);
    info!("Voice Greeting: {}", args.voice);
    info!("-------------------------");

    let backend: Arc<dyn BackendClient> = Arc::new(HttpBackend::new(
        &args.backend_url,
        Duration::from_secs(args.request_timeout_secs),
    )?);
    let store = create_profile_store(&args)?;

    let session = ChatSession::new(Arc::clone(&backend));
    let auth = AuthService::new(store, backend);

    repl::run(session, auth, &args).await
}
