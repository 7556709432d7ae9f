use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Backend Args ---
    /// Base URL of the medical assistant backend (serves POST /chat and POST /login).
    #[arg(long, env = "BACKEND_URL", default_value = "http://localhost:8000")]
    pub backend_url: String,

    /// Timeout in seconds for each backend request.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    // --- Profile Store Args ---
    /// Profile store type (file, memory).
    #[arg(long, env = "PROFILE_STORE", default_value = "file")]
    pub profile_store: String,

    /// Path of the JSON file backing the file profile store.
    #[arg(long, env = "STORE_PATH", default_value = "medicare_profile.json")]
    pub store_path: String,

    // --- General App Args ---
    /// Print the spoken greeting on startup (--voice false to silence it).
    #[arg(
        long = "voice",
        env = "VOICE",
        default_value = "true",
        action = clap::ArgAction::Set
    )]
    pub voice: bool,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}
