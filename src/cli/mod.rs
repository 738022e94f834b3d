use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Talk with the spirit of the place you stand on", long_about = None)]
pub struct Args {
    // --- Backend Args ---
    /// Base address of the spirit backend (e.g., http://localhost:8000)
    #[arg(long, env = "ANIMISM_API_BASE", default_value = "http://localhost:8000")]
    pub api_base: String,

    /// Skip the backend entirely and use local replies only
    #[arg(long, env = "ANIMISM_OFFLINE", default_value = "false")]
    pub offline: bool,

    /// Health-check route
    #[arg(long, env = "ANIMISM_HEALTH_PATH", default_value = "/health")]
    pub health_path: String,

    /// Image recognition route
    #[arg(long, env = "ANIMISM_IDENTIFY_PATH", default_value = "/api/identify")]
    pub identify_path: String,

    /// Chat route; may answer with JSON or a server-sent event stream
    #[arg(long, env = "ANIMISM_CHAT_PATH", default_value = "/api/chat")]
    pub chat_path: String,

    /// Weather route
    #[arg(long, env = "ANIMISM_WEATHER_PATH", default_value = "/api/weather")]
    pub weather_path: String,

    /// Emotion analysis route
    #[arg(long, env = "ANIMISM_EMOTION_PATH", default_value = "/api/emotion")]
    pub emotion_path: String,

    /// Timeout in seconds for every backend request.
    #[arg(long, env = "ANIMISM_REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    // --- Device Args ---
    /// Camera source: a path to an image that acts as the camera, or "synthetic"
    #[arg(long, env = "ANIMISM_CAMERA")]
    pub camera: Option<String>,

    /// Latitude to share with the spirit (requires --longitude)
    #[arg(long, env = "ANIMISM_LATITUDE", allow_hyphen_values = true)]
    pub latitude: Option<f64>,

    /// Longitude to share with the spirit (requires --latitude)
    #[arg(long, env = "ANIMISM_LONGITUDE", allow_hyphen_values = true)]
    pub longitude: Option<f64>,

    /// Stable device identifier sent with chat requests. A random one is used if unset.
    #[arg(long, env = "ANIMISM_UID")]
    pub uid: Option<String>,

    // --- Pacing Args ---
    /// Lower bound of the simulated thinking delay for local replies (ms)
    #[arg(long, env = "ANIMISM_THINKING_MIN_MS", default_value = "1000")]
    pub thinking_min_ms: u64,

    /// Upper bound of the simulated thinking delay for local replies (ms)
    #[arg(long, env = "ANIMISM_THINKING_MAX_MS", default_value = "2000")]
    pub thinking_max_ms: u64,

    /// Delay between delivering consecutive files of one selection (ms)
    #[arg(long, env = "ANIMISM_FILE_STAGGER_MS", default_value = "100")]
    pub file_stagger_ms: u64,

    /// Enable debug logging
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}
