use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::cli::Args;
use crate::location::{ GeoPosition, LocationError };
use crate::media::{
    CameraDevice,
    CameraError,
    Constraints,
    StillImageCamera,
    SyntheticCamera,
    UnavailableCamera,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API base address '{0}': {1}")]
    InvalidBaseUrl(String, url::ParseError),
    #[error("endpoint path must start with '/': {0}")]
    InvalidEndpoint(String),
    #[error("thinking window is inverted: {min_ms}ms > {max_ms}ms")]
    InvalidThinkingWindow {
        min_ms: u64,
        max_ms: u64,
    },
    #[error("latitude and longitude must be given together")]
    PartialLocation,
    #[error(transparent)]
    Location(#[from] LocationError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub health: String,
    pub identify: String,
    pub chat: String,
    pub weather: String,
    pub emotion: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            health: "/health".to_string(),
            identify: "/api/identify".to_string(),
            chat: "/api/chat".to_string(),
            weather: "/api/weather".to_string(),
            emotion: "/api/emotion".to_string(),
        }
    }
}

/// Backend address and routes, fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: Url,
    pub endpoints: Endpoints,
    pub request_timeout: Duration,
}

impl GatewayConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url).map_err(|e|
            ConfigError::InvalidBaseUrl(base_url.to_string(), e)
        )?;
        Ok(Self {
            base_url,
            endpoints: Endpoints::default(),
            request_timeout: Duration::from_secs(30),
        })
    }

    pub fn url_for(&self, route: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), route)
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub thinking_min: Duration,
    pub thinking_max: Duration,
    pub file_stagger: Duration,
    pub context_len: usize,
    pub uid: String,
    pub constraints: Constraints,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            thinking_min: Duration::from_millis(1000),
            thinking_max: Duration::from_millis(2000),
            file_stagger: Duration::from_millis(100),
            context_len: 6,
            uid: uuid::Uuid::new_v4().to_string(),
            constraints: Constraints::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraSource {
    None,
    Synthetic,
    StillImage(PathBuf),
}

impl CameraSource {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => CameraSource::None,
            Some(v) if v.eq_ignore_ascii_case("synthetic") => CameraSource::Synthetic,
            Some(path) => CameraSource::StillImage(PathBuf::from(path)),
        }
    }

    pub fn into_device(self) -> Box<dyn CameraDevice> {
        match self {
            CameraSource::None => Box::new(UnavailableCamera::new(CameraError::NotFound)),
            CameraSource::Synthetic => Box::new(SyntheticCamera::default()),
            CameraSource::StillImage(path) => Box::new(StillImageCamera::new(path)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` runs the session fully offline.
    pub gateway: Option<GatewayConfig>,
    pub session: SessionConfig,
    pub camera: CameraSource,
    pub position: Option<GeoPosition>,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let gateway = if args.offline {
            None
        } else {
            let mut gateway = GatewayConfig::new(&args.api_base)?;
            gateway.endpoints = Endpoints {
                health: endpoint(&args.health_path)?,
                identify: endpoint(&args.identify_path)?,
                chat: endpoint(&args.chat_path)?,
                weather: endpoint(&args.weather_path)?,
                emotion: endpoint(&args.emotion_path)?,
            };
            gateway.request_timeout = Duration::from_secs(args.request_timeout_secs.max(1));
            Some(gateway)
        };

        if args.thinking_min_ms > args.thinking_max_ms {
            return Err(ConfigError::InvalidThinkingWindow {
                min_ms: args.thinking_min_ms,
                max_ms: args.thinking_max_ms,
            });
        }

        let position = match (args.latitude, args.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPosition::new(lat, lon)?),
            (None, None) => None,
            _ => {
                return Err(ConfigError::PartialLocation);
            }
        };

        let uid = args.uid
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Ok(Self {
            gateway,
            session: SessionConfig {
                thinking_min: Duration::from_millis(args.thinking_min_ms),
                thinking_max: Duration::from_millis(args.thinking_max_ms),
                file_stagger: Duration::from_millis(args.file_stagger_ms),
                uid,
                ..SessionConfig::default()
            },
            camera: CameraSource::parse(args.camera.as_deref()),
            position,
        })
    }
}

fn endpoint(path: &str) -> Result<String, ConfigError> {
    let path = path.trim();
    if !path.starts_with('/') {
        return Err(ConfigError::InvalidEndpoint(path.to_string()));
    }
    Ok(path.to_string())
}
