pub mod http;
pub mod sse;

pub use http::HttpGateway;

use async_trait::async_trait;
use log::{ info, warn };
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::location::GeoPosition;
use crate::media::EncodedImage;
use crate::models::api::{ EmotionPayload, IdentifyResponse, WeatherResponse };

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Server {
        status: u16,
        message: String,
    },
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("stream error: {0}")]
    Stream(String),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("empty reply")]
    EmptyReply,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub status: String,
    pub model_loaded: Option<bool>,
    pub services: HashMap<String, bool>,
    pub error: Option<String>,
}

impl HealthReport {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            model_loaded: None,
            services: HashMap::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok" && self.error.is_none()
    }
}

/// One chat request: the message plus everything sent alongside it.
#[derive(Debug, Clone, Default)]
pub struct ChatTurn {
    pub message: String,
    pub image: Option<EncodedImage>,
    pub context: Option<String>,
    pub position: Option<GeoPosition>,
    pub conversation_id: Option<i64>,
}

impl ChatTurn {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    pub conversation_id: Option<i64>,
}

#[async_trait]
pub trait SpiritGateway: Send + Sync {
    /// Never fails: transport and decoding problems come back as an error status.
    async fn check_health(&self) -> HealthReport;

    async fn identify_image(
        &self,
        image: &EncodedImage,
        text: Option<&str>
    ) -> Result<IdentifyResponse, GatewayError>;

    async fn chat(&self, turn: ChatTurn) -> Result<ChatReply, GatewayError>;

    async fn weather(&self, position: GeoPosition) -> Result<WeatherResponse, GatewayError>;

    async fn analyze_emotion(&self, text: &str) -> Result<EmotionPayload, GatewayError>;
}

/// The backend as seen by one session: probed once, and if that probe fails
/// every later call goes to the local persona instead.
#[derive(Clone)]
pub enum Gateway {
    Online(Arc<dyn SpiritGateway>),
    Offline,
}

impl Gateway {
    pub async fn initialize(remote: Arc<dyn SpiritGateway>) -> Self {
        let report = remote.check_health().await;
        if report.is_ok() {
            info!(
                "Backend healthy (model loaded: {})",
                report.model_loaded.map(|m| m.to_string()).unwrap_or_else(|| "unknown".into())
            );
            Gateway::Online(remote)
        } else {
            warn!(
                "Backend health check failed (status: {}, error: {}); using local replies for this session",
                report.status,
                report.error.as_deref().unwrap_or("none")
            );
            Gateway::Offline
        }
    }

    pub fn offline() -> Self {
        Gateway::Offline
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Gateway::Online(_))
    }

    pub fn remote(&self) -> Option<Arc<dyn SpiritGateway>> {
        match self {
            Gateway::Online(remote) => Some(Arc::clone(remote)),
            Gateway::Offline => None,
        }
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gateway::Online(_) => write!(f, "Gateway::Online"),
            Gateway::Offline => write!(f, "Gateway::Offline"),
        }
    }
}
