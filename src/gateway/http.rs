use async_trait::async_trait;
use futures::{ Stream, StreamExt };
use log::{ debug, info, warn };
use reqwest::header::{ ACCEPT, CONTENT_TYPE };
use reqwest::{ Client as HttpClient, Response };
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::sse::SseDecoder;
use super::{ ChatReply, ChatTurn, GatewayError, HealthReport, SpiritGateway };
use crate::config::GatewayConfig;
use crate::location::GeoPosition;
use crate::media::EncodedImage;
use crate::models::api::{
    ChatRequest,
    ChatResponse,
    EmotionPayload,
    EmotionRequest,
    ErrorBody,
    HealthResponse,
    IdentifyRequest,
    IdentifyResponse,
    StreamEvent,
    WeatherRequest,
    WeatherResponse,
};

pub type ChatStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, GatewayError>> + Send>>;

pub struct HttpGateway {
    http: HttpClient,
    config: GatewayConfig,
    uid: String,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig, uid: impl Into<String>) -> Result<Self, GatewayError> {
        let http = HttpClient::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            http,
            config,
            uid: uid.into(),
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn post_json<B, T>(&self, route: &str, body: &B) -> Result<T, GatewayError>
        where B: Serialize + ?Sized, T: DeserializeOwned
    {
        let url = self.config.url_for(route);
        debug!("POST {}", url);
        let resp = self.http.post(&url).json(body).send().await?;
        let resp = error_for_status(resp).await?;
        let text = resp.text().await?;
        serde_json::from_str::<T>(&text).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    /// Sends one chat turn and yields the reply as events. A plain JSON answer
    /// is presented as a single content event followed by an end event.
    pub async fn chat_stream(&self, turn: ChatTurn) -> Result<ChatStream, GatewayError> {
        let url = self.config.url_for(&self.config.endpoints.chat);
        let req = ChatRequest {
            message: &turn.message,
            context: turn.context.as_deref(),
            image: turn.image.as_ref(),
            uid: &self.uid,
            latitude: turn.position.map(|p| p.latitude),
            longitude: turn.position.map(|p| p.longitude),
            conversation_id: turn.conversation_id,
        };

        let resp = self.http
            .post(&url)
            .header(ACCEPT, "text/event-stream, application/json")
            .json(&req)
            .send().await?;
        let resp = error_for_status(resp).await?;

        let is_event_stream = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("text/event-stream"))
            .unwrap_or(false);

        if is_event_stream {
            return Ok(spawn_event_stream(resp));
        }

        let text = resp.text().await?;
        let body: ChatResponse = serde_json
            ::from_str(&text)
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        if body.success == Some(false) {
            return Err(
                GatewayError::Rejected(body.error.unwrap_or_else(|| "chat request failed".to_string()))
            );
        }
        let conversation_id = body.conversation_id;
        let reply = body.into_text().ok_or(GatewayError::EmptyReply)?;
        let events = vec![
            Ok(StreamEvent::Content { content: reply }),
            Ok(StreamEvent::End { conversation_id })
        ];
        Ok(Box::pin(futures::stream::iter(events)))
    }
}

fn spawn_event_stream(resp: Response) -> ChatStream {
    let (tx, rx) = mpsc::channel(32);

    tokio::spawn(async move {
        let mut decoder = SseDecoder::new();
        let mut bytes = resp.bytes_stream();
        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(buf) => {
                    for payload in decoder.feed(&buf) {
                        if let Some(event) = parse_event(&payload) {
                            if tx.send(Ok(event)).await.is_err() {
                                return;
                            }
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(GatewayError::Network(e))).await;
                    return;
                }
            }
        }
        if let Some(payload) = decoder.finish() {
            if let Some(event) = parse_event(&payload) {
                let _ = tx.send(Ok(event)).await;
            }
        }
    });

    Box::pin(ReceiverStream::new(rx))
}

fn parse_event(payload: &str) -> Option<StreamEvent> {
    if payload.trim() == "[DONE]" {
        return None;
    }
    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            info!("Skipping unparseable stream event: {} for data: {}", e, payload);
            None
        }
    }
}

async fn error_for_status(resp: Response) -> Result<Response, GatewayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json
        ::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message())
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));
    warn!("Backend answered {}: {}", status, message);
    Err(GatewayError::Server {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl SpiritGateway for HttpGateway {
    async fn check_health(&self) -> HealthReport {
        let url = self.config.url_for(&self.config.endpoints.health);
        let resp = match self.http.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                return HealthReport::failed(e.to_string());
            }
        };
        if !resp.status().is_success() {
            return HealthReport::failed(format!("health check returned {}", resp.status()));
        }
        match resp.json::<HealthResponse>().await {
            Ok(health) =>
                HealthReport {
                    status: health.status,
                    model_loaded: health.model_loaded,
                    services: health.services,
                    error: None,
                },
            Err(e) => HealthReport::failed(e.to_string()),
        }
    }

    async fn identify_image(
        &self,
        image: &EncodedImage,
        text: Option<&str>
    ) -> Result<IdentifyResponse, GatewayError> {
        let req = IdentifyRequest { image, text };
        self.post_json(&self.config.endpoints.identify, &req).await
    }

    async fn chat(&self, turn: ChatTurn) -> Result<ChatReply, GatewayError> {
        let mut stream = self.chat_stream(turn).await?;
        let mut text = String::new();
        let mut conversation_id = None;

        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::Start { nearby_memory_count } => {
                    debug!("Chat stream started ({:?} nearby memories)", nearby_memory_count);
                }
                StreamEvent::Content { content } => text.push_str(&content),
                StreamEvent::End { conversation_id: id } => {
                    conversation_id = id;
                    break;
                }
                StreamEvent::Error { error } => {
                    return Err(GatewayError::Stream(error));
                }
            }
        }

        if text.trim().is_empty() {
            return Err(GatewayError::EmptyReply);
        }
        Ok(ChatReply { text, conversation_id })
    }

    async fn weather(&self, position: GeoPosition) -> Result<WeatherResponse, GatewayError> {
        let req = WeatherRequest {
            latitude: position.latitude,
            longitude: position.longitude,
        };
        self.post_json(&self.config.endpoints.weather, &req).await
    }

    async fn analyze_emotion(&self, text: &str) -> Result<EmotionPayload, GatewayError> {
        self.post_json(&self.config.endpoints.emotion, &EmotionRequest { text }).await
    }
}
