use serde::{ Deserialize, Serialize };
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::media::EncodedImage;

#[derive(Deserialize, Debug, Clone)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub model_loaded: Option<bool>,
    #[serde(default)]
    pub services: HashMap<String, bool>,
}

#[derive(Serialize, Debug)]
pub struct IdentifyRequest<'a> {
    pub image: &'a EncodedImage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct IdentifyResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub objects: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub context: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<&'a EncodedImage>,
    pub uid: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<i64>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ChatResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<i64>,
}

impl ChatResponse {
    /// The reply text; `reply` wins over `content` when a backend sends both.
    pub fn into_text(self) -> Option<String> {
        self.reply
            .filter(|r| !r.trim().is_empty())
            .or(self.content)
            .filter(|r| !r.trim().is_empty())
    }
}

/// One `data:` frame of the streamed chat endpoint.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Start {
        #[serde(default)]
        nearby_memory_count: Option<u32>,
    },
    Content {
        content: String,
    },
    End {
        #[serde(default)]
        conversation_id: Option<i64>,
    },
    Error {
        error: String,
    },
}

#[derive(Serialize, Debug, Clone, Copy)]
pub struct WeatherRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CurrentWeather {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub weather_code: Option<i64>,
    #[serde(default)]
    pub weather_description: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct WeatherResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub current: Option<CurrentWeather>,
    #[serde(default)]
    pub weather_description: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct EmotionRequest<'a> {
    pub text: &'a str,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct EmotionAnalysis {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub primary_emotion: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// The emotion endpoint answers with a full analysis when it falls back to keyword
/// matching, and with a bare label when its model is loaded.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum EmotionPayload {
    Label(String),
    Analysis(EmotionAnalysis),
}

#[derive(Deserialize, Debug, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<JsonValue>,
}

impl ErrorBody {
    pub fn message(&self) -> Option<String> {
        if let Some(error) = self.error.as_ref().filter(|e| !e.trim().is_empty()) {
            return Some(error.clone());
        }
        match &self.detail {
            Some(JsonValue::String(detail)) if !detail.trim().is_empty() => Some(detail.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_response_takes_reply_or_content() {
        let resp: ChatResponse = serde_json::from_str(r#"{"content":"你好呀"}"#).unwrap();
        assert!(resp.success.is_none());
        assert_eq!(resp.into_text().as_deref(), Some("你好呀"));

        let resp: ChatResponse = serde_json
            ::from_str(r#"{"success":true,"reply":"我在","content":"我也在"}"#)
            .unwrap();
        assert_eq!(resp.into_text().as_deref(), Some("我在"));

        let resp: ChatResponse = serde_json::from_str(r#"{"reply":" ","content":"风起了"}"#).unwrap();
        assert_eq!(resp.into_text().as_deref(), Some("风起了"));
    }

    #[test]
    fn stream_events_decode_by_type() {
        let start: StreamEvent = serde_json
            ::from_str(r#"{"type":"start","nearby_memory_count":3}"#)
            .unwrap();
        assert_eq!(start, StreamEvent::Start { nearby_memory_count: Some(3) });

        let end: StreamEvent = serde_json::from_str(r#"{"type":"end","conversation_id":null}"#).unwrap();
        assert_eq!(end, StreamEvent::End { conversation_id: None });
    }

    #[test]
    fn emotion_payload_is_label_or_analysis() {
        let label: EmotionPayload = serde_json::from_str(r#""开心""#).unwrap();
        assert!(matches!(label, EmotionPayload::Label(ref l) if l == "开心"));

        let analysis: EmotionPayload = serde_json
            ::from_str(r#"{"success":true,"primary_emotion":"sad","emoji":"😢","suggestions":["抱抱你"]}"#)
            .unwrap();
        match analysis {
            EmotionPayload::Analysis(a) => {
                assert_eq!(a.primary_emotion.as_deref(), Some("sad"));
                assert_eq!(a.suggestions, vec!["抱抱你"]);
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn error_body_prefers_error_then_detail() {
        let body: ErrorBody = serde_json::from_str(r#"{"error":"缺少图片"}"#).unwrap();
        assert_eq!(body.message().as_deref(), Some("缺少图片"));

        let body: ErrorBody = serde_json::from_str(r#"{"detail":"文本内容为空"}"#).unwrap();
        assert_eq!(body.message().as_deref(), Some("文本内容为空"));

        let body: ErrorBody = serde_json::from_str(r#"{"detail":[{"loc":["body"]}]}"#).unwrap();
        assert!(body.message().is_none());
    }
}
