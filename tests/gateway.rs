mod common;

use animism::config::GatewayConfig;
use animism::gateway::{ ChatTurn, Gateway, GatewayError, HttpGateway, SpiritGateway };
use animism::location::GeoPosition;
use animism::media::EncodedImage;
use animism::models::api::{ EmotionPayload, StreamEvent };
use axum::extract::State;
use axum::http::{ header, StatusCode };
use axum::response::IntoResponse;
use axum::routing::{ get, post };
use axum::{ Json, Router };
use futures::StreamExt;
use serde_json::{ json, Value };
use std::sync::{ Arc, Mutex };

type Captured = Arc<Mutex<Vec<Value>>>;

fn gateway_for(base: &str) -> HttpGateway {
    HttpGateway::new(GatewayConfig::new(base).unwrap(), "device-1").unwrap()
}

fn sample_image() -> EncodedImage {
    EncodedImage::from_bytes("image/png", &[137, 80, 78, 71]).unwrap()
}

#[tokio::test]
async fn health_probe_decides_gateway_state() {
    let app = Router::new().route(
        "/health",
        get(|| async { Json(json!({ "status": "ok", "model_loaded": true, "services": { "ollama": true } })) })
    );
    let base = common::serve(app).await;
    let remote = Arc::new(gateway_for(&base));
    let report = remote.check_health().await;
    assert!(report.is_ok());
    assert_eq!(report.model_loaded, Some(true));
    assert_eq!(report.services.get("ollama"), Some(&true));
    assert!(Gateway::initialize(remote).await.is_available());

    let app = Router::new().route(
        "/health",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") })
    );
    let base = common::serve(app).await;
    assert!(!Gateway::initialize(Arc::new(gateway_for(&base))).await.is_available());

    let remote = gateway_for(&common::dead_address().await);
    let report = remote.check_health().await;
    assert!(!report.is_ok());
    assert!(report.error.is_some());
}

#[tokio::test]
async fn identify_decodes_and_maps_errors() {
    let captured: Captured = Arc::default();
    let app = Router::new()
        .route(
            "/api/identify",
            post(|State(seen): State<Captured>, Json(body): Json<Value>| async move {
                seen.lock().unwrap().push(body);
                Json(json!({ "success": true, "description": "一棵老槐树", "objects": ["树", "长椅"] }))
            })
        )
        .with_state(captured.clone());
    let base = common::serve(app).await;

    let resp = gateway_for(&base).identify_image(&sample_image(), Some("这是什么？")).await.unwrap();
    assert!(resp.success);
    assert_eq!(resp.objects, vec!["树", "长椅"]);

    let body = captured.lock().unwrap()[0].clone();
    assert!(body["image"].as_str().unwrap().starts_with("data:image/png;base64,"));
    assert_eq!(body["text"], "这是什么？");

    let app = Router::new()
        .route(
            "/api/identify",
            post(|| async { (StatusCode::BAD_REQUEST, Json(json!({ "detail": "图片数据无效" }))) })
        )
        .route("/api/chat", post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }));
    let base = common::serve(app).await;
    let gateway = gateway_for(&base);

    match gateway.identify_image(&sample_image(), None).await {
        Err(GatewayError::Server { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "图片数据无效");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    match gateway.chat(ChatTurn::new("你好")).await {
        Err(GatewayError::Server { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "request failed with status 500");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn json_chat_sends_full_request() {
    let captured: Captured = Arc::default();
    let app = Router::new()
        .route(
            "/api/chat",
            post(|State(seen): State<Captured>, Json(body): Json<Value>| async move {
                seen.lock().unwrap().push(body);
                Json(json!({ "success": true, "reply": "我在这里。" }))
            })
        )
        .with_state(captured.clone());
    let base = common::serve(app).await;
    let gateway = gateway_for(&base);

    let reply = gateway.chat(ChatTurn::new("你在吗")).await.unwrap();
    assert_eq!(reply.text, "我在这里。");
    assert_eq!(reply.conversation_id, None);

    let turn = ChatTurn {
        context: Some("用户: 你好\n地灵: 你来了。".to_string()),
        position: Some(GeoPosition::new(30.25, 120.17).unwrap()),
        conversation_id: Some(7),
        ..ChatTurn::new("讲个故事")
    };
    gateway.chat(turn).await.unwrap();

    let seen = captured.lock().unwrap();
    let first = seen[0].as_object().unwrap();
    assert_eq!(first["message"], "你在吗");
    assert!(first.contains_key("context"));
    assert!(first["context"].is_null());
    assert!(!first.contains_key("image"));
    assert!(!first.contains_key("latitude"));
    assert_eq!(first["uid"], "device-1");

    let second = &seen[1];
    assert_eq!(second["context"], "用户: 你好\n地灵: 你来了。");
    assert_eq!(second["latitude"], 30.25);
    assert_eq!(second["longitude"], 120.17);
    assert_eq!(second["conversation_id"], 7);
}

#[tokio::test]
async fn json_chat_accepts_reply_and_content_together() {
    let app = Router::new().route(
        "/api/chat",
        post(|| async { Json(json!({ "success": true, "reply": "我在", "content": "我在", "conversation_id": 5 })) })
    );
    let base = common::serve(app).await;
    let reply = gateway_for(&base).chat(ChatTurn::new("你在吗")).await.unwrap();
    assert_eq!(reply.text, "我在");
    assert_eq!(reply.conversation_id, Some(5));
}

#[tokio::test]
async fn json_chat_failures() {
    let app = Router::new()
        .route(
            "/api/chat",
            post(|| async { Json(json!({ "success": false, "error": "模型未加载" })) })
        );
    let base = common::serve(app).await;
    match gateway_for(&base).chat(ChatTurn::new("你好")).await {
        Err(GatewayError::Rejected(message)) => assert_eq!(message, "模型未加载"),
        other => panic!("unexpected result: {:?}", other),
    }

    let app = Router::new().route("/api/chat", post(|| async { Json(json!({ "reply": "  " })) }));
    let base = common::serve(app).await;
    assert!(matches!(gateway_for(&base).chat(ChatTurn::new("你好")).await, Err(GatewayError::EmptyReply)));
}

#[tokio::test]
async fn streamed_chat_is_collected() {
    let app = Router::new().route(
        "/api/chat",
        post(|| async { ([(header::CONTENT_TYPE, "text/event-stream")], common::SSE_REPLY).into_response() })
    );
    let base = common::serve(app).await;
    let gateway = gateway_for(&base);

    let reply = gateway.chat(ChatTurn::new("外面怎么样")).await.unwrap();
    assert_eq!(reply.text, "风从山那边吹过来了。");
    assert_eq!(reply.conversation_id, Some(42));

    let events: Vec<StreamEvent> = gateway
        .chat_stream(ChatTurn::new("外面怎么样")).await
        .unwrap()
        .map(|event| event.unwrap())
        .collect().await;
    assert_eq!(events.len(), 4);
    assert!(matches!(events[0], StreamEvent::Start { nearby_memory_count: Some(2) }));
    assert!(matches!(events[3], StreamEvent::End { conversation_id: Some(42) }));
}

#[tokio::test]
async fn stream_error_event_fails_the_chat() {
    let body = "data: {\"type\":\"content\",\"content\":\"半句\"}\n\ndata: {\"type\":\"error\",\"error\":\"生成中断\"}\n\n";
    let app = Router::new().route(
        "/api/chat",
        post(move || async move { ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response() })
    );
    let base = common::serve(app).await;
    match gateway_for(&base).chat(ChatTurn::new("你好")).await {
        Err(GatewayError::Stream(message)) => assert_eq!(message, "生成中断"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn weather_and_emotion_round_trip() {
    let app = Router::new()
        .route(
            "/api/weather",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["latitude"], 39.9);
                Json(
                    json!({
                    "success": true,
                    "current": {
                        "temperature": 18.5,
                        "humidity": 40,
                        "wind_speed": 12,
                        "weather_code": 2,
                        "weather_description": "多云"
                    },
                    "weather_description": "多云"
                })
                )
            })
        )
        .route("/api/emotion", post(|| async { Json(json!("开心")) }));
    let base = common::serve(app).await;
    let gateway = gateway_for(&base);

    let weather = gateway.weather(GeoPosition::new(39.9, 116.4).unwrap()).await.unwrap();
    assert!(weather.success);
    assert_eq!(weather.current.unwrap().temperature, Some(18.5));

    match gateway.analyze_emotion("今天真开心").await.unwrap() {
        EmotionPayload::Label(label) => assert_eq!(label, "开心"),
        other => panic!("unexpected payload: {:?}", other),
    }
}
