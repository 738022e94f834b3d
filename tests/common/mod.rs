use axum::Router;

/// Serves `app` on an ephemeral local port and returns its base address.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn dead_address() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub const SSE_REPLY: &str = concat!(
    ": keep-alive\n\n",
    "data: {\"type\":\"start\",\"nearby_memory_count\":2}\n\n",
    "data: {\"type\":\"content\",\"content\":\"风从山那边\"}\n\n",
    "data: {\"type\":\"content\",\"content\":\"吹过来了。\"}\n\n",
    "data: {\"type\":\"end\",\"conversation_id\":42}\n\n"
);
