use mock_server::ServerMode;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    mock_server::init_logging();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let mode = match std::env::var("GERRIT_MOCK_MODE").as_deref() {
        Ok("legacy") => ServerMode::Legacy,
        _ => ServerMode::Current,
    };
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    mock_server::run(listener, mode).await
}
