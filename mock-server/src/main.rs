use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let email = std::env::var("MOCK_EMAIL").unwrap_or_else(|_| mock_server::DEFAULT_EMAIL.to_string());
    let password =
        std::env::var("MOCK_PASSWORD").unwrap_or_else(|_| mock_server::DEFAULT_PASSWORD.to_string());

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    log::info!("listening on {addr}, account {email}");
    mock_server::serve(listener, mock_server::app_with_accounts(&[(email.as_str(), password.as_str())])).await
}
