use super::config::Config;
use super::consts;
use anyhow::Result;
use secrecy::ExposeSecret;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;

pub(crate) fn call_url(config: &Config) -> String {
    format!("{}{}", config.base_url(), consts::CALL_PATH)
}

pub(crate) fn build_request(config: &Config) -> Result<Request> {
    let key = config.public_key().expose_secret();
    if key.is_empty() {
        return Err(anyhow::anyhow!("missing {}", consts::VAPI_PUBLIC_KEY));
    }

    let mut request = call_url(config).into_client_request()?;
    request.headers_mut().insert(
        consts::AUTHORIZATION_HEADER,
        HeaderValue::from_str(&format!("Bearer {key}"))?,
    );
    Ok(request)
}
