pub const VAPI_PUBLIC_KEY: &str = "VAPI_PUBLIC_KEY";

pub const BASE_URL: &str = "wss://api.vapi.ai";
pub const CALL_PATH: &str = "/call/ws";

pub const AUTHORIZATION_HEADER: &str = "Authorization";
