use serde::{Deserialize, Serialize};

/// Body of `POST /llm/generate`.
///
/// `prompt` is optional at the serde level so a missing prompt is answered
/// with the same "prompt required" rejection as an empty one.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_temperature() -> f64 {
    0.2
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub text: String,
    pub tokens_in: usize,
    pub tokens_out: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub redis: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_defaults() {
        let req: GenerateRequest = serde_json::from_str(r#"{"prompt": "hi"}"#).unwrap();
        assert_eq!(req.prompt.as_deref(), Some("hi"));
        assert_eq!(req.model, None);
        assert_eq!(req.temperature, 0.2);

        let empty: GenerateRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.prompt, None);
    }
}
