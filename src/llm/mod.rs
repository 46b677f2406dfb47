pub mod chat;

#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub completion_model: Option<String>,
    pub base_url: Option<String>,
}

impl LlmConfig {
    /// Treats blank strings as "not configured".
    pub fn new(api_key: Option<String>, completion_model: Option<String>, base_url: Option<String>) -> Self {
        fn non_blank(value: Option<String>) -> Option<String> {
            value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        }
        Self {
            api_key: non_blank(api_key),
            completion_model: non_blank(completion_model),
            base_url: non_blank(base_url),
        }
    }
}
