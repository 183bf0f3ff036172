use serde::{Deserialize, Serialize};

/// Inbound body of the LLM relay. The field is optional at the serde layer so
/// the handler can answer 400 with an error body instead of a framework
/// rejection.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

impl GenerateRequest {
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prompt_counts_as_missing() {
        let req: GenerateRequest = serde_json::from_str(r#"{"prompt": ""}"#).unwrap();
        assert!(req.prompt().is_none());

        let req: GenerateRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(req.prompt().is_none());

        let req: GenerateRequest = serde_json::from_str(r#"{"prompt": "hi"}"#).unwrap();
        assert_eq!(req.prompt(), Some("hi"));
    }
}
