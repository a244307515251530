use serde::{Deserialize, Serialize};
use std::fmt;

/// Depth of analysis requested from the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Quick,
    Full,
}

impl AnalysisMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Full => "full",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "quick" => Some(Self::Quick),
            "full" => Some(Self::Full),
            _ => None,
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied context forwarded alongside every message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatContext {
    pub domain: String,
    pub market: String,
    pub goals: Vec<String>,
    pub notes: String,
}

/// A validated inbound chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
    pub mode: AnalysisMode,
    pub context: ChatContext,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_only_known_variants() {
        assert_eq!(AnalysisMode::parse("quick"), Some(AnalysisMode::Quick));
        assert_eq!(AnalysisMode::parse("full"), Some(AnalysisMode::Full));
        assert_eq!(AnalysisMode::parse("fast"), None);
        assert_eq!(AnalysisMode::parse("Full"), None);
    }

    #[test]
    fn chat_request_uses_camel_case_on_the_wire() {
        let request = ChatRequest {
            session_id: "s-1".into(),
            message: "hi".into(),
            mode: AnalysisMode::Full,
            context: ChatContext::default(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["sessionId"], "s-1");
        assert_eq!(json["mode"], "full");
        assert!(json["context"]["goals"].is_array());
    }
}
