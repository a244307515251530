use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Lifecycle state reported by the workflow engine for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Success,
    Error,
    Waiting,
    Canceled,
    Crashed,
    /// Any status this bridge does not know (`new`, `unknown`, ...).
    #[serde(other)]
    Unknown,
}

impl ExecutionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Error => "error",
            Self::Waiting => "waiting",
            Self::Canceled => "canceled",
            Self::Crashed => "crashed",
            Self::Unknown => "unknown",
        }
    }
}

/// Snapshot of an execution record as returned by
/// `GET /executions/{id}?includeData=true`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    /// Empty when the engine omits it; callers already know the id they asked for.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub finished: bool,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub data: Option<ExecutionData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionData {
    #[serde(default)]
    pub result_data: Option<ResultData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultData {
    /// Per-step run lists, keyed by step name in execution order.
    #[serde(default)]
    pub run_data: Option<Map<String, Value>>,
    #[serde(default)]
    pub last_node_executed: Option<String>,
    #[serde(default)]
    pub error: Option<Value>,
}

/// Where a poll currently stands for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPhase {
    InProgress,
    Succeeded,
    Failed,
    Canceled,
}

impl ExecutionRecord {
    pub fn result_data(&self) -> Option<&ResultData> {
        self.data.as_ref()?.result_data.as_ref()
    }

    /// Success only counts once the engine has sealed the record; failure
    /// states are terminal as soon as they are reported.
    pub fn phase(&self) -> ExecutionPhase {
        match self.status {
            ExecutionStatus::Success if self.finished => ExecutionPhase::Succeeded,
            ExecutionStatus::Error | ExecutionStatus::Crashed => ExecutionPhase::Failed,
            ExecutionStatus::Canceled => ExecutionPhase::Canceled,
            ExecutionStatus::Success
            | ExecutionStatus::Running
            | ExecutionStatus::Waiting
            | ExecutionStatus::Unknown => ExecutionPhase::InProgress,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "execution id must be a string or number, got {other}"
        ))),
    }
}
