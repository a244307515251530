pub mod types;
pub mod validation;

pub use types::{AnalysisMode, ChatContext, ChatRequest};
pub use validation::{
    FieldError, MAX_CONTEXT_LENGTH, MAX_MESSAGE_LENGTH, ValidationErrors, validate_chat_request,
};
