use deep_search_core::Error as CoreError;
use rmcp::ErrorData as McpError;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidArgument,
    UnsupportedOperation,
    EngineError,
    TransportFailure,
    NotConfigured,
}

impl ErrorCode {
    pub(crate) fn of(e: &CoreError) -> Self {
        match e {
            CoreError::InvalidArgument(_) => Self::InvalidArgument,
            CoreError::UnsupportedOperation(_) => Self::UnsupportedOperation,
            CoreError::Engine(_) => Self::EngineError,
            CoreError::Transport(_) => Self::TransportFailure,
            CoreError::NotConfigured(_) => Self::NotConfigured,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::UnsupportedOperation => "unsupported_operation",
            Self::EngineError => "engine_error",
            Self::TransportFailure => "transport_failure",
            Self::NotConfigured => "not_configured",
        }
    }

    /// Hint for clients only; the server itself never retries.
    pub(crate) fn retryable(self) -> bool {
        match self {
            Self::TransportFailure => true,
            Self::InvalidArgument
            | Self::UnsupportedOperation
            | Self::EngineError
            | Self::NotConfigured => false,
        }
    }

    fn caller_fault(self) -> bool {
        matches!(self, Self::InvalidArgument | Self::UnsupportedOperation)
    }
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    retryable: bool,
}

/// Caller mistakes become `invalid_params`; everything else is an internal error.
/// The message is the core error's display text (engine errors stay verbatim).
pub(crate) fn to_mcp_error(e: &CoreError) -> McpError {
    let code = ErrorCode::of(e);
    let data = serde_json::to_value(ErrorDetail {
        code: code.as_str(),
        retryable: code.retryable(),
    })
    .ok();
    if code.caller_fault() {
        McpError::invalid_params(e.to_string(), data)
    } else {
        McpError::internal_error(e.to_string(), data)
    }
}
