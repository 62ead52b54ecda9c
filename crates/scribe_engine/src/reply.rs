use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Classified outcome of one HTTP exchange.
///
/// Every wire interaction lands in exactly one variant, so callers match on
/// data instead of intercepting parse failures after the fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiReply<T> {
    /// 2xx with a body of the expected shape.
    Ok(T),
    /// Non-2xx with a structured `{message}` body.
    Server { status: u16, message: String },
    /// A response arrived but its body was not parseable.
    Protocol { status: u16, body: String },
    /// The request never produced a response (includes timeouts).
    Transport { message: String },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Classifies a received response from its status code and body text.
pub fn classify<T: DeserializeOwned>(status: u16, body: &str) -> ApiReply<T> {
    if (200..300).contains(&status) {
        match serde_json::from_str::<T>(body) {
            Ok(value) => ApiReply::Ok(value),
            Err(_) => ApiReply::Protocol {
                status,
                body: body.to_string(),
            },
        }
    } else {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(error) => ApiReply::Server {
                status,
                message: error.message,
            },
            Err(_) => ApiReply::Protocol {
                status,
                body: body.to_string(),
            },
        }
    }
}

impl<T> ApiReply<T> {
    pub(crate) fn transport(err: impl std::fmt::Display) -> Self {
        ApiReply::Transport {
            message: err.to_string(),
        }
    }

    /// Short reply-class name for logging.
    pub fn class(&self) -> &'static str {
        match self {
            ApiReply::Ok(_) => "ok",
            ApiReply::Server { .. } => "server-error",
            ApiReply::Protocol { .. } => "protocol-error",
            ApiReply::Transport { .. } => "transport-error",
        }
    }
}
