//! Unified error type for mediacast.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for a session layer to derive an HTTP status code via [`Error::http_status`].

use std::fmt;

use crate::media::StreamType;

/// Unified error type covering all failure modes in mediacast.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "profile").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A conflicting resource already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A negotiation or synthesis call lacked a required input.
    #[error("Missing input: {field}")]
    MissingInput {
        /// Name of the absent field (e.g. "quality", "codecs").
        field: &'static str,
    },

    /// Conversion is required but no acceptable codec is both transcodable
    /// and supported by the target container.
    #[error("No viable {stream} codec for stream {index}")]
    NoViableCodec {
        /// Which kind of stream failed.
        stream: StreamType,
        /// Index of the stream within its kind.
        index: usize,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An external tool (the transcoder) returned an error.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// The operation was cancelled before it completed.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Validation(_) => 400,
            Error::Conflict(_) => 409,
            Error::MissingInput { .. } => 400,
            Error::NoViableCodec { .. } => 415,
            Error::Io { .. } => 500,
            Error::Tool { .. } => 502,
            Error::Cancelled(_) => 499,
            Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::MissingInput`].
    pub fn missing(field: &'static str) -> Self {
        Error::MissingInput { field }
    }

    /// Convenience constructor for [`Error::NoViableCodec`].
    pub fn no_viable_codec(stream: StreamType, index: usize) -> Self {
        Error::NoViableCodec { stream, index }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Whether the caller should reject just the affected stream rather than
    /// treating the failure as a server fault.
    pub fn is_stream_rejection(&self) -> bool {
        matches!(self, Error::MissingInput { .. } | Error::NoViableCodec { .. })
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_message_per_variant() {
        let cases = [
            (Error::not_found("profile", "abc-123"), 404, "profile not found: abc-123"),
            (Error::Validation("unknown format".into()), 400, "Validation error: unknown format"),
            (Error::Conflict("duplicate id".into()), 409, "Conflict: duplicate id"),
            (Error::missing("codecs"), 400, "Missing input: codecs"),
            (
                Error::no_viable_codec(StreamType::Audio, 2),
                415,
                "No viable audio codec for stream 2",
            ),
            (Error::tool("ffmpeg", "exit status 1"), 502, "Tool error [ffmpeg]: exit status 1"),
            (Error::Cancelled("profile removed".into()), 499, "Cancelled: profile removed"),
        ];

        for (err, status, message) in cases {
            assert_eq!(err.http_status(), status, "{err}");
            assert_eq!(err.to_string(), message);
        }
    }

    #[test]
    fn only_negotiation_failures_reject_a_stream() {
        assert!(Error::missing("quality").is_stream_rejection());
        assert!(Error::no_viable_codec(StreamType::Video, 0).is_stream_rejection());
        assert!(!Error::Validation("x".into()).is_stream_rejection());
        assert!(!Error::tool("ffmpeg", "x").is_stream_rejection());
    }

    #[test]
    fn io_errors_convert() {
        let err: Error = std::io::Error::other("disk full").into();
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.http_status(), 500);
    }
}
