// Error types for the request inspector

use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Request Header Fields Too Large: {0}")]
    RequestHeaderFieldsTooLarge(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Not Implemented: {0}")]
    NotImplemented(String),

    #[error("Request Timeout: {0}")]
    RequestTimeout(String),

    /// The peer closed the connection before a full request head arrived.
    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::RequestHeaderFieldsTooLarge(_) => StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            Error::RequestTimeout(_) => StatusCode::REQUEST_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether a response should still be written back to the peer.
    ///
    /// Closed or broken connections have nobody left to answer.
    pub fn is_answerable(&self) -> bool {
        !matches!(self, Error::ConnectionClosed | Error::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
