use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid rpc url '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build http client")]
    Client(#[source] reqwest::Error),
    #[error("transport error calling {method}")]
    Http {
        method: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} returned HTTP {status}")]
    Status {
        method: String,
        status: reqwest::StatusCode,
    },
    #[error("{method} failed with code {code}: {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },
    #[error("{method} returned an undecodable response")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{method} returned neither a result nor an error")]
    EmptyResponse { method: String },
}
