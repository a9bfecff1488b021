//! Domain error types.

/// Failure kind returned by every external fetch (quotes, search, news, membership).
///
/// Callers decide whether a failure degrades to an empty result or is surfaced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {reason}")]
    Network { reason: String },

    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("HTTP {status} from {endpoint}")]
    Http { status: u16, endpoint: String },

    #[error("unexpected response shape: {reason}")]
    Parse { reason: String },

    #[error("read error: {reason}")]
    Io { reason: String },
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Top-level error type for signaldesk.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("state file {file}: {reason}")]
    State { file: String, reason: String },

    #[error("unknown risk profile: {0}")]
    UnknownProfile(String),

    #[error("unknown universe: {0}")]
    UnknownUniverse(String),

    #[error("could not resolve identifier {identifier}")]
    Unresolved { identifier: String },

    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SignalError> for std::process::ExitCode {
    fn from(err: &SignalError) -> Self {
        let code: u8 = match err {
            SignalError::Io(_) => 1,
            SignalError::ConfigParse { .. }
            | SignalError::ConfigMissing { .. }
            | SignalError::ConfigInvalid { .. } => 2,
            SignalError::State { .. } => 3,
            SignalError::Unresolved { .. }
            | SignalError::UnknownProfile(_)
            | SignalError::UnknownUniverse(_) => 4,
            SignalError::NoData { .. } | SignalError::Fetch(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_display() {
        let err = FetchError::Http {
            status: 404,
            endpoint: "chart".into(),
        };
        assert_eq!(err.to_string(), "HTTP 404 from chart");
        assert_eq!(
            FetchError::Timeout { seconds: 15 }.to_string(),
            "request timed out after 15s"
        );
    }

    #[test]
    fn fetch_error_converts_into_signal_error() {
        let err: SignalError = FetchError::Parse {
            reason: "no chart".into(),
        }
        .into();
        assert!(matches!(err, SignalError::Fetch(FetchError::Parse { .. })));
    }

    #[test]
    fn exit_codes_by_category() {
        use std::process::ExitCode;
        let cases = [
            (
                SignalError::ConfigMissing {
                    section: "data".into(),
                    key: "dir".into(),
                },
                ExitCode::from(2),
            ),
            (
                SignalError::Unresolved {
                    identifier: "XYZ".into(),
                },
                ExitCode::from(4),
            ),
            (
                SignalError::NoData {
                    symbol: "AIR.PA".into(),
                },
                ExitCode::from(5),
            ),
        ];
        // ExitCode has no PartialEq; compare the debug form.
        for (err, expected) in &cases {
            assert_eq!(format!("{:?}", ExitCode::from(err)), format!("{:?}", expected));
        }
    }
}
