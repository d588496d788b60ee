// =============================================================================
// Provider errors — everything that can go wrong talking to an upstream API
// =============================================================================
//
// These never reach an HTTP caller. The resolver logs them and moves on to
// the next tier or to mock data.
// =============================================================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    /// Connection, TLS or timeout failure.
    #[error("{provider}: transport error: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },

    /// Upstream answered with a non-success HTTP status.
    #[error("{provider}: HTTP {status}")]
    Status { provider: &'static str, status: u16 },

    /// Body could not be decoded into the expected shape.
    #[error("{provider}: decode error: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },

    /// Upstream throttled us, or the local call budget is spent.
    #[error("{provider}: rate limited")]
    RateLimited { provider: &'static str },

    /// Upstream has no data for this symbol.
    #[error("{provider}: symbol not found: {symbol}")]
    NotFound {
        provider: &'static str,
        symbol: String,
    },

    /// Upstream answered successfully with nothing in it.
    #[error("{provider}: empty payload")]
    EmptyPayload { provider: &'static str },
}

impl ProviderError {
    pub fn transport(provider: &'static str, err: reqwest::Error) -> Self {
        Self::Transport {
            provider,
            message: err.to_string(),
        }
    }

    pub fn decode(provider: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            provider,
            message: err.to_string(),
        }
    }

    pub fn provider(&self) -> &'static str {
        match self {
            Self::Transport { provider, .. }
            | Self::Status { provider, .. }
            | Self::Decode { provider, .. }
            | Self::RateLimited { provider }
            | Self::NotFound { provider, .. }
            | Self::EmptyPayload { provider } => provider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_provider() {
        let err = ProviderError::Status {
            provider: "COINGECKO",
            status: 429,
        };
        assert_eq!(err.to_string(), "COINGECKO: HTTP 429");
        assert_eq!(err.provider(), "COINGECKO");

        let err = ProviderError::NotFound {
            provider: "ALPHA_VANTAGE",
            symbol: "ZZZZ".into(),
        };
        assert!(err.to_string().contains("ZZZZ"));
    }
}
