use std::error::Error as StdError;
use std::io::ErrorKind;

use crate::error::Error;

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::ConnectionRefused
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("connection refused")
        {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::TimedOut
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("timed out")
        {
            return true;
        }

        current = source.source();
    }

    false
}

pub(crate) fn provider_request_error(
    err: reqwest::Error,
    api_url: &str,
    timeout_secs: u64,
) -> Error {
    if err.is_timeout() || error_chain_has_timeout(&err) {
        return Error::Timeout {
            url: api_url.to_string(),
            secs: timeout_secs,
        };
    }

    if err.is_connect() {
        let detail = if error_chain_has_connection_refused(&err) {
            "connection refused. Ensure the provider endpoint is reachable and \
             REPLY_BASE_URL is correct."
                .to_string()
        } else {
            "could not connect. Check REPLY_BASE_URL and network connectivity.".to_string()
        };
        return Error::Connect {
            url: api_url.to_string(),
            detail,
        };
    }

    Error::Connect {
        url: api_url.to_string(),
        detail: err.to_string(),
    }
}
