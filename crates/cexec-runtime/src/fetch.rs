//! Downloading install scripts.

use crate::error::InstallError;

/// Retrieves the body of an install script.
pub trait ScriptFetcher {
    /// Downloads the script at `url`.
    ///
    /// # Errors
    ///
    /// Returns an [`InstallError`] if the transfer fails or the server
    /// does not answer with a success status.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, InstallError>;
}

/// [`ScriptFetcher`] using a blocking HTTP client.
///
/// Redirects are followed and any non-success status is an error, the same
/// contract as `curl -fsSL`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpFetcher;

impl HttpFetcher {
    /// Creates a fetcher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ScriptFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, InstallError> {
        let download_failed = |source| InstallError::Download {
            url: url.to_string(),
            source,
        };

        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(download_failed)?;
        let response = client.get(url).send().map_err(download_failed)?;

        if !response.status().is_success() {
            return Err(InstallError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().map_err(download_failed)?;
        tracing::debug!(url, bytes = body.len(), "downloaded install script");
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_url_is_a_download_error() {
        let err = HttpFetcher::new().fetch("not a url").unwrap_err();
        assert!(matches!(err, InstallError::Download { ref url, .. } if url == "not a url"));
    }

    #[test]
    fn empty_url_is_a_download_error() {
        assert!(matches!(
            HttpFetcher::new().fetch("").unwrap_err(),
            InstallError::Download { .. }
        ));
    }
}
