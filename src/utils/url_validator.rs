//! Destination URL checks applied at link creation

use url::Url;

use crate::errors::LinkforgeError;

/// Longest destination accepted
pub const MAX_URL_LEN: usize = 2048;

#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    TooLong(usize),
    InvalidProtocol(String),
    MissingHost,
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::TooLong(len) => write!(
                f,
                "URL is {} characters long, the limit is {}",
                len, MAX_URL_LEN
            ),
            Self::InvalidProtocol(scheme) => write!(
                f,
                "Invalid protocol: {}. Only http:// and https:// are allowed",
                scheme
            ),
            Self::MissingHost => write!(f, "URL has no host"),
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

impl From<UrlValidationError> for LinkforgeError {
    fn from(err: UrlValidationError) -> Self {
        LinkforgeError::invalid_url(err.to_string())
    }
}

/// Accept only absolute http(s) URLs with a host. Returns the trimmed URL.
pub fn validate_url(url: &str) -> Result<&str, UrlValidationError> {
    let url = url.trim();

    if url.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }
    if url.len() > MAX_URL_LEN {
        return Err(UrlValidationError::TooLong(url.len()));
    }

    let parsed = Url::parse(url).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::InvalidProtocol(format!("{}:", other))),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(url)
}
