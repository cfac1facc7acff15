// Error taxonomy shared by the clients and the shell. The shell decides how
// each kind is shown to the operator (warning vs. error dialog).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("{0}")]
    Configuration(String),

    #[error("Missing WordPress config: {}", .0.join(", "))]
    MissingCredentials(Vec<String>),

    #[error("{0}")]
    RemoteService(String),

    #[error("{0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl StudioError {
    /// True for a missing key or credential, whichever client raised it.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            StudioError::Configuration(_) | StudioError::MissingCredentials(_)
        )
    }
}

impl From<reqwest::Error> for StudioError {
    fn from(err: reqwest::Error) -> Self {
        StudioError::RemoteService(err.to_string())
    }
}

/// Turn a non-2xx response into a `RemoteService` error carrying the status
/// and whatever body the server sent back.
pub(crate) fn check_status(
    what: &str,
    res: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response> {
    if res.status().is_success() {
        return Ok(res);
    }
    let status = res.status();
    let txt = res.text().unwrap_or_default();
    Err(StudioError::RemoteService(format!(
        "{} failed: {} - {}",
        what, status, txt
    )))
}

pub type Result<T> = std::result::Result<T, StudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_lists_every_key() {
        let err = StudioError::MissingCredentials(vec![
            "WORDPRESS_URL".into(),
            "WORDPRESS_PASSWORD".into(),
        ]);
        assert_eq!(
            err.to_string(),
            "Missing WordPress config: WORDPRESS_URL, WORDPRESS_PASSWORD"
        );
        assert!(err.is_configuration());
        assert!(!StudioError::Validation("x".into()).is_configuration());
    }
}
