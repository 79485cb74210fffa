//! Turns failed HTTP statuses into messages a user can act on.

use reqwest::StatusCode;

/// An HTTP response that did not carry the requested file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpStatusError {
    /// HTTP 401
    Unauthorized,
    /// HTTP 403
    Forbidden,
    /// HTTP 404
    NotFound,
    /// HTTP 429
    TooManyRequests,
    /// Any other 4xx
    ClientError(u16),
    /// Any 5xx
    ServerError(u16),
}

impl std::fmt::Display for HttpStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpStatusError::Unauthorized => {
                write!(f, "Authentication required (HTTP 401)")
            }
            HttpStatusError::Forbidden => {
                write!(f, "Access forbidden (HTTP 403)")
            }
            HttpStatusError::NotFound => {
                write!(f, "Not found (HTTP 404): the file may have moved or the URL is wrong")
            }
            HttpStatusError::TooManyRequests => {
                write!(f, "Too many requests (HTTP 429). Try again later.")
            }
            HttpStatusError::ClientError(code) => {
                write!(f, "Request error (HTTP {})", code)
            }
            HttpStatusError::ServerError(code) => {
                write!(f, "Server error (HTTP {}). Try again later.", code)
            }
        }
    }
}

impl std::error::Error for HttpStatusError {}

/// Classify a status code. Returns `None` for anything that is not an error.
pub fn classify_status(status: StatusCode) -> Option<HttpStatusError> {
    match status {
        StatusCode::UNAUTHORIZED => Some(HttpStatusError::Unauthorized),
        StatusCode::FORBIDDEN => Some(HttpStatusError::Forbidden),
        StatusCode::NOT_FOUND => Some(HttpStatusError::NotFound),
        StatusCode::TOO_MANY_REQUESTS => Some(HttpStatusError::TooManyRequests),
        s if s.is_client_error() => Some(HttpStatusError::ClientError(s.as_u16())),
        s if s.is_server_error() => Some(HttpStatusError::ServerError(s.as_u16())),
        _ => None,
    }
}

/// Convert an error from `error_for_status()` into an [`HttpStatusError`] when it
/// carries a status, keeping the original error otherwise.
pub fn describe_status_error(error: reqwest::Error) -> anyhow::Error {
    match error.status().and_then(classify_status) {
        Some(status_error) => anyhow::Error::from(status_error),
        None => anyhow::Error::from(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED),
            Some(HttpStatusError::Unauthorized)
        );
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN),
            Some(HttpStatusError::Forbidden)
        );
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND),
            Some(HttpStatusError::NotFound)
        );
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            Some(HttpStatusError::TooManyRequests)
        );
        assert_eq!(
            classify_status(StatusCode::BAD_REQUEST),
            Some(HttpStatusError::ClientError(400))
        );
        assert_eq!(
            classify_status(StatusCode::BAD_GATEWAY),
            Some(HttpStatusError::ServerError(502))
        );
        assert_eq!(classify_status(StatusCode::OK), None);
        assert_eq!(classify_status(StatusCode::FOUND), None);
    }

    #[test]
    fn test_display_mentions_status_code() {
        assert!(HttpStatusError::NotFound.to_string().contains("404"));
        assert!(HttpStatusError::ClientError(418).to_string().contains("418"));
        assert!(HttpStatusError::ServerError(503).to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_describe_status_error_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/")
            .with_status(404)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let response = client.get(server.url()).send().await.unwrap();
        let err = response.error_for_status().unwrap_err();

        let described = describe_status_error(err);
        assert_eq!(
            described.downcast_ref::<HttpStatusError>(),
            Some(&HttpStatusError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_describe_status_error_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/")
            .with_status(503)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let response = client.get(server.url()).send().await.unwrap();
        let err = response.error_for_status().unwrap_err();

        let described = describe_status_error(err);
        assert_eq!(
            described.downcast_ref::<HttpStatusError>(),
            Some(&HttpStatusError::ServerError(503))
        );
    }
}
