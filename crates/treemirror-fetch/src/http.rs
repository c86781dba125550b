use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};

use crate::error::{FetchError, Result};

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Asynchronous HTTP client abstraction.
///
/// One long-lived client is shared by every listing fetch and download of a
/// run. Implementations follow redirects themselves and report a non-success
/// status as an error from [`HttpClient::stream`], before any body is yielded.
///
/// # Implementations
///
/// - [`ReqwestClient`]: production implementation using `reqwest`
/// - in-memory mocks for testing
pub trait HttpClient: Send + Sync + 'static {
    /// Error type for HTTP operations.
    type Error: std::error::Error + Send + 'static;

    /// Issue a GET and return the response body as a stream of chunks.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed (DNS failure,
    /// refused connection, error status).
    fn stream(
        &self,
        url: &str,
    ) -> impl Future<
        Output = std::result::Result<
            BoxStream<'static, std::result::Result<Bytes, Self::Error>>,
            Self::Error,
        >,
    > + Send;
}

/// Reads a whole response body into memory. Used for listing documents,
/// never for file content.
pub(crate) async fn read_text<C: HttpClient>(client: &C, url: &str) -> Result<String> {
    let mut stream = client
        .stream(url)
        .await
        .map_err(|e| FetchError::connection(url, e))?;

    let mut body = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| FetchError::interrupted(url, e))?;
        body.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;

    const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

    /// Production HTTP client implementation using reqwest.
    #[derive(Clone, Debug)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        /// Create a new ReqwestClient with the crate's default user agent.
        pub fn new() -> std::result::Result<Self, reqwest::Error> {
            Self::with_user_agent(USER_AGENT)
        }

        pub fn with_user_agent(user_agent: &str) -> std::result::Result<Self, reqwest::Error> {
            let client = reqwest::Client::builder().user_agent(user_agent).build()?;
            Ok(Self { client })
        }

        pub fn from_client(client: reqwest::Client) -> Self { Self { client } }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn stream(
            &self,
            url: &str,
        ) -> std::result::Result<BoxStream<'static, std::result::Result<Bytes, Self::Error>>, Self::Error>
        {
            let response = self.client.get(url).send().await?.error_for_status()?;
            Ok(Box::pin(response.bytes_stream()))
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
