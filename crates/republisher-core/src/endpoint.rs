//! Read/publish endpoints and the shared HTTP client.

use crate::{
    collection::Collection,
    common::{ContentId, Error, Result},
};
use core::time::Duration;
use reqwest::Url;

/// Default per-request timeout, covering connect, body upload and response.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where content is read from and where it is republished to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    /// Native store base URL without a trailing `/`.
    read_base: String,
    publish: Url,
}

impl Endpoints {
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if either URL fails to parse, does
    /// not use `http`/`https`, or carries a query string or fragment on the
    /// read base.
    pub fn new(read: &str, publish: &str) -> Result<Self> {
        let read_url = parse_http_url(read)?;
        if read_url.query().is_some() || read_url.fragment().is_some() {
            return Err(Error::InvalidEndpoint {
                url: read.to_owned(),
                reason: "read endpoint must not have a query or fragment".to_owned(),
            });
        }

        Ok(Self {
            read_base: read.trim_end_matches('/').to_owned(),
            publish: parse_http_url(publish)?,
        })
    }

    /// `{read}/{collection}/{id}`.
    pub fn read_url(&self, collection: &Collection, id: &ContentId) -> String {
        format!("{}/{}/{}", self.read_base, collection.name(), id)
    }

    pub fn read_base(&self) -> &str {
        &self.read_base
    }

    pub fn publish_url(&self) -> &Url {
        &self.publish
    }
}

fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::InvalidEndpoint {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::InvalidEndpoint {
            url: raw.to_owned(),
            reason: format!("unsupported scheme `{scheme}`"),
        }),
    }
}

/// Timeouts applied to every request made by the shared client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HttpSettings {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Builds the connection-pooled client shared by all workers.
///
/// # Errors
///
/// Returns [`Error::HttpClient`] if the TLS backend fails to initialize.
pub fn build_client(settings: HttpSettings) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(settings.request_timeout)
        .connect_timeout(settings.connect_timeout)
        .user_agent(concat!("republisher/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
