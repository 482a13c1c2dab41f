use std::time::Duration;

use reqwest::{
    Client, ClientBuilder, RequestBuilder, Url,
    header::{self, HeaderMap, HeaderValue},
};
use serde::Serialize;
use serde_json::Value;

use crate::{ClientConfig, Error, Result, client::envelope};

/// Connection target for every request, independent of the tenant host
pub const API_ROOT: &str = "https://web.skola24.se/";

/// Scope credential sent with every request
pub const X_SCOPE: &str = "8a22163c-8662-4535-9050-bc5e1923df48";

pub const DEFAULT_USER_AGENT: &str = concat!("skola24-rs/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client setup
pub struct BaseClientBuilder {
    pub client_builder: ClientBuilder,
    pub config: ClientConfig,
}

pub struct BaseClient {
    pub client: Client,
    pub base_url: Url,
    pub config: ClientConfig,
}

impl BaseClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        let mut client_builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers({
                let mut headers = HeaderMap::new();
                headers.insert("x-scope", HeaderValue::from_static(X_SCOPE));
                headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                headers
            });

        if let Some(secs) = config.timeout {
            client_builder = client_builder.timeout(Duration::from_secs(secs));
        }

        Self {
            client_builder,
            config,
        }
    }

    pub fn build(self) -> Result<BaseClient> {
        let base_url = Url::parse(&self.config.base_url).map_err(|e| {
            Error::Config(format!("Invalid base URL '{}': {}", self.config.base_url, e))
        })?;

        let client = self
            .client_builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(BaseClient {
            client,
            base_url,
            config: self.config,
        })
    }
}

impl BaseClient {
    /// Common transport error mapping
    pub fn handle_error_req(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Timeout
        } else {
            Error::Http(error)
        }
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid endpoint path '{}': {}", path, e)))
    }

    /// POST a JSON body and return the `data` field of a clean envelope
    pub async fn post<B>(&self, path: &str, body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let request = self.client.post(self.url(path)?).json(body);
        self.send(request).await
    }

    /// GET and return the `data` field of a clean envelope
    pub async fn get(&self, path: &str) -> Result<Value> {
        let request = self.client.get(self.url(path)?);
        self.send(request).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request
            .send()
            .await
            .map_err(|e| self.handle_error_req(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.handle_error_req(e))?;

        envelope::inspect(status, &body)
    }
}
