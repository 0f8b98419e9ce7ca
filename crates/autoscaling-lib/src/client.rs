//! Authenticated JSON client for the control plane and the Autoscaling API

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Request, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::ClientError;

/// Raw HTTP transport used by [`JsonClient`]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a fully built request and return the response, whatever its status
    async fn send(&self, request: Request) -> reqwest::Result<Response>;
}

#[async_trait]
impl HttpTransport for Client {
    async fn send(&self, request: Request) -> reqwest::Result<Response> {
        self.execute(request).await
    }
}

/// Typed JSON client that attaches a bearer credential to every request
pub struct JsonClient<T = Client> {
    transport: T,
    access_token: String,
}

impl JsonClient<Client> {
    /// Create a client backed by `reqwest`
    ///
    /// TLS certificate verification is decided here, once, from
    /// `skip_ssl_validation`.
    pub fn new(access_token: impl Into<String>, skip_ssl_validation: bool) -> Result<Self, ClientError> {
        if skip_ssl_validation {
            warn!("SSL validation is disabled - TLS certificates will not be verified");
        }

        let transport = Client::builder()
            .danger_accept_invalid_certs(skip_ssl_validation)
            .build()?;

        Ok(Self::with_transport(transport, access_token))
    }
}

impl<T: HttpTransport> JsonClient<T> {
    /// Create a client over an arbitrary transport
    pub fn with_transport(transport: T, access_token: impl Into<String>) -> Self {
        Self {
            transport,
            access_token: access_token.into(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Credential sent verbatim in the `Authorization` header
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Perform one exchange.
    ///
    /// `request` is serialized as the JSON body when present. When `response`
    /// is `None` the body is never read, whatever it contains.
    pub async fn exchange<B, R>(
        &self,
        method: &str,
        url: &str,
        request: Option<&B>,
        response: Option<&mut R>,
    ) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let resp = self.send(method, url, request).await?;

        if let Some(slot) = response {
            *slot = decode(resp).await?;
        }

        Ok(())
    }

    /// GET `url` and decode the JSON response
    pub async fn get<R: DeserializeOwned>(&self, url: &str) -> Result<R, ClientError> {
        let resp = self.send::<()>("GET", url, None).await?;
        decode(resp).await
    }

    /// POST `body` as JSON to `url`, ignoring any response payload
    pub async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<(), ClientError> {
        self.exchange::<B, ()>("POST", url, Some(body), None).await
    }

    async fn send<B>(&self, method: &str, url: &str, body: Option<&B>) -> Result<Response, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let payload = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(ClientError::Serialization)?;

        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| ClientError::InvalidRequest(format!("invalid method {:?}", method)))?;
        let target = Url::parse(url)
            .map_err(|e| ClientError::InvalidRequest(format!("{}: {}", url, e)))?;
        let mut authorization = HeaderValue::from_str(&self.access_token)
            .map_err(|_| ClientError::InvalidRequest("invalid access token".to_string()))?;
        authorization.set_sensitive(true);

        let mut request = Request::new(method, target);
        if let Some(payload) = payload {
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            *request.body_mut() = Some(payload.into());
        }
        request.headers_mut().insert(AUTHORIZATION, authorization);

        debug!(method = %request.method(), url = %request.url(), "Sending request");
        let response = self.transport.send(request).await?;

        let status = response.status();
        debug!(status = status.as_u16(), "Received response");
        if status != StatusCode::OK {
            return Err(ClientError::UnexpectedStatus(status.to_string()));
        }

        Ok(response)
    }
}

async fn decode<R: DeserializeOwned>(response: Response) -> Result<R, ClientError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::ResponseParse)
}
