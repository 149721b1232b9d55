use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::{Endpoints, FIDO2_HTTP_TIMEOUT};
use crate::errors::FlowError;
use crate::types::{
    AuthenticationOptions, AuthenticationResponse, RegistrationOptions, RegistrationResponse,
    VerificationResult,
};

/// HTTP side of the ceremonies: fetches options and submits credentials.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct CeremonyClient {
    http: Client,
    base_url: Url,
    endpoints: Endpoints,
}

impl CeremonyClient {
    /// Create a client for the relying-party server at `base_url` using the
    /// endpoints under [`crate::FIDO2_ROUTE_PREFIX`].
    pub fn new(base_url: &str) -> Result<Self, FlowError> {
        let http = Client::builder().timeout(*FIDO2_HTTP_TIMEOUT).build()?;
        Self::with_http_client(http, base_url)
    }

    /// Create a client around an existing `reqwest::Client`, e.g. one with a
    /// cookie store so the server can bind the ceremony to a session.
    pub fn with_http_client(http: Client, base_url: &str) -> Result<Self, FlowError> {
        let base_url = Url::parse(base_url)?;
        Ok(Self {
            http,
            base_url,
            endpoints: Endpoints::default(),
        })
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET` the registration options. No request body is sent.
    pub async fn fetch_registration_options(&self) -> Result<RegistrationOptions, FlowError> {
        let raw = self.get_json(&self.endpoints.registration_options).await?;
        RegistrationOptions::from_json(raw)
    }

    /// `POST` the new credential to the registration verification endpoint.
    pub async fn verify_registration(
        &self,
        credential: &RegistrationResponse,
    ) -> Result<VerificationResult, FlowError> {
        self.post_json(&self.endpoints.registration_verify, credential)
            .await
    }

    pub async fn fetch_authentication_options(&self) -> Result<AuthenticationOptions, FlowError> {
        let raw = self.get_json(&self.endpoints.authentication_options).await?;
        AuthenticationOptions::from_json(raw)
    }

    pub async fn verify_authentication(
        &self,
        assertion: &AuthenticationResponse,
    ) -> Result<VerificationResult, FlowError> {
        self.post_json(&self.endpoints.authentication_verify, assertion)
            .await
    }

    async fn get_json(&self, path: &str) -> Result<Value, FlowError> {
        let url = self.base_url.join(path)?;
        tracing::debug!("GET {}", url);

        let response = self.http.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(FlowError::HttpStatus {
                status: response.status(),
                url: url.to_string(),
            });
        }

        Ok(response.json::<Value>().await?)
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<VerificationResult, FlowError> {
        let url = self.base_url.join(path)?;
        tracing::debug!("POST {}", url);

        // reqwest sets `Content-Type: application/json`
        let response = self.http.post(url.clone()).json(body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        // Rejections often come with an error status; the body still decides
        match serde_json::from_slice::<VerificationResult>(&bytes) {
            Ok(result) => {
                if !status.is_success() {
                    tracing::warn!(
                        "Verification endpoint {} answered {} with verified={}",
                        url,
                        status,
                        result.verified
                    );
                }
                Ok(result)
            }
            Err(_) if !status.is_success() => Err(FlowError::HttpStatus {
                status,
                url: url.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
