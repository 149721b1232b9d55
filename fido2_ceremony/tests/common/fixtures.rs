//! Scripted authenticator and canned ceremony responses

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use fido2_ceremony::{
    AuthenticationOptions, AuthenticationResponse, Authenticator, CeremonyError,
    RegistrationOptions, RegistrationResponse,
};
use serde_json::{Value, json};

/// A registration credential carrying fields a minimal envelope knows nothing about
pub fn registration_credential() -> Value {
    json!({
        "id": "bW9ja19jcmVkX2lkXzEyMw",
        "rawId": "bW9ja19jcmVkX2lkXzEyMw",
        "type": "public-key",
        "response": {
            "clientDataJSON": "eyJ0eXBlIjoid2ViYXV0aG4uY3JlYXRlIn0",
            "attestationObject": "o2NmbXRkbm9uZWdhdHRTdG10oGhhdXRoRGF0YUA",
            "transports": ["internal", "hybrid"],
            "publicKeyAlgorithm": -7
        },
        "clientExtensionResults": { "credProps": { "rk": true } },
        "authenticatorAttachment": "platform"
    })
}

pub fn authentication_credential() -> Value {
    json!({
        "id": "bW9ja19jcmVkX2lkXzEyMw",
        "rawId": "bW9ja19jcmVkX2lkXzEyMw",
        "type": "public-key",
        "response": {
            "clientDataJSON": "eyJ0eXBlIjoid2ViYXV0aG4uZ2V0In0",
            "authenticatorData": "EsoXtJryKJQ28wPgFmAwoh5SXSZuIJJnQzgBqP1AcaABAAAAAw",
            "signature": "MEUCIQCj8BLqLqxHWBULHOhD6YKl7z8mhVisuLr1jq8MNkJ6nAIgOhYZ-tScOLJ8q5OLqxOdCJlF8zN7K9C7ZXjNFkJQhzg",
            "userHandle": "dXNlcl9hbGljZQ"
        },
        "clientExtensionResults": {},
        "authenticatorAttachment": "cross-platform"
    })
}

/// Authenticator that returns canned credentials or a fixed error
pub struct ScriptedAuthenticator {
    failure: Option<CeremonyError>,
    calls: AtomicUsize,
}

impl ScriptedAuthenticator {
    pub fn succeeding() -> Self {
        Self {
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: CeremonyError) -> Self {
        Self {
            failure: Some(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn outcome(&self) -> Result<(), CeremonyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Authenticator for ScriptedAuthenticator {
    async fn create_credential(
        &self,
        _options: &RegistrationOptions,
    ) -> Result<RegistrationResponse, CeremonyError> {
        self.outcome()?;
        RegistrationResponse::from_json(registration_credential())
            .map_err(|e| CeremonyError::Unknown(e.to_string()))
    }

    async fn get_assertion(
        &self,
        _options: &AuthenticationOptions,
    ) -> Result<AuthenticationResponse, CeremonyError> {
        self.outcome()?;
        AuthenticationResponse::from_json(authentication_credential())
            .map_err(|e| CeremonyError::Unknown(e.to_string()))
    }
}
