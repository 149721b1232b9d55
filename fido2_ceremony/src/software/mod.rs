//! In-memory platform authenticator.
//!
//! Keeps P-256 credentials in process memory and answers both ceremonies
//! with `none` attestation, producing the same JSON shape a browser ceremony
//! library hands back.

mod credential;
mod encoding;

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use ring::rand::SystemRandom;
use serde_json::json;
use url::Url;

use crate::authenticator::Authenticator;
use crate::errors::CeremonyError;
use crate::types::{
    AuthenticationOptions, AuthenticationResponse, RegistrationOptions, RegistrationResponse,
};
use crate::utils::{base64url_decode, base64url_encode, gen_random_bytes};

use credential::StoredCredential;
use encoding::{
    COSE_ALG_ES256, FLAG_UP, FLAG_UV, authenticator_data, client_data_json, cose_ec2_key,
    none_attestation_object, sha256,
};

const CREDENTIAL_ID_LEN: usize = 32;

/// Decides whether the user approves a ceremony.
///
/// Returning `false` makes the ceremony fail with
/// [`CeremonyError::NotAllowed`], the same way a cancelled browser prompt does.
#[async_trait]
pub trait UserConsent: Send + Sync {
    async fn check_user(&self, rp_id: &str, user_name: Option<&str>) -> bool;
}

/// Approves every ceremony without prompting.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConsent;

#[async_trait]
impl UserConsent for AlwaysConsent {
    async fn check_user(&self, _rp_id: &str, _user_name: Option<&str>) -> bool {
        true
    }
}

pub struct SoftwareAuthenticator {
    origin: Url,
    consent: Box<dyn UserConsent>,
    rng: SystemRandom,
    credentials: Mutex<Vec<StoredCredential>>,
}

impl std::fmt::Debug for SoftwareAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareAuthenticator")
            .field("origin", &self.origin.as_str())
            .finish_non_exhaustive()
    }
}

impl SoftwareAuthenticator {
    /// Create an authenticator acting on behalf of a page served from `origin`.
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            consent: Box::new(AlwaysConsent),
            rng: SystemRandom::new(),
            credentials: Mutex::new(Vec::new()),
        }
    }

    pub fn with_consent(mut self, consent: impl UserConsent + 'static) -> Self {
        self.consent = Box::new(consent);
        self
    }

    /// Base64url IDs of all credentials held for `rp_id`
    pub fn credential_ids(&self, rp_id: &str) -> Result<Vec<String>, CeremonyError> {
        Ok(self
            .store()?
            .iter()
            .filter(|c| c.rp_id == rp_id)
            .map(|c| base64url_encode(&c.id))
            .collect())
    }

    fn store(&self) -> Result<MutexGuard<'_, Vec<StoredCredential>>, CeremonyError> {
        self.credentials
            .lock()
            .map_err(|_| CeremonyError::Unknown("Credential store is poisoned".to_string()))
    }

    fn origin_string(&self) -> String {
        self.origin.origin().ascii_serialization()
    }

    /// Resolve the effective RP ID and check that it is a registrable suffix
    /// of the origin's host.
    fn resolve_rp_id(&self, requested: Option<&str>) -> Result<String, CeremonyError> {
        let host = self.origin.host_str().ok_or_else(|| {
            CeremonyError::Security(format!("Origin {} has no host", self.origin))
        })?;

        let rp_id = match requested {
            Some(id) if !id.is_empty() => id,
            _ => return Ok(host.to_string()),
        };

        if host == rp_id || host.ends_with(&format!(".{rp_id}")) {
            Ok(rp_id.to_string())
        } else {
            Err(CeremonyError::Security(format!(
                "RP ID '{rp_id}' is not valid for origin {}",
                self.origin_string()
            )))
        }
    }

    async fn require_consent(
        &self,
        rp_id: &str,
        user_name: Option<&str>,
    ) -> Result<(), CeremonyError> {
        if self.consent.check_user(rp_id, user_name).await {
            Ok(())
        } else {
            Err(CeremonyError::NotAllowed(
                "The operation either timed out or was not allowed".to_string(),
            ))
        }
    }
}

#[async_trait]
impl Authenticator for SoftwareAuthenticator {
    async fn create_credential(
        &self,
        options: &RegistrationOptions,
    ) -> Result<RegistrationResponse, CeremonyError> {
        let rp_id = self.resolve_rp_id(options.rp().id.as_deref())?;

        let algorithms = options.algorithms();
        if !algorithms.is_empty() && !algorithms.contains(&COSE_ALG_ES256) {
            return Err(CeremonyError::NotSupported(format!(
                "No supported algorithm in {algorithms:?}"
            )));
        }

        let user_handle = base64url_decode(&options.user().id)
            .map_err(|_| CeremonyError::Constraint("user.id is not base64url".to_string()))?;

        {
            let excluded: Vec<Vec<u8>> = options
                .exclude_credentials()
                .iter()
                .filter_map(|d| base64url_decode(&d.id).ok())
                .collect();
            let store = self.store()?;
            if store
                .iter()
                .any(|c| c.rp_id == rp_id && excluded.contains(&c.id))
            {
                tracing::debug!("Excluded credential already registered for {}", rp_id);
                return Err(CeremonyError::InvalidState(
                    "The authenticator already holds an excluded credential".to_string(),
                ));
            }
        }

        self.require_consent(&rp_id, Some(&options.user().name))
            .await?;

        let credential_id = gen_random_bytes(CREDENTIAL_ID_LEN)?;
        let credential =
            StoredCredential::generate(&self.rng, credential_id.clone(), &rp_id, user_handle)?;

        let cose_key = cose_ec2_key(&credential.public_key(&self.rng)?)?;
        let auth_data = authenticator_data(
            &rp_id,
            FLAG_UP | FLAG_UV,
            credential.sign_count,
            Some((credential_id.as_slice(), cose_key.as_slice())),
        )?;
        let attestation_object = none_attestation_object(auth_data)?;
        let client_data =
            client_data_json("webauthn.create", options.challenge(), &self.origin_string());

        let credential_id_b64 = base64url_encode(&credential_id);
        let response = json!({
            "id": credential_id_b64,
            "rawId": credential_id_b64,
            "type": "public-key",
            "response": {
                "clientDataJSON": base64url_encode(client_data.as_bytes()),
                "attestationObject": base64url_encode(&attestation_object),
                "transports": ["internal"]
            },
            "clientExtensionResults": {},
            "authenticatorAttachment": "platform"
        });

        self.store()?.push(credential);
        tracing::debug!("Created credential {} for {}", credential_id_b64, rp_id);

        RegistrationResponse::from_json(response).map_err(|e| CeremonyError::Unknown(e.to_string()))
    }

    async fn get_assertion(
        &self,
        options: &AuthenticationOptions,
    ) -> Result<AuthenticationResponse, CeremonyError> {
        let rp_id = self.resolve_rp_id(options.rp_id())?;

        let allowed: Vec<Vec<u8>> = options
            .allow_credentials()
            .iter()
            .filter_map(|d| base64url_decode(&d.id).ok())
            .collect();

        // Most recently created credential wins when several match
        let credential_id = self
            .store()?
            .iter()
            .rev()
            .find(|c| c.rp_id == rp_id && (allowed.is_empty() || allowed.contains(&c.id)))
            .map(|c| c.id.clone())
            .ok_or_else(|| {
                CeremonyError::NotAllowed(format!("No matching credential for {rp_id}"))
            })?;

        self.require_consent(&rp_id, None).await?;

        let client_data =
            client_data_json("webauthn.get", options.challenge(), &self.origin_string());

        let (auth_data, signature, user_handle) = {
            let mut store = self.store()?;
            let credential = store
                .iter_mut()
                .find(|c| c.id == credential_id)
                .ok_or_else(|| {
                    CeremonyError::NotAllowed("Credential was removed".to_string())
                })?;

            credential.sign_count = credential.sign_count.wrapping_add(1);
            let auth_data =
                authenticator_data(&rp_id, FLAG_UP | FLAG_UV, credential.sign_count, None)?;

            let mut signed_data = auth_data.clone();
            signed_data.extend_from_slice(&sha256(client_data.as_bytes()));
            let signature = credential.sign(&self.rng, &signed_data)?;

            (auth_data, signature, credential.user_handle.clone())
        };

        let credential_id_b64 = base64url_encode(&credential_id);
        let response = json!({
            "id": credential_id_b64,
            "rawId": credential_id_b64,
            "type": "public-key",
            "response": {
                "clientDataJSON": base64url_encode(client_data.as_bytes()),
                "authenticatorData": base64url_encode(&auth_data),
                "signature": base64url_encode(&signature),
                "userHandle": base64url_encode(&user_handle)
            },
            "clientExtensionResults": {},
            "authenticatorAttachment": "platform"
        });

        tracing::debug!("Asserted credential {} for {}", credential_id_b64, rp_id);

        AuthenticationResponse::from_json(response)
            .map_err(|e| CeremonyError::Unknown(e.to_string()))
    }
}
