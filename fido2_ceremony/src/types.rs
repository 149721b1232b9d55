use serde::{Deserialize, Serialize, Serializer, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::errors::FlowError;

/// Relying party entity of `PublicKeyCredentialCreationOptions.rp`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RelyingParty {
    pub name: String,
    pub id: Option<String>,
}

/// User entity of `PublicKeyCredentialCreationOptions.user`.
///
/// `id` is the base64url encoded user handle.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity {
    pub id: String,
    pub name: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub(crate) struct PubKeyCredParam {
    #[serde(rename = "type")]
    pub(crate) type_: String,
    pub(crate) alg: i64,
}

/// Entry of `allowCredentials` / `excludeCredentials`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CredentialDescriptor {
    #[serde(rename = "type")]
    pub type_: String,
    pub id: String,
    #[serde(default)]
    pub transports: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationEnvelope {
    challenge: String,
    rp: RelyingParty,
    user: UserEntity,
    #[serde(default)]
    pub_key_cred_params: Vec<PubKeyCredParam>,
    #[serde(default)]
    exclude_credentials: Vec<CredentialDescriptor>,
    timeout: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticationEnvelope {
    challenge: String,
    rp_id: Option<String>,
    #[serde(default)]
    allow_credentials: Vec<CredentialDescriptor>,
    user_verification: Option<String>,
    timeout: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialEnvelope {
    id: String,
    raw_id: String,
    #[serde(rename = "type")]
    type_: String,
    response: Map<String, Value>,
}

fn parse_envelope<T: DeserializeOwned>(raw: &Value) -> Result<T, String> {
    if !raw.is_object() {
        return Err(format!("expected a JSON object, got {raw}"));
    }
    T::deserialize(raw).map_err(|e| e.to_string())
}

/// Options for `navigator.credentials.create()` as issued by the server.
///
/// The JSON is validated against a minimal envelope when it crosses the
/// boundary, then handed to the authenticator and serialized exactly as
/// received.
#[derive(Debug, Clone)]
pub struct RegistrationOptions {
    raw: Value,
    envelope: RegistrationEnvelope,
}

impl RegistrationOptions {
    pub fn from_json(raw: Value) -> Result<Self, FlowError> {
        let envelope = parse_envelope::<RegistrationEnvelope>(&raw)
            .map_err(|e| FlowError::InvalidOptions(format!("registration options: {e}")))?;
        Ok(Self { raw, envelope })
    }

    pub fn challenge(&self) -> &str {
        &self.envelope.challenge
    }

    pub fn rp(&self) -> &RelyingParty {
        &self.envelope.rp
    }

    pub fn user(&self) -> &UserEntity {
        &self.envelope.user
    }

    /// COSE algorithm identifiers requested for `public-key` credentials
    pub fn algorithms(&self) -> Vec<i64> {
        self.envelope
            .pub_key_cred_params
            .iter()
            .filter(|p| p.type_ == "public-key")
            .map(|p| p.alg)
            .collect()
    }

    pub fn exclude_credentials(&self) -> &[CredentialDescriptor] {
        &self.envelope.exclude_credentials
    }

    /// Timeout in milliseconds, if the server set one
    pub fn timeout(&self) -> Option<u64> {
        self.envelope.timeout
    }

    pub fn as_json(&self) -> &Value {
        &self.raw
    }
}

impl Serialize for RegistrationOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// Options for `navigator.credentials.get()` as issued by the server.
#[derive(Debug, Clone)]
pub struct AuthenticationOptions {
    raw: Value,
    envelope: AuthenticationEnvelope,
}

impl AuthenticationOptions {
    pub fn from_json(raw: Value) -> Result<Self, FlowError> {
        let envelope = parse_envelope::<AuthenticationEnvelope>(&raw)
            .map_err(|e| FlowError::InvalidOptions(format!("authentication options: {e}")))?;
        Ok(Self { raw, envelope })
    }

    pub fn challenge(&self) -> &str {
        &self.envelope.challenge
    }

    pub fn rp_id(&self) -> Option<&str> {
        self.envelope.rp_id.as_deref()
    }

    pub fn allow_credentials(&self) -> &[CredentialDescriptor] {
        &self.envelope.allow_credentials
    }

    pub fn user_verification(&self) -> Option<&str> {
        self.envelope.user_verification.as_deref()
    }

    pub fn timeout(&self) -> Option<u64> {
        self.envelope.timeout
    }

    pub fn as_json(&self) -> &Value {
        &self.raw
    }
}

impl Serialize for AuthenticationOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

fn check_credential(
    raw: &Value,
    required: &[&str],
    what: &str,
) -> Result<CredentialEnvelope, FlowError> {
    let envelope = parse_envelope::<CredentialEnvelope>(raw)
        .map_err(|e| FlowError::InvalidResponse(format!("{what}: {e}")))?;

    if envelope.type_ != "public-key" {
        return Err(FlowError::InvalidResponse(format!(
            "{what}: unexpected credential type '{}'",
            envelope.type_
        )));
    }

    if let Some(missing) = required
        .iter()
        .find(|key| !envelope.response.get(**key).is_some_and(Value::is_string))
    {
        return Err(FlowError::InvalidResponse(format!(
            "{what}: response.{missing} is missing"
        )));
    }

    Ok(envelope)
}

/// Credential returned by `navigator.credentials.create()`.
///
/// Serializes to exactly the JSON the authenticator produced.
#[derive(Debug, Clone)]
pub struct RegistrationResponse {
    raw: Value,
    id: String,
    raw_id: String,
}

impl RegistrationResponse {
    pub fn from_json(raw: Value) -> Result<Self, FlowError> {
        let envelope = check_credential(
            &raw,
            &["clientDataJSON", "attestationObject"],
            "registration response",
        )?;
        Ok(Self {
            raw,
            id: envelope.id,
            raw_id: envelope.raw_id,
        })
    }

    /// Credential ID, base64url encoded
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn raw_id(&self) -> &str {
        &self.raw_id
    }

    pub fn as_json(&self) -> &Value {
        &self.raw
    }

    pub fn into_json(self) -> Value {
        self.raw
    }
}

impl Serialize for RegistrationResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// Assertion returned by `navigator.credentials.get()`.
#[derive(Debug, Clone)]
pub struct AuthenticationResponse {
    raw: Value,
    id: String,
    raw_id: String,
}

impl AuthenticationResponse {
    pub fn from_json(raw: Value) -> Result<Self, FlowError> {
        let envelope = check_credential(
            &raw,
            &["clientDataJSON", "authenticatorData", "signature"],
            "authentication response",
        )?;
        Ok(Self {
            raw,
            id: envelope.id,
            raw_id: envelope.raw_id,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn raw_id(&self) -> &str {
        &self.raw_id
    }

    pub fn as_json(&self) -> &Value {
        &self.raw
    }

    pub fn into_json(self) -> Value {
        self.raw
    }
}

impl Serialize for AuthenticationResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// Body returned by both verification endpoints.
///
/// Only `verified` drives the flows; `msg` is kept for callers that want to
/// show it. A body without `verified` counts as a rejection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerificationResult {
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub msg: String,
}
