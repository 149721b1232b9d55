use async_trait::async_trait;

use crate::errors::CeremonyError;
use crate::types::{
    AuthenticationOptions, AuthenticationResponse, RegistrationOptions, RegistrationResponse,
};

/// The ceremony capability a flow delegates to.
///
/// In a browser this is `navigator.credentials`; [`crate::SoftwareAuthenticator`]
/// provides an in-memory implementation.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Create a new credential for the relying party described by `options`.
    async fn create_credential(
        &self,
        options: &RegistrationOptions,
    ) -> Result<RegistrationResponse, CeremonyError>;

    /// Produce an assertion over the challenge in `options`.
    async fn get_assertion(
        &self,
        options: &AuthenticationOptions,
    ) -> Result<AuthenticationResponse, CeremonyError>;
}
