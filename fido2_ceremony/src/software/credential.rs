use ring::{
    rand::SystemRandom,
    signature::{self, EcdsaKeyPair, KeyPair},
};

use crate::errors::CeremonyError;

/// A credential held by the software authenticator.
pub(super) struct StoredCredential {
    pub(super) id: Vec<u8>,
    pub(super) rp_id: String,
    pub(super) user_handle: Vec<u8>,
    pub(super) sign_count: u32,
    pkcs8: Vec<u8>,
}

impl std::fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCredential")
            .field("id", &self.id)
            .field("rp_id", &self.rp_id)
            .field("sign_count", &self.sign_count)
            .finish_non_exhaustive()
    }
}

impl StoredCredential {
    /// Generate a fresh P-256 key pair for `rp_id`.
    pub(super) fn generate(
        rng: &SystemRandom,
        id: Vec<u8>,
        rp_id: &str,
        user_handle: Vec<u8>,
    ) -> Result<Self, CeremonyError> {
        let pkcs8 =
            EcdsaKeyPair::generate_pkcs8(&signature::ECDSA_P256_SHA256_ASN1_SIGNING, rng)
                .map_err(|_| CeremonyError::Unknown("Failed to generate key pair".to_string()))?;

        Ok(Self {
            id,
            rp_id: rp_id.to_string(),
            user_handle,
            sign_count: 0,
            pkcs8: pkcs8.as_ref().to_vec(),
        })
    }

    fn key_pair(&self, rng: &SystemRandom) -> Result<EcdsaKeyPair, CeremonyError> {
        EcdsaKeyPair::from_pkcs8(
            &signature::ECDSA_P256_SHA256_ASN1_SIGNING,
            &self.pkcs8,
            rng,
        )
        .map_err(|_| CeremonyError::Unknown("Stored key is unusable".to_string()))
    }

    /// Public key in SEC1 uncompressed form (0x04 | x | y)
    pub(super) fn public_key(&self, rng: &SystemRandom) -> Result<Vec<u8>, CeremonyError> {
        Ok(self.key_pair(rng)?.public_key().as_ref().to_vec())
    }

    /// ASN.1 DER ECDSA signature over `message`.
    pub(super) fn sign(&self, rng: &SystemRandom, message: &[u8]) -> Result<Vec<u8>, CeremonyError> {
        let signature = self
            .key_pair(rng)?
            .sign(rng, message)
            .map_err(|_| CeremonyError::Unknown("Failed to sign".to_string()))?;
        Ok(signature.as_ref().to_vec())
    }
}
