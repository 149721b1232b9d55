//! Byte layouts produced by the software authenticator.
//!
//! See https://www.w3.org/TR/webauthn-2/#sctn-authenticator-data and
//! https://www.w3.org/TR/webauthn-2/#sctn-attestation

use ciborium::value::{Integer, Value as CborValue};
use ring::digest;
use serde_json::json;

use crate::errors::CeremonyError;

/// User Present
pub(super) const FLAG_UP: u8 = 0x01;
/// User Verified
pub(super) const FLAG_UV: u8 = 0x04;
/// Attested credential data included
pub(super) const FLAG_AT: u8 = 0x40;

/// ES256 in the COSE algorithm registry
pub(super) const COSE_ALG_ES256: i64 = -7;

const AAGUID: [u8; 16] = [0x00; 16];

pub(super) fn sha256(data: &[u8]) -> Vec<u8> {
    digest::digest(&digest::SHA256, data).as_ref().to_vec()
}

/// `CollectedClientData` serialized the way a browser does for `type`
/// `webauthn.create` or `webauthn.get`.
pub(super) fn client_data_json(type_: &str, challenge: &str, origin: &str) -> String {
    json!({
        "type": type_,
        "challenge": challenge,
        "origin": origin,
        "crossOrigin": false
    })
    .to_string()
}

/// COSE_Key for an EC2 P-256 public key given in SEC1 uncompressed form.
pub(super) fn cose_ec2_key(public_key: &[u8]) -> Result<Vec<u8>, CeremonyError> {
    if public_key.len() != 65 || public_key[0] != 0x04 {
        return Err(CeremonyError::Unknown(
            "Unexpected public key format".to_string(),
        ));
    }
    let x_coord = &public_key[1..33];
    let y_coord = &public_key[33..65];

    let cose_key = CborValue::Map(vec![
        // kty = 2 (EC2)
        (
            CborValue::Integer(Integer::from(1)),
            CborValue::Integer(Integer::from(2)),
        ),
        (
            CborValue::Integer(Integer::from(3)),
            CborValue::Integer(Integer::from(COSE_ALG_ES256)),
        ),
        // crv = 1 (P-256)
        (
            CborValue::Integer(Integer::from(-1)),
            CborValue::Integer(Integer::from(1)),
        ),
        (
            CborValue::Integer(Integer::from(-2)),
            CborValue::Bytes(x_coord.to_vec()),
        ),
        (
            CborValue::Integer(Integer::from(-3)),
            CborValue::Bytes(y_coord.to_vec()),
        ),
    ]);

    to_cbor(&cose_key)
}

/// Authenticator data: rpIdHash | flags | signCount, optionally followed by
/// attested credential data (aaguid | credIdLen | credId | credentialPublicKey).
pub(super) fn authenticator_data(
    rp_id: &str,
    flags: u8,
    sign_count: u32,
    attested: Option<(&[u8], &[u8])>,
) -> Result<Vec<u8>, CeremonyError> {
    let mut auth_data = Vec::with_capacity(37);
    auth_data.extend_from_slice(&sha256(rp_id.as_bytes()));

    let flags = if attested.is_some() {
        flags | FLAG_AT
    } else {
        flags & !FLAG_AT
    };
    auth_data.push(flags);
    auth_data.extend_from_slice(&sign_count.to_be_bytes());

    if let Some((credential_id, cose_key)) = attested {
        let id_len = u16::try_from(credential_id.len()).map_err(|_| {
            CeremonyError::Constraint("Credential ID exceeds 65535 bytes".to_string())
        })?;
        auth_data.extend_from_slice(&AAGUID);
        auth_data.extend_from_slice(&id_len.to_be_bytes());
        auth_data.extend_from_slice(credential_id);
        auth_data.extend_from_slice(cose_key);
    }

    Ok(auth_data)
}

/// Attestation object with the `none` format.
pub(super) fn none_attestation_object(auth_data: Vec<u8>) -> Result<Vec<u8>, CeremonyError> {
    let attestation_obj = CborValue::Map(vec![
        (
            CborValue::Text("fmt".to_string()),
            CborValue::Text("none".to_string()),
        ),
        (
            CborValue::Text("attStmt".to_string()),
            CborValue::Map(vec![]),
        ),
        (
            CborValue::Text("authData".to_string()),
            CborValue::Bytes(auth_data),
        ),
    ]);

    to_cbor(&attestation_obj)
}

fn to_cbor(value: &CborValue) -> Result<Vec<u8>, CeremonyError> {
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(value, &mut bytes)
        .map_err(|e| CeremonyError::Unknown(format!("CBOR encoding failed: {e}")))?;
    Ok(bytes)
}
