//! fido2_ceremony - Client-side WebAuthn ceremony flows
//!
//! This crate drives the registration and authentication ceremonies against a
//! relying-party server: it fetches ceremony options, hands them to an
//! [`Authenticator`], submits the resulting credential to the server's
//! verification endpoint and navigates according to the `verified` flag.
//!
//! Challenge generation and signature verification stay on the server.

mod authenticator;
mod client;
mod config;
mod errors;
mod flow;
mod page;
mod software;
mod types;
mod utils;

pub use authenticator::Authenticator;

pub use client::CeremonyClient;

pub use config::{Endpoints, FIDO2_HTTP_TIMEOUT, FIDO2_ROUTE_PREFIX};

pub use errors::{CeremonyError, FlowError};

pub use flow::{FlowOutcome, FlowState, authenticate, register};

pub use page::{Navigation, Navigator};

pub use software::{AlwaysConsent, SoftwareAuthenticator, UserConsent};

pub use types::{
    AuthenticationOptions, AuthenticationResponse, CredentialDescriptor, RegistrationOptions,
    RegistrationResponse, RelyingParty, UserEntity, VerificationResult,
};

pub use utils::UtilError;
