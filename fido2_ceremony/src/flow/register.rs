use crate::authenticator::Authenticator;
use crate::client::CeremonyClient;
use crate::errors::FlowError;
use crate::page::{Navigation, Navigator};

use super::{FlowOutcome, FlowState, FlowTracker};

/// Run the registration ceremony.
///
/// Fetches registration options, asks `authenticator` to create a credential
/// and submits it for verification. A verified registration navigates to the
/// login page; a rejected one reloads the current page.
///
/// If the authenticator fails the flow aborts with
/// [`FlowError::CeremonyFailed`] and nothing is submitted.
pub async fn register<A, N>(
    client: &CeremonyClient,
    authenticator: &A,
    navigator: &N,
) -> Result<FlowOutcome, FlowError>
where
    A: Authenticator + ?Sized,
    N: Navigator + ?Sized,
{
    let mut flow = FlowTracker::new("registration");

    flow.enter(FlowState::AwaitingOptions);
    let options = client.fetch_registration_options().await?;
    tracing::trace!("Registration options: {:#?}", options.as_json());

    flow.enter(FlowState::AwaitingCeremony);
    let credential = match authenticator.create_credential(&options).await {
        Ok(credential) => credential,
        Err(e) => {
            flow.enter(FlowState::Aborted);
            tracing::warn!("Registration ceremony failed: {}", e);
            return Err(e.into());
        }
    };

    flow.enter(FlowState::AwaitingVerification);
    let result = client.verify_registration(&credential).await?;

    Ok(flow.finish(
        result,
        Navigation::Assign(client.endpoints().login_page.clone()),
        Navigation::Reload,
        navigator,
    ))
}
