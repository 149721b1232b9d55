use crate::authenticator::Authenticator;
use crate::client::CeremonyClient;
use crate::errors::FlowError;
use crate::page::{Navigation, Navigator};

use super::{FlowOutcome, FlowState, FlowTracker};

/// Run the authentication ceremony.
///
/// Unlike [`super::register`], a rejected assertion navigates to a dedicated
/// error page instead of reloading.
pub async fn authenticate<A, N>(
    client: &CeremonyClient,
    authenticator: &A,
    navigator: &N,
) -> Result<FlowOutcome, FlowError>
where
    A: Authenticator + ?Sized,
    N: Navigator + ?Sized,
{
    let mut flow = FlowTracker::new("authentication");

    flow.enter(FlowState::AwaitingOptions);
    let options = client.fetch_authentication_options().await?;
    tracing::trace!("Authentication options: {:#?}", options.as_json());

    flow.enter(FlowState::AwaitingCeremony);
    let assertion = match authenticator.get_assertion(&options).await {
        Ok(assertion) => assertion,
        Err(e) => {
            flow.enter(FlowState::Aborted);
            tracing::warn!("Authentication ceremony failed: {}", e);
            return Err(e.into());
        }
    };

    flow.enter(FlowState::AwaitingVerification);
    let result = client.verify_authentication(&assertion).await?;

    let endpoints = client.endpoints();
    Ok(flow.finish(
        result,
        Navigation::Assign(endpoints.authentication_success_page.clone()),
        Navigation::Assign(endpoints.authentication_error_page.clone()),
        navigator,
    ))
}
