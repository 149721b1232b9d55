use axum::http::StatusCode;
use fido2_ceremony::{
    CeremonyClient, CeremonyError, Endpoints, FlowError, FlowState, Navigation, authenticate,
};

use crate::common::{
    RecordingNavigator, ScriptedAuthenticator, authentication_credential, setup,
};

#[tokio::test]
async fn test_verified_authentication_navigates_to_success_page() {
    let (server, client) = setup().await;
    let authenticator = ScriptedAuthenticator::succeeding();
    let navigator = RecordingNavigator::default();

    let outcome = authenticate(&client, &authenticator, &navigator)
        .await
        .expect("authentication flow should finish");

    assert_eq!(outcome.state, FlowState::NavigatedSuccess);
    assert_eq!(
        navigator.navigations(),
        vec![Navigation::Assign(
            "/auth/authenticate_fido2_success".to_string()
        )]
    );
    assert_eq!(server.authentication_options_requests(), 1);
    assert_eq!(server.registration_options_requests(), 0);

    let submissions = server.authentication_submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].json(), authentication_credential());

    server.shutdown();
}

#[tokio::test]
async fn test_rejected_authentication_navigates_to_error_page() {
    let (server, client) = setup().await;
    server.set_verified(false, "Authentication failed");
    let authenticator = ScriptedAuthenticator::succeeding();
    let navigator = RecordingNavigator::default();

    let outcome = authenticate(&client, &authenticator, &navigator)
        .await
        .expect("a rejected assertion is not an error");

    assert_eq!(outcome.state, FlowState::NavigatedFailure);
    // No reload here, unlike registration
    assert_eq!(
        navigator.navigations(),
        vec![Navigation::Assign(
            "/auth/authenticate_fido2_error".to_string()
        )]
    );

    server.shutdown();
}

#[tokio::test]
async fn test_rejection_with_error_status_navigates_to_error_page() {
    let (server, client) = setup().await;
    server.reject_with_status(StatusCode::UNAUTHORIZED, "Unknown credential");
    let authenticator = ScriptedAuthenticator::succeeding();
    let navigator = RecordingNavigator::default();

    let outcome = authenticate(&client, &authenticator, &navigator)
        .await
        .expect("a JSON rejection is not an error, whatever the status");

    assert_eq!(outcome.state, FlowState::NavigatedFailure);
    assert_eq!(outcome.result.msg, "Unknown credential");
    assert_eq!(
        navigator.navigations(),
        vec![Navigation::Assign(
            "/auth/authenticate_fido2_error".to_string()
        )]
    );

    server.shutdown();
}

#[tokio::test]
async fn test_non_json_verification_error_does_not_navigate() {
    let (server, client) = setup().await;
    server.set_verify_status(StatusCode::SERVICE_UNAVAILABLE);
    let authenticator = ScriptedAuthenticator::succeeding();
    let navigator = RecordingNavigator::default();

    let err = authenticate(&client, &authenticator, &navigator)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FlowError::HttpStatus { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE
    ));
    assert_eq!(server.authentication_submissions().len(), 1);
    assert!(navigator.navigations().is_empty());

    server.shutdown();
}

#[tokio::test]
async fn test_ceremony_failure_submits_nothing() {
    let (server, client) = setup().await;
    let authenticator =
        ScriptedAuthenticator::failing(CeremonyError::Security("bad rp id".to_string()));
    let navigator = RecordingNavigator::default();

    let err = authenticate(&client, &authenticator, &navigator)
        .await
        .unwrap_err();

    assert!(err.is_ceremony_failure());
    assert!(server.authentication_submissions().is_empty());
    assert!(navigator.navigations().is_empty());

    server.shutdown();
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    crate::common::init_test_tracing();
    // Port 9 (discard) is not served locally
    let client = CeremonyClient::new("http://127.0.0.1:9").unwrap();
    let authenticator = ScriptedAuthenticator::succeeding();
    let navigator = RecordingNavigator::default();

    let err = authenticate(&client, &authenticator, &navigator)
        .await
        .unwrap_err();

    assert!(matches!(err, FlowError::Network(_)));
    assert_eq!(authenticator.calls(), 0);
    assert!(navigator.navigations().is_empty());
}

#[tokio::test]
async fn test_custom_endpoints_change_navigation_targets() {
    let (server, _) = setup().await;
    // Only the options/verify paths must exist on the server
    let mut endpoints = Endpoints::with_prefix("/auth");
    endpoints.authentication_success_page = "/dashboard".to_string();

    let client = CeremonyClient::new(&server.base_url)
        .unwrap()
        .with_endpoints(endpoints);
    let authenticator = ScriptedAuthenticator::succeeding();
    let navigator = RecordingNavigator::default();

    authenticate(&client, &authenticator, &navigator)
        .await
        .expect("authentication flow should finish");

    assert_eq!(
        navigator.navigations(),
        vec![Navigation::Assign("/dashboard".to_string())]
    );

    server.shutdown();
}
