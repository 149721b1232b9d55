use fido2_ceremony::{
    CeremonyError, FlowError, Navigation, SoftwareAuthenticator, UserConsent, authenticate,
    register,
};
use serde_json::json;
use url::Url;

use crate::common::{RecordingNavigator, default_authentication_options, setup};

struct Decline;

#[async_trait::async_trait]
impl UserConsent for Decline {
    async fn check_user(&self, _rp_id: &str, _user_name: Option<&str>) -> bool {
        false
    }
}

#[tokio::test]
async fn test_register_then_authenticate_with_software_authenticator() {
    let (server, client) = setup().await;
    let authenticator = SoftwareAuthenticator::new(Url::parse(&server.base_url).unwrap());
    let navigator = RecordingNavigator::default();

    register(&client, &authenticator, &navigator)
        .await
        .expect("registration flow should finish");

    let registration = server.registration_submissions()[0].json();
    assert_eq!(registration["type"], "public-key");
    assert!(registration["response"]["attestationObject"].is_string());

    // Restrict the assertion to the credential that was just registered
    let mut options = default_authentication_options();
    options["allowCredentials"] = json!([{ "type": "public-key", "id": registration["id"] }]);
    server.set_authentication_options(options);

    authenticate(&client, &authenticator, &navigator)
        .await
        .expect("authentication flow should finish");

    let assertion = server.authentication_submissions()[0].json();
    assert_eq!(assertion["id"], registration["id"]);
    assert_eq!(assertion["response"]["userHandle"], "dXNlcl9hbGljZQ");

    assert_eq!(
        navigator.navigations(),
        vec![
            Navigation::Assign("/auth/login".to_string()),
            Navigation::Assign("/auth/authenticate_fido2_success".to_string()),
        ]
    );

    server.shutdown();
}

#[tokio::test]
async fn test_authenticate_without_registration_aborts() {
    let (server, client) = setup().await;
    let authenticator = SoftwareAuthenticator::new(Url::parse(&server.base_url).unwrap());
    let navigator = RecordingNavigator::default();

    let err = authenticate(&client, &authenticator, &navigator)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FlowError::CeremonyFailed(CeremonyError::NotAllowed(_))
    ));
    assert!(server.authentication_submissions().is_empty());
    assert!(navigator.navigations().is_empty());

    server.shutdown();
}

#[tokio::test]
async fn test_declined_registration_aborts() {
    let (server, client) = setup().await;
    let authenticator =
        SoftwareAuthenticator::new(Url::parse(&server.base_url).unwrap()).with_consent(Decline);
    let navigator = RecordingNavigator::default();

    let err = register(&client, &authenticator, &navigator)
        .await
        .unwrap_err();

    assert!(err.is_ceremony_failure());
    assert!(server.registration_submissions().is_empty());
    assert!(navigator.navigations().is_empty());

    server.shutdown();
}
