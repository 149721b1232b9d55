pub mod fixtures;

pub use fixtures::*;
pub use mock_server::{MockRelyingParty, default_authentication_options};

use std::sync::Mutex;

use fido2_ceremony::{CeremonyClient, Navigation, Navigator};

/// Initialize tracing for tests, honouring RUST_LOG
pub fn init_test_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Navigator that records every navigation instead of performing it
#[derive(Default)]
pub struct RecordingNavigator {
    navigations: Mutex<Vec<Navigation>>,
}

impl RecordingNavigator {
    pub fn navigations(&self) -> Vec<Navigation> {
        self.navigations.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn assign(&self, url: &str) {
        self.navigations
            .lock()
            .unwrap()
            .push(Navigation::Assign(url.to_string()));
    }

    fn reload(&self) {
        self.navigations.lock().unwrap().push(Navigation::Reload);
    }
}

/// Start a mock server and a client pointing at it
pub async fn setup() -> (MockRelyingParty, CeremonyClient) {
    init_test_tracing();
    let server = MockRelyingParty::start().await;
    let client = CeremonyClient::new(&server.base_url).expect("Failed to build client");
    (server, client)
}
