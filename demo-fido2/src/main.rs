use fido2_ceremony::{
    CeremonyClient, FlowError, Navigator, SoftwareAuthenticator, authenticate, register,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Server URL and page origin, falling back to the local demo server. The
/// origin defaults to the server URL so the RP ID check sees `localhost`.
fn server_and_origin(server_url: Option<String>, origin: Option<String>) -> (String, String) {
    let server_url = server_url.unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
    let origin = origin.unwrap_or_else(|| server_url.clone());
    (server_url, origin)
}

/// Logs navigations instead of driving a browser
struct LoggingNavigator {
    base_url: Url,
}

impl Navigator for LoggingNavigator {
    fn assign(&self, url: &str) {
        match self.base_url.join(url) {
            Ok(target) => tracing::info!("Navigate to {}", target),
            Err(e) => tracing::error!("Cannot resolve navigation target {}: {}", url, e),
        }
    }

    fn reload(&self) {
        tracing::info!("Reload current page");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Register,
    Authenticate,
    Both,
}

impl Mode {
    fn from_arg(arg: Option<&str>) -> Result<Self, String> {
        match arg {
            None | Some("both") => Ok(Mode::Both),
            Some("register") => Ok(Mode::Register),
            Some("authenticate") => Ok(Mode::Authenticate),
            Some(other) => Err(format!(
                "Unknown mode '{other}'. Use one of: register, authenticate, both"
            )),
        }
    }
}

fn init_tracing(app_name: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        #[cfg(debug_assertions)]
        {
            format!("fido2_ceremony=trace,{app_name}=trace,info").into()
        }

        #[cfg(not(debug_assertions))]
        {
            "info".into()
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("You can increase verbosity by setting the RUST_LOG environment variable.");
}

fn report(flow: &str, result: Result<fido2_ceremony::FlowOutcome, FlowError>) -> bool {
    match result {
        Ok(outcome) => {
            tracing::info!(
                "{} finished in state {} (verified={})",
                flow,
                outcome.state,
                outcome.is_verified()
            );
            outcome.is_verified()
        }
        Err(e) if e.is_ceremony_failure() => {
            tracing::warn!("{} aborted: {}", flow, e);
            false
        }
        Err(e) => {
            tracing::error!("{} failed: {}", flow, e);
            false
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing("demo_fido2");

    let mode = Mode::from_arg(std::env::args().nth(1).as_deref())?;

    let (server_url, origin) = server_and_origin(
        std::env::var("FIDO2_SERVER_URL").ok(),
        std::env::var("FIDO2_ORIGIN").ok(),
    );

    let client = CeremonyClient::new(&server_url)?;
    let authenticator = SoftwareAuthenticator::new(Url::parse(&origin)?);
    let navigator = LoggingNavigator {
        base_url: client.base_url().clone(),
    };

    tracing::info!("Running {:?} against {}", mode, server_url);

    let mut verified = true;
    if matches!(mode, Mode::Register | Mode::Both) {
        verified &= report(
            "Registration",
            register(&client, &authenticator, &navigator).await,
        );
    }
    if matches!(mode, Mode::Authenticate | Mode::Both) {
        verified &= report(
            "Authentication",
            authenticate(&client, &authenticator, &navigator).await,
        );
    }

    if !verified {
        std::process::exit(1);
    }
    Ok(())
}
