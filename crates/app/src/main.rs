//! Netadmin session probe - Main Entry Point
//!
//! Signs in to the network-admin backend when credentials are supplied,
//! fetches the operator profile through the authenticated client and
//! prints the session state.

use netadmin_application::AuthService;
use netadmin_infrastructure::{ClientConfig, build_auth_service, init_tracing, session_backend};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = ClientConfig::from_env()?;
    info!(
        base_url = %config.base_url,
        timeout_ms = config.request_timeout.as_millis(),
        "Starting netadmin probe v{}",
        env!("CARGO_PKG_VERSION")
    );

    let service = build_auth_service(&config, session_backend(&config))?;
    let mut events = service.client().subscribe();

    sign_in(&service).await?;

    if !service.is_authenticated().await? {
        println!("not signed in; set NETADMIN_USERNAME and NETADMIN_PASSWORD");
        return Ok(());
    }

    match service.profile().await {
        Ok(profile) => {
            println!("signed in as {} <{}>", profile.display_name(), profile.email);
            println!(
                "staff: {}, superuser: {}, active: {}",
                profile.is_staff, profile.is_superuser, profile.is_active
            );
        }
        Err(err) if err.is_session_expired() => {
            warn!(error = %err, "Session could not be recovered");
            println!("session expired, sign in again");
        }
        Err(err) => return Err(err.into()),
    }

    let status = service.status().await?;
    if !status.is_valid() {
        warn!(status = %status.display_message(), "Stored token is no longer valid");
    }
    println!("token: {}", status.display_message());

    while let Ok(event) = events.try_recv() {
        info!(?event, "Session event");
    }

    Ok(())
}

async fn sign_in(service: &AuthService) -> Result<(), Box<dyn std::error::Error>> {
    let (Ok(username), Ok(password)) = (
        std::env::var("NETADMIN_USERNAME"),
        std::env::var("NETADMIN_PASSWORD"),
    ) else {
        return Ok(());
    };

    service.login(&username, &password).await?;
    Ok(())
}
