use anyhow::{Result, anyhow};
use portfolio_notification::{Relay, SmtpRelay};

/// Logs in to the configured relay and reports the result
pub async fn check(config: crate::config::Config) -> Result<()> {
    let credentials = config
        .email
        .credentials()
        .ok_or_else(|| anyhow!("Missing EMAIL_ADDRESS or EMAIL_PASSWORD environment variables."))?;

    tracing::info!(
        host = %config.email.smtp_host,
        port = config.email.smtp_port,
        address = %credentials.address(),
        "Checking SMTP login"
    );

    SmtpRelay::new(&config.email).verify(&credentials).await?;

    println!("SMTP connection and login successful.");

    Ok(())
}
