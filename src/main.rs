use anyhow::{Context, Result};
use std::sync::Arc;

mod auth;
mod config;
mod endpoints;
mod error;
mod gateway;
mod models;
mod session;

use models::LoginRequest;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::Config::load()?;
    config.validate()?;

    // Initialize logging with the configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    tracing::info!("RAG admin client starting");
    tracing::info!("Backend: {}", config.api_base_url);

    let client = gateway::build_http_client(&config)?;
    let tokens = Arc::new(auth::TokenStore::new(client.clone(), &config.api_base_url));

    // Reset of UI state in the console maps to a warning here: the refresh
    // cookie is gone and only a fresh login can recover
    tokens.on_forced_logout(|| {
        tracing::warn!("session expired and could not be refreshed; log in again");
    });

    let api = Arc::new(gateway::ApiGateway::new(
        client,
        &config.api_base_url,
        Arc::clone(&tokens),
    ));
    let session = session::SessionService::new(api, tokens);

    match &config.email {
        Some(email) => {
            let password = dialoguer::Password::new()
                .with_prompt(format!("Password for {email}"))
                .interact()
                .context("Failed to read password")?;

            let user = session
                .login(&LoginRequest {
                    email: email.clone(),
                    password,
                })
                .await
                .map_err(|err| anyhow::anyhow!("login failed: {err}"))?;

            print_user(&user);

            session.logout().await;
            tracing::info!("logged out");
        }
        None => match session.check_auth().await? {
            Some(user) => print_user(&user),
            None => {
                tracing::info!("not authenticated; pass --email to log in");
            }
        },
    }

    Ok(())
}

fn print_user(user: &models::User) {
    println!("  User:        {} <{}>", user.id, user.email);
    println!("  Status:      {}", user.status);
    println!("  Roles:       {}", user.roles.join(", "));
    println!("  Permissions: {}", user.permissions.join(", "));
}
