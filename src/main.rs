mod auth;
mod confirm;
mod handlers;
mod models;

use auth::{AuthCapability, GoTrueClient};
use clap::{Arg, Command};
use confirm::ConfirmationController;
use models::confirm::ConfirmationOutcome;
use models::{AppConfig, AppState};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn command() -> Command {
    Command::new("supabase-confirm")
        .about("Email confirmation endpoint for Supabase Auth")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(
            Command::new("serve").about("Serve the confirmation routes over HTTP (default)"),
        )
        .subcommand(
            Command::new("confirm")
                .about("Redeem a confirmation link from the terminal")
                .arg(
                    Arg::new("url")
                        .required(true)
                        .help("Confirmation link as received by email"),
                ),
        )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let matches = command().get_matches();

    let app_config = AppConfig::from_env()?;
    let auth: Arc<dyn AuthCapability> = Arc::new(GoTrueClient::new(
        &app_config.supabase_url,
        &app_config.supabase_anon_key,
        app_config.auth_request_timeout,
    )?);

    match matches.subcommand() {
        Some(("confirm", sub)) => {
            let url = sub
                .get_one::<String>("url")
                .map(String::as_str)
                .unwrap_or_default();
            confirm_link(app_config, auth, url).await
        }
        _ => serve(app_config, auth).await,
    }
}

async fn serve(
    app_config: AppConfig,
    auth: Arc<dyn AuthCapability>,
) -> Result<(), Box<dyn std::error::Error>> {
    let bind_addr = app_config.bind_addr.clone();
    let app = handlers::router(AppState {
        config: app_config,
        auth,
    });

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for ctrl-c");
    }
}

async fn confirm_link(
    app_config: AppConfig,
    auth: Arc<dyn AuthCapability>,
    url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let (route_tx, route_rx) = oneshot::channel::<String>();
    let route_tx = Mutex::new(Some(route_tx));
    let navigator = move |route: &str| {
        if let Some(tx) = route_tx.lock().ok().and_then(|mut tx| tx.take()) {
            let _ = tx.send(route.to_string());
        }
    };

    let controller = ConfirmationController::new(
        auth,
        Arc::new(navigator),
        app_config.routes.clone(),
        app_config.redirect_delay,
    );

    let mut updates = controller.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            println!("{}", updates.borrow_and_update().status_text());
            if updates.changed().await.is_err() {
                break;
            }
        }
    });

    let outcome = controller.activate(url).await;

    tokio::select! {
        route = route_rx => {
            if let Ok(route) = route {
                println!("Continue at {}{}", app_config.site_url, route);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            controller.teardown();
            info!("Interrupted before redirect");
        }
    }

    drop(controller);
    let _ = printer.await;

    match outcome {
        ConfirmationOutcome::Error(e) => Err(e.into()),
        _ => Ok(()),
    }
}
