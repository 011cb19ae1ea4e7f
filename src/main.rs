//! Adminlite data-access smoke CLI
//!
//! Loads configuration, initializes logging, bootstraps a session, and
//! lists every resource once — reporting for each whether the backend or
//! the fallback store answered.

use adminlite::gateway::resources::fixtures;
use adminlite::models::{Article, MediaItem, NewsItem, Product, Resource, Testimonial, User};
use adminlite::core::ErrorDetail;
use adminlite::{
    ApiClient, ReqwestTransport, ResourceGateway, RevalidationBus, SessionBootstrapper, TokenStore,
};

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (handles CLI args, env vars, and config file)
    let config = match adminlite::core::config::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Print to stderr since logging isn't initialized yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let _logger = match adminlite::core::Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return Err(e);
        }
    };

    info!("Starting adminlite data-access core v{}", adminlite::VERSION);
    info!(
        base_url = %config.api.base_url,
        request_timeout = config.api.request_timeout,
        "Backend configuration"
    );

    let transport = Arc::new(ReqwestTransport::new(
        &config.api.base_url,
        Duration::from_secs(config.api.request_timeout),
    )?);
    let client = ApiClient::new(transport);
    let tokens = Arc::new(TokenStore::open(config.session.token_file.clone()));
    let bus = Arc::new(RevalidationBus::new());

    // Session bootstrap runs exactly once per process.
    let bootstrapper =
        SessionBootstrapper::new(client.clone(), tokens.clone(), bus.clone(), &config.session);
    let session = bootstrapper.bootstrap().await?;
    info!(
        user = %session.user.display_name,
        role = session.user.role.as_str(),
        backend_online = session.backend_online,
        "Session ready"
    );

    // One gateway per resource, each owning its seeded fallback store.
    let products = ResourceGateway::<Product>::new(
        client.clone(),
        tokens.clone(),
        bus.clone(),
        fixtures::products(),
    );
    let articles = ResourceGateway::<Article>::new(
        client.clone(),
        tokens.clone(),
        bus.clone(),
        fixtures::articles(),
    );
    let news = ResourceGateway::<NewsItem>::new(
        client.clone(),
        tokens.clone(),
        bus.clone(),
        fixtures::news(),
    );
    let testimonials = ResourceGateway::<Testimonial>::new(
        client.clone(),
        tokens.clone(),
        bus.clone(),
        fixtures::testimonials(),
    );
    let media = ResourceGateway::<MediaItem>::new(
        client.clone(),
        tokens.clone(),
        bus.clone(),
        fixtures::media(),
    );
    let users = ResourceGateway::<User>::new(
        client.clone(),
        tokens.clone(),
        bus.clone(),
        fixtures::users(),
    );

    report(&products).await;
    report(&articles).await;
    report(&news).await;
    report(&testimonials).await;
    report(&media).await;
    report(&users).await;

    Ok(())
}

async fn report<R: Resource>(gateway: &ResourceGateway<R>) {
    match gateway.list().await {
        Ok(served) => info!(
            resource = R::TAG,
            count = served.value.len(),
            source = if served.is_fallback() { "fallback" } else { "live" },
            "Listed resource"
        ),
        Err(e) => {
            let detail = ErrorDetail::from(&e);
            tracing::error!(
                resource = R::TAG,
                kind = detail.kind,
                error = %detail.message,
                "List failed"
            )
        }
    }
}
