use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, middleware::Logger, web};
use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use campaign_portal::config::AppConfig;
use campaign_portal::routes::api::scoped_config;
use campaign_portal::state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    let bind = config.bind_address();
    let site_url = config.site_url.clone();
    let state = web::Data::new(AppState::new(config).context("failed to build app state")?);

    info!("Starting campaign portal on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&site_url)
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .service(web::scope("/api").configure(scoped_config))
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
