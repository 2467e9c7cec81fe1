use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use dotenv::dotenv;
use house_expense_api::{config::Settings, database::connection::Database, routes};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::load().context("Failed to load configuration")?;
    let database = web::Data::new(
        Database::new(&settings.database).context("Invalid database connection settings")?,
    );
    let api = web::Data::new(settings.api.clone());

    info!(
        "Starting server on {} (database {}:{}/{}, {:?} results)",
        settings.server.address(),
        settings.database.host,
        settings.database.port,
        settings.database.name,
        settings.database.result_mode
    );

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(routes::api::cors())
            .wrap(Logger::default())
            .app_data(database.clone())
            .app_data(api.clone())
            .configure(routes::api::scoped_config::<Database>)
    });

    if let Some(workers) = settings.server.workers {
        server = server.workers(workers);
    }

    server
        .bind((settings.server.host.as_str(), settings.server.port))
        .with_context(|| format!("Failed to bind {}", settings.server.address()))?
        .run()
        .await?;

    Ok(())
}
