mod completion;
mod config;
mod web;

use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};

use completion::CompletionClient;
use config::Config;
use web::routes;

// App state structure
pub struct AppState {
    pub client: CompletionClient,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Error: {:#}", e);
            error!("Please set OPENROUTER_API_KEY to your OpenRouter API key.");
            std::process::exit(1);
        }
    };

    let client = match CompletionClient::new(&config.upstream) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to initialize completion client: {:#}", e);
            std::process::exit(1);
        }
    };

    let app_state = Data::new(AppState { client });
    let static_dir = config.static_dir.clone();

    info!("Server listening on {}:{}", config.host, config.port);
    info!("Serving static files from: {}", static_dir.display());
    info!("Access the app at http://localhost:{}", config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(routes::configure)
            .service(routes::static_files(&static_dir))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
