use dotenv::dotenv;
use log::{error, info, warn};
use std::env;
use std::net::SocketAddr;
use warp::Filter;

use policy_rules_api::routes;
use policy_rules_api::services::fred::FredClient;

#[tokio::main]
async fn main() {
    // Initialize the logger
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    // .env supplies FRED_API_KEY and optional overrides
    dotenv().ok();

    // A missing credential is fatal; nothing downstream can run without it.
    let client = match FredClient::shared() {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to construct FRED client: {}", e);
            std::process::exit(1);
        }
    };
    info!("FRED client constructed");

    let port_str = env::var("PORT").unwrap_or_else(|_| {
        warn!("$PORT not set, defaulting to 3030");
        "3030".to_string()
    });

    let port: u16 = port_str.parse().expect("PORT must be a number");
    info!("Using PORT: {}", port);

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    info!("Will bind to: {}", addr);

    // Set up CORS
    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET"]);

    // Set up routes
    let api = routes::routes(client).with(cors);
    info!("Routes configured successfully with CORS.");

    // Start the server
    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
}
