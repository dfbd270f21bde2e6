use actix_web::{middleware, web, App, HttpServer};
use inpaintd::invoker::PredictCommand;
use inpaintd::pipeline::{MaskLayout, Pipeline};
use inpaintd::server::routes;
use inpaintd::settings::Settings;
use inpaintd::workspace::WorkspaceManager;
use std::io;
use tracing::info;

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt::init();

    let settings = Settings::load()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    info!("starting inpaintd on {}", settings.bind_addr);

    let pipeline = web::Data::new(Pipeline::new(
        WorkspaceManager::new(&settings.workspace_root),
        PredictCommand::from_settings(&settings),
        MaskLayout::Sibling,
    ));

    let bind_addr = settings.bind_addr.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(pipeline.clone())
            .wrap(middleware::Logger::default())
            .service(routes::health)
            .service(routes::inpaint)
    })
    .bind(bind_addr)?
    .run()
    .await
}
