use super::protocol::{Health, InpaintRequest, InpaintResponse};
use super::ApiError;
use crate::error::Error;
use crate::invoker::PredictCommand;
use crate::pipeline::Pipeline;
use actix_web::{get, post, web, Responder};
use std::io;
use tracing::info;

type Result<T> = std::result::Result<T, ApiError>;

#[get("/health")]
pub async fn health() -> impl Responder {
    web::Json(Health { status: "ok" })
}

#[post("/inpaint")]
pub async fn inpaint(
    req: web::Json<InpaintRequest>,
    state: web::Data<Pipeline<PredictCommand>>,
) -> Result<impl Responder> {
    let req = req.into_inner();
    let state = state.clone();

    // The predictor blocks its thread for the whole inference; keep that off
    // the async workers.
    let result = web::block(move || state.run(&req.image, &req.mask))
        .await
        .map_err(|e| ApiError(Error::Io(io::Error::new(io::ErrorKind::Other, e))))??;

    info!("finished serving inpaint request");
    Ok(web::Json(InpaintResponse { result }))
}
