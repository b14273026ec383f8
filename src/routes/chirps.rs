use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::validators::clean_chirp_body;

#[derive(Deserialize)]
pub struct ChirpRequest {
    pub body: String,
}

#[derive(Serialize)]
pub struct CleanedChirp {
    pub cleaned_body: String,
}

/// POST /api/validate_chirp
pub async fn validate_chirp(form: web::Json<ChirpRequest>) -> Result<HttpResponse, AppError> {
    let cleaned_body = clean_chirp_body(&form.body)?;
    Ok(HttpResponse::Ok().json(CleanedChirp { cleaned_body }))
}
