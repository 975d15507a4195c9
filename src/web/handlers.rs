use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use serde_json::{json, Value};

use crate::web::error::ApiError;
use crate::web::models::{GenerateResponse, PromptRequest};
use crate::AppState;

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// Prompt relay endpoint
pub async fn generate(
    data: web::Data<AppState>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let req = PromptRequest::from_body(body.into_inner()).map_err(|e| {
        error!("Rejected /generate body: {}", e);
        e
    })?;

    let prompt = match req.prompt() {
        Some(prompt) => prompt,
        None => {
            error!("Rejected /generate request without a prompt");
            return Err(ApiError::MissingPrompt);
        }
    };

    info!("Received prompt: {:?}", prompt);

    let completion = data.client.complete(prompt).await.map_err(|e| {
        error!(
            "Error calling completion API (model {}, status {:?}): {}",
            data.client.model(),
            e.status(),
            e
        );
        ApiError::from(e)
    })?;

    let response = completion.render().ok_or_else(|| {
        error!(
            "Completion response did not contain content or reasoning: {:?}",
            completion
        );
        ApiError::EmptyCompletion
    })?;

    info!("Generated response successfully ({} characters)", response.len());
    Ok(HttpResponse::Ok().json(GenerateResponse { response }))
}
