use rocket::{Request, catch, serde::json::Json};
use shared::error::ErrorResponse;

#[catch(400)]
pub fn bad_request(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new("Invalid request parameters."))
}

#[catch(404)]
pub fn not_found(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new("The requested resource was not found."))
}

#[catch(413)]
pub fn payload_too_large(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new("Upload is too large."))
}

#[catch(422)]
pub fn unprocessable_entity(req: &Request) -> Json<ErrorResponse> {
    let error_msg = match req.uri().path().segments().last() {
        Some("votes") => "Voter name and voted_for are required",
        Some("participants") => "Name and photo are required",
        _ => "The request body could not be processed.",
    };
    Json(ErrorResponse::new(error_msg))
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new("An internal server error occurred."))
}
