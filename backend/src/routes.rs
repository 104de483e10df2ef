use std::sync::Arc;
use rocket::{State, get, post, http::Status, serde::json::Json};
use rocket::data::ToByteUnit;
use rocket::form::{self, DataField, Form, FromFormField};
use rocket::FromForm;
use tracing::{debug, instrument};
use shared::models::*;
use crate::{
    error::ApiError,
    processor::{PhotoUpload, VoteProcessor},
    store::RecordStore,
};

pub const MAX_PHOTO_BYTES: u64 = 10 * 1024 * 1024;

pub struct AppState {
    pub votes: VoteProcessor,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            votes: VoteProcessor::new(store),
        }
    }
}

#[rocket::async_trait]
impl<'v> FromFormField<'v> for PhotoUpload {
    async fn from_data(field: DataField<'v, '_>) -> form::Result<'v, Self> {
        let limit = field.request.limits().get("file").unwrap_or(MAX_PHOTO_BYTES.bytes());
        let bytes = field.data.open(limit)
            .into_bytes()
            .await
            .map_err(|e| form::Error::validation(format!("photo upload failed: {}", e)))?;
        if !bytes.is_complete() {
            Err(form::Error::validation("photo exceeds upload limit"))?;
        }

        let stem = field.file_name
            .and_then(|name| name.as_str())
            .filter(|stem| !stem.is_empty())
            .unwrap_or("photo");
        let filename = match field.content_type.extension() {
            Some(ext) => format!("{}.{}", stem, ext),
            None => stem.to_string(),
        };

        Ok(PhotoUpload {
            content_type: field.content_type.to_string(),
            filename,
            bytes: bytes.into_inner(),
        })
    }
}

#[derive(FromForm)]
pub struct RegistrationForm {
    pub name: Option<String>,
    pub photo: Option<PhotoUpload>,
}

#[get("/participants")]
pub async fn list_participants(state: &State<AppState>) -> Result<Json<Vec<Participant>>, ApiError> {
    state.votes.list_participants().await.map(Json)
}

#[instrument(skip(state, registration))]
#[post("/participants", data = "<registration>")]
pub async fn create_participant(
    state: &State<AppState>,
    registration: Form<RegistrationForm>,
) -> Result<Json<Participant>, ApiError> {
    let RegistrationForm { name, photo } = registration.into_inner();
    debug!(
        "Registration received: name={}, photo_bytes={}",
        name.is_some(),
        photo.as_ref().map_or(0, |p| p.bytes.len())
    );

    state.votes.register_participant(name, photo).await.map(Json)
}

#[get("/votes")]
pub async fn list_votes(state: &State<AppState>) -> Result<Json<Vec<Vote>>, ApiError> {
    state.votes.list_votes().await.map(Json)
}

#[instrument(skip(state, request))]
#[post("/votes", format = "json", data = "<request>")]
pub async fn create_vote(
    state: &State<AppState>,
    request: Json<CreateVoteRequest>,
) -> Result<Json<Vote>, ApiError> {
    state.votes.submit_vote(&request.into_inner()).await.map(Json)
}

#[get("/results")]
pub async fn get_results(state: &State<AppState>) -> Result<Json<Vec<RankedParticipant>>, ApiError> {
    state.votes.results().await.map(Json)
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}
