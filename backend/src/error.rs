use rocket::http::Status;
use rocket::response::Responder;
use shared::error::{ErrorReply, ErrorResponse, DUPLICATE_VOTE_MESSAGE};
use shared::validation::ValidationError;
use thiserror::Error;
use tracing::{error, warn};
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{}", DUPLICATE_VOTE_MESSAGE)]
    DuplicateVote,
    #[error("{context}")]
    Upstream {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    /// Adapter for `map_err` that attaches the user-facing message to a store failure.
    pub fn upstream(context: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |source| ApiError::Upstream { context, source }
    }

    pub fn status(&self) -> Status {
        match self {
            ApiError::Validation(_) => Status::BadRequest,
            ApiError::DuplicateVote => Status::BadRequest,
            ApiError::Upstream { .. } => Status::InternalServerError,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        match &self {
            ApiError::Upstream { context, source } => error!("{} {}: {}", req.uri(), context, source),
            other => warn!("{} rejected: {}", req.uri(), other),
        }

        ErrorReply(self.status(), ErrorResponse::new(self.to_string())).respond_to(req)
    }
}
