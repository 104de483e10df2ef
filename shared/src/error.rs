use serde::{Serialize, Deserialize};

pub const DUPLICATE_VOTE_MESSAGE: &str = "You have already voted";

/// JSON body of every failed API response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

#[cfg(feature = "backend")]
mod backend_impl {
    use super::ErrorResponse;
    use rocket::http::Status;
    use rocket::response::{self, Responder};
    use rocket::serde::json::Json;
    use rocket::Request;

    /// Pairs an error body with the status it should be sent under.
    pub struct ErrorReply(pub Status, pub ErrorResponse);

    impl<'r, 'o: 'r> Responder<'r, 'o> for ErrorReply {
        fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
            (self.0, Json(self.1)).respond_to(req)
        }
    }
}

#[cfg(feature = "backend")]
pub use backend_impl::ErrorReply;
