pub mod error;
pub mod models;
pub mod validation;
pub mod tally;

pub use error::{ErrorResponse, DUPLICATE_VOTE_MESSAGE};
pub use models::*;
pub use validation::*;
pub use tally::{can_vote, count_votes, rank};
