use crate::models::CreateVoteRequest;

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_VOTER_NAME_LENGTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name and photo are required")]
    MissingRegistrationFields,
    #[error("Voter name and voted_for are required")]
    MissingVoteFields,
    #[error("Name exceeds maximum length of {MAX_NAME_LENGTH}")]
    NameTooLong,
    #[error("Voter name exceeds maximum length of {MAX_VOTER_NAME_LENGTH}")]
    VoterNameTooLong,
    #[error("Photo must be an image, got {0}")]
    NotAnImage(String),
    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),
}

/// A vote request that passed field validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidVote {
    pub voter_name: String,
    pub voted_for: String,
}

pub fn validate_vote_request(request: &CreateVoteRequest) -> Result<ValidVote, ValidationError> {
    let (Some(voter_name), Some(voted_for)) = (&request.voter_name, &request.voted_for) else {
        return Err(ValidationError::MissingVoteFields);
    };
    if voter_name.is_empty() || voted_for.is_empty() {
        return Err(ValidationError::MissingVoteFields);
    }
    if voter_name.chars().count() > MAX_VOTER_NAME_LENGTH {
        return Err(ValidationError::VoterNameTooLong);
    }

    Ok(ValidVote {
        voter_name: voter_name.clone(),
        voted_for: voted_for.clone(),
    })
}

pub fn validate_participant_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() { return Err(ValidationError::MissingRegistrationFields); }
    if name.chars().count() > MAX_NAME_LENGTH { return Err(ValidationError::NameTooLong); }
    Ok(())
}

pub fn validate_photo(content_type: &str, bytes: &[u8]) -> Result<(), ValidationError> {
    if bytes.is_empty() { return Err(ValidationError::MissingRegistrationFields); }
    if !content_type.starts_with("image/") {
        return Err(ValidationError::NotAnImage(content_type.to_string()));
    }
    Ok(())
}
