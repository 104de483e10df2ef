use std::sync::Arc;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use shared::models::*;
use shared::tally::{can_vote, rank};
use shared::validation::{validate_participant_name, validate_photo, validate_vote_request, ValidationError};
use crate::error::ApiError;
use crate::store::{NewParticipant, NewVote, RecordStore};

/// An uploaded costume photo as received from the registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub content_type: String,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    /// Inline `data:` URL carrying the image, as accepted by the store's attachment field.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

pub struct VoteProcessor {
    store: Arc<dyn RecordStore>,
    // Serialises check-then-create for votes within this process. The store
    // has no conditional write, so separate instances can still race.
    submissions: Mutex<()>,
}

impl VoteProcessor {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            submissions: Mutex::new(()),
        }
    }

    pub fn backend_tag(&self) -> &'static str {
        self.store.backend_tag()
    }

    pub async fn list_participants(&self) -> Result<Vec<Participant>, ApiError> {
        self.store.list_participants()
            .await
            .map_err(ApiError::upstream("Failed to fetch participants"))
    }

    #[instrument(skip(self, name, photo))]
    pub async fn register_participant(
        &self,
        name: Option<String>,
        photo: Option<PhotoUpload>,
    ) -> Result<Participant, ApiError> {
        let (Some(name), Some(photo)) = (name, photo) else {
            return Err(ValidationError::MissingRegistrationFields.into());
        };
        validate_participant_name(&name)?;
        validate_photo(&photo.content_type, &photo.bytes)?;

        let participant = self.store.create_participant(NewParticipant {
                name,
                photo: PhotoAttachment {
                    url: photo.data_url(),
                    filename: photo.filename,
                },
            })
            .await
            .map_err(ApiError::upstream("Failed to create participant"))?;

        info!(participant_id = %participant.id, "Registered participant");
        Ok(participant)
    }

    pub async fn list_votes(&self) -> Result<Vec<Vote>, ApiError> {
        self.store.list_votes()
            .await
            .map_err(ApiError::upstream("Failed to fetch votes"))
    }

    #[instrument(skip(self, request))]
    pub async fn submit_vote(&self, request: &CreateVoteRequest) -> Result<Vote, ApiError> {
        let ballot = validate_vote_request(request)?;
        let _submission = self.submissions.lock().await;

        let existing = self.store.find_votes_by_voter(&ballot.voter_name)
            .await
            .map_err(ApiError::upstream("Failed to create vote"))?;
        if !can_vote(&ballot.voter_name, &existing) {
            warn!("Duplicate vote attempt for voter name {:?}", ballot.voter_name);
            return Err(ApiError::DuplicateVote);
        }

        let participants = self.store.list_participants()
            .await
            .map_err(ApiError::upstream("Failed to create vote"))?;
        if !participants.iter().any(|p| p.id == ballot.voted_for) {
            return Err(ValidationError::UnknownParticipant(ballot.voted_for).into());
        }

        let vote = self.store.create_vote(NewVote {
                voter_name: ballot.voter_name,
                voted_for: ballot.voted_for,
            })
            .await
            .map_err(ApiError::upstream("Failed to create vote"))?;

        info!(vote_id = %vote.id, participant_id = %vote.voted_for, "Vote recorded");
        Ok(vote)
    }

    pub async fn results(&self) -> Result<Vec<RankedParticipant>, ApiError> {
        let (participants, votes) = tokio::try_join!(
            self.store.list_participants(),
            self.store.list_votes()
        )
        .map_err(ApiError::upstream("Failed to load results"))?;

        Ok(rank(&participants, &votes))
    }
}
