use std::sync::Mutex;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;
use shared::models::*;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Request(String),
    #[error("store returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("store response could not be decoded: {0}")]
    Decode(String),
    #[error("store lock poisoned")]
    LockFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewParticipant {
    pub name: String,
    pub photo: PhotoAttachment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVote {
    pub voter_name: String,
    pub voted_for: String,
}

/// Access to the two record collections. Records are only ever created and read.
#[async_trait]
pub trait RecordStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn list_participants(&self) -> Result<Vec<Participant>, StoreError>;

    async fn create_participant(&self, participant: NewParticipant) -> Result<Participant, StoreError>;

    async fn list_votes(&self) -> Result<Vec<Vote>, StoreError>;

    /// Votes whose `voter_name` equals `voter_name`, filtered by the store.
    /// Includes votes whose participant link was cleared (empty `voted_for`).
    async fn find_votes_by_voter(&self, voter_name: &str) -> Result<Vec<Vote>, StoreError>;

    async fn create_vote(&self, vote: NewVote) -> Result<Vote, StoreError>;
}

fn record_id() -> String {
    format!("rec{}", Uuid::new_v4().simple())
}

/// Process-local store used when no external store is configured, and by tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    participants: Mutex<Vec<Participant>>,
    votes: Mutex<Vec<Vote>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn list_participants(&self) -> Result<Vec<Participant>, StoreError> {
        let participants = self.participants.lock().map_err(|_| StoreError::LockFailed)?;
        Ok(participants.clone())
    }

    async fn create_participant(&self, participant: NewParticipant) -> Result<Participant, StoreError> {
        let record = Participant {
            id: record_id(),
            name: participant.name,
            photo: vec![participant.photo],
            created_at: OffsetDateTime::now_utc(),
        };
        let mut participants = self.participants.lock().map_err(|_| StoreError::LockFailed)?;
        participants.push(record.clone());
        Ok(record)
    }

    async fn list_votes(&self) -> Result<Vec<Vote>, StoreError> {
        let votes = self.votes.lock().map_err(|_| StoreError::LockFailed)?;
        Ok(votes.clone())
    }

    async fn find_votes_by_voter(&self, voter_name: &str) -> Result<Vec<Vote>, StoreError> {
        let votes = self.votes.lock().map_err(|_| StoreError::LockFailed)?;
        Ok(votes.iter()
            .filter(|vote| vote.voter_name == voter_name)
            .cloned()
            .collect())
    }

    async fn create_vote(&self, vote: NewVote) -> Result<Vote, StoreError> {
        let record = Vote {
            id: record_id(),
            voter_name: vote.voter_name,
            voted_for: vote.voted_for,
            created_at: OffsetDateTime::now_utc(),
        };
        let mut votes = self.votes.lock().map_err(|_| StoreError::LockFailed)?;
        votes.push(record.clone());
        Ok(record)
    }
}
