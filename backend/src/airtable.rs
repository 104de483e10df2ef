use std::time::Duration;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, instrument, warn};
use shared::models::*;
use crate::config::AirtableConfig;
use crate::store::{NewParticipant, NewVote, RecordStore, StoreError};

const PAGE_SIZE: u32 = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
}

impl RetryPolicy {
    /// Delay before the retry that follows `attempt`; grows linearly.
    pub fn backoff(&self, attempt: usize) -> Duration {
        Duration::from_millis(self.base_backoff_ms.saturating_mul(attempt as u64))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 200,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordPage<F> {
    pub records: Vec<Record<F>>,
    #[serde(default)]
    pub offset: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Record<F> {
    pub id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_time: OffsetDateTime,
    pub fields: F,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ParticipantFields {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub photo: Vec<PhotoAttachment>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct VoteFields {
    #[serde(default)]
    pub voter_name: Option<String>,
    #[serde(default)]
    pub voted_for: Vec<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Serialize)]
struct CreateRecord<F> {
    fields: F,
}

#[derive(Serialize)]
struct NewParticipantFields<'a> {
    name: &'a str,
    photo: [&'a PhotoAttachment; 1],
}

#[derive(Serialize)]
struct NewVoteFields<'a> {
    voter_name: &'a str,
    voted_for: [&'a str; 1],
}

pub(crate) fn participant_from_record(record: Record<ParticipantFields>) -> Participant {
    let mut photo = record.fields.photo;
    photo.truncate(MAX_PHOTO_ATTACHMENTS);
    Participant {
        id: record.id,
        name: record.fields.name.unwrap_or_default(),
        photo,
        created_at: record.fields.created_at.unwrap_or(record.created_time),
    }
}

/// Votes are stored with a linked-record list; only the first link counts.
/// The store clears the link when the participant is deleted, which leaves
/// `voted_for` empty.
pub(crate) fn vote_from_record(record: Record<VoteFields>) -> Vote {
    Vote {
        id: record.id,
        voter_name: record.fields.voter_name.unwrap_or_default(),
        voted_for: record.fields.voted_for.into_iter().next().unwrap_or_default(),
        created_at: record.fields.created_at.unwrap_or(record.created_time),
    }
}

pub(crate) fn is_linked(vote: &Vote) -> bool {
    if vote.voted_for.is_empty() {
        debug!(record_id = %vote.id, "Skipping vote record without a linked participant");
        return false;
    }
    true
}

/// Builds `{field} = 'value'` with the value quoted for the formula language.
pub fn equals_formula(field: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("{{{}}} = '{}'", field, escaped)
}

pub struct AirtableStore {
    client: reqwest::Client,
    config: AirtableConfig,
    retry: RetryPolicy,
}

impl AirtableStore {
    pub fn new(config: AirtableConfig, retry: RetryPolicy) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Request(e.to_string()))?;
        Ok(Self { client, config, retry })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.config.api_url.trim_end_matches('/'), self.config.base_id, table)
    }

    async fn list_records<F: DeserializeOwned>(
        &self,
        table: &str,
        formula: Option<&str>,
    ) -> Result<Vec<Record<F>>, StoreError> {
        let url = self.table_url(table);
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(formula) = formula {
                query.push(("filterByFormula", formula.to_string()));
            }
            if let Some(offset) = &offset {
                query.push(("offset", offset.clone()));
            }

            let page: RecordPage<F> = self.get_with_retry(&url, &query).await?;
            records.extend(page.records);
            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(records)
    }

    #[instrument(name = "airtable_get", skip(self, query))]
    async fn get_with_retry<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, StoreError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let request = self.client.get(url)
                .bearer_auth(&self.config.api_key)
                .query(query);

            match request.send().await {
                Ok(resp) if resp.status().is_success() => {
                    return resp.json::<T>().await
                        .map_err(|e| StoreError::Decode(e.to_string()));
                }
                Ok(resp) => {
                    let status = resp.status();
                    let permanent = status.is_client_error() && status.as_u16() != 429;
                    if permanent || attempt >= self.retry.max_attempts {
                        let body = resp.text().await.unwrap_or_default();
                        return Err(StoreError::Status { status: status.as_u16(), body });
                    }
                    warn!("Store read returned {} (attempt {}/{})", status, attempt, self.retry.max_attempts);
                }
                Err(e) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(StoreError::Request(e.to_string()));
                    }
                    warn!("Store read failed (attempt {}/{}): {}", attempt, self.retry.max_attempts, e);
                }
            }

            tokio::time::sleep(self.retry.backoff(attempt)).await;
        }
    }

    /// Creates are sent once; a retried create could leave a duplicate record.
    #[instrument(name = "airtable_create", skip(self, fields))]
    async fn create_record<B: Serialize + Send + Sync, F: DeserializeOwned>(
        &self,
        table: &str,
        fields: B,
    ) -> Result<Record<F>, StoreError> {
        let resp = self.client.post(self.table_url(table))
            .bearer_auth(&self.config.api_key)
            .json(&CreateRecord { fields })
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Status { status: status.as_u16(), body });
        }

        resp.json::<Record<F>>().await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RecordStore for AirtableStore {
    fn backend_tag(&self) -> &'static str {
        "airtable"
    }

    async fn list_participants(&self) -> Result<Vec<Participant>, StoreError> {
        let records = self.list_records::<ParticipantFields>(&self.config.participants_table, None).await?;
        Ok(records.into_iter().map(participant_from_record).collect())
    }

    async fn create_participant(&self, participant: NewParticipant) -> Result<Participant, StoreError> {
        let fields = NewParticipantFields {
            name: &participant.name,
            photo: [&participant.photo],
        };
        let record = self.create_record::<_, ParticipantFields>(&self.config.participants_table, fields).await?;
        Ok(participant_from_record(record))
    }

    async fn list_votes(&self) -> Result<Vec<Vote>, StoreError> {
        let records = self.list_records::<VoteFields>(&self.config.votes_table, None).await?;
        Ok(records.into_iter().map(vote_from_record).filter(is_linked).collect())
    }

    async fn find_votes_by_voter(&self, voter_name: &str) -> Result<Vec<Vote>, StoreError> {
        let formula = equals_formula("voter_name", voter_name);
        // Unlinked votes still count against the voter.
        let records = self.list_records::<VoteFields>(&self.config.votes_table, Some(&formula)).await?;
        Ok(records.into_iter().map(vote_from_record).collect())
    }

    async fn create_vote(&self, vote: NewVote) -> Result<Vote, StoreError> {
        let fields = NewVoteFields {
            voter_name: &vote.voter_name,
            voted_for: [&vote.voted_for],
        };
        let record = self.create_record::<_, VoteFields>(&self.config.votes_table, fields).await?;
        let vote = vote_from_record(record);
        if vote.voted_for.is_empty() {
            return Err(StoreError::Decode("created vote has no linked participant".into()));
        }
        Ok(vote)
    }
}
