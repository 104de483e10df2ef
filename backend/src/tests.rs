#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use async_trait::async_trait;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use rocket::http::{ContentType, Header, Status};
    use rocket::local::asynchronous::{Client, LocalResponse};
    use shared::error::ErrorResponse;
    use shared::models::*;
    use crate::airtable::{equals_formula, is_linked, participant_from_record, vote_from_record, ParticipantFields, RecordPage, VoteFields};
    use crate::build_rocket;
    use crate::config::{StoreConfig, DEFAULT_API_URL};
    use crate::routes::AppState;
    use crate::store::{MemoryStore, NewParticipant, NewVote, RecordStore, StoreError};

    const BOUNDARY: &str = "costume-vote-boundary";
    const PNG: &[u8] = b"\x89PNG\r\n\x1a\nnot really a png";

    async fn client_with(store: Arc<dyn RecordStore>) -> Client {
        Client::tracked(build_rocket(AppState::new(store))).await.unwrap()
    }

    async fn client() -> Client {
        client_with(Arc::new(MemoryStore::new())).await
    }

    fn multipart(name: Option<&str>, photo: Option<(&str, &[u8])>) -> (ContentType, Vec<u8>) {
        let mut body = Vec::new();
        if let Some(name) = name {
            body.extend_from_slice(format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\n{name}\r\n"
            ).as_bytes());
        }
        if let Some((content_type, bytes)) = photo {
            body.extend_from_slice(format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"costume.png\"\r\nContent-Type: {content_type}\r\n\r\n"
            ).as_bytes());
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let content_type = ContentType::new("multipart", "form-data").with_params(("boundary", BOUNDARY));
        (content_type, body)
    }

    async fn register(client: &Client, name: &str) -> Participant {
        let (content_type, body) = multipart(Some(name), Some(("image/png", PNG)));
        let response = client.post("/api/participants")
            .header(content_type)
            .body(body)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        response.into_json::<Participant>().await.unwrap()
    }

    async fn cast<'c>(client: &'c Client, voter_name: &str, voted_for: &str) -> LocalResponse<'c> {
        client.post("/api/votes")
            .header(ContentType::JSON)
            .body(serde_json::json!({ "voter_name": voter_name, "voted_for": voted_for }).to_string())
            .dispatch()
            .await
    }

    async fn error_of(response: LocalResponse<'_>) -> String {
        response.into_json::<ErrorResponse>().await.unwrap().error
    }

    async fn results(client: &Client) -> Vec<RankedParticipant> {
        let response = client.get("/api/results").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        response.into_json().await.unwrap()
    }

    #[rocket::async_test]
    async fn test_register_vote_and_tally() {
        let client = client().await;
        let alice = register(&client, "Alice").await;
        assert_eq!(alice.name, "Alice");

        let listed: Vec<Participant> = client.get("/api/participants").dispatch().await
            .into_json().await.unwrap();
        assert_eq!(listed, vec![alice.clone()]);

        let before = results(&client).await;
        assert_eq!((before[0].vote_count, before[0].rank), (0, 1));

        let response = cast(&client, "Bob", &alice.id).await;
        assert_eq!(response.status(), Status::Ok);
        let vote: Vote = response.into_json().await.unwrap();
        assert_eq!(vote.voter_name, "Bob");
        assert_eq!(vote.voted_for, alice.id);

        let again = cast(&client, "Bob", &alice.id).await;
        assert_eq!(again.status(), Status::BadRequest);
        assert_eq!(error_of(again).await, "You have already voted");

        let votes: Vec<Vote> = client.get("/api/votes").dispatch().await
            .into_json().await.unwrap();
        assert_eq!(votes.len(), 1);

        let after = results(&client).await;
        assert_eq!(after[0].participant.id, alice.id);
        assert_eq!((after[0].vote_count, after[0].rank), (1, 1));
    }

    #[rocket::async_test]
    async fn test_duplicate_check_is_case_sensitive() {
        let client = client().await;
        let alice = register(&client, "Alice").await;

        assert_eq!(cast(&client, "Bob", &alice.id).await.status(), Status::Ok);
        assert_eq!(cast(&client, "bob", &alice.id).await.status(), Status::Ok);
        assert_eq!(cast(&client, "Bob", &alice.id).await.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn test_duplicate_rejected_for_any_target() {
        let client = client().await;
        let alice = register(&client, "Alice").await;
        let carol = register(&client, "Carol").await;

        assert_eq!(cast(&client, "Bob", &alice.id).await.status(), Status::Ok);
        let switch = cast(&client, "Bob", &carol.id).await;
        assert_eq!(switch.status(), Status::BadRequest);
        assert_eq!(error_of(switch).await, "You have already voted");
    }

    #[rocket::async_test]
    async fn test_concurrent_same_name_votes() {
        let client = client().await;
        let alice = register(&client, "Alice").await;

        let (first, second) = tokio::join!(
            cast(&client, "Bob", &alice.id),
            cast(&client, "Bob", &alice.id)
        );
        let mut statuses = vec![first.status(), second.status()];
        statuses.sort_by_key(|s| s.code);
        assert_eq!(statuses, vec![Status::Ok, Status::BadRequest]);
    }

    #[rocket::async_test]
    async fn test_vote_requires_fields() {
        let client = client().await;
        let response = client.post("/api/votes")
            .header(ContentType::JSON)
            .body(r#"{"voter_name":"Bob"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
        assert_eq!(error_of(response).await, "Voter name and voted_for are required");

        let empty = cast(&client, "", "recA").await;
        assert_eq!(empty.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn test_vote_for_unknown_participant() {
        let client = client().await;
        register(&client, "Alice").await;

        let response = cast(&client, "Bob", "recNOPE").await;
        assert_eq!(response.status(), Status::BadRequest);
        assert_eq!(error_of(response).await, "Unknown participant: recNOPE");

        let votes: Vec<Vote> = client.get("/api/votes").dispatch().await
            .into_json().await.unwrap();
        assert!(votes.is_empty());
    }

    #[rocket::async_test]
    async fn test_registration_requires_name_and_photo() {
        let client = client().await;

        let (content_type, body) = multipart(Some("Alice"), None);
        let response = client.post("/api/participants").header(content_type).body(body).dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);
        assert_eq!(error_of(response).await, "Name and photo are required");

        let (content_type, body) = multipart(None, Some(("image/png", PNG)));
        let response = client.post("/api/participants").header(content_type).body(body).dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);

        let (content_type, body) = multipart(Some(""), Some(("image/png", PNG)));
        let response = client.post("/api/participants").header(content_type).body(body).dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn test_registration_rejects_non_image() {
        let client = client().await;
        let (content_type, body) = multipart(Some("Alice"), Some(("application/pdf", b"%PDF-1.4")));
        let response = client.post("/api/participants").header(content_type).body(body).dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);
        assert!(error_of(response).await.starts_with("Photo must be an image"));
    }

    #[rocket::async_test]
    async fn test_photo_is_stored_as_data_url() {
        let client = client().await;
        let alice = register(&client, "Alice").await;

        assert_eq!(alice.photo.len(), 1);
        assert_eq!(alice.photo[0].url, format!("data:image/png;base64,{}", STANDARD.encode(PNG)));
        assert_eq!(alice.photo[0].filename, "costume.png");
        assert_eq!(alice.photo_url(), alice.photo[0].url);
    }

    #[rocket::async_test]
    async fn test_results_rank_ties() {
        let client = client().await;
        let a = register(&client, "A").await;
        let b = register(&client, "B").await;
        let c = register(&client, "C").await;

        for (voter, target) in [("v1", &a), ("v2", &b), ("v3", &a), ("v4", &b), ("v5", &c)] {
            assert_eq!(cast(&client, voter, &target.id).await.status(), Status::Ok);
        }

        let ranked = results(&client).await;
        let summary: Vec<_> = ranked.iter()
            .map(|r| (r.participant.name.as_str(), r.vote_count, r.rank))
            .collect();
        assert_eq!(summary, vec![("A", 2, 1), ("B", 2, 1), ("C", 1, 3)]);
    }

    struct FailingStore;

    #[async_trait]
    impl RecordStore for FailingStore {
        fn backend_tag(&self) -> &'static str { "failing" }

        async fn list_participants(&self) -> Result<Vec<Participant>, StoreError> {
            Err(StoreError::Request("connection refused".into()))
        }

        async fn create_participant(&self, _: NewParticipant) -> Result<Participant, StoreError> {
            Err(StoreError::Status { status: 422, body: "INVALID_ATTACHMENT_OBJECT".into() })
        }

        async fn list_votes(&self) -> Result<Vec<Vote>, StoreError> {
            Err(StoreError::Request("connection refused".into()))
        }

        async fn find_votes_by_voter(&self, _: &str) -> Result<Vec<Vote>, StoreError> {
            Err(StoreError::Request("connection refused".into()))
        }

        async fn create_vote(&self, _: NewVote) -> Result<Vote, StoreError> {
            Err(StoreError::Request("connection refused".into()))
        }
    }

    #[rocket::async_test]
    async fn test_store_failures_are_500() {
        let client = client_with(Arc::new(FailingStore)).await;

        let response = client.get("/api/participants").dispatch().await;
        assert_eq!(response.status(), Status::InternalServerError);
        assert_eq!(error_of(response).await, "Failed to fetch participants");

        let response = client.get("/api/votes").dispatch().await;
        assert_eq!(response.status(), Status::InternalServerError);
        assert_eq!(error_of(response).await, "Failed to fetch votes");

        let response = cast(&client, "Bob", "recA").await;
        assert_eq!(response.status(), Status::InternalServerError);
        assert_eq!(error_of(response).await, "Failed to create vote");

        let (content_type, body) = multipart(Some("Alice"), Some(("image/png", PNG)));
        let response = client.post("/api/participants").header(content_type).body(body).dispatch().await;
        assert_eq!(response.status(), Status::InternalServerError);
        assert_eq!(error_of(response).await, "Failed to create participant");
    }

    #[rocket::async_test]
    async fn test_validation_runs_before_store_access() {
        let client = client_with(Arc::new(FailingStore)).await;
        let response = cast(&client, "", "recA").await;
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn test_cors_for_local_origin() {
        let client = client().await;
        let response = client.options("/api/votes")
            .header(Header::new("Origin", "http://localhost:8080"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Origin"),
            Some("http://localhost:8080")
        );

        let response = client.get("/api/votes")
            .header(Header::new("Origin", "https://elsewhere.example"))
            .dispatch()
            .await;
        assert!(response.headers().get_one("Access-Control-Allow-Origin").is_none());
    }

    #[test]
    fn test_store_config_from_lookup() {
        let config = StoreConfig::from_lookup(|key| match key {
            "AIRTABLE_API_KEY" => Some("pat123".into()),
            "AIRTABLE_BASE_ID" => Some("appXYZ".into()),
            "AIRTABLE_VOTES_TABLE" => Some("Ballots".into()),
            _ => None,
        });
        let StoreConfig::Airtable(airtable) = config else {
            panic!("expected airtable config");
        };
        assert_eq!(airtable.api_url, DEFAULT_API_URL);
        assert_eq!(airtable.base_id, "appXYZ");
        assert_eq!(airtable.participants_table, "Participants");
        assert_eq!(airtable.votes_table, "Ballots");
    }

    #[test]
    fn test_store_config_falls_back_to_memory() {
        assert_eq!(StoreConfig::from_lookup(|_| None), StoreConfig::Memory);

        let blank_key = StoreConfig::from_lookup(|key| match key {
            "AIRTABLE_API_KEY" => Some("  ".into()),
            "AIRTABLE_BASE_ID" => Some("appXYZ".into()),
            _ => None,
        });
        assert_eq!(blank_key, StoreConfig::Memory);
    }

    #[test]
    fn test_equals_formula_escaping() {
        assert_eq!(equals_formula("voter_name", "Bob"), "{voter_name} = 'Bob'");
        assert_eq!(equals_formula("voter_name", "O'Brien"), r"{voter_name} = 'O\'Brien'");
        assert_eq!(equals_formula("voter_name", r"a\'b"), r"{voter_name} = 'a\\\'b'");
    }

    #[test]
    fn test_participant_records_decode() {
        let json = r#"{
            "records": [
                {
                    "id": "recA",
                    "createdTime": "2024-10-31T18:00:00.000Z",
                    "fields": {
                        "name": "Alice",
                        "photo": [
                            {"id": "att1", "url": "https://dl.airtable.com/a.jpg", "filename": "a.jpg", "size": 10},
                            {"id": "att2", "url": "https://dl.airtable.com/b.jpg", "filename": "b.jpg"}
                        ],
                        "created_at": "2024-10-31T18:00:01.000Z"
                    }
                },
                {"id": "recB", "createdTime": "2024-10-31T19:00:00.000Z", "fields": {"name": "Nobody"}}
            ],
            "offset": "itrNext"
        }"#;
        let page: RecordPage<ParticipantFields> = serde_json::from_str(json).unwrap();
        assert_eq!(page.offset.as_deref(), Some("itrNext"));

        let participants: Vec<_> = page.records.into_iter().map(participant_from_record).collect();
        assert_eq!(participants[0].photo.len(), MAX_PHOTO_ATTACHMENTS);
        assert_eq!(participants[0].photo_url(), "https://dl.airtable.com/a.jpg");
        assert_eq!(participants[0].created_at.second(), 1);
        assert!(participants[1].photo.is_empty());
        assert_eq!(participants[1].photo_url(), PLACEHOLDER_PHOTO_URL);
        assert_eq!(participants[1].created_at.hour(), 19);
    }

    #[test]
    fn test_vote_records_decode() {
        let json = r#"{
            "records": [
                {"id": "rec1", "createdTime": "2024-10-31T18:00:00.000Z",
                 "fields": {"voter_name": "Bob", "voted_for": ["recA"]}},
                {"id": "rec2", "createdTime": "2024-10-31T18:05:00.000Z",
                 "fields": {"voter_name": "Carol"}}
            ]
        }"#;
        let page: RecordPage<VoteFields> = serde_json::from_str(json).unwrap();
        assert!(page.offset.is_none());

        let votes: Vec<_> = page.records.into_iter().map(vote_from_record).collect();
        assert_eq!(votes.len(), 2);
        assert_eq!(votes[1].voter_name, "Carol");
        assert!(votes[1].voted_for.is_empty());

        let linked: Vec<_> = votes.into_iter().filter(is_linked).collect();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].voter_name, "Bob");
        assert_eq!(linked[0].voted_for, "recA");
    }
}
