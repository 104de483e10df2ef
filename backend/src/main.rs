use std::sync::Arc;
use backend::{
    airtable::{AirtableStore, RetryPolicy},
    build_rocket,
    config::StoreConfig,
    routes::AppState,
    store::{MemoryStore, RecordStore},
};
use rocket::{routes, fs::NamedFile};
use shuttle_runtime::CustomError;
use tracing::{info, warn};
use include_dir::{include_dir, Dir};
use uuid::Uuid;

static STATIC_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

#[rocket::get("/<path..>")]
async fn spa_handler(path: std::path::PathBuf, temp_dir: &rocket::State<std::path::PathBuf>) -> Option<NamedFile> {
    let file_path = temp_dir.join(&path);
    if file_path.exists() && file_path.is_file() {
        NamedFile::open(&file_path).await.ok()
    } else {
        NamedFile::open(temp_dir.join("index.html")).await.ok()
    }
}

#[shuttle_runtime::main]
async fn rocket(
    #[shuttle_runtime::Secrets] secret_store: shuttle_runtime::SecretStore,
) -> shuttle_rocket::ShuttleRocket {
    info!("🚀 Starting costume vote server");

    let store: Arc<dyn RecordStore> = match StoreConfig::from_lookup(|key| secret_store.get(key)) {
        StoreConfig::Airtable(config) => {
            info!("📋 Using Airtable base {}", config.base_id);
            Arc::new(AirtableStore::new(config, RetryPolicy::default()).map_err(CustomError::new)?)
        }
        StoreConfig::Memory => {
            warn!("AIRTABLE_API_KEY or AIRTABLE_BASE_ID not found - records will only be kept in memory");
            Arc::new(MemoryStore::new())
        }
    };
    let app_state = AppState::new(store);
    info!("Record store: {}", app_state.votes.backend_tag());

    let temp_dir = std::env::temp_dir().join(format!("costume_vote_static_{}", Uuid::new_v4()));
    std::fs::create_dir_all(&temp_dir).map_err(CustomError::new)?;
    STATIC_DIR.extract(&temp_dir).map_err(CustomError::new)?;

    let rocket = build_rocket(app_state)
        .manage(temp_dir)
        .mount("/", routes![spa_handler]);

    Ok(rocket.into())
}
