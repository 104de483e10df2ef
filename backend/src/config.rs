pub const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";
pub const DEFAULT_PARTICIPANTS_TABLE: &str = "Participants";
pub const DEFAULT_VOTES_TABLE: &str = "Votes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirtableConfig {
    pub api_url: String,
    pub api_key: String,
    pub base_id: String,
    pub participants_table: String,
    pub votes_table: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Airtable(AirtableConfig),
    Memory,
}

impl StoreConfig {
    /// Reads store settings through `lookup` (the deployment's secret store).
    /// Blank values count as unset; without both credentials the process
    /// falls back to an in-memory store.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let (Some(api_key), Some(base_id)) = (get("AIRTABLE_API_KEY"), get("AIRTABLE_BASE_ID")) else {
            return StoreConfig::Memory;
        };

        StoreConfig::Airtable(AirtableConfig {
            api_url: get("AIRTABLE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
            api_key,
            base_id,
            participants_table: get("AIRTABLE_PARTICIPANTS_TABLE")
                .unwrap_or_else(|| DEFAULT_PARTICIPANTS_TABLE.into()),
            votes_table: get("AIRTABLE_VOTES_TABLE").unwrap_or_else(|| DEFAULT_VOTES_TABLE.into()),
        })
    }
}
