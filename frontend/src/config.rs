pub struct Config {
    pub api_base_url: &'static str,
    pub results_poll_ms: u32,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            api_base_url: "/api",
            results_poll_ms: 5_000,
        }
    }
}

pub const CONFIG: Config = Config::new();
