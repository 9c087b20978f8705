use envconfig::Envconfig;
use std::time::Duration;

#[derive(Envconfig)]
pub struct Config {
    /// Falls back to the in-process store when unset.
    #[envconfig(from = "DATABASE_URL")]
    pub db_url: Option<String>,
    #[envconfig(from = "PORT", default = "5000")]
    pub port: u16,
    #[envconfig(from = "JWT_SECRET")]
    pub jwt_secret: String,
    #[envconfig(from = "TOKEN_TTL_SECS", default = "3600")]
    pub token_ttl_secs: u64,
    #[envconfig(from = "ADMIN_USERNAME", default = "admin")]
    pub admin_username: String,
    #[envconfig(from = "ADMIN_PASSWORD")]
    pub admin_password: Option<String>,
    #[envconfig(from = "ASSETS_DIR", default = "assets")]
    pub assets_dir: String,
    #[envconfig(from = "SEED_CLUBS", default = "true")]
    pub seed_clubs: bool,
}

impl Config {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}
