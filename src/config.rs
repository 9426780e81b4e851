use clap::Parser;
use std::net::SocketAddr;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://lorekeeper.db?mode=rwc";

/// Runtime configuration. Every flag falls back to an environment variable,
/// and a `.env` file in the working directory is read first.
#[derive(Debug, Clone, Parser)]
#[command(name = "lorekeeper")]
#[command(version, about = "REST API for books, characters, points of interest and species", long_about = None)]
pub struct Config {
    /// Database connection URL (sqlite, postgres or mysql)
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    /// Address to bind
    #[arg(long, short = 'H', env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Largest `limit` accepted on list endpoints (0 = no cap)
    #[arg(long, env = "MAX_PAGE_SIZE", default_value_t = 100)]
    pub max_page_size: u64,
}

impl Config {
    /// Load `.env` (if present), then parse flags and environment.
    #[must_use]
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }

    /// The cap handed to the pagination layer, `None` when disabled.
    #[must_use]
    pub fn page_size_cap(&self) -> Option<u64> {
        (self.max_page_size > 0).then_some(self.max_page_size)
    }

    /// # Errors
    ///
    /// When `host:port` is not a valid socket address.
    pub fn bind_address(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
