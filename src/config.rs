use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub session_duration_hours: i64,
    pub student_email_domain: String,
    pub professional_email_domain: String,
    pub reset_token_ttl_minutes: i64,
    pub seed_professional_email: Option<String>,
    pub seed_professional_password: Option<String>,
    pub seed_professional_center: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://consultorio.db?mode=rwc".to_string());

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let session_duration_hours = env::var("SESSION_DURATION_HOURS")
            .unwrap_or_else(|_| "9".to_string())
            .parse()
            .unwrap_or(9);

        // Student addresses are derived from the registration number plus this
        // suffix; professional addresses must already carry their domain.
        let student_email_domain =
            env::var("STUDENT_EMAIL_DOMAIN").unwrap_or_else(|_| "alu.murciaeduca.es".to_string());

        let professional_email_domain =
            env::var("PROFESSIONAL_EMAIL_DOMAIN").unwrap_or_else(|_| "murciaeduca.es".to_string());

        let reset_token_ttl_minutes = env::var("RESET_TOKEN_TTL_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let seed_professional_email = env::var("SEED_PROFESSIONAL_EMAIL").ok();
        let seed_professional_password = env::var("SEED_PROFESSIONAL_PASSWORD").ok();
        let seed_professional_center =
            env::var("SEED_PROFESSIONAL_CENTER").unwrap_or_else(|_| "center-001".to_string());

        Ok(Config {
            database_url,
            server_host,
            server_port,
            session_duration_hours,
            student_email_domain,
            professional_email_domain,
            reset_token_ttl_minutes,
            seed_professional_email,
            seed_professional_password,
            seed_professional_center,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,
}
