use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub host: IpAddr,
    pub port: u16,
    pub cors_origin: Option<String>,
    pub db_max_connections: u32,
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let jwt = JwtConfig {
            secret: env_required("JWT_SECRET")?,
            issuer: env_or("JWT_ISSUER", "workforce"),
            audience: env_or("JWT_AUDIENCE", "workforce-clients"),
        };
        if jwt.secret.len() < 32 {
            return Err("JWT_SECRET must be at least 32 characters".to_string());
        }

        let host: IpAddr = env_or("WORKFORCE_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid WORKFORCE_HOST: {e}"))?;

        let port: u16 = env_or("WORKFORCE_PORT", "8080")
            .parse()
            .map_err(|e| format!("Invalid WORKFORCE_PORT: {e}"))?;

        let cors_origin = std::env::var("WORKFORCE_CORS_ORIGIN")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let db_max_connections: u32 = env_or("WORKFORCE_DB_MAX_CONNECTIONS", "10")
            .parse()
            .map_err(|e| format!("Invalid WORKFORCE_DB_MAX_CONNECTIONS: {e}"))?;

        let log_level = env_or("WORKFORCE_LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            jwt,
            host,
            port,
            cors_origin,
            db_max_connections,
            log_level,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
