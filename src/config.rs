use actix_web::http::Uri;
use std::env;

const DEFAULT_PORT: u16 = 9000;
const DEFAULT_DB_NAME: &str = "causebridgeDB";
const DEFAULT_DB_CLUSTER: &str = "cluster0.upkox.mongodb.net";
const DEFAULT_ORIGINS: [&str; 2] = [
    "http://localhost:5173",
    "https://causebridge-client.web.app",
];

/// Runtime settings sourced from the process environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_name: String,
    pub token_secret: String,
    pub production: bool,
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match non_empty("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| format!("PORT must be a valid port number, got '{}'", raw))?,
            None => DEFAULT_PORT,
        };

        let database_url = match non_empty("DATABASE_URL") {
            Some(url) => url,
            None => {
                let user = non_empty("DB_USER")
                    .ok_or("DATABASE_URL or DB_USER/DB_PASS must be set")?;
                let pass = non_empty("DB_PASS")
                    .ok_or("DATABASE_URL or DB_USER/DB_PASS must be set")?;
                let cluster =
                    non_empty("DB_CLUSTER").unwrap_or_else(|| DEFAULT_DB_CLUSTER.to_string());
                format!(
                    "mongodb+srv://{}:{}@{}/?retryWrites=true&w=majority&appName=Cluster0",
                    user, pass, cluster
                )
            }
        };

        let database_name = non_empty("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string());
        let token_secret =
            non_empty("ACCESS_TOKEN_SECRET").ok_or("ACCESS_TOKEN_SECRET must be set")?;

        let production = non_empty("APP_ENV")
            .map(|mode| mode.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let allowed_origins: Vec<String> = match non_empty("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|o| o.trim().trim_end_matches('/').to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            None => DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };
        if allowed_origins.is_empty() {
            return Err("CORS_ORIGINS must list at least one origin".into());
        }
        for origin in &allowed_origins {
            validate_origin(origin)?;
        }

        Ok(Self {
            host,
            port,
            database_url,
            database_name,
            token_secret,
            production,
            allowed_origins,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Same acceptance rule actix-cors applies when workers build the CORS layer:
/// an explicit `http(s)://host[:port]` with no wildcard, path or query.
fn validate_origin(origin: &str) -> Result<(), String> {
    if origin == "*" {
        return Err("CORS_ORIGINS must list explicit origins, '*' is not allowed".into());
    }

    let invalid = || format!("CORS_ORIGINS entry '{}' is not a valid origin", origin);
    let uri: Uri = origin.parse().map_err(|_| invalid())?;
    let scheme_ok = matches!(uri.scheme_str(), Some("http") | Some("https"));
    let bare = matches!(uri.path(), "" | "/") && uri.query().is_none();
    if !scheme_ok || uri.authority().is_none() || !bare {
        return Err(invalid());
    }
    Ok(())
}
