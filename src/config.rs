use std::env;

pub const DEFAULT_MEDIA_FOLDER: &str = "mk-toasted-demo";
pub const DEFAULT_CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Base used to build links in outgoing emails.
    pub public_base_url: String,
    pub admin: AdminSeed,
    pub cloudinary: CloudinaryConfig,
}

/// Credentials for the administrator account created on first boot.
#[derive(Clone)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub api_base: String,
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("api_base", &self.api_base)
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("folder", &self.folder)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"));

        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            admin: AdminSeed::from_env()?,
            cloudinary: CloudinaryConfig::from_env()?,
        })
    }
}

impl AdminSeed {
    pub fn from_env() -> anyhow::Result<Self> {
        let username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let password = env::var("ADMIN_PASSWORD")
            .map_err(|_| anyhow::anyhow!("ADMIN_PASSWORD is not set"))?;
        Ok(Self { username, password })
    }
}

impl CloudinaryConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let require = |key: &str| {
            env::var(key).map_err(|_| anyhow::anyhow!("{key} is not set"))
        };
        Ok(Self {
            api_base: env::var("CLOUDINARY_API_BASE")
                .unwrap_or_else(|_| DEFAULT_CLOUDINARY_API_BASE.to_string()),
            cloud_name: require("CLOUDINARY_CLOUD_NAME")?,
            api_key: require("CLOUDINARY_API_KEY")?,
            api_secret: require("CLOUDINARY_API_SECRET")?,
            folder: env::var("CLOUDINARY_FOLDER")
                .unwrap_or_else(|_| DEFAULT_MEDIA_FOLDER.to_string()),
        })
    }
}
