use std::env;

#[derive(Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub jwt_secret: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, String> {
        let listen_addr =
            env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set".to_string())?;

        Ok(ServerConfig {
            listen_addr,
            jwt_secret,
        })
    }
}
