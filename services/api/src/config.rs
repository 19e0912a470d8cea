use std::env;

use crate::resources::RouteSet;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub routes: RouteSet,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("FLEET_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("FLEET_API_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .expect("FLEET_API_PORT must be a valid port number"),
            routes: env::var("FLEET_API_ROUTES")
                .map(|name| {
                    RouteSet::parse(&name)
                        .expect("FLEET_API_ROUTES must be 'standard' or 'extended'")
                })
                .unwrap_or_default(),
        }
    }
}
