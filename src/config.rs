use crate::models::ClockTime;
use crate::validation::{BusinessHours, TrainerMatch, Validator};
use anyhow::{Context, Result, anyhow};
use std::env;
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub validator: Validator,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't touch the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        let host = lookup("HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string())
            .parse::<IpAddr>()
            .context("Failed to parse HOST")?;
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("Failed to parse PORT")?;

        let defaults = BusinessHours::default();
        let enabled = match lookup("BUSINESS_HOURS_ENABLED") {
            Some(val) => val
                .trim()
                .parse::<bool>()
                .context("Failed to parse BUSINESS_HOURS_ENABLED")?,
            None => defaults.enabled,
        };
        let open = match lookup("BUSINESS_HOURS_OPEN") {
            Some(val) => {
                val.parse::<ClockTime>()
                    .context("Failed to parse BUSINESS_HOURS_OPEN")?
                    .0
            }
            None => defaults.open,
        };
        let close = match lookup("BUSINESS_HOURS_CLOSE") {
            Some(val) => {
                val.parse::<ClockTime>()
                    .context("Failed to parse BUSINESS_HOURS_CLOSE")?
                    .0
            }
            None => defaults.close,
        };
        if enabled && open >= close {
            return Err(anyhow!("BUSINESS_HOURS_OPEN must be before BUSINESS_HOURS_CLOSE"));
        }

        let trainer_match = match lookup("TRAINER_MATCH") {
            Some(val) => val.parse::<TrainerMatch>().map_err(|e| anyhow!(e))?,
            None => TrainerMatch::default(),
        };

        Ok(Config {
            database_url,
            host,
            port,
            validator: Validator {
                business_hours: BusinessHours { enabled, open, close },
                trainer_match,
            },
        })
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
