//! Redis cache service for upstream lookups

use std::env;

use redis::{AsyncCommands, Client};
use serde::{Serialize, de::DeserializeOwned};

use crate::model::{Coordinates, OutbreakResult};
use crate::service::cache_keys::location_key;

// Environment variable names
const ENV_REDIS_HOST: &str = "ECO_GUARDIAN_REDIS_HOST";
const ENV_REDIS_PORT: &str = "ECO_GUARDIAN_REDIS_PORT";
const ENV_REDIS_PASSWORD: &str = "ECO_GUARDIAN_REDIS_PASSWORD";
const ENV_REDIS_DB: &str = "ECO_GUARDIAN_REDIS_DB";
const ENV_CACHE_TTL: &str = "ECO_GUARDIAN_CACHE_TTL";

// Default values
const DEFAULT_REDIS_HOST: &str = "127.0.0.1";
const DEFAULT_REDIS_PORT: &str = "6379";
const DEFAULT_REDIS_DB: &str = "0";
const DEFAULT_TTL_SECONDS: u64 = 3600; // 1 hour

// Place names rarely move
const GEOCODE_TTL_SECONDS: u64 = 24 * 60 * 60;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Cache miss for key: {0}")]
    Miss(String),
}

// Cache key prefixes
const PREFIX_GEOCODE: &str = "geo:";
const PREFIX_OUTBREAKS: &str = "outbreaks:";

/// Redis-based cache for geocoding results and outbreak aggregates
#[derive(Clone)]
pub struct UpstreamCache {
    client: Client,
    ttl_seconds: u64,
}

impl UpstreamCache {
    /// Create a new cache instance and verify connection
    ///
    /// Configuration via environment variables:
    /// - `ECO_GUARDIAN_REDIS_HOST` - Redis host (default: 127.0.0.1)
    /// - `ECO_GUARDIAN_REDIS_PORT` - Redis port (default: 6379)
    /// - `ECO_GUARDIAN_REDIS_PASSWORD` - Redis password (default: none)
    /// - `ECO_GUARDIAN_REDIS_DB` - Redis database number (default: 0)
    /// - `ECO_GUARDIAN_CACHE_TTL` - Outbreak cache TTL in seconds (default: 3600)
    pub async fn new() -> Result<Self, CacheError> {
        let host = env::var(ENV_REDIS_HOST).unwrap_or_else(|_| DEFAULT_REDIS_HOST.to_string());
        let port = env::var(ENV_REDIS_PORT).unwrap_or_else(|_| DEFAULT_REDIS_PORT.to_string());
        let password = env::var(ENV_REDIS_PASSWORD).ok();
        let db = env::var(ENV_REDIS_DB).unwrap_or_else(|_| DEFAULT_REDIS_DB.to_string());

        let ttl_seconds = env::var(ENV_CACHE_TTL)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TTL_SECONDS);

        // Build Redis URL: redis://[password@]host:port/db
        let redis_url = match password {
            Some(pwd) if !pwd.is_empty() => format!("redis://:{}@{}:{}/{}", pwd, host, port, db),
            _ => format!("redis://{}:{}/{}", host, port, db),
        };

        tracing::debug!(host = %host, port = %port, db = %db, "Connecting to Redis");

        let client = Client::open(redis_url)?;

        let cache = Self {
            client,
            ttl_seconds,
        };
        cache.ping().await?;

        tracing::info!(host = %host, port = %port, "Redis connection established");

        Ok(cache)
    }

    /// Check the connection is alive
    pub async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    /// Get cached coordinates for a place name
    pub async fn get_coordinates(&self, place: &str) -> Result<Coordinates, CacheError> {
        self.get_with_prefix(PREFIX_GEOCODE, &location_key(place)).await
    }

    /// Cache coordinates for a place name
    pub async fn set_coordinates(
        &self,
        place: &str,
        coords: &Coordinates,
    ) -> Result<(), CacheError> {
        self.set_with_prefix_and_ttl(PREFIX_GEOCODE, &location_key(place), coords, GEOCODE_TTL_SECONDS)
            .await
    }

    /// Get a cached outbreak aggregate for a location
    pub async fn get_outbreaks(&self, location: &str) -> Result<OutbreakResult, CacheError> {
        self.get_with_prefix(PREFIX_OUTBREAKS, &location_key(location)).await
    }

    /// Cache an outbreak aggregate for a location
    pub async fn set_outbreaks(
        &self,
        location: &str,
        result: &OutbreakResult,
    ) -> Result<(), CacheError> {
        self.set_with_prefix_and_ttl(
            PREFIX_OUTBREAKS,
            &location_key(location),
            result,
            self.ttl_seconds,
        )
        .await
    }

    async fn get_with_prefix<T: DeserializeOwned>(
        &self,
        prefix: &str,
        key: &str,
    ) -> Result<T, CacheError> {
        let full_key = format!("{}{}", prefix, key);
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let data: Option<String> = conn.get(&full_key).await?;

        match data {
            Some(json) => {
                serde_json::from_str(&json).map_err(|e| CacheError::Serialization(e.to_string()))
            }
            None => Err(CacheError::Miss(key.to_string())),
        }
    }

    async fn set_with_prefix_and_ttl<T: Serialize>(
        &self,
        prefix: &str,
        key: &str,
        data: &T,
        ttl: u64,
    ) -> Result<(), CacheError> {
        let full_key = format!("{}{}", prefix, key);
        let json =
            serde_json::to_string(data).map_err(|e| CacheError::Serialization(e.to_string()))?;

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(&full_key, json, ttl).await?;

        tracing::debug!(key = %full_key, ttl = ttl, "Cached data");
        Ok(())
    }
}
