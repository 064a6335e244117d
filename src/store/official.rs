// ============================================================================
// Official Message Class
// ============================================================================
//
// Two concerns for the privileged message class: a flag marking a
// message ID as official, and a sliding 7-day per-device send cap.
//
// The cap uses one SET of device keys per calendar day (UTC). A device
// is saturated once it already appears in today's bucket, or once its
// membership across today plus the prior six days reaches the cap.
// Buckets carry a 10-day TTL so the scan never touches a half-expired
// day, and expire on their own.

use crate::score;
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use courier_config::{
    RedisKeyPrefixes, OFFICIAL_BUCKET_TTL_DAYS, OFFICIAL_WINDOW_CAP, OFFICIAL_WINDOW_DAYS,
    SECONDS_PER_DAY,
};
use courier_redis::RedisClient;

pub(crate) struct OfficialClass<'a> {
    client: &'a mut RedisClient,
    prefixes: &'a RedisKeyPrefixes,
}

impl<'a> OfficialClass<'a> {
    pub(crate) fn new(client: &'a mut RedisClient, prefixes: &'a RedisKeyPrefixes) -> Self {
        Self { client, prefixes }
    }

    fn flag_key(&self, message_id: &str) -> String {
        format!("{}{}", self.prefixes.official, message_id)
    }

    fn bucket_key(&self, day: &str) -> String {
        format!("{}{}", self.prefixes.official_limit, day)
    }

    /// Flags a message as official. The flag outlives the message
    /// itself by a wide margin (10x the message TTL) so late
    /// acknowledgement paths can still classify it.
    pub(crate) async fn mark_official(&mut self, message_id: &str, ttl_seconds: i64) -> Result<()> {
        if message_id.is_empty() || ttl_seconds <= 0 {
            return Ok(());
        }

        self.client
            .set_ex(&self.flag_key(message_id), message_id, (ttl_seconds * 10) as u64)
            .await
            .context("Failed to flag official message")
    }

    /// True iff the message carries a live official flag
    pub(crate) async fn is_official(&mut self, message_id: &str) -> Result<bool> {
        let flag: Option<String> = self
            .client
            .get(&self.flag_key(message_id))
            .await
            .context("Failed to read official message flag")?;

        Ok(flag.as_deref() == Some(message_id))
    }

    /// Records that an official message was sent to this device today.
    /// Returns 1 if the device was newly added to today's bucket.
    pub(crate) async fn mark_device(&mut self, device_key: &str) -> Result<i64> {
        if device_key.is_empty() {
            return Ok(0);
        }

        let bucket = self.bucket_key(&score::day_bucket(Utc::now()));
        let added = self
            .client
            .sadd(&bucket, device_key)
            .await
            .context("Failed to mark official-message device")?;
        self.client
            .expire(&bucket, OFFICIAL_BUCKET_TTL_DAYS * SECONDS_PER_DAY)
            .await
            .context("Failed to set rate-limit bucket TTL")?;

        Ok(added)
    }

    /// Whether the device has exhausted its official-message budget:
    /// already hit today, or at the cap across the trailing window.
    /// Scans from yesterday backward and short-circuits at the cap.
    ///
    /// Fails closed: any store error during the scan counts as
    /// saturated rather than letting a capped device through.
    pub(crate) async fn is_saturated(&mut self, device_key: &str) -> Result<bool> {
        let now = Utc::now();

        let today = self.bucket_key(&score::day_bucket(now));
        let mut count = match self.client.sismember(&today, device_key).await {
            Ok(true) => return Ok(true),
            Ok(false) => 0,
            Err(err) => {
                tracing::warn!(
                    device = %device_key,
                    error = %err,
                    "Rate-limit bucket unreadable, treating device as saturated"
                );
                return Ok(true);
            }
        };

        for days_back in 1..OFFICIAL_WINDOW_DAYS {
            let day = self.bucket_key(&score::day_bucket(now - Duration::days(days_back)));
            match self.client.sismember(&day, device_key).await {
                Ok(true) => count += 1,
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(
                        device = %device_key,
                        bucket = %day,
                        error = %err,
                        "Rate-limit bucket unreadable, treating device as saturated"
                    );
                    return Ok(true);
                }
            }

            if count >= OFFICIAL_WINDOW_CAP {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
