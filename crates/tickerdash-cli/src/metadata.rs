use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use tickerdash_core::ProviderId;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::envelope::EnvelopeMeta;

pub const SCHEMA_VERSION: &str = "v1.0.0";

/// Request identifier (UUID v4) tagging one rendered envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Command metadata collected while a command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub request_id: RequestId,
    pub source: ProviderId,
    pub latency_ms: u64,
    pub cache_hit: bool,
    pub warnings: Vec<String>,
}

impl Metadata {
    pub fn new(source: ProviderId, latency_ms: u64, cache_hit: bool) -> Self {
        Self {
            request_id: RequestId::new_v4(),
            source,
            latency_ms,
            cache_hit,
            warnings: Vec::new(),
        }
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn into_envelope_meta(self) -> EnvelopeMeta {
        EnvelopeMeta {
            request_id: self.request_id.to_string(),
            schema_version: SCHEMA_VERSION.to_owned(),
            generated_at: generated_at(OffsetDateTime::now_utc()),
            source: self.source,
            latency_ms: self.latency_ms,
            cache_hit: self.cache_hit,
            warnings: self.warnings,
        }
    }
}

fn generated_at(now: OffsetDateTime) -> String {
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}
