use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of an authenticated staff member (or client account).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffId(Uuid);

impl StaffId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for StaffId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for StaffId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for StaffId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<StaffId> for Uuid {
    fn from(value: StaffId) -> Self {
        value.0
    }
}

impl FromStr for StaffId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}
