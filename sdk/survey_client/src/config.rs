use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

pub const DEFAULT_MIN_RATING: u32 = 1;
pub const DEFAULT_MAX_RATING: u32 = 10;
pub const DEFAULT_DECRYPT_VALIDITY_DAYS: u32 = 10;
const MAX_DECRYPT_VALIDITY_DAYS: u32 = 365;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: u32,
    pub name: String,
}

/// Client-side survey settings.
///
/// Every field is optional in JSON; missing fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub departments: Vec<Department>,
    pub min_rating: u32,
    pub max_rating: u32,
    /// How long one decryption authorization stays usable.
    pub decrypt_validity_days: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let departments = ["Marketing", "Sales", "Engineering", "HR", "Finance"]
            .iter()
            .enumerate()
            .map(|(id, name)| Department {
                id: id as u32,
                name: (*name).to_string(),
            })
            .collect();
        Self {
            departments,
            min_rating: DEFAULT_MIN_RATING,
            max_rating: DEFAULT_MAX_RATING,
            decrypt_validity_days: DEFAULT_DECRYPT_VALIDITY_DAYS,
        }
    }
}

impl ClientConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ClientError> {
        let config: ClientConfig =
            serde_json::from_str(raw).map_err(|e| ClientError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.departments.is_empty() {
            return Err(ClientError::Config("department table is empty".into()));
        }
        let mut seen = BTreeSet::new();
        for dept in &self.departments {
            if !seen.insert(dept.id) {
                return Err(ClientError::Config(format!(
                    "department id {} listed twice",
                    dept.id
                )));
            }
        }
        if self.min_rating == 0 || self.min_rating > self.max_rating {
            return Err(ClientError::Config(format!(
                "rating range {}..={} is empty or includes zero",
                self.min_rating, self.max_rating
            )));
        }
        if self.decrypt_validity_days == 0
            || self.decrypt_validity_days > MAX_DECRYPT_VALIDITY_DAYS
        {
            return Err(ClientError::Config(format!(
                "decrypt validity must be 1..={MAX_DECRYPT_VALIDITY_DAYS} days"
            )));
        }
        Ok(())
    }

    pub fn department(&self, id: u32) -> Option<&Department> {
        self.departments.iter().find(|d| d.id == id)
    }
}
