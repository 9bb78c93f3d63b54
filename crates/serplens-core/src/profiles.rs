use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Identity record for one institution. Loaded once at startup and never
/// mutated; every audit request names one of these by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandProfile {
    pub id: String,
    pub name: String,
    pub legal_name: String,
    pub org_type: String,
    pub domain: String,
    pub logo_url: String,
    #[serde(default)]
    pub address: Vec<String>,
    #[serde(default)]
    pub contact_points: Vec<ContactPoint>,
    #[serde(default)]
    pub same_as: Vec<String>,
    pub primary_color: String,
    pub accent_color: String,
    pub surface_color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPoint {
    #[serde(rename = "type")]
    pub contact_type: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfilesFile {
    pub profiles: Vec<BrandProfile>,
}

/// Load and validate brand profiles from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_profiles(path: &Path) -> Result<ProfilesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProfilesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let profiles_file: ProfilesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::ProfilesFileParse)?;

    validate_profiles(&profiles_file)?;

    Ok(profiles_file)
}

fn validate_profiles(profiles_file: &ProfilesFile) -> Result<(), ConfigError> {
    if profiles_file.profiles.is_empty() {
        return Err(ConfigError::Validation(
            "at least one brand profile is required".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();
    for profile in &profiles_file.profiles {
        if profile.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "profile id must be non-empty".to_string(),
            ));
        }
        if profile.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "profile '{}' has an empty display name",
                profile.id
            )));
        }
        if profile.domain.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "profile '{}' has an empty domain",
                profile.id
            )));
        }
        if !seen_ids.insert(profile.id.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate profile id: '{}'",
                profile.id
            )));
        }
    }

    Ok(())
}
