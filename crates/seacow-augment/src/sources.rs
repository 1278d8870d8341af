//! Data-source profiles: which sites a source covers and how to refer to it.

use std::collections::HashMap;

use serde::Serialize;

/// Key of the composite profile spanning every site.
pub const ALL_SOURCES: &str = "all";

/// How a data source is searched and named in rewritten queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSourceProfile {
    pub key: String,
    /// A bare domain, or for `all` a complete OR-expression of `site:` terms.
    #[serde(rename = "domainFilter")]
    pub domain_filter: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    /// Replaces "your".
    #[serde(rename = "possessiveForm")]
    pub possessive_form: String,
    /// Replaces "you".
    #[serde(rename = "objectForm")]
    pub object_form: String,
}

impl DataSourceProfile {
    fn new(key: &str, domain_filter: &str, display: &str, possessive: &str, object: &str) -> Self {
        Self {
            key: key.into(),
            domain_filter: domain_filter.into(),
            display_name: display.into(),
            possessive_form: possessive.into(),
            object_form: object.into(),
        }
    }

    pub fn is_composite(&self) -> bool {
        self.key == ALL_SOURCES
    }
}

/// Immutable set of known sources, built once at startup.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    profiles: HashMap<String, DataSourceProfile>,
}

impl SourceRegistry {
    /// The coastal Georgia sources.
    pub fn builtin() -> Self {
        Self::from_profiles(vec![
            DataSourceProfile::new(
                "bryancounty",
                "bryancountyga.org",
                "Bryan County",
                "Bryan County's",
                "Bryan County",
            ),
            DataSourceProfile::new(
                "savannah",
                "savannahga.gov",
                "City of Savannah",
                "Savannah's",
                "Savannah",
            ),
            DataSourceProfile::new(
                "chatham",
                "chathamcountyga.gov",
                "Chatham County",
                "Chatham County's",
                "Chatham County",
            ),
            DataSourceProfile::new(
                ALL_SOURCES,
                "(site:bryancountyga.org OR site:savannahga.gov OR site:chathamcountyga.gov \
                 OR site:census.gov OR site:bls.gov OR site:bea.gov)",
                "Coastal Georgia",
                "Coastal Georgia's",
                "Coastal Georgia",
            ),
        ])
    }

    pub fn from_profiles(profiles: Vec<DataSourceProfile>) -> Self {
        Self {
            profiles: profiles.into_iter().map(|p| (p.key.clone(), p)).collect(),
        }
    }

    /// Look up a source; keys are matched trimmed and case-insensitively.
    pub fn get(&self, key: &str) -> Option<&DataSourceProfile> {
        self.profiles.get(&key.trim().to_lowercase())
    }

    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
