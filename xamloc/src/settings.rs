//! Solution-level settings: which projects are in scope, which cultures are
//! being localized, and how identifiers are synthesized. Persisted as JSON
//! next to the solution.

use std::{collections::HashMap, fs::File, io::BufWriter, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How [`crate::generator::generate`] builds identifier candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UidGenerationMode {
    /// Element name plus a token derived from the element's localizable
    /// content (`TextBlock_HelloWorld`).
    #[default]
    Smart,
    /// Element name plus a counter only (`TextBlock_0`).
    Sequential,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolutionSettings {
    #[serde(default)]
    pub uid_generation_mode: UidGenerationMode,
    /// Per-project flag: is this project included in Uid management and
    /// resource extraction.
    #[serde(default)]
    pub handled_projects: HashMap<String, bool>,
    /// Culture the markup sources are authored in.
    #[serde(default)]
    pub development_culture: Option<String>,
    /// Cultures translations are produced for.
    #[serde(default)]
    pub localization_cultures: Vec<String>,
}

impl SolutionSettings {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn is_project_handled(&self, project: &str) -> bool {
        self.handled_projects.get(project).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_settings_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("xamloc.settings.json");

        let mut settings = SolutionSettings {
            uid_generation_mode: UidGenerationMode::Sequential,
            development_culture: Some("en-US".to_string()),
            localization_cultures: vec!["fr-CA".to_string(), "de".to_string()],
            ..Default::default()
        };
        settings.handled_projects.insert("App".to_string(), true);

        settings.save(&path).unwrap();
        let loaded = SolutionSettings::load(&path).unwrap();

        assert_eq!(loaded.uid_generation_mode, UidGenerationMode::Sequential);
        assert_eq!(loaded.development_culture.as_deref(), Some("en-US"));
        assert_eq!(loaded.localization_cultures.len(), 2);
        assert!(loaded.is_project_handled("App"));
        assert!(!loaded.is_project_handled("Lib"));
    }

    #[test]
    fn test_defaults_tolerate_missing_fields() {
        let settings: SolutionSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.uid_generation_mode, UidGenerationMode::Smart);
        assert!(settings.localization_cultures.is_empty());
    }
}
