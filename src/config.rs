//! Runtime settings and cover sheet files
//!
//! Settings come from the process environment (with `.env` support). A
//! cover sheet is a TOML file holding a template choice, an optional logo
//! path and the cover fields, so a session can be reproduced from the
//! command line.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::fields::CoverFields;
use crate::template::TemplateKind;

/// Environment variable holding the text-generation API key
pub const API_KEY_VAR: &str = "API_KEY";

/// Process-level settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    /// Empty when no key is configured
    pub api_key: String,
}

impl Settings {
    /// Read settings, loading a `.env` file from the working directory first
    /// when there is one
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self {
            api_key: std::env::var(API_KEY_VAR).unwrap_or_default(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// A saved cover page session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverSheet {
    pub template: TemplateKind,
    /// Logo image, relative paths resolve against the sheet's directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<PathBuf>,
    pub fields: CoverFields,
}

impl CoverSheet {
    /// The sheet a new session starts from
    pub fn starter() -> Self {
        Self {
            template: TemplateKind::Academic,
            logo: None,
            fields: CoverFields::sample(),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Logo path resolved against `base`
    pub fn logo_path(&self, base: &Path) -> Option<PathBuf> {
        self.logo.as_ref().map(|logo| {
            if logo.is_absolute() {
                logo.clone()
            } else {
                base.join(logo)
            }
        })
    }
}

/// Read a cover sheet file
pub fn load_cover_sheet(path: &Path) -> Result<CoverSheet> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    let sheet = CoverSheet::from_toml(&text)?;
    debug!(template = %sheet.template, "Loaded cover sheet {}", path.display());
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_round_trips_through_toml() {
        let sheet = CoverSheet::starter();
        let text = sheet.to_toml().unwrap();
        assert!(text.contains("template = \"academic\""));
        assert!(text.contains("[fields]"));
        assert!(!text.contains("logo ="));
        assert_eq!(CoverSheet::from_toml(&text).unwrap(), sheet);
    }

    #[test]
    fn test_partial_sheet_uses_defaults() {
        let sheet = CoverSheet::from_toml(
            r#"
template = "minimalist"

[fields]
author = "Ana Lee"
subject = "Data Systems"
"#,
        )
        .unwrap();
        assert_eq!(sheet.template, TemplateKind::Minimalist);
        assert_eq!(sheet.fields.author, "Ana Lee");
        assert_eq!(sheet.fields.topic, "");
        assert!(sheet.fields.show_logo);
        assert_eq!(sheet.logo, None);
    }

    #[test]
    fn test_unknown_template_is_rejected() {
        let result = CoverSheet::from_toml("template = \"baroque\"\n");
        assert!(matches!(result, Err(Error::SheetParse(_))));
    }

    #[test]
    fn test_logo_path_resolution() {
        let mut sheet = CoverSheet::starter();
        assert_eq!(sheet.logo_path(Path::new("/covers")), None);

        sheet.logo = Some(PathBuf::from("crest.png"));
        assert_eq!(
            sheet.logo_path(Path::new("/covers")),
            Some(PathBuf::from("/covers/crest.png"))
        );

        sheet.logo = Some(PathBuf::from("/abs/crest.png"));
        assert_eq!(
            sheet.logo_path(Path::new("/covers")),
            Some(PathBuf::from("/abs/crest.png"))
        );
    }

    #[test]
    fn test_load_missing_sheet() {
        let result = load_cover_sheet(Path::new("missing-cover.toml"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_load_sheet_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.toml");
        std::fs::write(&path, CoverSheet::starter().to_toml().unwrap()).unwrap();
        assert_eq!(load_cover_sheet(&path).unwrap(), CoverSheet::starter());
    }
}
