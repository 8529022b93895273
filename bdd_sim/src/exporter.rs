//! JSON exporter for generated template data.
//!
//! Writes one file per user story for feature-file generators.

use crate::error::ExportError;
use bdd_core::{valid_filename, UserStoryData};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// One exported user story with its provenance.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateExport<'a> {
    /// Model documents the data was generated from
    pub sources: &'a [String],

    /// The user story data
    #[serde(flatten)]
    pub data: &'a UserStoryData,
}

impl TemplateExport<'_> {
    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &Path) -> Result<(), ExportError> {
        let json = serde_json::to_string_pretty(self)?;
        let io_err = |source: std::io::Error| ExportError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut file = File::create(path).map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;
        Ok(())
    }
}

/// Writes `<output_dir>/<filename>.json` for every user story.
///
/// # Returns
/// The written paths, in input order.
pub fn export_template_data(
    stories: &[UserStoryData],
    sources: &[String],
    output_dir: &Path,
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(output_dir).map_err(|source| ExportError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(stories.len());
    for data in stories {
        let path = output_dir.join(format!("{}.json", valid_filename(&data.name)?));
        TemplateExport { sources, data }.write_to_file(&path)?;
        info!("exported user story '{}' to {}", data.name, path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdd_core::ScenarioData;

    fn story(name: &str) -> UserStoryData {
        UserStoryData {
            name: name.to_string(),
            criteria: vec![ScenarioData {
                name: "ex:pickplace-variant".into(),
                template: Some("ex:pickplace-tmpl".into()),
                scene: "ex:pickplace-scene".into(),
                objects: vec!["ex:cube1".into()],
                agents: vec!["ex:robot1".into()],
                workspaces: vec!["ex:tableA".into(), "ex:tableB".into()],
            }],
        }
    }

    #[test]
    fn test_export_writes_one_file_per_story() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("generated");
        let sources = vec!["fixtures/pickplace.var.json".to_string()];

        let written = export_template_data(&[story("ex:pickplace story")], &sources, &out).unwrap();

        assert_eq!(written, vec![out.join("expickplace_story.json")]);
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(json["name"], "ex:pickplace story");
        assert_eq!(json["sources"][0], "fixtures/pickplace.var.json");
        assert_eq!(json["criteria"][0]["workspaces"][1], "ex:tableB");
    }

    #[test]
    fn test_export_rejects_unusable_name() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_template_data(&[story("..")], &[], dir.path()).unwrap_err();
        assert!(matches!(err, ExportError::Model(_)));
    }
}
