//! Project files: a job header, shared analysis settings and a set of
//! beam and frame items, stored as `.beam.json`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::calculations::{run_item, AnalysisItem, AnalysisReport};
use crate::errors::CalcResult;
use crate::settings::AnalysisSettings;

/// Schema version written to new project files
pub const SCHEMA_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub meta: ProjectMetadata,

    /// Applied to every item unless the caller overrides them
    #[serde(default)]
    pub settings: AnalysisSettings,

    pub items: HashMap<Uuid, AnalysisItem>,
}

impl Project {
    pub fn new(engineer: impl Into<String>, job_id: impl Into<String>, client: impl Into<String>) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            settings: AnalysisSettings::default(),
            items: HashMap::new(),
        }
    }

    pub fn add_item(&mut self, item: AnalysisItem) -> Uuid {
        let id = Uuid::new_v4();
        self.items.insert(id, item);
        self.touch();
        id
    }

    pub fn remove_item(&mut self, id: &Uuid) -> Option<AnalysisItem> {
        let item = self.items.remove(id);
        if item.is_some() {
            self.touch();
        }
        item
    }

    pub fn get_item(&self, id: &Uuid) -> Option<&AnalysisItem> {
        self.items.get(id)
    }

    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Solve every item with the project settings, ordered by label.
    ///
    /// A failing item does not stop the others; its error is returned in
    /// place of a report.
    pub fn run_all(&self) -> Vec<(Uuid, CalcResult<AnalysisReport>)> {
        let mut ids: Vec<(&Uuid, &AnalysisItem)> = self.items.iter().collect();
        ids.sort_by(|a, b| a.1.label().cmp(b.1.label()).then(a.0.cmp(b.0)));
        ids.into_iter()
            .map(|(id, item)| {
                let report = run_item(item, &self.settings);
                if let Err(e) = &report {
                    warn!(item = item.label(), error = %e, "analysis item failed");
                }
                (*id, report)
            })
            .collect()
    }
}

/// Job header. `version` is checked against [`SCHEMA_VERSION`] on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub version: String,
    pub engineer: String,
    pub job_id: String,
    pub client: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::moment_distribution::{FrameInput, JointInput, MemberInput};
    use crate::calculations::{ContinuousBeamInput, Span, SupportType};
    use crate::loads::Load;

    fn beam(label: &str) -> AnalysisItem {
        AnalysisItem::ContinuousBeam(ContinuousBeamInput::from_spans(
            label,
            vec![
                Span::new(5.0, 200e6, 1e-4).with_load(Load::udl(10.0)),
                Span::new(5.0, 200e6, 1e-4).with_load(Load::point(20.0, 2.5)),
            ],
            &[SupportType::Pinned, SupportType::Pinned, SupportType::Roller],
        ))
    }

    #[test]
    fn test_project_creation() {
        let project = Project::new("John Doe", "25-001", "Acme Corp");
        assert_eq!(project.meta.engineer, "John Doe");
        assert_eq!(project.meta.job_id, "25-001");
        assert_eq!(project.meta.client, "Acme Corp");
        assert_eq!(project.meta.version, SCHEMA_VERSION);
        assert_eq!(project.settings, AnalysisSettings::default());
    }

    #[test]
    fn test_project_serialization() {
        let mut project = Project::new("Jane Engineer", "25-042", "Test Client");
        let id = project.add_item(beam("B-1"));
        let json = serde_json::to_string_pretty(&project).unwrap();

        assert!(json.contains("Jane Engineer"));
        assert!(json.contains("ContinuousBeam"));

        let roundtrip: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.meta.engineer, "Jane Engineer");
        assert_eq!(roundtrip.get_item(&id), project.get_item(&id));
    }

    #[test]
    fn test_add_remove_item() {
        let mut project = Project::new("Engineer", "25-001", "Client");
        let id = project.add_item(beam("B-1"));
        assert_eq!(project.item_count(), 1);
        assert!(project.get_item(&id).is_some());

        let removed = project.remove_item(&id);
        assert!(removed.is_some());
        assert_eq!(project.item_count(), 0);
        assert!(project.remove_item(&id).is_none());
    }

    #[test]
    fn test_run_all_reports_each_item() {
        let mut project = Project::new("Engineer", "25-001", "Client");
        project.add_item(beam("B-2"));
        project.add_item(beam("B-1"));
        // Roller at the only support below a cantilever is unstable
        project.add_item(AnalysisItem::Frame(FrameInput {
            label: "F-bad".into(),
            joints: vec![
                JointInput::new("A", SupportType::Roller),
                JointInput::new("B", SupportType::Free),
            ],
            members: vec![MemberInput::new("AB", "A", "B", 3.0, 200e6, 1e-4)],
        }));

        let results = project.run_all();
        assert_eq!(results.len(), 3);
        let labels: Vec<String> = results
            .iter()
            .map(|(id, _)| project.get_item(id).unwrap().label().to_string())
            .collect();
        assert_eq!(labels, vec!["B-1", "B-2", "F-bad"]);
        assert!(results[0].1.is_ok());
        assert!(results[2].1.is_err());
    }
}
