//! # Reference Data
//!
//! Read-only game tables that handlers consult to turn numeric IDs into
//! display data. Every lookup degrades to a placeholder or default when the
//! ID is unknown; a missing row never fails an update.
//!
//! The tables are filled by an external loader. [`ReferenceData`]
//! deserialises from JSON so a loader can hand over a prepared snapshot.

use serde::{Deserialize, Serialize};
use shared_types::{ClassJob, MapInfo, RecipeInfo, World};
use std::collections::HashMap;

/// One row of the action table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInfo {
    pub name: String,
    pub cast_type: u8,
    pub effect_range: u8,
    pub x_axis_modifier: u8,
    pub omen: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub name: String,
    pub description: String,
}

/// Monster tables used to derive a display name and a hitbox size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BnpcTables {
    pub names: HashMap<u32, String>,
    /// Model scale by base ID.
    pub scales: HashMap<u32, f32>,
    /// Skeleton ID by model ID.
    pub models: HashMap<u32, u32>,
    /// Hitbox radius by skeleton ID.
    pub radii: HashMap<u32, f32>,
}

/// Resolved monster data.
#[derive(Debug, Clone, PartialEq)]
pub struct BnpcInfo {
    pub name: String,
    pub size: f32,
    /// 0 when every table hit; 1 missing base, 2 missing model, 3 missing
    /// skeleton.
    pub error: u8,
}

const DEFAULT_SCALE: f32 = 1.0;
const DEFAULT_RADIUS: f32 = 0.5;

impl BnpcTables {
    /// `None` when the name ID is unknown.
    #[must_use]
    pub fn info(&self, name_id: u32, base_id: u32, model_id: u32) -> Option<BnpcInfo> {
        let name = title_case(self.names.get(&name_id)?);

        let scale = self.scales.get(&base_id).copied();
        let skeleton = self.models.get(&model_id).copied();
        let radius = skeleton.and_then(|s| self.radii.get(&s).copied());

        let error = match (scale, skeleton, radius) {
            (None, _, _) => 1,
            (Some(_), None, _) => 2,
            (Some(_), Some(_), None) => 3,
            _ => 0,
        };

        Some(BnpcInfo {
            name,
            size: scale.unwrap_or(DEFAULT_SCALE) * radius.unwrap_or(DEFAULT_RADIUS),
            error,
        })
    }
}

/// The full reference collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceData {
    pub actions: HashMap<u32, ActionInfo>,
    pub statuses: HashMap<u32, StatusInfo>,
    pub class_jobs: HashMap<u8, ClassJob>,
    pub worlds: HashMap<u32, String>,
    /// Candidate maps by territory ID.
    pub maps: HashMap<u32, Vec<MapInfo>>,
    pub recipes: HashMap<u32, RecipeInfo>,
    pub bnpc: BnpcTables,
}

impl ReferenceData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn action(&self, id: u32) -> Option<&ActionInfo> {
        self.actions.get(&id)
    }

    /// Action name, or `Unknown_{id:x}`.
    #[must_use]
    pub fn action_name(&self, id: u32) -> String {
        match self.actions.get(&id) {
            Some(action) => action.name.clone(),
            None => format!("Unknown_{id:x}"),
        }
    }

    #[must_use]
    pub fn status(&self, id: u32) -> Option<&StatusInfo> {
        self.statuses.get(&id)
    }

    /// The class/job with its names when known, otherwise only the ID.
    #[must_use]
    pub fn class_job(&self, id: u8) -> ClassJob {
        match self.class_jobs.get(&id) {
            Some(class_job) => ClassJob {
                id: u32::from(id),
                ..class_job.clone()
            },
            None => ClassJob {
                id: u32::from(id),
                ..Default::default()
            },
        }
    }

    /// World with its name, or `Unknown_{id}`.
    #[must_use]
    pub fn world(&self, id: u32) -> World {
        let name = match self.worlds.get(&id) {
            Some(name) => name.clone(),
            None => format!("Unknown_{id}"),
        };
        World { id, name }
    }

    #[must_use]
    pub fn maps(&self, territory_id: u32) -> Vec<MapInfo> {
        self.maps.get(&territory_id).cloned().unwrap_or_default()
    }

    /// Recipe data; unknown IDs give an empty record carrying only the ID.
    #[must_use]
    pub fn recipe(&self, id: u32) -> RecipeInfo {
        self.recipes.get(&id).cloned().unwrap_or(RecipeInfo {
            id,
            ..Default::default()
        })
    }
}

/// Upper-case the first letter of each word and lower-case the rest.
pub(crate) fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(c);
            word_start = c.is_whitespace() || c == '-';
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bnpc() -> BnpcTables {
        BnpcTables {
            names: HashMap::from([(1, "striking dummy".to_string())]),
            scales: HashMap::from([(2, 1.5)]),
            models: HashMap::from([(3, 4)]),
            radii: HashMap::from([(4, 2.0)]),
        }
    }

    #[test]
    fn test_bnpc_full_lookup() {
        let info = bnpc().info(1, 2, 3).unwrap();
        assert_eq!(info.name, "Striking Dummy");
        assert!((info.size - 3.0).abs() < f32::EPSILON);
        assert_eq!(info.error, 0);
    }

    #[test]
    fn test_bnpc_degraded_lookups() {
        let tables = bnpc();
        assert!(tables.info(9, 2, 3).is_none());

        let no_base = tables.info(1, 9, 3).unwrap();
        assert_eq!(no_base.error, 1);
        assert!((no_base.size - 2.0).abs() < f32::EPSILON);

        let no_model = tables.info(1, 2, 9).unwrap();
        assert_eq!(no_model.error, 2);
        assert!((no_model.size - 0.75).abs() < f32::EPSILON);

        let mut no_skeleton = bnpc();
        no_skeleton.radii.clear();
        assert_eq!(no_skeleton.info(1, 2, 3).unwrap().error, 3);
    }

    #[test]
    fn test_placeholders() {
        let data = ReferenceData::new();
        assert_eq!(data.action_name(0x1d), "Unknown_1d");
        assert_eq!(data.world(73).name, "Unknown_73");
        assert_eq!(data.class_job(19).id, 19);
        assert!(data.maps(128).is_empty());
        assert_eq!(data.recipe(5).id, 5);
    }

    #[test]
    fn test_from_json_with_partial_tables() {
        let data = ReferenceData::from_json(
            r#"{ "worlds": { "73": "Adamantoise" }, "actions": { "7": { "name": "Attack", "cast_type": 1, "effect_range": 0, "x_axis_modifier": 0, "omen": "" } } }"#,
        )
        .unwrap();
        assert_eq!(data.world(73).name, "Adamantoise");
        assert_eq!(data.action_name(7), "Attack");
        assert!(data.statuses.is_empty());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("ALTE ROITE"), "Alte Roite");
        assert_eq!(title_case("wind-up cid"), "Wind-Up Cid");
    }
}
