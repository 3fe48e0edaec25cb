//! JSON scenario bundle importer.
//!
//! A bundle is one authored scenario with its rooms, objects, NPCs and
//! endings. References inside the bundle are validated before anything is
//! written, then entities are saved parents-first through the [`ContentRepo`].

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use whodunit_domain::{Ending, InteractiveObject, Npc, ObjectPayload, Room, Scenario};

use crate::infrastructure::ports::{ContentRepo, RepoError};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read bundle {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed bundle: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid bundle: {0}")]
    Invalid(String),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioBundle {
    pub scenario: Scenario,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub objects: Vec<InteractiveObject>,
    #[serde(default)]
    pub npcs: Vec<Npc>,
    #[serde(default)]
    pub endings: Vec<Ending>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub rooms: usize,
    pub objects: usize,
    pub npcs: usize,
    pub endings: usize,
}

impl ScenarioBundle {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ImportError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).await.map_err(|source| ImportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, ImportError> {
        let bundle: Self = serde_json::from_str(raw)?;
        bundle.validate()?;
        Ok(bundle)
    }

    fn validate(&self) -> Result<(), ImportError> {
        let scenario_id = self.scenario.id;
        if self.scenario.title.trim().is_empty() {
            return Err(ImportError::Invalid("scenario title is empty".to_string()));
        }

        let room_ids: HashSet<_> = self.rooms.iter().map(|r| r.id).collect();
        let npc_ids: HashSet<_> = self.npcs.iter().map(|n| n.id).collect();

        if let Some(room) = self.rooms.iter().find(|r| r.scenario_id != scenario_id) {
            return Err(ImportError::Invalid(format!(
                "room {} belongs to another scenario",
                room.id
            )));
        }
        if let Some(npc) = self.npcs.iter().find(|n| !room_ids.contains(&n.room_id)) {
            return Err(ImportError::Invalid(format!(
                "npc {} is placed in an unknown room",
                npc.id
            )));
        }
        if let Some(ending) = self.endings.iter().find(|e| e.scenario_id != scenario_id) {
            return Err(ImportError::Invalid(format!(
                "ending {} belongs to another scenario",
                ending.id
            )));
        }

        for object in &self.objects {
            if !room_ids.contains(&object.room_id) {
                return Err(ImportError::Invalid(format!(
                    "object {} is placed in an unknown room",
                    object.id
                )));
            }
            match &object.payload {
                ObjectPayload::Door(door) if !room_ids.contains(&door.target_room_id) => {
                    return Err(ImportError::Invalid(format!(
                        "door {} leads to an unknown room",
                        object.id
                    )));
                }
                ObjectPayload::Npc(npc) if !npc_ids.contains(&npc.npc_id) => {
                    return Err(ImportError::Invalid(format!(
                        "object {} refers to an unknown npc",
                        object.id
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Write the bundle through the content repository (upserts, safe to re-run).
    pub async fn import(&self, content: &dyn ContentRepo) -> Result<ImportSummary, ImportError> {
        content.save_scenario(&self.scenario).await?;
        for room in &self.rooms {
            content.save_room(room).await?;
        }
        for npc in &self.npcs {
            content.save_npc(npc).await?;
        }
        for object in &self.objects {
            content.save_object(object).await?;
        }
        for ending in &self.endings {
            content.save_ending(ending).await?;
        }

        let summary = ImportSummary {
            rooms: self.rooms.len(),
            objects: self.objects.len(),
            npcs: self.npcs.len(),
            endings: self.endings.len(),
        };
        tracing::info!(
            scenario_id = %self.scenario.id,
            title = %self.scenario.title,
            rooms = summary.rooms,
            objects = summary.objects,
            npcs = summary.npcs,
            endings = summary.endings,
            "Imported scenario bundle"
        );
        Ok(summary)
    }
}
