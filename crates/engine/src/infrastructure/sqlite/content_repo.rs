//! SQLite content repository: scenarios, rooms, objects, NPCs and endings.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;
use whodunit_domain::{
    Ending, InteractiveObject, Npc, NpcId, ObjectId, ObjectPayload, ObjectPlacement, Room, RoomId,
    Scenario, ScenarioId,
};

use super::connection::SqliteConnection;
use super::row;
use crate::infrastructure::ports::{ContentRepo, RepoError};

const OBJECT_COLUMNS: &str = "id, room_id, name, description, payload_json, placement_json, \
     is_visible, required_questions";

pub struct SqliteContentRepo {
    pool: SqlitePool,
}

impl SqliteContentRepo {
    pub fn new(connection: &SqliteConnection) -> Self {
        Self {
            pool: connection.pool().clone(),
        }
    }
}

fn scenario_from_row(row: &SqliteRow) -> Result<Scenario, RepoError> {
    Ok(Scenario {
        id: row::parsed(row, "id")?,
        title: row::text(row, "title")?,
        setting: row::text(row, "setting")?,
        background_script: row::text(row, "background_script")?,
        question_budget: row::count(row, "question_budget")?,
    })
}

fn room_from_row(row: &SqliteRow) -> Result<Room, RepoError> {
    Ok(Room {
        id: row::parsed(row, "id")?,
        scenario_id: row::parsed(row, "scenario_id")?,
        name: row::text(row, "name")?,
        description: row::text(row, "description")?,
        background_asset: row::opt_text(row, "background_asset")?,
        order: row::count(row, "sort_order")?,
    })
}

fn object_from_row(row: &SqliteRow) -> Result<InteractiveObject, RepoError> {
    let payload: ObjectPayload = serde_json::from_str(&row::text(row, "payload_json")?)
        .map_err(|e| RepoError::serialization(format!("object payload: {}", e)))?;
    let placement: Option<ObjectPlacement> = row::opt_text(row, "placement_json")?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(|e| RepoError::serialization(format!("object placement: {}", e)))?;

    Ok(InteractiveObject {
        id: row::parsed(row, "id")?,
        room_id: row::parsed(row, "room_id")?,
        name: row::text(row, "name")?,
        description: row::text(row, "description")?,
        payload,
        placement,
        is_visible: row::flag(row, "is_visible")?,
        required_questions: row::count(row, "required_questions")?,
    })
}

fn npc_from_row(row: &SqliteRow) -> Result<Npc, RepoError> {
    Ok(Npc {
        id: row::parsed(row, "id")?,
        room_id: row::parsed(row, "room_id")?,
        name: row::text(row, "name")?,
        persona: row::text(row, "persona")?,
        portrait_asset: row::opt_text(row, "portrait_asset")?,
        order: row::count(row, "sort_order")?,
    })
}

fn ending_from_row(row: &SqliteRow) -> Result<Ending, RepoError> {
    Ok(Ending {
        id: row::parsed(row, "id")?,
        scenario_id: row::parsed(row, "scenario_id")?,
        resolution: row::text(row, "resolution")?,
    })
}

#[async_trait]
impl ContentRepo for SqliteContentRepo {
    async fn get_scenario(&self, id: ScenarioId) -> Result<Option<Scenario>, RepoError> {
        let row = sqlx::query(
            "SELECT id, title, setting, background_script, question_budget FROM scenarios WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("get_scenario", e))?;

        row.as_ref().map(scenario_from_row).transpose()
    }

    async fn list_scenarios(&self) -> Result<Vec<Scenario>, RepoError> {
        let rows = sqlx::query(
            "SELECT id, title, setting, background_script, question_budget FROM scenarios ORDER BY title",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_scenarios", e))?;

        rows.iter().map(scenario_from_row).collect()
    }

    async fn save_scenario(&self, scenario: &Scenario) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO scenarios (id, title, setting, background_script, question_budget)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                title = excluded.title,
                setting = excluded.setting,
                background_script = excluded.background_script,
                question_budget = excluded.question_budget
            "#,
        )
        .bind(scenario.id.to_string())
        .bind(&scenario.title)
        .bind(&scenario.setting)
        .bind(&scenario.background_script)
        .bind(i64::from(scenario.question_budget))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("save_scenario", e))?;

        tracing::debug!(scenario_id = %scenario.id, "Saved scenario");
        Ok(())
    }

    async fn get_room(&self, id: RoomId) -> Result<Option<Room>, RepoError> {
        let row = sqlx::query(
            "SELECT id, scenario_id, name, description, background_asset, sort_order FROM rooms WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("get_room", e))?;

        row.as_ref().map(room_from_row).transpose()
    }

    async fn list_rooms(&self, scenario_id: ScenarioId) -> Result<Vec<Room>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT id, scenario_id, name, description, background_asset, sort_order
            FROM rooms WHERE scenario_id = ?
            ORDER BY sort_order, name
            "#,
        )
        .bind(scenario_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_rooms", e))?;

        rows.iter().map(room_from_row).collect()
    }

    async fn save_room(&self, room: &Room) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO rooms (id, scenario_id, name, description, background_asset, sort_order)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                scenario_id = excluded.scenario_id,
                name = excluded.name,
                description = excluded.description,
                background_asset = excluded.background_asset,
                sort_order = excluded.sort_order
            "#,
        )
        .bind(room.id.to_string())
        .bind(room.scenario_id.to_string())
        .bind(&room.name)
        .bind(&room.description)
        .bind(room.background_asset.as_deref())
        .bind(i64::from(room.order))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("save_room", e))?;

        Ok(())
    }

    async fn get_object(&self, id: ObjectId) -> Result<Option<InteractiveObject>, RepoError> {
        let query = format!(
            "SELECT {} FROM interactive_objects WHERE id = ?",
            OBJECT_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_object", e))?;

        row.as_ref().map(object_from_row).transpose()
    }

    async fn list_objects_in_room(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<InteractiveObject>, RepoError> {
        let query = format!(
            "SELECT {} FROM interactive_objects WHERE room_id = ? ORDER BY rowid",
            OBJECT_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(room_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("list_objects_in_room", e))?;

        rows.iter().map(object_from_row).collect()
    }

    async fn save_object(&self, object: &InteractiveObject) -> Result<(), RepoError> {
        let payload = serde_json::to_string(&object.payload)
            .map_err(|e| RepoError::serialization(format!("object payload: {}", e)))?;
        let placement = object
            .placement
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RepoError::serialization(format!("object placement: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO interactive_objects
                (id, room_id, name, description, kind, payload_json, placement_json,
                 is_visible, required_questions)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                room_id = excluded.room_id,
                name = excluded.name,
                description = excluded.description,
                kind = excluded.kind,
                payload_json = excluded.payload_json,
                placement_json = excluded.placement_json,
                is_visible = excluded.is_visible,
                required_questions = excluded.required_questions
            "#,
        )
        .bind(object.id.to_string())
        .bind(object.room_id.to_string())
        .bind(&object.name)
        .bind(&object.description)
        .bind(object.kind().as_str())
        .bind(payload)
        .bind(placement)
        .bind(object.is_visible)
        .bind(i64::from(object.required_questions))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("save_object", e))?;

        Ok(())
    }

    async fn get_npc(&self, id: NpcId) -> Result<Option<Npc>, RepoError> {
        let row = sqlx::query(
            "SELECT id, room_id, name, persona, portrait_asset, sort_order FROM npcs WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("get_npc", e))?;

        row.as_ref().map(npc_from_row).transpose()
    }

    async fn list_npcs_in_room(&self, room_id: RoomId) -> Result<Vec<Npc>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT id, room_id, name, persona, portrait_asset, sort_order
            FROM npcs WHERE room_id = ?
            ORDER BY sort_order, name
            "#,
        )
        .bind(room_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_npcs_in_room", e))?;

        rows.iter().map(npc_from_row).collect()
    }

    async fn save_npc(&self, npc: &Npc) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO npcs (id, room_id, name, persona, portrait_asset, sort_order)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                room_id = excluded.room_id,
                name = excluded.name,
                persona = excluded.persona,
                portrait_asset = excluded.portrait_asset,
                sort_order = excluded.sort_order
            "#,
        )
        .bind(npc.id.to_string())
        .bind(npc.room_id.to_string())
        .bind(&npc.name)
        .bind(&npc.persona)
        .bind(npc.portrait_asset.as_deref())
        .bind(i64::from(npc.order))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("save_npc", e))?;

        Ok(())
    }

    async fn list_endings(&self, scenario_id: ScenarioId) -> Result<Vec<Ending>, RepoError> {
        let rows = sqlx::query(
            "SELECT id, scenario_id, resolution FROM endings WHERE scenario_id = ? ORDER BY rowid",
        )
        .bind(scenario_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_endings", e))?;

        rows.iter().map(ending_from_row).collect()
    }

    async fn save_ending(&self, ending: &Ending) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO endings (id, scenario_id, resolution) VALUES (?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                scenario_id = excluded.scenario_id,
                resolution = excluded.resolution
            "#,
        )
        .bind(ending.id.to_string())
        .bind(ending.scenario_id.to_string())
        .bind(&ending.resolution)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("save_ending", e))?;

        Ok(())
    }
}
