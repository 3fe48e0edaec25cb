//! SQLite persistence for content, playthroughs, investigations and transcripts.

mod chat_repo;
mod connection;
mod content_repo;
mod investigation_repo;
mod playthrough_repo;
mod row;

use std::path::Path;
use std::sync::Arc;

pub use chat_repo::SqliteChatRepo;
pub use connection::SqliteConnection;
pub use content_repo::SqliteContentRepo;
pub use investigation_repo::SqliteInvestigationRepo;
pub use playthrough_repo::SqlitePlaythroughRepo;

use crate::infrastructure::ports::{
    ChatRepo, ContentRepo, InvestigationRepo, PlaythroughRepo, RepoError,
};

/// All SQLite repositories sharing one pool.
pub struct SqliteStore {
    pub content: Arc<dyn ContentRepo>,
    pub playthroughs: Arc<dyn PlaythroughRepo>,
    pub investigations: Arc<dyn InvestigationRepo>,
    pub chat: Arc<dyn ChatRepo>,
}

impl SqliteStore {
    /// Open the database file and make sure the schema exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let connection = SqliteConnection::open(path).await?;
        connection.initialize_schema().await?;
        Ok(Self::from_connection(&connection))
    }

    pub fn from_connection(connection: &SqliteConnection) -> Self {
        Self {
            content: Arc::new(SqliteContentRepo::new(connection)),
            playthroughs: Arc::new(SqlitePlaythroughRepo::new(connection)),
            investigations: Arc::new(SqliteInvestigationRepo::new(connection)),
            chat: Arc::new(SqliteChatRepo::new(connection)),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::TempDir;
    use whodunit_domain::{
        ChatMessage, DetailPayload, DoorPayload, Ending, InteractiveObject, Npc, NpcId,
        ObjectPayload, ObjectPlacement, Playthrough, PlaythroughStatus, Room, Scenario, UserId,
    };

    use super::*;
    use crate::infrastructure::ports::{ChargeOutcome, StartOutcome};

    async fn open_store() -> (TempDir, SqliteStore) {
        let dir = TempDir::new().expect("temp dir");
        let store = SqliteStore::open(dir.path().join("whodunit.db"))
            .await
            .expect("open store");
        (dir, store)
    }

    async fn seeded_playthrough(store: &SqliteStore, budget: u32) -> Playthrough {
        let scenario = Scenario::new("Manor")
            .expect("valid scenario")
            .with_question_budget(budget);
        store
            .content
            .save_scenario(&scenario)
            .await
            .expect("save scenario");
        let playthrough = Playthrough::new(UserId::new(), scenario.id, budget, Utc::now());
        store
            .playthroughs
            .create(&playthrough)
            .await
            .expect("create playthrough");
        playthrough
    }

    #[tokio::test]
    async fn content_round_trips_with_payload_and_order() {
        let (_dir, store) = open_store().await;
        let scenario = Scenario::new("Manor")
            .expect("valid scenario")
            .with_setting("Stormy night");
        store.content.save_scenario(&scenario).await.expect("save");

        let hall = Room::new(scenario.id, "Hall").with_order(2);
        let study = Room::new(scenario.id, "Study").with_order(1);
        store.content.save_room(&hall).await.expect("save hall");
        store.content.save_room(&study).await.expect("save study");

        let door = InteractiveObject::new(
            study.id,
            "Oak door",
            ObjectPayload::Door(DoorPayload {
                target_room_id: hall.id,
                requires_key: true,
                key_name: Some("brass key".to_string()),
            }),
        )
        .with_placement(ObjectPlacement {
            x: 0.1,
            y: 0.2,
            width: 0.3,
            height: 0.4,
        });
        let letter = InteractiveObject::new(
            study.id,
            "Letter",
            ObjectPayload::Evidence(DetailPayload {
                detail: Some("Signed R.".to_string()),
            }),
        )
        .hidden();
        store.content.save_object(&door).await.expect("save door");
        store.content.save_object(&letter).await.expect("save letter");

        let rooms = store.content.list_rooms(scenario.id).await.expect("rooms");
        assert_eq!(
            rooms.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            vec!["Study", "Hall"]
        );

        let loaded = store
            .content
            .get_object(door.id)
            .await
            .expect("get")
            .expect("exists");
        assert_eq!(loaded, door);

        let objects = store
            .content
            .list_objects_in_room(study.id)
            .await
            .expect("objects");
        assert_eq!(objects.len(), 2);
        assert!(!objects[1].is_visible);
    }

    #[tokio::test]
    async fn npcs_and_endings_are_listed_in_authoring_order() {
        let (_dir, store) = open_store().await;
        let scenario = Scenario::new("Manor").expect("valid scenario");
        store.content.save_scenario(&scenario).await.expect("save");
        let room = Room::new(scenario.id, "Parlour");
        store.content.save_room(&room).await.expect("save room");

        let cook = Npc::new(room.id, "Cook").with_order(1);
        let butler = Npc::new(room.id, "Butler").with_order(0);
        store.content.save_npc(&cook).await.expect("save cook");
        store.content.save_npc(&butler).await.expect("save butler");

        let npcs = store.content.list_npcs_in_room(room.id).await.expect("npcs");
        assert_eq!(npcs, vec![butler, cook]);

        let ending = Ending::new(scenario.id, "The butler did it.");
        store.content.save_ending(&ending).await.expect("save ending");
        assert_eq!(
            store.content.list_endings(scenario.id).await.expect("endings"),
            vec![ending]
        );
    }

    #[tokio::test]
    async fn charge_decrements_until_exhausted() {
        let (_dir, store) = open_store().await;
        let playthrough = seeded_playthrough(&store, 2).await;

        let charges = [
            store.playthroughs.charge_question(playthrough.id).await,
            store.playthroughs.charge_question(playthrough.id).await,
            store.playthroughs.charge_question(playthrough.id).await,
        ];
        let charges: Vec<_> = charges
            .into_iter()
            .map(|c| c.expect("charge"))
            .collect();
        assert_eq!(
            charges,
            vec![
                ChargeOutcome::Charged(1),
                ChargeOutcome::Charged(0),
                ChargeOutcome::Exhausted
            ]
        );

        let stored = store
            .playthroughs
            .get(playthrough.id)
            .await
            .expect("get")
            .expect("exists");
        assert_eq!(stored.remaining_questions, 0);
    }

    #[tokio::test]
    async fn charge_after_conclusion_is_refused() {
        let (_dir, store) = open_store().await;
        let playthrough = seeded_playthrough(&store, 4).await;
        assert!(store
            .playthroughs
            .conclude(playthrough.id, "The butler", Utc::now())
            .await
            .expect("conclude"));

        let outcome = store
            .playthroughs
            .charge_question(playthrough.id)
            .await
            .expect("charge");
        assert_eq!(outcome, ChargeOutcome::Concluded);

        let stored = store
            .playthroughs
            .get(playthrough.id)
            .await
            .expect("get")
            .expect("exists");
        assert_eq!(stored.remaining_questions, 4);
    }

    #[tokio::test]
    async fn concurrent_charges_never_overspend() {
        let (_dir, store) = open_store().await;
        let playthrough = seeded_playthrough(&store, 5).await;

        let charges = (0..12).map(|_| store.playthroughs.charge_question(playthrough.id));
        let outcomes = futures_util::future::join_all(charges).await;

        let charged = outcomes
            .iter()
            .filter(|o| matches!(o, Ok(ChargeOutcome::Charged(_))))
            .count();
        assert_eq!(charged, 5);
        assert!(outcomes.iter().all(|o| o.is_ok()));
    }

    #[tokio::test]
    async fn charge_unknown_playthrough_is_not_found() {
        let (_dir, store) = open_store().await;
        let err = store
            .playthroughs
            .charge_question(whodunit_domain::PlaythroughId::new())
            .await
            .expect_err("missing");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn most_recent_in_progress_playthrough_is_active() {
        let (_dir, store) = open_store().await;
        let scenario = Scenario::new("Manor").expect("valid scenario");
        store.content.save_scenario(&scenario).await.expect("save");
        let user = UserId::new();
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).single().expect("time");

        let older = Playthrough::new(user, scenario.id, 5, t0);
        let newer = Playthrough::new(user, scenario.id, 5, t0 + Duration::minutes(5));
        store.playthroughs.create(&older).await.expect("older");
        store.playthroughs.create(&newer).await.expect("newer");

        let active = store
            .playthroughs
            .find_active_for_user(user)
            .await
            .expect("find")
            .expect("exists");
        assert_eq!(active.id, newer.id);

        assert!(store
            .playthroughs
            .conclude(newer.id, "The butler", t0 + Duration::hours(1))
            .await
            .expect("conclude"));
        assert!(!store
            .playthroughs
            .conclude(newer.id, "The cook", t0 + Duration::hours(2))
            .await
            .expect("second conclude"));

        let concluded = store
            .playthroughs
            .get(newer.id)
            .await
            .expect("get")
            .expect("exists");
        assert_eq!(concluded.status, PlaythroughStatus::Concluded);
        assert_eq!(concluded.accusation.as_deref(), Some("The butler"));

        let active = store
            .playthroughs
            .find_active_for_user(user)
            .await
            .expect("find")
            .expect("older still active");
        assert_eq!(active.id, older.id);
    }

    #[tokio::test]
    async fn investigation_lifecycle_enforces_single_active_object() {
        let (_dir, store) = open_store().await;
        let playthrough = seeded_playthrough(&store, 10).await;
        let a = whodunit_domain::ObjectId::new();
        let b = whodunit_domain::ObjectId::new();
        let repo = &store.investigations;

        let started = repo.try_start(playthrough.id, a, 2).await.expect("start a");
        assert!(matches!(
            started,
            StartOutcome::Started(ref p) if p.remaining_questions == Some(2)
        ));

        let again = repo.try_start(playthrough.id, a, 9).await.expect("restart a");
        assert!(matches!(
            again,
            StartOutcome::AlreadyStarted(ref p) if p.remaining_questions == Some(2)
        ));

        let conflict = repo.try_start(playthrough.id, b, 2).await.expect("start b");
        assert_eq!(conflict, StartOutcome::Conflict { active_object_id: a });

        let after_question = repo
            .record_question(playthrough.id)
            .await
            .expect("record")
            .expect("active");
        assert_eq!(after_question.remaining_questions, Some(1));
        repo.record_question(playthrough.id).await.expect("record");
        let floored = repo
            .record_question(playthrough.id)
            .await
            .expect("record")
            .expect("active");
        assert_eq!(floored.remaining_questions, Some(0));

        assert!(repo
            .try_complete(playthrough.id, b)
            .await
            .expect("complete b")
            .is_none());
        let done = repo
            .try_complete(playthrough.id, a)
            .await
            .expect("complete a")
            .expect("was active");
        assert!(!done.in_investigation);
        assert!(repo
            .record_question(playthrough.id)
            .await
            .expect("record")
            .is_none());

        let b_started = repo.try_start(playthrough.id, b, 2).await.expect("start b");
        assert!(matches!(b_started, StartOutcome::Started(_)));
    }

    #[tokio::test]
    async fn concurrent_starts_activate_exactly_one_object() {
        let (_dir, store) = open_store().await;
        let playthrough = seeded_playthrough(&store, 10).await;
        let objects: Vec<_> = (0..6).map(|_| whodunit_domain::ObjectId::new()).collect();

        let starts = objects
            .iter()
            .map(|object| store.investigations.try_start(playthrough.id, *object, 3));
        let outcomes = futures_util::future::join_all(starts).await;

        let started = outcomes
            .iter()
            .filter(|o| matches!(o, Ok(StartOutcome::Started(_))))
            .count();
        assert_eq!(started, 1);
    }

    #[tokio::test]
    async fn transcript_filters_by_npc_and_tracks_highlights() {
        let (_dir, store) = open_store().await;
        let playthrough = seeded_playthrough(&store, 10).await;
        let butler = NpcId::new();
        let cook = NpcId::new();
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).single().expect("time");

        let first = ChatMessage::from_user(playthrough.id, butler, "Where were you?", t0);
        let reply = ChatMessage::from_npc(playthrough.id, butler, "In the pantry.", t0);
        let other = ChatMessage::from_user(
            playthrough.id,
            cook,
            "What did you cook?",
            t0 + Duration::seconds(1),
        );
        for message in [&first, &reply, &other] {
            store.chat.append(message).await.expect("append");
        }

        let butler_thread = store
            .chat
            .list(playthrough.id, Some(butler))
            .await
            .expect("list");
        assert_eq!(butler_thread, vec![first.clone(), reply.clone()]);
        assert_eq!(
            store.chat.list(playthrough.id, None).await.expect("all").len(),
            3
        );

        store
            .chat
            .set_highlighted(reply.id, true)
            .await
            .expect("highlight");
        let highlighted = store
            .chat
            .list_highlighted(playthrough.id)
            .await
            .expect("highlighted");
        assert_eq!(highlighted.len(), 1);
        assert_eq!(highlighted[0].id, reply.id);

        let err = store
            .chat
            .set_highlighted(whodunit_domain::ChatMessageId::new(), true)
            .await
            .expect_err("missing message");
        assert!(err.is_not_found());
    }
}
