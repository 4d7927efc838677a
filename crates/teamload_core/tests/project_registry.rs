use serde_json::{json, Value};
use teamload_core::config::DEFAULT_PROJECTS_KEY;
use teamload_core::db::open_db;
use teamload_core::{
    AllocationSplit, KeyValueStorage, MemoryStorage, ProjectInput, ProjectPatch, ProjectRegistry,
    RegistryError, SqliteStorage, TeamMember, User,
};

fn input(name: &str, members: &[(&User, f64)]) -> ProjectInput {
    ProjectInput {
        name: name.to_string(),
        description: None,
        assignments: members
            .iter()
            .map(|(user, allocation)| {
                TeamMember::from_user(user, *allocation, AllocationSplit::default())
            })
            .collect(),
    }
}

fn persisted(storage: &MemoryStorage) -> Value {
    let raw = storage.get(DEFAULT_PROJECTS_KEY).unwrap().unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn empty_storage_loads_empty_collection() {
    let storage = MemoryStorage::new();
    let registry = ProjectRegistry::load(&storage, DEFAULT_PROJECTS_KEY);
    assert!(registry.projects().is_empty());
    assert!(!storage.contains_key(DEFAULT_PROJECTS_KEY));
}

#[test]
fn legacy_records_are_migrated_and_written_back() {
    let legacy = json!([{
        "id": "p1",
        "name": "X",
        "allocation": 40,
        "typeSplit": { "frontend": 70, "backend": 30 },
        "color": "#fff",
        "lastUpdated": 1
    }]);
    let storage = MemoryStorage::with_entries([(DEFAULT_PROJECTS_KEY, legacy.to_string())]);

    let registry = ProjectRegistry::load(&storage, DEFAULT_PROJECTS_KEY);
    let project = &registry.projects()[0];
    assert_eq!(project.id, "p1");
    assert_eq!(project.last_updated, 1);
    assert_eq!(project.assignments.len(), 1);
    let owner = &project.assignments[0];
    assert_eq!(owner.id, "me");
    assert_eq!(owner.name, "Me");
    assert!(owner.is_me);
    assert_eq!(owner.allocation, 40.0);
    assert_eq!(owner.color, "#fff");
    assert_eq!(
        owner.type_split,
        AllocationSplit {
            frontend: 70.0,
            backend: 30.0
        }
    );

    let stored = persisted(&storage);
    assert!(stored[0].get("allocation").is_none());
    assert_eq!(stored[0]["assignments"][0]["id"], "me");
}

#[test]
fn loading_migrated_state_again_changes_nothing() {
    let legacy = json!([{ "id": "p1", "name": "X", "allocation": 40, "lastUpdated": 1 }]);
    let storage = MemoryStorage::with_entries([(DEFAULT_PROJECTS_KEY, legacy.to_string())]);

    let first = ProjectRegistry::load(&storage, DEFAULT_PROJECTS_KEY).export_projects();
    let after_first = persisted(&storage);
    let second = ProjectRegistry::load(&storage, DEFAULT_PROJECTS_KEY).export_projects();

    assert_eq!(first, second);
    assert_eq!(second[0].assignments.len(), 1);
    assert_eq!(persisted(&storage), after_first);
}

#[test]
fn corrupt_storage_falls_back_to_empty() {
    let storage = MemoryStorage::with_entries([(DEFAULT_PROJECTS_KEY, "[{\"id\": 3}]")]);
    let registry = ProjectRegistry::load(&storage, DEFAULT_PROJECTS_KEY);
    assert!(registry.projects().is_empty());
}

#[test]
fn broken_current_record_is_neither_migrated_nor_written_back() {
    let stored = json!([{
        "id": "p1",
        "name": "X",
        "assignments": [
            { "id": "u1", "name": "Ana", "color": "#f00", "allocation": 60,
              "typeSplit": { "frontend": 50, "backend": 50 } },
            { "id": "u2", "name": "Bo", "color": "#0f0", "allocation": 30,
              "typeSplit": { "frontend": 20, "backend": 80 } }
        ]
    }])
    .to_string();
    let storage = MemoryStorage::with_entries([(DEFAULT_PROJECTS_KEY, stored.clone())]);

    let registry = ProjectRegistry::load(&storage, DEFAULT_PROJECTS_KEY);
    assert!(registry.projects().is_empty());
    assert_eq!(
        storage.get(DEFAULT_PROJECTS_KEY).unwrap().as_deref(),
        Some(stored.as_str())
    );
}

#[test]
fn add_appends_with_fresh_id_and_timestamp() {
    let storage = MemoryStorage::new();
    let mut registry = ProjectRegistry::load(&storage, DEFAULT_PROJECTS_KEY);
    let me = User::default_me();

    let first = registry.add_project(input("A", &[(&me, 40.0)]));
    let second = registry.add_project(input("B", &[(&me, 30.0)]));

    assert_ne!(first.id, second.id);
    assert!(first.last_updated > 0);
    let names: Vec<_> = registry.projects().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(persisted(&storage).as_array().unwrap().len(), 2);
}

#[test]
fn every_update_strictly_increases_last_updated() {
    let storage = MemoryStorage::new();
    let mut registry = ProjectRegistry::load(&storage, DEFAULT_PROJECTS_KEY);
    let project = registry.add_project(input("A", &[]));

    let mut previous = project.last_updated;
    for round in 0..5 {
        let patch = ProjectPatch {
            name: Some(format!("A{round}")),
            ..ProjectPatch::default()
        };
        assert!(registry.update_project(&project.id, &patch));
        let current = registry.get(&project.id).unwrap().last_updated;
        assert!(current > previous);
        previous = current;
    }
    assert_eq!(registry.get(&project.id).unwrap().name, "A4");
}

#[test]
fn update_and_remove_of_unknown_id_are_no_ops() {
    let storage = MemoryStorage::new();
    let mut registry = ProjectRegistry::load(&storage, DEFAULT_PROJECTS_KEY);
    registry.add_project(input("A", &[]));
    let before = registry.export_projects();

    assert!(!registry.update_project("missing", &ProjectPatch::default()));
    assert!(!registry.remove_project("missing"));
    assert_eq!(registry.export_projects(), before);
}

#[test]
fn remove_deletes_matching_project() {
    let storage = MemoryStorage::new();
    let mut registry = ProjectRegistry::load(&storage, DEFAULT_PROJECTS_KEY);
    let a = registry.add_project(input("A", &[]));
    let b = registry.add_project(input("B", &[]));

    assert!(registry.remove_project(&a.id));
    assert_eq!(registry.projects().len(), 1);
    assert_eq!(registry.projects()[0].id, b.id);
    assert_eq!(persisted(&storage).as_array().unwrap().len(), 1);
}

#[test]
fn reorder_replaces_sequence_and_rejects_foreign_ids() {
    let storage = MemoryStorage::new();
    let mut registry = ProjectRegistry::load(&storage, DEFAULT_PROJECTS_KEY);
    let a = registry.add_project(input("A", &[]));
    let b = registry.add_project(input("B", &[]));
    let c = registry.add_project(input("C", &[]));

    registry
        .reorder_projects(vec![c.clone(), a.clone(), b.clone()])
        .unwrap();
    let order: Vec<_> = registry.projects().iter().map(|p| p.id.clone()).collect();
    assert_eq!(order, vec![c.id.clone(), a.id.clone(), b.id.clone()]);
    assert_eq!(persisted(&storage)[0]["id"], c.id.as_str());

    let mut stranger = a.clone();
    stranger.id = "stranger".to_string();
    let err = registry
        .reorder_projects(vec![stranger, b.clone()])
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::ReorderMismatch {
            missing: {
                let mut ids = vec![a.id.clone(), c.id.clone()];
                ids.sort();
                ids
            },
            unexpected: vec!["stranger".to_string()],
        }
    );
    let unchanged: Vec<_> = registry.projects().iter().map(|p| p.id.clone()).collect();
    assert_eq!(unchanged, order);
}

#[test]
fn export_then_import_reproduces_collection() {
    let storage = MemoryStorage::new();
    let mut registry = ProjectRegistry::load(&storage, DEFAULT_PROJECTS_KEY);
    let me = User::default_me();
    registry.add_project(input("A", &[(&me, 40.0)]));
    registry.add_project(ProjectInput {
        description: Some("api".to_string()),
        ..input("B", &[(&me, 60.0)])
    });
    let exported = registry.export_projects();

    let other = MemoryStorage::new();
    let mut restored = ProjectRegistry::load(&other, DEFAULT_PROJECTS_KEY);
    restored.import_projects(exported.clone());
    assert_eq!(restored.projects(), exported.as_slice());

    let reloaded = ProjectRegistry::load(&other, DEFAULT_PROJECTS_KEY);
    assert_eq!(reloaded.projects(), exported.as_slice());
}

#[test]
fn import_accepts_over_allocated_projects() {
    let storage = MemoryStorage::new();
    let mut registry = ProjectRegistry::load(&storage, DEFAULT_PROJECTS_KEY);
    let me = User::default_me();
    let sam = User::new("Sam", "#10b981");
    let mut draft = ProjectRegistry::load(MemoryStorage::new(), DEFAULT_PROJECTS_KEY);
    let heavy = draft.add_project(input("Heavy", &[(&me, 80.0), (&sam, 70.0)]));

    registry.import_projects(vec![heavy]);
    assert_eq!(registry.projects()[0].total_allocation(), 150.0);
}

#[test]
fn reset_removes_persisted_state() {
    let storage = MemoryStorage::new();
    let mut registry = ProjectRegistry::load(&storage, DEFAULT_PROJECTS_KEY);
    registry.add_project(input("A", &[]));
    assert!(storage.contains_key(DEFAULT_PROJECTS_KEY));

    registry.reset_projects();
    assert!(registry.projects().is_empty());
    assert!(!storage.contains_key(DEFAULT_PROJECTS_KEY));

    let reloaded = ProjectRegistry::load(&storage, DEFAULT_PROJECTS_KEY);
    assert!(reloaded.projects().is_empty());
}

#[test]
fn sqlite_backed_registry_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("teamload.db");
    let me = User::default_me();

    let created = {
        let conn = open_db(&path).unwrap();
        let mut registry = ProjectRegistry::load(SqliteStorage::new(&conn), DEFAULT_PROJECTS_KEY);
        registry.add_project(input("Persisted", &[(&me, 25.0)]))
    };

    let conn = open_db(&path).unwrap();
    let registry = ProjectRegistry::load(SqliteStorage::new(&conn), DEFAULT_PROJECTS_KEY);
    assert_eq!(registry.projects(), &[created]);
}
