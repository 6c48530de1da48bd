use rusqlite::Connection;
use rust_decimal::Decimal;
use spycat_core::db::open_db_in_memory;
use spycat_core::{
    BreedLookup, Cat, CatDraft, CatService, MissionChanges, MissionDraft, MissionRepository,
    MissionService, MissionUpdatePlan, RepoError, ServiceError, SqliteCatRepository,
    SqliteMissionRepository, TargetChanges, TargetDraft, TargetEntry,
};
use uuid::Uuid;

fn recruit(conn: &Connection, name: &str) -> Cat {
    CatService::new(SqliteCatRepository::try_new(conn).unwrap())
        .create_cat(
            &CatDraft {
                name: name.to_string(),
                years_of_experience: 2,
                breed: "Siberian".to_string(),
                salary: Decimal::from(3000),
            },
            &BreedLookup::Unavailable,
        )
        .unwrap()
}

fn missions(conn: &mut Connection) -> MissionService<SqliteMissionRepository<'_>> {
    MissionService::new(SqliteMissionRepository::try_new(conn).unwrap())
}

fn target(name: &str) -> TargetDraft {
    TargetDraft {
        name: name.to_string(),
        country: "Ukraine".to_string(),
        notes: String::new(),
        is_completed: false,
    }
}

fn draft(names: &[&str]) -> MissionDraft {
    MissionDraft {
        cat: None,
        targets: names.iter().map(|name| target(name)).collect(),
    }
}

fn keep(id: Uuid) -> TargetEntry {
    TargetEntry {
        id: Some(id),
        changes: TargetChanges::default(),
    }
}

fn mission_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM missions;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn create_accepts_one_to_three_targets() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = missions(&mut conn);

    for names in [&["T1"][..], &["T1", "T2"], &["T1", "T2", "T3"]] {
        let mission = service.create_mission(&draft(names)).unwrap();
        assert_eq!(mission.targets.len(), names.len());
        assert_eq!(mission.cat, None);
        assert!(!mission.is_completed);
        assert!(mission.targets.iter().all(|t| t.mission == mission.id));
    }
    assert_eq!(service.list_missions().unwrap().len(), 3);
}

#[test]
fn create_rejects_target_count_outside_bounds() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut service = missions(&mut conn);
        for names in [&[][..], &["T1", "T2", "T3", "T4"]] {
            let err = service.create_mission(&draft(names)).unwrap_err();
            assert_eq!(err.code(), "INVALID_TARGET_COUNT");
            assert_eq!(err.field(), Some("targets"));
        }
    }
    assert_eq!(mission_count(&conn), 0);
}

#[test]
fn create_rejects_duplicate_target_names() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = missions(&mut conn);

    let err = service.create_mission(&draft(&["T1", " T1 "])).unwrap_err();
    assert_eq!(err.code(), "DUPLICATE_TARGET_NAME");
}

#[test]
fn create_with_unknown_cat_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut service = missions(&mut conn);
        let mut payload = draft(&["T1"]);
        payload.cat = Some(Uuid::new_v4());

        let err = service.create_mission(&payload).unwrap_err();
        assert!(matches!(err, ServiceError::UnknownCat(_)));
        assert_eq!(err.code(), "CAT_NOT_FOUND");
    }
    assert_eq!(mission_count(&conn), 0);
}

#[test]
fn completed_targets_at_create_complete_the_mission() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = missions(&mut conn);

    let mut payload = draft(&["T1"]);
    payload.targets[0].is_completed = true;
    let mission = service.create_mission(&payload).unwrap();
    assert!(mission.is_completed);
}

#[test]
fn a_cat_holds_at_most_one_mission() {
    let mut conn = open_db_in_memory().unwrap();
    let cat = recruit(&conn, "Tom");
    let mut service = missions(&mut conn);

    let first = service.create_mission(&draft(&["T1"])).unwrap();
    let second = service.create_mission(&draft(&["T1"])).unwrap();

    let assigned = service.assign_cat(first.id, cat.id).unwrap();
    assert_eq!(assigned.cat, Some(cat.id));

    let err = service.assign_cat(second.id, cat.id).unwrap_err();
    assert_eq!(err.code(), "CAT_ALREADY_ASSIGNED");
    assert_eq!(service.get_mission(second.id).unwrap().cat, None);

    let mut payload = draft(&["T1"]);
    payload.cat = Some(cat.id);
    let err = service.create_mission(&payload).unwrap_err();
    assert_eq!(err.code(), "CAT_ALREADY_ASSIGNED");

    let again = service.assign_cat(first.id, cat.id).unwrap();
    assert_eq!(again, assigned);
}

#[test]
fn update_with_taken_cat_is_rejected_and_own_cat_is_accepted() {
    let mut conn = open_db_in_memory().unwrap();
    let cat = recruit(&conn, "Tom");
    let mut service = missions(&mut conn);

    let first = service.create_mission(&draft(&["T1"])).unwrap();
    let second = service.create_mission(&draft(&["T1"])).unwrap();
    let link = MissionChanges {
        cat: Some(Some(cat.id)),
        targets: None,
    };

    let linked = service.update_mission(first.id, &link, true).unwrap();
    assert_eq!(linked.cat, Some(cat.id));

    let err = service.update_mission(second.id, &link, true).unwrap_err();
    assert_eq!(err.code(), "CAT_ALREADY_ASSIGNED");
    assert_eq!(service.get_mission(second.id).unwrap(), second);

    let resent = service.update_mission(first.id, &link, true).unwrap();
    assert_eq!(resent, linked);
}

#[test]
fn assign_cat_reports_missing_mission_and_cat() {
    let mut conn = open_db_in_memory().unwrap();
    let cat = recruit(&conn, "Tom");
    let mut service = missions(&mut conn);
    let mission = service.create_mission(&draft(&["T1"])).unwrap();

    let err = service.assign_cat(Uuid::new_v4(), cat.id).unwrap_err();
    assert!(matches!(err, ServiceError::MissionNotFound(_)));

    let err = service.assign_cat(mission.id, Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, ServiceError::CatNotFound(_)));
}

#[test]
fn assigned_mission_cannot_be_deleted() {
    let mut conn = open_db_in_memory().unwrap();
    let cat = recruit(&conn, "Tom");
    let mut service = missions(&mut conn);

    let mission = service.create_mission(&draft(&["T1", "T2"])).unwrap();
    service.assign_cat(mission.id, cat.id).unwrap();

    let err = service.delete_mission(mission.id).unwrap_err();
    assert_eq!(err.code(), "MISSION_ASSIGNED_CANNOT_DELETE");
    assert_eq!(service.get_mission(mission.id).unwrap().targets.len(), 2);
}

#[test]
fn deleting_unassigned_mission_cascades_to_targets() {
    let mut conn = open_db_in_memory().unwrap();
    let mission = {
        let mut service = missions(&mut conn);
        let mission = service.create_mission(&draft(&["T1", "T2"])).unwrap();
        service.delete_mission(mission.id).unwrap();

        let err = service.get_mission(mission.id).unwrap_err();
        assert_eq!(err.code(), "MISSION_NOT_FOUND");
        let err = service.delete_mission(mission.id).unwrap_err();
        assert_eq!(err.code(), "MISSION_NOT_FOUND");
        mission
    };

    let repo = SqliteMissionRepository::try_new(&mut conn).unwrap();
    for target in &mission.targets {
        assert!(repo.get_target(target.id).unwrap().is_none());
    }
}

#[test]
fn partial_update_prunes_creates_and_updates_targets() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = missions(&mut conn);
    let mission = service.create_mission(&draft(&["T1", "T2", "T3"])).unwrap();
    let t1 = mission.targets[0].id;

    let changes = MissionChanges {
        cat: None,
        targets: Some(vec![
            TargetEntry {
                id: Some(t1),
                changes: TargetChanges {
                    notes: Some("seen near the docks".to_string()),
                    ..TargetChanges::default()
                },
            },
            TargetEntry {
                id: None,
                changes: TargetChanges {
                    name: Some("T4".to_string()),
                    country: Some("Poland".to_string()),
                    ..TargetChanges::default()
                },
            },
        ]),
    };
    let updated = service.update_mission(mission.id, &changes, true).unwrap();

    let names: Vec<_> = updated.targets.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["T1", "T4"]);
    assert_eq!(updated.targets[0].id, t1);
    assert_eq!(updated.targets[0].notes, "seen near the docks");
    assert_eq!(updated.targets[1].country, "Poland");
}

#[test]
fn update_without_targets_leaves_targets_alone() {
    let mut conn = open_db_in_memory().unwrap();
    let cat = recruit(&conn, "Tom");
    let mut service = missions(&mut conn);
    let mission = service.create_mission(&draft(&["T1", "T2"])).unwrap();

    let assign = MissionChanges {
        cat: Some(Some(cat.id)),
        targets: None,
    };
    let updated = service.update_mission(mission.id, &assign, true).unwrap();
    assert_eq!(updated.cat, Some(cat.id));
    assert_eq!(updated.targets, mission.targets);

    let unassign = MissionChanges {
        cat: Some(None),
        targets: None,
    };
    let updated = service.update_mission(mission.id, &unassign, true).unwrap();
    assert_eq!(updated.cat, None);
}

#[test]
fn full_update_requires_targets_and_full_entries() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = missions(&mut conn);
    let mission = service.create_mission(&draft(&["T1"])).unwrap();

    let err = service
        .update_mission(mission.id, &MissionChanges::default(), false)
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert_eq!(err.field(), Some("targets"));

    let changes = MissionChanges {
        cat: None,
        targets: Some(vec![keep(mission.targets[0].id)]),
    };
    let err = service.update_mission(mission.id, &changes, false).unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert_eq!(err.field(), Some("name"));
}

#[test]
fn update_rejects_targets_of_other_missions_and_repeated_ids() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = missions(&mut conn);
    let mission = service.create_mission(&draft(&["T1"])).unwrap();
    let other = service.create_mission(&draft(&["T1"])).unwrap();

    let foreign = MissionChanges {
        cat: None,
        targets: Some(vec![keep(other.targets[0].id)]),
    };
    let err = service.update_mission(mission.id, &foreign, true).unwrap_err();
    assert_eq!(err.code(), "TARGET_NOT_FOUND");

    let repeated = MissionChanges {
        cat: None,
        targets: Some(vec![keep(mission.targets[0].id), keep(mission.targets[0].id)]),
    };
    let err = service.update_mission(mission.id, &repeated, true).unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");

    assert_eq!(service.get_mission(other.id).unwrap(), other);
    assert_eq!(service.get_mission(mission.id).unwrap(), mission);
}

#[test]
fn update_with_bad_target_count_changes_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let cat = recruit(&conn, "Tom");
    let mut service = missions(&mut conn);
    let mission = service.create_mission(&draft(&["T1"])).unwrap();

    let changes = MissionChanges {
        cat: Some(Some(cat.id)),
        targets: Some(Vec::new()),
    };
    let err = service.update_mission(mission.id, &changes, true).unwrap_err();
    assert_eq!(err.code(), "INVALID_TARGET_COUNT");
    assert_eq!(service.get_mission(mission.id).unwrap(), mission);
}

#[test]
fn listed_names_cannot_reuse_pruned_names() {
    let mut conn = open_db_in_memory().unwrap();
    let cat = recruit(&conn, "Tom");
    let mut service = missions(&mut conn);
    let mission = service.create_mission(&draft(&["A", "B", "C"])).unwrap();
    let (a, b, c) = (
        mission.targets[0].id,
        mission.targets[1].id,
        mission.targets[2].id,
    );

    let rename = MissionChanges {
        cat: Some(Some(cat.id)),
        targets: Some(vec![
            TargetEntry {
                id: Some(a),
                changes: TargetChanges {
                    notes: Some("never written".to_string()),
                    ..TargetChanges::default()
                },
            },
            TargetEntry {
                id: Some(c),
                changes: TargetChanges {
                    name: Some("B".to_string()),
                    ..TargetChanges::default()
                },
            },
        ]),
    };
    let err = service.update_mission(mission.id, &rename, true).unwrap_err();
    assert_eq!(err.code(), "DUPLICATE_TARGET_NAME");

    let recreate = MissionChanges {
        cat: None,
        targets: Some(vec![
            keep(b),
            TargetEntry {
                id: None,
                changes: TargetChanges {
                    name: Some("A".to_string()),
                    country: Some("Chile".to_string()),
                    ..TargetChanges::default()
                },
            },
        ]),
    };
    let err = service.update_mission(mission.id, &recreate, true).unwrap_err();
    assert_eq!(err.code(), "DUPLICATE_TARGET_NAME");

    assert_eq!(service.get_mission(mission.id).unwrap(), mission);
}

#[test]
fn failed_write_rolls_back_the_whole_plan() {
    let mut conn = open_db_in_memory().unwrap();
    let cat = recruit(&conn, "Tom");
    let mission = missions(&mut conn)
        .create_mission(&draft(&["A", "B"]))
        .unwrap();

    let mut touched = mission.targets[0].clone();
    touched.notes = "never committed".to_string();
    let plan = MissionUpdatePlan {
        mission: mission.id,
        cat: Some(Some(cat.id)),
        updated: vec![touched],
        created: vec![target("B").into_target(mission.id)],
        pruned: Vec::new(),
    };

    let mut repo = SqliteMissionRepository::try_new(&mut conn).unwrap();
    let err = repo.apply_update(&plan).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateTargetName { .. }));

    assert_eq!(repo.get_mission(mission.id).unwrap(), Some(mission));
}

#[test]
fn completion_follows_target_states_through_updates() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = missions(&mut conn);
    let mission = service.create_mission(&draft(&["T1", "T2"])).unwrap();

    let complete = |id| TargetEntry {
        id: Some(id),
        changes: TargetChanges {
            is_completed: Some(true),
            ..TargetChanges::default()
        },
    };

    let changes = MissionChanges {
        cat: None,
        targets: Some(vec![complete(mission.targets[0].id), keep(mission.targets[1].id)]),
    };
    let updated = service.update_mission(mission.id, &changes, true).unwrap();
    assert!(!updated.is_completed);

    let changes = MissionChanges {
        cat: None,
        targets: Some(vec![complete(mission.targets[0].id)]),
    };
    let updated = service.update_mission(mission.id, &changes, true).unwrap();
    assert_eq!(updated.targets.len(), 1);
    assert!(updated.is_completed);

    let reopened = MissionChanges {
        cat: None,
        targets: Some(vec![
            keep(mission.targets[0].id),
            TargetEntry {
                id: None,
                changes: TargetChanges {
                    name: Some("T5".to_string()),
                    country: Some("Spain".to_string()),
                    ..TargetChanges::default()
                },
            },
        ]),
    };
    let updated = service.update_mission(mission.id, &reopened, true).unwrap();
    assert!(!updated.is_completed);
}

#[test]
fn completed_mission_freezes_notes_in_composite_update() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = missions(&mut conn);
    let mut payload = draft(&["T1"]);
    payload.targets[0].is_completed = true;
    payload.targets[0].notes = "final".to_string();
    let mission = service.create_mission(&payload).unwrap();

    let changes = MissionChanges {
        cat: None,
        targets: Some(vec![TargetEntry {
            id: Some(mission.targets[0].id),
            changes: TargetChanges {
                notes: Some("edited".to_string()),
                ..TargetChanges::default()
            },
        }]),
    };
    let err = service.update_mission(mission.id, &changes, true).unwrap_err();
    assert_eq!(err.code(), "NOTES_FROZEN");
    assert_eq!(service.get_mission(mission.id).unwrap(), mission);
}
