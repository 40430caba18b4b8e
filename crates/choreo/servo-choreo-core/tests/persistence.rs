use servo_choreo_core::{
    parse_saved_manager_json, ArityPolicy, ChoreoError, ChoreoEvent, Config, ControllerStateRecord,
    PlaybackEngine, PlaybackMode, SavedManager, Sequence, Snapshot, SCHEMA_VERSION,
};
use servo_test_fixtures::mock::{rig, run_until_idle, step};

fn load(name: &str, cfg: Config) -> PlaybackEngine {
    let json = servo_test_fixtures::saves::json(name).expect("load save fixture");
    PlaybackEngine::from_json(&json, cfg).expect("parse save fixture")
}

#[test]
fn resume_reissues_saved_snapshot() {
    let mut engine = load("resume-mid-sequence", Config::default());
    let status = engine.current_state();
    assert_eq!(status.mode, PlaybackMode::PlayingSequence);
    assert_eq!(status.sequence_index, Some(2));
    assert_eq!(status.snapshot_index, Some(1));
    assert!(engine.resume_pending());

    let mut ctrls = rig(&[0, 0]);
    engine.resume(&mut ctrls).unwrap();
    assert!(!engine.resume_pending());
    assert_eq!(ctrls[0].last_restore(), Some(&ControllerStateRecord::rotation(30.0)));
    assert_eq!(ctrls[1].last_restore(), Some(&ControllerStateRecord::rotation(40.0)));

    let events = step(&mut engine, &mut ctrls);
    assert!(events.contains(&ChoreoEvent::PlaybackResumed {
        sequence: Some(2),
        snapshot: Some(1),
    }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, ChoreoEvent::RosterChanged { .. })));
    assert_eq!(engine.current_state().snapshot_index, Some(2));

    assert_eq!(run_until_idle(&mut engine, &mut ctrls, 5), Some(1));
    assert_eq!(ctrls[1].state(), &ControllerStateRecord::rotation(60.0));
}

#[test]
fn first_tick_resumes_without_advancing() {
    let mut engine = load("resume-mid-sequence", Config::default());
    let mut ctrls = rig(&[0, 0]);

    let events = step(&mut engine, &mut ctrls);
    assert!(events.contains(&ChoreoEvent::PlaybackResumed {
        sequence: Some(2),
        snapshot: Some(1),
    }));
    assert_eq!(engine.current_state().snapshot_index, Some(1));
    assert_eq!(ctrls[0].restores(), &[ControllerStateRecord::rotation(30.0)]);

    step(&mut engine, &mut ctrls);
    assert_eq!(engine.current_state().snapshot_index, Some(2));
}

#[test]
fn pending_resume_waits_when_first_tick_resume_is_off() {
    let cfg = Config {
        resume_on_first_tick: false,
        ..Config::default()
    };
    let mut engine = load("resume-mid-sequence", cfg);
    let mut ctrls = rig(&[0, 0]);
    for _ in 0..3 {
        assert!(step(&mut engine, &mut ctrls).is_empty());
    }
    assert!(ctrls[0].restores().is_empty());
    assert_eq!(engine.current_state().snapshot_index, Some(1));

    engine.resume(&mut ctrls).unwrap();
    assert_eq!(ctrls[0].restores().len(), 1);
}

#[test]
fn stale_roster_is_reported_and_played_leniently() {
    let mut engine = load("stale-roster", Config::default());
    assert_eq!(engine.roster().len(), 3);

    let mut ctrls = rig(&[0, 0]);
    let events = step(&mut engine, &mut ctrls);
    let changed = events.iter().find_map(|e| match e {
        ChoreoEvent::RosterChanged { saved, live } => Some((saved.len(), live.len())),
        _ => None,
    });
    assert_eq!(changed, Some((3, 2)));
    assert!(events.contains(&ChoreoEvent::SnapshotArityMismatch {
        controllers: 2,
        records: 3,
    }));
    assert!(events.contains(&ChoreoEvent::SnapshotApplied {
        sequence: Some(0),
        snapshot: Some(0),
        restored: 2,
    }));
    assert_eq!(engine.roster().len(), 2);
    assert_eq!(ctrls[0].state(), &ControllerStateRecord::rotation(11.0));
    assert_eq!(ctrls[1].state(), &ControllerStateRecord::rotation(22.0));
}

#[test]
fn stale_roster_under_strict_policy_goes_idle() {
    let cfg = Config {
        arity_policy: ArityPolicy::Strict,
        ..Config::default()
    };
    let mut engine = load("stale-roster", cfg);
    let mut ctrls = rig(&[0, 0]);
    step(&mut engine, &mut ctrls);
    assert_eq!(engine.current_state().mode, PlaybackMode::Idle);
    assert!(ctrls.iter().all(|c| c.restores().is_empty()));
}

#[test]
fn save_keeps_saved_roster_until_resumed() {
    let mut engine = load("stale-roster", Config::default());
    assert_eq!(engine.save().roster.len(), 3);

    let mut ctrls = rig(&[0, 0]);
    engine.resume(&mut ctrls).unwrap();
    assert_eq!(engine.save().roster.len(), 2);
}

#[test]
fn idle_reload_saves_the_roster_registered_after_it() {
    let mut engine = PlaybackEngine::default();
    engine.setup(&rig(&[0, 0, 0])).unwrap();
    let json = engine.to_json().unwrap();

    let mut restored = PlaybackEngine::from_json(&json, Config::default()).unwrap();
    assert_eq!(restored.save().roster.len(), 3);
    let ctrls = rig(&[0, 0]);
    restored.setup(&ctrls).unwrap();
    let saved = restored.save();
    assert_eq!(saved.roster.len(), 2);
    assert_eq!(saved.roster, restored.roster());
}

#[test]
fn save_and_reload_preserve_store_and_position() {
    let mut ctrls = rig(&[3, 3]);
    let mut engine = PlaybackEngine::default();
    engine.setup(&ctrls).unwrap();
    let seq = Sequence::from_snapshots(
        "Nod",
        vec![
            Snapshot::new(
                "down",
                vec![
                    ControllerStateRecord::rotation(15.0),
                    ControllerStateRecord::rotation(-15.0),
                ],
            ),
            Snapshot::new(
                "up",
                vec![
                    ControllerStateRecord::rotation(-5.0),
                    ControllerStateRecord::rotation(5.0),
                ],
            ),
        ],
    )
    .unwrap();
    let idx = engine.store_mut().push_sequence(seq).unwrap();
    engine.play_sequence(idx, &mut ctrls).unwrap();
    for _ in 0..3 {
        step(&mut engine, &mut ctrls);
    }
    assert_eq!(engine.current_state().snapshot_index, Some(1));

    let json = engine.to_json().unwrap();
    let saved = parse_saved_manager_json(&json).unwrap();
    assert_eq!(saved.schema_version, SCHEMA_VERSION);
    assert_eq!(saved.current_sequence_index, idx as i32);
    assert_eq!(saved.current_snapshot_index, 1);
    assert_eq!(saved.roster, engine.roster());

    let restored = PlaybackEngine::from_json(&json, Config::default()).unwrap();
    assert_eq!(restored.current_state(), engine.current_state());
    assert_eq!(restored.store().sequences(), engine.store().sequences());
    assert!(restored.resume_pending());
}

#[test]
fn idle_save_loads_without_resume() {
    let ctrls = rig(&[0]);
    let mut engine = PlaybackEngine::default();
    engine.setup(&ctrls).unwrap();
    let json = engine.to_json().unwrap();
    let restored = PlaybackEngine::from_json(&json, Config::default()).unwrap();
    assert_eq!(restored.current_state().mode, PlaybackMode::Idle);
    assert!(!restored.resume_pending());
}

#[test]
fn ad_hoc_snapshot_playback_loads_idle() {
    let mut ctrls = rig(&[4]);
    let mut engine = PlaybackEngine::default();
    engine.setup(&ctrls).unwrap();
    engine
        .play_records(vec![ControllerStateRecord::rotation(12.0)], &mut ctrls)
        .unwrap();
    let saved = engine.save();
    assert_eq!(saved.mode, PlaybackMode::PlayingSnapshot);
    assert_eq!(saved.current_sequence_index, -1);

    let restored = PlaybackEngine::from_saved(saved, Config::default()).unwrap();
    assert_eq!(restored.current_state().mode, PlaybackMode::Idle);
    assert!(!restored.resume_pending());
}

#[test]
fn corrupt_saves_are_rejected() {
    let mut saved: SavedManager =
        servo_test_fixtures::saves::load("resume-mid-sequence").expect("fixture");
    saved.sequences[1].snapshots.clear();
    assert!(matches!(
        PlaybackEngine::from_saved(saved, Config::default()),
        Err(ChoreoError::CorruptSave { .. })
    ));

    assert!(matches!(
        PlaybackEngine::from_json("{ not json", Config::default()),
        Err(ChoreoError::Serialization { .. })
    ));
}
