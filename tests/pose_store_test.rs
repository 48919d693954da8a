mod common;

use assert_matches::assert_matches;
use common::*;
use posture_coach::error::{PoseDataError, TrainingError};
use posture_coach::services::{load_sequence, FilePoseStore, PoseStore};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_add_and_list_poses() {
    let dir = tempdir().unwrap();
    let store = FilePoseStore::new(dir.path());
    assert!(store.all_pose_infos().unwrap().is_empty());

    store.add_pose(&t_pose(), Some(vec![0x89, b'P', b'N', b'G'])).unwrap();
    store.add_pose(&arms_up(), None).unwrap();

    let infos = store.all_pose_infos().unwrap();
    let ids: Vec<&str> = infos.iter().map(|i| i.pose_id.as_str()).collect();
    assert_eq!(ids, vec!["arms_up", "t_pose"]);
    assert_eq!(infos[1].display_name, "T Pose");
    assert!(infos[0].image_file.is_none());

    assert_eq!(store.load_pose_image(&infos[1]), Some(vec![0x89, b'P', b'N', b'G']));
    assert_eq!(store.load_pose_image(&infos[0]), None);
}

#[test]
fn test_round_trips_reference_data() {
    let dir = tempdir().unwrap();
    let store = FilePoseStore::new(dir.path());
    store.add_pose(&t_pose(), None).unwrap();

    let poses = store.all_poses().unwrap();
    assert_eq!(poses, vec![t_pose()]);
}

#[test]
fn test_cache_is_invalidated_by_add() {
    let dir = tempdir().unwrap();
    let store = FilePoseStore::new(dir.path());
    store.add_pose(&t_pose(), None).unwrap();
    assert_eq!(store.all_poses().unwrap().len(), 1);

    store.add_pose(&arms_up(), None).unwrap();
    assert_eq!(store.all_poses().unwrap().len(), 2);
}

#[test]
fn test_malformed_file_is_rejected_at_load() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("broken.json"),
        r#"{"poseId": "broken", "joints": {"tail": {"x": 0.1, "y": 0.1, "confidence": 1.0}}}"#,
    )
    .unwrap();

    let store = FilePoseStore::new(dir.path());
    assert_matches!(
        store.all_poses(),
        Err(PoseDataError::UnknownJointName { name, .. }) if name == "tail"
    );
}

#[test]
fn test_sequence_from_missing_directory_is_missing_data() {
    let dir = tempdir().unwrap();
    let store = FilePoseStore::new(dir.path().join("absent"));

    assert_matches!(
        load_sequence(&store, &["t_pose".to_string()]),
        Err(TrainingError::PoseData(PoseDataError::NotFound(_)))
    );
}

#[test]
fn test_file_named_differently_from_its_id_is_rejected() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("warmup.json"), t_pose().to_json_string().unwrap()).unwrap();

    let store = FilePoseStore::new(dir.path());
    assert_matches!(
        store.all_pose_infos(),
        Err(PoseDataError::FileIdMismatch { pose_id, .. }) if pose_id == "t_pose"
    );
    assert_matches!(
        load_sequence(&store, &["t_pose".to_string()]),
        Err(TrainingError::PoseData(PoseDataError::FileIdMismatch { .. }))
    );
}

#[test]
fn test_listed_ids_load_as_a_sequence() {
    let dir = tempdir().unwrap();
    let store = FilePoseStore::new(dir.path());
    store.add_pose(&arms_up(), None).unwrap();
    store.add_pose(&t_pose(), None).unwrap();

    let ids: Vec<String> = store
        .all_pose_infos()
        .unwrap()
        .into_iter()
        .map(|info| info.pose_id)
        .collect();
    let poses = load_sequence(&store, &ids).unwrap();
    assert_eq!(poses, vec![arms_up(), t_pose()]);
}
