use std::path::{Path, PathBuf};
use std::time::Duration;

use rustc_hash::FxHashMap;
use tempfile::TempDir;

use super::debouncer::{DEBOUNCE_MS, Debouncer};
use super::filter::WatchFilter;
use super::types::ChangeKind;
use crate::actor::messages::HotUpdateMsg;
use crate::config::ProjectConfig;
use crate::utils::path::normalize_path;

fn make_config() -> (TempDir, ProjectConfig) {
    let temp = TempDir::new().unwrap();
    let root = normalize_path(temp.path());

    let mut config = ProjectConfig::default();
    config.set_root(&root);
    config.build.normalize(&root);
    config.config_path = root.join("modkit.toml");
    std::fs::write(&config.config_path, "").unwrap();

    (temp, config)
}

fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn remove_kind() -> notify::EventKind {
    notify::EventKind::Remove(notify::event::RemoveKind::File)
}

fn batch(entries: &[(&Path, ChangeKind)]) -> FxHashMap<PathBuf, ChangeKind> {
    entries
        .iter()
        .map(|(path, kind)| (path.to_path_buf(), *kind))
        .collect()
}

#[test]
fn test_debouncer_empty() {
    let debouncer = Debouncer::new();
    assert!(!debouncer.is_ready());
}

#[test]
fn test_event_routing_by_kind() {
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/a.tsx"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/b.tsx"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/c.tsx"], remove_kind()));

    assert_eq!(debouncer.changes.len(), 3);
    assert_eq!(debouncer.changes[&PathBuf::from("/tmp/a.tsx")], ChangeKind::Created);
    assert_eq!(debouncer.changes[&PathBuf::from("/tmp/b.tsx")], ChangeKind::Modified);
    assert_eq!(debouncer.changes[&PathBuf::from("/tmp/c.tsx")], ChangeKind::Removed);
}

#[test]
fn test_metadata_change_ignored() {
    let mut debouncer = Debouncer::new();
    let kind = notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
        notify::event::MetadataKind::WriteTime,
    ));
    debouncer.add_event(&make_event(vec!["/tmp/a.tsx"], kind));
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.last_event.is_none());
}

#[test]
fn test_temp_file_ignored() {
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/real.tsx"], modify_kind()));
    let first_time = debouncer.last_event.unwrap();

    std::thread::sleep(Duration::from_millis(5));

    debouncer.add_event(&make_event(vec!["/tmp/component.tsx.swp"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/component.tsx~"], modify_kind()));
    assert_eq!(debouncer.last_event.unwrap(), first_time);
    assert_eq!(debouncer.changes.len(), 1);
}

#[test]
fn test_dedup_first_event_wins() {
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/a.tsx"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.tsx"], modify_kind()));

    assert_eq!(debouncer.changes.len(), 1);
    assert_eq!(debouncer.changes[&PathBuf::from("/tmp/a.tsx")], ChangeKind::Created);
}

#[test]
fn test_remove_then_create_restores() {
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/a.tsx"], remove_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.tsx"], create_kind()));
    assert_eq!(debouncer.changes[&PathBuf::from("/tmp/a.tsx")], ChangeKind::Created);
}

#[test]
fn test_create_then_remove_discards() {
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/a.tsx"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.tsx"], remove_kind()));
    assert!(debouncer.changes.is_empty());
}

#[test]
fn test_modify_then_remove_upgrades() {
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/a.tsx"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.tsx"], remove_kind()));
    assert_eq!(debouncer.changes[&PathBuf::from("/tmp/a.tsx")], ChangeKind::Removed);
}

#[test]
fn test_sleep_duration_no_events() {
    let debouncer = Debouncer::new();
    assert!(debouncer.sleep_duration() >= Duration::from_secs(3600));
}

#[test]
fn test_sleep_duration_after_event() {
    let mut debouncer = Debouncer::new();
    debouncer.last_event = Some(std::time::Instant::now());

    let dur = debouncer.sleep_duration();
    assert!(dur <= Duration::from_millis(DEBOUNCE_MS));
    assert!(dur >= Duration::from_millis(DEBOUNCE_MS - 20));
}

#[test]
fn test_take_after_quiet_period() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.tsx"], modify_kind()));
    assert!(debouncer.take_if_ready().is_none());

    std::thread::sleep(Duration::from_millis(DEBOUNCE_MS + 20));
    let changes = debouncer.take_if_ready().unwrap();
    assert_eq!(changes.len(), 1);
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.take_if_ready().is_none());
}

#[test]
fn test_route_forwards_draft_change() {
    let (_tmp, config) = make_config();
    let filter = WatchFilter::from_config(&config);

    let messages = filter.route(batch(&[(&config.build.draft, ChangeKind::Modified)]));
    assert!(matches!(
        messages.as_slice(),
        [HotUpdateMsg::Changed(paths)] if paths == &vec![config.build.draft.clone()]
    ));
}

#[test]
fn test_route_skips_build_outputs() {
    let (_tmp, config) = make_config();
    let filter = WatchFilter::from_config(&config);
    let root = config.get_root();

    let snapshot = config.build.saved.join("alpha/v1/component.tsx");
    let messages = filter.route(batch(&[
        (&config.build.ready, ChangeKind::Modified),
        (&snapshot, ChangeKind::Created),
        (&root.join("node_modules/react/index.js"), ChangeKind::Modified),
        (&root.join(".git/index"), ChangeKind::Modified),
    ]));
    assert!(messages.is_empty());
}

#[test]
fn test_route_reports_config_change_first() {
    let (_tmp, config) = make_config();
    let filter = WatchFilter::from_config(&config);
    let styles = config.get_root().join("public/styles.css");

    let messages = filter.route(batch(&[
        (&styles, ChangeKind::Created),
        (&config.config_path, ChangeKind::Modified),
    ]));
    assert!(matches!(messages[0], HotUpdateMsg::ConfigChanged));
    assert!(matches!(&messages[1], HotUpdateMsg::Changed(paths) if paths == &vec![styles.clone()]));
}

#[test]
fn test_route_drops_removed_files() {
    let (_tmp, config) = make_config();
    let filter = WatchFilter::from_config(&config);

    let messages = filter.route(batch(&[
        (&config.build.draft, ChangeKind::Removed),
        (&config.config_path, ChangeKind::Removed),
    ]));
    assert!(messages.is_empty());
}
