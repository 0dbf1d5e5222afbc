//! End-to-end list edits against a server directory on disk.

use mcserver_manager::players::{
    BanEntry, PlayerError, PlayerLists, WhitelistEntry, BANNED_PLAYERS_FILE, DEFAULT_BAN_REASON,
    WHITELIST_FILE,
};
use tempfile::TempDir;

use super::FixedResolver;

const NOTCH_UUID: &str = "069a79f4-44e9-4726-a5be-fca90e38aaf5";
const JEB_UUID: &str = "853c80ef3c3749fdaa49938b674adae6";

fn resolver() -> FixedResolver {
    FixedResolver::new(&[("Notch", NOTCH_UUID), ("jeb_", JEB_UUID)])
}

#[tokio::test]
async fn whitelist_add_writes_server_format() {
    let dir = TempDir::new().unwrap();
    let lists = PlayerLists::new(dir.path());

    lists.add_to_whitelist(&resolver(), "Notch").await.unwrap();
    let entry = lists.add_to_whitelist(&resolver(), "jeb_").await.unwrap();
    assert_eq!(entry.uuid, "853c80ef-3c37-49fd-aa49-938b674adae6");

    let content = std::fs::read_to_string(dir.path().join(WHITELIST_FILE)).unwrap();
    let parsed: Vec<WhitelistEntry> = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].name, "Notch");
    assert_eq!(parsed[0].uuid, NOTCH_UUID);
    assert!(content.contains("    \"uuid\""), "expected 4-space indent: {content}");
}

#[tokio::test]
async fn whitelist_rejects_duplicates_case_insensitively() {
    let dir = TempDir::new().unwrap();
    let lists = PlayerLists::new(dir.path());

    lists.add_to_whitelist(&resolver(), "Notch").await.unwrap();
    let err = lists.add_to_whitelist(&resolver(), "NOTCH").await.unwrap_err();

    assert!(matches!(err, PlayerError::AlreadyListed { .. }));
    assert_eq!(lists.whitelist().len(), 1);
}

#[tokio::test]
async fn whitelist_unknown_name_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let lists = PlayerLists::new(dir.path());

    let err = lists.add_to_whitelist(&resolver(), "Nobody").await.unwrap_err();

    assert!(matches!(err, PlayerError::UnresolvedName(name) if name == "Nobody"));
    assert!(!dir.path().join(WHITELIST_FILE).exists());
}

#[tokio::test]
async fn whitelist_remove_keeps_other_entries() {
    let dir = TempDir::new().unwrap();
    let lists = PlayerLists::new(dir.path());
    lists.add_to_whitelist(&resolver(), "Notch").await.unwrap();
    lists.add_to_whitelist(&resolver(), "jeb_").await.unwrap();

    let removed = lists.remove_from_whitelist("notch").unwrap();

    assert_eq!(removed.name, "Notch");
    let names: Vec<String> = lists.whitelist().into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec!["jeb_"]);
    assert!(matches!(
        lists.remove_from_whitelist("Notch"),
        Err(PlayerError::NotFound { .. })
    ));
}

#[tokio::test]
async fn ban_and_unban_round_trip_on_disk() {
    let dir = TempDir::new().unwrap();
    let lists = PlayerLists::new(dir.path());

    let entry = lists.ban(&resolver(), "Notch", None).await.unwrap();
    assert_eq!(entry.reason, DEFAULT_BAN_REASON);
    assert_eq!(entry.expires, "forever");
    assert_eq!(entry.source, "Console");

    lists.ban(&resolver(), "jeb_", Some("griefing")).await.unwrap();

    let content = std::fs::read_to_string(dir.path().join(BANNED_PLAYERS_FILE)).unwrap();
    let parsed: Vec<BanEntry> = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[1].reason, "griefing");

    assert!(matches!(
        lists.ban(&resolver(), "notch", None).await,
        Err(PlayerError::AlreadyListed { .. })
    ));

    lists.unban("Notch").unwrap();
    let names: Vec<String> = lists.banned().into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec!["jeb_"]);
}

#[tokio::test]
async fn malformed_list_is_treated_as_empty() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(WHITELIST_FILE), "not json").unwrap();
    let lists = PlayerLists::new(dir.path());

    assert!(lists.whitelist().is_empty());
    lists.add_to_whitelist(&resolver(), "Notch").await.unwrap();
    assert_eq!(lists.whitelist().len(), 1);
}
