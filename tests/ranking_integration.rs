//! Leaderboard store integration tests against an on-disk database.

use std::time::Duration;

use tempfile::TempDir;
use voidgaze::ranking::{RankingStore, DEFAULT_LEADERBOARD_SIZE};

fn open_store(dir: &TempDir) -> RankingStore {
    RankingStore::open(&dir.path().join("scores.db")).unwrap()
}

#[test]
fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let store = open_store(&dir);
        store
            .add_record("persistent", Duration::from_secs(42))
            .unwrap();
    }

    // A fresh connection sees the same data; migrations rerun harmlessly.
    let store = open_store(&dir);
    let board = store.leaderboard().unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].nickname, "persistent");
    assert_eq!(board[0].duration(), Duration::from_secs(42));
}

#[test]
fn test_board_fills_and_prunes_across_sessions() {
    let dir = TempDir::new().unwrap();

    {
        let store = open_store(&dir);
        for i in 0..8u64 {
            store
                .add_record(&format!("early-{i}"), Duration::from_secs(i + 1))
                .unwrap();
        }
    }

    let store = open_store(&dir);
    for i in 0..8u64 {
        store
            .add_record(&format!("late-{i}"), Duration::from_secs(100 + i))
            .unwrap();
    }

    // The eight strong late scores push out all but the two best early ones.
    let board = store.leaderboard().unwrap();
    assert_eq!(board.len(), DEFAULT_LEADERBOARD_SIZE);
    assert_eq!(board[0].nickname, "late-7");
    assert!(board
        .iter()
        .filter(|r| r.nickname.starts_with("early"))
        .all(|r| r.duration() >= Duration::from_secs(7)));
}

#[test]
fn test_ordering_is_stable_for_equal_durations() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let first = store.add_record("first", Duration::from_secs(10)).unwrap();
    let second = store.add_record("second", Duration::from_secs(10)).unwrap();

    // Earlier submission ranks higher on a tie.
    let board = store.leaderboard().unwrap();
    assert_eq!(board[0].id, first.id);
    assert_eq!(board[1].id, second.id);
}

#[test]
fn test_clear_leaves_empty_board() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    store.add_record("someone", Duration::from_secs(5)).unwrap();
    store.clear_records().unwrap();

    assert_eq!(store.count_records().unwrap(), 0);
    assert!(store.leaderboard().unwrap().is_empty());
}
