//! SQLite persistence across repository instances.

use nexa_studio::session::{LoeSession, SolutionSession, SowSession, VisualsSession};
use nexa_studio::store::{load_artifact, save_artifact, SessionRepository, SqliteRepository, StoreError};
use nexa_studio::ArtifactKind;
use tempfile::TempDir;

fn database() -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("sessions.db");
    (dir, path)
}

#[test]
fn rows_survive_reopening_the_database() {
    let (_dir, path) = database();

    let row = {
        let repo = SqliteRepository::open(&path).unwrap();
        let mut solution = SolutionSession::new();
        solution.basic.title = "Claims Intake".into();
        solution.basic.recipient = "Northwind".into();
        solution.next_solution();
        let row = save_artifact(&repo, &mut solution).unwrap();

        let mut sow = SowSession { project: "Claims Intake".into(), client: "Northwind".into(), ..SowSession::new() };
        sow.badge.row = row;
        assert_eq!(save_artifact(&repo, &mut sow).unwrap(), row);
        row
    };

    let repo = SqliteRepository::open(&path).unwrap();
    let stored = repo.load(row).unwrap();
    assert_eq!(stored.title, "Claims Intake");
    assert_eq!(stored.kinds(), vec![ArtifactKind::Solutioning, ArtifactKind::Sow]);

    let solution: SolutionSession = load_artifact(&stored).unwrap().unwrap();
    assert_eq!(solution.count(), 2);
    assert_eq!(solution.badge.row, row);
    assert!(load_artifact::<LoeSession>(&stored).unwrap().is_none());
}

#[test]
fn listing_is_most_recent_first() {
    let (_dir, path) = database();
    let repo = SqliteRepository::open(&path).unwrap();

    let mut first = VisualsSession::new();
    first.basic.title = "First".into();
    let first_row = save_artifact(&repo, &mut first).unwrap();

    let mut second = SowSession { project: "Second".into(), ..SowSession::new() };
    save_artifact(&repo, &mut second).unwrap();

    // Touching the first row moves it back to the top.
    first.basic.client = "Acme".into();
    save_artifact(&repo, &mut first).unwrap();

    let listed = repo.list().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, first_row);
    assert_eq!(listed[0].client, "Acme");
    assert_eq!(listed[1].title, "Second");
}

#[test]
fn saving_into_a_deleted_row_fails() {
    let (_dir, path) = database();
    let repo = SqliteRepository::open(&path).unwrap();

    let mut sow = SowSession { project: "Gone".into(), ..SowSession::new() };
    let row = save_artifact(&repo, &mut sow).unwrap();
    repo.delete(row).unwrap();

    let err = save_artifact(&repo, &mut sow).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(r) if r == row));
    assert!(repo.list().unwrap().is_empty());
}
