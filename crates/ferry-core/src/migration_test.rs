use super::*;

#[test]
fn test_direction_round_trips_through_persisted_form() {
    for direction in [Direction::Upgrade, Direction::Downgrade] {
        assert_eq!(direction.as_str().parse::<Direction>().unwrap(), direction);
    }
    assert!("SIDEWAYS".parse::<Direction>().is_err());
}

#[test]
fn test_direction_file_tags() {
    assert_eq!(Direction::from_file_tag("up"), Some(Direction::Upgrade));
    assert_eq!(Direction::from_file_tag("down"), Some(Direction::Downgrade));
    assert_eq!(Direction::from_file_tag("UP"), None);
    assert_eq!(Direction::Downgrade.file_tag(), "down");
}

#[test]
fn test_canonical_file_name() {
    assert_eq!(
        canonical_file_name(12, "add_orgs", Direction::Upgrade),
        "V12__add_orgs.up.sql"
    );
    assert_eq!(
        canonical_file_name(0, "baseline", Direction::Downgrade),
        "V0__baseline.down.sql"
    );
}

#[test]
fn test_status_from_pending_columns() {
    let status = MigrationStatus::from_columns(false, false, None, 0).unwrap();
    assert_eq!(status, MigrationStatus::Pending);
    assert!(!status.is_processed());
    assert_eq!(status.execution_seconds(), None);
}

#[test]
fn test_status_rejects_unprocessed_success() {
    assert!(MigrationStatus::from_columns(false, true, None, 0).is_err());
    assert!(MigrationStatus::from_columns(false, false, Some("boom".into()), 0).is_err());
}

#[test]
fn test_status_rejects_success_with_error() {
    assert!(MigrationStatus::from_columns(true, true, Some("boom".into()), 1).is_err());
}

#[test]
fn test_status_treats_empty_error_as_absent() {
    let status = MigrationStatus::from_columns(true, true, Some(String::new()), 3).unwrap();
    assert_eq!(
        status,
        MigrationStatus::Applied {
            execution_seconds: 3
        }
    );
}

#[test]
fn test_status_failed_columns() {
    let status = MigrationStatus::from_columns(true, false, Some("syntax".into()), 2).unwrap();
    assert!(status.is_processed());
    assert!(!status.is_succeeded());
    assert_eq!(status.error_message(), Some("syntax"));
    assert_eq!(status.execution_seconds(), Some(2));
}

#[test]
fn test_status_resolved() {
    assert_eq!(
        MigrationStatus::resolved(4, Outcome::Succeeded),
        MigrationStatus::Applied {
            execution_seconds: 4
        }
    );
    assert_eq!(
        MigrationStatus::resolved(0, Outcome::Failed("nope".into())).error_message(),
        Some("nope")
    );
}
