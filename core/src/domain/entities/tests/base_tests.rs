//! Unit tests for the entity base

use chrono::{Duration, TimeZone, Utc};

use crate::domain::entities::base::{Entity, Timestamps};
use crate::schema::{ColumnDef, TableDef};

struct UserProfile;

impl Entity for UserProfile {
    const TYPE_NAME: &'static str = "UserProfile";

    fn define(table: TableDef) -> TableDef {
        table
            .column(ColumnDef::new("id", "BIGSERIAL"))
            .primary_key(["id"])
    }
}

struct Order;

impl Entity for Order {
    const TYPE_NAME: &'static str = "Order";

    fn define(table: TableDef) -> TableDef {
        table.column(ColumnDef::new("id", "BIGSERIAL"))
    }
}

#[test]
fn test_table_name_derivation() {
    assert_eq!(UserProfile::table_name(), "user_profiles");
    assert_eq!(Order::table_name(), "orders");
}

#[test]
fn test_define_receives_derived_name() {
    let table = UserProfile::define(TableDef::new(UserProfile::table_name()));
    assert_eq!(table.name(), "user_profiles");
    assert_eq!(table.columns().len(), 1);
}

#[test]
fn test_timestamps_pristine_after_insert() {
    let inserted = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let stamps = Timestamps::new(inserted, inserted);
    assert!(stamps.is_pristine());

    let updated = Timestamps::new(inserted, inserted + Duration::seconds(5));
    assert!(!updated.is_pristine());
    assert_eq!(updated.created_at, inserted);
}

#[test]
fn test_timestamps_serialization() {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let json = serde_json::to_value(Timestamps::new(at, at)).unwrap();

    assert_eq!(json["created_at"], "2024-05-01T12:00:00Z");
    assert_eq!(json["updated_at"], "2024-05-01T12:00:00Z");
}
