//! Base contract shared by every persisted entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::naming::table_name_for;
use crate::schema::TableDef;

/// Column stamped by the storage engine when a row is inserted
pub const CREATED_AT_COLUMN: &str = "created_at";

/// Column stamped by the storage engine on insert and on every update
pub const UPDATED_AT_COLUMN: &str = "updated_at";

/// A type persisted in its own table
///
/// The table name is derived from [`Entity::TYPE_NAME`] when the entity is
/// registered with a [`Schema`](crate::schema::Schema). Primary keys and
/// other columns are up to each implementation; the audit timestamp columns
/// are always added by the schema and must not be declared here.
///
/// ```
/// use bd_core::{Entity, TableDef, ColumnDef};
///
/// struct UserProfile;
///
/// impl Entity for UserProfile {
///     const TYPE_NAME: &'static str = "UserProfile";
///
///     fn define(table: TableDef) -> TableDef {
///         table
///             .column(ColumnDef::new("id", "BIGSERIAL"))
///             .primary_key(["id"])
///     }
/// }
///
/// assert_eq!(UserProfile::table_name(), "user_profiles");
/// ```
pub trait Entity {
    /// PascalCase type name the table name is derived from
    const TYPE_NAME: &'static str;

    /// Storage table name: snake_case type name plus `s`
    fn table_name() -> String {
        table_name_for(Self::TYPE_NAME)
    }

    /// Declare the entity's own columns and constraints
    fn define(table: TableDef) -> TableDef;
}

/// Audit timestamps carried by every entity row
///
/// Both values come from the database; application code only reads them.
/// With the `sqlx` feature the pair decodes straight from a row, usually
/// flattened into the entity's row type:
///
/// ```ignore
/// #[derive(sqlx::FromRow)]
/// struct OrderRow {
///     id: i64,
///     #[sqlx(flatten)]
///     timestamps: Timestamps,
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Timestamps {
    /// Set once when the row is inserted
    pub created_at: DateTime<Utc>,

    /// Equal to `created_at` after insert, re-stamped on every update
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    pub fn new(created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            updated_at,
        }
    }

    /// True while the row has never been updated
    pub fn is_pristine(&self) -> bool {
        self.created_at == self.updated_at
    }
}
