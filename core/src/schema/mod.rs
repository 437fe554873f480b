//! Table definitions and PostgreSQL DDL generation.
//!
//! Entities are registered with a [`Schema`], which derives each table name,
//! appends the audit timestamp columns and names every constraint through the
//! configured [`NamingConvention`]. Every identifier is quoted, so reserved
//! words are valid names. The generated statements are idempotent and meant
//! to be executed in order inside one transaction.

use bd_shared::config::NamingConvention;

use crate::domain::entities::base::{Entity, CREATED_AT_COLUMN, UPDATED_AT_COLUMN};
use crate::domain::naming::{
    quote_ident, render_name, ConstraintKind, NameTokens, MAX_IDENTIFIER_LENGTH,
};
use crate::errors::{SchemaError, SchemaResult};


/// Trigger function that owns both audit timestamps
pub const TOUCH_TIMESTAMPS_FUNCTION: &str = "bedrock_touch_timestamps";

/// Column declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub sql_type: String,
    pub nullable: bool,
    pub default: Option<String>,
}

impl ColumnDef {
    /// A `NOT NULL` column without default
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            nullable: false,
            default: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Server-side default, given as a raw SQL expression
    pub fn default_sql(mut self, expression: impl Into<String>) -> Self {
        self.default = Some(expression.into());
        self
    }

    fn render(&self) -> String {
        let mut sql = format!("{} {}", quote_ident(&self.name), self.sql_type);
        if !self.nullable {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(default);
        }
        sql
    }
}

/// Foreign key from one column to a column of another table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDef {
    pub column: String,
    pub referred_table: String,
    pub referred_column: String,
}

/// Named check constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckDef {
    pub name: String,
    pub expression: String,
}

/// Definition of one entity table, minus the audit timestamps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    name: String,
    columns: Vec<ColumnDef>,
    primary_key: Vec<String>,
    unique: Vec<String>,
    indexes: Vec<String>,
    foreign_keys: Vec<ForeignKeyDef>,
    checks: Vec<CheckDef>,
}

impl TableDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            unique: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            checks: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn unique(mut self, column: impl Into<String>) -> Self {
        self.unique.push(column.into());
        self
    }

    pub fn index(mut self, column: impl Into<String>) -> Self {
        self.indexes.push(column.into());
        self
    }

    pub fn foreign_key(
        mut self,
        column: impl Into<String>,
        referred_table: impl Into<String>,
        referred_column: impl Into<String>,
    ) -> Self {
        self.foreign_keys.push(ForeignKeyDef {
            column: column.into(),
            referred_table: referred_table.into(),
            referred_column: referred_column.into(),
        });
        self
    }

    pub fn check(mut self, name: impl Into<String>, expression: impl Into<String>) -> Self {
        self.checks.push(CheckDef {
            name: name.into(),
            expression: expression.into(),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Check column declarations and constraint references
    pub fn validate(&self) -> SchemaResult<()> {
        check_identifier(&self.name)?;

        if self.columns.is_empty() {
            return Err(SchemaError::NoColumns {
                table: self.name.clone(),
            });
        }

        for (idx, column) in self.columns.iter().enumerate() {
            check_identifier(&column.name)?;
            if column.name == CREATED_AT_COLUMN || column.name == UPDATED_AT_COLUMN {
                return Err(SchemaError::ReservedColumn {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }
            if self.columns[..idx].iter().any(|c| c.name == column.name) {
                return Err(SchemaError::DuplicateColumn {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }
        }

        let referenced = self
            .primary_key
            .iter()
            .chain(&self.unique)
            .chain(&self.indexes)
            .chain(self.foreign_keys.iter().map(|fk| &fk.column));

        for column in referenced {
            if !self.has_column(column) {
                return Err(SchemaError::UnknownColumn {
                    table: self.name.clone(),
                    column: column.clone(),
                });
            }
        }

        Ok(())
    }

    /// `CREATE TABLE`, index and trigger statements for this table
    pub fn create_statements(&self, convention: &NamingConvention) -> SchemaResult<Vec<String>> {
        self.validate()?;

        let table = self.name.as_str();
        let quoted_table = quote_ident(table);
        let mut lines: Vec<String> = self.columns.iter().map(ColumnDef::render).collect();
        lines.push(format!(
            "{} TIMESTAMPTZ NOT NULL DEFAULT now()",
            quote_ident(CREATED_AT_COLUMN)
        ));
        lines.push(format!(
            "{} TIMESTAMPTZ NOT NULL DEFAULT now()",
            quote_ident(UPDATED_AT_COLUMN)
        ));

        if !self.primary_key.is_empty() {
            let name = constraint_name(convention, ConstraintKind::PrimaryKey, NameTokens::table(table))?;
            lines.push(format!(
                "CONSTRAINT {} PRIMARY KEY ({})",
                quote_ident(&name),
                quote_list(&self.primary_key)
            ));
        }

        for column in &self.unique {
            let tokens = NameTokens::table(table).column(column);
            let name = constraint_name(convention, ConstraintKind::Unique, tokens)?;
            lines.push(format!(
                "CONSTRAINT {} UNIQUE ({})",
                quote_ident(&name),
                quote_ident(column)
            ));
        }

        for check in &self.checks {
            let tokens = NameTokens::table(table).constraint(&check.name);
            let name = constraint_name(convention, ConstraintKind::Check, tokens)?;
            lines.push(format!(
                "CONSTRAINT {} CHECK ({})",
                quote_ident(&name),
                check.expression
            ));
        }

        for fk in &self.foreign_keys {
            let tokens = NameTokens::table(table)
                .column(&fk.column)
                .referred_table(&fk.referred_table);
            let name = constraint_name(convention, ConstraintKind::ForeignKey, tokens)?;
            lines.push(format!(
                "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
                quote_ident(&name),
                quote_ident(&fk.column),
                quote_ident(&fk.referred_table),
                quote_ident(&fk.referred_column)
            ));
        }

        let mut statements = vec![format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            quoted_table,
            lines.join(",\n    ")
        )];

        for column in &self.indexes {
            let tokens = NameTokens::table(table).column(column);
            let name = constraint_name(convention, ConstraintKind::Index, tokens)?;
            statements.push(format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                quote_ident(&name),
                quoted_table,
                quote_ident(column)
            ));
        }

        let trigger = format!("trg_{}_timestamps", table);
        check_identifier(&trigger)?;
        let trigger = quote_ident(&trigger);
        statements.push(format!(
            "DROP TRIGGER IF EXISTS {} ON {}",
            trigger, quoted_table
        ));
        statements.push(format!(
            "CREATE TRIGGER {} BEFORE INSERT OR UPDATE ON {} FOR EACH ROW EXECUTE FUNCTION {}()",
            trigger, quoted_table, TOUCH_TIMESTAMPS_FUNCTION
        ));

        Ok(statements)
    }
}

/// Registry of entity tables sharing one naming convention
#[derive(Debug, Clone)]
pub struct Schema {
    convention: NamingConvention,
    tables: Vec<TableDef>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new(NamingConvention::default())
    }
}

impl Schema {
    pub fn new(convention: NamingConvention) -> Self {
        Self {
            convention,
            tables: Vec::new(),
        }
    }

    /// Register an entity; its table name is derived here, once
    pub fn register<E: Entity>(&mut self) -> SchemaResult<&mut Self> {
        let table = E::define(TableDef::new(E::table_name()));
        self.add_table(table)?;
        Ok(self)
    }

    /// Register a table defined by hand
    pub fn add_table(&mut self, table: TableDef) -> SchemaResult<()> {
        if self.table(table.name()).is_some() {
            return Err(SchemaError::DuplicateTable {
                table: table.name().to_string(),
            });
        }
        table.validate()?;

        tracing::debug!("Registered table {}", table.name());
        self.tables.push(table);
        Ok(())
    }

    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|t| t.name() == name)
    }

    pub fn tables(&self) -> &[TableDef] {
        &self.tables
    }

    pub fn convention(&self) -> &NamingConvention {
        &self.convention
    }

    /// Every statement needed to create the schema, in execution order
    ///
    /// Tables are created in registration order, so referenced tables must be
    /// registered before the tables pointing at them.
    pub fn statements(&self) -> SchemaResult<Vec<String>> {
        let mut statements = vec![touch_timestamps_function()];
        for table in &self.tables {
            statements.extend(table.create_statements(&self.convention)?);
        }
        Ok(statements)
    }
}

/// Trigger function stamping `created_at` once and `updated_at` on every write
///
/// On insert both columns take the transaction timestamp, whatever the
/// statement supplied. On update `created_at` is pinned to its stored value
/// and `updated_at` takes the wall clock, so consecutive updates inside one
/// transaction still move it forward.
pub fn touch_timestamps_function() -> String {
    format!(
        r#"CREATE OR REPLACE FUNCTION {function}() RETURNS trigger AS $$
BEGIN
    IF TG_OP = 'INSERT' THEN
        NEW.{created} := now();
        NEW.{updated} := NEW.{created};
    ELSE
        NEW.{created} := OLD.{created};
        NEW.{updated} := clock_timestamp();
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql"#,
        function = TOUCH_TIMESTAMPS_FUNCTION,
        created = CREATED_AT_COLUMN,
        updated = UPDATED_AT_COLUMN,
    )
}

fn quote_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn constraint_name(
    convention: &NamingConvention,
    kind: ConstraintKind,
    tokens: NameTokens<'_>,
) -> SchemaResult<String> {
    let name = render_name(convention, kind, &tokens);
    check_identifier(&name)?;
    Ok(name)
}

fn check_identifier(name: &str) -> SchemaResult<()> {
    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(SchemaError::IdentifierTooLong {
            name: name.to_string(),
            max: MAX_IDENTIFIER_LENGTH,
        });
    }
    Ok(())
}
