//! Naming rules for tables, constraints and indexes.

use bd_shared::config::NamingConvention;

/// PostgreSQL truncates identifiers beyond this many bytes
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Converts a PascalCase or camelCase type name to snake_case.
///
/// An upper-case letter opens a new word unless it sits inside a run of
/// capitals, so acronyms stay together: `HTTPRequest` becomes `http_request`
/// and `SomeSDK` becomes `some_sdk`.
pub fn camel_case_to_snake_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);

    for (idx, &ch) in chars.iter().enumerate() {
        if idx > 0 && ch.is_uppercase() {
            let next_is_upper_or_end = chars.get(idx + 1).map_or(true, |c| c.is_uppercase());
            let prev_is_upper = chars[idx - 1].is_uppercase();
            if !(prev_is_upper && next_is_upper_or_end) {
                out.push('_');
            }
        }
        out.extend(ch.to_lowercase());
    }

    out
}

/// Derives the storage table name for an entity type name.
///
/// snake_case plus a trailing `s`; irregular plurals are not handled.
pub fn table_name_for(type_name: &str) -> String {
    format!("{}s", camel_case_to_snake_case(type_name))
}

/// Kind of generated database object, keyed like the naming convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Index,
    Unique,
    Check,
    ForeignKey,
    PrimaryKey,
}

impl ConstraintKind {
    /// Short key used in the naming convention (`ix`, `uq`, ...)
    pub fn key(&self) -> &'static str {
        match self {
            ConstraintKind::Index => "ix",
            ConstraintKind::Unique => "uq",
            ConstraintKind::Check => "ck",
            ConstraintKind::ForeignKey => "fk",
            ConstraintKind::PrimaryKey => "pk",
        }
    }

    fn template(self, convention: &NamingConvention) -> &str {
        match self {
            ConstraintKind::Index => &convention.ix,
            ConstraintKind::Unique => &convention.uq,
            ConstraintKind::Check => &convention.ck,
            ConstraintKind::ForeignKey => &convention.fk,
            ConstraintKind::PrimaryKey => &convention.pk,
        }
    }
}

/// Values substituted into a naming template
#[derive(Debug, Clone, Default)]
pub struct NameTokens<'a> {
    pub table_name: &'a str,
    pub column_0_name: Option<&'a str>,
    pub constraint_name: Option<&'a str>,
    pub referred_table_name: Option<&'a str>,
}

impl<'a> NameTokens<'a> {
    pub fn table(table_name: &'a str) -> Self {
        Self {
            table_name,
            ..Default::default()
        }
    }

    pub fn column(mut self, column: &'a str) -> Self {
        self.column_0_name = Some(column);
        self
    }

    pub fn constraint(mut self, name: &'a str) -> Self {
        self.constraint_name = Some(name);
        self
    }

    pub fn referred_table(mut self, table: &'a str) -> Self {
        self.referred_table_name = Some(table);
        self
    }
}

/// Renders the name of a constraint or index from the convention.
///
/// Tokens with no value render as empty strings.
pub fn render_name(
    convention: &NamingConvention,
    kind: ConstraintKind,
    tokens: &NameTokens<'_>,
) -> String {
    let column = tokens.column_0_name.unwrap_or_default();
    let label = if column.is_empty() {
        String::new()
    } else {
        format!("{}_{}", tokens.table_name, column)
    };

    kind.template(convention)
        .replace("%(table_name)s", tokens.table_name)
        .replace("%(column_0_label)s", &label)
        .replace("%(column_0_name)s", column)
        .replace("%(constraint_name)s", tokens.constraint_name.unwrap_or_default())
        .replace(
            "%(referred_table_name)s",
            tokens.referred_table_name.unwrap_or_default(),
        )
}

/// Quote an identifier for PostgreSQL
///
/// Wraps the name in double quotes and doubles any embedded quote, so reserved
/// words such as `user` or `order` can be used as column and table names.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_to_snake_case() {
        assert_eq!(camel_case_to_snake_case("Order"), "order");
        assert_eq!(camel_case_to_snake_case("UserProfile"), "user_profile");
        assert_eq!(camel_case_to_snake_case("userProfile"), "user_profile");
        assert_eq!(camel_case_to_snake_case("SomeSDK"), "some_sdk");
        assert_eq!(camel_case_to_snake_case("RServoDrive"), "r_servo_drive");
        assert_eq!(camel_case_to_snake_case("SDKDemo"), "sdk_demo");
        assert_eq!(camel_case_to_snake_case("HTTPRequest"), "http_request");
        assert_eq!(camel_case_to_snake_case(""), "");
    }

    #[test]
    fn test_table_name_for() {
        assert_eq!(table_name_for("UserProfile"), "user_profiles");
        assert_eq!(table_name_for("Order"), "orders");
        // No irregular plural handling
        assert_eq!(table_name_for("Person"), "persons");
        assert_eq!(table_name_for("Address"), "addresss");
    }

    #[test]
    fn test_render_default_convention() {
        let convention = NamingConvention::default();

        assert_eq!(
            render_name(&convention, ConstraintKind::PrimaryKey, &NameTokens::table("orders")),
            "pk_orders"
        );
        assert_eq!(
            render_name(
                &convention,
                ConstraintKind::Index,
                &NameTokens::table("orders").column("user_id")
            ),
            "ix_orders_user_id"
        );
        assert_eq!(
            render_name(
                &convention,
                ConstraintKind::Unique,
                &NameTokens::table("user_profiles").column("email")
            ),
            "uq_user_profiles_email"
        );
        assert_eq!(
            render_name(
                &convention,
                ConstraintKind::Check,
                &NameTokens::table("orders").constraint("positive_total")
            ),
            "ck_orders_positive_total"
        );
        assert_eq!(
            render_name(
                &convention,
                ConstraintKind::ForeignKey,
                &NameTokens::table("orders")
                    .column("user_id")
                    .referred_table("users")
            ),
            "fk_orders_user_id_users"
        );
    }

    #[test]
    fn test_render_custom_convention() {
        let convention = NamingConvention {
            pk: String::from("%(table_name)s_pkey"),
            ..Default::default()
        };
        assert_eq!(
            render_name(&convention, ConstraintKind::PrimaryKey, &NameTokens::table("orders")),
            "orders_pkey"
        );
        assert_eq!(ConstraintKind::PrimaryKey.key(), "pk");
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("orders"), "\"orders\"");
        assert_eq!(quote_ident("user"), "\"user\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
        assert_eq!(quote_ident(""), "\"\"");
    }
}
