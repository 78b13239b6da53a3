//! SQL parsing into normalized statements.
//!
//! Source text is parsed with the PostgreSQL dialect and each statement is
//! regenerated from its AST. That regenerated ("canonical") text is what gets
//! hashed and stored, so whitespace and formatting differences in the source
//! never affect statement identity.

use crate::error::{FlowError, Result};
use crate::hash;
use serde::{Deserialize, Serialize};
use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use std::fmt;

/// Category of database object a statement defines.
///
/// Replaceable kinds track a current version per `(name, kind)` pair in the
/// registry; all other kinds are registered anonymously by hash alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Other,
    Function,
    Procedure,
    View,
    Trigger,
    Type,
    Table,
    Index,
    Schema,
    Sequence,
}

impl StatementKind {
    /// Whether objects of this kind support in-place replacement.
    ///
    /// Only replaceable kinds carry a name; a revision of a named object
    /// replaces its registry row instead of accumulating a new one.
    pub fn is_replaceable(self) -> bool {
        matches!(
            self,
            StatementKind::Function
                | StatementKind::Procedure
                | StatementKind::View
                | StatementKind::Trigger
                | StatementKind::Type
        )
    }

    /// Integer code stored in the `stmt_type` column.
    pub fn code(self) -> i32 {
        match self {
            StatementKind::Other => 0,
            StatementKind::Function => 1,
            StatementKind::Procedure => 2,
            StatementKind::View => 3,
            StatementKind::Trigger => 4,
            StatementKind::Type => 5,
            StatementKind::Table => 6,
            StatementKind::Index => 7,
            StatementKind::Schema => 8,
            StatementKind::Sequence => 9,
        }
    }

    /// Parse a `stmt_type` column code back into a kind.
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(StatementKind::Other),
            1 => Ok(StatementKind::Function),
            2 => Ok(StatementKind::Procedure),
            3 => Ok(StatementKind::View),
            4 => Ok(StatementKind::Trigger),
            5 => Ok(StatementKind::Type),
            6 => Ok(StatementKind::Table),
            7 => Ok(StatementKind::Index),
            8 => Ok(StatementKind::Schema),
            9 => Ok(StatementKind::Sequence),
            _ => Err(FlowError::Config(format!(
                "Invalid statement type code: {}",
                code
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Other => "statement",
            StatementKind::Function => "function",
            StatementKind::Procedure => "procedure",
            StatementKind::View => "view",
            StatementKind::Trigger => "trigger",
            StatementKind::Type => "type",
            StatementKind::Table => "table",
            StatementKind::Index => "index",
            StatementKind::Schema => "schema",
            StatementKind::Sequence => "sequence",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized SQL statement, the canonical unit of reconciliation work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStatement {
    /// Canonical text regenerated from the AST.
    pub text: String,

    /// Hex digest of the canonical text.
    pub hash: String,

    /// Category of the defined object.
    pub kind: StatementKind,

    /// Object name, present only for replaceable kinds.
    pub name: Option<String>,
}

impl ParsedStatement {
    /// Build a parsed statement from a sqlparser AST node.
    pub fn from_ast(statement: &Statement) -> Self {
        let (kind, name) = kind_and_name(statement);
        let text = statement.to_string();
        let hash = hash::hash_str(&text);
        Self {
            text,
            hash,
            kind,
            name,
        }
    }

    /// Whether this statement defines a named, replaceable object.
    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }
}

/// Extract the kind tag and, for replaceable kinds, the object name.
///
/// Named-but-not-replaceable objects (tables, indexes, schemas, sequences)
/// deliberately come back anonymous: they are never revised in place, so the
/// registry tracks them by hash alone.
fn kind_and_name(statement: &Statement) -> (StatementKind, Option<String>) {
    match statement {
        Statement::CreateFunction { name, .. } => {
            (StatementKind::Function, Some(name.to_string()))
        }
        Statement::CreateProcedure { name, .. } => {
            (StatementKind::Procedure, Some(name.to_string()))
        }
        Statement::CreateView { name, .. } => (StatementKind::View, Some(name.to_string())),
        Statement::CreateTrigger { name, .. } => {
            (StatementKind::Trigger, Some(name.to_string()))
        }
        Statement::CreateType { name, .. } => (StatementKind::Type, Some(name.to_string())),
        Statement::CreateTable(_) => (StatementKind::Table, None),
        Statement::CreateIndex(_) => (StatementKind::Index, None),
        Statement::CreateSchema { .. } => (StatementKind::Schema, None),
        Statement::CreateSequence { .. } => (StatementKind::Sequence, None),
        _ => (StatementKind::Other, None),
    }
}

/// Parse the contents of one source file into normalized statements.
///
/// `file` is used only for error reporting; unparseable input aborts the
/// whole file.
pub fn parse_sql(sql: &str, file: &str) -> Result<Vec<ParsedStatement>> {
    let statements = Parser::parse_sql(&PostgreSqlDialect {}, sql)
        .map_err(|e| FlowError::parse(file, e.to_string()))?;

    Ok(statements.iter().map(ParsedStatement::from_ast).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_function_extraction() {
        let stmts = parse_sql(
            "create or replace function add_one(x int) returns int language sql as 'select x + 1'",
            "f.sql",
        )
        .unwrap();
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].kind, StatementKind::Function);
        assert_eq!(stmts[0].name.as_deref(), Some("add_one"));
        assert!(stmts[0].is_named());
    }

    #[test]
    fn test_view_is_named_and_replaceable() {
        let stmts = parse_sql("create view active_users as select 1 as id", "v.sql").unwrap();
        assert_eq!(stmts[0].kind, StatementKind::View);
        assert_eq!(stmts[0].name.as_deref(), Some("active_users"));
        assert!(stmts[0].kind.is_replaceable());
    }

    #[test]
    fn test_table_is_anonymous() {
        let stmts = parse_sql("create table users (id int primary key)", "t.sql").unwrap();
        assert_eq!(stmts[0].kind, StatementKind::Table);
        assert_eq!(stmts[0].name, None);
        assert!(!stmts[0].kind.is_replaceable());
    }

    #[test]
    fn test_index_is_anonymous() {
        let stmts = parse_sql("create index idx_users_id on users (id)", "i.sql").unwrap();
        assert_eq!(stmts[0].kind, StatementKind::Index);
        assert_eq!(stmts[0].name, None);
    }

    #[test]
    fn test_one_off_ddl_is_other() {
        let stmts = parse_sql("grant select on users to reporting", "g.sql").unwrap();
        assert_eq!(stmts[0].kind, StatementKind::Other);
        assert_eq!(stmts[0].name, None);
    }

    #[test]
    fn test_multiple_statements_in_one_file() {
        let stmts = parse_sql(
            "create table t (id int); create view v as select id from t;",
            "m.sql",
        )
        .unwrap();
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].kind, StatementKind::Table);
        assert_eq!(stmts[1].kind, StatementKind::View);
    }

    #[test]
    fn test_canonical_text_ignores_formatting() {
        let a = parse_sql("select   1,\n\t 2", "a.sql").unwrap();
        let b = parse_sql("select 1, 2", "b.sql").unwrap();
        assert_eq!(a[0].text, b[0].text);
        assert_eq!(a[0].hash, b[0].hash);
    }

    #[test]
    fn test_unparseable_input_reports_file() {
        let err = parse_sql("create view broken as", "sql/broken.sql").unwrap_err();
        match err {
            FlowError::Parse { file, .. } => assert_eq!(file, "sql/broken.sql"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_kind_code_roundtrip() {
        let kinds = [
            StatementKind::Other,
            StatementKind::Function,
            StatementKind::Procedure,
            StatementKind::View,
            StatementKind::Trigger,
            StatementKind::Type,
            StatementKind::Table,
            StatementKind::Index,
            StatementKind::Schema,
            StatementKind::Sequence,
        ];

        for kind in kinds {
            assert_eq!(StatementKind::from_code(kind.code()).unwrap(), kind);
        }
    }

    #[test]
    fn test_invalid_kind_code() {
        assert!(StatementKind::from_code(42).is_err());
    }

    #[test]
    fn test_hash_matches_canonical_text() {
        let stmts = parse_sql("select 1", "s.sql").unwrap();
        assert_eq!(stmts[0].hash, crate::hash::hash_str(&stmts[0].text));
    }
}
