use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, FromQueryResult, Statement};
use serde::Serialize;

/// A movie hit from the title index.
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct TitleMatch {
    pub tconst: String,
    pub title: String,
    pub year: Option<i32>,
    pub votes: Option<i64>,
}

#[derive(Debug, Clone, FromQueryResult)]
struct NameMatch {
    name: String,
}

/// Full-text prefix search over the FTS5 tables.
pub struct SearchRepository<'c> {
    conn: &'c DatabaseConnection,
}

impl<'c> SearchRepository<'c> {
    #[must_use]
    pub const fn new(conn: &'c DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Titles matching every term of `query` as a prefix, most voted first.
    pub async fn search_titles(&self, query: &str, limit: u64) -> Result<Vec<TitleMatch>, DbErr> {
        let Some(expr) = prefix_query(query) else {
            return Ok(Vec::new());
        };
        let backend = self.conn.get_database_backend();
        TitleMatch::find_by_statement(Statement::from_sql_and_values(
            backend,
            "SELECT m.tconst, m.title, m.year, m.votes
             FROM movies m
             JOIN movies_fts fts ON m.rowid = fts.rowid
             WHERE movies_fts MATCH ?
             ORDER BY m.votes DESC, m.tconst
             LIMIT ?",
            [expr.into(), limit_value(limit).into()],
        ))
        .all(self.conn)
        .await
    }

    pub async fn search_names(&self, query: &str, limit: u64) -> Result<Vec<String>, DbErr> {
        let Some(expr) = prefix_query(query) else {
            return Ok(Vec::new());
        };
        let backend = self.conn.get_database_backend();
        let rows = NameMatch::find_by_statement(Statement::from_sql_and_values(
            backend,
            "SELECT a.name
             FROM actors a
             JOIN actors_fts fts ON a.rowid = fts.rowid
             WHERE actors_fts MATCH ?
             ORDER BY a.name
             LIMIT ?",
            [expr.into(), limit_value(limit).into()],
        ))
        .all(self.conn)
        .await?;
        Ok(rows.into_iter().map(|r| r.name).collect())
    }
}

fn limit_value(limit: u64) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Turns user text into an FTS5 expression where each whitespace-separated
/// term is a quoted prefix token, e.g. `the matr` becomes `"the"* "matr"*`.
///
/// Quoting keeps FTS5 operators and punctuation in the input literal.
/// Returns `None` when there is nothing to search for.
#[must_use]
pub fn prefix_query(input: &str) -> Option<String> {
    let terms: Vec<String> = input
        .split_whitespace()
        .map(|term| term.trim_end_matches('*'))
        .filter(|term| term.chars().any(char::is_alphanumeric))
        .map(|term| format!("\"{}\"*", term.replace('"', "\"\"")))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_query_quotes_each_term() {
        assert_eq!(prefix_query("Matrix").as_deref(), Some("\"Matrix\"*"));
        assert_eq!(
            prefix_query("  the   matr ").as_deref(),
            Some("\"the\"* \"matr\"*")
        );
    }

    #[test]
    fn prefix_query_accepts_trailing_star() {
        assert_eq!(prefix_query("Matrix*").as_deref(), Some("\"Matrix\"*"));
    }

    #[test]
    fn prefix_query_neutralizes_operators() {
        assert_eq!(
            prefix_query("\"a OR b").as_deref(),
            Some("\"\"\"a\"* \"OR\"* \"b\"*")
        );
    }

    #[test]
    fn prefix_query_empty_input() {
        assert_eq!(prefix_query(""), None);
        assert_eq!(prefix_query("  * "), None);
        assert_eq!(prefix_query("\" -"), None);
    }
}
