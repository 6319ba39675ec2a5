use std::io::Read;

use super::{ExtractContext, Extracted, TsvRows};
use crate::constants::is_acting_role;
use crate::domain::events::Stage;
use crate::domain::{Adjacency, MovieTable, PersonId, TitleId};
use crate::error::{BuildError, Result};

/// Streams `title.principals.tsv` into a movie to actors adjacency.
///
/// This is the largest input, so rows are never deserialized: each one costs
/// a field lookup, a set probe against `movies` and a category comparison.
/// Allocation only happens for rows that are kept.
pub fn extract<R: Read>(
    reader: R,
    movies: &MovieTable,
    ctx: &ExtractContext,
) -> Result<Extracted<Adjacency>> {
    let mut rows = TsvRows::new(reader, Stage::Links, &["tconst", "category", "nconst"], ctx)?;
    let (Some(title_col), Some(category_col), Some(person_col)) = (
        rows.column("tconst"),
        rows.column("category"),
        rows.column("nconst"),
    ) else {
        return Err(BuildError::stage(
            Stage::Links,
            "principals header lost a required column",
        ));
    };

    let mut adjacency = Adjacency::new();
    let mut kept = 0usize;

    while rows.advance()? {
        let (Some(title), Some(category), Some(person)) = (
            rows.field(title_col),
            rows.field(category_col),
            rows.field(person_col),
        ) else {
            rows.skip();
            continue;
        };

        if !is_acting_role(category) || !movies.contains_key(title) {
            continue;
        }

        let newly_linked = match adjacency.get_mut(title) {
            Some(cast) => cast.insert(PersonId::from(person)),
            None => adjacency
                .entry(TitleId::from(title))
                .or_default()
                .insert(PersonId::from(person)),
        };
        if newly_linked {
            kept += 1;
        }
    }

    let stats = rows.finish(kept);
    Ok(Extracted {
        table: adjacency,
        stats,
    })
}
