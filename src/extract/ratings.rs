use serde::Deserialize;
use std::io::Read;

use super::{ExtractContext, Extracted, TsvRows};
use crate::domain::events::Stage;
use crate::domain::{Rating, RatingTable, TitleId};
use crate::error::Result;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RatingRow<'a> {
    tconst: &'a str,
    average_rating: f64,
    num_votes: i64,
}

/// Reads `title.ratings.tsv` into a title id to rating lookup.
///
/// A row whose rating or vote count does not parse is skipped.
pub fn extract<R: Read>(reader: R, ctx: &ExtractContext) -> Result<Extracted<RatingTable>> {
    let mut rows = TsvRows::new(
        reader,
        Stage::Ratings,
        &["tconst", "averageRating", "numVotes"],
        ctx,
    )?;
    let mut table = RatingTable::new();

    while rows.advance()? {
        let Some(row) = rows.parse::<RatingRow<'_>>() else {
            continue;
        };
        table.insert(
            TitleId::from(row.tconst),
            Rating {
                average: row.average_rating,
                votes: row.num_votes,
            },
        );
        rows.check_limit(table.len())?;
    }

    let stats = rows.finish(table.len());
    Ok(Extracted { table, stats })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ratings_and_skips_malformed_rows() {
        let tsv = "tconst\taverageRating\tnumVotes\n\
                   tt0133093\t8.7\t2000000\n\
                   tt0000001\t\\N\t10\n\
                   tt0000002\t5.5\tmany\n\
                   tt0000003\t6.1\t42\n";

        let out = extract(tsv.as_bytes(), &ExtractContext::default()).unwrap();

        assert_eq!(out.table.len(), 2);
        assert_eq!(
            out.table.get("tt0133093"),
            Some(&Rating {
                average: 8.7,
                votes: 2_000_000
            })
        );
        assert!(!out.table.contains_key("tt0000001"));
        assert!(!out.table.contains_key("tt0000002"));
        assert_eq!(out.stats.read, 4);
        assert_eq!(out.stats.kept, 2);
        assert_eq!(out.stats.skipped, 2);
    }

    #[test]
    fn row_limit_aborts() {
        let tsv = "tconst\taverageRating\tnumVotes\ntt1\t1.0\t1\ntt2\t2.0\t2\n";
        let ctx = ExtractContext {
            max_rows: Some(1),
            ..ExtractContext::default()
        };
        assert!(extract(tsv.as_bytes(), &ctx).is_err());
    }
}
