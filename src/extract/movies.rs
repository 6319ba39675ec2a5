use serde::Deserialize;
use std::io::Read;

use super::{ExtractContext, Extracted, TsvRows, non_null};
use crate::constants::MOVIE_TITLE_TYPE;
use crate::domain::events::Stage;
use crate::domain::{MovieRecord, MovieTable, TitleId};
use crate::error::Result;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TitleRow<'a> {
    tconst: &'a str,
    title_type: &'a str,
    primary_title: &'a str,
    #[serde(default)]
    is_adult: &'a str,
    #[serde(default)]
    start_year: &'a str,
    #[serde(default)]
    genres: &'a str,
}

impl TitleRow<'_> {
    fn is_kept(&self) -> bool {
        self.title_type == MOVIE_TITLE_TYPE && self.is_adult.trim() != "1"
    }

    fn into_record(self) -> MovieRecord {
        MovieRecord {
            id: TitleId::from(self.tconst),
            title: self.primary_title.to_string(),
            year: parse_year(self.start_year),
            genres: non_null(self.genres).unwrap_or_default().to_string(),
            rating: None,
            votes: None,
        }
    }
}

/// Sentinel, blank and unparseable years are all absent, never zero.
fn parse_year(value: &str) -> Option<i32> {
    non_null(value).and_then(|v| v.parse().ok())
}

/// Reads `title.basics.tsv`, keeping non-adult feature films.
///
/// Rating fields are left unset; they are joined in after extraction.
pub fn extract<R: Read>(reader: R, ctx: &ExtractContext) -> Result<Extracted<MovieTable>> {
    let mut rows = TsvRows::new(
        reader,
        Stage::Movies,
        &["tconst", "titleType", "primaryTitle"],
        ctx,
    )?;
    let mut table = MovieTable::new();

    while rows.advance()? {
        let Some(row) = rows.parse::<TitleRow<'_>>() else {
            continue;
        };
        if !row.is_kept() {
            continue;
        }
        let record = row.into_record();
        table.insert(record.id.clone(), record);
        rows.check_limit(table.len())?;
    }

    let stats = rows.finish(table.len());
    Ok(Extracted { table, stats })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "tconst\ttitleType\tprimaryTitle\toriginalTitle\tisAdult\tstartYear\tendYear\truntimeMinutes\tgenres\n";

    fn run(body: &str) -> Extracted<MovieTable> {
        let tsv = format!("{HEADER}{body}");
        extract(tsv.as_bytes(), &ExtractContext::default()).unwrap()
    }

    #[test]
    fn keeps_only_non_adult_movies() {
        let out = run(
            "tt0133093\tmovie\tThe Matrix\tThe Matrix\t0\t1999\t\\N\t136\tAction,Sci-Fi\n\
             tt0000002\tshort\tA Short\tA Short\t0\t1901\t\\N\t1\tShort\n\
             tt0000003\tmovie\tAdult Film\tAdult Film\t1\t2001\t\\N\t90\tDrama\n\
             tt0000004\ttvSeries\tA Show\tA Show\t0\t2005\t2009\t45\tDrama\n",
        );

        assert_eq!(out.table.len(), 1);
        let matrix = &out.table["tt0133093"];
        assert_eq!(matrix.title, "The Matrix");
        assert_eq!(matrix.year, Some(1999));
        assert_eq!(matrix.genres, "Action,Sci-Fi");
        assert_eq!(out.stats.filtered(), 3);
    }

    #[test]
    fn year_sentinel_and_garbage_become_absent() {
        let out = run(
            "tt1\tmovie\tNo Year\tNo Year\t0\t\\N\t\\N\t\\N\t\\N\n\
             tt2\tmovie\tBad Year\tBad Year\t0\t19x9\t\\N\t\\N\tDrama\n",
        );

        assert_eq!(out.table["tt1"].year, None);
        assert_eq!(out.table["tt1"].genres, "");
        assert_eq!(out.table["tt2"].year, None);
        assert_eq!(out.stats.skipped, 0);
    }

    #[test]
    fn titles_with_bare_quotes_survive() {
        let out = run("tt3\tmovie\t\"Weird\" Al\t\"Weird\" Al\t0\t2022\t\\N\t108\tComedy\n");
        assert_eq!(out.table["tt3"].title, "\"Weird\" Al");
    }

    #[test]
    fn repeated_identifier_last_write_wins() {
        let out = run(
            "tt4\tmovie\tFirst\tFirst\t0\t2000\t\\N\t90\tDrama\n\
             tt4\tmovie\tSecond\tSecond\t0\t2001\t\\N\t90\tDrama\n",
        );
        assert_eq!(out.table.len(), 1);
        assert_eq!(out.table["tt4"].title, "Second");
    }

    #[test]
    fn missing_optional_columns_default() {
        let tsv = "tconst\ttitleType\tprimaryTitle\ntt5\tmovie\tBare\n";
        let out = extract(tsv.as_bytes(), &ExtractContext::default()).unwrap();
        let bare = &out.table["tt5"];
        assert_eq!(bare.year, None);
        assert_eq!(bare.genres, "");
    }
}
