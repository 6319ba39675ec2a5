use serde::Deserialize;
use std::io::Read;

use super::{ExtractContext, Extracted, TsvRows, split_list};
use crate::constants::is_acting_role;
use crate::domain::events::Stage;
use crate::domain::{PersonId, PersonRecord, PersonTable, TitleId};
use crate::error::Result;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NameRow<'a> {
    nconst: &'a str,
    primary_name: &'a str,
    #[serde(default)]
    primary_profession: &'a str,
    #[serde(default)]
    known_for_titles: &'a str,
}

/// Matches whole profession tokens, so `voice_actor` or `actor_director`
/// do not count as acting.
fn has_acting_profession(professions: &str) -> bool {
    split_list(professions).any(is_acting_role)
}

/// Reads `name.basics.tsv`, keeping people with an acting profession.
pub fn extract<R: Read>(reader: R, ctx: &ExtractContext) -> Result<Extracted<PersonTable>> {
    let mut rows = TsvRows::new(reader, Stage::People, &["nconst", "primaryName"], ctx)?;
    let mut table = PersonTable::new();

    while rows.advance()? {
        let Some(row) = rows.parse::<NameRow<'_>>() else {
            continue;
        };
        if !has_acting_profession(row.primary_profession) {
            continue;
        }
        let record = PersonRecord {
            id: PersonId::from(row.nconst),
            name: row.primary_name.to_string(),
            known_for: split_list(row.known_for_titles).map(TitleId::from).collect(),
        };
        table.insert(record.id.clone(), record);
        rows.check_limit(table.len())?;
    }

    let stats = rows.finish(table.len());
    Ok(Extracted { table, stats })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "nconst\tprimaryName\tbirthYear\tdeathYear\tprimaryProfession\tknownForTitles\n";

    fn run(body: &str) -> Extracted<PersonTable> {
        let tsv = format!("{HEADER}{body}");
        extract(tsv.as_bytes(), &ExtractContext::default()).unwrap()
    }

    #[test]
    fn keeps_actors_and_actresses() {
        let out = run(
            "nm0000206\tKeanu Reeves\t1964\t\\N\tactor,producer,soundtrack\ttt0133093,tt0234215\n\
             nm0005251\tCarrie-Anne Moss\t1967\t\\N\tactress,producer\ttt0133093\n\
             nm0905154\tLana Wachowski\t1965\t\\N\twriter,director,producer\ttt0133093\n",
        );

        assert_eq!(out.table.len(), 2);
        let keanu = &out.table["nm0000206"];
        assert_eq!(keanu.name, "Keanu Reeves");
        assert_eq!(
            keanu.known_for,
            vec![TitleId::new("tt0133093"), TitleId::new("tt0234215")]
        );
        assert!(!out.table.contains_key("nm0905154"));
    }

    #[test]
    fn compound_profession_tokens_do_not_match() {
        let out = run(
            "nm1\tVoice Only\t\\N\t\\N\tvoice_actor\t\\N\n\
             nm2\tHyphenated\t\\N\t\\N\tactor_director\t\\N\n\
             nm3\tNo Profession\t\\N\t\\N\t\\N\t\\N\n",
        );
        assert!(out.table.is_empty());
    }

    #[test]
    fn known_for_sentinel_is_empty() {
        let out = run("nm4\tNew Face\t\\N\t\\N\tactress\t\\N\n");
        assert!(out.table["nm4"].known_for.is_empty());
    }

    #[test]
    fn profession_match_is_whitespace_tolerant() {
        assert!(has_acting_profession("director, actor"));
        assert!(!has_acting_profession("factory_worker"));
    }
}
