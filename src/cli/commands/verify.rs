use std::fmt::Write as _;

use crate::config::Config;
use crate::pipeline::verifier::{self, VerificationReport};

pub async fn cmd_verify(config: &Config, json: bool) -> anyhow::Result<()> {
    let path = config.build.database_path();
    if !path.exists() {
        anyhow::bail!("No catalog at {}", path.display());
    }

    let report = verifier::verify(&path, &config.verify).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render(&report));
    }

    let problems = report.problems();
    if !problems.is_empty() {
        anyhow::bail!("Catalog failed verification: {}", problems.join("; "));
    }

    Ok(())
}

pub(super) fn render(report: &VerificationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Rows: {} movies, {} actors, {} links",
        report.counts.movies, report.counts.actors, report.counts.links
    );

    let _ = writeln!(out, "Titles matching '{}':", report.title_query);
    if report.title_matches.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for hit in &report.title_matches {
        let year = hit.year.map_or_else(|| "?".to_string(), |y| y.to_string());
        let votes = hit.votes.unwrap_or(0);
        let _ = writeln!(out, "  • {} ({year}) - {votes} votes", hit.title);
    }

    let _ = writeln!(out, "Names matching '{}':", report.name_query);
    if report.name_matches.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for name in &report.name_matches {
        let _ = writeln!(out, "  • {name}");
    }

    let _ = writeln!(
        out,
        "Cast of {} ({}): {}",
        report.sample_title,
        report.sample_year,
        if report.sample_cast.is_empty() {
            "(none)".to_string()
        } else {
            report.sample_cast.join(", ")
        }
    );

    for problem in report.problems() {
        let _ = writeln!(out, "⚠ {problem}");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CatalogCounts, TitleMatch};

    fn report() -> VerificationReport {
        VerificationReport {
            counts: CatalogCounts {
                movies: 2,
                actors: 1,
                links: 1,
            },
            dangling_links: 0,
            orphan_actors: 0,
            title_query: "Matrix".to_string(),
            title_matches: vec![TitleMatch {
                tconst: "tt0133093".to_string(),
                title: "The Matrix".to_string(),
                year: Some(1999),
                votes: Some(2_000_000),
            }],
            name_query: "Keanu".to_string(),
            name_matches: vec![],
            sample_title: "The Matrix".to_string(),
            sample_year: 1999,
            sample_cast: vec!["Keanu Reeves".to_string()],
        }
    }

    #[test]
    fn test_render_lists_samples() {
        let out = render(&report());
        assert!(out.contains("Rows: 2 movies, 1 actors, 1 links"));
        assert!(out.contains("• The Matrix (1999) - 2000000 votes"));
        assert!(out.contains("Names matching 'Keanu':\n  (none)"));
        assert!(out.contains("Cast of The Matrix (1999): Keanu Reeves"));
        assert!(!out.contains('⚠'));
    }

    #[test]
    fn test_render_flags_integrity_problems() {
        let mut report = report();
        report.orphan_actors = 3;
        let out = render(&report);
        assert!(out.contains("⚠ 3 actors have no links"));
    }
}
