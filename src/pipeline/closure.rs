//! Referential closure between the extracted tables.
//!
//! After this stage every link points at a kept movie and a kept actor, and
//! every kept actor has at least one link. The database never has to check
//! this itself.

use std::collections::HashSet;

use crate::domain::{
    Adjacency, AppearanceLink, MovieRecord, MovieTable, PersonId, PersonRecord, PersonTable,
    RatingTable,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClosureStats {
    /// Distinct people credited in at least one kept movie.
    pub linked_people: usize,
    /// Credited people missing from the acting-profession table.
    pub unknown_people: usize,
    pub dropped_links: usize,
}

#[derive(Debug)]
pub struct Closure {
    /// Sorted by identifier.
    pub actors: Vec<PersonRecord>,
    /// Sorted by movie, then person.
    pub links: Vec<AppearanceLink>,
    pub stats: ClosureStats,
}

/// Keeps the people reachable from the adjacency and the links between them.
///
/// Adjacency keys are already restricted to kept movies by the relationship
/// extractor, so only the person side needs filtering here.
#[must_use]
pub fn apply_closure(mut people: PersonTable, adjacency: &Adjacency) -> Closure {
    let linked: HashSet<&PersonId> = adjacency.values().flatten().collect();

    let mut actors: Vec<PersonRecord> = linked.iter().filter_map(|id| people.remove(*id)).collect();
    actors.sort_unstable_by(|a, b| a.id.cmp(&b.id));

    let kept: HashSet<&PersonId> = actors.iter().map(|a| &a.id).collect();
    let mut links = Vec::new();
    let mut dropped_links = 0;
    for (movie, cast) in adjacency {
        for person in cast {
            if kept.contains(person) {
                links.push(AppearanceLink {
                    movie: movie.clone(),
                    person: person.clone(),
                });
            } else {
                dropped_links += 1;
            }
        }
    }
    links.sort_unstable();

    let stats = ClosureStats {
        linked_people: linked.len(),
        unknown_people: linked.len() - kept.len(),
        dropped_links,
    };

    Closure {
        actors,
        links,
        stats,
    }
}

/// Copies ratings onto the movies, sorted by identifier.
#[must_use]
pub fn join_ratings(movies: MovieTable, ratings: &RatingTable) -> Vec<MovieRecord> {
    let mut rows: Vec<MovieRecord> = movies
        .into_values()
        .map(|mut movie| {
            movie.apply_rating(ratings.get(&movie.id));
            movie
        })
        .collect();
    rows.sort_unstable_by(|a, b| a.id.cmp(&b.id));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Rating, TitleId};

    fn person(id: &str, name: &str) -> (PersonId, PersonRecord) {
        (
            PersonId::new(id),
            PersonRecord {
                id: PersonId::new(id),
                name: name.to_string(),
                known_for: vec![],
            },
        )
    }

    fn adjacency(edges: &[(&str, &str)]) -> Adjacency {
        let mut adjacency = Adjacency::new();
        for (movie, person) in edges {
            adjacency
                .entry(TitleId::new(*movie))
                .or_default()
                .insert(PersonId::new(*person));
        }
        adjacency
    }

    #[test]
    fn keeps_only_linked_acting_people() {
        let people: PersonTable = [
            person("nm1", "Linked Actor"),
            person("nm2", "Unlinked Actor"),
            person("nm3", "Other Linked"),
        ]
        .into_iter()
        .collect();
        // nm9 is credited but has no acting profession.
        let edges = adjacency(&[("tt1", "nm1"), ("tt1", "nm9"), ("tt2", "nm3"), ("tt2", "nm1")]);

        let closure = apply_closure(people, &edges);

        let ids: Vec<&str> = closure.actors.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["nm1", "nm3"]);
        assert_eq!(closure.links.len(), 3);
        assert!(closure.links.iter().all(|l| l.person.as_str() != "nm9"));
        assert_eq!(
            closure.stats,
            ClosureStats {
                linked_people: 3,
                unknown_people: 1,
                dropped_links: 1,
            }
        );
    }

    #[test]
    fn every_actor_has_a_link_and_every_link_an_actor() {
        let people: PersonTable = [person("nm1", "A"), person("nm2", "B")].into_iter().collect();
        let edges = adjacency(&[("tt1", "nm1"), ("tt2", "nm3")]);

        let closure = apply_closure(people, &edges);

        let actor_ids: HashSet<&PersonId> = closure.actors.iter().map(|a| &a.id).collect();
        let link_people: HashSet<&PersonId> = closure.links.iter().map(|l| &l.person).collect();
        assert_eq!(actor_ids, link_people);
    }

    #[test]
    fn links_are_sorted() {
        let people: PersonTable = [person("nm1", "A"), person("nm2", "B")].into_iter().collect();
        let edges = adjacency(&[("tt2", "nm1"), ("tt1", "nm2"), ("tt1", "nm1")]);

        let closure = apply_closure(people, &edges);

        let pairs: Vec<(&str, &str)> = closure
            .links
            .iter()
            .map(|l| (l.movie.as_str(), l.person.as_str()))
            .collect();
        assert_eq!(pairs, vec![("tt1", "nm1"), ("tt1", "nm2"), ("tt2", "nm1")]);
    }

    #[test]
    fn join_ratings_fills_known_and_leaves_unknown() {
        let mut movies = MovieTable::new();
        for id in ["tt2", "tt1"] {
            movies.insert(
                TitleId::new(id),
                MovieRecord {
                    id: TitleId::new(id),
                    title: id.to_string(),
                    year: None,
                    genres: String::new(),
                    rating: None,
                    votes: None,
                },
            );
        }
        let mut ratings = RatingTable::new();
        ratings.insert(
            TitleId::new("tt1"),
            Rating {
                average: 7.0,
                votes: 12,
            },
        );

        let rows = join_ratings(movies, &ratings);

        assert_eq!(rows[0].id.as_str(), "tt1");
        assert_eq!(rows[0].votes, Some(12));
        assert_eq!(rows[1].rating, None);
    }
}
