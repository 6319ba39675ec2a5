/// Literal IMDb uses for an absent field value.
pub const NULL_SENTINEL: &str = "\\N";

/// `titleType` value of the only title kind the build keeps.
pub const MOVIE_TITLE_TYPE: &str = "movie";

/// Profession tokens and principal categories treated as acting credits.
pub const ACTING_ROLES: &[&str] = &["actor", "actress"];

pub const DEFAULT_DATABASE_NAME: &str = "moviechain_core.sqlite";

pub mod inputs {

    pub const RATINGS: &str = "title.ratings.tsv";

    pub const TITLES: &str = "title.basics.tsv";

    pub const NAMES: &str = "name.basics.tsv";

    pub const PRINCIPALS: &str = "title.principals.tsv";

    /// Every file the build refuses to start without.
    pub const REQUIRED: &[&str] = &[TITLES, PRINCIPALS, RATINGS, NAMES];
}

pub mod limits {

    /// Rows per multi-row INSERT; six bound columns keeps this well under
    /// SQLite's parameter limit.
    pub const DEFAULT_INSERT_CHUNK_SIZE: usize = 1000;

    pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1_000_000;

    pub const SAMPLE_SEARCH_LIMIT: u64 = 5;

    pub const SAMPLE_CAST_LIMIT: u64 = 10;
}

/// Returns true if `token` names an acting role.
#[must_use]
pub fn is_acting_role(token: &str) -> bool {
    ACTING_ROLES.contains(&token)
}
