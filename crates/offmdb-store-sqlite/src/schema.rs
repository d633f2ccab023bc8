//! SQL for the title store.
//!
//! The production table has no fixed DDL: it is always a promoted staging
//! table whose columns were added from the dataset projections.

/// Writer connection setup; executed once per open.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA busy_timeout = 5000;
PRAGMA user_version = 1;
";

/// Reader connection setup. Opened after the writer has switched to WAL.
pub const READER_PRAGMAS: &str = "
PRAGMA busy_timeout = 5000;
PRAGMA query_only = 1;
";

/// Served to searches.
pub const PRODUCTION: &str = "titles";

/// Built by a refresh; invisible to searches until promoted.
pub const STAGING: &str = "titles_staging";

/// Fresh staging table holding only the key. Drops any leftover from an
/// aborted run.
pub const RESET_STAGING: &str = "
DROP TABLE IF EXISTS titles_staging;
CREATE TABLE titles_staging (
    tconst TEXT PRIMARY KEY NOT NULL
);
";

pub const DROP_STAGING: &str = "DROP TABLE IF EXISTS titles_staging;";

/// Replace production with staging. Run inside one transaction.
pub const PROMOTE_STAGING: &str = "
DROP TABLE IF EXISTS titles;
ALTER TABLE titles_staging RENAME TO titles;
CREATE INDEX titles_votes_idx ON titles(numVotes DESC);
";

/// Ratings rows no admitted basics row joined.
pub const PRUNE_UNMATCHED: &str =
  "DELETE FROM titles_staging WHERE primaryTitle IS NULL";

pub const TABLE_EXISTS: &str =
  "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1";

pub const COUNT_TITLES: &str = "SELECT COUNT(*) FROM titles";

const SELECT_TITLES: &str = "
SELECT tconst, titleType, primaryTitle, originalTitle,
       startYear, runtimeMinutes, genres, averageRating, numVotes
FROM titles";

/// `?1` is a `LIKE` pattern escaped with `\`, `?2` the limit.
pub fn search_like() -> String {
  format!(
    "{SELECT_TITLES}
     WHERE primaryTitle LIKE ?1 ESCAPE '\\' OR originalTitle LIKE ?1 ESCAPE '\\'
     ORDER BY numVotes DESC, tconst
     LIMIT ?2"
  )
}

/// `?1` is the raw fragment, matched byte-for-byte; `?2` the limit.
pub fn search_exact() -> String {
  format!(
    "{SELECT_TITLES}
     WHERE instr(primaryTitle, ?1) > 0 OR instr(originalTitle, ?1) > 0
     ORDER BY numVotes DESC, tconst
     LIMIT ?2"
  )
}
