//! On-disk cache of word-membership tables
//!
//! Building the membership table over tens of thousands of essays is the most
//! expensive step of the essay analysis, so the result is stored as JSON in a
//! cache directory. Entries are named after their inputs:
//!
//! ```text
//! word-membership-v{FORMAT}-k{terms}-{hash}.json
//! ```
//!
//! - `FORMAT`: [`CACHE_FORMAT_VERSION`], bumped whenever the entry layout or
//!   the matching rules change
//! - `terms`: number of vocabulary terms
//! - `hash`: SHA-256 over every corpus text and every selected term
//!
//! Any change to the corpus or the vocabulary produces a different name, so a
//! stale entry is never read. An entry whose recorded key differs from the
//! requested one is treated as a miss.
//!
//! Entries are written to a temporary file in the cache directory and renamed
//! over the final name, so readers never observe a partial entry. An entry that
//! still fails to decode is rebuilt by [`MembershipCache::load_or_build`].

use std::{
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use tempfile::NamedTempFile;

use crate::{essays::Corpus, membership::WordMembershipTable, vocabulary::Vocabulary};

pub const CACHE_FORMAT_VERSION: u32 = 1;

const HASH_PREFIX_LEN: usize = 16;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum CacheError {
    #[display("failed to create cache directory {}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[display("failed to read cache entry {}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[display("failed to write cache entry {}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[display("malformed cache entry {}", path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[display("failed to encode cache entry")]
    Encode { source: serde_json::Error },
}

/// Name of a cache entry derived from its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("{_0}")]
pub struct CacheKey(String);

impl CacheKey {
    #[must_use]
    pub fn for_membership(corpus: &Corpus, vocabulary: &Vocabulary) -> Self {
        let mut hasher = Sha256::new();
        // Length prefixes keep ("ab", "c") and ("a", "bc") apart
        for text in corpus.texts() {
            hasher.update((text.len() as u64).to_le_bytes());
            hasher.update(text.as_bytes());
        }
        hasher.update(b"\0terms\0");
        for term in vocabulary.terms() {
            hasher.update((term.len() as u64).to_le_bytes());
            hasher.update(term.as_bytes());
        }
        let digest = format!("{:x}", hasher.finalize());
        Self(format!(
            "word-membership-v{CACHE_FORMAT_VERSION}-k{}-{}",
            vocabulary.len(),
            &digest[..HASH_PREFIX_LEN]
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.json", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    pub table: WordMembershipTable,
}

/// Whether a table came from the cache or was freshly built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    #[display("hit")]
    Hit,
    #[display("miss")]
    Miss,
}

/// Directory holding cache entries.
#[derive(Debug, Clone)]
pub struct MembershipCache {
    dir: PathBuf,
}

impl MembershipCache {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Reads the entry for `key`, `None` when absent or recorded under another key.
    pub fn load(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let path = self.entry_path(key);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CacheError::Read { path, source }),
        };
        let entry = serde_json::from_str::<CacheEntry>(&text)
            .map_err(|source| CacheError::Decode { path: path.clone(), source })?;
        if entry.key != *key || entry.format_version != CACHE_FORMAT_VERSION {
            tracing::warn!(path = %path.display(), "ignoring cache entry recorded under another key");
            return Ok(None);
        }
        Ok(Some(entry))
    }

    /// Writes `table` under `key` and returns the entry path.
    pub fn store(&self, key: &CacheKey, table: &WordMembershipTable) -> Result<PathBuf, CacheError> {
        fs::create_dir_all(&self.dir).map_err(|source| CacheError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;
        let entry = CacheEntry {
            key: key.clone(),
            format_version: CACHE_FORMAT_VERSION,
            created_at: Utc::now(),
            table: table.clone(),
        };
        let json = serde_json::to_string(&entry).map_err(|source| CacheError::Encode { source })?;
        let path = self.entry_path(key);
        let write_error = |source| CacheError::Write {
            path: path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_error)?;
        tmp.write_all(json.as_bytes()).map_err(write_error)?;
        tmp.as_file().sync_all().map_err(write_error)?;
        tmp.persist(&path).map_err(|e| write_error(e.error))?;
        Ok(path)
    }

    /// Returns the cached table for the inputs, building and storing it on a miss.
    pub fn load_or_build(
        &self,
        corpus: &Corpus,
        vocabulary: &Vocabulary,
    ) -> Result<(WordMembershipTable, CacheStatus), CacheError> {
        let key = CacheKey::for_membership(corpus, vocabulary);
        match self.load(&key) {
            Ok(Some(entry)) => {
                tracing::info!(key = %key, created_at = %entry.created_at, "using cached word-membership table");
                return Ok((entry.table, CacheStatus::Hit));
            }
            Ok(None) => {}
            Err(CacheError::Decode { path, source }) => {
                tracing::warn!(path = %path.display(), error = %source, "rebuilding malformed cache entry");
            }
            Err(e) => return Err(e),
        }
        let table = WordMembershipTable::build(corpus, vocabulary);
        let path = self.store(&key, &table)?;
        tracing::info!(path = %path.display(), "stored word-membership table");
        Ok((table, CacheStatus::Miss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[&str]) -> Corpus {
        Corpus::from_texts(texts.iter().map(|t| (*t).to_owned()).collect())
    }

    #[test]
    fn test_key_format() {
        let key = CacheKey::for_membership(&corpus(&[" music"]), &Vocabulary::from_terms(["music"]));
        let name = key.as_str();
        assert!(name.starts_with("word-membership-v1-k1-"), "{name}");
        assert_eq!(name.len(), "word-membership-v1-k1-".len() + HASH_PREFIX_LEN);
        assert_eq!(key.file_name(), format!("{name}.json"));
    }

    #[test]
    fn test_key_changes_with_inputs() {
        let vocabulary = Vocabulary::from_terms(["music"]);
        let base = CacheKey::for_membership(&corpus(&[" ab", " c"]), &vocabulary);
        assert_eq!(base, CacheKey::for_membership(&corpus(&[" ab", " c"]), &vocabulary));
        assert_ne!(base, CacheKey::for_membership(&corpus(&[" a", "b c"]), &vocabulary));
        assert_ne!(base, CacheKey::for_membership(&corpus(&[" ab", " c", ""]), &vocabulary));
        assert_ne!(
            base,
            CacheKey::for_membership(&corpus(&[" ab", " c"]), &Vocabulary::from_terms(["movies"]))
        );
    }

    #[test]
    fn test_load_or_build_hits_after_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MembershipCache::new(dir.path().join("cache"));
        let corpus = corpus(&[" music and movies", " books"]);
        let vocabulary = Vocabulary::from_terms(["music", "books"]);

        let (built, status) = cache.load_or_build(&corpus, &vocabulary).unwrap();
        assert_eq!(status, CacheStatus::Miss);
        let (cached, status) = cache.load_or_build(&corpus, &vocabulary).unwrap();
        assert_eq!(status, CacheStatus::Hit);
        assert_eq!(built, cached);
    }

    #[test]
    fn test_entry_under_wrong_key_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MembershipCache::new(dir.path());
        let vocabulary = Vocabulary::from_terms(["music"]);
        let key_a = CacheKey::for_membership(&corpus(&[" music"]), &vocabulary);
        let key_b = CacheKey::for_membership(&corpus(&[" books"]), &vocabulary);

        let table = WordMembershipTable::build(&corpus(&[" music"]), &vocabulary);
        let path_a = cache.store(&key_a, &table).unwrap();
        fs::copy(&path_a, cache.entry_path(&key_b)).unwrap();

        assert!(cache.load(&key_a).unwrap().is_some());
        assert!(cache.load(&key_b).unwrap().is_none());
    }

    #[test]
    fn test_malformed_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MembershipCache::new(dir.path());
        let key = CacheKey::for_membership(&corpus(&[]), &Vocabulary::from_terms(["x"]));
        fs::write(cache.entry_path(&key), "not json").unwrap();
        assert!(matches!(cache.load(&key), Err(CacheError::Decode { .. })));
    }

    #[test]
    fn test_truncated_entry_is_rebuilt() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MembershipCache::new(dir.path());
        let corpus = corpus(&[" music and movies", " books"]);
        let vocabulary = Vocabulary::from_terms(["music", "books"]);

        let (built, _) = cache.load_or_build(&corpus, &vocabulary).unwrap();
        let path = cache.entry_path(&CacheKey::for_membership(&corpus, &vocabulary));
        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

        let (rebuilt, status) = cache.load_or_build(&corpus, &vocabulary).unwrap();
        assert_eq!(status, CacheStatus::Miss);
        assert_eq!(rebuilt, built);
        let (_, status) = cache.load_or_build(&corpus, &vocabulary).unwrap();
        assert_eq!(status, CacheStatus::Hit);
    }

    #[test]
    fn test_store_leaves_only_the_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MembershipCache::new(dir.path());
        let vocabulary = Vocabulary::from_terms(["music"]);
        let key = CacheKey::for_membership(&corpus(&[" music"]), &vocabulary);
        let table = WordMembershipTable::build(&corpus(&[" music"]), &vocabulary);
        cache.store(&key, &table).unwrap();
        cache.store(&key, &table).unwrap();

        let names = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(names, [key.file_name()]);
    }
}
