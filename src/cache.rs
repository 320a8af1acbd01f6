use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::loader::LoadOptions;
use crate::types::Dataset;

const CACHE_TTL_SECS: u64 = 3600; // 1 hour
const MAX_ENTRIES: usize = 8;

/// Parsed exports, one JSON file per digest of the export bytes.
pub struct Cache {
    dir: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct CachedDataset {
    #[serde(default)]
    timestamp: u64,
    dataset: Dataset,
}

impl Cache {
    /// Cache under `datasets/` next to the config file, if there is a config dir.
    pub fn open() -> Option<Self> {
        Config::config_path()
            .ok()
            .map(|p| Self::in_dir(p.with_file_name("datasets")))
    }

    pub fn in_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Digest of the export bytes together with the options that shaped the parse.
    pub fn key(bytes: &[u8], options: &LoadOptions) -> String {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        options.hash(&mut hasher);
        format!("{:016x}-{}", hasher.finish(), bytes.len())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Cached dataset for `key`. Missing, expired or unreadable entries are misses.
    pub fn get(&self, key: &str) -> Option<Dataset> {
        let path = self.entry_path(key);
        let contents = std::fs::read_to_string(&path).ok()?;

        let entry: CachedDataset = match serde_json::from_str(&contents) {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("discarding unreadable cache entry {}: {e}", path.display());
                let _ = std::fs::remove_file(&path);
                return None;
            }
        };

        if now_secs().saturating_sub(entry.timestamp) > CACHE_TTL_SECS {
            let _ = std::fs::remove_file(&path);
            return None;
        }

        Some(entry.dataset)
    }

    /// Store `dataset` under `key`, then drop the oldest entries beyond the limit.
    pub fn insert(&self, key: &str, dataset: &Dataset) {
        #[derive(Serialize)]
        struct Entry<'a> {
            timestamp: u64,
            dataset: &'a Dataset,
        }

        if std::fs::create_dir_all(&self.dir).is_err() {
            return;
        }

        let contents = match serde_json::to_string(&Entry {
            timestamp: now_secs(),
            dataset,
        }) {
            Ok(c) => c,
            Err(_) => return,
        };

        let path = self.entry_path(key);
        if let Err(e) = std::fs::write(&path, contents) {
            log::debug!("could not write cache {}: {e}", path.display());
            return;
        }

        self.prune(&path);
    }

    /// Keep at most `MAX_ENTRIES` files, never removing `keep`.
    fn prune(&self, keep: &Path) {
        let Ok(dir) = std::fs::read_dir(&self.dir) else {
            return;
        };

        let mut entries: Vec<(SystemTime, PathBuf)> = dir
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path != keep && path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| {
                let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok()?;
                Some((modified, path))
            })
            .collect();

        if entries.len() < MAX_ENTRIES {
            return;
        }

        entries.sort();
        let excess = entries.len() + 1 - MAX_ENTRIES;
        for (_, path) in entries.into_iter().take(excess) {
            let _ = std::fs::remove_file(path);
        }
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_key_changes_with_content() {
        let options = LoadOptions::default();
        let a = Cache::key(fixtures::BUGS_CSV.as_bytes(), &options);
        let b = Cache::key(fixtures::BUGS_CSV.as_bytes(), &options);
        let c = Cache::key(b"Issue key,Summary,Status\n", &options);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_key_changes_with_options() {
        let bytes = fixtures::BUGS_CSV.as_bytes();
        let day_first = Cache::key(bytes, &LoadOptions::default());
        let month_first = Cache::key(
            bytes,
            &LoadOptions {
                day_first: false,
                ..LoadOptions::default()
            },
        );
        assert_ne!(day_first, month_first);
    }

    fn scratch_cache(name: &str) -> Cache {
        let dir = std::env::temp_dir().join(format!("bugdash-cache-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        Cache::in_dir(dir)
    }

    #[test]
    fn test_insert_then_get() {
        let cache = scratch_cache("roundtrip");
        let key = Cache::key(fixtures::BUGS_CSV.as_bytes(), &LoadOptions::default());
        assert!(cache.get(&key).is_none());

        cache.insert(&key, &fixtures::bugs());
        assert_eq!(cache.get(&key), Some(fixtures::bugs()));
        let _ = std::fs::remove_dir_all(&cache.dir);
    }

    #[test]
    fn test_entries_live_in_separate_files() {
        let cache = scratch_cache("files");
        cache.insert("a", &fixtures::bugs());
        cache.insert("b", &fixtures::load("Issue key,Summary,Status\nX-1,other,Open\n"));

        assert!(cache.entry_path("a").exists());
        assert!(cache.entry_path("b").exists());
        assert_eq!(cache.get("b").map(|ds| ds.len()), Some(1));
        let _ = std::fs::remove_dir_all(&cache.dir);
    }

    #[test]
    fn test_expired_and_corrupt_entries_are_misses() {
        let cache = scratch_cache("stale");
        std::fs::create_dir_all(&cache.dir).unwrap();

        let stale = serde_json::json!({ "timestamp": 0, "dataset": fixtures::bugs() });
        std::fs::write(cache.entry_path("old"), stale.to_string()).unwrap();
        std::fs::write(cache.entry_path("bad"), "{not json").unwrap();

        assert!(cache.get("old").is_none());
        assert!(cache.get("bad").is_none());
        assert!(!cache.entry_path("old").exists());
        assert!(!cache.entry_path("bad").exists());
        let _ = std::fs::remove_dir_all(&cache.dir);
    }

    #[test]
    fn test_prune_bounds_entry_count() {
        let cache = scratch_cache("prune");
        let dataset = fixtures::load("Issue key,Summary,Status\nX-1,other,Open\n");
        for i in 0..MAX_ENTRIES + 3 {
            cache.insert(&format!("k{i}"), &dataset);
        }
        let count = std::fs::read_dir(&cache.dir).unwrap().count();
        assert_eq!(count, MAX_ENTRIES);
        assert!(cache.get(&format!("k{}", MAX_ENTRIES + 2)).is_some());
        let _ = std::fs::remove_dir_all(&cache.dir);
    }
}
