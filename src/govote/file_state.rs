// A world state kept in a single JSON file.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;

use ballot_ledger::{KeyValue, StoreError};

use crate::govote::*;

/// The on-disk layout: every record keyed by its ID, the value being the
/// stored record text.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerFile {
    records: BTreeMap<String, String>,
}

/// A world state loaded from a file, changed in memory, and written back in one
/// piece by [`FileWorldState::save_if_changed`].
///
/// The digest of the file as it was read is kept: saving fails if another
/// invocation replaced the file in between, instead of overwriting its writes.
pub struct FileWorldState {
    path: PathBuf,
    inner: MemoryWorldState,
    changed: bool,
    // None when the file did not exist.
    revision: Option<String>,
}

fn revision_of(path: &Path) -> GoVoteResult<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).context(OpeningFileSnafu {
        path: path.display().to_string(),
    })?;
    Ok(Some(sha256::digest(contents.as_str())))
}

impl FileWorldState {
    /// Opens the ledger at `path`. A missing file is an empty ledger.
    pub fn open(path: &Path) -> GoVoteResult<FileWorldState> {
        let display = path.display().to_string();
        let (inner, revision) = if path.exists() {
            let contents = fs::read_to_string(path).context(OpeningFileSnafu {
                path: display.clone(),
            })?;
            let file: LedgerFile = serde_json::from_str(contents.as_str())
                .context(ParsingJsonSnafu { path: display })?;
            let records: BTreeMap<String, Vec<u8>> = file
                .records
                .into_iter()
                .map(|(k, v)| (k, v.into_bytes()))
                .collect();
            (
                MemoryWorldState::from_records(records),
                Some(sha256::digest(contents.as_str())),
            )
        } else {
            info!("Ledger file {:?} does not exist yet, starting empty", display);
            (MemoryWorldState::new(), None)
        };
        debug!("Opened ledger {:?} with {} record(s)", path, inner.len());
        Ok(FileWorldState {
            path: path.to_path_buf(),
            inner,
            changed: false,
            revision,
        })
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Writes the ledger back if anything was put or deleted since it was opened.
    ///
    /// The new content goes to a temporary file created exclusively, which is
    /// then renamed over the ledger. While the temporary file exists no other
    /// invocation can save. The ledger must still be the one that was opened,
    /// otherwise nothing is written and [`GoVoteError::LedgerChanged`] is returned.
    pub fn save_if_changed(&mut self) -> GoVoteResult<bool> {
        if !self.changed {
            debug!("Ledger {:?} unchanged, not writing", self.path);
            return Ok(false);
        }
        let mut records: BTreeMap<String, String> = BTreeMap::new();
        for (k, v) in self.inner.records().iter() {
            let text = match String::from_utf8(v.clone()) {
                Ok(t) => t,
                Err(_) => whatever!("Record {} is not valid UTF-8 and cannot be saved", k),
            };
            records.insert(k.clone(), text);
        }
        let data = serde_json::to_string_pretty(&LedgerFile { records })
            .context(SerializingJsonSnafu)?;

        let tmp_path = self.path.with_extension("json.tmp");
        let tmp = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
            .context(ReservingLedgerSnafu {
                path: tmp_path.display().to_string(),
            })?;
        let res = self.replace_with(tmp, &tmp_path, data.as_str());
        if res.is_err() {
            if let Err(e) = fs::remove_file(&tmp_path) {
                warn!("Could not remove {}: {}", tmp_path.display(), e);
            }
        }
        res?;

        self.revision = Some(sha256::digest(data.as_str()));
        self.changed = false;
        info!("Wrote {} record(s) to {}", self.inner.len(), self.path.display());
        Ok(true)
    }

    fn replace_with(&self, mut tmp: fs::File, tmp_path: &Path, data: &str) -> GoVoteResult<()> {
        let display = self.path.display().to_string();
        let current = revision_of(&self.path)?;
        ensure!(
            current == self.revision,
            LedgerChangedSnafu {
                path: display.clone()
            }
        );
        tmp.write_all(data.as_bytes()).context(WritingFileSnafu {
            path: tmp_path.display().to_string(),
        })?;
        drop(tmp);
        fs::rename(tmp_path, &self.path).context(WritingFileSnafu { path: display })?;
        Ok(())
    }
}

impl WorldState for FileWorldState {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.get_state(key)
    }

    fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.changed = true;
        self.inner.put_state(key, value)
    }

    fn del_state(&mut self, key: &str) -> Result<(), StoreError> {
        self.changed = true;
        self.inner.del_state(key)
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> Result<Vec<KeyValue>, StoreError> {
        self.inner.get_state_by_range(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_ledger::contract;

    #[test]
    fn missing_file_is_an_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let mut ledger = FileWorldState::open(&path).unwrap();
        assert!(contract::get_all_assets(&mut ledger).unwrap().is_empty());
        assert!(!ledger.save_if_changed().unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn records_survive_a_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        {
            let mut ledger = FileWorldState::open(&path).unwrap();
            contract::init_ledger(&mut ledger).unwrap();
            assert!(ledger.is_changed());
            assert!(ledger.save_if_changed().unwrap());
        }
        let mut ledger = FileWorldState::open(&path).unwrap();
        assert_eq!(
            contract::get_voter(&mut ledger, "voter1").unwrap().name,
            "Alan Turing"
        );
        assert!(!ledger.is_changed());
    }

    #[test]
    fn rejected_operation_leaves_ledger_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let mut ledger = FileWorldState::open(&path).unwrap();
        assert!(contract::cast_vote(&mut ledger, "nobody", "E1", &[]).is_err());
        assert!(!ledger.is_changed());
    }

    #[test]
    fn concurrent_save_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        {
            let mut ledger = FileWorldState::open(&path).unwrap();
            contract::init_ledger(&mut ledger).unwrap();
            ledger.save_if_changed().unwrap();
        }
        let items = vec!["item1".to_string(), "item2".to_string()];
        let mut a = FileWorldState::open(&path).unwrap();
        let mut b = FileWorldState::open(&path).unwrap();
        contract::cast_vote(&mut a, "voter1", "election1", &items).unwrap();
        contract::cast_vote(&mut b, "voter2", "election1", &items).unwrap();
        assert!(a.save_if_changed().unwrap());
        assert!(matches!(
            b.save_if_changed(),
            Err(GoVoteError::LedgerChanged { .. })
        ));
        assert!(!dir.path().join("ledger.json.tmp").exists());

        let mut ledger = FileWorldState::open(&path).unwrap();
        let results = contract::get_results(&mut ledger, "election1").unwrap();
        assert_eq!(results.ballots_counted, 1);
        assert!(contract::asset_exists(&mut ledger, "voter1-election1").unwrap());

        // Reopening and replaying the rejected vote succeeds.
        contract::cast_vote(&mut ledger, "voter2", "election1", &items).unwrap();
        assert!(ledger.save_if_changed().unwrap());
        let results = contract::get_results(&mut ledger, "election1").unwrap();
        assert_eq!(results.ballots_counted, 2);
    }

    #[test]
    fn first_writes_race_on_a_new_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let mut a = FileWorldState::open(&path).unwrap();
        let mut b = FileWorldState::open(&path).unwrap();
        contract::new_voter(&mut a, "v1", "Anna").unwrap();
        contract::new_voter(&mut b, "v2", "Bob").unwrap();
        assert!(a.save_if_changed().unwrap());
        assert!(matches!(
            b.save_if_changed(),
            Err(GoVoteError::LedgerChanged { .. })
        ));
    }

    #[test]
    fn saving_twice_from_one_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let mut ledger = FileWorldState::open(&path).unwrap();
        contract::new_voter(&mut ledger, "v1", "Anna").unwrap();
        assert!(ledger.save_if_changed().unwrap());
        contract::new_voter(&mut ledger, "v2", "Bob").unwrap();
        assert!(ledger.save_if_changed().unwrap());
        let mut reopened = FileWorldState::open(&path).unwrap();
        assert_eq!(contract::get_all_assets(&mut reopened).unwrap().len(), 2);
    }

    #[test]
    fn pending_temporary_file_blocks_saving() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let mut ledger = FileWorldState::open(&path).unwrap();
        contract::new_voter(&mut ledger, "v1", "Anna").unwrap();
        fs::write(dir.path().join("ledger.json.tmp"), "in progress").unwrap();
        assert!(matches!(
            ledger.save_if_changed(),
            Err(GoVoteError::ReservingLedger { .. })
        ));
        assert!(!path.exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("ledger.json.tmp")).unwrap(),
            "in progress"
        );
    }

    #[test]
    fn corrupted_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            FileWorldState::open(&path),
            Err(GoVoteError::ParsingJson { .. })
        ));
    }
}
