use crate::engine::leveling;
use crate::engine::types::ProgressState;
use crate::store::keys;
use crate::store::{Store, StoreError};

impl Store {
    /// Load a kid's progress. The cached level is recomputed from XP on
    /// the way out so a profile written under older level tables is
    /// silently corrected.
    pub fn get_progress(&self, kid_name: &str) -> Result<Option<ProgressState>, StoreError> {
        let key = keys::profile_key(kid_name)?;
        match self.profiles.get(key.as_bytes())? {
            Some(bytes) => {
                let mut state = Self::deserialize::<ProgressState>(&bytes)?;
                state.level = leveling::level_for_xp(state.total_xp);
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    pub fn get_progress_required(&self, kid_name: &str) -> Result<ProgressState, StoreError> {
        self.get_progress(kid_name)?.ok_or_else(|| StoreError::NotFound {
            entity: "progress".to_string(),
            key: kid_name.to_string(),
        })
    }

    pub fn put_progress(&self, state: &ProgressState) -> Result<(), StoreError> {
        let key = keys::profile_key(&state.kid_name)?;
        let bytes = Self::serialize(state)?;
        self.profiles.insert(key.as_bytes(), bytes)?;
        Ok(())
    }

    pub fn all_kid_names(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for item in self.profiles.iter() {
            let (key, _) = item?;
            names.push(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn open_store(dir: &tempfile::TempDir) -> Store {
        let path = dir.path().join("profiles-db");
        Store::open(path.to_str().unwrap()).unwrap()
    }

    #[test]
    fn missing_profile_is_none() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        assert!(store.get_progress("nobody").unwrap().is_none());
        assert!(matches!(
            store.get_progress_required("nobody"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn put_then_get_round_trips() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        let mut state = ProgressState::named("mia");
        state.total_xp = 65;
        state.current_streak = 2;
        store.put_progress(&state).unwrap();

        let loaded = store.get_progress("mia").unwrap().unwrap();
        assert_eq!(loaded.kid_name, "mia");
        assert_eq!(loaded.total_xp, 65);
        assert_eq!(loaded.current_streak, 2);
    }

    #[test]
    fn stale_level_cache_is_corrected_on_load() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        let mut state = ProgressState::named("mia");
        state.total_xp = 200;
        state.level = 1;
        store.put_progress(&state).unwrap();

        let loaded = store.get_progress("mia").unwrap().unwrap();
        assert_eq!(loaded.level, 3);
    }

    #[test]
    fn kid_names_enumerate_profiles() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        store.put_progress(&ProgressState::named("leo")).unwrap();
        store.put_progress(&ProgressState::named("mia")).unwrap();

        let names = store.all_kid_names().unwrap();
        assert_eq!(names, vec!["leo".to_string(), "mia".to_string()]);
    }
}
