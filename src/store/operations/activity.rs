use chrono::NaiveDate;

use crate::store::keys;
use crate::store::{Store, StoreError};

impl Store {
    /// Recompute-then-set. The rollup worker overwrites the whole
    /// trailing window on every run, so a missed run heals itself.
    pub fn set_daily_activity(
        &self,
        kid_name: &str,
        day: NaiveDate,
        count: u64,
    ) -> Result<(), StoreError> {
        let key = keys::daily_activity_key(kid_name, &day.format("%Y-%m-%d").to_string())?;
        self.daily_activity
            .insert(key.as_bytes(), &count.to_be_bytes())?;
        Ok(())
    }

    pub fn get_daily_activity(&self, kid_name: &str, day: NaiveDate) -> Result<u64, StoreError> {
        let key = keys::daily_activity_key(kid_name, &day.format("%Y-%m-%d").to_string())?;
        match self.daily_activity.get(key.as_bytes())? {
            Some(bytes) if bytes.len() == 8 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(&bytes);
                Ok(u64::from_be_bytes(buf))
            }
            _ => Ok(0),
        }
    }
}
