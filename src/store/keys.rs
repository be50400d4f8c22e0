use crate::store::StoreError;

/// Composite keys join segments with ':'. A kid name carrying the
/// separator would corrupt prefix scans, so every key builder checks
/// its segments first.
fn check_segment(entity: &str, value: &str) -> Result<(), StoreError> {
    if value.is_empty() {
        return Err(StoreError::Validation(format!("{entity} must not be empty")));
    }
    if value.contains(':') {
        return Err(StoreError::Validation(format!(
            "{entity} must not contain ':'"
        )));
    }
    Ok(())
}

pub fn profile_key(kid_name: &str) -> Result<String, StoreError> {
    check_segment("kid name", kid_name)?;
    Ok(kid_name.to_string())
}

pub fn attempt_key(kid_name: &str, timestamp_ms: i64, attempt_id: &str) -> Result<String, StoreError> {
    check_segment("kid name", kid_name)?;
    let ts = timestamp_ms.max(0) as u64;
    let reverse_ts = u64::MAX - ts;
    Ok(format!("{}:{:020}:{}", kid_name, reverse_ts, attempt_id))
}

pub fn attempt_prefix(kid_name: &str) -> Result<String, StoreError> {
    check_segment("kid name", kid_name)?;
    Ok(format!("{}:", kid_name))
}

pub fn attempt_time_key(timestamp_ms: i64, attempt_id: &str) -> String {
    let ts = timestamp_ms.max(0) as u64;
    format!("{:020}:{}", ts, attempt_id)
}

pub fn attempt_time_since_key(timestamp_ms: i64) -> String {
    let ts = timestamp_ms.max(0) as u64;
    format!("{:020}:", ts)
}

pub fn event_key(kid_name: &str, timestamp_ms: i64, event_id: &str) -> Result<String, StoreError> {
    check_segment("kid name", kid_name)?;
    let ts = timestamp_ms.max(0) as u64;
    let reverse_ts = u64::MAX - ts;
    Ok(format!("{}:{:020}:{}", kid_name, reverse_ts, event_id))
}

pub fn event_prefix(kid_name: &str) -> Result<String, StoreError> {
    check_segment("kid name", kid_name)?;
    Ok(format!("{}:", kid_name))
}

/// `day` is a calendar date formatted `YYYY-MM-DD`.
pub fn daily_activity_key(kid_name: &str, day: &str) -> Result<String, StoreError> {
    check_segment("kid name", kid_name)?;
    check_segment("day", day)?;
    Ok(format!("{}:{}", kid_name, day))
}
