use crate::store::keys;
use crate::store::operations::attempts::AttemptRecord;
use crate::store::{Store, StoreError};

const VERSION_KEY: &str = "_meta:version";

type MigrationFn = fn(&Store) -> Result<(), StoreError>;

struct Migration {
    version: u32,
    name: &'static str,
    apply: MigrationFn,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "001_initial",
        apply: m001_initial,
    },
    Migration {
        version: 2,
        name: "002_attempt_time_index",
        apply: m002_attempt_time_index,
    },
];

/// 执行所有未应用的数据库迁移。
///
/// 每个迁移函数必须幂等：进程可能在 apply 成功之后、版本号落盘之前
/// 崩溃，重启后同一迁移会再跑一遍。版本号在每个迁移成功后立即持久化，
/// set_version 拒绝降级。
pub fn run(store: &Store) -> Result<(), StoreError> {
    let current = get_current_version(store)?;

    for migration in MIGRATIONS {
        if migration.version <= current {
            tracing::debug!(
                version = migration.version,
                name = migration.name,
                "Migration already applied, skipping"
            );
            continue;
        }

        tracing::info!(
            version = migration.version,
            name = migration.name,
            "Running migration"
        );
        (migration.apply)(store)?;
        set_version(store, migration.version)?;
        tracing::info!(
            version = migration.version,
            name = migration.name,
            "Migration complete"
        );
    }

    Ok(())
}

pub fn get_current_version(store: &Store) -> Result<u32, StoreError> {
    let Some(raw) = store.config_versions.get(VERSION_KEY.as_bytes())? else {
        return Ok(0);
    };
    Ok(decode_version(&raw))
}

fn decode_version(raw: &[u8]) -> u32 {
    if let Ok(bytes) = <[u8; 4]>::try_from(raw) {
        return u32::from_be_bytes(bytes);
    }
    // Legacy string format fallback
    std::str::from_utf8(raw)
        .ok()
        .and_then(|text| text.parse().ok())
        .unwrap_or(0)
}

pub fn set_version(store: &Store, version: u32) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if version < current {
        return Err(StoreError::Migration {
            version,
            message: format!("Refuse to downgrade from {} to {}", current, version),
        });
    }

    store
        .config_versions
        .insert(VERSION_KEY.as_bytes(), &version.to_be_bytes())?;
    Ok(())
}

// 基线版本。所有树在 Store::open 时已创建，这里只占住版本号 1。
fn m001_initial(_store: &Store) -> Result<(), StoreError> {
    Ok(())
}

/// 从主表重建 attempts_by_time 索引（可重复执行）。
fn m002_attempt_time_index(store: &Store) -> Result<(), StoreError> {
    for item in store.attempts.iter() {
        let (_, value) = item?;
        let record: AttemptRecord = Store::deserialize(&value)?;
        let time_key = keys::attempt_time_key(record.created_at.timestamp_millis(), &record.id);
        store
            .attempts_by_time
            .insert(time_key.as_bytes(), record.kid_name.as_bytes())?;
    }

    Ok(())
}
