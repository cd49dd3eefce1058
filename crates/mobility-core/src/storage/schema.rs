//! Store schema.

use rusqlite::{Connection, OptionalExtension};

use crate::error::{MobilityError, Result};

/// Bumped whenever a table definition changes incompatibly.
pub(crate) const FORMAT_VERSION: &str = "1";

/// A table whose rows a restore replaces wholesale.
pub(crate) struct DataTable {
    pub name: &'static str,
    pub columns: &'static str,
}

/// Tables restored from a backup image, in insertion order.
///
/// `backups`, `restore_codes`, `reset_codes` and `logs` always come from the
/// live store. Reset codes of users missing from the image are dropped.
pub(crate) const DATA_TABLES: &[DataTable] = &[
    DataTable {
        name: "users",
        columns: "id, username, password_hash, role, first_name, last_name, registered_at, failed_logins",
    },
    DataTable {
        name: "travellers",
        columns: "id, first_name, last_name, birth_date, gender, street_name, house_number, \
                  zip_code, city, email, mobile_phone, license_number, registered_at",
    },
    DataTable {
        name: "scooters",
        columns: "id, brand, model, serial_number, top_speed, battery_capacity, state_of_charge, \
                  target_soc_min, target_soc_max, latitude, longitude, out_of_service, mileage, \
                  last_maintenance, in_service_at",
    },
];

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Identities. Username and names are age ciphertext; the password is an
-- Argon2id PHC string.
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username BLOB NOT NULL,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('operator', 'administrator', 'super_administrator')),
    first_name BLOB NOT NULL,
    last_name BLOB NOT NULL,
    registered_at TEXT NOT NULL,
    failed_logins INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS travellers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name BLOB NOT NULL,
    last_name BLOB NOT NULL,
    birth_date BLOB NOT NULL,
    gender BLOB NOT NULL,
    street_name BLOB NOT NULL,
    house_number BLOB NOT NULL,
    zip_code BLOB NOT NULL,
    city BLOB NOT NULL,
    email BLOB NOT NULL,
    mobile_phone BLOB NOT NULL,
    license_number BLOB NOT NULL,
    registered_at TEXT NOT NULL
);

-- Telemetry columns stay in clear for range queries.
CREATE TABLE IF NOT EXISTS scooters (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    brand BLOB NOT NULL,
    model BLOB NOT NULL,
    serial_number BLOB NOT NULL,
    top_speed INTEGER NOT NULL,
    battery_capacity INTEGER NOT NULL,
    state_of_charge INTEGER NOT NULL CHECK (state_of_charge BETWEEN 0 AND 100),
    target_soc_min INTEGER NOT NULL,
    target_soc_max INTEGER NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    out_of_service INTEGER NOT NULL DEFAULT 0,
    mileage REAL NOT NULL,
    last_maintenance TEXT,
    in_service_at TEXT NOT NULL,

    CHECK (target_soc_min < target_soc_max)
);

CREATE TABLE IF NOT EXISTS backups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_name TEXT NOT NULL UNIQUE,
    created_by INTEGER,
    created_at TEXT NOT NULL
);

-- One row per restore request. code_hash stays NULL until a code is issued.
CREATE TABLE IF NOT EXISTS restore_codes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    backup_id INTEGER NOT NULL,
    requester_id INTEGER NOT NULL,
    code_hash TEXT,
    state TEXT NOT NULL DEFAULT 'requested'
        CHECK (state IN ('requested', 'code_issued', 'used', 'cancelled')),
    requested_at TEXT NOT NULL,
    issued_at TEXT,
    used_at TEXT,

    CHECK (state <> 'code_issued' OR code_hash IS NOT NULL),
    FOREIGN KEY (backup_id) REFERENCES backups(id) ON DELETE CASCADE
);

-- At most one live request or code per (backup, requester) pair
CREATE UNIQUE INDEX IF NOT EXISTS restore_codes_live
ON restore_codes (backup_id, requester_id)
WHERE state IN ('requested', 'code_issued');

CREATE TABLE IF NOT EXISTS reset_codes (
    user_id INTEGER PRIMARY KEY,
    code_hash TEXT NOT NULL,
    created_at TEXT NOT NULL,
    used INTEGER NOT NULL DEFAULT 0,

    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

-- Append-only audit trail
CREATE TABLE IF NOT EXISTS logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    logged_at TEXT NOT NULL,
    username BLOB NOT NULL,
    description BLOB NOT NULL,
    additional_info BLOB NOT NULL,
    suspicious INTEGER NOT NULL DEFAULT 0,
    seen INTEGER NOT NULL DEFAULT 0
);
"#;

/// Create any missing tables and check the format version.
pub(crate) fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    conn.execute(
        "INSERT OR IGNORE INTO meta (key, value) VALUES ('format_version', ?)",
        [FORMAT_VERSION],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO meta (key, value) VALUES ('created_at', ?)",
        [chrono::Utc::now().to_rfc3339()],
    )?;
    check_format_version(conn, "main")
}

/// Fail unless the schema `database` (`main` or an attached alias) is ours.
pub(crate) fn check_format_version(conn: &Connection, database: &str) -> Result<()> {
    let version: Option<String> = conn
        .query_row(
            &format!("SELECT value FROM {}.meta WHERE key = 'format_version'", database),
            [],
            |row| row.get(0),
        )
        .optional()?;
    match version.as_deref() {
        Some(FORMAT_VERSION) => Ok(()),
        Some(other) => Err(MobilityError::Storage(format!(
            "Unsupported store format version {} (expected {})",
            other, FORMAT_VERSION
        ))),
        None => Err(MobilityError::Storage(
            "Store format version missing".to_string(),
        )),
    }
}
