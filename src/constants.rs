//! Application-wide constants and lookup tables.
//!
//! This module defines all static configuration values used throughout
//! Orcalens, including connection defaults, display widths, fixed code
//! lookups, and console sentinels.

use std::time::Duration;

// === Application Metadata ===

/// Application name (from Cargo.toml).
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
/// Current application version (from Cargo.toml).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// === Connection Defaults ===

/// Default database server host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default PostgreSQL port.
pub const DEFAULT_PORT: u16 = 5432;
/// Default database name for a stock Web ORCA install.
pub const DEFAULT_DATABASE: &str = "orca";
/// Default database user.
pub const DEFAULT_USER: &str = "orca";
/// Default password (overridden via config.toml on any real deployment).
pub const DEFAULT_PASSWORD: &str = "orca";

/// Alternative credential sets tried after the primary profile, in order.
/// These are the database/user/password triples a stock install may carry.
pub const FALLBACK_CREDENTIALS: [(&str, &str, &str); 3] = [
    ("receipt", "receipt", "receipt"),
    ("weborca", "weborca", "weborca"),
    ("postgres", "postgres", ""),
];

/// Upper bound on a single connection attempt.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Facility identifier (`hospnum`) scoping all patient/visit queries.
pub const DEFAULT_FACILITY: i32 = 1;

// === Configuration Paths ===

/// Subdirectory of the platform config dir holding our config file.
pub const CONFIG_DIR_NAME: &str = "orcalens";
/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.toml";

// === Display Configuration ===

/// Display width for name/kana cells in the patient listing and visit table.
pub const LIST_FIELD_WIDTH: usize = 18;
/// Display width for kana cells in the visit table.
pub const VISIT_KANA_WIDTH: usize = 16;
/// Display width for name/kana/phone cells in the search result table.
pub const SEARCH_FIELD_WIDTH: usize = 13;
/// Number of sample rows fetched by schema introspection.
pub const SAMPLE_ROW_LIMIT: i64 = 3;

// === Display Sentinels & Labels ===

/// Patient with no recorded name.
pub const SENTINEL_NO_NAME: &str = "名前なし";
/// Patient with no recorded phonetic name.
pub const SENTINEL_NO_KANA: &str = "フリガナなし";
/// Birth date missing or malformed.
pub const SENTINEL_UNKNOWN_BIRTH: &str = "生年月日不明";
/// Value absent from the record (times, table-row department codes).
pub const SENTINEL_UNSET: &str = "未設定";
/// Value present but not interpretable (sex codes, statistics departments).
pub const SENTINEL_UNKNOWN: &str = "不明";
/// No phone number registered.
pub const SENTINEL_NO_PHONE: &str = "未登録";

/// Sex code `"1"`.
pub const LABEL_MALE: &str = "男性";
/// Sex code `"2"`.
pub const LABEL_FEMALE: &str = "女性";
/// Non-blank death-status code.
pub const LABEL_DECEASED: &str = "死亡";
/// Blank death-status code.
pub const LABEL_ALIVE: &str = "生存";

// === Department Codes ===

/// Fixed lookup from two-character department codes to display names.
/// Codes absent from this table render as the raw code.
pub const DEPARTMENT_NAMES: [(&str, &str); 12] = [
    ("01", "内科"),
    ("02", "外科"),
    ("03", "小児科"),
    ("04", "産婦人科"),
    ("05", "眼科"),
    ("06", "耳鼻科"),
    ("07", "皮膚科"),
    ("08", "泌尿器科"),
    ("09", "整形外科"),
    ("10", "脳神経外科"),
    ("11", "呼吸器科"),
    ("12", "循環器科"),
];

// === Schema Introspection ===

/// Naming-convention keywords marking candidate patient tables.
pub const PATIENT_TABLE_KEYWORDS: [&str; 4] = ["patient", "ptnt", "kanja", "患者"];
/// Naming-convention keywords marking candidate visit/accounting tables.
pub const VISIT_TABLE_KEYWORDS: [&str; 5] = ["uketuke", "visit", "jyurrk", "sryact", "nyukin"];
/// How many candidate patient tables get a full column dump in the overview.
pub const PATIENT_TABLE_DETAIL_LIMIT: usize = 3;

// === Access-Rule Generation ===

/// Placeholder substituted into generated pg_hba.conf rules when the caller's
/// address is not configured.
pub const CLIENT_IP_PLACEHOLDER: &str = "<CLIENT_IP>";
