//! Connection diagnosis routines.
//!
//! Two entry points: the default connectivity check (first profile that
//! connects gets verified and summarized), and the full troubleshooter,
//! which enumerates every SSL negotiation mode against every credential set,
//! classifies each failure, and ends with generated pg_hba.conf rules and
//! connectivity workarounds when nothing succeeded.
//!
//! Failures here are reported, never fatal: both routines always run to
//! completion and print a summary.

use sqlx::postgres::PgSslMode;
use sqlx::{Connection, PgConnection};

use crate::config::{Config, ConnectionProfile};
use crate::constants;
use crate::db::{self, error};

/// SSL negotiation modes tried in order, most permissive first. Each mode is
/// attempted at most once per credential set.
const SSL_MODES: [(PgSslMode, &str, &str); 4] = [
    (PgSslMode::Disable, "disable", "no SSL encryption"),
    (PgSslMode::Allow, "allow", "SSL if the server prefers it"),
    (PgSslMode::Prefer, "prefer", "SSL preferred but optional"),
    (PgSslMode::Require, "require", "SSL required"),
];

// ── Default connectivity check ──────────────────────────────────────────────

/// Try each configured profile once; on the first success print the session
/// snapshot and a data overview, otherwise print the failure checklist.
pub async fn connection_check(config: &Config) {
    println!(
        "{} v{} PostgreSQL connection test",
        constants::APP_NAME,
        constants::APP_VERSION
    );
    println!("{}", "=".repeat(50));

    let mut live: Option<PgConnection> = None;
    for profile in config.profiles() {
        println!("\n=== Testing {} ===", profile.target());
        match try_open_verified(&profile).await {
            Ok(conn) => {
                live = Some(conn);
                break;
            }
            Err(err) => report_failure(&err),
        }
    }

    match live {
        Some(mut conn) => {
            println!("\n{}", "=".repeat(50));
            println!("患者データの概要を表示しています...");
            if let Err(err) = data_overview(&mut conn, config.facility).await {
                println!("患者データの取得に失敗しました: {err}");
            }
            let _ = conn.close().await;
        }
        None => {
            println!("\n=== Connection Test Summary ===");
            println!("If all connections failed, check:");
            println!("1. PostgreSQL is running and accepting connections");
            println!("2. Database name, username, and password are correct");
            println!("3. User has proper permissions to access the database");
            println!("4. Firewall settings allow database connections");
        }
    }
}

/// Test a single profile and report the result. Used by the interactive
/// custom-connection command.
pub async fn test_profile(profile: &ConnectionProfile) {
    println!("\n=== Testing {} ===", profile.target());
    match try_open_verified(profile).await {
        Ok(conn) => {
            let _ = conn.close().await;
        }
        Err(err) => report_failure(&err),
    }
}

/// Connect and run the verification queries, printing the session snapshot.
async fn try_open_verified(profile: &ConnectionProfile) -> Result<PgConnection, sqlx::Error> {
    let mut conn = db::connect(profile).await?;
    let info = db::server_info(&mut conn).await?;

    println!("✓ Connection successful!");
    println!("  Database: {}", info.database);
    println!("  User: {}", info.user);
    println!("  PostgreSQL version: {}", info.version);
    println!("  Encoding: {}", info.encoding);

    Ok(conn)
}

fn report_failure(err: &sqlx::Error) {
    println!("✗ Connection failed: {err}");
    if let Some(hint) = error::classify(err).guidance() {
        println!("  → {hint}");
    }
}

/// Patient and visit counts shown after a successful default check.
async fn data_overview(conn: &mut PgConnection, facility: i32) -> Result<(), sqlx::Error> {
    let (total, male, female): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), \
                COUNT(CASE WHEN sex = '1' THEN 1 END), \
                COUNT(CASE WHEN sex = '2' THEN 1 END) \
         FROM tbl_ptinf WHERE hospnum = $1",
    )
    .bind(facility)
    .fetch_one(&mut *conn)
    .await?;

    if total == 0 {
        println!("患者データが登録されていません。");
        return Ok(());
    }

    println!("\n=== 患者データ概要 ===");
    println!("登録患者数: {total}名");
    println!("男性: {male}名, 女性: {female}名");

    let today = db::current_date_compact(&mut *conn).await?;
    let visits: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM tbl_uketuke \
         WHERE ukeymd = $1 AND name IS NOT NULL AND name != '' AND hospnum = $2",
    )
    .bind(&today)
    .bind(facility)
    .fetch_one(conn)
    .await?;
    println!("本日の来院患者数: {visits}名");

    println!("\n患者一覧を表示するには: {} patients", constants::APP_NAME);
    println!("患者を検索するには: {} search", constants::APP_NAME);
    println!("本日の来院患者を表示するには: {} today", constants::APP_NAME);

    Ok(())
}

// ── SSL-mode / credential-set troubleshooter ────────────────────────────────

/// Enumerate every SSL mode against every credential set, then summarize.
pub async fn troubleshoot(config: &Config) {
    println!("PostgreSQL Connection Troubleshooting");
    println!("{}", "=".repeat(60));

    let profiles = config.profiles();
    let mut successes: Vec<(&ConnectionProfile, &'static str)> = Vec::new();

    for profile in &profiles {
        if let Some(mode) = try_ssl_modes(profile).await {
            successes.push((profile, mode));
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("TROUBLESHOOTING SUMMARY");
    println!("{}", "=".repeat(60));

    if successes.is_empty() {
        let client_ip = config.client_address();
        println!("✗ No successful connections");
        println!("\nROOT CAUSE:");
        println!("The PostgreSQL server's pg_hba.conf file most likely does not");
        println!("allow connections from this client address ({client_ip}).");

        println!("\n{}", "=".repeat(60));
        println!("SOLUTION FOR DATABASE ADMINISTRATOR");
        println!("{}", "=".repeat(60));
        println!("{}", access_rules(&profiles, client_ip));

        print_workarounds(&config.connection, client_ip);
    } else {
        println!("✓ Successfully connected to {} database(s)", successes.len());
        for (profile, mode) in &successes {
            println!("  - {} as {} (sslmode={mode})", profile.database, profile.user);
        }
    }
}

/// Try each SSL mode once against one credential set; stop at the first mode
/// that connects and verifies. Returns the succeeding mode's name.
async fn try_ssl_modes(profile: &ConnectionProfile) -> Option<&'static str> {
    println!("\n=== Testing connection to {} ===", profile.target());

    for (mode, name, description) in SSL_MODES {
        println!("\nTrying SSL mode: {name} ({description})");
        let options = db::connect_options(profile).ssl_mode(mode);
        match db::connect_with(options).await {
            Ok(mut conn) => {
                let version: Result<String, sqlx::Error> =
                    sqlx::query_scalar("SELECT version()").fetch_one(&mut conn).await;
                let _ = conn.close().await;
                match version {
                    Ok(version) => {
                        println!("✓ SUCCESS with SSL mode: {name}");
                        println!("  PostgreSQL version: {version}");
                        return Some(name);
                    }
                    Err(err) => {
                        println!("✗ Connected with SSL mode {name}, but verification failed");
                        println!("  Error: {err}");
                    }
                }
            }
            Err(err) => print_mode_failure(name, &err),
        }
    }

    None
}

fn print_mode_failure(mode: &str, err: &sqlx::Error) {
    println!("✗ FAILED with SSL mode: {mode}");
    println!("  Error: {err}");

    let class = error::classify(err);
    if let Some(hint) = class.guidance() {
        println!("  → {hint}");
    }
    if class == error::FailureClass::HostRejected {
        // The server's rejection message names the channel it refused.
        let message = err.to_string();
        if message.contains("SSL encryption") {
            println!("  → Server requires SSL but this address has no matching hostssl rule");
        } else if message.contains("no encryption") {
            println!("  → Server allows non-SSL but this address has no matching host rule");
        }
    }
}

// ── Access-rule generation ──────────────────────────────────────────────────

/// Generate pg_hba.conf allow rules for every tried database/user pair.
pub fn access_rules(profiles: &[ConnectionProfile], client_ip: &str) -> String {
    let mut lines = vec![
        "# Add these lines to pg_hba.conf on the PostgreSQL server".to_string(),
        "# (Replace /32 with an appropriate subnet if needed)".to_string(),
        String::new(),
    ];

    for profile in profiles {
        lines.push(format!(
            "hostssl    {:<12} {:<12} {client_ip}/32        md5",
            profile.database, profile.user
        ));
        lines.push(format!(
            "host       {:<12} {:<12} {client_ip}/32        md5",
            profile.database, profile.user
        ));
    }

    lines.push(String::new());
    lines.push("# After adding these lines:".to_string());
    lines.push("# 1. Save the pg_hba.conf file".to_string());
    lines.push("# 2. Restart PostgreSQL or run: SELECT pg_reload_conf();".to_string());
    lines.push("# 3. Test the connection again".to_string());

    lines.join("\n")
}

fn print_workarounds(server: &ConnectionProfile, client_ip: &str) {
    println!("\n{}", "=".repeat(60));
    println!("ALTERNATIVE SOLUTIONS");
    println!("{}", "=".repeat(60));
    println!("1. VPN/Tunnel: Connect through a VPN that routes through an allowed IP");
    println!("2. SSH Tunnel: Create an SSH tunnel to the database server");
    println!(
        "   Example: ssh -L {0}:localhost:{0} user@{1}",
        server.port, server.host
    );
    println!("   Then connect to localhost:{} instead", server.port);
    println!("3. Proxy: Use a database proxy server located in an allowed network");
    println!("\n4. Request firewall/network changes to allow this client:");
    println!("   Client: {client_ip}");
    println!("   Target: {}:{}", server.host, server.port);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CredentialSet;

    #[test]
    fn test_ssl_modes_order_and_uniqueness() {
        // each mode appears exactly once, so the loop tries each at most once
        let names: Vec<&str> = SSL_MODES.iter().map(|(_, name, _)| *name).collect();
        assert_eq!(names, vec!["disable", "allow", "prefer", "require"]);
    }

    #[test]
    fn test_access_rules_one_pair() {
        let profiles = vec![ConnectionProfile::default()];
        let rules = access_rules(&profiles, "203.0.113.7");

        let ssl_rules: Vec<&str> = rules
            .lines()
            .filter(|l| l.starts_with("hostssl"))
            .collect();
        let plain_rules: Vec<&str> = rules
            .lines()
            .filter(|l| l.starts_with("host "))
            .collect();
        assert_eq!(ssl_rules.len(), 1);
        assert_eq!(plain_rules.len(), 1);
        assert!(ssl_rules[0].contains("orca"));
        assert!(ssl_rules[0].contains("203.0.113.7/32"));
        assert!(plain_rules[0].contains("203.0.113.7/32"));
        assert!(rules.contains("pg_reload_conf()"));
    }

    #[test]
    fn test_access_rules_cover_every_pair() {
        let base = ConnectionProfile::default();
        let profiles = vec![
            base.clone(),
            base.with_credentials(&CredentialSet {
                database: "receipt".to_string(),
                user: "receipt".to_string(),
                password: "receipt".to_string(),
            }),
        ];
        let rules = access_rules(&profiles, "<CLIENT_IP>");

        // one hostssl and one host rule per database/user pair
        assert_eq!(rules.lines().filter(|l| l.starts_with("hostssl")).count(), 2);
        assert_eq!(rules.lines().filter(|l| l.starts_with("host ")).count(), 2);
        assert!(rules
            .lines()
            .any(|l| l.starts_with("hostssl") && l.contains("receipt") && l.contains("<CLIENT_IP>/32")));
    }
}
