//! Schema introspection: tables, columns, and sample rows.
//!
//! Pure metadata exploration over `information_schema`. Identifiers are
//! validated before they are ever interpolated into a statement; everything
//! else binds parameters.

use color_eyre::eyre::bail;
use color_eyre::Result;
use sqlx::{Connection, PgConnection, Row};

use crate::config::Config;
use crate::constants;
use crate::db;

#[derive(sqlx::FromRow)]
struct ColumnInfo {
    column_name: String,
    data_type: String,
}

/// Full overview: every public table, candidate patient/visit tables by
/// naming convention, and column dumps for the first few patient tables.
pub async fn overview(config: &Config) -> Result<()> {
    let mut conn = db::connect(&config.connection).await?;

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT table_name::text \
         FROM information_schema.tables \
         WHERE table_schema = 'public' \
         ORDER BY table_name",
    )
    .fetch_all(&mut conn)
    .await?;

    println!("=== Database Tables ===");
    for table in &tables {
        println!("- {table}");
    }

    let patient_tables = matching_tables(&tables, &constants::PATIENT_TABLE_KEYWORDS);
    println!("\n=== Potential Patient Tables ===");
    for table in &patient_tables {
        println!("- {table}");
    }

    println!("\n=== Potential Visit Tables ===");
    for table in matching_tables(&tables, &constants::VISIT_TABLE_KEYWORDS) {
        println!("- {table}");
    }

    for table in patient_tables
        .iter()
        .take(constants::PATIENT_TABLE_DETAIL_LIMIT)
    {
        println!("\n=== Structure of {table} ===");
        let columns = fetch_columns(&mut conn, table).await?;
        print_columns(&columns);
    }

    let _ = conn.close().await;
    Ok(())
}

/// Describe a single table: columns in ordinal order, optionally followed by
/// a few sample rows.
pub async fn describe(config: &Config, table: &str, samples: bool) -> Result<()> {
    if !is_safe_identifier(table) {
        bail!("invalid table name: {table}");
    }

    let mut conn = db::connect(&config.connection).await?;

    println!("=== Structure of {table} ===");
    let columns = fetch_columns(&mut conn, table).await?;
    if columns.is_empty() {
        println!("Table '{table}' not found in the public schema");
        let _ = conn.close().await;
        return Ok(());
    }
    print_columns(&columns);

    if samples {
        println!(
            "\n=== Sample data from {table} (first {} records) ===",
            constants::SAMPLE_ROW_LIMIT
        );
        print_sample_rows(&mut conn, table, &columns).await?;
    }

    let _ = conn.close().await;
    Ok(())
}

fn matching_tables<'a>(tables: &'a [String], keywords: &[&str]) -> Vec<&'a String> {
    tables
        .iter()
        .filter(|t| {
            let lower = t.to_lowercase();
            keywords.iter().any(|k| lower.contains(k))
        })
        .collect()
}

async fn fetch_columns(conn: &mut PgConnection, table: &str) -> Result<Vec<ColumnInfo>> {
    let columns: Vec<ColumnInfo> = sqlx::query_as(
        "SELECT column_name::text AS column_name, data_type::text AS data_type \
         FROM information_schema.columns \
         WHERE table_name = $1 \
         ORDER BY ordinal_position",
    )
    .bind(table)
    .fetch_all(conn)
    .await?;
    Ok(columns)
}

fn print_columns(columns: &[ColumnInfo]) {
    for column in columns {
        println!("  {} ({})", column.column_name, column.data_type);
    }
}

/// Fetch a few rows with every value cast to text server-side, and print
/// each value paired with its column name.
async fn print_sample_rows(
    conn: &mut PgConnection,
    table: &str,
    columns: &[ColumnInfo],
) -> Result<()> {
    let safe: Vec<&ColumnInfo> = columns
        .iter()
        .filter(|c| is_safe_identifier(&c.column_name))
        .collect();
    if safe.is_empty() {
        println!("No sample data found");
        return Ok(());
    }

    let select_list = safe
        .iter()
        .map(|c| format!("{}::text", c.column_name))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT {select_list} FROM {table} LIMIT {}",
        constants::SAMPLE_ROW_LIMIT
    );
    tracing::debug!(%table, "fetching sample rows");

    let rows = sqlx::query(&sql).fetch_all(conn).await?;
    if rows.is_empty() {
        println!("No sample data found");
        return Ok(());
    }

    for (index, row) in rows.iter().enumerate() {
        println!("\n--- Record {} ---", index + 1);
        for (position, column) in safe.iter().enumerate() {
            let value: Option<String> = row.try_get(position)?;
            println!(
                "  {}: {}",
                column.column_name,
                value.as_deref().unwrap_or("NULL")
            );
        }
    }

    Ok(())
}

/// Accept only plain lowercase SQL identifiers; anything else never reaches
/// a statement.
fn is_safe_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_identifier_accepts_table_names() {
        assert!(is_safe_identifier("tbl_ptinf"));
        assert!(is_safe_identifier("tbl_uketuke"));
        assert!(is_safe_identifier("_private"));
        assert!(is_safe_identifier("t2"));
    }

    #[test]
    fn test_safe_identifier_rejects_injection() {
        assert!(!is_safe_identifier(""));
        assert!(!is_safe_identifier("2fast"));
        assert!(!is_safe_identifier("tbl_ptinf; DROP TABLE tbl_ptinf"));
        assert!(!is_safe_identifier("tbl ptinf"));
        assert!(!is_safe_identifier("\"quoted\""));
        assert!(!is_safe_identifier("患者"));
    }

    #[test]
    fn test_matching_tables() {
        let tables = vec![
            "patient_log".to_string(),
            "tbl_kanjamst".to_string(),
            "tbl_uketuke".to_string(),
            "tbl_syskanri".to_string(),
        ];
        let matched = matching_tables(&tables, &constants::PATIENT_TABLE_KEYWORDS);
        assert_eq!(matched, vec!["patient_log", "tbl_kanjamst"]);

        let visits = matching_tables(&tables, &constants::VISIT_TABLE_KEYWORDS);
        assert_eq!(visits, vec!["tbl_uketuke"]);
    }
}
