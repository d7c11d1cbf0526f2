//! Visit reporting: today's receptions and the trailing 7-day window.
//!
//! "Today" is always resolved server-side, with the same date formatter that
//! wrote the visit rows. Rows with an empty reception name are excluded by
//! the query itself, not filtered here.

use color_eyre::Result;
use sqlx::{Connection, PgConnection};

use crate::config::Config;
use crate::constants;
use crate::{db, format};

#[derive(sqlx::FromRow)]
struct VisitRow {
    ukeymd: Option<String>,
    uketime: Option<String>,
    ptid: i64,
    name: Option<String>,
    sryka: Option<String>,
    full_name: Option<String>,
    kananame: Option<String>,
}

#[derive(sqlx::FromRow)]
struct DepartmentCount {
    sryka: Option<String>,
    visits: i64,
}

const VISIT_COLUMNS: &str = "u.ukeymd, u.uketime, u.ptid::bigint AS ptid, u.name, u.sryka, \
                             p.name AS full_name, p.kananame";

/// Today's visits with a per-department breakdown.
pub async fn today(config: &Config) -> Result<()> {
    println!("\n=== 本日の来院患者 ===");

    let mut conn = db::connect(&config.connection).await?;
    let today = db::current_date_compact(&mut conn).await?;

    let visits: Vec<VisitRow> = sqlx::query_as(&format!(
        "SELECT {VISIT_COLUMNS} \
         FROM tbl_uketuke u \
         LEFT JOIN tbl_ptinf p ON u.ptid = p.ptid \
         WHERE u.ukeymd = $1 \
           AND u.name IS NOT NULL \
           AND u.name != '' \
           AND u.hospnum = $2 \
         ORDER BY u.uketime"
    ))
    .bind(&today)
    .bind(config.facility)
    .fetch_all(&mut conn)
    .await?;

    if visits.is_empty() {
        println!("本日（{}）の来院患者はいません。", format::kanji_date(&today));
        let _ = conn.close().await;
        return Ok(());
    }

    println!(
        "本日（{}）の来院患者数: {}名\n",
        format::kanji_date(&today),
        visits.len()
    );
    println!("{}", "=".repeat(90));
    println!(
        "{:^12} | {:^8} | {:^20} | {:^18} | {:^8}",
        "来院時刻", "患者ID", "患者名", "フリガナ", "診療科"
    );
    println!("{}", "=".repeat(90));

    for visit in &visits {
        let name = format::truncate(
            preferred_name(visit.name.as_deref(), visit.full_name.as_deref()),
            constants::LIST_FIELD_WIDTH,
        );
        let kana = format::truncate(
            format::or_sentinel(visit.kananame.as_deref(), constants::SENTINEL_NO_KANA),
            constants::VISIT_KANA_WIDTH,
        );

        println!(
            "{:^12} | {:^8} | {:^20} | {:^18} | {:^8}",
            format::clock_time(visit.uketime.as_deref()),
            visit.ptid,
            name,
            kana,
            format::department_label(visit.sryka.as_deref(), constants::SENTINEL_UNSET),
        );
    }

    println!("{}", "=".repeat(90));

    print_department_breakdown(&mut conn, &today, config.facility).await?;

    let _ = conn.close().await;
    Ok(())
}

/// Visits from the trailing 7-day window, newest first.
pub async fn recent(config: &Config) -> Result<()> {
    println!("\n=== Recent visits (last 7 days) ===");

    let mut conn = db::connect(&config.connection).await?;
    let visits: Vec<VisitRow> = sqlx::query_as(&format!(
        "SELECT {VISIT_COLUMNS} \
         FROM tbl_uketuke u \
         LEFT JOIN tbl_ptinf p ON u.ptid = p.ptid \
         WHERE u.ukeymd >= TO_CHAR(CURRENT_DATE - INTERVAL '7 days', 'YYYYMMDD') \
           AND u.name IS NOT NULL \
           AND u.name != '' \
           AND u.hospnum = $1 \
         ORDER BY u.ukeymd DESC, u.uketime DESC"
    ))
    .bind(config.facility)
    .fetch_all(&mut conn)
    .await?;

    if visits.is_empty() {
        println!("No recent visits found");
    } else {
        for visit in &visits {
            println!(
                "Date: {}, Time: {}, Patient: {}",
                format::slash_date(visit.ukeymd.as_deref()),
                format::clock_time(visit.uketime.as_deref()),
                preferred_name(visit.name.as_deref(), visit.full_name.as_deref()),
            );
        }
    }

    let _ = conn.close().await;
    Ok(())
}

async fn print_department_breakdown(
    conn: &mut PgConnection,
    date: &str,
    facility: i32,
) -> Result<()> {
    println!("\n=== 診療科別統計 ===");

    let counts: Vec<DepartmentCount> = sqlx::query_as(
        "SELECT sryka, COUNT(*) AS visits \
         FROM tbl_uketuke \
         WHERE ukeymd = $1 \
           AND name IS NOT NULL \
           AND name != '' \
           AND hospnum = $2 \
         GROUP BY sryka \
         ORDER BY visits DESC",
    )
    .bind(date)
    .bind(facility)
    .fetch_all(conn)
    .await?;

    for count in &counts {
        println!(
            "{}: {}名",
            format::department_label(count.sryka.as_deref(), constants::SENTINEL_UNKNOWN),
            count.visits
        );
    }

    Ok(())
}

/// The reception row's own name, falling back to the registry's full name.
fn preferred_name<'a>(name: Option<&'a str>, full_name: Option<&'a str>) -> &'a str {
    name.filter(|s| !s.is_empty())
        .or_else(|| full_name.filter(|s| !s.is_empty()))
        .unwrap_or(constants::SENTINEL_NO_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferred_name_prefers_reception_name() {
        assert_eq!(preferred_name(Some("田中"), Some("田中太郎")), "田中");
    }

    #[test]
    fn test_preferred_name_falls_back_to_registry() {
        assert_eq!(preferred_name(None, Some("田中太郎")), "田中太郎");
        assert_eq!(preferred_name(Some(""), Some("田中太郎")), "田中太郎");
    }

    #[test]
    fn test_preferred_name_sentinel() {
        assert_eq!(preferred_name(None, None), "名前なし");
    }

    #[test]
    fn test_visit_line_formatting() {
        // one reception: date 20240115, time 093000, department 02, "Tanaka"
        let time = format::clock_time(Some("093000"));
        let dept = format::department_label(Some("02"), constants::SENTINEL_UNSET);
        let name = preferred_name(Some("Tanaka"), None);
        let line = format!("{time} | {name} | {dept}");
        assert!(line.contains("09:30:00"));
        assert!(line.contains("外科"));
        assert!(line.contains("Tanaka"));
    }
}
