//! Patient registry reports: listing, search, and aggregate statistics.

use color_eyre::Result;
use sqlx::{Connection, PgConnection};

use crate::config::Config;
use crate::constants;
use crate::{db, format};

#[derive(sqlx::FromRow)]
struct PatientRow {
    ptid: i64,
    name: Option<String>,
    kananame: Option<String>,
    sex: Option<String>,
    birthday: Option<String>,
    deathkbn: Option<String>,
}

#[derive(sqlx::FromRow)]
struct SearchRow {
    ptid: i64,
    name: Option<String>,
    kananame: Option<String>,
    sex: Option<String>,
    birthday: Option<String>,
    home_tel1: Option<String>,
}

#[derive(sqlx::FromRow)]
struct PatientStats {
    total: i64,
    male: i64,
    female: i64,
    deceased: i64,
}

/// List every patient registered for the configured facility, then print the
/// aggregate statistics.
pub async fn list(config: &Config) -> Result<()> {
    println!("\n=== Patient List ===");

    let mut conn = db::connect(&config.connection).await?;
    let patients: Vec<PatientRow> = sqlx::query_as(
        "SELECT ptid::bigint AS ptid, name, kananame, sex, birthday, deathkbn \
         FROM tbl_ptinf \
         WHERE hospnum = $1 \
         ORDER BY ptid",
    )
    .bind(config.facility)
    .fetch_all(&mut conn)
    .await?;

    if patients.is_empty() {
        println!("患者データが見つかりませんでした。");
        let _ = conn.close().await;
        return Ok(());
    }

    println!("登録患者数: {}名\n", patients.len());
    println!("{}", "=".repeat(80));
    println!(
        "{:>4} | {:^20} | {:^20} | {:^6} | {:^12} | {:^6}",
        "ID", "患者名", "フリガナ", "性別", "生年月日", "状態"
    );
    println!("{}", "=".repeat(80));

    for patient in &patients {
        let name = format::truncate(
            format::or_sentinel(patient.name.as_deref(), constants::SENTINEL_NO_NAME),
            constants::LIST_FIELD_WIDTH,
        );
        let kana = format::truncate(
            format::or_sentinel(patient.kananame.as_deref(), constants::SENTINEL_NO_KANA),
            constants::LIST_FIELD_WIDTH,
        );

        println!(
            "{:>4} | {:^20} | {:^20} | {:^6} | {:^12} | {:^6}",
            patient.ptid,
            name,
            kana,
            format::sex_label(patient.sex.as_deref()),
            format::birth_date(patient.birthday.as_deref()),
            format::life_status(patient.deathkbn.as_deref()),
        );
    }

    println!("{}", "=".repeat(80));

    print_statistics(&mut conn, config.facility).await?;

    let _ = conn.close().await;
    Ok(())
}

/// Search patients by a case-insensitive partial match on name or phonetic
/// name.
pub async fn search(config: &Config, term: &str) -> Result<()> {
    let mut conn = db::connect(&config.connection).await?;
    let pattern = format!("%{term}%");
    let results: Vec<SearchRow> = sqlx::query_as(
        "SELECT ptid::bigint AS ptid, name, kananame, sex, birthday, home_tel1 \
         FROM tbl_ptinf \
         WHERE hospnum = $1 \
           AND (name ILIKE $2 OR kananame ILIKE $2) \
         ORDER BY ptid",
    )
    .bind(config.facility)
    .bind(&pattern)
    .fetch_all(&mut conn)
    .await?;

    if results.is_empty() {
        println!("「{term}」に一致する患者が見つかりませんでした。");
        let _ = conn.close().await;
        return Ok(());
    }

    println!("検索結果: {}件\n", results.len());
    println!("{}", "=".repeat(100));
    println!(
        "{:>4} | {:^15} | {:^15} | {:^6} | {:^12} | {:^15}",
        "ID", "患者名", "フリガナ", "性別", "生年月日", "電話番号"
    );
    println!("{}", "=".repeat(100));

    for patient in &results {
        let name = format::truncate(
            format::or_sentinel(patient.name.as_deref(), constants::SENTINEL_NO_NAME),
            constants::SEARCH_FIELD_WIDTH,
        );
        let kana = format::truncate(
            format::or_sentinel(patient.kananame.as_deref(), constants::SENTINEL_NO_KANA),
            constants::SEARCH_FIELD_WIDTH,
        );
        let phone = format::truncate(
            format::or_sentinel(patient.home_tel1.as_deref(), constants::SENTINEL_NO_PHONE),
            constants::SEARCH_FIELD_WIDTH,
        );

        println!(
            "{:>4} | {:^15} | {:^15} | {:^6} | {:^12} | {:^15}",
            patient.ptid,
            name,
            kana,
            format::sex_label(patient.sex.as_deref()),
            format::birth_date(patient.birthday.as_deref()),
            phone,
        );
    }

    println!("{}", "=".repeat(100));

    let _ = conn.close().await;
    Ok(())
}

async fn print_statistics(conn: &mut PgConnection, facility: i32) -> Result<()> {
    println!("\n=== 統計情報 ===");

    let stats: PatientStats = sqlx::query_as(
        "SELECT COUNT(*) AS total, \
                COUNT(CASE WHEN sex = '1' THEN 1 END) AS male, \
                COUNT(CASE WHEN sex = '2' THEN 1 END) AS female, \
                COUNT(CASE WHEN deathkbn IS NOT NULL AND deathkbn != ' ' THEN 1 END) AS deceased \
         FROM tbl_ptinf \
         WHERE hospnum = $1",
    )
    .bind(facility)
    .fetch_one(conn)
    .await?;

    println!("総患者数: {}名", stats.total);
    println!("男性: {}名", stats.male);
    println!("女性: {}名", stats.female);
    println!("死亡: {}名", stats.deceased);

    Ok(())
}
