//! CLI command handlers.
//!
//! Every report routine is wrapped at this boundary: database errors are
//! printed and swallowed, so a failed report never aborts the process.
//! Interactive prompts are skipped when stdin is not a terminal.

use std::io::{self, Write};

use color_eyre::Result;
use crossterm::tty::IsTty;

use crate::cli::args::Commands;
use crate::config::{Config, ConnectionProfile};
use crate::{constants, diagnose, reports};

/// Dispatch the selected command.
pub async fn run(command: Option<Commands>, config: &Config) -> Result<()> {
    match command {
        None => diagnose::connection_check(config).await,
        Some(Commands::Patients) => report_boundary(reports::patients::list(config).await),
        Some(Commands::Search { term }) => search(config, term).await?,
        Some(Commands::Today) => report_boundary(reports::visits::today(config).await),
        Some(Commands::Recent) => report_boundary(reports::visits::recent(config).await),
        Some(Commands::Troubleshoot) => diagnose::troubleshoot(config).await,
        Some(Commands::Schema { table, samples }) => match table {
            Some(table) => {
                report_boundary(reports::schema::describe(config, &table, samples).await);
            }
            None => report_boundary(reports::schema::overview(config).await),
        },
        Some(Commands::Connect) => custom_connection().await?,
    }
    Ok(())
}

/// Routine-boundary error handling: print and continue.
fn report_boundary(result: Result<()>) {
    if let Err(err) = result {
        if err.downcast_ref::<sqlx::Error>().is_some() {
            println!("✗ データベース接続エラー: {err}");
        } else {
            println!("✗ 予期しないエラー: {err}");
        }
    }
}

async fn search(config: &Config, term: Option<String>) -> Result<()> {
    println!("\n=== 患者検索 ===");

    let term = match term {
        Some(term) => term,
        None => prompt_line("患者名またはフリガナを入力してください: ")?,
    };
    let term = term.trim();
    if term.is_empty() {
        println!("検索語を入力してください。");
        return Ok(());
    }

    report_boundary(reports::patients::search(config, term).await);
    Ok(())
}

async fn custom_connection() -> Result<()> {
    println!("\n=== Custom Connection Test ===");

    let host = prompt_with_default("Enter server", constants::DEFAULT_HOST)?;
    let port_input = prompt_with_default("Enter port", "5432")?;
    let Ok(port) = port_input.parse::<u16>() else {
        println!("Invalid port: {port_input}");
        return Ok(());
    };
    let database = prompt_line("Enter database name: ")?;
    let user = prompt_line("Enter username: ")?;
    if database.is_empty() || user.is_empty() {
        println!("Database name and username are required!");
        return Ok(());
    }
    let password = prompt_password("Enter password: ")?;

    println!("\nSSL modes:");
    println!("1. disable");
    println!("2. allow");
    println!("3. prefer");
    println!("4. require");
    let choice = prompt_with_default("Choose SSL mode (1-4)", "3")?;

    let profile = ConnectionProfile {
        host,
        port,
        database,
        user,
        password,
        sslmode: Some(ssl_mode_choice(&choice).to_string()),
    };
    diagnose::test_profile(&profile).await;
    Ok(())
}

/// Numeric menu choice to SSL mode name; anything unrecognized means the
/// default `prefer`.
fn ssl_mode_choice(choice: &str) -> &'static str {
    match choice.trim() {
        "1" => "disable",
        "2" => "allow",
        "4" => "require",
        _ => "prefer",
    }
}

// ── Prompts ─────────────────────────────────────────────────────────────────

/// Read one trimmed line from stdin; empty when stdin is not a terminal.
fn prompt_line(prompt: &str) -> io::Result<String> {
    if !io::stdin().is_tty() {
        return Ok(String::new());
    }

    print!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_with_default(prompt: &str, default: &str) -> io::Result<String> {
    let value = prompt_line(&format!("{prompt} (default: {default}): "))?;
    Ok(if value.is_empty() {
        default.to_string()
    } else {
        value
    })
}

/// Password prompt without echo.
fn prompt_password(prompt: &str) -> io::Result<String> {
    if !io::stdin().is_tty() {
        return Ok(String::new());
    }

    print!("{prompt}");
    io::stdout().flush()?;
    rpassword::read_password()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssl_mode_choice() {
        assert_eq!(ssl_mode_choice("1"), "disable");
        assert_eq!(ssl_mode_choice("2"), "allow");
        assert_eq!(ssl_mode_choice("3"), "prefer");
        assert_eq!(ssl_mode_choice("4"), "require");
        // default on anything else
        assert_eq!(ssl_mode_choice(""), "prefer");
        assert_eq!(ssl_mode_choice("9"), "prefer");
        assert_eq!(ssl_mode_choice(" 4 "), "require");
    }
}
