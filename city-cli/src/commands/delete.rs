//! Delete a city.

use anyhow::{Context, Result};
use city_types::City;
use std::io::{BufRead, Write};

use super::{render, report};
use crate::session::Session;

/// Run the delete command.
///
/// Asks for confirmation on `input` unless `yes` is set.
pub async fn run(
    session: &mut Session,
    id: &str,
    yes: bool,
    input: &mut impl BufRead,
) -> Result<()> {
    let city = session.find(id)?;

    if !yes && !confirm(&city, input)? {
        println!("Cancelled");
        return Ok(());
    }

    session.controller().delete_record(&city).await;

    let notice = session.wait_notice().await?;
    report(&notice);

    if !notice.is_error() {
        let cities = session.wait_list().await?;
        println!();
        println!("{}", render(&cities));
    }
    Ok(())
}

/// Ask "Delete <name> <province>?" and read a y/N answer.
fn confirm(city: &City, input: &mut impl BufRead) -> Result<bool> {
    print!("Delete {}? [y/N] ", city);
    std::io::stdout().flush().context("Failed to write prompt")?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    let answer = answer.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}
