//! Update a city.

use anyhow::Result;

use super::{render, report};
use crate::session::Session;

/// Run the update command.
///
/// Fields left out keep their current value.
pub async fn run(
    session: &mut Session,
    id: &str,
    name: Option<&str>,
    province: Option<&str>,
) -> Result<()> {
    let mut city = session.find(id)?;
    let name = name.unwrap_or(city.name()).to_string();
    let province = province.unwrap_or(city.province()).to_string();

    session
        .controller()
        .update_record(Some(&mut city), &name, &province)
        .await;

    let notice = session.wait_notice().await?;
    report(&notice);

    if !notice.is_error() {
        let cities = session.wait_list().await?;
        println!();
        println!("{}", render(&cities));
    }
    Ok(())
}
