//! Add a city.

use anyhow::Result;
use city_types::City;

use super::{render, report};
use crate::session::Session;

/// Run the add command.
pub async fn run(session: &mut Session, name: &str, province: &str) -> Result<()> {
    let city = City::new(name, province);
    session.controller().add_record(Some(&city)).await;

    let notice = session.wait_notice().await?;
    report(&notice);

    if !notice.is_error() {
        // The list only changes once the store echoes the write back.
        let cities = session.wait_list().await?;
        println!();
        println!("{}", render(&cities));
    }
    Ok(())
}
