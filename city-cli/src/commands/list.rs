//! Print the city list.

use anyhow::Result;

use super::render;
use crate::session::Session;

/// Run the list command.
pub fn run(session: &Session) -> Result<()> {
    println!("{}", render(&session.cities()));
    Ok(())
}
