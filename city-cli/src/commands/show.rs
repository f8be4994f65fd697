//! Show one city.

use anyhow::Result;

use crate::session::Session;

/// Run the show command.
pub fn run(session: &Session, id: &str) -> Result<()> {
    let city = session.find(id)?;

    println!("City:");
    println!("  ID:       {}", id);
    println!("  Name:     {}", city.name());
    println!("  Province: {}", city.province());
    Ok(())
}
