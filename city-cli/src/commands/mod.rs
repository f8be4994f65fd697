//! CLI command implementations.

pub mod add;
pub mod delete;
pub mod list;
pub mod show;
pub mod update;

use city_core::Notice;
use city_types::City;

/// Render the list, one `<id>  <name> <province>` line per city.
pub fn render(cities: &[City]) -> String {
    if cities.is_empty() {
        return "(no cities)".to_string();
    }
    cities
        .iter()
        .map(|c| format!("{}  {}", c.id().unwrap_or("-"), c))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print a notice: successes to stdout, failures to stderr.
pub fn report(notice: &Notice) {
    if notice.is_error() {
        eprintln!("{}", notice);
    } else {
        println!("{}", notice);
    }
}
