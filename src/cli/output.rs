//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::application::dto::{LineResponse, StationResponse};
use crate::application::Status;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print the response status of a completed call (green label)
pub fn status(status: Status, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", status.to_string().green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

pub fn station(station: &StationResponse) {
    info(&format!("{:>4}  {}", station.id, station.name));
}

/// Print a line header and its stations joined by distance-labelled arrows.
pub fn line(line: &LineResponse) {
    header(&format!("#{} {} ({})", line.id, line.name, line.color));
    detail(&render_route(line));
    detail(&format!(
        "{} stations, total distance {}",
        line.stations.len(),
        line.total_distance()
    ));
}

/// `잠실역 -[10]-> 용산역 -[5]-> 건대입구역`
pub fn render_route(line: &LineResponse) -> String {
    let mut route = String::new();
    for (idx, station) in line.stations.iter().enumerate() {
        if idx > 0 {
            let distance = line.sections.get(idx - 1).map_or(0, |s| s.distance);
            route.push_str(&format!(" -[{distance}]-> "));
        }
        route.push_str(&station.name);
    }
    route
}
