use std::fmt::Write;

use comfy_table::{Cell, Color as TableColor};

use crate::astronaut::AstronautProfile;
use crate::error::ErrorKind;
use crate::pipeline::ProfileFailure;
use crate::sources::nasa::PhotoOfTheDay;

use super::styling::{bright, bright_yellow, cyan, dim};
use super::tables::{
    color_coded_missions_cell, create_cyan_header, create_table, days_in_space_cell,
};

/// Prints everyone in space as a table on stdout.
pub fn print_astronauts(profiles: &[AstronautProfile]) {
    println!("{}", render_astronauts(profiles));
}

/// Prints the roster entries whose profiles were dropped.
pub fn print_failures(failures: &[ProfileFailure]) {
    if !failures.is_empty() {
        println!("{}", render_failures(failures));
    }
}

pub fn print_backdrop(photo: &PhotoOfTheDay) {
    println!("{}", render_backdrop(photo));
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

fn crafts(profiles: &[AstronautProfile]) -> Vec<&str> {
    let mut crafts: Vec<&str> = profiles.iter().map(|p| p.craft.as_str()).collect();
    crafts.sort_unstable();
    crafts.dedup();
    crafts
}

fn render_astronauts(profiles: &[AstronautProfile]) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "👩‍🚀", "People in Space");

    if profiles.is_empty() {
        let _ = writeln!(output, "  {}", bright_yellow("Nobody is in space right now."));
        return output;
    }

    let _ = writeln!(
        output,
        "  {} {}\n  {} {}\n",
        dim("People:"),
        bright_yellow(profiles.len()),
        dim("Craft:"),
        cyan(crafts(profiles).join(", ")),
    );

    let mut table = create_table();
    table.set_header(create_cyan_header(&[
        "Name",
        "Craft",
        "Occupation / Rank",
        "Gender",
        "Born",
        "Missions",
        "Time in Space",
    ]));

    for profile in profiles {
        let occupation = &profile.occupation_or_rank;
        let role = if occupation.type_.is_empty() {
            occupation.title.clone()
        } else {
            format!("{}\n{}", occupation.title, occupation.type_)
        };

        table.add_row(vec![
            Cell::new(&profile.name),
            Cell::new(&profile.craft),
            Cell::new(role),
            Cell::new(&profile.gender),
            profile.birthday.as_deref().map_or_else(
                || Cell::new("Unknown").fg(TableColor::DarkGrey),
                Cell::new,
            ),
            color_coded_missions_cell(profile.number_of_missions),
            days_in_space_cell(profile.days_in_space),
        ]);
    }

    let _ = writeln!(output, "{table}");
    output
}

fn render_failures(failures: &[ProfileFailure]) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "⚠️", "Profiles Not Loaded");

    let mut table = create_table();
    table.set_header(create_cyan_header(&["Name", "Craft", "Problem", "Details"]));
    for failure in failures {
        table.add_row(vec![
            Cell::new(&failure.entry.name),
            Cell::new(&failure.entry.craft),
            Cell::new(problem_label(failure.error.kind())).fg(TableColor::Red),
            Cell::new(failure.error.to_string()).fg(TableColor::DarkGrey),
        ]);
    }

    let _ = writeln!(output, "{table}");
    output
}

fn problem_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Network => "Network",
        ErrorKind::Parse => "Unexpected page layout",
        ErrorKind::UnknownName => "No profile page",
        ErrorKind::Other => "Error",
    }
}

fn render_backdrop(photo: &PhotoOfTheDay) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "🌌", "Astronomy Picture of the Day");

    let _ = writeln!(
        output,
        "  {} {}",
        dim("Title:"),
        cyan(photo.title.as_deref().unwrap_or("(untitled)"))
    );
    if let Some(copyright) = &photo.copyright {
        let _ = writeln!(output, "  {} {}", dim("Credit:"), copyright.trim());
    }
    match photo.backdrop_url() {
        Some(url) => {
            let _ = writeln!(output, "  {} {}", dim("Backdrop:"), url);
        }
        None => {
            let _ = writeln!(
                output,
                "  {}",
                bright_yellow("Today's entry is not an image; use the default backdrop.")
            );
        }
    }

    output
}
