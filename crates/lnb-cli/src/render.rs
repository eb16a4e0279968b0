use std::fmt::Display;
use std::io::IsTerminal;

use anstyle::{AnsiColor, Effects, Style};
use chrono::{Local, TimeZone};
use lnb_core::{Entry, EntryKind};
use lnb_installer::{InstallOutcome, RemoveOutcome};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn current_output_style(force_plain: bool) -> OutputStyle {
    resolve_output_style(force_plain, std::io::stdout().is_terminal())
}

pub(crate) fn resolve_output_style(force_plain: bool, stdout_is_terminal: bool) -> OutputStyle {
    if force_plain || !stdout_is_terminal {
        OutputStyle::Plain
    } else {
        OutputStyle::Rich
    }
}

fn status_badge(status: &str) -> String {
    match status {
        "ok" => "[OK]".to_string(),
        "warn" => "[WARN]".to_string(),
        "error" => "[ERR]".to_string(),
        other => format!("[{}]", other.to_ascii_uppercase()),
    }
}

fn status_style(status: &str) -> Style {
    let color = match status {
        "ok" => AnsiColor::BrightGreen,
        "warn" => AnsiColor::BrightYellow,
        "error" => AnsiColor::BrightRed,
        _ => AnsiColor::BrightBlue,
    };
    Style::new().fg_color(Some(color.into())).effects(Effects::BOLD)
}

fn name_style() -> Style {
    Style::new().effects(Effects::BOLD)
}

fn kind_style(kind: EntryKind) -> Style {
    let color = match kind {
        EntryKind::Binary => AnsiColor::BrightCyan,
        EntryKind::Alias => AnsiColor::BrightMagenta,
    };
    Style::new().fg_color(Some(color.into()))
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}

/// Status line with an ASCII badge in rich mode; the bare message otherwise.
pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => format!("{} {message}", status_badge(status)),
    }
}

/// [`render_status_line`] with the badge coloured, for terminal output.
pub(crate) fn paint_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain if status == "error" => format!("error: {message}"),
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => format!(
            "{} {message}",
            colorize(status_style(status), &status_badge(status))
        ),
    }
}

pub(crate) fn render_warning_line(style: OutputStyle, warning: &str) -> String {
    match style {
        OutputStyle::Plain => format!("warning: {warning}"),
        OutputStyle::Rich => paint_status_line(style, "warn", warning),
    }
}

pub(crate) fn format_install_lines(outcome: &InstallOutcome, style: OutputStyle) -> Vec<String> {
    let message = match (outcome.kind, &outcome.command) {
        (EntryKind::Alias, Some(command)) => format!(
            "created alias {}: {} runs {command}",
            outcome.name,
            outcome.target.display()
        ),
        _ => format!(
            "installed {}: {} -> {}",
            outcome.name,
            outcome.target.display(),
            outcome.source
        ),
    };
    vec![render_status_line(style, "ok", &message)]
}

pub(crate) fn format_remove_lines(outcome: &RemoveOutcome, style: OutputStyle) -> Vec<String> {
    let message = format!(
        "removed {} {}: {}",
        outcome.kind,
        outcome.name,
        outcome.target.display()
    );
    vec![render_status_line(style, "ok", &message)]
}

pub(crate) fn format_list_lines(entries: &[Entry], style: OutputStyle) -> Vec<String> {
    format_list_lines_in(entries, style, &Local)
}

pub(crate) fn format_list_lines_in<Tz>(entries: &[Entry], style: OutputStyle, zone: &Tz) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if entries.is_empty() {
        return vec!["no binaries or aliases registered".to_string()];
    }

    let name_width = entries
        .iter()
        .map(|entry| entry.name.chars().count())
        .max()
        .unwrap_or(0);
    entries
        .iter()
        .map(|entry| {
            let kind = entry.kind();
            let padded_name = format!("{:<name_width$}", entry.name);
            let padded_kind = format!("{:<6}", kind.as_str());
            let (name, kind_label) = match style {
                OutputStyle::Plain => (padded_name, padded_kind),
                OutputStyle::Rich => (
                    colorize(name_style(), &padded_name),
                    colorize(kind_style(kind), &padded_kind),
                ),
            };
            let installed_at = entry
                .installed_at
                .with_timezone(zone)
                .format("%Y-%m-%d %H:%M:%S");
            format!(
                "{name}  {kind_label}  {} -> {}  (installed {installed_at})",
                entry.display_source(),
                entry.target_path.display()
            )
        })
        .collect()
}

pub(crate) fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

pub(crate) fn print_warnings(style: OutputStyle, warnings: &[String]) {
    for warning in warnings {
        eprintln!("{}", render_warning_line(style, warning));
    }
}
