//! Error rendering using ariadne
//!
//! Parse errors are drawn over the source they refer to; other errors have
//! no location and are printed as a single line with their code.

use crate::Error;
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use miette::Diagnostic;
use std::io::Write;
use stutter_core::parser::ParseError;

/// Render an error to stderr
///
/// # Example
/// ```no_run
/// use stutter::{BackendKind, compile_source, render_error};
///
/// if let Err(e) = compile_source("1 + + 2", BackendKind::Stack) {
///     render_error(&e);
/// }
/// ```
pub fn render_error(error: &Error) {
    render_error_to_writer(error, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, writer, true)
}

/// Render an error to a String (useful for tests, logs, etc.)
pub fn render_error_to_string(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error {
        Error::Parse { error, input } => render_parse_error(input, error, writer, use_color),
        Error::Compile(err) => render_plain(err, writer),
        Error::Execution(err) => render_plain(err, writer),
    }
}

fn render_parse_error(
    source: &str,
    error: &ParseError,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    let message = error.to_string();
    let span = error.span.0.clone();

    let mut report = Report::build(ReportKind::Error, ("<input>", span.clone()))
        .with_message(&message)
        .with_config(ariadne::Config::default().with_color(use_color));

    if let Some(code) = error.code() {
        report = report.with_code(code);
    }

    report = report.with_label(
        Label::new(("<input>", span))
            .with_message(&message)
            .with_color(colors.next()),
    );

    if let Some(help) = error.hint() {
        report = report.with_help(help);
    }

    report
        .finish()
        .write(("<input>", Source::from(source)), &mut *writer)
}

fn render_plain(error: &dyn Diagnostic, writer: &mut dyn Write) -> std::io::Result<()> {
    match error.code() {
        Some(code) => writeln!(writer, "Error[{code}]: {error}")?,
        None => writeln!(writer, "Error: {error}")?,
    }
    if let Some(help) = error.help() {
        writeln!(writer, "help: {help}")?;
    }
    Ok(())
}
