//! Terminal output of the `xcsettings` commands.
//!
//! Progress lines go to stdout and problems to stderr. Each line carries a
//! colored marker when the stream supports color.

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{AnsiColors, OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

/// What a printed line reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
  /// An xcconfig file was written.
  Wrote,
  /// A command finished.
  Done,
  /// A setting was dropped from the merged overrides.
  Conflict,
  /// The command failed.
  Failure,
}

impl Line {
  fn marker(self) -> &'static str {
    match self {
      Line::Wrote => "→",
      Line::Done => "✓",
      Line::Conflict => "⚠",
      Line::Failure => "✗",
    }
  }

  fn color(self) -> AnsiColors {
    match self {
      Line::Wrote => AnsiColors::Blue,
      Line::Done => AnsiColors::Green,
      Line::Conflict => AnsiColors::Yellow,
      Line::Failure => AnsiColors::Red,
    }
  }

  fn is_problem(self) -> bool {
    matches!(self, Line::Conflict | Line::Failure)
  }
}

pub fn emit(line: Line, message: &str) {
  let color = line.color();
  if line.is_problem() {
    eprintln!(
      "{} {}",
      line.marker().if_supports_color(Stream::Stderr, |m| m.color(color)),
      message.if_supports_color(Stream::Stderr, |m| m.color(color))
    );
  } else {
    println!(
      "{} {}",
      line.marker().if_supports_color(Stream::Stdout, |m| m.color(color)),
      message
    );
  }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
