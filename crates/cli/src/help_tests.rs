// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for sectioned help output and colorization.

use super::*;

fn header_wrap(text: &str) -> String {
    format!("\x1b[38;5;{}m{}\x1b[0m", color::codes::HEADER, text)
}

fn literal_wrap(text: &str) -> String {
    format!("\x1b[38;5;{}m{}\x1b[0m", color::codes::LITERAL, text)
}

fn context_wrap(text: &str) -> String {
    format!("\x1b[38;5;{}m{}\x1b[0m", color::codes::CONTEXT, text)
}

#[test]
fn commands_returns_plain_text() {
    assert!(!commands().contains("\x1b["));
}

#[test]
fn template_returns_plain_text() {
    assert!(!template().contains("\x1b["));
}

#[test]
fn after_help_returns_plain_text() {
    assert!(!after_help().contains("\x1b["));
}

#[test]
fn commands_has_resources_section() {
    let result = commands();
    assert!(result.contains("Resources:"));
    assert!(result.contains("  project "));
    assert!(result.contains("  task "));
    assert!(result.contains("  pane "));
    assert!(result.contains("  run "));
}

#[test]
fn commands_has_system_section() {
    let result = commands();
    assert!(result.contains("System:"));
    assert!(result.contains("  config "));
    assert!(result.contains("  system "));
    assert!(result.contains("  daemon "));
}

#[test]
fn colorize_help_applies_header_color() {
    let result = colorize_help("Resources:");
    assert_eq!(result, header_wrap("Resources:"));
}

#[test]
fn colorize_help_applies_usage_color() {
    let result = colorize_help("Usage: ojp [OPTIONS] [COMMAND]");
    assert!(result.starts_with(&header_wrap("Usage:")));
}

#[test]
fn colorize_help_applies_literal_to_commands() {
    let result = colorize_help("  task        Create, derive, and update tasks");
    assert!(result.contains(&literal_wrap("task")));
}

#[test]
fn colorize_help_applies_literal_to_option_flags() {
    let result = colorize_help("  -o, --output <OUTPUT>    Output format [default: text]");
    assert!(result.contains(&literal_wrap("-o")));
    assert!(result.contains(&literal_wrap("--output")));
}

#[test]
fn colorize_help_applies_context_to_placeholders() {
    let result = colorize_help("  -o, --output <OUTPUT>    Output format");
    assert!(result.contains(&context_wrap("<OUTPUT>")));
}

#[test]
fn colorize_help_applies_context_to_defaults() {
    let result = colorize_help("  -o, --output <OUTPUT>    Output format [default: text]");
    assert!(result.contains(&context_wrap("[default: text]")));
}

#[test]
fn colorize_help_skips_existing_ansi() {
    let input = "\x1b[38;5;74mAlready Colored\x1b[0m";
    assert_eq!(colorize_help(input), input);
}

#[test]
fn format_help_produces_output() {
    let help = format_help(crate::cli_command());
    assert!(!help.is_empty());
}

#[test]
fn format_help_ends_with_newline() {
    let help = format_help(crate::cli_command());
    assert!(help.ends_with('\n'));
}
