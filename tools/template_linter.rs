/// Template Linter — checks template syntax and feature resolution.
///
/// Usage: template_linter <template> [<template> ...]
///
/// Each template is parsed and resolved; fatal errors and conflict
/// warnings are printed per template with a summary at the end.

use std::process;

use syntagma::core::parser::Template;
use syntagma::core::resolver::resolve;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: template_linter <template> [<template> ...]");
        process::exit(0);
    }

    let mut errors = 0usize;
    let mut warnings = 0usize;

    for raw in &args[1..] {
        println!("template: {}", raw);
        let template = match Template::parse(raw) {
            Ok(template) => template,
            Err(e) => {
                println!("  ERROR: {}", e);
                errors += 1;
                continue;
            }
        };
        match resolve(&template) {
            Ok(resolved) => {
                println!(
                    "  OK: {} group(s), {} lexical(s)",
                    resolved.groups.len(),
                    resolved.lexical_count()
                );
                for warning in &resolved.warnings {
                    println!("  WARNING: {}", warning);
                    warnings += 1;
                }
                println!("  normalized: {}", resolved.to_v1());
            }
            Err(e) => {
                println!("  ERROR: {}", e);
                errors += 1;
            }
        }
    }

    println!("\nSummary: {} errors, {} warnings", errors, warnings);
    if errors > 0 {
        process::exit(1);
    }
}
