//! Human-readable and JSON rendering of a [`RunReport`].

use aegis_domain::{CaseResult, RunReport, SuiteResult};

pub fn print_json(report: &RunReport) {
    match serde_json::to_string_pretty(report) {
        Ok(rendered) => println!("{rendered}"),
        Err(err) => eprintln!("failed to serialize run report: {err}"),
    }
}

pub fn print_human(report: &RunReport, quiet: bool, verbose: bool, timing: bool) {
    for suite in &report.suites {
        print_suite(suite, quiet, verbose, timing);
    }

    println!();
    println!(
        "{} passed, {} failed ({} total) in {}ms",
        report.passed,
        report.failed,
        report.passed + report.failed,
        report.total_duration_ms
    );
}

fn print_suite(suite: &SuiteResult, quiet: bool, verbose: bool, timing: bool) {
    if quiet && suite.all_passed() {
        return;
    }
    println!("{}", suite.description);
    for case in &suite.results {
        print_case(case, verbose, timing);
    }
}

fn print_case(case: &CaseResult, verbose: bool, timing: bool) {
    let mark = if case.is_passed() { "ok" } else { "FAIL" };
    let suffix = if timing { format!(" ({}ms)", case.duration_ms) } else { String::new() };
    println!("  [{mark}] {}{suffix}", case.description);

    if !case.is_passed() {
        if let Some(message) = &case.error_message {
            println!("        {message}");
        }
        if let Some(validation) = &case.validation {
            for error in &validation.errors {
                println!("        at {}: {}", error.path, error.message);
            }
        }
    } else if verbose {
        if let Some(actual) = &case.actual {
            println!("        {actual}");
        }
    }
}
