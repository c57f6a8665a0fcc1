mod cli;
mod report;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use aegis_client::Client;
use cli::{Cli, Command, DEFAULT_CONFIG_PATH, DEFAULT_SUITE_GLOB};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let debug = matches!(&cli.command, Command::Run { debug: true, .. });
    init_tracing(debug);

    let exit_code = match cli.command {
        Command::Run {
            globs,
            config,
            quiet,
            verbose,
            timing,
            debug: _,
            json,
        } => run_command(globs, config, quiet, verbose, timing, json).await,
        Command::Query { config, tool, args } => query_command(config, tool, args).await,
    };

    std::process::exit(exit_code);
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "aegis=debug" } else { "aegis=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();
}

async fn run_command(
    globs: Vec<String>,
    config_path: Option<String>,
    quiet: bool,
    verbose: bool,
    timing: bool,
    json: bool,
) -> i32 {
    let globs = if globs.is_empty() { vec![DEFAULT_SUITE_GLOB.to_string()] } else { globs };
    let config_path = config_path.unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = match aegis_runner::load_config(std::path::Path::new(&config_path)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return 2;
        }
    };

    let report = match aegis_runner::run(&globs, &config).await {
        Ok(report) => report,
        Err(err) => {
            eprintln!("error: {err}");
            return 2;
        }
    };

    if json {
        report::print_json(&report);
    } else {
        report::print_human(&report, quiet, verbose, timing);
    }

    if report.all_passed() {
        0
    } else {
        1
    }
}

async fn query_command(config_path: String, tool: String, args: Option<String>) -> i32 {
    let config = match aegis_runner::load_config(std::path::Path::new(&config_path)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return 2;
        }
    };

    let arguments = match args {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                eprintln!("error: invalid --args JSON: {err}");
                return 2;
            }
        },
        None => serde_json::json!({}),
    };

    let client = match Client::connect(&config).await {
        Ok(client) => client,
        Err(err) => {
            eprintln!("error: {err}");
            return 1;
        }
    };

    let result = client.call_tool(&tool, arguments, None).await;
    client.disconnect().await;

    match result {
        Ok(tool_result) => {
            match serde_json::to_string_pretty(&tool_result) {
                Ok(rendered) => println!("{rendered}"),
                Err(err) => eprintln!("error: {err}"),
            }
            0
        }
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}
