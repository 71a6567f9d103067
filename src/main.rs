use clap::{Arg, ArgAction, Command};
use log::LevelFilter;
use phish_scorer::{RuleSet, ScanInput, ScanResult, ScorerEngine};
use std::io::Read;
use std::process;

fn main() {
    let matches = Command::new("phish-scorer")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Rule-based phishing email scorer")
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("Path to a file containing the email body, or '-' for stdin")
                .required_unless_present("generate-config"),
        )
        .arg(
            Arg::new("threshold")
                .short('t')
                .long("threshold")
                .value_name("FLOAT")
                .help("Detection threshold in [0, 1]")
                .default_value("0.5"),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .value_name("ADDR")
                .help("Sender address (or full From: header value)"),
        )
        .arg(
            Arg::new("subject")
                .long("subject")
                .value_name("TEXT")
                .help("Subject line to scan alongside the body"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Ruleset file (YAML); defaults to the built-in rules"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Write the default ruleset to a file and exit")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the scan result as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(path) = matches.get_one::<String>("generate-config") {
        if let Err(e) = RuleSet::default().to_file(path) {
            eprintln!("Error writing ruleset: {e}");
            process::exit(1);
        }
        println!("Default ruleset written to {path}");
        return;
    }

    let ruleset = match matches.get_one::<String>("config") {
        Some(path) => match RuleSet::from_file(path) {
            Ok(ruleset) => ruleset,
            Err(e) => {
                eprintln!("Error loading ruleset from {path}: {e}");
                process::exit(1);
            }
        },
        None => RuleSet::default(),
    };

    let engine = match ScorerEngine::new(ruleset) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error building scorer: {e}");
            process::exit(1);
        }
    };
    log::debug!("scoring with {} rules", engine.ruleset().rules.len());

    let threshold_raw = matches.get_one::<String>("threshold").unwrap();
    let threshold: f64 = match threshold_raw.parse() {
        Ok(value) => value,
        Err(_) => {
            eprintln!("Error: threshold '{threshold_raw}' is not a number");
            process::exit(1);
        }
    };

    let file = matches.get_one::<String>("file").unwrap();
    let bytes = match read_input(file) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {file}: {e}");
            process::exit(1);
        }
    };

    let mut input = match ScanInput::from_bytes(&bytes) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    if let Some(sender) = matches.get_one::<String>("from") {
        input = input.with_sender(sender);
    }
    if let Some(subject) = matches.get_one::<String>("subject") {
        input = input.with_subject(subject);
    }

    let result = match engine.scan(&input, threshold) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    if matches.get_flag("json") {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing result: {e}");
                process::exit(1);
            }
        }
    } else {
        print_result(&result);
    }
}

fn read_input(path: &str) -> std::io::Result<Vec<u8>> {
    if path == "-" {
        let mut bytes = Vec::new();
        std::io::stdin().read_to_end(&mut bytes)?;
        Ok(bytes)
    } else {
        std::fs::read(path)
    }
}

fn print_result(result: &ScanResult) {
    println!("phishing_score: {:.3}", result.score);
    println!(
        "verdict: {}",
        if result.verdict { "PHISHING" } else { "LEGIT" }
    );
    if result.matched_rules.is_empty() {
        println!("matched rules: none");
    } else {
        println!("matched rules:");
        for name in &result.matched_rules {
            println!("  - {name}");
        }
    }
}
