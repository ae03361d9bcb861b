use chrono::Local;
use clap::{Arg, Command};
use log::LevelFilter;
use packet_practice::analyze::problems::standard_registry;
use packet_practice::{Analyzer, Config, MemoryStore, Outcome, Session};
use std::process;

#[tokio::main]
async fn main() {
    let matches = Command::new("packet-practice")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Analyze packet radio practice check-in messages")
        .long_about(
            "Analyzes messages retrieved from a packet BBS for a weekly practice session,\n\
             scores them, and composes the delivery receipts and problem reports to send\n\
             back to their senders.",
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/packet-practice.yaml"),
        )
        .arg(
            Arg::new("session")
                .short('s')
                .long("session")
                .value_name("FILE")
                .help("Practice session description (YAML)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("bbs")
                .short('b')
                .long("bbs")
                .value_name("NAME")
                .help("BBS the messages were retrieved from")
                .default_value("W4XSC"),
        )
        .arg(
            Arg::new("store")
                .long("store")
                .value_name("FILE")
                .help("JSON file holding analyzed messages, kept across runs")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Test configuration validity")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-problems")
                .long("list-problems")
                .help("List the registered problems in evaluation order")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .short('n')
                .long("dry-run")
                .help("Analyze without recording the messages")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("messages")
                .value_name("MESSAGE")
                .help("Raw message files to analyze")
                .num_args(0..),
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

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let registry = match standard_registry() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Problem registry is broken: {e}");
            process::exit(1);
        }
    };

    if matches.get_flag("list-problems") {
        for (i, problem) in registry.ordered().iter().enumerate() {
            println!("{:2}. {:<22} {}", i + 1, problem.code, problem.label);
        }
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("/etc/packet-practice.yaml");
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        println!("Testing configuration {config_path}...");
        match config.validate(&registry) {
            Ok(()) => {
                println!("Configuration is valid.");
                println!("Message types: {}", config.message_types.len());
                println!("Jurisdictions: {}", config.jurisdictions.len());
                println!("Problem action overrides: {}", config.problems.len());
            }
            Err(e) => {
                println!("Configuration validation failed:");
                println!("Error: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let Some(session_path) = matches.get_one::<String>("session") else {
        eprintln!("A practice session file is required (--session FILE)");
        process::exit(1);
    };
    let session = match Session::from_file(session_path) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error loading session {session_path}: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = config.validate(&registry) {
        eprintln!("{e}");
        process::exit(1);
    }
    let analyzer = match Analyzer::with_registry(config, registry) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            eprintln!("Error creating analyzer: {e:#}");
            process::exit(1);
        }
    };

    let store_path = matches.get_one::<String>("store");
    let store = match store_path {
        Some(path) => match MemoryStore::load(path) {
            Ok(store) => store,
            Err(e) => {
                eprintln!("Error loading store: {e:#}");
                process::exit(1);
            }
        },
        None => MemoryStore::new(),
    };

    let bbs = matches
        .get_one::<String>("bbs")
        .map(|b| b.to_uppercase())
        .unwrap_or_default();
    let dry_run = matches.get_flag("dry-run");
    let files: Vec<&String> = matches
        .get_many::<String>("messages")
        .map(|files| files.collect())
        .unwrap_or_default();
    if files.is_empty() {
        log::warn!("No message files given");
    }

    let mut failed = false;
    for file in files {
        if let Err(e) = analyze_file(&analyzer, &store, &session, &bbs, file, dry_run).await {
            eprintln!("Error analyzing {file}: {e:#}");
            failed = true;
        }
    }

    if let (Some(path), false) = (store_path, dry_run) {
        if let Err(e) = store.save(path) {
            eprintln!("Error saving store: {e:#}");
            process::exit(1);
        }
    }
    if failed {
        process::exit(1);
    }
}

async fn analyze_file(
    analyzer: &Analyzer,
    store: &MemoryStore,
    session: &Session,
    bbs: &str,
    file: &str,
    dry_run: bool,
) -> anyhow::Result<()> {
    use anyhow::Context;

    let raw = std::fs::read_to_string(file).with_context(|| format!("reading {file}"))?;
    let outcome = analyzer.analyze(store, session, bbs, &raw).await?;
    let analysis = match &outcome {
        Outcome::AlreadyHandled { local_id } => {
            println!("{file}: already handled as {local_id}");
            return Ok(());
        }
        Outcome::Analyzed(analysis) => analysis,
    };

    println!(
        "{file}: {} {} score {}/{}{}",
        analysis.local_id,
        analysis.summary,
        analysis.score,
        analysis.out_of,
        if analysis.counted() { "" } else { " (not counted)" }
    );
    for fired in &analysis.fired {
        println!("  - {} ({})", fired.code, fired.label);
    }

    let now = Local::now().fixed_offset();
    for mut response in outcome.responses(store, now)? {
        println!();
        println!("To: {}", response.to);
        println!("Subject: {}", response.subject);
        println!();
        print!("{}", response.body);
        response.mark_sent(now);
        log::debug!("Response {} to {} composed", response.local_id, response.response_to);
    }

    if dry_run {
        log::info!("Dry run: {} not recorded", analysis.local_id);
    } else {
        outcome.commit(store)?;
    }
    Ok(())
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file(path)
    } else {
        log::warn!("Configuration file '{path}' not found, using default configuration");
        Ok(Config::default())
    }
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e}");
            process::exit(1);
        }
    }
}
