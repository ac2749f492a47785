use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use hce_ipa::cli::{Cli, Commands, ConfigAction};
use hce_ipa::config::Config;
use hce_ipa::output::{
    render_accept, render_outcome, render_results, render_reverse, render_stats,
    render_system_info,
};
use hce_ipa::{Dialect, Engine, InteractionType};
use owo_colors::OwoColorize;
use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match cli.command {
        Commands::Config { action } => {
            return handle_config_command(action, cli.config.as_deref());
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "hce-ipa", &mut std::io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.paths.data_dir = Some(dir);
    }
    if let Some(tag) = cli.dialect {
        config.dialect.tag = tag;
    }
    if cli.no_synth {
        config.synthesizer.enabled = false;
    }
    if let Some(millis) = cli.timeout {
        config.synthesizer.timeout_ms = millis;
    }
    let mut engine = Engine::from_config(&config).context("Failed to start engine")?;

    match cli.command {
        Commands::Resolve { text, json } => {
            let results = engine.resolve(&text.join(" "));
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                println!("{}", render_results(&results));
                println!();
                println!("{}", hce_ipa::assemble(&results).bold());
            }
        }
        Commands::Select { word, index } => {
            let results = engine.resolve(&word);
            let Some(result) = results.into_iter().find(|r| r.token.is_word) else {
                bail!("'{word}' has no letters or digits to transcribe");
            };
            let Some(ipa) = result.candidates.options.get(index) else {
                bail!(
                    "'{word}' has {} candidates, index {index} is out of range",
                    result.candidates.options.len()
                );
            };
            let outcome = engine.record_interaction(&word, ipa, InteractionType::Selection);
            print_warnings(&outcome.warnings);
            println!("{}", render_outcome(&result.token.clean, ipa, &outcome));
        }
        Commands::Correct { word, ipa } => {
            let outcome = engine.record_interaction(&word, &ipa, InteractionType::ManualCorrection);
            print_warnings(&outcome.warnings);
            println!("{}", render_outcome(&word, &ipa, &outcome));
        }
        Commands::Accept { text, corrections } => {
            let text = text.join(" ");
            let mut results = engine.resolve(&text);
            for (word, ipa) in &corrections {
                let key = hce_ipa::text::clean_word(word);
                let mut matched = false;
                for result in results.iter_mut().filter(|r| r.token.clean == key) {
                    result.correct(ipa);
                    matched = true;
                }
                if !matched {
                    bail!("'{word}' does not appear in the sentence");
                }
            }
            let summary = engine.accept_all(&text, &results);
            print_warnings(&summary.warnings);
            println!("{}", render_accept(&summary));
        }
        Commands::Save { word, ipa } => {
            engine
                .force_save(&word, &ipa)
                .with_context(|| format!("Failed to save override for '{word}'"))?;
            println!("{}", format!("Saved override: {word} → {ipa}").green());
        }
        Commands::Reverse {
            ipa,
            prefer,
            limit,
            json,
        } => {
            let preferred = prefer.as_deref().map(Dialect::from);
            let segments = engine.reverse_lookup_phrase(&ipa.join(" "), preferred.as_ref(), limit);
            if json {
                println!("{}", serde_json::to_string_pretty(&segments)?);
            } else {
                println!("{}", render_reverse(&segments));
            }
        }
        Commands::Teach {
            word,
            ipa,
            as_dialect,
        } => {
            engine
                .teach(&word, &ipa, Dialect::from(as_dialect.as_str()))
                .with_context(|| format!("Failed to teach '{word}'"))?;
            println!("{}", format!("Learned {word} → {ipa} ({as_dialect})").green());
        }
        Commands::Stats { json } => {
            let stats = engine.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{}", render_stats(&stats));
            }
        }
        Commands::RebuildOverrides => {
            let (written, warnings) = engine.rebuild_overrides();
            print_warnings(&warnings);
            println!("Rebuilt {written} overrides from the learning ledger");
        }
        Commands::Reset { yes } => {
            if !yes && !confirm("Delete all overrides, learning history and custom pronunciations?")? {
                println!("Aborted.");
                return Ok(());
            }
            engine.clear_all().context("Failed to clear learned data")?;
            println!("{}", "All learned data cleared.".green());
        }
        Commands::Check => {
            println!("{}", render_system_info(&engine.system_info()));
        }
        Commands::Config { .. } | Commands::Completions { .. } => {}
    }
    Ok(())
}

/// `-q` → error, default → warn, `-v` → info, `-vv` → debug. `RUST_LOG` wins.
fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hce_ipa={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let path = custom_path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    Ok(config.with_env_overrides())
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("{}", format!("Warning: {warning}").yellow());
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        bail!("Refusing to reset without a terminal; pass --yes");
    }
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Handle configuration commands.
fn handle_config_command(action: ConfigAction, custom_path: Option<&Path>) -> Result<()> {
    let config_path = custom_path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);

    match action {
        ConfigAction::Get { key } => {
            let config = load_config(custom_path)?;
            println!("{}", config.get_value_by_path(&key)?);
        }
        ConfigAction::Set { key, value } => {
            Config::set_value_by_path(&config_path, &key, &value)?;
            println!("Set {} = {}", key, value);
        }
        ConfigAction::List => {
            let config = load_config(custom_path)?;
            print!("{}", config.to_display_toml()?);
        }
        ConfigAction::Dump => {
            print!("{}", Config::dump_template());
        }
    }
    Ok(())
}
