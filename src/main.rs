//! langctl - inspect a directory of language files
//!
//! Usage:
//!   langctl list                                  # Language ids in the directory
//!   langctl validate [<language>...]              # Validate some or all languages
//!   langctl diff <a> <b>                          # Key and placeholder differences
//!   langctl get <key> [--lang <id>] [--fallback <text>] [--metrics]
//!
//! Every command accepts `--dir <path>` to override the language directory.
//! `get --metrics` also prints the lookup and load counters as JSON.
//!
//! Optional environment variables:
//! - LANGUAGE_DIR (defaults to `Language` next to the executable)
//! - DEFAULT_LANGUAGE (defaults to Chinese)

use anyhow::{bail, Context, Result};
use lang_resources::config::Config;
use lang_resources::i18n::{LanguageRegistry, Localizer};
use serde::Serialize;
use tracing::info;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    List,
    Validate(Vec<String>),
    Diff(String, String),
    Get {
        key: String,
        language: Option<String>,
        fallback: Option<String>,
        metrics: bool,
    },
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    command: Command,
    dir: Option<String>,
}

fn parse_args(raw: &[String]) -> Result<Args> {
    let mut dir = None;
    let mut language = None;
    let mut fallback = None;
    let mut metrics = false;
    let mut positional = Vec::new();

    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--dir" => dir = Some(iter.next().context("--dir requires a path")?.clone()),
            "--lang" => language = Some(iter.next().context("--lang requires a language")?.clone()),
            "--fallback" => {
                fallback = Some(iter.next().context("--fallback requires a value")?.clone())
            }
            "--metrics" => metrics = true,
            other if other.starts_with("--") => bail!("Unknown option: {}", other),
            other => positional.push(other.to_string()),
        }
    }

    let (name, rest) = match positional.split_first() {
        Some((name, rest)) => (name.as_str(), rest),
        None => bail!("Missing command. Expected one of: list, validate, diff, get"),
    };

    let command = match (name, rest) {
        ("list", []) => Command::List,
        ("list", _) => bail!("Usage: langctl list"),
        ("validate", languages) => Command::Validate(languages.to_vec()),
        ("diff", [a, b]) => Command::Diff(a.clone(), b.clone()),
        ("diff", _) => bail!("Usage: langctl diff <a> <b>"),
        ("get", [key]) => Command::Get {
            key: key.clone(),
            language,
            fallback,
            metrics,
        },
        ("get", _) => bail!("Usage: langctl get <key> [--lang <id>] [--fallback <text>] [--metrics]"),
        (other, _) => bail!("Unknown command: {}", other),
    };

    Ok(Args { command, dir })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lang_resources=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&raw)?;

    let mut config = Config::from_env()?;
    if let Some(dir) = args.dir {
        config.language_dir = dir.into();
    }
    info!("Using language directory {}", config.language_dir.display());

    let registry = LanguageRegistry::new(&config.language_dir);

    match args.command {
        Command::List => print_json(&registry.list_available())?,
        Command::Validate(languages) => {
            let results = if languages.is_empty() {
                registry.validate_all().await
            } else {
                languages.iter().map(|l| registry.validate(l)).collect()
            };
            let invalid = results.iter().filter(|r| !r.is_valid).count();
            print_json(&results)?;
            if invalid > 0 {
                bail!("{} of {} language files are invalid", invalid, results.len());
            }
        }
        Command::Diff(a, b) => print_json(&registry.compare(&a, &b))?,
        Command::Get {
            key,
            language,
            fallback,
            metrics,
        } => {
            if let Some(language) = language {
                config.default_language = language;
            }
            let localizer = Localizer::new(&config);
            if !localizer.is_loaded() {
                bail!(
                    "Language '{}' could not be loaded from {}",
                    config.default_language,
                    config.language_dir.display()
                );
            }
            println!("{}", localizer.get_text(&key, fallback.as_deref()));
            if metrics {
                print_json(&localizer.metrics().report())?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_list() {
        let parsed = parse_args(&args(&["list"])).expect("Should parse");
        assert_eq!(parsed.command, Command::List);
        assert_eq!(parsed.dir, None);
    }

    #[test]
    fn test_parse_validate_with_dir() {
        let parsed = parse_args(&args(&["validate", "English", "--dir", "/tmp/lang"]))
            .expect("Should parse");
        assert_eq!(parsed.command, Command::Validate(vec!["English".to_string()]));
        assert_eq!(parsed.dir, Some("/tmp/lang".to_string()));
    }

    #[test]
    fn test_parse_diff_requires_two_languages() {
        assert!(parse_args(&args(&["diff", "English"])).is_err());
        let parsed = parse_args(&args(&["diff", "A", "B"])).expect("Should parse");
        assert_eq!(parsed.command, Command::Diff("A".to_string(), "B".to_string()));
    }

    #[test]
    fn test_parse_get_with_options() {
        let parsed = parse_args(&args(&["get", "App.Name", "--lang", "English", "--fallback", "n/a"]))
            .expect("Should parse");
        assert_eq!(
            parsed.command,
            Command::Get {
                key: "App.Name".to_string(),
                language: Some("English".to_string()),
                fallback: Some("n/a".to_string()),
                metrics: false,
            }
        );
    }

    #[test]
    fn test_parse_get_with_metrics() {
        let parsed = parse_args(&args(&["get", "--metrics", "App.Name"])).expect("Should parse");
        assert_eq!(
            parsed.command,
            Command::Get {
                key: "App.Name".to_string(),
                language: None,
                fallback: None,
                metrics: true,
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["explode"])).is_err());
        assert!(parse_args(&args(&["list", "--verbose"])).is_err());
        assert!(parse_args(&args(&["list", "--dir"])).is_err());
    }
}
