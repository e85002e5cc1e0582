//! Preview the hybrid parser from the command line
//!
//! ```text
//! parse_event "Team lunch at Pizzeria Delfina tomorrow at noon" --tz America/Los_Angeles
//! ```
//!
//! Prints the parsed event as JSON on stdout.

use anyhow::{Context, Result, bail};
use eventparse::env_manager::{self, OPTIONAL_ENV_VARS};
use eventparse::{Config, HybridOrchestrator};
use log::{error, info};

#[derive(Debug)]
struct Args {
    text: String,
    timezone: Option<String>,
}

impl Args {
    fn parse(mut raw: impl Iterator<Item = String>) -> Result<Self> {
        let mut words = Vec::new();
        let mut timezone = None;

        while let Some(arg) = raw.next() {
            match arg.as_str() {
                "--tz" => {
                    timezone = Some(raw.next().context("--tz needs an IANA timezone name")?);
                }
                flag if flag.starts_with("--") => bail!("Unknown flag: {}", flag),
                _ => words.push(arg),
            }
        }

        if words.is_empty() {
            bail!("No event text given");
        }
        Ok(Self { text: words.join(" "), timezone })
    }
}

fn usage() -> String {
    format!(
        "Usage: parse_event \"<text>\" [--tz <IANA timezone>]\n\nOptional environment variables: {}",
        OPTIONAL_ENV_VARS.join(", ")
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    env_manager::load_env_file();
    eventparse::init_logger();

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}\n\n{}", e, usage());
            std::process::exit(2);
        }
    };

    let config = Config::load()?;
    let timezone = args.timezone.unwrap_or_else(|| config.parser.default_timezone.clone());
    info!("Parsing in timezone {}", timezone);

    let orchestrator = HybridOrchestrator::from_config(&config)?;
    match orchestrator.parse_with_source(&args.text, &timezone).await {
        Ok((event, source)) => {
            info!("Event produced by {:?} extractor", source);
            println!("{}", serde_json::to_string_pretty(&event)?);
            Ok(())
        }
        Err(e) => {
            error!("Failed to parse event: {}", e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Result<Args> {
        Args::parse(raw.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_args_join_words_and_read_timezone() {
        let parsed = args(&["Lunch", "at", "noon", "--tz", "Europe/Paris"]).unwrap();
        assert_eq!(parsed.text, "Lunch at noon");
        assert_eq!(parsed.timezone.as_deref(), Some("Europe/Paris"));
    }

    #[test]
    fn test_args_errors() {
        assert!(args(&[]).is_err());
        assert!(args(&["Lunch", "--tz"]).is_err());
        assert!(args(&["Lunch", "--verbose"]).is_err());
    }
}
