//! Command-line entry point for mindmark.
//!
//! # Responsibility
//! - Drive a headless editing session from files or stdin.
//! - Write export artifacts and print normalized markdown or preview HTML.
//!
//! # Invariants
//! - The outline-service API key is never printed.
//! - Input `-` reads stdin.

use anyhow::{anyhow, bail, Context, Result};
use log::info;
use mindmark_core::{
    build_request, core_version, init_logging, normalize, AppConfig, ExportFormat,
    MindMapExporter, SyncController,
};
use std::io::Read;
use std::path::{Path, PathBuf};

const USAGE: &str = "\
usage: mindmark [--config FILE] <command>

commands:
  normalize <input>             print canonical markdown
  export <input> [--format svg|png|jpg|xmind|md|all] [--out DIR] [--markdown]
  preview <input>               print rendered HTML
  prompt <topic>                print the outline request body
  version

<input> may be `-` for stdin.";

#[derive(Debug, PartialEq)]
enum Command {
    Normalize {
        input: String,
    },
    Export {
        input: String,
        formats: Vec<ExportFormat>,
        out: Option<PathBuf>,
        markdown: bool,
    },
    Preview {
        input: String,
    },
    Prompt {
        topic: String,
    },
    Version,
    Help,
}

#[derive(Debug, PartialEq)]
struct Invocation {
    config: Option<PathBuf>,
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let invocation = parse_args(std::env::args().skip(1))?;
    match invocation.command {
        Command::Version => {
            println!("mindmark {}", core_version());
            return Ok(());
        }
        Command::Help => {
            println!("{USAGE}");
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(invocation.config.as_deref())?;
    if let Some(dir) = &config.log_dir {
        init_logging(&config.log_level, dir).context("failed to start logging")?;
    }

    match invocation.command {
        Command::Normalize { input } => {
            println!("{}", normalize(&read_input(&input)?));
        }
        Command::Preview { input } => {
            let mut session = SyncController::from_config(&config);
            session.on_raw_text_edit(read_input(&input)?);
            print!("{}", session.preview_html());
        }
        Command::Prompt { topic } => {
            let request = build_request(&config.outline_service, &topic)?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        Command::Export {
            input,
            formats,
            out,
            markdown,
        } => {
            let mut config = config;
            if let Some(dir) = out {
                config.export_dir = dir;
            }
            let text = read_input(&input)?;
            run_export(&config, text, &formats, markdown).await?;
        }
        Command::Version | Command::Help => {}
    }
    Ok(())
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Invocation> {
    let mut args = args.into_iter();
    let mut config = None;
    let mut positional = Vec::new();
    let mut formats = Vec::new();
    let mut out = None;
    let mut markdown = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args.next().context("--config expects a file path")?;
                config = Some(PathBuf::from(value));
            }
            "--format" => {
                let value = args.next().context("--format expects a value")?;
                formats.extend(parse_formats(&value)?);
            }
            "--out" => {
                let value = args.next().context("--out expects a directory")?;
                out = Some(PathBuf::from(value));
            }
            "--markdown" => markdown = true,
            "-h" | "--help" => positional.insert(0, "help".to_string()),
            flag if flag.starts_with("--") => bail!("unknown option `{flag}`\n\n{USAGE}"),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let name = positional.next().unwrap_or_else(|| "help".to_string());
    let mut operand = |what: &str| {
        positional
            .next()
            .ok_or_else(|| anyhow!("`{name}` expects {what}\n\n{USAGE}"))
    };

    let command = match name.as_str() {
        "normalize" => Command::Normalize {
            input: operand("an input")?,
        },
        "preview" => Command::Preview {
            input: operand("an input")?,
        },
        "prompt" => Command::Prompt {
            topic: operand("a topic")?,
        },
        "export" => Command::Export {
            input: operand("an input")?,
            formats: if formats.is_empty() {
                ExportFormat::ALL.to_vec()
            } else {
                formats
            },
            out,
            markdown,
        },
        "version" => Command::Version,
        "help" => Command::Help,
        other => bail!("unknown command `{other}`\n\n{USAGE}"),
    };

    Ok(Invocation { config, command })
}

fn parse_formats(value: &str) -> Result<Vec<ExportFormat>> {
    if value.trim().eq_ignore_ascii_case("all") {
        return Ok(ExportFormat::ALL.to_vec());
    }
    value
        .split(',')
        .map(|name| ExportFormat::parse(name).ok_or_else(|| anyhow!("unknown format `{name}`")))
        .collect()
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("failed to load config `{}`", path.display()))?,
        None => AppConfig::default(),
    };
    config.apply_env();
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        return Ok(buffer);
    }
    std::fs::read_to_string(input).with_context(|| format!("failed to read `{input}`"))
}

async fn run_export(
    config: &AppConfig,
    text: String,
    formats: &[ExportFormat],
    as_markdown: bool,
) -> Result<()> {
    let mut session = SyncController::from_config(config);
    if as_markdown {
        session.on_markdown_edit(text);
    } else {
        session.on_raw_text_edit(text);
    }

    let exporter = session.exporter();
    let mut written = 0usize;
    for format in formats {
        let path = match format {
            ExportFormat::Svg => exporter.export_vector()?,
            ExportFormat::Png => exporter.export_raster_primary().await?,
            ExportFormat::Jpeg => exporter.export_raster_secondary().await?,
            ExportFormat::Interchange => Some(exporter.export_interchange()?),
            ExportFormat::Markdown => Some(exporter.export_markdown()?),
        };
        match path {
            Some(path) => {
                written += 1;
                println!("{}", path.display());
            }
            None => eprintln!(
                "skipped {}: nothing has been rendered yet",
                format.as_str()
            ),
        }
    }
    info!(
        "event=cli_export module=cli status=ok requested={} written={}",
        formats.len(),
        written
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_args, parse_formats, Command};
    use mindmark_core::ExportFormat;
    use std::path::PathBuf;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn export_defaults_to_all_formats() {
        let invocation = parse_args(args(&["export", "notes.txt"])).unwrap();
        assert_eq!(
            invocation.command,
            Command::Export {
                input: "notes.txt".to_string(),
                formats: ExportFormat::ALL.to_vec(),
                out: None,
                markdown: false,
            }
        );
    }

    #[test]
    fn options_may_appear_anywhere() {
        let invocation = parse_args(args(&[
            "--config",
            "mindmark.json",
            "export",
            "--format",
            "png,md",
            "-",
            "--out",
            "build",
            "--markdown",
        ]))
        .unwrap();
        assert_eq!(invocation.config, Some(PathBuf::from("mindmark.json")));
        assert_eq!(
            invocation.command,
            Command::Export {
                input: "-".to_string(),
                formats: vec![ExportFormat::Png, ExportFormat::Markdown],
                out: Some(PathBuf::from("build")),
                markdown: true,
            }
        );
    }

    #[test]
    fn missing_operands_and_unknown_values_fail() {
        assert!(parse_args(args(&["normalize"])).is_err());
        assert!(parse_args(args(&["draw", "x"])).is_err());
        assert!(parse_args(args(&["export", "x", "--verbose"])).is_err());
        assert!(parse_formats("gif").is_err());
        assert_eq!(parse_formats("ALL").unwrap().len(), 5);
    }

    #[test]
    fn no_arguments_prints_help() {
        assert_eq!(parse_args(Vec::new()).unwrap().command, Command::Help);
    }
}
