//! manga2epub CLI
//!
//! Sends a manga PDF to the conversion service and saves the Kindle EPUB.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use manga2epub_lib::console::ConsoleView;
use manga2epub_lib::form::FILE_FIELD;
use manga2epub_lib::health::check_health;
use manga2epub_lib::{ClientSettings, ConvertHandler, FileField, FormData};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the conversion service
    #[arg(long, global = true)]
    server: Option<String>,

    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a PDF into a Kindle EPUB
    Convert(ConvertArgs),
    /// Check that the service is up
    Health,
}

#[derive(clap::Args, Debug)]
struct ConvertArgs {
    /// PDF to convert
    input: PathBuf,

    /// Target device resolution as WxH
    #[arg(short, long)]
    profile: Option<String>,

    /// Book title
    #[arg(short, long)]
    title: Option<String>,

    /// Book author
    #[arg(short, long)]
    author: Option<String>,

    /// JPEG quality of the page images
    #[arg(short = 'q', long)]
    jpeg_quality: Option<String>,

    /// Left-to-right page order
    #[arg(long)]
    ltr: bool,

    /// Keep the dark page borders
    #[arg(long)]
    no_autocrop: bool,

    /// Keep double pages whole
    #[arg(long)]
    no_split_double: bool,

    /// Extra form field as name=value (repeatable)
    #[arg(long = "field", value_parser = parse_field)]
    fields: Vec<(String, String)>,

    /// Directory the EPUB is saved into
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))?;
    if name.is_empty() {
        return Err(format!("empty field name in '{}'", raw));
    }
    Ok((name.to_string(), value.to_string()))
}

fn build_form(args: &ConvertArgs) -> FormData {
    let mut form = FormData::new();
    form.append(FILE_FIELD, FileField::from_path(&args.input));
    if let Some(title) = &args.title {
        form.append("title", title.as_str());
    }
    if let Some(author) = &args.author {
        form.append("author", author.as_str());
    }
    if let Some(quality) = &args.jpeg_quality {
        form.append("jpeg_quality", quality.as_str());
    }
    if args.ltr {
        form.append("rtl", "off");
    }
    if args.no_autocrop {
        form.append("autocrop", "off");
    }
    if args.no_split_double {
        form.append("split_double", "off");
    }
    for (name, value) in &args.fields {
        form.append(name.as_str(), value.as_str());
    }
    form
}

async fn run(args: Args) -> anyhow::Result<bool> {
    let mut settings = ClientSettings::load(args.config.as_deref()).map_err(|e| anyhow!(e))?;
    if let Some(server) = args.server {
        settings.server = server;
    }

    match args.command {
        Command::Health => {
            check_health(&reqwest::Client::new(), &settings)
                .await
                .map_err(|e| anyhow!(e))?;
            println!("{} is up", settings.server);
            Ok(true)
        }
        Command::Convert(convert) => {
            if let Some(profile) = &convert.profile {
                settings.profile = profile.clone();
            }
            if let Some(output_dir) = &convert.output_dir {
                settings.output_dir = output_dir.clone();
            }

            let form = build_form(&convert);
            let handler = ConvertHandler::new(&settings, Arc::new(ConsoleView::new()))
                .map_err(|e| anyhow!(e))
                .context("Failed to set up conversion")?;

            match handler.submit(&form, &settings.profile).await {
                Ok(saved) => {
                    println!("Saved {}", saved.path.display());
                    Ok(true)
                }
                Err(err) => {
                    log::debug!("convert error: {:?}", err);
                    Ok(false)
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manga2epub_lib::FormValue;

    #[test]
    fn field_flag_splits_on_first_equals() {
        assert_eq!(
            parse_field("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=x").is_err());
    }

    #[test]
    fn unset_options_stay_out_of_the_form() {
        let args = Args::parse_from(["manga2epub", "convert", "vol1.pdf"]);
        let Command::Convert(convert) = args.command else {
            panic!("expected convert");
        };
        let form = build_form(&convert);

        assert_eq!(form.len(), 1);
        assert!(matches!(form.get(FILE_FIELD), Some(FormValue::File(_))));
    }

    #[test]
    fn flags_map_to_form_fields() {
        let args = Args::parse_from([
            "manga2epub",
            "convert",
            "vol1.pdf",
            "--title",
            "Vol 1",
            "--ltr",
            "--no-autocrop",
            "--field",
            "author=Miura",
        ]);
        let Command::Convert(convert) = args.command else {
            panic!("expected convert");
        };
        let form = build_form(&convert);

        assert_eq!(form.get("title").and_then(FormValue::as_text), Some("Vol 1"));
        assert_eq!(form.get("rtl").and_then(FormValue::as_text), Some("off"));
        assert_eq!(form.get("autocrop").and_then(FormValue::as_text), Some("off"));
        assert_eq!(form.get("author").and_then(FormValue::as_text), Some("Miura"));
        assert!(form.get("split_double").is_none());
    }
}
