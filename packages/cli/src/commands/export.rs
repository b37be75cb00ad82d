use super::{load_session, resolve_path};
use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::{anyhow, Result};
use blockmail_compiler_html::CompileOptions;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Template JSON file, or a directory of templates
    pub input: String,

    /// Output file (or directory when exporting a directory)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Skip pretty printing
    #[arg(long)]
    pub compact: bool,

    /// Omit data-block-id attributes
    #[arg(long)]
    pub no_ids: bool,

    /// Document title (overrides config)
    #[arg(long)]
    pub title: Option<String>,
}

pub fn export(args: ExportArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let options = compile_options(&args, &config);
    let input = resolve_path(cwd, &args.input);

    if input.is_file() {
        let html = export_file(&input, &config, &options)?;

        if args.stdout {
            print!("{}", html);
            return Ok(());
        }

        let output_path = match &args.output {
            Some(output) => resolve_path(cwd, output),
            None => input.with_extension("html"),
        };
        write_output(&output_path, &html)?;
        println!(
            "{} {} → {}",
            "✓".green(),
            input.display(),
            output_path.display()
        );
        Ok(())
    } else if input.is_dir() {
        export_dir(&input, &args, &config, &options, cwd)
    } else {
        Err(anyhow!("Input path does not exist: {}", input.display()))
    }
}

fn compile_options(args: &ExportArgs, config: &Config) -> CompileOptions {
    let mut options = config.export.compile_options();
    if args.compact {
        options.pretty = false;
    }
    if args.no_ids {
        options.block_ids = false;
    }
    if let Some(title) = &args.title {
        options.title = title.clone();
    }
    options
}

fn export_file(path: &Path, config: &Config, options: &CompileOptions) -> Result<String> {
    let session = load_session(path, &config.session)?;
    debug!(path = %path.display(), blocks = session.store().len(), "Exporting template");
    Ok(session.export_html(options))
}

fn export_dir(
    dir: &Path,
    args: &ExportArgs,
    config: &Config,
    options: &CompileOptions,
    cwd: &str,
) -> Result<()> {
    if args.stdout {
        return Err(anyhow!("--stdout needs a single template file"));
    }

    let out_dir = match &args.output {
        Some(output) => resolve_path(cwd, output),
        None => config.get_out_dir(cwd),
    };

    println!("{}", "🔨 Exporting email templates...".bright_blue().bold());

    let templates = find_templates(dir, &out_dir);
    if templates.is_empty() {
        println!("{}", "⚠️  No templates found".yellow());
        return Ok(());
    }

    println!("Found {} templates", templates.len());

    let mut success_count = 0;
    let mut error_count = 0;

    for template in &templates {
        let relative_path = template.strip_prefix(dir).unwrap_or(template);
        let output_path = out_dir.join(relative_path).with_extension("html");

        let result = export_file(template, config, options)
            .and_then(|html| write_output(&output_path, &html));

        match result {
            Ok(()) => {
                success_count += 1;
                println!(
                    "  {} {} → {}",
                    "✓".green(),
                    relative_path.display(),
                    output_path.display()
                );
            }
            Err(e) => {
                error_count += 1;
                eprintln!(
                    "  {} {} - {}",
                    "✗".red(),
                    relative_path.display(),
                    e.to_string().red()
                );
            }
        }
    }

    println!();
    if error_count == 0 {
        println!(
            "{} Exported {} templates successfully",
            "✅".green(),
            success_count
        );
        Ok(())
    } else {
        println!(
            "{} Exported {} templates, {} errors",
            "⚠️".yellow(),
            success_count,
            error_count
        );
        Err(anyhow!("{} templates failed to export", error_count))
    }
}

/// Every `.json` file below `dir` except config files and previous output
fn find_templates(dir: &Path, out_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| {
            path.extension().and_then(|s| s.to_str()) == Some("json")
                && path.file_name().and_then(|s| s.to_str()) != Some(DEFAULT_CONFIG_NAME)
                && !path.starts_with(out_dir)
        })
        .collect();

    files.sort();
    files
}

fn write_output(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html)?;
    Ok(())
}
