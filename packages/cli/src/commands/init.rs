use super::resolve_path;
use crate::config::{Config, ExportConfig, DEFAULT_CONFIG_NAME};
use anyhow::{anyhow, Result};
use blockmail_editor::{BlockPatch, EditSession, SessionConfig};
use blockmail_model::BlockType;
use clap::Args;
use colored::Colorize;
use std::fs;

pub const STARTER_TEMPLATE_NAME: &str = "template.json";

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Project directory
    #[arg(default_value = ".")]
    pub path: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let project_dir = resolve_path(cwd, &args.path);
    let config_path = project_dir.join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!(
        "{}",
        "📝 Initializing Blockmail project...".bright_blue().bold()
    );

    if !project_dir.exists() {
        fs::create_dir_all(&project_dir)?;
        println!("  {} Created {}/", "✓".green(), args.path);
    }

    let config = Config {
        export: ExportConfig {
            out_dir: Some("dist".to_string()),
            ..Default::default()
        },
        session: SessionConfig::default(),
    };

    // Create starter template
    let template_path = project_dir.join(STARTER_TEMPLATE_NAME);
    if !template_path.exists() || args.force {
        fs::write(&template_path, starter_template(&config.session)?)?;
        println!("  {} Created {}", "✓".green(), STARTER_TEMPLATE_NAME);
    }

    // Write config file
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}", STARTER_TEMPLATE_NAME);
    println!("  2. Run: blockmail export {}", STARTER_TEMPLATE_NAME);
    println!("  3. Open {}", "template.html".cyan());

    Ok(())
}

/// A small header / body / call-to-action layout
fn starter_template(config: &SessionConfig) -> Result<String> {
    let mut session = EditSession::new("init", config);
    let missing = || anyhow!("Failed to build starter template");

    let header = session.add_new(BlockType::Section, None).ok_or_else(missing)?;
    let logo = session
        .add_new(BlockType::Image, Some(&header))
        .ok_or_else(missing)?;
    session.update_block(&logo, BlockPatch::prop("alt", "Logo"));

    let body = session.add_new(BlockType::Section, None).ok_or_else(missing)?;
    let heading = session
        .add_new(BlockType::Text, Some(&body))
        .ok_or_else(missing)?;
    session.update_block(&heading, BlockPatch::content("<h1>Hello there!</h1>"));
    session.add_new(BlockType::Text, Some(&body)).ok_or_else(missing)?;

    let cta = session
        .add_new(BlockType::Button, Some(&body))
        .ok_or_else(missing)?;
    session.update_block(&cta, BlockPatch::style("background", "#3366FF"));
    session.update_block(&cta, BlockPatch::style("color", "white"));
    session.update_block(&cta, BlockPatch::style("padding", "12px 24px"));

    Ok(session.store().to_json_pretty()?)
}
