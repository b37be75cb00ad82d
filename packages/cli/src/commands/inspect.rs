use super::{load_session, resolve_path};
use crate::config::Config;
use anyhow::Result;
use blockmail_model::{count_by_type, max_depth, Block, BlockKind};
use clap::Args;
use colored::Colorize;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Template JSON file
    pub input: String,

    /// Only print block counts
    #[arg(long)]
    pub stats: bool,
}

pub fn inspect(args: InspectArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = resolve_path(cwd, &args.input);
    let session = load_session(&path, &config.session)?;
    let root = session.store().root();

    println!("{} {}", "📋".bright_blue(), path.display().to_string().bold());
    println!();

    if !args.stats {
        print!("{}", outline(root));
        println!();
    }

    println!(
        "{} blocks, max depth {}",
        session.store().len().to_string().cyan(),
        max_depth(root).to_string().cyan()
    );
    for (block_type, count) in count_by_type(root) {
        println!("  {:<10} {}", block_type, count);
    }

    Ok(())
}

/// Indented tree outline, one block per line
pub fn outline(root: &Block) -> String {
    let mut out = String::new();
    write_outline(root, 0, &mut out);
    out
}

fn write_outline(block: &Block, depth: usize, out: &mut String) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(&format!("{} #{}", block.block_type(), block.id));

    match &block.kind {
        BlockKind::Text { content } | BlockKind::Button { content } => {
            out.push_str(&format!(" \"{}\"", preview(content)));
        }
        BlockKind::Image => {
            if let Some(src) = block.props.get("src").filter(|s| !s.is_empty()) {
                out.push_str(&format!(" <{}>", src));
            }
        }
        _ => {}
    }
    out.push('\n');

    for child in block.children().unwrap_or_default() {
        write_outline(child, depth + 1, out);
    }
}

/// First line of `content`, shortened to 40 characters
fn preview(content: &str) -> String {
    let line = content.lines().next().unwrap_or("");
    if line.chars().count() > 40 {
        format!("{}…", line.chars().take(39).collect::<String>())
    } else {
        line.to_string()
    }
}
