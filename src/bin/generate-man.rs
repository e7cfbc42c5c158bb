//! Write `taskdeck.1` (and one page per subcommand) into a directory
//!
//! Usage: `generate-man [OUT_DIR]`, default `man/`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_mangen::Man;

use taskdeck::cli::Cli;

fn render(cmd: &clap::Command, name: &str, out_dir: &Path) -> Result<()> {
    let mut buffer = Vec::new();
    Man::new(cmd.clone())
        .title(name)
        .render(&mut buffer)
        .with_context(|| format!("Failed to render man page for {}", name))?;
    let path = out_dir.join(format!("{}.1", name));
    std::fs::write(&path, buffer)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let cmd = Cli::command();
    render(&cmd, "taskdeck", &out_dir)?;
    for sub in cmd.get_subcommands() {
        render(sub, &format!("taskdeck-{}", sub.get_name()), &out_dir)?;
    }
    Ok(())
}
