use anyhow::Context as _;
use clap::Parser;
use jikko_core::{io, paths, Context};

use super::parse;

#[derive(Parser, Debug)]
struct InstallArgs {
    /// Replace an existing commands directory or link
    #[arg(short, long)]
    force: bool,
    /// Copy instead of symlinking
    #[arg(short, long)]
    copy: bool,
}

pub fn run(ctx: &Context, args: &[String]) -> anyhow::Result<()> {
    let Some(opts) = parse::<InstallArgs>("jikko install", args)? else {
        return Ok(());
    };
    let src = ctx.config.repo_dir.join(paths::COMMANDS_DIR);
    let dst = ctx.config.claude_dir.join(paths::COMMANDS_DIR);

    ctx.ui.title("Install jikko commands");

    if !src.is_dir() {
        ctx.ui.err(&format!("Source not found: {}", paths::tilde(&src)));
        return Ok(());
    }

    // symlink_metadata so a dangling link still counts as existing
    if let Ok(meta) = std::fs::symlink_metadata(&dst) {
        let is_link = meta.file_type().is_symlink();
        if !opts.force {
            let existing = if is_link { "symlink" } else { "directory" };
            ctx.ui.err(&format!(
                "Already exists ({existing}): {}",
                paths::tilde(&dst)
            ));
            ctx.ui.info("Use --force to overwrite");
            return Ok(());
        }
        let removed = if is_link || meta.is_file() {
            std::fs::remove_file(&dst)
        } else {
            std::fs::remove_dir_all(&dst)
        };
        removed.with_context(|| format!("cannot remove {}", dst.display()))?;
        ctx.ui.ok(&format!("Removed existing: {}", paths::tilde(&dst)));
    }

    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if opts.copy {
        io::copy_dir(&src, &dst)?;
        ctx.ui.ok(&format!("Copied to: {}", paths::tilde(&dst)));
    } else {
        link(&src, &dst).with_context(|| format!("cannot link {}", dst.display()))?;
        ctx.ui.ok(&format!(
            "Symlinked: {} -> {}",
            paths::tilde(&dst),
            paths::tilde(&src)
        ));
    }

    let count = io::count_with_extension(&dst, "md");
    ctx.ui.info(&format!("{count} commands installed"));
    Ok(())
}

#[cfg(unix)]
fn link(src: &std::path::Path, dst: &std::path::Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
fn link(src: &std::path::Path, dst: &std::path::Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(src, dst)
}
