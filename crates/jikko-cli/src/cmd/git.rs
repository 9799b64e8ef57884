use anyhow::Context as _;
use jikko_core::{shell, Context};

use super::{str_args, tab_rows, timestamp};

const LOG_FORMAT: &str = "--pretty=format:%ad\t%h\t%s\t%an";
const BRANCH_FORMAT: &str = "--format=%(refname:short)\t%(objectname:short)\t%(contents:subject)\t%(authorname)\t%(committerdate:relative)";

// ---------------------------------------------------------------------------
// Pass-through
// ---------------------------------------------------------------------------

pub fn status(_ctx: &Context, args: &[String]) -> anyhow::Result<()> {
    git_with(&["status"], args)
}

pub fn diff(_ctx: &Context, args: &[String]) -> anyhow::Result<()> {
    git_with(&["diff"], args)
}

pub fn log(_ctx: &Context, args: &[String]) -> anyhow::Result<()> {
    git_with(&["log", "--oneline", "-20"], args)
}

fn git_with(base: &[&str], extra: &[String]) -> anyhow::Result<()> {
    let mut argv = base.to_vec();
    argv.extend(str_args(extra));
    shell::run("git", &argv)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

pub fn log_detailed(ctx: &Context, _args: &[String]) -> anyhow::Result<()> {
    let output = shell::capture("git", &["log", LOG_FORMAT, "--date=short", "-20"])
        .context("failed to read git log")?;
    let rows = tab_rows(&output);

    if rows.is_empty() {
        ctx.ui.muted("No commits found");
    } else {
        ctx.ui.table(&["Date", "Hash", "Message", "Author"], &rows);
    }
    Ok(())
}

pub fn branches(ctx: &Context, _args: &[String]) -> anyhow::Result<()> {
    let output = shell::capture(
        "git",
        &[
            "for-each-ref",
            "--sort=-committerdate",
            "--count=20",
            BRANCH_FORMAT,
            "refs/heads/",
        ],
    )
    .context("failed to list branches")?;
    let rows = tab_rows(&output);

    if rows.is_empty() {
        ctx.ui.muted("No branches found");
    } else {
        ctx.ui.table(&["Branch", "Hash", "Message", "Author", "Age"], &rows);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Commits
// ---------------------------------------------------------------------------

pub fn empty(ctx: &Context, _args: &[String]) -> anyhow::Result<()> {
    let message = format!("{} Update", timestamp("%Y-%m-%d_%H:%M:%S"));
    shell::run("git", &["commit", "--allow-empty", "-m", &message])?;
    ctx.ui.ok("Empty commit created");
    Ok(())
}

pub fn commit(ctx: &Context, _args: &[String]) -> anyhow::Result<()> {
    ctx.ui
        .step("Staging files", || shell::run("git", &["add", "-A"]))?;

    let staged = shell::capture("git", &["diff", "--cached", "--numstat"])?;
    let count = staged.lines().filter(|l| !l.trim().is_empty()).count();
    if count == 0 {
        ctx.ui.warn("Nothing to commit");
        return Ok(());
    }

    let message = commit_message(&timestamp("%Y-%m-%d %H:%M:%S"), count);
    ctx.ui
        .step("Committing", || shell::run_quiet("git", &["commit", "-m", &message]))?;

    ctx.ui.ok(&format!("Committed {count} files"));
    Ok(())
}

pub fn push(ctx: &Context, args: &[String]) -> anyhow::Result<()> {
    commit(ctx, args)?;
    ctx.ui.blank();
    ctx.ui.info("Pushing...");
    shell::run("git", &["push"])?;
    Ok(())
}

pub fn force_push(ctx: &Context, _args: &[String]) -> anyhow::Result<()> {
    empty(ctx, &[])?;
    let branch = shell::capture("git", &["branch", "--show-current"])?
        .trim()
        .to_string();
    if branch.is_empty() {
        anyhow::bail!("not on a branch (detached HEAD)");
    }

    ctx.ui.blank();
    ctx.ui.warn(&format!("Force pushing {branch}..."));
    shell::run("git", &["push", "--force", "origin", &branch])?;
    Ok(())
}

fn commit_message(timestamp: &str, count: usize) -> String {
    format!("[Update] {timestamp}, {count} files")
}
