use jikko_core::{paths, shell, Context};

use crate::VERSION;

const COLUMN_WIDTH: usize = 24;
const COLUMNS: usize = 3;

pub fn scripts(ctx: &Context, _args: &[String]) -> anyhow::Result<()> {
    let repo = &ctx.config.repo_dir;
    let commands: Vec<String> = super::registry()?
        .entries()
        .map(|e| e.path().to_string())
        .collect();

    ctx.ui.frame("jikko", || {
        ctx.ui.info(&format!("Version: {VERSION}"));
        ctx.ui.info(&format!("Path: {}", paths::tilde(repo)));
        ctx.ui.blank();

        ctx.ui.title("Git Status");
        if repo.is_dir() {
            let branch = shell::capture_lossy_in(repo, "git", &["branch", "--show-current"]);
            let last = shell::capture_lossy_in(repo, "git", &["log", "-1", "--format=%h %s"]);
            let status = shell::capture_lossy_in(repo, "git", &["status", "--porcelain"]);

            ctx.ui.info(&format!("Branch: {}", branch.trim()));
            ctx.ui.info(&format!("Last: {}", last.trim()));
            if status.trim().is_empty() {
                ctx.ui.ok("Working tree clean");
            } else {
                ctx.ui.warn("Uncommitted changes:");
                for line in status.lines() {
                    ctx.ui.muted(&format!("  {}", line.trim()));
                }
            }
        } else {
            ctx.ui.err(&format!("Not found: {}", paths::tilde(repo)));
        }
        ctx.ui.blank();

        ctx.ui.title("Available Commands");
        for row in columns(&commands, COLUMNS, COLUMN_WIDTH) {
            ctx.ui.muted(&row);
        }
    });
    Ok(())
}

/// Lay `items` out `per_row` to a line, each padded to `width`.
fn columns(items: &[String], per_row: usize, width: usize) -> Vec<String> {
    items
        .chunks(per_row)
        .map(|chunk| {
            chunk
                .iter()
                .map(|c| format!("{c:<width$}"))
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}
