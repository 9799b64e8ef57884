pub mod ai;
pub mod bump;
pub mod cf;
pub mod cl;
pub mod commands;
pub mod config;
pub mod docker;
pub mod git;
pub mod install;
pub mod net;
pub mod plans;
pub mod ratatui;
pub mod tengu;
pub mod util;

use clap::error::ErrorKind;
use clap::Parser;
use jikko_core::Registry;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Every command jikko knows, keyed by path.
pub fn registry() -> jikko_core::Result<Registry> {
    let mut reg = Registry::new();

    reg.register("bump", "Bump the project version, commit, and tag", bump::run)?;
    reg.register("install", "Link the command skills into ~/.claude/commands", install::run)?;
    reg.register("config/show", "Print the resolved configuration", config::show)?;

    reg.register("commands/init", "Scaffold a handler and its skill file", commands::init)?;
    reg.register("commands/add", "Scaffold a command and print agent markers", commands::add)?;

    reg.register("git/status", "git status", git::status)?;
    reg.register("git/diff", "git diff", git::diff)?;
    reg.register("git/log", "Last 20 commits, one line each", git::log)?;
    reg.register("git/log-detailed", "Last 20 commits as a table", git::log_detailed)?;
    reg.register("git/branches", "Local branches by last commit", git::branches)?;
    reg.register("git/empty", "Create an empty timestamped commit", git::empty)?;
    reg.register("git/commit", "Stage everything and commit with a timestamp", git::commit)?;
    reg.register("git/push", "Commit everything and push", git::push)?;
    reg.register("git/force-push", "Empty commit, then force push the branch", git::force_push)?;

    reg.register("docker/images", "docker images", docker::images)?;
    reg.register("docker/ps", "Running containers as a table", docker::ps)?;

    reg.register("cf/pages-list", "List Cloudflare Pages projects", cf::pages_list)?;
    reg.register("cf/init-pages", "Create a Cloudflare Pages project", cf::init_pages)?;
    reg.register("cf/pages-destroy", "Delete a Cloudflare Pages project", cf::pages_destroy)?;
    reg.register("cf/dns", "Cloudflare DNS records via flarectl", cf::dns)?;

    reg.register("ai/sd/generate", "Generate an image on the SD host", ai::sd_generate)?;
    reg.register("ai/sd/convert", "Convert a model to GGUF on the SD host", ai::sd_convert)?;
    reg.register("ai/sd/models", "List checkpoints and LoRAs on the SD host", ai::sd_models)?;

    reg.register("cl/scripts", "Repository status and command overview", cl::scripts)?;

    reg.register("util/tools/add", "Whitelist a tool permission", util::tools_add)?;
    reg.register("util/tools/ls", "List whitelisted tool permissions", util::tools_ls)?;
    reg.register("util/tools/rm", "Remove a whitelisted tool permission", util::tools_rm)?;
    reg.register("util/check/mcp", "Find MCP server configs", util::check_mcp)?;
    reg.register(
        "util/check/claude-code",
        "Show Claude settings, memory and MCP files",
        util::check_claude_code,
    )?;
    reg.register(
        "util/check/plugin",
        "Compare a plugin's source and installed build",
        util::check_plugin,
    )?;
    reg.register("util/sync/config", "Copy dotfiles to the sync host", util::sync_config)?;

    reg.register("net/config", "List network interfaces", net::config)?;

    reg.register("tengu/status", "Health report for a tengu host", tengu::status)?;
    reg.register("tengu/init", "Rebuild tengu-init when out of date", tengu::init)?;

    reg.register("ratatui/docs", "Ratatui documentation topics", ratatui::docs)?;

    reg.register("plans/ls", "List saved plans", plans::ls)?;

    Ok(reg)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a handler's residual args with clap.
///
/// `Ok(None)` means `--help` was requested and has been printed.
pub(crate) fn parse<T: Parser>(bin: &str, args: &[String]) -> anyhow::Result<Option<T>> {
    let argv = std::iter::once(bin.to_string()).chain(args.iter().cloned());
    match T::try_parse_from(argv) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.print()?;
            Ok(None)
        }
        Err(e) => {
            e.print()?;
            anyhow::bail!("invalid arguments for '{bin}'")
        }
    }
}

/// Split tab-separated command output into table rows, skipping blank lines.
pub(crate) fn tab_rows(output: &str) -> Vec<Vec<String>> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| l.split('\t').map(str::to_string).collect())
        .collect()
}

pub(crate) fn str_args(args: &[String]) -> Vec<&str> {
    args.iter().map(String::as_str).collect()
}

pub(crate) fn timestamp(format: &str) -> String {
    chrono::Local::now().format(format).to_string()
}
