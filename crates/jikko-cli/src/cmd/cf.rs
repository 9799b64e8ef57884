//! Cloudflare Pages (wrangler) and DNS (flarectl) wrappers.

use clap::{Args, Parser, Subcommand};
use jikko_core::{shell, Context};

use super::parse;

/// Lines of banner `wrangler pages project list` prints before the table.
const WRANGLER_BANNER_LINES: usize = 3;

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
struct ProjectArgs {
    /// Pages project name
    project: String,
}

pub fn pages_list(_ctx: &Context, _args: &[String]) -> anyhow::Result<()> {
    shell::require("wrangler")?;
    let output = shell::capture_combined("wrangler", &["pages", "project", "list"])?;
    for line in output.lines().skip(WRANGLER_BANNER_LINES) {
        println!("{line}");
    }
    Ok(())
}

pub fn init_pages(ctx: &Context, args: &[String]) -> anyhow::Result<()> {
    let Some(opts) = parse::<ProjectArgs>("jikko cf init-pages", args)? else {
        return Ok(());
    };
    shell::require("wrangler")?;
    shell::run(
        "wrangler",
        &["pages", "project", "create", &opts.project, "--production-branch", "main"],
    )?;
    ctx.ui.ok(&format!("Created {}", opts.project));
    Ok(())
}

pub fn pages_destroy(ctx: &Context, args: &[String]) -> anyhow::Result<()> {
    let Some(opts) = parse::<ProjectArgs>("jikko cf pages-destroy", args)? else {
        return Ok(());
    };
    shell::require("wrangler")?;
    shell::run("wrangler", &["pages", "project", "delete", &opts.project, "--yes"])?;
    ctx.ui.ok(&format!("Deleted {}", opts.project));
    Ok(())
}

// ---------------------------------------------------------------------------
// DNS
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
struct DnsArgs {
    #[command(subcommand)]
    action: DnsAction,
}

#[derive(Subcommand, Debug)]
enum DnsAction {
    /// List zones
    Zones,
    /// List records in a zone
    List { zone: String },
    /// Records whose line mentions NAME (case-insensitive)
    Find { zone: String, name: String },
    /// Create a record
    Add {
        zone: String,
        #[arg(value_name = "TYPE")]
        kind: String,
        name: String,
        content: String,
        #[command(flatten)]
        proxy: Proxy,
    },
    /// Change a record's content
    Update {
        zone: String,
        id: String,
        content: String,
        #[command(flatten)]
        proxy: Proxy,
    },
    /// Delete a record
    Delete { zone: String, id: String },
}

#[derive(Args, Debug)]
struct Proxy {
    /// Route through Cloudflare's proxy
    #[arg(long)]
    proxy: bool,
}

pub fn dns(ctx: &Context, args: &[String]) -> anyhow::Result<()> {
    let Some(opts) = parse::<DnsArgs>("jikko cf dns", args)? else {
        return Ok(());
    };
    shell::require("flarectl")?;

    match opts.action {
        DnsAction::Zones => shell::run("flarectl", &["zone", "list"])?,
        DnsAction::List { zone } => shell::run("flarectl", &["dns", "list", "--zone", &zone])?,
        DnsAction::Find { zone, name } => {
            let output = shell::capture_combined("flarectl", &["dns", "list", "--zone", &zone])?;
            let matches = filter_lines(&output, &name);
            if matches.is_empty() {
                ctx.ui.muted("No matches");
            }
            for line in matches {
                println!("{line}");
            }
        }
        DnsAction::Add {
            zone,
            kind,
            name,
            content,
            proxy,
        } => {
            let mut argv: Vec<&str> = vec![
                "dns", "create", "--zone", &zone, "--type", &kind, "--name", &name, "--content",
                &content,
            ];
            if proxy.proxy {
                argv.push("--proxy");
            }
            shell::run("flarectl", &argv)?;
        }
        DnsAction::Update {
            zone,
            id,
            content,
            proxy,
        } => {
            let mut argv: Vec<&str> = vec![
                "dns", "update", "--zone", &zone, "--id", &id, "--content", &content,
            ];
            if proxy.proxy {
                argv.push("--proxy");
            }
            shell::run("flarectl", &argv)?;
        }
        DnsAction::Delete { zone, id } => {
            shell::run("flarectl", &["dns", "delete", "--zone", &zone, "--id", &id])?
        }
    }
    Ok(())
}

fn filter_lines<'a>(output: &'a str, needle: &str) -> Vec<&'a str> {
    let needle = needle.to_lowercase();
    output
        .lines()
        .filter(|l| l.to_lowercase().contains(&needle))
        .collect()
}
