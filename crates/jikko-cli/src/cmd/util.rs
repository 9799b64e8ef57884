//! Claude settings maintenance, install checks and dotfile sync.

use anyhow::Context as _;
use clap::Parser;
use jikko_core::{io, paths, shell, Context};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use super::parse;

const MCP_FILES: &[&str] = &[".mcp.json", "mcp.json"];
const PLUGIN_MARKER_DIR: &str = ".claude-plugin";

const DEFAULT_PLUGIN: &str = "browse";
const DEFAULT_MARKETPLACE: &str = "saiden";
const DEFAULT_PLUGIN_SOURCE: &str = "~/Projects/claude-browse";
const SHORT_SHA: usize = 7;

// ---------------------------------------------------------------------------
// tools
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
struct ToolsAddArgs {
    /// Permission rule, e.g. `Bash(git status:*)`
    permission: String,
}

pub fn tools_add(ctx: &Context, args: &[String]) -> anyhow::Result<()> {
    let Some(opts) = parse::<ToolsAddArgs>("jikko util tools add", args)? else {
        return Ok(());
    };
    let path = ctx.config.settings_path();
    let mut settings = io::read_json(&path).unwrap_or_else(|| json!({}));

    if !add_permission(&mut settings, &opts.permission) {
        ctx.ui.warn(&format!("Already whitelisted: {}", opts.permission));
        return Ok(());
    }

    io::write_json(&path, &settings)
        .with_context(|| format!("cannot write {}", path.display()))?;
    ctx.ui.ok(&format!("Added: {}", opts.permission));
    Ok(())
}

pub fn tools_ls(ctx: &Context, _args: &[String]) -> anyhow::Result<()> {
    let settings = io::read_json(&ctx.config.settings_path()).unwrap_or(Value::Null);
    let allowed = allowed_permissions(&settings);

    if allowed.is_empty() {
        ctx.ui.muted("No tool permissions whitelisted");
        return Ok(());
    }

    ctx.ui.title("Whitelisted Permissions");
    for permission in allowed {
        println!("  {permission}");
    }
    Ok(())
}

#[derive(Parser, Debug)]
struct ToolsRmArgs {
    /// Permission rule, exactly as `util tools ls` prints it
    permission: String,
}

pub fn tools_rm(ctx: &Context, args: &[String]) -> anyhow::Result<()> {
    let Some(opts) = parse::<ToolsRmArgs>("jikko util tools rm", args)? else {
        return Ok(());
    };
    let path = ctx.config.settings_path();
    let Some(mut settings) = io::read_json(&path) else {
        anyhow::bail!("no settings file at {}", paths::tilde(&path));
    };

    if !remove_permission(&mut settings, &opts.permission) {
        ctx.ui.warn(&format!("Not in whitelist: {}", opts.permission));
        return Ok(());
    }

    io::write_json(&path, &settings)
        .with_context(|| format!("cannot write {}", path.display()))?;
    ctx.ui.ok(&format!("Removed: {}", opts.permission));
    Ok(())
}

/// Append to `permissions.allow`, creating the path as needed.
/// Returns false if already present.
fn add_permission(settings: &mut Value, permission: &str) -> bool {
    if !settings.is_object() {
        *settings = json!({});
    }
    let permissions = settings
        .as_object_mut()
        .map(|root| root.entry("permissions").or_insert_with(|| json!({})));
    let Some(permissions) = permissions else {
        return false;
    };
    if !permissions.is_object() {
        *permissions = json!({});
    }
    let Some(allow) = permissions
        .as_object_mut()
        .map(|p| p.entry("allow").or_insert_with(|| json!([])))
    else {
        return false;
    };
    if !allow.is_array() {
        *allow = json!([]);
    }
    let Some(list) = allow.as_array_mut() else {
        return false;
    };

    if list.iter().any(|p| p.as_str() == Some(permission)) {
        return false;
    }
    list.push(Value::String(permission.to_string()));
    true
}

/// Drop every copy of `permission` from `permissions.allow`.
/// Returns false if it was not there.
fn remove_permission(settings: &mut Value, permission: &str) -> bool {
    let Some(list) = settings
        .pointer_mut("/permissions/allow")
        .and_then(Value::as_array_mut)
    else {
        return false;
    };
    let before = list.len();
    list.retain(|p| p.as_str() != Some(permission));
    list.len() != before
}

fn allowed_permissions(settings: &Value) -> Vec<&str> {
    settings
        .pointer("/permissions/allow")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// check mcp
// ---------------------------------------------------------------------------

pub fn check_mcp(ctx: &Context, _args: &[String]) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("cannot read current directory")?;

    ctx.ui.title("MCP Configuration");
    ctx.ui.muted(&format!("pwd: {}", cwd.display()));

    ctx.ui.blank();
    ctx.ui.info("Current Directory");
    let found = io::find_named(&cwd, MCP_FILES);
    if found.is_empty() {
        ctx.ui.muted("(none)");
    }
    for path in found {
        let shown = path.strip_prefix(&cwd).unwrap_or(&path);
        ctx.ui.ok(&format!("./{}: {}", shown.display(), servers_in(&path)));
    }

    ctx.ui.blank();
    ctx.ui.info("Parent Directories");
    let parents = parent_configs(&cwd);
    if parents.is_empty() {
        ctx.ui.muted("(none)");
    }
    for path in parents {
        ctx.ui.warn(&format!("{}: {}", paths::tilde(&path), servers_in(&path)));
    }

    ctx.ui.blank();
    ctx.ui.info("Global Configs");
    if let Some(settings) = io::read_json(&ctx.config.settings_path()) {
        let names = mcp_servers(&settings);
        if !names.is_empty() {
            ctx.ui.ok(&format!("settings.json: {}", names.join(", ")));
        }
    }

    let cache = ctx.config.claude_dir.join(paths::PLUGINS_CACHE_DIR);
    if cache.is_dir() {
        for path in io::find_named(&cache, MCP_FILES) {
            let in_plugin = path
                .parent()
                .and_then(Path::file_name)
                .is_some_and(|n| n == PLUGIN_MARKER_DIR);
            if in_plugin {
                ctx.ui.ok(&format!("Plugin: {}", servers_in(&path)));
            }
        }
    }
    Ok(())
}

/// MCP config files in each ancestor of `dir`, nearest first. The
/// filesystem root is not searched.
fn parent_configs(dir: &Path) -> Vec<std::path::PathBuf> {
    dir.ancestors()
        .skip(1)
        .filter(|d| d.parent().is_some())
        .flat_map(|d| MCP_FILES.iter().map(move |name| d.join(name)))
        .filter(|p| p.exists())
        .collect()
}

fn servers_in(path: &Path) -> String {
    let names = io::read_json(path)
        .map(|v| mcp_servers(&v))
        .unwrap_or_default();
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}

fn mcp_servers(config: &Value) -> Vec<String> {
    config
        .get("mcpServers")
        .and_then(Value::as_object)
        .map(|servers| servers.keys().cloned().collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// check claude-code
// ---------------------------------------------------------------------------

pub fn check_claude_code(ctx: &Context, _args: &[String]) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("cannot read current directory")?;
    let claude_dir = &ctx.config.claude_dir;

    ctx.ui.title("Claude Code Configuration");
    ctx.ui.muted(&format!("pwd: {}", cwd.display()));

    ctx.ui.blank();
    ctx.ui.info("Settings Files");
    let settings = [
        (PathBuf::from(paths::MANAGED_SETTINGS_FILE), "Managed"),
        (cwd.join(".claude/settings.local.json"), "Local"),
        (cwd.join(".claude/settings.json"), "Project"),
        (ctx.config.settings_path(), "User"),
    ];
    for (path, label) in settings.iter().filter(|(p, _)| p.exists()) {
        ctx.ui.ok(&format!("{label}: {}", paths::tilde(path)));
    }

    ctx.ui.blank();
    ctx.ui.info("Memory Files (CLAUDE.md)");
    let memory = [
        (cwd.join("CLAUDE.local.md"), "Local"),
        (cwd.join("CLAUDE.md"), "Project"),
        (cwd.join(".claude/CLAUDE.md"), "Project"),
        (claude_dir.join("CLAUDE.md"), "User"),
        (paths::auto_memory_file(claude_dir, &cwd), "Auto memory"),
    ];
    for (path, label) in &memory {
        if let Some(lines) = line_count(path) {
            ctx.ui.ok(&format!("{label} ({lines} lines)"));
        }
    }

    ctx.ui.blank();
    ctx.ui.info("MCP Configuration");
    for name in MCP_FILES {
        let path = cwd.join(name);
        if path.exists() {
            ctx.ui.ok(&format!("{name}: {}", servers_in(&path)));
        }
    }
    if let Some(settings) = io::read_json(&ctx.config.settings_path()) {
        let names = mcp_servers(&settings);
        if !names.is_empty() {
            ctx.ui.ok(&format!("settings.json: {}", names.join(", ")));
        }
    }
    Ok(())
}

fn line_count(path: &Path) -> Option<usize> {
    std::fs::read_to_string(path).ok().map(|text| text.lines().count())
}

// ---------------------------------------------------------------------------
// check plugin
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
struct CheckPluginArgs {
    #[arg(long, default_value = DEFAULT_PLUGIN)]
    plugin: String,
    #[arg(long, default_value = DEFAULT_MARKETPLACE)]
    marketplace: String,
    /// Source checkout to compare the installed build against
    #[arg(long, default_value = DEFAULT_PLUGIN_SOURCE)]
    source: PathBuf,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct PluginBuild {
    version: Option<String>,
    commit: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum SyncState<'a> {
    InSync(&'a str),
    OutOfSync { source: &'a str, installed: &'a str },
    Unknown,
}

pub fn check_plugin(ctx: &Context, args: &[String]) -> anyhow::Result<()> {
    let Some(opts) = parse::<CheckPluginArgs>("jikko util check plugin", args)? else {
        return Ok(());
    };
    let key = format!("{}@{}", opts.plugin, opts.marketplace);
    ctx.ui.title(&format!("Plugin: {key}"));

    let source_dir = paths::expand_tilde(&opts.source);
    let source = source_dir.is_dir().then(|| source_build(ctx, &source_dir));

    ctx.ui.blank();
    ctx.ui.info("Installed");
    let registry = ctx.config.claude_dir.join(paths::INSTALLED_PLUGINS_FILE);
    let installed = if registry.exists() {
        let build = io::read_json(&registry).and_then(|data| installed_plugin(&data, &key));
        match &build {
            Some(build) => print_build(build),
            None => ctx.ui.muted("  Not installed"),
        }
        build
    } else {
        ctx.ui.muted("  Not found");
        None
    };

    ctx.ui.blank();
    let source_commit = source.as_ref().and_then(|b| b.commit.as_deref());
    let installed_commit = installed.as_ref().and_then(|b| b.commit.as_deref());
    match sync_state(source_commit, installed_commit) {
        SyncState::InSync(commit) => ctx.ui.ok(&format!("In sync ({commit})")),
        SyncState::OutOfSync { source, installed } => ctx
            .ui
            .err(&format!("Out of sync: source={source}, installed={installed}")),
        SyncState::Unknown => {}
    }
    Ok(())
}

fn source_build(ctx: &Context, dir: &Path) -> PluginBuild {
    let commit = shell::capture_lossy_in(dir, "git", &["rev-parse", "--short", "HEAD"])
        .trim()
        .to_string();
    let version = io::read_json(&dir.join("package.json"))
        .and_then(|v| v.get("version").and_then(Value::as_str).map(str::to_string));
    let dirty = shell::capture_lossy_in(dir, "git", &["status", "--porcelain"])
        .lines()
        .filter(|l| !l.trim().is_empty())
        .count();

    let build = PluginBuild {
        version,
        commit: (!commit.is_empty()).then_some(commit),
    };
    ctx.ui.info("Source");
    print_build(&build);
    if dirty > 0 {
        ctx.ui.warn(&format!("  {dirty} uncommitted"));
    } else {
        ctx.ui.ok("  Clean");
    }
    build
}

fn print_build(build: &PluginBuild) {
    println!("  Version: {}", build.version.as_deref().unwrap_or("-"));
    println!("  Commit:  {}", build.commit.as_deref().unwrap_or("-"));
}

/// First install record for `key` in `installed_plugins.json`.
fn installed_plugin(data: &Value, key: &str) -> Option<PluginBuild> {
    let entry = data.get("plugins")?.get(key)?.get(0)?;
    Some(PluginBuild {
        version: entry
            .get("version")
            .and_then(Value::as_str)
            .map(str::to_string),
        commit: entry
            .get("gitCommitSha")
            .and_then(Value::as_str)
            .map(|sha| sha.chars().take(SHORT_SHA).collect()),
    })
}

fn sync_state<'a>(source: Option<&'a str>, installed: Option<&'a str>) -> SyncState<'a> {
    match (source, installed) {
        (Some(s), Some(i)) if s == i => SyncState::InSync(s),
        (Some(source), Some(installed)) => SyncState::OutOfSync { source, installed },
        _ => SyncState::Unknown,
    }
}

// ---------------------------------------------------------------------------
// sync
// ---------------------------------------------------------------------------

pub fn sync_config(ctx: &Context, _args: &[String]) -> anyhow::Result<()> {
    let sync = &ctx.config.sync;
    let home = paths::home_dir()?;

    ctx.ui.title(&format!("Syncing to {}", sync.host));
    let mut failed = 0;
    for file in &sync.files {
        let local = home.join(file);
        if !local.exists() {
            ctx.ui.warn(&format!("{file} (not found)"));
            continue;
        }
        let source = local.display().to_string();
        let target = format!("{}:~/{file}", sync.host);
        if ctx
            .ui
            .step(file, || shell::run_quiet("scp", &["-q", &source, &target]))
            .is_err()
        {
            failed += 1;
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} file(s) failed to sync");
    }
    ctx.ui.ok("Done");
    Ok(())
}
