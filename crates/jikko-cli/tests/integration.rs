#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// A temp workspace with a config pointing every directory inside it.
struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("repo")).unwrap();
        std::fs::create_dir_all(root.join("claude")).unwrap();
        std::fs::create_dir_all(root.join("work")).unwrap();
        let config = format!(
            "repo_dir: {}\nclaude_dir: {}\ndocs_dir: {}\n",
            root.join("repo").display(),
            root.join("claude").display(),
            root.join("docs").display(),
        );
        std::fs::write(root.join("config.yaml"), config).unwrap();
        Self { dir }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    fn jikko(&self) -> Command {
        let mut cmd = Command::cargo_bin("jikko").unwrap();
        cmd.current_dir(self.path("work"))
            .env("JIKKO_CONFIG", self.path("config.yaml"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[test]
fn no_args_prints_help() {
    let env = Env::new();
    env.jikko()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: jikko <command> [args]"))
        .stdout(predicate::str::contains("git status"));
}

#[test]
fn help_aliases_print_help() {
    let env = Env::new();
    for alias in ["help", "--help", "-h"] {
        env.jikko()
            .arg(alias)
            .assert()
            .success()
            .stdout(predicate::str::contains("Commands:"))
            .stdout(predicate::str::contains("ai sd generate"));
    }
}

#[test]
fn version_aliases_print_version() {
    let env = Env::new();
    for alias in ["version", "--version", "-v"] {
        env.jikko()
            .arg(alias)
            .assert()
            .success()
            .stdout(predicate::str::diff(format!("jikko {}\n", env!("CARGO_PKG_VERSION"))));
    }
}

#[test]
fn unknown_command_exits_one() {
    let env = Env::new();
    env.jikko()
        .args(["bogus", "path", "--flag"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Unknown command: bogus path"))
        .stdout(predicate::str::contains("Run jikko help for available commands"));
}

#[test]
fn namespace_without_handler_is_unresolved() {
    let env = Env::new();
    env.jikko()
        .args(["ai", "sd"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Unknown command: ai sd"));
}

#[test]
fn handler_help_goes_through_clap() {
    let env = Env::new();
    env.jikko()
        .args(["ai", "sd", "generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--steps"));
}

#[test]
fn bad_handler_args_fail() {
    let env = Env::new();
    env.jikko()
        .args(["commands", "init"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid arguments for 'jikko commands init'"));
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[test]
fn config_show_prints_resolved_yaml() {
    let env = Env::new();
    env.jikko()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("repo_dir:"))
        .stdout(predicate::str::contains("obsessiveCompulsive_v20-q8_0.gguf"));
}

#[test]
fn malformed_config_fails() {
    let env = Env::new();
    std::fs::write(env.path("config.yaml"), "color: [oops\n").unwrap();
    env.jikko()
        .arg("help")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to load config"));
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[test]
fn commands_init_scaffolds_files() {
    let env = Env::new();
    env.jikko()
        .args(["commands", "init", "net", "switch", "Switch networks"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RUST_FILE="))
        .stdout(predicate::str::contains("MD_FILE="))
        .stdout(predicate::str::contains(
            "reg.register(\"net/switch\", \"Switch networks\", net::switch::run)?;",
        ))
        .stdout(predicate::str::contains("cmd::").not());

    let rust = env.path("repo/crates/jikko-cli/src/cmd/net/switch.rs");
    let md = env.path("repo/commands/net/switch.md");
    assert!(rust.exists());
    let skill = std::fs::read_to_string(md).unwrap();
    assert!(skill.contains("description: Switch networks"));
    assert!(skill.contains("jikko net switch $ARGUMENTS"));

    // A second run refuses to overwrite.
    env.jikko()
        .args(["commands", "init", "net", "switch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already exists"))
        .stdout(predicate::str::contains("RUST_FILE=").not());
}

#[test]
fn commands_init_rejects_malformed_names() {
    let env = Env::new();
    env.jikko()
        .args(["commands", "init", "net", "a/b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid command path"));

    env.jikko()
        .args(["commands", "init", "net//wifi", "switch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid command path"));

    assert!(!env.path("repo/crates").exists());
    assert!(!env.path("repo/commands").exists());
}

#[test]
fn commands_add_joins_description() {
    let env = Env::new();
    env.jikko()
        .args(["commands", "add", "util/check", "disk", "Check", "free", "space"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SCAFFOLD_CREATED=true"))
        .stdout(predicate::str::contains("DESCRIPTION=Check free space"));

    assert!(env.path("repo/crates/jikko-cli/src/cmd/util/check/disk.rs").exists());
}

#[test]
fn tools_add_and_ls() {
    let env = Env::new();
    env.jikko()
        .args(["util", "tools", "ls"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tool permissions whitelisted"));

    env.jikko()
        .args(["util", "tools", "add", "Bash(git status:*)"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added: Bash(git status:*)"));

    env.jikko()
        .args(["util", "tools", "add", "Bash(git status:*)"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already whitelisted"));

    env.jikko()
        .args(["util", "tools", "ls"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bash(git status:*)"));

    let settings = std::fs::read_to_string(env.path("claude/settings.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&settings).unwrap();
    assert_eq!(value["permissions"]["allow"].as_array().unwrap().len(), 1);
}

#[test]
fn tools_rm_removes_a_permission() {
    let env = Env::new();
    env.jikko()
        .args(["util", "tools", "rm", "Read"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no settings file"));

    std::fs::write(
        env.path("claude/settings.json"),
        r#"{ "model": "opus", "permissions": { "allow": ["Read", "Bash(ls:*)"] } }"#,
    )
    .unwrap();

    env.jikko()
        .args(["util", "tools", "rm", "Read"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed: Read"));

    env.jikko()
        .args(["util", "tools", "rm", "Read"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not in whitelist: Read"));

    let settings = std::fs::read_to_string(env.path("claude/settings.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&settings).unwrap();
    assert_eq!(value["permissions"]["allow"], serde_json::json!(["Bash(ls:*)"]));
    assert_eq!(value["model"], "opus");
}

#[test]
fn check_claude_code_reports_local_files() {
    let env = Env::new();
    std::fs::write(env.path("work/CLAUDE.md"), "# Rules\n\n- be brief\n").unwrap();
    std::fs::write(
        env.path("work/.mcp.json"),
        r#"{ "mcpServers": { "github": {} } }"#,
    )
    .unwrap();
    std::fs::write(
        env.path("claude/settings.json"),
        r#"{ "mcpServers": { "linear": {} } }"#,
    )
    .unwrap();

    let work = std::fs::canonicalize(env.path("work")).unwrap();
    let memory = env
        .path("claude/projects")
        .join(jikko_core::paths::project_key(&work))
        .join("memory");
    std::fs::create_dir_all(&memory).unwrap();
    std::fs::write(memory.join("MEMORY.md"), "- one\n- two\n").unwrap();

    env.jikko()
        .args(["util", "check", "claude-code"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Claude Code Configuration"))
        .stdout(predicate::str::contains("User: "))
        .stdout(predicate::str::contains("Project (3 lines)"))
        .stdout(predicate::str::contains("Auto memory (2 lines)"))
        .stdout(predicate::str::contains("Local (").not())
        .stdout(predicate::str::contains(".mcp.json: github"))
        .stdout(predicate::str::contains("settings.json: linear"));
}

#[test]
fn check_plugin_compares_installed_record() {
    let env = Env::new();
    let missing = env.path("no-such-source");

    env.jikko()
        .args(["util", "check", "plugin", "--source"])
        .arg(&missing)
        .assert()
        .success()
        .stdout(predicate::str::contains("Plugin: browse@saiden"))
        .stdout(predicate::str::contains("Not found"));

    std::fs::create_dir_all(env.path("claude/plugins")).unwrap();
    std::fs::write(
        env.path("claude/plugins/installed_plugins.json"),
        r#"{ "plugins": { "browse@saiden": [ { "version": "2.1.0", "gitCommitSha": "9f8e7d6c5b4a" } ] } }"#,
    )
    .unwrap();

    env.jikko()
        .args(["util", "check", "plugin", "--source"])
        .arg(&missing)
        .assert()
        .success()
        .stdout(predicate::str::contains("Version: 2.1.0"))
        .stdout(predicate::str::contains("Commit:  9f8e7d6"))
        .stdout(predicate::str::contains("Source").not())
        .stdout(predicate::str::contains("sync").not());

    env.jikko()
        .args(["util", "check", "plugin", "--plugin", "other", "--source"])
        .arg(&missing)
        .assert()
        .success()
        .stdout(predicate::str::contains("Plugin: other@saiden"))
        .stdout(predicate::str::contains("Not installed"));
}

#[test]
fn ratatui_docs_lists_topics() {
    let env = Env::new();
    std::fs::create_dir_all(env.path("docs")).unwrap();
    std::fs::write(env.path("docs/layout.md"), "# Layout\n").unwrap();

    env.jikko()
        .args(["ratatui", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom-widgets"));

    env.jikko()
        .args(["ratatui", "docs", "layout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FILE_PATH="));

    env.jikko()
        .args(["ratatui", "docs", "colors"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unknown topic: colors"));
}

#[test]
fn plans_ls_reads_plan_files() {
    let env = Env::new();
    std::fs::create_dir_all(env.path("claude/plans")).unwrap();
    std::fs::write(
        env.path("claude/plans/router.md"),
        "# Plan: Router rewrite\n\nsrc/jikko/router.rs\n\n## Phase 1\n",
    )
    .unwrap();

    env.jikko()
        .args(["plans", "ls"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Router rewrite"))
        .stdout(predicate::str::contains("jikko"));
}

#[test]
fn bump_dry_run_leaves_manifest() {
    let env = Env::new();
    let manifest = "[package]\nname = \"demo\"\nversion = \"1.2.3\"\n";
    std::fs::write(env.path("work/Cargo.toml"), manifest).unwrap();

    env.jikko()
        .args(["bump", "minor", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New:     1.3.0"));

    assert_eq!(std::fs::read_to_string(env.path("work/Cargo.toml")).unwrap(), manifest);
}

#[test]
fn bump_without_git_rewrites_version() {
    let env = Env::new();
    std::fs::write(
        env.path("work/package.json"),
        "{\n  \"name\": \"demo\",\n  \"version\": \"0.9.9\"\n}\n",
    )
    .unwrap();

    env.jikko()
        .args(["bump", "--major", "--no-git"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.9.9 -> 1.0.0"));

    let updated = std::fs::read_to_string(env.path("work/package.json")).unwrap();
    assert!(updated.contains("\"version\": \"1.0.0\""));
}

#[test]
fn bump_outside_a_project_fails() {
    let env = Env::new();
    env.jikko().arg("bump").assert().code(1);
}

#[test]
fn install_refuses_existing_without_force() {
    let env = Env::new();
    std::fs::create_dir_all(env.path("repo/commands/git")).unwrap();
    std::fs::write(env.path("repo/commands/git/log.md"), "log").unwrap();
    std::fs::create_dir_all(env.path("claude/commands")).unwrap();

    env.jikko()
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already exists (directory)"));

    env.jikko()
        .args(["install", "--force", "--copy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 commands installed"));
    assert!(env.path("claude/commands/git/log.md").exists());
}
