use crate::error::{JikkoError, Result};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const CONFIG_ENV: &str = "JIKKO_CONFIG";
pub const CONFIG_FILE: &str = ".config/jikko/config.yaml";

pub const SETTINGS_FILE: &str = "settings.json";
pub const COMMANDS_DIR: &str = "commands";
pub const PLANS_DIR: &str = "plans";
pub const PLUGINS_CACHE_DIR: &str = "plugins/cache";
pub const INSTALLED_PLUGINS_FILE: &str = "plugins/installed_plugins.json";
pub const MANAGED_SETTINGS_FILE: &str =
    "/Library/Application Support/ClaudeCode/managed-settings.json";
pub const PROJECTS_DIR: &str = "projects";
pub const AUTO_MEMORY_FILE: &str = "memory/MEMORY.md";
pub const HANDLERS_SRC_DIR: &str = "crates/jikko-cli/src/cmd";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn home_dir() -> Result<PathBuf> {
    home::home_dir().ok_or(JikkoError::HomeNotFound)
}

/// Expand a leading `~` to the home directory. Other paths pass through.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match home::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Replace the home directory prefix with `~` for display.
pub fn tilde(path: &Path) -> String {
    match home::home_dir() {
        Some(home) => tilde_with(path, &home),
        None => path.display().to_string(),
    }
}

fn tilde_with(path: &Path, home: &Path) -> String {
    match path.strip_prefix(home) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Ok(rest) => format!("~/{}", rest.display()),
        Err(_) => path.display().to_string(),
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(home_dir()?.join(CONFIG_FILE))
}

/// `$JIKKO_CONFIG` when set, else the default location.
pub fn config_path() -> Result<PathBuf> {
    match std::env::var_os(CONFIG_ENV) {
        Some(p) => Ok(PathBuf::from(p)),
        None => default_config_path(),
    }
}

pub fn settings_path(claude_dir: &Path) -> PathBuf {
    claude_dir.join(SETTINGS_FILE)
}

/// Per-project directory name under `claude_dir/projects`: the absolute
/// path with `/` turned into `-`, minus the leading `-`.
pub fn project_key(dir: &Path) -> String {
    let key = dir.display().to_string().replace('/', "-");
    key.strip_prefix('-').unwrap_or(&key).to_string()
}

pub fn auto_memory_file(claude_dir: &Path, project_dir: &Path) -> PathBuf {
    claude_dir
        .join(PROJECTS_DIR)
        .join(project_key(project_dir))
        .join(AUTO_MEMORY_FILE)
}

pub fn handler_source(repo_dir: &Path, category: &str, name: &str) -> PathBuf {
    repo_dir
        .join(HANDLERS_SRC_DIR)
        .join(category)
        .join(format!("{}.rs", name.replace('-', "_")))
}

pub fn skill_file(repo_dir: &Path, category: &str, name: &str) -> PathBuf {
    repo_dir
        .join(COMMANDS_DIR)
        .join(category)
        .join(format!("{name}.md"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_tilde_paths_pass_through() {
        assert_eq!(expand_tilde(Path::new("/etc/hosts")), PathBuf::from("/etc/hosts"));
        assert_eq!(expand_tilde(Path::new("rel/x")), PathBuf::from("rel/x"));
    }

    #[test]
    fn tilde_is_expanded_under_home() {
        if let Some(home) = home::home_dir() {
            assert_eq!(expand_tilde(Path::new("~/Projects")), home.join("Projects"));
        }
    }

    #[test]
    fn tilde_display_replaces_home_prefix() {
        let home = Path::new("/home/chi");
        assert_eq!(tilde_with(Path::new("/home/chi/.claude"), home), "~/.claude");
        assert_eq!(tilde_with(home, home), "~");
        assert_eq!(tilde_with(Path::new("/opt/x"), home), "/opt/x");
    }

    #[test]
    fn handler_source_uses_snake_case_file() {
        let p = handler_source(Path::new("/r"), "git", "force-push");
        assert_eq!(p, PathBuf::from("/r/crates/jikko-cli/src/cmd/git/force_push.rs"));
    }

    #[test]
    fn project_key_flattens_absolute_path() {
        assert_eq!(project_key(Path::new("/Users/chi/Projects/jikko")), "Users-chi-Projects-jikko");
        assert_eq!(
            auto_memory_file(Path::new("/c"), Path::new("/w/app")),
            PathBuf::from("/c/projects/w-app/memory/MEMORY.md")
        );
    }
}
