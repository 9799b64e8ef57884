//! Semantic version bumping across project types.

use crate::error::{JikkoError, Result};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// ProjectType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    Rust,
    Python,
    Node,
    Ruby,
}

impl ProjectType {
    /// Detection order.
    pub fn all() -> &'static [ProjectType] {
        &[
            ProjectType::Rust,
            ProjectType::Python,
            ProjectType::Node,
            ProjectType::Ruby,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Rust => "rust",
            ProjectType::Python => "python",
            ProjectType::Node => "node",
            ProjectType::Ruby => "ruby",
        }
    }

    fn version_re(&self) -> &'static Regex {
        static TOML_RE: OnceLock<Regex> = OnceLock::new();
        static JSON_RE: OnceLock<Regex> = OnceLock::new();
        static RUBY_RE: OnceLock<Regex> = OnceLock::new();
        match self {
            ProjectType::Rust | ProjectType::Python => {
                TOML_RE.get_or_init(|| Regex::new(r#"(?m)^version = "(.+?)""#).unwrap())
            }
            ProjectType::Node => {
                JSON_RE.get_or_init(|| Regex::new(r#""version":\s*"(.+?)""#).unwrap())
            }
            ProjectType::Ruby => {
                RUBY_RE.get_or_init(|| Regex::new(r#"VERSION\s*=\s*["'](.+?)["']"#).unwrap())
            }
        }
    }

    fn locate(&self, root: &Path) -> Option<PathBuf> {
        match self {
            ProjectType::Rust => existing(root.join("Cargo.toml")),
            ProjectType::Python => existing(root.join("pyproject.toml")),
            ProjectType::Node => existing(root.join("package.json")),
            ProjectType::Ruby => {
                let lib = root.join("lib");
                if !lib.is_dir() {
                    return None;
                }
                crate::io::find_named(&lib, &["version.rb"]).into_iter().next()
            }
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.is_file().then_some(path)
}

// ---------------------------------------------------------------------------
// BumpKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BumpKind {
    Major,
    Minor,
    #[default]
    Patch,
}

impl BumpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpKind::Major => "major",
            BumpKind::Minor => "minor",
            BumpKind::Patch => "patch",
        }
    }
}

impl FromStr for BumpKind {
    type Err = String;

    /// Accepts `major`, `--major`, etc.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim_start_matches('-') {
            "major" => Ok(BumpKind::Major),
            "minor" => Ok(BumpKind::Minor),
            "patch" => Ok(BumpKind::Patch),
            other => Err(format!("unknown bump kind '{other}' (major, minor, patch)")),
        }
    }
}

/// Compute the next version. Components parse by leading digits, so
/// `1.2.3-rc.1` bumps as `1.2.3`.
pub fn next_version(current: &str, kind: BumpKind) -> String {
    let mut parts = current.split('.').map(leading_number);
    let major = parts.next().unwrap_or(0);
    let minor = parts.next().unwrap_or(0);
    let patch = parts.next().unwrap_or(0);

    match kind {
        BumpKind::Major => format!("{}.0.0", major + 1),
        BumpKind::Minor => format!("{major}.{}.0", minor + 1),
        BumpKind::Patch => format!("{major}.{minor}.{}", patch + 1),
    }
}

fn leading_number(part: &str) -> u64 {
    let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Project {
    pub kind: ProjectType,
    pub file: PathBuf,
}

impl Project {
    /// Find the first supported manifest under `root`.
    pub fn detect(root: &Path) -> Result<Self> {
        for kind in ProjectType::all() {
            if let Some(file) = kind.locate(root) {
                return Ok(Self { kind: *kind, file });
            }
        }
        Err(JikkoError::NoProjectFound)
    }

    pub fn read_version(&self) -> Result<String> {
        let content = std::fs::read_to_string(&self.file)?;
        self.version_in(&content)
            .ok_or_else(|| JikkoError::VersionNotFound(self.file.display().to_string()))
    }

    fn version_in(&self, content: &str) -> Option<String> {
        self.kind
            .version_re()
            .captures(content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Rewrite the first version match to `new`. Returns the new content.
    pub fn rewrite(&self, content: &str, new: &str) -> Option<String> {
        let group = self.kind.version_re().captures(content)?.get(1)?;
        let mut updated = String::with_capacity(content.len() + new.len());
        updated.push_str(&content[..group.start()]);
        updated.push_str(new);
        updated.push_str(&content[group.end()..]);
        Some(updated)
    }

    pub fn write_version(&self, new: &str) -> Result<()> {
        let content = std::fs::read_to_string(&self.file)?;
        let updated = self
            .rewrite(&content, new)
            .ok_or_else(|| JikkoError::VersionNotFound(self.file.display().to_string()))?;
        crate::io::atomic_write(&self.file, updated.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn bump_kinds() {
        assert_eq!(next_version("1.2.3", BumpKind::Patch), "1.2.4");
        assert_eq!(next_version("1.2.3", BumpKind::Minor), "1.3.0");
        assert_eq!(next_version("1.2.3", BumpKind::Major), "2.0.0");
    }

    #[test]
    fn prerelease_suffix_is_dropped() {
        assert_eq!(next_version("1.0.0-rc.1", BumpKind::Patch), "1.0.1");
        assert_eq!(next_version("0.9", BumpKind::Patch), "0.9.1");
    }

    #[test]
    fn kind_parses_with_or_without_dashes() {
        assert_eq!("minor".parse::<BumpKind>().unwrap(), BumpKind::Minor);
        assert_eq!("--major".parse::<BumpKind>().unwrap(), BumpKind::Major);
        assert!("huge".parse::<BumpKind>().is_err());
        assert_eq!(BumpKind::default(), BumpKind::Patch);
    }

    #[test]
    fn detects_cargo_before_package_json() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("package.json"), r#"{"version": "3.0.0"}"#).unwrap();
        std::fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"x\"\nversion = \"0.1.0\"\n",
        )
        .unwrap();

        let project = Project::detect(dir.path()).unwrap();
        assert_eq!(project.kind, ProjectType::Rust);
        assert_eq!(project.read_version().unwrap(), "0.1.0");
    }

    #[test]
    fn detects_ruby_version_file() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("lib/gem")).unwrap();
        std::fs::write(
            dir.path().join("lib/gem/version.rb"),
            "module Gem\n  VERSION = '2.4.1'\nend\n",
        )
        .unwrap();

        let project = Project::detect(dir.path()).unwrap();
        assert_eq!(project.kind, ProjectType::Ruby);
        assert_eq!(project.read_version().unwrap(), "2.4.1");
    }

    #[test]
    fn no_project_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Project::detect(dir.path()).unwrap_err(),
            JikkoError::NoProjectFound
        ));
    }

    #[test]
    fn rewrite_only_touches_first_match() {
        let dir = TempDir::new().unwrap();
        let manifest = "[package]\nversion = \"0.1.0\"\n\n[dependencies.x]\nversion = \"0.1.0\"\n";
        std::fs::write(dir.path().join("Cargo.toml"), manifest).unwrap();

        let project = Project::detect(dir.path()).unwrap();
        project.write_version("0.2.0").unwrap();

        let updated = std::fs::read_to_string(dir.path().join("Cargo.toml")).unwrap();
        assert_eq!(
            updated,
            "[package]\nversion = \"0.2.0\"\n\n[dependencies.x]\nversion = \"0.1.0\"\n"
        );
    }

    #[test]
    fn node_version_with_spacing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            "{\n  \"name\": \"x\",\n  \"version\":   \"1.9.9\"\n}\n",
        )
        .unwrap();
        let project = Project::detect(dir.path()).unwrap();
        assert_eq!(project.read_version().unwrap(), "1.9.9");
        let out = project.rewrite("\"version\": \"1.9.9\"", "2.0.0").unwrap();
        assert_eq!(out, "\"version\": \"2.0.0\"");
    }

    #[test]
    fn missing_version_line_is_version_not_found() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("pyproject.toml"), "[project]\nname = \"x\"\n").unwrap();
        let project = Project::detect(dir.path()).unwrap();
        assert!(matches!(
            project.read_version().unwrap_err(),
            JikkoError::VersionNotFound(_)
        ));
    }
}
