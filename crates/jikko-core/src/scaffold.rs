//! New-command scaffolding: a handler stub plus its markdown skill file.

use crate::error::{JikkoError, Result};
use crate::naming;
use crate::paths;
use crate::registry::{CommandPath, KEY_SEPARATOR};
use std::path::{Path, PathBuf};

pub const DEFAULT_DESCRIPTION: &str = "TODO";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scaffold {
    /// Slash-separated namespace, e.g. `git` or `util/check`.
    pub category: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldFiles {
    pub rust_file: PathBuf,
    pub md_file: PathBuf,
}

impl Scaffold {
    pub fn new(category: &str, name: &str, description: Option<&str>) -> Self {
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DESCRIPTION);
        Self {
            category: category.trim_matches('/').to_string(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    fn segments(&self) -> Vec<&str> {
        self.category
            .split('/')
            .filter(|s| !s.is_empty())
            .chain(std::iter::once(self.name.as_str()))
            .collect()
    }

    /// Registry key, e.g. `util/check/mcp`.
    pub fn command_key(&self) -> String {
        self.segments().join("/")
    }

    /// What the user types, e.g. `util check mcp`.
    pub fn cli_command(&self) -> String {
        self.segments().join(" ")
    }

    pub fn identifier(&self) -> String {
        naming::handler_identifier(&self.segments())
    }

    /// Slash-command name for the skill, e.g. `/util:check:mcp`.
    pub fn skill_name(&self) -> String {
        format!("/{}", self.segments().join(":"))
    }

    pub fn files(&self, repo_dir: &Path) -> ScaffoldFiles {
        ScaffoldFiles {
            rust_file: paths::handler_source(repo_dir, &self.category, &self.name),
            md_file: paths::skill_file(repo_dir, &self.category, &self.name),
        }
    }

    /// Rejects empty or flag-like segments and a name holding a separator.
    pub fn validate(&self) -> Result<CommandPath> {
        if self.name.contains(KEY_SEPARATOR) {
            return Err(JikkoError::InvalidCommandPath(format!(
                "{}{KEY_SEPARATOR}{}",
                self.category, self.name
            )));
        }
        CommandPath::parse(&format!("{}{KEY_SEPARATOR}{}", self.category, self.name))
    }

    /// The line to add to `registry()` in `cmd/mod.rs` for this handler.
    pub fn registration(&self) -> String {
        let module = self
            .segments()
            .iter()
            .map(|s| s.replace('-', "_"))
            .collect::<Vec<_>>()
            .join("::");
        format!(
            "reg.register({:?}, {:?}, {module}::run)?;",
            self.command_key(),
            self.description
        )
    }

    pub fn render_rust(&self) -> String {
        format!(
            "use jikko_core::Context;\n\
             \n\
             /// {desc}\n\
             ///\n\
             /// Registered as `{ident}`.\n\
             pub fn run(ctx: &Context, _args: &[String]) -> anyhow::Result<()> {{\n\
             \x20   ctx.ui.info(\"Not implemented yet\");\n\
             \x20   Ok(())\n\
             }}\n",
            desc = self.description,
            ident = self.identifier(),
        )
    }

    pub fn render_markdown(&self, program: &str) -> String {
        format!(
            "---\ndescription: {}\n---\n```bash\n{program} {} $ARGUMENTS\n```\n",
            self.description,
            self.cli_command()
        )
    }

    /// Write both files. Refuses to overwrite either.
    pub fn create(&self, repo_dir: &Path, program: &str) -> Result<ScaffoldFiles> {
        self.validate()?;
        let files = self.files(repo_dir);
        for path in [&files.rust_file, &files.md_file] {
            if path.exists() {
                return Err(JikkoError::AlreadyExists(paths::tilde(path)));
            }
        }
        crate::io::atomic_write(&files.rust_file, self.render_rust().as_bytes())?;
        crate::io::atomic_write(&files.md_file, self.render_markdown(program).as_bytes())?;
        Ok(files)
    }
}
