//! Command router.
//!
//! Maps a flat argument vector onto a registered handler plus the residual
//! arguments. Path resolution is a longest-namespace walk: each leading
//! non-flag token is consumed while the extended path names either a handler
//! or a namespace, so both `git status` and
//! `commands add <category> <name> <desc...>` resolve without the handler
//! declaring how many free arguments it takes.

use crate::context::Context;
use crate::registry::{CommandPath, HandlerEntry, Registry, KEY_SEPARATOR};
use crate::ui::{Style, Ui};

pub const FLAG_PREFIX: char = '-';

// ---------------------------------------------------------------------------
// RouterConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    pub program: String,
    pub version: String,
    pub help_aliases: Vec<String>,
    pub version_aliases: Vec<String>,
}

impl RouterConfig {
    pub fn new(program: &str, version: &str) -> Self {
        Self {
            program: program.to_string(),
            version: version.to_string(),
            help_aliases: ["help", "--help", "-h"].map(String::from).to_vec(),
            version_aliases: ["version", "--version", "-v"].map(String::from).to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch / Outcome
// ---------------------------------------------------------------------------

/// A fully resolved command: which handler, and what it receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub path: CommandPath,
    pub identifier: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Help,
    Version,
    Command(Resolution),
    Unresolved {
        /// What the user typed as the command, for the error line.
        attempted: String,
        path: CommandPath,
        args: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Help,
    Version,
    Unresolved,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Unresolved => 1,
            Outcome::Completed | Outcome::Help | Outcome::Version => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Router {
    config: RouterConfig,
    registry: Registry,
}

impl Router {
    pub fn new(config: RouterConfig, registry: Registry) -> Self {
        Self { config, registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Split `args` into the longest registered command path and the rest.
    ///
    /// A token is consumed while it is not flag-like, holds no key separator,
    /// and the extended path names a handler or a namespace. A handler at a
    /// shorter path does not stop the walk.
    pub fn parse_args(&self, args: &[String]) -> (CommandPath, Vec<String>) {
        let mut path = CommandPath::new();
        let mut consumed = 0;

        for token in args {
            if token.starts_with(FLAG_PREFIX) {
                break;
            }
            if token.contains(KEY_SEPARATOR) {
                tracing::debug!(%token, "token holds a key separator, stopping");
                break;
            }
            let candidate = path.with(token);
            if self.registry.has_handler(&candidate) {
                tracing::debug!(path = %candidate, "handler matches, extending");
            } else if self.registry.has_namespace(&candidate) {
                tracing::debug!(path = %candidate, "namespace matches, extending");
            } else {
                tracing::debug!(path = %candidate, "no handler or namespace, stopping");
                break;
            }
            path = candidate;
            consumed += 1;
        }

        (path, args[consumed..].to_vec())
    }

    /// Load the handler for a finished path. Empty and namespace-only paths
    /// have none.
    pub fn resolve(&self, path: &CommandPath) -> Option<&HandlerEntry> {
        if path.is_empty() {
            return None;
        }
        self.registry.load(&path.identifier())
    }

    pub fn dispatch(&self, args: &[String]) -> Dispatch {
        let Some(first) = args.first() else {
            return Dispatch::Help;
        };
        if self.config.help_aliases.contains(first) {
            return Dispatch::Help;
        }
        if self.config.version_aliases.contains(first) {
            return Dispatch::Version;
        }

        let (path, rest) = self.parse_args(args);
        match self.resolve(&path) {
            Some(entry) => Dispatch::Command(Resolution {
                path,
                identifier: entry.identifier().to_string(),
                args: rest,
            }),
            None => Dispatch::Unresolved {
                attempted: attempted_command(args),
                path,
                args: rest,
            },
        }
    }

    /// Dispatch and invoke. Handler errors pass through untouched.
    pub fn run(&self, ctx: &Context, args: &[String]) -> anyhow::Result<Outcome> {
        match self.dispatch(args) {
            Dispatch::Help => {
                print!("{}", self.help_text(&ctx.ui));
                Ok(Outcome::Help)
            }
            Dispatch::Version => {
                println!("{}", self.version_text());
                Ok(Outcome::Version)
            }
            Dispatch::Unresolved { attempted, .. } => {
                println!("{}", self.unresolved_text(&ctx.ui, &attempted));
                Ok(Outcome::Unresolved)
            }
            Dispatch::Command(resolution) => {
                let Some(entry) = self.registry.load(&resolution.identifier) else {
                    let attempted = resolution.path.to_string();
                    println!("{}", self.unresolved_text(&ctx.ui, &attempted));
                    return Ok(Outcome::Unresolved);
                };
                tracing::debug!(
                    handler = %resolution.identifier,
                    args = ?resolution.args,
                    "invoking handler"
                );
                entry.invoke(ctx, &resolution.args)?;
                Ok(Outcome::Completed)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Text
    // -----------------------------------------------------------------------

    pub fn version_text(&self) -> String {
        format!("{} {}", self.config.program, self.config.version)
    }

    pub fn unresolved_text(&self, ui: &Ui, attempted: &str) -> String {
        format!(
            "{}\nRun {} for available commands",
            ui.paint(&format!("Unknown command: {attempted}"), Style::Red),
            ui.paint(&format!("{} help", self.config.program), Style::Bold)
        )
    }

    pub fn help_text(&self, ui: &Ui) -> String {
        let program = &self.config.program;
        let mut out = String::new();
        out.push_str(&format!(
            "{} v{}\n\n",
            ui.paint(program, Style::Bold),
            self.config.version
        ));
        out.push_str(&format!(
            "{} {program} <command> [args]\n\n",
            ui.paint("Usage:", Style::Cyan)
        ));
        out.push_str(&format!("{}\n", ui.paint("Commands:", Style::Cyan)));

        let listed: Vec<(String, &str)> = self
            .registry
            .entries()
            .map(|e| (e.path().to_string(), e.summary()))
            .collect();
        let width = listed.iter().map(|(p, _)| p.len()).max().unwrap_or(0);
        for (path, summary) in listed {
            if summary.is_empty() {
                out.push_str(&format!("  {path}\n"));
            } else {
                out.push_str(&format!("  {path:<width$}  {summary}\n"));
            }
        }
        out
    }
}

fn attempted_command(args: &[String]) -> String {
    let leading: Vec<&str> = args
        .iter()
        .take_while(|a| !a.starts_with(FLAG_PREFIX))
        .map(String::as_str)
        .collect();
    if leading.is_empty() {
        args.first().cloned().unwrap_or_default()
    } else {
        leading.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn noop(_: &Context, _: &[String]) -> anyhow::Result<()> {
        Ok(())
    }

    fn failing(_: &Context, _: &[String]) -> anyhow::Result<()> {
        anyhow::bail!("handler blew up")
    }

    static CALLS: AtomicUsize = AtomicUsize::new(0);

    fn counting(_: &Context, args: &[String]) -> anyhow::Result<()> {
        assert_eq!(args, ["--verbose".to_string()]);
        CALLS.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn router() -> Router {
        let mut reg = Registry::new();
        for key in [
            "git/status",
            "git/log",
            "ai/sd/generate",
            "ai/sd/models",
            "commands/add",
            "commands/init",
            "bump",
            "util/check/mcp",
        ] {
            reg.register(key, "", noop).unwrap();
        }
        reg.register("failing", "", failing).unwrap();
        reg.register("counting", "", counting).unwrap();
        Router::new(RouterConfig::new("jikko", "1.2.3"), reg)
    }

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn resolved(dispatch: Dispatch) -> Resolution {
        match dispatch {
            Dispatch::Command(r) => r,
            other => panic!("expected a resolved command, got {other:?}"),
        }
    }

    #[test]
    fn nested_handler_keeps_free_args() {
        let r = resolved(router().dispatch(&argv(&["ai", "sd", "generate", "a", "cat"])));
        assert_eq!(r.path.to_string(), "ai sd generate");
        assert_eq!(r.identifier, "AI::SD::Generate");
        assert_eq!(r.args, argv(&["a", "cat"]));
    }

    #[test]
    fn walk_stops_when_no_deeper_handler_or_namespace() {
        let r = resolved(router().dispatch(&argv(&[
            "commands",
            "add",
            "net",
            "switch",
            "Switch networks",
        ])));
        assert_eq!(r.path.to_string(), "commands add");
        assert_eq!(r.identifier, "Commands::Add");
        assert_eq!(r.args, argv(&["net", "switch", "Switch networks"]));
    }

    #[test]
    fn flag_ends_the_path() {
        let r = resolved(router().dispatch(&argv(&["git", "status", "--short", "x"])));
        assert_eq!(r.path.to_string(), "git status");
        assert_eq!(r.args, argv(&["--short", "x"]));
    }

    #[test]
    fn free_arg_matching_a_namespace_name_is_not_consumed_past_a_leaf() {
        let (path, rest) = router().parse_args(&argv(&["bump", "git", "status"]));
        assert_eq!(path.to_string(), "bump");
        assert_eq!(rest, argv(&["git", "status"]));
    }

    #[test]
    fn slash_joined_token_is_not_a_path() {
        let (path, rest) = router().parse_args(&argv(&["git/status", "x"]));
        assert!(path.is_empty());
        assert_eq!(rest, argv(&["git/status", "x"]));

        let (path, rest) = router().parse_args(&argv(&["git", "status/x"]));
        assert_eq!(path.to_string(), "git");
        assert_eq!(rest, argv(&["status/x"]));
    }

    #[test]
    fn slash_joined_token_is_unresolved() {
        match router().dispatch(&argv(&["git/status", "x"])) {
            Dispatch::Unresolved {
                attempted, path, ..
            } => {
                assert_eq!(attempted, "git/status x");
                assert!(path.is_empty());
            }
            other => panic!("expected unresolved, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_help() {
        assert_eq!(router().dispatch(&[]), Dispatch::Help);
    }

    #[test]
    fn help_aliases() {
        for alias in ["help", "--help", "-h"] {
            assert_eq!(router().dispatch(&argv(&[alias, "git"])), Dispatch::Help);
        }
    }

    #[test]
    fn version_aliases() {
        for alias in ["version", "--version", "-v"] {
            assert_eq!(router().dispatch(&argv(&[alias])), Dispatch::Version);
        }
        assert_eq!(router().version_text(), "jikko 1.2.3");
    }

    #[test]
    fn unknown_top_level_is_unresolved_with_empty_path() {
        match router().dispatch(&argv(&["bogus", "path"])) {
            Dispatch::Unresolved {
                attempted,
                path,
                args,
            } => {
                assert_eq!(attempted, "bogus path");
                assert!(path.is_empty());
                assert_eq!(args, argv(&["bogus", "path"]));
            }
            other => panic!("expected unresolved, got {other:?}"),
        }
    }

    #[test]
    fn namespace_without_deeper_handler_is_unresolved() {
        match router().dispatch(&argv(&["ai", "sd", "upscale"])) {
            Dispatch::Unresolved { path, args, .. } => {
                assert_eq!(path.to_string(), "ai sd");
                assert_eq!(args, argv(&["upscale"]));
            }
            other => panic!("expected unresolved, got {other:?}"),
        }
    }

    #[test]
    fn bare_namespace_is_unresolved() {
        assert!(matches!(
            router().dispatch(&argv(&["util", "check"])),
            Dispatch::Unresolved { .. }
        ));
    }

    #[test]
    fn leading_flag_is_unresolved() {
        match router().dispatch(&argv(&["--json"])) {
            Dispatch::Unresolved { attempted, .. } => assert_eq!(attempted, "--json"),
            other => panic!("expected unresolved, got {other:?}"),
        }
    }

    #[test]
    fn dispatch_is_deterministic() {
        let input = argv(&["commands", "init", "git", "tag", "Tag a release"]);
        let r = router();
        assert_eq!(r.dispatch(&input), r.dispatch(&input));
        assert_eq!(router().dispatch(&input), r.dispatch(&input));
    }

    #[test]
    fn outcome_exit_codes() {
        assert_eq!(Outcome::Completed.exit_code(), 0);
        assert_eq!(Outcome::Help.exit_code(), 0);
        assert_eq!(Outcome::Version.exit_code(), 0);
        assert_eq!(Outcome::Unresolved.exit_code(), 1);
    }

    #[test]
    fn run_invokes_handler_with_residual_args() {
        let before = CALLS.load(Ordering::SeqCst);
        let outcome = router()
            .run(&Context::default(), &argv(&["counting", "--verbose"]))
            .unwrap();
        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(CALLS.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn run_reports_unresolved_without_error() {
        let outcome = router()
            .run(&Context::default(), &argv(&["bogus"]))
            .unwrap();
        assert_eq!(outcome, Outcome::Unresolved);
        assert_eq!(outcome.exit_code(), 1);
    }

    #[test]
    fn handler_errors_pass_through() {
        let err = router()
            .run(&Context::default(), &argv(&["failing"]))
            .unwrap_err();
        assert_eq!(err.to_string(), "handler blew up");
    }

    #[test]
    fn help_lists_every_registered_path() {
        let text = router().help_text(&Ui::plain());
        assert!(text.starts_with("jikko v1.2.3\n"));
        assert!(text.contains("Usage: jikko <command> [args]"));
        assert!(text.contains("  ai sd generate"));
        assert!(text.contains("  git status"));
        assert!(text.contains("  util check mcp"));
    }

    #[test]
    fn help_aligns_summaries() {
        let mut reg = Registry::new();
        reg.register("bump", "Bump version", noop).unwrap();
        reg.register("git/status", "Working tree", noop).unwrap();
        let text = Router::new(RouterConfig::new("jikko", "0.1.0"), reg).help_text(&Ui::plain());
        assert!(text.contains("  bump        Bump version\n"));
        assert!(text.contains("  git status  Working tree\n"));
    }

    #[test]
    fn unresolved_text_names_path_and_hint() {
        let text = router().unresolved_text(&Ui::plain(), "bogus path");
        assert_eq!(
            text,
            "Unknown command: bogus path\nRun jikko help for available commands"
        );
    }
}
