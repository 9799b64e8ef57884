use anyhow::Context as _;
use clap::Parser;
use jikko_core::bump::{next_version, BumpKind, Project};
use jikko_core::{paths, shell, Context};

use super::parse;

#[derive(Parser, Debug)]
struct BumpArgs {
    /// major, minor or patch
    kind: Option<BumpKind>,
    #[arg(long, conflicts_with_all = ["minor", "patch"])]
    major: bool,
    #[arg(long, conflicts_with = "patch")]
    minor: bool,
    #[arg(long)]
    patch: bool,
    /// Show the new version without writing anything
    #[arg(long)]
    dry_run: bool,
    /// Skip the commit and tag
    #[arg(long)]
    no_git: bool,
}

impl BumpArgs {
    fn bump_kind(&self) -> BumpKind {
        if self.major {
            BumpKind::Major
        } else if self.minor {
            BumpKind::Minor
        } else if self.patch {
            BumpKind::Patch
        } else {
            self.kind.unwrap_or_default()
        }
    }
}

pub fn run(ctx: &Context, args: &[String]) -> anyhow::Result<()> {
    let Some(opts) = parse::<BumpArgs>("jikko bump", args)? else {
        return Ok(());
    };
    let kind = opts.bump_kind();

    let cwd = std::env::current_dir().context("cannot read current directory")?;
    let project = Project::detect(&cwd)?;
    let current = project.read_version()?;
    let new = next_version(&current, kind);
    let file = project.file.display().to_string();

    ctx.ui.frame("Version Bump", || {
        println!("Project: {} ({})", project.kind, paths::tilde(&project.file));
        println!("Current: {current}");
        println!("New:     {new}");
        println!("Type:    {}", kind.as_str());
    });

    if opts.dry_run {
        ctx.ui.muted("Dry run, nothing written");
        return Ok(());
    }

    ctx.ui
        .step(&format!("Updating {}", paths::tilde(&project.file)), || {
            project.write_version(&new)
        })?;

    if !opts.no_git {
        let tag = format!("v{new}");
        ctx.ui.step("Committing", || {
            shell::run_quiet("git", &["add", &file])?;
            shell::run_quiet("git", &["commit", "-m", &new])
        })?;
        ctx.ui.step(&format!("Tagging {tag}"), || {
            shell::run_quiet("git", &["tag", "-a", &tag, "-m", &tag])
        })?;
    }

    ctx.ui.ok(&format!("{current} -> {new}"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(args: &[&str]) -> BumpKind {
        let argv = std::iter::once("bump").chain(args.iter().copied());
        BumpArgs::try_parse_from(argv).unwrap().bump_kind()
    }

    #[test]
    fn default_is_patch() {
        assert_eq!(kind_of(&[]), BumpKind::Patch);
    }

    #[test]
    fn positional_and_flag_forms() {
        assert_eq!(kind_of(&["minor"]), BumpKind::Minor);
        assert_eq!(kind_of(&["--major"]), BumpKind::Major);
        assert_eq!(kind_of(&["--minor", "--dry-run"]), BumpKind::Minor);
    }

    #[test]
    fn conflicting_flags_are_rejected() {
        assert!(BumpArgs::try_parse_from(["bump", "--major", "--patch"]).is_err());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(BumpArgs::try_parse_from(["bump", "huge"]).is_err());
    }
}
