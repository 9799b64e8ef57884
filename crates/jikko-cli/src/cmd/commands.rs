//! Scaffolding for new commands. Output after `---` is a machine-readable
//! block of `KEY=value` lines for agents driving the scaffold.

use clap::Parser;
use jikko_core::scaffold::{Scaffold, ScaffoldFiles};
use jikko_core::{paths, Context, JikkoError};

use super::parse;
use crate::PROGRAM;

#[derive(Parser, Debug)]
struct InitArgs {
    /// Namespace, slash separated for nesting (e.g. `util/check`)
    category: String,
    name: String,
    description: Option<String>,
}

#[derive(Parser, Debug)]
struct AddArgs {
    category: String,
    name: String,
    /// Description words, joined with spaces
    description: Vec<String>,
}

pub fn init(ctx: &Context, args: &[String]) -> anyhow::Result<()> {
    let Some(opts) = parse::<InitArgs>("jikko commands init", args)? else {
        return Ok(());
    };
    let scaffold = Scaffold::new(&opts.category, &opts.name, opts.description.as_deref());
    scaffold_command(ctx, &scaffold)?;
    Ok(())
}

pub fn add(ctx: &Context, args: &[String]) -> anyhow::Result<()> {
    let Some(opts) = parse::<AddArgs>("jikko commands add", args)? else {
        return Ok(());
    };
    let description = opts.description.join(" ");
    let scaffold = Scaffold::new(&opts.category, &opts.name, Some(description.as_str()));

    if scaffold_command(ctx, &scaffold)?.is_some() {
        println!("---");
        println!("SCAFFOLD_CREATED=true");
        println!("DESCRIPTION={}", scaffold.description);
    }
    Ok(())
}

/// Create the files and report them. `None` when a file already exists.
fn scaffold_command(ctx: &Context, scaffold: &Scaffold) -> anyhow::Result<Option<ScaffoldFiles>> {
    let files = match scaffold.create(&ctx.config.repo_dir, PROGRAM) {
        Ok(files) => files,
        Err(JikkoError::AlreadyExists(path)) => {
            ctx.ui.err(&format!("Already exists: {path}"));
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    ctx.ui.ok(&format!("Created: {}", paths::tilde(&files.rust_file)));
    ctx.ui.ok(&format!("Created: {}", paths::tilde(&files.md_file)));
    ctx.ui.info(&format!("Usage: {}", scaffold.skill_name()));
    ctx.ui.info(&format!("Register in cmd/mod.rs: {}", scaffold.registration()));
    ctx.ui.muted(&format!(
        "Declare the module: pub mod {};",
        scaffold.name.replace('-', "_")
    ));

    println!("---");
    println!("RUST_FILE={}", files.rust_file.display());
    println!("MD_FILE={}", files.md_file.display());
    Ok(Some(files))
}
