use clap::Parser;
use jikko_core::{paths, Context};
use std::path::{Path, PathBuf};

use super::parse;

const TOPICS: &[(&str, &str)] = &[
    ("quickstart", "Getting started, lifecycle, viewport modes"),
    ("widgets", "All widgets + Style reference"),
    ("layout", "Constraints, Rect, nested layouts"),
    ("state", "ListState, TableState, stateful rendering"),
    ("events", "Key, mouse, resize, pattern matching"),
    ("testing", "TestHelper, snapshots, debugging"),
    ("custom-widgets", "Building custom widgets"),
    ("async", "Background tasks, Process.spawn"),
];

#[derive(Parser, Debug)]
struct DocsArgs {
    /// Topic name, or `all`
    topic: Option<String>,
}

pub fn docs(ctx: &Context, args: &[String]) -> anyhow::Result<()> {
    let Some(opts) = parse::<DocsArgs>("jikko ratatui docs", args)? else {
        return Ok(());
    };
    let dir = ctx.config.docs_dir();
    let topic = opts.topic.map(|t| t.to_lowercase()).unwrap_or_default();

    match topic.as_str() {
        "" => list_topics(ctx, &dir),
        "all" => {
            ctx.ui.title("All Documentation");
            for (name, _) in TOPICS {
                let path = topic_file(&dir, name);
                if path.is_file() {
                    ctx.ui.ok(name);
                    println!("FILE_PATH={}", path.display());
                } else {
                    ctx.ui.err(&format!("Missing: {name}"));
                }
            }
        }
        name if is_topic(name) => {
            let path = topic_file(&dir, name);
            if path.is_file() {
                ctx.ui.title(&format!("{name}.md"));
                ctx.ui.info(&paths::tilde(&path));
                ctx.ui.blank();
                println!("FILE_PATH={}", path.display());
            } else {
                ctx.ui.err(&format!("File not found: {}", paths::tilde(&path)));
            }
        }
        unknown => {
            ctx.ui.err(&format!("Unknown topic: {unknown}"));
            ctx.ui.blank();
            list_topics(ctx, &dir);
        }
    }
    Ok(())
}

fn list_topics(ctx: &Context, dir: &Path) {
    ctx.ui.title("Ratatui Documentation");
    ctx.ui.table(&["Topic", "Description", "File"], &topic_rows(dir));
    ctx.ui.blank();
    ctx.ui.info("Usage: jikko ratatui docs <topic>");
    ctx.ui.info("       jikko ratatui docs all");
}

fn topic_rows(dir: &Path) -> Vec<Vec<String>> {
    TOPICS
        .iter()
        .map(|(name, desc)| {
            let mark = if topic_file(dir, name).is_file() {
                "\u{2713}"
            } else {
                "\u{2717}"
            };
            vec![name.to_string(), desc.to_string(), mark.to_string()]
        })
        .collect()
}

fn is_topic(name: &str) -> bool {
    TOPICS.iter().any(|(t, _)| *t == name)
}

fn topic_file(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.md"))
}
