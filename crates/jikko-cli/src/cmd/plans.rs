use chrono::{DateTime, Local};
use jikko_core::{paths, Context};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

const TITLE_WIDTH: usize = 40;

#[derive(Debug, Clone, PartialEq)]
struct Plan {
    title: String,
    project: String,
    phases: usize,
    modified: DateTime<Local>,
}

impl Plan {
    fn from_content(content: &str, modified: DateTime<Local>) -> Self {
        Self {
            title: plan_title(content),
            project: plan_project(content),
            phases: phase_re().find_iter(content).count(),
            modified,
        }
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.modified.format("%Y-%m-%d").to_string(),
            self.project.clone(),
            self.title.chars().take(TITLE_WIDTH).collect(),
            self.phases.to_string(),
        ]
    }
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^# (.+)").unwrap())
}

fn phase_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^## Phase").unwrap())
}

fn project_res() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        [r"(?i)lib/([a-z_-]+)/", r"(?i)Projects/([a-z_-]+)/", r"(?i)src/([a-z_-]+)/"]
            .iter()
            .map(|p| Regex::new(p).unwrap())
            .collect()
    })
}

fn plan_title(content: &str) -> String {
    title_re()
        .captures(content)
        .map(|c| {
            let title = c[1].trim();
            title.strip_prefix("Plan: ").unwrap_or(title).to_string()
        })
        .unwrap_or_else(|| "(untitled)".to_string())
}

/// First project-looking path mentioned in the plan, tried in order.
fn plan_project(content: &str) -> String {
    project_res()
        .iter()
        .find_map(|re| re.captures(content).map(|c| c[1].to_string()))
        .unwrap_or_else(|| "-".to_string())
}

fn load_plans(dir: &Path) -> anyhow::Result<Vec<Plan>> {
    let mut plans = Vec::new();
    if !dir.is_dir() {
        return Ok(plans);
    }
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping unreadable plan");
                continue;
            }
        };
        let modified = std::fs::metadata(&path)?.modified()?;
        plans.push(Plan::from_content(&content, modified.into()));
    }
    plans.sort_by(|a, b| b.modified.cmp(&a.modified));
    Ok(plans)
}

pub fn ls(ctx: &Context, _args: &[String]) -> anyhow::Result<()> {
    let plans = load_plans(&ctx.config.claude_dir.join(paths::PLANS_DIR))?;
    if plans.is_empty() {
        ctx.ui.muted("No plans found");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = plans.iter().map(Plan::row).collect();
    ctx.ui.table(&["Modified", "Project", "Title", "Phases"], &rows);
    Ok(())
}
