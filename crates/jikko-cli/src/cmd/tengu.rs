//! Tengu deployment host checks and the tengu-init installer.

use anyhow::Context as _;
use clap::Parser;
use jikko_core::config::HostConfig;
use jikko_core::{paths, shell, Context};
use serde::Serialize;
use serde_json::Value;

use super::parse;

const DEFAULT_HOST: &str = "junkpile";
const CURL: &str = "curl -s --connect-timeout 5";
const TOKEN_LOOKUP: &str = "grep -Po '(?<=token = \")[^\"]+' /etc/tengu/config.toml 2>/dev/null \
     || grep TOKEN /etc/tengu/env 2>/dev/null | cut -d= -f2";

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
struct StatusArgs {
    /// Host name from the `hosts` config table
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,
    /// Print the collected checks as JSON
    #[arg(short, long)]
    json: bool,
    /// Skip the deployed apps listing
    #[arg(short, long)]
    quick: bool,
}

#[derive(Debug, Default, Serialize)]
struct Checks {
    ssh: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uptime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_health: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    disk: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    memory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    load: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    containers: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    apps: Option<Vec<Value>>,
}

#[derive(Debug, Serialize)]
struct Report {
    host: String,
    checks: Checks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Health {
    Healthy,
    Degraded,
    Unreachable,
}

impl Checks {
    fn health(&self) -> Health {
        if !self.ssh {
            Health::Unreachable
        } else if self.service.as_deref() == Some("active") && self.api_health.is_some() {
            Health::Healthy
        } else {
            Health::Degraded
        }
    }

    fn api_ok(&self) -> bool {
        self.api_health
            .as_ref()
            .and_then(|h| h.get("status"))
            .and_then(Value::as_str)
            == Some("ok")
    }

    fn summary_rows(&self, host: &str) -> Vec<Vec<String>> {
        let na = || "N/A".to_string();
        vec![
            vec!["Host".into(), host.to_string()],
            vec!["SSH".into(), if self.ssh { "OK" } else { "FAILED" }.into()],
            vec!["Service".into(), self.service.clone().unwrap_or_else(na)],
            vec![
                "API".into(),
                if self.api_health.is_some() { "OK".into() } else { na() },
            ],
            vec![
                "Version".into(),
                self.version
                    .as_ref()
                    .and_then(|v| v.get("version"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(na),
            ],
            vec![
                "Apps".into(),
                self.apps
                    .as_ref()
                    .map(|a| a.len().to_string())
                    .unwrap_or_else(na),
            ],
        ]
    }
}

pub fn status(ctx: &Context, args: &[String]) -> anyhow::Result<()> {
    let Some(opts) = parse::<StatusArgs>("jikko tengu status", args)? else {
        return Ok(());
    };
    let Some(host) = ctx.config.host(&opts.host) else {
        ctx.ui.err(&format!("Unknown host: {}", opts.host));
        let known: Vec<&str> = ctx.config.hosts.keys().map(String::as_str).collect();
        ctx.ui.err(&format!("Available hosts: {}", known.join(", ")));
        anyhow::bail!("unknown host '{}'", opts.host);
    };

    let checks = collect(host, opts.quick);
    let report = Report {
        host: opts.host,
        checks,
    };

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render(ctx, host, &report);
    }
    Ok(())
}

fn collect(host: &HostConfig, quick: bool) -> Checks {
    let ssh = |remote: &str| shell::ssh_capture(&host.ssh, remote).trim().to_string();
    let mut checks = Checks {
        ssh: shell::ssh_reachable(&host.ssh).unwrap_or(false),
        ..Checks::default()
    };
    if !checks.ssh {
        return checks;
    }

    let service = ssh("systemctl is-active tengu 2>/dev/null || echo unknown");
    if service == "active" {
        let since = ssh("systemctl show tengu --property=ActiveEnterTimestamp --value 2>/dev/null");
        checks.uptime = non_empty(since);
    }
    checks.service = Some(service);

    checks.api_health = parse_json(&ssh(&format!("{CURL} {}/health 2>/dev/null", host.api)));
    if checks.api_health.is_some() {
        checks.version = parse_json(&ssh(&format!("{CURL} {}/version 2>/dev/null", host.api)));
    }

    checks.disk = non_empty(ssh(
        "df -h /var/lib/tengu 2>/dev/null | tail -1 | awk '{print $3\"/\"$2\" (\"$5\" used)\"}'",
    ));
    checks.memory = non_empty(ssh("free -h | awk '/^Mem:/ {print $3\"/\"$2\" used\"}'"));
    checks.load = non_empty(ssh("awk '{print $1\", \"$2\", \"$3}' /proc/loadavg"));
    checks.containers = ssh("docker ps -q 2>/dev/null | wc -l").parse().ok();

    if !quick && checks.api_health.is_some() {
        let token = ssh(TOKEN_LOOKUP);
        checks.apps = Some(if token.is_empty() {
            Vec::new()
        } else {
            let auth = shell::shell_quote(&format!("Authorization: Bearer {token}"));
            let body = ssh(&format!("{CURL} -H {auth} {}/api/apps 2>/dev/null", host.api));
            parse_json(&body)
                .and_then(|v| v.as_array().cloned())
                .unwrap_or_default()
        });
    }
    checks
}

fn render(ctx: &Context, host: &HostConfig, report: &Report) {
    let ui = &ctx.ui;
    let checks = &report.checks;

    ui.title(&format!("Tengu Status: {}", report.host));
    ui.info(&host.description);

    ui.frame("SSH Connectivity", || {
        if checks.ssh {
            ui.ok(&format!("Connected to {}", host.ssh));
        } else {
            ui.err(&format!("Cannot connect to {}", host.ssh));
        }
    });

    if checks.ssh {
        ui.frame("Service Status", || match checks.service.as_deref() {
            Some("active") => {
                ui.ok("tengu.service is running");
                if let Some(since) = &checks.uptime {
                    ui.info(&format!("Running since: {since}"));
                }
            }
            Some("inactive") => ui.warn("tengu.service is stopped"),
            Some("failed") => ui.err("tengu.service has failed"),
            other => ui.warn(&format!("tengu.service status: {}", other.unwrap_or("unknown"))),
        });

        ui.frame("API Health", || match &checks.api_health {
            Some(_) if checks.api_ok() => ui.ok("API responding: ok"),
            Some(h) => ui.warn(&format!(
                "API status: {}",
                h.get("status").and_then(Value::as_str).unwrap_or("unknown")
            )),
            None => ui.err("API not responding or invalid response"),
        });

        if let Some(version) = &checks.version {
            ui.frame("Version Info", || {
                for (label, key) in [("Name:   ", "name"), ("Version:", "version"), ("Commit: ", "commit")] {
                    let value = version.get(key).and_then(Value::as_str).unwrap_or("-");
                    ui.info(&format!("{label} {value}"));
                }
            });
        }

        ui.frame("System Resources", || {
            let rows = [
                ("Tengu data:", &checks.disk),
                ("Memory:    ", &checks.memory),
                ("Load avg:  ", &checks.load),
            ];
            for (label, value) in rows {
                if let Some(value) = value {
                    ui.info(&format!("{label} {value}"));
                }
            }
            ui.info(&format!("Containers: {} running", checks.containers.unwrap_or(0)));
        });

        if let Some(apps) = &checks.apps {
            ui.frame("Deployed Apps", || {
                if apps.is_empty() {
                    ui.info("No apps deployed");
                } else {
                    ui.table(&["Name", "Status", "Domain", "Created"], &app_rows(apps));
                }
            });
        }
    }

    ui.title("Summary");
    ui.table(&["Check", "Status"], &checks.summary_rows(&report.host));
    ui.blank();
    match checks.health() {
        Health::Healthy => ui.ok(&format!("Tengu is healthy on {}", report.host)),
        Health::Degraded => ui.warn(&format!("Tengu has issues on {}", report.host)),
        Health::Unreachable => ui.err(&format!("Cannot reach {}", report.host)),
    }
}

fn app_rows(apps: &[Value]) -> Vec<Vec<String>> {
    let field = |app: &Value, key: &str| {
        app.get(key)
            .and_then(Value::as_str)
            .unwrap_or("-")
            .to_string()
    };
    apps.iter()
        .map(|app| {
            let created = field(app, "created_at");
            let date = created.split('T').next().unwrap_or("-").to_string();
            vec![field(app, "name"), field(app, "status"), field(app, "domain"), date]
        })
        .collect()
}

fn parse_json(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

pub fn init(ctx: &Context, _args: &[String]) -> anyhow::Result<()> {
    let dir = &ctx.config.tengu_init_dir;
    if !dir.is_dir() {
        ctx.ui.err(&format!("Not found: {}", paths::tilde(dir)));
        return Ok(());
    }

    let local = pkgid_version(&shell::capture_lossy_in(dir, "cargo", &["pkgid"]));
    let installed = shell::capture_lossy("tengu-init", &["--version"])
        .split_whitespace()
        .last()
        .map(str::to_string);

    if local.is_some() && local == installed {
        ctx.ui.ok(&format!("Up to date ({})", installed.unwrap_or_default()));
        return Ok(());
    }

    ctx.ui.info(&format!(
        "Local: {}, Installed: {}",
        local.as_deref().unwrap_or("unknown"),
        installed.as_deref().unwrap_or("none")
    ));
    ctx.ui
        .step("Building", || {
            shell::run_quiet_in(dir, "cargo", &["install", "--path", "."])
        })
        .context("cargo install failed")?;
    ctx.ui.ok("Rebuilt");
    Ok(())
}

/// Version from `cargo pkgid` output: `path+file:///x#name@1.2.3` or
/// `path+file:///x/name#1.2.3`.
fn pkgid_version(pkgid: &str) -> Option<String> {
    let fragment = pkgid.trim().rsplit_once('#')?.1;
    let version = fragment.rsplit_once('@').map_or(fragment, |(_, v)| v);
    non_empty(version.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pkgid_forms() {
        assert_eq!(
            pkgid_version("path+file:///src/tengu-init#0.3.1\n").as_deref(),
            Some("0.3.1")
        );
        assert_eq!(
            pkgid_version("path+file:///src/ti#tengu-init@0.4.0").as_deref(),
            Some("0.4.0")
        );
        assert_eq!(pkgid_version(""), None);
    }

    #[test]
    fn health_requires_service_and_api() {
        let mut checks = Checks {
            ssh: true,
            service: Some("active".into()),
            ..Checks::default()
        };
        assert_eq!(checks.health(), Health::Degraded);
        checks.api_health = Some(json!({ "status": "ok" }));
        assert_eq!(checks.health(), Health::Healthy);
        assert!(checks.api_ok());
        assert_eq!(Checks::default().health(), Health::Unreachable);
    }

    #[test]
    fn summary_marks_missing_checks() {
        let checks = Checks::default();
        let rows = checks.summary_rows("junkpile");
        assert_eq!(rows[0], vec!["Host", "junkpile"]);
        assert_eq!(rows[1], vec!["SSH", "FAILED"]);
        assert!(rows[2..].iter().all(|r| r[1] == "N/A"));
    }

    #[test]
    fn json_omits_unchecked_fields() {
        let report = Report {
            host: "junkpile".into(),
            checks: Checks::default(),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value, json!({ "host": "junkpile", "checks": { "ssh": false } }));
    }

    #[test]
    fn app_rows_trim_timestamps() {
        let apps = vec![json!({
            "name": "blog",
            "status": "running",
            "created_at": "2024-03-01T10:00:00Z"
        })];
        assert_eq!(app_rows(&apps), vec![vec!["blog", "running", "-", "2024-03-01"]]);
    }
}
