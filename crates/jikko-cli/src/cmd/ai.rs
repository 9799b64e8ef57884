//! Stable-diffusion jobs run over ssh on the configured SD host.

use anyhow::Context as _;
use clap::Parser;
use jikko_core::config::SdConfig;
use jikko_core::shell::{self, shell_quote};
use jikko_core::{paths, Context};

use super::parse;

const NEGATIVE_PROMPT: &str = "worst quality, low quality, lowres";
const PROMPT_PREVIEW_CHARS: usize = 60;

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(allow_negative_numbers = true)]
struct GenerateArgs {
    /// Prompt text; words are joined with spaces
    #[arg(required = true)]
    prompt: Vec<String>,
    /// Checkpoint file name, or an absolute path on the host
    #[arg(short, long)]
    model: Option<String>,
    #[arg(short = 'W', long, default_value_t = 512)]
    width: u32,
    #[arg(short = 'H', long, default_value_t = 512)]
    height: u32,
    #[arg(long, default_value_t = 20)]
    steps: u32,
    #[arg(long, default_value_t = 6.0)]
    cfg: f32,
    /// -1 picks a random seed
    #[arg(short, long, default_value_t = -1)]
    seed: i64,
}

#[derive(Debug, Clone, PartialEq)]
struct Job {
    model_path: String,
    prompt: String,
    width: u32,
    height: u32,
    steps: u32,
    cfg: f32,
    seed: i64,
    output: String,
}

impl Job {
    fn remote_command(&self) -> String {
        format!(
            "HSA_OVERRIDE_GFX_VERSION=10.3.0 sd --model {} --prompt {} -n {} -W {} -H {} \
             --steps {} --cfg-scale {} -s {} -o {}",
            shell_quote(&self.model_path),
            shell_quote(&self.prompt),
            shell_quote(NEGATIVE_PROMPT),
            self.width,
            self.height,
            self.steps,
            self.cfg,
            self.seed,
            shell_quote(&self.output),
        )
    }
}

fn model_path(sd: &SdConfig, model: &str) -> String {
    if model.starts_with('/') {
        model.to_string()
    } else {
        format!("{}/{model}", sd.checkpoints_dir())
    }
}

fn preview(prompt: &str) -> String {
    if prompt.chars().count() > PROMPT_PREVIEW_CHARS {
        let head: String = prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        prompt.to_string()
    }
}

pub fn sd_generate(ctx: &Context, args: &[String]) -> anyhow::Result<()> {
    let Some(opts) = parse::<GenerateArgs>("jikko ai sd generate", args)? else {
        return Ok(());
    };
    let sd = &ctx.config.sd;
    let model = opts.model.unwrap_or_else(|| sd.model.clone());

    let filename = format!("sd_{}.png", chrono::Utc::now().timestamp());
    let job = Job {
        model_path: model_path(sd, &model),
        prompt: opts.prompt.join(" "),
        width: opts.width,
        height: opts.height,
        steps: opts.steps,
        cfg: opts.cfg,
        seed: opts.seed,
        output: format!("{}/{filename}", sd.outputs_dir.trim_end_matches('/')),
    };

    std::fs::create_dir_all(&sd.local_output_dir)
        .with_context(|| format!("cannot create {}", sd.local_output_dir.display()))?;
    let local = sd.local_output_dir.join(&filename);

    ctx.ui.frame("SD Generate", || {
        println!("Model:  {model}");
        println!("Size:   {}x{}", job.width, job.height);
        println!("Steps:  {}, CFG: {}", job.steps, job.cfg);
        println!("Prompt: {}", preview(&job.prompt));
    });
    ctx.ui.blank();

    let remote = job.remote_command();
    ctx.ui.step(&format!("Generating on {}", sd.host), || {
        shell::run_quiet("ssh", &[&sd.host, &remote])
    })?;

    let source = format!("{}:{}", sd.host, job.output);
    let target = local.display().to_string();
    ctx.ui.step("Copying to local", || {
        shell::run_quiet("scp", &[&source, &target])
    })?;

    ctx.ui.blank();
    ctx.ui.ok(&format!("Saved: {}", paths::tilde(&local)));
    Ok(())
}

// ---------------------------------------------------------------------------
// convert
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Model file on the host
    model: String,
    /// Quantization type
    #[arg(long = "type", default_value = "q8_0")]
    quant: String,
}

pub fn sd_convert(ctx: &Context, args: &[String]) -> anyhow::Result<()> {
    let Some(opts) = parse::<ConvertArgs>("jikko ai sd convert", args)? else {
        return Ok(());
    };
    let host = &ctx.config.sd.host;

    ctx.ui.title("Convert to GGUF");
    println!("Model: {}", opts.model);
    println!("Type:  {}", opts.quant);
    ctx.ui.blank();

    let remote = format!(
        "tsr convert {} --type {}",
        shell_quote(&opts.model),
        shell_quote(&opts.quant)
    );
    ctx.ui.step(&format!("Converting on {host}"), || {
        shell::run_quiet("ssh", &[host, &remote])
    })?;
    ctx.ui.ok("Conversion complete");
    Ok(())
}

// ---------------------------------------------------------------------------
// models
// ---------------------------------------------------------------------------

pub fn sd_models(ctx: &Context, _args: &[String]) -> anyhow::Result<()> {
    let sd = &ctx.config.sd;
    ctx.ui.title(&format!("SD Models on {}", sd.host));

    for (label, dir) in [("Checkpoints", sd.checkpoints_dir()), ("LoRAs", sd.loras_dir())] {
        ctx.ui.blank();
        ctx.ui.info(label);
        let listing = shell::ssh_capture(&sd.host, &format!("ls -1 {dir}/*.gguf 2>/dev/null"));
        for name in basenames(&listing) {
            println!("{name}");
        }
    }
    Ok(())
}

fn basenames(listing: &str) -> Vec<&str> {
    listing
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| l.rsplit('/').next().unwrap_or(l))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> Job {
        Job {
            model_path: "/m/checkpoints/base.gguf".to_string(),
            prompt: "a cat's hat".to_string(),
            width: 512,
            height: 768,
            steps: 20,
            cfg: 6.0,
            seed: -1,
            output: "/out/sd_1.png".to_string(),
        }
    }

    #[test]
    fn remote_command_quotes_prompt() {
        let cmd = job().remote_command();
        assert!(cmd.starts_with("HSA_OVERRIDE_GFX_VERSION=10.3.0 sd --model '/m/checkpoints/base.gguf'"));
        assert!(cmd.contains(r"--prompt 'a cat'\''s hat'"));
        assert!(cmd.contains("-n 'worst quality, low quality, lowres'"));
        assert!(cmd.contains("-W 512 -H 768 --steps 20 --cfg-scale 6 -s -1 -o '/out/sd_1.png'"));
    }

    #[test]
    fn model_path_resolves_under_checkpoints() {
        let sd = SdConfig::default();
        assert_eq!(
            model_path(&sd, "x.gguf"),
            "/var/lib/tensors/models/checkpoints/x.gguf"
        );
        assert_eq!(model_path(&sd, "/abs/y.gguf"), "/abs/y.gguf");
    }

    #[test]
    fn generate_args_accept_negative_seed() {
        let opts = GenerateArgs::try_parse_from(["gen", "a", "fox", "-s", "-1", "-W", "640"]).unwrap();
        assert_eq!(opts.prompt, vec!["a", "fox"]);
        assert_eq!(opts.seed, -1);
        assert_eq!(opts.width, 640);
        assert_eq!(opts.height, 512);
    }

    #[test]
    fn generate_requires_prompt() {
        assert!(GenerateArgs::try_parse_from(["gen"]).is_err());
    }

    #[test]
    fn long_prompt_preview_is_truncated() {
        let long = "x".repeat(80);
        assert_eq!(preview(&long), format!("{}...", "x".repeat(60)));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn basenames_strip_directories() {
        let listing = "/m/checkpoints/a.gguf\n/m/checkpoints/b.gguf\n\n";
        assert_eq!(basenames(listing), vec!["a.gguf", "b.gguf"]);
    }

    #[test]
    fn convert_type_defaults() {
        let opts = ConvertArgs::try_parse_from(["convert", "model.safetensors"]).unwrap();
        assert_eq!(opts.quant, "q8_0");
    }
}
