use jikko_core::{paths, Context};

pub fn show(ctx: &Context, _args: &[String]) -> anyhow::Result<()> {
    ctx.ui.muted(&format!("# {}", paths::tilde(&paths::config_path()?)));
    print!("{}", ctx.config.to_yaml()?);
    Ok(())
}
