use jikko_core::{shell, Context};

pub fn config(ctx: &Context, _args: &[String]) -> anyhow::Result<()> {
    shell::require("networksetup")?;
    ctx.ui.title("Network Interfaces");
    shell::run("networksetup", &["-listallhardwareports"])?;
    Ok(())
}
