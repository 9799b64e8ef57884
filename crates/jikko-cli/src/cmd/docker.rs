use jikko_core::{shell, Context};

use super::{str_args, tab_rows};

const PS_FORMAT: &str = "{{.ID}}\t{{.Image}}\t{{.Status}}\t{{.Names}}";

pub fn images(_ctx: &Context, args: &[String]) -> anyhow::Result<()> {
    let mut argv = vec!["images"];
    argv.extend(str_args(args));
    shell::run("docker", &argv)?;
    Ok(())
}

pub fn ps(ctx: &Context, _args: &[String]) -> anyhow::Result<()> {
    let output = shell::capture_lossy("docker", &["ps", "--format", PS_FORMAT]);
    let rows = tab_rows(&output);

    if rows.is_empty() {
        ctx.ui.muted("No containers running");
    } else {
        ctx.ui.table(&["ID", "Image", "Status", "Names"], &rows);
    }
    Ok(())
}
