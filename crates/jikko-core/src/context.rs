use crate::config::Config;
use crate::ui::Ui;

/// Everything a handler may read: resolved config and the output style.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub ui: Ui,
}

impl Context {
    pub fn new(config: Config) -> Self {
        let ui = Ui::new(config.color);
        Self { config, ui }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
