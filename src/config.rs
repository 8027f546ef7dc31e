use crate::cli::Cli;
use crate::locale::Locale;

/// Settings shared by every run mode.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub base_url: String,
    pub user_agent: String,
    pub locale: Locale,
}

impl ViewerConfig {
    pub fn from_cli(args: &Cli) -> Self {
        Self {
            base_url: args.base_url.clone(),
            user_agent: format!("hh-viewer/{}", env!("CARGO_PKG_VERSION")),
            locale: args.locale,
        }
    }
}
