//! Startup banner.

use crate::consts::{AUTHOR, HOMEPAGE, REPO};

/// Session configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub model: &'a str,
    pub size: &'a str,
    pub quality: &'a str,
    pub auth_status: &'a str,
    pub history: &'a str,
    pub ordering: &'a str,
    /// Listen URL, or `None` in one-shot mode.
    pub url: Option<&'a str>,
}

/// Render the banner text.
pub fn render_banner(info: &BannerInfo) -> String {
    format!(
        r#"
   ╔═══════════════════════════════════════╗
   ║            I M A G I S T              ║
   ║      one more word, one more image    ║
   ╚═══════════════════════════════════════╝

   version   {}
   by        {}
   home      {}
   repo      {}
   model     {} ({}, {})
   auth      {}
   history   {}
   requests  {}
   gui       {}
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        HOMEPAGE,
        REPO,
        info.model,
        info.size,
        info.quality,
        info.auth_status,
        info.history,
        info.ordering,
        info.url.unwrap_or("—"),
    )
}

/// Print the startup banner with session info.
pub fn print_banner(info: &BannerInfo) {
    println!("{}", render_banner(info));
}
