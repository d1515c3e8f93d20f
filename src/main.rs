use std::fs::File;
use std::sync::Arc;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use stardust::api::{AuthClient, RagClient};
use stardust::core::config::{self, CliOverrides};
use stardust::core::state::App;

#[derive(Parser)]
#[command(name = "stardust", about = "Terminal chat with the Neil deGrasse Tyson AI")]
struct Args {
    /// Primary API base URL, e.g. http://localhost:8000/api
    #[arg(long)]
    api_base: Option<String>,

    /// Fallback API base; replaces any configured fallback list
    #[arg(long)]
    fallback: Option<String>,

    /// Site hosting /.auth/* (enables sign-in status)
    #[arg(long)]
    site_url: Option<String>,

    /// Show sources as badges under each answer instead of the sources view
    #[arg(long)]
    inline_sources: bool,

    /// Verbosity of stardust.log
    #[arg(long, default_value_t = LevelFilter::Debug)]
    log_level: LevelFilter,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // File logger; the terminal belongs to the UI
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("stardust.log") {
        let _ = WriteLogger::init(args.log_level, log_config, log_file);
    }

    let overrides = CliOverrides {
        api_base: args.api_base,
        fallback: args.fallback,
        site_url: args.site_url,
        inline_sources: args.inline_sources,
    };
    let resolved = match config::load_config().and_then(|c| config::resolve(&c, &overrides)) {
        Ok(resolved) => resolved,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            eprintln!("stardust: {e}");
            if let Some(path) = config::config_path() {
                eprintln!("Check {}", path.display());
            }
            std::process::exit(2);
        }
    };

    log::info!(
        "Stardust starting up against {} ({} fallback endpoint(s))",
        resolved.api_base,
        resolved.fallback_urls.len()
    );

    let client = RagClient::new(resolved.endpoints(), resolved.timeout)
        .map_err(|e| std::io::Error::other(e.message()))?
        .with_conversation_id(uuid::Uuid::new_v4().to_string());

    let auth = resolved
        .site_url
        .as_deref()
        .map(|site| AuthClient::new(site, resolved.auth_cookie.clone()));
    let auth_urls = auth.as_ref().map(|a| (a.login_url(), a.logout_url()));

    let app = App::from_config(Arc::new(client), &resolved, auth_urls);
    stardust::tui::run(app, auth)
}
