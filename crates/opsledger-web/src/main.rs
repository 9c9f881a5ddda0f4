use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use opsledger_sheets::http_store::DEFAULT_API_BASE;
use opsledger_web::{router, AppState, StoreConfig, StoreKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind
    #[arg(long, env = "OPSLEDGER_BIND", default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "OPSLEDGER_PORT", default_value_t = 3000)]
    port: u16,

    /// Where the spreadsheet lives
    #[arg(long, env = "OPSLEDGER_STORE", value_enum, default_value_t = StoreKind::Csv)]
    store: StoreKind,

    /// Directory of CSV sheets (csv store)
    #[arg(long, env = "OPSLEDGER_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Google Sheets spreadsheet id (sheets store)
    #[arg(long, env = "OPSLEDGER_SPREADSHEET_ID")]
    spreadsheet_id: Option<String>,

    /// Sheets API base URL
    #[arg(long, env = "OPSLEDGER_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// OAuth bearer token (sheets store)
    #[arg(long, env = "OPSLEDGER_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Log as JSON lines
    #[arg(long, env = "OPSLEDGER_LOG_JSON")]
    log_json: bool,
}

impl Args {
    fn store_config(&self) -> StoreConfig {
        StoreConfig {
            kind: self.store,
            data_dir: self.data_dir.clone(),
            spreadsheet_id: self.spreadsheet_id.clone(),
            api_base: self.api_base.clone(),
            token: self.token.clone(),
        }
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_json);

    let config = args.store_config();
    let store = config.build()?;
    info!(store = store.name(), "using {}", config.describe());

    let app = router(AppState::new(store));

    let addr = SocketAddr::new(args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
