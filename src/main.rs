use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use wschat::avatar::AvatarChain;
use wschat::config::{Config, TraceMode};
use wschat::gateway::hub::Hub;
use wschat::state::AppState;
use wschat::trace;

/// Real-time group chat server.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Address to bind (overrides WSCHAT_BIND)
    #[arg(long)]
    bind: Option<String>,
    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wschat=debug,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    print_banner(&config);

    if let Err(e) = tokio::fs::create_dir_all(&config.avatar_path).await {
        tracing::error!("failed to create avatar directory {:?}: {:?}", config.avatar_path, e);
    }

    let tracer = match config.trace {
        TraceMode::Off => trace::off(),
        TraceMode::Stdout => trace::new(std::io::stdout()),
        TraceMode::Log => Arc::new(trace::LogTracer),
    };
    let hub = Hub::spawn(tracer);

    let avatars = AvatarChain::from_names(config.avatar_chain.as_slice(), &config.avatar_path);
    if avatars.is_empty() {
        tracing::warn!("avatar chain is empty, every user gets an empty avatar url");
    }

    let state = AppState {
        hub,
        avatars: Arc::new(avatars),
        session: config.session.clone(),
        avatar_path: config.avatar_path.clone(),
        max_upload_size: config.max_upload_size,
    };

    let app = wschat::routes::router(state);

    let listener = TcpListener::bind((config.bind.as_str(), config.port))
        .await
        .expect("failed to bind");

    let actual_port = listener
        .local_addr()
        .expect("failed to get local address")
        .port();
    eprintln!("  \x1b[32m→ listening on {}:{actual_port}\x1b[0m", config.bind);
    eprintln!();

    axum::serve(listener, app).await.expect("server error");
}

fn print_banner(config: &Config) {
    let version = env!("CARGO_PKG_VERSION");
    let trace = match config.trace {
        TraceMode::Off => "off",
        TraceMode::Stdout => "stdout",
        TraceMode::Log => "log",
    };

    eprintln!();
    eprintln!("  \x1b[1;36mwschat\x1b[0m \x1b[2mv{version}\x1b[0m");
    eprintln!();
    eprintln!("  \x1b[2mport\x1b[0m         {}", config.port);
    eprintln!("  \x1b[2moutbox\x1b[0m       {}", config.session.outbox_capacity);
    eprintln!("  \x1b[2mavatars\x1b[0m      {}", config.avatar_path.display());
    eprintln!("  \x1b[2mchain\x1b[0m        {}", config.avatar_chain.join(" → "));
    eprintln!("  \x1b[2mtrace\x1b[0m        {trace}");
    eprintln!();
}
