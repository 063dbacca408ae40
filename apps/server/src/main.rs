use anyhow::Context;
use agora_config::load as load_config;
use agora_database::{ChatRepository, CreateUserRequest, UserRepository};
use agora_gateway::{create_router, GatewayState};
use agora_runtime::{telemetry, BackendServices};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "agora")]
#[command(about = "Agora chat backend (serves by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP and WebSocket server
    Serve,
    /// Create a user and print a session cookie for it
    SeedUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        login: String,
        #[arg(long)]
        avatar: Option<String>,
    },
    /// Dump users and chats from the database
    DumpChats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing().context("failed to initialise tracing")?;

    let config = load_config().context("failed to load configuration")?;
    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(&config, &services).await,
        Commands::SeedUser {
            name,
            login,
            avatar,
        } => seed_user(&services, name, login, avatar).await,
        Commands::DumpChats => dump_chats(&services).await,
    };

    services.shutdown().await;
    result
}

async fn run_server(
    config: &agora_config::AppConfig,
    services: &BackendServices,
) -> anyhow::Result<()> {
    info!("starting Agora backend");

    let state = GatewayState::new(
        services.db_pool.clone(),
        services.presence.clone(),
        services.authenticator.clone(),
        &config.realtime,
    );
    let app = create_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(agora_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

async fn seed_user(
    services: &BackendServices,
    name: String,
    login: String,
    avatar: Option<String>,
) -> anyhow::Result<()> {
    let users = UserRepository::new(services.db_pool.clone());
    let user = users
        .create(&CreateUserRequest {
            name,
            login,
            avatar,
        })
        .await
        .context("failed to create user")?;

    println!("Created user {} ({})", user.name, user.id);
    println!("Cookie: {}", services.authenticator.issue_cookie(&user.id));
    Ok(())
}

async fn dump_chats(services: &BackendServices) -> anyhow::Result<()> {
    let users = UserRepository::new(services.db_pool.clone())
        .list()
        .await
        .context("failed to fetch users")?;

    println!("=== USERS ===");
    if users.is_empty() {
        println!("No users found in database");
    } else {
        println!("{:<26} {:<20} {:<20} {:<28}", "ID", "Name", "Login", "Created At");
        println!("{}", "-".repeat(96));
        for user in &users {
            println!(
                "{:<26} {:<20} {:<20} {:<28}",
                user.id, user.name, user.login, user.created_at
            );
        }
    }

    let chats = ChatRepository::new(services.db_pool.clone())
        .list_with_counts()
        .await
        .context("failed to fetch chats")?;

    println!("\n=== CHATS ===");
    if chats.is_empty() {
        println!("No chats found in database");
    } else {
        println!(
            "{:<26} {:<26} {:<26} {:<10}",
            "ID", "Member", "Member", "Messages"
        );
        println!("{}", "-".repeat(90));
        for (chat, messages) in chats {
            println!(
                "{:<26} {:<26} {:<26} {:<10}",
                chat.id, chat.member_low, chat.member_high, messages
            );
        }
    }

    Ok(())
}
