//! Storefront bot entry point.
//!
//! Explicit bootstrap, no import-time side effects: tracing, then
//! configuration, then the store (PostgreSQL when `DATABASE_URL` is set,
//! else a seeded in-memory store), then the dispatcher. A line-oriented
//! console transport drives the dispatcher for local runs; each input line
//! is either a slash command, an action payload, or free text.

use std::sync::Arc;

use async_trait::async_trait;
use bot::config::Config;
use bot::dispatcher::Dispatcher;
use bot::event::{Action, Command, Inbound, Incoming, RenderTarget};
use bot::quantity::InMemoryQuantityStore;
use bot::transport::{ChatRef, MessageRef, Messenger, Press, Screen, TransportError};
use checkout::{InMemoryPaymentGateway, InMemorySessionStore};
use common::UserId;
use domain::{Money, UserProfile};
use store::{InMemoryShopStore, PostgresShopStore, ShopStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Prints screens and alerts to stdout.
struct ConsoleMessenger;

fn print_screen(screen: &Screen) {
    println!("\n{}", screen.text);
    for row in &screen.keyboard {
        let rendered: Vec<String> = row
            .iter()
            .map(|button| match &button.press {
                Press::Callback(payload) => format!("[{} → {payload}]", button.label),
                Press::Url(url) => format!("[{} → {url}]", button.label),
            })
            .collect();
        println!("  {}", rendered.join(" "));
    }
}

#[async_trait]
impl Messenger for ConsoleMessenger {
    async fn send(&self, chat: ChatRef, screen: &Screen) -> Result<MessageRef, TransportError> {
        print_screen(screen);
        Ok(MessageRef {
            chat,
            message_id: 0,
        })
    }

    async fn edit_text(&self, _message: MessageRef, screen: &Screen) -> Result<(), TransportError> {
        print_screen(screen);
        Ok(())
    }

    async fn edit_caption(
        &self,
        message: MessageRef,
        screen: &Screen,
    ) -> Result<(), TransportError> {
        self.edit_text(message, screen).await
    }

    async fn delete(&self, _message: MessageRef) -> Result<(), TransportError> {
        Ok(())
    }

    async fn alert(&self, _chat: ChatRef, text: &str) -> Result<(), TransportError> {
        println!("[!] {text}");
        Ok(())
    }
}

/// Classifies one console line into an inbound event.
fn classify(line: &str) -> Inbound {
    if let Some(command) = Command::parse(line) {
        return Inbound::Command(command);
    }
    if let Ok(action) = line.parse::<Action>() {
        return Inbound::Action(action);
    }
    Inbound::FreeText(line.to_string())
}

async fn run_console<S: ShopStore>(store: Arc<S>, config: &Config) {
    let gateway = Arc::new(InMemoryPaymentGateway::new());
    let sessions = Arc::new(InMemorySessionStore::new());
    let quantities = Arc::new(InMemoryQuantityStore::new());
    let messenger = Arc::new(ConsoleMessenger);
    let dispatcher = Dispatcher::new(store, gateway, messenger, sessions, quantities, config);

    let user = UserId::new(1);
    let chat = ChatRef(1);
    let profile = UserProfile {
        first_name: Some("Console".to_string()),
        ..UserProfile::default()
    };

    println!("Type /start to begin. Button payloads are typed verbatim.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        dispatcher
            .dispatch(Incoming {
                user,
                profile: profile.clone(),
                target: RenderTarget::New(chat),
                event: classify(line),
            })
            .await;
    }
}

async fn seed_demo_catalog(store: &InMemoryShopStore) {
    let drinks = store.seed_category("Drinks").await;
    let tea = store.seed_subcategory(drinks.id, "Tea").await;
    store
        .seed_product(
            tea.id,
            "Green tea",
            Money::from_units(100),
            Some("Loose leaf, 100g"),
            None,
        )
        .await;
    store
        .seed_product(
            tea.id,
            "Black tea",
            Money::from_units(50),
            Some("Loose leaf, 100g"),
            None,
        )
        .await;
    let coffee = store.seed_subcategory(drinks.id, "Coffee").await;
    store
        .seed_product(coffee.id, "Espresso beans", Money::from_units(120), None, None)
        .await;
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, shutting down");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, shutting down");
        }
    }
}

#[tokio::main]
async fn main() {
    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Load configuration
    let config = Config::from_env();
    tracing::info!(page_size = config.page_size, currency = %config.currency, "starting storefront bot");

    // 3. Construct the store and run the console loop
    let console = async {
        match &config.database_url {
            Some(url) => {
                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(5)
                    .connect(url)
                    .await
                    .expect("failed to connect to database");
                let store = PostgresShopStore::new(pool);
                store.run_migrations().await.expect("migrations failed");
                run_console(Arc::new(store), &config).await;
            }
            None => {
                tracing::info!("DATABASE_URL not set, using seeded in-memory store");
                let store = InMemoryShopStore::new();
                seed_demo_catalog(&store).await;
                run_console(Arc::new(store), &config).await;
            }
        }
    };

    tokio::select! {
        () = console => {}
        () = shutdown_signal() => {}
    }

    tracing::info!("bot shut down");
}
