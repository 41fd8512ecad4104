use clau_advisor::{
    backend::HttpAdviceBackend,
    chat::{ChatSession, SendOutcome, QUICK_PROMPTS},
    config::ClientConfig,
    dashboard::DashboardView,
    insights::{InsightsGenerator, InsightsOutcome},
    state::ConversationStore,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const HELP: &str = "Commands: /clear  /dashboard  /insights  /quick <n>  /quit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ClientConfig::from_env()?;
    info!(backend = %config.backend_url, "Clau Advisor terminal chat starting");

    let backend = Arc::new(HttpAdviceBackend::new(&config.backend_url, config.request_timeout)?);
    let store = ConversationStore::shared();
    let chat = ChatSession::new(store.clone(), backend.clone());
    let insights = InsightsGenerator::new(store.clone(), backend);

    // Trace every snapshot the store publishes
    let mut subscription = store.lock().await.subscribe();
    tokio::spawn(async move {
        while let Some(snapshot) = subscription.recv().await {
            debug!(
                messages = snapshot.log.len(),
                loading = snapshot.is_loading,
                "Snapshot published"
            );
        }
    });

    println!("Clau AI - your financial assistant. {}", HELP);
    for (i, prompt) in QUICK_PROMPTS.iter().enumerate() {
        println!("  [{}] {}", i + 1, prompt);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();

        match line {
            "/quit" | "/exit" => break,
            "/clear" => {
                chat.clear_chat().await;
                println!("(conversation cleared)");
            }
            "/dashboard" => {
                let snapshot = store.lock().await.snapshot();
                print_dashboard(&DashboardView::from_snapshot(&snapshot));
            }
            "/insights" => match insights.generate().await {
                InsightsOutcome::NoConversation => println!("Start a conversation first."),
                InsightsOutcome::Busy => println!("Insights are already being generated."),
                InsightsOutcome::Generated { html } | InsightsOutcome::Failed { html } => {
                    println!("{}", html)
                }
            },
            _ if line.starts_with("/quick") => {
                let prompt = line["/quick".len()..]
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| QUICK_PROMPTS.get(i));
                match prompt {
                    Some(prompt) => {
                        println!("> {}", prompt);
                        let outcome = chat.send_quick_message(prompt).await;
                        print_last_reply(&chat, outcome).await;
                    }
                    None => println!("{}", HELP),
                }
            }
            _ if line.starts_with('/') => println!("{}", HELP),
            _ => {
                let outcome = chat.send_message(line).await;
                print_last_reply(&chat, outcome).await;
            }
        }
    }

    Ok(())
}

async fn print_last_reply(chat: &ChatSession, outcome: SendOutcome) {
    if outcome == SendOutcome::Ignored {
        return;
    }
    let store = chat.store().lock().await;
    if let Some(reply) = store.current_log().last() {
        println!("Clau AI: {}\n", reply.text);
    }
}

fn print_dashboard(view: &DashboardView) {
    println!("Total income: {:.2}", view.total_income);
    println!("Net worth:    {:.2}", view.net_worth);
    println!(
        "Messages:     {} (you {}, Clau AI {})",
        view.total_messages, view.user_message_count, view.bot_message_count
    );
    for row in &view.topics {
        println!("  {:<20} {}", row.topic.label(), row.count);
    }
}
