use applicant_tracking::{
    config::{get_config, init_config},
    database::pool::{create_pool, run_migrations},
    models::notification::NotificationType,
    services::notification_service::OutboundMessage,
    AppState,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn usage() -> anyhow::Error {
    anyhow::anyhow!("usage: applicant-tracking [migrate | audit-latest [N] | broadcast <title> <message>]")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    init_config()?;
    let config = get_config()?;

    let pool = create_pool(config).await?;
    run_migrations(&pool).await?;
    info!("migrations applied");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("migrate");

    match command {
        "migrate" => {}
        "audit-latest" => {
            let count = match args.get(1) {
                Some(raw) => Some(raw.parse::<i64>()?),
                None => None,
            };
            let state = AppState::from_pool(pool, config)?;
            let events = state.audit_service.latest(count).await?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        "broadcast" => {
            let (Some(title), Some(message)) = (args.get(1), args.get(2)) else {
                return Err(usage());
            };
            let state = AppState::from_pool(pool, config)?;
            let outbound =
                OutboundMessage::new(title.as_str(), message.as_str(), NotificationType::System)
                    .with_email();
            let notified = state
                .notification_service
                .broadcast_to_candidates(&outbound)
                .await?;
            info!(notified, "broadcast sent");
        }
        _ => return Err(usage()),
    }

    Ok(())
}
