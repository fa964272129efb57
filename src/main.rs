use clap::Parser;
use dotenv::dotenv;
use rust_decimal_macros::dec;
use tokio::sync::watch;
use tracing::info;

use stockpilot::cli::Cli;
use stockpilot::gateway::{Credentials, GatewayConfig};
use stockpilot::observability;
use stockpilot::sandbox::PaperGateway;
use stockpilot::session::TradingSession;
use stockpilot::strategy::Hold;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    observability::init_tracing()?;

    let config = Cli::parse().into_config()?;
    if !config.paper {
        return Err("live brokerage transport is not configured; run without --live".into());
    }

    // Paper mode: credentials from the environment when present, otherwise a
    // throwaway identity (the paper gateway accepts any login).
    let credentials = GatewayConfig::from_env(true)
        .map(|c| c.credentials)
        .unwrap_or_else(|_| Credentials {
            username: "paper".to_string(),
            password: "paper".to_string(),
        });

    let mut gateway = PaperGateway::new();
    let demo_symbols = ["SOFI", "AAPL", "MSFT"];
    if let Some(name) = &config.watchlist {
        gateway = gateway.with_watchlist(
            name.clone(),
            demo_symbols.iter().map(|s| s.to_string()).collect(),
        );
    }
    for symbol in demo_symbols {
        gateway = gateway.with_price(symbol, dec!(10));
    }
    for symbol in &config.symbols {
        gateway = gateway.with_price(symbol.clone(), dec!(10));
    }
    gateway = gateway.with_cash(dec!(10_000));

    let mut session = TradingSession::connect(gateway, &credentials, config.universe_source())
        .await?
        .with_poll_interval(config.poll_interval);

    info!(
        universe = ?session.universe(),
        open_orders = session.registry().len(),
        held_symbols = session.portfolio().len(),
        cash = %session.cash().await?,
        "Session ready"
    );

    // Ctrl-c raises the shutdown signal; the loop also stops on market close.
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    let stop = session.run_polling(&mut Hold, &mut shutdown_rx).await?;
    info!(reason = ?stop, "Polling finished");

    let resolved = session.reconcile().await?;
    info!(resolved = resolved, remaining = session.registry().len(), "Final reconciliation");

    session.logout().await?;
    Ok(())
}
