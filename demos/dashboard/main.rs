//! Dashboard walkthrough against an in-memory remote
//!
//! Run with `RUST_LOG=recordsync=debug cargo run --example dashboard` to see
//! the store's phase transitions.

use recordsync::prelude::*;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("📒 recordsync dashboard demo\n");

    let config = ClientConfig::default_config().apply_env_overrides()?;
    let Some(view) = config.view("debtors") else {
        anyhow::bail!("no debtors view configured");
    };

    // Remote authority, with a paginated envelope like the real backend
    let remote = InMemoryRemote::new().with_envelope(true);
    remote.seed(
        "debtors",
        vec![
            json!({
                "name": "Jane Mwangi",
                "phone": "0711 000 111",
                "amount": "1200.00",
                "due_date": "2025-08-01",
                "payments": "[{\"date\":\"2025-07-01\",\"amount\":200}]",
            }),
            json!({"name": "Otieno Motors", "amount": "650.00", "state": "overdue"}),
            json!({"name": "Brian K.", "amount": "90.00", "state": "paid"}),
        ],
    );

    let notifier = ChannelNotifier::new(16);
    let mut toasts = notifier.subscribe();

    let store = RemoteSyncStore::new(view.resource(), Arc::new(remote.clone()))
        .with_notifier(Arc::new(notifier));

    let records = store.refresh().await;
    println!("Loaded {} {}", records.len(), view.entity_path());

    store
        .create(
            RecordPatch::new()
                .name("Amina Hassan")
                .amount(300.0)
                .due_date("2025-09-15")
                .payments(&[LedgerEntry::new("2025-08-20", 100.0)]),
        )
        .await?;

    if let Err(e) = store.create(RecordPatch::new().amount(10.0)).await {
        println!("Rejected create: {}", e);
    }

    while let Ok(toast) = toasts.try_recv() {
        println!("[{}] {}", toast.kind, toast.message);
    }

    let mut state = QueryState::default();
    state.toggle_sort("amountDue");
    state.toggle_sort("amountDue");

    let records = store.records();
    let table = view.table_view();
    let result = table.run(&records, &state);

    println!(
        "\nPage {}/{} ({} records)",
        result.page.page, result.page.total_pages, result.page.total
    );
    for record in &result.rows {
        println!(
            "  {:<16} {:>10.2} {:>10.2}  {}",
            record.name,
            record.amount,
            record.amount_due(),
            record.state
        );
    }
    println!(
        "Totals: billed {:.2}, paid {:.2}, due {:.2}\n",
        result.totals.total_amount, result.totals.total_paid, result.totals.total_due
    );

    let document =
        StatementDocument::from_query("Debtor Statement", &[("sort", "amountDue")], &result);
    println!("{}", statement_to_csv(&document)?);
    println!("{}", document.totals_line());

    Ok(())
}
