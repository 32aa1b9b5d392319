use anyhow::Result;
use portfolio_contact::PendingContactStore;

/// Prints submissions waiting in the fallback store, oldest key first
pub async fn list(config: crate::config::Config) -> Result<()> {
    let store = PendingContactStore::new(&config.contact.pending_file);
    let entries = store.list().await?;

    if entries.is_empty() {
        println!("No pending contacts in {}", store.path().display());
        return Ok(());
    }

    for (key, contact) in &entries {
        println!(
            "{key}\t{}\t<{}>\t{}",
            contact.submitted_at, contact.email, contact.subject
        );
    }

    println!("{} pending contact(s) in {}", entries.len(), store.path().display());

    Ok(())
}
