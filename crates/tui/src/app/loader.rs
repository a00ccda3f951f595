use api_types::transaction::Transaction;
use engine::{KeyValueStore, Store};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};

use crate::client::{Client, FetchError};

pub const LOAD_ERROR_MESSAGE: &str = "Error al cargar las transacciones. Intenta nuevamente.";

/// Result of a background request, tagged with the generation it was
/// started under.
#[derive(Debug)]
pub enum LoadMessage {
    All {
        generation: u64,
        result: Result<Vec<Transaction>, FetchError>,
    },
    One {
        id: String,
        result: Result<Transaction, FetchError>,
    },
}

pub fn spawn_fetch_all(client: Client, generation: u64, tx: UnboundedSender<LoadMessage>) {
    tokio::spawn(async move {
        let result = client.fetch_all().await;
        // The loop may already be gone on quit.
        let _ = tx.send(LoadMessage::All { generation, result });
    });
}

pub fn spawn_fetch_one(client: Client, id: String, tx: UnboundedSender<LoadMessage>) {
    tokio::spawn(async move {
        let result = client.fetch_one(&id).await;
        let _ = tx.send(LoadMessage::One { id, result });
    });
}

/// Feeds the outcome of a full load into the store. Failures keep the
/// previous transactions and surface a user-facing message.
pub fn apply_load_result<S: KeyValueStore>(
    store: &mut Store<S>,
    result: Result<Vec<Transaction>, FetchError>,
) {
    match result {
        Ok(transactions) => {
            info!(count = transactions.len(), "transactions loaded");
            store.set_transactions(transactions);
        }
        Err(err) => {
            error!(status = ?err.status(), "loading transactions failed: {err}");
            store.set_error(Some(LOAD_ERROR_MESSAGE.to_string()));
        }
    }
}
