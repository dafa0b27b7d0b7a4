use std::sync::Arc;

use chrono::{DateTime, Utc};
use tempfile::tempdir;

use crate::aggregator::Aggregator;
use crate::error::{AppError, AppResult, StoreError};
use crate::record::EndpointCount;
use crate::recorder::Recorder;

use super::{CallStore, MemoryCallStore, SqliteCallStore};

async fn stores() -> AppResult<Vec<(&'static str, Arc<dyn CallStore>)>> {
    Ok(vec![
        ("memory", Arc::new(MemoryCallStore::new())),
        ("sqlite", Arc::new(SqliteCallStore::open_in_memory().await?)),
    ])
}

fn ts(seconds: i64) -> AppResult<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| AppError::store("timestamp out of range"))
}

fn by_endpoint(mut counts: Vec<EndpointCount>) -> Vec<EndpointCount> {
    counts.sort_by(|left, right| left.endpoint.cmp(&right.endpoint));
    counts
}

#[tokio::test(flavor = "current_thread")]
async fn empty_store_reports_empty_results() -> AppResult<()> {
    for (name, store) in stores().await? {
        if store.latest().await?.is_some() {
            return Err(AppError::store(format!("{}: latest not empty", name)));
        }
        if store.most_called().await?.is_some() {
            return Err(AppError::store(format!("{}: most_called not empty", name)));
        }
        if !store.endpoint_counts().await?.is_empty() {
            return Err(AppError::store(format!("{}: counts not empty", name)));
        }
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn append_assigns_increasing_ids() -> AppResult<()> {
    for (name, store) in stores().await? {
        let first = store.append("checkout", ts(10)?).await?;
        let second = store.append("checkout", ts(20)?).await?;
        if second.id <= first.id {
            return Err(AppError::store(format!(
                "{}: ids not increasing: {} then {}",
                name, first.id, second.id
            )));
        }
        if first.endpoint != "checkout" || first.recorded_at != ts(10)? {
            return Err(AppError::store(format!(
                "{}: returned record does not match what was appended",
                name
            )));
        }
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn scenario_checkout_twice_inventory_once() -> AppResult<()> {
    for (name, store) in stores().await? {
        store.append("checkout", ts(10)?).await?;
        store.append("checkout", ts(20)?).await?;
        let inventory = store.append("inventory", ts(30)?).await?;

        let Some(latest) = store.latest().await? else {
            return Err(AppError::store(format!("{}: expected a latest record", name)));
        };
        if latest != inventory {
            return Err(AppError::store(format!(
                "{}: latest should be the inventory record, got {:?}",
                name, latest
            )));
        }

        let Some(most) = store.most_called().await? else {
            return Err(AppError::store(format!("{}: expected a most_called entry", name)));
        };
        if most.endpoint != "checkout" || most.count != 2 {
            return Err(AppError::store(format!(
                "{}: most_called should be checkout x2, got {:?}",
                name, most
            )));
        }

        let counts = by_endpoint(store.endpoint_counts().await?);
        let expected = vec![
            EndpointCount {
                endpoint: "checkout".to_owned(),
                count: 2,
            },
            EndpointCount {
                endpoint: "inventory".to_owned(),
                count: 1,
            },
        ];
        if counts != expected {
            return Err(AppError::store(format!(
                "{}: unexpected counts: {:?}",
                name, counts
            )));
        }
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn latest_breaks_timestamp_ties_by_insertion() -> AppResult<()> {
    for (name, store) in stores().await? {
        store.append("checkout", ts(50)?).await?;
        let newer = store.append("inventory", ts(50)?).await?;

        let Some(latest) = store.latest().await? else {
            return Err(AppError::store(format!("{}: expected a latest record", name)));
        };
        if latest.id != newer.id {
            return Err(AppError::store(format!(
                "{}: tie should go to the newest insertion, got id {}",
                name, latest.id
            )));
        }
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn most_called_tie_is_deterministic_and_prefers_first_seen() -> AppResult<()> {
    for (name, store) in stores().await? {
        store.append("billing", ts(10)?).await?;
        store.append("shipping", ts(20)?).await?;
        store.append("shipping", ts(30)?).await?;
        store.append("billing", ts(40)?).await?;

        let Some(first_answer) = store.most_called().await? else {
            return Err(AppError::store(format!("{}: expected a most_called entry", name)));
        };
        if first_answer.endpoint != "billing" || first_answer.count != 2 {
            return Err(AppError::store(format!(
                "{}: tie should go to the first endpoint seen, got {:?}",
                name, first_answer
            )));
        }
        // Same snapshot, same answer.
        for _ in 0..3 {
            if store.most_called().await?.as_ref() != Some(&first_answer) {
                return Err(AppError::store(format!(
                    "{}: most_called not stable across repeated calls",
                    name
                )));
            }
        }
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn reads_are_idempotent_without_writes() -> AppResult<()> {
    for (name, store) in stores().await? {
        store.append("checkout", ts(10)?).await?;
        store.append("inventory", ts(20)?).await?;

        let latest = (store.latest().await?, store.latest().await?);
        if latest.0 != latest.1 {
            return Err(AppError::store(format!("{}: latest not idempotent", name)));
        }
        let counts = (
            by_endpoint(store.endpoint_counts().await?),
            by_endpoint(store.endpoint_counts().await?),
        );
        if counts.0 != counts.1 {
            return Err(AppError::store(format!("{}: counts not idempotent", name)));
        }
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn empty_endpoint_names_are_accepted() -> AppResult<()> {
    for (name, store) in stores().await? {
        store.append("", ts(10)?).await?;
        let counts = store.endpoint_counts().await?;
        let Some(entry) = counts.first() else {
            return Err(AppError::store(format!("{}: expected one entry", name)));
        };
        if !entry.endpoint.is_empty() || entry.count != 1 {
            return Err(AppError::store(format!(
                "{}: empty endpoint miscounted: {:?}",
                name, entry
            )));
        }
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn recorder_and_aggregator_wire_through_the_store() -> AppResult<()> {
    for (name, store) in stores().await? {
        let recorder = Recorder::new(store.clone());
        let aggregator = Aggregator::new(store);

        let first = recorder.record("checkout").await?;
        let second = recorder.record("checkout").await?;
        recorder.record("inventory").await?;

        if second.recorded_at < first.recorded_at {
            return Err(AppError::store(format!(
                "{}: recorder timestamps went backwards",
                name
            )));
        }

        let Some(most) = aggregator.most_called().await? else {
            return Err(AppError::store(format!("{}: expected a most_called entry", name)));
        };
        if most.endpoint != "checkout" || most.count != 2 {
            return Err(AppError::store(format!(
                "{}: unexpected most_called {:?}",
                name, most
            )));
        }

        let Some(latest) = aggregator.latest().await? else {
            return Err(AppError::store(format!("{}: expected a latest record", name)));
        };
        if latest.endpoint != "inventory" && latest.recorded_at < second.recorded_at {
            return Err(AppError::store(format!(
                "{}: latest is older than an earlier record",
                name
            )));
        }

        if aggregator.endpoint_counts().await?.len() != 2 {
            return Err(AppError::store(format!(
                "{}: expected two distinct endpoints",
                name
            )));
        }
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn open_failure_surfaces_store_unavailable() -> AppResult<()> {
    let dir = tempdir()?;
    // A parent directory that does not exist makes sqlite refuse the open.
    let db_path = dir.path().join("missing").join("calls.db");
    match SqliteCallStore::open(&db_path).await {
        Err(StoreError::Unavailable { context, .. }) => {
            if context != "open sqlite store" {
                return Err(AppError::store(format!(
                    "unexpected failure context: {}",
                    context
                )));
            }
            Ok(())
        }
        Err(err) => Err(AppError::store(format!("unexpected error kind: {}", err))),
        Ok(_) => Err(AppError::store(
            "opening under a missing directory should fail",
        )),
    }
}

#[tokio::test(flavor = "current_thread")]
async fn most_called_count_equals_max_of_endpoint_counts() -> AppResult<()> {
    for (name, store) in stores().await? {
        store.append("alpha", ts(1)?).await?;
        store.append("beta", ts(2)?).await?;
        store.append("beta", ts(3)?).await?;
        store.append("gamma", ts(4)?).await?;
        store.append("beta", ts(5)?).await?;

        let Some(most) = store.most_called().await? else {
            return Err(AppError::store(format!("{}: expected a most_called entry", name)));
        };
        let max_count = store
            .endpoint_counts()
            .await?
            .iter()
            .map(|entry| entry.count)
            .max()
            .unwrap_or(0);
        if most.count != max_count {
            return Err(AppError::store(format!(
                "{}: most_called count {} != max count {}",
                name, most.count, max_count
            )));
        }
    }
    Ok(())
}
