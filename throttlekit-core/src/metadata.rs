//! Broker and partition metadata used by placement decisions.
//!
//! Raw fetches may legitimately be partial: only the brokers an operation actually
//! references need complete metrics, so completeness is checked by
//! [`validate_broker_metrics`] against that reference set rather than at fetch time.

use tracing::{info, warn};

use crate::broker::{BrokerMap, BrokerMetaMap};
use crate::errors::{FatalError, HandlerError};
use crate::handler::ClusterHandler;
use crate::partition_meta::PartitionMetaMap;

/// Returns the metadata of every registered broker, optionally merged with the
/// metrics persisted by the collector.
///
/// Fails only when no usable broker record exists at all. Partial data is returned
/// as is and its diagnostics are logged.
pub async fn reconcile_broker_meta<H>(
    handler: &H,
    include_metrics: bool,
) -> Result<BrokerMetaMap, FatalError>
where
    H: ClusterHandler + ?Sized,
{
    let (meta, mut diagnostics) = handler
        .get_all_broker_meta(include_metrics)
        .await
        .into_parts();

    match meta {
        Some(meta) if !meta.is_empty() => {
            for diagnostic in &diagnostics {
                warn!(%diagnostic, "partial broker metadata");
            }
            info!(
                brokers = meta.len(),
                include_metrics, "reconciled broker metadata"
            );
            Ok(meta)
        }
        _ => {
            if diagnostics.is_empty() {
                diagnostics.push(HandlerError::NoBrokersRegistered);
            }
            Err(FatalError::BrokerMetaUnavailable(diagnostics))
        }
    }
}

/// Checks that every relevant broker in `reference` has complete metrics in `meta`.
///
/// Brokers flagged missing and the reserved ID `0` are skipped. All offending
/// brokers are reported together.
pub fn validate_broker_metrics(
    reference: &BrokerMap,
    meta: &BrokerMetaMap,
) -> Result<(), FatalError> {
    let incomplete: Vec<_> = reference
        .iter()
        .filter(|(id, broker)| !broker.missing && !id.is_reserved())
        .filter(|(id, _)| meta.get(*id).map_or(true, |m| m.metrics_incomplete))
        .map(|(id, _)| *id)
        .collect();

    if incomplete.is_empty() {
        Ok(())
    } else {
        Err(FatalError::MetricsIncomplete(incomplete))
    }
}

/// Partition size metadata persisted by the collector, returned verbatim.
pub async fn get_partition_meta<H>(handler: &H) -> Result<PartitionMetaMap, HandlerError>
where
    H: ClusterHandler + ?Sized,
{
    handler.get_all_partition_meta().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{Broker, BrokerId, BrokerMeta};

    fn meta(entries: &[(u32, bool)]) -> BrokerMetaMap {
        entries
            .iter()
            .map(|(id, incomplete)| {
                (
                    BrokerId(*id),
                    BrokerMeta {
                        metrics_incomplete: *incomplete,
                        ..Default::default()
                    },
                )
            })
            .collect()
    }

    fn reference(entries: &[(u32, bool)]) -> BrokerMap {
        entries
            .iter()
            .map(|(id, missing)| {
                (
                    BrokerId(*id),
                    Broker {
                        id: BrokerId(*id),
                        missing: *missing,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn complete_reference_set_passes() {
        let meta = meta(&[(1001, false), (1002, false), (1003, true)]);
        // 1003 is incomplete but outside the reference set
        let reference = reference(&[(1001, false), (1002, false)]);
        assert!(validate_broker_metrics(&reference, &meta).is_ok());
    }

    #[test]
    fn missing_and_reserved_brokers_are_skipped() {
        let meta = meta(&[(1001, false)]);
        let reference = reference(&[(0, false), (1001, false), (1004, true)]);
        assert!(validate_broker_metrics(&reference, &meta).is_ok());
    }

    #[test]
    fn reports_every_incomplete_broker() {
        let meta = meta(&[(1001, true), (1002, false)]);
        let reference = reference(&[(1001, false), (1002, false), (1003, false)]);

        let err = validate_broker_metrics(&reference, &meta).unwrap_err();
        assert!(matches!(
            &err,
            FatalError::MetricsIncomplete(ids) if ids == &vec![BrokerId(1001), BrokerId(1003)]
        ));
        assert_eq!(
            err.diagnostics(),
            vec![
                "Metrics not found for broker 1001",
                "Metrics not found for broker 1003"
            ]
        );
    }
}
