//! # Metadata reconciliation
//!
//! Fatal only when no broker record is usable; partial metadata passes and is
//! checked against the reference set of the operation.

mod common;

use common::ClusterFixture;
use serde_json::json;
use throttlekit_core::metadata::{
    get_partition_meta, reconcile_broker_meta, validate_broker_metrics,
};
use throttlekit_core::{Broker, BrokerId, BrokerMap, FatalError};

#[tokio::test]
async fn empty_cluster_is_fatal_with_diagnostics() {
    let handler = ClusterFixture::new().build().await;

    let err = reconcile_broker_meta(&handler, true).await.unwrap_err();
    assert!(matches!(err, FatalError::BrokerMetaUnavailable(_)));
    assert_eq!(err.diagnostics(), vec!["no brokers registered"]);
}

#[tokio::test]
async fn missing_metrics_node_is_fatal() {
    let handler = ClusterFixture::new().broker(1001).build().await;

    let err = reconcile_broker_meta(&handler, true).await.unwrap_err();
    assert_eq!(
        err.diagnostics(),
        vec!["node /topicmappr/metrics/brokers not found"]
    );

    // without metrics the same cluster is usable
    let meta = reconcile_broker_meta(&handler, false).await.unwrap();
    assert_eq!(meta.len(), 1);
}

#[tokio::test]
async fn partial_metadata_is_tolerated_until_validated() {
    let handler = ClusterFixture::new()
        .broker(1001)
        .broker(1002)
        .broker_metrics(json!({"1001": {"StorageFree": 100.0}}))
        .build()
        .await;

    let meta = reconcile_broker_meta(&handler, true).await.unwrap();
    assert_eq!(meta.len(), 2);

    let relevant: BrokerMap = [(BrokerId(1001), Broker::new(BrokerId(1001)))]
        .into_iter()
        .collect();
    assert!(validate_broker_metrics(&relevant, &meta).is_ok());

    let mut wider = relevant.clone();
    wider.insert(BrokerId(1002), Broker::new(BrokerId(1002)));
    let err = validate_broker_metrics(&wider, &meta).unwrap_err();
    assert_eq!(err.diagnostics(), vec!["Metrics not found for broker 1002"]);
}

#[tokio::test]
async fn partition_meta_is_passed_through() {
    let handler = ClusterFixture::new()
        .partition_meta(json!({"orders": {"0": {"Size": 12.0}, "1": {"Size": 24.0}}}))
        .build()
        .await;

    let meta = get_partition_meta(&handler).await.unwrap();
    assert_eq!(meta.len(), 2);
    assert_eq!(meta.size("orders", 1), Some(24.0));
}
