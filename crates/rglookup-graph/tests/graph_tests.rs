//! Tests for rglookup-graph: memory store queries, snapshots, transaction accounting, seeding

use rglookup_graph::*;
use std::io::Write;

async fn drain(cursor: &mut Box<dyn RowCursor>) -> Vec<Node> {
    let mut nodes = Vec::new();
    while let Some(row) = cursor.next_row().await.unwrap() {
        nodes.push(row.take("n").unwrap());
    }
    nodes
}

fn publications() -> MemoryGraph {
    let graph = MemoryGraph::new();
    graph
        .insert_with("publication", &[("key", "p1"), ("title", "One"), ("doi", "10.1/abc")])
        .unwrap();
    graph
        .insert_with("publication", &[("key", "p2"), ("title", "Two"), ("doi", "10.1/abd")])
        .unwrap();
    graph
        .insert_with("dataset", &[("key", "d1"), ("title", "Data"), ("doi", "10.1/abc")])
        .unwrap();
    graph
}

// ===========================================================================
// Query execution
// ===========================================================================

#[tokio::test]
async fn exact_match_filters_by_label_and_property() {
    let graph = publications();
    let tx = graph.begin().await.unwrap();
    let query = Query::new("MATCH (n:dataset) WHERE n.doi = $doi RETURN n").param("doi", "10.1/abc");
    let mut cursor = tx.execute(query).await.unwrap();
    let nodes = drain(&mut cursor).await;
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].property("key"), Some(&Value::from("d1")));
    cursor.close().await.unwrap();
}

#[tokio::test]
async fn regex_match_returns_rows_in_insertion_order() {
    let graph = publications();
    let tx = graph.begin().await.unwrap();
    let query =
        Query::new("MATCH (n:publication) WHERE n.doi =~ $doi RETURN n").param("doi", "10\\.1/ab.");
    let mut cursor = tx.execute(query).await.unwrap();
    let keys: Vec<String> = drain(&mut cursor)
        .await
        .iter()
        .map(|n| n.property("key").unwrap().to_string())
        .collect();
    assert_eq!(keys, vec!["p1", "p2"]);
}

#[tokio::test]
async fn unknown_label_yields_no_rows() {
    let graph = publications();
    let tx = graph.begin().await.unwrap();
    let query = Query::new("MATCH (n:grant) WHERE n.purl = $purl RETURN n").param("purl", "x");
    let mut cursor = tx.execute(query).await.unwrap();
    assert!(cursor.next_row().await.unwrap().is_none());
    assert!(cursor.next_row().await.unwrap().is_none());
}

#[tokio::test]
async fn parameter_value_is_never_parsed_as_query_text() {
    let graph = publications();
    let tx = graph.begin().await.unwrap();
    let query = Query::new("MATCH (n:publication) WHERE n.doi = $doi RETURN n")
        .param("doi", "x' OR 1=1 RETURN n //");
    let mut cursor = tx.execute(query).await.unwrap();
    assert!(cursor.next_row().await.unwrap().is_none());
}

#[tokio::test]
async fn invalid_regex_is_rejected() {
    let graph = publications();
    let tx = graph.begin().await.unwrap();
    let query = Query::new("MATCH (n:publication) WHERE n.doi =~ $doi RETURN n").param("doi", "10.1/(");
    let err = tx.execute(query).await.err().unwrap();
    assert!(matches!(err, StoreError::InvalidParameter { .. }));
}

// ===========================================================================
// Transactions
// ===========================================================================

#[tokio::test]
async fn transactions_are_released_on_close_drop_and_error() {
    let graph = publications();
    let stats = graph.stats();

    let tx = graph.begin().await.unwrap();
    assert_eq!(graph.open_transactions(), Some(1));
    let cursor = tx
        .execute(Query::new("MATCH (n:publication) WHERE n.doi = $doi RETURN n").param("doi", "x"))
        .await
        .unwrap();
    cursor.close().await.unwrap();
    assert_eq!(stats.open(), 0);

    let tx = graph.begin().await.unwrap();
    let cursor = tx
        .execute(Query::new("MATCH (n:publication) WHERE n.doi = $doi RETURN n").param("doi", "x"))
        .await
        .unwrap();
    drop(cursor);
    assert_eq!(stats.open(), 0);

    let tx = graph.begin().await.unwrap();
    assert!(tx.execute(Query::new("MATCH nonsense")).await.is_err());
    assert_eq!(stats.open(), 0);

    let tx = graph.begin().await.unwrap();
    drop(tx);
    assert_eq!(stats.opened(), 4);
    assert_eq!(stats.closed(), 4);
}

#[tokio::test]
async fn transaction_reads_a_stable_snapshot() {
    let graph = publications();
    let tx = graph.begin().await.unwrap();
    graph
        .insert_with("publication", &[("key", "p3"), ("title", "Three"), ("doi", "10.1/abe")])
        .unwrap();
    let query =
        Query::new("MATCH (n:publication) WHERE n.doi =~ $doi RETURN n").param("doi", "10.1/.*");
    let mut cursor = tx.execute(query).await.unwrap();
    assert_eq!(drain(&mut cursor).await.len(), 2);
    assert_eq!(graph.node_count(), 4);
}

// ===========================================================================
// Seeding
// ===========================================================================

#[test]
fn load_json_seed_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"nodes": [
            {{"labels": ["grant"], "properties": {{"key": "g1", "title": "Grant One", "purl": "http://example.org/g1"}}}},
            {{"labels": ["researcher"], "properties": {{"key": "r1", "title": "Ada", "orcid": "0000-0002-1825-0097", "h_index": 12}}}}
        ]}}"#
    )
    .unwrap();
    let graph = MemoryGraph::new();
    assert_eq!(graph.load_json(file.path()).unwrap(), 2);
    assert_eq!(graph.node_count(), 2);
}

#[test]
fn load_json_rejects_malformed_seed() {
    let graph = MemoryGraph::new();
    assert!(matches!(graph.load_json_str("{\"nodes\": 3}"), Err(StoreError::Json(_))));
}
