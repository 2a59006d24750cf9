//! End-to-end certificate issuance scenarios against an in-memory cluster.

use std::time::Duration;

use hotcert_consensus::Acceptor;
use hotcert_testkit::{make_csr, Cluster};
use hotcert_types::Fingerprint;
use x509_cert::der::Decode;

const KEY_SIZE: usize = 512;

#[tokio::test]
async fn happy_path_four_replicas_threshold_three() {
    let cluster = Cluster::start(3, 4, KEY_SIZE).await;
    let csr = make_csr(1, "Alice");

    let der = tokio::time::timeout(Duration::from_secs(5), cluster.submit(0, csr))
        .await
        .expect("within deadline")
        .expect("certificate issued");

    let cert = x509_cert::Certificate::from_der(&der).expect("valid X.509 DER");
    assert_eq!(
        cert.tbs_certificate.subject.to_string(),
        "CN=Alice"
    );
    assert_eq!(
        cert.tbs_certificate.issuer.to_string(),
        format!("CN={}", hotcert_crypto::ISSUER_NAME)
    );

    cluster.shutdown().await;
}

#[tokio::test]
async fn one_faulty_signer_still_reaches_quorum() {
    let cluster = Cluster::start(3, 4, KEY_SIZE).await;
    cluster.stop_signer(3);

    let csr = make_csr(2, "Bob");
    let der = cluster.submit(0, csr).await.expect("certificate issued");
    assert!(!der.is_empty());

    cluster.shutdown().await;
}

#[tokio::test]
async fn quorum_unreachable_surfaces_an_error() {
    let cluster = Cluster::start(3, 4, KEY_SIZE).await;
    cluster.stop_signer(2);
    cluster.stop_signer(3);

    let csr = make_csr(3, "Carol");
    let fingerprint = Fingerprint::from_csr(&csr);
    let outcome = cluster.submit(0, csr).await;

    assert!(matches!(
        outcome,
        Err(hotcert_coordinator::CoordinatorError::QuorumNotReached { .. })
    ));

    let _ = fingerprint;
    cluster.shutdown().await;
}

#[tokio::test]
async fn unauthorized_signing_request_is_rejected() {
    let cluster = Cluster::start(3, 4, KEY_SIZE).await;

    let csr = make_csr(4, "Dave");
    let fingerprint = Fingerprint::from_csr(&csr);
    let tbs = hotcert_types::Tbs::from_der(vec![0u8; 4]);

    let result = cluster.coordinators[1].get_partial_sig(&fingerprint, &tbs);
    assert!(matches!(
        result,
        Err(hotcert_coordinator::CoordinatorError::NotFound(_))
    ));

    cluster.shutdown().await;
}

#[tokio::test]
async fn replay_of_a_proposed_request_is_rejected() {
    let cluster = Cluster::start(3, 4, KEY_SIZE).await;
    let coordinator = &cluster.coordinators[0];
    let bytes = make_csr(5, "Replay").encode();

    assert!(coordinator.accept(&bytes).await);
    coordinator.proposed(&bytes).await;

    assert!(
        !coordinator.accept(&bytes).await,
        "replay of an already-proposed command must be rejected"
    );

    cluster.shutdown().await;
}

/// Every replica computes Fingerprint from the same command bytes that went
/// over the wire, never from its own re-derivation of the CSR; simulate
/// that by round-tripping each generated CSR through `encode`/`decode`
/// before comparing, the way a peer replica would after `Get` serializes it.
#[tokio::test]
async fn deterministic_fingerprint_across_many_csrs() {
    for i in 0..200u32 {
        let original = make_csr(i, &format!("replica-{i}"));
        let wire_bytes = original.encode();
        let peer_copy = hotcert_types::Csr::decode(&wire_bytes).expect("decodes on every replica");

        assert_eq!(
            Fingerprint::from_csr(&original),
            Fingerprint::from_csr(&peer_copy)
        );
    }
}
