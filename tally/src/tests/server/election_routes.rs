use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256};
use chrono::{TimeZone, Utc};
use rstest::rstest;
use serde_json::{json, Value};
use tally_ledger_client::eth::error::EthereumClientError;
use tally_ledger_client::types::ReceiptStatus;
use tally_ledger_client::{LedgerClientError, MockLedgerClient};
use tokio::sync::mpsc;

use crate::database::{DatabaseError, MockDatabase};
use crate::tests::config::TestConfigBuilder;
use crate::types::operation::OperationState;
use crate::types::params::TrackerParams;
use crate::types::projection::{
    AuditAction, AuditEntry, CandidateRecord, ElectionMetadata, ElectionPhase, MirrorState, VoterRecord, VoterStatus,
};

fn registry() -> Address {
    Address::repeat_byte(0x01)
}

fn election() -> Address {
    Address::repeat_byte(0x5a)
}

fn contract_code() -> Bytes {
    Bytes::from(vec![0x60, 0x80, 0x60, 0x40])
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

/// Submission answers immediately with the handle, the verdict lands through
/// the background tracker: state update, metadata seeding, audit line.
#[rstest]
#[tokio::test]
async fn test_create_election_submits_and_confirms_in_background() {
    let tx_handle = B256::repeat_byte(0xaa);
    let deployed = Address::repeat_byte(0x22);
    let (tx, mut rx) = mpsc::unbounded_channel::<&'static str>();

    let mut ledger = MockLedgerClient::new();
    ledger.expect_registry_address().return_const(registry());
    ledger.expect_code_at().times(1).returning(|_| Ok(contract_code()));
    ledger
        .expect_create_election()
        .withf(|email, name, desc| {
            email == "org@example.com" && name == "Board 2025" && desc == "Annual board election"
        })
        .times(1)
        .returning(move |_, _, _| Ok(tx_handle));
    ledger.expect_receipt_status().times(1).returning(|_| Ok(ReceiptStatus::Mined { block_number: Some(1) }));
    ledger.expect_registry_lookup().times(1).returning(move |_| Ok(deployed));

    let mut database = MockDatabase::new();
    database.expect_create_operation().times(1).returning(|operation| Ok(operation));
    let state_tx = tx.clone();
    database
        .expect_update_operation_state()
        .withf(|_, state| *state == OperationState::Mined)
        .times(1)
        .returning(move |operation, state| {
            let mut updated = operation.clone();
            updated.state = state;
            let _ = state_tx.send("state");
            Ok(updated)
        });
    let metadata_tx = tx.clone();
    database
        .expect_ensure_metadata()
        .withf(move |address, name, _| address == deployed.to_string() && name == "Board 2025")
        .times(1)
        .returning(move |_, _, _| {
            let _ = metadata_tx.send("metadata");
            Ok(())
        });
    let audit_tx = tx.clone();
    database
        .expect_append_audit()
        .withf(|entry| entry.action == AuditAction::ElectionCreated && entry.actor == "org@example.com")
        .times(1)
        .returning(move |_| {
            let _ = audit_tx.send("audit");
            Ok(())
        });

    let services = TestConfigBuilder::new()
        .configure_ledger(ledger)
        .configure_database(database)
        .configure_api_server()
        .build()
        .await;
    let addr = services.api_server_address.unwrap();

    let response = client()
        .post(format!("http://{}/api/elections", addr))
        .json(&json!({
            "company_email": "org@example.com",
            "election_name": "Board 2025",
            "election_description": "Annual board election",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "createElection transaction submitted");
    assert_eq!(body["confirmed"], false);
    assert_eq!(body["txHash"].as_str(), Some(tx_handle.to_string().as_str()));
    assert_eq!(body["election_address"], "");

    let mut received = Vec::new();
    for _ in 0..3 {
        let label = tokio::time::timeout(Duration::from_secs(3), rx.recv())
            .await
            .expect("tracker did not settle in time")
            .expect("channel closed");
        received.push(label);
    }
    assert_eq!(received, vec!["state", "metadata", "audit"]);
}

/// When the node cannot even be reached for the registry inspection, no
/// transaction is signed and nothing is written anywhere.
#[rstest]
#[tokio::test]
async fn test_create_election_unreachable_node_submits_nothing() {
    let mut ledger = MockLedgerClient::new();
    ledger.expect_registry_address().return_const(registry());
    ledger.expect_code_at().times(1).returning(|_| {
        Err(LedgerClientError::Ethereum(EthereumClientError::NetworkConnection {
            message: "connection refused".to_string(),
        }))
    });
    ledger.expect_create_election().never();

    let mut database = MockDatabase::new();
    database.expect_create_operation().never();

    let services = TestConfigBuilder::new()
        .configure_ledger(ledger)
        .configure_database(database)
        .configure_api_server()
        .build()
        .await;
    let addr = services.api_server_address.unwrap();

    let response = client()
        .post(format!("http://{}/api/elections", addr))
        .json(&json!({
            "company_email": "org@example.com",
            "election_name": "Board 2025",
            "election_description": "Annual board election",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "failed to connect to ethereum node");
}

#[rstest]
#[tokio::test]
async fn test_create_election_requires_all_fields() {
    let services = TestConfigBuilder::new().configure_api_server().build().await;
    let addr = services.api_server_address.unwrap();

    let response = client().post(format!("http://{}/api/elections", addr)).json(&json!({})).send().await.unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "company_email, election_name and election_description are required");
}

#[rstest]
#[tokio::test]
async fn test_candidates_ambiguous_prefix_is_rejected() {
    let mut database = MockDatabase::new();
    database
        .expect_find_addresses_with_prefix()
        .withf(|prefix, limit| prefix == "0xABCDEF" && *limit == 5)
        .times(1)
        .returning(|_, _| {
            Ok(vec![
                "0xabcdef1111111111111111111111111111111111".to_string(),
                "0xabcdef2222222222222222222222222222222222".to_string(),
            ])
        });

    let services = TestConfigBuilder::new().configure_database(database).configure_api_server().build().await;
    let addr = services.api_server_address.unwrap();

    let response = reqwest::get(format!("http://{}/api/elections/0xABCDEF/candidates", addr)).await.unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(
        body["message"],
        "ambiguous truncated election identifier; multiple elections match this prefix - please provide the full address"
    );
    assert_eq!(body["matches"], 2);
}

#[rstest]
#[tokio::test]
async fn test_candidates_from_mirror_when_contract_missing() {
    let mut ledger = MockLedgerClient::new();
    ledger.expect_code_at().times(1).returning(|_| Ok(Bytes::new()));

    let canonical = election().to_string();
    let record = CandidateRecord::submitted(
        "Alice".to_string(),
        "alice@example.com".to_string(),
        "Alice for the board".to_string(),
        String::new(),
        None,
        "Board 2025".to_string(),
        canonical.clone(),
        "0xfeed".to_string(),
    );
    let mut database = MockDatabase::new();
    database
        .expect_get_candidates_by_election()
        .withf(move |key| key == canonical)
        .times(1)
        .returning(move |_| Ok(vec![record.clone()]));

    let services = TestConfigBuilder::new()
        .configure_ledger(ledger)
        .configure_database(database)
        .configure_api_server()
        .build()
        .await;
    let addr = services.api_server_address.unwrap();

    let response =
        reqwest::get(format!("http://{}/api/elections/{}/candidates", addr, election())).await.unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["source"], "db_fallback");
    assert_eq!(body["detail"], "no contract code at given address");
    assert_eq!(body["candidates"][0]["email"], "alice@example.com");
    assert_eq!(body["candidates"][0]["txHash"], "0xfeed");
}

/// An identifier the registry knows nothing about still gets a mirror
/// answer, keyed by the identifier itself.
#[rstest]
#[tokio::test]
async fn test_summary_for_unresolved_email_served_from_mirror() {
    let mut ledger = MockLedgerClient::new();
    ledger.expect_registry_address().return_const(registry());
    ledger.expect_code_at().times(1).returning(|_| Ok(contract_code()));
    ledger.expect_registry_lookup().withf(|email| email == "someone@example.com").times(1).returning(|_| {
        Ok(Address::ZERO)
    });

    let metadata = ElectionMetadata::open_defaults(
        "someone@example.com".to_string(),
        "Board 2025".to_string(),
        "Annual board election".to_string(),
    );
    let mut database = MockDatabase::new();
    database.expect_count_candidates().withf(|key| key == "someone@example.com").times(1).returning(|_| Ok(3));
    database.expect_count_voters().times(1).returning(|_| Ok(12));
    database.expect_get_metadata().times(1).returning(move |_| Ok(Some(metadata.clone())));

    let services = TestConfigBuilder::new()
        .configure_ledger(ledger)
        .configure_database(database)
        .configure_api_server()
        .build()
        .await;
    let addr = services.api_server_address.unwrap();

    let response =
        reqwest::get(format!("http://{}/api/elections/someone@example.com/summary", addr)).await.unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["source"], "db_fallback");
    assert_eq!(body["detail"], "no deployed election found for provided identifier");
    assert_eq!(body["data"]["election_addr"], "someone@example.com");
    assert_eq!(body["data"]["candidates_count"], 3);
    assert_eq!(body["data"]["election_name"], "Board 2025");
}

/// When neither the registry nor the mirror knows the identifier, the
/// response is an error that says so, never empty data.
#[rstest]
#[tokio::test]
async fn test_summary_for_unknown_email_is_an_explicit_error() {
    let mut ledger = MockLedgerClient::new();
    ledger.expect_registry_address().return_const(registry());
    ledger.expect_code_at().times(1).returning(|_| Ok(contract_code()));
    ledger.expect_registry_lookup().times(1).returning(|_| Ok(Address::ZERO));

    let mut database = MockDatabase::new();
    database.expect_count_candidates().times(1).returning(|_| Ok(0));
    database.expect_count_voters().times(1).returning(|_| Ok(0));
    database.expect_get_metadata().times(1).returning(|_| Ok(None));

    let services = TestConfigBuilder::new()
        .configure_ledger(ledger)
        .configure_database(database)
        .configure_api_server()
        .build()
        .await;
    let addr = services.api_server_address.unwrap();

    let response =
        reqwest::get(format!("http://{}/api/elections/nobody@example.com/summary", addr)).await.unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "no off-chain fallback data for this election");
    assert_eq!(
        body["detail"],
        "no deployed election found for provided identifier | mirror has no record of this election"
    );
}

/// With a synchronous wait window configured the response carries the mined
/// verdict instead of a bare submission receipt.
#[rstest]
#[tokio::test]
async fn test_register_candidate_reports_sync_confirmation() {
    let tx_handle = B256::repeat_byte(0xbb);

    let mut ledger = MockLedgerClient::new();
    ledger
        .expect_register_candidate()
        .withf(move |address, submission| *address == election() && submission.email == "jane@example.com")
        .times(1)
        .returning(move |_, _| Ok(tx_handle));
    ledger.expect_receipt_status().times(1).returning(|_| Ok(ReceiptStatus::Mined { block_number: Some(2) }));

    let mut database = MockDatabase::new();
    database
        .expect_create_candidate()
        .withf(|record| record.email == "jane@example.com" && record.state == MirrorState::Submitted)
        .times(1)
        .returning(|record| Ok(record));
    database.expect_create_operation().times(1).returning(|operation| Ok(operation));
    database.expect_update_operation_state().times(1).returning(|operation, state| {
        let mut updated = operation.clone();
        updated.state = state;
        Ok(updated)
    });
    database
        .expect_set_candidate_mirror_state()
        .withf(|_, state| *state == MirrorState::Mined)
        .times(1)
        .returning(|_, _| Ok(()));
    database
        .expect_append_audit()
        .withf(|entry| entry.action == AuditAction::CandidateRegistered)
        .times(1)
        .returning(|_| Ok(()));

    let services = TestConfigBuilder::new()
        .configure_ledger(ledger)
        .configure_database(database)
        .configure_tracker_params(TrackerParams {
            confirmation_wait_in_secs: 5,
            receipt_poll_in_secs: 0,
            sync_confirm_wait_in_secs: Some(2),
        })
        .configure_api_server()
        .build()
        .await;
    let addr = services.api_server_address.unwrap();

    let response = client()
        .post(format!("http://{}/api/elections/{}/candidates", addr, election()))
        .json(&json!({
            "email": "jane@example.com",
            "name": "Jane",
            "description": "Jane for the board",
            "imageHash": "QmImage",
            "election_name": "Board 2025",
            "manifesto_url": "https://jane.example.com/manifesto",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Candidate registered and transaction mined");
    assert_eq!(body["confirmed"], true);
    assert_eq!(body["txHash"].as_str(), Some(tx_handle.to_string().as_str()));
}

#[rstest]
#[tokio::test]
async fn test_register_candidate_requires_name_and_email() {
    let services = TestConfigBuilder::new().configure_api_server().build().await;
    let addr = services.api_server_address.unwrap();

    let response = client()
        .post(format!("http://{}/api/elections/{}/candidates", addr, election()))
        .json(&json!({ "email": "jane@example.com" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "email and name are required");
}

#[rstest]
#[tokio::test]
async fn test_cast_vote_rejects_unverified_voter() {
    let mut ledger = MockLedgerClient::new();
    ledger.expect_cast_vote().never();
    ledger.expect_code_at().never();

    let mut database = MockDatabase::new();
    database.expect_get_metadata().times(1).returning(|_| Ok(None));
    database.expect_get_voter().times(1).returning(|_, _| Ok(None));

    let services = TestConfigBuilder::new()
        .configure_ledger(ledger)
        .configure_database(database)
        .configure_api_server()
        .build()
        .await;
    let addr = services.api_server_address.unwrap();

    let response = client()
        .post(format!("http://{}/api/elections/{}/votes", addr, election()))
        .json(&json!({ "candidate_id": 1, "voter_email": "sam@example.com" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Voter not verified. Please contact election admin.");
}

#[rstest]
#[tokio::test]
async fn test_cast_vote_before_window_opens_is_rejected() {
    let start = Utc::now() + chrono::Duration::hours(2);
    let metadata = ElectionMetadata {
        election_address: election().to_string(),
        election_name: "Board 2025".to_string(),
        election_desc: "Annual board election".to_string(),
        status: ElectionPhase::Upcoming,
        start_date: start,
        end_date: start + chrono::Duration::days(1),
    };

    let mut database = MockDatabase::new();
    database.expect_get_metadata().times(1).returning(move |_| Ok(Some(metadata.clone())));

    let services = TestConfigBuilder::new().configure_database(database).configure_api_server().build().await;
    let addr = services.api_server_address.unwrap();

    let response = client()
        .post(format!("http://{}/api/elections/{}/votes", addr, election()))
        .json(&json!({ "candidate_id": 1, "voter_email": "sam@example.com" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    let expected = format!(
        "Voting not allowed: Election has not started yet. Starts at {} UTC",
        start.format("%Y-%m-%d %H:%M")
    );
    assert_eq!(body["message"].as_str(), Some(expected.as_str()));
}

#[rstest]
#[tokio::test]
async fn test_cast_vote_after_end_is_rejected() {
    let now = Utc::now();
    let metadata = ElectionMetadata {
        election_address: election().to_string(),
        election_name: "Board 2025".to_string(),
        election_desc: "Annual board election".to_string(),
        status: ElectionPhase::Ended,
        start_date: now - chrono::Duration::days(7),
        end_date: now - chrono::Duration::hours(1),
    };

    let mut database = MockDatabase::new();
    database.expect_get_metadata().times(1).returning(move |_| Ok(Some(metadata.clone())));

    let services = TestConfigBuilder::new().configure_database(database).configure_api_server().build().await;
    let addr = services.api_server_address.unwrap();

    let response = client()
        .post(format!("http://{}/api/elections/{}/votes", addr, election()))
        .json(&json!({ "candidate_id": 1, "voter_email": "sam@example.com" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Voting not allowed: Election has ended.");
}

#[rstest]
#[tokio::test]
async fn test_cast_vote_submits_and_audits_when_mined() {
    let tx_handle = B256::repeat_byte(0xcc);
    let (tx, mut rx) = mpsc::unbounded_channel::<&'static str>();

    let mut ledger = MockLedgerClient::new();
    ledger.expect_code_at().times(1).returning(|_| Ok(contract_code()));
    ledger
        .expect_cast_vote()
        .withf(move |address, candidate_id, voter| {
            *address == election() && *candidate_id == 2 && voter == "sam@example.com"
        })
        .times(1)
        .returning(move |_, _, _| Ok(tx_handle));
    ledger.expect_receipt_status().times(1).returning(|_| Ok(ReceiptStatus::Mined { block_number: Some(4) }));

    let mut database = MockDatabase::new();
    database.expect_get_metadata().times(1).returning(|_| Ok(None));
    database.expect_get_voter().times(1).returning(|_, email| {
        Ok(Some(VoterRecord::new("Sam".to_string(), email.to_string(), election().to_string(), VoterStatus::Verified)))
    });
    database.expect_create_operation().times(1).returning(|operation| Ok(operation));
    let state_tx = tx.clone();
    database.expect_update_operation_state().times(1).returning(move |operation, state| {
        let mut updated = operation.clone();
        updated.state = state;
        let _ = state_tx.send("state");
        Ok(updated)
    });
    let audit_tx = tx.clone();
    database
        .expect_append_audit()
        .withf(|entry| {
            entry.action == AuditAction::VoteCast
                && entry.actor == "sam@example.com"
                && entry.details == "Voted successfully (mined)"
        })
        .times(1)
        .returning(move |_| {
            let _ = audit_tx.send("audit");
            Ok(())
        });

    let services = TestConfigBuilder::new()
        .configure_ledger(ledger)
        .configure_database(database)
        .configure_api_server()
        .build()
        .await;
    let addr = services.api_server_address.unwrap();

    let response = client()
        .post(format!("http://{}/api/elections/{}/votes", addr, election()))
        .json(&json!({ "candidate_id": 2, "voter_email": "sam@example.com" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "vote transaction submitted to the blockchain");
    assert_eq!(body["confirmed"], false);

    let mut received = Vec::new();
    for _ in 0..2 {
        let label = tokio::time::timeout(Duration::from_secs(3), rx.recv())
            .await
            .expect("tracker did not settle in time")
            .expect("channel closed");
        received.push(label);
    }
    assert_eq!(received, vec!["state", "audit"]);
}

#[rstest]
#[case::reversed_window(
    json!({ "start_date": "2026-09-10T10:00", "end_date": "2026-09-09T10:00" }),
    "End date cannot be before start date"
)]
#[case::unparseable_start(
    json!({ "start_date": "soon", "end_date": "2026-09-09T10:00" }),
    "Invalid start_date format (use RFC3339 or YYYY-MM-DDTHH:MM)"
)]
#[case::unparseable_end(json!({ "start_date": "2026-09-09T10:00", "end_date": "whenever" }), "Invalid end_date format")]
#[tokio::test]
async fn test_schedule_rejects_bad_windows(#[case] body: Value, #[case] expected: &str) {
    let services = TestConfigBuilder::new().configure_api_server().build().await;
    let addr = services.api_server_address.unwrap();

    let response = client()
        .patch(format!("http://{}/api/elections/{}/schedule", addr, election()))
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let response_body: Value = response.json().await.unwrap();
    assert_eq!(response_body["message"].as_str(), Some(expected));
}

#[rstest]
#[tokio::test]
async fn test_schedule_update_writes_window_and_audits() {
    let expected_start = Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap();
    let expected_end = Utc.with_ymd_and_hms(2026, 9, 30, 18, 0, 0).unwrap();
    let canonical = election().to_string();

    let mut database = MockDatabase::new();
    let schedule_key = canonical.clone();
    database
        .expect_set_schedule()
        .withf(move |address, start, end| {
            address == schedule_key && *start == expected_start && *end == expected_end
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    database
        .expect_append_audit()
        .withf(move |entry| {
            entry.action == AuditAction::ScheduleUpdate
                && entry.details == format!("Dates updated: {expected_start} to {expected_end}")
        })
        .times(1)
        .returning(|_| Ok(()));

    let services = TestConfigBuilder::new().configure_database(database).configure_api_server().build().await;
    let addr = services.api_server_address.unwrap();

    let response = client()
        .patch(format!("http://{}/api/elections/{}/schedule", addr, election()))
        .json(&json!({ "start_date": "2026-09-01T08:00", "end_date": "2026-09-30T18:00:00Z" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Election dates updated");
}

#[rstest]
#[tokio::test]
async fn test_end_election_closes_window_and_audits() {
    let canonical = election().to_string();

    let mut ledger = MockLedgerClient::new();
    ledger.expect_winner_candidate().times(1).returning(|_| Ok(2));

    let mut database = MockDatabase::new();
    let end_key = canonical.clone();
    database.expect_end_election().withf(move |address| address == end_key).times(1).returning(|_| Ok(()));
    database
        .expect_append_audit()
        .withf(|entry| {
            entry.action == AuditAction::ElectionEnded
                && entry.details == "Manually ended election via API; leading candidate id 2"
        })
        .times(1)
        .returning(|_| Ok(()));

    let services = TestConfigBuilder::new()
        .configure_ledger(ledger)
        .configure_database(database)
        .configure_api_server()
        .build()
        .await;
    let addr = services.api_server_address.unwrap();

    let response =
        client().post(format!("http://{}/api/elections/{}/end", addr, election())).send().await.unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Election ended");
}

/// Ending must not depend on the ledger answering; the audit line just
/// loses the winner note.
#[rstest]
#[tokio::test]
async fn test_end_election_survives_an_unreachable_ledger() {
    let mut ledger = MockLedgerClient::new();
    ledger.expect_winner_candidate().times(1).returning(|_| {
        Err(LedgerClientError::Ethereum(EthereumClientError::NetworkConnection {
            message: "connection refused".to_string(),
        }))
    });

    let mut database = MockDatabase::new();
    database.expect_end_election().times(1).returning(|_| Ok(()));
    database
        .expect_append_audit()
        .withf(|entry| entry.details == "Manually ended election via API")
        .times(1)
        .returning(|_| Ok(()));

    let services = TestConfigBuilder::new()
        .configure_ledger(ledger)
        .configure_database(database)
        .configure_api_server()
        .build()
        .await;
    let addr = services.api_server_address.unwrap();

    let response =
        client().post(format!("http://{}/api/elections/{}/end", addr, election())).send().await.unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Election ended");
}

#[rstest]
#[tokio::test]
async fn test_list_elections_reports_count() {
    let metadata = ElectionMetadata::open_defaults(
        election().to_string(),
        "Board 2025".to_string(),
        "Annual board election".to_string(),
    );

    let mut database = MockDatabase::new();
    database.expect_list_metadata().times(1).returning(move || Ok(vec![metadata.clone()]));

    let services = TestConfigBuilder::new().configure_database(database).configure_api_server().build().await;
    let addr = services.api_server_address.unwrap();

    let response = reqwest::get(format!("http://{}/api/elections", addr)).await.unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["election_name"], "Board 2025");
    assert_eq!(body["data"][0]["status"], "ONGOING");
}

#[rstest]
#[tokio::test]
async fn test_metadata_absent_is_not_found() {
    let mut database = MockDatabase::new();
    database.expect_get_metadata().times(1).returning(|_| Ok(None));

    let services = TestConfigBuilder::new().configure_database(database).configure_api_server().build().await;
    let addr = services.api_server_address.unwrap();

    let response =
        reqwest::get(format!("http://{}/api/elections/{}/metadata", addr, election())).await.unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Metadata not found (election might use default open dates)");
}

#[rstest]
#[tokio::test]
async fn test_enroll_voter_duplicate_is_a_conflict() {
    let mut database = MockDatabase::new();
    database
        .expect_enroll_voter()
        .withf(|voter| voter.email == "sam@example.com" && voter.status == VoterStatus::Pending)
        .times(1)
        .returning(|_| Err(DatabaseError::ItemAlreadyExists("voter sam@example.com already enrolled".to_string())));

    let services = TestConfigBuilder::new().configure_database(database).configure_api_server().build().await;
    let addr = services.api_server_address.unwrap();

    let response = client()
        .post(format!("http://{}/api/elections/{}/voters", addr, election()))
        .json(&json!({ "name": "Sam", "email": "sam@example.com" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "voter sam@example.com already enrolled");
}

#[rstest]
#[tokio::test]
async fn test_review_voter_defaults_to_verified() {
    let canonical = election().to_string();

    let mut database = MockDatabase::new();
    let status_key = canonical.clone();
    database
        .expect_set_voter_status()
        .withf(move |address, email, status| {
            address == status_key && email == "sam@example.com" && *status == VoterStatus::Verified
        })
        .times(1)
        .returning(move |address, email, status| {
            Ok(VoterRecord::new("Sam".to_string(), email.to_string(), address.to_string(), status))
        });
    database
        .expect_append_audit()
        .withf(|entry| {
            entry.action == AuditAction::VoterReviewed && entry.details == "Marked sam@example.com as Verified"
        })
        .times(1)
        .returning(|_| Ok(()));

    let services = TestConfigBuilder::new().configure_database(database).configure_api_server().build().await;
    let addr = services.api_server_address.unwrap();

    let response = client()
        .patch(format!("http://{}/api/elections/{}/voters/sam@example.com", addr, election()))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Voter status updated to Verified");
}

#[rstest]
#[tokio::test]
async fn test_review_voter_rejects_unknown_status() {
    let services = TestConfigBuilder::new().configure_api_server().build().await;
    let addr = services.api_server_address.unwrap();

    let response = client()
        .patch(format!("http://{}/api/elections/{}/voters/sam@example.com", addr, election()))
        .json(&json!({ "status": "Maybe" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "status must be Verified or Rejected");
}

#[rstest]
#[tokio::test]
async fn test_list_voters_serves_the_roll() {
    let canonical = election().to_string();
    let voters = vec![
        VoterRecord::new("Sam".to_string(), "sam@example.com".to_string(), canonical.clone(), VoterStatus::Verified),
        VoterRecord::new("Kim".to_string(), "kim@example.com".to_string(), canonical.clone(), VoterStatus::Pending),
    ];

    let mut database = MockDatabase::new();
    let roll_key = canonical.clone();
    database
        .expect_list_voters()
        .withf(move |address| address == roll_key)
        .times(1)
        .returning(move |_| Ok(voters.clone()));

    let services = TestConfigBuilder::new().configure_database(database).configure_api_server().build().await;
    let addr = services.api_server_address.unwrap();

    let response = reqwest::get(format!("http://{}/api/elections/{}/voters", addr, election())).await.unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["email"], "sam@example.com");
    assert_eq!(body["data"][0]["status"], "Verified");
    assert_eq!(body["data"][1]["status"], "Pending");
}

/// The audit route serves the stored timeline in its stored order.
#[rstest]
#[tokio::test]
async fn test_audit_trail_lists_oldest_first() {
    let canonical = election().to_string();
    let entries = vec![
        AuditEntry::new(
            canonical.clone(),
            AuditAction::ElectionCreated,
            "org@example.com".to_string(),
            "Created".to_string(),
        ),
        AuditEntry::new(canonical.clone(), AuditAction::VoteCast, "sam@example.com".to_string(), "Voted".to_string()),
    ];

    let mut database = MockDatabase::new();
    let trail_key = canonical.clone();
    database
        .expect_list_audit()
        .withf(move |address| address == trail_key)
        .times(1)
        .returning(move |_| Ok(entries.clone()));

    let services = TestConfigBuilder::new().configure_database(database).configure_api_server().build().await;
    let addr = services.api_server_address.unwrap();

    let response = reqwest::get(format!("http://{}/api/elections/{}/audit", addr, election())).await.unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["action"], "ELECTION_CREATED");
    assert_eq!(body["data"][1]["action"], "VOTE_CAST");
    assert_eq!(body["data"][1]["actor"], "sam@example.com");
}
