// ═══════════════════════════════════════════════════════════════════
// Backend Tests — response normalization, HTTP client setup,
// in-process change feed
// ═══════════════════════════════════════════════════════════════════

mod common;

use common::mk;

use pocket_ledger_core::backend::channel::ChannelChangeFeed;
use pocket_ledger_core::backend::http::{check_ack, decode_envelope, HttpLedgerBackend};
use pocket_ledger_core::backend::traits::{ChangeFeed, LedgerBackend};
use pocket_ledger_core::config::ClientConfig;
use pocket_ledger_core::errors::CoreError;
use pocket_ledger_core::models::budget::{MonthSnapshot, PocketsSnapshot};
use pocket_ledger_core::models::expense::Expense;
use pocket_ledger_core::models::realtime::{ChangeEvent, RealtimeFilter};

// ═══════════════════════════════════════════════════════════════════
// Envelope decoding
// ═══════════════════════════════════════════════════════════════════

mod envelope {
    use super::*;

    #[test]
    fn wrapped_success_yields_data() {
        let body = r#"{"success":true,"data":{"budget":{"initialBudget":5000000},"expenses":[]}}"#;
        let snap: MonthSnapshot = decode_envelope("/budget/2025/3", body).unwrap();
        assert_eq!(snap.budget.unwrap().initial_budget, 5_000_000);
    }

    #[test]
    fn bare_payload_is_accepted() {
        let body = r#"{"id":"e1","name":"Coffee","amount":25000,"date":"2025-03-04","pocketId":"main"}"#;
        let expense: Expense = decode_envelope("/expenses/2025/3", body).unwrap();
        assert_eq!(expense.id, "e1");
        assert_eq!(expense.amount, 25_000);
        assert!(!expense.from_income);
    }

    #[test]
    fn unsuccessful_envelope_carries_error_message() {
        let body = r#"{"success":false,"error":"Budget locked"}"#;
        let err = decode_envelope::<MonthSnapshot>("/budget/2025/3", body).unwrap_err();
        match err {
            CoreError::Api { endpoint, message } => {
                assert_eq!(endpoint, "/budget/2025/3");
                assert_eq!(message, "Budget locked");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn unsuccessful_envelope_without_message_gets_default() {
        let body = r#"{"success":false}"#;
        let err = decode_envelope::<Expense>("/expenses/2025/3", body).unwrap_err();
        assert!(matches!(err, CoreError::Api { message, .. } if message == "Request was not successful"));
    }

    #[test]
    fn successful_envelope_without_data_is_error() {
        let body = r#"{"success":true}"#;
        let err = decode_envelope::<Expense>("/expenses/2025/3", body).unwrap_err();
        assert!(matches!(err, CoreError::Api { .. }));
    }

    #[test]
    fn malformed_body_is_parse_error() {
        let err = decode_envelope::<Expense>("/expenses/2025/3", "<html>").unwrap_err();
        assert!(matches!(err, CoreError::Api { message, .. } if message.starts_with("Failed to parse response")));
    }

    #[test]
    fn pockets_payload_with_entries() {
        let body = r#"{"success":true,"data":{
            "pockets":[{"id":"main","type":"primary","name":"Main"}],
            "balances":[],
            "entries":[{"type":"initial","pocketId":"main","amount":100000}]
        }}"#;
        let snap: PocketsSnapshot = decode_envelope("/pockets/2025/3", body).unwrap();
        assert_eq!(snap.pockets.len(), 1);
        assert_eq!(snap.entries.len(), 1);
    }
}

mod ack {
    use super::*;

    #[test]
    fn empty_body_is_success() {
        assert!(check_ack("/expenses/2025/3/e1", "").is_ok());
        assert!(check_ack("/expenses/2025/3/e1", "  \n").is_ok());
    }

    #[test]
    fn success_flag_true_is_success() {
        assert!(check_ack("/pockets/p1/archive", r#"{"success":true}"#).is_ok());
    }

    #[test]
    fn success_flag_false_is_error() {
        let err = check_ack("/pockets/p1/archive", r#"{"success":false,"message":"Pocket not empty"}"#)
            .unwrap_err();
        assert!(matches!(err, CoreError::Api { message, .. } if message == "Pocket not empty"));
    }

    #[test]
    fn non_json_body_is_tolerated() {
        assert!(check_ack("/expenses/2025/3/e1", "OK").is_ok());
    }
}

// ═══════════════════════════════════════════════════════════════════
// HTTP backend construction
// ═══════════════════════════════════════════════════════════════════

mod http_backend {
    use super::*;

    #[test]
    fn endpoint_url_strips_trailing_slash() {
        let backend = HttpLedgerBackend::new(&ClientConfig::new("https://api.example.com/")).unwrap();
        assert_eq!(
            backend.endpoint_url("/budget/2025/3"),
            "https://api.example.com/budget/2025/3"
        );
        assert_eq!(backend.name(), "HTTP ledger");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ClientConfig {
            request_timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert!(matches!(
            HttpLedgerBackend::new(&config),
            Err(CoreError::Config(_))
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Channel change feed
// ═══════════════════════════════════════════════════════════════════

mod channel_feed {
    use super::*;

    #[tokio::test]
    async fn without_subscription_everything_passes() {
        let (tx, mut feed) = ChannelChangeFeed::new();
        tx.send(ChangeEvent::insert("budget_2025-01")).unwrap();
        let event = feed.next_event().await.unwrap();
        assert_eq!(event.key, "budget_2025-01");
    }

    #[tokio::test]
    async fn drops_events_for_other_months() {
        let (tx, mut feed) = ChannelChangeFeed::new();
        feed.subscribe(RealtimeFilter::for_month(mk(2025, 11)));

        tx.send(ChangeEvent::insert("expense_2025-10")).unwrap();
        tx.send(ChangeEvent::update("expense_2025-11")).unwrap();

        let event = feed.next_event().await.unwrap();
        assert_eq!(event.key, "expense_2025-11");
    }

    #[tokio::test]
    async fn keyless_delete_passes_filter() {
        let (tx, mut feed) = ChannelChangeFeed::new();
        feed.subscribe(RealtimeFilter::for_month(mk(2025, 11)));
        tx.send(ChangeEvent::insert("")).unwrap();
        tx.send(ChangeEvent::delete("")).unwrap();

        let event = feed.next_event().await.unwrap();
        assert!(event.is_delete());
    }

    #[tokio::test]
    async fn closed_channel_ends_feed() {
        let (tx, mut feed) = ChannelChangeFeed::new();
        drop(tx);
        assert!(feed.next_event().await.is_none());
    }

    #[test]
    fn send_after_feed_dropped_fails() {
        let (tx, feed) = ChannelChangeFeed::new();
        drop(feed);
        assert!(matches!(
            tx.send(ChangeEvent::insert("budget_2025-01")),
            Err(CoreError::FeedClosed)
        ));
    }

    #[test]
    fn resubscribing_replaces_filter_and_id() {
        let (_tx, mut feed) = ChannelChangeFeed::new();
        let first = feed.subscription_id();
        feed.subscribe(RealtimeFilter::for_month(mk(2025, 11)));
        feed.subscribe(RealtimeFilter::for_month(mk(2025, 12)));

        assert_ne!(feed.subscription_id(), first);
        assert_eq!(feed.filter().unwrap().month(), mk(2025, 12));
    }
}
