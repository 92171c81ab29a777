use super::config::*;
use super::error::*;
use super::message::*;
use super::metrics::*;
use super::notice::*;
use super::suggestion::*;

#[test]
fn test_message_creation() {
    let msg = Message::new_user("Hello world");
    assert_eq!(msg.role(), MessageRole::User);
    assert_eq!(msg.content(), "Hello world");
    assert!(msg.is_user());

    let reply = Message::new_assistant("Hi");
    assert_eq!(reply.role(), MessageRole::Assistant);
    assert!(!reply.is_user());
    assert!(reply.created_at() >= msg.created_at());
}

#[test]
fn test_message_role_serialization() {
    let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
    assert_eq!(json, "\"assistant\"");
    let role: MessageRole = serde_json::from_str("\"user\"").unwrap();
    assert_eq!(role, MessageRole::User);
}

#[test]
fn test_notice_levels() {
    assert!(Notice::error("boom").is_error());
    assert!(!Notice::success("done").is_error());
    assert_eq!(Notice::info("x").level.to_string(), "info");
}

#[test]
fn test_suggestions() {
    assert_eq!(SUGGESTED_QUESTIONS.len(), 8);
    assert_eq!(by_number(1), Some(&SUGGESTED_QUESTIONS[0]));
    assert_eq!(by_number(8), Some(&SUGGESTED_QUESTIONS[7]));
    assert!(by_number(0).is_none());
    assert!(by_number(9).is_none());
    assert!(SUGGESTED_QUESTIONS.iter().all(|s| !s.text.is_empty()));
}

fn sample_metrics() -> MetricsSnapshot {
    serde_json::from_str(
        r#"{
            "melhor_mes": {"nome": "March", "valor": "R$ 12.000,00"},
            "produto_mais_vendido": {"nome": "Widget", "quantidade": 42},
            "quantidade_produtos": 7,
            "vendas_totais_ano": "R$ 98.765,43",
            "files_processed": 3,
            "records_analyzed": 1200,
            "last_updated": "14/10/2026 09:30"
        }"#,
    )
    .unwrap()
}

#[test]
fn test_metrics_wire_names() {
    let m = sample_metrics();
    assert_eq!(m.best_month.name, "March");
    assert_eq!(m.top_product.quantity, 42);
    assert_eq!(m.distinct_product_count, 7);
    assert_eq!(m.updated_time(), "09:30");

    let json = serde_json::to_value(&m).unwrap();
    assert_eq!(json["produto_mais_vendido"]["nome"], "Widget");
}

#[test]
fn test_metric_cards_from_snapshot() {
    let m = sample_metrics();
    let cards = metric_cards(Some(&m), true);
    assert_eq!(cards[0].title, "Top Product");
    assert_eq!(cards[0].value, "Widget");
    assert_eq!(cards[0].caption, "42 units");
    assert_eq!(cards[1].value, "7");
    assert_eq!(cards[2].value, "R$ 98.765,43");
    assert_eq!(cards[2].caption, "3 spreadsheets");
    assert_eq!(cards[3].value, "March");
    assert_eq!(cards[3].caption, "R$ 12.000,00");
}

#[test]
fn test_metric_cards_without_snapshot() {
    let loading = metric_cards(None, true);
    assert!(loading.iter().all(|c| c.value == LOADING_PLACEHOLDER));

    let idle = metric_cards(None, false);
    let values: Vec<_> = idle.iter().map(|c| c.value.as_str()).collect();
    assert_eq!(values, ["N/A", "0", "R$ 0,00", "N/A"]);
}

#[test]
fn test_backend_error_messages() {
    let app = BackendError::Application {
        message: "Database not configured".into(),
        details: None,
    };
    assert_eq!(app.to_string(), "Database not configured");
    assert_eq!(app.backend_message(), Some("Database not configured"));

    let net = BackendError::Transport("refused".into());
    assert!(net.is_transport());
    assert!(net.backend_message().is_none());
}

#[test]
fn test_config_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.base_url, "http://127.0.0.1:5000");
    assert_eq!(config.request_timeout_secs, 60);
    assert_eq!(config.greeting, DEFAULT_GREETING);
    assert!(!config.debug);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validate() {
    let mut config = AppConfig::default();
    config.base_url = "ftp://example.com".into();
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    config.base_url = "https://insights.example.com".into();
    config.request_timeout_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_local_file() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join("alpha-insights.json"),
        r#"{"greeting": "Ola!", "request_timeout_secs": 15}"#,
    )
    .unwrap();

    let config = load_config(Some(tmp.path().to_path_buf())).unwrap();
    assert_eq!(config.greeting, "Ola!");
    assert_eq!(config.request_timeout_secs, 15);
    assert_eq!(config.working_dir, tmp.path());
    assert_eq!(config.data_path(), tmp.path().join(".alpha-insights"));
}

#[test]
fn test_config_invalid_file() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("alpha-insights.json"), "{not json").unwrap();
    assert!(matches!(
        load_config(Some(tmp.path().to_path_buf())),
        Err(ConfigError::Invalid(_))
    ));
}
