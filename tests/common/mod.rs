use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use tally_relay::config::Config;
use tally_relay::logsink::NoopLogSink;
use tally_relay::mailer::Mailer;

pub const TEST_SECRET: &str = "test-secret";

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Captures outgoing mail instead of delivering it.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(
        &self,
        to: &[String],
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<(), String> {
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_vec(),
            subject: subject.to_string(),
            html: html.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}

/// Always reports a transport failure.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _: &[String], _: &str, _: &str, _: &str) -> Result<(), String> {
        Err("smtp unavailable".to_string())
    }
}

pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_webhook(&self, body: &str, signature: Option<&str>) -> (Value, StatusCode) {
        let mut req = self
            .client
            .post(self.url("/v1/tally/webhook"))
            .body(body.to_string());
        if let Some(sig) = signature {
            req = req.header("tally-signature", sig);
        }
        let resp = req.send().await.expect("webhook request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        (body, status)
    }

    /// Post a body with a valid signature computed from [`TEST_SECRET`].
    pub async fn post_signed(&self, body: &str) -> (Value, StatusCode) {
        let sig = tally_relay::signature::sign(body.as_bytes(), TEST_SECRET);
        self.post_webhook(body, Some(&sig)).await
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.mailer.lock_sent()
    }
}

impl RecordingMailer {
    fn lock_sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to a random port
        log_level: "warn".to_string(),
        max_body_size: 1_048_576,
        signing_secret: TEST_SECRET.to_string(),
        require_signature: true,
        recipients: vec!["ops@example.com".to_string()],
        skip_option_checkboxes: true,
        debug_logging: false,
        log_dir: "logs".into(),
        date_format: "%B %-d, %Y %-I:%M %p".to_string(),
        utc_offset_minutes: 0,
        smtp: None,
    }
}

/// Spawn the app on an ephemeral port with a recording mailer.
pub async fn spawn_app(config: Config) -> TestApp {
    let mailer = Arc::new(RecordingMailer::default());
    let addr = spawn_with(config, mailer.clone()).await;
    TestApp {
        addr,
        client: Client::new(),
        mailer,
    }
}

/// Spawn the app with an arbitrary mailer; returns the bound address.
pub async fn spawn_with(config: Config, mailer: Arc<dyn Mailer>) -> SocketAddr {
    let app = tally_relay::build_app(config, mailer, Arc::new(NoopLogSink));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    addr
}
