use std::sync::Arc;

use crate::config::Config;
use crate::logsink::LogSink;
use crate::mailer::Mailer;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub mailer: Arc<dyn Mailer>,
    pub log_sink: Arc<dyn LogSink>,
}
