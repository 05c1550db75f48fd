use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct SessionMetrics {
    submissions_total: AtomicU64,
    rejected_total: AtomicU64,
    about_answers_total: AtomicU64,
    rewrites_ok_total: AtomicU64,
    rewrites_failed_total: AtomicU64,
    rewrite_timeouts_total: AtomicU64,
    rewrite_latency_millis: AtomicU64,
    copies_total: AtomicU64,
    sign_in_attempts_total: AtomicU64,
    sign_in_failures_total: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub submissions_total: u64,
    pub rejected_total: u64,
    pub about_answers_total: u64,
    pub rewrites_ok_total: u64,
    pub rewrites_failed_total: u64,
    pub rewrite_timeouts_total: u64,
    pub avg_rewrite_latency_millis: f64,
    pub copies_total: u64,
    pub sign_in_attempts_total: u64,
    pub sign_in_failures_total: u64,
}

impl SessionMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_submission(&self) {
        self.submissions_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rejected(&self) {
        self.rejected_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_about_answer(&self) {
        self.about_answers_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_rewrite(&self, duration: Duration, ok: bool) {
        if ok {
            self.rewrites_ok_total.fetch_add(1, Ordering::Relaxed);
        } else {
            self.rewrites_failed_total.fetch_add(1, Ordering::Relaxed);
        }
        self.rewrite_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn inc_rewrite_timeout(&self) {
        self.rewrite_timeouts_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_copy(&self) {
        self.copies_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_sign_in_attempt(&self) {
        self.sign_in_attempts_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_sign_in_failure(&self) {
        self.sign_in_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let ok = self.rewrites_ok_total.load(Ordering::Relaxed);
        let failed = self.rewrites_failed_total.load(Ordering::Relaxed);
        let latency = self.rewrite_latency_millis.load(Ordering::Relaxed);
        let rewrites = ok + failed;

        MetricsSnapshot {
            submissions_total: self.submissions_total.load(Ordering::Relaxed),
            rejected_total: self.rejected_total.load(Ordering::Relaxed),
            about_answers_total: self.about_answers_total.load(Ordering::Relaxed),
            rewrites_ok_total: ok,
            rewrites_failed_total: failed,
            rewrite_timeouts_total: self.rewrite_timeouts_total.load(Ordering::Relaxed),
            avg_rewrite_latency_millis: if rewrites == 0 {
                0.0
            } else {
                latency as f64 / rewrites as f64
            },
            copies_total: self.copies_total.load(Ordering::Relaxed),
            sign_in_attempts_total: self.sign_in_attempts_total.load(Ordering::Relaxed),
            sign_in_failures_total: self.sign_in_failures_total.load(Ordering::Relaxed),
        }
    }
}

/// Installs the JSON subscriber once per process. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(service_name: &str, default_level: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{service_name}={default_level},askprompt_session={default_level},askprompt_auth={default_level}"
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr)
            .init();
    });
}
