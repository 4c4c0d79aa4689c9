use crate::core::{
    ApiResponse, DeliveryOutcome, Lead, LeadRepository, LeadSubmission, Notifier, SpreadsheetMirror,
};
use crate::utils::clock::LocalClock;
use crate::utils::error::Result;
use std::sync::Arc;

pub const SAVED_MESSAGE: &str = "Lead saved successfully";

/// Orchestrates validation, persistence and the two best-effort side steps.
///
/// Only validation and duplicate-phone errors are reported as rejections;
/// the Sheets mirror and WhatsApp notification are logged and never change
/// the outcome once the insert has committed.
pub struct LeadService {
    store: Arc<dyn LeadRepository>,
    mirror: Arc<dyn SpreadsheetMirror>,
    notifier: Arc<dyn Notifier>,
    clock: LocalClock,
}

impl LeadService {
    pub fn new(
        store: Arc<dyn LeadRepository>,
        mirror: Arc<dyn SpreadsheetMirror>,
        notifier: Arc<dyn Notifier>,
        clock: LocalClock,
    ) -> Self {
        Self {
            store,
            mirror,
            notifier,
            clock,
        }
    }

    /// Creates the leads table if needed. Safe on every start.
    pub fn initialize(&self) -> Result<()> {
        self.store.initialize()
    }

    /// Runs a store call on the blocking pool.
    async fn with_store<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn LeadRepository) -> Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(store.as_ref())).await?
    }

    pub async fn submit_lead(&self, submission: LeadSubmission) -> ApiResponse {
        match self.try_submit(submission).await {
            Ok(lead) => {
                tracing::info!("✅ Lead {} saved (source: {})", lead.id, lead.source);
                ApiResponse::ok_with(SAVED_MESSAGE)
            }
            Err(e) if e.is_rejection() => {
                tracing::info!("Lead rejected: {}", e);
                ApiResponse::from(&e)
            }
            Err(e) => {
                tracing::error!(
                    "❌ Submit lead error: {} (Category: {:?}, Severity: {:?})",
                    e,
                    e.category(),
                    e.severity()
                );
                tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
                ApiResponse::from(&e)
            }
        }
    }

    async fn try_submit(&self, submission: LeadSubmission) -> Result<Lead> {
        let clock = &self.clock;
        let new_lead = submission.validate(|| clock.now())?;

        let to_insert = new_lead.clone();
        let lead = self.with_store(move |store| store.insert(&to_insert)).await?;

        // 寫入成功後才鏡像到 Google Sheets，失敗只記錄
        let mirrored = self.mirror.append(&new_lead).await;
        log_outcome("Google Sheets", &mirrored);

        let notified = self.notifier.notify(&new_lead.name, &new_lead.phone).await;
        log_outcome("WhatsApp", &notified);

        Ok(lead)
    }

    pub async fn list_leads(&self) -> Result<Vec<Lead>> {
        self.with_store(|store| store.list_all()).await
    }

    pub async fn lead_count(&self) -> Result<u64> {
        self.with_store(|store| store.count()).await
    }

    /// Deleting an id that does not exist still succeeds.
    pub async fn delete_lead(&self, id: i64) -> ApiResponse {
        match self.with_store(move |store| store.delete(id)).await {
            Ok(removed) => {
                if removed {
                    tracing::info!("🗑️ Lead {} deleted", id);
                } else {
                    tracing::debug!("Delete for unknown lead {} ignored", id);
                }
                ApiResponse::ok()
            }
            Err(e) => {
                tracing::error!("❌ Delete lead {} error: {}", id, e);
                ApiResponse::from(&e)
            }
        }
    }
}

fn log_outcome(step: &str, outcome: &DeliveryOutcome) {
    match outcome {
        DeliveryOutcome::Delivered => tracing::info!("✅ {} delivered", step),
        DeliveryOutcome::Skipped { reason } => tracing::warn!("⚠️ {} skipped: {}", step, reason),
        DeliveryOutcome::Failed { error } => tracing::error!("❌ {} error: {}", step, error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::SqliteLeadStore;
    use crate::core::NewLead;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingMirror {
        rows: Mutex<Vec<NewLead>>,
        fail: bool,
    }

    #[async_trait]
    impl SpreadsheetMirror for RecordingMirror {
        async fn append(&self, lead: &NewLead) -> DeliveryOutcome {
            self.rows.lock().unwrap().push(lead.clone());
            if self.fail {
                DeliveryOutcome::Failed {
                    error: "sheets unavailable".to_string(),
                }
            } else {
                DeliveryOutcome::Delivered
            }
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, name: &str, phone: &str) -> DeliveryOutcome {
            self.sent
                .lock()
                .unwrap()
                .push((name.to_string(), phone.to_string()));
            if self.fail {
                DeliveryOutcome::Failed {
                    error: "whatsapp unavailable".to_string(),
                }
            } else {
                DeliveryOutcome::Delivered
            }
        }
    }

    struct Harness {
        _dir: TempDir,
        service: LeadService,
        mirror: Arc<RecordingMirror>,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness(fail_side_steps: bool) -> Harness {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteLeadStore::new(dir.path().join("leads.db")));
        let mirror = Arc::new(RecordingMirror {
            fail: fail_side_steps,
            ..Default::default()
        });
        let notifier = Arc::new(RecordingNotifier {
            fail: fail_side_steps,
            ..Default::default()
        });
        let service = LeadService::new(
            store,
            mirror.clone(),
            notifier.clone(),
            LocalClock::default(),
        );
        service.initialize().unwrap();
        Harness {
            _dir: dir,
            service,
            mirror,
            notifier,
        }
    }

    #[tokio::test]
    async fn test_valid_submission_persists_and_fans_out() {
        let h = harness(false);

        let response = h
            .service
            .submit_lead(LeadSubmission::new(" Asha ", "9876543210", "Instagram"))
            .await;

        assert_eq!(response, ApiResponse::ok_with(SAVED_MESSAGE));

        let leads = h.service.list_leads().await.unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].name, "Asha");
        assert_eq!(leads[0].phone, "9876543210");
        assert_eq!(leads[0].source, "Instagram");
        assert!(!leads[0].created_at.is_empty());

        let rows = h.mirror.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].created_at, leads[0].created_at);
        assert_eq!(
            h.notifier.sent.lock().unwrap().as_slice(),
            &[("Asha".to_string(), "9876543210".to_string())]
        );
    }

    #[tokio::test]
    async fn test_duplicate_phone_skips_side_steps() {
        let h = harness(false);
        let first = h
            .service
            .submit_lead(LeadSubmission::new("Asha", "9876543210", "Instagram"))
            .await;
        let second = h
            .service
            .submit_lead(LeadSubmission::new("Ravi", "9876543210", "Walk-in"))
            .await;

        assert!(first.success);
        assert_eq!(second, ApiResponse::failed("Phone already exists"));
        assert_eq!(h.service.lead_count().await.unwrap(), 1);
        assert_eq!(h.mirror.rows.lock().unwrap().len(), 1);
        assert_eq!(h.notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejections_persist_nothing() {
        let h = harness(false);

        let cases = [
            (LeadSubmission::new("Asha", "12345", "Instagram"), "Phone must be 10 digits"),
            (LeadSubmission::new("Asha", "12345abcde", "Instagram"), "Phone must be 10 digits"),
            (LeadSubmission::new("", "9876543210", "Instagram"), "All fields are required"),
            (LeadSubmission::new("Asha", "9876543210", "  "), "All fields are required"),
        ];

        for (submission, message) in cases {
            let response = h.service.submit_lead(submission).await;
            assert_eq!(response, ApiResponse::failed(message));
        }

        assert_eq!(h.service.lead_count().await.unwrap(), 0);
        assert!(h.mirror.rows.lock().unwrap().is_empty());
        assert!(h.notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_side_step_failures_do_not_affect_success() {
        let h = harness(true);

        let response = h
            .service
            .submit_lead(LeadSubmission::new("Asha", "9876543210", "Instagram"))
            .await;

        assert!(response.success);
        assert_eq!(h.service.lead_count().await.unwrap(), 1);
        // 鏡像失敗仍然會嘗試通知
        assert_eq!(h.notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let h = harness(false);
        h.service
            .submit_lead(LeadSubmission::new("Asha", "9876543210", "Instagram"))
            .await;

        assert_eq!(h.service.delete_lead(999).await, ApiResponse::ok());
        assert_eq!(h.service.lead_count().await.unwrap(), 1);

        assert_eq!(h.service.delete_lead(1).await, ApiResponse::ok());
        assert_eq!(h.service.delete_lead(1).await, ApiResponse::ok());
        assert_eq!(h.service.lead_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_most_recent_first() {
        let h = harness(false);
        for phone in ["9000000001", "9000000002", "9000000003"] {
            h.service
                .submit_lead(LeadSubmission::new("Lead", phone, "Referral"))
                .await;
        }

        let ids: Vec<i64> = h
            .service
            .list_leads()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_storage_failure_reports_underlying_error() {
        let dir = TempDir::new().unwrap();
        // 未初始化且父目錄不存在，開啟會失敗
        let store = Arc::new(SqliteLeadStore::new(dir.path().join("missing/leads.db")));
        let service = LeadService::new(
            store,
            Arc::new(RecordingMirror::default()),
            Arc::new(RecordingNotifier::default()),
            LocalClock::default(),
        );

        let response = service
            .submit_lead(LeadSubmission::new("Asha", "9876543210", "Instagram"))
            .await;

        assert!(!response.success);
        assert!(response.message.unwrap().starts_with("Database error"));
    }
}
