use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::AdminConfig;
use crate::error::AdminError;
use crate::lock;
use crate::notify::{NotificationCenter, Severity, StatusRegion};
use crate::service::{MediaType, SchemaServiceClient, schema_name_from_file};
use crate::surface::{AdminSurface, Control};

/// Operation families tracked by the in-flight guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Upload,
    Activate,
    Delete,
    Clear,
    LoadSamples,
}

#[derive(Debug, Clone)]
pub struct PendingOperation {
    pub kind: OperationKind,
    pub started_at: Instant,
    pub target_id: Option<String>,
}

/// Admin intents, one per control on the page.
#[derive(Debug, Clone)]
pub enum AdminAction {
    Upload { file_name: String, content: String },
    Activate { id: String },
    Delete { id: String },
    Explore { id: String },
    ClearAll,
    LoadSamples,
    ViewSpec,
    DownloadSpec,
    ExportSchema { id: String, name: String },
}

/// Per-row actions dispatched from a data attribute on the schema table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Activate,
    Delete,
    Explore,
    Export,
}

impl ActionKind {
    pub fn from_attr(attr: &str) -> Option<Self> {
        match attr {
            "activate" => Some(ActionKind::Activate),
            "delete" => Some(ActionKind::Delete),
            "explore" => Some(ActionKind::Explore),
            "export" => Some(ActionKind::Export),
            _ => None,
        }
    }
}

/// Drives the schema lifecycle: wires admin intents to service calls and
/// reports every outcome through notices, inline status, or the surface.
///
/// `handle` never returns an error; failures become user-visible messages.
pub struct LifecycleController {
    client: SchemaServiceClient,
    notices: NotificationCenter,
    surface: Arc<dyn AdminSurface>,
    pending_upload: Mutex<Option<PendingOperation>>,
    reload_delay: Duration,
    upload_reload_delay: Duration,
}

impl LifecycleController {
    pub fn new(
        client: SchemaServiceClient,
        notices: NotificationCenter,
        surface: Arc<dyn AdminSurface>,
        config: &AdminConfig,
    ) -> Self {
        Self {
            client,
            notices,
            surface,
            pending_upload: Mutex::new(None),
            reload_delay: Duration::from_millis(config.reload_delay_ms),
            upload_reload_delay: Duration::from_millis(config.upload_reload_delay_ms),
        }
    }

    pub async fn handle(&self, action: AdminAction) {
        match action {
            AdminAction::Upload { file_name, content } => self.upload(&file_name, &content).await,
            AdminAction::Activate { id } => self.activate(&id).await,
            AdminAction::Delete { id } => self.delete(&id).await,
            AdminAction::Explore { id } => self.explore(&id),
            AdminAction::ClearAll => self.clear_all().await,
            AdminAction::LoadSamples => self.load_samples().await,
            AdminAction::ViewSpec => self.view_spec().await,
            AdminAction::DownloadSpec => self.download_spec().await,
            AdminAction::ExportSchema { id, name } => self.export_schema(&id, &name).await,
        }
    }

    async fn upload(&self, file_name: &str, content: &str) {
        if file_name.is_empty() {
            self.notices.set_inline_status(
                StatusRegion::UploadForm,
                "Please select a file to upload",
                Severity::Danger,
            );
            return;
        }
        {
            let mut pending = lock(&self.pending_upload);
            if pending.is_some() {
                return;
            }
            *pending = Some(PendingOperation {
                kind: OperationKind::Upload,
                started_at: Instant::now(),
                target_id: None,
            });
        }
        self.surface.set_control_busy(Control::UploadSubmit, true);

        let name = schema_name_from_file(file_name);
        let media_type = MediaType::from_file_name(file_name);
        match self.client.upload(name, content, media_type).await {
            Ok(schema) => {
                t_counter!("mockboard_ops_total", "op" => "upload", "outcome" => "ok")
                    .increment(1);
                self.notices.set_inline_status(
                    StatusRegion::UploadForm,
                    format!(
                        "Specification \"{name}\" uploaded successfully! Schema ID: {}",
                        schema.id
                    ),
                    Severity::Success,
                );
                self.surface.reset_upload_form();
                self.schedule_reload(self.upload_reload_delay);
            }
            Err(err) => {
                t_counter!("mockboard_ops_total", "op" => "upload", "outcome" => "err")
                    .increment(1);
                tracing::warn!(error = %err, "schema upload failed");
                self.notices.set_inline_status(
                    StatusRegion::UploadForm,
                    err.to_string(),
                    Severity::Danger,
                );
            }
        }

        *lock(&self.pending_upload) = None;
        self.surface.set_control_busy(Control::UploadSubmit, false);
    }

    async fn activate(&self, id: &str) {
        match self.client.activate(id).await {
            Ok(()) => {
                t_counter!("mockboard_ops_total", "op" => "activate", "outcome" => "ok")
                    .increment(1);
                self.notices
                    .notify("Schema activated successfully", Severity::Success);
                self.schedule_reload(self.reload_delay);
            }
            Err(err) => {
                t_counter!("mockboard_ops_total", "op" => "activate", "outcome" => "err")
                    .increment(1);
                tracing::warn!(error = %err, schema_id = %id, "schema activation failed");
                self.notices
                    .notify("Failed to activate schema", Severity::Danger);
            }
        }
    }

    async fn delete(&self, id: &str) {
        if !self
            .surface
            .confirm("Are you sure you want to delete this schema?")
        {
            return;
        }
        match self.client.delete(id).await {
            Ok(()) => {
                t_counter!("mockboard_ops_total", "op" => "delete", "outcome" => "ok")
                    .increment(1);
                self.notices
                    .notify("Schema deleted successfully", Severity::Success);
                self.schedule_reload(self.reload_delay);
            }
            Err(err) => {
                t_counter!("mockboard_ops_total", "op" => "delete", "outcome" => "err")
                    .increment(1);
                tracing::warn!(error = %err, schema_id = %id, "schema deletion failed");
                self.notices
                    .notify("Failed to delete schema", Severity::Danger);
            }
        }
    }

    /// Open the interactive explorer for a schema. No network round trip;
    /// the explorer is served by the schema service itself.
    fn explore(&self, id: &str) {
        let url = format!("{}/explorer?schema={id}", self.client.base_url());
        self.surface.open_external(&url);
    }

    async fn clear_all(&self) {
        if !self
            .surface
            .confirm("Are you sure you want to delete ALL schemas?")
        {
            return;
        }
        match self.client.delete_all().await {
            Ok(outcome) => {
                t_counter!("mockboard_ops_total", "op" => "clear", "outcome" => "ok")
                    .increment(1);
                if outcome.failed > 0 {
                    tracing::warn!(
                        deleted = outcome.deleted,
                        failed = outcome.failed,
                        "clear-all left schemas behind"
                    );
                }
                self.notices
                    .notify("All schemas cleared successfully", Severity::Success);
                self.schedule_reload(self.reload_delay);
            }
            Err(err) => {
                t_counter!("mockboard_ops_total", "op" => "clear", "outcome" => "err")
                    .increment(1);
                tracing::warn!(error = %err, "clear-all failed");
                self.notices
                    .notify("Failed to clear schemas", Severity::Danger);
            }
        }
    }

    async fn load_samples(&self) {
        match self.client.load_samples().await {
            Ok(loaded) => {
                t_counter!("mockboard_ops_total", "op" => "load_samples", "outcome" => "ok")
                    .increment(1);
                self.notices
                    .notify(format!("Loaded {loaded} sample schemas"), Severity::Success);
                self.schedule_reload(self.reload_delay);
            }
            Err(err) => {
                t_counter!("mockboard_ops_total", "op" => "load_samples", "outcome" => "err")
                    .increment(1);
                tracing::warn!(error = %err, "sample load failed");
                self.notices
                    .notify("Failed to load sample schemas", Severity::Danger);
            }
        }
    }

    async fn view_spec(&self) {
        match self.client.fetch_active_spec().await {
            Ok(doc) => {
                let body = serde_json::to_string_pretty(&doc).unwrap_or_else(|_| doc.to_string());
                self.surface.show_document("Active API specification", &body);
            }
            Err(err) => self.report_spec_error(err),
        }
    }

    async fn download_spec(&self) {
        match self.client.fetch_active_spec().await {
            Ok(doc) => {
                let body = serde_json::to_string_pretty(&doc).unwrap_or_else(|_| doc.to_string());
                self.surface.save_file("openapi.json", body.as_bytes());
            }
            Err(err) => self.report_spec_error(err),
        }
    }

    fn report_spec_error(&self, err: AdminError) {
        let message = match err {
            AdminError::NoActiveSpec => "No specification is currently loaded".to_string(),
            other => {
                tracing::warn!(error = %other, "active spec fetch failed");
                other.to_string()
            }
        };
        self.notices
            .set_inline_status(StatusRegion::SpecPanel, message, Severity::Danger);
    }

    async fn export_schema(&self, id: &str, name: &str) {
        match self.client.export_schema(id).await {
            Ok(text) => {
                let file_name = format!("{}.yaml", sanitize_file_name(name));
                self.surface.save_file(&file_name, text.as_bytes());
            }
            Err(err) => {
                tracing::warn!(error = %err, schema_id = %id, "schema export failed");
                self.notices
                    .notify("Failed to export schema", Severity::Danger);
            }
        }
    }

    fn schedule_reload(&self, delay: Duration) {
        let surface = Arc::clone(&self.surface);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            surface.reload();
        });
    }
}

/// Restrict a download file name to a safe character set.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
