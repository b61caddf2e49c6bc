use metrics_exporter_prometheus::PrometheusHandle;
use sea_merkado::config::AppConfig;
use sea_merkado::session::SessionContext;
use sea_merkado::workflows::sellers::{CompliancePolicy, RequirementKind, SellerStatus};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn policy_from(config: &AppConfig) -> CompliancePolicy {
    CompliancePolicy::new(config.approval.deadline_days)
}

pub(crate) fn admin_session(
    config: &AppConfig,
    admin_id: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> SessionContext {
    SessionContext::issue_for_minutes(admin_id, admin_id, now, config.approval.session_ttl_minutes)
}

pub(crate) fn parse_requirement(raw: &str) -> Result<RequirementKind, String> {
    raw.parse::<RequirementKind>().map_err(|err| err.to_string())
}

pub(crate) fn parse_display_status(raw: &str) -> Result<SellerStatus, String> {
    raw.parse::<SellerStatus>().map_err(|err| err.to_string())
}

/// Content type for an uploaded document, guessed from its extension.
pub(crate) fn guess_content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(
            guess_content_type(Path::new("permits/business-permit.pdf")),
            "application/pdf"
        );
        assert_eq!(guess_content_type(Path::new("id/front.PNG")), "image/png");
        assert_eq!(
            guess_content_type(Path::new("notes/unknown")),
            "application/octet-stream"
        );
    }

    #[test]
    fn requirement_arguments_accept_keys() {
        assert_eq!(
            parse_requirement("businessPermit"),
            Ok(RequirementKind::BusinessPermit)
        );
        assert!(parse_requirement("passport").is_err());
        assert_eq!(parse_display_status("rejected"), Ok(SellerStatus::Rejected));
    }
}
