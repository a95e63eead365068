//! Side-effecting backend requests whose results feed back into the store.

use crate::api::{Analytics, AnalysisReport, DashboardBackend};
use crate::cancel::CallContext;

use super::{ActionKind, SyncError};

/// Ask the backend to analyze one document.
pub fn analyze<B>(
    backend: &B,
    document_id: &str,
    ctx: &CallContext,
) -> Result<AnalysisReport, SyncError>
where
    B: DashboardBackend + ?Sized,
{
    let report = backend
        .analyze_document(document_id, ctx)
        .map_err(|err| SyncError::action(ActionKind::Analyze, err))?;
    tracing::info!("Analysis finished for document {document_id}");
    Ok(report)
}

/// Ask the backend to recompute analytics and return the new payload.
pub fn refresh_analytics<B>(backend: &B, ctx: &CallContext) -> Result<Option<Analytics>, SyncError>
where
    B: DashboardBackend + ?Sized,
{
    backend
        .refresh_analytics(ctx)
        .map_err(|err| SyncError::action(ActionKind::RefreshAnalytics, err))
}
