//! Smoke shell for the editor engine: loads a resume against a live API and
//! prints a short summary. Real frontends embed the library instead.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use editor::config::Config;
use editor::preview::pagination::LayoutSurface;
use editor::session::EditorSession;
use editor::store::http::{HttpAssetStore, HttpRecordStore};
use editor::store::{AssetStore, RecordStore};

/// Fixed-height stand-in for a real layout pass; long enough for a rough
/// page estimate per filled section.
struct EstimatedLayout {
    height: f32,
}

impl LayoutSurface for EstimatedLayout {
    fn content_height(&self) -> Option<f32> {
        Some(self.height)
    }

    fn viewport_offset(&self) -> f32 {
        0.0
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume editor v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn RecordStore> = Arc::new(HttpRecordStore::new(config.api_base_url.clone()));
    let assets: Arc<dyn AssetStore> = Arc::new(HttpAssetStore::new(config.api_base_url.clone()));

    let mut session = EditorSession::new(config.session_context(), store, assets);
    session.load().await?;

    let doc = &session.document;
    info!(
        name = %format!("{} {}", doc.personal.first_name, doc.personal.last_name),
        template = session.template().name,
        "document ready"
    );

    // Rough estimate: ~380px per populated row-backed section entry.
    let rows = doc.education.higher.len()
        + doc.experience.len()
        + doc.projects.len()
        + doc.certifications.len();
    let layout = EstimatedLayout {
        height: 600.0 + 380.0 * rows as f32,
    };
    session.measure_preview(&layout);
    info!(
        pages = session.pagination.page_count(),
        rows, "estimated preview length"
    );

    Ok(())
}
