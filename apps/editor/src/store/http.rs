//! `reqwest`-backed implementations of the collaborator traits.
//!
//! Thin wrappers only: auth header, URL construction, status checking, and
//! id extraction from the create response. Retries and timeouts are the
//! remote service's concern.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::config::SessionContext;
use crate::editing::tracker::FieldMap;
use crate::models::ids::ServerId;
use crate::store::{AssetStore, RecordKind, RecordStore};

pub struct HttpRecordStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRecordStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn collection_url(&self, ctx: &SessionContext, kind: RecordKind) -> String {
        format!(
            "{}/api/v1/users/{}/resume/{}",
            self.base_url.trim_end_matches('/'),
            ctx.user_id,
            kind.path()
        )
    }

    fn record_url(&self, ctx: &SessionContext, kind: RecordKind, id: &ServerId) -> String {
        format!("{}/{}", self.collection_url(ctx, kind), id)
    }

    /// The create response is an array whose first element carries the new
    /// record; some endpoints return the bare object instead.
    fn extract_server_id(body: &Value) -> Result<ServerId> {
        let record = match body {
            Value::Array(items) => items.first().ok_or_else(|| anyhow!("empty create response"))?,
            other => other,
        };
        ["_id", "id"]
            .iter()
            .find_map(|key| record.get(*key).and_then(ServerId::from_value))
            .ok_or_else(|| anyhow!("create response has no id field"))
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn fetch(&self, ctx: &SessionContext, kind: RecordKind) -> Result<Vec<Value>> {
        let url = self.collection_url(ctx, kind);
        debug!(%url, "fetching records");
        let response = self
            .client
            .get(&url)
            .bearer_auth(&ctx.token)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(vec![]);
        }
        let body: Value = response
            .error_for_status()
            .with_context(|| format!("GET {url}"))?
            .json()
            .await
            .context("decoding fetch response")?;
        Ok(match body {
            Value::Array(items) => items,
            Value::Null => vec![],
            single => vec![single],
        })
    }

    async fn create(
        &self,
        ctx: &SessionContext,
        kind: RecordKind,
        payload: &FieldMap,
    ) -> Result<ServerId> {
        let url = self.collection_url(ctx, kind);
        let body: Value = self
            .client
            .post(&url)
            .bearer_auth(&ctx.token)
            .json(payload)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?
            .error_for_status()
            .with_context(|| format!("POST {url}"))?
            .json()
            .await
            .context("decoding create response")?;
        Self::extract_server_id(&body)
    }

    async fn update(
        &self,
        ctx: &SessionContext,
        kind: RecordKind,
        id: &ServerId,
        patch: &FieldMap,
    ) -> Result<()> {
        let url = self.record_url(ctx, kind, id);
        self.client
            .patch(&url)
            .bearer_auth(&ctx.token)
            .json(patch)
            .send()
            .await
            .with_context(|| format!("PATCH {url}"))?
            .error_for_status()
            .with_context(|| format!("PATCH {url}"))?;
        Ok(())
    }

    async fn delete(&self, ctx: &SessionContext, kind: RecordKind, id: &ServerId) -> Result<()> {
        let url = self.record_url(ctx, kind, id);
        let response = self
            .client
            .delete(&url)
            .bearer_auth(&ctx.token)
            .send()
            .await
            .with_context(|| format!("DELETE {url}"))?;
        // already gone counts as done
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        response
            .error_for_status()
            .with_context(|| format!("DELETE {url}"))?;
        Ok(())
    }
}

pub struct HttpAssetStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAssetStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AssetStore for HttpAssetStore {
    async fn upload(
        &self,
        ctx: &SessionContext,
        file_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<String> {
        let url = format!(
            "{}/api/v1/users/{}/assets",
            self.base_url.trim_end_matches('/'),
            ctx.user_id
        );
        let part = Part::bytes(data.to_vec())
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .context("invalid content type")?;
        let form = Form::new().part("file", part);

        let body: Value = self
            .client
            .post(&url)
            .bearer_auth(&ctx.token)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?
            .error_for_status()
            .with_context(|| format!("POST {url}"))?
            .json()
            .await
            .context("decoding upload response")?;

        ["url", "secure_url"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .ok_or_else(|| anyhow!("upload response has no url field"))
    }
}
