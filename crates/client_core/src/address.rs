//! Seam for the third-party postcode lookup widget.
//!
//! The widget is installed lazily and at most once. Opening it before it is
//! installed is a local error reported to the user; it never reaches the store.

use std::sync::{Arc, OnceLock};

use serde::Deserialize;
use shared::form::EmployeeDraft;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AddressKind {
    /// Road-name address.
    #[serde(rename = "R")]
    Road,
    /// Lot-number address.
    #[serde(rename = "J")]
    Lot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostcodeResult {
    #[serde(default)]
    pub zonecode: Option<String>,
    #[serde(default)]
    pub road_address: Option<String>,
    #[serde(default)]
    pub jibun_address: Option<String>,
    #[serde(default)]
    pub user_selected_type: Option<AddressKind>,
}

impl PostcodeResult {
    pub fn selected_address(&self) -> &str {
        let chosen = match self.user_selected_type {
            Some(AddressKind::Road) => &self.road_address,
            _ => &self.jibun_address,
        };
        chosen.as_deref().unwrap_or_default()
    }

    /// Fills the postcode and first address line; the second line stays user-entered.
    pub fn apply_to(&self, draft: &mut EmployeeDraft) {
        draft.zip_code = self.zonecode.clone().unwrap_or_default();
        draft.address1 = self.selected_address().to_string();
    }
}

pub type CompletionCallback = Box<dyn FnOnce(PostcodeResult) + Send>;

pub trait AddressWidget: Send + Sync {
    /// Opens the lookup; `on_complete` fires once the user picks an address.
    fn open(&self, on_complete: CompletionCallback);
}

#[derive(Default)]
pub struct WidgetSlot {
    widget: OnceLock<Arc<dyn AddressWidget>>,
}

impl WidgetSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.widget.get().is_some()
    }

    /// Runs `load` only when no widget is present. Returns whether this call installed one.
    pub fn install<F>(&self, load: F) -> bool
    where
        F: FnOnce() -> Arc<dyn AddressWidget>,
    {
        if self.is_loaded() {
            debug!("address widget already present; skipping load");
            return false;
        }
        let mut installed = false;
        self.widget.get_or_init(|| {
            installed = true;
            load()
        });
        if installed {
            info!("address widget loaded");
        }
        installed
    }

    pub fn request_address(&self, on_complete: CompletionCallback) -> Result<(), ClientError> {
        let widget = self.widget.get().ok_or(ClientError::WidgetUnavailable)?;
        widget.open(on_complete);
        Ok(())
    }

    /// Async form of [`WidgetSlot::request_address`]. Resolves to `None` if the
    /// widget is closed without a selection.
    pub async fn lookup(&self) -> Result<Option<PostcodeResult>, ClientError> {
        let (tx, rx) = oneshot::channel();
        self.request_address(Box::new(move |result| {
            let _ = tx.send(result);
        }))?;
        Ok(rx.await.ok())
    }
}
