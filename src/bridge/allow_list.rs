//! The fixed surface a sandboxed context may reach.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::channels;
use crate::error::{BridgeError, BridgeResult};

/// Allow-listed call and broadcast channel names.
///
/// Built once at process start and shared by `Arc`. There is no mutating API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowList {
    calls: BTreeSet<String>,
    broadcasts: BTreeSet<String>,
}

impl AllowList {
    pub fn new<C, B>(calls: C, broadcasts: B) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        Self {
            calls: calls.into_iter().map(Into::into).collect(),
            broadcasts: broadcasts.into_iter().map(Into::into).collect(),
        }
    }

    /// The panorama shell surface: three dialogs, the filesystem gate, and
    /// the menu and timer broadcasts.
    pub fn standard() -> Self {
        Self::new(
            channels::CALLS.iter().copied(),
            channels::BROADCASTS.iter().copied(),
        )
    }

    pub fn allows_call(&self, name: &str) -> bool {
        self.calls.contains(name)
    }

    pub fn allows_broadcast(&self, channel: &str) -> bool {
        self.broadcasts.contains(channel)
    }

    /// Fail fast with `UnknownCapability` if `name` is not callable.
    pub fn check_call(&self, name: &str) -> BridgeResult<()> {
        if self.allows_call(name) {
            Ok(())
        } else {
            Err(BridgeError::UnknownCapability(name.to_string()))
        }
    }

    /// Fail fast with `UnknownCapability` if `channel` cannot be subscribed.
    pub fn check_broadcast(&self, channel: &str) -> BridgeResult<()> {
        if self.allows_broadcast(channel) {
            Ok(())
        } else {
            Err(BridgeError::UnknownCapability(channel.to_string()))
        }
    }

    pub fn calls(&self) -> impl Iterator<Item = &str> {
        self.calls.iter().map(String::as_str)
    }

    pub fn broadcasts(&self) -> impl Iterator<Item = &str> {
        self.broadcasts.iter().map(String::as_str)
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::standard()
    }
}
