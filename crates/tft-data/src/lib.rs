pub mod demo;
pub mod source;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use source::{FeedSource, FetchError, MetaFeed};

/// A champion slot inside a composition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Champion {
    pub name: String,
    pub cost: u32,
    pub traits: Vec<String>,
    pub is_carry: bool,
    pub items: Vec<String>,
}

/// Recommended item build for one carry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimalItem {
    pub champion_name: String,
    pub items: Vec<String>,
    /// 1 is the highest priority
    pub priority: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AugmentTier {
    Silver,
    Gold,
    Prismatic,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Augment {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tier: AugmentTier,
    pub priority: u32,
}

/// Meta composition as published in meta.json
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Composition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// S, A, B, C... Free-form; unrecognized values are tolerated.
    pub tier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
    pub main_carries: Vec<Champion>,
    pub support_champions: Vec<Champion>,
    pub optimal_items: Vec<OptimalItem>,
    pub best_augments: Vec<Augment>,
    pub traits: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub win_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_placement: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl Composition {
    /// Carries first, then supports, in feed order
    pub fn champions(&self) -> impl Iterator<Item = &Champion> {
        self.main_carries.iter().chain(self.support_champions.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetaMetadata {
    pub scraped_from: String,
    pub scraping_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch_version: Option<String>,
}

/// Top-level meta.json document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetaDocument {
    pub version: Option<String>,
    pub last_updated: Option<String>,
    pub total_compositions: Option<usize>,
    pub compositions: Vec<Composition>,
    pub metadata: Option<MetaMetadata>,
}

impl MetaDocument {
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Patch shown in the status line. The first composition wins over the
    /// document metadata, "N/A" when neither carries one.
    pub fn patch_label(&self) -> String {
        self.compositions
            .first()
            .and_then(|c| c.patch_version.clone())
            .or_else(|| self.metadata.as_ref().and_then(|m| m.patch_version.clone()))
            .unwrap_or_else(|| "N/A".to_string())
    }

    /// Date of the last feed update as YYYY-MM-DD, today when absent.
    pub fn updated_label(&self) -> String {
        match &self.last_updated {
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(ts) => ts.with_timezone(&Utc).format("%Y-%m-%d").to_string(),
                Err(_) => raw.clone(),
            },
            None => Utc::now().format("%Y-%m-%d").to_string(),
        }
    }
}
