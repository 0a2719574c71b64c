//! Record types for dexcards.
//!
//! K_i: These types represent the data flowing through the pipeline.
//! Wire payloads are decoded into `PrimaryRecord`; assembly produces a new
//! `ResolvedRecord` rather than mutating the primary one.

use super::Identifier;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// Wire payloads
// ═══════════════════════════════════════════════════════════════════════════

/// Named link to another catalog resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubResourceRef {
    /// Catalog slug (e.g. "fire", "blaze", "ember")
    #[serde(default)]
    pub name: String,

    /// URL of the sub-resource holding the localized names
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct TypeSlot {
    #[serde(rename = "type")]
    kind: SubResourceRef,
}

#[derive(Debug, Deserialize)]
struct AbilitySlot {
    ability: SubResourceRef,
}

#[derive(Debug, Deserialize)]
struct MoveSlot {
    #[serde(rename = "move")]
    entry: SubResourceRef,
}

/// Sprite image URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprites {
    /// Normal form
    #[serde(default, rename = "front_default")]
    pub front: Option<String>,

    /// Alternate (shiny) form
    #[serde(default, rename = "front_shiny")]
    pub shiny: Option<String>,
}

/// Primary endpoint payload, as served by the catalog.
#[derive(Debug, Deserialize)]
struct PrimaryPayload {
    #[serde(default)]
    id: Option<u32>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    sprites: Sprites,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    weight: u32,
    #[serde(default)]
    types: Vec<TypeSlot>,
    #[serde(default)]
    abilities: Vec<AbilitySlot>,
    #[serde(default)]
    moves: Vec<MoveSlot>,
}

/// One localized name variant of a sub-resource.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalizedName {
    pub language: LanguageRef,
    pub name: String,
}

/// Language link inside a localized name.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageRef {
    pub name: String,
}

/// Sub-resource payload: ordered `(language, name)` pairs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalizedNameSet {
    #[serde(default)]
    pub names: Vec<LocalizedName>,
}

impl LocalizedNameSet {
    /// Exact-match lookup on a language tag.
    pub fn find(&self, language: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|n| n.language.name == language)
            .map(|n| n.name.as_str())
    }

    /// First match along a chain of language tags.
    pub fn find_first<'a, I>(&self, languages: I) -> Option<&str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        languages.into_iter().find_map(|lang| self.find(lang))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Domain records
// ═══════════════════════════════════════════════════════════════════════════

/// Primary catalog record, decoded from the primary endpoint.
///
/// K_i: `name` is present and non-empty (checked by `from_payload`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryRecord {
    pub id: u32,
    pub name: String,
    pub sprites: Sprites,
    pub height: u32,
    pub weight: u32,
    pub type_refs: Vec<SubResourceRef>,
    pub ability_refs: Vec<SubResourceRef>,
    pub move_refs: Vec<SubResourceRef>,
}

impl PrimaryRecord {
    /// Decode a primary payload.
    ///
    /// B_i(payload has a display name) → Err(reason) otherwise
    pub fn from_payload(value: serde_json::Value) -> std::result::Result<Self, String> {
        let payload: PrimaryPayload =
            serde_json::from_value(value).map_err(|e| format!("malformed record: {e}"))?;

        let name = payload
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| "record has no name".to_string())?;

        let id = payload
            .id
            .ok_or_else(|| format!("malformed record: {name} has no id"))?;

        Ok(Self {
            id,
            name,
            sprites: payload.sprites,
            height: payload.height,
            weight: payload.weight,
            type_refs: payload.types.into_iter().map(|t| t.kind).collect(),
            ability_refs: payload.abilities.into_iter().map(|a| a.ability).collect(),
            move_refs: payload.moves.into_iter().map(|m| m.entry).collect(),
        })
    }
}

/// Record with every sub-resource replaced by its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    pub id: u32,
    pub name: String,
    pub sprites: Sprites,
    pub height: u32,
    pub weight: u32,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    pub moves: Vec<String>,
}

impl ResolvedRecord {
    /// Build from a primary record and its resolved name lists.
    pub fn new(
        primary: &PrimaryRecord,
        types: Vec<String>,
        abilities: Vec<String>,
        moves: Vec<String>,
    ) -> Self {
        Self {
            id: primary.id,
            name: primary.name.clone(),
            sprites: primary.sprites.clone(),
            height: primary.height,
            weight: primary.weight,
            types,
            abilities,
            moves,
        }
    }
}

/// Placeholder for an identifier whose record could not be assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tombstone {
    /// Identifier as requested
    pub identifier: Identifier,
    /// Human-readable not-found notice
    pub reason: String,
    /// Underlying cause
    pub error: String,
}

impl Tombstone {
    pub fn new(identifier: Identifier, error: impl ToString) -> Self {
        Self {
            reason: format!("Pokemon with ID {identifier} not found"),
            identifier,
            error: error.to_string(),
        }
    }
}

/// What the orchestrator hands to a renderer, one per requested identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RenderItem {
    Resolved(ResolvedRecord),
    Tombstone(Tombstone),
}

impl RenderItem {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn as_resolved(&self) -> Option<&ResolvedRecord> {
        match self {
            Self::Resolved(record) => Some(record),
            Self::Tombstone(_) => None,
        }
    }

    pub fn as_tombstone(&self) -> Option<&Tombstone> {
        match self {
            Self::Resolved(_) => None,
            Self::Tombstone(tombstone) => Some(tombstone),
        }
    }
}

impl From<ResolvedRecord> for RenderItem {
    fn from(record: ResolvedRecord) -> Self {
        Self::Resolved(record)
    }
}

impl From<Tombstone> for RenderItem {
    fn from(tombstone: Tombstone) -> Self {
        Self::Tombstone(tombstone)
    }
}
