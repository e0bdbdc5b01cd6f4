// 🗂️ Records - the two things PIMS stores
// Entries are created once on form submission and never mutated afterwards.
// Identity is a manually assigned integer, one sequence per collection.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// COLLECTIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    Impacts,
    Quotes,
}

impl Collection {
    /// Table name in the hosted store
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Impacts => "pims_table",
            Collection::Quotes => "pims_quotes_table",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

// ============================================================================
// AREA OF WORK
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Area {
    #[serde(rename = "HSMA")]
    Hsma,

    #[serde(rename = "Core PenCHORD", alias = "CorePenCHORD")]
    CorePenChord,
}

impl Area {
    pub const ALL: [Area; 2] = [Area::Hsma, Area::CorePenChord];

    /// Label shown in the form and stored in the table
    pub fn as_str(&self) -> &'static str {
        match self {
            Area::Hsma => "HSMA",
            Area::CorePenChord => "Core PenCHORD",
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Area {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "HSMA" => Ok(Area::Hsma),
            "Core PenCHORD" | "CorePenCHORD" => Ok(Area::CorePenChord),
            other => Err(format!("unknown area of work: {}", other)),
        }
    }
}

// ============================================================================
// MONTH
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }

    /// Month from a 1-based calendar number
    pub fn from_number(n: u32) -> Option<Month> {
        Month::ALL.get(n.checked_sub(1)? as usize).copied()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Month {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Month::ALL
            .iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("unknown month: {}", s))
    }
}

// ============================================================================
// RECORD TRAIT
// ============================================================================

/// A row type living in one collection with a caller-assigned id.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Id-less form filled in by the submitter
    type Draft: Send;

    const COLLECTION: Collection;

    fn id(&self) -> i64;

    fn from_draft(id: i64, draft: Self::Draft) -> Self;
}

// ============================================================================
// IMPACT ENTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactDraft {
    pub name: String,
    pub area: Area,
    pub month: Month,
    pub year: i32,
    pub blurb: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactEntry {
    pub id: i64,
    pub name: String,
    pub area: Area,
    pub month: Month,
    pub year: i32,
    pub blurb: String,
    #[serde(default)]
    pub link: Option<String>,
}

impl Record for ImpactEntry {
    type Draft = ImpactDraft;

    const COLLECTION: Collection = Collection::Impacts;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, draft: ImpactDraft) -> Self {
        ImpactEntry {
            id,
            name: draft.name,
            area: draft.area,
            month: draft.month,
            year: draft.year,
            blurb: draft.blurb,
            link: draft.link,
        }
    }
}

// ============================================================================
// QUOTE ENTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteDraft {
    pub name: String,
    pub org: String,
    pub quote: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteEntry {
    pub id: i64,
    pub name: String,
    pub org: String,
    pub quote: String,
}

impl Record for QuoteEntry {
    type Draft = QuoteDraft;

    const COLLECTION: Collection = Collection::Quotes;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, draft: QuoteDraft) -> Self {
        QuoteEntry {
            id,
            name: draft.name,
            org: draft.org,
            quote: draft.quote,
        }
    }
}
