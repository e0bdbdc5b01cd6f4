// 🖼️ Display Assembler
// Reads whole collections and orders them newest first for the dashboard.

use crate::error::StoreError;
use crate::records::{Area, ImpactEntry, QuoteEntry, Record};
use crate::store::{load_records, RecordStore};
use serde::Serialize;
use std::sync::Arc;

/// Visual treatment of an impact card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStyle {
    Info,
    Success,
}

impl CardStyle {
    /// HSMA entries are informational, everything else is a success story
    pub fn for_area(area: Area) -> Self {
        match area {
            Area::Hsma => CardStyle::Info,
            _ => CardStyle::Success,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            CardStyle::Info => "card-info",
            CardStyle::Success => "card-success",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactCard {
    pub style: CardStyle,
    #[serde(flatten)]
    pub entry: ImpactEntry,
}

impl ImpactCard {
    pub fn new(entry: ImpactEntry) -> Self {
        Self {
            style: CardStyle::for_area(entry.area),
            entry,
        }
    }

    pub fn heading(&self) -> String {
        format!(
            "{} | {} | {} {}",
            self.entry.name, self.entry.area, self.entry.month, self.entry.year
        )
    }
}

/// Newest first: highest id at the top. Among equal ids the later insert wins.
pub fn newest_first<R: Record>(mut records: Vec<R>) -> Vec<R> {
    records.reverse();
    records.sort_by(|a, b| b.id().cmp(&a.id()));
    records
}

pub struct DisplayAssembler {
    store: Arc<dyn RecordStore>,
}

impl DisplayAssembler {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn impact_entries(&self) -> Result<Vec<ImpactEntry>, StoreError> {
        let entries = load_records::<ImpactEntry>(self.store.as_ref()).await?;
        Ok(newest_first(entries))
    }

    pub async fn impact_cards(&self) -> Result<Vec<ImpactCard>, StoreError> {
        Ok(self
            .impact_entries()
            .await?
            .into_iter()
            .map(ImpactCard::new)
            .collect())
    }

    pub async fn quotes(&self) -> Result<Vec<QuoteEntry>, StoreError> {
        let quotes = load_records::<QuoteEntry>(self.store.as_ref()).await?;
        Ok(newest_first(quotes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Collection, Month};
    use crate::store::SqliteStore;
    use serde_json::json;

    fn impact_row(id: i64, area: &str) -> serde_json::Value {
        json!({
            "id": id, "name": format!("person {}", id), "area": area,
            "month": "Mar", "year": 2024, "blurb": "Did a thing", "link": null
        })
    }

    #[tokio::test]
    async fn test_cards_render_newest_first() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        for id in [0, 1, 2] {
            store
                .insert(Collection::Impacts, impact_row(id, "HSMA"))
                .await
                .unwrap();
        }

        let assembler = DisplayAssembler::new(store);
        let ids: Vec<i64> = assembler
            .impact_cards()
            .await
            .unwrap()
            .iter()
            .map(|c| c.entry.id)
            .collect();
        assert_eq!(ids, vec![2, 1, 0]);
    }

    #[tokio::test]
    async fn test_style_branches_on_area() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        store
            .insert(Collection::Impacts, impact_row(0, "HSMA"))
            .await
            .unwrap();
        store
            .insert(Collection::Impacts, impact_row(1, "Core PenCHORD"))
            .await
            .unwrap();

        let cards = DisplayAssembler::new(store).impact_cards().await.unwrap();
        assert_eq!(cards[0].style, CardStyle::Success);
        assert_eq!(cards[1].style, CardStyle::Info);
        assert_eq!(cards[0].heading(), "person 1 | Core PenCHORD | Mar 2024");
    }

    #[tokio::test]
    async fn test_quotes_newest_first() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        for id in [0, 1] {
            store
                .insert(
                    Collection::Quotes,
                    json!({"id": id, "name": "n", "org": "o", "quote": format!("q{}", id)}),
                )
                .await
                .unwrap();
        }

        let quotes = DisplayAssembler::new(store).quotes().await.unwrap();
        assert_eq!(quotes[0].quote, "q1");
        assert_eq!(quotes[1].quote, "q0");
    }

    #[test]
    fn test_duplicate_ids_later_insert_first() {
        let make = |id, quote: &str| QuoteEntry {
            id,
            name: "n".to_string(),
            org: "o".to_string(),
            quote: quote.to_string(),
        };

        let ordered = newest_first(vec![make(0, "a"), make(1, "b"), make(1, "c")]);
        let quotes: Vec<&str> = ordered.iter().map(|q| q.quote.as_str()).collect();
        assert_eq!(quotes, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_card_serializes_flat() {
        let card = ImpactCard::new(ImpactEntry {
            id: 3,
            name: "Alex".to_string(),
            area: Area::Hsma,
            month: Month::Jan,
            year: 2024,
            blurb: "b".to_string(),
            link: None,
        });

        let value = serde_json::to_value(&card).unwrap();
        assert_eq!(value["style"], "info");
        assert_eq!(value["id"], 3);
    }
}
