// 📝 Submission forms
// Raw form fields as typed by the submitter. Validation turns them into
// drafts; on failure the raw values are kept so the form can be re-shown.

use crate::error::ValidationErrors;
use crate::records::{Area, ImpactDraft, Month, QuoteDraft};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_BLURB_CHARS: usize = 280;
pub const MIN_YEAR: i32 = 2010;
pub const MAX_YEAR: i32 = 2099;

/// Month and year the impact form starts on
pub fn default_period() -> (Month, i32) {
    let today = Utc::now().date_naive();
    let month = Month::from_number(today.month()).unwrap_or(Month::Jan);
    (month, today.year().clamp(MIN_YEAR, MAX_YEAR))
}

fn required(errors: &mut ValidationErrors, field: &'static str, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, "is required");
    }
    trimmed.to_string()
}

// ============================================================================
// IMPACT FORM
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub blurb: String,
    #[serde(default)]
    pub link: String,
}

impl ImpactForm {
    /// Blank form with today's month and year selected
    pub fn blank() -> Self {
        let (month, year) = default_period();
        ImpactForm {
            area: Area::Hsma.as_str().to_string(),
            month: month.as_str().to_string(),
            year: year.to_string(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<ImpactDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = required(&mut errors, "name", &self.name);
        let blurb = required(&mut errors, "blurb", &self.blurb);
        if blurb.chars().count() > MAX_BLURB_CHARS {
            errors.add("blurb", format!("must be at most {} characters", MAX_BLURB_CHARS));
        }

        let area = self.area.parse::<Area>().map_err(|e| errors.add("area", e)).ok();
        let month = self.month.parse::<Month>().map_err(|e| errors.add("month", e)).ok();

        let year = match self.year.trim().parse::<i32>() {
            Ok(year) if (MIN_YEAR..=MAX_YEAR).contains(&year) => Some(year),
            _ => {
                errors.add(
                    "year",
                    format!("must be a year between {} and {}", MIN_YEAR, MAX_YEAR),
                );
                None
            }
        };

        let link = match self.link.trim() {
            "" => None,
            url if url.starts_with("http://") || url.starts_with("https://") => {
                Some(url.to_string())
            }
            _ => {
                errors.add("link", "must start with http:// or https://");
                None
            }
        };

        match (area, month, year) {
            (Some(area), Some(month), Some(year)) if errors.is_empty() => Ok(ImpactDraft {
                name,
                area,
                month,
                year,
                blurb,
                link,
            }),
            _ => Err(errors),
        }
    }
}

// ============================================================================
// QUOTE FORM
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub org: String,
    #[serde(default)]
    pub quote: String,
}

impl QuoteForm {
    pub fn validate(&self) -> Result<QuoteDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = required(&mut errors, "name", &self.name);
        let org = required(&mut errors, "org", &self.org);
        let quote = required(&mut errors, "quote", &self.quote);

        errors.into_result()?;
        Ok(QuoteDraft { name, org, quote })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_impact() -> ImpactForm {
        ImpactForm {
            name: " Alex ".to_string(),
            area: "HSMA".to_string(),
            month: "Jan".to_string(),
            year: "2024".to_string(),
            blurb: "Launched a pilot programme with NHS Trust".to_string(),
            link: "https://example.org".to_string(),
        }
    }

    #[test]
    fn test_valid_impact_form() {
        let draft = filled_impact().validate().unwrap();
        assert_eq!(draft.name, "Alex");
        assert_eq!(draft.area, Area::Hsma);
        assert_eq!(draft.month, Month::Jan);
        assert_eq!(draft.year, 2024);
        assert_eq!(draft.link.as_deref(), Some("https://example.org"));
    }

    #[test]
    fn test_link_is_optional() {
        let mut form = filled_impact();
        form.link = "  ".to_string();
        assert_eq!(form.validate().unwrap().link, None);
    }

    #[test]
    fn test_reports_every_failing_field() {
        let form = ImpactForm {
            name: "".to_string(),
            area: "Marketing".to_string(),
            month: "Jan".to_string(),
            year: "2009".to_string(),
            blurb: "x".repeat(MAX_BLURB_CHARS + 1),
            link: "example.org".to_string(),
        };

        let errors = form.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["area", "blurb", "link", "name", "year"]);
    }

    #[test]
    fn test_blurb_limit_counts_characters() {
        let mut form = filled_impact();
        form.blurb = "é".repeat(MAX_BLURB_CHARS);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_year_bounds() {
        for (year, ok) in [("2010", true), ("2099", true), ("2100", false), ("soon", false)] {
            let mut form = filled_impact();
            form.year = year.to_string();
            assert_eq!(form.validate().is_ok(), ok, "year {}", year);
        }
    }

    #[test]
    fn test_quote_form() {
        let form = QuoteForm {
            name: "Sam".to_string(),
            org: "NHS".to_string(),
            quote: "Changed how we plan".to_string(),
        };
        assert_eq!(form.validate().unwrap().org, "NHS");

        let errors = QuoteForm::default().validate().unwrap_err();
        assert_eq!(errors.get("quote"), Some("is required"));
        assert_eq!(errors.iter().count(), 3);
    }

    #[test]
    fn test_blank_form_defaults() {
        let form = ImpactForm::blank();
        assert_eq!(form.area, "HSMA");
        assert!(form.month.parse::<Month>().is_ok());
        assert!(form.name.is_empty());
    }
}
