//! Structured search filter, built as a draft and submitted as one query.
//!
//! Fields accumulate on the draft without touching the conversation; nothing
//! is sent until the whole draft validates and converts to a single prompt.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// UK postcode, outward and inward parts, case-insensitive
static POSTCODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z]{1,2}[0-9][A-Z0-9]?\s?[0-9][A-Z]{2}$").unwrap()
});

/// Draft of a filtered property search
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterDraft {
    pub area: Option<String>,
    pub close_to: Option<String>,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub bedrooms: Option<u32>,
    pub furnishing: Option<String>,
    pub postcode: Option<String>,
    pub bills_included: bool,
    pub low_crime_rate: bool,
    pub big_windows: bool,
    pub quiet_neighbourhood: bool,
}

impl FilterDraft {
    pub fn is_empty(&self) -> bool {
        *self == FilterDraft::default()
    }

    /// Validate the draft as a unit
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::InvalidFilter("no criteria set".to_string()));
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price)
            && min > max
        {
            return Err(Error::InvalidFilter(format!(
                "minimum price {min} exceeds maximum price {max}"
            )));
        }
        if let Some(pc) = &self.postcode
            && !POSTCODE.is_match(pc)
        {
            return Err(Error::InvalidFilter(format!("'{pc}' is not a postcode")));
        }
        Ok(())
    }

    /// Convert the validated draft into the query the backend expects.
    ///
    /// The backend parses this phrasing, keep the segment order and the
    /// `pincode` keyword as they are.
    pub fn to_prompt(&self) -> Result<String> {
        self.validate()?;
        let mut parts: Vec<String> = vec!["Show".to_string()];
        if let Some(furnishing) = &self.furnishing {
            parts.push(furnishing.clone());
        }
        parts.push("properties".to_string());
        if let Some(area) = &self.area {
            parts.push(format!("near {area}"));
        }
        if let Some(close_to) = &self.close_to {
            parts.push(format!("close to {close_to}"));
        }
        if let Some(min) = self.min_price {
            parts.push(format!("minimum price {min}"));
        }
        if let Some(max) = self.max_price {
            parts.push(format!("maximum price {max}"));
        }
        if let Some(bedrooms) = self.bedrooms {
            parts.push(format!("bedrooms {bedrooms}"));
        }
        if let Some(pc) = &self.postcode {
            parts.push(format!("pincode {pc}"));
        }
        if self.bills_included {
            parts.push("bills included".to_string());
        }
        if self.low_crime_rate {
            parts.push("with low crime rate".to_string());
        }
        if self.big_windows {
            parts.push("with big windows".to_string());
        }
        if self.quiet_neighbourhood {
            parts.push("with quiet neighbourhood".to_string());
        }
        Ok(parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_draft_prompt_ordering() {
        let draft = FilterDraft {
            area: Some("Camden".to_string()),
            close_to: Some("the station".to_string()),
            min_price: Some(1000),
            max_price: Some(2000),
            bedrooms: Some(2),
            furnishing: Some("furnished".to_string()),
            postcode: Some("NW1 8QL".to_string()),
            bills_included: true,
            low_crime_rate: true,
            big_windows: true,
            quiet_neighbourhood: true,
        };
        assert_eq!(
            draft.to_prompt().unwrap(),
            "Show furnished properties near Camden close to the station \
             minimum price 1000 maximum price 2000 bedrooms 2 pincode NW1 8QL \
             bills included with low crime rate with big windows with quiet neighbourhood"
        );
    }

    #[test]
    fn test_partial_draft_skips_unset_fields() {
        let draft = FilterDraft {
            area: Some("Hackney".to_string()),
            max_price: Some(1800),
            ..Default::default()
        };
        assert_eq!(
            draft.to_prompt().unwrap(),
            "Show properties near Hackney maximum price 1800"
        );
    }

    #[test]
    fn test_empty_draft_rejected() {
        assert!(matches!(
            FilterDraft::default().to_prompt(),
            Err(Error::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_inverted_price_range_rejected() {
        let draft = FilterDraft {
            min_price: Some(3000),
            max_price: Some(1000),
            ..Default::default()
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_postcode_validation() {
        let mut draft = FilterDraft {
            postcode: Some("NW1 8QL".to_string()),
            ..Default::default()
        };
        assert!(draft.validate().is_ok());
        draft.postcode = Some("sw19 2ab".to_string());
        assert!(draft.validate().is_ok());
        draft.postcode = Some("not-a-postcode".to_string());
        assert!(draft.validate().is_err());
    }
}
