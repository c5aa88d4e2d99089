use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use scraper::{Html, Selector};
use url::Url;

pub const DEFAULT_TEMPLATE: &str = "https://sdo.oma.be/movies/{year}/{month}/{day}/";

const PLACEHOLDERS: [&str; 3] = ["{year}", "{month}", "{day}"];

/// Listing URL template with `{year}`, `{month}` and `{day}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingTemplate {
    template: String,
}

impl ListingTemplate {
    /// Checks the placeholders and that a rendered date parses as an absolute URL.
    pub fn parse(template: &str) -> Result<Self> {
        for placeholder in PLACEHOLDERS {
            if !template.contains(placeholder) {
                bail!(
                    "Listing template {:?} is missing the {} placeholder",
                    template,
                    placeholder
                );
            }
        }

        let listing = ListingTemplate {
            template: template.to_string(),
        };
        let probe = NaiveDate::from_ymd_opt(2000, 1, 1).context("Invalid probe date")?;
        Url::parse(&listing.render(probe))
            .with_context(|| format!("Listing template {:?} is not a valid URL", template))?;

        Ok(listing)
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub fn render(&self, date: NaiveDate) -> String {
        self.template
            .replace("{year}", &format!("{:04}", date.year()))
            .replace("{month}", &format!("{:02}", date.month()))
            .replace("{day}", &format!("{:02}", date.day()))
    }

    pub fn request_for(&self, date: NaiveDate) -> Result<ListingRequest, url::ParseError> {
        Ok(ListingRequest {
            date,
            url: Url::parse(&self.render(date))?,
        })
    }
}

impl Default for ListingTemplate {
    fn default() -> Self {
        ListingTemplate {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// The listing page to fetch for a single day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub date: NaiveDate,
    pub url: Url,
}

/// Every anchor href in the page ending with `suffix`, in document order.
pub fn extract_candidates(html: &str, suffix: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a[href]").expect("anchor selector is valid");

    document
        .select(&anchor_selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| href.ends_with(suffix))
        .map(|href| href.to_string())
        .collect()
}

/// The first matching href in document order, if any.
pub fn select_candidate(html: &str, suffix: &str) -> Option<String> {
    extract_candidates(html, suffix).into_iter().next()
}
