//! Turning scraped markup into pick records.

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::types::PickRecord;

pub trait PickExtractor: Send + Sync {
    fn extract(
        &self,
        markup: &str,
        source_url: &str,
        scraped_at: DateTime<Utc>,
    ) -> Result<Vec<PickRecord>>;
}

/// Reads one pick per card element: the first event element and the first
/// prediction element inside it. Cards missing either text are dropped.
#[derive(Debug, Clone)]
pub struct SelectorExtractor {
    source: String,
    card: String,
    event: String,
    prediction: String,
}

impl SelectorExtractor {
    pub fn new(
        source: impl Into<String>,
        card: impl Into<String>,
        event: impl Into<String>,
        prediction: impl Into<String>,
    ) -> Result<Self> {
        let extractor = Self {
            source: source.into(),
            card: card.into(),
            event: event.into(),
            prediction: prediction.into(),
        };
        // Invalid selectors fail construction.
        extractor.selectors()?;
        Ok(extractor)
    }

    // scraper::Selector is not guaranteed Send + Sync, so it is rebuilt per call.
    fn selectors(&self) -> Result<(Selector, Selector, Selector)> {
        Ok((
            parse_selector(&self.card)?,
            parse_selector(&self.event)?,
            parse_selector(&self.prediction)?,
        ))
    }
}

impl PickExtractor for SelectorExtractor {
    fn extract(
        &self,
        markup: &str,
        source_url: &str,
        scraped_at: DateTime<Utc>,
    ) -> Result<Vec<PickRecord>> {
        let (card_sel, event_sel, prediction_sel) = self.selectors()?;
        let document = Html::parse_document(markup);

        let picks = document
            .select(&card_sel)
            .filter_map(|card| {
                let event = first_text(card, &event_sel)?;
                let prediction = first_text(card, &prediction_sel)?;
                Some(PickRecord::new(&self.source, source_url, event, prediction, scraped_at))
            })
            .collect();

        Ok(picks)
    }
}

fn parse_selector(raw: &str) -> Result<Selector> {
    Selector::parse(raw).map_err(|e| AppError::Scrape(format!("invalid selector {raw:?}: {e:?}")))
}

/// Whitespace-collapsed text of the first match, or None when empty.
fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = scope.select(selector).next()?;
    let text = element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}
