//! Notable market events used to annotate a price history

use crate::data::PriceSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEvent {
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
}

impl MarketEvent {
    pub fn new(date: NaiveDate, title: &str, description: &str) -> Self {
        Self {
            date,
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}

/// An event paired with the price observed on its date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAnnotation {
    pub event: MarketEvent,
    pub price: f64,
}

/// Built-in Brent crude milestones
pub fn brent_events() -> Vec<MarketEvent> {
    [
        (
            (2014, 6, 20),
            "US shale boom",
            "Rising US shale output starts the 2014 price collapse",
        ),
        (
            (2016, 1, 20),
            "Oversupply low",
            "Global oversupply pushes Brent to its lowest level in over a decade",
        ),
        (
            (2020, 3, 20),
            "COVID-19 collapse",
            "Pandemic lockdowns crush demand",
        ),
        (
            (2022, 3, 8),
            "Ukraine war high",
            "The invasion of Ukraine drives prices to a multi-year high",
        ),
    ]
    .into_iter()
    .filter_map(|((y, m, d), title, description)| {
        NaiveDate::from_ymd_opt(y, m, d).map(|date| MarketEvent::new(date, title, description))
    })
    .collect()
}

/// Events whose date is present in `series`, in the order given
pub fn annotate(series: &PriceSeries, events: &[MarketEvent]) -> Vec<EventAnnotation> {
    events
        .iter()
        .filter_map(|event| {
            series.price_on(event.date).map(|price| EventAnnotation {
                event: event.clone(),
                price,
            })
        })
        .collect()
}
