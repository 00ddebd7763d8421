use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const EVENTS_PAGE_SIZE: usize = 6;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerImage {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLocation {
    pub venue_name: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// An event as the ticketing platform returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanitixEvent {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub url: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub timezone: Option<String>,
    pub banner_image: Option<BannerImage>,
    pub event_location: Option<EventLocation>,
    #[serde(default)]
    pub marked_as_sold_out: bool,
    pub public: Option<bool>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanitixEventsPage {
    #[serde(default)]
    pub total: usize,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    #[serde(default)]
    pub events: Vec<HumanitixEvent>,
}

/// The reshaped event the site renders.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub timezone: Option<String>,
    pub image_url: Option<String>,
    pub venue: Option<String>,
    pub address: Option<String>,
    pub online: bool,
    pub sold_out: bool,
}

impl From<HumanitixEvent> for EventSummary {
    fn from(event: HumanitixEvent) -> Self {
        let location = event.event_location;
        Self {
            id: event.id,
            name: event.name,
            description: event.description,
            url: event.url,
            start_date: event.start_date,
            end_date: event.end_date,
            timezone: event.timezone,
            image_url: event.banner_image.and_then(|b| b.url),
            online: location
                .as_ref()
                .and_then(|l| l.kind.as_deref())
                .map(|k| k.eq_ignore_ascii_case("online"))
                .unwrap_or(false),
            venue: location.as_ref().and_then(|l| l.venue_name.clone()),
            address: location.and_then(|l| l.address),
            sold_out: event.marked_as_sold_out,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventBucket {
    #[default]
    Upcoming,
    Past,
}

impl FromStr for EventBucket {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(EventBucket::Upcoming),
            "past" => Ok(EventBucket::Past),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    pub events: Vec<EventSummary>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub has_more: bool,
}

fn is_listed(event: &HumanitixEvent) -> bool {
    event.public != Some(false) && event.published != Some(false)
}

/// An event stays upcoming until it ends.
fn is_upcoming(event: &HumanitixEvent, now: DateTime<Utc>) -> bool {
    event.end_date.unwrap_or(event.start_date) >= now
}

/// Splits events into upcoming/past, sorts each bucket and cuts out one page.
/// Pages are 1-based; page 0 is treated as page 1.
pub fn paginate_events(
    events: Vec<HumanitixEvent>,
    bucket: EventBucket,
    page: usize,
    now: DateTime<Utc>,
) -> EventPage {
    let page = page.max(1);
    let mut selected: Vec<HumanitixEvent> = events
        .into_iter()
        .filter(is_listed)
        .filter(|e| (bucket == EventBucket::Upcoming) == is_upcoming(e, now))
        .collect();

    match bucket {
        EventBucket::Upcoming => selected.sort_by(|a, b| a.start_date.cmp(&b.start_date)),
        EventBucket::Past => selected.sort_by(|a, b| b.start_date.cmp(&a.start_date)),
    }

    let total = selected.len();
    let events = selected
        .into_iter()
        .skip(page.saturating_sub(1).saturating_mul(EVENTS_PAGE_SIZE))
        .take(EVENTS_PAGE_SIZE)
        .map(EventSummary::from)
        .collect();

    EventPage {
        events,
        page,
        page_size: EVENTS_PAGE_SIZE,
        total,
        has_more: total > page.saturating_mul(EVENTS_PAGE_SIZE),
    }
}
