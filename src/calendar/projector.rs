use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

use crate::calendar::event::CalendarEvent;
use crate::calendar::palette::Palette;
use crate::reservation::{parse_timestamp, ReservationRecord};
use crate::storage::config::Config;
use crate::sync::{with_timeout, ReservationApi, TransportError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("Reservation '{title}' has no start time")]
    MissingStart { title: String },
    #[error("Reservation '{title}' has an invalid {field} time: {value}")]
    InvalidTimestamp {
        title: String,
        field: &'static str,
        value: String,
    },
    #[error("Calendar rejected event {id}: {reason}")]
    Rejected { id: String, reason: String },
}

/// The rendering surface the projector drives.
pub trait CalendarWidget: Send {
    fn remove_all_events(&mut self);

    fn add_event(&mut self, event: CalendarEvent) -> Result<(), RenderError>;

    fn render(&mut self);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub rendered: usize,
    pub skipped: usize,
}

/// Maps records to calendar events.
///
/// Ids are `title + start` when both exist and fall back to
/// `reservation-{index}-{generation}` otherwise. Repeated ids within one call
/// get a `#n` suffix. Only the last record may be marked new.
pub fn project_records(
    records: &[ReservationRecord],
    highlight_newest: bool,
    palette: &Palette,
    placeholder_title: &str,
    generation: i64,
) -> Vec<Result<CalendarEvent, RenderError>> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let last = records.len().saturating_sub(1);

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let base_id = match (record.title(), record.start()) {
                (Some(title), Some(start)) => format!("{}{}", title, start),
                _ => format!("reservation-{}-{}", index, generation),
            };
            let occurrences = seen.entry(base_id.clone()).or_insert(0);
            *occurrences += 1;
            let id = if *occurrences == 1 {
                base_id
            } else {
                format!("{}#{}", base_id, occurrences)
            };

            project_record(
                record,
                id,
                highlight_newest && index == last,
                palette,
                placeholder_title,
            )
        })
        .collect()
}

fn project_record(
    record: &ReservationRecord,
    id: String,
    is_new: bool,
    palette: &Palette,
    placeholder_title: &str,
) -> Result<CalendarEvent, RenderError> {
    let title = record.title().unwrap_or(placeholder_title).to_string();

    let raw_start = record.start().ok_or_else(|| RenderError::MissingStart {
        title: title.clone(),
    })?;
    let start = parse_timestamp(raw_start).ok_or_else(|| RenderError::InvalidTimestamp {
        title: title.clone(),
        field: "start",
        value: raw_start.to_string(),
    })?;

    let end = match record.end.as_deref().filter(|e| !e.is_empty()) {
        Some(raw_end) => Some(parse_timestamp(raw_end).ok_or_else(|| {
            RenderError::InvalidTimestamp {
                title: title.clone(),
                field: "end",
                value: raw_end.to_string(),
            }
        })?),
        None => None,
    };

    Ok(CalendarEvent {
        id,
        color: palette.color_for(record.title()).to_string(),
        title,
        start,
        end,
        all_day: record.is_all_day(),
        is_new,
        description: record.description.clone(),
    })
}

/// Fetches the authoritative reservation list and rebuilds the calendar from
/// it on every refresh.
pub struct CalendarProjector<A: ?Sized, W> {
    api: Arc<A>,
    widget: Mutex<W>,
    palette: Palette,
    placeholder_title: String,
    request_timeout: Duration,
}

impl<A, W> CalendarProjector<A, W>
where
    A: ReservationApi + ?Sized,
    W: CalendarWidget,
{
    pub fn new(api: Arc<A>, widget: W) -> Self {
        Self {
            api,
            widget: Mutex::new(widget),
            palette: Palette::default(),
            placeholder_title: "Untitled reservation".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(api: Arc<A>, widget: W, config: &Config) -> Self {
        Self::new(api, widget)
            .with_palette(config.calendar.palette())
            .with_placeholder_title(config.calendar.placeholder_title.clone())
            .with_request_timeout(config.backend.request_timeout())
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_placeholder_title(mut self, title: impl Into<String>) -> Self {
        self.placeholder_title = title.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn widget(&self) -> MutexGuard<'_, W> {
        self.widget.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces everything on the calendar with the current backend list.
    ///
    /// A fetch failure leaves the calendar as it was. Events that fail to
    /// project or that the widget rejects are skipped; the rest still render.
    pub async fn refresh(&self, highlight_newest: bool) -> Result<RefreshReport, TransportError> {
        let records = with_timeout(self.request_timeout, self.api.get_reservations())
            .await
            .inspect_err(|e| tracing::error!("Error loading reservations: {}", e))?;

        let generation = Utc::now().timestamp_millis();
        let projected = project_records(
            &records,
            highlight_newest,
            &self.palette,
            &self.placeholder_title,
            generation,
        );

        let mut report = RefreshReport::default();
        let mut widget = self.widget();
        widget.remove_all_events();

        for event in projected {
            match event.and_then(|event| widget.add_event(event)) {
                Ok(()) => report.rendered += 1,
                Err(e) => {
                    tracing::warn!("Skipping reservation: {}", e);
                    report.skipped += 1;
                }
            }
        }

        widget.render();

        tracing::info!(
            "Calendar refreshed: {} rendered, {} skipped (highlight newest: {})",
            report.rendered,
            report.skipped,
            highlight_newest
        );
        Ok(report)
    }
}
