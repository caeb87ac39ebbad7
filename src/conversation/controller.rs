use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;

use crate::calendar::{format_event_details, CalendarEvent, CalendarProjector, CalendarWidget, RefreshReport};
use crate::chat::{ChatLog, ChatMessage};
use crate::reservation::ReservationDraft;
use crate::storage::config::{Config, TimeFormat};
use crate::sync::{with_timeout, ReservationApi, TransportError};

pub const RETRY_MESSAGE: &str =
    "Sorry, there was an error processing your request. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Utterance is empty")]
    EmptyUtterance,
    #[error("A previous utterance is still being processed")]
    Busy,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// The backend answered; the dialogue continues.
    InProgress,
    /// The backend signalled completion. `refresh` is `None` when the
    /// calendar reload itself failed.
    Completed { refresh: Option<RefreshReport> },
    /// The request failed; the draft is unchanged and the user may resubmit.
    Failed { error: TransportError },
}

impl SubmitOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SubmitOutcome::Completed { .. })
    }
}

/// Releases the in-flight flag when the submission settles or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives one reservation dialogue at a time through request/replace cycles
/// with the backend.
pub struct ConversationController<A: ?Sized, W> {
    api: Arc<A>,
    projector: CalendarProjector<A, W>,
    draft: Mutex<ReservationDraft>,
    chat: Mutex<ChatLog>,
    in_flight: AtomicBool,
    request_timeout: Duration,
    time_format: TimeFormat,
    show_draft_summary: bool,
}

impl<A, W> ConversationController<A, W>
where
    A: ReservationApi + ?Sized,
    W: CalendarWidget,
{
    pub fn new(api: Arc<A>, projector: CalendarProjector<A, W>) -> Self {
        Self {
            api,
            projector,
            draft: Mutex::new(ReservationDraft::new()),
            chat: Mutex::new(ChatLog::new()),
            in_flight: AtomicBool::new(false),
            request_timeout: Duration::from_secs(30),
            time_format: TimeFormat::default(),
            show_draft_summary: false,
        }
    }

    pub fn from_config(api: Arc<A>, projector: CalendarProjector<A, W>, config: &Config) -> Self {
        Self::new(api, projector)
            .with_request_timeout(config.backend.request_timeout())
            .with_time_format(config.ui.time_format)
            .with_draft_summary(config.ui.show_draft_summary)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_time_format(mut self, time_format: TimeFormat) -> Self {
        self.time_format = time_format;
        self
    }

    pub fn with_draft_summary(mut self, enabled: bool) -> Self {
        self.show_draft_summary = enabled;
        self
    }

    pub fn projector(&self) -> &CalendarProjector<A, W> {
        &self.projector
    }

    pub fn draft(&self) -> ReservationDraft {
        self.lock_draft().clone()
    }

    pub fn chat(&self) -> MutexGuard<'_, ChatLog> {
        self.chat.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn lock_draft(&self) -> MutexGuard<'_, ReservationDraft> {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn post(&self, message: ChatMessage) {
        self.chat().push(message);
    }

    /// Sends one user utterance together with the current draft.
    ///
    /// Blank input and calls made while a previous submission is still
    /// running are rejected before anything is sent or logged to chat.
    pub async fn submit_utterance(&self, text: &str) -> Result<SubmitOutcome, SubmitError> {
        let message = text.trim();
        if message.is_empty() {
            tracing::debug!("Ignoring empty utterance");
            return Err(SubmitError::EmptyUtterance);
        }

        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            tracing::debug!("Rejecting utterance while a request is in flight");
            return Err(SubmitError::Busy);
        };

        self.post(ChatMessage::user(message));
        let draft = self.draft();

        tracing::info!("Submitting utterance with {} draft fields", draft.fields().len());

        let response = match with_timeout(
            self.request_timeout,
            self.api.process_reservation(message, &draft),
        )
        .await
        {
            Ok(response) => response,
            Err(error) => {
                tracing::error!("Error processing reservation: {}", error);
                self.post(ChatMessage::bot(RETRY_MESSAGE));
                return Ok(SubmitOutcome::Failed { error });
            }
        };

        for text in &response.messages {
            self.post(ChatMessage::bot(text.clone()));
        }

        if let Some(field) = &response.missing_field {
            tracing::debug!("Backend still needs field: {}", field);
        }

        if !response.is_success() {
            tracing::warn!("Backend reported an unsuccessful turn");
        }

        let completed = response.is_complete();

        if let Some(reservation) = response.reservation {
            if !completed
                && self.show_draft_summary
                && let Some(summary) = reservation.summary(self.time_format)
            {
                self.post(ChatMessage::bot(summary));
            }
            *self.lock_draft() = reservation;
        }

        if !completed {
            return Ok(SubmitOutcome::InProgress);
        }

        self.lock_draft().clear();
        tracing::info!("Reservation complete; refreshing calendar");

        let refresh = match self.projector.refresh(true).await {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::warn!("Calendar refresh after completion failed: {}", e);
                None
            }
        };

        Ok(SubmitOutcome::Completed { refresh })
    }

    /// Reloads the calendar without highlighting anything.
    pub async fn refresh_calendar(&self) -> Result<RefreshReport, TransportError> {
        self.projector.refresh(false).await
    }

    /// Handles a click on a rendered event by describing it in chat.
    pub fn on_event_click(&self, event: &CalendarEvent) {
        tracing::debug!("Event clicked: {}", event.id);
        self.post(ChatMessage::bot(format_event_details(event, self.time_format)));
    }
}
