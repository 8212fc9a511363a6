/// Form controller behind the "new review" dialog.
///
/// The controller owns the only copy of the draft. The dialog reads field
/// values and errors from it and feeds user input back through the setters,
/// so the value that gets submitted is always the one on screen.
use std::time::Duration;

use chrono::{DateTime, Utc};
use leptos::logging::{error, log};
use thiserror::Error;

use crate::models::review::{ReviewDraft, ReviewRecord};
use crate::store::{ReviewSink, SinkError};
use crate::validation::{self, Field, FieldError, ValidationErrors, MAX_RATING, MIN_RATING};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Editing,
    Submitting,
    Closed,
}

/// Why a submit attempt did not start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("review is invalid: {0}")]
    Invalid(ValidationErrors),
    #[error("a submission is already in progress")]
    InProgress,
    #[error("the dialog is closed")]
    Closed,
}

/// Failure while completing an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("could not post your review: {0}")]
    Sink(#[from] SinkError),
    #[error("no submission is pending")]
    NotSubmitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewFormConfig {
    /// Pause between a successful validation and posting the review.
    pub submit_delay: Duration,
}

impl Default for ReviewFormConfig {
    fn default() -> Self {
        Self {
            submit_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReviewForm {
    draft: ReviewDraft,
    errors: ValidationErrors,
    submit_error: Option<SubmissionError>,
    state: DialogState,
    // After the first submit attempt every change is re-validated.
    revalidate: bool,
}

impl Default for ReviewForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewForm {
    pub fn new() -> Self {
        Self {
            draft: ReviewDraft::default(),
            errors: ValidationErrors::default(),
            submit_error: None,
            state: DialogState::Editing,
            revalidate: false,
        }
    }

    pub fn draft(&self) -> &ReviewDraft {
        &self.draft
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == DialogState::Submitting
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&FieldError> {
        self.errors.get(field)
    }

    pub fn submit_error(&self) -> Option<&SubmissionError> {
        self.submit_error.as_ref()
    }

    /// A zero rating clears the stars; anything above the top star is capped.
    pub fn set_rating(&mut self, rating: Option<u8>) {
        self.edit(|draft| {
            draft.rating = rating.filter(|r| *r >= MIN_RATING).map(|r| r.min(MAX_RATING));
        });
    }

    pub fn set_review(&mut self, review: String) {
        self.edit(|draft| draft.review = review);
    }

    pub fn set_name(&mut self, name: String) {
        self.edit(|draft| draft.name = name);
    }

    pub fn set_email(&mut self, email: String) {
        self.edit(|draft| draft.email = email);
    }

    // Input is frozen outside `Editing` so the posted draft is the validated one.
    fn edit(&mut self, f: impl FnOnce(&mut ReviewDraft)) {
        if self.state != DialogState::Editing {
            return;
        }
        f(&mut self.draft);
        self.changed();
    }

    fn changed(&mut self) {
        if self.revalidate {
            self.errors = validation::validate(&self.draft).err().unwrap_or_default();
        }
    }

    /// Validates the draft and, when it passes, moves to `Submitting` and
    /// hands back the draft that will be posted.
    pub fn begin_submit(&mut self) -> Result<ReviewDraft, SubmitError> {
        match self.state {
            DialogState::Submitting => return Err(SubmitError::InProgress),
            DialogState::Closed => return Err(SubmitError::Closed),
            DialogState::Editing => {}
        }

        self.revalidate = true;
        self.submit_error = None;
        if let Err(errors) = validation::validate(&self.draft) {
            log!("[REVIEW FORM] Submit blocked: {} invalid field(s)", errors.len());
            self.errors = errors.clone();
            return Err(SubmitError::Invalid(errors));
        }

        self.errors = ValidationErrors::default();
        self.state = DialogState::Submitting;
        Ok(self.draft.clone())
    }

    /// Posts the pending draft to `sink`, then resets the form and closes it.
    /// If the sink refuses the record the form goes back to `Editing` with the
    /// error kept for display.
    pub fn complete_submit<S: ReviewSink>(
        &mut self,
        sink: &mut S,
        created_at: DateTime<Utc>,
    ) -> Result<ReviewRecord, SubmissionError> {
        if self.state != DialogState::Submitting {
            return Err(SubmissionError::NotSubmitting);
        }

        match sink.append(&self.draft, created_at) {
            Ok(record) => {
                log!("[REVIEW FORM] Posted review {} by {}", record.id, record.name);
                self.reset();
                self.state = DialogState::Closed;
                Ok(record)
            }
            Err(e) => {
                let e = SubmissionError::from(e);
                error!("[REVIEW FORM] Submission failed: {}", e);
                self.submit_error = Some(e.clone());
                self.state = DialogState::Editing;
                Err(e)
            }
        }
    }

    /// Closes the dialog without posting. Returns false while a submission
    /// is pending, in which case nothing changes.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            DialogState::Submitting => false,
            DialogState::Editing | DialogState::Closed => {
                self.state = DialogState::Closed;
                true
            }
        }
    }

    fn reset(&mut self) {
        self.draft = ReviewDraft::default();
        self.errors = ValidationErrors::default();
        self.submit_error = None;
        self.revalidate = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockReviews;

    struct BrokenSink;

    impl ReviewSink for BrokenSink {
        fn append(&mut self, _: &ReviewDraft, _: DateTime<Utc>) -> Result<ReviewRecord, SinkError> {
            Err(SinkError::Unavailable)
        }
    }

    fn filled_form() -> ReviewForm {
        let mut form = ReviewForm::new();
        form.set_name("Ann".into());
        form.set_rating(Some(4));
        form.set_review("Great product".into());
        form.set_email("ann@example.com".into());
        form
    }

    #[test]
    fn test_valid_submit_appends_resets_and_closes() {
        let mut sink = MockReviews::default();
        let mut form = filled_form();

        let draft = form.begin_submit().unwrap();
        assert_eq!(draft.name, "Ann");
        assert_eq!(form.state(), DialogState::Submitting);

        let record = form.complete_submit(&mut sink, Utc::now()).unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(record.rating, 4);
        assert_eq!(record.message, "Great product");
        assert_eq!(record.name, "Ann");
        assert_eq!(record.helpful, 0);
        assert!(record.users.is_empty());
        assert!(record.reply_comment.is_empty());

        assert_eq!(form.state(), DialogState::Closed);
        assert_eq!(form.draft(), &ReviewDraft::default());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_invalid_submit_keeps_editing_and_shows_errors() {
        let mut form = ReviewForm::new();
        form.set_name("Ann".into());
        form.set_email("not-an-email".into());

        let err = form.begin_submit().unwrap_err();
        assert!(matches!(err, SubmitError::Invalid(ref errors) if errors.len() == 3));
        assert_eq!(form.state(), DialogState::Editing);
        assert_eq!(form.error(Field::Email), Some(&FieldError::InvalidFormat(Field::Email)));
        assert_eq!(form.error(Field::Review), Some(&FieldError::MissingField(Field::Review)));
        assert!(matches!(form.error(Field::Rating), Some(FieldError::BelowMinimum { .. })));
        assert_eq!(form.error(Field::Name), None);

        // The sink is never reached while the draft is invalid.
        let mut sink = MockReviews::default();
        assert_eq!(
            form.complete_submit(&mut sink, Utc::now()),
            Err(SubmissionError::NotSubmitting)
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn test_errors_hidden_until_first_submit() {
        let mut form = ReviewForm::new();
        form.set_email("nope".into());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_changes_revalidate_after_failed_submit() {
        let mut form = filled_form();
        form.set_email("nope".into());
        assert!(form.begin_submit().is_err());
        assert!(form.error(Field::Email).is_some());

        form.set_email("ann@example.com".into());
        assert!(form.errors().is_empty());

        form.set_name(String::new());
        assert_eq!(form.error(Field::Name), Some(&FieldError::MissingField(Field::Name)));
    }

    #[test]
    fn test_double_submit_is_rejected() {
        let mut sink = MockReviews::default();
        let mut form = filled_form();

        assert!(form.begin_submit().is_ok());
        assert_eq!(form.begin_submit(), Err(SubmitError::InProgress));

        form.complete_submit(&mut sink, Utc::now()).unwrap();
        assert_eq!(form.complete_submit(&mut sink, Utc::now()), Err(SubmissionError::NotSubmitting));
        assert_eq!(form.begin_submit(), Err(SubmitError::Closed));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_cancel_discards_without_append() {
        let sink = MockReviews::default();
        let mut form = filled_form();

        assert!(form.cancel());
        assert_eq!(form.state(), DialogState::Closed);
        assert!(sink.is_empty());
        assert_eq!(form.begin_submit(), Err(SubmitError::Closed));
    }

    #[test]
    fn test_edits_ignored_while_submitting() {
        let mut sink = MockReviews::default();
        let mut form = filled_form();
        form.begin_submit().unwrap();

        form.set_name(String::new());
        assert_eq!(form.draft().name, "Ann");

        let record = form.complete_submit(&mut sink, Utc::now()).unwrap();
        assert_eq!(record.name, "Ann");
    }

    #[test]
    fn test_cancel_ignored_while_submitting() {
        let mut form = filled_form();
        form.begin_submit().unwrap();

        assert!(!form.cancel());
        assert_eq!(form.state(), DialogState::Submitting);
    }

    #[test]
    fn test_sink_failure_is_surfaced() {
        let mut form = filled_form();
        form.begin_submit().unwrap();

        let err = form.complete_submit(&mut BrokenSink, Utc::now()).unwrap_err();
        assert_eq!(err, SubmissionError::Sink(SinkError::Unavailable));
        assert_eq!(form.state(), DialogState::Editing);
        assert_eq!(form.submit_error(), Some(&err));
        assert_eq!(form.draft().name, "Ann");

        // A retry clears the surfaced error.
        let mut sink = MockReviews::default();
        form.begin_submit().unwrap();
        assert_eq!(form.submit_error(), None);
        assert!(form.complete_submit(&mut sink, Utc::now()).is_ok());
    }

    #[test]
    fn test_rating_clamped_to_stars() {
        let mut form = ReviewForm::new();
        form.set_rating(Some(9));
        assert_eq!(form.draft().rating, Some(5));
        form.set_rating(Some(0));
        assert_eq!(form.draft().rating, None);
        assert!(form.begin_submit().is_err());
        assert!(matches!(form.error(Field::Rating), Some(FieldError::BelowMinimum { .. })));
    }
}
