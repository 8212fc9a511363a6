use chrono::Utc;
use gloo_timers::future::TimeoutFuture;
use leptos::ev::SubmitEvent;
use leptos::logging::log;
use leptos::*;

use crate::components::rating_input::RatingInput;
use crate::form::{ReviewForm, ReviewFormConfig};
use crate::store::ReviewStore;
use crate::utils::leptos_owner::with_owner_safe;
use crate::validation::Field;

/// Modal dialog for posting a new product review.
///
/// `on_close` fires after a successful post or when the user cancels
/// (Cancel button, backdrop click or Escape).
/// Posting appends to `store` once the configured delay has passed; the
/// submit button stays disabled until then.
#[component]
pub fn ReviewNewForm(
    #[prop(into)] on_close: Callback<()>,
    store: ReviewStore,
    #[prop(optional)] config: ReviewFormConfig,
) -> impl IntoView {
    let form = create_rw_signal(ReviewForm::new());
    let owner = Owner::current();

    let submitting = move || form.with(|f| f.is_submitting());
    let field_error = move |field: Field| form.with(|f| f.error(field).map(|e| e.to_string()));

    let request_close = move || {
        if form.try_update(|f| f.cancel()).unwrap_or(false) {
            on_close.call(());
        }
    };

    let escape = window_event_listener(ev::keydown, move |e| {
        if e.key() == "Escape" {
            request_close();
        }
    });
    on_cleanup(move || escape.remove());

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();

        match form.try_update(|f| f.begin_submit()) {
            Some(Ok(draft)) => log!("[REVIEW FORM] Posting review by {}", draft.name),
            Some(Err(e)) => {
                log!("[REVIEW FORM] {}", e);
                return;
            }
            None => return,
        }

        let delay = u32::try_from(config.submit_delay.as_millis()).unwrap_or(u32::MAX);
        spawn_local(async move {
            TimeoutFuture::new(delay).await;

            let outcome = with_owner_safe(owner, "review submission", move || {
                let mut store = store;
                form.try_update(|f| f.complete_submit(&mut store, Utc::now()))
            })
            .flatten();

            if let Some(Ok(_)) = outcome {
                on_close.call(());
            }
        });
    };

    view! {
        <div class="review-dialog">
            <div class="dialog-backdrop" on:click=move |_| request_close()></div>
            <div class="dialog" role="dialog" aria-labelledby="review-dialog-title">
                <form on:submit=on_submit>
                    <h3 id="review-dialog-title">{ "Review" }</h3>

                    <div class="dialog-content">
                        <div>
                            <p>{ "Your rating:" }</p>
                            <RatingInput
                                value=Signal::derive(move || form.with(|f| f.draft().rating))
                                on_change={move |rating: Option<u8>| form.update(|f| f.set_rating(rating))}
                                disabled=Signal::derive(submitting)
                            />
                            <FieldErrorText message=Signal::derive(move || field_error(Field::Rating)) />
                        </div>

                        <div>
                            <textarea
                                name="review"
                                rows="3"
                                placeholder="Review *"
                                prop:value=move || form.with(|f| f.draft().review.clone())
                                prop:disabled=submitting
                                on:input=move |e| form.update(|f| f.set_review(event_target_value(&e)))
                            />
                            <FieldErrorText message=Signal::derive(move || field_error(Field::Review)) />
                        </div>

                        <div>
                            <input
                                type="text"
                                name="name"
                                placeholder="Name *"
                                prop:value=move || form.with(|f| f.draft().name.clone())
                                prop:disabled=submitting
                                on:input=move |e| form.update(|f| f.set_name(event_target_value(&e)))
                            />
                            <FieldErrorText message=Signal::derive(move || field_error(Field::Name)) />
                        </div>

                        <div>
                            <input
                                type="text"
                                name="email"
                                placeholder="Email address *"
                                prop:value=move || form.with(|f| f.draft().email.clone())
                                prop:disabled=submitting
                                on:input=move |e| form.update(|f| f.set_email(event_target_value(&e)))
                            />
                            <FieldErrorText message=Signal::derive(move || field_error(Field::Email)) />
                        </div>
                    </div>

                    {move || form.with(|f| f.submit_error().map(|e| e.to_string())).map(|message| view! {
                        <p class="submit-error">{ message }</p>
                    })}

                    <div class="dialog-actions">
                        <button type="button" class="cancel" disabled=submitting on:click=move |_| request_close()>
                            { "Cancel" }
                        </button>
                        <button type="submit" class="post-review" disabled=submitting>
                            {move || if submitting() { "Posting..." } else { "Post Review" }}
                        </button>
                    </div>
                </form>
            </div>
        </div>
    }
}

#[component]
fn FieldErrorText(#[prop(into)] message: Signal<Option<String>>) -> impl IntoView {
    move || message.get().map(|message| view! { <p class="field-error">{ message }</p> })
}
