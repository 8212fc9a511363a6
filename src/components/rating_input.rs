use leptos::*;

use crate::validation::{MAX_RATING, MIN_RATING};

/// Row of star buttons. Clicking the current rating clears it.
#[component]
pub fn RatingInput(
    #[prop(into)] value: Signal<Option<u8>>,
    #[prop(into)] on_change: Callback<Option<u8>>,
    #[prop(into, optional)] disabled: MaybeSignal<bool>,
) -> impl IntoView {
    view! {
        <div class="rating-input" role="radiogroup">
            {(MIN_RATING..=MAX_RATING).map(|star| {
                let disabled = disabled.clone();
                let filled = move || value.get().map_or(false, |v| star <= v);
                view! {
                    <button
                        type="button"
                        class="star"
                        class:filled=filled
                        aria-label={format!("{} star", star)}
                        disabled=move || disabled.get()
                        on:click=move |_| {
                            let next = if value.get_untracked() == Some(star) { None } else { Some(star) };
                            on_change.call(next);
                        }
                    >
                        {move || if filled() { "★" } else { "☆" }}
                    </button>
                }
            }).collect::<Vec<_>>()}
        </div>
    }
}
