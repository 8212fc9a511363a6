/// Main application entry point for the storefront review pages.
/// Wires the shared review store to the product review page and its dialog.
use leptos::*;
use leptos_meta::*;
use leptos_router::*;

use crate::components::{review_form::ReviewNewForm, reviews_list::{stars, ReviewsList}};
use crate::store::ReviewStore;

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    // Shared by every page for as long as the app runs.
    let store = ReviewStore::seeded();

    view! {
        <Stylesheet id="leptos" href="/pkg/storefront_reviews.css" />
        <Title text="Product reviews" />
        <Router>
            <main>
                <Routes>
                    <Route path="" view=move || view! { <ProductReviews store=store /> } />
                </Routes>
            </main>
        </Router>
    }
}

#[component]
pub fn ProductReviews(store: ReviewStore) -> impl IntoView {
    let (dialog_open, set_dialog_open) = create_signal(false);

    view! {
        <section>
            <h1>{ "Product reviews" }</h1>
            <ReviewSummary store=store />
            <button class="write-review" on:click=move |_| set_dialog_open.set(true)>
                { "Write a review" }
            </button>
            <ReviewsList store=store />
            <Show when=move || dialog_open.get()>
                <ReviewNewForm store=store on_close={move |_: ()| set_dialog_open.set(false)} />
            </Show>
        </section>
    }
}

/// Average rating, review count and per-star breakdown.
#[component]
fn ReviewSummary(store: ReviewStore) -> impl IntoView {
    let average = move || {
        store
            .with(|reviews| reviews.average_rating())
            .map(|avg| format!("{:.1}/5", avg))
            .unwrap_or_else(|| "No reviews yet".to_string())
    };

    view! {
        <div class="review-summary">
            <h2>{ average }</h2>
            <p>{ move || format!("({} reviews)", store.with(|reviews| reviews.len())) }</p>
            <ul>
                {move || {
                    let counts = store.with(|reviews| reviews.rating_counts());
                    counts.iter().enumerate().rev().map(|(i, count)| view! {
                        <li>{ format!("{} {}", stars(i as u8 + 1), count) }</li>
                    }).collect::<Vec<_>>()
                }}
            </ul>
        </div>
    }
}
