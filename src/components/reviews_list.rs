use leptos::*;

use crate::models::review::ReviewRecord;
use crate::store::ReviewStore;
use crate::validation::MAX_RATING;

pub fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(MAX_RATING));
    let empty = usize::from(MAX_RATING) - filled;
    "★".repeat(filled) + &"☆".repeat(empty)
}

/// Newest reviews first.
#[component]
pub fn ReviewsList(store: ReviewStore) -> impl IntoView {
    view! {
        <div class="reviews-list">
            <h3>{ "Reviews" }</h3>
            <ul>
                {move || store.with(|reviews| {
                    reviews.iter().rev().map(|review| view! {
                        <ReviewItem review=review.clone() />
                    }).collect::<Vec<_>>()
                })}
            </ul>
        </div>
    }
}

#[component]
fn ReviewItem(review: ReviewRecord) -> impl IntoView {
    let posted = review.created_at.format("%d %b %Y").to_string();

    view! {
        <li class="review" data-review-id={review.id.to_string()}>
            <div>
                <strong>{ review.name.clone() }</strong>
                <span class="review-date">{ posted }</span>
            </div>
            <div class="review-rating">{ stars(review.rating) }</div>
            <p>{ review.message.clone() }</p>
            <small>{ format!("Helpful ({})", review.helpful) }</small>
            <ul class="review-replies">
                {review.reply_comment.iter().map(|reply| {
                    let tag = reply.tag_user.as_ref().map(|name| format!("@{} ", name)).unwrap_or_default();
                    view! {
                        <li>{ tag + &reply.message }</li>
                    }
                }).collect::<Vec<_>>()}
            </ul>
        </li>
    }
}
