use leptos::logging::warn;
use leptos::Owner;

/// Runs `f` under `owner`, usually captured before an async hop.
/// Returns None and logs when the owner is missing or has been disposed,
/// e.g. the review dialog unmounted while its submission was pending.
pub fn with_owner_safe<F, R>(owner: Option<Owner>, log_context: &str, f: F) -> Option<R>
where
    F: FnOnce() -> R,
{
    match owner {
        Some(owner) => match leptos::try_with_owner(owner, f) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("[OWNER] Owner gone for {}: {:?}", log_context, e);
                None
            }
        },
        None => {
            warn!("[OWNER] No Leptos owner in context: {}", log_context);
            None
        }
    }
}
