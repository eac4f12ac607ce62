use crate::config::ChatConfig;
use crate::conversation::Conversation;
use crate::nav::Nav;
use crate::seed;
use crate::state::MessageDraft;
use crate::store::ChatStore;
use chrono::Utc;
use leptos::leptos_dom::helpers::TimeoutHandle;
use leptos::logging::{log, warn};
use leptos::*;

/// Keeps a single timeout armed for the earliest pending status transition.
fn arm_status_timer(store: RwSignal<ChatStore>, timer: StoredValue<Option<TimeoutHandle>>) {
    if let Some(Some(handle)) = timer.try_update_value(Option::take) {
        handle.clear();
    }
    let Some(deadline) = store.with_untracked(|store| store.next_deadline()) else {
        return;
    };
    let delay = (deadline - Utc::now()).to_std().unwrap_or_default();
    let fire = move || {
        store.update(|store| {
            store.apply_due(Utc::now());
        });
        arm_status_timer(store, timer);
    };
    match set_timeout_with_handle(fire, delay) {
        Ok(handle) => timer.set_value(Some(handle)),
        Err(err) => warn!("Could not arm status timer {err:?}"),
    }
}

#[component]
pub fn App() -> impl IntoView {
    let search = window().location().search().unwrap_or_default();
    let (config, errors) = ChatConfig::from_search(&search);
    for err in errors {
        warn!("{err}");
    }
    let store = create_rw_signal(ChatStore::new(config, seed::load()));
    provide_context(store);

    let timer = store_value(None::<TimeoutHandle>);
    on_cleanup(move || {
        if let Some(Some(handle)) = timer.try_update_value(Option::take) {
            handle.clear();
        }
    });

    let on_send = Callback::new(move |draft: MessageDraft| {
        let sent = store.try_update(|store| store.send(draft, Utc::now())).flatten();
        if let Some(id) = sent {
            let kind = store.with_untracked(|store| store.message(id).map(|m| m.kind()));
            log!("Sent {id} {kind:?}");
            arm_status_timer(store, timer);
        }
    });

    view! {
        <div class="flex flex-row h-dvh max-h-dvh w-full overflow-hidden">
            <Nav />
            <Conversation on_send />
        </div>
    }
}
