use crate::composer::Composer;
use crate::grouping::group_by_day;
use crate::message::{Message, Msg};
use crate::nav::Avatar;
use crate::state::{MessageDraft, MessageId, MessageStatus};
use crate::store::ChatStore;
use chrono::{Local, NaiveDate, TimeZone};
use leptos::*;
use web_sys::{ScrollBehavior, ScrollIntoViewOptions};

/// A day of the active thread. Keyed by its first message so the group node
/// survives new messages and status changes.
#[derive(Debug, Clone, PartialEq)]
struct Group {
    key: MessageId,
    label: String,
    messages: Vec<Msg>,
}

fn thread<Tz: TimeZone>(store: &ChatStore, tz: &Tz, today: NaiveDate) -> Vec<Group> {
    group_by_day(store.active_messages(), tz, today)
        .into_iter()
        .filter_map(|group| {
            let key = group.messages.first()?.id;
            Some(Group {
                key,
                label: group.label,
                messages: group
                    .messages
                    .into_iter()
                    .map(|message| Msg {
                        message: message.clone(),
                        is_me: store.is_mine(message),
                    })
                    .collect(),
            })
        })
        .collect()
}

fn status_of(groups: &[Group], id: MessageId) -> Option<MessageStatus> {
    groups
        .iter()
        .flat_map(|group| &group.messages)
        .find(|msg| msg.message.id == id)
        .map(|msg| msg.message.status)
}

#[component]
pub fn Conversation(#[prop(into)] on_send: Callback<MessageDraft>) -> impl IntoView {
    let store = expect_context::<RwSignal<ChatStore>>();
    let bottom = create_node_ref::<html::Div>();

    // Memos only notify on a real change, so sidebar search keystrokes do not
    // touch the thread.
    let groups = create_memo(move |_| {
        store.with(|store| thread(store, &Local, Local::now().date_naive()))
    });
    let other = create_memo(move |_| store.with(|store| store.other_participant().cloned()));
    let tail = create_memo(move |_| {
        store.with(|store| (store.active_id().clone(), store.active_messages().len()))
    });

    // Follow the newest message.
    create_effect(move |_| {
        tail.with(|_| ());
        request_animation_frame(move || {
            if let Some(bottom) = bottom.get_untracked() {
                let options = ScrollIntoViewOptions::new();
                options.set_behavior(ScrollBehavior::Smooth);
                bottom.scroll_into_view_with_scroll_into_view_options(&options);
            }
        });
    });

    view! {
        <div class="h-dvh max-h-dvh grow flex flex-col lg:w-4/5 w-screen max-w-screen bg-gray-50 dark:bg-gray-900">
            {move || {
                other
                    .get()
                    .map(|other| {
                        let status = if other.online { "Online" } else { "Offline" };
                        let name = other.name.clone();
                        view! {
                            <header class="flex items-center gap-3 px-5 py-3 border-b border-gray-200 dark:border-gray-700 dark:text-white">
                                <Avatar user=other />
                                <div>
                                    <h2 class="font-semibold text-sm">{name}</h2>
                                    <p class="text-xs text-gray-500 dark:text-gray-400">{status}</p>
                                </div>
                            </header>
                        }
                    })
            }}
            <main class="grow overflow-y-auto px-5 py-4">
                <For
                    each=move || groups.get()
                    key=|group| group.key
                    children=move |group| {
                        let key = group.key;
                        let messages = move || {
                            groups
                                .with(|groups| {
                                    groups.iter().find(|g| g.key == key).map(|g| g.messages.clone())
                                })
                                .unwrap_or_default()
                        };
                        view! {
                            <div>
                                <div class="flex justify-center my-3">
                                    <span class="bg-white dark:bg-gray-800 text-gray-500 dark:text-gray-400 text-[11px] font-medium px-3 py-1 rounded-full shadow-sm">
                                        {group.label}
                                    </span>
                                </div>
                                // Keyed by id only: a status change updates the ticks in place
                                // and leaves media elements playing.
                                <For
                                    each=messages
                                    key=|msg| msg.message.id
                                    children=move |msg| {
                                        let id = msg.message.id;
                                        let initial = msg.message.status;
                                        let status = Signal::derive(move || {
                                            groups.with(|groups| status_of(groups, id)).unwrap_or(initial)
                                        });
                                        view! { <Message message=msg status /> }
                                    }
                                />
                            </div>
                        }
                    }
                />
                <div node_ref=bottom />
            </main>
            <Composer on_send />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChatConfig;
    use crate::seed;
    use chrono::{TimeDelta, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 16).unwrap()
    }

    fn keys(groups: &[Group]) -> Vec<(MessageId, Vec<MessageId>)> {
        groups
            .iter()
            .map(|g| (g.key, g.messages.iter().map(|m| m.message.id).collect()))
            .collect()
    }

    #[test]
    fn search_leaves_the_thread_unchanged() {
        let mut store = ChatStore::new(ChatConfig::default(), seed::load());
        let before = thread(&store, &Utc, today());
        store.set_search("zz");
        assert_eq!(thread(&store, &Utc, today()), before);
    }

    #[test]
    fn status_change_keeps_every_key() {
        let mut store = ChatStore::new(ChatConfig::default(), seed::load());
        let now = Utc::now();
        let id = store
            .send(MessageDraft::voice("blob:clip", 4).with_text("🎤 Voice message"), now)
            .unwrap();
        let sent = thread(&store, &Utc, today());
        assert_eq!(status_of(&sent, id), Some(MessageStatus::Sent));

        store.apply_due(now + TimeDelta::milliseconds(1000));
        let delivered = thread(&store, &Utc, today());
        assert_ne!(delivered, sent);
        assert_eq!(keys(&delivered), keys(&sent));
        assert_eq!(status_of(&delivered, id), Some(MessageStatus::Delivered));
    }

    #[test]
    fn group_keys_are_unique() {
        let store = ChatStore::new(ChatConfig::default(), seed::load());
        let groups = thread(&store, &Utc, today());
        assert!(!groups.is_empty());
        let mut seen: Vec<_> = groups.iter().map(|g| g.key).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), groups.len());
        assert!(groups.iter().all(|g| g.messages[0].message.id == g.key));
    }
}
