use crate::grouping::sidebar_label;
use crate::state::{ConversationId, User};
use crate::store::ChatStore;
use chrono::Local;
use ev::MouseEvent;
use leptos::*;

#[derive(Debug, Clone)]
struct Row {
    id: ConversationId,
    other: User,
    last_message: String,
    time: String,
    unread: u32,
    active: bool,
}

#[component]
pub fn Avatar(user: User, #[prop(optional)] large: bool) -> impl IntoView {
    let size = if large { "w-12 h-12 text-base" } else { "w-10 h-10 text-sm" };
    let dot = if user.online {
        "bg-green-500"
    } else {
        "bg-gray-400"
    };
    view! {
        <div class="relative flex-shrink-0">
            <div class=format!(
                "{size} rounded-full flex items-center justify-center font-semibold text-white bg-sky-600",
            )>{user.initials()}</div>
            <span class=format!(
                "absolute bottom-0 right-0 w-3 h-3 rounded-full border-2 border-white dark:border-gray-900 {dot}",
            )></span>
        </div>
    }
}

#[component]
pub fn Nav() -> impl IntoView {
    let store = expect_context::<RwSignal<ChatStore>>();
    let (show, set_show) = create_signal(true);

    let update_search = move |ev| {
        let search = event_target_value(&ev);
        store.update(|store| store.set_search(search));
    };

    let rows = move || {
        let today = Local::now().date_naive();
        store.with(|store| {
            store
                .filtered_conversations()
                .into_iter()
                .filter_map(|conv| {
                    let other = conv.other(store.local_id())?.clone();
                    Some(Row {
                        id: conv.id.clone(),
                        other,
                        last_message: conv.last_message.clone(),
                        time: sidebar_label(conv.last_message_time, &Local, today),
                        unread: conv.unread_count,
                        active: &conv.id == store.active_id(),
                    })
                })
                .collect::<Vec<_>>()
        })
    };

    view! {
        {move || {
            if show.get() {
                view! { <div /> }
            } else {
                view! {
                    <div
                        class="lg:hidden text-gray-500 dark:text-gray-400 p-5 absolute top-0 left-0 z-10"
                        on:click=move |_| set_show.update(|s| *s = !*s)
                    >
                        <svg viewBox="0 0 10 8" width="20">
                            <path
                                d="M1 1h8M1 4h 8M1 7h8"
                                stroke="currentColor"
                                fill="currentColor"
                                stroke-width="2"
                                stroke-linecap="round"
                            />
                        </svg>
                    </div>
                }
            }
        }}
        <div
            class="lg:w-80 w-full flex-shrink-0 lg:flex flex-col border-e-2 dark:border-gray-800 h-full overflow-hidden dark:text-white"
            class:hidden=move || !show.get()
        >
            <div class="p-4 pb-3">
                <div class="flex flex-row items-center mb-3">
                    <h1 class="text-xl font-bold text-gray-900 dark:text-white w-full">Chats</h1>
                    <div
                        class="lg:hidden text-gray-500 dark:text-gray-400"
                        on:click=move |_| set_show.update(|s| *s = !*s)
                    >
                        <svg viewBox="0 0 10 10" width="20">
                            <path
                                d="M1 1L9 9M1 9L9 1"
                                stroke="currentColor"
                                fill="currentColor"
                                stroke-width="2"
                                stroke-linecap="round"
                            />
                        </svg>
                    </div>
                </div>
                <input
                    type="text"
                    placeholder="Search conversations..."
                    class="w-full bg-gray-100 dark:bg-gray-800 rounded-lg px-3 py-2 text-sm outline-none focus:ring-1 focus:ring-blue-500"
                    prop:value=move || store.with(|store| store.search().to_owned())
                    on:input=update_search
                />
            </div>
            <ul class="grow overflow-y-auto">
                {move || {
                    rows()
                        .into_iter()
                        .map(|row| {
                            let Row { id, other, last_message, time, unread, active } = row;
                            let name = other.name.clone();
                            let onclick = move |ev: MouseEvent| {
                                ev.prevent_default();
                                // Only useful on mobile
                                set_show.set(false);
                                store.update(|store| store.select_conversation(id.clone()));
                            };
                            view! {
                                <li on:click=onclick>
                                    <a
                                        href="#"
                                        class="flex items-center gap-3 px-4 py-3 text-gray-900 dark:text-white hover:bg-gray-100 dark:hover:bg-gray-700"
                                        class=("bg-gray-200", move || active)
                                        class=("dark:bg-gray-800", move || active)
                                    >
                                        <Avatar user=other large=true />
                                        <div class="flex-1 min-w-0">
                                            <div class="flex items-center justify-between">
                                                <span class="font-medium text-sm truncate">
                                                    {name}
                                                </span>
                                                <span class="text-xs text-gray-500 dark:text-gray-400 flex-shrink-0 ml-2">
                                                    {time}
                                                </span>
                                            </div>
                                            <div class="flex items-center justify-between mt-0.5">
                                                <span class="text-xs text-gray-500 dark:text-gray-400 truncate">
                                                    {last_message}
                                                </span>
                                                <Show when=move || { unread > 0 }>
                                                    <span class="ml-2 flex-shrink-0 bg-blue-600 text-white text-[10px] font-bold rounded-full h-5 min-w-5 flex items-center justify-center px-1.5">
                                                        {unread}
                                                    </span>
                                                </Show>
                                            </div>
                                        </div>
                                    </a>
                                </li>
                            }
                        })
                        .collect::<Vec<_>>()
                }}
            </ul>
        </div>
    }
}
