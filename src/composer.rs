use crate::attachment::PickedFile;
use crate::config::VOICE_LABEL;
use crate::grouping::duration_label;
use crate::recorder::{VoiceClip, VoiceRecorder};
use crate::state::MessageDraft;
use leptos::ev::KeyboardEvent;
use leptos::leptos_dom::helpers::IntervalHandle;
use leptos::logging::{error, log};
use leptos::*;
use std::time::Duration;

/// Microphone state. `Starting` covers the permission prompt, during which
/// further record clicks are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mic {
    Idle,
    Starting,
    Recording,
}

impl Mic {
    fn begin(&mut self) -> bool {
        if *self != Mic::Idle {
            return false;
        }
        *self = Mic::Starting;
        true
    }

    /// False when the start was abandoned while waiting.
    fn started(&mut self) -> bool {
        if *self != Mic::Starting {
            return false;
        }
        *self = Mic::Recording;
        true
    }
}

const EMOJI: [&str; 16] = [
    "😀", "😂", "😍", "😎", "🤔", "😢", "😡", "👍", "👎", "👋", "🙏", "🎉", "🔥", "❤️", "🚀",
    "✅",
];

#[component]
pub fn Composer(#[prop(into)] on_send: Callback<MessageDraft>) -> impl IntoView {
    let (text, set_text) = create_signal(String::new());
    let (show_emoji, set_show_emoji) = create_signal(false);
    let (mic, set_mic) = create_signal(Mic::Idle);
    let recording = move || mic.get() == Mic::Recording;
    let (elapsed, set_elapsed) = create_signal(0u32);
    let (clip, set_clip) = create_signal(None::<VoiceClip>);
    let recorder = store_value(None::<VoiceRecorder>);
    let ticker = store_value(None::<IntervalHandle>);
    let input = create_node_ref::<html::Textarea>();
    let file_input = create_node_ref::<html::Input>();

    let stop_ticker = move || {
        if let Some(Some(handle)) = ticker.try_update_value(Option::take) {
            handle.clear();
        }
    };

    on_cleanup(move || {
        stop_ticker();
        // dropping the recorder releases the microphone
        recorder.try_update_value(Option::take);
        if let Some(Some(clip)) = clip.try_get_untracked() {
            clip.discard();
        }
    });

    let focus = move || {
        if let Some(input) = input.get_untracked() {
            let _ = input.focus();
        }
    };

    let send = move || {
        if let Some(clip) = clip.get_untracked() {
            on_send.call(MessageDraft::voice(clip.url, clip.duration_secs).with_text(VOICE_LABEL));
            set_clip.set(None);
            set_elapsed.set(0);
            return;
        }
        let draft = MessageDraft::text(text.get_untracked().trim());
        if !draft.is_sendable() {
            return;
        }
        on_send.call(draft);
        set_text.set(String::new());
        set_show_emoji.set(false);
        focus();
    };

    let on_keydown = move |ev: KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            send();
        }
    };

    let start_recording = move |_| {
        if !set_mic.try_update(Mic::begin).unwrap_or(false) {
            return;
        }
        spawn_local(async move {
            match VoiceRecorder::start().await {
                Ok(started) => {
                    // abandoned or unmounted while waiting: the returned recorder is dropped here
                    if !set_mic.try_update(Mic::started).unwrap_or(false) {
                        return;
                    }
                    if recorder.try_set_value(Some(started)).is_some() {
                        return;
                    }
                    log!("Recording started");
                    set_elapsed.set(0);
                    stop_ticker();
                    let tick = move || {
                        if let Some(Some(secs)) =
                            recorder.try_with_value(|r| r.as_ref().map(VoiceRecorder::elapsed_secs))
                        {
                            set_elapsed.set(secs);
                        }
                    };
                    match set_interval_with_handle(tick, Duration::from_secs(1)) {
                        Ok(handle) => ticker.set_value(Some(handle)),
                        Err(err) => error!("Could not start recording timer {err:?}"),
                    }
                }
                Err(err) => {
                    set_mic.try_set(Mic::Idle);
                    error!("{err}");
                }
            }
        });
    };

    let stop_recording = move |_| {
        stop_ticker();
        set_mic.set(Mic::Idle);
        let Some(Some(active)) = recorder.try_update_value(Option::take) else {
            return;
        };
        spawn_local(async move {
            match active.stop().await {
                Ok(finished) => {
                    set_elapsed.set(finished.duration_secs);
                    if let Some(Some(unused)) = set_clip.try_set(Some(finished)) {
                        unused.discard();
                    }
                }
                Err(err) => error!("{err}"),
            }
        });
    };

    let cancel_recording = move |_| {
        stop_ticker();
        set_mic.set(Mic::Idle);
        if let Some(Some(active)) = recorder.try_update_value(Option::take) {
            active.cancel();
        }
        if let Some(previous) = clip.get_untracked() {
            previous.discard();
        }
        set_clip.set(None);
        set_elapsed.set(0);
    };

    let pick_file = move |_| {
        if let Some(file_input) = file_input.get_untracked() {
            file_input.click();
        }
    };

    let on_file = move |ev| {
        let target = event_target::<web_sys::HtmlInputElement>(&ev);
        if let Some(file) = target.files().and_then(|files| files.get(0)) {
            match PickedFile::from_file(&file) {
                Ok(picked) => on_send.call(picked.into_draft()),
                Err(err) => error!("{err}"),
            }
        }
        target.set_value("");
    };

    let can_send = move || !text.with(|text| text.trim().is_empty()) || clip.with(Option::is_some);

    view! {
        <div class="relative w-full">
            <Show when=move || show_emoji.get()>
                <div class="absolute bottom-full left-4 mb-2 z-50 grid grid-cols-8 gap-1 p-2 bg-white dark:bg-gray-800 rounded-lg shadow-lg">
                    {EMOJI
                        .iter()
                        .map(|emoji| {
                            let emoji = *emoji;
                            view! {
                                <button
                                    type="button"
                                    class="text-xl p-1 rounded hover:bg-gray-100 dark:hover:bg-gray-700"
                                    on:click=move |_| {
                                        set_text.update(|text| text.push_str(emoji));
                                        focus();
                                    }
                                >
                                    {emoji}
                                </button>
                            }
                        })
                        .collect::<Vec<_>>()}
                </div>
            </Show>
            {move || {
                clip.get()
                    .filter(|_| !recording())
                    .map(|clip| {
                        view! {
                            <div class="flex items-center gap-3 px-5 py-2 bg-white dark:bg-gray-800 border-t border-gray-200 dark:border-gray-700">
                                <audio src=clip.url controls class="h-8 flex-1" />
                                <button
                                    type="button"
                                    class="p-1 text-red-600 hover:bg-red-100 rounded"
                                    on:click=cancel_recording
                                >
                                    "✕"
                                </button>
                            </div>
                        }
                    })
            }}
            <div class="flex items-end gap-2 px-3 py-2 bg-gray-50 dark:bg-gray-700">
                {move || {
                    if recording() {
                        view! {
                            <div class="flex-1 flex items-center gap-3 px-3 py-2 bg-red-100 dark:bg-red-900/30 rounded-xl">
                                <span class="h-2.5 w-2.5 rounded-full bg-red-600 animate-pulse" />
                                <span class="text-sm font-medium text-red-600">
                                    {move || duration_label(elapsed.get())}
                                </span>
                                <span class="text-xs text-gray-500 dark:text-gray-400">
                                    "Recording..."
                                </span>
                                <div class="flex-1" />
                                <button
                                    type="button"
                                    class="p-1.5 text-gray-500 hover:text-red-600 rounded"
                                    on:click=cancel_recording
                                >
                                    "✕"
                                </button>
                                <button
                                    type="button"
                                    class="p-1.5 bg-red-600 text-white rounded-lg"
                                    on:click=stop_recording
                                >
                                    "■"
                                </button>
                            </div>
                        }
                        .into_view()
                    } else {
                        view! {
                            <button
                                type="button"
                                class="p-2 text-gray-500 rounded-lg cursor-pointer hover:text-gray-900 hover:bg-gray-100 dark:text-gray-400 dark:hover:text-white dark:hover:bg-gray-600"
                                on:click=move |_| set_show_emoji.update(|show| *show = !*show)
                            >
                                "😊"
                                <span class="sr-only">Add emoji</span>
                            </button>
                            <button
                                type="button"
                                class="p-2 text-gray-500 rounded-lg cursor-pointer hover:text-gray-900 hover:bg-gray-100 dark:text-gray-400 dark:hover:text-white dark:hover:bg-gray-600"
                                on:click=pick_file
                            >
                                "📎"
                                <span class="sr-only">Attach file</span>
                            </button>
                            <input
                                node_ref=file_input
                                type="file"
                                class="hidden"
                                accept="image/*,.pdf,.doc,.docx,.txt,.zip"
                                on:change=on_file
                            />
                            <label for="chat" class="sr-only">
                                Your message
                            </label>
                            <textarea
                                id="chat"
                                node_ref=input
                                rows="1"
                                class="block p-2.5 w-full text-sm text-gray-900 bg-white rounded-lg border border-gray-300 focus:ring-blue-500 focus:border-blue-500 dark:bg-gray-800 dark:border-gray-600 dark:placeholder-gray-400 dark:text-white resize-none max-h-32"
                                placeholder="Type a message..."
                                prop:value=move || text.get()
                                on:input=move |ev| set_text.set(event_target_value(&ev))
                                on:keydown=on_keydown
                            ></textarea>
                            {move || {
                                if can_send() {
                                    view! {
                                        <button
                                            type="button"
                                            class="inline-flex justify-center p-2 text-blue-600 rounded-full cursor-pointer hover:bg-blue-100 dark:text-blue-500 dark:hover:bg-gray-600"
                                            on:click=move |_| send()
                                        >
                                            "➤"
                                            <span class="sr-only">Send message</span>
                                        </button>
                                    }
                                } else {
                                    view! {
                                        <button
                                            type="button"
                                            class="inline-flex justify-center p-2 text-gray-500 rounded-full cursor-pointer hover:bg-gray-100 dark:text-gray-400 dark:hover:bg-gray-600"
                                            disabled=move || mic.get() == Mic::Starting
                                            on:click=start_recording
                                        >
                                            "🎤"
                                            <span class="sr-only">Record voice message</span>
                                        </button>
                                    }
                                }
                            }}
                        }
                        .into_view()
                    }
                }}
            </div>
        </div>
    }
}
