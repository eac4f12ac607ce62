use crate::attachment::format_size;
use crate::grouping::{clock_label, duration_label};
use crate::state::{FileRef, Message as ChatMsg, MessageStatus, Payload};
use leptos::logging::warn;
use leptos::IntoView;
use leptos::*;
use pulldown_cmark::{CowStr, Event, Parser, Tag, TagEnd};

#[derive(Debug, Clone, PartialEq)]
pub struct Msg {
    pub message: ChatMsg,
    pub is_me: bool,
}

fn is_web_url(dest: &str) -> bool {
    url::Url::parse(dest).map_or(false, |url| matches!(url.scheme(), "http" | "https"))
}

/// A block shown as its source lines, one paragraph with line breaks.
fn push_source<'a>(events: &mut Vec<Event<'a>>, source: &'a str) {
    events.push(Event::Start(Tag::Paragraph));
    for (i, line) in source.trim_end().lines().enumerate() {
        if i > 0 {
            events.push(Event::HardBreak);
        }
        events.push(Event::Text(CowStr::Borrowed(line)));
    }
    events.push(Event::End(TagEnd::Paragraph));
}

/// Inline markdown to html. Line breaks are kept, block syntax such as
/// headings, lists and quotes is shown as typed, raw html is shown as text and
/// only http(s) links and images survive.
pub fn render_markdown(text: &str) -> String {
    let mut events = vec![];
    let mut block_end = None;
    let mut links = vec![];
    for (event, range) in Parser::new(text).into_offset_iter() {
        if let Some(end) = block_end {
            if range.end <= end {
                continue;
            }
            block_end = None;
        }
        match event {
            Event::Start(Tag::Link { ref dest_url, .. } | Tag::Image { ref dest_url, .. }) => {
                let keep = is_web_url(dest_url);
                links.push(keep);
                if keep {
                    events.push(event);
                }
            }
            Event::End(TagEnd::Link | TagEnd::Image) => {
                if links.pop().unwrap_or(false) {
                    events.push(event);
                }
            }
            Event::Start(Tag::Paragraph | Tag::Emphasis | Tag::Strong | Tag::Strikethrough) => {
                events.push(event)
            }
            Event::Start(_) => {
                block_end = Some(range.end);
                push_source(&mut events, &text[range]);
            }
            Event::Rule => push_source(&mut events, &text[range]),
            Event::SoftBreak => events.push(Event::HardBreak),
            Event::Html(html) | Event::InlineHtml(html) => events.push(Event::Text(html)),
            event => events.push(event),
        }
    }
    let mut parsed = String::new();
    pulldown_cmark::html::push_html(&mut parsed, events.into_iter());
    parsed
}

#[component]
fn StatusTicks(#[prop(into)] status: Signal<MessageStatus>) -> impl IntoView {
    let ticks = move || match status.get() {
        MessageStatus::Sent => ("✓", "opacity-60"),
        MessageStatus::Delivered => ("✓✓", "opacity-60"),
        MessageStatus::Read => ("✓✓", "text-sky-300"),
    };
    view! { <span class=move || format!("text-[10px] {}", ticks().1)>{move || ticks().0}</span> }
}

#[component]
fn VoiceBubble(url: String, duration_secs: u32) -> impl IntoView {
    let audio = create_node_ref::<html::Audio>();
    let (playing, set_playing) = create_signal(false);
    let toggle = move |_| {
        let Some(audio) = audio.get() else {
            return;
        };
        if playing.get_untracked() {
            if let Err(err) = audio.pause() {
                warn!("Pause failed {err:?}");
            }
            set_playing.set(false);
        } else {
            match audio.play() {
                Ok(_) => set_playing.set(true),
                Err(err) => warn!("Play failed {err:?}"),
            }
        }
    };
    view! {
        <div class="flex items-center gap-2 min-w-[180px]">
            <button
                type="button"
                class="flex-shrink-0 h-8 w-8 rounded-full bg-white/20 flex items-center justify-center"
                on:click=toggle
            >
                {move || if playing.get() { "⏸" } else { "▶" }}
            </button>
            <div class="flex-1 h-1 bg-white/30 rounded-full overflow-hidden">
                <div class="h-full w-1/3 bg-white/60 rounded-full" />
            </div>
            <span class="text-[10px] opacity-70">{duration_label(duration_secs)}</span>
            <audio node_ref=audio src=url on:ended=move |_| set_playing.set(false) />
        </div>
    }
}

#[component]
fn FileBubble(file: FileRef) -> impl IntoView {
    let name = if file.name.is_empty() {
        "File".to_owned()
    } else {
        file.name
    };
    let download = name.clone();
    view! {
        <a class="flex items-center gap-2" href=file.url download=download>
            <div class="h-10 w-10 rounded-lg bg-white/20 flex items-center justify-center flex-shrink-0">
                "📄"
            </div>
            <div class="min-w-0">
                <p class="text-sm font-medium truncate">{name}</p>
                <p class="text-[10px] opacity-70">{format_size(file.size)}</p>
            </div>
        </a>
    }
}

#[component]
fn ImageBubble(file: FileRef) -> impl IntoView {
    let caption = file.name;
    let alt = if caption.is_empty() {
        "Image".to_owned()
    } else {
        caption.clone()
    };
    let has_caption = !caption.is_empty();
    view! {
        <div class="max-w-[240px]">
            <img src=file.url alt=alt class="rounded-lg w-full object-cover" />
            <Show when=move || has_caption>
                <p class="text-[10px] mt-1 opacity-70">{caption.clone()}</p>
            </Show>
        </div>
    }
}

#[component]
pub fn Message(message: Msg, #[prop(into)] status: Signal<MessageStatus>) -> impl IntoView {
    let Msg { message, is_me } = message;
    let datemsg = clock_label(message.timestamp);
    let body = match message.payload {
        Payload::Voice { url, duration_secs } => {
            view! { <VoiceBubble url duration_secs /> }.into_view()
        }
        Payload::File(file) => view! { <FileBubble file /> }.into_view(),
        Payload::Image(file) => view! { <ImageBubble file /> }.into_view(),
        Payload::Text => {
            let parsed = render_markdown(message.text.as_deref().unwrap_or_default());
            view! {
                <div class="text-sm leading-relaxed break-words" inner_html=parsed />
            }
            .into_view()
        }
    };
    view! {
        <div class="flex mb-1" class=("justify-end", is_me) class=("justify-start", !is_me)>
            <div
                class="max-w-[65%] px-3 py-2 rounded-2xl"
                class=("bg-blue-600", is_me)
                class=("text-white", is_me)
                class=("rounded-br-md", is_me)
                class=("bg-white", !is_me)
                class=("dark:bg-gray-700", !is_me)
                class=("dark:text-white", !is_me)
                class=("rounded-bl-md", !is_me)
                class=("shadow-sm", !is_me)
            >
                {body}
                <div class="flex items-center gap-1 mt-1" class=("justify-end", is_me)>
                    <span class="text-[10px] opacity-50">{datemsg}</span>
                    <Show when=move || is_me>
                        <StatusTicks status />
                    </Show>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::render_markdown;

    #[test]
    fn test_markdown() {
        assert_eq!(render_markdown("hello world"), "<p>hello world</p>\n");
        assert_eq!(
            render_markdown("**done** with `rustc`"),
            "<p><strong>done</strong> with <code>rustc</code></p>\n"
        );
    }

    #[test]
    fn raw_html_is_escaped() {
        let inline = render_markdown("a <b>bold</b> move");
        assert!(!inline.contains("<b>"));
        assert!(inline.contains("&lt;b&gt;"));

        let block = render_markdown("<script>alert(1)</script>");
        assert!(!block.contains("<script>"));
        assert!(block.contains("&lt;script&gt;"));
    }

    #[test]
    fn line_breaks_are_kept() {
        assert_eq!(
            render_markdown("line one\nline two"),
            "<p>line one<br />\nline two</p>\n"
        );
    }

    #[test]
    fn block_syntax_is_shown_as_typed() {
        assert_eq!(render_markdown("# not a heading"), "<p># not a heading</p>\n");
        assert_eq!(render_markdown("- milk\n- eggs"), "<p>- milk<br />\n- eggs</p>\n");
        let quote = render_markdown("> quoted *text*");
        assert!(!quote.contains("<blockquote>"));
        assert!(quote.contains("&gt; quoted *text*"));
    }

    #[test]
    fn only_web_links_survive() {
        assert_eq!(render_markdown("[x](javascript:alert(1))"), "<p>x</p>\n");
        assert!(!render_markdown("<javascript:alert(1)>").contains("href"));
        assert!(!render_markdown("![a](data:image/png;base64,AAAA)").contains("<img"));
        assert_eq!(
            render_markdown("[docs](https://docs.rs)"),
            "<p><a href=\"https://docs.rs\">docs</a></p>\n"
        );
    }
}
