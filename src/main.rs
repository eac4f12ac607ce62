mod app;
mod attachment;
mod composer;
mod config;
mod conversation;
mod grouping;
mod message;
mod nav;
mod recorder;
mod seed;
mod state;
mod store;

use app::*;
use leptos::*;

fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(|| {
        view! { <App /> }
    })
}
