// the html! macro failed to build without this
#![recursion_limit = "256"]

use gloo_net::http::Request;
use jukebox_protocol as proto;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;
use tracing::{error, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use yew::prelude::*;

mod session;

use session::{Session, SessionError};

/// Rows rendered beyond this are dropped; the backend is free to return more
/// than anyone will scroll through.
const MAX_RESULTS: usize = 25;

struct Model {
    session: Option<Rc<Session>>,
    query: Rc<str>,
    rows: Vec<Rc<proto::SearchResult>>,
    status: Status,
    now_playing: Option<String>,
}

enum Msg {
    UpdateQuery {
        query: Rc<str>,
    },
    Search,
    SearchFinished {
        result: Result<proto::SearchResponse, FetchError>,
    },
    Select {
        row: Rc<proto::SearchResult>,
    },
    AddFinished {
        result: Result<proto::AddResponse, FetchError>,
    },
    NowPlayingFinished {
        result: Result<proto::NowPlaying, FetchError>,
    },
}

enum Status {
    Idle,
    Searching,
    Found(usize),
    Adding { title: String },
    Redirecting,
    Failed(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => write!(f, "Search for a track to add it to the queue."),
            Status::Searching => write!(f, "Searching..."),
            Status::Found(0) => write!(f, "No results."),
            Status::Found(1) => write!(f, "1 result. Click it to add it to the queue."),
            Status::Found(n) => write!(f, "{} results. Click one to add it to the queue.", n),
            Status::Adding { title } => write!(f, "Requesting payment for {}...", title),
            Status::Redirecting => write!(f, "Taking you to the payment page..."),
            Status::Failed(message) => write!(f, "{}", message),
        }
    }
}

#[derive(Error, Debug)]
enum FetchError {
    #[error("request failed: {0}")]
    Transport(gloo_net::Error),
    #[error("server answered {0}")]
    Status(u16),
    #[error("bad response body: {0}")]
    Body(gloo_net::Error),
}

fn build_url(relative: &str) -> Result<web_sys::Url, JsValue> {
    let base_url = {
        let window = web_sys::window().expect("must have JS window");
        let location = window.location();
        location.href().expect("must have JS location.href")
    };
    web_sys::Url::new_with_base(relative, &base_url)
}

fn build_search_url(session: &Session) -> String {
    let url =
        build_url(&session.search_path()).expect("programmer error: constructed URL is invalid");
    url.to_string()
        .as_string()
        .expect("internal error: bad URL stringification")
}

fn build_add_url(session: &Session, track_id: &str) -> String {
    let url = build_url(&session.add_path()).expect("programmer error: constructed URL is invalid");
    let query = url.search_params();
    query.set("track_id", track_id);
    url.set_search(
        &query
            .to_string()
            .as_string()
            .expect("internal error: bad URL query stringification"),
    );
    url.to_string()
        .as_string()
        .expect("internal error: bad URL stringification")
}

fn build_status_url(session: &Session) -> String {
    let url = build_url(session.status_path()).expect("programmer error: constructed URL is invalid");
    let query = url.search_params();
    query.set("chat_id", session.chat_id());
    url.set_search(
        &query
            .to_string()
            .as_string()
            .expect("internal error: bad URL query stringification"),
    );
    url.to_string()
        .as_string()
        .expect("internal error: bad URL stringification")
}

const JSON: &str = "application/json";

async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, FetchError> {
    // content-type goes out even on bodyless requests, matching the wire
    // contract the backend was built against
    let response = Request::get(url)
        .header("accept", JSON)
        .header("content-type", JSON)
        .send()
        .await
        .map_err(FetchError::Transport)?;
    if response.status() != 200 {
        return Err(FetchError::Status(response.status()));
    }
    response.json::<T>().await.map_err(FetchError::Body)
}

async fn post_json<T: DeserializeOwned>(
    url: &str,
    body: &impl Serialize,
) -> Result<T, FetchError> {
    let buf = serde_json::to_vec(body).expect("JSON serialize of request body must work");
    let arr = js_sys::Uint8Array::from(&buf[..]);
    let response = Request::post(url)
        .header("accept", JSON)
        .header("content-type", JSON)
        .body(arr)
        .send()
        .await
        .map_err(FetchError::Transport)?;
    if response.status() != 200 {
        return Err(FetchError::Status(response.status()));
    }
    response.json::<T>().await.map_err(FetchError::Body)
}

fn navigate_to(url: &str) {
    let window = web_sys::window().expect("must have JS window");
    if let Err(error) = window.location().set_href(url) {
        error!(message = "navigation failed", ?error);
    }
}

fn page_session() -> Result<Session, SessionError> {
    let window = web_sys::window().expect("must have JS window");
    let pathname = window
        .location()
        .pathname()
        .expect("must have JS location.pathname");
    Session::from_pathname(&pathname)
}

/// One immutable record per rendered row, in response order.
fn bind_rows(response: proto::SearchResponse) -> Vec<Rc<proto::SearchResult>> {
    response
        .results
        .into_iter()
        .take(MAX_RESULTS)
        .map(Rc::new)
        .collect()
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let (session, status) = match page_session() {
            Ok(session) => (Some(Rc::new(session)), Status::Idle),
            Err(error) => {
                error!(message = "cannot determine chat from page address", %error);
                (None, Status::Failed(error.to_string()))
            }
        };
        if let Some(session) = &session {
            let url = build_status_url(session);
            ctx.link().send_future(async move {
                let result = get_json::<proto::NowPlaying>(&url).await;
                Msg::NowPlayingFinished { result }
            });
        }
        Self {
            session,
            query: Rc::from(""),
            rows: Vec::new(),
            status,
            now_playing: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::UpdateQuery { query } => {
                self.query = query;
                true
            }

            Msg::Search => match &self.session {
                None => false,
                Some(session) => {
                    self.status = Status::Searching;
                    let url = build_search_url(session);
                    let query = self.query.clone();
                    ctx.link().send_future(async move {
                        let body = proto::SearchQuery {
                            query: query.to_string(),
                        };
                        let result = post_json::<proto::SearchResponse>(&url, &body).await;
                        Msg::SearchFinished { result }
                    });
                    true
                }
            },

            Msg::SearchFinished { result } => {
                match result {
                    Ok(response) => {
                        self.rows = bind_rows(response);
                        self.status = Status::Found(self.rows.len());
                    }
                    Err(error) => {
                        // earlier results stay on screen
                        error!(message = "search failed", %error);
                        self.status = Status::Failed(format!("Search failed: {}", error));
                    }
                }
                true
            }

            Msg::Select { row } => match &self.session {
                None => false,
                Some(session) => {
                    self.status = Status::Adding {
                        title: row.title.clone(),
                    };
                    let url = build_add_url(session, &row.track_id);
                    ctx.link().send_future(async move {
                        let result = get_json::<proto::AddResponse>(&url).await;
                        Msg::AddFinished { result }
                    });
                    true
                }
            },

            Msg::AddFinished { result } => {
                match result {
                    Ok(response) => {
                        info!(
                            message = "redirecting to payment",
                            payment_url = response.payment_url.as_str()
                        );
                        self.status = Status::Redirecting;
                        navigate_to(&response.payment_url);
                    }
                    Err(error) => {
                        error!(message = "add to queue failed", %error);
                        self.status = Status::Failed(format!("Could not add the track: {}", error));
                    }
                }
                true
            }

            Msg::NowPlayingFinished { result } => match result {
                Ok(now) => {
                    self.now_playing = Some(now.title);
                    true
                }
                Err(error) => {
                    // the line is decoration, leave it out
                    error!(message = "now-playing lookup failed", %error);
                    false
                }
            },
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let oninput = ctx.link().callback(|event: InputEvent| {
            let target = event.target().expect("oninput event must have target");
            let query: String = target.unchecked_into::<web_sys::HtmlInputElement>().value();
            Msg::UpdateQuery {
                query: Rc::from(query),
            }
        });
        let onsubmit = ctx.link().callback(|event: FocusEvent| {
            event.prevent_default();
            Msg::Search
        });
        let now_playing = match &self.now_playing {
            Some(title) => html! { <p class="now-playing">{title.clone()}</p> },
            None => html! {},
        };
        html! {
            <>
                {now_playing}
                <form onsubmit={onsubmit}>
                    <input
                        name="query"
                        placeholder="Search for music"
                        value={yew::virtual_dom::AttrValue::from(self.query.clone())}
                        oninput={oninput}
                    />
                    <button type="submit">{"Search"}</button>
                </form>
                <p class="status">{self.status.to_string()}</p>
                <ul class="search-results">
                    {for self.rows.iter().map(|row| {
                        let row = row.clone();
                        let title = row.title.clone();
                        let onclick = ctx.link().callback(move |_| Msg::Select { row: row.clone() });
                        html! {
                            <li class="search-result-container" onclick={onclick}>{title}</li>
                        }
                    })}
                </ul>
            </>
        }
    }
}

#[wasm_bindgen(start)]
pub fn run_app() {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    tracing_wasm::set_as_global_default();

    yew::start_app::<Model>();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(results: Vec<(&str, &str)>) -> proto::SearchResponse {
        proto::SearchResponse {
            results: results
                .into_iter()
                .map(|(title, track_id)| proto::SearchResult {
                    title: title.to_string(),
                    track_id: track_id.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn rows_keep_response_order() {
        let rows = bind_rows(response(vec![
            ("One More Time", "tid-1"),
            ("Harder Better Faster", "tid-2"),
        ]));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "One More Time");
        assert_eq!(rows[0].track_id, "tid-1");
        assert_eq!(rows[1].title, "Harder Better Faster");
        assert_eq!(rows[1].track_id, "tid-2");
    }

    #[test]
    fn rows_are_capped() {
        let many: Vec<(String, String)> = (0..MAX_RESULTS + 10)
            .map(|i| (format!("track {}", i), format!("tid-{}", i)))
            .collect();
        let rows = bind_rows(response(
            many.iter()
                .map(|(title, track_id)| (title.as_str(), track_id.as_str()))
                .collect(),
        ));
        assert_eq!(rows.len(), MAX_RESULTS);
        // the cap keeps the head of the list
        assert_eq!(rows[0].track_id, "tid-0");
        assert_eq!(rows[MAX_RESULTS - 1].track_id, format!("tid-{}", MAX_RESULTS - 1));
    }

    #[test]
    fn no_results_is_not_an_error() {
        let rows = bind_rows(response(vec![]));
        assert!(rows.is_empty());
    }

    #[test]
    fn status_lines() {
        assert_eq!(Status::Found(0).to_string(), "No results.");
        assert_eq!(
            Status::Found(2).to_string(),
            "2 results. Click one to add it to the queue."
        );
        assert_eq!(
            Status::Failed("Search failed: server answered 500".to_string()).to_string(),
            "Search failed: server answered 500"
        );
    }
}
