use serde::{Deserialize, Serialize};

/// Body of `POST /jukebox/web/{chat_id}/search`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

/// One selectable track, as the backend returned it.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub track_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

/// Answer to `GET /jukebox/web/{chat_id}/add`; the browser is sent to
/// `payment_url` as-is.
#[derive(Debug, Serialize, Deserialize)]
pub struct AddResponse {
    pub payment_url: String,
}

/// Answer to `GET /jukebox/status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct NowPlaying {
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_response_wire_format() {
        let body = r#"{"results":[{"title":"One More Time","track_id":"tid-1"},{"title":"Harder Better Faster","track_id":"tid-2"}]}"#;
        let response: SearchResponse =
            serde_json::from_str(body).expect("documented search body must parse");
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].title, "One More Time");
        assert_eq!(response.results[0].track_id, "tid-1");
        assert_eq!(response.results[1].track_id, "tid-2");
    }

    #[test]
    fn add_response_wire_format() {
        let body = r#"{"payment_url":"https://pay.example/x"}"#;
        let response: AddResponse =
            serde_json::from_str(body).expect("documented add body must parse");
        assert_eq!(response.payment_url, "https://pay.example/x");
    }

    #[test]
    fn search_query_wire_format() {
        let query = SearchQuery {
            query: "daft punk".to_string(),
        };
        let body = serde_json::to_string(&query).expect("JSON serialize of SearchQuery must work");
        assert_eq!(body, r#"{"query":"daft punk"}"#);
    }

    #[test]
    fn now_playing_wire_format() {
        let body = r#"{"title":"Nothing is playing at the moment"}"#;
        let now: NowPlaying = serde_json::from_str(body).expect("status body must parse");
        assert_eq!(now.title, "Nothing is playing at the moment");
    }
}
