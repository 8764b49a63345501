// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use serde_json::Value;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use tripwiz_core::{
    Destination, HttpTravelApi, ParseError, TravelApi, TravelPreferences, WizardConfig,
    WizardError,
};

/// Request line and JSON body seen by the stub server.
struct Seen {
    request_line: String,
    body: Value,
}

/// Answers exactly one request on a local port with `status` and `body`.
fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<Seen>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        let mut content_length = 0;
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).unwrap();
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
        }
        let mut request_body = vec![0u8; content_length];
        reader.read_exact(&mut request_body).unwrap();

        let mut stream = reader.into_inner();
        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
        .unwrap();
        stream.flush().unwrap();

        Seen {
            request_line: request_line.trim_end().to_string(),
            body: serde_json::from_slice(&request_body).unwrap_or(Value::Null),
        }
    });
    (base, handle)
}

fn api(base: &str) -> HttpTravelApi {
    let config = WizardConfig {
        api_base_url: base.to_string(),
        request_timeout_secs: 10,
        ..WizardConfig::default()
    };
    HttpTravelApi::new(&config).unwrap()
}

fn prefs() -> TravelPreferences {
    let mut prefs = TravelPreferences::default();
    prefs.set_starting_point("Denver");
    prefs
}

#[test]
fn test_recommendations_posts_preferences() {
    let (base, server) = serve_once(
        "200 OK",
        r####"{"success": true, "recommendations": "### Destination 1: Lima, Peru"}"####,
    );
    let response = api(&base).recommendations(&prefs()).unwrap();
    assert!(response.success);
    assert_eq!(
        response.recommendations.as_deref(),
        Some("### Destination 1: Lima, Peru")
    );

    let seen = server.join().unwrap();
    assert_eq!(seen.request_line, "POST /api/recommendations HTTP/1.1");
    assert_eq!(seen.body["startingPoint"], "Denver");
    assert_eq!(seen.body["budgetPerPerson"], 1000);
}

#[test]
fn test_itinerary_keeps_base_path_prefix() {
    let (base, server) = serve_once("200 OK", r#"{"success": true, "itinerary": {"dailyItinerary": []}}"#);
    let destination = Destination::named("Lima", "Peru");
    let response = api(&format!("{base}/v1/")).itinerary(&prefs(), &destination).unwrap();
    assert!(response.success);
    assert!(response.itinerary.is_some());

    let seen = server.join().unwrap();
    assert_eq!(seen.request_line, "POST /v1/api/itinerary HTTP/1.1");
    assert_eq!(seen.body["destination"]["city"], "Lima");
    assert_eq!(seen.body["preferences"]["startingPoint"], "Denver");
}

#[test]
fn test_server_error_status_is_network_error() {
    let (base, server) = serve_once("500 Internal Server Error", r#"{"success": false}"#);
    let err = api(&base).recommendations(&prefs()).unwrap_err();
    assert!(matches!(err, WizardError::Network(_)), "got {err:?}");
    server.join().unwrap();
}

#[test]
fn test_undecodable_body_is_parse_error() {
    let (base, server) = serve_once("200 OK", "not json");
    let err = api(&base).recommendations(&prefs()).unwrap_err();
    assert!(
        matches!(err, WizardError::Parse(ParseError::InvalidJson(_))),
        "got {err:?}"
    );
    server.join().unwrap();
}

#[test]
fn test_refused_connection_is_network_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let err = api(&format!("http://127.0.0.1:{port}"))
        .recommendations(&prefs())
        .unwrap_err();
    assert!(matches!(err, WizardError::Network(_)), "got {err:?}");
}
