//! App flow tests
//!
//! Drive `App` with key presses over a scripted transport and check what a
//! `TestBackend` terminal shows.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use futures::channel::mpsc;
use fumotion_core::test_utils::{
    message_json, sample_user, signed_in, trip_json, user_json, MockTransport, TEST_BASE_URL,
};
use fumotion_core::{ClientConfig, FumotionClient, NavParams, Screen, Session, SessionStore};
use fumotion_tui::screens::Action;
use fumotion_tui::{Alert, App};
use pretty_assertions::assert_eq;
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use serde_json::json;

fn app_with(transport: &MockTransport, session: Session) -> App {
    let client = FumotionClient::with_transport(
        ClientConfig::with_api_url(TEST_BASE_URL),
        Arc::new(transport.clone()),
        Arc::new(SessionStore::in_memory(session)),
    );
    App::new(client)
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl_c() -> std::io::Result<Event> {
    Ok(Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)))
}

fn press(code: KeyCode) -> std::io::Result<Event> {
    Ok(Event::Key(key(code)))
}

fn screen_text(app: &mut App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    terminal.draw(|frame| app.render(frame)).unwrap();
    let buffer = terminal.backend().buffer();
    (0..buffer.area.height)
        .map(|y| {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::test]
async fn test_offline_start_shows_login_and_banner() {
    let transport = MockTransport::new();
    transport.push_unreachable();

    let mut app = app_with(&transport, signed_in(sample_user(1)));
    app.start().await;

    assert_eq!(app.client().screen(), Screen::Login);
    let text = screen_text(&mut app);
    assert!(text.contains("Sign in to Fumotion"));
    assert!(text.contains("OFFLINE"));
}

#[tokio::test]
async fn test_signed_in_start_opens_home_menu() {
    let transport = MockTransport::new();
    transport.push_json(200, json!({ "status": "ok" }));

    let mut app = app_with(&transport, signed_in(sample_user(1)));
    app.start().await;

    assert_eq!(app.client().screen(), Screen::Home);
    let text = screen_text(&mut app);
    assert!(text.contains("Find a trip"));
    assert!(text.contains("First1 Last1"));
    assert!(!text.contains("OFFLINE"));

    // First entry is the search screen
    app.handle_key(key(KeyCode::Enter)).await;
    assert_eq!(app.client().screen(), Screen::Search);
}

#[tokio::test]
async fn test_login_form_signs_in() {
    let transport = MockTransport::new();
    transport.push_json(200, json!({ "status": "ok" }));
    transport.push_json(
        200,
        json!({ "success": true, "token": "abc", "user": user_json(1) }),
    );

    let mut app = app_with(&transport, Session::default());
    app.start().await;
    assert_eq!(app.client().screen(), Screen::Login);

    for c in "user1@example.com".chars() {
        app.handle_key(key(KeyCode::Char(c))).await;
    }
    app.handle_key(key(KeyCode::Tab)).await;
    for c in "quick1".chars() {
        app.handle_key(key(KeyCode::Char(c))).await;
    }
    // 'q' typed into a field must not quit
    assert!(app.is_running());

    app.handle_key(key(KeyCode::Enter)).await;
    assert_eq!(app.client().screen(), Screen::Home);
    assert!(app.client().session().is_authenticated());
}

#[tokio::test]
async fn test_escape_on_login_quits() {
    let transport = MockTransport::new();
    transport.push_json(200, json!({ "status": "ok" }));

    let mut app = app_with(&transport, Session::default());
    app.start().await;
    app.handle_key(key(KeyCode::Esc)).await;
    assert!(!app.is_running());
}

#[tokio::test]
async fn test_unauthorized_load_returns_to_login() {
    let transport = MockTransport::new();
    transport.push_json(200, json!({ "status": "ok" }));
    transport.push_json(401, json!({ "success": false, "message": "Token expired" }));

    let mut app = app_with(&transport, signed_in(sample_user(1)));
    app.start().await;
    app.apply(Action::Navigate(Screen::MyTrips, NavParams::none()))
        .await;

    assert_eq!(app.client().screen(), Screen::Login);
    assert!(!app.client().session().is_authenticated());
    assert_eq!(app.alert(), Some(&Alert::Error("Token expired".to_string())));
}

#[tokio::test]
async fn test_overbooking_is_refused_without_request() {
    let transport = MockTransport::new();
    transport.push_json(200, json!({ "status": "ok" }));
    transport.push_json(200, json!({ "success": true, "trip": trip_json(7, 2) }));

    let mut app = app_with(&transport, signed_in(sample_user(1)));
    app.start().await;
    app.apply(Action::Navigate(Screen::TripDetail, NavParams::trip(7)))
        .await;
    assert_eq!(app.client().screen(), Screen::TripDetail);
    assert!(screen_text(&mut app).contains("Paris -> Lyon"));

    app.handle_key(key(KeyCode::Char('b'))).await;
    assert!(app.view().captures_text());
    app.handle_key(key(KeyCode::Backspace)).await;
    app.handle_key(key(KeyCode::Char('5'))).await;

    let before = transport.request_count();
    app.handle_key(key(KeyCode::Enter)).await;

    assert_eq!(transport.request_count(), before);
    assert!(matches!(app.alert(), Some(Alert::Error(_))));
    assert_eq!(app.client().screen(), Screen::TripDetail);
}

#[tokio::test]
async fn test_chat_shows_thread_and_back_leaves_it() {
    let transport = MockTransport::new();
    transport.push_json(200, json!({ "status": "ok" }));
    transport.set_fallback_json(
        200,
        json!({
            "success": true,
            "user": user_json(3),
            "messages": [
                message_json(1, 3, 1, "Hi, is the trip still on?"),
                message_json(2, 1, 3, "Yes, see you at 8"),
            ]
        }),
    );

    let mut app = app_with(&transport, signed_in(sample_user(1)));
    app.start().await;
    app.apply(Action::Navigate(Screen::Chat, NavParams::user(3)))
        .await;
    assert_eq!(app.client().screen(), Screen::Chat);

    let text = screen_text(&mut app);
    assert!(text.contains("Chat with First3 Last3"));
    assert!(text.contains("First3 Last3: Hi, is the trip still on?"));
    assert!(text.contains("You: Yes, see you at 8"));

    app.handle_key(key(KeyCode::Esc)).await;
    assert_eq!(app.client().screen(), Screen::Conversations);
}

#[tokio::test]
async fn test_ctrl_c_quits_during_startup_health_check() {
    let transport = MockTransport::new();
    transport.push_json(200, json!({ "status": "ok" }));
    transport.set_delay(Duration::from_secs(3600));

    let (tx, rx) = mpsc::unbounded();
    tx.unbounded_send(ctrl_c()).unwrap();

    let mut app = app_with(&transport, signed_in(sample_user(1)));
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    let result = tokio::time::timeout(
        Duration::from_secs(10),
        app.run_with_events(&mut terminal, rx),
    )
    .await;

    assert!(matches!(result, Ok(Ok(()))));
    assert!(!app.is_running());
}

#[tokio::test]
async fn test_ctrl_c_quits_while_screen_is_loading() {
    let transport = MockTransport::new();
    transport.push_json(200, json!({ "status": "ok" }));
    transport.set_fallback_json(200, json!({ "success": true, "trips": [] }));

    let (tx, rx) = mpsc::unbounded();
    let mut app = app_with(&transport, signed_in(sample_user(1)));
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

    let user = async {
        // Only the request after the health check hangs
        while transport.request_count() < 1 {
            tokio::task::yield_now().await;
        }
        transport.set_delay(Duration::from_secs(3600));

        // Home menu: Search, Offer a trip, My trips
        tx.unbounded_send(press(KeyCode::Down)).unwrap();
        tx.unbounded_send(press(KeyCode::Down)).unwrap();
        tx.unbounded_send(press(KeyCode::Enter)).unwrap();
        while transport.request_count() < 2 {
            tokio::task::yield_now().await;
        }
        tx.unbounded_send(ctrl_c()).unwrap();
    };

    let result = tokio::time::timeout(Duration::from_secs(10), async {
        tokio::join!(app.run_with_events(&mut terminal, rx), user).0
    })
    .await;

    assert!(matches!(result, Ok(Ok(()))));
    assert!(!app.is_running());
    assert_eq!(app.client().screen(), Screen::MyTrips);
    assert_eq!(transport.request_count(), 2);
    assert!(transport.requests()[1].url.ends_with("/api/trips"));
}
