//! Fumotion Client
//!
//! Wires the session store, gateway and navigation controller together for
//! a surface. The surface owns one `FumotionClient` inside its event loop
//! and goes through it for every screen change.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::chat::ChatSession;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::gateway::{ApiGateway, HttpTransport, ReqwestTransport};
use crate::models::User;
use crate::navigation::{NavParams, NavigationController, NavigationState, Screen};
use crate::polling::PollUpdate;
use crate::session::SessionStore;

pub struct FumotionClient {
    config: ClientConfig,
    session: Arc<SessionStore>,
    gateway: ApiGateway,
    navigation: NavigationController,
}

impl FumotionClient {
    /// Production client: reqwest transport, session at the configured path
    pub fn new(config: ClientConfig) -> Self {
        let session = match &config.session_path {
            Some(path) => SessionStore::open(path),
            None => SessionStore::open_default(),
        };
        Self::with_transport(config, Arc::new(ReqwestTransport::new()), Arc::new(session))
    }

    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        session: Arc<SessionStore>,
    ) -> Self {
        let gateway = ApiGateway::new(config.api_url.clone(), transport, session.clone());
        Self {
            config,
            session,
            gateway,
            navigation: NavigationController::new(),
        }
    }

    /// Probe reachability and pick the first screen
    pub async fn start(&mut self) -> Screen {
        let reachable = self.gateway.health_check().await;
        if !reachable {
            tracing::warn!(api_url = %self.config.api_url, "Fumotion service unreachable");
        }
        self.navigation.start(reachable, &self.session)
    }

    pub fn navigate(&mut self, target: Screen, params: NavParams) -> Screen {
        self.navigation.transition(target, params, &self.session)
    }

    pub fn back(&mut self) -> Screen {
        self.navigation.back(&self.session)
    }

    pub fn logout(&mut self) -> Screen {
        tracing::info!("User logged out");
        self.navigation.logout(&self.session)
    }

    /// Follow up on a failed call: after a 401 the session is gone, so
    /// leave the protected screen. Returns the new screen if it changed.
    pub fn handle_error(&mut self, error: &ClientError) -> Option<Screen> {
        if error.is_auth() && self.navigation.screen().requires_auth() {
            Some(self.navigate(Screen::Login, NavParams::none()))
        } else {
            None
        }
    }

    /// Open the chat with the selected user, if any. Messages carry a trip
    /// id only when the chat was opened for that trip.
    pub async fn open_chat(&self, updates: mpsc::Sender<PollUpdate>) -> Option<ChatSession> {
        let counterpart = self.navigation.selected_user_id()?;
        Some(
            ChatSession::open(
                &self.gateway,
                counterpart,
                self.navigation.chat_trip_id(),
                self.config.poll_interval,
                updates,
            )
            .await,
        )
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn gateway(&self) -> &ApiGateway {
        &self.gateway
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn state(&self) -> NavigationState {
        self.navigation.state()
    }

    pub fn screen(&self) -> Screen {
        self.navigation.screen()
    }

    pub fn is_offline(&self) -> bool {
        self.navigation.is_offline()
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.user()
    }
}
