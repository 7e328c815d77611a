//! Login and registration screens

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use ratatui::Frame;

use fumotion_core::validation::RegistrationForm;
use fumotion_core::{ApiGateway, NavParams, Screen};

use super::{centered, framed, Action};
use crate::widgets::{Field, Form, FormEvent};

pub struct LoginView {
    form: Form,
}

impl LoginView {
    pub fn new() -> Self {
        Self {
            form: Form::new(vec![
                Field::new("Email").placeholder("you@example.com"),
                Field::new("Password").masked(),
            ]),
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner = framed(frame, centered(area, 60, 2), "Sign in to Fumotion");
        self.form.render(frame, inner);
    }

    pub async fn handle_key(&mut self, key: KeyEvent, gateway: &ApiGateway) -> Option<Action> {
        if key.code == KeyCode::F(2) {
            return Some(Action::Navigate(Screen::Register, NavParams::none()));
        }
        match self.form.handle_key(key) {
            FormEvent::Submit => Some(
                match gateway.auth().login(self.form.value(0), self.form.value(1)).await {
                    Ok(_) => Action::Navigate(Screen::Home, NavParams::none()),
                    Err(e) => Action::Error(e),
                },
            ),
            FormEvent::Handled => Some(Action::Consumed),
            FormEvent::Ignored => None,
        }
    }
}

impl Default for LoginView {
    fn default() -> Self {
        Self::new()
    }
}

const FIRST_NAME: usize = 0;
const LAST_NAME: usize = 1;
const EMAIL: usize = 2;
const PHONE: usize = 3;
const PASSWORD: usize = 4;
const CONFIRM: usize = 5;

pub struct RegisterView {
    form: Form,
}

impl RegisterView {
    pub fn new() -> Self {
        Self {
            form: Form::new(vec![
                Field::new("First name"),
                Field::new("Last name"),
                Field::new("Email"),
                Field::new("Phone").placeholder("optional"),
                Field::new("Password").masked().placeholder("at least 6 characters"),
                Field::new("Confirm").masked(),
            ]),
        }
    }

    fn registration(&self) -> RegistrationForm {
        RegistrationForm {
            first_name: self.form.value(FIRST_NAME).to_string(),
            last_name: self.form.value(LAST_NAME).to_string(),
            email: self.form.value(EMAIL).to_string(),
            phone: self.form.value(PHONE).to_string(),
            password: self.form.value(PASSWORD).to_string(),
            confirm_password: self.form.value(CONFIRM).to_string(),
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner = framed(frame, centered(area, 64, 6), "Create your account");
        self.form.render(frame, inner);
    }

    pub async fn handle_key(&mut self, key: KeyEvent, gateway: &ApiGateway) -> Option<Action> {
        match self.form.handle_key(key) {
            FormEvent::Submit => Some(
                match gateway.auth().register(&self.registration()).await {
                    Ok(_) => Action::Navigate(Screen::Home, NavParams::none()),
                    Err(e) => Action::Error(e),
                },
            ),
            FormEvent::Handled => Some(Action::Consumed),
            FormEvent::Ignored => None,
        }
    }
}

impl Default for RegisterView {
    fn default() -> Self {
        Self::new()
    }
}
