//! Profile editing

use crossterm::event::KeyEvent;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use fumotion_core::validation::ValidationError;
use fumotion_core::{ApiGateway, ClientError, ProfileUpdate, User};

use super::{centered, framed, Action};
use crate::theme;
use crate::widgets::{Field, Form, FormEvent};

const FIRST_NAME: usize = 0;
const LAST_NAME: usize = 1;
const PHONE: usize = 2;

pub struct ProfileView {
    user: Option<User>,
    form: Form,
}

impl ProfileView {
    pub fn new(user: Option<User>) -> Self {
        let (first, last, phone) = match &user {
            Some(u) => (
                u.first_name.clone(),
                u.last_name.clone(),
                u.phone.clone().unwrap_or_default(),
            ),
            None => Default::default(),
        };
        Self {
            user,
            form: Form::new(vec![
                Field::new("First name").with_value(first),
                Field::new("Last name").with_value(last),
                Field::new("Phone").with_value(phone).placeholder("optional"),
            ]),
        }
    }

    /// Changes to send; names are required, an empty phone clears it
    fn update(&self) -> Result<ProfileUpdate, ValidationError> {
        let required = |index: usize, name: &'static str| {
            let value = self.form.value(index).trim();
            if value.is_empty() {
                Err(ValidationError::MissingField(name))
            } else {
                Ok(value.to_string())
            }
        };
        Ok(ProfileUpdate {
            first_name: Some(required(FIRST_NAME, "first name")?),
            last_name: Some(required(LAST_NAME, "last name")?),
            phone: Some(self.form.value(PHONE).trim().to_string()),
            is_admin: None,
        })
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner = framed(frame, centered(area, 64, 5), "My profile");
        let [email_area, _, form_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(inner);

        let email = self.user.as_ref().map(|u| u.email.as_str()).unwrap_or("");
        frame.render_widget(
            Paragraph::new(format!("  {email}")).style(theme::dim()),
            email_area,
        );
        self.form.render(frame, form_area);
    }

    pub async fn handle_key(&mut self, key: KeyEvent, gateway: &ApiGateway) -> Option<Action> {
        match self.form.handle_key(key) {
            FormEvent::Submit => {
                let update = match self.update() {
                    Ok(update) => update,
                    Err(e) => return Some(Action::Error(ClientError::from(e))),
                };
                Some(match gateway.auth().update_profile(&update).await {
                    Ok(user) => {
                        self.user = Some(user);
                        Action::Notify("Profile saved".to_string())
                    }
                    Err(e) => Action::Error(e),
                })
            }
            FormEvent::Handled => Some(Action::Consumed),
            FormEvent::Ignored => None,
        }
    }
}
