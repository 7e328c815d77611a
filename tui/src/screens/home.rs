//! Home menu

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::Frame;

use fumotion_core::{NavParams, Screen};

use super::Action;
use crate::widgets::SelectList;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuEntry {
    Open(Screen),
    Logout,
}

impl MenuEntry {
    fn label(&self) -> &'static str {
        match self {
            MenuEntry::Open(Screen::Search) => "Find a trip",
            MenuEntry::Open(Screen::CreateTrip) => "Offer a trip",
            MenuEntry::Open(screen) => screen.title(),
            MenuEntry::Logout => "Log out",
        }
    }
}

pub struct HomeView {
    menu: SelectList<MenuEntry>,
}

impl HomeView {
    /// The admin entry is listed only for admins
    pub fn new(is_admin: bool) -> Self {
        let mut entries: Vec<MenuEntry> = [
            Screen::Search,
            Screen::CreateTrip,
            Screen::MyTrips,
            Screen::Bookings,
            Screen::ReceivedBookings,
            Screen::Conversations,
            Screen::Reviews,
            Screen::Profile,
        ]
        .into_iter()
        .map(MenuEntry::Open)
        .collect();
        if is_admin {
            entries.push(MenuEntry::Open(Screen::Admin));
        }
        entries.push(MenuEntry::Logout);

        Self {
            menu: SelectList::new(entries),
        }
    }

    pub fn entries(&self) -> &[MenuEntry] {
        self.menu.items()
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.menu
            .render(frame, area, "Fumotion", "", |entry| Line::from(entry.label()));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.menu.previous(),
            KeyCode::Down | KeyCode::Char('j') => self.menu.next(),
            KeyCode::Enter => {
                return match self.menu.selected() {
                    Some(MenuEntry::Open(screen)) => {
                        Some(Action::Navigate(*screen, NavParams::none()))
                    }
                    Some(MenuEntry::Logout) => Some(Action::Logout),
                    None => None,
                };
            }
            KeyCode::Char('q') => return Some(Action::Quit),
            _ => return None,
        }
        Some(Action::Consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_entry_only_for_admins() {
        let admin_entry = MenuEntry::Open(Screen::Admin);
        assert!(!HomeView::new(false).entries().contains(&admin_entry));
        assert!(HomeView::new(true).entries().contains(&admin_entry));
        assert_eq!(HomeView::new(false).entries().last(), Some(&MenuEntry::Logout));
    }
}
