use iced::{
    Element, Length, Task, Color, Alignment, Border,
};
use iced::widget::{
    Column, Row, Container, Text, Button, TextInput, Scrollable, Space, rule,
};

use crate::gate::Gate;
use crate::models::GateStatus;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateStep {
    Locked,
    Unlocked,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Clone)]
pub enum Message {
    PasswordChanged(String),
    Submit,
    VerifyComplete(Result<bool, String>),
    ToggleTheme,
}

#[derive(Debug, Clone, Copy)]
struct Palette {
    bg: Color,
    sidebar_bg: Color,
    text: Color,
    secondary_text: Color,
    container_bg: Color,
    border: Color,
    accent: Color,
    error: Color,
    success: Color,
}

pub struct PassGateApp {
    gate: Gate,
    password: String,
    error_message: Option<String>,
    current_step: GateStep,
    // submit stays disabled while a digest is in flight
    is_verifying: bool,
    theme: Theme,
}

impl PassGateApp {
    pub fn new(gate: Gate) -> (Self, Task<Message>) {
        let current_step = if gate.verifier.is_unlocked() {
            GateStep::Unlocked
        } else {
            tracing::info!(reason = ?gate.verifier.status(), "password required");
            GateStep::Locked
        };
        (
            PassGateApp {
                gate,
                password: String::new(),
                error_message: None,
                current_step,
                is_verifying: false,
                theme: Theme::Light,
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PasswordChanged(s) => {
                self.password = s;
                self.error_message = None;
            }
            Message::Submit => {
                if self.is_verifying || self.current_step == GateStep::Unlocked {
                    return Task::none();
                }
                self.is_verifying = true;
                self.error_message = None;
                let verifier = self.gate.verifier.clone();
                let candidate = std::mem::take(&mut self.password);
                return Task::perform(
                    async move { verifier.verify(&candidate).await.map_err(|e| e.to_string()) },
                    Message::VerifyComplete,
                );
            }
            Message::VerifyComplete(result) => {
                self.is_verifying = false;
                match result {
                    Ok(true) => {
                        self.current_step = GateStep::Unlocked;
                        self.error_message = None;
                    }
                    Ok(false) => {
                        self.error_message = Some("Incorrect password, please try again".to_string());
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "password check failed");
                        self.error_message = Some(format!("Error: {}", e));
                    }
                }
            }
            Message::ToggleTheme => {
                self.theme = match self.theme {
                    Theme::Light => Theme::Dark,
                    Theme::Dark => Theme::Light,
                };
            }
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let palette = self.palette();
        let main_content = match self.current_step {
            GateStep::Locked => self.view_locked(palette),
            GateStep::Unlocked => self.view_unlocked(palette),
        };

        let layout = Row::new()
            .push(self.view_sidebar(palette))
            .push(rule::Rule::vertical(1))
            .push(main_content);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(move |_theme| {
                iced::widget::container::Style {
                    background: Some(iced::Background::Color(palette.bg)),
                    border: Border::default(),
                    ..Default::default()
                }
            })
            .into()
    }

    fn view_sidebar(&self, palette: Palette) -> Element<'_, Message> {
        let verifier = &self.gate.verifier;

        let title = colored(Text::new("PassGate").size(28), palette.accent);
        let subtitle = colored(Text::new("Source access").size(14), palette.secondary_text);

        let protection = if verifier.is_protected() {
            format!("Protected ({})", verifier.algorithm())
        } else {
            "No password configured".to_string()
        };
        let ttl_days = verifier.ttl().num_days();

        let theme_btn = Button::new(
            Text::new(match self.theme {
                Theme::Light => "🌙 Dark Mode",
                Theme::Dark => "☀️ Light Mode",
            })
                .size(14)
        )
        .on_press(Message::ToggleTheme)
        .padding(10)
        .width(Length::Fill);

        let sidebar_content = Column::new()
            .padding(20)
            .spacing(20)
            .width(Length::Fixed(260.0))
            .push(title)
            .push(subtitle)
            .push(rule::Rule::horizontal(1))
            .push(colored(Text::new(protection).size(14), palette.text))
            .push(colored(
                Text::new(format!("Verification lasts {} days", ttl_days)).size(12),
                palette.secondary_text,
            ))
            .push(Space::with_height(20))
            .push(theme_btn);

        Container::new(sidebar_content)
            .height(Length::Fill)
            .style(move |_theme| {
                iced::widget::container::Style {
                    background: Some(iced::Background::Color(palette.sidebar_bg)),
                    border: Border::default(),
                    ..Default::default()
                }
            })
            .into()
    }

    fn view_locked(&self, palette: Palette) -> Element<'_, Message> {
        let title = colored(Text::new("Password Required").size(32), palette.text);
        let description = colored(
            Text::new("Enter the access password to manage content sources").size(16),
            palette.secondary_text,
        );

        let mut password_input = TextInput::new("Password", &self.password)
            .secure(true)
            .padding(15)
            .size(16)
            .width(Length::Fixed(360.0));
        if !self.is_verifying {
            password_input = password_input
                .on_input(Message::PasswordChanged)
                .on_submit(Message::Submit);
        }

        let mut submit_btn = Button::new(
            Text::new(if self.is_verifying { "Checking..." } else { "Unlock" })
                .size(16)
        )
        .padding(15)
        .width(Length::Fixed(200.0));
        if !self.is_verifying {
            submit_btn = submit_btn.on_press(Message::Submit);
        }

        let mut content = Column::new()
            .padding(40)
            .spacing(25)
            .width(Length::Fill)
            .align_x(Alignment::Center)
            .push(Space::with_height(40))
            .push(colored(Text::new("🔒").size(64), palette.accent))
            .push(title)
            .push(description)
            .push(password_input);

        if let Some(err) = &self.error_message {
            content = content.push(colored(Text::new(err).size(14), palette.error));
        }
        content = content.push(submit_btn);

        Container::new(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    fn view_unlocked(&self, palette: Palette) -> Element<'_, Message> {
        let expiry_line = match self.gate.verifier.status() {
            GateStatus::Verified { expires_at } => {
                format!("Verified until {}", expires_at.format("%Y-%m-%d %H:%M UTC"))
            }
            GateStatus::Unprotected => "No password is configured".to_string(),
            GateStatus::Unverified(reason) => reason.describe().to_string(),
        };

        let active = self.gate.active_sources();
        let count_line = format!("{} of {} sources active", active.len(), self.gate.sources.len());

        let mut source_list = Column::new().spacing(6);
        for source in active {
            source_list = source_list.push(colored(Text::new(source.name.as_str()).size(14), palette.text));
        }

        let list_box = Container::new(Scrollable::new(source_list).height(Length::Fixed(240.0)))
            .padding(15)
            .width(Length::Fixed(360.0))
            .style(move |_theme| {
                iced::widget::container::Style {
                    background: Some(iced::Background::Color(palette.container_bg)),
                    border: Border {
                        color: palette.border,
                        width: 1.0,
                        radius: 4.0.into(),
                    },
                    ..Default::default()
                }
            });

        let content = Column::new()
            .padding(40)
            .spacing(20)
            .width(Length::Fill)
            .align_x(Alignment::Center)
            .push(Space::with_height(40))
            .push(colored(Text::new("✓").size(80), palette.success))
            .push(colored(Text::new("Access Granted").size(36), palette.success))
            .push(colored(Text::new(expiry_line).size(14), palette.secondary_text))
            .push(colored(Text::new(count_line).size(16), palette.text))
            .push(list_box);

        Container::new(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    fn palette(&self) -> Palette {
        let (bg, sidebar_bg, text, secondary_text, container_bg, border) = match self.theme {
            Theme::Light => (
                Color::from_rgb(1.0, 1.0, 1.0),
                Color::from_rgb(0.95, 0.95, 0.97),
                Color::from_rgb(0.1, 0.1, 0.1),
                Color::from_rgb(0.4, 0.4, 0.4),
                Color::from_rgb(0.95, 0.95, 0.95),
                Color::from_rgb(0.8, 0.8, 0.8),
            ),
            Theme::Dark => (
                Color::from_rgb(0.11, 0.11, 0.13),
                Color::from_rgb(0.15, 0.15, 0.17),
                Color::from_rgb(0.9, 0.9, 0.9),
                Color::from_rgb(0.6, 0.6, 0.6),
                Color::from_rgb(0.2, 0.2, 0.22),
                Color::from_rgb(0.3, 0.3, 0.32),
            ),
        };
        Palette {
            bg,
            sidebar_bg,
            text,
            secondary_text,
            container_bg,
            border,
            accent: Color::from_rgb(0.2, 0.5, 0.8),
            error: Color::from_rgb(0.9, 0.2, 0.2),
            success: Color::from_rgb(0.2, 0.7, 0.2),
        }
    }
}

fn colored<'a>(text: Text<'a>, color: Color) -> Text<'a> {
    text.style(move |_theme| iced::widget::text::Style { color: Some(color) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GateConfig;
    use crate::hashers::digest_hex;
    use crate::models::Algorithm;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    fn app(hash: Option<String>) -> PassGateApp {
        let config = GateConfig {
            password_hash: hash,
            ..GateConfig::default()
        };
        let gate = Gate::new(&config, Arc::new(MemoryStorage::new())).unwrap();
        PassGateApp::new(gate).0
    }

    #[test]
    fn starts_locked_only_when_protected() {
        assert_eq!(app(None).current_step, GateStep::Unlocked);
        let locked = app(Some(digest_hex("testpass", Algorithm::Sha256)));
        assert_eq!(locked.current_step, GateStep::Locked);
    }

    #[test]
    fn submit_is_ignored_while_in_flight() {
        let mut app = app(Some(digest_hex("testpass", Algorithm::Sha256)));
        app.password = "testpass".into();
        let _ = app.update(Message::Submit);
        assert!(app.is_verifying);
        assert!(app.password.is_empty());

        app.password = "again".into();
        let _ = app.update(Message::Submit);
        assert_eq!(app.password, "again");
    }

    #[test]
    fn wrong_password_shows_inline_error() {
        let mut app = app(Some(digest_hex("testpass", Algorithm::Sha256)));
        app.is_verifying = true;
        let _ = app.update(Message::VerifyComplete(Ok(false)));
        assert!(!app.is_verifying);
        assert_eq!(app.current_step, GateStep::Locked);
        assert!(app.error_message.is_some());

        let _ = app.update(Message::VerifyComplete(Ok(true)));
        assert_eq!(app.current_step, GateStep::Unlocked);
        assert!(app.error_message.is_none());
    }
}
