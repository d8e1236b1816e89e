//! Centralised colors and widget styles for the UI.
//!
//! New components should build on these helpers so the application keeps a
//! consistent look.

use iced::widget::{button, checkbox, container, text_input};
use iced::{theme, Border, Color, Theme};

/// Application color palette.
pub struct Palette;

impl Palette {
    pub const PRIMARY: Color = Color { r: 0.0, g: 0.42, b: 0.38, a: 1.0 }; // Teal 800
    pub const ON_PRIMARY: Color = Color::WHITE;
    pub const SURFACE: Color = Color { r: 0.97, g: 0.97, b: 0.96, a: 1.0 };
    pub const ON_SURFACE: Color = Color { r: 0.12, g: 0.12, b: 0.12, a: 1.0 };
    pub const MUTED: Color = Color { r: 0.45, g: 0.45, b: 0.45, a: 1.0 };
    pub const ERROR: Color = Color { r: 0.72, g: 0.11, b: 0.11, a: 1.0 };
    pub const DANGER: Color = Color { r: 0.60, g: 0.05, b: 0.05, a: 1.0 };
    pub const TOAST: Color = Color { r: 0.13, g: 0.13, b: 0.13, a: 0.92 };

    pub const SPACING: u16 = 12;
}

struct PrimaryButton;

impl button::StyleSheet for PrimaryButton {
    type Style = Theme;

    fn active(&self, _theme: &Theme) -> button::Appearance {
        button::Appearance {
            background: Some(Palette::PRIMARY.into()),
            text_color: Palette::ON_PRIMARY,
            border: Border::with_radius(4.0),
            ..button::Appearance::default()
        }
    }
}

/// Style for primary action buttons.
pub fn button_primary() -> theme::Button {
    theme::Button::Custom(Box::new(PrimaryButton))
}

struct DangerButton;

impl button::StyleSheet for DangerButton {
    type Style = Theme;

    fn active(&self, _theme: &Theme) -> button::Appearance {
        button::Appearance {
            background: Some(Palette::DANGER.into()),
            text_color: Palette::ON_PRIMARY,
            border: Border::with_radius(4.0),
            ..button::Appearance::default()
        }
    }
}

/// Style for destructive actions (delete video, close database).
pub fn button_danger() -> theme::Button {
    theme::Button::Custom(Box::new(DangerButton))
}

struct BasicTextInput;

impl text_input::StyleSheet for BasicTextInput {
    type Style = Theme;

    fn active(&self, _theme: &Theme) -> text_input::Appearance {
        text_input::Appearance {
            background: Palette::SURFACE.into(),
            border: Border {
                color: Palette::PRIMARY,
                width: 1.0,
                radius: 4.0.into(),
            },
            icon_color: Palette::ON_SURFACE,
        }
    }

    fn focused(&self, theme: &Theme) -> text_input::Appearance {
        self.active(theme)
    }

    fn disabled(&self, theme: &Theme) -> text_input::Appearance {
        self.active(theme)
    }

    fn placeholder_color(&self, _theme: &Theme) -> Color {
        Palette::MUTED
    }

    fn value_color(&self, _theme: &Theme) -> Color {
        Palette::ON_SURFACE
    }

    fn disabled_color(&self, _theme: &Theme) -> Color {
        Palette::MUTED
    }

    fn selection_color(&self, _theme: &Theme) -> Color {
        Palette::PRIMARY
    }
}

/// Basic text input styling.
pub fn text_input_basic() -> theme::TextInput {
    theme::TextInput::Custom(Box::new(BasicTextInput))
}

struct CheckboxPrimary;

impl checkbox::StyleSheet for CheckboxPrimary {
    type Style = Theme;

    fn active(&self, _theme: &Theme, is_checked: bool) -> checkbox::Appearance {
        checkbox::Appearance {
            background: if is_checked {
                Palette::PRIMARY.into()
            } else {
                Palette::SURFACE.into()
            },
            icon_color: Palette::ON_PRIMARY,
            border: Border {
                color: Palette::PRIMARY,
                width: 1.0,
                radius: 2.0.into(),
            },
            text_color: None,
        }
    }

    fn hovered(&self, theme: &Theme, is_checked: bool) -> checkbox::Appearance {
        self.active(theme, is_checked)
    }
}

/// Style for checkboxes using the primary color.
pub fn checkbox_primary() -> theme::Checkbox {
    theme::Checkbox::Custom(Box::new(CheckboxPrimary))
}

struct Card;

impl container::StyleSheet for Card {
    type Style = Theme;

    fn appearance(&self, _theme: &Theme) -> container::Appearance {
        container::Appearance {
            background: Some(Palette::SURFACE.into()),
            text_color: Some(Palette::ON_SURFACE),
            border: Border {
                color: Palette::PRIMARY,
                width: 1.0,
                radius: 4.0.into(),
            },
            ..container::Appearance::default()
        }
    }
}

/// Container style for dialog and detail panels.
pub fn card() -> theme::Container {
    theme::Container::Custom(Box::new(Card))
}

struct ErrorBanner;

impl container::StyleSheet for ErrorBanner {
    type Style = Theme;

    fn appearance(&self, _theme: &Theme) -> container::Appearance {
        container::Appearance {
            background: Some(Color { a: 0.12, ..Palette::ERROR }.into()),
            text_color: Some(Palette::ERROR),
            border: Border {
                color: Palette::ERROR,
                width: 1.0,
                radius: 2.0.into(),
            },
            ..container::Appearance::default()
        }
    }
}

/// Container style for the error banner.
pub fn error_banner() -> theme::Container {
    theme::Container::Custom(Box::new(ErrorBanner))
}

struct Toast;

impl container::StyleSheet for Toast {
    type Style = Theme;

    fn appearance(&self, _theme: &Theme) -> container::Appearance {
        container::Appearance {
            background: Some(Palette::TOAST.into()),
            text_color: Some(Palette::ON_PRIMARY),
            border: Border::with_radius(4.0),
            ..container::Appearance::default()
        }
    }
}

/// Container style for notification toasts.
pub fn toast() -> theme::Container {
    theme::Container::Custom(Box::new(Toast))
}
