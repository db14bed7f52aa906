//! Settings panel
//!
//! A floating panel with two pages: general settings (colors, font, size,
//! fullscreen) and themes (klock mode, theme selector). The panel reports
//! every user edit as a [`SettingsEvent`]; it never changes the
//! configuration itself. `sync` pushes a configuration back into the widgets.

use gtk4::prelude::*;
use gtk4::{
    Align, Box as GtkBox, Button, ColorDialog, ColorDialogButton, DropDown, Label, Orientation,
    Scale, Stack, StackTransitionType, Switch,
};
use std::cell::Cell;
use std::rc::Rc;

use klock_types::config::{FONT_CHOICES, TEXT_SIZE_VW_RANGE};
use klock_types::{ClockConfig, Color, TextSize, Theme};

/// A user edit in the settings panel
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsEvent {
    TextColor(Color),
    BackgroundColor(Color),
    /// Pango family list of the chosen font
    Font(String),
    MovementMode(bool),
    TextSize(TextSize),
    KlockMode(bool),
    Theme(Theme),
    ToggleFullscreen,
    Close,
}

type EventHandler = Rc<dyn Fn(SettingsEvent)>;

/// The settings panel widgets
pub struct SettingsPanel {
    root: GtkBox,
    handle: GtkBox,
    stack: Stack,
    text_color: ColorDialogButton,
    background_color: ColorDialogButton,
    font_row: GtkBox,
    font_dropdown: DropDown,
    move_row: GtkBox,
    move_switch: Switch,
    size_label: Label,
    size_scale: Scale,
    fullscreen_button: Button,
    klock_switch: Switch,
    theme_dropdown: DropDown,
    /// Set while `sync` writes into the widgets so their signals stay quiet
    syncing: Rc<Cell<bool>>,
}

impl SettingsPanel {
    pub fn new(config: &ClockConfig, on_event: impl Fn(SettingsEvent) + 'static) -> Self {
        let on_event: EventHandler = Rc::new(on_event);
        let syncing = Rc::new(Cell::new(false));

        let root = GtkBox::new(Orientation::Vertical, 8);
        root.add_css_class("settings-panel");
        root.set_halign(Align::End);
        root.set_valign(Align::Start);
        root.set_width_request(280);

        let handle = GtkBox::new(Orientation::Horizontal, 0);
        handle.add_css_class("settings-drag-handle");
        handle.set_height_request(12);
        root.append(&handle);

        // Main page
        let main_page = GtkBox::new(Orientation::Vertical, 8);
        main_page.append(&heading("Settings"));

        let text_color = ColorDialogButton::new(Some(ColorDialog::new()));
        main_page.append(&setting_row("Clock Text Color:", &text_color));

        let background_color = ColorDialogButton::new(Some(ColorDialog::new()));
        main_page.append(&setting_row("Background Color:", &background_color));

        let font_labels: Vec<&str> = FONT_CHOICES.iter().map(|(label, _)| *label).collect();
        let font_dropdown = DropDown::from_strings(&font_labels);
        let font_row = setting_row("Clock Font:", &font_dropdown);
        main_page.append(&font_row);

        let move_switch = Switch::new();
        move_switch.set_valign(Align::Center);
        let move_row = setting_row("Move Text Mode", &move_switch);
        main_page.append(&move_row);

        let size_label = Label::new(None);
        size_label.set_halign(Align::Start);
        let size_scale = Scale::with_range(
            Orientation::Horizontal,
            TEXT_SIZE_VW_RANGE.0,
            TEXT_SIZE_VW_RANGE.1,
            1.0,
        );
        size_scale.set_hexpand(true);
        let size_box = GtkBox::new(Orientation::Vertical, 2);
        size_box.append(&size_label);
        size_box.append(&size_scale);
        main_page.append(&size_box);

        let fullscreen_button = Button::with_label("Enter Fullscreen");
        main_page.append(&fullscreen_button);

        let themes_button = Button::with_label("🎨 Themes");
        main_page.append(&themes_button);

        // Themes page
        let themes_page = GtkBox::new(Orientation::Vertical, 8);
        themes_page.append(&heading("Themes"));

        let klock_switch = Switch::new();
        klock_switch.set_valign(Align::Center);
        themes_page.append(&setting_row("Klock Mode (HH:MM + Progress Bar)", &klock_switch));

        let theme_labels: Vec<&str> = Theme::ALL.iter().map(Theme::label).collect();
        let theme_dropdown = DropDown::from_strings(&theme_labels);
        themes_page.append(&setting_row("Theme", &theme_dropdown));

        let back_button = Button::with_label("← Back");
        themes_page.append(&back_button);

        let stack = Stack::new();
        stack.set_transition_type(StackTransitionType::SlideLeftRight);
        stack.add_named(&main_page, Some("main"));
        stack.add_named(&themes_page, Some("themes"));
        root.append(&stack);

        let close_button = Button::with_label("Close");
        close_button.add_css_class("settings-close-button");
        root.append(&close_button);

        // Page switching
        let stack_clone = stack.clone();
        themes_button.connect_clicked(move |_| stack_clone.set_visible_child_name("themes"));
        let stack_clone = stack.clone();
        back_button.connect_clicked(move |_| stack_clone.set_visible_child_name("main"));

        // Edits
        let (handler, quiet) = (on_event.clone(), syncing.clone());
        text_color.connect_rgba_notify(move |button| {
            if !quiet.get() {
                handler(SettingsEvent::TextColor(Color::from_gdk_rgba(&button.rgba())));
            }
        });

        let (handler, quiet) = (on_event.clone(), syncing.clone());
        background_color.connect_rgba_notify(move |button| {
            if !quiet.get() {
                handler(SettingsEvent::BackgroundColor(Color::from_gdk_rgba(&button.rgba())));
            }
        });

        let (handler, quiet) = (on_event.clone(), syncing.clone());
        font_dropdown.connect_selected_notify(move |dropdown| {
            if quiet.get() {
                return;
            }
            if let Some((_, family)) = FONT_CHOICES.get(dropdown.selected() as usize) {
                handler(SettingsEvent::Font(family.to_string()));
            }
        });

        let (handler, quiet) = (on_event.clone(), syncing.clone());
        move_switch.connect_active_notify(move |switch| {
            if !quiet.get() {
                handler(SettingsEvent::MovementMode(switch.is_active()));
            }
        });

        let (handler, quiet, label) = (on_event.clone(), syncing.clone(), size_label.clone());
        size_scale.connect_value_changed(move |scale| {
            let vw = scale.value().round();
            label.set_text(&size_label_text(vw));
            if !quiet.get() {
                handler(SettingsEvent::TextSize(TextSize::ViewportWidth(vw)));
            }
        });

        let handler = on_event.clone();
        fullscreen_button.connect_clicked(move |_| handler(SettingsEvent::ToggleFullscreen));

        let (handler, quiet) = (on_event.clone(), syncing.clone());
        klock_switch.connect_active_notify(move |switch| {
            if !quiet.get() {
                handler(SettingsEvent::KlockMode(switch.is_active()));
            }
        });

        let (handler, quiet) = (on_event.clone(), syncing.clone());
        theme_dropdown.connect_selected_notify(move |dropdown| {
            if quiet.get() {
                return;
            }
            if let Some(theme) = Theme::ALL.get(dropdown.selected() as usize) {
                handler(SettingsEvent::Theme(*theme));
            }
        });

        let handler = on_event;
        close_button.connect_clicked(move |_| handler(SettingsEvent::Close));

        let panel = Self {
            root,
            handle,
            stack,
            text_color,
            background_color,
            font_row,
            font_dropdown,
            move_row,
            move_switch,
            size_label,
            size_scale,
            fullscreen_button,
            klock_switch,
            theme_dropdown,
            syncing,
        };
        panel.sync(config);
        panel
    }

    /// The panel's top-level widget
    pub fn widget(&self) -> &GtkBox {
        &self.root
    }

    /// The strip the panel is dragged by
    pub fn drag_handle(&self) -> &GtkBox {
        &self.handle
    }

    /// Show the first page again
    pub fn reset_page(&self) {
        self.stack.set_visible_child_name("main");
    }

    /// Write `config` into the widgets without emitting events
    pub fn sync(&self, config: &ClockConfig) {
        self.syncing.set(true);

        self.text_color.set_rgba(&config.text_color.to_gdk_rgba());
        self.background_color
            .set_rgba(&config.background_color.to_gdk_rgba());

        let font_index = FONT_CHOICES
            .iter()
            .position(|(_, family)| *family == config.font_family)
            .unwrap_or(0);
        self.font_dropdown.set_selected(font_index as u32);
        self.move_switch.set_active(config.movement_mode);

        // Font and free movement only apply to the plain face
        let plain = config.theme.supports_free_text();
        self.font_row.set_visible(plain);
        self.move_row.set_visible(plain);

        let vw = config
            .text_size
            .as_vw()
            .or_else(|| TextSize::default().as_vw())
            .unwrap_or(TEXT_SIZE_VW_RANGE.0);
        self.size_scale.set_value(vw);
        self.size_label.set_text(&size_label_text(vw));

        self.klock_switch.set_active(config.klock_mode);
        let theme_index = Theme::ALL
            .iter()
            .position(|theme| *theme == config.theme)
            .unwrap_or(0);
        self.theme_dropdown.set_selected(theme_index as u32);

        self.syncing.set(false);
    }

    /// Update the fullscreen button's label
    pub fn set_fullscreen(&self, fullscreen: bool) {
        self.fullscreen_button.set_label(if fullscreen {
            "Exit Fullscreen"
        } else {
            "Enter Fullscreen"
        });
    }
}

fn heading(text: &str) -> Label {
    let label = Label::new(Some(text));
    label.add_css_class("title-3");
    label.set_halign(Align::Start);
    label
}

fn setting_row(text: &str, control: &impl IsA<gtk4::Widget>) -> GtkBox {
    let row = GtkBox::new(Orientation::Horizontal, 8);
    let label = Label::new(Some(text));
    label.set_halign(Align::Start);
    label.set_hexpand(true);
    label.set_wrap(true);
    row.append(&label);
    row.append(control);
    row
}

fn size_label_text(vw: f64) -> String {
    format!("Text Size: ({}vw)", vw.round() as i64)
}
