use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    prelude::{Line, Span},
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::color_state::parse_hex,
    constants::DAYS_PER_WEEK,
    grid::strip_markup,
};

use super::{App, FontTarget, SaveStatus, UiMode, font_state::FontCategory};

impl App {
    pub(super) fn draw_frame(&mut self, f: &mut Frame) {
        let size = f.size();
        let (bg, fg) = self.theme_colors();

        let name = self
            .current_name
            .clone()
            .unwrap_or_else(|| self.config.title());
        let status = match self.save_status {
            SaveStatus::Saving => "Saving...",
            SaveStatus::Saved => "All changes saved",
        };
        let saved_count = format!("saved: {}", self.store.len());

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(
                Line::from(Span::styled(
                    name,
                    Style::default().add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Left),
            )
            .title(Line::from(status).alignment(Alignment::Center))
            .title(Line::from(saved_count).alignment(Alignment::Right))
            .border_style(Style::default().fg(fg));

        let inner = block.inner(size);
        f.render_widget(block, size);

        let lines = self.grid_lines(inner.width as usize);
        let paragraph = Paragraph::new(lines).style(Style::default().fg(fg).bg(bg));
        f.render_widget(paragraph, inner);

        match self.ui_mode {
            UiMode::Main => {}
            UiMode::SaveName => self.render_save_name_modal(f, size),
            UiMode::SavedList => self.render_saved_modal(f, size),
            UiMode::ColorModal => self.render_color_modal(f, size),
            UiMode::FontModal(target) => self.render_font_modal(f, size, target),
        }

        let toast = self.toast.as_ref().map(|(message, _)| message.clone());
        if let Some(message) = toast {
            render_toast(f, size, &message);
        }
    }

    fn theme_colors(&self) -> (Color, Color) {
        let bg = self
            .colors
            .bg
            .as_deref()
            .and_then(parse_hex)
            .map(|(r, g, b)| Color::Rgb(r, g, b))
            .unwrap_or(Color::Reset);
        let fg = self
            .colors
            .text
            .as_deref()
            .and_then(parse_hex)
            .map(|(r, g, b)| Color::Rgb(r, g, b))
            .unwrap_or(Color::Reset);
        (bg, fg)
    }

    fn grid_lines(&self, width: usize) -> Vec<Line<'static>> {
        let cell_width = (width / DAYS_PER_WEEK).clamp(5, 20);
        let mut lines = Vec::new();

        lines.push(Line::from(format!(
            "{}  |  week starts {}  |  holidays: {} [{}]",
            self.config.title(),
            self.grid.labels()[0],
            self.country.as_deref().unwrap_or("-"),
            if self.show_holidays { "on" } else { "off" },
        )));
        lines.push(Line::from(format!(
            "title font: {}  |  body font: {}",
            self.fonts
                .title_font
                .as_ref()
                .map_or("default", |font| font.family.as_str()),
            self.fonts
                .main_font
                .as_ref()
                .map_or("default", |font| font.family.as_str()),
        )));
        lines.push(Line::default());

        let label_spans: Vec<Span<'static>> = self
            .grid
            .labels()
            .iter()
            .map(|label| {
                Span::styled(
                    pad(label, cell_width),
                    Style::default().add_modifier(Modifier::BOLD),
                )
            })
            .collect();
        lines.push(Line::from(label_spans));

        for (row, week) in self.grid.cells().chunks(DAYS_PER_WEEK).enumerate() {
            let mut day_spans = Vec::new();
            let mut info_spans = Vec::new();

            for (column, cell) in week.iter().enumerate() {
                let position = row * DAYS_PER_WEEK + column;
                let is_cursor = position == self.cursor;
                let is_editing = cell.day.is_some() && cell.day == self.editor.editing_day();

                let day_text = match cell.day {
                    Some(day) => format!("{:>2}", day),
                    None => " ·".to_string(),
                };
                let mut day_style = Style::default();
                if is_cursor {
                    day_style = day_style.add_modifier(Modifier::REVERSED);
                }
                if is_editing {
                    day_style = day_style.add_modifier(Modifier::BOLD);
                }
                day_spans.push(Span::styled(pad(&day_text, cell_width), day_style));

                let note_text = cell
                    .notes
                    .first()
                    .map(|note| strip_markup(note))
                    .unwrap_or_default();
                let first_line = note_text.lines().next().unwrap_or("").to_string();

                let (info, info_style) = if is_editing {
                    (
                        format!("{}_", first_line),
                        Style::default().add_modifier(Modifier::UNDERLINED),
                    )
                } else if !first_line.trim().is_empty() {
                    (first_line, Style::default())
                } else if cell.holiday_visible {
                    (
                        cell.holiday.unwrap_or("").to_string(),
                        Style::default().add_modifier(Modifier::ITALIC),
                    )
                } else {
                    (String::new(), Style::default())
                };
                info_spans.push(Span::styled(pad(&clip(&info, cell_width - 1), cell_width), info_style));
            }

            lines.push(Line::from(day_spans));
            lines.push(Line::from(info_spans));
        }

        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "enter edit  m week start  h holidays  n country  o colors  t/f fonts  s save  l saved  q quit",
            Style::default().add_modifier(Modifier::DIM),
        )));

        lines
    }

    fn render_save_name_modal(&self, f: &mut Frame, size: Rect) {
        let rect = centered_rect(size, 46, 5);
        let lines = vec![
            Line::from("Name for this calendar (empty = month + year):"),
            Line::from(format!("{}_", self.name_input)),
            Line::from(Span::styled(
                "enter save  esc cancel",
                Style::default().add_modifier(Modifier::DIM),
            )),
        ];
        render_modal(f, rect, "Save calendar", lines);
    }

    fn render_saved_modal(&self, f: &mut Frame, size: Rect) {
        let height = (self.store.len() as u16 + 4).clamp(5, size.height.saturating_sub(2));
        let rect = centered_rect(size, 56, height);

        let mut lines = Vec::new();
        if self.store.is_empty() {
            lines.push(Line::from("No saved calendars yet."));
        }
        for (index, record) in self.store.records.iter().enumerate() {
            let marker = if index == self.saved_selected { "> " } else { "  " };
            let current = if self.current_id.as_deref() == Some(record.id.as_str()) {
                " (open)"
            } else {
                ""
            };
            lines.push(Line::from(format!(
                "{}{} — {} {}{}",
                marker, record.name, record.month, record.year, current
            )));
        }
        lines.push(Line::from(Span::styled(
            "enter load  x delete  esc close",
            Style::default().add_modifier(Modifier::DIM),
        )));
        render_modal(f, rect, "Saved calendars", lines);
    }

    fn render_color_modal(&self, f: &mut Frame, size: Rect) {
        let rect = centered_rect(size, 44, 14);

        let mut lines = vec![Line::from(format!("primary: {}", self.color_picker.primary()))];
        for (index, combo) in self.color_picker.combos().iter().enumerate() {
            let marker = if index == self.color_picker.active_index() {
                "> "
            } else {
                "  "
            };
            let swatch_style = match (parse_hex(&combo.bg), parse_hex(&combo.text)) {
                (Some((br, bg_, bb)), Some((tr, tg, tb))) => Style::default()
                    .bg(Color::Rgb(br, bg_, bb))
                    .fg(Color::Rgb(tr, tg, tb)),
                _ => Style::default(),
            };
            lines.push(Line::from(vec![
                Span::raw(format!("{}{}. ", marker, index + 1)),
                Span::styled(" Aa ", swatch_style),
                Span::raw(format!("  {} on {}", combo.text, combo.bg)),
            ]));
        }
        lines.push(Line::from(Span::styled(
            "←/→ pick  1-8 jump  r randomize  esc close",
            Style::default().add_modifier(Modifier::DIM),
        )));
        render_modal(f, rect, "Colors", lines);
    }

    fn render_font_modal(&self, f: &mut Frame, size: Rect, target: FontTarget) {
        let rect = centered_rect(size, 48, 17);
        let picker = self.font_picker(target);
        let title = match target {
            FontTarget::Title => "Title font",
            FontTarget::Main => "Body font",
        };

        let category_spans: Vec<Span<'static>> = FontCategory::ALL
            .iter()
            .flat_map(|category| {
                let style = if *category == picker.category() {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default().add_modifier(Modifier::DIM)
                };
                [
                    Span::styled(category.css_name().to_string(), style),
                    Span::raw("  "),
                ]
            })
            .collect();

        let mut lines = vec![Line::from(category_spans), Line::default()];

        let active_family = picker.active().map(|font| font.family.clone());
        for (row, entry) in picker.page_entries().iter().enumerate() {
            let marker = if row == self.font_selected { "> " } else { "  " };
            let check = if active_family.as_deref() == Some(entry.family) {
                " •"
            } else {
                ""
            };
            lines.push(Line::from(format!("{}{}{}", marker, entry.family, check)));
        }

        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!(
                "page {}/{}  ←/→ page  tab category  enter apply  esc close",
                picker.page() + 1,
                picker.max_page() + 1
            ),
            Style::default().add_modifier(Modifier::DIM),
        )));
        render_modal(f, rect, title, lines);
    }
}

fn render_modal(f: &mut Frame, rect: Rect, title: &str, lines: Vec<Line<'static>>) {
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title.to_string());
    let paragraph = Paragraph::new(lines).block(block);
    f.render_widget(paragraph, rect);
}

fn render_toast(f: &mut Frame, size: Rect, message: &str) {
    let width = (message.len() as u16 + 4).min(size.width.saturating_sub(2));
    let rect = Rect::new(
        size.width.saturating_sub(width + 1),
        size.height.saturating_sub(4),
        width,
        3,
    );
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    let paragraph = Paragraph::new(Line::from(format!("✓ {}", message))).block(block);
    f.render_widget(paragraph, rect);
}

fn centered_rect(size: Rect, target_width: u16, target_height: u16) -> Rect {
    let width = target_width.min(size.width.saturating_sub(2)).max(1);
    let height = target_height.min(size.height.saturating_sub(2)).max(1);
    let x = size.width.saturating_sub(width) / 2;
    let y = size.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

fn pad(value: &str, width: usize) -> String {
    let mut out = clip(value, width);
    while out.chars().count() < width {
        out.push(' ');
    }
    out
}

fn clip(value: &str, max_chars: usize) -> String {
    let count = value.chars().count();
    if count <= max_chars {
        return value.to_string();
    }
    if max_chars <= 1 {
        return value.chars().take(max_chars).collect();
    }
    let prefix: String = value.chars().take(max_chars - 1).collect();
    format!("{}…", prefix)
}
