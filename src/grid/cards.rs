//! Compact layout: one bordered card per record.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{BodyState, CardField, DataGrid, EMPTY_TEXT, LOADING_TEXT};

/// Borders plus the action line.
const CARD_CHROME: u16 = 3;

fn card_height(fields: usize) -> u16 {
    fields as u16 + CARD_CHROME
}

/// First card index to draw so the selected card is fully visible.
fn first_visible(heights: &[u16], selected: usize, available: u16) -> usize {
    let mut used = 0u16;
    let mut first = selected.min(heights.len().saturating_sub(1));
    for index in (0..=first).rev() {
        used = used.saturating_add(heights[index]);
        if used > available {
            break;
        }
        first = index;
    }
    first
}

pub(super) fn render(grid: &DataGrid, frame: &mut Frame, area: Rect) {
    let state = grid.body_state();
    if state != BodyState::Rows {
        let text = if state == BodyState::Loading {
            LOADING_TEXT
        } else {
            EMPTY_TEXT
        };
        let placeholder = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .style(grid.style()),
            );
        frame.render_widget(placeholder, area);
        return;
    }

    let (cards_area, footer) = if grid.pagination().shown_in_cards() {
        let [cards, footer] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
        (cards, Some(footer))
    } else {
        (area, None)
    };

    let cards: Vec<(String, Vec<CardField>, bool)> = grid
        .rows()
        .iter()
        .map(|row| (grid.card_title(row), grid.card_fields(row), grid.is_row_editing(row)))
        .collect();
    let heights: Vec<u16> = cards.iter().map(|(_, fields, _)| card_height(fields.len())).collect();
    let first = first_visible(&heights, grid.selected_index(), cards_area.height);

    let mut y = cards_area.y;
    let bottom = cards_area.y.saturating_add(cards_area.height);
    for (index, (title, fields, editing)) in cards.into_iter().enumerate().skip(first) {
        if y >= bottom {
            break;
        }
        let height = heights[index].min(bottom - y);
        let card_area = Rect {
            y,
            height,
            ..cards_area
        };
        render_card(grid, frame, card_area, title, fields, editing, index == grid.selected_index());
        y = y.saturating_add(height);
    }

    if let Some(footer) = footer {
        frame.render_widget(Paragraph::new(pagination_line(grid)), footer);
    }
}

fn render_card(
    grid: &DataGrid,
    frame: &mut Frame,
    area: Rect,
    title: String,
    fields: Vec<CardField>,
    editing: bool,
    selected: bool,
) {
    let border_color = if editing {
        Color::Yellow
    } else if selected {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .style(grid.style());

    let mut lines: Vec<Line> = fields.into_iter().map(field_line).collect();
    lines.push(actions_line(editing));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn field_line(field: CardField) -> Line<'static> {
    let label_style = if field.focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut spans = vec![Span::styled(format!("{}: ", field.label), label_style)];
    spans.extend(field.content.spans);
    Line::from(spans)
}

fn actions_line(editing: bool) -> Line<'static> {
    if editing {
        Line::from(vec![
            Span::styled("[Enter] Salvar", Style::default().fg(Color::Green)),
            Span::raw("  "),
            Span::styled("[Esc] Cancelar", Style::default().fg(Color::Red)),
        ])
    } else {
        Line::from(Span::styled("[e] Editar", Style::default().fg(Color::Cyan)))
    }
}

/// `‹ Anterior  X / Y  Próxima ›` with disabled controls dimmed.
fn pagination_line(grid: &DataGrid) -> Line<'static> {
    let pagination = grid.pagination();
    let has_rows = !grid.rows().is_empty();
    let control = |label: &'static str, enabled: bool| {
        let style = if enabled {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(label, style)
    };
    Line::from(vec![
        control("‹ Anterior", pagination.prev_enabled(has_rows)),
        Span::raw(format!(
            "  {} / {}  ",
            pagination.current_page(),
            pagination.total_pages()
        )),
        control("Próxima ›", pagination.next_enabled(has_rows)),
    ])
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use serde_json::json;

    use super::*;
    use crate::grid::{CellView, Column, LayoutMode, Row, RowId};

    fn buffer_lines(buffer: &Buffer) -> Vec<String> {
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|line| line.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    fn draw(grid: &DataGrid, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| grid.render(frame, frame.area())).unwrap();
        buffer_lines(terminal.backend().buffer()).join("\n")
    }

    fn compact_grid() -> DataGrid {
        let mut grid = DataGrid::new(vec![
            Column::new("titulo").header("Título"),
            Column::new("local").header("Local"),
            Column::new("nota")
                .header("Nota")
                .render(|value, _| match value {
                    Some(v) if !v.is_null() => Ok(CellView::text(v.to_string())),
                    _ => Ok(CellView::Hidden),
                }),
            Column::actions(),
        ]);
        grid.set_layout(LayoutMode::Compact);
        grid.set_data(vec![
            Row::from_value(json!({"id": 1, "titulo": "Festa", "local": "Salão", "nota": null})).unwrap(),
            Row::from_value(json!({"id": 2, "titulo": "Reunião", "local": "Hall", "nota": 5})).unwrap(),
        ]);
        grid
    }

    #[test]
    fn test_first_visible_keeps_selection_on_screen() {
        let heights = [5, 5, 5, 5];
        assert_eq!(first_visible(&heights, 0, 12), 0);
        assert_eq!(first_visible(&heights, 1, 12), 0);
        assert_eq!(first_visible(&heights, 3, 12), 2);
        assert_eq!(first_visible(&heights, 3, 3), 3);
    }

    #[test]
    fn test_cards_show_title_fields_and_actions() {
        let grid = compact_grid();
        let screen = draw(&grid, 40, 14);
        assert!(screen.contains("Título: Festa"));
        assert!(screen.contains("Local: Salão"));
        assert!(screen.contains("[e] Editar"));
        assert!(!screen.contains("Ações"));
    }

    #[test]
    fn test_title_column_heads_cards() {
        let grid = compact_grid().with_title_column("local");
        let screen = draw(&grid, 40, 14);
        assert!(screen.contains("┌ Local: Salão "));
        assert!(!screen.contains("┌ Título: Festa "));
        assert_eq!(grid.card_title(&grid.rows()[1]), "Local: Hall");

        // An unknown key falls back to the first column
        let grid = compact_grid().with_title_column("nao_existe");
        assert_eq!(grid.card_title(&grid.rows()[0]), "Título: Festa");
    }

    #[test]
    fn test_hidden_field_is_not_drawn() {
        let grid = compact_grid();
        let screen = draw(&grid, 40, 14);
        // Only the second record has a note
        assert_eq!(screen.matches("Nota:").count(), 1);
    }

    #[test]
    fn test_editing_card_shows_save_and_cancel() {
        let mut grid = compact_grid();
        grid.start_edit(&RowId::Int(1)).unwrap();
        let screen = draw(&grid, 40, 14);
        assert!(screen.contains("[Enter] Salvar"));
        assert!(screen.contains("[Esc] Cancelar"));
        assert!(screen.contains("Título: [Festa"));
    }

    #[test]
    fn test_single_page_hides_pagination() {
        let mut grid = compact_grid();
        grid.set_pagination(1, 1);
        assert!(!draw(&grid, 40, 14).contains("Anterior"));

        grid.set_pagination(1, 2);
        assert!(draw(&grid, 40, 14).contains("1 / 2"));
    }

    #[test]
    fn test_placeholders() {
        let mut grid = compact_grid();
        grid.set_loading(true);
        assert!(draw(&grid, 40, 6).contains(LOADING_TEXT));

        grid.set_loading(false);
        grid.set_data(Vec::new());
        assert!(draw(&grid, 40, 6).contains(EMPTY_TEXT));
    }
}
