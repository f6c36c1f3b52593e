//! Wide layout: one table row per record.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row as TableRow, Table, TableState},
    Frame,
};

use super::{BodyState, DataGrid, EMPTY_TEXT, LOADING_TEXT};

/// Width constraints: declared percentages, remaining columns share the rest.
fn column_widths(grid: &DataGrid) -> Vec<Constraint> {
    grid.columns()
        .iter()
        .map(|column| match column.width {
            Some(percent) => Constraint::Percentage(percent),
            None => Constraint::Fill(1),
        })
        .collect()
}

pub(super) fn render(grid: &DataGrid, frame: &mut Frame, area: Rect) {
    let border_color = if grid.is_editing() {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .style(grid.style());
    if let Some(title) = grid.title() {
        block = block.title(format!(" {} ", title));
    }
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [body, footer] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

    let header = TableRow::new(
        grid.columns()
            .iter()
            .map(|column| Cell::from(column.title().to_string())),
    )
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    match grid.body_state() {
        BodyState::Rows => {
            let rows = grid.rows().iter().map(|row| {
                let cells = grid
                    .columns()
                    .iter()
                    .map(|column| Cell::from(grid.table_cell(row, column)));
                let table_row = TableRow::new(cells);
                if grid.is_row_editing(row) {
                    table_row.style(Style::default().add_modifier(Modifier::BOLD))
                } else {
                    table_row
                }
            });

            let table = Table::new(rows, column_widths(grid))
                .header(header)
                .highlight_style(Style::default().bg(Color::DarkGray))
                .highlight_symbol("▶ ");
            let mut state = TableState::default().with_selected(Some(grid.selected_index()));
            frame.render_stateful_widget(table, body, &mut state);
        }
        state => {
            let table = Table::new(Vec::<TableRow>::new(), column_widths(grid)).header(header);
            frame.render_widget(table, body);

            let text = if state == BodyState::Loading {
                LOADING_TEXT
            } else {
                EMPTY_TEXT
            };
            let placeholder_area = Rect {
                y: body.y.saturating_add(1),
                height: body.height.saturating_sub(1),
                ..body
            };
            let placeholder = Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(placeholder, placeholder_area);
        }
    }

    frame.render_widget(Paragraph::new(pagination_line(grid)), footer);
}

/// `◀ Anterior  Página X de Y  Próxima ▶` with disabled controls dimmed.
fn pagination_line(grid: &DataGrid) -> Line<'static> {
    let has_rows = !grid.rows().is_empty();
    let pagination = grid.pagination();
    let control = |label: &'static str, enabled: bool| {
        let style = if enabled {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(label, style)
    };

    Line::from(vec![
        control("◀ Anterior", pagination.prev_enabled(has_rows)),
        Span::raw("  "),
        Span::raw(pagination.label(has_rows)),
        Span::raw("  "),
        control("Próxima ▶", pagination.next_enabled(has_rows)),
    ])
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use serde_json::json;

    use super::*;
    use crate::grid::{Column, Row, RowId};

    fn buffer_lines(buffer: &Buffer) -> Vec<String> {
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|line| line.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    fn draw(grid: &DataGrid, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| grid.render(frame, frame.area())).unwrap();
        buffer_lines(terminal.backend().buffer())
    }

    fn sample_grid() -> DataGrid {
        let mut grid = DataGrid::new(vec![
            Column::new("nome").header("Nome").editable(true),
            Column::new("bloco").header("Bloco"),
            Column::actions(),
        ])
        .with_title("Unidades");
        grid.set_data(vec![
            Row::from_value(json!({"id": 1, "nome": "Ana", "bloco": "A"})).unwrap(),
            Row::from_value(json!({"id": 2, "nome": "Bia", "bloco": null})).unwrap(),
        ]);
        grid
    }

    #[test]
    fn test_renders_headers_rows_and_pagination() {
        let mut grid = sample_grid();
        grid.set_pagination(1, 3);
        let lines = draw(&grid, 70, 8).join("\n");

        assert!(lines.contains("Unidades"));
        assert!(lines.contains("Nome"));
        assert!(lines.contains("Ações"));
        assert!(lines.contains("Ana"));
        assert!(lines.contains("Página 1 de 3"));
        assert!(lines.contains("Próxima ▶"));
    }

    #[test]
    fn test_loading_placeholder_replaces_rows() {
        let mut grid = sample_grid();
        grid.set_loading(true);
        let lines = draw(&grid, 70, 8).join("\n");
        assert!(lines.contains(LOADING_TEXT));
        assert!(!lines.contains("Ana"));
        assert!(lines.contains("Nome"));
    }

    #[test]
    fn test_empty_placeholder_and_label() {
        let mut grid = sample_grid();
        grid.set_data(Vec::new());
        let lines = draw(&grid, 70, 8).join("\n");
        assert!(lines.contains(EMPTY_TEXT));
        assert!(lines.contains("Sem registros"));
    }

    #[test]
    fn test_edit_row_shows_inputs_and_save_markers() {
        let mut grid = sample_grid();
        grid.start_edit(&RowId::Int(1)).unwrap();
        let lines = draw(&grid, 70, 8).join("\n");
        assert!(lines.contains("[Ana"));
        assert!(lines.contains("✓ ✗"));
        // Other rows stay in view mode
        assert!(lines.contains("✎"));
    }

    #[test]
    fn test_pagination_controls_dimmed_at_bounds() {
        let mut grid = sample_grid();
        grid.set_pagination(1, 2);
        let line = pagination_line(&grid);
        assert_eq!(line.spans[0].style.fg, Some(Color::DarkGray));
        assert_eq!(line.spans[4].style.fg, Some(Color::Cyan));
    }
}
