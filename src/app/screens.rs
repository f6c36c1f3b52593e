//! Column sets for each resource screen.
//!
//! A screen pairs a [`Resource`] with the grid columns used to show it and
//! the edit rights of the current role. Read-only screens mark every column
//! non-editable and drop the actions column.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ratatui::style::{Color, Style};
use serde_json::Value;

use crate::api::Resource;
use crate::config::Role;
use crate::grid::{
    display_text, reservation_status_options, CellError, CellView, ChoiceEditor, Column,
    InputType, Row, SelectOption, ToggleEditor,
};

type CellResult = Result<CellView, CellError>;

/// One resource screen.
#[derive(Debug, Clone)]
pub struct Screen {
    resource: Resource,
    columns: Vec<Column>,
    editable: bool,
}

impl Screen {
    /// Build the screen of `resource` as seen by `role`.
    pub fn new(resource: Resource, role: Role) -> Self {
        let editable = role.can_edit(resource);
        let mut columns = columns_for(resource, role);
        if editable {
            columns.push(Column::actions().width(12));
        } else {
            columns = columns.into_iter().map(|c| c.editable(false)).collect();
        }
        Self {
            resource,
            columns,
            editable,
        }
    }

    /// The resource shown.
    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Columns for the grid.
    pub fn columns(&self) -> Vec<Column> {
        self.columns.clone()
    }

    /// Whether rows may be edited at all.
    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Column heading each card in the compact layout, when the first
    /// column does not identify the record.
    pub fn title_column(&self) -> Option<&'static str> {
        match self.resource {
            Resource::Units => Some("identificacao_completa"),
            Resource::Packages => Some("destinatario_nome"),
            Resource::Visitors => Some("nome"),
            _ => None,
        }
    }

    /// Base style of the grid: read-only screens are dimmed.
    pub fn style(&self) -> Style {
        if self.editable {
            Style::default()
        } else {
            Style::default().fg(Color::Gray)
        }
    }

    /// Whether the reservation calendar can be opened from this screen.
    pub fn has_calendar(&self) -> bool {
        self.editable && self.resource == Resource::Reservations
    }

    /// Restrict a saved row to the fields this screen edits.
    ///
    /// The grid hands back the whole merged row; the backend only accepts
    /// writable fields.
    pub fn payload(&self, data: &Row) -> Row {
        let mut payload = Row::new();
        for column in self.columns.iter().filter(|c| c.editable == Some(true)) {
            if let Some(value) = data.get(&column.key) {
                payload.set(column.key.clone(), value.clone());
            }
        }
        payload
    }
}

fn columns_for(resource: Resource, role: Role) -> Vec<Column> {
    match resource {
        Resource::Users => vec![
            Column::new("full_name").header("Nome").width(22).editable(true),
            Column::new("username").header("Usuário").width(14).editable(false),
            Column::new("email").header("E-mail").width(22).editable(true),
            Column::new("phone").header("Telefone").width(14).editable(true),
            active_column(),
        ],
        Resource::Units => vec![
            Column::new("numero").header("Número").width(12).editable(true),
            Column::new("bloco").header("Bloco").width(12).editable(true),
            Column::new("identificacao_completa")
                .header("Identificação")
                .width(26)
                .editable(false),
            created_column("Criado em"),
            active_column(),
        ],
        Resource::Spaces => vec![
            Column::new("nome").header("Nome").width(35).editable(true),
            Column::new("capacidade_pessoas")
                .header("Capacidade")
                .width(15)
                .editable(true)
                .input_type(InputType::Number)
                .render(capacity_view),
            created_column("Criado em"),
            active_column(),
        ],
        Resource::Reservations => vec![
            Column::new("espaco_nome").header("Espaço").width(22).editable(false),
            Column::new("morador_nome").header("Morador").width(22).editable(false),
            Column::new("data_reserva")
                .header("Data")
                .width(13)
                .editable(true)
                .input_type(InputType::Date)
                .render(date_view),
            Column::new("valor_cobrado")
                .header("Valor")
                .width(11)
                .editable(false)
                .render(money_view),
            Column::new("status")
                .header("Status")
                .width(12)
                .editable(role != Role::Morador)
                .edit_component(ChoiceEditor::new("status", reservation_status_options()))
                .render(|value: Option<&Value>, _: &Row| {
                    choice_view(&reservation_status_options(), value)
                }),
            created_column("Criado em"),
        ],
        Resource::Events => vec![
            Column::new("titulo").header("Título").width(18).editable(true),
            Column::new("descricao")
                .header("Descrição")
                .width(22)
                .editable(true)
                .render(optional_view),
            Column::new("local_texto")
                .header("Local")
                .width(14)
                .editable(true)
                .render(optional_view),
            Column::new("datetime_inicio")
                .header("Início")
                .width(15)
                .editable(true)
                .input_type(InputType::DateTime)
                .render(datetime_view),
            Column::new("datetime_fim")
                .header("Fim")
                .width(15)
                .editable(true)
                .input_type(InputType::DateTime)
                .render(datetime_view),
            Column::new("data_evento")
                .header("Data")
                .editable(false)
                .render(date_view),
            Column::new("hora_inicio")
                .header("Horário")
                .editable(false)
                .render(time_view),
        ],
        Resource::Notices => {
            let priorities = vec![
                SelectOption::new("baixa", "Baixa"),
                SelectOption::new("media", "Média"),
                SelectOption::new("alta", "Alta"),
                SelectOption::new("urgente", "Urgente"),
            ];
            let statuses = vec![
                SelectOption::new("rascunho", "Rascunho"),
                SelectOption::new("ativo", "Ativo"),
                SelectOption::new("inativo", "Inativo"),
            ];
            let priority_labels = priorities.clone();
            let status_labels = statuses.clone();
            vec![
                Column::new("titulo").header("Título").width(20).editable(true),
                Column::new("descricao")
                    .header("Descrição")
                    .width(26)
                    .editable(true)
                    .render(optional_view),
                Column::new("grupo_nome").header("Grupo").width(10).editable(false),
                Column::new("prioridade")
                    .header("Prioridade")
                    .width(10)
                    .editable(true)
                    .edit_component(ChoiceEditor::new("prioridade", priorities))
                    .render(move |value: Option<&Value>, _: &Row| choice_view(&priority_labels, value)),
                Column::new("status")
                    .header("Status")
                    .width(10)
                    .editable(true)
                    .edit_component(ChoiceEditor::new("status", statuses))
                    .render(move |value: Option<&Value>, _: &Row| choice_view(&status_labels, value)),
                Column::new("data_inicio")
                    .header("Início")
                    .width(12)
                    .editable(true)
                    .input_type(InputType::DateTime)
                    .render(datetime_view),
                Column::new("data_fim")
                    .header("Fim")
                    .width(12)
                    .editable(true)
                    .input_type(InputType::DateTime)
                    .render(datetime_view),
            ]
        }
        Resource::Packages => vec![
            Column::new("unidade_info").header("Unidade").width(12).editable(false),
            Column::new("destinatario_nome")
                .header("Destinatário")
                .width(16)
                .editable(false),
            Column::new("descricao").header("Descrição").width(18).editable(true),
            Column::new("codigo_rastreio")
                .header("Código Rastreio")
                .width(14)
                .editable(true)
                .render(optional_view),
            Column::new("retirado_por")
                .header("Retirado Por")
                .width(12)
                .editable(true),
            Column::new("retirado_em")
                .header("Data Retirada")
                .width(12)
                .editable(true)
                .input_type(InputType::DateTime)
                .render(datetime_view),
            created_column("Cadastrada em"),
        ],
        Resource::Visitors => vec![
            Column::new("morador_nome").header("Morador").width(16).editable(false),
            Column::new("nome").header("Nome").width(18).editable(true),
            Column::new("documento").header("Documento").width(14).editable(true),
            Column::new("data_entrada")
                .header("Entrada")
                .width(14)
                .editable(true)
                .input_type(InputType::DateTime)
                .render(datetime_view),
            Column::new("data_saida")
                .header("Saída")
                .width(14)
                .editable(true)
                .input_type(InputType::DateTime)
                .render(|value: Option<&Value>, row: &Row| {
                    // Permanent visitors never leave.
                    if row.get("is_permanente") == Some(&Value::Bool(true)) {
                        return Ok(CellView::Hidden);
                    }
                    datetime_view(value, row)
                }),
            Column::new("is_permanente")
                .header("Permanente")
                .width(10)
                .editable(true)
                .input_type(InputType::Checkbox)
                .edit_component(ToggleEditor::new("is_permanente", "Sim", "Não")),
        ],
        Resource::Vehicles => vec![
            Column::new("placa")
                .header("Placa")
                .width(14)
                .editable(true)
                .render(|value: Option<&Value>, _: &Row| {
                    Ok(CellView::text(display_text(value).to_uppercase()))
                }),
            Column::new("marca_modelo")
                .header("Marca e Modelo")
                .width(30)
                .editable(true),
            Column::new("morador_nome").header("Morador").width(20).editable(false),
            created_column("Data de Cadastro"),
        ],
    }
}

fn active_column() -> Column {
    Column::new("is_active")
        .header("Status")
        .width(10)
        .editable(true)
        .input_type(InputType::Checkbox)
        .edit_component(ToggleEditor::new("is_active", "Ativo", "Inativo"))
        .render(active_view)
}

fn created_column(title: &str) -> Column {
    Column::new("created_on")
        .header(title)
        .width(12)
        .editable(false)
        .render(date_view)
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

/// Omit empty optional fields from cards.
fn optional_view(value: Option<&Value>, _: &Row) -> CellResult {
    if is_blank(value) {
        Ok(CellView::Hidden)
    } else {
        Ok(CellView::text(display_text(value)))
    }
}

fn active_view(value: Option<&Value>, _: &Row) -> CellResult {
    match value {
        Some(Value::Bool(true)) => Ok(CellView::text("Ativo")),
        Some(Value::Bool(false)) | None | Some(Value::Null) => Ok(CellView::text("Inativo")),
        Some(other) => Err(CellError::new(format!("not a boolean: {}", other))),
    }
}

fn capacity_view(value: Option<&Value>, _: &Row) -> CellResult {
    let count = match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| CellError::new(format!("not a count: {}", s)))?,
        Some(other) => return Err(CellError::new(format!("not a count: {}", other))),
    };
    Ok(CellView::text(format!("{} pessoas", count)))
}

fn money_view(value: Option<&Value>, _: &Row) -> CellResult {
    let amount = match value {
        None | Some(Value::Null) => 0.0,
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| CellError::new(format!("not an amount: {}", s)))?,
        Some(other) => return Err(CellError::new(format!("not an amount: {}", other))),
    };
    Ok(CellView::text(format!("R$ {:.2}", amount)))
}

fn choice_view(options: &[SelectOption], value: Option<&Value>) -> CellResult {
    let text = display_text(value);
    let label = options
        .iter()
        .find(|o| o.value == text)
        .map(|o| o.label.clone())
        .unwrap_or(text);
    Ok(CellView::text(label))
}

/// `YYYY-MM-DD` or a timestamp as `dd/mm/yyyy`.
fn date_view(value: Option<&Value>, _: &Row) -> CellResult {
    let Some(text) = value.and_then(Value::as_str).filter(|s| !s.is_empty()) else {
        return Ok(CellView::text("-"));
    };
    let date = text
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .ok_or_else(|| CellError::new(format!("not a date: {}", text)))?;
    Ok(CellView::text(date.format("%d/%m/%Y").to_string()))
}

/// A timestamp as `dd/mm/yyyy HH:MM`, in the timestamp's own offset.
fn datetime_view(value: Option<&Value>, _: &Row) -> CellResult {
    let Some(text) = value.and_then(Value::as_str).filter(|s| !s.is_empty()) else {
        return Ok(CellView::text("-"));
    };
    let parsed = DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M"))
        .map_err(|_| CellError::new(format!("not a timestamp: {}", text)))?;
    Ok(CellView::text(parsed.format("%d/%m/%Y %H:%M").to_string()))
}

/// `HH:MM:SS` shortened to `HH:MM`.
fn time_view(value: Option<&Value>, _: &Row) -> CellResult {
    let text = display_text(value);
    Ok(CellView::text(text.get(..5).unwrap_or(&text).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Viewer;
    use serde_json::json;

    fn row(value: Value) -> Row {
        Row::from_value(value).unwrap()
    }

    fn text(view: CellResult) -> String {
        match view.unwrap() {
            CellView::Shown(line) => line.to_string(),
            CellView::Hidden => "<hidden>".to_string(),
        }
    }

    #[test]
    fn test_every_resource_has_a_first_data_column() {
        for resource in Resource::ALL {
            let screen = Screen::new(*resource, Role::Admin);
            let first = &screen.columns()[0];
            assert!(!first.is_actions());
            assert!(screen.is_editable());
            assert!(screen.columns().iter().any(Column::is_actions));
        }
    }

    #[test]
    fn test_read_only_screen() {
        let screen = Screen::new(Resource::Notices, Role::Morador);
        assert!(!screen.is_editable());
        assert!(!screen.has_calendar());
        assert!(screen.columns().iter().all(|c| c.editable == Some(false)));
        assert!(!screen.columns().iter().any(Column::is_actions));
    }

    #[test]
    fn test_title_columns_exist() {
        for resource in Resource::ALL {
            let screen = Screen::new(*resource, Role::Admin);
            if let Some(key) = screen.title_column() {
                assert!(screen.columns().iter().any(|c| c.key == key), "{resource}");
            }
        }
    }

    #[test]
    fn test_read_only_screens_are_dimmed() {
        assert_eq!(Screen::new(Resource::Notices, Role::Morador).style().fg, Some(Color::Gray));
        assert_eq!(Screen::new(Resource::Notices, Role::Admin).style(), Style::default());
    }

    #[test]
    fn test_resident_reschedules_but_cannot_confirm() {
        let screen = Screen::new(Resource::Reservations, Role::Morador);
        assert!(screen.has_calendar());
        let data = row(json!({
            "id": 4, "espaco_nome": "Salão", "data_reserva": "2025-03-10",
            "status": "confirmada", "valor_cobrado": "50.00"
        }));
        let payload = screen.payload(&data);
        assert_eq!(payload.to_value(), json!({"data_reserva": "2025-03-10"}));
    }

    #[test]
    fn test_payload_keeps_only_writable_fields() {
        let screen = Screen::new(Resource::Units, Role::Sindico);
        let data = row(json!({
            "id": 1, "numero": "101", "bloco": "A",
            "identificacao_completa": "Bloco A - 101", "created_on": "2025-01-01",
            "is_active": true
        }));
        assert_eq!(
            screen.payload(&data).to_value(),
            json!({"numero": "101", "bloco": "A", "is_active": true})
        );
    }

    #[test]
    fn test_date_views() {
        let r = Row::new();
        assert_eq!(text(date_view(Some(&json!("2025-03-09")), &r)), "09/03/2025");
        assert_eq!(
            text(date_view(Some(&json!("2025-03-09T14:00:00Z")), &r)),
            "09/03/2025"
        );
        assert_eq!(text(date_view(None, &r)), "-");
        assert!(date_view(Some(&json!("ontem")), &r).is_err());

        assert_eq!(
            text(datetime_view(Some(&json!("2025-03-09T14:30:00-03:00")), &r)),
            "09/03/2025 14:30"
        );
        assert_eq!(
            text(datetime_view(Some(&json!("2025-03-09T08:05")), &r)),
            "09/03/2025 08:05"
        );
        assert_eq!(text(time_view(Some(&json!("19:30:00")), &r)), "19:30");
    }

    #[test]
    fn test_money_and_capacity() {
        let r = Row::new();
        assert_eq!(text(money_view(Some(&json!("50")), &r)), "R$ 50.00");
        assert_eq!(text(money_view(Some(&json!(12.5)), &r)), "R$ 12.50");
        assert_eq!(text(money_view(None, &r)), "R$ 0.00");
        assert!(money_view(Some(&json!("grátis")), &r).is_err());
        assert_eq!(text(capacity_view(Some(&json!(80)), &r)), "80 pessoas");
    }

    #[test]
    fn test_optional_and_permanent_visitor_are_hidden() {
        let r = Row::new();
        assert_eq!(text(optional_view(Some(&json!("  ")), &r)), "<hidden>");
        assert_eq!(text(optional_view(Some(&json!("Piscina")), &r)), "Piscina");

        let screen = Screen::new(Resource::Visitors, Role::Portaria);
        let saida = screen
            .columns()
            .into_iter()
            .find(|c| c.key == "data_saida")
            .unwrap();
        let visitor = row(json!({"id": 1, "is_permanente": true, "data_saida": null}));
        let view = saida.renderer().unwrap().view(visitor.get("data_saida"), &visitor);
        assert_eq!(view.unwrap(), CellView::Hidden);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(
            text(choice_view(&reservation_status_options(), Some(&json!("pendente")))),
            "Pendente"
        );
        assert_eq!(
            text(choice_view(&reservation_status_options(), Some(&json!("outro")))),
            "outro"
        );
        assert_eq!(text(active_view(Some(&json!(false)), &Row::new())), "Inativo");
        assert!(active_view(Some(&json!("sim")), &Row::new()).is_err());
    }
}
