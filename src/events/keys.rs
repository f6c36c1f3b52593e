//! Key binding catalogue.
//!
//! Used by the help screen and the contextual hint bar. The bindings
//! themselves are matched where they are handled.

/// Where a key binding applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyContext {
    /// Everywhere.
    Global,
    /// Browsing a resource grid.
    Grid,
    /// A row is in edit mode.
    Editing,
    /// Typing a search term.
    Search,
    /// The reservation calendar is open.
    Calendar,
    /// A confirmation prompt is open.
    Confirm,
    /// The help screen is open.
    Help,
}

impl KeyContext {
    /// Section title in the help screen.
    pub fn display(&self) -> &'static str {
        match self {
            KeyContext::Global => "Geral",
            KeyContext::Grid => "Listagem",
            KeyContext::Editing => "Edição",
            KeyContext::Search => "Busca",
            KeyContext::Calendar => "Calendário de reservas",
            KeyContext::Confirm => "Confirmação",
            KeyContext::Help => "Ajuda",
        }
    }
}

/// One documented binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keybinding {
    /// Key combination as shown to the user.
    pub key: String,
    /// What it does.
    pub description: String,
    /// Where it applies.
    pub context: KeyContext,
}

impl Keybinding {
    fn new(key: &str, description: &str, context: KeyContext) -> Self {
        Self {
            key: key.to_string(),
            description: description.to_string(),
            context,
        }
    }
}

/// Every documented binding.
pub fn get_all_keybindings() -> Vec<Keybinding> {
    use KeyContext::*;
    vec![
        Keybinding::new("q", "Sair", Global),
        Keybinding::new("Ctrl+C", "Sair imediatamente", Global),
        Keybinding::new("?", "Mostrar ajuda", Global),
        Keybinding::new("1-9", "Abrir tela", Global),
        Keybinding::new("Tab / Shift+Tab", "Próxima / anterior tela", Global),
        Keybinding::new("j / ↓", "Próximo registro", Grid),
        Keybinding::new("k / ↑", "Registro anterior", Grid),
        Keybinding::new("g / G", "Primeiro / último registro", Grid),
        Keybinding::new("e / Enter", "Editar registro", Grid),
        Keybinding::new("] / PgDn", "Próxima página", Grid),
        Keybinding::new("[ / PgUp", "Página anterior", Grid),
        Keybinding::new("/", "Buscar", Grid),
        Keybinding::new("r", "Atualizar", Grid),
        Keybinding::new("c", "Calendário de reservas", Grid),
        Keybinding::new("n", "Nova reserva", Grid),
        Keybinding::new("d", "Excluir registro", Grid),
        Keybinding::new("Enter", "Salvar", Editing),
        Keybinding::new("Esc", "Cancelar", Editing),
        Keybinding::new("Tab / ↓", "Próximo campo", Editing),
        Keybinding::new("Shift+Tab / ↑", "Campo anterior", Editing),
        Keybinding::new("Espaço", "Alternar caixa de seleção", Editing),
        Keybinding::new("← / →", "Trocar opção", Editing),
        Keybinding::new("Enter", "Aplicar busca", Search),
        Keybinding::new("Esc", "Limpar busca", Search),
        Keybinding::new("← ↑ → ↓", "Mover dia", Calendar),
        Keybinding::new("< / >", "Mês anterior / próximo", Calendar),
        Keybinding::new("Enter", "Escolher data", Calendar),
        Keybinding::new("Esc", "Fechar", Calendar),
        Keybinding::new("s / Enter", "Confirmar", Confirm),
        Keybinding::new("n / Esc", "Cancelar", Confirm),
        Keybinding::new("j / k", "Rolar", Help),
        Keybinding::new("? / q / Esc", "Fechar ajuda", Help),
    ]
}

/// Bindings grouped by context, in catalogue order.
pub fn get_keybindings_grouped() -> Vec<(KeyContext, Vec<Keybinding>)> {
    let mut groups: Vec<(KeyContext, Vec<Keybinding>)> = Vec::new();
    for binding in get_all_keybindings() {
        match groups.iter_mut().find(|(context, _)| *context == binding.context) {
            Some((_, bindings)) => bindings.push(binding),
            None => groups.push((binding.context, vec![binding])),
        }
    }
    groups
}

/// One-line hint for the status bar. Keys are in brackets.
pub fn get_context_hints(context: KeyContext) -> &'static str {
    match context {
        KeyContext::Global | KeyContext::Grid => {
            "[j/k] navegar  [e] editar  [d] excluir  [[/]] página  [/] buscar  [r] atualizar  [?] ajuda  [q] sair"
        }
        KeyContext::Editing => "[Tab] campo  [Enter] salvar  [Esc] cancelar",
        KeyContext::Search => "[Enter] buscar  [Esc] limpar",
        KeyContext::Calendar => "[←↑→↓] dia  [</>] mês  [Enter] escolher  [Esc] fechar",
        KeyContext::Confirm => "[s] confirmar  [n] cancelar",
        KeyContext::Help => "[j/k] rolar  [Esc] fechar",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping_keeps_catalogue_order() {
        let groups = get_keybindings_grouped();
        let contexts: Vec<KeyContext> = groups.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            contexts,
            vec![
                KeyContext::Global,
                KeyContext::Grid,
                KeyContext::Editing,
                KeyContext::Search,
                KeyContext::Calendar,
                KeyContext::Confirm,
                KeyContext::Help,
            ]
        );
        let total: usize = groups.iter().map(|(_, b)| b.len()).sum();
        assert_eq!(total, get_all_keybindings().len());
    }

    #[test]
    fn test_hints_mention_save_while_editing() {
        assert!(get_context_hints(KeyContext::Editing).contains("salvar"));
    }

    #[test]
    fn test_confirm_hints() {
        let hints = get_context_hints(KeyContext::Confirm);
        assert!(hints.contains("confirmar"));
        assert!(hints.contains("cancelar"));
    }
}
