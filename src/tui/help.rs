use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn key_line(key: &'static str, pad: usize, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(what),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        key_line("Esc / Ctrl-C", 3, "Quit"),
        key_line("Enter", 10, "Show result (stored result wins over search fields)"),
        key_line("Tab / S-Tab", 4, "Next / previous field"),
        key_line("←/→", 12, "Change selection"),
        key_line("↑/↓", 12, "Scroll vacancies"),
        key_line("Ctrl-Y", 9, "Copy link of top vacancy"),
        key_line("F1", 13, "Toggle this help"),
        Line::from(""),
        Line::from("Set \"Stored result\" back to none to run a new search."),
        Line::from("A recent search or technology replaces the typed text."),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}
