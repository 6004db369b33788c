//! Rendering for the single upload screen.
//!
//! Layout, top to bottom: title and subtitle, path input, stratify selector,
//! status region, save notice, key hints. Colors come from the palette that
//! matches the theme flag at draw time.

pub mod runtime;

use arffsplit_types::StratifyOption;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use crate::{
    app::{App, Notice, StatusView},
    theme::{Theme, theme_for},
};

pub fn draw(frame: &mut Frame, app: &App) {
    let theme = theme_for(app.is_dark());
    let area = frame.area();
    frame.render_widget(Block::default().style(theme.base_style()), area);

    let [header, input, stratify, status, notice, hints] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(4),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .areas(area);

    render_header(frame, header, app, theme);
    render_input(frame, input, app, theme);
    frame.render_widget(Paragraph::new(stratify_line(app, theme)), stratify);
    render_status(frame, status, app, theme);
    if let Some(line) = notice_line(app, theme) {
        frame.render_widget(Paragraph::new(line), notice);
    }
    frame.render_widget(Paragraph::new(Span::styled(app.locale().key_hints(), theme.text_muted_style())), hints);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App, theme: &dyn Theme) {
    let locale = app.locale();
    let lines = vec![
        Line::from(Span::styled(locale.title(), theme.accent_emphasis_style())),
        Line::from(Span::styled(locale.subtitle(), theme.text_secondary_style())),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn render_input(frame: &mut Frame, area: Rect, app: &App, theme: &dyn Theme) {
    let locale = app.locale();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border_style(!app.workflow.is_loading()))
        .title(Span::styled(format!(" {} ", locale.file_label()), theme.text_secondary_style()));
    let inner = block.inner(area);

    let content = if app.path_input.text().is_empty() {
        Span::styled(format!("{} (.arff)", locale.picker_hint()), theme.text_muted_style())
    } else {
        Span::styled(app.path_input.text(), theme.text_primary_style())
    };
    frame.render_widget(Paragraph::new(content).block(block), area);

    let offset = u16::try_from(app.path_input.width()).unwrap_or(u16::MAX);
    let x = inner.x.saturating_add(offset).min(inner.right().saturating_sub(1));
    frame.set_cursor_position(Position::new(x, inner.y));
}

fn stratify_line(app: &App, theme: &dyn Theme) -> Line<'static> {
    let current = app.stratify();
    let mut spans = vec![Span::styled(format!("{}: ", app.locale().stratify_label()), theme.text_secondary_style())];
    for option in StratifyOption::ALL {
        let style = if option == current {
            theme.accent_emphasis_style().add_modifier(Modifier::REVERSED)
        } else {
            theme.text_muted_style()
        };
        spans.push(Span::styled(format!(" {option} "), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn render_status(frame: &mut Frame, area: Rect, app: &App, theme: &dyn Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border_style(false));
    let paragraph = Paragraph::new(status_lines(app, theme)).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn status_lines(app: &App, theme: &dyn Theme) -> Vec<Line<'static>> {
    let locale = app.locale();
    match app.status_view() {
        StatusView::Prompt => vec![Line::from(Span::styled(locale.idle_prompt(), theme.text_muted_style()))],
        StatusView::Processing { frame, file_name } => vec![Line::from(vec![
            Span::styled(format!("{frame} "), theme.status_info()),
            Span::styled(locale.processing(), theme.text_primary_style()),
            Span::styled(format!("  {file_name}"), theme.text_muted_style()),
        ])],
        StatusView::Error { message } => vec![
            Line::from(Span::styled(locale.error_heading(), theme.status_error().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(message, theme.status_error())),
        ],
        StatusView::Success { file_name, size } => vec![
            Line::from(Span::styled(locale.success(), theme.status_success().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(format!("{file_name} ({})", format_size(size)), theme.text_secondary_style())),
            Line::from(vec![
                Span::styled("Ctrl+D ", theme.accent_emphasis_style()),
                Span::styled(locale.download_again(), theme.text_primary_style()),
            ]),
        ],
    }
}

fn notice_line(app: &App, theme: &dyn Theme) -> Option<Line<'static>> {
    let locale = app.locale();
    let line = match app.notice.as_ref()? {
        Notice::Saved(path) => Line::from(vec![
            Span::styled(format!("{}: ", locale.saved_to()), theme.text_secondary_style()),
            Span::styled(path.clone(), theme.status_success()),
        ]),
        Notice::SaveFailed(reason) => Line::from(vec![
            Span::styled(format!("{}: ", locale.save_failed()), theme.status_error()),
            Span::styled(reason.clone(), theme.text_muted_style()),
        ]),
    };
    Some(line)
}

fn format_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 { format!("{bytes} B") } else { format!("{value:.1} {}", UNITS[unit]) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::app_with;
    use arffsplit_types::{SelectedFile, SubmissionFailure};

    fn text(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn sizes_are_human_readable() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024 + 1024 * 512), "5.5 MB");
    }

    #[tokio::test]
    async fn error_status_shows_heading_and_message() {
        let (mut app, _pref) = app_with(Err(SubmissionFailure::Transport("unused".into())));
        app.workflow.pick_file(SelectedFile::from_path("notes.txt").unwrap());
        let theme = theme_for(app.is_dark());

        assert_eq!(
            text(&status_lines(&app, theme)),
            vec![
                "Error while processing the file".to_string(),
                "Only ARFF files are permitted (.arff extension)".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn selector_marks_the_current_column() {
        let (app, _pref) = app_with(Err(SubmissionFailure::Transport("unused".into())));
        let theme = theme_for(false);
        let line = stratify_line(&app, theme);
        let selected: Vec<&str> = line
            .spans
            .iter()
            .filter(|span| span.style.add_modifier.contains(Modifier::REVERSED))
            .map(|span| span.content.as_ref())
            .collect();
        assert_eq!(selected, vec![" protocol_type "]);
    }

    #[tokio::test]
    async fn notice_renders_only_when_present() {
        let (mut app, _pref) = app_with(Err(SubmissionFailure::Transport("unused".into())));
        assert!(notice_line(&app, theme_for(false)).is_none());
        app.notice = Some(Notice::Saved("~/Downloads/x.zip".into()));
        let line = notice_line(&app, theme_for(false)).unwrap();
        assert_eq!(text(&[line]), vec!["Saved to: ~/Downloads/x.zip".to_string()]);
    }
}
