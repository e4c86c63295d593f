//! UI rendering using ratatui

use msgboard_core::render::{MessageView, PanelView};
use msgboard_core::BoardView;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::app::{App, Mode};

/// Primary accent color
const ACCENT: Color = Color::Cyan;
/// Secondary color for less important elements
const SECONDARY: Color = Color::DarkGray;
/// Highlight color for selected items
const HIGHLIGHT: Color = Color::Yellow;
/// Success color
const SUCCESS: Color = Color::Green;
/// Dim text color
const DIM: Color = Color::Rgb(100, 100, 100);

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let view = app.view();
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // List + detail
            Constraint::Length(4), // Compose
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_header(frame, &view, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    render_list(frame, app, &view, body[0]);
    render_detail(frame, app, view.messages.get(app.selected_index), body[1]);
    render_compose(frame, app, &view, chunks[2]);
    render_status_bar(frame, app, chunks[3]);
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let (border, title_style) = if focused {
        (
            Style::default().fg(ACCENT),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )
    } else {
        (Style::default().fg(SECONDARY), Style::default().fg(SECONDARY))
    };

    Block::default()
        .title(title)
        .title_style(title_style)
        .borders(Borders::ALL)
        .border_style(border)
}

fn render_header(frame: &mut Frame, view: &BoardView, area: Rect) {
    let refreshing = if view.refreshing { "  ⟳" } else { "" };
    let line = Line::from(vec![
        Span::styled(
            format!("{} messages", view.messages.len()),
            Style::default().fg(Color::White),
        ),
        Span::styled(format!("  as {}", view.username), Style::default().fg(DIM)),
        Span::styled(refreshing, Style::default().fg(HIGHLIGHT)),
    ]);

    let block = Block::default()
        .title(" Message Board ")
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(SECONDARY));

    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Render the message list
fn render_list(frame: &mut Frame, app: &mut App, view: &BoardView, area: Rect) {
    let block = pane_block(" Messages ".to_string(), app.mode == Mode::Normal);

    // Calculate visible area
    let inner = block.inner(area);
    let visible_height = inner.height as usize;
    app.set_list_height(visible_height);

    let items: Vec<ListItem> = view
        .messages
        .iter()
        .enumerate()
        .skip(app.scroll_offset)
        .take(visible_height)
        .map(|(idx, message)| {
            let is_selected = idx == app.selected_index;

            let style = if is_selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(ACCENT)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            let media = match message.media {
                Some(ref media) => format!(" [{}]", media.kind),
                None => String::new(),
            };
            let busy = if message.busy { " …" } else { "" };

            let content = format!(
                "{}{} {}{}  {}: {}{}{}",
                message.upvote_icon(),
                message.upvotes,
                message.downvote_icon(),
                message.downvotes,
                message.author,
                first_line(&message.description),
                media,
                busy
            );

            ListItem::new(Line::from(Span::styled(content, style)))
        })
        .collect();

    // Show placeholder if empty
    let list = if items.is_empty() {
        let placeholder = ListItem::new(Line::from(Span::styled(
            "  No messages yet. Press 'i' to write one",
            Style::default().fg(DIM),
        )));
        List::new(vec![placeholder]).block(block)
    } else {
        List::new(items).block(block)
    };

    frame.render_widget(list, area);

    // Show scroll indicator
    if view.messages.len() > visible_height {
        let indicator = format!(" {}/{} ", app.selected_index + 1, view.messages.len());
        let indicator_area = Rect {
            x: area.x + area.width.saturating_sub(indicator.len() as u16 + 2),
            y: area.y,
            width: indicator.len() as u16 + 2,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(indicator).style(Style::default().fg(DIM)),
            indicator_area,
        );
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

/// Render the selected message with its comment panel
fn render_detail(frame: &mut Frame, app: &App, message: Option<&MessageView>, area: Rect) {
    let editing = app.mode == Mode::Comment;

    let Some(message) = message else {
        let block = pane_block(" Message ".to_string(), false);
        let paragraph = Paragraph::new(Span::styled(
            "Select a message to see it here",
            Style::default().fg(DIM),
        ))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let block = pane_block(format!(" {} ", message.id), editing);
    let mut lines = vec![
        Line::from(Span::styled(
            message.author.clone(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    lines.extend(message.description.lines().map(|line| Line::from(line.to_string())));

    if let Some(ref media) = message.media {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(format!("[{}] ", media.kind), Style::default().fg(HIGHLIGHT)),
            Span::styled(media.url.clone(), Style::default().fg(DIM)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        "{} {}   {} {}",
        message.upvote_icon(),
        message.upvotes,
        message.downvote_icon(),
        message.downvotes
    )));
    lines.push(Line::from(""));

    match message.comments {
        PanelView::Collapsed => lines.push(Line::from(Span::styled(
            "Comments hidden (c to show)",
            Style::default().fg(DIM),
        ))),
        PanelView::Loading => lines.push(Line::from(Span::styled(
            "Loading comments...",
            Style::default().fg(DIM),
        ))),
        PanelView::Expanded(ref comments) if comments.is_empty() => {
            lines.push(Line::from(Span::styled(
                "No comments yet",
                Style::default().fg(DIM),
            )))
        }
        PanelView::Expanded(ref comments) => {
            lines.push(Line::from(Span::styled(
                "Comments",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for comment in comments {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {}: ", comment.author), Style::default().fg(ACCENT)),
                    Span::raw(comment.text.clone()),
                ]));
            }
        }
    }

    if editing || !message.comment_draft.is_empty() {
        let cursor = if editing { "|" } else { "" };
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("> ", Style::default().fg(SUCCESS)),
            Span::raw(format!("{}{}", message.comment_draft, cursor)),
        ]));
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

/// Render the compose form
fn render_compose(frame: &mut Frame, app: &App, view: &BoardView, area: Rect) {
    let focused = matches!(app.mode, Mode::Compose | Mode::Media);
    let title = if view.compose.submitting {
        " New message [posting...] "
    } else if focused {
        " New message [EDIT] "
    } else {
        " New message "
    };

    let description = if app.mode == Mode::Compose {
        format!("{}|", view.compose.description)
    } else if view.compose.description.is_empty() {
        String::new()
    } else {
        view.compose.description.clone()
    };

    let media = if app.mode == Mode::Media {
        Span::raw(format!("{}|", app.media_input))
    } else {
        match view.compose.media {
            Some(ref name) => Span::styled(name.clone(), Style::default().fg(HIGHLIGHT)),
            None => Span::styled("(none, m to attach)", Style::default().fg(DIM)),
        }
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("text:  ", Style::default().fg(DIM)),
            Span::raw(description),
        ]),
        Line::from(vec![Span::styled("media: ", Style::default().fg(DIM)), media]),
    ];

    let paragraph = Paragraph::new(Text::from(lines)).block(pane_block(title.to_string(), focused));
    frame.render_widget(paragraph, area);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode_indicator = match app.mode {
        Mode::Normal => Span::styled(" NORMAL ", Style::default().bg(ACCENT).fg(Color::Black)),
        Mode::Compose => Span::styled(" COMPOSE ", Style::default().bg(SUCCESS).fg(Color::Black)),
        Mode::Media => Span::styled(" MEDIA ", Style::default().bg(HIGHLIGHT).fg(Color::Black)),
        Mode::Comment => {
            Span::styled(" COMMENT ", Style::default().bg(Color::Magenta).fg(Color::Black))
        }
    };

    let help_text = match app.mode {
        Mode::Normal => {
            "j/k:nav  u/d:vote  c:comments  a:comment  i:write  m:media  Enter:post  r:refresh  x:delete  q:quit"
        }
        Mode::Compose => "Enter:post  Esc:done",
        Mode::Media => "Enter:attach (empty detaches)  Esc:cancel",
        Mode::Comment => "Enter:send  Esc:done",
    };

    let status = app.status_message.as_deref().unwrap_or("");

    let line = Line::from(vec![
        mode_indicator,
        Span::raw(" "),
        Span::styled(help_text, Style::default().fg(DIM)),
        Span::raw(" "),
        Span::styled(status, Style::default().fg(HIGHLIGHT)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use msgboard_core::store::Endpoints;
    use msgboard_core::{Completion, Identity, Message, Request};
    use ratatui::{backend::TestBackend, Terminal};

    fn app_with(messages: Vec<Message>) -> App {
        let mut app = App::new(
            Identity::new("alice"),
            Endpoints::new("http://localhost:8800"),
        );
        let Some(Request::ListMessages { ticket }) = app.board.mount() else {
            panic!("mount must fetch");
        };
        app.board.complete(Completion::MessagesLoaded {
            ticket,
            result: Ok(messages),
        });
        app
    }

    fn message(id: &str, description: &str) -> Message {
        Message {
            id: id.into(),
            author: "bob".to_string(),
            description: description.to_string(),
            media: None,
            upvoters: Default::default(),
            downvoters: Default::default(),
            comments: Vec::new(),
        }
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_empty_board_placeholder() {
        let mut app = app_with(Vec::new());
        let text = screen(&mut app);
        assert!(text.contains("No messages yet"));
        assert!(text.contains("as alice"));
    }

    #[test]
    fn test_selected_message_detail() {
        let mut app = app_with(vec![Message {
            id: "m1".into(),
            author: "bob".to_string(),
            description: "lunch?".to_string(),
            media: Some("menu.png".to_string()),
            upvoters: ["alice".to_string()].into_iter().collect(),
            downvoters: Default::default(),
            comments: Vec::new(),
        }]);
        let text = screen(&mut app);

        assert!(text.contains("bob: lunch? [image]"));
        assert!(text.contains("▲ 1"));
        assert!(text.contains("/uploads/menu.png"));
        assert!(text.contains("Comments hidden"));
    }

    #[test]
    fn test_list_scrolls_to_selection() {
        let messages = (0..40)
            .map(|i| message(&format!("m{}", i), &format!("desc-{}", i)))
            .collect();
        let mut app = app_with(messages);
        for _ in 0..30 {
            app.select_next();
        }

        let text = screen(&mut app);
        // Only the list pane, not the detail pane which repeats the selection
        let list_pane: String = text
            .lines()
            .map(|line| line.chars().take(54).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n");

        assert_eq!(app.selected_index, 30);
        assert!(app.scroll_offset > 0);
        assert!(list_pane.contains("bob: desc-30 "));
        assert!(list_pane.contains("bob: desc-32 "));
        assert!(!list_pane.contains("bob: desc-0 "));
        assert!(list_pane.contains(" 31/40 "));
    }
}
