//! TUI implementation for haven

use tokio::sync::mpsc;

use crossterm::event::{Event, EventStream, MouseEventKind};
use futures::StreamExt;
use haven_api::{ApiClient, SavedProperty};
use haven_chat::{prompts, ChatEvent, ChatSession, LocalStore, PropertyStore};
use haven_tui::{
    content::{format_content, ContentBlock, Inline, LinkKind, LISTING_DOMAINS},
    input::Action,
    widgets::{
        message_list::{calculate_message_height, ChatMessage},
        InputBox, MessageList, Selector, SelectorItem, SelectorState, Spinner,
    },
    Theme,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};
use std::sync::Arc;
use std::time::Instant;

use crate::commands::{execute_command, CommandResult, SavedCommand};
use crate::config::Config;

/// Messages sent from input handling to the event loop
#[derive(Debug)]
pub enum UiMessage {
    /// User submitted input
    Submit(String),
    /// User requested quit
    Quit,
    /// User requested clear
    Clear,
    /// Slash command
    Command(String),
}

/// A turn queued for the session
enum PendingTurn {
    Prompt(String),
    Personalized,
}

/// TUI application state
pub struct TuiState {
    /// Chat messages
    messages: Vec<ChatMessage>,
    /// Input box
    input: InputBox,
    /// Current scroll position
    scroll: usize,
    /// Whether a response is streaming
    is_processing: bool,
    /// Current status message
    status: String,
    /// Theme
    theme: Theme,
    /// Saved listings, most recent first
    saved: Vec<SavedProperty>,
    /// URLs of saved listings, drives like toggles
    saved_urls: Vec<String>,
    /// Listing links in the last completed response, in order of appearance
    listing_links: Vec<(String, String)>,
    /// Signed-in account email, if any
    account: Option<String>,
    /// Channel to the event loop
    ui_tx: mpsc::Sender<UiMessage>,
    /// Spinner start time for animation
    spinner_start: Instant,
    /// Saved-listing mention popup (@)
    mention: SelectorState,
}

impl TuiState {
    pub fn new(theme: Theme, account: Option<String>, ui_tx: mpsc::Sender<UiMessage>) -> Self {
        let mut input = InputBox::new().with_placeholder("Ask about rental properties...");
        input.set_focused(true);

        Self {
            messages: vec![],
            input,
            scroll: 0,
            is_processing: false,
            status: "Ready".to_string(),
            theme,
            saved: vec![],
            saved_urls: vec![],
            listing_links: vec![],
            account,
            ui_tx,
            spinner_start: Instant::now(),
            mention: SelectorState::default(),
        }
    }

    /// Replace the saved list and refresh the like-toggle URL set
    pub fn set_saved(&mut self, saved: Vec<SavedProperty>) {
        self.saved_urls = saved.iter().map(|p| p.url.clone()).collect();
        self.saved = saved;
    }

    /// Handle chat session events
    pub fn handle_chat_event(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::TurnStart => {
                self.is_processing = true;
            }
            ChatEvent::TurnUpdate { content } => {
                // An error bubble may have landed after the streaming one,
                // so search for it instead of assuming it is last.
                if let Some(bubble) = self.streaming_mut() {
                    bubble.content = content;
                    self.scroll_to_bottom();
                    return;
                }
                self.messages.push(ChatMessage::assistant_streaming(content));
                self.scroll_to_bottom();
            }
            ChatEvent::TurnEnd { turn } => {
                self.is_processing = false;
                if let Some(bubble) = self.streaming_mut() {
                    bubble.content = turn.content.clone();
                    bubble.is_streaming = false;
                } else {
                    self.messages.push(ChatMessage::assistant(&turn.content));
                }
                self.listing_links = listing_links(&turn.content);
                self.status = if self.listing_links.is_empty() {
                    "Ready".to_string()
                } else {
                    format!(
                        "{} listing link(s) in this response. /save <n> to keep one.",
                        self.listing_links.len()
                    )
                };
                self.scroll_to_bottom();
            }
            ChatEvent::Error { message } => {
                self.is_processing = false;
                self.status = format!("Error: {}", message);
                self.messages.push(ChatMessage::error(format!("Error: {}", message)));
                self.scroll_to_bottom();
            }
        }
    }

    /// The in-flight assistant bubble, if one is open
    fn streaming_mut(&mut self) -> Option<&mut ChatMessage> {
        self.messages.iter_mut().rev().find(|m| m.is_streaming)
    }

    /// Remove the streaming bubble after a turn that produced no text
    fn discard_empty_streaming_bubble(&mut self) {
        if let Some(idx) = self
            .messages
            .iter()
            .rposition(|m| m.is_streaming && m.content.is_empty())
        {
            self.messages.remove(idx);
        }
    }

    fn scroll_to_bottom(&mut self) {
        // Recalculated against content height during render
        self.scroll = usize::MAX;
    }

    /// Show a system message
    pub fn show_system_message(&mut self, content: &str) {
        self.messages.push(ChatMessage::system(content));
        self.scroll_to_bottom();
    }

    /// The last assistant message, for carousel and table keys
    fn last_assistant_mut(&mut self) -> Option<&mut ChatMessage> {
        self.messages
            .iter_mut()
            .rev()
            .find(|m| m.role == "assistant" && !m.is_error)
    }

    /// Handle keyboard action
    pub async fn handle_action(&mut self, action: Action, width: u16) -> bool {
        // Mention popup swallows navigation while open
        if self.mention.visible {
            match action {
                Action::Up => {
                    self.mention.up(self.saved.len());
                    return true;
                }
                Action::Down => {
                    self.mention.down(self.saved.len());
                    return true;
                }
                Action::Submit | Action::Tab => {
                    if let Some(property) = self.saved.get(self.mention.selected) {
                        // Replace the trailing @ with the listing name
                        let content = self.input.content().to_string();
                        let replaced = match content.strip_suffix('@') {
                            Some(prefix) => format!("{prefix}\"{}\"", property.name),
                            None => format!("{content}\"{}\"", property.name),
                        };
                        self.input.set_content(replaced);
                    }
                    self.mention.hide();
                    return true;
                }
                Action::Escape => {
                    self.mention.hide();
                    return true;
                }
                _ => {
                    return true;
                }
            }
        }

        match action {
            Action::Submit => {
                let content = self.input.content().trim().to_string();
                if !content.is_empty() && !self.is_processing {
                    self.input.clear();

                    if content.starts_with('/') {
                        let _ = self.ui_tx.send(UiMessage::Command(content)).await;
                    } else {
                        self.messages.push(ChatMessage::user(&content));
                        self.scroll_to_bottom();
                        let _ = self.ui_tx.send(UiMessage::Submit(content)).await;
                    }
                }
                true
            }
            Action::Quit | Action::Eof => {
                let _ = self.ui_tx.send(UiMessage::Quit).await;
                false
            }
            Action::Interrupt | Action::Escape => {
                // Outside streaming these quit; during streaming the inner
                // loop intercepts them as cancel
                let _ = self.ui_tx.send(UiMessage::Quit).await;
                false
            }
            Action::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                true
            }
            Action::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                true
            }
            Action::Clear => {
                let _ = self.ui_tx.send(UiMessage::Clear).await;
                true
            }
            Action::CarouselPrev => {
                let saved_urls = self.saved_urls.clone();
                if let Some(msg) = self.last_assistant_mut() {
                    let len = msg.carousel_len(&saved_urls);
                    msg.carousel.prev(len);
                }
                true
            }
            Action::CarouselNext => {
                let saved_urls = self.saved_urls.clone();
                if let Some(msg) = self.last_assistant_mut() {
                    let len = msg.carousel_len(&saved_urls);
                    msg.carousel.next(len);
                }
                true
            }
            Action::TableLeft => {
                if let Some(msg) = self.last_assistant_mut() {
                    msg.table_offset = msg.table_offset.saturating_sub(1);
                }
                true
            }
            Action::TableRight => {
                let saved_urls = self.saved_urls.clone();
                if let Some(msg) = self.last_assistant_mut()
                    && msg.has_table(&saved_urls)
                {
                    msg.table_offset += 1;
                }
                true
            }
            Action::Char('@') => {
                self.input.handle_action(&Action::Char('@'), width);
                if !self.saved.is_empty() {
                    self.mention.show();
                }
                true
            }
            _ => {
                self.input.handle_action(&action, width);
                true
            }
        }
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Layout: messages (flex), status bar (1), input (3)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Messages
                Constraint::Length(1), // Status
                Constraint::Length(3), // Input
            ])
            .split(size);

        self.render_messages(frame, chunks[0]);
        self.render_status(frame, chunks[1]);
        self.input.render(chunks[2], frame.buffer_mut(), &self.theme);

        if self.mention.visible {
            self.render_mention_selector(frame, size);
        }
    }

    fn render_mention_selector(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<SelectorItem> = self
            .saved
            .iter()
            .map(|p| SelectorItem::new(&p.name))
            .collect();

        let selector = Selector::new("Mention a saved property", items, &self.theme)
            .with_selected(self.mention.selected);

        selector.render_centered(area, frame.buffer_mut());
    }

    fn render_messages(&mut self, frame: &mut Frame, area: Rect) {
        let title = match &self.account {
            Some(email) => format!(" haven │ {} ", email),
            None => " haven │ guest ".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(title);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 || self.messages.is_empty() {
            frame.render_widget(welcome_screen(), inner);
            return;
        }

        let content_height =
            calculate_message_height(&self.messages, inner.width as usize, &self.saved_urls);

        if self.scroll == usize::MAX {
            // Auto-scroll to bottom
            self.scroll = content_height.saturating_sub(inner.height as usize);
        } else {
            self.scroll = self
                .scroll
                .min(content_height.saturating_sub(inner.height as usize));
        }

        let message_list = MessageList::new(&self.messages, &self.theme)
            .saved_urls(&self.saved_urls)
            .scroll(self.scroll)
            .spinner_start(self.spinner_start);
        frame.render_widget(message_list, inner);

        if content_height > inner.height as usize {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");

            let mut scrollbar_state = ScrollbarState::new(content_height)
                .position(self.scroll)
                .viewport_content_length(inner.height as usize);

            frame.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if self.is_processing {
            let spinner =
                Spinner::new(&self.status, &self.theme).with_start_time(self.spinner_start);
            frame.render_widget(spinner, area);
        } else {
            let left_content = self.status.clone();
            let right_content = "Ctrl+←/→: slides │ Esc: cancel │ Ctrl+Q: quit";

            let left_width = left_content.chars().count();
            let right_width = right_content.chars().count();
            let available = area.width as usize;

            let line = if left_width + right_width + 2 <= available {
                let spacing = available - left_width - right_width;
                Line::from(vec![
                    Span::styled(left_content, self.theme.dim_style()),
                    Span::raw(" ".repeat(spacing)),
                    Span::styled(right_content, Style::default().fg(Color::DarkGray)),
                ])
            } else {
                Line::from(Span::styled(left_content, self.theme.dim_style()))
            };

            frame.render_widget(Paragraph::new(line), area);
        }
    }
}

/// Listing links in a response, in order of appearance
fn listing_links(content: &str) -> Vec<(String, String)> {
    let mut links = vec![];
    let mut collect = |inlines: &[Inline]| {
        for inline in inlines {
            if let Inline::Link {
                text,
                url,
                kind: LinkKind::Listing { .. },
            } = inline
            {
                links.push((text.clone(), url.clone()));
            }
        }
    };
    for block in format_content(content, &[], &LISTING_DOMAINS) {
        match &block {
            ContentBlock::Paragraph(inlines) => collect(inlines),
            ContentBlock::List(items) => {
                for item in items {
                    collect(item);
                }
            }
            _ => {}
        }
    }
    links
}

fn welcome_screen() -> Paragraph<'static> {
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "  ⌂ ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "haven",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                " - rental property assistant",
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Try asking",
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
    ];
    for prompt in prompts::EXAMPLE_PROMPTS {
        lines.push(Line::from(vec![
            Span::styled("    • ", Style::default().fg(Color::DarkGray)),
            Span::styled(prompt, Style::default().fg(Color::White)),
        ]));
    }
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "  Keybindings",
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("    Enter       ", Style::default().fg(Color::Cyan)),
            Span::styled("Send message", Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::styled("    Esc/Ctrl+C  ", Style::default().fg(Color::Cyan)),
            Span::styled("Cancel response / quit", Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::styled("    Ctrl+←/→    ", Style::default().fg(Color::Cyan)),
            Span::styled("Page image carousels", Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::styled("    Alt+←/→     ", Style::default().fg(Color::Cyan)),
            Span::styled("Scroll wide tables", Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::styled("    @           ", Style::default().fg(Color::Cyan)),
            Span::styled("Mention a saved property", Style::default().fg(Color::White)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  /help for commands. Type a message to get started...",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    Paragraph::new(lines)
}

/// Run the TUI application
pub async fn run_tui(
    session: &mut ChatSession,
    client: &ApiClient,
    store: Arc<dyn PropertyStore>,
    guest: Option<Arc<LocalStore>>,
    config: &Config,
    account: Option<String>,
    initial_prompt: Option<String>,
) -> anyhow::Result<()> {
    use crossterm::{
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    };
    use ratatui::{backend::CrosstermBackend, Terminal};
    use std::io;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (ui_tx, mut ui_rx) = mpsc::channel::<UiMessage>(32);

    let theme = Theme::from_name(config.theme.as_deref().unwrap_or("dark"));
    let mut state = TuiState::new(theme, account, ui_tx);

    match store.list().await {
        Ok(saved) => state.set_saved(saved),
        Err(e) => {
            tracing::warn!(error = %e, "could not load saved listings");
        }
    }

    let mut chat_rx = session.subscribe();
    let mut event_stream = EventStream::new();

    // Tick interval for animations (80ms for smooth spinner)
    let mut tick_interval = tokio::time::interval(std::time::Duration::from_millis(80));

    // Queued turn, picked up at the top of the loop so the ask future can
    // borrow the session
    let mut pending_turn: Option<PendingTurn> = match initial_prompt {
        Some(prompt) => {
            state.messages.push(ChatMessage::user(&prompt));
            Some(PendingTurn::Prompt(prompt))
        }
        None => None,
    };

    let result = loop {
        if let Some(pending) = pending_turn.take() {
            state.is_processing = true;
            state.spinner_start = Instant::now();
            state.status = "Generating response...".to_string();
            state.messages.push(ChatMessage::assistant_streaming(""));
            state.scroll_to_bottom();

            // Cancels without borrowing the session
            let handle = session.handle();

            let mut turn_future = std::pin::pin!(async {
                match pending {
                    PendingTurn::Prompt(prompt) => session.ask(prompt).await,
                    PendingTurn::Personalized => session.ask_personalized().await,
                }
            });

            loop {
                terminal.draw(|frame| state.render(frame))?;
                let area_width = terminal.size()?.width;

                tokio::select! {
                    biased;

                    result = &mut turn_future => {
                        if let Err(e) = result {
                            // Drop the empty streaming bubble if nothing arrived
                            state.discard_empty_streaming_bubble();
                            // The session already published an Error event for
                            // stream failures; gate errors arrive only here
                            if matches!(e, haven_chat::Error::HistoryTooShort { .. } | haven_chat::Error::Busy) {
                                state.handle_chat_event(ChatEvent::Error { message: e.user_message() });
                            }
                        }
                        break;
                    }

                    event = chat_rx.recv() => {
                        if let Ok(chat_event) = event {
                            state.handle_chat_event(chat_event);
                        }
                    }

                    event = event_stream.next() => {
                        match event {
                            Some(Ok(Event::Key(key))) => {
                                let action = haven_tui::input::key_to_action(key);
                                match action {
                                    Action::Interrupt | Action::Escape => {
                                        handle.stop();
                                        state.status = "Cancelling...".to_string();
                                    }
                                    Action::Quit => {
                                        handle.stop();
                                        disable_raw_mode()?;
                                        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
                                        terminal.show_cursor()?;
                                        return Ok(());
                                    }
                                    _ => {
                                        // Typing stays live while streaming
                                        state.input.handle_action(&action, area_width);
                                    }
                                }
                            }
                            Some(Ok(Event::Paste(text))) => {
                                state.input.handle_action(&Action::Paste(text), area_width);
                            }
                            Some(Ok(Event::Mouse(mouse))) => {
                                match mouse.kind {
                                    MouseEventKind::ScrollUp => {
                                        state.scroll = state.scroll.saturating_sub(3);
                                    }
                                    MouseEventKind::ScrollDown => {
                                        state.scroll = state.scroll.saturating_add(3);
                                    }
                                    _ => {}
                                }
                            }
                            Some(Ok(Event::Resize(_, _))) => {}
                            Some(Err(_)) | None => {
                                handle.stop();
                                disable_raw_mode()?;
                                execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
                                terminal.show_cursor()?;
                                return Ok(());
                            }
                            _ => {}
                        }
                    }

                    _ = tick_interval.tick() => {}
                }
            }

            // Drain events published right before the turn finished
            while let Ok(chat_event) = chat_rx.try_recv() {
                state.handle_chat_event(chat_event);
            }

            terminal.draw(|frame| state.render(frame))?;

            continue;
        }

        terminal.draw(|frame| state.render(frame))?;

        let area_width = terminal.size()?.width;

        tokio::select! {
            biased;

            event = chat_rx.recv() => {
                if let Ok(chat_event) = event {
                    state.handle_chat_event(chat_event);
                }
            }

            event = event_stream.next() => {
                match event {
                    Some(Ok(Event::Key(key))) => {
                        let action = haven_tui::input::key_to_action(key);
                        if !state.handle_action(action, area_width).await {
                            break Ok(());
                        }
                    }
                    Some(Ok(Event::Paste(text))) => {
                        state.handle_action(Action::Paste(text), area_width).await;
                    }
                    Some(Ok(Event::Mouse(mouse))) => {
                        match mouse.kind {
                            MouseEventKind::ScrollUp => {
                                state.scroll = state.scroll.saturating_sub(3);
                            }
                            MouseEventKind::ScrollDown => {
                                state.scroll = state.scroll.saturating_add(3);
                            }
                            _ => {}
                        }
                    }
                    Some(Ok(Event::Resize(_, _))) => {}
                    Some(Err(e)) => {
                        break Err(anyhow::anyhow!("Event error: {}", e));
                    }
                    None => {
                        break Ok(());
                    }
                    _ => {}
                }
            }

            _ = tick_interval.tick() => {}

            msg = ui_rx.recv() => {
                match msg {
                    Some(UiMessage::Submit(content)) => {
                        pending_turn = Some(PendingTurn::Prompt(content));
                    }
                    Some(UiMessage::Command(cmd)) => {
                        if let Some(result) = execute_command(&cmd) {
                            match handle_command(result, &mut state, session, client, &store, guest.as_deref(), config).await {
                                CommandOutcome::Continue => {}
                                CommandOutcome::Run(turn) => pending_turn = Some(turn),
                                CommandOutcome::Exit => break Ok(()),
                            }
                        }
                    }
                    Some(UiMessage::Clear) => {
                        session.clear();
                        state.messages.clear();
                        state.listing_links.clear();
                        state.status = "Cleared".to_string();
                    }
                    Some(UiMessage::Quit) | None => {
                        break Ok(());
                    }
                }
            }
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

enum CommandOutcome {
    Continue,
    Run(PendingTurn),
    Exit,
}

/// Carry out a parsed slash command
async fn handle_command(
    result: CommandResult,
    state: &mut TuiState,
    session: &mut ChatSession,
    client: &ApiClient,
    store: &Arc<dyn PropertyStore>,
    guest: Option<&LocalStore>,
    config: &Config,
) -> CommandOutcome {
    match result {
        CommandResult::Message(msg) => {
            state.show_system_message(&msg);
        }
        CommandResult::Prompt(prompt) => {
            state.messages.push(ChatMessage::user(&prompt));
            state.scroll_to_bottom();
            return CommandOutcome::Run(PendingTurn::Prompt(prompt));
        }
        CommandResult::Personalized => {
            return CommandOutcome::Run(PendingTurn::Personalized);
        }
        CommandResult::ListSaved => {
            match store.list().await {
                Ok(saved) => {
                    state.set_saved(saved);
                    let text = SavedCommand::format_list(&state.saved);
                    state.show_system_message(&text);
                }
                Err(e) => state.show_system_message(&e.user_message()),
            }
        }
        CommandResult::Save(target) => {
            let url = if let Ok(n) = target.parse::<usize>() {
                match n.checked_sub(1).and_then(|i| state.listing_links.get(i)) {
                    Some((_, url)) => url.clone(),
                    None => {
                        state.show_system_message(&format!(
                            "No listing link {} in the last response.",
                            target
                        ));
                        return CommandOutcome::Continue;
                    }
                }
            } else {
                target
            };
            match store.save(&url).await {
                Ok(()) => {
                    if let Ok(saved) = store.list().await {
                        state.set_saved(saved);
                    }
                    state.show_system_message(&format!("Saved {}", url));
                }
                Err(e) => state.show_system_message(&e.user_message()),
            }
        }
        CommandResult::Unsave(target) => {
            let Some(property) = SavedCommand::resolve(&target, &state.saved).cloned() else {
                state.show_system_message(&format!("No saved listing matches '{}'.", target));
                return CommandOutcome::Continue;
            };
            match store.remove(&property.url).await {
                Ok(()) => {
                    if let Ok(saved) = store.list().await {
                        state.set_saved(saved);
                    }
                    state.show_system_message(&format!("Removed {}", property.name));
                }
                Err(e) => state.show_system_message(&e.user_message()),
            }
        }
        CommandResult::Contact { target, message } => {
            let Some(property) = SavedCommand::resolve(&target, &state.saved).cloned() else {
                state.show_system_message(&format!("No saved listing matches '{}'.", target));
                return CommandOutcome::Continue;
            };
            let (Some(name), Some(number)) =
                (config.contact.name.clone(), config.contact.number.clone())
            else {
                state.show_system_message(
                    "Set contact.name and contact.number in the config file first (/help).",
                );
                return CommandOutcome::Continue;
            };
            let message = message.unwrap_or_else(|| prompts::DEFAULT_CONTACT_MESSAGE.to_string());
            match client
                .contact_agent(&name, &number, &message, &property.url)
                .await
            {
                Ok(()) => {
                    if let Err(e) = store.mark_contacted(&property.url).await {
                        tracing::warn!(error = %e, "could not record contacted flag");
                    }
                    if let Ok(saved) = store.list().await {
                        state.set_saved(saved);
                    }
                    state.show_system_message(&format!("Enquiry sent for {}.", property.name));
                }
                Err(e) => state.show_system_message(&e.user_message()),
            }
        }
        CommandResult::Share(target) => {
            let Some(property) = SavedCommand::resolve(&target, &state.saved).cloned() else {
                state.show_system_message(&format!("No saved listing matches '{}'.", target));
                return CommandOutcome::Continue;
            };
            if property.property_tag.is_empty() {
                state.show_system_message("That listing has no share link.");
            } else {
                let link = format!("{}/property/{}", client.origin(), property.property_tag);
                state.show_system_message(&format!(
                    "Share link for {}:\n  {}",
                    property.name, link
                ));
            }
        }
        CommandResult::Compare { items, basis } => {
            let mut names = vec![];
            for item in &items {
                match SavedCommand::resolve(item, &state.saved) {
                    Some(property) => names.push(property.name.clone()),
                    None => {
                        state.show_system_message(&format!("No saved listing matches '{}'.", item));
                        return CommandOutcome::Continue;
                    }
                }
            }
            if let Some(local) = guest {
                if let Err(e) = local.record_compare_use() {
                    state.show_system_message(&e.user_message());
                    return CommandOutcome::Continue;
                }
                let used = local.compare_uses();
                state.status = format!(
                    "Guest compare {used}/{} used. Log in for unlimited comparisons.",
                    haven_chat::GUEST_COMPARE_LIMIT
                );
            }
            let prompt = prompts::compare_prompt(&names, basis.as_deref());
            state.messages.push(ChatMessage::user(&prompt));
            state.scroll_to_bottom();
            return CommandOutcome::Run(PendingTurn::Prompt(prompt));
        }
        CommandResult::Voice(path) => {
            state.status = "Transcribing...".to_string();
            match client.speech_to_text(&path).await {
                Ok(text) if !text.trim().is_empty() => {
                    let text = text.trim().to_string();
                    state.messages.push(ChatMessage::user(&text));
                    state.scroll_to_bottom();
                    return CommandOutcome::Run(PendingTurn::Prompt(text));
                }
                Ok(_) => {
                    state.show_system_message("Nothing was transcribed from that recording.");
                    state.status = "Ready".to_string();
                }
                Err(e) => {
                    state.show_system_message(&e.user_message());
                    state.status = "Ready".to_string();
                }
            }
        }
        CommandResult::Clear => {
            session.clear();
            state.messages.clear();
            state.listing_links.clear();
            state.status = "Cleared".to_string();
        }
        CommandResult::Exit => return CommandOutcome::Exit,
        CommandResult::Unknown(cmd) => {
            state.show_system_message(&format!(
                "Unknown command: /{}\nType /help for available commands.",
                cmd
            ));
        }
    }
    CommandOutcome::Continue
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_links_in_order_of_appearance() {
        let content = "Here are two: [Flat A](https://www.dexters.co.uk/p/1) and \
                       [Flat B](https://www.kfh.co.uk/p/2), plus [a map](https://x.test/map/51.5,-0.1).";
        let links = listing_links(content);
        assert_eq!(
            links,
            vec![
                ("Flat A".to_string(), "https://www.dexters.co.uk/p/1".to_string()),
                ("Flat B".to_string(), "https://www.kfh.co.uk/p/2".to_string()),
            ]
        );
    }

    fn test_state() -> TuiState {
        let (ui_tx, _ui_rx) = mpsc::channel(8);
        TuiState::new(Theme::default(), None, ui_tx)
    }

    #[test]
    fn test_mid_stream_failure_finalizes_streaming_bubble() {
        // On a decode failure the session emits Error, then the final
        // snapshot, then TurnEnd. The error bubble lands between the
        // streaming bubble and its final update.
        let mut state = test_state();
        state.handle_chat_event(ChatEvent::TurnStart);
        state.handle_chat_event(ChatEvent::TurnUpdate {
            content: "partial".to_string(),
        });
        state.handle_chat_event(ChatEvent::Error {
            message: "response stream failed".to_string(),
        });
        state.handle_chat_event(ChatEvent::TurnUpdate {
            content: "partial".to_string(),
        });
        state.handle_chat_event(ChatEvent::TurnEnd {
            turn: haven_api::Turn::assistant("partial"),
        });

        let assistant: Vec<_> = state
            .messages
            .iter()
            .filter(|m| m.role == "assistant" && !m.is_error)
            .collect();
        assert_eq!(assistant.len(), 1);
        assert_eq!(assistant[0].content, "partial");
        assert!(!assistant[0].is_streaming);
        assert!(state.messages.iter().any(|m| m.is_error));
        assert!(!state.is_processing);
    }

    #[test]
    fn test_error_after_empty_stream_leaves_no_streaming_bubble() {
        let mut state = test_state();
        state.handle_chat_event(ChatEvent::TurnStart);
        state.handle_chat_event(ChatEvent::TurnUpdate {
            content: String::new(),
        });
        state.handle_chat_event(ChatEvent::Error {
            message: "backend down".to_string(),
        });
        state.discard_empty_streaming_bubble();
        assert!(!state.messages.iter().any(|m| m.is_streaming));
        assert!(state.messages.iter().any(|m| m.is_error));
    }
}
