//! Terminal view of the typewriter
//!
//! Layout, top to bottom:
//!
//! ```text
//!  clacker | Dear diary | cream
//!  [.............^.........:::::]  col 14/42  carriage 102px
//!  ------------------------------------------
//!  Dear diary
//!  Today the ribbon ran dry█
//!  ------------------------------------------
//!  Idle  [shift]   Ctrl+Enter auto-type  Esc cancel  Ctrl+N new  Ctrl+Q quit
//! ```
//!
//! [`Screen::compose`] is pure so it can be tested without a terminal;
//! [`draw`] puts a composed screen on stdout.

use crate::engine::TypingEngine;
use crate::error::TerminalError;
use crate::storage::{Paper, Texture};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, Write};
use std::time::Instant;

const HINTS: &str = "Ctrl+Enter auto-type  Esc cancel  Ctrl+N new  Ctrl+Q quit";

/// Rows used by everything except the paper
const CHROME_ROWS: u16 = 5;

/// Raw mode and alternate screen for the lifetime of the guard
#[must_use = "TerminalGuard must be held for the duration of the session"]
pub struct TerminalGuard {
    enhanced_keys: bool,
}

impl TerminalGuard {
    pub fn new() -> Result<Self, TerminalError> {
        enable_raw_mode().map_err(TerminalError::Setup)?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(TerminalError::Setup(err));
        }

        // Lets terminals that support it report Ctrl+Enter and bare modifiers
        let enhanced_keys = terminal::supports_keyboard_enhancement().unwrap_or(false)
            && execute!(
                stdout,
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                )
            )
            .is_ok();
        tracing::debug!("Terminal ready (keyboard enhancement: {})", enhanced_keys);

        Ok(Self { enhanced_keys })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        if self.enhanced_keys {
            let _ = execute!(stdout, PopKeyboardEnhancementFlags);
        }
        let _ = disable_raw_mode();
        let _ = execute!(stdout, Show, LeaveAlternateScreen);
        let _ = stdout.flush();
    }
}

/// Everything on screen for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub header: String,
    pub carriage: String,
    pub rule: String,
    pub paper: Vec<String>,
    pub status: String,
}

fn fill_char(texture: Texture) -> char {
    match texture {
        Texture::Cream | Texture::White => ' ',
        Texture::Lined => '_',
        Texture::Grid => '·',
    }
}

impl Screen {
    /// Lay out the engine state with at most `paper_rows` lines of paper
    pub fn compose(engine: &TypingEngine, paper: &Paper, now: Instant, paper_rows: usize) -> Self {
        let metrics = engine.metrics();
        let width = metrics.max_chars_per_line;
        let column = engine.column();

        let header = format!(" clacker | {} | {}", paper.title, paper.texture);

        let bell_zone = metrics.bell_column().unwrap_or(width);
        let ruler: String = (0..=width)
            .map(|i| {
                if i == column.min(width) {
                    '^'
                } else if i >= bell_zone {
                    ':'
                } else {
                    '.'
                }
            })
            .collect();
        let carriage = format!(
            " [{}]  col {}/{}  carriage {}px",
            ruler,
            column,
            width,
            engine.carriage_offset()
        );

        let rule = format!(" {}", "-".repeat(width + 1));

        let fill = fill_char(paper.texture);
        let cursor = if engine.state().is_awaiting_completion() {
            '…'
        } else {
            '█'
        };
        let lines: Vec<&str> = engine.buffer().split('\n').collect();
        let start = lines.len().saturating_sub(paper_rows.max(1));
        let last = lines.len() - 1;
        let paper_lines = lines[start..]
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let mut row = String::from(" ");
                row.push_str(line);
                let mut used = line.chars().count();
                if start + i == last {
                    row.push(cursor);
                    used += 1;
                }
                row.extend(std::iter::repeat(fill).take((width + 1).saturating_sub(used)));
                row
            })
            .collect();

        let key = engine
            .active_key(now)
            .map(|k| format!("  [{}]", k))
            .unwrap_or_default();
        let status = format!(" {}{}   {}", engine.state(), key, HINTS);

        Self {
            header,
            carriage,
            rule,
            paper: paper_lines,
            status,
        }
    }

    /// Number of paper rows that fit in a terminal of `rows` lines
    pub fn paper_rows_for(rows: u16) -> usize {
        usize::from(rows.saturating_sub(CHROME_ROWS).max(1))
    }
}

fn clip(line: &str, cols: u16) -> String {
    line.chars().take(usize::from(cols)).collect()
}

/// Draw a composed screen
pub fn draw(out: &mut impl Write, screen: &Screen, cols: u16) -> Result<(), TerminalError> {
    queue!(out, Clear(ClearType::All), MoveTo(0, 0)).map_err(TerminalError::Draw)?;

    let mut row: u16 = 0;
    queue!(
        out,
        SetForegroundColor(Color::DarkYellow),
        Print(clip(&screen.header, cols)),
        ResetColor
    )
    .map_err(TerminalError::Draw)?;

    row += 1;
    queue!(
        out,
        MoveTo(0, row),
        SetForegroundColor(Color::DarkGrey),
        Print(clip(&screen.carriage, cols)),
        MoveTo(0, row + 1),
        Print(clip(&screen.rule, cols)),
        ResetColor
    )
    .map_err(TerminalError::Draw)?;
    row += 2;

    for line in &screen.paper {
        queue!(out, MoveTo(0, row), Print(clip(line, cols))).map_err(TerminalError::Draw)?;
        row += 1;
    }

    queue!(
        out,
        MoveTo(0, row),
        SetForegroundColor(Color::DarkGrey),
        Print(clip(&screen.rule, cols)),
        MoveTo(0, row + 1),
        Print(clip(&screen.status, cols)),
        ResetColor
    )
    .map_err(TerminalError::Draw)?;

    out.flush().map_err(TerminalError::Draw)
}

/// Current terminal size, with a sane fallback
pub fn terminal_size() -> (u16, u16) {
    terminal::size().unwrap_or((80, 24))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CarriageMetrics, KeyInput};
    use std::time::Duration;

    fn paper(texture: Texture) -> Paper {
        Paper {
            id: "1".into(),
            content: String::new(),
            title: "Untitled".into(),
            date: 0,
            texture,
        }
    }

    fn engine_with(text: &str) -> TypingEngine {
        let mut engine = TypingEngine::new(
            CarriageMetrics {
                max_chars_per_line: 10,
                ..CarriageMetrics::default()
            },
            Duration::from_millis(150),
        );
        engine.load(text);
        engine
    }

    #[test]
    fn test_compose_shows_tail_of_paper() {
        let engine = engine_with("one\ntwo\nthree");
        let screen = Screen::compose(&engine, &paper(Texture::Cream), Instant::now(), 2);
        assert_eq!(screen.paper.len(), 2);
        assert!(screen.paper[0].starts_with(" two"));
        assert!(screen.paper[1].starts_with(" three█"));
    }

    #[test]
    fn test_carriage_ruler_tracks_column() {
        let engine = engine_with("abcd");
        let screen = Screen::compose(&engine, &paper(Texture::Cream), Instant::now(), 5);
        assert!(screen.carriage.starts_with(" [....^::::::]"));
        assert!(screen.carriage.contains("col 4/10"));
        assert!(screen.carriage.contains(&format!("carriage {}px", 270 - 48)));
    }

    #[test]
    fn test_cursor_on_new_line() {
        let engine = engine_with("abc\n");
        let screen = Screen::compose(&engine, &paper(Texture::Cream), Instant::now(), 5);
        assert_eq!(screen.paper.len(), 2);
        assert!(screen.paper[1].starts_with(" █"));
    }

    #[test]
    fn test_texture_fill() {
        let engine = engine_with("ab");
        let screen = Screen::compose(&engine, &paper(Texture::Grid), Instant::now(), 5);
        assert!(screen.paper[0].ends_with('·'));
        assert_eq!(screen.paper[0].chars().count(), 1 + 11);
        assert!(screen.header.ends_with("grid"));
    }

    #[test]
    fn test_status_shows_state_and_key() {
        let mut engine = engine_with("");
        let now = Instant::now();
        engine.handle_key(KeyInput::named("Shift", false), now);
        let screen = Screen::compose(&engine, &paper(Texture::Cream), now, 5);
        assert!(screen.status.starts_with(" Idle  [shift]"));

        engine.handle_key(KeyInput::named("Enter", true), now);
        let screen = Screen::compose(&engine, &paper(Texture::Cream), now, 5);
        assert!(screen.status.contains("Thinking"));
        assert!(screen.paper[0].starts_with(" …"));
    }

    #[test]
    fn test_draw_writes_every_part() {
        let engine = engine_with("hello");
        let screen = Screen::compose(&engine, &paper(Texture::Cream), Instant::now(), 3);
        let mut out = Vec::new();
        draw(&mut out, &screen, 80).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("clacker"));
        assert!(text.contains("hello"));
        assert!(text.contains("Ctrl+Q quit"));
    }

    #[test]
    fn test_paper_rows_for() {
        assert_eq!(Screen::paper_rows_for(24), 19);
        assert_eq!(Screen::paper_rows_for(3), 1);
    }
}
