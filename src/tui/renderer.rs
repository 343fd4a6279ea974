use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph};

use torus_snake::game::{BoardSnapshot, GamePhase};
use torus_snake::grid::CellContent;

/// Each board cell is drawn two columns wide so it looks square.
const CELL_WIDTH: u16 = 2;

const GLYPH_FILLED: &str = "██";
const GLYPH_FOOD: &str = "●●";
const GLYPH_EMPTY: &str = "··";

const COLOR_HEAD: Color = Color::White;
const COLOR_BODY: Color = Color::Green;
const COLOR_END: Color = Color::DarkGray;
const COLOR_FOOD: Color = Color::Red;
const COLOR_EMPTY: Color = Color::Rgb(60, 60, 60);

/// Renders the full frame from the latest board snapshot.
pub fn render(frame: &mut Frame<'_>, snapshot: Option<&BoardSnapshot>) {
    let area = frame.area();
    let [play_area, status_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

    let Some(snapshot) = snapshot else {
        frame.render_widget(
            Paragraph::new("waiting for board...").alignment(Alignment::Center),
            play_area,
        );
        return;
    };

    let board_area = centered_board(play_area, snapshot.size);
    let block = Block::bordered().title(format!(" {0}x{0} ", snapshot.size));
    let inner = block.inner(board_area);
    frame.render_widget(block, board_area);
    render_cells(frame, inner, snapshot);

    frame.render_widget(
        Paragraph::new(status_line(snapshot.phase))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray)),
        status_area,
    );

    if snapshot.phase == GamePhase::GameOver {
        render_game_over(frame, board_area);
    }
}

/// Returns the glyph and color for one cell; snake cells vanish on blink-off frames.
#[must_use]
pub fn cell_style(content: CellContent, visible: bool) -> (&'static str, Color) {
    if !visible && content.is_snake() {
        return (GLYPH_EMPTY, COLOR_EMPTY);
    }

    match content {
        CellContent::Empty => (GLYPH_EMPTY, COLOR_EMPTY),
        CellContent::Food => (GLYPH_FOOD, COLOR_FOOD),
        CellContent::SnakeHead => (GLYPH_FILLED, COLOR_HEAD),
        CellContent::SnakeBody => (GLYPH_FILLED, COLOR_BODY),
        CellContent::SnakeEnd => (GLYPH_FILLED, COLOR_END),
    }
}

fn render_cells(frame: &mut Frame<'_>, inner: Rect, snapshot: &BoardSnapshot) {
    let buffer = frame.buffer_mut();
    for cell in &snapshot.cells {
        let Some((x, y)) = logical_to_terminal(inner, cell.position.x, cell.position.y) else {
            continue;
        };

        let (glyph, color) = cell_style(cell.content, snapshot.visible);
        let mut style = Style::new().fg(color);
        if cell.content == CellContent::SnakeHead {
            style = style.add_modifier(Modifier::BOLD);
        }
        buffer.set_string(x, y, glyph, style);
    }
}

fn status_line(phase: GamePhase) -> Line<'static> {
    Line::from(match phase {
        GamePhase::Init => "[Enter] start  [+/-] board size  [q] quit",
        GamePhase::Playing => "[arrows/wasd] steer  [r] restart  [q] quit",
        GamePhase::GameOver => "[r] restart  [q] quit",
    })
}

fn render_game_over(frame: &mut Frame<'_>, area: Rect) {
    let popup = centered_popup(area, 60, 30);
    frame.render_widget(Clear, popup);

    let lines = vec![
        Line::from("GAME OVER"),
        Line::from(""),
        Line::from("[R] Restart"),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::bordered().title(" game over ")),
        popup,
    );
}

fn centered_board(area: Rect, size: usize) -> Rect {
    let side = u16::try_from(size).unwrap_or(u16::MAX);
    let width = side.saturating_mul(CELL_WIDTH).saturating_add(2).min(area.width);
    let height = side.saturating_add(2).min(area.height);

    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn centered_popup(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let [_, mid, _] = Layout::vertical([
        Constraint::Percentage((100 - height_percent) / 2),
        Constraint::Percentage(height_percent),
        Constraint::Percentage((100 - height_percent) / 2),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - width_percent) / 2),
        Constraint::Percentage(width_percent),
        Constraint::Percentage((100 - width_percent) / 2),
    ])
    .areas(mid);

    center
}

fn logical_to_terminal(inner: Rect, x: usize, y: usize) -> Option<(u16, u16)> {
    let x_offset = u16::try_from(x).ok()?.checked_mul(CELL_WIDTH)?;
    let y_offset = u16::try_from(y).ok()?;

    let x = inner.x.saturating_add(x_offset);
    let y = inner.y.saturating_add(y_offset);
    if x.saturating_add(CELL_WIDTH) > inner.right() || y >= inner.bottom() {
        return None;
    }

    Some((x, y))
}
