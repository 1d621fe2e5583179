use crate::colors::Rgb;
use crate::terminal::Terminal;
use crossterm::style::Color;

pub const HELP_TEXT: &str = "\
DOTGLOBE
─────────────────
Mouse  Hover an arc
Space  Pause
+/-    Zoom in/out
0      Reset zoom
?      Close help
q/Esc  Quit";

/// Draw a bordered box with its top-left corner at (`x`, `y`).
pub fn draw_panel(term: &mut Terminal, x: u16, y: u16, lines: &[&str], border: Color, text: Color) {
    let max_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4; // 2 chars padding each side
    let box_height = lines.len() + 2;
    let (x, y) = (x as usize, y as usize);

    // Draw top border: ┌─────┐
    term.set(x as i32, y as i32, '┌', Some(border), false);
    for dx in 1..box_width - 1 {
        term.set((x + dx) as i32, y as i32, '─', Some(border), false);
    }
    term.set((x + box_width - 1) as i32, y as i32, '┐', Some(border), false);

    // Draw content rows with side borders
    for (i, line) in lines.iter().enumerate() {
        let row = (y + 1 + i) as i32;
        term.set(x as i32, row, '│', Some(border), false);

        let padding = max_width.saturating_sub(line.chars().count());
        let padded = format!(" {}{} ", line, " ".repeat(padding));
        term.set_str(x as i32 + 1, row, &padded, Some(text), false);

        term.set((x + box_width - 1) as i32, row, '│', Some(border), false);
    }

    // Draw bottom border: └─────┘
    let bottom = (y + box_height - 1) as i32;
    term.set(x as i32, bottom, '└', Some(border), false);
    for dx in 1..box_width - 1 {
        term.set((x + dx) as i32, bottom, '─', Some(border), false);
    }
    term.set((x + box_width - 1) as i32, bottom, '┘', Some(border), false);
}

/// Render a centered help overlay box with the provided text.
pub fn render_help_overlay(term: &mut Terminal, help_text: &str, border: Rgb, text: Rgb) {
    if help_text.is_empty() {
        return;
    }

    let (width, height) = term.size();
    let lines: Vec<&str> = help_text.lines().collect();
    let max_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4;
    let box_height = lines.len() + 2;

    // Center the box
    let x = (width as usize).saturating_sub(box_width) / 2;
    let y = (height as usize).saturating_sub(box_height) / 2;
    draw_panel(term, x as u16, y as u16, &lines, border.to_color(), text.to_color());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_is_boxed() {
        let mut term = Terminal::offscreen(12, 3);
        draw_panel(&mut term, 1, 0, &["hello"], Color::White, Color::Grey);
        assert_eq!(term.row_text(0), " ┌───────┐  ");
        assert_eq!(term.row_text(1), " │ hello │  ");
        assert_eq!(term.row_text(2), " └───────┘  ");
    }

    #[test]
    fn help_is_centered() {
        let mut term = Terminal::offscreen(40, 20);
        render_help_overlay(&mut term, HELP_TEXT, Rgb(255, 255, 255), Rgb(200, 200, 200));
        let lines = HELP_TEXT.lines().count() as u16;
        let top = (20 - (lines + 2)) / 2;
        assert!(term.row_text(top).contains('┌'));
        assert!(term.row_text(top + 1).contains("DOTGLOBE"));
    }
}
