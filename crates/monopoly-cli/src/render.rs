//! Text rendering of a board snapshot.
//!
//! Fields are grouped by board side the way they appear on a printed
//! board: South (0-9), West (10-19), North (20-29), East (30-39). Each field
//! shows its visit probability as a percentage, tinted by a blue-to-red
//! colormap of its mapped probability.

use std::fmt::Write as _;

use monopoly_core::{BoardSnapshot, MapRange};

/// Heading printed above the board.
pub const TITLE: &str = "Monopoly Probabilities";

/// Prompt shown before the first resume.
pub const PROMPT_START: &str = "Press Enter to start simulating";

/// Status while suspended.
pub const STATUS_PAUSED: &str = "Not simulating.";

/// Status while running.
pub const STATUS_RUNNING: &str = "Simulating...";

/// Key bindings shown under the prompt.
pub const HELP: &str = "Enter: start/pause   p: print board   q: quit";

const SIDE_NAMES: [&str; 4] = ["South", "West", "North", "East"];
const FIELDS_PER_SIDE: usize = 10;
const FIELDS_PER_LINE: usize = 5;
const LEGEND_WIDTH: usize = 20;

const COLD: Rgb = Rgb::new(0, 0, 255);
const HOT: Rgb = Rgb::new(255, 0, 0);

/// A 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
}

impl Rgb {
    /// Create a color from its channels.
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// `#rrggbb` notation.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    fn paint(self, text: &str) -> String {
        format!(
            "\x1b[38;2;{};{};{}m{text}\x1b[0m",
            self.red, self.green, self.blue
        )
    }
}

/// Settings that shape the rendered table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Decimal places of the percentage labels.
    pub precision: usize,
    /// Whether to emit ANSI color codes.
    pub color: bool,
    /// Range the mapped probabilities were scaled into.
    pub map_range: MapRange,
}

/// Blue-to-red color for a mapped probability.
///
/// The value is normalized against `range` first; anything outside the
/// range is clamped to the nearest end.
pub fn colormap(mapped: f64, range: MapRange) -> Rgb {
    let width = range.high - range.low;
    let t = if width.abs() < f64::EPSILON {
        0.0
    } else {
        ((mapped - range.low) / width).clamp(0.0, 1.0)
    };
    Rgb::new(
        lerp_channel(COLD.red, HOT.red, t),
        lerp_channel(COLD.green, HOT.green, t),
        lerp_channel(COLD.blue, HOT.blue, t),
    )
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp_channel(from: u8, to: u8, t: f64) -> u8 {
    let value = (f64::from(to) - f64::from(from)).mul_add(t, f64::from(from));
    value.round().clamp(0.0, 255.0) as u8
}

/// `1234567` -> `"1,234,567"`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len().saturating_add(digits.len() / 3));
    for (index, digit) in digits.chars().enumerate() {
        let remaining = digits.len().saturating_sub(index);
        if index > 0 && remaining.checked_rem(3) == Some(0) {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// `Rounds: 1,234,567`.
pub fn rounds_label(rounds: u64) -> String {
    format!("Rounds: {}", group_thousands(rounds))
}

/// A probability in `[0, 1]` as a percentage label, e.g. `2.345%`.
pub fn probability_label(probability: f64, precision: usize) -> String {
    format!("{:.*}%", precision, probability * 100.0)
}

/// Render the full board view.
pub fn render_board(snapshot: &BoardSnapshot, running: bool, options: &RenderOptions) -> String {
    let mut out = String::new();
    let status = if running { STATUS_RUNNING } else { STATUS_PAUSED };

    let _ = writeln!(out, "{TITLE}");
    let _ = writeln!(out, "Status: {status}");
    let _ = writeln!(out, "{}", rounds_label(snapshot.roll_count));

    for (side, fields) in snapshot.fields.chunks(FIELDS_PER_SIDE).enumerate() {
        let name = SIDE_NAMES.get(side).copied().unwrap_or("Track");
        let first = fields.first().map_or(0, |f| f.field);
        let last = fields.last().map_or(0, |f| f.field);
        let _ = writeln!(out);
        let _ = writeln!(out, "{name} ({first}-{last})");

        for line in fields.chunks(FIELDS_PER_LINE) {
            let mut row = String::new();
            for stats in line {
                let marker = if stats.field == snapshot.position { '*' } else { ' ' };
                let label = format!(
                    "{:>9}",
                    probability_label(stats.probability, options.precision)
                );
                let label = if options.color {
                    colormap(stats.mapped, options.map_range).paint(&label)
                } else {
                    label
                };
                let _ = write!(row, "  {:>2}{marker}{label}", stats.field);
            }
            let _ = writeln!(out, "{row}");
        }
    }

    if options.color {
        let _ = writeln!(out);
        let _ = writeln!(out, "Probability Colormap: {}", legend(options.map_range));
    }
    out
}

#[allow(clippy::cast_precision_loss)]
fn legend(range: MapRange) -> String {
    let steps = LEGEND_WIDTH.saturating_sub(1).max(1) as f64;
    let bar: String = (0..LEGEND_WIDTH)
        .map(|cell| {
            let t = cell as f64 / steps;
            let value = (range.high - range.low).mul_add(t, range.low);
            colormap(value, range).paint("\u{2588}")
        })
        .collect();
    format!("{} {bar} {}", range.low, range.high)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use monopoly_board::Board;
    use monopoly_core::{BoardWalk, DiceRoll};

    use super::*;

    fn plain() -> RenderOptions {
        RenderOptions {
            precision: 3,
            color: false,
            map_range: MapRange::default(),
        }
    }

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(rounds_label(100_000), "Rounds: 100,000");
    }

    #[test]
    fn probability_labels_use_precision() {
        assert_eq!(probability_label(0.02345, 3), "2.345%");
        assert_eq!(probability_label(0.0, 2), "0.00%");
        assert_eq!(probability_label(1.0 / 3.0, 1), "33.3%");
    }

    #[test]
    fn colormap_endpoints() {
        let range = MapRange::new(0.0, 10.0);
        assert_eq!(colormap(0.0, range), COLD);
        assert_eq!(colormap(10.0, range), HOT);
        assert_eq!(colormap(25.0, range), HOT);
        assert_eq!(colormap(-1.0, range), COLD);
        assert_eq!(colormap(5.0, range).to_hex(), "#800080");
    }

    #[test]
    fn degenerate_range_is_cold() {
        assert_eq!(colormap(3.0, MapRange::new(3.0, 3.0)), COLD);
    }

    #[test]
    fn board_lists_every_field_by_side() {
        let mut walk = BoardWalk::new(Arc::new(Board::standard()));
        for _ in 0..3 {
            let _ = walk.step(DiceRoll::new(1, 1));
        }
        let text = render_board(&walk.snapshot(MapRange::default()), false, &plain());

        assert!(text.starts_with(TITLE));
        assert!(text.contains(STATUS_PAUSED));
        assert!(text.contains("Rounds: 3"));
        for side in ["South (0-9)", "West (10-19)", "North (20-29)", "East (30-39)"] {
            assert!(text.contains(side), "missing {side}");
        }
        assert!(text.contains("33.333%"));
        assert!(text.contains(" 6*"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn colored_board_has_escape_codes_and_legend() {
        let walk = BoardWalk::new(Arc::new(Board::standard()));
        let options = RenderOptions {
            color: true,
            ..plain()
        };
        let text = render_board(&walk.snapshot(MapRange::default()), true, &options);
        assert!(text.contains(STATUS_RUNNING));
        assert!(text.contains("\x1b[38;2;"));
        assert!(text.contains("Probability Colormap:"));
    }
}
