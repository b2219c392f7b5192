use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{Color, Print, PrintStyledContent, Stylize};

use crate::color::Color as AppColor;
use crate::palettes::Palette;

const SWATCH_WIDTH: usize = 9;

/// Choose black or white foreground for readable text on the given background.
fn contrast_fg(c: AppColor) -> Color {
    if c.relative_luminance() > 0.4 {
        Color::Black
    } else {
        Color::White
    }
}

/// Print each palette in rotation order, one swatch line per color.
/// Values that are not `#rrggbb` are listed without a swatch.
pub fn render_palettes(out: &mut impl Write, palettes: &[Palette]) -> io::Result<()> {
    for (index, palette) in palettes.iter().enumerate() {
        queue!(
            out,
            Print(format!(
                "{index:>3}  {} ({} colors)\n",
                palette.name,
                palette.colors.len()
            ))
        )?;

        for (key, value) in &palette.colors {
            queue!(out, Print("     "))?;
            let label = format!("{value:^width$}", width = SWATCH_WIDTH);
            match AppColor::from_hex(value) {
                Some(color) => {
                    let bg = Color::Rgb {
                        r: color.r,
                        g: color.g,
                        b: color.b,
                    };
                    queue!(out, PrintStyledContent(label.on(bg).with(contrast_fg(color))))?;
                }
                None => queue!(out, PrintStyledContent(label.dim()))?,
            }
            queue!(out, Print(format!("  {key}\n")))?;
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palettes::ColorMap;

    #[test]
    fn lists_every_palette_and_key() {
        let palettes = vec![
            Palette {
                name: "dawn".to_string(),
                colors: ColorMap::from([
                    ("editor.background".to_string(), "#fdf6e3".to_string()),
                    ("odd".to_string(), "#fff".to_string()),
                ]),
            },
            Palette {
                name: "dusk".to_string(),
                colors: ColorMap::from([("editor.background".to_string(), "#002b36".to_string())]),
            },
        ];

        let mut out = Vec::new();
        render_palettes(&mut out, &palettes).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("  0  dawn (2 colors)"));
        assert!(text.contains("  1  dusk (1 colors)"));
        assert!(text.contains("#002b36"));
        assert!(text.contains("#fff"));
        assert_eq!(text.matches("editor.background").count(), 2);
    }

    #[test]
    fn label_color_follows_luminance() {
        assert_eq!(contrast_fg(AppColor::new(250, 250, 250)), Color::Black);
        assert_eq!(contrast_fg(AppColor::new(10, 10, 40)), Color::White);
    }
}
