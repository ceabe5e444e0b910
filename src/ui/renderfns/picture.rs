use image::RgbImage;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Upper half block: foreground paints the top pixel, background the bottom one.
const HALF_BLOCK: &str = "▀";

/// Terminal rows needed for an image, two pixel rows per cell.
pub fn picture_height(image: &RgbImage) -> u16 {
  u16::try_from(image.height().div_ceil(2)).unwrap_or(u16::MAX)
}

/// Terminal columns taken by an image plus a one-column gap to the text beside it.
pub fn picture_width(image: &RgbImage) -> u16 {
  u16::try_from(image.width())
    .unwrap_or(u16::MAX)
    .saturating_add(1)
}

fn rgb(image: &RgbImage, x: u32, y: u32) -> Color {
  let [r, g, b] = image.get_pixel(x, y).0;
  Color::Rgb(r, g, b)
}

pub fn picture_lines(image: &RgbImage) -> Vec<Line<'static>> {
  (0..image.height())
    .step_by(2)
    .map(|y| {
      let spans: Vec<Span> = (0..image.width())
        .map(|x| {
          let mut style = Style::default().fg(rgb(image, x, y));
          if y + 1 < image.height() {
            style = style.bg(rgb(image, x, y + 1));
          }
          Span::styled(HALF_BLOCK, style)
        })
        .collect();
      Line::from(spans)
    })
    .collect()
}

/// Draw an already scaled picture into the top-left of `area`, clipped to it.
pub fn draw_picture(frame: &mut Frame, area: Rect, image: &RgbImage) {
  frame.render_widget(Paragraph::new(picture_lines(image)), area);
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::Rgb;

  #[test]
  fn test_two_pixel_rows_per_line() {
    let mut image = RgbImage::from_pixel(2, 3, Rgb([0, 0, 0]));
    image.put_pixel(0, 1, Rgb([255, 0, 0]));

    let lines = picture_lines(&image);

    assert_eq!(lines.len(), 2);
    assert_eq!(picture_height(&image), 2);
    assert_eq!(lines[0].spans.len(), 2);
    assert_eq!(lines[0].spans[0].style.fg, Some(Color::Rgb(0, 0, 0)));
    assert_eq!(lines[0].spans[0].style.bg, Some(Color::Rgb(255, 0, 0)));
  }

  #[test]
  fn test_picture_width_saturates() {
    assert_eq!(picture_width(&RgbImage::new(6, 1)), 7);
    assert_eq!(picture_width(&RgbImage::new(u16::MAX as u32, 1)), u16::MAX);
    assert_eq!(picture_width(&RgbImage::new(70_000, 1)), u16::MAX);
  }

  #[test]
  fn test_odd_last_row_has_no_background() {
    let image = RgbImage::from_pixel(1, 3, Rgb([10, 20, 30]));
    let lines = picture_lines(&image);
    assert_eq!(lines[1].spans[0].style.bg, None);
    assert_eq!(lines[1].spans[0].style.fg, Some(Color::Rgb(10, 20, 30)));
  }
}
