//! Chart styling, passed explicitly to every renderer.

use plotters::style::{FontDesc, FontStyle, IntoFont, RGBColor, WHITE};

#[derive(Debug, Clone)]
pub struct ChartStyle {
    /// Canvas size (px) of single-panel charts.
    pub width: u32,
    pub height: u32,
    /// Canvas height (px) of the two-panel economy chart.
    pub stacked_height: u32,

    pub font_family: String,
    pub title_size: f64,
    pub subtitle_size: f64,
    pub label_size: f64,

    pub line_width: u32,
    pub marker_size: i32,
    /// Opacity of grid lines, 0..=1.
    pub grid_alpha: f64,
    pub background: RGBColor,
    /// Series colors for multi-series charts without fixed colors.
    pub palette: Vec<RGBColor>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 1800,
            height: 750,
            stacked_height: 1200,
            font_family: "sans-serif".to_string(),
            title_size: 34.0,
            subtitle_size: 24.0,
            label_size: 20.0,
            line_width: 3,
            marker_size: 6,
            grid_alpha: 0.3,
            background: WHITE,
            // Evenly spaced hues at matched lightness.
            palette: vec![
                RGBColor(246, 112, 136),
                RGBColor(206, 143, 49),
                RGBColor(150, 163, 49),
                RGBColor(50, 176, 101),
                RGBColor(53, 172, 164),
                RGBColor(56, 167, 208),
                RGBColor(163, 140, 244),
                RGBColor(244, 97, 221),
            ],
        }
    }
}

impl ChartStyle {
    /// Default style at a custom single-panel size; the stacked chart keeps the
    /// default 8:5 height ratio.
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            stacked_height: height.saturating_mul(8) / 5,
            ..Self::default()
        }
    }

    pub fn palette_color(&self, idx: usize) -> RGBColor {
        if self.palette.is_empty() {
            return RGBColor(0, 0, 0);
        }
        self.palette[idx % self.palette.len()]
    }

    pub fn title_font(&self) -> FontDesc<'_> {
        (self.font_family.as_str(), self.title_size)
            .into_font()
            .style(FontStyle::Bold)
    }

    pub fn subtitle_font(&self) -> FontDesc<'_> {
        (self.font_family.as_str(), self.subtitle_size).into_font()
    }

    pub fn label_font(&self) -> FontDesc<'_> {
        (self.font_family.as_str(), self.label_size).into_font()
    }

    pub fn axis_desc_font(&self) -> FontDesc<'_> {
        self.label_font().style(FontStyle::Bold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_size_scales_stacked_height() {
        let s = ChartStyle::with_size(1000, 500);
        assert_eq!((s.width, s.height, s.stacked_height), (1000, 500, 800));
        assert_eq!(s.line_width, ChartStyle::default().line_width);
    }

    #[test]
    fn palette_wraps_and_tolerates_empty() {
        let mut s = ChartStyle::default();
        let n = s.palette.len();
        assert_eq!(s.palette_color(n), s.palette_color(0));
        s.palette.clear();
        assert_eq!(s.palette_color(3), RGBColor(0, 0, 0));
    }
}
