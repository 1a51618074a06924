//! SVG chart rendering with Plotters.
//!
//! Each chart is described as data first (`Line` / `Panel`), then drawn. The
//! description step is where missing values disappear: a `Line` only holds the
//! `(year, value)` pairs that were present in the table. A chart with no points
//! at all is not written.

use std::error::Error;
use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::coord::types::{RangedCoordf64, RangedCoordi32};
use plotters::prelude::*;

use crate::analysis::normalize_series;
use crate::domain::{
    CARBON_INTENSITY, COMPARISON_INDICATORS, GDP_PER_CAPITA, GHG_PER_CAPITA, ObservationTable,
    PM25_MEAN_EXPOSURE, PM25_POPULATION_EXPOSED, POPULATION_TOTAL, label_of, short_label,
};
use crate::error::AppError;
use crate::plot::style::ChartStyle;

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;
type YearChart<'a, 'b> = ChartContext<'a, SVGBackend<'b>, Cartesian2d<RangedCoordi32, RangedCoordf64>>;
type DrawResult<T> = Result<T, Box<dyn Error>>;

const ORANGE: RGBColor = RGBColor(255, 165, 0);
const GREEN_DARK: RGBColor = RGBColor(0, 128, 0);
const PURPLE: RGBColor = RGBColor(128, 0, 128);
const BROWN: RGBColor = RGBColor(165, 42, 42);

/// The charts `trends` produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Pm25,
    GhgEmissions,
    CarbonIntensity,
    EconomyPopulation,
    TrendComparison,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::Pm25,
        ChartKind::GhgEmissions,
        ChartKind::CarbonIntensity,
        ChartKind::EconomyPopulation,
        ChartKind::TrendComparison,
    ];

    pub fn file_stem(self) -> &'static str {
        match self {
            ChartKind::Pm25 => "pm25",
            ChartKind::GhgEmissions => "ghg_emissions",
            ChartKind::CarbonIntensity => "carbon_intensity",
            ChartKind::EconomyPopulation => "economy_population",
            ChartKind::TrendComparison => "trend_comparison",
        }
    }

    pub fn file_name(self, country_code: &str) -> String {
        format!("{}_{}.svg", self.file_stem(), country_code.to_lowercase())
    }
}

/// What every chart needs besides its style.
#[derive(Debug, Clone, Copy)]
pub struct ChartData<'a> {
    pub table: &'a ObservationTable,
    /// Display name used in titles ("Germany").
    pub country: &'a str,
    /// Period shown in titles ("1990-2017").
    pub period: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Square,
    Triangle,
    Cross,
}

/// One plotted series.
#[derive(Debug, Clone)]
pub struct Line {
    pub legend: String,
    pub points: Vec<(i32, f64)>,
    pub color: RGBColor,
    pub marker: Marker,
    pub dashed: bool,
}

impl Line {
    /// Series for an indicator code of the fixed set, missing values dropped.
    fn indicator(table: &ObservationTable, code: &str, legend: &str, color: RGBColor, marker: Marker) -> Self {
        let label = label_of(code).unwrap_or(code);
        Self {
            legend: legend.to_string(),
            points: table.series(label),
            color,
            marker,
            dashed: false,
        }
    }

    fn scaled(mut self, factor: f64) -> Self {
        for p in &mut self.points {
            p.1 *= factor;
        }
        self
    }

    fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }

    fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One set of axes.
#[derive(Debug, Clone)]
pub struct Panel {
    pub title: Option<String>,
    pub x_desc: String,
    pub y_desc: String,
    pub lines: Vec<Line>,
}

impl Panel {
    fn has_data(&self) -> bool {
        self.lines.iter().any(|l| !l.is_empty())
    }
}

/// Render every chart into `out_dir`. Returns the files written; charts without
/// data are skipped.
pub fn render_all(
    data: ChartData<'_>,
    style: &ChartStyle,
    out_dir: &Path,
    country_code: &str,
) -> Result<Vec<PathBuf>, AppError> {
    let mut written = Vec::new();
    for kind in ChartKind::ALL {
        let path = out_dir.join(kind.file_name(country_code));
        if render_chart(kind, data, style, &path)? {
            written.push(path);
        }
    }
    Ok(written)
}

/// Render one chart to `path`. Returns `false` (and writes nothing) when the
/// chart has no data.
pub fn render_chart(kind: ChartKind, data: ChartData<'_>, style: &ChartStyle, path: &Path) -> Result<bool, AppError> {
    let table = data.table;
    let title_period = format!("{} ({})", data.country, data.period);

    let drawn = match kind {
        ChartKind::Pm25 => {
            let exposure = Line::indicator(table, PM25_MEAN_EXPOSURE, "Mean exposure (µg/m³)", RED, Marker::Circle);
            let exposed = Line::indicator(
                table,
                PM25_POPULATION_EXPOSED,
                "Population exposed (%)",
                ORANGE,
                Marker::Square,
            )
            .dashed();
            if exposure.is_empty() && exposed.is_empty() {
                false
            } else {
                let title = format!("PM2.5 pollution in {title_period}");
                let subtitle = "Mean exposure and population above the WHO guideline";
                render_to(path, (style.width, style.height), style, |root| {
                    let area = titled(root, &title, subtitle, style)?;
                    draw_dual_panel(&area, &exposure, "Mean exposure (µg/m³)", &exposed, "Population exposed (%)", style)
                })?;
                true
            }
        }
        ChartKind::GhgEmissions => {
            let panel = Panel {
                title: None,
                x_desc: "Year".to_string(),
                y_desc: "GHG emissions per capita (t CO2e)".to_string(),
                lines: vec![Line::indicator(
                    table,
                    GHG_PER_CAPITA,
                    "GHG emissions per capita",
                    GREEN_DARK,
                    Marker::Triangle,
                )],
            };
            let title = format!("Greenhouse gas emissions in {title_period}");
            single_panel_chart(path, &panel, &title, "Per-capita emissions in tonnes of CO2 equivalent", style)?
        }
        ChartKind::CarbonIntensity => {
            let panel = Panel {
                title: None,
                x_desc: "Year".to_string(),
                y_desc: "Carbon intensity (kg CO2e/PPP$)".to_string(),
                lines: vec![Line::indicator(
                    table,
                    CARBON_INTENSITY,
                    "Carbon intensity",
                    PURPLE,
                    Marker::Cross,
                )],
            };
            let title = format!("Carbon intensity of the economy, {title_period}");
            single_panel_chart(path, &panel, &title, "CO2 emissions per unit of GDP (PPP)", style)?
        }
        ChartKind::EconomyPopulation => {
            let gdp = Panel {
                title: Some(format!("Economic growth, {title_period}")),
                x_desc: String::new(),
                y_desc: "GDP per capita (thousand US$)".to_string(),
                lines: vec![Line::indicator(table, GDP_PER_CAPITA, "GDP per capita", BLUE, Marker::Circle).scaled(1e-3)],
            };
            let population = Panel {
                title: Some(format!("Population, {title_period}")),
                x_desc: "Year".to_string(),
                y_desc: "Population (millions)".to_string(),
                lines: vec![Line::indicator(table, POPULATION_TOTAL, "Population", BROWN, Marker::Square).scaled(1e-6)],
            };
            if !gdp.has_data() && !population.has_data() {
                false
            } else {
                let title = format!("Economic and demographic performance of {title_period}");
                render_to(path, (style.width, style.stacked_height), style, |root| {
                    let area = root.titled(&title, style.title_font())?;
                    let panels = area.split_evenly((2, 1));
                    if let [upper, lower] = panels.as_slice() {
                        draw_panel(upper, &gdp, style)?;
                        draw_panel(lower, &population, style)?;
                    }
                    Ok(())
                })?;
                true
            }
        }
        ChartKind::TrendComparison => {
            let panel = Panel {
                title: None,
                x_desc: "Year".to_string(),
                y_desc: "Index (base year = 100)".to_string(),
                lines: comparison_lines(table, style),
            };
            let title = format!("Environmental indicators compared, {title_period}");
            single_panel_chart(path, &panel, &title, "Normalized values (base year = 100)", style)?
        }
    };

    if drawn {
        tracing::info!(chart = kind.file_stem(), path = %path.display(), "wrote chart");
    } else {
        tracing::info!(chart = kind.file_stem(), "no data for chart, skipping");
    }
    Ok(drawn)
}

/// Base-100 series for the comparison chart; indicators without a usable base are left out.
fn comparison_lines(table: &ObservationTable, style: &ChartStyle) -> Vec<Line> {
    COMPARISON_INDICATORS
        .iter()
        .enumerate()
        .filter_map(|(idx, code)| {
            let label = label_of(code)?;
            let points = normalize_series(&table.series(label))?;
            Some(Line {
                legend: short_label(label).to_string(),
                points,
                color: style.palette_color(idx),
                marker: Marker::Circle,
                dashed: false,
            })
        })
        .collect()
}

fn single_panel_chart(path: &Path, panel: &Panel, title: &str, subtitle: &str, style: &ChartStyle) -> Result<bool, AppError> {
    if !panel.has_data() {
        return Ok(false);
    }
    render_to(path, (style.width, style.height), style, |root| {
        let area = titled(root, title, subtitle, style)?;
        draw_panel(&area, panel, style)
    })?;
    Ok(true)
}

fn render_to<F>(path: &Path, size: (u32, u32), style: &ChartStyle, draw: F) -> Result<(), AppError>
where
    F: FnOnce(&Area<'_>) -> DrawResult<()>,
{
    let root = SVGBackend::new(path, size).into_drawing_area();
    let result = root
        .fill(&style.background)
        .map_err(Box::<dyn Error>::from)
        .and_then(|_| draw(&root))
        .and_then(|_| root.present().map_err(Box::<dyn Error>::from));
    result.map_err(|e| AppError::config(format!("Failed to render chart '{}': {e}", path.display())))
}

fn titled<'a>(root: &Area<'a>, title: &str, subtitle: &str, style: &ChartStyle) -> DrawResult<Area<'a>> {
    let area = root.titled(title, style.title_font())?;
    Ok(area.titled(subtitle, style.subtitle_font())?)
}

fn year_bounds<'l>(lines: impl IntoIterator<Item = &'l Line>) -> Option<Range<i32>> {
    let mut years = lines.into_iter().flat_map(|l| l.points.iter().map(|p| p.0));
    let first = years.next()?;
    let (lo, hi) = years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
    if lo == hi {
        return Some((lo - 1)..(hi + 1));
    }
    Some(lo..hi)
}

fn value_bounds<'l>(lines: impl IntoIterator<Item = &'l Line>) -> Option<Range<f64>> {
    let mut values = lines.into_iter().flat_map(|l| l.points.iter().map(|p| p.1));
    let first = values.next()?;
    let (lo, hi) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = hi - lo;
    let pad = if span > 1e-9 {
        span * 0.08
    } else {
        (hi.abs() * 0.05).max(1.0)
    };
    Some((lo - pad)..(hi + pad))
}

fn draw_panel(area: &Area<'_>, panel: &Panel, style: &ChartStyle) -> DrawResult<()> {
    let lines: Vec<&Line> = panel.lines.iter().filter(|l| !l.is_empty()).collect();
    let (Some(x_range), Some(y_range)) = (year_bounds(lines.iter().copied()), value_bounds(lines.iter().copied())) else {
        return Ok(());
    };

    let caption_font = style.subtitle_font().style(FontStyle::Bold);
    let mut builder = ChartBuilder::on(area);
    builder.margin(20).x_label_area_size(60).y_label_area_size(120);
    if let Some(title) = &panel.title {
        builder.caption(title, caption_font);
    }
    let mut chart = builder.build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_labels(10)
        .y_labels(8)
        .x_desc(panel.x_desc.as_str())
        .y_desc(panel.y_desc.as_str())
        .label_style(style.label_font())
        .axis_desc_style(style.axis_desc_font())
        .light_line_style(BLACK.mix(style.grid_alpha * 0.4))
        .bold_line_style(BLACK.mix(style.grid_alpha))
        .draw()?;

    draw_lines(&mut chart, &lines, style)?;
    draw_legend(&mut chart, SeriesLabelPosition::UpperLeft, style)?;
    Ok(())
}

/// Two y axes sharing the year axis: `left` on the primary axis, `right` (drawn
/// with square markers) on the secondary one.
fn draw_dual_panel(
    area: &Area<'_>,
    left: &Line,
    left_desc: &str,
    right: &Line,
    right_desc: &str,
    style: &ChartStyle,
) -> DrawResult<()> {
    let Some(x_range) = year_bounds([left, right]) else {
        return Ok(());
    };
    let left_range = value_bounds([left]).unwrap_or(0.0..1.0);
    let right_range = value_bounds([right]).unwrap_or(0.0..1.0);

    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(120)
        .right_y_label_area_size(120)
        .build_cartesian_2d(x_range.clone(), left_range)?
        .set_secondary_coord(x_range, right_range);

    chart
        .configure_mesh()
        .x_labels(10)
        .y_labels(8)
        .x_desc("Year")
        .y_desc(left_desc)
        .label_style(style.label_font())
        .axis_desc_style(style.axis_desc_font().color(&left.color))
        .light_line_style(BLACK.mix(style.grid_alpha * 0.4))
        .bold_line_style(BLACK.mix(style.grid_alpha))
        .draw()?;

    chart
        .configure_secondary_axes()
        .y_labels(8)
        .y_desc(right_desc)
        .label_style(style.label_font())
        .axis_desc_style(style.axis_desc_font().color(&right.color))
        .draw()?;

    if !left.is_empty() {
        draw_lines(&mut chart, &[left], style)?;
    }

    if !right.is_empty() {
        let color = right.color;
        let stroke = color.stroke_width(style.line_width);
        let points = right.points.iter().copied();
        let anno = if right.dashed {
            chart.draw_secondary_series(DashedLineSeries::new(points, 14, 8, stroke))?
        } else {
            chart.draw_secondary_series(LineSeries::new(points, stroke))?
        };
        anno.label(right.legend.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 28, y)], color.stroke_width(3)));

        let size = style.marker_size;
        let fill = color.filled();
        chart.draw_secondary_series(
            right
                .points
                .iter()
                .map(|&p| EmptyElement::at(p) + Rectangle::new([(-size, -size), (size, size)], fill)),
        )?;
    }

    draw_legend(&mut chart, SeriesLabelPosition::UpperRight, style)?;
    Ok(())
}

fn draw_lines(chart: &mut YearChart<'_, '_>, lines: &[&Line], style: &ChartStyle) -> DrawResult<()> {
    for line in lines {
        let color = line.color;
        let stroke = color.stroke_width(style.line_width);
        let points = line.points.iter().copied();
        let anno = if line.dashed {
            chart.draw_series(DashedLineSeries::new(points, 14, 8, stroke))?
        } else {
            chart.draw_series(LineSeries::new(points, stroke))?
        };
        anno.label(line.legend.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 28, y)], color.stroke_width(3)));

        draw_markers(chart, line, style)?;
    }
    Ok(())
}

fn draw_markers(chart: &mut YearChart<'_, '_>, line: &Line, style: &ChartStyle) -> DrawResult<()> {
    let size = style.marker_size;
    let fill = line.color.filled();
    let points = line.points.iter().copied();
    match line.marker {
        Marker::Circle => {
            chart.draw_series(points.map(|p| Circle::new(p, size, fill)))?;
        }
        Marker::Triangle => {
            chart.draw_series(points.map(|p| TriangleMarker::new(p, size, fill)))?;
        }
        Marker::Square => {
            chart.draw_series(points.map(|p| EmptyElement::at(p) + Rectangle::new([(-size, -size), (size, size)], fill)))?;
        }
        Marker::Cross => {
            let stroke = line.color.stroke_width(2);
            chart.draw_series(points.map(|p| Cross::new(p, size, stroke)))?;
        }
    }
    Ok(())
}

fn draw_legend<'a>(chart: &mut YearChart<'a, 'a>, position: SeriesLabelPosition, style: &ChartStyle) -> DrawResult<()> {
    chart
        .configure_series_labels()
        .position(position)
        .label_font(style.label_font())
        .background_style(style.background.mix(0.85))
        .border_style(BLACK.mix(0.4))
        .draw()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{INDICATORS, ObservationTable};

    fn full_table() -> ObservationTable {
        let labels: Vec<String> = INDICATORS.iter().map(|(_, l)| l.to_string()).collect();
        let mut t = ObservationTable::new(labels);
        for (i, year) in (1990..=1995).enumerate() {
            let x = i as f64;
            t.push_row(
                Some(year),
                vec![
                    Some(20.0 - x),
                    if i == 2 { None } else { Some(90.0 - x) },
                    Some(14.0 - 0.3 * x),
                    Some(0.4 - 0.01 * x),
                    Some(2.0e12 + x * 1.0e11),
                    Some(80.0e6 + x * 1.0e5),
                    Some(25_000.0 + x * 1_000.0),
                ],
            )
            .unwrap();
        }
        t
    }

    #[test]
    fn renders_every_chart_for_complete_data() {
        let table = full_table();
        let dir = tempfile::tempdir().unwrap();
        let data = ChartData {
            table: &table,
            country: "Germany",
            period: "1990-2017",
        };
        let written = render_all(data, &ChartStyle::with_size(900, 400), dir.path(), "DEU").unwrap();

        assert_eq!(written.len(), ChartKind::ALL.len());
        for kind in ChartKind::ALL {
            let path = dir.path().join(kind.file_name("DEU"));
            let svg = std::fs::read_to_string(&path).unwrap();
            assert!(svg.contains("<svg"), "{} is not an SVG", path.display());
        }
        assert!(dir.path().join("pm25_deu.svg").exists());
    }

    #[test]
    fn empty_table_writes_nothing() {
        let table = ObservationTable::empty();
        let dir = tempfile::tempdir().unwrap();
        let data = ChartData {
            table: &table,
            country: "DEU",
            period: "1990-2017",
        };
        let written = render_all(data, &ChartStyle::default(), dir.path(), "DEU").unwrap();
        assert!(written.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn comparison_uses_short_legends_and_base_100() {
        let table = full_table();
        let lines = comparison_lines(&table, &ChartStyle::default());
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].legend, "PM2.5");
        for line in &lines {
            assert_eq!(line.points[0].1, 100.0);
        }
    }

    #[test]
    fn bounds_pad_single_points() {
        let line = Line {
            legend: "x".to_string(),
            points: vec![(2000, 5.0)],
            color: RED,
            marker: Marker::Circle,
            dashed: false,
        };
        assert_eq!(year_bounds([&line]), Some(1999..2001));
        let y = value_bounds([&line]).unwrap();
        assert!(y.start < 5.0 && y.end > 5.0);
        let empty = Line { points: Vec::new(), ..line };
        assert_eq!(year_bounds([&empty]), None);
    }
}
