//! SVG chart rendering via plotters.
//!
//! Each chart slot draws into its own `.svg` file. A chart handle
//! remembers the styling and surface size it was constructed with, so
//! updates redraw the same file in place; picking up a new theme or
//! viewport size requires a rebuild, which is exactly what the session
//! does on those events.

use anyhow::{Result, bail};
use plotters::{prelude::*, style::RGBAColor};
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::debug;

use crate::chart::{ChartBackend, ChartData, ChartKind, ChartSpec, Surface, SurfaceSize};
use crate::chart::spec::ZERO_EPSILON;
use crate::signals::SignalSource;
use crate::theme::Palette;

/// Fill for bars that carry no real value.
const EMPTY_BAR: &str = "#f3f4f6";

/// A drawing surface backed by an SVG file.
///
/// The measured size tracks the live viewport signal, not the size at
/// creation, so charts built after a resize pick up the new dimensions.
pub struct SvgSurface {
    path: PathBuf,
    viewport: watch::Receiver<SurfaceSize>,
}

impl SvgSurface {
    pub fn new(path: impl Into<PathBuf>, viewport: &SignalSource<SurfaceSize>) -> Self {
        Self {
            path: path.into(),
            viewport: viewport.subscribe(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Surface for SvgSurface {
    fn measure(&self) -> SurfaceSize {
        *self.viewport.borrow()
    }
}

/// A live chart: one rendered SVG file plus everything needed to redraw
/// it in place.
pub struct SvgChart {
    path: PathBuf,
    size: SurfaceSize,
    kind: ChartKind,
    series_label: String,
    accent: &'static str,
    palette: Palette,
}

impl SvgChart {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Renders charts to SVG files.
#[derive(Debug, Default)]
pub struct SvgChartBackend;

impl ChartBackend for SvgChartBackend {
    type Surface = SvgSurface;
    type Handle = SvgChart;

    fn construct(&mut self, surface: &SvgSurface, spec: &ChartSpec) -> Result<SvgChart> {
        let size = surface.measure();
        render(
            &surface.path,
            size,
            spec.kind,
            &spec.series_label,
            spec.accent,
            &spec.palette,
            &spec.data,
        )?;
        debug!(path = %surface.path.display(), "Chart rendered");

        Ok(SvgChart {
            path: surface.path.clone(),
            size,
            kind: spec.kind,
            series_label: spec.series_label.clone(),
            accent: spec.accent,
            palette: spec.palette,
        })
    }

    fn update(&mut self, handle: &mut SvgChart, data: &ChartData) -> Result<()> {
        render(
            &handle.path,
            handle.size,
            handle.kind,
            &handle.series_label,
            handle.accent,
            &handle.palette,
            data,
        )?;
        debug!(path = %handle.path.display(), "Chart redrawn");
        Ok(())
    }

    // The rendered file is the dashboard's product, so it stays on disk.
    fn destroy(&mut self, handle: SvgChart) {
        debug!(path = %handle.path.display(), "Releasing chart");
    }
}

fn render(
    path: &Path,
    size: SurfaceSize,
    kind: ChartKind,
    series_label: &str,
    accent: &'static str,
    palette: &Palette,
    data: &ChartData,
) -> Result<()> {
    if !size.is_laid_out() {
        bail!("surface for {} has no size", path.display());
    }
    if data.values.is_empty() {
        bail!("no days to draw for {}", path.display());
    }

    let accent = color_token(accent);
    let surface = color_token(palette.surface);
    let tick = color_token(palette.tick);
    let legend = color_token(palette.legend);
    let grid_major = color_token(palette.grid_y);
    let grid_minor = color_token(palette.grid_x);

    let root = SVGBackend::new(path, (size.width, size.height)).into_drawing_area();
    root.fill(&surface)?;

    let days = data.values.len();
    let labels = data.labels.clone();

    let mut chart = ChartBuilder::on(&root)
        .x_label_area_size(28)
        .y_label_area_size(44)
        .margin(12)
        .caption(
            series_label,
            ("sans-serif", 16.0).into_font().color(&legend),
        )
        .build_cartesian_2d(-0.5f64..days as f64 - 0.5, 0f64..data.suggested_max)?;

    chart
        .configure_mesh()
        .label_style(("sans-serif", 12.0).into_font().color(&tick))
        .bold_line_style(grid_major)
        .light_line_style(grid_minor)
        .x_labels(days)
        .x_label_formatter(&move |x| {
            let i = x.round();
            if i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        })
        .draw()?;

    match kind {
        ChartKind::Line => {
            let points: Vec<(f64, f64)> = data
                .values
                .iter()
                .enumerate()
                .map(|(i, v)| (i as f64, *v))
                .collect();

            chart
                .draw_series(
                    AreaSeries::new(points.iter().copied(), 0.0, accent.mix(0.2))
                        .border_style(accent.stroke_width(2)),
                )?
                .label(series_label)
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 16, y)], accent.stroke_width(2))
                });

            // point markers only when the series carries real data, so the
            // all-zero baseline stays a plain hairline
            if data.values.iter().any(|v| *v > ZERO_EPSILON) {
                chart.draw_series(
                    points
                        .iter()
                        .map(|(x, y)| Circle::new((*x, *y), 4, accent.filled())),
                )?;
            }
        }
        ChartKind::Bar => {
            let empty = color_token(EMPTY_BAR);
            chart
                .draw_series(data.values.iter().enumerate().map(|(i, v)| {
                    let style = if *v > ZERO_EPSILON {
                        accent.filled()
                    } else {
                        empty.filled()
                    };
                    Rectangle::new([(i as f64 - 0.35, 0.0), (i as f64 + 0.35, *v)], style)
                }))?
                .label(series_label)
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 6), (x + 12, y + 6)], accent.filled())
                });
        }
    }

    chart
        .configure_series_labels()
        .border_style(grid_major)
        .label_font(("sans-serif", 12.0).into_font().color(&legend))
        .draw()?;

    // present manually so an IO failure surfaces instead of being dropped
    root.present()?;

    Ok(())
}

/// Parses a `#rrggbb` or `#rrggbbaa` hex token. Unparseable tokens come
/// out opaque black rather than failing the render.
fn color_token(hex: &str) -> RGBAColor {
    let hex = hex.trim_start_matches('#');
    let channel =
        |i: usize| u8::from_str_radix(hex.get(i..i + 2).unwrap_or("00"), 16).unwrap_or(0);
    let alpha = if hex.len() >= 8 {
        channel(6) as f64 / 255.0
    } else {
        1.0
    };
    RGBAColor(channel(0), channel(2), channel(4), alpha)
}
