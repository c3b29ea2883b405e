use std::f32::consts::{FRAC_PI_2, TAU};

use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Align2, Color32, RichText, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Text};
use num_format::{Locale, ToFormattedString};

use crate::color::{AmountScale, generate_palette, ramp_color, ramp_radius};
use crate::report::{ChartOutput, CityTotal, GeoPoint, StatusSlice, TrendPoint};

const AMOUNT_LABEL: &str = "Amount (INR)";
const MAP_BUCKETS: usize = 8;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// `1234567.891` → `"1,234,567.89"`.
pub fn format_amount(value: f64) -> String {
    let rounded = format!("{:.2}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let Ok(int_val) = int_part.parse::<u64>() else {
        return format!("{value:.2}");
    };
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{}.{frac_part}", int_val.to_formatted_string(&Locale::en))
}

/// Plot x coordinate for a calendar day.
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Inverse of [`date_to_x`], rounding to the nearest day.
pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() || x.abs() > i32::MAX as f64 {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

/// Titled frame around one chart.
fn chart_frame(ui: &mut Ui, title: &str, add_contents: impl FnOnce(&mut Ui)) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.strong(title);
        add_contents(ui);
    });
}

/// The "no data" box drawn for empty and failed charts.
fn placeholder(ui: &mut Ui, height: f32) {
    let (rect, _) = ui.allocate_exact_size(Vec2::new(ui.available_width(), height), Sense::hover());
    ui.painter().text(
        rect.center(),
        Align2::CENTER_CENTER,
        "No data",
        egui::FontId::proportional(16.0),
        Color32::GRAY,
    );
}

/// Draw `output` with `draw`, or the placeholder.
fn chart_or_placeholder<T>(
    ui: &mut Ui,
    title: &str,
    height: f32,
    output: &ChartOutput<T>,
    draw: impl FnOnce(&mut Ui, &T),
) {
    chart_frame(ui, title, |ui: &mut Ui| match output.ready() {
        Some(data) => draw(ui, data),
        None => placeholder(ui, height),
    });
}

// ---------------------------------------------------------------------------
// Sales trend (line)
// ---------------------------------------------------------------------------

pub fn trend_chart(ui: &mut Ui, output: &ChartOutput<Vec<TrendPoint>>, height: f32) {
    chart_or_placeholder(ui, "Sales Trend Over Time", height, output, |ui, trend| {
        let points: PlotPoints = trend
            .iter()
            .map(|p| [date_to_x(p.date), p.amount])
            .collect();

        Plot::new("sales_trend")
            .height(height)
            .x_axis_label("Date")
            .y_axis_label(AMOUNT_LABEL)
            .x_axis_formatter(|mark: GridMark, _range: &std::ops::RangeInclusive<f64>| {
                x_to_date(mark.value)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            })
            .label_formatter(|_name: &str, value: &PlotPoint| match x_to_date(value.x) {
                Some(d) => format!("{d}\n{}", format_amount(value.y)),
                None => String::new(),
            })
            .allow_boxed_zoom(true)
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(points)
                        .name(AMOUNT_LABEL)
                        .color(Color32::from_rgb(99, 110, 250))
                        .width(2.0),
                );
            });
    });
}

// ---------------------------------------------------------------------------
// Top cities (bar)
// ---------------------------------------------------------------------------

pub fn city_chart(ui: &mut Ui, output: &ChartOutput<Vec<CityTotal>>, height: f32) {
    chart_or_placeholder(ui, "Top 10 Cities by Amount", height, output, |ui, cities| {
        let names: Vec<String> = cities.iter().map(|c| c.city.clone()).collect();
        let bars: Vec<Bar> = cities
            .iter()
            .enumerate()
            .map(|(i, c)| {
                Bar::new(i as f64, c.amount)
                    .name(&c.city)
                    .width(0.7)
                    .fill(Color32::from_rgb(99, 110, 250))
            })
            .collect();

        Plot::new("top_cities")
            .height(height)
            .x_axis_label("City")
            .y_axis_label(AMOUNT_LABEL)
            .x_axis_formatter(move |mark: GridMark, _range: &std::ops::RangeInclusive<f64>| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                    return String::new();
                }
                names.get(idx as usize).cloned().unwrap_or_default()
            })
            .allow_drag(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name(AMOUNT_LABEL));
            });
    });
}

// ---------------------------------------------------------------------------
// Status distribution (pie)
// ---------------------------------------------------------------------------

/// Angular extent of one slice, measured clockwise from 12 o'clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wedge {
    /// Index into the slice list.
    pub index: usize,
    pub start: f32,
    pub sweep: f32,
    pub share: f64,
}

/// Lay slices out around the circle. Slices with a non-positive amount
/// take no space.
pub fn pie_wedges(slices: &[StatusSlice]) -> Vec<Wedge> {
    let total: f64 = slices.iter().map(|s| s.amount.max(0.0)).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let mut start = 0.0f32;
    slices
        .iter()
        .enumerate()
        .filter(|(_, s)| s.amount > 0.0)
        .map(|(index, s)| {
            let share = s.amount / total;
            let sweep = share as f32 * TAU;
            let wedge = Wedge {
                index,
                start,
                sweep,
                share,
            };
            start += sweep;
            wedge
        })
        .collect()
}

/// Which wedge lies under `offset` (pointer minus pie centre, screen
/// coordinates with y pointing down).
pub fn wedge_at(wedges: &[Wedge], offset: Vec2, radius: f32) -> Option<&Wedge> {
    if offset.length() > radius {
        return None;
    }
    let angle = (offset.y.atan2(offset.x) + FRAC_PI_2).rem_euclid(TAU);
    wedges
        .iter()
        .find(|w| angle >= w.start && angle < w.start + w.sweep)
}

fn arc_point(center: egui::Pos2, radius: f32, angle: f32) -> egui::Pos2 {
    let a = angle - FRAC_PI_2;
    center + Vec2::new(a.cos(), a.sin()) * radius
}

pub fn status_chart(ui: &mut Ui, output: &ChartOutput<Vec<StatusSlice>>, height: f32) {
    chart_or_placeholder(ui, "Distribution of Order Status", height, output, |ui, slices| {
        let colors = generate_palette(slices.len());
        let wedges = pie_wedges(slices);

        ui.horizontal(|ui: &mut Ui| {
            let size = height.min(ui.available_width() * 0.6);
            let (response, painter) = ui.allocate_painter(Vec2::splat(size), Sense::hover());
            let center = response.rect.center();
            let radius = size * 0.45;

            for w in &wedges {
                // Convex fan pieces; a slice wider than 180° is not convex.
                let steps = ((w.sweep / 0.05).ceil() as usize).max(1);
                let mut pts = vec![center];
                for i in 0..=steps {
                    pts.push(arc_point(center, radius, w.start + w.sweep * i as f32 / steps as f32));
                    if pts.len() == 8 || i == steps {
                        let last = pts[pts.len() - 1];
                        painter.add(Shape::convex_polygon(
                            std::mem::replace(&mut pts, vec![center, last]),
                            colors[w.index],
                            Stroke::NONE,
                        ));
                    }
                }
            }
            if wedges.len() > 1 {
                for w in &wedges {
                    painter.line_segment(
                        [center, arc_point(center, radius, w.start)],
                        Stroke::new(1.5, Color32::WHITE),
                    );
                }
            }

            let hovered = response
                .hover_pos()
                .and_then(|pos| wedge_at(&wedges, pos - center, radius))
                .copied();
            if let Some(w) = hovered {
                let s = &slices[w.index];
                response.on_hover_text_at_pointer(format!(
                    "{}\n{} ({:.1}%)\n{} orders",
                    s.status,
                    format_amount(s.amount),
                    w.share * 100.0,
                    s.orders
                ));
            }

            ui.vertical(|ui: &mut Ui| {
                for w in &wedges {
                    let s = &slices[w.index];
                    ui.label(
                        RichText::new(format!("■ {}  {:.1}%", s.status, w.share * 100.0))
                            .color(colors[w.index]),
                    );
                }
            });
        });
    });
}

// ---------------------------------------------------------------------------
// Sales map (scatter)
// ---------------------------------------------------------------------------

/// Closest point to `target` within `max_dist` of the visible plot span.
pub fn nearest_point<'a>(
    points: &'a [GeoPoint],
    target: PlotPoint,
    span: [f64; 2],
    max_dist: f64,
) -> Option<&'a GeoPoint> {
    let dist = |p: &GeoPoint| {
        let dx = (p.longitude - target.x) / span[0].max(f64::EPSILON);
        let dy = (p.latitude - target.y) / span[1].max(f64::EPSILON);
        dx * dx + dy * dy
    };
    points
        .iter()
        .map(|p| (dist(p), p))
        .filter(|(d, _)| *d <= max_dist * max_dist)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, p)| p)
}

pub fn map_chart(ui: &mut Ui, output: &ChartOutput<Vec<GeoPoint>>, height: f32) {
    chart_or_placeholder(ui, "Sales Map", height, output, |ui, points| {
        let scale = AmountScale::from_amounts(points.iter().map(|p| p.amount));

        // Markers share colour and size per amount bucket.
        let mut buckets: Vec<Vec<[f64; 2]>> = vec![Vec::new(); MAP_BUCKETS];
        for p in points {
            let b = ((scale.fraction(p.amount) * MAP_BUCKETS as f32) as usize).min(MAP_BUCKETS - 1);
            buckets[b].push([p.longitude, p.latitude]);
        }

        Plot::new("sales_map")
            .height(height)
            .data_aspect(1.0)
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for (b, coords) in buckets.into_iter().enumerate() {
                    if coords.is_empty() {
                        continue;
                    }
                    let t = (b as f32 + 0.5) / MAP_BUCKETS as f32;
                    plot_ui.points(
                        Points::new(coords)
                            .radius(ramp_radius(t))
                            .color(ramp_color(t).gamma_multiply(0.8))
                            .name(format!("{AMOUNT_LABEL} tier {}", b + 1)),
                    );
                }

                if let Some(pointer) = plot_ui.pointer_coordinate() {
                    let bounds = plot_ui.plot_bounds();
                    let span = [bounds.width(), bounds.height()];
                    if let Some(p) = nearest_point(points, pointer, span, 0.02) {
                        let city = p.city.as_deref().unwrap_or("Unknown city");
                        plot_ui.text(
                            Text::new(
                                PlotPoint::new(p.longitude, p.latitude),
                                RichText::new(format!("{city}\n{}", format_amount(p.amount)))
                                    .strong(),
                            )
                            .anchor(Align2::LEFT_BOTTOM),
                        );
                    }
                }
            });
    });
}
