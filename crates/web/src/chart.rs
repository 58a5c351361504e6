//! Server-side view models for result plots
//!
//! Raw plot points scale into a fixed SVG viewport here so the templates
//! only emit shapes.

use ml_workbench_core::backend::{ClusterPlot, ConfusionCells, ConfusionMatrix, ScatterPoint};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 320;
const PAD: u32 = 40;

/// Series palette from darkest to lightest; ids past the palette share the
/// final gray.
const CLUSTER_COLORS: [&str; 5] = ["#8884d8", "#82ca9d", "#ffc658", "#ff7300", "#0088FE"];
const OVERFLOW_COLOR: &str = "#AAAAAA";

pub struct SvgPoint {
    pub cx: f64,
    pub cy: f64,
}

pub struct ScatterView {
    pub width: u32,
    pub height: u32,
    pub pad: u32,
    pub base_y: u32,
    pub right_x: u32,
    pub mid_x: u32,
    pub mid_y: u32,
    pub label_y: u32,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<SvgPoint>,
}

impl ScatterView {
    pub fn build(points: &[ScatterPoint]) -> Self {
        let (x_min, x_max) = bounds(points.iter().map(|p| p.actual));
        let (y_min, y_max) = bounds(points.iter().map(|p| p.predicted));

        let points = points
            .iter()
            .map(|p| SvgPoint {
                cx: scale_x(p.actual, x_min, x_max),
                cy: scale_y(p.predicted, y_min, y_max),
            })
            .collect();

        Self {
            width: WIDTH,
            height: HEIGHT,
            pad: PAD,
            base_y: HEIGHT - PAD,
            right_x: WIDTH - PAD,
            mid_x: WIDTH / 2,
            mid_y: HEIGHT / 2,
            label_y: HEIGHT - 8,
            x_label: "True Value".to_string(),
            y_label: "Predicted Value".to_string(),
            points,
        }
    }
}

pub struct ClusterSeriesView {
    pub name: String,
    pub color: &'static str,
    pub points: Vec<SvgPoint>,
}

pub struct ClusterView {
    pub width: u32,
    pub height: u32,
    pub pad: u32,
    pub base_y: u32,
    pub right_x: u32,
    pub mid_x: u32,
    pub mid_y: u32,
    pub label_y: u32,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ClusterSeriesView>,
}

impl ClusterView {
    pub fn build(plot: &ClusterPlot) -> Self {
        let (x_min, x_max) = bounds(plot.points.iter().map(|p| p.x));
        let (y_min, y_max) = bounds(plot.points.iter().map(|p| p.y));

        let series = plot
            .series()
            .into_iter()
            .map(|s| ClusterSeriesView {
                name: format!("Cluster {}", s.id),
                color: color_for(s.id),
                points: s
                    .points
                    .iter()
                    .map(|p| SvgPoint {
                        cx: scale_x(p.x, x_min, x_max),
                        cy: scale_y(p.y, y_min, y_max),
                    })
                    .collect(),
            })
            .collect();

        Self {
            width: WIDTH,
            height: HEIGHT,
            pad: PAD,
            base_y: HEIGHT - PAD,
            right_x: WIDTH - PAD,
            mid_x: WIDTH / 2,
            mid_y: HEIGHT / 2,
            label_y: HEIGHT - 8,
            x_label: plot.labels[0].clone(),
            y_label: plot.labels[1].clone(),
            series,
        }
    }
}

pub struct ConfusionView {
    pub cells: Option<ConfusionCells>,
    pub grid: Option<Vec<Vec<i64>>>,
}

impl ConfusionView {
    pub fn build(matrix: &ConfusionMatrix) -> Self {
        match matrix {
            ConfusionMatrix::Binary(cells) => Self {
                cells: Some(cells.clone()),
                grid: None,
            },
            ConfusionMatrix::Grid(grid) => Self {
                cells: None,
                grid: Some(grid.clone()),
            },
        }
    }
}

fn color_for(id: i64) -> &'static str {
    match usize::try_from(id) {
        Ok(i) if i < CLUSTER_COLORS.len() => CLUSTER_COLORS[i],
        _ => OVERFLOW_COLOR,
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }

    if min > max {
        // No points at all.
        (0.0, 1.0)
    } else if (max - min).abs() < f64::EPSILON {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    }
}

fn scale_x(v: f64, min: f64, max: f64) -> f64 {
    let span = (WIDTH - 2 * PAD) as f64;
    round1(PAD as f64 + (v - min) / (max - min) * span)
}

fn scale_y(v: f64, min: f64, max: f64) -> f64 {
    let span = (HEIGHT - 2 * PAD) as f64;
    round1((HEIGHT - PAD) as f64 - (v - min) / (max - min) * span)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use ml_workbench_core::backend::ClusterPoint;

    #[test]
    fn test_scatter_points_stay_in_viewport() {
        let points = vec![
            ScatterPoint { actual: 1.0, predicted: 1.1 },
            ScatterPoint { actual: 5.0, predicted: 4.2 },
            ScatterPoint { actual: -2.0, predicted: -1.7 },
        ];
        let view = ScatterView::build(&points);

        assert_eq!(view.points.len(), 3);
        for p in &view.points {
            assert!(p.cx >= PAD as f64 && p.cx <= (WIDTH - PAD) as f64);
            assert!(p.cy >= PAD as f64 && p.cy <= (HEIGHT - PAD) as f64);
        }
    }

    #[test]
    fn test_single_point_centers() {
        let view = ScatterView::build(&[ScatterPoint { actual: 3.0, predicted: 3.0 }]);
        assert_eq!(view.points.len(), 1);
        assert_eq!(view.points[0].cx, (WIDTH / 2) as f64);
        assert_eq!(view.points[0].cy, (HEIGHT / 2) as f64);
    }

    #[test]
    fn test_cluster_view_one_series_per_id() {
        let plot = ClusterPlot {
            points: vec![
                ClusterPoint { x: 0.0, y: 0.0, cluster: 0 },
                ClusterPoint { x: 1.0, y: 1.0, cluster: 1 },
                ClusterPoint { x: 2.0, y: 2.0, cluster: 2 },
                ClusterPoint { x: 3.0, y: 3.0, cluster: 1 },
            ],
            labels: ["PCA Component 1".to_string(), "PCA Component 2".to_string()],
        };
        let view = ClusterView::build(&plot);

        assert_eq!(view.series.len(), 3);
        assert_eq!(view.series[0].name, "Cluster 0");
        assert_eq!(view.series[1].points.len(), 2);
        assert_eq!(view.x_label, "PCA Component 1");

        let colors: Vec<_> = view.series.iter().map(|s| s.color).collect();
        assert_eq!(colors, vec!["#8884d8", "#82ca9d", "#ffc658"]);
    }

    #[test]
    fn test_color_overflow_is_gray() {
        assert_eq!(color_for(4), "#0088FE");
        assert_eq!(color_for(5), OVERFLOW_COLOR);
        assert_eq!(color_for(-1), OVERFLOW_COLOR);
    }
}
