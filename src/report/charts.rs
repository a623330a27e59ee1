//! Text charts. Every renderer returns the rows of a chart without trailing newlines and returns
//! no rows at all for an empty series, so callers can drop the whole section.
//!
//! Row width depends only on the data, nothing here looks at the terminal.

use chrono::NaiveDate;

use crate::utils::percentage::Percentage;

use super::normalize::NormalizedLogEntry;

/// Glyphs from the lowest to the highest value.
pub const SPARKLINE_GLYPHS: [char; 9] = ['_', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Trend charts show at most this many of the most recent rated days.
pub const TREND_WINDOW: usize = 30;

pub const HEATMAP_WINDOW: usize = 7;

const HEATMAP_MAX_BAR: u32 = 20;

/// Closed range of valid values for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    pub min: u8,
    pub max: u8,
}

impl Domain {
    pub const DAY_RATING: Domain = Domain { min: 1, max: 10 };
    pub const FIVE_POINT: Domain = Domain { min: 1, max: 5 };

    pub fn contains(&self, value: u8) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Labels are right aligned to the width of the widest bound.
    fn label_width(&self) -> usize {
        self.max.to_string().len().max(self.min.to_string().len())
    }

    fn label(&self, value: u8) -> String {
        format!("{value:>width$}", width = self.label_width())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: u32,
}

/// Values of one metric in chronological order together with the range they live in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSeries {
    pub domain: Domain,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn values(&self) -> Vec<u32> {
        self.points.iter().map(|v| v.value).collect()
    }
}

/// The most recent rated entries, oldest first. Built from entries in any order.
pub struct ChartWindow<'a> {
    entries: Vec<&'a NormalizedLogEntry>,
}

impl<'a> ChartWindow<'a> {
    pub fn new(entries: &'a [NormalizedLogEntry], size: usize) -> Self {
        let mut rated = entries
            .iter()
            .filter(|v| v.is_rating_complete())
            .collect::<Vec<_>>();
        rated.sort_by(|a, b| b.date.cmp(&a.date));
        rated.truncate(size);
        rated.reverse();
        Self { entries: rated }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn day_ratings(&self) -> ChartSeries {
        self.series(Domain::DAY_RATING, |v| v.day_rating())
    }

    pub fn productivity(&self) -> ChartSeries {
        self.series(Domain::FIVE_POINT, |v| v.productivity())
    }

    /// Completed task counts of the last [HEATMAP_WINDOW] entries of the window.
    pub fn recent_tasks(&self) -> Vec<ChartPoint> {
        let skip = self.entries.len().saturating_sub(HEATMAP_WINDOW);
        self.entries
            .iter()
            .skip(skip)
            .map(|v| ChartPoint {
                date: v.date,
                value: v.tasks_completed(),
            })
            .collect()
    }

    fn series(
        &self,
        domain: Domain,
        value: impl Fn(&NormalizedLogEntry) -> Option<u8>,
    ) -> ChartSeries {
        ChartSeries {
            domain,
            points: self
                .entries
                .iter()
                .filter_map(|entry| {
                    value(*entry).map(|v| ChartPoint {
                        date: entry.date,
                        value: v as u32,
                    })
                })
                .collect(),
        }
    }
}

/// One glyph per value. The glyph is picked by flooring `value / max` onto the ramp, `max` itself
/// gets the top glyph.
pub fn sparkline(values: &[u32], max: u32) -> String {
    let top = SPARKLINE_GLYPHS.len() - 1;
    values
        .iter()
        .map(|&value| {
            let index = if max == 0 {
                0
            } else {
                (value as usize * top / max as usize).min(top)
            };
            SPARKLINE_GLYPHS[index]
        })
        .collect()
}

/// Sparkline framed by the domain bounds and a time axis:
///
/// ```text
/// 10 ┤▅▆█▃
///  1 ┤────
///    └────→ time
/// ```
pub fn trend_rows(series: &ChartSeries) -> Vec<String> {
    if series.points.is_empty() {
        return vec![];
    }
    let domain = series.domain;
    let axis = "─".repeat(series.points.len());
    vec![
        format!(
            "{} ┤{}",
            domain.label(domain.max),
            sparkline(&series.values(), domain.max as u32)
        ),
        format!("{} ┤{axis}", domain.label(domain.min)),
        format!("{} └{axis}→ time", " ".repeat(domain.label_width())),
    ]
}

/// A row per point: `MM/DD ┤███░░ 3/5`.
pub fn bar_rows(series: &ChartSeries) -> Vec<String> {
    let max = series.domain.max as u32;
    series
        .points
        .iter()
        .map(|point| {
            let filled = point.value.min(max);
            format!(
                "{} ┤{}{} {}/{max}",
                point.date.format("%m/%d"),
                "█".repeat(filled as usize),
                "░".repeat((max - filled) as usize),
                point.value,
            )
        })
        .collect()
}

/// How a distribution chart labels and scales its buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributionStyle {
    pub domain: Domain,
    /// Length of a bar for a bucket holding every value.
    pub scale: u32,
    pub label_suffix: &'static str,
    pub unit: &'static str,
    pub omit_empty: bool,
}

impl DistributionStyle {
    pub const SLEEP: DistributionStyle = DistributionStyle {
        domain: Domain::FIVE_POINT,
        scale: 20,
        label_suffix: " ⭐",
        unit: "nights",
        omit_empty: false,
    };

    pub const DAY_RATING: DistributionStyle = DistributionStyle {
        domain: Domain::DAY_RATING,
        scale: 30,
        label_suffix: "",
        unit: "days",
        omit_empty: true,
    };
}

/// Counts values per bucket and renders buckets from the highest to the lowest one. Values
/// outside of the domain are ignored.
pub fn distribution_rows(values: &[u8], style: &DistributionStyle) -> Vec<String> {
    let domain = style.domain;
    let mut counts = vec![0usize; domain.max as usize + 1];
    let mut total = 0usize;
    for value in values.iter().filter(|v| domain.contains(**v)) {
        counts[*value as usize] += 1;
        total += 1;
    }

    (domain.min..=domain.max)
        .rev()
        .filter_map(|bucket| {
            let count = counts[bucket as usize];
            if count == 0 && style.omit_empty {
                return None;
            }
            let percentage = Percentage::of(count, total)?;
            Some(format!(
                "{}{} ┤{} {count} {} ({percentage})",
                domain.label(bucket),
                style.label_suffix,
                "█".repeat(bar_length(count, total, style.scale)),
                style.unit,
            ))
        })
        .collect()
}

/// `round(count / total * scale)`
fn bar_length(count: usize, total: usize, scale: u32) -> usize {
    (count as f64 / total as f64 * scale as f64).round() as usize
}

/// A row per day with a bar as long as the count, capped at 20 characters:
/// `Mon 01/08 ┤▓▓▓ 3 tasks`.
pub fn heatmap_rows(points: &[ChartPoint]) -> Vec<String> {
    let skip = points.len().saturating_sub(HEATMAP_WINDOW);
    points
        .iter()
        .skip(skip)
        .map(|point| {
            format!(
                "{} ┤{} {} tasks",
                point.date.format("%a %m/%d"),
                "▓".repeat(point.value.min(HEATMAP_MAX_BAR) as usize),
                point.value,
            )
        })
        .collect()
}
