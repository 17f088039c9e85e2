//! Per-command visual proxy placed on the ring, plus depth ordering.

use std::cmp::Ordering;

use unicode_width::UnicodeWidthStr;

use super::command::Icon;
use super::services::Point;

/// Snapshot of the ring state a button needs to place itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingGeometry {
    pub centre: Point,
    pub radius: Point,
    pub max_radius: Point,
    pub angle: f64,
    pub starting_angle: f64,
    pub rotation: f64,
    pub scale: f64,
    pub opacity: f64,
    pub index: usize,
    pub len: usize,
}

impl RingGeometry {
    /// Settled angle of the command at `index`, relative to the current
    /// selection. An empty ring stays at the starting angle.
    pub fn angle_for_index(&self, index: i64) -> f64 {
        if self.len == 0 {
            return self.starting_angle;
        }
        (index - self.index as i64) as f64 * std::f64::consts::TAU / self.len as f64
            - self.starting_angle
    }
}

/// Size and anchor of a button, in screen units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonStyle {
    pub anchor: Point,
    pub width: f64,
    pub height: f64,
}

impl ButtonStyle {
    /// One-row label: icon glyph, a space, then the text.
    pub fn label(text: &str) -> Self {
        Self {
            anchor: Point::new(0.5, 0.5),
            width: (text.width() + 2) as f64,
            height: 1.0,
        }
    }

    /// Character sprite standing on its anchor, name underneath.
    pub fn sprite(text: &str) -> Self {
        Self {
            anchor: Point::new(0.5, 1.0),
            width: text.width().max(1) as f64,
            height: 2.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RingButton {
    id: String,
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub opacity: f64,
    pub style: ButtonStyle,
    icon: Option<Icon>,
    icon_dirty: bool,
}

impl RingButton {
    pub fn new(id: impl Into<String>, centre: Point, style: ButtonStyle) -> Self {
        Self {
            id: id.into(),
            x: centre.x,
            y: centre.y,
            scale: 1.0,
            opacity: 0.0,
            style,
            icon: None,
            icon_dirty: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn icon(&self) -> Option<&Icon> {
        self.icon.as_ref()
    }

    /// Whether the icon changed since the renderer last called
    /// [`RingButton::take_icon_change`].
    pub fn take_icon_change(&mut self) -> bool {
        std::mem::take(&mut self.icon_dirty)
    }

    pub fn refresh_icon(&mut self, icon: Option<&Icon>) {
        if self.icon.as_ref() == icon {
            return;
        }
        self.icon = icon.cloned();
        self.icon_dirty = true;
    }

    /// Places the button for a command whose settled angle is `item_angle`.
    pub fn update_position(&mut self, ring: &RingGeometry, item_angle: f64, enabled: bool) {
        let angle = item_angle - ring.angle + ring.starting_angle;
        self.x = ring.centre.x + ring.radius.x * angle.cos();
        self.y = ring.centre.y + ring.radius.y * angle.sin() * ring.rotation;
        self.scale = if ring.max_radius.y != 0.0 {
            1.0 + (self.y - ring.centre.y) * ring.scale / ring.max_radius.y
        } else {
            1.0
        };
        self.opacity = ring.opacity * if enabled { 1.0 } else { 0.5 };
    }

    /// Hit box size. Perspective scales the width only: a row of text keeps
    /// its height however far back the button sits.
    pub fn scaled_size(&self) -> (f64, f64) {
        (self.style.width * self.scale.abs(), self.style.height)
    }

    /// Converts a canvas point into button-local space. `ancestors` holds the
    /// offsets of every container between the canvas and the button.
    pub fn canvas_to_local(&self, point: Point, ancestors: &[Point]) -> Point {
        let mut x = point.x - self.x;
        let mut y = point.y - self.y;
        for offset in ancestors {
            x -= offset.x;
            y -= offset.y;
        }
        let (width, height) = self.scaled_size();
        Point::new(
            x + self.style.anchor.x * width,
            y + self.style.anchor.y * height,
        )
    }

    pub fn is_touched(&self, point: Point, ancestors: &[Point]) -> bool {
        let local = self.canvas_to_local(point, ancestors);
        let (width, height) = self.scaled_size();
        local.x >= 0.0 && local.y >= 0.0 && local.x < width && local.y < height
    }
}

/// Depth comparator: lower on screen draws later. Missing or NaN depths
/// compare equal to everything.
pub fn depth_order(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if !a.is_nan() && !b.is_nan() => {
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        _ => Ordering::Equal,
    }
}

/// Stable depth sort. Entries without a usable depth keep their slot; the
/// rest are sorted ascending through the remaining slots.
pub fn sort_by_depth<T>(items: &mut Vec<T>, depth: impl Fn(&T) -> Option<f64>) {
    let slots: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|&(_, item)| depth(item).is_some_and(|y| !y.is_nan()))
        .map(|(index, _)| index)
        .collect();
    if slots.len() < 2 {
        return;
    }

    let mut order = slots.clone();
    order.sort_by(|&a, &b| depth_order(depth(&items[a]), depth(&items[b])));
    if order == slots {
        return;
    }

    let mut mapping: Vec<usize> = (0..items.len()).collect();
    for (slot, source) in slots.iter().zip(&order) {
        mapping[*slot] = *source;
    }
    let mut taken: Vec<Option<T>> = std::mem::take(items).into_iter().map(Some).collect();
    items.extend(mapping.into_iter().filter_map(|source| taken[source].take()));
}
