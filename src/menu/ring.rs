//! Ring menu state machine.
//!
//! Commands sit evenly around an ellipse. The host calls [`RingMenu::update`]
//! once per frame: while an animation is running each call advances it by one
//! frame, otherwise the selection settles and input is processed. Committing
//! (confirm or cancel) deactivates the menu, starts the closing animation and
//! fires exactly one handler.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use log::{debug, trace};

use super::button::{sort_by_depth, RingButton, RingGeometry};
use super::command::{Command, CommandList, Icon, CANCEL, OK};
use super::services::{AudioService, Cue, GameData, InputAction, InputService, Point};
use super::source::CommandSource;

pub const DEFAULT_ANIMATION_FRAMES: u32 = 30;
pub const FULL_OPACITY: f64 = 255.0;

pub type Handler = Box<dyn FnMut()>;

/// Construction options for a ring menu.
#[derive(Debug, Clone)]
pub struct RingMenuOptions {
    pub commands: Vec<Command>,
    pub icons: HashMap<String, Icon>,
    /// Full-size radii (horizontal, vertical).
    pub radius: Point,
    pub index: usize,
    /// Radians.
    pub starting_angle: f64,
    /// `-1.0` or `1.0`; zero falls back to `-1.0`.
    pub rotation: f64,
    pub centre: Point,
    /// Perspective coefficient. Zero disables scaling.
    pub scale: f64,
    pub default_time: u32,
    pub show_actor_sprite: bool,
    pub cancel_text: String,
}

impl Default for RingMenuOptions {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            icons: HashMap::new(),
            radius: Point::new(128.0, 48.0),
            index: 0,
            starting_angle: 0.0,
            rotation: -1.0,
            centre: Point::ZERO,
            scale: 0.0,
            default_time: DEFAULT_ANIMATION_FRAMES,
            show_actor_sprite: false,
            cancel_text: "Cancel".into(),
        }
    }
}

/// Normalises an index that may have run past either end of the ring.
pub fn wrap_index(index: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as i64;
    (((index % len) + len) % len) as usize
}

/// Extra rotation applied while opening or closing over `time` frames.
fn spin(time: u32) -> f64 {
    PI * time as f64 / 60.0
}

pub struct RingMenu {
    commands: CommandList,
    icons: HashMap<String, Icon>,
    disabled: HashSet<String>,
    handlers: HashMap<String, Handler>,
    buttons: Vec<RingButton>,
    source: Box<dyn CommandSource>,
    audio: Box<dyn AudioService>,
    /// Offsets of the containers between the canvas and this menu.
    layer: Vec<Point>,

    centre: Point,
    max_radius: Point,
    starting_angle: f64,
    rotation: f64,
    scale: f64,
    default_time: u32,
    show_actor_sprite: bool,
    cancel_text: String,

    index: usize,
    target_index: i64,
    angle: f64,
    target_angle: f64,
    radius: Point,
    target_radius: Point,
    opacity: f64,
    target_opacity: f64,
    animation_frames: u32,
    active: bool,
}

impl RingMenu {
    pub fn new(
        options: RingMenuOptions,
        source: Box<dyn CommandSource>,
        audio: Box<dyn AudioService>,
    ) -> Self {
        let rotation = if options.rotation > 0.0 { 1.0 } else { -1.0 };
        // Same angle an empty ring settles on; the first command re-aims it.
        let angle = options.starting_angle;
        let mut menu = Self {
            commands: CommandList::new(),
            icons: options.icons,
            disabled: HashSet::new(),
            handlers: HashMap::new(),
            buttons: Vec::new(),
            source,
            audio,
            layer: Vec::new(),
            centre: options.centre,
            max_radius: options.radius,
            starting_angle: options.starting_angle,
            rotation,
            scale: options.scale,
            default_time: options.default_time,
            show_actor_sprite: options.show_actor_sprite,
            cancel_text: options.cancel_text,
            index: options.index,
            target_index: options.index as i64,
            angle,
            target_angle: angle,
            radius: options.radius,
            target_radius: options.radius,
            opacity: FULL_OPACITY,
            target_opacity: FULL_OPACITY,
            animation_frames: 0,
            active: true,
        };
        for command in options.commands {
            menu.push_command(command);
        }
        menu
    }

    /// Rebuilds the command list from the menu's source.
    pub fn refresh(&mut self, game: &dyn GameData) {
        self.clear_commands();
        for command in self.source.populate(game) {
            let enabled = self.source.is_enabled(&command, game);
            let icon = self.source.resolve_icon(&command, game);
            self.push_command(Command {
                enabled,
                icon,
                ..command
            });
        }
        if self.source.includes_cancel() {
            self.add_cancel_command();
        }
        if let Some(symbol) = self.source.initial_symbol(game) {
            self.select_symbol(&symbol);
        }
        debug!("ring refreshed with {} commands", self.commands.len());
    }

    /// Moves the ring. Used when centre and radius formulas are re-evaluated
    /// before opening.
    pub fn place(&mut self, centre: Point, max_radius: Point) {
        self.centre = centre;
        self.max_radius = max_radius;
        self.layout_buttons();
    }

    pub fn set_layer(&mut self, ancestors: Vec<Point>) {
        self.layer = ancestors;
    }

    // Commands

    pub fn add_command(
        &mut self,
        text: impl Into<String>,
        id: impl Into<String>,
        enabled: bool,
        icon: Option<Icon>,
    ) {
        let mut command = Command::new(id, text).enabled(enabled);
        command.icon = icon;
        self.push_command(command);
    }

    /// Appends `command`, or replaces the command with the same identifier.
    pub fn push_command(&mut self, mut command: Command) {
        if let Some(icon) = command.icon.clone() {
            self.icons.insert(command.id.clone(), icon);
        } else {
            command.icon = self.icons.get(&command.id).cloned();
        }
        if command.enabled {
            self.disabled.remove(&command.id);
        } else {
            self.disabled.insert(command.id.clone());
        }

        let id = command.id.clone();
        let replaced = self.commands.insert(command);
        self.angle = self.angle_for_index(self.index as i64);
        if replaced {
            self.rebuild_buttons();
        } else if let Some(command) = self.commands.get(&id) {
            let style = self.source.button_style(command);
            self.buttons.push(RingButton::new(id, self.centre, style));
            self.layout_buttons();
            self.sort_buttons();
        }
    }

    pub fn add_cancel_command(&mut self) {
        let text = self.cancel_text.clone();
        self.add_command(text, CANCEL, true, None);
    }

    pub fn disable_command(&mut self, id: &str) {
        self.disabled.insert(id.to_string());
    }

    pub fn enable_command(&mut self, id: &str) {
        self.disabled.remove(id);
    }

    pub fn delete_command(&mut self, id: &str) {
        if self.commands.remove(id).is_none() {
            debug!("delete of unknown command `{}` ignored", id);
            return;
        }
        self.disabled.remove(id);
        self.rebuild_buttons();
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
        self.disabled.clear();
        self.buttons.clear();
        self.index = 0;
        self.target_index = 0;
    }

    pub fn set_handler(&mut self, name: impl Into<String>, handler: impl FnMut() + 'static) {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    fn rebuild_buttons(&mut self) {
        self.buttons = self
            .commands
            .iter()
            .map(|command| {
                RingButton::new(
                    command.id.clone(),
                    self.centre,
                    self.source.button_style(command),
                )
            })
            .collect();
        self.layout_buttons();
        self.sort_buttons();
    }

    fn layout_buttons(&mut self) {
        let geometry = self.geometry();
        let Self {
            buttons,
            commands,
            disabled,
            icons,
            ..
        } = self;
        for button in buttons.iter_mut() {
            let Some(index) = commands.index_of(button.id()) else {
                continue;
            };
            let enabled = !disabled.contains(button.id());
            let icon = icons.get(button.id());
            button.refresh_icon(icon);
            button.update_position(&geometry, geometry.angle_for_index(index as i64), enabled);
        }
    }

    fn sort_buttons(&mut self) {
        sort_by_depth(&mut self.buttons, |button| Some(button.y));
    }

    // Queries

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &CommandList {
        &self.commands
    }

    /// Buttons in draw order, back to front.
    pub fn buttons(&self) -> &[RingButton] {
        &self.buttons
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn target_index(&self) -> i64 {
        self.target_index
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.commands.index_of(id)
    }

    pub fn icon_of(&self, id: &str) -> Option<&Icon> {
        self.icons.get(id)
    }

    pub fn current_symbol(&self) -> Option<&str> {
        self.current_command().map(|command| command.id.as_str())
    }

    pub fn current_command(&self) -> Option<&Command> {
        self.commands.get_index(self.index)
    }

    /// Help text of the current command, for a bound help window.
    pub fn help_text(&self) -> Option<&str> {
        self.current_command()
            .and_then(|command| command.help.as_deref())
    }

    pub fn geometry(&self) -> RingGeometry {
        RingGeometry {
            centre: self.centre,
            radius: self.radius,
            max_radius: self.max_radius,
            angle: self.angle,
            starting_angle: self.starting_angle,
            rotation: self.rotation,
            scale: self.scale,
            opacity: self.opacity,
            index: self.index,
            len: self.commands.len(),
        }
    }

    pub fn angle_for_index(&self, index: i64) -> f64 {
        self.geometry().angle_for_index(index)
    }

    pub fn angle_for(&self, id: &str) -> Option<f64> {
        self.index_of(id)
            .map(|index| self.angle_for_index(index as i64))
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn target_angle(&self) -> f64 {
        self.target_angle
    }

    pub fn radius(&self) -> Point {
        self.radius
    }

    pub fn target_radius(&self) -> Point {
        self.target_radius
    }

    pub fn max_radius(&self) -> Point {
        self.max_radius
    }

    pub fn centre(&self) -> Point {
        self.centre
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn target_opacity(&self) -> f64 {
        self.target_opacity
    }

    pub fn animation_frames(&self) -> u32 {
        self.animation_frames
    }

    pub fn default_time(&self) -> u32 {
        self.default_time
    }

    pub fn shows_actor_sprite(&self) -> bool {
        self.show_actor_sprite
    }

    pub fn is_open(&self) -> bool {
        self.radius == self.target_radius
    }

    pub fn is_animating(&self) -> bool {
        self.animation_frames > 0
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0 && (self.radius.x != 0.0 || self.radius.y != 0.0)
    }

    pub fn is_handled(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn can_process_input(&self) -> bool {
        self.is_open() && self.is_active() && !self.is_animating()
    }

    pub fn is_item_enabled(&self, id: &str) -> bool {
        self.commands.contains(id) && !self.disabled.contains(id)
    }

    pub fn is_current_item_enabled(&self) -> bool {
        self.current_symbol()
            .is_some_and(|symbol| self.is_item_enabled(symbol))
    }

    // Selection

    /// Jumps to `index` without animating. Negative indices are ignored.
    pub fn select(&mut self, index: i64) {
        if index < 0 {
            debug!("selection of index {} ignored", index);
            return;
        }
        self.index = index as usize;
        self.target_index = index;
        self.angle = self.angle_for_index(index);
        self.target_angle = self.angle;
        self.layout_buttons();
    }

    pub fn select_symbol(&mut self, id: &str) {
        match self.index_of(id) {
            Some(index) => self.select(index as i64),
            None => debug!("selection of unknown command `{}` ignored", id),
        }
    }

    pub fn turn_left(&mut self, time: Option<u32>) {
        self.turn_by(-1, time);
    }

    pub fn turn_right(&mut self, time: Option<u32>) {
        self.turn_by(1, time);
    }

    fn turn_by(&mut self, step: i64, time: Option<u32>) {
        if self.commands.is_empty() {
            debug!("turn on an empty ring ignored");
            return;
        }
        let time = time.unwrap_or(self.default_time);
        let target = self.index as i64 + step;
        self.audio.play(Cue::Cursor);
        self.target_angle = self.angle_for_index(target);
        self.target_index = target;
        debug!("ring turning from {} to {} over {} frames", self.index, target, time);
        self.start_rotation(time);
    }

    /// Animates the selection to `id`. Neighbours across the wrap boundary
    /// take a single step; any other jump rotates through every position in
    /// between, taking `default_time` frames per step.
    pub fn turn_to(&mut self, id: &str, time: Option<u32>) {
        let Some(new_index) = self.index_of(id) else {
            debug!("turn to unknown command `{}` ignored", id);
            return;
        };
        let len = self.len() as i64;
        let current = self.index as i64;
        let n = current - new_index as i64;
        let wraps = n != 0 && (n == len - 1 || n == -(len - 1));

        self.target_angle = if !wraps {
            self.angle_for_index(new_index as i64)
        } else if n > 0 {
            self.angle_for_index(current + 1)
        } else {
            self.angle_for_index(current - 1)
        };
        let time = time.unwrap_or_else(|| {
            if wraps {
                self.default_time
            } else {
                self.default_time
                    .saturating_mul(u32::try_from(n.unsigned_abs()).unwrap_or(u32::MAX))
            }
        });
        self.audio.play(Cue::Cursor);
        self.target_index = new_index as i64;
        debug!("ring turning to `{}` over {} frames", id, time);
        self.start_rotation(time);
    }

    fn start_rotation(&mut self, time: u32) {
        self.animation_frames = time;
        if time == 0 {
            self.angle = self.target_angle;
            self.refresh_values();
        }
    }

    // Open and close

    pub fn open(&mut self, time: Option<u32>) {
        let time = time.unwrap_or(self.default_time);
        self.target_radius = self.max_radius;
        self.target_opacity = FULL_OPACITY;
        self.target_angle = self.angle_for_index(self.index as i64);
        self.angle = self.target_angle + spin(time);
        self.animation_frames = time;
        if time == 0 {
            self.opacity = self.target_opacity;
            self.radius = self.target_radius;
            self.angle = self.target_angle;
        }
    }

    pub fn close(&mut self, time: Option<u32>) {
        let time = time.unwrap_or(self.default_time);
        self.target_radius = Point::ZERO;
        self.target_opacity = 0.0;
        self.animation_frames = time;
        if time == 0 {
            self.radius = self.target_radius;
            self.opacity = self.target_opacity;
            self.target_angle = self.angle;
            return;
        }
        self.target_angle = self.angle + spin(time);
    }

    /// Grows past full size while fading out, as if the ring flew past the
    /// camera. Used when handing over to a sibling menu.
    pub fn inverse_close(&mut self, time: Option<u32>) {
        let time = time.unwrap_or(self.default_time);
        self.target_radius = self.max_radius.scaled(2.0);
        self.target_opacity = 0.0;
        self.animation_frames = time;
        if time == 0 {
            self.radius = self.target_radius;
            self.opacity = self.target_opacity;
            self.target_angle = self.angle;
            return;
        }
        self.target_angle = self.angle;
        self.angle -= spin(time);
    }

    pub fn activate(&mut self) {
        self.active = true;
        self.open(None);
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.close(None);
    }

    pub fn deselect(&mut self) {
        self.close(None);
    }

    // Frame update

    pub fn update(&mut self, input: &mut dyn InputService) {
        let was_animating = self.is_animating();
        if was_animating {
            self.update_animation();
        } else {
            self.refresh_values();
            self.update_input(input);
        }
        self.layout_buttons();
        if was_animating || self.is_animating() {
            self.sort_buttons();
        }
    }

    /// One step of a converging weighted average towards every target.
    fn update_animation(&mut self) {
        let t = self.animation_frames as f64;
        self.animation_frames -= 1;
        let t2 = self.animation_frames as f64;
        let step = |current: f64, target: f64| (current * t2 + target) / t;

        self.opacity = step(self.opacity, self.target_opacity).clamp(0.0, FULL_OPACITY);
        self.angle = step(self.angle, self.target_angle);
        self.radius = Point::new(
            step(self.radius.x, self.target_radius.x),
            step(self.radius.y, self.target_radius.y),
        );
        trace!(
            "ring frame {}: angle {:.3} radius ({:.1}, {:.1}) opacity {:.0}",
            self.animation_frames,
            self.angle,
            self.radius.x,
            self.radius.y,
            self.opacity
        );
    }

    fn refresh_values(&mut self) {
        if self.commands.is_empty() {
            self.index = 0;
            self.target_index = 0;
            self.angle = self.starting_angle;
            self.target_angle = self.angle;
            return;
        }
        self.index = wrap_index(self.target_index, self.commands.len());
        self.target_index = self.index as i64;
        self.angle = self.angle_for_index(self.index as i64);
        self.target_angle = self.angle;
    }

    fn update_input(&mut self, input: &mut dyn InputService) {
        if !self.can_process_input() {
            return;
        }
        if input.is_repeated(InputAction::Ok) {
            self.process_ok(input);
        } else if input.is_repeated(InputAction::Cancel) || input.is_touch_cancelled() {
            self.process_cancel(input);
        } else if input.is_pressed(InputAction::Left) {
            self.turn_left(None);
        } else if input.is_pressed(InputAction::Right) {
            self.turn_right(None);
        } else if input.is_pointer_triggered() {
            self.process_touch(input);
        }
    }

    fn process_touch(&mut self, input: &mut dyn InputService) {
        let pointer = input.pointer();
        let touched = self
            .buttons
            .iter()
            .rev()
            .find(|button| button.is_touched(pointer, &self.layer))
            .map(|button| button.id().to_string());
        if let Some(id) = touched {
            self.click(&id, input);
        }
    }

    /// A button was clicked: commit when it is already selected, otherwise
    /// rotate to it.
    pub fn click(&mut self, id: &str, input: &mut dyn InputService) {
        if self.current_symbol() == Some(id) {
            self.process_ok(input);
        } else {
            self.turn_to(id, None);
        }
    }

    pub fn process_ok(&mut self, input: &mut dyn InputService) {
        if !self.is_current_item_enabled() {
            self.audio.play(Cue::Buzzer);
            return;
        }
        self.audio.play(Cue::Ok);
        input.consume();
        self.deactivate();
        self.call_ok_handler();
    }

    pub fn process_cancel(&mut self, input: &mut dyn InputService) {
        self.audio.play(Cue::Cancel);
        input.consume();
        self.deactivate();
        self.call_cancel_handler();
    }

    /// Calls the handler of the current command, or the generic `ok` handler.
    pub fn call_ok_handler(&mut self) {
        let name = match self.current_symbol() {
            Some(symbol) if self.is_handled(symbol) => symbol.to_string(),
            _ => OK.to_string(),
        };
        self.call_handler(&name);
    }

    pub fn call_cancel_handler(&mut self) {
        self.call_handler(CANCEL);
    }

    pub fn call_handler(&mut self, name: &str) {
        match self.handlers.get_mut(name) {
            Some(handler) => {
                debug!("ring commit `{}`", name);
                handler();
            }
            None => debug!("no handler for `{}`", name),
        }
    }
}
