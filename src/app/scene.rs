//! The menu scene: a main ring, a party ring and an item or skill ring.
//!
//! Ring handlers only send a [`SceneAction`] down a channel. The scene waits
//! until the ring that sent it has finished animating before acting, so a
//! closing ring is never cut short by the next one opening.

use log::{debug, info, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::config::{Config, ConfigError, RingConfig, RingsConfig};
use super::game::DemoGame;
use super::state::CueChannel;
use crate::menu::{
    Command, CommandSource, FormulaContext, GameData, InputService, ItemCommands,
    MainMenuCommands, PartyCommands, Payload, Point, RingMenu, SkillCommands, CANCEL,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneAction {
    /// A main menu command was committed.
    Command(String),
    Exit,
    PartyPicked(usize),
    PartyCancelled,
    ItemPicked(u32),
    SkillPicked(u32),
    SubCancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    Main,
    Party,
    Item,
    Skill { actor_index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Main,
    Party,
    Sub,
}

impl SceneAction {
    fn origin(&self) -> Slot {
        match self {
            SceneAction::Command(_) | SceneAction::Exit => Slot::Main,
            SceneAction::PartyPicked(_) | SceneAction::PartyCancelled => Slot::Party,
            SceneAction::ItemPicked(_) | SceneAction::SkillPicked(_) | SceneAction::SubCancelled => {
                Slot::Sub
            }
        }
    }
}

/// What the party ring is picking a member for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PartyPurpose {
    Personal(String),
    Formation(Option<usize>),
    ItemTarget(u32),
}

/// Main menu commands that hand over to another ring.
const PERSONAL_COMMANDS: [&str; 3] = ["skill", "equip", "status"];

pub struct MenuScene {
    main: RingMenu,
    party: RingMenu,
    sub: Option<(MenuKind, RingMenu)>,
    focus: Slot,
    purpose: PartyPurpose,
    pending: Option<SceneAction>,
    sender: UnboundedSender<SceneAction>,
    receiver: UnboundedReceiver<SceneAction>,
    audio: CueChannel,
    rings: RingsConfig,
    cancel_text: String,
    context: FormulaContext,
    layer: Vec<Point>,
    status: String,
    finished: bool,
}

fn context_for(width: f64, height: f64, game: &dyn GameData) -> FormulaContext {
    FormulaContext::new(width, height).with_player(width / 2.0, height / 2.0, game.is_in_airship())
}

fn send_action(sender: &UnboundedSender<SceneAction>, action: SceneAction) -> impl FnMut() + 'static {
    let sender = sender.clone();
    move || {
        if sender.send(action.clone()).is_err() {
            warn!("scene action {:?} dropped", action);
        }
    }
}

/// Registers one handler per command plus the cancel handler.
fn wire(
    ring: &mut RingMenu,
    sender: &UnboundedSender<SceneAction>,
    cancel: SceneAction,
    pick: impl Fn(&Command) -> Option<SceneAction>,
) {
    let picks: Vec<(String, SceneAction)> = ring
        .commands()
        .iter()
        .filter(|command| command.id != CANCEL)
        .filter_map(|command| pick(command).map(|action| (command.id.clone(), action)))
        .collect();
    for (id, action) in picks {
        ring.set_handler(id, send_action(sender, action));
    }
    ring.set_handler(CANCEL, send_action(sender, cancel));
}

/// Closed and inactive, without animating.
fn hide(ring: &mut RingMenu) {
    ring.deactivate();
    ring.close(Some(0));
}

fn place(ring: &mut RingMenu, config: &RingConfig, context: &FormulaContext, layer: &[Point]) {
    match config.placement(context) {
        Ok((centre, radius)) => ring.place(centre, radius),
        Err(e) => warn!("keeping previous ring placement: {}", e),
    }
    ring.set_layer(layer.to_vec());
}

impl MenuScene {
    /// Builds the scene for a `width` x `height` area whose top-left corner
    /// sits at `origin` on the terminal.
    pub fn new(
        config: &Config,
        game: &DemoGame,
        audio: CueChannel,
        origin: Point,
        width: f64,
        height: f64,
    ) -> Result<Self, ConfigError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let context = context_for(width, height, game);
        let cancel_text = config.text.cancel.clone();

        let main = RingMenu::new(
            config.ring.main.options(&context, &cancel_text)?,
            Box::new(MainMenuCommands::new(config.text.menu_texts())),
            Box::new(audio.clone()),
        );
        let party = RingMenu::new(
            config.ring.party.options(&context, &cancel_text)?,
            Box::new(PartyCommands),
            Box::new(audio.clone()),
        );

        let mut scene = Self {
            main,
            party,
            sub: None,
            focus: Slot::Main,
            purpose: PartyPurpose::Formation(None),
            pending: None,
            sender,
            receiver,
            audio,
            rings: config.ring.clone(),
            cancel_text,
            context,
            layer: vec![origin],
            status: String::new(),
            finished: false,
        };
        hide(&mut scene.main);
        hide(&mut scene.party);
        scene.open_main(game);
        Ok(scene)
    }

    pub fn update(&mut self, input: &mut dyn InputService, game: &mut DemoGame) {
        self.main.update(input);
        self.party.update(input);
        if let Some((_, ring)) = &mut self.sub {
            ring.update(input);
        }

        while let Ok(action) = self.receiver.try_recv() {
            self.receive(action);
        }
        if let Some(action) = self.pending.take() {
            if self.ring(action.origin()).is_some_and(RingMenu::is_animating) {
                self.pending = Some(action);
            } else {
                self.perform(action, game);
            }
        }
    }

    /// Re-evaluates every ring's placement for a new screen area.
    pub fn resize(&mut self, origin: Point, width: f64, height: f64, game: &DemoGame) {
        self.context = context_for(width, height, game);
        self.layer = vec![origin];
        place(&mut self.main, &self.rings.main, &self.context, &self.layer);
        place(&mut self.party, &self.rings.party, &self.context, &self.layer);
        if let Some((kind, ring)) = &mut self.sub {
            let config = match kind {
                MenuKind::Skill { .. } => &self.rings.skill,
                _ => &self.rings.item,
            };
            place(ring, config, &self.context, &self.layer);
        }
    }

    fn receive(&mut self, action: SceneAction) {
        debug!("scene received {:?}", action);
        let hands_over = match &action {
            SceneAction::Command(symbol) => {
                symbol == "item" || symbol == "formation" || PERSONAL_COMMANDS.contains(&symbol.as_str())
            }
            SceneAction::ItemPicked(_) => true,
            SceneAction::PartyPicked(_) => {
                matches!(&self.purpose, PartyPurpose::Personal(symbol) if symbol == "skill")
            }
            _ => false,
        };
        if hands_over {
            if let Some(ring) = self.ring_mut(action.origin()) {
                ring.inverse_close(None);
            }
        }
        self.pending = Some(action);
    }

    fn perform(&mut self, action: SceneAction, game: &mut DemoGame) {
        debug!("scene performing {:?}", action);
        match action {
            SceneAction::Exit => {
                info!("menu closed");
                self.finished = true;
            }
            SceneAction::Command(symbol) => self.perform_command(symbol, game),
            SceneAction::PartyPicked(index) => self.perform_party_pick(index, game),
            SceneAction::PartyCancelled => match self.purpose {
                PartyPurpose::Formation(Some(_)) => {
                    self.purpose = PartyPurpose::Formation(None);
                    self.open_party(game);
                }
                PartyPurpose::ItemTarget(_) => self.open_sub(MenuKind::Item, game),
                _ => self.open_main(game),
            },
            SceneAction::ItemPicked(id) => {
                self.purpose = PartyPurpose::ItemTarget(id);
                if let Some(item) = game.item(id) {
                    self.status = format!("Use {} on whom?", item.name);
                }
                self.open_party(game);
            }
            SceneAction::SkillPicked(id) => {
                let actor_index = match self.sub {
                    Some((MenuKind::Skill { actor_index }, _)) => actor_index,
                    _ => game.menu_actor,
                };
                self.status = if game.use_skill(actor_index, id) {
                    let actor = game.actor(actor_index).map(|a| a.name.clone()).unwrap_or_default();
                    format!("{} used skill #{}", actor, id)
                } else {
                    "Not enough MP".to_string()
                };
                self.open_sub(MenuKind::Skill { actor_index }, game);
            }
            SceneAction::SubCancelled => self.open_main(game),
        }
    }

    fn perform_command(&mut self, symbol: String, game: &mut DemoGame) {
        game.set_last_menu_command(&symbol);
        let text = self
            .main
            .commands()
            .get(&symbol)
            .map(|command| command.text.clone())
            .unwrap_or_else(|| symbol.clone());
        match symbol.as_str() {
            "item" => self.open_sub(MenuKind::Item, game),
            "formation" => {
                self.purpose = PartyPurpose::Formation(None);
                self.status = "Pick a member to move".to_string();
                self.open_party(game);
            }
            "gameEnd" => {
                info!("game end selected");
                self.finished = true;
            }
            personal if PERSONAL_COMMANDS.contains(&personal) => {
                self.purpose = PartyPurpose::Personal(symbol.clone());
                self.status = format!("{}: pick a member", text);
                self.open_party(game);
            }
            _ => {
                self.status = format!("{} is not part of this demo", text);
                self.open_main(game);
            }
        }
    }

    fn perform_party_pick(&mut self, index: usize, game: &mut DemoGame) {
        let name = game.actor(index).map(|a| a.name.clone()).unwrap_or_default();
        game.set_menu_actor(index);
        match self.purpose.clone() {
            PartyPurpose::Personal(symbol) => {
                if symbol == "skill" {
                    self.open_sub(MenuKind::Skill { actor_index: index }, game);
                } else {
                    self.status = format!("{} opened for {}", symbol, name);
                    self.open_main(game);
                }
            }
            PartyPurpose::Formation(None) => {
                self.purpose = PartyPurpose::Formation(Some(index));
                self.status = format!("Swap {} with whom?", name);
                self.open_party(game);
            }
            PartyPurpose::Formation(Some(first)) => {
                game.swap_members(first, index);
                self.purpose = PartyPurpose::Formation(None);
                self.status = "Formation changed".to_string();
                self.open_party(game);
            }
            PartyPurpose::ItemTarget(id) => {
                let item = game.item(id).map(|item| item.name.clone()).unwrap_or_default();
                self.status = if game.use_item(id) {
                    format!("Used {} on {}", item, name)
                } else {
                    format!("No {} left", item)
                };
                self.open_sub(MenuKind::Item, game);
            }
        }
    }

    fn open_main(&mut self, game: &DemoGame) {
        self.main.refresh(game);
        wire(&mut self.main, &self.sender, SceneAction::Exit, |command| {
            Some(SceneAction::Command(command.id.clone()))
        });
        place(&mut self.main, &self.rings.main, &self.context, &self.layer);
        self.main.activate();
        self.focus = Slot::Main;
    }

    fn open_party(&mut self, game: &DemoGame) {
        self.party.refresh(game);
        wire(
            &mut self.party,
            &self.sender,
            SceneAction::PartyCancelled,
            |command| match command.payload {
                Some(Payload::Actor(index)) => Some(SceneAction::PartyPicked(index)),
                _ => None,
            },
        );
        place(&mut self.party, &self.rings.party, &self.context, &self.layer);
        self.party.activate();
        self.focus = Slot::Party;
    }

    fn open_sub(&mut self, kind: MenuKind, game: &DemoGame) {
        let config = match kind {
            MenuKind::Skill { .. } => &self.rings.skill,
            _ => &self.rings.item,
        };
        let reuse = matches!(&self.sub, Some((current, _)) if *current == kind);
        if !reuse {
            let source: Box<dyn CommandSource> = match kind {
                MenuKind::Skill { actor_index } => Box::new(SkillCommands::new(actor_index)),
                _ => Box::new(ItemCommands),
            };
            let options = match config.options(&self.context, &self.cancel_text) {
                Ok(options) => options,
                Err(e) => {
                    warn!("cannot open {:?} ring: {}", kind, e);
                    self.open_main(game);
                    return;
                }
            };
            let mut ring = RingMenu::new(options, source, Box::new(self.audio.clone()));
            hide(&mut ring);
            self.sub = Some((kind, ring));
        }

        let Some((_, ring)) = &mut self.sub else {
            return;
        };
        ring.refresh(game);
        wire(ring, &self.sender, SceneAction::SubCancelled, |command| {
            match command.payload {
                Some(Payload::Item(id)) => Some(SceneAction::ItemPicked(id)),
                Some(Payload::Skill(id)) => Some(SceneAction::SkillPicked(id)),
                _ => None,
            }
        });
        place(ring, config, &self.context, &self.layer);
        ring.activate();
        self.focus = Slot::Sub;
    }

    fn ring(&self, slot: Slot) -> Option<&RingMenu> {
        match slot {
            Slot::Main => Some(&self.main),
            Slot::Party => Some(&self.party),
            Slot::Sub => self.sub.as_ref().map(|(_, ring)| ring),
        }
    }

    fn ring_mut(&mut self, slot: Slot) -> Option<&mut RingMenu> {
        match slot {
            Slot::Main => Some(&mut self.main),
            Slot::Party => Some(&mut self.party),
            Slot::Sub => self.sub.as_mut().map(|(_, ring)| ring),
        }
    }

    /// Rings worth drawing, in draw order.
    pub fn visible_rings(&self) -> impl Iterator<Item = (MenuKind, &RingMenu)> {
        [
            Some((MenuKind::Main, &self.main)),
            Some((MenuKind::Party, &self.party)),
            self.sub.as_ref().map(|(kind, ring)| (*kind, ring)),
        ]
        .into_iter()
        .flatten()
        .filter(|(_, ring)| ring.is_visible())
    }

    pub fn focused(&self) -> &RingMenu {
        self.ring(self.focus).unwrap_or(&self.main)
    }

    pub fn focused_kind(&self) -> MenuKind {
        match (self.focus, &self.sub) {
            (Slot::Party, _) => MenuKind::Party,
            (Slot::Sub, Some((kind, _))) => *kind,
            _ => MenuKind::Main,
        }
    }

    /// Party member drawn at the centre of the focused ring, if it shows one.
    pub fn avatar(&self, game: &DemoGame) -> Option<usize> {
        if !self.focused().shows_actor_sprite() {
            return None;
        }
        match self.focused_kind() {
            MenuKind::Skill { actor_index } => Some(actor_index),
            _ => game.menu_actor(),
        }
    }

    pub fn help_text(&self) -> Option<&str> {
        self.focused().help_text()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// No action waiting and no ring moving.
    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
            && !self.main.is_animating()
            && !self.party.is_animating()
            && !self
                .sub
                .as_ref()
                .is_some_and(|(_, ring)| ring.is_animating())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{Cue, InputAction};

    #[derive(Default)]
    struct Keys {
        action: Option<InputAction>,
    }

    impl InputService for Keys {
        fn is_pressed(&self, action: InputAction) -> bool {
            self.action == Some(action)
        }

        fn is_repeated(&self, action: InputAction) -> bool {
            self.action == Some(action)
        }

        fn pointer(&self) -> Point {
            Point::ZERO
        }

        fn is_pointer_triggered(&self) -> bool {
            false
        }

        fn is_touch_cancelled(&self) -> bool {
            false
        }

        fn consume(&mut self) {
            self.action = None;
        }
    }

    struct Harness {
        scene: MenuScene,
        game: DemoGame,
        cues: UnboundedReceiver<Cue>,
    }

    impl Harness {
        fn new() -> Self {
            let config = Config::bundled().expect("bundled config");
            let game = DemoGame::bundled().expect("bundled game");
            let (audio, cues) = CueChannel::new();
            let scene = MenuScene::new(&config, &game, audio, Point::ZERO, 80.0, 24.0)
                .expect("scene");
            let mut harness = Self { scene, game, cues };
            harness.settle();
            harness
        }

        fn settle(&mut self) {
            for _ in 0..1000 {
                if self.scene.is_idle() {
                    return;
                }
                self.scene.update(&mut Keys::default(), &mut self.game);
            }
            panic!("scene never settled");
        }

        fn press(&mut self, action: InputAction) {
            self.scene.update(&mut Keys { action: Some(action) }, &mut self.game);
            self.settle();
        }

        fn focused_symbol(&self) -> Option<&str> {
            self.scene.focused().current_symbol()
        }
    }

    #[test]
    fn opens_on_the_main_ring() {
        let harness = Harness::new();
        assert_eq!(harness.scene.focused_kind(), MenuKind::Main);
        assert!(harness.scene.focused().can_process_input());
        assert_eq!(harness.focused_symbol(), Some("item"));
        assert_eq!(harness.scene.visible_rings().count(), 1);
        assert_eq!(harness.scene.avatar(&harness.game), Some(0));
    }

    #[test]
    fn cancel_on_main_finishes() {
        let mut harness = Harness::new();
        harness.press(InputAction::Cancel);
        assert!(harness.scene.is_finished());
    }

    #[test]
    fn item_then_target_uses_the_item() {
        let mut harness = Harness::new();
        harness.press(InputAction::Ok);
        assert_eq!(harness.scene.focused_kind(), MenuKind::Item);
        assert_eq!(harness.focused_symbol(), Some("item:1"));
        assert_eq!(harness.scene.help_text(), Some("Restores 500 HP to one ally."));
        assert_eq!(harness.game.last_menu_command.as_deref(), Some("item"));

        harness.press(InputAction::Ok);
        assert_eq!(harness.scene.focused_kind(), MenuKind::Party);

        harness.press(InputAction::Ok);
        assert_eq!(harness.scene.focused_kind(), MenuKind::Item);
        assert_eq!(harness.game.item(1).map(|item| item.count), Some(4));
        assert_eq!(harness.scene.status(), "Used Potion on Harold");
    }

    #[test]
    fn skill_goes_through_the_party_ring() {
        let mut harness = Harness::new();
        harness.press(InputAction::Right);
        assert_eq!(harness.cues.try_recv().ok(), Some(Cue::Cursor));
        harness.press(InputAction::Ok);
        assert_eq!(harness.scene.focused_kind(), MenuKind::Party);
        assert_eq!(harness.focused_symbol(), Some("actor:1"));

        harness.press(InputAction::Ok);
        assert_eq!(
            harness.scene.focused_kind(),
            MenuKind::Skill { actor_index: 0 }
        );
        let ring = harness.scene.focused();
        assert_eq!(ring.current_symbol(), Some("skill:10"));
        assert!(ring.is_item_enabled("skill:10"));
        assert!(!ring.is_item_enabled("skill:11"));

        harness.press(InputAction::Ok);
        assert_eq!(harness.game.party[0].mp, 25);
    }

    #[test]
    fn formation_swaps_two_members() {
        let mut harness = Harness::new();
        for _ in 0..4 {
            harness.press(InputAction::Right);
        }
        assert_eq!(harness.scene.focused().target_index(), 4);
        harness.press(InputAction::Ok);
        assert_eq!(harness.game.last_menu_command.as_deref(), Some("formation"));

        harness.press(InputAction::Ok);
        harness.press(InputAction::Right);
        harness.press(InputAction::Ok);
        assert_eq!(harness.game.party[0].name, "Therese");
        assert_eq!(harness.game.party[1].name, "Harold");
        assert_eq!(harness.game.menu_actor, 1);
        assert_eq!(harness.scene.focused_kind(), MenuKind::Party);
    }

    #[test]
    fn item_target_becomes_the_menu_actor() {
        let mut harness = Harness::new();
        harness.press(InputAction::Ok);
        harness.press(InputAction::Ok);
        assert_eq!(harness.focused_symbol(), Some("actor:1"));

        harness.press(InputAction::Right);
        harness.press(InputAction::Ok);
        assert_eq!(harness.game.menu_actor, 1);
        assert_eq!(harness.scene.status(), "Used Potion on Therese");
        assert_eq!(harness.scene.avatar(&harness.game), Some(1));
    }

    #[test]
    fn backing_out_reselects_the_last_command() {
        let mut harness = Harness::new();
        harness.press(InputAction::Right);
        harness.press(InputAction::Ok);
        harness.press(InputAction::Cancel);
        assert_eq!(harness.scene.focused_kind(), MenuKind::Main);
        assert_eq!(harness.focused_symbol(), Some("skill"));
        assert!(!harness.scene.is_finished());
    }
}
