//! Button-combo trick detection.
//!
//! Each frame the caller reports which trick buttons are held and which went
//! down this frame. A trick fires when its trigger button is pressed while all
//! of its modifier buttons are held.

use serde::{Deserialize, Serialize};

use crate::{
    bitmask_flags::BitmaskFlags,
    constants::{TIMER_EPS, TRICK_DISPLAY_SECONDS},
    scoring::TrickEvent,
    utils::is_step,
};

crate::define_bitmask_flags!(
    #[derive(Deserialize, Serialize)]
    TrickButton, u8, {
        Shifter,
        Grab,
        Spin,
        Left,
        Right,
    }
);

pub type TrickButtons = BitmaskFlags<u8>;

/// Button state for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrickInput {
    pub held: TrickButtons,
    /// Buttons that went down this frame. A pressed button also counts as held.
    pub pressed: TrickButtons,
}

impl TrickInput {
    pub fn pressed(buttons: &[TrickButton]) -> Self {
        let pressed = TrickButtons::from_tags(buttons);
        Self {
            held: pressed,
            pressed,
        }
    }

    pub fn hold(mut self, buttons: &[TrickButton]) -> Self {
        self.held.add_many(buttons);
        self
    }
}

/// One catalog entry.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TrickDef {
    pub name: String,
    pub points: f32,
    /// Must go down this frame.
    pub trigger: TrickButton,
    /// Must be held while the trigger goes down.
    #[serde(default)]
    pub modifiers: Vec<TrickButton>,
}

impl TrickDef {
    pub fn new(name: &str, points: f32, trigger: TrickButton, modifiers: &[TrickButton]) -> Self {
        Self {
            name: name.to_owned(),
            points,
            trigger,
            modifiers: modifiers.to_vec(),
        }
    }

    fn matches(&self, input: &TrickInput) -> bool {
        let held = TrickButtons::new(input.held.bits | input.pressed.bits);
        input.pressed.has(self.trigger) && held.has_all(&self.modifiers)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrickConfig {
    /// How long the last trick's name stays visible.
    pub display_seconds: f32,
    /// Ignore tricks while grounded.
    pub airborne_only: bool,
    pub catalog: Vec<TrickDef>,
}

impl Default for TrickConfig {
    fn default() -> Self {
        use TrickButton::*;
        Self {
            display_seconds: TRICK_DISPLAY_SECONDS,
            airborne_only: false,
            catalog: vec![
                TrickDef::new("SHIFTER", 100.0, Shifter, &[]),
                TrickDef::new("GRAB", 150.0, Grab, &[]),
                TrickDef::new("SPIN LEFT", 250.0, Left, &[Spin]),
                TrickDef::new("SPIN RIGHT", 250.0, Right, &[Spin]),
            ],
        }
    }
}

/// Turns button input into [`TrickEvent`]s and remembers the latest for display.
#[derive(Clone, Debug)]
pub struct TrickDetector {
    config: TrickConfig,
    current: Option<String>,
    display_left: f32,
}

impl TrickDetector {
    pub fn new(config: TrickConfig) -> Self {
        Self {
            config,
            current: None,
            display_left: 0.0,
        }
    }

    /// Name of the most recent trick while it is still on display.
    pub fn current_trick(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Detect this frame's tricks. Several catalog entries can fire on one frame.
    pub fn update(&mut self, dt: f32, input: TrickInput, airborne: bool) -> Vec<TrickEvent> {
        if self.current.is_some() && is_step(dt) {
            self.display_left -= dt;
            if self.display_left <= TIMER_EPS {
                self.current = None;
                self.display_left = 0.0;
            }
        }

        if input.pressed.is_empty() || (self.config.airborne_only && !airborne) {
            return Vec::new();
        }

        let events: Vec<TrickEvent> = self
            .config
            .catalog
            .iter()
            .filter(|def| def.matches(&input))
            .map(|def| TrickEvent::new(def.name.clone(), def.points))
            .collect();

        if let Some(last) = events.last() {
            self.current = Some(last.name.clone());
            self.display_left = self.config.display_seconds.max(0.0);
        }
        events
    }
}
