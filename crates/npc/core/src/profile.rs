//! Design-time NPC profiles.
//!
//! A profile is shared by every NPC spawned from it. It carries the ordered
//! action templates, the hostile group mask and the brain configuration;
//! [`crate::Brain::new`] turns it into per-instance state.

use crate::action::ActionTemplate;
use crate::config::BrainConfig;
use crate::world::Groups;

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NpcProfile {
    pub name: String,
    /// Characters sharing any of these groups are targeted.
    pub hostile_groups: Groups,
    #[cfg_attr(feature = "serde", serde(default))]
    pub config: BrainConfig,
    /// Ordered templates; earlier entries win score ties.
    #[cfg_attr(feature = "serde", serde(default))]
    pub actions: Vec<ActionTemplate>,
}

impl NpcProfile {
    pub fn new(name: impl Into<String>, hostile_groups: Groups) -> Self {
        Self {
            name: name.into(),
            hostile_groups,
            config: BrainConfig::default(),
            actions: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: BrainConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_action(mut self, template: ActionTemplate) -> Self {
        self.actions.push(template);
        self
    }
}
