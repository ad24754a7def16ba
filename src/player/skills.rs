use bevy::prelude::*;

use crate::shared::*;

/// Experience in one skill. The threshold doubles on every level up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillProgress {
    pub xp: u32,
    pub level: u32,
    pub next_level_xp: u32,
}

impl Default for SkillProgress {
    fn default() -> Self {
        Self { xp: 0, level: 1, next_level_xp: 100 }
    }
}

impl SkillProgress {
    /// Adds `amount`, then levels up as many times as the total allows.
    pub fn add_xp(&mut self, amount: u32) {
        self.xp += amount;
        while self.xp >= self.next_level_xp {
            self.level += 1;
            self.next_level_xp *= 2;
        }
    }
}

#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct Skills {
    pub woodcutting: SkillProgress,
    pub farming: SkillProgress,
}

impl Skills {
    pub fn get(&self, skill: Skill) -> &SkillProgress {
        match skill {
            Skill::Woodcutting => &self.woodcutting,
            Skill::Farming => &self.farming,
        }
    }

    pub fn add_xp(&mut self, skill: Skill, amount: u32) {
        match skill {
            Skill::Woodcutting => self.woodcutting.add_xp(amount),
            Skill::Farming => self.farming.add_xp(amount),
        }
    }
}

pub fn apply_skill_xp(mut events: EventReader<SkillXpEvent>, mut players: Query<&mut Skills>) {
    for ev in events.read() {
        for mut skills in &mut players {
            let before = skills.get(ev.skill).level;
            skills.add_xp(ev.skill, ev.amount);
            let after = skills.get(ev.skill);
            if after.level > before {
                info!("[Player] {} reached level {}", ev.skill.label(), after.level);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_start_at_one() {
        let skills = Skills::default();
        for skill in Skill::ALL {
            assert_eq!(*skills.get(skill), SkillProgress { xp: 0, level: 1, next_level_xp: 100 });
        }
    }

    #[test]
    fn test_large_award_crosses_several_levels() {
        let mut progress = SkillProgress::default();
        progress.add_xp(250);
        assert_eq!(progress.level, 3);
        assert_eq!(progress.next_level_xp, 400);
        assert_eq!(progress.xp, 250);
    }

    #[test]
    fn test_exact_threshold_levels_up() {
        let mut skills = Skills::default();
        skills.add_xp(Skill::Woodcutting, 50);
        skills.add_xp(Skill::Woodcutting, 50);
        assert_eq!(skills.woodcutting.level, 2);
        assert_eq!(skills.farming.level, 1);
    }
}
