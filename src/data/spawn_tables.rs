//! Depth-weighted spawn tables
//!
//! Each table is a list of `(min_depth, entries)`. Every row whose depth is
//! at most the current one contributes; a later row overrides the weight of
//! a kind an earlier row already listed.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::entities::MonsterKind;
use crate::items::ItemKind;

pub type SpawnTable<T> = &'static [(u32, &'static [(T, u32)])];

pub const ITEM_CHANCES: SpawnTable<ItemKind> = &[
    (0, &[(ItemKind::HealthPotion, 35), (ItemKind::ChainMail, 25), (ItemKind::Box, 35)]),
    (2, &[(ItemKind::ConfusionScroll, 10)]),
    (4, &[(ItemKind::LightningScroll, 25), (ItemKind::Sword, 5)]),
    (6, &[(ItemKind::FireballScroll, 25), (ItemKind::ChainMail, 15)]),
    (8, &[(ItemKind::BurlyArmor, 10), (ItemKind::CreakingArmor, 5)]),
];

pub const MONSTER_CHANCES: SpawnTable<MonsterKind> = &[
    (0, &[(MonsterKind::Orc, 20), (MonsterKind::Gremlin, 80)]),
    (3, &[(MonsterKind::BroomTroll, 85)]),
    (5, &[(MonsterKind::Troll, 30)]),
    (7, &[(MonsterKind::Troll, 60)]),
    (8, &[(MonsterKind::ThwackingOrc, 40)]),
    (9, &[(MonsterKind::BurningOrc, 40)]),
    (10, &[(MonsterKind::ResoluteOrc, 40)]),
    (11, &[(MonsterKind::KnurledGoblin, 40)]),
    (12, &[(MonsterKind::MusculousGoblin, 40)]),
    (13, &[(MonsterKind::SatyricGoblin, 40)]),
    (14, &[(MonsterKind::InsuperableTroll, 40)]),
];

/// Eligible kinds and their weights at a depth, in first-seen order
pub fn weights_at<T: Copy + PartialEq>(table: SpawnTable<T>, depth: u32) -> Vec<(T, u32)> {
    let mut weights: Vec<(T, u32)> = Vec::new();
    for (min_depth, entries) in table.iter() {
        if *min_depth > depth {
            break;
        }
        for (kind, weight) in entries.iter() {
            match weights.iter_mut().find(|(k, _)| k == kind) {
                Some(existing) => existing.1 = *weight,
                None => weights.push((*kind, *weight)),
            }
        }
    }
    weights
}

/// Draw `count` kinds with replacement
pub fn choose_at_random<T: Copy + PartialEq>(
    table: SpawnTable<T>,
    depth: u32,
    count: usize,
    rng: &mut impl Rng,
) -> Vec<T> {
    let weights = weights_at(table, depth);
    let Ok(dist) = WeightedIndex::new(weights.iter().map(|(_, w)| *w)) else {
        return Vec::new();
    };
    (0..count).map(|_| weights[dist.sample(rng)].0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_later_rows_override_weights() {
        let w = weights_at(MONSTER_CHANCES, 7);
        assert!(w.contains(&(MonsterKind::Troll, 60)));
        assert!(!w.contains(&(MonsterKind::Troll, 30)));
        assert!(!w.iter().any(|(k, _)| *k == MonsterKind::ThwackingOrc));

        let w = weights_at(ITEM_CHANCES, 6);
        assert!(w.contains(&(ItemKind::ChainMail, 15)));
    }

    #[test]
    fn test_depth_zero_only_has_base_kinds() {
        let mut rng = StdRng::seed_from_u64(11);
        let picks = choose_at_random(MONSTER_CHANCES, 0, 40, &mut rng);
        assert_eq!(picks.len(), 40);
        assert!(picks
            .iter()
            .all(|k| matches!(k, MonsterKind::Orc | MonsterKind::Gremlin)));
    }
}
