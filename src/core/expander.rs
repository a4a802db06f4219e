use crate::domain::model::{Entity, Pair};

/// Full cross product, actor-major. Duplicates are kept.
pub fn expand_pairs(actors: &[Entity], locations: &[Entity]) -> Vec<Pair> {
    let mut pairs = Vec::with_capacity(actors.len() * locations.len());
    for actor in actors {
        for location in locations {
            pairs.push(Pair {
                actor: actor.clone(),
                location: location.clone(),
            });
        }
    }
    pairs
}
