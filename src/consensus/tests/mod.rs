pub mod oracle_registry_tests;

use crate::consensus::randomness::RandomnessSource;

/// Replays a fixed list of draws, then repeats the last one.
pub struct ScriptedRandomness {
    draws: Vec<u32>,
    position: usize,
}

impl ScriptedRandomness {
    pub fn new(draws: Vec<u32>) -> Self {
        ScriptedRandomness { draws, position: 0 }
    }
}

impl RandomnessSource for ScriptedRandomness {
    fn next_below(&mut self, bound: u32) -> u32 {
        let draw = self.draws[self.position.min(self.draws.len() - 1)];
        self.position += 1;
        draw % bound
    }
}
