//! Score keeping and the score-driven bomb spawn trigger.

/// Running score plus the accumulator that arms a one-shot bomb spawn.
#[derive(Debug, Clone)]
pub struct ScoreKeeper {
    score: u64,
    multiplier: u64,
    bomb_accumulator: u64,
    bomb_threshold: u64,
    bomb_pending: bool,
}

impl ScoreKeeper {
    pub fn new(multiplier: u64, bomb_threshold: u64) -> Self {
        Self {
            score: 0,
            multiplier,
            bomb_accumulator: 0,
            bomb_threshold,
            bomb_pending: false,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn bomb_pending(&self) -> bool {
        self.bomb_pending
    }

    /// Credit `destroyed` tiles. Returns the new score.
    ///
    /// Reaching the threshold arms the bomb flag and resets the
    /// accumulator to zero; any overshoot is dropped.
    pub fn add_score(&mut self, destroyed: usize) -> u64 {
        let gained = destroyed as u64 * self.multiplier;
        self.score += gained;
        self.bomb_accumulator += gained;
        if self.bomb_accumulator >= self.bomb_threshold {
            self.bomb_accumulator = 0;
            self.bomb_pending = true;
            tracing::debug!(score = self.score, "bomb spawn armed");
        }
        self.score
    }

    /// Consume the bomb flag. True at most once per arming.
    pub fn take_bomb(&mut self) -> bool {
        std::mem::take(&mut self.bomb_pending)
    }
}
