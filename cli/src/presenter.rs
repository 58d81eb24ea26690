//! Console presenter: renders encounter signals as plain text

use bossrush_core::{EncounterSignal, SignalHandler};
use rand::seq::SliceRandom;

const BAR_WIDTH: usize = 30;

const TAUNTS: &[&str] = &[
    "This is just the beginning; you won't be so lucky next time!",
    "Don't cross my path again, or I'll make sure you regret it!",
    "Remember this moment, because the next time will be far more brutal!",
    "You may have escaped this time, but next time, there's no way out!",
    "Get ready, because next time, I won't hold back!",
    "Today you got lucky, but next time, nothing will save you!",
    "Consider this a warning. Next time, I'll finish what I started!",
    "I'm lurking in the shadows; think twice before you make your next move!",
    "You can run now, but you can't hide forever!",
];

#[derive(Debug, Default)]
pub struct ConsolePresenter {
    /// Set by the strike animation signal and consumed by the next health update
    hit_pending: bool,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SignalHandler for ConsolePresenter {
    fn handle_signal(&mut self, signal: &EncounterSignal) {
        match signal {
            EncounterSignal::EncounterStarted { boss } => {
                println!();
                println!("A wild {} appears! [{}]", boss.name, boss.alt_text());
                println!(
                    "  reward: {} coin, {} xp   image: {}",
                    boss.coin_reward, boss.xp_reward, boss.image_ref
                );
            }
            EncounterSignal::StrikeAnimationRequested => {
                self.hit_pending = true;
            }
            EncounterSignal::HealthChanged { current, max } => {
                let prefix = if std::mem::take(&mut self.hit_pending) {
                    "*hit*"
                } else {
                    "     "
                };
                println!("{prefix} {}", health_bar(*current, *max));
            }
            EncounterSignal::Defeated { boss, reward } => {
                let taunt = TAUNTS
                    .choose(&mut rand::thread_rng())
                    .copied()
                    .unwrap_or_default();
                println!();
                println!("You win! {} is defeated.", boss.name);
                println!("  \"{taunt}\"");
                println!("  +{} coin  +{} xp", reward.coin, reward.xp);
            }
            EncounterSignal::NoEncounterAvailable => {
                println!("No boss available right now. Try `retry` later.");
            }
            EncounterSignal::ResolutionFailed { reason } => {
                println!("! {reason}");
                println!("  Use `retry` to try again.");
            }
        }
    }
}

/// `[#########.....]  90/150` style bar
pub fn health_bar(current: i64, max: i64) -> String {
    let filled = if max <= 0 {
        0
    } else {
        let ratio = current.clamp(0, max) as f64 / max as f64;
        (ratio * BAR_WIDTH as f64).ceil() as usize
    };
    format!(
        "[{}{}] {current}/{max}",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_bar_scales_to_width() {
        assert_eq!(
            health_bar(100, 100),
            format!("[{}] 100/100", "#".repeat(BAR_WIDTH))
        );
        assert_eq!(
            health_bar(0, 100),
            format!("[{}] 0/100", ".".repeat(BAR_WIDTH))
        );
        assert_eq!(
            health_bar(50, 100),
            format!("[{}{}] 50/100", "#".repeat(15), ".".repeat(15))
        );
    }

    #[test]
    fn sliver_of_health_still_shows() {
        assert!(health_bar(1, 1000).starts_with("[#."));
    }

    #[test]
    fn zero_max_renders_empty_bar() {
        assert_eq!(health_bar(0, 0), format!("[{}] 0/0", ".".repeat(BAR_WIDTH)));
    }
}
