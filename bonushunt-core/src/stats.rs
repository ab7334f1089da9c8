//! Derived metrics over a hunt and its ordered bonus list.
//!
//! Everything in here is a pure function of its inputs so the numbers
//! shown on the detail view, the overlays, and the live list can never
//! disagree with each other.

use crate::{BonusData, HuntData, HuntStatus};

/// The full set of derived metrics for one hunt
#[derive(Debug, Clone)]
pub struct HuntStats {
    pub total_bonuses: usize,
    pub played_bonuses: usize,
    /// Fraction of bonuses played, in `[0, 1]`. 0 for an empty hunt.
    pub progress: f64,
    /// Sum of bet amounts over every bonus
    pub total_cost: f64,
    /// Sum of win amounts over played bonuses
    pub total_win: f64,
    pub avg_bet: f64,
    /// `(total_win - total_cost) / total_cost * 100`, 0 when nothing was bet
    pub roi_percent: f64,
    /// `total_cost / avg_bet`. Collapses to the bonus count whenever
    /// `avg_bet > 0`; kept as-is for compatibility with the overlays.
    pub break_even_multiplier: f64,
    /// The played bonus with the highest win amount, earliest in order
    /// on a tie
    pub best_win: Option<BonusData>,
    /// The played bonus with the highest multiplier. Selected
    /// independently of [Self::best_win], the two may differ.
    pub best_multiplier: Option<BonusData>,
    /// The first unplayed bonus, while the hunt is playing
    pub next_bonus: Option<BonusData>,
}

/// The `/stats` rollup across a set of hunts
#[derive(Debug, Clone)]
pub struct OverallStats {
    pub total_hunts: usize,
    /// Hunts that haven't finished yet
    pub active_hunts: usize,
    pub total_spent: f64,
    pub total_won: f64,
}

impl HuntStats {
    /// Computes every metric from a hunt and its bonuses, ordered by
    /// their sort key. Never fails, an empty bonus list is valid.
    pub fn compute(hunt: &HuntData, bonuses: &[BonusData]) -> Self {
        let total_bonuses = bonuses.len();
        let played: Vec<_> = bonuses.iter().filter(|b| b.is_played()).collect();
        let played_bonuses = played.len();

        let progress = if total_bonuses > 0 {
            played_bonuses as f64 / total_bonuses as f64
        } else {
            0.0
        };

        let total_cost: f64 = bonuses.iter().map(|b| b.bet_amount).sum();
        let total_win: f64 = played.iter().map(|b| b.win_amount.unwrap_or(0.0)).sum();

        let avg_bet = if total_bonuses > 0 {
            total_cost / total_bonuses as f64
        } else {
            0.0
        };

        let roi_percent = if total_cost > 0.0 {
            (total_win - total_cost) / total_cost * 100.0
        } else {
            0.0
        };

        let break_even_multiplier = if avg_bet > 0.0 {
            total_cost / avg_bet
        } else {
            0.0
        };

        // Strict comparison keeps the first bonus in order on a tie
        let best_win = played
            .iter()
            .copied()
            .fold(None::<&BonusData>, |best, current| match best {
                Some(b) if current.win_amount.unwrap_or(0.0) > b.win_amount.unwrap_or(0.0) => {
                    Some(current)
                }
                Some(b) => Some(b),
                None => Some(current),
            })
            .cloned();

        let best_multiplier = played
            .iter()
            .copied()
            .fold(None::<&BonusData>, |best, current| match best {
                Some(b) if current.multiplier.unwrap_or(0.0) > b.multiplier.unwrap_or(0.0) => {
                    Some(current)
                }
                Some(b) => Some(b),
                None => Some(current),
            })
            .cloned();

        let next_bonus = if hunt.is_playing() {
            bonuses.iter().find(|b| !b.is_played()).cloned()
        } else {
            None
        };

        Self {
            total_bonuses,
            played_bonuses,
            progress,
            total_cost,
            total_win,
            avg_bet,
            roi_percent,
            break_even_multiplier,
            best_win,
            best_multiplier,
            next_bonus,
        }
    }
}

impl OverallStats {
    pub fn compute(hunts: &[HuntData]) -> Self {
        Self {
            total_hunts: hunts.len(),
            active_hunts: hunts
                .iter()
                .filter(|h| h.status != HuntStatus::Finished)
                .count(),
            total_spent: hunts.iter().map(|h| h.start_balance).sum(),
            total_won: hunts.iter().map(|h| h.end_balance.unwrap_or(0.0)).sum(),
        }
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;

    use super::{HuntStats, OverallStats};
    use crate::{BonusData, BonusStatus, HuntData, HuntStatus};

    fn hunt(status: HuntStatus) -> HuntData {
        HuntData {
            id: 1,
            owner_id: 1,
            title: "Friday hunt".to_string(),
            casino: "Stake".to_string(),
            currency: "USD".to_string(),
            start_balance: 1000.0,
            end_balance: None,
            status,
            notes: None,
            is_public: true,
            public_token: "token".to_string(),
            current_slot_index: 0,
            total_won: 0.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn bonus(id: i32, bet: f64, win: Option<f64>) -> BonusData {
        BonusData {
            id,
            hunt_id: 1,
            slot_name: format!("slot {id}"),
            provider: "provider".to_string(),
            image_url: None,
            bet_amount: bet,
            multiplier: win.map(|w| if bet > 0.0 { w / bet } else { 0.0 }),
            win_amount: win,
            sort_order: id,
            status: if win.is_some() {
                BonusStatus::Opened
            } else {
                BonusStatus::Waiting
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_hunt_is_all_zeroes() {
        let stats = HuntStats::compute(&hunt(HuntStatus::Collecting), &[]);

        assert_eq!(stats.total_bonuses, 0);
        assert_eq!(stats.progress, 0.0);
        assert_eq!(stats.avg_bet, 0.0);
        assert_eq!(stats.roi_percent, 0.0);
        assert_eq!(stats.break_even_multiplier, 0.0);
        assert!(stats.best_win.is_none());
        assert!(stats.best_multiplier.is_none());
        assert!(stats.next_bonus.is_none());
    }

    #[test]
    fn computes_the_usual_metrics() {
        let bonuses = vec![
            bonus(1, 10.0, Some(50.0)),
            bonus(2, 20.0, Some(0.0)),
            bonus(3, 30.0, Some(15.0)),
        ];

        let stats = HuntStats::compute(&hunt(HuntStatus::Opening), &bonuses);

        assert_eq!(stats.total_bonuses, 3);
        assert_eq!(stats.played_bonuses, 3);
        assert_eq!(stats.progress, 1.0);
        assert_eq!(stats.total_cost, 60.0);
        assert_eq!(stats.total_win, 65.0);
        assert_eq!(stats.avg_bet, 20.0);
        assert!((stats.roi_percent - 8.333333333333332).abs() < 1e-9);
        assert_eq!(stats.best_win.unwrap().id, 1);
        // 5.0x on the first bonus beats 0.5x on the last
        assert_eq!(stats.best_multiplier.unwrap().id, 1);
    }

    #[test]
    fn break_even_collapses_to_bonus_count() {
        let bonuses = vec![bonus(1, 5.0, None), bonus(2, 25.0, None), bonus(3, 3.0, None)];
        let stats = HuntStats::compute(&hunt(HuntStatus::Collecting), &bonuses);

        assert_eq!(stats.break_even_multiplier, 3.0);
    }

    #[test]
    fn best_picks_are_independent() {
        // Highest win on bonus 2, highest multiplier on bonus 1
        let bonuses = vec![bonus(1, 1.0, Some(40.0)), bonus(2, 100.0, Some(50.0))];
        let stats = HuntStats::compute(&hunt(HuntStatus::Opening), &bonuses);

        assert_eq!(stats.best_win.unwrap().id, 2);
        assert_eq!(stats.best_multiplier.unwrap().id, 1);
    }

    #[test]
    fn ties_break_on_the_first_in_order() {
        let bonuses = vec![
            bonus(1, 10.0, Some(100.0)),
            bonus(2, 10.0, Some(100.0)),
            bonus(3, 10.0, Some(100.0)),
        ];

        let stats = HuntStats::compute(&hunt(HuntStatus::Opening), &bonuses);

        assert_eq!(stats.best_win.unwrap().id, 1);
        assert_eq!(stats.best_multiplier.unwrap().id, 1);
    }

    #[test]
    fn no_played_bonuses_means_no_best_picks() {
        let bonuses = vec![bonus(1, 10.0, None), bonus(2, 20.0, None)];
        let stats = HuntStats::compute(&hunt(HuntStatus::Opening), &bonuses);

        assert!(stats.best_win.is_none());
        assert!(stats.best_multiplier.is_none());
        assert_eq!(stats.progress, 0.0);
    }

    #[test]
    fn next_bonus_requires_a_playing_hunt() {
        let bonuses = vec![bonus(1, 10.0, Some(12.0)), bonus(2, 20.0, None)];

        let collecting = HuntStats::compute(&hunt(HuntStatus::Collecting), &bonuses);
        assert!(collecting.next_bonus.is_none());

        let playing = HuntStats::compute(&hunt(HuntStatus::Opening), &bonuses);
        assert_eq!(playing.next_bonus.unwrap().id, 2);
    }

    #[test]
    fn next_bonus_is_none_when_everything_is_played() {
        let bonuses = vec![bonus(1, 10.0, Some(12.0))];
        let stats = HuntStats::compute(&hunt(HuntStatus::Opening), &bonuses);

        assert!(stats.next_bonus.is_none());
    }

    #[test]
    fn overall_stats_roll_up_across_hunts() {
        let mut first = hunt(HuntStatus::Finished);
        first.end_balance = Some(1500.0);

        let second = hunt(HuntStatus::Opening);
        let third = hunt(HuntStatus::Collecting);

        let stats = OverallStats::compute(&[first, second, third]);

        assert_eq!(stats.total_hunts, 3);
        assert_eq!(stats.active_hunts, 2);
        assert_eq!(stats.total_spent, 3000.0);
        assert_eq!(stats.total_won, 1500.0);
    }
}
