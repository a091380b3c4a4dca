// Kill-point trade percentage

/// `round(self / enemy * 100)`; with no enemy kill points the trade is 100
/// when both sides are equal and 0 otherwise.
pub fn trade_percentage(kill_points: f64, enemy_kill_points: f64) -> f64 {
    if enemy_kill_points > 0.0 {
        (kill_points / enemy_kill_points * 100.0).round_ties_even()
    } else if kill_points == enemy_kill_points {
        100.0
    } else {
        0.0
    }
}
