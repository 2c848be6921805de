//! Glicko-2 rating updates.
//!
//! Ratings are stored on the familiar Glicko scale (1500 centred) and
//! converted to the internal Glicko-2 scale only for the duration of an
//! update. One call to [`Glicko2::update_rating`] processes one rating
//! period: every result in the slice is treated as simultaneous.

use crate::RatingError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Conversion factor between the Glicko and Glicko-2 scales.
pub const GLICKO2_SCALE: f64 = 173.7178;

const DEFAULT_RATING: f64 = 1500.0;
const DEFAULT_RD: f64 = 350.0;
const DEFAULT_VOLATILITY: f64 = 0.06;

/// A player's strength estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlickoRating {
    pub rating: f64,
    /// Rating deviation.
    pub rd: f64,
    /// Volatility.
    pub vol: f64,
}

impl Default for GlickoRating {
    fn default() -> Self {
        GlickoRating {
            rating: DEFAULT_RATING,
            rd: DEFAULT_RD,
            vol: DEFAULT_VOLATILITY,
        }
    }
}

impl GlickoRating {
    fn is_finite(&self) -> bool {
        self.rating.is_finite() && self.rd.is_finite() && self.vol.is_finite()
    }
}

/// One game from the rated player's side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub opponent_rating: f64,
    pub opponent_rd: f64,
    /// 1.0 win, 0.5 draw, 0.0 loss.
    pub score: f64,
}

impl GameResult {
    pub fn against(opponent: &GlickoRating, score: f64) -> Self {
        GameResult {
            opponent_rating: opponent.rating,
            opponent_rd: opponent.rd,
            score,
        }
    }
}

/// System constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Glicko2Config {
    /// Constrains volatility change between periods.
    pub tau: f64,
    /// Upper bound on rating deviation, for both inactivity decay and
    /// post-update capping.
    pub rd_ceiling: f64,
    pub convergence_tolerance: f64,
    /// Cap on both the bracketing search and the root-find loop.
    pub max_iterations: u32,
}

impl Default for Glicko2Config {
    fn default() -> Self {
        Glicko2Config {
            tau: 0.5,
            rd_ceiling: DEFAULT_RD,
            convergence_tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

/// The Glicko-2 calculator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Glicko2 {
    config: Glicko2Config,
}

impl Glicko2 {
    pub fn new(config: Glicko2Config) -> Self {
        Glicko2 { config }
    }

    pub fn config(&self) -> &Glicko2Config {
        &self.config
    }

    /// Rates one period of results.
    ///
    /// With no results the player only becomes less certain: RD grows by
    /// the volatility, up to the ceiling.
    ///
    /// # Errors
    ///
    /// Rejects scores outside `[0, 1]` and non-finite inputs. Reports the
    /// iteration cap being hit in the volatility step as
    /// [`RatingError::BracketNotFound`] or [`RatingError::NoConvergence`].
    ///
    /// # Example
    ///
    /// ```
    /// use chess_rating::{GameResult, Glicko2, GlickoRating};
    ///
    /// let glicko = Glicko2::default();
    /// let player = GlickoRating::default();
    /// let win = GameResult::against(&GlickoRating::default(), 1.0);
    /// let after = glicko.update_rating(&player, &[win]).unwrap();
    /// assert!(after.rating > player.rating);
    /// assert!(after.rd < player.rd);
    /// ```
    pub fn update_rating(
        &self,
        current: &GlickoRating,
        results: &[GameResult],
    ) -> Result<GlickoRating, RatingError> {
        if !current.is_finite() {
            return Err(RatingError::NonFinite);
        }
        let phi = current.rd / GLICKO2_SCALE;
        let sigma = current.vol;

        if results.is_empty() {
            let phi_star = (phi * phi + sigma * sigma).sqrt();
            return Ok(GlickoRating {
                rd: (phi_star * GLICKO2_SCALE).min(self.config.rd_ceiling),
                ..*current
            });
        }

        let mu = (current.rating - DEFAULT_RATING) / GLICKO2_SCALE;

        let mut v_inv = 0.0;
        let mut improvement = 0.0;
        for result in results {
            if !(result.opponent_rating.is_finite() && result.opponent_rd.is_finite()) {
                return Err(RatingError::NonFinite);
            }
            if !(0.0..=1.0).contains(&result.score) {
                return Err(RatingError::InvalidScore(result.score));
            }
            let mu_j = (result.opponent_rating - DEFAULT_RATING) / GLICKO2_SCALE;
            let g_j = g(result.opponent_rd / GLICKO2_SCALE);
            let e_j = expected(mu, mu_j, g_j);
            v_inv += g_j * g_j * e_j * (1.0 - e_j);
            improvement += g_j * (result.score - e_j);
        }
        let v = 1.0 / v_inv;
        let delta = v * improvement;

        let sigma_new = self.new_volatility(phi, sigma, v, delta)?;

        let phi_star = (phi * phi + sigma_new * sigma_new).sqrt();
        let phi_new = 1.0 / (1.0 / (phi_star * phi_star) + 1.0 / v).sqrt();
        let mu_new = mu + phi_new * phi_new * improvement;

        let updated = GlickoRating {
            rating: mu_new * GLICKO2_SCALE + DEFAULT_RATING,
            rd: (phi_new * GLICKO2_SCALE).min(self.config.rd_ceiling),
            vol: sigma_new,
        };
        if !updated.is_finite() {
            return Err(RatingError::NonFinite);
        }
        Ok(updated)
    }

    /// Solves for the new volatility with the Illinois variant of
    /// regula falsi.
    fn new_volatility(&self, phi: f64, sigma: f64, v: f64, delta: f64) -> Result<f64, RatingError> {
        let tau = self.config.tau;
        let max_iterations = self.config.max_iterations;
        let a = (sigma * sigma).ln();
        let f = |x: f64| {
            let ex = x.exp();
            let denom = phi * phi + v + ex;
            ex * (delta * delta - phi * phi - v - ex) / (2.0 * denom * denom) - (x - a) / (tau * tau)
        };

        let mut big_a = a;
        let mut big_b = if delta * delta > phi * phi + v {
            (delta * delta - phi * phi - v).ln()
        } else {
            let mut k = 1;
            while f(a - f64::from(k) * tau) < 0.0 {
                if k >= max_iterations {
                    return Err(RatingError::BracketNotFound { iterations: k });
                }
                k += 1;
            }
            a - f64::from(k) * tau
        };

        let mut f_a = f(big_a);
        let mut f_b = f(big_b);
        let mut iterations = 0;
        while (big_b - big_a).abs() > self.config.convergence_tolerance {
            if iterations >= max_iterations {
                return Err(RatingError::NoConvergence { iterations });
            }
            iterations += 1;

            let big_c = big_a + (big_a - big_b) * f_a / (f_b - f_a);
            let f_c = f(big_c);
            if f_c * f_b <= 0.0 {
                big_a = big_b;
                f_a = f_b;
            } else {
                f_a /= 2.0;
            }
            big_b = big_c;
            f_b = f_c;
        }

        Ok((big_a / 2.0).exp())
    }
}

/// Dampens an opponent's weight by their uncertainty.
fn g(phi: f64) -> f64 {
    1.0 / (1.0 + 3.0 * phi * phi / (PI * PI)).sqrt()
}

fn expected(mu: f64, mu_j: f64, g_j: f64) -> f64 {
    1.0 / (1.0 + (-g_j * (mu - mu_j)).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    fn paper_results() -> Vec<GameResult> {
        vec![
            GameResult {
                opponent_rating: 1400.0,
                opponent_rd: 30.0,
                score: 1.0,
            },
            GameResult {
                opponent_rating: 1550.0,
                opponent_rd: 100.0,
                score: 0.0,
            },
            GameResult {
                opponent_rating: 1700.0,
                opponent_rd: 300.0,
                score: 0.0,
            },
        ]
    }

    #[test]
    fn test_default_rating() {
        let rating = GlickoRating::default();
        assert_eq!(rating.rating, 1500.0);
        assert_eq!(rating.rd, 350.0);
        assert_eq!(rating.vol, 0.06);
    }

    #[test]
    fn test_glickman_worked_example() {
        let player = GlickoRating {
            rating: 1500.0,
            rd: 200.0,
            vol: 0.06,
        };
        let after = Glicko2::default().update_rating(&player, &paper_results()).unwrap();
        assert!(close(after.rating, 1464.05, 0.01), "{}", after.rating);
        assert!(close(after.rd, 151.52, 0.01), "{}", after.rd);
        assert!(close(after.vol, 0.05999, 0.00001), "{}", after.vol);
    }

    #[test]
    fn test_no_games_widens_rd() {
        let player = GlickoRating {
            rating: 1620.0,
            rd: 200.0,
            vol: 0.06,
        };
        let after = Glicko2::default().update_rating(&player, &[]).unwrap();
        assert_eq!(after.rating, player.rating);
        assert_eq!(after.vol, player.vol);
        assert!(after.rd > player.rd);
        assert!(close(after.rd, 200.27, 0.01), "{}", after.rd);
    }

    #[test]
    fn test_no_games_respects_ceiling() {
        let after = Glicko2::default()
            .update_rating(&GlickoRating::default(), &[])
            .unwrap();
        assert_eq!(after.rd, 350.0);

        let glicko = Glicko2::new(Glicko2Config {
            rd_ceiling: 500.0,
            ..Default::default()
        });
        let after = glicko.update_rating(&GlickoRating::default(), &[]).unwrap();
        assert!(after.rd > 350.0);
        assert!(after.rd <= 500.0);
    }

    #[test]
    fn test_draw_between_equals_keeps_rating() {
        let player = GlickoRating::default();
        let draw = GameResult::against(&GlickoRating::default(), 0.5);
        let after = Glicko2::default().update_rating(&player, &[draw]).unwrap();
        assert!(close(after.rating, 1500.0, 1e-9));
        assert!(after.rd < player.rd);
    }

    #[test]
    fn test_rejects_bad_score() {
        let result = GameResult {
            opponent_rating: 1500.0,
            opponent_rd: 100.0,
            score: 1.5,
        };
        let err = Glicko2::default()
            .update_rating(&GlickoRating::default(), &[result])
            .unwrap_err();
        assert_eq!(err, RatingError::InvalidScore(1.5));
    }

    #[test]
    fn test_rejects_non_finite_input() {
        let player = GlickoRating {
            rating: f64::NAN,
            ..Default::default()
        };
        assert_eq!(
            Glicko2::default().update_rating(&player, &[]),
            Err(RatingError::NonFinite)
        );

        let result = GameResult {
            opponent_rating: f64::INFINITY,
            opponent_rd: 100.0,
            score: 1.0,
        };
        assert_eq!(
            Glicko2::default().update_rating(&GlickoRating::default(), &[result]),
            Err(RatingError::NonFinite)
        );
    }

    #[test]
    fn test_iteration_cap_is_reported() {
        let glicko = Glicko2::new(Glicko2Config {
            max_iterations: 0,
            ..Default::default()
        });
        let player = GlickoRating {
            rating: 1500.0,
            rd: 200.0,
            vol: 0.06,
        };
        let err = glicko.update_rating(&player, &paper_results()).unwrap_err();
        assert!(matches!(
            err,
            RatingError::NoConvergence { iterations: 0 } | RatingError::BracketNotFound { .. }
        ));
    }

    #[test]
    fn test_g_and_expected() {
        assert_eq!(g(0.0), 1.0);
        assert!(g(2.0) < g(1.0));
        assert!(close(expected(0.0, 0.0, 1.0), 0.5, 1e-12));
        assert!(expected(1.0, 0.0, 1.0) > 0.5);
    }
}
