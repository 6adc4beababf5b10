// ============================================================================
// Moteur d'indicateurs : moyennes mobiles simples + RSI
// ============================================================================
// Calcul pur sur une série de prix de clôture (ordre chronologique).
// Aucune I/O. Une valeur None signifie "pas assez de données", pas une erreur.
// ============================================================================

use std::collections::BTreeMap;

/// Périodes de moyennes mobiles calculées pour /api/indicators
pub const SMA_PERIODS: [usize; 3] = [7, 20, 50];

/// Périodes de RSI calculées pour /api/indicators
pub const RSI_PERIODS: [usize; 1] = [14];

/// Moyenne des `period` dernières clôtures
///
/// None si la série contient moins de `period` points.
pub fn sma(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }

    let window = &closes[closes.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// RSI sur les `period` dernières variations (moyennes simples)
///
/// None si la série contient moins de `period + 1` points.
/// Perte moyenne nulle => 100 (une série qui ne baisse jamais sature le RSI).
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let window = &closes[closes.len() - (period + 1)..];
    let (gain, loss) = window
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold((0.0, 0.0), |(gain, loss), delta| {
            if delta > 0.0 {
                (gain + delta, loss)
            } else {
                (gain, loss - delta)
            }
        });

    let avg_gain = gain / period as f64;
    let avg_loss = loss / period as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// Arrondi à 2 décimales pour la sérialisation
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Résultat du moteur pour une série
///
/// Chaque période demandée a toujours une clé, même sans valeur.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub latest_price: f64,
    pub sma: BTreeMap<usize, Option<f64>>,
    pub rsi: BTreeMap<usize, Option<f64>>,
}

impl IndicatorSet {
    pub fn compute(closes: &[f64], sma_periods: &[usize], rsi_periods: &[usize]) -> Self {
        Self {
            latest_price: closes.last().copied().unwrap_or(0.0),
            sma: sma_periods.iter().map(|&p| (p, sma(closes, p))).collect(),
            rsi: rsi_periods.iter().map(|&p| (p, rsi(closes, p))).collect(),
        }
    }

    /// Jeu standard : MA 7/20/50 + RSI 14
    pub fn standard(closes: &[f64]) -> Self {
        Self::compute(closes, &SMA_PERIODS, &RSI_PERIODS)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<f64> {
        (0..len).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn test_sma_last_window() {
        let closes = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0];
        assert_eq!(sma(&closes, 7), Some(13.0));
        assert_eq!(sma(&closes, 3), Some(15.0));
    }

    #[test]
    fn test_sma_insufficient_data() {
        assert_eq!(sma(&[1.0, 2.0], 3), None);
        assert_eq!(sma(&[], 1), None);
        assert_eq!(sma(&[1.0], 0), None);
    }

    #[test]
    fn test_rsi_needs_period_plus_one() {
        assert_eq!(rsi(&ramp(14), 14), None);
        assert!(rsi(&ramp(15), 14).is_some());
    }

    #[test]
    fn test_rsi_all_gains_is_100() {
        // 14 variations consécutives de +1
        assert_eq!(rsi(&ramp(15), 14), Some(100.0));
    }

    #[test]
    fn test_rsi_flat_series_is_100() {
        assert_eq!(rsi(&[5.0; 20], 14), Some(100.0));
    }

    #[test]
    fn test_rsi_all_losses_is_0() {
        let closes: Vec<f64> = ramp(15).into_iter().rev().collect();
        assert_eq!(rsi(&closes, 14), Some(0.0));
    }

    #[test]
    fn test_rsi_balanced_is_50() {
        // +2, -2 alternés : gains = pertes
        let closes: Vec<f64> = (0..15).map(|i| if i % 2 == 0 { 10.0 } else { 12.0 }).collect();
        let value = rsi(&closes, 14).unwrap();
        assert!((value - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_rsi_uses_only_recent_window() {
        // Une forte baisse ancienne ne doit pas compter
        let mut closes = vec![1000.0, 10.0];
        closes.extend(ramp(15));
        assert_eq!(rsi(&closes, 14), Some(100.0));
    }

    #[test]
    fn test_indicator_set_has_every_period() {
        let set = IndicatorSet::standard(&ramp(10));

        assert_eq!(set.latest_price, 109.0);
        assert_eq!(set.sma.len(), 3);
        assert!(set.sma[&7].is_some());
        assert_eq!(set.sma[&20], None);
        assert_eq!(set.sma[&50], None);
        assert_eq!(set.rsi[&14], None);
    }

    #[test]
    fn test_indicator_set_empty_series() {
        let set = IndicatorSet::standard(&[]);
        assert_eq!(set.latest_price, 0.0);
        assert!(set.sma.values().all(Option::is_none));
        assert!(set.rsi.values().all(Option::is_none));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(13.456), 13.46);
        assert_eq!(round2(-1.234), -1.23);
        assert_eq!(round2(100.0), 100.0);
    }
}
