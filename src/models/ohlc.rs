// ============================================================================
// Structure : Candle (Open, High, Low, Close, Volume)
// ============================================================================
// Représente une chandelle renvoyée par le fournisseur d'historique
//
// CONCEPTS RUST :
// 1. DateTime<Utc> : type de chrono pour dates avec timezone UTC
// 2. #[serde(with = ...)] : sérialise la date en millisecondes epoch
// 3. f64 : précision suffisante pour les prix (pas de garantie décimale)
// ============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Période demandée par /api/history (?period=...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HistoryPeriod {
    /// 1 jour de données
    #[serde(rename = "1d")]
    OneDay,
    /// 7 jours de données
    #[serde(rename = "7d")]
    OneWeek,
    /// 30 jours de données
    #[serde(rename = "30d")]
    OneMonth,
    /// 90 jours de données
    #[serde(rename = "90d")]
    ThreeMonths,
}

impl HistoryPeriod {
    /// Convertit le token de la query string
    ///
    /// Un token inconnu (ou absent) retombe sur 7 jours, jamais d'erreur.
    pub fn from_token(token: &str) -> Self {
        match token.trim() {
            "1d" => HistoryPeriod::OneDay,
            "7d" => HistoryPeriod::OneWeek,
            "30d" => HistoryPeriod::OneMonth,
            "90d" => HistoryPeriod::ThreeMonths,
            _ => HistoryPeriod::default(),
        }
    }

    /// Retourne le nombre de jours demandés au fournisseur
    pub fn to_days(&self) -> u32 {
        match self {
            HistoryPeriod::OneDay => 1,
            HistoryPeriod::OneWeek => 7,
            HistoryPeriod::OneMonth => 30,
            HistoryPeriod::ThreeMonths => 90,
        }
    }
}

impl Default for HistoryPeriod {
    fn default() -> Self {
        HistoryPeriod::OneWeek
    }
}

/// Une chandelle japonaise (candlestick)
///
/// Seul `close` est consommé par le moteur d'indicateurs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    /// Début de la chandelle (sérialisé en epoch-ms)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub open_time: DateTime<Utc>,

    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,

    /// Volume échangé (0 si le fournisseur ne le donne pas)
    pub volume: f64,
}

impl Candle {
    /// Constructeur : crée une nouvelle chandelle
    pub fn new(
        open_time: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Série de chandelles pour un symbole, triée chronologiquement
///
/// CONCEPT RUST : Ownership
/// - CandleSeries possède le Vec, le Vec possède les Candle
/// - Tout est libéré à la fin de la requête
#[derive(Debug, Clone, Serialize)]
pub struct CandleSeries {
    pub symbol: String,
    pub period: HistoryPeriod,
    #[serde(rename = "data")]
    pub candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(symbol: String, period: HistoryPeriod, candles: Vec<Candle>) -> Self {
        Self {
            symbol,
            period,
            candles,
        }
    }
}

/// Prix de clôture dans l'ordre chronologique
///
/// Entrée unique du moteur d'indicateurs.
pub fn closing_prices(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

// ============================================================================
// Tests unitaires
// ============================================================================
