//! Layer classification and per-layer fractions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Classification tag for a recorded step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Model,
    View,
    Controller,
}

impl Layer {
    /// Every layer, in display order
    pub const ALL: [Layer; 3] = [Layer::Model, Layer::View, Layer::Controller];

    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Model => "model",
            Layer::View => "view",
            Layer::Controller => "controller",
        }
    }

    /// Capitalized initial used on narrow bar segments
    pub fn initial(self) -> char {
        match self {
            Layer::Model => 'M',
            Layer::View => 'V',
            Layer::Controller => 'C',
        }
    }

    fn index(self) -> usize {
        match self {
            Layer::Model => 0,
            Layer::View => 1,
            Layer::Controller => 2,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "model" => Ok(Layer::Model),
            "view" => Ok(Layer::View),
            "controller" => Ok(Layer::Controller),
            other => Err(format!("Unknown layer: {}", other)),
        }
    }
}

/// Fraction of a step's own time spent in each layer.
///
/// Always carries all three layers; absent layers are `0.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerPortions {
    pub model: f64,
    pub view: f64,
    pub controller: f64,
}

impl LayerPortions {
    /// All of the time in a single layer
    pub fn whole(layer: Layer) -> Self {
        let mut portions = Self::default();
        *portions.get_mut(layer) = 1.0;
        portions
    }

    pub fn get(&self, layer: Layer) -> f64 {
        match layer {
            Layer::Model => self.model,
            Layer::View => self.view,
            Layer::Controller => self.controller,
        }
    }

    fn get_mut(&mut self, layer: Layer) -> &mut f64 {
        match layer {
            Layer::Model => &mut self.model,
            Layer::View => &mut self.view,
            Layer::Controller => &mut self.controller,
        }
    }

    /// `(layer, fraction)` pairs in display order
    pub fn iter(&self) -> impl Iterator<Item = (Layer, f64)> + '_ {
        Layer::ALL.into_iter().map(move |layer| (layer, self.get(layer)))
    }

    pub fn sum(&self) -> f64 {
        self.model + self.view + self.controller
    }
}

/// Running per-layer time totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerTotals([Duration; 3]);

impl LayerTotals {
    pub fn add(&mut self, layer: Layer, time: Duration) {
        self.0[layer.index()] += time;
    }

    pub fn get(&self, layer: Layer) -> Duration {
        self.0[layer.index()]
    }

    pub fn total(&self) -> Duration {
        self.0.iter().sum()
    }

    /// Divide every total by `whole`
    ///
    /// `whole` must be non-zero.
    pub fn fractions_of(&self, whole: Duration) -> LayerPortions {
        let whole = whole.as_secs_f64();
        let mut portions = LayerPortions::default();
        for layer in Layer::ALL {
            *portions.get_mut(layer) = self.get(layer).as_secs_f64() / whole;
        }
        portions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_parse_and_display() {
        for layer in Layer::ALL {
            assert_eq!(layer.to_string().parse::<Layer>(), Ok(layer));
        }
        assert_eq!(" View ".parse::<Layer>(), Ok(Layer::View));
        assert!("helper".parse::<Layer>().is_err());
    }

    #[test]
    fn test_layer_serde_lowercase() {
        let json = serde_json::to_string(&Layer::Controller).unwrap();
        assert_eq!(json, "\"controller\"");
    }

    #[test]
    fn test_whole_portions() {
        let portions = LayerPortions::whole(Layer::View);
        assert_eq!(portions.get(Layer::View), 1.0);
        assert_eq!(portions.get(Layer::Model), 0.0);
        assert_eq!(portions.get(Layer::Controller), 0.0);
        assert_eq!(portions.sum(), 1.0);
    }

    #[test]
    fn test_portions_always_have_three_keys() {
        let json = serde_json::to_value(LayerPortions::whole(Layer::Model)).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_totals_fractions() {
        let mut totals = LayerTotals::default();
        totals.add(Layer::Model, Duration::from_millis(30));
        totals.add(Layer::View, Duration::from_millis(10));
        totals.add(Layer::Model, Duration::from_millis(10));

        assert_eq!(totals.total(), Duration::from_millis(50));

        let portions = totals.fractions_of(Duration::from_millis(50));
        assert!((portions.model - 0.8).abs() < 1e-9);
        assert!((portions.view - 0.2).abs() < 1e-9);
        assert_eq!(portions.controller, 0.0);
    }
}
