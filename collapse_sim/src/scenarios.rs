//! Preset grid scenarios.

use collapse_core::CollapseConfig;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// 9x9 grid at entropy 9
    Classic,

    /// 2x2 grid at entropy 2
    Tiny,

    /// 1x1 grid at entropy 5: no neighbors, pure self-collapse
    Single,

    /// 32x32 grid at entropy 9
    Wide,

    /// 5x5 grid at entropy 64: long propagation chains
    Deep,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Classic,
            ScenarioId::Tiny,
            ScenarioId::Single,
            ScenarioId::Wide,
            ScenarioId::Deep,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Classic => "classic",
            ScenarioId::Tiny => "tiny",
            ScenarioId::Single => "single",
            ScenarioId::Wide => "wide",
            ScenarioId::Deep => "deep",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Classic => "9x9 grid starting at entropy 9",
            ScenarioId::Tiny => "2x2 grid starting at entropy 2",
            ScenarioId::Single => "1x1 grid at entropy 5, collapse without neighbors",
            ScenarioId::Wide => "32x32 grid starting at entropy 9",
            ScenarioId::Deep => "5x5 grid starting at entropy 64",
        }
    }

    /// Returns the run configuration for this scenario.
    pub fn config(&self) -> CollapseConfig {
        match self {
            ScenarioId::Classic => CollapseConfig::default(),
            ScenarioId::Tiny => CollapseConfig::new(2, 2),
            ScenarioId::Single => CollapseConfig::new(1, 5),
            ScenarioId::Wide => CollapseConfig::new(32, 9),
            ScenarioId::Deep => CollapseConfig::new(5, 64),
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic" | "default" => Ok(ScenarioId::Classic),
            "tiny" => Ok(ScenarioId::Tiny),
            "single" | "one" => Ok(ScenarioId::Single),
            "wide" => Ok(ScenarioId::Wide),
            "deep" => Ok(ScenarioId::Deep),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_roundtrip_names() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
        }
    }

    #[test]
    fn test_scenario_configs_valid() {
        for scenario in ScenarioId::all() {
            assert!(scenario.config().validate().is_ok(), "{}", scenario);
        }
    }

    #[test]
    fn test_unknown_scenario() {
        assert!("hexagon".parse::<ScenarioId>().is_err());
    }
}
