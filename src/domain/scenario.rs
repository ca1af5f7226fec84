// Simulation scenarios and control commands understood by the backend
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scenario {
    #[default]
    Normal,
    VacuumLeak,
    Exotherm,
}

impl Scenario {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Normal => "/simulate/normal",
            Self::VacuumLeak => "/simulate/vacuum_leak",
            Self::Exotherm => "/simulate/exotherm",
        }
    }
}

impl FromStr for Scenario {
    type Err = UnknownScenario;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "vacuum_leak" => Ok(Self::VacuumLeak),
            "exotherm" => Ok(Self::Exotherm),
            other => Err(UnknownScenario(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scenario '{0}'")]
pub struct UnknownScenario(pub String);

/// Fire-and-forget calls sent to the backend control API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Simulate(Scenario),
    Reset,
    Intervene,
}

impl ControlCommand {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Simulate(scenario) => scenario.path(),
            Self::Reset => "/simulate/reset",
            Self::Intervene => "/api/intervene",
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POST {}", self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_paths() {
        assert_eq!(ControlCommand::Simulate(Scenario::VacuumLeak).path(), "/simulate/vacuum_leak");
        assert_eq!(ControlCommand::Reset.path(), "/simulate/reset");
        assert_eq!(ControlCommand::Intervene.to_string(), "POST /api/intervene");
    }

    #[test]
    fn test_parse_scenario() {
        assert_eq!("exotherm".parse::<Scenario>(), Ok(Scenario::Exotherm));
        assert_eq!(
            "meltdown".parse::<Scenario>(),
            Err(UnknownScenario("meltdown".to_string()))
        );
    }
}
