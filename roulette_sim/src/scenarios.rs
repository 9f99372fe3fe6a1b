//! Round-formation scenarios for DST.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioId {
    /// DST-001: Even roster, pairs, odd groups allowed
    EvenPairs,

    /// DST-002: Odd roster, pairs, one participant sits out each round
    OddSitOut,

    /// DST-003: Odd roster, pairs, leftover folded into a trio
    OddInclusive,

    /// DST-004: Groups of three, remainder folded in
    Trios,

    /// DST-005: Groups of three, repeats never accepted
    StrictTrios,

    /// DST-006: Two participants, strict mode, runs out after one round
    Exhaustion,

    /// DST-007: One participant replaced by a newcomer every round
    RosterChurn,

    /// DST-008: Large roster in groups of four
    LargeRoster,
}

/// Engine knobs a scenario runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioSetup {
    /// Participants on the initial roster
    pub roster_size: usize,

    /// Target group size
    pub group_size: usize,

    /// Odd-group policy
    pub allow_odd_group: bool,

    /// Rounds played when the caller does not override
    pub default_rounds: u32,

    /// Replace one participant with a newcomer before every round
    pub churn: bool,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::EvenPairs,
            ScenarioId::OddSitOut,
            ScenarioId::OddInclusive,
            ScenarioId::Trios,
            ScenarioId::StrictTrios,
            ScenarioId::Exhaustion,
            ScenarioId::RosterChurn,
            ScenarioId::LargeRoster,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::EvenPairs => "even_pairs",
            ScenarioId::OddSitOut => "odd_sit_out",
            ScenarioId::OddInclusive => "odd_inclusive",
            ScenarioId::Trios => "trios",
            ScenarioId::StrictTrios => "strict_trios",
            ScenarioId::Exhaustion => "exhaustion",
            ScenarioId::RosterChurn => "roster_churn",
            ScenarioId::LargeRoster => "large_roster",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::EvenPairs => "8 participants in pairs, everyone placed every round",
            ScenarioId::OddSitOut => "7 participants in strict pairs, one sits out, no repeats",
            ScenarioId::OddInclusive => "7 participants in pairs, leftover joins a trio",
            ScenarioId::Trios => "10 participants in groups of 3, remainder folded in",
            ScenarioId::StrictTrios => "10 participants in strict groups of 3, no repeats",
            ScenarioId::Exhaustion => "2 participants in strict pairs, only one round possible",
            ScenarioId::RosterChurn => "10 participants, one replaced by a newcomer each round",
            ScenarioId::LargeRoster => "60 participants in groups of 4",
        }
    }

    /// Returns the engine setup for this scenario.
    pub fn setup(&self) -> ScenarioSetup {
        let (roster_size, group_size, allow_odd_group, default_rounds, churn) = match self {
            ScenarioId::EvenPairs => (8, 2, true, 7, false),
            ScenarioId::OddSitOut => (7, 2, false, 10, false),
            ScenarioId::OddInclusive => (7, 2, true, 10, false),
            ScenarioId::Trios => (10, 3, true, 8, false),
            ScenarioId::StrictTrios => (10, 3, false, 8, false),
            ScenarioId::Exhaustion => (2, 2, false, 3, false),
            ScenarioId::RosterChurn => (10, 2, true, 12, true),
            ScenarioId::LargeRoster => (60, 4, true, 12, false),
        };

        ScenarioSetup {
            roster_size,
            group_size,
            allow_odd_group,
            default_rounds,
            churn,
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
            "even_pairs" | "evenpairs" | "dst-001" => Ok(ScenarioId::EvenPairs),
            "odd_sit_out" | "oddsitout" | "dst-002" => Ok(ScenarioId::OddSitOut),
            "odd_inclusive" | "oddinclusive" | "dst-003" => Ok(ScenarioId::OddInclusive),
            "trios" | "dst-004" => Ok(ScenarioId::Trios),
            "strict_trios" | "stricttrios" | "dst-005" => Ok(ScenarioId::StrictTrios),
            "exhaustion" | "dst-006" => Ok(ScenarioId::Exhaustion),
            "roster_churn" | "rosterchurn" | "dst-007" => Ok(ScenarioId::RosterChurn),
            "large_roster" | "largeroster" | "dst-008" => Ok(ScenarioId::LargeRoster),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_parse_back() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!("DST-006".parse::<ScenarioId>(), Ok(ScenarioId::Exhaustion));
        assert_eq!("StrictTrios".parse::<ScenarioId>(), Ok(ScenarioId::StrictTrios));
        assert!("time_warp".parse::<ScenarioId>().is_err());
    }

    #[test]
    fn test_setups_are_formable() {
        for scenario in ScenarioId::all() {
            let setup = scenario.setup();
            assert!(setup.group_size >= 2, "{}", scenario);
            assert!(setup.roster_size >= setup.group_size, "{}", scenario);
            assert!(setup.default_rounds > 0, "{}", scenario);
        }
    }
}
