use crate::battle::scheduler::{SchedulePolicy, DEFAULT_RESTART_COOLDOWN, DEFAULT_TURN_DELAY};
use crate::battle::selector::DEFAULT_ORACLE_TIMEOUT;
use crate::broadcast::DEFAULT_BROADCAST_CAPACITY;
use crate::teams::DEFAULT_TEAM_SIZE;
use std::str::FromStr;
use std::time::Duration;

/// Which oracle suggests moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OracleMode {
    #[default]
    Scoring,
    Offline,
}

impl FromStr for OracleMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "scoring" => Ok(OracleMode::Scoring),
            "offline" | "off" | "none" => Ok(OracleMode::Offline),
            other => Err(format!("unknown oracle mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaConfig {
    pub turn_delay: Duration,
    pub restart_cooldown: Duration,
    pub oracle_timeout: Duration,
    pub team_size: usize,
    pub rooms: Vec<String>,
    pub oracle: OracleMode,
    pub broadcast_capacity: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            turn_delay: DEFAULT_TURN_DELAY,
            restart_cooldown: DEFAULT_RESTART_COOLDOWN,
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT,
            team_size: DEFAULT_TEAM_SIZE,
            rooms: vec!["main".to_string()],
            oracle: OracleMode::default(),
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
        }
    }
}

impl ArenaConfig {
    /// Load from environment variables, using defaults for missing or invalid values
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let millis = |key: &str, default: Duration| {
            Duration::from_millis(parse_or(&lookup, key, default.as_millis() as u64))
        };

        let rooms: Vec<String> = lookup("ARENA_ROOMS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|room| !room.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            turn_delay: millis("ARENA_TURN_DELAY_MS", defaults.turn_delay),
            restart_cooldown: millis("ARENA_RESTART_COOLDOWN_MS", defaults.restart_cooldown),
            oracle_timeout: millis("ARENA_ORACLE_TIMEOUT_MS", defaults.oracle_timeout),
            team_size: Some(parse_or(&lookup, "ARENA_TEAM_SIZE", defaults.team_size))
                .filter(|size| *size > 0)
                .unwrap_or(defaults.team_size),
            rooms: if rooms.is_empty() { defaults.rooms } else { rooms },
            oracle: parse_or(&lookup, "ARENA_ORACLE", defaults.oracle),
            broadcast_capacity: Some(parse_or(
                &lookup,
                "ARENA_BROADCAST_CAPACITY",
                defaults.broadcast_capacity,
            ))
            .filter(|capacity| *capacity > 0)
            .unwrap_or(defaults.broadcast_capacity),
        }
    }

    pub fn schedule_policy(&self) -> SchedulePolicy {
        SchedulePolicy {
            turn_delay: self.turn_delay,
            restart_cooldown: self.restart_cooldown,
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ArenaConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ArenaConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config, ArenaConfig::default());
        assert_eq!(config.turn_delay, Duration::from_secs(12));
        assert_eq!(config.restart_cooldown, Duration::from_secs(60));
        assert_eq!(config.oracle_timeout, Duration::from_secs(8));
        assert_eq!(config.rooms, vec!["main"]);
    }

    #[test]
    fn test_values_are_read() {
        let config = config_from(&[
            ("ARENA_TURN_DELAY_MS", "500"),
            ("ARENA_RESTART_COOLDOWN_MS", "2000"),
            ("ARENA_TEAM_SIZE", "6"),
            ("ARENA_ROOMS", "main, side-room ,,vip"),
            ("ARENA_ORACLE", "Offline"),
        ]);

        assert_eq!(config.turn_delay, Duration::from_millis(500));
        assert_eq!(config.schedule_policy().restart_cooldown, Duration::from_secs(2));
        assert_eq!(config.team_size, 6);
        assert_eq!(config.rooms, vec!["main", "side-room", "vip"]);
        assert_eq!(config.oracle, OracleMode::Offline);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("ARENA_TURN_DELAY_MS", "soon"),
            ("ARENA_TEAM_SIZE", "0"),
            ("ARENA_ROOMS", " , "),
            ("ARENA_ORACLE", "psychic"),
            ("ARENA_BROADCAST_CAPACITY", "-1"),
        ]);

        assert_eq!(config, ArenaConfig::default());
    }
}
