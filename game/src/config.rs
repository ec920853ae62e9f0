pub(crate) use common::config::{
    ConfigManager, FileContentConfigProvider, Validate, YamlConfigSerializer,
};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "tictactoe_config.yaml";

pub fn get_config_manager() -> ConfigManager<FileContentConfigProvider, Config, YamlConfigSerializer>
{
    ConfigManager::from_yaml_file(CONFIG_FILE)
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Config {
    pub players: PlayersConfig,
    pub board: BoardConfig,
}

impl Validate for Config {
    fn validate(&self) -> Result<(), String> {
        self.players.validate()?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct PlayersConfig {
    pub player_one_name: String,
    pub player_two_name: String,
    pub computer_name: String,
}

impl Validate for PlayersConfig {
    fn validate(&self) -> Result<(), String> {
        for name in [
            &self.player_one_name,
            &self.player_two_name,
            &self.computer_name,
        ] {
            if name.trim().is_empty() {
                return Err("player names must not be empty".to_string());
            }
            if name.len() > 32 {
                return Err("player names must not exceed 32 characters".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct BoardConfig {
    pub show_coordinates: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            players: PlayersConfig {
                player_one_name: "Player 1".to_string(),
                player_two_name: "Player 2".to_string(),
                computer_name: "Computer".to_string(),
            },
            board: BoardConfig {
                show_coordinates: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_empty_player_name_rejected() {
        let mut config = Config::default();
        config.players.player_two_name = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overlong_player_name_rejected() {
        let mut config = Config::default();
        config.players.computer_name = "x".repeat(33);
        assert!(config.validate().is_err());
    }
}
